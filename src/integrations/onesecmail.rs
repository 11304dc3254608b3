use super::{ensure_success, http_client, split_address, string_or_number};
use crate::errors::{AppError, ResultExt};
use crate::models::{Inbox, InboxMessage, MailboxCredential, MessageBody, Provider};
use reqwest::Client;
use serde::Deserialize;

const PROVIDER: &str = "1secmail";

#[derive(Debug, Deserialize)]
struct OneSecMessage {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    #[serde(default)]
    from: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    date: String,
}

#[derive(Debug, Deserialize)]
struct OneSecMessageDetail {
    #[serde(rename = "htmlBody", default)]
    html_body: Option<String>,
    #[serde(rename = "textBody", default)]
    text_body: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

/// Client for the 1secmail query-string API. The address itself is the
/// credential: login and domain are split out of it for every call.
#[derive(Clone)]
pub struct OneSecMailClient {
    client: Client,
    base_url: String,
}

impl OneSecMailClient {
    pub fn new(base_url: String) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client(PROVIDER)?,
            base_url,
        })
    }

    fn api_url(&self, params: &[(&str, &str)]) -> Result<reqwest::Url, AppError> {
        reqwest::Url::parse_with_params(&format!("{}/", self.base_url), params)
            .map_err(|e| AppError::InternalError(format!("Failed to build URL: {}", e)))
    }

    pub async fn create_account(&self) -> Result<MailboxCredential, AppError> {
        let url = self.api_url(&[("action", "genRandomMailbox"), ("count", "1")])?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("1secmail mailbox request failed")?;
        let response = ensure_success(response, PROVIDER).await?;

        let addresses: Vec<String> = response
            .json()
            .await
            .context("Failed to parse 1secmail mailbox response")?;

        let address = addresses.into_iter().next().ok_or_else(|| {
            AppError::ExternalApiError("1secmail returned no mailbox".to_string())
        })?;

        tracing::info!("✓ 1secmail address created: {}", address);
        Ok(MailboxCredential::OneSecMail { address })
    }

    pub async fn fetch_inbox(&self, address: &str) -> Result<Inbox, AppError> {
        let (login, domain) = split_address(address)?;
        let url = self.api_url(&[
            ("action", "getMessages"),
            ("login", login),
            ("domain", domain),
        ])?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("1secmail inbox request failed")?;
        let response = ensure_success(response, PROVIDER).await?;

        let listing: Vec<OneSecMessage> = response
            .json()
            .await
            .context("Failed to parse 1secmail inbox")?;

        tracing::info!("1secmail: {} messages for {}", listing.len(), address);

        let mut messages = Vec::with_capacity(listing.len());
        for message in listing {
            let detail = self.read_message(login, domain, &message.id).await?;
            messages.push(InboxMessage {
                id: message.id,
                from: message.from,
                subject: message.subject,
                received_at: message.date,
                body: MessageBody::prefer_html(
                    detail.html_body,
                    detail.text_body.or(detail.body),
                ),
            });
        }

        Ok(Inbox::new(Provider::OneSecMail, address, messages))
    }

    async fn read_message(
        &self,
        login: &str,
        domain: &str,
        id: &str,
    ) -> Result<OneSecMessageDetail, AppError> {
        let url = self.api_url(&[
            ("action", "readMessage"),
            ("login", login),
            ("domain", domain),
            ("id", id),
        ])?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("1secmail read of message {} failed", id))?;
        let response = ensure_success(response, PROVIDER).await?;

        response
            .json()
            .await
            .context("Failed to parse 1secmail message")
    }
}
