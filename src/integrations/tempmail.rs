use super::{ensure_success, http_client, random_login, string_or_number};
use crate::errors::{AppError, ResultExt};
use crate::models::{Inbox, InboxMessage, MailboxCredential, MessageBody, Provider};
use rand::seq::IndexedRandom;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;

const PROVIDER: &str = "Temp-Mail";
const RAPIDAPI_HOST: &str = "privatix-temp-mail-v1.p.rapidapi.com";

pub const INBOX_NOT_READY_NOTICE: &str =
    "No messages found or address not active yet.";

#[derive(Debug, Deserialize)]
struct TempMailMessage {
    #[serde(default, deserialize_with = "string_or_number")]
    mail_id: String,
    #[serde(default)]
    mail_from: String,
    #[serde(default)]
    mail_subject: String,
    #[serde(default, deserialize_with = "string_or_number")]
    mail_timestamp: String,
    #[serde(default)]
    mail_text_only: Option<String>,
    #[serde(default)]
    mail_html: Option<String>,
}

/// Client for the Temp-Mail proxy hosted on RapidAPI.
///
/// Every call carries the RapidAPI key and host headers; without a key the
/// provider cannot be used.
#[derive(Clone)]
pub struct TempMailClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl TempMailClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client(PROVIDER)?,
            base_url,
            api_key,
        })
    }

    fn get(&self, path: &str) -> Result<RequestBuilder, AppError> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            AppError::ExternalApiError("RAPIDAPI_KEY is not configured".to_string())
        })?;
        Ok(self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("X-RapidAPI-Key", key)
            .header("X-RapidAPI-Host", RAPIDAPI_HOST))
    }

    /// Available domains, each starting with `@`.
    pub async fn domains(&self) -> Result<Vec<String>, AppError> {
        let response = self
            .get("/request/domains/")?
            .send()
            .await
            .context("Temp-Mail domains request failed")?;
        let response = ensure_success(response, PROVIDER).await?;

        response
            .json()
            .await
            .context("Failed to parse Temp-Mail domains")
    }

    pub async fn create_account(&self) -> Result<MailboxCredential, AppError> {
        let domains = self.domains().await?;
        let domain = domains
            .choose(&mut rand::rng())
            .cloned()
            .ok_or_else(|| AppError::ExternalApiError("Temp-Mail returned no domains".to_string()))?;

        let address = if domain.starts_with('@') {
            format!("{}{}", random_login(10), domain)
        } else {
            format!("{}@{}", random_login(10), domain)
        };

        tracing::info!("✓ Temp-Mail address created: {}", address);
        Ok(MailboxCredential::TempMail { address })
    }

    /// Reads the inbox. A non-200 answer means the address has no mail yet.
    pub async fn fetch_inbox(&self, address: &str) -> Result<Inbox, AppError> {
        let response = self
            .get(&format!("/request/mail/id/{}/", address))?
            .send()
            .await
            .context("Temp-Mail inbox request failed")?;

        if response.status() != StatusCode::OK {
            tracing::info!(
                "Temp-Mail returned {} for {}, treating as empty",
                response.status(),
                address
            );
            return Ok(Inbox::with_notice(
                Provider::TempMail,
                address,
                INBOX_NOT_READY_NOTICE,
            ));
        }

        // An empty inbox comes back as an `{"error": ...}` object, not a list.
        let payload: Value = response
            .json()
            .await
            .context("Failed to parse Temp-Mail inbox")?;
        let listing: Vec<TempMailMessage> = match payload {
            Value::Array(_) => serde_json::from_value(payload).map_err(|e| {
                AppError::ExternalApiError(format!("Unexpected Temp-Mail message format: {}", e))
            })?,
            _ => Vec::new(),
        };

        tracing::info!("Temp-Mail: {} messages for {}", listing.len(), address);

        let messages = listing
            .into_iter()
            .map(|m| InboxMessage {
                id: m.mail_id,
                from: m.mail_from,
                subject: m.mail_subject,
                received_at: m.mail_timestamp,
                body: MessageBody::prefer_html(m.mail_html, m.mail_text_only),
            })
            .collect();

        Ok(Inbox::new(Provider::TempMail, address, messages))
    }
}
