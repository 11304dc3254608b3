use super::{ensure_success, http_client, random_login, random_password};
use crate::errors::{AppError, ResultExt};
use crate::models::{Inbox, InboxMessage, MailboxCredential, MessageBody, Provider};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const PROVIDER: &str = "mail.tm";

/// Hydra collection wrapper used by every mail.tm list endpoint.
#[derive(Debug, Deserialize)]
struct HydraCollection<T> {
    #[serde(rename = "hydra:member", default = "Vec::new")]
    members: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct MailTmDomain {
    domain: String,
    #[serde(rename = "isActive", default = "default_true")]
    is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct MailTmAddress {
    #[serde(default)]
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MailTmMessage {
    id: String,
    #[serde(default)]
    from: Option<MailTmAddress>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(rename = "createdAt", default)]
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MailTmMessageDetail {
    #[serde(default)]
    html: Option<Vec<String>>,
    #[serde(default)]
    text: Option<String>,
}

/// Client for the mail.tm REST API. Inbox calls need the bearer token from
/// account creation.
#[derive(Clone)]
pub struct MailTmClient {
    client: Client,
    base_url: String,
}

impl MailTmClient {
    pub fn new(base_url: String) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client(PROVIDER)?,
            base_url,
        })
    }

    /// Active domains, deduplicated in listing order.
    pub async fn domains(&self) -> Result<Vec<String>, AppError> {
        let url = format!("{}/domains", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/ld+json")
            .send()
            .await
            .context("mail.tm domains request failed")?;
        let response = ensure_success(response, PROVIDER).await?;

        let collection: HydraCollection<MailTmDomain> = response
            .json()
            .await
            .context("Failed to parse mail.tm domains")?;

        let mut domains: Vec<String> = Vec::new();
        for entry in collection.members.into_iter().filter(|d| d.is_active) {
            if !domains.contains(&entry.domain) {
                domains.push(entry.domain);
            }
        }
        tracing::debug!("mail.tm domains: {:?}", domains);
        Ok(domains)
    }

    /// Registers a random account and logs in to obtain its bearer token.
    ///
    /// Without an explicit domain the first active one is used.
    pub async fn create_account(&self, domain: Option<&str>) -> Result<MailboxCredential, AppError> {
        let domain = match domain.map(str::trim).filter(|d| !d.is_empty()) {
            Some(d) => d.to_string(),
            None => self
                .domains()
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    AppError::ExternalApiError("No mail.tm domain available".to_string())
                })?,
        };

        let address = format!("{}@{}", random_login(10), domain);
        let credentials = json!({
            "address": address,
            "password": random_password(16),
        });

        let response = self
            .client
            .post(format!("{}/accounts", self.base_url))
            .json(&credentials)
            .send()
            .await
            .context("mail.tm account creation failed")?;
        ensure_success(response, PROVIDER).await?;

        let response = self
            .client
            .post(format!("{}/token", self.base_url))
            .json(&credentials)
            .send()
            .await
            .context("mail.tm token request failed")?;
        let response = ensure_success(response, PROVIDER).await?;

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse mail.tm token response")?;

        tracing::info!("✓ mail.tm account created: {}", address);
        Ok(MailboxCredential::MailTm {
            address,
            token: token.token,
        })
    }

    /// Lists messages and fetches each one's detail.
    pub async fn fetch_inbox(&self, address: &str, token: &str) -> Result<Inbox, AppError> {
        let response = self
            .client
            .get(format!("{}/messages", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .context("mail.tm inbox request failed")?;
        let response = ensure_success(response, PROVIDER).await?;

        let listing: HydraCollection<MailTmMessage> = response
            .json()
            .await
            .context("Failed to parse mail.tm inbox")?;

        tracing::info!("mail.tm: {} messages for {}", listing.members.len(), address);

        let mut messages = Vec::with_capacity(listing.members.len());
        for message in listing.members {
            let detail = self.fetch_detail(&message.id, token).await?;
            let html = detail.html.map(|parts| parts.concat());
            messages.push(InboxMessage {
                id: message.id,
                from: message
                    .from
                    .and_then(|f| f.address)
                    .unwrap_or_else(|| "N/A".to_string()),
                subject: message
                    .subject
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "(no subject)".to_string()),
                received_at: message.created_at.unwrap_or_default(),
                body: MessageBody::prefer_html(html, detail.text),
            });
        }

        Ok(Inbox::new(Provider::MailTm, address, messages))
    }

    async fn fetch_detail(&self, id: &str, token: &str) -> Result<MailTmMessageDetail, AppError> {
        let response = self
            .client
            .get(format!("{}/messages/{}", self.base_url, id))
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("mail.tm fetch of message {} failed", id))?;
        let response = ensure_success(response, PROVIDER).await?;

        response
            .json()
            .await
            .context("Failed to parse mail.tm message")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hydra_collection_tolerates_missing_members() {
        let empty: HydraCollection<MailTmDomain> = serde_json::from_str("{}").unwrap();
        assert!(empty.members.is_empty());
    }

    #[test]
    fn test_message_detail_html_parts() {
        let detail: MailTmMessageDetail =
            serde_json::from_str(r#"{"html": ["<p>a</p>", "<p>b</p>"], "text": "a b"}"#).unwrap();
        assert_eq!(detail.html.unwrap().concat(), "<p>a</p><p>b</p>");

        let no_html: MailTmMessageDetail = serde_json::from_str(r#"{"html": null}"#).unwrap();
        assert!(no_html.html.is_none());
    }
}
