use super::{ensure_success, http_client, string_or_number};
use crate::errors::{AppError, ResultExt};
use crate::models::{Inbox, InboxMessage, MailboxCredential, MessageBody, Provider};
use chrono::{DateTime, Local};
use reqwest::Client;
use serde::Deserialize;

const PROVIDER: &str = "GuerrillaMail";

#[derive(Debug, Deserialize)]
struct EmailAddressResponse {
    email_addr: String,
    sid_token: String,
}

#[derive(Debug, Deserialize)]
struct CheckEmailResponse {
    #[serde(default)]
    list: Vec<GuerrillaMessage>,
}

#[derive(Debug, Deserialize)]
struct GuerrillaMessage {
    #[serde(deserialize_with = "string_or_number")]
    mail_id: String,
    #[serde(default)]
    mail_from: String,
    #[serde(default)]
    mail_subject: String,
    #[serde(deserialize_with = "string_or_number")]
    mail_timestamp: String,
}

#[derive(Debug, Deserialize)]
struct FetchEmailResponse {
    #[serde(default)]
    mail_body: Option<String>,
}

/// Client for the GuerrillaMail AJAX API (`ajax.php?f=...`).
#[derive(Clone)]
pub struct GuerrillaMailClient {
    client: Client,
    base_url: String,
}

impl GuerrillaMailClient {
    pub fn new(base_url: String) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client(PROVIDER)?,
            base_url,
        })
    }

    fn ajax_url(&self, params: &[(&str, &str)]) -> Result<reqwest::Url, AppError> {
        reqwest::Url::parse_with_params(&format!("{}/ajax.php", self.base_url), params)
            .map_err(|e| AppError::InternalError(format!("Failed to build URL: {}", e)))
    }

    /// Requests a fresh address and its session token.
    pub async fn create_account(&self) -> Result<MailboxCredential, AppError> {
        let url = self.ajax_url(&[("f", "get_email_address")])?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("GuerrillaMail address request failed")?;
        let response = ensure_success(response, PROVIDER).await?;

        let data: EmailAddressResponse = response
            .json()
            .await
            .context("Failed to parse GuerrillaMail address response")?;

        tracing::info!("✓ GuerrillaMail address created: {}", data.email_addr);
        Ok(MailboxCredential::GuerrillaMail {
            address: data.email_addr,
            sid_token: data.sid_token,
        })
    }

    /// Lists the inbox newest first and fetches every body.
    pub async fn fetch_inbox(&self, address: &str, sid_token: &str) -> Result<Inbox, AppError> {
        let url = self.ajax_url(&[
            ("f", "check_email"),
            ("seq", "0"),
            ("sid_token", sid_token),
        ])?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("GuerrillaMail inbox request failed")?;
        let response = ensure_success(response, PROVIDER).await?;

        let listing: CheckEmailResponse = response
            .json()
            .await
            .context("Failed to parse GuerrillaMail inbox")?;

        tracing::info!(
            "GuerrillaMail: {} messages for {}",
            listing.list.len(),
            address
        );

        let mut messages = Vec::with_capacity(listing.list.len());
        for message in listing.list.into_iter().rev() {
            let body = self.fetch_body(&message.mail_id, sid_token).await?;
            messages.push(InboxMessage {
                received_at: format_unix_timestamp(&message.mail_timestamp),
                id: message.mail_id,
                from: message.mail_from,
                subject: message.mail_subject,
                body: MessageBody::prefer_html(body, None),
            });
        }

        Ok(Inbox::new(Provider::GuerrillaMail, address, messages))
    }

    async fn fetch_body(&self, email_id: &str, sid_token: &str) -> Result<Option<String>, AppError> {
        let url = self.ajax_url(&[
            ("f", "fetch_email"),
            ("email_id", email_id),
            ("sid_token", sid_token),
        ])?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GuerrillaMail fetch of message {} failed", email_id))?;
        let response = ensure_success(response, PROVIDER).await?;

        let full: FetchEmailResponse = response
            .json()
            .await
            .context("Failed to parse GuerrillaMail message")?;
        Ok(full.mail_body)
    }
}

/// Unix seconds as local `dd/mm/YYYY HH:MM:SS`; unparseable input is returned as is.
pub fn format_unix_timestamp(raw: &str) -> String {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%d/%m/%Y %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_unix_timestamp_fallback() {
        assert_eq!(format_unix_timestamp("yesterday"), "yesterday");
        let formatted = format_unix_timestamp("1700000000");
        assert_eq!(formatted.len(), 19);
        assert!(formatted.contains("/2023 "));
    }

    #[test]
    fn test_message_accepts_numeric_ids() {
        let msg: GuerrillaMessage = serde_json::from_str(
            r#"{"mail_id": 1, "mail_from": "a@b.c", "mail_subject": "Hi", "mail_timestamp": "1700000000"}"#,
        )
        .unwrap();
        assert_eq!(msg.mail_id, "1");
        assert_eq!(msg.mail_timestamp, "1700000000");
    }
}
