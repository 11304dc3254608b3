//! Disposable mailbox provider clients and the provider dispatch table.
//!
//! Every client talks to exactly one third-party API and maps its responses
//! onto [`MailboxCredential`] and [`Inbox`]. [`MailProviders`] routes a
//! provider choice (or a credential) to the right client.

pub mod guerrillamail;
pub mod maildrop;
pub mod mailtm;
pub mod onesecmail;
pub mod tempmail;
pub mod ten_minute_mail;
pub mod yopmail;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{Inbox, MailboxCredential, Provider};
use rand::distr::Alphanumeric;
use rand::Rng;
use reqwest::{Client, Response};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

pub use guerrillamail::GuerrillaMailClient;
pub use maildrop::MaildropClient;
pub use mailtm::MailTmClient;
pub use onesecmail::OneSecMailClient;
pub use tempmail::TempMailClient;
pub use yopmail::YopmailClient;

/// Fixed client timeout; there is no per-provider override.
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const LOGIN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub(crate) fn http_client(provider: &str) -> Result<Client, AppError> {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| {
            AppError::InternalError(format!("Failed to create {} client: {}", provider, e))
        })
}

/// Turns a non-2xx response into an `ExternalApiError` carrying the body.
pub(crate) async fn ensure_success(response: Response, provider: &str) -> Result<Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    tracing::error!("{} returned error {}: {}", provider, status, error_text);
    Err(AppError::ExternalApiError(format!(
        "{} returned status {}: {}",
        provider, status, error_text
    )))
}

/// Random mailbox login of lowercase letters and digits.
pub fn random_login(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| LOGIN_CHARSET[rng.random_range(0..LOGIN_CHARSET.len())] as char)
        .collect()
}

/// Random alphanumeric password.
pub fn random_password(len: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Splits `login@domain`, rejecting anything without both halves.
pub fn split_address(address: &str) -> Result<(&str, &str), AppError> {
    match address.split_once('@') {
        Some((login, domain)) if !login.is_empty() && !domain.is_empty() => Ok((login, domain)),
        _ => Err(AppError::BadRequest(format!(
            "Invalid mailbox address: {}",
            address
        ))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Integer(i64),
    Float(f64),
}

/// Providers disagree on whether ids and timestamps are strings or numbers.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Integer(n) => n.to_string(),
        StringOrNumber::Float(f) => f.to_string(),
    })
}

/// Minimal HTML entity decoding for scraped or provider-escaped text.
pub(crate) fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Mailbox created for a profile, plus an optional note for the user.
#[derive(Debug, Clone)]
pub struct ProvisionedMailbox {
    pub credential: MailboxCredential,
    pub warning: Option<String>,
}

impl From<MailboxCredential> for ProvisionedMailbox {
    fn from(credential: MailboxCredential) -> Self {
        Self {
            credential,
            warning: None,
        }
    }
}

/// Provider dispatch table: one client per API-backed provider.
#[derive(Clone)]
pub struct MailProviders {
    pub guerrillamail: GuerrillaMailClient,
    pub mailtm: MailTmClient,
    pub onesecmail: OneSecMailClient,
    pub yopmail: YopmailClient,
    pub tempmail: TempMailClient,
    pub maildrop: MaildropClient,
}

impl MailProviders {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            guerrillamail: GuerrillaMailClient::new(config.guerrillamail_base_url.clone())?,
            mailtm: MailTmClient::new(config.mailtm_base_url.clone())?,
            onesecmail: OneSecMailClient::new(config.onesecmail_base_url.clone())?,
            yopmail: YopmailClient::new(config.yopmail_base_url.clone())?,
            tempmail: TempMailClient::new(
                config.tempmail_base_url.clone(),
                config.rapidapi_key.clone(),
            )?,
            maildrop: MaildropClient::new(config.maildrop_base_url.clone())?,
        })
    }

    /// Creates a mailbox with the chosen provider.
    ///
    /// `domain` is only consulted by mail.tm.
    pub async fn create(
        &self,
        provider: Provider,
        domain: Option<&str>,
    ) -> Result<ProvisionedMailbox, AppError> {
        tracing::info!("Creating mailbox with {}", provider);
        match provider {
            Provider::GuerrillaMail => self.guerrillamail.create_account().await.map(Into::into),
            Provider::MailTm => self.mailtm.create_account(domain).await.map(Into::into),
            Provider::OneSecMail => self.onesecmail.create_account().await.map(Into::into),
            Provider::Yopmail => Ok(self.yopmail.create_account().into()),
            Provider::TempMail => self.tempmail.create_account().await.map(Into::into),
            Provider::TenMinuteMail => Ok(ten_minute_mail::create_account()),
            Provider::Maildrop => Ok(self.maildrop.create_account().into()),
        }
    }

    /// Lists the inbox behind a credential, with message bodies.
    pub async fn inbox(&self, credential: &MailboxCredential) -> Result<Inbox, AppError> {
        tracing::info!(
            "Polling {} inbox for {}",
            credential.provider(),
            credential.address()
        );
        match credential {
            MailboxCredential::GuerrillaMail { address, sid_token } => {
                self.guerrillamail.fetch_inbox(address, sid_token).await
            }
            MailboxCredential::MailTm { address, token } => {
                self.mailtm.fetch_inbox(address, token).await
            }
            MailboxCredential::OneSecMail { address } => self.onesecmail.fetch_inbox(address).await,
            MailboxCredential::Yopmail { address } => self.yopmail.fetch_inbox(address).await,
            MailboxCredential::TempMail { address } => self.tempmail.fetch_inbox(address).await,
            MailboxCredential::TenMinuteMail { address } => Ok(ten_minute_mail::inbox(address)),
            MailboxCredential::Maildrop { address } => self.maildrop.fetch_inbox(address).await,
        }
    }

    /// Active mail.tm domains for the form's domain selector.
    pub async fn mailtm_domains(&self) -> Result<Vec<String>, AppError> {
        self.mailtm.domains().await
    }
}

/// Whether the provider has an API the inbox endpoint can poll.
pub fn has_inbox_api(provider: Provider) -> bool {
    !matches!(provider, Provider::TenMinuteMail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_login_charset_and_length() {
        let login = random_login(10);
        assert_eq!(login.len(), 10);
        assert!(login
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_random_password_is_alphanumeric() {
        let password = random_password(16);
        assert_eq!(password.len(), 16);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_split_address() {
        assert_eq!(split_address("abc@1secmail.com").unwrap(), ("abc", "1secmail.com"));
        assert!(split_address("abc").is_err());
        assert!(split_address("@x.com").is_err());
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("Tom &amp; Jerry &lt;hi&gt;"), "Tom & Jerry <hi>");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_string_or_number() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(deserialize_with = "string_or_number")]
            id: String,
        }
        let a: Row = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        let b: Row = serde_json::from_str(r#"{"id": "42"}"#).unwrap();
        assert_eq!(a.id, "42");
        assert_eq!(b.id, "42");
    }
}
