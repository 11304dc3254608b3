//! YOPmail has no API: any login at yopmail.com already exists, and the inbox
//! is read by scraping the HTML inbox page.

use super::{decode_entities, ensure_success, http_client, random_login, split_address};
use crate::errors::{AppError, ResultExt};
use crate::models::{Inbox, InboxMessage, MailboxCredential, MessageBody, Provider};
use regex::Regex;
use reqwest::Client;
use std::sync::OnceLock;

const PROVIDER: &str = "YOPmail";
pub const YOPMAIL_DOMAIN: &str = "yopmail.com";

// YOPmail serves a stripped page to clients without a browser user agent.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

fn message_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?s)<div[^>]*class="m"[^>]*id="([^"]+)".*?<span class="lmh">(.*?)</span>.*?<span class="lmf">(.*?)</span>.*?<div class="lms">(.*?)</div>"#,
        )
        .expect("static regex is valid")
    })
}

fn body_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<div id="mail"[^>]*>(.*)</div>"#).expect("static regex is valid")
    })
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("static regex is valid"))
}

fn clean_text(fragment: &str) -> String {
    decode_entities(tag_regex().replace_all(fragment, "").trim())
}

/// Extracts `(id, time, sender, subject)` rows from an inbox page.
pub fn parse_inbox_page(html: &str) -> Vec<(String, String, String, String)> {
    message_regex()
        .captures_iter(html)
        .map(|caps| {
            (
                caps[1].to_string(),
                clean_text(&caps[2]),
                clean_text(&caps[3]),
                clean_text(&caps[4]),
            )
        })
        .collect()
}

/// Extracts the message body from a mail page, if present.
pub fn parse_mail_page(html: &str) -> Option<String> {
    body_regex()
        .captures(html)
        .map(|caps| caps[1].trim().to_string())
        .filter(|body| !body.is_empty())
}

#[derive(Clone)]
pub struct YopmailClient {
    client: Client,
    base_url: String,
}

impl YopmailClient {
    pub fn new(base_url: String) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client(PROVIDER)?,
            base_url,
        })
    }

    /// Picks a random login; no network call is needed.
    pub fn create_account(&self) -> MailboxCredential {
        let address = format!("{}@{}", random_login(10), YOPMAIL_DOMAIN);
        tracing::info!("✓ YOPmail address chosen: {}", address);
        MailboxCredential::Yopmail { address }
    }

    async fn get_page(&self, path: &str, params: &[(&str, &str)]) -> Result<String, AppError> {
        let url = reqwest::Url::parse_with_params(&format!("{}/{}", self.base_url, path), params)
            .map_err(|e| AppError::InternalError(format!("Failed to build URL: {}", e)))?;

        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .with_context(|| format!("YOPmail {} request failed", path))?;
        let response = ensure_success(response, PROVIDER).await?;

        response
            .text()
            .await
            .with_context(|| format!("Failed to read YOPmail {} page", path))
    }

    pub async fn fetch_inbox(&self, address: &str) -> Result<Inbox, AppError> {
        let (login, _) = split_address(address)?;
        let page = self.get_page("inbox", &[("login", login), ("p", "1")]).await?;
        let rows = parse_inbox_page(&page);

        tracing::info!("YOPmail: {} messages for {}", rows.len(), address);

        let mut messages = Vec::with_capacity(rows.len());
        for (id, received_at, from, subject) in rows {
            let body = self
                .get_page("mail", &[("b", login), ("id", id.as_str())])
                .await
                .map(|page| parse_mail_page(&page))
                .unwrap_or_else(|e| {
                    tracing::warn!("YOPmail body fetch failed for {}: {}", id, e);
                    None
                });
            messages.push(InboxMessage {
                id,
                from,
                subject,
                received_at,
                body: MessageBody::prefer_html(body, None),
            });
        }

        Ok(Inbox::new(Provider::Yopmail, address, messages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INBOX_PAGE: &str = r#"
<html><body>
<div class="mctn">
  <div class="m" onclick="g(this);" id="e_ZwRjAGV0ZGZ3">
    <button class="lm"><span class="lmh">10:42</span>
      <span class="lmf">News &amp; Co</span>
      <div class="lms">Welcome <b>aboard</b></div></button>
  </div>
  <div class="m" onclick="g(this);" id="e_ZwRjAGV0ZGZ4">
    <button class="lm"><span class="lmh">09:01</span>
      <span class="lmf">noreply@example.com</span>
      <div class="lms">Verify your email</div></button>
  </div>
</div>
</body></html>"#;

    #[test]
    fn test_parse_inbox_page() {
        let rows = parse_inbox_page(INBOX_PAGE);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "e_ZwRjAGV0ZGZ3");
        assert_eq!(rows[0].1, "10:42");
        assert_eq!(rows[0].2, "News & Co");
        assert_eq!(rows[0].3, "Welcome aboard");
        assert_eq!(rows[1].3, "Verify your email");
    }

    #[test]
    fn test_parse_empty_inbox() {
        assert!(parse_inbox_page("<html><body>Aucun message</body></html>").is_empty());
    }

    #[test]
    fn test_parse_mail_page() {
        let page = r#"<html><body><div id="mail"><p>Hello</p></div></body></html>"#;
        assert_eq!(parse_mail_page(page).as_deref(), Some("<p>Hello</p>"));
        assert_eq!(parse_mail_page("<html></html>"), None);
    }

    #[test]
    fn test_create_account_uses_yopmail_domain() {
        let client = YopmailClient::new("https://yopmail.com/en".to_string()).unwrap();
        let cred = client.create_account();
        assert!(cred.address().ends_with("@yopmail.com"));
        assert_eq!(cred.provider(), Provider::Yopmail);
    }
}
