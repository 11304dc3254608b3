use super::{ensure_success, http_client, random_login, split_address};
use crate::errors::{AppError, ResultExt};
use crate::models::{Inbox, InboxMessage, MailboxCredential, MessageBody, Provider};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

const PROVIDER: &str = "maildrop";
pub const MAILDROP_DOMAIN: &str = "maildrop.cc";

const INBOX_QUERY: &str =
    "query Inbox($mailbox: String!) { inbox(mailbox: $mailbox) { id headerfrom subject date } }";
const MESSAGE_QUERY: &str = "query Message($mailbox: String!, $id: String!) { message(mailbox: $mailbox, id: $id) { id headerfrom subject date html data } }";

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct InboxData {
    #[serde(default)]
    inbox: Vec<MaildropMessage>,
}

#[derive(Debug, Deserialize)]
struct MessageData {
    message: Option<MaildropMessage>,
}

#[derive(Debug, Deserialize)]
struct MaildropMessage {
    id: String,
    #[serde(default)]
    headerfrom: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

/// Client for maildrop's JSON GraphQL endpoint. Mailboxes exist implicitly,
/// so creation only picks a login.
#[derive(Clone)]
pub struct MaildropClient {
    client: Client,
    base_url: String,
}

impl MaildropClient {
    pub fn new(base_url: String) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client(PROVIDER)?,
            base_url,
        })
    }

    pub fn create_account(&self) -> MailboxCredential {
        let address = format!("{}@{}", random_login(10), MAILDROP_DOMAIN);
        tracing::info!("✓ maildrop address chosen: {}", address);
        MailboxCredential::Maildrop { address }
    }

    async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, AppError> {
        let response = self
            .client
            .post(format!("{}/graphql", self.base_url))
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .context("maildrop request failed")?;
        let response = ensure_success(response, PROVIDER).await?;

        let body: GraphQlResponse<T> = response
            .json()
            .await
            .context("Failed to parse maildrop response")?;

        if let Some(first) = body.errors.first() {
            return Err(AppError::ExternalApiError(format!(
                "maildrop query failed: {}",
                first.message
            )));
        }
        body.data
            .ok_or_else(|| AppError::ExternalApiError("maildrop returned no data".to_string()))
    }

    pub async fn fetch_inbox(&self, address: &str) -> Result<Inbox, AppError> {
        let (mailbox, _) = split_address(address)?;
        let listing: InboxData = self
            .query(INBOX_QUERY, json!({ "mailbox": mailbox }))
            .await?;

        tracing::info!("maildrop: {} messages for {}", listing.inbox.len(), address);

        let mut messages = Vec::with_capacity(listing.inbox.len());
        for summary in listing.inbox {
            let detail: MessageData = self
                .query(MESSAGE_QUERY, json!({ "mailbox": mailbox, "id": summary.id }))
                .await?;
            let body = detail
                .message
                .and_then(|m| MessageBody::prefer_html(m.html, m.data));
            messages.push(InboxMessage {
                id: summary.id,
                from: summary.headerfrom.unwrap_or_default(),
                subject: summary.subject.unwrap_or_default(),
                received_at: summary.date.unwrap_or_default(),
                body,
            });
        }

        Ok(Inbox::new(Provider::Maildrop, address, messages))
    }
}
