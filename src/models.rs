use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============ Profile Models ============

/// Countries a profile can be generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    #[serde(rename = "IT", alias = "Italia", alias = "it")]
    Italy,
    #[serde(rename = "FR", alias = "Francia", alias = "fr")]
    France,
    #[serde(rename = "DE", alias = "Germania", alias = "de")]
    Germany,
    #[serde(rename = "LU", alias = "Lussemburgo", alias = "lu")]
    Luxembourg,
}

impl Country {
    pub const ALL: [Country; 4] = [
        Country::Italy,
        Country::France,
        Country::Germany,
        Country::Luxembourg,
    ];

    /// ISO 3166 alpha-2 code, also the key of the IBAN pools.
    pub fn code(&self) -> &'static str {
        match self {
            Country::Italy => "IT",
            Country::France => "FR",
            Country::Germany => "DE",
            Country::Luxembourg => "LU",
        }
    }

    /// Label shown in the form and written to the `Paese` column.
    pub fn label(&self) -> &'static str {
        match self {
            Country::Italy => "Italia",
            Country::France => "Francia",
            Country::Germany => "Germania",
            Country::Luxembourg => "Lussemburgo",
        }
    }

    /// Fake-data locale used for names and addresses.
    pub fn locale(&self) -> &'static str {
        match self {
            Country::Italy => "it_IT",
            Country::France => "fr_FR",
            Country::Germany => "de_DE",
            Country::Luxembourg => "fr_LU",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Country {
    type Err = String;

    /// Accepts either the country code or the form label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Country::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(needle) || c.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("Unknown country '{}'", s))
    }
}

/// Optional columns the caller can ask for on top of the base profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExtraField {
    #[serde(rename = "email", alias = "Email")]
    Email,
    #[serde(rename = "phone", alias = "Telefono")]
    Phone,
    #[serde(rename = "tax_code", alias = "Codice Fiscale")]
    TaxCode,
    #[serde(rename = "vat_id", alias = "Partita IVA")]
    VatId,
}

impl ExtraField {
    /// Export order of the optional columns.
    pub const ALL: [ExtraField; 4] = [
        ExtraField::Email,
        ExtraField::Phone,
        ExtraField::TaxCode,
        ExtraField::VatId,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ExtraField::Email => "email",
            ExtraField::Phone => "phone",
            ExtraField::TaxCode => "tax_code",
            ExtraField::VatId => "vat_id",
        }
    }

    /// CSV column header.
    pub fn column(&self) -> &'static str {
        match self {
            ExtraField::Email => "Email",
            ExtraField::Phone => "Telefono",
            ExtraField::TaxCode => "Codice Fiscale",
            ExtraField::VatId => "Partita IVA",
        }
    }
}

impl FromStr for ExtraField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ExtraField::ALL
            .into_iter()
            .find(|f| f.slug().eq_ignore_ascii_case(needle) || f.column().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("Unknown field '{}'", s))
    }
}

/// A generated identity. Optional fields are present only when selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    /// Birth date formatted as `dd/mm/YYYY`.
    pub birth_date: String,
    /// Single-line postal address.
    pub address: String,
    pub iban: String,
    /// Country label (e.g. "Italia").
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tax_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub vat_id: Option<String>,
}

// ============ Mailbox Models ============

/// Disposable mailbox providers offered by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Provider {
    #[default]
    #[serde(rename = "guerrillamail", alias = "Guerrilla Mail")]
    GuerrillaMail,
    #[serde(rename = "mailtm", alias = "Mail.tm")]
    MailTm,
    #[serde(rename = "onesecmail", alias = "1secmail")]
    OneSecMail,
    #[serde(rename = "yopmail", alias = "YOPmail")]
    Yopmail,
    #[serde(rename = "tempmail", alias = "Temp-Mail")]
    TempMail,
    #[serde(rename = "tenminutemail", alias = "10MinuteMail")]
    TenMinuteMail,
    #[serde(rename = "maildrop", alias = "Maildrop")]
    Maildrop,
}

impl Provider {
    pub const ALL: [Provider; 7] = [
        Provider::GuerrillaMail,
        Provider::MailTm,
        Provider::OneSecMail,
        Provider::Yopmail,
        Provider::TempMail,
        Provider::TenMinuteMail,
        Provider::Maildrop,
    ];

    /// Machine name used in JSON and in the credential tag.
    pub fn slug(&self) -> &'static str {
        match self {
            Provider::GuerrillaMail => "guerrillamail",
            Provider::MailTm => "mailtm",
            Provider::OneSecMail => "onesecmail",
            Provider::Yopmail => "yopmail",
            Provider::TempMail => "tempmail",
            Provider::TenMinuteMail => "tenminutemail",
            Provider::Maildrop => "maildrop",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::GuerrillaMail => "Guerrilla Mail",
            Provider::MailTm => "Mail.tm",
            Provider::OneSecMail => "1secmail",
            Provider::Yopmail => "YOPmail",
            Provider::TempMail => "Temp-Mail",
            Provider::TenMinuteMail => "10MinuteMail",
            Provider::Maildrop => "Maildrop",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Provider::ALL
            .into_iter()
            .find(|p| p.slug().eq_ignore_ascii_case(needle) || p.display_name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("Unknown provider '{}'", s))
    }
}

/// Credential returned by a provider's account-creation call.
///
/// Handed back to the caller with the generated profiles and posted again to
/// poll the inbox; never stored server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider")]
pub enum MailboxCredential {
    #[serde(rename = "guerrillamail")]
    GuerrillaMail { address: String, sid_token: String },
    #[serde(rename = "mailtm")]
    MailTm { address: String, token: String },
    #[serde(rename = "onesecmail")]
    OneSecMail { address: String },
    #[serde(rename = "yopmail")]
    Yopmail { address: String },
    #[serde(rename = "tempmail")]
    TempMail { address: String },
    #[serde(rename = "tenminutemail")]
    TenMinuteMail { address: String },
    #[serde(rename = "maildrop")]
    Maildrop { address: String },
}

impl MailboxCredential {
    pub fn address(&self) -> &str {
        match self {
            MailboxCredential::GuerrillaMail { address, .. }
            | MailboxCredential::MailTm { address, .. }
            | MailboxCredential::OneSecMail { address }
            | MailboxCredential::Yopmail { address }
            | MailboxCredential::TempMail { address }
            | MailboxCredential::TenMinuteMail { address }
            | MailboxCredential::Maildrop { address } => address,
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            MailboxCredential::GuerrillaMail { .. } => Provider::GuerrillaMail,
            MailboxCredential::MailTm { .. } => Provider::MailTm,
            MailboxCredential::OneSecMail { .. } => Provider::OneSecMail,
            MailboxCredential::Yopmail { .. } => Provider::Yopmail,
            MailboxCredential::TempMail { .. } => Provider::TempMail,
            MailboxCredential::TenMinuteMail { .. } => Provider::TenMinuteMail,
            MailboxCredential::Maildrop { .. } => Provider::Maildrop,
        }
    }
}

/// Body of a fetched message. HTML is preferred when the provider has both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum MessageBody {
    Html(String),
    Text(String),
}

impl MessageBody {
    /// Picks HTML over text, ignoring blank values.
    pub fn prefer_html(html: Option<String>, text: Option<String>) -> Option<Self> {
        match (html, text) {
            (Some(h), _) if !h.trim().is_empty() => Some(MessageBody::Html(h)),
            (_, Some(t)) if !t.trim().is_empty() => Some(MessageBody::Text(t)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxMessage {
    pub id: String,
    pub from: String,
    pub subject: String,
    /// Provider timestamp rendered as text; format varies per provider.
    pub received_at: String,
    pub body: Option<MessageBody>,
}

/// Inbox listing for one mailbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inbox {
    pub address: String,
    pub provider: Provider,
    pub messages: Vec<InboxMessage>,
    /// Informational message for the user (e.g. empty inbox, no API).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notice: Option<String>,
}

impl Inbox {
    pub fn new(provider: Provider, address: impl Into<String>, messages: Vec<InboxMessage>) -> Self {
        let notice = if messages.is_empty() {
            Some("No messages found.".to_string())
        } else {
            None
        };
        Self {
            address: address.into(),
            provider,
            messages,
            notice,
        }
    }

    pub fn with_notice(provider: Provider, address: impl Into<String>, notice: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            provider,
            messages: Vec::new(),
            notice: Some(notice.into()),
        }
    }
}

// ============ Request / Response Models ============

fn default_count() -> u32 {
    1
}

/// Body of `POST /api/v1/profiles` and `POST /api/v1/profiles/csv`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerateRequest {
    pub country: Country,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub fields: Vec<ExtraField>,
    /// Mailbox provider, used only when `fields` contains `email`.
    #[serde(default)]
    pub provider: Provider,
    /// mail.tm domain; the first active domain is used when absent.
    #[serde(default)]
    pub domain: Option<String>,
}

/// Body of `POST /api/v1/profiles/export`: rows from an earlier
/// `POST /api/v1/profiles` response, exported as they are.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub fields: Vec<ExtraField>,
    pub profiles: Vec<Profile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub batch_id: Uuid,
    pub columns: Vec<String>,
    pub profiles: Vec<Profile>,
    /// Last mailbox successfully created in this batch.
    pub mailbox: Option<MailboxCredential>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IbanResponse {
    pub country: String,
    pub iban: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub slug: String,
    pub name: String,
    /// Whether the provider exposes an inbox API.
    pub has_inbox_api: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainsResponse {
    pub domains: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub warning: Option<String>,
}
