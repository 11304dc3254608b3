use serde::Deserialize;

pub const DEFAULT_GUERRILLAMAIL_BASE_URL: &str = "https://api.guerrillamail.com";
pub const DEFAULT_MAILTM_BASE_URL: &str = "https://api.mail.tm";
pub const DEFAULT_ONESECMAIL_BASE_URL: &str = "https://www.1secmail.com/api/v1";
pub const DEFAULT_YOPMAIL_BASE_URL: &str = "https://yopmail.com/en";
pub const DEFAULT_TEMPMAIL_BASE_URL: &str = "https://privatix-temp-mail-v1.p.rapidapi.com";
pub const DEFAULT_MAILDROP_BASE_URL: &str = "https://api.maildrop.cc";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// RapidAPI key for the Temp-Mail proxy; the provider is unusable without it.
    pub rapidapi_key: Option<String>,
    pub guerrillamail_base_url: String,
    pub mailtm_base_url: String,
    pub onesecmail_base_url: String,
    pub yopmail_base_url: String,
    pub tempmail_base_url: String,
    pub maildrop_base_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            rapidapi_key: std::env::var("RAPIDAPI_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            guerrillamail_base_url: base_url_from_env(
                "GUERRILLAMAIL_BASE_URL",
                DEFAULT_GUERRILLAMAIL_BASE_URL,
            )?,
            mailtm_base_url: base_url_from_env("MAILTM_BASE_URL", DEFAULT_MAILTM_BASE_URL)?,
            onesecmail_base_url: base_url_from_env(
                "ONESECMAIL_BASE_URL",
                DEFAULT_ONESECMAIL_BASE_URL,
            )?,
            yopmail_base_url: base_url_from_env("YOPMAIL_BASE_URL", DEFAULT_YOPMAIL_BASE_URL)?,
            tempmail_base_url: base_url_from_env("TEMPMAIL_BASE_URL", DEFAULT_TEMPMAIL_BASE_URL)?,
            maildrop_base_url: base_url_from_env("MAILDROP_BASE_URL", DEFAULT_MAILDROP_BASE_URL)?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!("GuerrillaMail Base URL: {}", config.guerrillamail_base_url);
        tracing::debug!("mail.tm Base URL: {}", config.mailtm_base_url);
        tracing::debug!("1secmail Base URL: {}", config.onesecmail_base_url);
        tracing::debug!("YOPmail Base URL: {}", config.yopmail_base_url);
        tracing::debug!("maildrop Base URL: {}", config.maildrop_base_url);
        if config.rapidapi_key.is_some() {
            tracing::info!("RapidAPI key configured, Temp-Mail provider enabled");
        } else {
            tracing::warn!("RAPIDAPI_KEY not set, Temp-Mail provider will fail on creation");
        }

        Ok(config)
    }
}

impl Default for Config {
    /// Public provider endpoints, port 3000, no RapidAPI key.
    fn default() -> Self {
        Self {
            port: 3000,
            rapidapi_key: None,
            guerrillamail_base_url: DEFAULT_GUERRILLAMAIL_BASE_URL.to_string(),
            mailtm_base_url: DEFAULT_MAILTM_BASE_URL.to_string(),
            onesecmail_base_url: DEFAULT_ONESECMAIL_BASE_URL.to_string(),
            yopmail_base_url: DEFAULT_YOPMAIL_BASE_URL.to_string(),
            tempmail_base_url: DEFAULT_TEMPMAIL_BASE_URL.to_string(),
            maildrop_base_url: DEFAULT_MAILDROP_BASE_URL.to_string(),
        }
    }
}

fn base_url_from_env(name: &str, default: &str) -> anyhow::Result<String> {
    match std::env::var(name) {
        Ok(url) => validate_base_url(name, &url),
        Err(_) => Ok(default.to_string()),
    }
}

fn validate_base_url(name: &str, url: &str) -> anyhow::Result<String> {
    let url = url.trim();
    if url.is_empty() {
        anyhow::bail!("{} cannot be empty", name);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    let trimmed = url.trim_end_matches('/');
    url::Url::parse(trimmed).map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_base_url_strips_trailing_slash() {
        let url = validate_base_url("MAILTM_BASE_URL", "https://api.mail.tm/").unwrap();
        assert_eq!(url, "https://api.mail.tm");
    }

    #[test]
    fn test_validate_base_url_ignores_surrounding_whitespace() {
        let leading = validate_base_url("MAILTM_BASE_URL", "  https://api.mail.tm").unwrap();
        let trailing = validate_base_url("MAILTM_BASE_URL", "https://api.mail.tm/ \n").unwrap();
        assert_eq!(leading, "https://api.mail.tm");
        assert_eq!(trailing, "https://api.mail.tm");
    }

    #[test]
    fn test_validate_base_url_rejects_bad_scheme() {
        assert!(validate_base_url("MAILTM_BASE_URL", "ftp://api.mail.tm").is_err());
        assert!(validate_base_url("MAILTM_BASE_URL", "   ").is_err());
        assert!(validate_base_url("MAILTM_BASE_URL", "https://").is_err());
    }
}
