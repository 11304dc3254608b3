//! 10MinuteMail has no official API. The provider is kept in the menu as a
//! placeholder: creation hands back a fixed address with a warning and the
//! inbox points the user at the website.

use super::ProvisionedMailbox;
use crate::models::{Inbox, MailboxCredential, Provider};

pub const PLACEHOLDER_ADDRESS: &str = "user@10minutemail.com";
pub const WEBSITE: &str = "https://10minutemail.com/";

pub fn create_account() -> ProvisionedMailbox {
    tracing::warn!("10MinuteMail has no API, returning placeholder address");
    ProvisionedMailbox {
        credential: MailboxCredential::TenMinuteMail {
            address: PLACEHOLDER_ADDRESS.to_string(),
        },
        warning: Some(
            "10MinuteMail has no official API; this address is only a placeholder.".to_string(),
        ),
    }
}

pub fn inbox(address: &str) -> Inbox {
    Inbox::with_notice(
        Provider::TenMinuteMail,
        address,
        format!("Visit {} manually to check the inbox for {}", WEBSITE, address),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_carries_warning() {
        let provisioned = create_account();
        assert_eq!(provisioned.credential.address(), PLACEHOLDER_ADDRESS);
        assert!(provisioned.warning.is_some());
    }

    #[test]
    fn test_inbox_is_a_notice() {
        let inbox = inbox(PLACEHOLDER_ADDRESS);
        assert!(inbox.messages.is_empty());
        assert!(inbox.notice.unwrap().contains(WEBSITE));
    }
}
