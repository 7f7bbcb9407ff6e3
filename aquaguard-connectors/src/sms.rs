//! SMS channel over a Twilio-style messages API
//!
//! One form POST per recipient to
//! `{api_base}/2010-04-01/Accounts/{account_sid}/Messages.json`, with the
//! account SID and auth token as basic credentials.

use serde::{Deserialize, Serialize};

use crate::http::{HttpClient, HttpConfig, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::{ChannelError, Notification, NotificationChannel};

/// Public Twilio endpoint
pub const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Longest body sent; providers split or reject longer messages
pub const MAX_SMS_CHARS: usize = 320;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    pub account_sid: String,
    #[serde(default)]
    pub auth_token: String,
    /// Sending number
    pub from: String,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    TWILIO_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl SmsConfig {
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            api_base: default_api_base(),
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from: from.into(),
            to: Vec::new(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn recipient(mut self, number: impl Into<String>) -> Self {
        self.to.push(number.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Messages resource URL for the account
    pub fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base.trim_end_matches('/'),
            self.account_sid
        )
    }
}

#[derive(Debug)]
pub struct SmsChannel {
    config: SmsConfig,
    client: HttpClient,
}

impl SmsChannel {
    pub fn new(config: SmsConfig) -> Result<Self, ChannelError> {
        if config.to.is_empty() {
            return Err(ChannelError::Config("SMS channel needs at least one recipient".into()));
        }
        if config.account_sid.is_empty() {
            return Err(ChannelError::Config("SMS channel needs an account SID".into()));
        }

        let http = HttpConfig::new(config.messages_url())
            .basic_auth(config.account_sid.clone(), config.auth_token.clone())
            .timeout_secs(config.timeout_secs);

        Ok(Self {
            client: HttpClient::new(http)?,
            config,
        })
    }

    pub fn config(&self) -> &SmsConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl NotificationChannel for SmsChannel {
    fn name(&self) -> &str {
        "sms"
    }

    async fn send(&self, notification: &Notification) -> Result<(), ChannelError> {
        let body = sms_body(notification);

        for number in &self.config.to {
            let fields = vec![
                ("To".to_string(), number.clone()),
                ("From".to_string(), self.config.from.clone()),
                ("Body".to_string(), body.clone()),
            ];
            self.client.post_form(fields).await?;
        }
        Ok(())
    }
}

/// Prefixed headline, cut to [`MAX_SMS_CHARS`]
pub fn sms_body(notification: &Notification) -> String {
    let headline = notification.headline();
    match headline.char_indices().nth(MAX_SMS_CHARS) {
        Some((cut, _)) => headline[..cut].to_string(),
        None => headline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_url_for_account() {
        let config = SmsConfig::new("AC123", "token", "+15550100").api_base("https://sms.example.com/");
        assert_eq!(
            config.messages_url(),
            "https://sms.example.com/2010-04-01/Accounts/AC123/Messages.json"
        );
        assert!(SmsConfig::new("AC1", "t", "+1").messages_url().starts_with(TWILIO_API_BASE));
    }

    #[test]
    fn body_is_prefixed_and_bounded() {
        let mut notification = Notification::test(0);
        assert_eq!(
            sms_body(&notification),
            "AQUAPONICS ALERT: This is a test alert from your aquaponics system"
        );

        notification.message = "x".repeat(1000);
        assert_eq!(sms_body(&notification).chars().count(), MAX_SMS_CHARS);
    }

    #[test]
    fn requires_recipient_and_account() {
        assert!(matches!(
            SmsChannel::new(SmsConfig::new("AC123", "token", "+15550100")),
            Err(ChannelError::Config(_))
        ));
        assert!(matches!(
            SmsChannel::new(SmsConfig::new("", "token", "+15550100").recipient("+15550199")),
            Err(ChannelError::Config(_))
        ));

        let channel = SmsChannel::new(SmsConfig::new("AC123", "token", "+15550100").recipient("+15550199")).unwrap();
        assert_eq!(channel.name(), "sms");
    }
}
