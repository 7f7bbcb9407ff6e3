//! Email channel over a transactional mail API
//!
//! Posts `{ from, to, subject, html }` as JSON with a bearer token, the
//! shape most hosted mail APIs accept.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::http::{HttpClient, HttpConfig, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::{ChannelError, Notification, NotificationChannel, Severity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Send endpoint of the mail API
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    pub from: String,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl EmailConfig {
    pub fn new(api_url: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: String::new(),
            from: from.into(),
            to: Vec::new(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    pub fn recipient(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Serialize)]
struct MailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: String,
    html: String,
}

#[derive(Debug)]
pub struct EmailChannel {
    config: EmailConfig,
    client: HttpClient,
}

impl EmailChannel {
    pub fn new(config: EmailConfig) -> Result<Self, ChannelError> {
        if config.to.is_empty() {
            return Err(ChannelError::Config("email channel needs at least one recipient".into()));
        }

        let mut http = HttpConfig::new(config.api_url.clone()).timeout_secs(config.timeout_secs);
        if !config.api_key.is_empty() {
            http = http.bearer_token(config.api_key.clone());
        }

        Ok(Self {
            client: HttpClient::new(http)?,
            config,
        })
    }

    pub fn config(&self) -> &EmailConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl NotificationChannel for EmailChannel {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, notification: &Notification) -> Result<(), ChannelError> {
        let request = MailRequest {
            from: &self.config.from,
            to: &self.config.to,
            subject: notification.headline(),
            html: render_html(notification),
        };
        self.client.post_json(&request).await
    }
}

/// Render the HTML body of an alert email
pub fn render_html(notification: &Notification) -> String {
    let colour = match notification.severity {
        Severity::Critical => "#d32f2f",
        Severity::Warning => "#ff9800",
        Severity::Info => "#1976d2",
    };
    let time = DateTime::from_timestamp_millis(notification.timestamp as i64)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| notification.timestamp.to_string());

    let mut html = String::from("<html>\n<body style=\"font-family: Arial, sans-serif;\">\n");
    html.push_str(&format!(
        "<h2 style=\"color: {colour};\">{} ALERT</h2>\n",
        notification.severity.name().to_uppercase()
    ));

    match &notification.alert {
        Some(alert) => {
            html.push_str(&format!("<p><strong>Sensor:</strong> {}</p>\n", escape(&alert.sensor)));
            html.push_str(&format!("<p><strong>Current Value:</strong> {:.2}</p>\n", alert.value));
            html.push_str(&format!("<p><strong>Threshold:</strong> {:.2}</p>\n", alert.threshold_crossed));
        }
        None => html.push_str(&format!("<p>{}</p>\n", escape(&notification.message))),
    }
    html.push_str(&format!("<p><strong>Time:</strong> {time}</p>\n"));

    if !notification.recommendations.is_empty() {
        html.push_str("<h3>Recommended Actions:</h3>\n<ul>\n");
        for step in &notification.recommendations {
            html.push_str(&format!("<li>{}</li>\n", escape(step)));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("<p><em>This is an automated alert from your aquaponics monitoring system.</em></p>\n");
    html.push_str("</body>\n</html>\n");
    html
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
