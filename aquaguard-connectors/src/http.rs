//! HTTP Transport for Notification Channels
//!
//! ## Overview
//!
//! Email and SMS providers are reached through their REST APIs. This module
//! holds the shared plumbing: endpoint configuration, authentication and a
//! small client that posts JSON or form bodies.
//!
//! ## Implementation Choices
//!
//! - `ureq` is a blocking client. Requests run on tokio's blocking pool via
//!   `spawn_blocking`, so a slow provider ties up a pool thread, not the
//!   runtime.
//! - The agent timeout bounds the request itself. The dispatcher applies its
//!   own, usually shorter, budget on top.
//! - No retries. A notification that fails is logged and dropped.
//!
//! ## Example Usage
//!
//! ```rust
//! use aquaguard_connectors::http::{AuthMethod, HttpClient, HttpConfig};
//!
//! let config = HttpConfig::new("https://api.example.com/v1/messages")
//!     .bearer_token("your-api-token")
//!     .timeout_secs(10)
//!     .header("X-Farm", "greenhouse-2");
//!
//! let client = HttpClient::new(config).unwrap();
//! assert!(matches!(client.config().auth, AuthMethod::Bearer(_)));
//! ```

use std::collections::HashMap;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;

use crate::ChannelError;

/// Default request timeout for provider APIs
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// HTTP endpoint configuration
#[derive(Clone)]
pub struct HttpConfig {
    /// Full URL requests are posted to
    pub url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Authentication method
    pub auth: AuthMethod,
    /// Custom headers
    pub headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

/// Authentication methods
#[derive(Clone)]
pub enum AuthMethod {
    /// No authentication
    None,
    /// Bearer token
    Bearer(String),
    /// Basic authentication
    Basic { username: String, password: String },
    /// API key in header
    ApiKey { header: String, value: String },
}

// Credentials stay out of debug output
impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMethod::None => f.write_str("None"),
            AuthMethod::Bearer(_) => f.write_str("Bearer(***)"),
            AuthMethod::Basic { username, .. } => write!(f, "Basic({username}:***)"),
            AuthMethod::ApiKey { header, .. } => write!(f, "ApiKey({header}: ***)"),
        }
    }
}

impl std::fmt::Debug for HttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConfig")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl HttpConfig {
    /// Create new configuration for `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            auth: AuthMethod::None,
            headers: HashMap::new(),
            user_agent: format!("AquaGuard/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set bearer token authentication
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = AuthMethod::Bearer(token.into());
        self
    }

    /// Set basic authentication
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Basic {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    /// Set API key authentication
    pub fn api_key(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.auth = AuthMethod::ApiKey {
            header: header.into(),
            value: value.into(),
        };
        self
    }

    /// Set request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Add custom header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Request body
enum Body {
    Json(String),
    Form(Vec<(String, String)>),
}

/// Posts to one endpoint with a lightweight ureq agent
#[derive(Clone)]
pub struct HttpClient {
    config: HttpConfig,
    agent: ureq::Agent,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").field("config", &self.config).finish()
    }
}

impl HttpClient {
    /// Create new client, rejecting URLs that are not http(s)
    pub fn new(config: HttpConfig) -> Result<Self, ChannelError> {
        if !config.url.starts_with("http://") && !config.url.starts_with("https://") {
            return Err(ChannelError::Config("URL must start with http:// or https://".into()));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();

        Ok(Self { config, agent })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// POST `data` as JSON
    pub async fn post_json<T: Serialize>(&self, data: &T) -> Result<(), ChannelError> {
        let json = serde_json::to_string(data)?;
        self.execute(Body::Json(json)).await
    }

    /// POST an `application/x-www-form-urlencoded` body
    pub async fn post_form(&self, fields: Vec<(String, String)>) -> Result<(), ChannelError> {
        self.execute(Body::Form(fields)).await
    }

    /// Value of the `Authorization` header, if any
    pub fn authorization(&self) -> Option<String> {
        match &self.config.auth {
            AuthMethod::Bearer(token) => Some(format!("Bearer {token}")),
            AuthMethod::Basic { username, password } => {
                Some(format!("Basic {}", STANDARD.encode(format!("{username}:{password}"))))
            }
            AuthMethod::None | AuthMethod::ApiKey { .. } => None,
        }
    }

    /// Build request with authentication and headers
    fn build_request(&self) -> ureq::Request {
        let mut request = self.agent.post(&self.config.url);

        if let Some(value) = self.authorization() {
            request = request.set("Authorization", &value);
        }
        if let AuthMethod::ApiKey { header, value } = &self.config.auth {
            request = request.set(header, value);
        }
        for (name, value) in &self.config.headers {
            request = request.set(name, value);
        }

        request.set("Accept", "application/json")
    }

    async fn execute(&self, body: Body) -> Result<(), ChannelError> {
        let request = self.build_request();

        let response = tokio::task::spawn_blocking(move || match body {
            Body::Json(json) => request.set("Content-Type", "application/json").send_string(&json),
            Body::Form(fields) => {
                let pairs: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                request.send_form(&pairs)
            }
        })
        .await
        .map_err(|e| ChannelError::Task(e.to_string()))?;

        match response {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(status, resp)) => Err(ChannelError::Status {
                status,
                message: resp.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(e)) => Err(ChannelError::Transport(e.to_string())),
        }
    }
}
