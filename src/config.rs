//! Application configuration loaded from environment variables
//!
//! All runtime configuration comes from the environment, read once at
//! startup and immutable afterwards:
//!
//! - `FROM_NAME`: display name for the sender identity
//! - `FROM_EMAIL`: sender address
//! - `RESEND_API_KEY`: email provider API key (optional; sends fail without it)
//! - `WEBHOOK_SIGNING_SECRET`: webhook signing secret (optional; verification
//!   fails per-request without it, the process still starts)
//! - `PORT`: listen port (optional, CLI flag takes precedence)
//!
//! The signing secret and API key being absent is a request-time failure,
//! never a startup crash: the webhook endpoint answers 401 and the invoice
//! endpoint answers 500 until they are provided.

use std::env;

use crate::error::ConfigError;

/// Default sender display name when `FROM_NAME` is unset
pub const DEFAULT_FROM_NAME: &str = "Invoice Relay";

/// Default sender address when `FROM_EMAIL` is unset
pub const DEFAULT_FROM_EMAIL: &str = "onboarding@resend.dev";

/// Process-wide configuration, read-only after initialization
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Sender display name
    pub from_name: String,

    /// Sender address
    pub from_email: String,

    /// Email provider API key, if configured
    pub api_key: Option<String>,

    /// Webhook signing secret, if configured
    pub signing_secret: Option<String>,

    /// Listen port from the environment, if set
    pub port: Option<u16>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidVar` if `PORT` is set but not a valid
    /// port number. Absent optional variables are not errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(raw) => Some(raw.parse::<u16>().map_err(|e| ConfigError::InvalidVar {
                var: "PORT",
                reason: e.to_string(),
            })?),
            Err(_) => None,
        };

        Ok(Self {
            from_name: env::var("FROM_NAME").unwrap_or_else(|_| DEFAULT_FROM_NAME.to_string()),
            from_email: env::var("FROM_EMAIL").unwrap_or_else(|_| DEFAULT_FROM_EMAIL.to_string()),
            api_key: env::var("RESEND_API_KEY").ok().filter(|s| !s.is_empty()),
            signing_secret: env::var("WEBHOOK_SIGNING_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            port,
        })
    }

    /// The sender identity in `Name <address>` form used on outbound mail
    pub fn sender(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            from_name: DEFAULT_FROM_NAME.to_string(),
            from_email: DEFAULT_FROM_EMAIL.to_string(),
            api_key: None,
            signing_secret: None,
            port: None,
        }
    }
}
