//! Error types for Invoice Relay
//!
//! This module provides the error type hierarchy using `thiserror` for
//! proper error handling across all components.

use thiserror::Error;

/// The main error type for Invoice Relay operations
#[derive(Error, Debug)]
pub enum Error {
    /// Client input malformed (missing required fields)
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Webhook verification errors
    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    /// Document rendering errors
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Email delivery errors
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Request validation failure listing every missing field at once
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Missing required fields: {}", missing.join(", "))]
pub struct ValidationError {
    /// Names of the request fields that were absent or empty
    pub missing: Vec<String>,
}

impl ValidationError {
    /// Create a validation error from the collected missing field names
    pub fn new(missing: Vec<String>) -> Self {
        Self { missing }
    }
}

/// Webhook signature verification errors
///
/// Every variant maps to HTTP 401 at the boundary with a uniform body;
/// the distinguishing detail is logged server-side only.
#[derive(Error, Debug)]
pub enum WebhookError {
    /// Signing secret absent or still set to the documentation placeholder
    #[error("Webhook signing secret is not configured")]
    NotConfigured,

    /// One or more of the id/timestamp/signature headers is absent
    #[error("Missing webhook headers")]
    MissingHeaders,

    /// Secret material could not be decoded into key bytes
    #[error("Webhook signing secret is not valid base64")]
    InvalidSecret,

    /// No signature token matched the computed HMAC
    #[error("Signature mismatch")]
    InvalidSignature,

    /// Timestamp header is not a unix timestamp
    #[error("Invalid timestamp header")]
    InvalidTimestamp,

    /// Timestamp outside the tolerance window
    #[error("Timestamp outside of tolerance window ({skew_secs}s skew)")]
    ExpiredSignature {
        /// Observed absolute skew from server time, in seconds
        skew_secs: i64,
    },

    /// Body is not a valid event envelope
    #[error("Malformed event payload: {0}")]
    MalformedPayload(String),
}

/// Document rendering errors
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The rendering backend stopped before signalling end-of-stream
    #[error("Rendering backend failed: {0}")]
    Backend(String),
}

impl DocumentError {
    /// Create a backend error from a string
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        DocumentError::Backend(msg.into())
    }
}

/// Email delivery errors
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The provider rejected the send
    #[error("Email provider returned {status}: {message}")]
    Api {
        /// HTTP status returned by the provider
        status: u16,
        /// Provider error body
        message: String,
    },

    /// The request never reached the provider
    #[error("Email transport error: {0}")]
    Transport(String),

    /// No API key configured for the provider client
    #[error("Email provider API key is not configured")]
    NoApiKey,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is absent
    #[error("{0} environment variable not set")]
    MissingVar(&'static str),

    /// An environment variable holds an unusable value
    #[error("Invalid value for {var}: {reason}")]
    InvalidVar {
        /// Variable name
        var: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Result type alias for Invoice Relay operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        DeliveryError::Transport(err.to_string())
    }
}
