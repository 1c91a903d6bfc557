//! Provider Event Types
//!
//! Strongly-typed representations of the email provider's delivery-status
//! webhook events.

use std::str::FromStr;

use serde::Deserialize;

use crate::error::WebhookError;

/// Event kinds the provider pushes (wire names are `email.<kind>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Message accepted by the provider
    Sent,
    /// Message reached the recipient server
    Delivered,
    /// Delivery attempt deferred by the recipient server
    DeliveryDelayed,
    /// Provider gave up on the send
    Failed,
    /// Recipient server rejected the message
    Bounced,
    /// Recipient marked the message as spam
    Complained,
    /// A tracked link was clicked
    Clicked,
    /// A scheduled send was registered
    Scheduled,
    /// Recipient is on the suppression list
    Suppressed,
    /// Message was opened
    Opened,
    /// Inbound message received
    Received,

    /// Catch-all for event types we don't explicitly handle
    Unknown,
}

impl FromStr for EventKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "email.sent" => Self::Sent,
            "email.delivered" => Self::Delivered,
            "email.delivery_delayed" => Self::DeliveryDelayed,
            "email.failed" => Self::Failed,
            "email.bounced" => Self::Bounced,
            "email.complained" => Self::Complained,
            "email.clicked" => Self::Clicked,
            "email.scheduled" => Self::Scheduled,
            "email.suppressed" => Self::Suppressed,
            "email.opened" => Self::Opened,
            "email.received" => Self::Received,
            _ => Self::Unknown,
        })
    }
}

impl EventKind {
    /// Get the wire-format string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "email.sent",
            Self::Delivered => "email.delivered",
            Self::DeliveryDelayed => "email.delivery_delayed",
            Self::Failed => "email.failed",
            Self::Bounced => "email.bounced",
            Self::Complained => "email.complained",
            Self::Clicked => "email.clicked",
            Self::Scheduled => "email.scheduled",
            Self::Suppressed => "email.suppressed",
            Self::Opened => "email.opened",
            Self::Received => "email.received",
            Self::Unknown => "unknown",
        }
    }

    /// Check if this is a known event kind
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// The provider's event envelope as decoded from the raw webhook body
#[derive(Debug, Clone, Deserialize)]
pub struct EventEnvelope {
    /// Raw event type string
    #[serde(rename = "type")]
    pub event_type: String,

    /// When the provider emitted the event
    #[serde(default)]
    pub created_at: Option<String>,

    /// Event payload
    #[serde(default)]
    pub data: EventData,
}

/// Event payload carried under `data`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventData {
    /// Provider identifier of the email the event concerns
    #[serde(default)]
    pub email_id: Option<String>,

    /// Provider-reported error detail (failed/bounced events)
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl EventEnvelope {
    /// Parse from raw JSON bytes. A body that is not valid JSON, or that
    /// lacks a `type` field, is a malformed payload.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(bytes).map_err(|e| WebhookError::MalformedPayload(e.to_string()))
    }
}

/// An authenticated provider event.
///
/// Only the signature verifier can construct one: there is deliberately no
/// public constructor and no `Deserialize` impl on this wrapper, so no
/// code path can synthesize a verified event from unverified input.
#[derive(Debug, Clone)]
pub struct VerifiedEvent {
    envelope: EventEnvelope,
}

impl VerifiedEvent {
    /// Wrap an envelope that passed signature verification.
    pub(super) fn new(envelope: EventEnvelope) -> Self {
        Self { envelope }
    }

    /// The typed event kind
    pub fn kind(&self) -> EventKind {
        // Infallible error type means this can never fail
        EventKind::from_str(&self.envelope.event_type).unwrap()
    }

    /// The raw event type string as the provider sent it
    pub fn event_type(&self) -> &str {
        &self.envelope.event_type
    }

    /// Provider identifier of the email the event concerns
    pub fn email_id(&self) -> Option<&str> {
        self.envelope.data.email_id.as_deref()
    }

    /// Provider-reported error detail, flattened to a string.
    ///
    /// The provider sends either a bare string or an object with a
    /// `message` field; anything else is carried verbatim as JSON.
    pub fn error_detail(&self) -> Option<String> {
        let value = self.envelope.data.error.as_ref()?;
        match value {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(map) => map
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .or_else(|| Some(value.to_string())),
            other => Some(other.to_string()),
        }
    }
}
