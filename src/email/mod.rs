//! Outbound Email Capability
//!
//! The pipeline talks to the email provider through the [`EmailSender`]
//! trait so the transport is an injected collaborator, constructed at
//! process start, never a hidden lazily-created singleton. Production
//! uses [`ResendClient`]; [`NoopSender`] serves local runs without an
//! API key and tests.

pub mod resend;
pub mod template;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DeliveryError;

pub use resend::ResendClient;
pub use template::{
    format_currency, invoice_email_html, invoice_subject, receipt_email_html, receipt_subject,
};

/// A document attached to an outbound email
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Content-disposition filename
    pub filename: String,
    /// Base64-encoded body
    pub content: String,
}

/// One outbound email, fully assembled
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    /// Sender identity, `Name <address>` form
    pub from: String,
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html: String,
    /// Optional attachment
    pub attachment: Option<Attachment>,
    /// Deliver at this instant instead of immediately
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Provider acknowledgement of an accepted send
#[derive(Debug, Clone)]
pub struct SentEmail {
    /// Provider identifier for the message
    pub id: String,
}

/// Capability interface for the outbound email transport
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Hand one email to the provider.
    async fn send(&self, email: OutgoingEmail) -> Result<SentEmail, DeliveryError>;
}

/// Sender that logs instead of delivering.
///
/// Used when no provider API key is configured so the service still
/// starts and the invoice path can be exercised end to end.
#[derive(Debug, Clone, Default)]
pub struct NoopSender;

#[async_trait]
impl EmailSender for NoopSender {
    async fn send(&self, email: OutgoingEmail) -> Result<SentEmail, DeliveryError> {
        let id = format!("noop-{:08x}", rand::random::<u32>());
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            attachment = email.attachment.as_ref().map(|a| a.filename.as_str()).unwrap_or("-"),
            scheduled_at = ?email.scheduled_at,
            id = %id,
            "email send skipped (no API key configured)"
        );
        Ok(SentEmail { id })
    }
}
