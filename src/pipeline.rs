//! Invoice pipeline.
//!
//! Orchestrates one invoice request end to end: validate, total, generate
//! an id, render the document, send it, and optionally schedule the
//! receipt email. The primary send is awaited and fatal on failure; the
//! scheduled receipt is best-effort and degrades to a null identifier.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::document::DocumentLayoutEngine;
use crate::email::{
    invoice_email_html, invoice_subject, receipt_email_html, receipt_subject, Attachment,
    EmailSender, OutgoingEmail,
};
use crate::error::{Error, ValidationError};
use crate::invoice::{Invoice, InvoiceId, LineItem};

/// Receipt delay applied when `delay_minutes` is absent or non-numeric
pub const DEFAULT_RECEIPT_DELAY_MINUTES: f64 = 1.0;

/// An invoice creation request as received on the wire.
///
/// Every field is optional at the type level so validation can report
/// all missing fields in one pass instead of failing at deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceRequest {
    /// Billable rows
    #[serde(default, rename = "lineItems")]
    pub line_items: Option<Vec<LineItem>>,

    /// Client display name
    #[serde(default, rename = "clientName")]
    pub client_name: Option<String>,

    /// Client address
    #[serde(default, rename = "clientEmail")]
    pub client_email: Option<String>,

    /// Request a delayed receipt email after the invoice send
    #[serde(default)]
    pub schedule_receipt: Option<bool>,

    /// Receipt delay in minutes; non-numeric values fall back to the default
    #[serde(default)]
    pub delay_minutes: Option<serde_json::Value>,
}

/// The outcome of a processed invoice request
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Generated invoice identifier
    pub invoice_id: InvoiceId,
    /// Exact invoice total
    pub total: f64,
    /// Sender identity the emails went out under
    pub from: String,
    /// Recipient address
    pub to: String,
    /// Outer `None`: no receipt requested. Inner `None`: requested but
    /// the scheduled send failed (degraded, not fatal).
    pub scheduled_email_id: Option<Option<String>>,
}

/// Orchestrates id generation, rendering, and delivery for one request.
pub struct InvoicePipeline {
    config: AppConfig,
    sender: Arc<dyn EmailSender>,
}

impl InvoicePipeline {
    /// Build a pipeline around an injected email capability.
    pub fn new(config: AppConfig, sender: Arc<dyn EmailSender>) -> Self {
        Self { config, sender }
    }

    /// Process one invoice request.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] listing every missing field at once
    /// - [`Error::Document`] if rendering fails
    /// - [`Error::Delivery`] if the primary send fails
    ///
    /// A failed scheduled receipt is NOT an error; it degrades to
    /// `scheduled_email_id: Some(None)`.
    pub async fn process(&self, request: InvoiceRequest) -> Result<PipelineResult, Error> {
        let (line_items, client_name, client_email) = validate(&request)?;

        let invoice = Invoice::new(
            InvoiceId::generate(),
            client_name.to_string(),
            client_email.to_string(),
            line_items.to_vec(),
        );
        tracing::info!(
            invoice_id = %invoice.id,
            to = %invoice.client_email,
            total = invoice.total,
            items = invoice.line_items.len(),
            "processing invoice"
        );

        let document = DocumentLayoutEngine::render(&invoice).await?;

        let from = self.config.sender();
        let sent = self
            .sender
            .send(OutgoingEmail {
                from: from.clone(),
                to: invoice.client_email.clone(),
                subject: invoice_subject(&invoice.id, &self.config.from_name),
                html: invoice_email_html(
                    &invoice.client_name,
                    &invoice.id,
                    invoice.total,
                    &self.config.from_name,
                ),
                attachment: Some(Attachment {
                    filename: document.filename.clone(),
                    content: BASE64.encode(&document.bytes),
                }),
                scheduled_at: None,
            })
            .await?;
        tracing::info!(invoice_id = %invoice.id, email_id = %sent.id, "invoice email sent");

        let scheduled_email_id = if request.schedule_receipt.unwrap_or(false) {
            Some(self.schedule_receipt(&invoice, &from, &request).await)
        } else {
            None
        };

        Ok(PipelineResult {
            invoice_id: invoice.id,
            total: invoice.total,
            from,
            to: invoice.client_email,
            scheduled_email_id,
        })
    }

    /// Best-effort scheduled receipt send. Returns the provider id, or
    /// `None` when the send failed.
    async fn schedule_receipt(
        &self,
        invoice: &Invoice,
        from: &str,
        request: &InvoiceRequest,
    ) -> Option<String> {
        let delay_minutes = request
            .delay_minutes
            .as_ref()
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(DEFAULT_RECEIPT_DELAY_MINUTES);
        let scheduled_at = Utc::now() + chrono::Duration::milliseconds((delay_minutes * 60_000.0) as i64);

        let result = self
            .sender
            .send(OutgoingEmail {
                from: from.to_string(),
                to: invoice.client_email.clone(),
                subject: receipt_subject(&invoice.id),
                html: receipt_email_html(
                    &invoice.client_name,
                    &invoice.id,
                    invoice.total,
                    &self.config.from_name,
                ),
                attachment: None,
                scheduled_at: Some(scheduled_at),
            })
            .await;

        match result {
            Ok(sent) => {
                tracing::info!(
                    invoice_id = %invoice.id,
                    email_id = %sent.id,
                    %scheduled_at,
                    "receipt email scheduled"
                );
                Some(sent.id)
            }
            Err(e) => {
                tracing::warn!(invoice_id = %invoice.id, error = %e, "receipt scheduling failed");
                None
            }
        }
    }
}

/// Collect every missing required field before rejecting the request.
fn validate(
    request: &InvoiceRequest,
) -> Result<(&[LineItem], &str, &str), ValidationError> {
    let mut missing = Vec::new();

    let line_items = match request.line_items.as_deref() {
        Some(items) if !items.is_empty() => Some(items),
        _ => {
            missing.push("lineItems".to_string());
            None
        }
    };
    let client_name = match request.client_name.as_deref() {
        Some(name) if !name.is_empty() => Some(name),
        _ => {
            missing.push("clientName".to_string());
            None
        }
    };
    let client_email = match request.client_email.as_deref() {
        Some(email) if !email.is_empty() => Some(email),
        _ => {
            missing.push("clientEmail".to_string());
            None
        }
    };

    match (line_items, client_name, client_email) {
        (Some(items), Some(name), Some(email)) => Ok((items, name, email)),
        _ => Err(ValidationError::new(missing)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::SentEmail;
    use crate::error::DeliveryError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Capturing sender; optionally fails the nth send (0-based).
    struct RecordingSender {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail_on: Option<usize>,
    }

    impl RecordingSender {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_on: None,
            }
        }

        fn failing_on(n: usize) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_on: Some(n),
            }
        }

        fn emails(&self) -> Vec<OutgoingEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EmailSender for RecordingSender {
        async fn send(&self, email: OutgoingEmail) -> Result<SentEmail, DeliveryError> {
            let mut sent = self.sent.lock().unwrap();
            let n = sent.len();
            sent.push(email);
            if self.fail_on == Some(n) {
                return Err(DeliveryError::Api {
                    status: 500,
                    message: "provider down".to_string(),
                });
            }
            Ok(SentEmail {
                id: format!("email-{n}"),
            })
        }
    }

    fn request() -> InvoiceRequest {
        InvoiceRequest {
            line_items: Some(vec![
                LineItem {
                    description: "Design".to_string(),
                    quantity: 10.0,
                    rate: 50.0,
                },
                LineItem {
                    description: "Dev".to_string(),
                    quantity: 5.0,
                    rate: 80.0,
                },
            ]),
            client_name: Some("Acme Corp".to_string()),
            client_email: Some("ap@acme.test".to_string()),
            schedule_receipt: None,
            delay_minutes: None,
        }
    }

    fn pipeline(sender: Arc<RecordingSender>) -> InvoicePipeline {
        InvoicePipeline::new(AppConfig::default(), sender)
    }

    #[tokio::test]
    async fn test_happy_path_sends_one_email_with_attachment() {
        let sender = Arc::new(RecordingSender::new());
        let result = pipeline(sender.clone()).process(request()).await.unwrap();

        assert_eq!(result.total, 900.0);
        assert_eq!(result.to, "ap@acme.test");
        assert!(result.scheduled_email_id.is_none());

        let emails = sender.emails();
        assert_eq!(emails.len(), 1);
        let attachment = emails[0].attachment.as_ref().unwrap();
        assert_eq!(attachment.filename, result.invoice_id.filename());
        let pdf = BASE64.decode(&attachment.content).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_validation_lists_all_missing_fields() {
        let sender = Arc::new(RecordingSender::new());
        let err = pipeline(sender.clone())
            .process(InvoiceRequest::default())
            .await
            .unwrap_err();

        match err {
            Error::Validation(v) => {
                assert_eq!(v.missing, vec!["lineItems", "clientName", "clientEmail"]);
            }
            other => panic!("expected validation error, got {other}"),
        }
        assert!(sender.emails().is_empty(), "no send on validation failure");
    }

    #[tokio::test]
    async fn test_validation_lists_only_the_missing_field() {
        let sender = Arc::new(RecordingSender::new());
        let mut req = request();
        req.client_email = None;
        let err = pipeline(sender).process(req).await.unwrap_err();

        match err {
            Error::Validation(v) => assert_eq!(v.missing, vec!["clientEmail"]),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_line_items_is_missing() {
        let sender = Arc::new(RecordingSender::new());
        let mut req = request();
        req.line_items = Some(vec![]);
        let err = pipeline(sender).process(req).await.unwrap_err();
        match err {
            Error::Validation(v) => assert_eq!(v.missing, vec!["lineItems"]),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_scheduled_receipt_defaults_to_one_minute() {
        let sender = Arc::new(RecordingSender::new());
        let mut req = request();
        req.schedule_receipt = Some(true);

        let before = Utc::now();
        let result = pipeline(sender.clone()).process(req).await.unwrap();
        let after = Utc::now();

        assert_eq!(result.scheduled_email_id, Some(Some("email-1".to_string())));

        let emails = sender.emails();
        assert_eq!(emails.len(), 2);
        let scheduled_at = emails[1].scheduled_at.unwrap();
        assert!(scheduled_at >= before + chrono::Duration::seconds(59));
        assert!(scheduled_at <= after + chrono::Duration::seconds(61));
        assert!(emails[1].attachment.is_none());
    }

    #[tokio::test]
    async fn test_non_numeric_delay_falls_back_to_default() {
        let sender = Arc::new(RecordingSender::new());
        let mut req = request();
        req.schedule_receipt = Some(true);
        req.delay_minutes = Some(serde_json::json!("soon"));

        let before = Utc::now();
        pipeline(sender.clone()).process(req).await.unwrap();

        let scheduled_at = sender.emails()[1].scheduled_at.unwrap();
        assert!(scheduled_at >= before + chrono::Duration::seconds(59));
    }

    #[tokio::test]
    async fn test_numeric_delay_is_honored() {
        let sender = Arc::new(RecordingSender::new());
        let mut req = request();
        req.schedule_receipt = Some(true);
        req.delay_minutes = Some(serde_json::json!(10));

        let before = Utc::now();
        pipeline(sender.clone()).process(req).await.unwrap();

        let scheduled_at = sender.emails()[1].scheduled_at.unwrap();
        assert!(scheduled_at >= before + chrono::Duration::seconds(599));
    }

    #[tokio::test]
    async fn test_primary_send_failure_aborts() {
        let sender = Arc::new(RecordingSender::failing_on(0));
        let err = pipeline(sender).process(request()).await.unwrap_err();
        assert!(matches!(err, Error::Delivery(_)));
    }

    #[tokio::test]
    async fn test_receipt_failure_degrades_to_null_id() {
        let sender = Arc::new(RecordingSender::failing_on(1));
        let mut req = request();
        req.schedule_receipt = Some(true);

        let result = pipeline(sender.clone()).process(req).await.unwrap();
        assert_eq!(result.scheduled_email_id, Some(None));
        assert_eq!(sender.emails().len(), 2);
    }
}
