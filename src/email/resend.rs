//! Resend API client.
//!
//! Thin HTTP binding for the provider's `POST /emails` endpoint: bearer
//! auth, JSON body, base64 attachment content, RFC 3339 `scheduled_at`.
//! No retry or backoff; a failed send is the caller's problem to surface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{EmailSender, OutgoingEmail, SentEmail};
use crate::error::DeliveryError;

/// Provider endpoint for sending email
pub const DEFAULT_API_URL: &str = "https://api.resend.com/emails";

/// HTTP client for the Resend email API.
#[derive(Debug, Clone)]
pub struct ResendClient {
    http: reqwest::Client,
    api_key: String,
    api_url: String,
}

/// Wire shape of a send request
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachments: Option<Vec<WireAttachment<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scheduled_at: Option<String>,
}

#[derive(Debug, Serialize)]
struct WireAttachment<'a> {
    filename: &'a str,
    content: &'a str,
}

/// Wire shape of the provider acknowledgement
#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

impl ResendClient {
    /// Create a client for the production API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_api_url(api_key, DEFAULT_API_URL)
    }

    /// Create a client against a custom endpoint (test servers).
    pub fn with_api_url(api_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            api_url: api_url.into(),
        }
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    async fn send(&self, email: OutgoingEmail) -> Result<SentEmail, DeliveryError> {
        if self.api_key.is_empty() {
            return Err(DeliveryError::NoApiKey);
        }

        let payload = SendRequest {
            from: &email.from,
            to: vec![&email.to],
            subject: &email.subject,
            html: &email.html,
            attachments: email.attachment.as_ref().map(|a| {
                vec![WireAttachment {
                    filename: &a.filename,
                    content: &a.content,
                }]
            }),
            scheduled_at: email.scheduled_at.map(|at| at.to_rfc3339()),
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(DeliveryError::from)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %message, "email provider rejected send");
            return Err(DeliveryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SendResponse = response.json().await.map_err(DeliveryError::from)?;
        tracing::debug!(id = %body.id, to = %email.to, "email accepted by provider");
        Ok(SentEmail { id: body.id })
    }
}
