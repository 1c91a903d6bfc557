//! HTTP surface for the invoice service.
//!
//! Three routes:
//! - `GET /` — liveness probe
//! - `POST /invoice` — invoice creation (JSON body)
//! - `POST /webhooks/resend` — provider delivery-status callbacks; takes
//!   the raw, unparsed body because signature verification must see the
//!   original bytes
//!
//! Error mapping: validation failures answer 400 listing every missing
//! field; every webhook verification failure answers 401 with one uniform
//! body (the distinguishing detail is logged server-side only, to avoid
//! aiding forgery attempts); rendering and delivery failures answer 500.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, warn};

use crate::config::AppConfig;
use crate::error::Error;
use crate::pipeline::{InvoicePipeline, InvoiceRequest};
use crate::webhook::{route, SignatureVerifier, WebhookHeaders, HEADER_ID, HEADER_SIGNATURE, HEADER_TIMESTAMP};

/// Shared application state: read-only configuration plus the pipeline
/// with its injected email capability.
pub struct AppState {
    /// Process-wide configuration
    pub config: AppConfig,
    /// Invoice pipeline
    pub pipeline: InvoicePipeline,
}

/// Wire shape of a successful invoice response
#[derive(Debug, Serialize)]
struct InvoiceResponse {
    success: bool,
    #[serde(rename = "invoiceId")]
    invoice_id: String,
    invoice_total: f64,
    from: String,
    to: String,
    #[serde(rename = "scheduledEmailId", skip_serializing_if = "Option::is_none")]
    scheduled_email_id: Option<Option<String>>,
}

/// Build the application router.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/invoice", post(invoice_handler))
        .route("/webhooks/resend", post(webhook_handler))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Liveness probe.
///
/// # Route
/// `GET /`
async fn root_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Invoice creation endpoint.
///
/// # Route
/// `POST /invoice`
///
/// # Responses
/// - `200` `{success, invoiceId, invoice_total, from, to, scheduledEmailId?}`
/// - `400` listing every missing required field
/// - `500` with an error detail string on rendering/delivery failure
async fn invoice_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InvoiceRequest>,
) -> Response {
    match state.pipeline.process(request).await {
        Ok(result) => Json(InvoiceResponse {
            success: true,
            invoice_id: result.invoice_id.to_string(),
            invoice_total: result.total,
            from: result.from,
            to: result.to,
            scheduled_email_id: result.scheduled_email_id,
        })
        .into_response(),
        Err(Error::Validation(e)) => {
            debug!(missing = ?e.missing, "invoice request rejected");
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "invoice processing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to send invoice", "details": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Provider webhook endpoint.
///
/// # Route
/// `POST /webhooks/resend` (raw body)
///
/// # Responses
/// - `200` `{received: true, type}` for any verified event, recognized or not
/// - `400` on an empty body
/// - `401` on missing configuration or failed verification, with one
///   uniform body for every cause
async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if body.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing request body" })),
        )
            .into_response();
    }

    // Secret check precedes any header access.
    let verifier = match SignatureVerifier::new(state.config.signing_secret.as_deref()) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "webhook rejected: verifier unavailable");
            return unauthorized();
        }
    };

    let envelope = WebhookHeaders {
        id: header_str(&headers, HEADER_ID),
        timestamp: header_str(&headers, HEADER_TIMESTAMP),
        signature: header_str(&headers, HEADER_SIGNATURE),
    };

    match verifier.verify(&body, &envelope) {
        Ok(event) => {
            let outcome = route(&event);
            Json(json!({ "received": true, "type": outcome.raw_type })).into_response()
        }
        Err(e) => {
            warn!(error = %e, "webhook verification failed");
            unauthorized()
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// The single undistinguished 401 every verification failure maps to
fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Invalid signature" })),
    )
        .into_response()
}
