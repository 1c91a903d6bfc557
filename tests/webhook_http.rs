//! Webhook endpoint integration tests
//!
//! These drive the full HTTP path: a live server on an ephemeral port,
//! real signatures computed with the same scheme the provider uses, and
//! assertions on status codes and response bodies.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;

use invoice_relay::config::AppConfig;
use invoice_relay::email::NoopSender;
use invoice_relay::pipeline::InvoicePipeline;
use invoice_relay::server::{app_router, AppState};
use invoice_relay::webhook::{SignatureVerifier, TOLERANCE_SECS};

fn test_secret() -> String {
    format!("whsec_{}", BASE64.encode(b"integration-test-signing-key"))
}

fn signer() -> SignatureVerifier {
    SignatureVerifier::new(Some(&test_secret())).expect("test secret is valid")
}

/// Start the app with the given signing secret; returns its base URL.
async fn spawn_app(signing_secret: Option<String>) -> String {
    let config = AppConfig {
        signing_secret,
        ..AppConfig::default()
    };
    let pipeline = InvoicePipeline::new(config.clone(), Arc::new(NoopSender));
    let app = app_router(Arc::new(AppState { config, pipeline }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server error");
    });

    format!("http://{addr}")
}

async fn post_webhook(
    base: &str,
    body: &[u8],
    headers: &[(&str, &str)],
) -> (reqwest::StatusCode, serde_json::Value) {
    let client = reqwest::Client::new();
    let mut request = client
        .post(format!("{base}/webhooks/resend"))
        .body(body.to_vec());
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let response = request.send().await.expect("request failed");
    let status = response.status();
    let json = response
        .json::<serde_json::Value>()
        .await
        .unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_valid_signature_answers_200_with_type() {
    let base = spawn_app(Some(test_secret())).await;
    let body = br#"{"type":"email.delivered","data":{"email_id":"mail-7"}}"#;
    let ts = Utc::now().timestamp().to_string();
    let sig = signer().sign("msg_1", &ts, body);

    let (status, json) = post_webhook(
        &base,
        body,
        &[
            ("svix-id", "msg_1"),
            ("svix-timestamp", &ts),
            ("svix-signature", &sig),
        ],
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(json["received"], true);
    assert_eq!(json["type"], "email.delivered");
}

#[tokio::test]
async fn test_unrecognized_event_type_still_answers_200() {
    let base = spawn_app(Some(test_secret())).await;
    let body = br#"{"type":"contact.created","data":{}}"#;
    let ts = Utc::now().timestamp().to_string();
    let sig = signer().sign("msg_2", &ts, body);

    let (status, json) = post_webhook(
        &base,
        body,
        &[
            ("svix-id", "msg_2"),
            ("svix-timestamp", &ts),
            ("svix-signature", &sig),
        ],
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(json["type"], "contact.created");
}

#[tokio::test]
async fn test_bad_signature_answers_401() {
    let base = spawn_app(Some(test_secret())).await;
    let body = br#"{"type":"email.delivered","data":{}}"#;
    let ts = Utc::now().timestamp().to_string();

    let (status, json) = post_webhook(
        &base,
        body,
        &[
            ("svix-id", "msg_3"),
            ("svix-timestamp", &ts),
            ("svix-signature", "v1,ZGVmaW5pdGVseSBub3QgdmFsaWQ="),
        ],
    )
    .await;

    assert_eq!(status, 401);
    assert_eq!(json["error"], "Invalid signature");
}

#[tokio::test]
async fn test_missing_headers_answer_401() {
    let base = spawn_app(Some(test_secret())).await;
    let body = br#"{"type":"email.delivered","data":{}}"#;

    let (status, _) = post_webhook(&base, body, &[("svix-id", "msg_4")]).await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn test_stale_timestamp_answers_401_even_with_valid_signature() {
    let base = spawn_app(Some(test_secret())).await;
    let body = br#"{"type":"email.delivered","data":{}}"#;
    let stale = (Utc::now().timestamp() - TOLERANCE_SECS - 120).to_string();
    let sig = signer().sign("msg_5", &stale, body);

    let (status, _) = post_webhook(
        &base,
        body,
        &[
            ("svix-id", "msg_5"),
            ("svix-timestamp", &stale),
            ("svix-signature", &sig),
        ],
    )
    .await;

    assert_eq!(status, 401);
}

#[tokio::test]
async fn test_tampered_body_answers_401() {
    let base = spawn_app(Some(test_secret())).await;
    let body = br#"{"type":"email.delivered","data":{"email_id":"mail-9"}}"#;
    let ts = Utc::now().timestamp().to_string();
    let sig = signer().sign("msg_6", &ts, body);

    let mut tampered = body.to_vec();
    let last = tampered.len() - 2;
    tampered[last] = b'X';

    let (status, _) = post_webhook(
        &base,
        &tampered,
        &[
            ("svix-id", "msg_6"),
            ("svix-timestamp", &ts),
            ("svix-signature", &sig),
        ],
    )
    .await;

    assert_eq!(status, 401);
}

#[tokio::test]
async fn test_multiple_tokens_verify_when_one_matches() {
    let base = spawn_app(Some(test_secret())).await;
    let body = br#"{"type":"email.bounced","data":{"email_id":"mail-10","error":{"message":"550"}}}"#;
    let ts = Utc::now().timestamp().to_string();
    let good = signer().sign("msg_7", &ts, body);
    let header = format!("v1,Z2FyYmFnZQ== {good} v2,aWdub3JlZA==");

    let (status, json) = post_webhook(
        &base,
        body,
        &[
            ("svix-id", "msg_7"),
            ("svix-timestamp", &ts),
            ("svix-signature", &header),
        ],
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(json["type"], "email.bounced");
}

#[tokio::test]
async fn test_unconfigured_secret_answers_401() {
    let base = spawn_app(None).await;
    let body = br#"{"type":"email.delivered","data":{}}"#;

    // Headers present and well-formed; rejection must come from the
    // missing secret alone.
    let ts = Utc::now().timestamp().to_string();
    let (status, _) = post_webhook(
        &base,
        body,
        &[
            ("svix-id", "msg_8"),
            ("svix-timestamp", &ts),
            ("svix-signature", "v1,YWJj"),
        ],
    )
    .await;

    assert_eq!(status, 401);
}

#[tokio::test]
async fn test_empty_body_answers_400() {
    let base = spawn_app(Some(test_secret())).await;
    let (status, json) = post_webhook(&base, b"", &[]).await;
    assert_eq!(status, 400);
    assert_eq!(json["error"], "Missing request body");
}
