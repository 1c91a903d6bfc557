//! Webhook signature verification.
//!
//! Implements the provider's timestamped HMAC scheme: the signed content
//! is the exact byte concatenation `<id>.<timestamp>.<body>`, keyed with
//! the base64-decoded secret (after stripping its `whsec_` prefix), and
//! carried in a header of space-delimited `v1,<base64>` tokens.
//!
//! Security posture:
//! - Comparisons of secret-derived material are constant-time
//!   ([`Mac::verify_slice`]); absent, malformed and mismatching tokens all
//!   fall through to the same [`WebhookError::InvalidSignature`].
//! - A timestamp outside the tolerance window rejects an otherwise valid
//!   signature (replay/clock-skew protection).
//! - [`VerifiedEvent`] is only ever produced here.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::events::{EventEnvelope, VerifiedEvent};
use crate::error::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the provider message id
pub const HEADER_ID: &str = "svix-id";

/// Header carrying the unix timestamp the signature covers
pub const HEADER_TIMESTAMP: &str = "svix-timestamp";

/// Header carrying the space-delimited signature token list
pub const HEADER_SIGNATURE: &str = "svix-signature";

/// Replay/clock-skew tolerance either side of server time, in seconds
pub const TOLERANCE_SECS: i64 = 5 * 60;

/// Prefix the provider puts on signing secrets
const SECRET_PREFIX: &str = "whsec_";

/// The literal shipped in provider documentation samples; treated the
/// same as no secret at all
const PLACEHOLDER_SECRET: &str = "whsec_...";

/// Signature scheme version tokens are tagged with
const SIGNATURE_VERSION: &str = "v1";

/// The three identifying headers of a webhook envelope, as extracted by
/// the HTTP layer. Ephemeral; lives for one verification call.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebhookHeaders<'a> {
    /// `svix-id`
    pub id: Option<&'a str>,
    /// `svix-timestamp`
    pub timestamp: Option<&'a str>,
    /// `svix-signature`
    pub signature: Option<&'a str>,
}

/// Verifies signed webhook envelopes against a configured secret.
#[derive(Debug)]
pub struct SignatureVerifier {
    key: Vec<u8>,
}

impl SignatureVerifier {
    /// Build a verifier from the configured secret.
    ///
    /// # Errors
    ///
    /// - [`WebhookError::NotConfigured`] if the secret is absent, empty,
    ///   or still the documentation placeholder
    /// - [`WebhookError::InvalidSecret`] if the secret material does not
    ///   decode as base64
    pub fn new(secret: Option<&str>) -> Result<Self, WebhookError> {
        let secret = secret.ok_or(WebhookError::NotConfigured)?;
        if secret.is_empty() || secret == PLACEHOLDER_SECRET {
            return Err(WebhookError::NotConfigured);
        }

        let material = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
        let key = BASE64
            .decode(material)
            .map_err(|_| WebhookError::InvalidSecret)?;

        Ok(Self { key })
    }

    /// Verify a webhook envelope and decode the typed event.
    ///
    /// Synchronous and pure given its inputs (modulo the clock read for
    /// the tolerance check). Every failure is a typed [`WebhookError`];
    /// a [`VerifiedEvent`] is produced only when a signature token
    /// matches, the timestamp is within tolerance, and the body decodes
    /// as an event envelope.
    pub fn verify(
        &self,
        raw_body: &[u8],
        headers: &WebhookHeaders<'_>,
    ) -> Result<VerifiedEvent, WebhookError> {
        let (id, timestamp, signature) = match (headers.id, headers.timestamp, headers.signature) {
            (Some(id), Some(ts), Some(sig)) => (id, ts, sig),
            _ => return Err(WebhookError::MissingHeaders),
        };

        // Signed content is the exact byte concatenation <id>.<ts>.<body>;
        // the delimiter and ordering are a strict provider contract.
        let mut signed = Vec::with_capacity(id.len() + timestamp.len() + raw_body.len() + 2);
        signed.extend_from_slice(id.as_bytes());
        signed.push(b'.');
        signed.extend_from_slice(timestamp.as_bytes());
        signed.push(b'.');
        signed.extend_from_slice(raw_body);

        // Accept if ANY well-formed v1 token matches; malformed tokens are
        // skipped, never errors of their own.
        let mut matched = false;
        for token in signature.split_ascii_whitespace() {
            let Some((version, encoded)) = token.split_once(',') else {
                continue;
            };
            if version != SIGNATURE_VERSION {
                continue;
            }
            let Ok(candidate) = BASE64.decode(encoded) else {
                continue;
            };

            let Ok(mut mac) = HmacSha256::new_from_slice(&self.key) else {
                continue;
            };
            mac.update(&signed);
            if mac.verify_slice(&candidate).is_ok() {
                matched = true;
                break;
            }
        }
        if !matched {
            return Err(WebhookError::InvalidSignature);
        }

        // Tolerance window check comes after signature validity so the
        // two rejections are not distinguishable by response timing on
        // the cheap parse below.
        let ts_secs: i64 = timestamp
            .parse()
            .map_err(|_| WebhookError::InvalidTimestamp)?;
        let skew = (Utc::now().timestamp() - ts_secs).abs();
        if skew > TOLERANCE_SECS {
            return Err(WebhookError::ExpiredSignature { skew_secs: skew });
        }

        let envelope = EventEnvelope::from_bytes(raw_body)?;
        Ok(VerifiedEvent::new(envelope))
    }

    /// Compute the `v1,<base64>` signature token for the given envelope
    /// parts. Counterpart of [`verify`](Self::verify); used by tests and
    /// by tooling that replays provider deliveries.
    pub fn sign(&self, id: &str, timestamp: &str, raw_body: &[u8]) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length");
        mac.update(id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(raw_body);
        format!(
            "{SIGNATURE_VERSION},{}",
            BASE64.encode(mac.finalize().into_bytes())
        )
    }
}
