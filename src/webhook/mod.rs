//! Signed Webhook Handling
//!
//! Verification and routing of the email provider's delivery-status
//! callbacks:
//!
//! - **Signature Verification**: timestamped HMAC-SHA256 validation of
//!   the `svix-*` header triple over the raw request bytes
//! - **Typed Events**: closed event-kind enum with an explicit catch-all
//! - **Routing**: total classification of verified events into
//!   severity-mapped observable outcomes
//!
//! # Architecture
//!
//! ```text
//! Request -> Signature Verify -> VerifiedEvent -> route() -> 200 {received, type}
//!                  |
//!                  v
//!            401 (uniform)
//! ```
//!
//! # Trust boundary
//!
//! The `svix-id` / `svix-timestamp` / `svix-signature` header convention
//! is the single supported verification scheme. Verification failures
//! never reach the router, and [`VerifiedEvent`] cannot be constructed
//! from unverified input.

pub mod events;
pub mod router;
pub mod signature;

pub use events::{EventEnvelope, EventKind, VerifiedEvent};
pub use router::{route, RoutingOutcome, Severity};
pub use signature::{
    SignatureVerifier, WebhookHeaders, HEADER_ID, HEADER_SIGNATURE, HEADER_TIMESTAMP,
    TOLERANCE_SECS,
};
