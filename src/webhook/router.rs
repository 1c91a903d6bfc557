//! Event routing.
//!
//! Maps a verified event to an observable outcome: a severity class, one
//! structured log record at that severity, and the fields the HTTP layer
//! echoes back. Routing is total and never fails; unrecognized event
//! types classify as the info-level catch-all carrying the raw type
//! string.

use super::events::{EventKind, VerifiedEvent};

/// Severity class a routed event logs at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Routine delivery progress
    Info,
    /// Needs attention but not a failure
    Warn,
    /// Delivery failed
    Error,
}

/// The classified outcome of routing one event
#[derive(Debug, Clone)]
pub struct RoutingOutcome {
    /// Typed event kind ([`EventKind::Unknown`] for the catch-all)
    pub kind: EventKind,
    /// Raw event type string as the provider sent it
    pub raw_type: String,
    /// Mapped severity
    pub severity: Severity,
    /// Provider identifier of the email the event concerns
    pub email_id: Option<String>,
    /// Provider error detail, carried for failed/bounced events
    pub detail: Option<String>,
}

/// Severity an event kind maps to
fn severity_of(kind: EventKind) -> Severity {
    match kind {
        EventKind::Failed | EventKind::Bounced => Severity::Error,
        EventKind::DeliveryDelayed | EventKind::Complained | EventKind::Suppressed => {
            Severity::Warn
        }
        EventKind::Sent
        | EventKind::Delivered
        | EventKind::Clicked
        | EventKind::Scheduled
        | EventKind::Opened
        | EventKind::Received
        | EventKind::Unknown => Severity::Info,
    }
}

/// Route a verified event.
///
/// Always succeeds; the return value records how the event was
/// classified. Emits exactly one log record at the mapped severity.
pub fn route(event: &VerifiedEvent) -> RoutingOutcome {
    let kind = event.kind();
    let severity = severity_of(kind);
    let email_id = event.email_id().map(str::to_string);
    let detail = match kind {
        EventKind::Failed | EventKind::Bounced => event.error_detail(),
        _ => None,
    };

    match severity {
        Severity::Info => {
            tracing::info!(
                event_type = %event.event_type(),
                email_id = email_id.as_deref().unwrap_or("-"),
                "webhook event"
            );
        }
        Severity::Warn => {
            tracing::warn!(
                event_type = %event.event_type(),
                email_id = email_id.as_deref().unwrap_or("-"),
                "webhook event"
            );
        }
        Severity::Error => {
            tracing::error!(
                event_type = %event.event_type(),
                email_id = email_id.as_deref().unwrap_or("-"),
                error = detail.as_deref().unwrap_or("-"),
                "webhook event"
            );
        }
    }

    RoutingOutcome {
        kind,
        raw_type: event.event_type().to_string(),
        severity,
        email_id,
        detail,
    }
}
