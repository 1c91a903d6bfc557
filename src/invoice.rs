//! Invoice domain types and identifier generation
//!
//! An invoice exists only for the lifetime of one request: it is rendered,
//! attached to an email, and dropped. Nothing is persisted.

use std::fmt;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One billable row: description, quantity, unit rate.
///
/// Immutable once submitted; the derived amount is `quantity * rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// What was billed
    pub description: String,
    /// How many units
    pub quantity: f64,
    /// Price per unit
    pub rate: f64,
}

impl LineItem {
    /// The derived row amount
    pub fn amount(&self) -> f64 {
        self.quantity * self.rate
    }
}

/// Human-readable invoice identifier of the form `INV-<YYYYMMDD>-<NNNN>`.
///
/// Uniqueness is probabilistic: the suffix is a uniform draw from
/// [1, 9999] with no collision tracking. Callers must tolerate two
/// requests in the same second drawing the same suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(String);

impl InvoiceId {
    /// Generate a fresh identifier from the current UTC date and a
    /// 4-digit random suffix. Always succeeds.
    pub fn generate() -> Self {
        let date = Utc::now().format("%Y%m%d");
        let suffix: u32 = rand::rng().random_range(1..=9999);
        InvoiceId(format!("INV-{date}-{suffix:04}"))
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Content-disposition filename for the rendered document
    pub fn filename(&self) -> String {
        format!("invoice-{}.pdf", self.0)
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A complete invoice as assembled by the pipeline.
///
/// `total` is the exact sum of line-item amounts; no rounding happens
/// until a formatting path renders it.
#[derive(Debug, Clone)]
pub struct Invoice {
    /// Generated identifier
    pub id: InvoiceId,
    /// Client display name
    pub client_name: String,
    /// Client address the invoice is mailed to
    pub client_email: String,
    /// Ordered billable rows
    pub line_items: Vec<LineItem>,
    /// Sum of all line-item amounts
    pub total: f64,
}

impl Invoice {
    /// Assemble an invoice, computing the total from the line items
    pub fn new(
        id: InvoiceId,
        client_name: String,
        client_email: String,
        line_items: Vec<LineItem>,
    ) -> Self {
        let total = total_of(&line_items);
        Self {
            id,
            client_name,
            client_email,
            line_items,
            total,
        }
    }
}

/// Exact sum of `quantity * rate` over all items, order-independent
pub fn total_of(items: &[LineItem]) -> f64 {
    items.iter().map(LineItem::amount).sum()
}
