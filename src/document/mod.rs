//! Document Layout Engine
//!
//! Deterministic rendering of invoice data into a fixed-page PDF:
//!
//! - **Layout**: cursor-based placement of the title block, Bill To
//!   block, line-item table, total row, and footer ([`layout`])
//! - **Backend**: channel-fed task assembling the PDF and streaming the
//!   bytes back to an end-of-stream signal ([`backend`])
//! - **Metrics**: built-in Helvetica advance widths for right/center
//!   alignment ([`metrics`])
//!
//! # Architecture
//!
//! ```text
//! Invoice -> layout (cursor + metrics) --DrawOp--> backend task
//!                                                       |
//!                     RenderedDocument <--byte chunks---+
//! ```
//!
//! The only suspension point is the chunk collection loop in
//! [`DocumentLayoutEngine::render`]; backend faults propagate as
//! [`crate::error::DocumentError`] and never yield a partial document.

pub mod backend;
pub mod layout;
pub mod metrics;
pub mod ops;

pub use layout::{table_amount, DocumentLayoutEngine, RenderedDocument, ROW_HEIGHT};
pub use ops::{DrawOp, FontId, MARGIN, PAGE_HEIGHT, PAGE_WIDTH};
