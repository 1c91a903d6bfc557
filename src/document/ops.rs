//! Drawing operation vocabulary shared by the layout engine and the
//! rendering backend.
//!
//! Coordinates are in PDF points, US Letter, with the y axis pointing
//! DOWN from the top edge of the page (cursor space). The backend flips
//! to PDF's bottom-up space when emitting content.

/// Page width in points (US Letter)
pub const PAGE_WIDTH: f32 = 612.0;

/// Page height in points (US Letter)
pub const PAGE_HEIGHT: f32 = 792.0;

/// Page margin on all sides
pub const MARGIN: f32 = 50.0;

/// Built-in fonts available to the layout engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontId {
    /// Helvetica (regular)
    Regular,
    /// Helvetica-Bold
    Bold,
}

/// One drawing operation enqueued by the layout engine.
///
/// Text x/y is the baseline start position; alignment is already resolved
/// by the layout engine before the op is produced, so the backend never
/// measures text.
#[derive(Debug, Clone)]
pub enum DrawOp {
    /// Show a text run at a baseline position
    Text {
        /// Baseline start, from the left page edge
        x: f32,
        /// Baseline, from the top page edge
        y: f32,
        /// Font to select
        font: FontId,
        /// Font size in points
        size: f32,
        /// Fill gray level, 0.0 = black, 1.0 = white
        gray: f32,
        /// The run itself; non-ASCII characters are replaced on encoding
        text: String,
    },
    /// Stroke a horizontal rule
    Rule {
        /// Left end, from the left page edge
        x1: f32,
        /// Right end
        x2: f32,
        /// Vertical position, from the top page edge
        y: f32,
        /// Stroke gray level
        gray: f32,
    },
}
