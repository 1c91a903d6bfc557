//! Cursor-based invoice layout.
//!
//! The layout engine walks the page top-down with a vertical cursor,
//! translating invoice content into [`DrawOp`]s: a right-aligned title
//! block, the Bill To block, the line-item table with fixed column boxes,
//! a bold total row, and a centered footer. Alignment is resolved here
//! using the built-in font metrics; the backend just executes ops.
//!
//! There is no pagination: every row advances the cursor by a fixed
//! [`ROW_HEIGHT`] and content past the page bottom falls off the media box.

use chrono::Utc;
use tokio::sync::mpsc;

use super::backend;
use super::metrics::text_width;
use super::ops::{DrawOp, FontId, MARGIN, PAGE_WIDTH};
use crate::error::DocumentError;
use crate::invoice::Invoice;

/// Vertical advance per line-item row
pub const ROW_HEIGHT: f32 = 20.0;

/// Right edge text aligns against (page width minus margin)
const RIGHT_EDGE: f32 = PAGE_WIDTH - MARGIN;

/// Left x of the description column
const COL_DESC_X: f32 = 50.0;
/// Qty column box: left x and width, right-aligned
const COL_QTY: (f32, f32) = (300.0, 60.0);
/// Rate column box
const COL_RATE: (f32, f32) = (370.0, 70.0);
/// Amount column box
const COL_AMOUNT: (f32, f32) = (450.0, 80.0);
/// Box the total label right-aligns in
const TOTAL_LABEL_BOX: (f32, f32) = (290.0, 150.0);

/// Horizontal rule extent
const RULE_X1: f32 = 50.0;
const RULE_X2: f32 = 550.0;

const TITLE_SIZE: f32 = 24.0;
const META_SIZE: f32 = 10.0;
const BILL_TO_SIZE: f32 = 11.0;
const TABLE_SIZE: f32 = 10.0;
const TOTAL_SIZE: f32 = 12.0;
const FOOTER_SIZE: f32 = 9.0;

const BLACK: f32 = 0.0;
const HEADER_GRAY: f32 = 0.2;
const RULE_GRAY: f32 = 0.8;
const FOOTER_GRAY: f32 = 0.53;

/// The rendered binary document plus its content-disposition filename.
///
/// Owned by the render call; handed to the email capability and dropped.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// The PDF bytes
    pub bytes: Vec<u8>,
    /// Attachment filename derived from the invoice id
    pub filename: String,
}

/// Renders invoices into fixed-page PDF documents.
pub struct DocumentLayoutEngine;

impl DocumentLayoutEngine {
    /// Render an invoice.
    ///
    /// Spawns the rendering backend, drives the layout, then suspends on
    /// the chunk stream until end-of-stream. Any backend fault propagates
    /// as [`DocumentError`]; no partial document is ever returned.
    pub async fn render(invoice: &Invoice) -> Result<RenderedDocument, DocumentError> {
        let (op_tx, op_rx) = mpsc::channel(64);
        let (mut chunks, backend_task) = backend::spawn(op_rx);

        let emitter = OpEmitter { tx: op_tx };
        emit_layout(&emitter, invoice).await?;
        drop(emitter);

        let mut bytes = Vec::new();
        while let Some(chunk) = chunks.recv().await {
            bytes.extend_from_slice(&chunk);
        }

        match backend_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(e) => return Err(DocumentError::backend(format!("render task failed: {e}"))),
        }

        tracing::debug!(invoice_id = %invoice.id, bytes = bytes.len(), "invoice rendered");

        Ok(RenderedDocument {
            bytes,
            filename: invoice.id.filename(),
        })
    }
}

/// Sends drawing ops to the backend, mapping a dead backend to a
/// rendering failure.
struct OpEmitter {
    tx: mpsc::Sender<DrawOp>,
}

impl OpEmitter {
    async fn op(&self, op: DrawOp) -> Result<(), DocumentError> {
        self.tx
            .send(op)
            .await
            .map_err(|_| DocumentError::backend("rendering backend stopped"))
    }

    async fn text(
        &self,
        x: f32,
        y: f32,
        font: FontId,
        size: f32,
        gray: f32,
        text: &str,
    ) -> Result<(), DocumentError> {
        self.op(DrawOp::Text {
            x,
            y,
            font,
            size,
            gray,
            text: text.to_string(),
        })
        .await
    }

    /// Text right-aligned against an edge
    async fn text_right(
        &self,
        right_edge: f32,
        y: f32,
        font: FontId,
        size: f32,
        gray: f32,
        text: &str,
    ) -> Result<(), DocumentError> {
        let x = right_edge - text_width(text, font, size);
        self.text(x, y, font, size, gray, text).await
    }

    /// Text right-aligned within a (left, width) column box
    async fn text_in_box(
        &self,
        col: (f32, f32),
        y: f32,
        font: FontId,
        size: f32,
        gray: f32,
        text: &str,
    ) -> Result<(), DocumentError> {
        self.text_right(col.0 + col.1, y, font, size, gray, text).await
    }

    async fn text_centered(
        &self,
        y: f32,
        font: FontId,
        size: f32,
        gray: f32,
        text: &str,
    ) -> Result<(), DocumentError> {
        let x = (PAGE_WIDTH - text_width(text, font, size)) / 2.0;
        self.text(x, y, font, size, gray, text).await
    }

    async fn rule(&self, y: f32) -> Result<(), DocumentError> {
        self.op(DrawOp::Rule {
            x1: RULE_X1,
            x2: RULE_X2,
            y,
            gray: RULE_GRAY,
        })
        .await
    }
}

/// Fixed 2-decimal currency used inside the document table.
///
/// Independent of the email summary's locale-aware formatter; the two
/// paths need not agree byte-for-byte.
pub fn table_amount(value: f64) -> String {
    format!("${value:.2}")
}

/// Drive the full layout sequence, top to bottom.
async fn emit_layout(e: &OpEmitter, invoice: &Invoice) -> Result<(), DocumentError> {
    let mut y = MARGIN + TITLE_SIZE;

    // Title block, right-aligned
    e.text_right(RIGHT_EDGE, y, FontId::Bold, TITLE_SIZE, BLACK, "INVOICE")
        .await?;

    y += 16.0;
    let id_line = format!("Invoice ID: {}", invoice.id);
    e.text_right(RIGHT_EDGE, y, FontId::Regular, META_SIZE, BLACK, &id_line)
        .await?;

    y += 14.0;
    let date_line = format!("Date: {}", Utc::now().format("%B %-d, %Y"));
    e.text_right(RIGHT_EDGE, y, FontId::Regular, META_SIZE, BLACK, &date_line)
        .await?;

    // Bill To block
    y += 32.0;
    e.text(COL_DESC_X, y, FontId::Bold, BILL_TO_SIZE, BLACK, "Bill To:")
        .await?;
    y += 15.0;
    e.text(COL_DESC_X, y, FontId::Regular, BILL_TO_SIZE, BLACK, &invoice.client_name)
        .await?;
    y += 14.0;
    e.text(COL_DESC_X, y, FontId::Regular, BILL_TO_SIZE, BLACK, &invoice.client_email)
        .await?;

    // Table header
    y += 32.0;
    let header_y = y;
    e.text(COL_DESC_X, header_y, FontId::Bold, TABLE_SIZE, HEADER_GRAY, "Description")
        .await?;
    e.text_in_box(COL_QTY, header_y, FontId::Bold, TABLE_SIZE, HEADER_GRAY, "Qty")
        .await?;
    e.text_in_box(COL_RATE, header_y, FontId::Bold, TABLE_SIZE, HEADER_GRAY, "Rate")
        .await?;
    e.text_in_box(COL_AMOUNT, header_y, FontId::Bold, TABLE_SIZE, HEADER_GRAY, "Amount")
        .await?;
    e.rule(header_y + 6.0).await?;

    // Line items: one row each, fixed advance, no wrap handling
    let mut row_y = header_y + 24.0;
    for item in &invoice.line_items {
        e.text(COL_DESC_X, row_y, FontId::Regular, TABLE_SIZE, BLACK, &item.description)
            .await?;
        e.text_in_box(
            COL_QTY,
            row_y,
            FontId::Regular,
            TABLE_SIZE,
            BLACK,
            &format_quantity(item.quantity),
        )
        .await?;
        e.text_in_box(
            COL_RATE,
            row_y,
            FontId::Regular,
            TABLE_SIZE,
            BLACK,
            &table_amount(item.rate),
        )
        .await?;
        e.text_in_box(
            COL_AMOUNT,
            row_y,
            FontId::Regular,
            TABLE_SIZE,
            BLACK,
            &table_amount(item.amount()),
        )
        .await?;
        row_y += ROW_HEIGHT;
    }

    // Closing rule 8 units under the last row baseline
    let close_y = row_y - ROW_HEIGHT + 8.0;
    e.rule(close_y).await?;

    let total_y = close_y + 16.0;
    e.text_in_box(TOTAL_LABEL_BOX, total_y, FontId::Bold, TOTAL_SIZE, BLACK, "Total Due:")
        .await?;
    e.text_in_box(
        COL_AMOUNT,
        total_y,
        FontId::Bold,
        TOTAL_SIZE,
        BLACK,
        &table_amount(invoice.total),
    )
    .await?;

    // Footer
    let footer_y = total_y + 40.0;
    e.text_centered(
        footer_y,
        FontId::Regular,
        FOOTER_SIZE,
        FOOTER_GRAY,
        "Thank you for your business.",
    )
    .await?;

    Ok(())
}

/// Quantities print without a forced decimal tail: whole numbers as
/// integers, fractional quantities as given.
fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{quantity}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{InvoiceId, LineItem};

    fn sample_invoice() -> Invoice {
        Invoice::new(
            InvoiceId::generate(),
            "Acme Corp".to_string(),
            "ap@acme.test".to_string(),
            vec![
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
            ],
        )
    }

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|w| w == needle.as_bytes())
    }

    #[test]
    fn test_table_amount_fixed_two_decimals() {
        assert_eq!(table_amount(500.0), "$500.00");
        assert_eq!(table_amount(0.5), "$0.50");
        assert_eq!(table_amount(1234.567), "$1234.57");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(10.0), "10");
        assert_eq!(format_quantity(2.5), "2.5");
    }

    #[tokio::test]
    async fn test_render_produces_pdf_with_amounts() {
        let invoice = sample_invoice();
        let doc = DocumentLayoutEngine::render(&invoice).await.unwrap();

        assert!(doc.bytes.starts_with(b"%PDF-"));
        assert!(contains(&doc.bytes, "INVOICE"));
        assert!(contains(&doc.bytes, "Design"));
        assert!(contains(&doc.bytes, "Dev"));
        assert!(contains(&doc.bytes, "$500.00"));
        assert!(contains(&doc.bytes, "$400.00"));
        assert!(contains(&doc.bytes, "$900.00"));
        assert!(contains(&doc.bytes, "Total Due:"));
        assert!(contains(&doc.bytes, "Thank you for your business."));
    }

    #[tokio::test]
    async fn test_filename_comes_from_invoice_id() {
        let invoice = sample_invoice();
        let doc = DocumentLayoutEngine::render(&invoice).await.unwrap();
        assert_eq!(doc.filename, invoice.id.filename());
    }

    #[tokio::test]
    async fn test_bill_to_block_present() {
        let invoice = sample_invoice();
        let doc = DocumentLayoutEngine::render(&invoice).await.unwrap();
        assert!(contains(&doc.bytes, "Bill To:"));
        assert!(contains(&doc.bytes, "Acme Corp"));
        assert!(contains(&doc.bytes, "ap@acme.test"));
    }

    #[tokio::test]
    async fn test_overflowing_item_list_is_clipped_not_fatal() {
        let items: Vec<LineItem> = (0..100)
            .map(|i| LineItem {
                description: format!("Item {i}"),
                quantity: 1.0,
                rate: 1.0,
            })
            .collect();
        let invoice = Invoice::new(
            InvoiceId::generate(),
            "Overflow Inc".to_string(),
            "of@overflow.test".to_string(),
            items,
        );

        // 100 rows run far past the page bottom; rendering must still
        // succeed and produce a single-page document.
        let doc = DocumentLayoutEngine::render(&invoice).await.unwrap();
        assert!(doc.bytes.starts_with(b"%PDF-"));
        assert!(contains(&doc.bytes, "Item 99"));
    }
}
