//! Channel-fed PDF rendering backend.
//!
//! The backend runs as a spawned task on the consuming end of a drawing-op
//! channel. The layout engine enqueues [`DrawOp`]s; once the op channel
//! closes, the backend assembles the single-page document and streams the
//! bytes back in fixed-size chunks. The chunk channel closing is the
//! end-of-stream signal; a backend fault surfaces through the join handle.
//!
//! ```text
//! Layout ──DrawOp──▶ [backend task] ──bytes──▶ collector
//!                          │
//!                          ▼
//!                    pdf-writer Pdf
//! ```
//!
//! Content streams are written uncompressed, so rendered text is directly
//! visible in the output bytes.

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::ops::{DrawOp, FontId, PAGE_HEIGHT, PAGE_WIDTH};
use crate::error::DocumentError;

/// Size of the byte chunks streamed back to the collector
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Buffer depth of the outbound chunk channel
const CHUNK_CHANNEL_DEPTH: usize = 16;

/// Resource names the content stream selects fonts by
const FONT_REGULAR: Name<'static> = Name(b"F1");
const FONT_BOLD: Name<'static> = Name(b"F2");

/// Spawn the rendering backend.
///
/// Returns the byte-chunk receiver and the task handle. The receiver
/// yields chunks until end-of-stream (channel close); the handle resolves
/// to the backend's final status and must be awaited after collection so
/// faults are not swallowed.
pub fn spawn(
    mut ops: mpsc::Receiver<DrawOp>,
) -> (
    mpsc::Receiver<Vec<u8>>,
    JoinHandle<Result<(), DocumentError>>,
) {
    let (chunk_tx, chunk_rx) = mpsc::channel(CHUNK_CHANNEL_DEPTH);

    let handle = tokio::spawn(async move {
        let mut page = PageAssembler::new();
        while let Some(op) = ops.recv().await {
            page.apply(&op);
        }

        let bytes = page.finish();
        tracing::debug!(bytes = bytes.len(), "document assembled");

        for chunk in bytes.chunks(CHUNK_SIZE) {
            if chunk_tx.send(chunk.to_vec()).await.is_err() {
                return Err(DocumentError::backend(
                    "chunk consumer dropped before end-of-stream",
                ));
            }
        }
        Ok(())
    });

    (chunk_rx, handle)
}

/// Accumulates drawing operations into a single-page content stream and
/// assembles the final document.
struct PageAssembler {
    content: Content,
}

impl PageAssembler {
    fn new() -> Self {
        Self {
            content: Content::new(),
        }
    }

    /// Execute one drawing operation. Ops use top-down cursor coordinates;
    /// this is where they flip into PDF's bottom-up page space.
    fn apply(&mut self, op: &DrawOp) {
        match op {
            DrawOp::Text {
                x,
                y,
                font,
                size,
                gray,
                text,
            } => {
                let name = match font {
                    FontId::Regular => FONT_REGULAR,
                    FontId::Bold => FONT_BOLD,
                };
                self.content.begin_text();
                self.content.set_font(name, *size);
                self.content.set_fill_gray(*gray);
                self.content.next_line(*x, PAGE_HEIGHT - *y);
                self.content.show(Str(&encode_text(text)));
                self.content.end_text();
            }
            DrawOp::Rule { x1, x2, y, gray } => {
                self.content.set_stroke_gray(*gray);
                self.content.set_line_width(1.0);
                self.content.move_to(*x1, PAGE_HEIGHT - *y);
                self.content.line_to(*x2, PAGE_HEIGHT - *y);
                self.content.stroke();
            }
        }
    }

    /// Assemble the document: catalog, page tree, one page, the two
    /// built-in fonts, and the accumulated content stream.
    fn finish(self) -> Vec<u8> {
        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let page_id = Ref::new(3);
        let regular_id = Ref::new(4);
        let bold_id = Ref::new(5);
        let content_id = Ref::new(6);

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id).kids([page_id]).count(1);

        {
            let mut page = pdf.page(page_id);
            page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
            page.parent(page_tree_id);
            page.contents(content_id);

            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            fonts.pair(FONT_REGULAR, regular_id);
            fonts.pair(FONT_BOLD, bold_id);
        }

        pdf.type1_font(regular_id).base_font(Name(b"Helvetica"));
        pdf.type1_font(bold_id).base_font(Name(b"Helvetica-Bold"));

        pdf.stream(content_id, &self.content.finish());
        pdf.finish()
    }
}

/// Standard-encoding text for the built-in fonts. Characters outside the
/// printable ASCII range become '?', matching the metrics table.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() {
                c as u8
            } else {
                b'?'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_op(text: &str) -> DrawOp {
        DrawOp::Text {
            x: 50.0,
            y: 100.0,
            font: FontId::Regular,
            size: 10.0,
            gray: 0.0,
            text: text.to_string(),
        }
    }

    async fn render_ops(ops: Vec<DrawOp>) -> Vec<u8> {
        let (tx, rx) = mpsc::channel(16);
        let (mut chunks, handle) = spawn(rx);
        for op in ops {
            tx.send(op).await.unwrap();
        }
        drop(tx);

        let mut bytes = Vec::new();
        while let Some(chunk) = chunks.recv().await {
            bytes.extend_from_slice(&chunk);
        }
        handle.await.unwrap().unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_output_is_a_pdf() {
        let bytes = render_ops(vec![text_op("Hello")]).await;
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
    }

    #[tokio::test]
    async fn test_text_visible_in_content_stream() {
        let bytes = render_ops(vec![text_op("Amount Due 123.45")]).await;
        let needle = b"Amount Due 123.45";
        assert!(
            bytes.windows(needle.len()).any(|w| w == needle),
            "uncompressed content stream should carry the text run"
        );
    }

    #[tokio::test]
    async fn test_rule_emits_path_ops() {
        let bytes = render_ops(vec![DrawOp::Rule {
            x1: 50.0,
            x2: 550.0,
            y: 200.0,
            gray: 0.8,
        }])
        .await;
        // 792 - 200 = 592: the flipped y coordinate must appear in the path
        let needle = b"592";
        assert!(bytes.windows(needle.len()).any(|w| w == needle));
    }

    #[tokio::test]
    async fn test_empty_op_stream_still_produces_document() {
        let bytes = render_ops(vec![]).await;
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_encode_text_replaces_non_ascii() {
        assert_eq!(encode_text("café"), b"caf?".to_vec());
        assert_eq!(encode_text("plain"), b"plain".to_vec());
    }
}
