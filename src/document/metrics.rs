//! Advance-width metrics for the built-in Helvetica faces.
//!
//! Right- and center-alignment need text widths before anything is drawn.
//! The standard 14 PDF fonts are never embedded, so their AFM advance
//! widths (thousandths of an em) are compiled in for the printable ASCII
//! range. Characters outside that range measure as the '?' glyph, which is
//! also what the backend substitutes when encoding.

use super::ops::FontId;

/// Helvetica advance widths for ASCII 0x20..=0x7E
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70
];

/// Helvetica-Bold advance widths for ASCII 0x20..=0x7E
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0x30
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 0x50
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 0x60
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 0x70
];

fn advance(font: FontId, c: char) -> u16 {
    let table = match font {
        FontId::Regular => &HELVETICA,
        FontId::Bold => &HELVETICA_BOLD,
    };
    let idx = if c.is_ascii() && !c.is_ascii_control() {
        c as usize - 0x20
    } else {
        '?' as usize - 0x20
    };
    table[idx]
}

/// Width of a text run at the given size, in points
pub fn text_width(text: &str, font: FontId, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(advance(font, c))).sum();
    units as f32 * size / 1000.0
}
