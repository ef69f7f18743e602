//! Content-stream operations for one page's fields.
//!
//! All positions are PDF points with the origin at the bottom-left of the
//! page, i.e. the output of `to_pdf_point`. Every field is drawn inside its
//! own `q … Q` pair so nothing leaks into the next one.

use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};
use sf_core::PdfRect;

/// Resource name of the text font (Helvetica, WinAnsi).
pub const TEXT_FONT: &str = "SfF1";
/// Resource name of the check glyph font (ZapfDingbats).
pub const CHECK_FONT: &str = "SfF2";
/// ✔ in ZapfDingbats.
pub const CHECK_GLYPH: &[u8] = b"4";
/// Advance width of the check glyph, in text space units per 1 pt of size.
const CHECK_ADVANCE: f64 = 0.846;
/// Cap height of Helvetica per 1 pt of size, used to centre a line.
const CAP_HEIGHT: f64 = 0.718;

/// Operations accumulated for one page plus the resources they use.
#[derive(Debug, Default)]
pub struct PageCanvas {
    ops: Vec<Operation>,
    pub uses_text_font: bool,
    pub uses_check_font: bool,
}

impl PageCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// One line of text, left-aligned in `rect`, clipped to it. The size
    /// shrinks so the line fits the field height.
    ///
    /// The baseline starts at `rect.x + padding`, and sits above `rect.y`
    /// (the bottom edge) by half the height left over once the cap height is
    /// taken out, so the capitals are vertically centred. See
    /// [`text_origin`].
    pub fn text(&mut self, rect: PdfRect, text: &str, font_size: f64, padding: f64) {
        let size = fit_font_size(rect, font_size, padding);
        let (x, y) = text_origin(rect, size, padding);
        self.uses_text_font = true;
        self.ops.extend([
            Operation::new("q", vec![]),
            Operation::new("re", rect_operands(rect)),
            Operation::new("W", vec![]),
            Operation::new("n", vec![]),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(TEXT_FONT.into()), real(size)]),
            Operation::new("Td", vec![real(x), real(y)]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    /// Check mark centred in `rect`, sized to its smaller side. The glyph's
    /// baseline is raised from `rect.y` by half the height the glyph
    /// leaves free.
    pub fn check(&mut self, rect: PdfRect) {
        let size = rect.width.min(rect.height);
        let x = rect.x + (rect.width - size * CHECK_ADVANCE) / 2.0;
        let y = rect.y + (rect.height - size * CAP_HEIGHT) / 2.0;
        self.uses_check_font = true;
        self.ops.extend([
            Operation::new("q", vec![]),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(CHECK_FONT.into()), real(size)]),
            Operation::new("Td", vec![real(x), real(y)]),
            Operation::new(
                "Tj",
                vec![Object::String(CHECK_GLYPH.to_vec(), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    /// Paint the image XObject `name` stretched over `rect`.
    pub fn image(&mut self, rect: PdfRect, name: &str) {
        self.ops.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    real(rect.width),
                    0.into(),
                    0.into(),
                    real(rect.height),
                    real(rect.x),
                    real(rect.y),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into())]),
            Operation::new("Q", vec![]),
        ]);
    }

    pub fn encode(self) -> lopdf::Result<Vec<u8>> {
        Content {
            operations: self.ops,
        }
        .encode()
    }
}

/// Requested size, reduced so a line fits inside the padded field height.
pub fn fit_font_size(rect: PdfRect, font_size: f64, padding: f64) -> f64 {
    let room = rect.height - 2.0 * padding;
    font_size.min(room / CAP_HEIGHT).max(1.0)
}

/// Baseline start of a line of `size` pt text in `rect`: inset by
/// `padding` on the left, vertically centred on the cap height.
pub fn text_origin(rect: PdfRect, size: f64, padding: f64) -> (f64, f64) {
    (
        rect.x + padding,
        rect.y + (rect.height - size * CAP_HEIGHT) / 2.0,
    )
}

fn rect_operands(rect: PdfRect) -> Vec<Object> {
    vec![
        real(rect.x),
        real(rect.y),
        real(rect.width),
        real(rect.height),
    ]
}

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

/// Encode text for a standard Type1 font with `WinAnsiEncoding`.
/// Characters outside the code page become `?`; control characters become
/// spaces.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u8,
            c if c.is_control() => b' ',
            c => win_ansi_extra(c).unwrap_or(b'?'),
        })
        .collect()
}

/// The 0x80–0x9F block where cp1252 departs from Latin-1.
fn win_ansi_extra(c: char) -> Option<u8> {
    Some(match c {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8a,
        '‹' => 0x8b,
        'Œ' => 0x8c,
        'Ž' => 0x8e,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9a,
        '›' => 0x9b,
        'œ' => 0x9c,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        _ => return None,
    })
}
