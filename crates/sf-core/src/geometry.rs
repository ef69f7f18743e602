//! Coordinate model: canonical page pixels ↔ display pixels ↔ PDF points.
//!
//! Field rectangles are stored once, in *canonical pixels*: the pixel grid a
//! page format produces at a fixed 96 DPI. Every rendering surface (builder
//! canvas at some zoom, fill view on a phone, fill view on a desktop) derives
//! its own rectangles by multiplying with a display scale, and pointer deltas
//! measured on those surfaces are divided by the same scale before they touch
//! the stored rectangle. PDF output uses points (72 DPI) with the Y axis
//! flipped. All functions here are pure.

use kurbo::Vec2;
use serde::{Deserialize, Serialize, Serializer};

/// Resolution of the canonical pixel space.
pub const CANONICAL_DPI: f64 = 96.0;

/// PDF user-space units per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Points per canonical pixel (`72 / 96`).
pub const PT_PER_PX: f64 = POINTS_PER_INCH / CANONICAL_DPI;

// ─── Page formats ────────────────────────────────────────────────────────

/// Physical page format. Fixed per page at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PageFormat {
    #[default]
    A4,
    A5,
    Letter,
}

impl PageFormat {
    pub const ALL: [PageFormat; 3] = [PageFormat::A4, PageFormat::A5, PageFormat::Letter];

    pub fn name(self) -> &'static str {
        match self {
            PageFormat::A4 => "A4",
            PageFormat::A5 => "A5",
            PageFormat::Letter => "Letter",
        }
    }

    /// Case-insensitive lookup by name (`"a4"`, `"LETTER"`).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Page size in PDF points.
pub fn canonical_size_of(format: PageFormat) -> (f64, f64) {
    match format {
        PageFormat::A4 => (595.0, 842.0),
        PageFormat::A5 => (420.0, 595.0),
        PageFormat::Letter => (612.0, 792.0),
    }
}

/// Page size in canonical pixels (points at 96 DPI).
pub fn canonical_size_px(format: PageFormat) -> (f64, f64) {
    let (w, h) = canonical_size_of(format);
    (w / PT_PER_PX, h / PT_PER_PX)
}

pub fn canonical_width_px(format: PageFormat) -> f64 {
    canonical_size_px(format).0
}

pub fn canonical_height_px(format: PageFormat) -> f64 {
    canonical_size_px(format).1
}

// ─── Rectangles ──────────────────────────────────────────────────────────

/// Axis-aligned rectangle, top-left origin, Y growing downward.
///
/// When stored on a field the units are canonical pixels; the same type is
/// reused for display-space rectangles returned by [`to_display_rect`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    #[serde(serialize_with = "serialize_coord")]
    pub x: f64,
    #[serde(serialize_with = "serialize_coord")]
    pub y: f64,
    #[serde(serialize_with = "serialize_coord")]
    pub width: f64,
    #[serde(serialize_with = "serialize_coord")]
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    pub fn translate(&self, delta: Vec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    pub fn to_kurbo(&self) -> kurbo::Rect {
        kurbo::Rect::new(self.x, self.y, self.right(), self.bottom())
    }

    /// Whether the rectangle lies fully inside `[0, w] × [0, h]`.
    pub fn is_within(&self, w: f64, h: f64) -> bool {
        const EPS: f64 = 1e-9;
        self.x >= -EPS && self.y >= -EPS && self.right() <= w + EPS && self.bottom() <= h + EPS
    }
}

/// Whole numbers are written as JSON integers so that hand-authored and
/// browser-produced templates (`"x": 120`) survive a round-trip unchanged.
fn serialize_coord<S: Serializer>(v: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
    if v.fract() == 0.0 && v.abs() < MAX_EXACT {
        serializer.serialize_i64(*v as i64)
    } else {
        serializer.serialize_f64(*v)
    }
}

// ─── Display scaling ─────────────────────────────────────────────────────

/// Scale that maps canonical pixels of `format` onto a surface
/// `target_width_px` wide.
pub fn display_scale(format: PageFormat, target_width_px: f64) -> f64 {
    target_width_px / canonical_width_px(format)
}

/// Project a stored rectangle onto a display surface.
pub fn to_display_rect(rect: Rect, scale: f64) -> Rect {
    Rect::new(
        rect.x * scale,
        rect.y * scale,
        rect.width * scale,
        rect.height * scale,
    )
}

/// Convert an on-screen pointer delta back into canonical pixels.
/// A non-positive or non-finite scale leaves the delta untouched.
pub fn from_display_delta(delta: Vec2, scale: f64) -> Vec2 {
    if scale > 0.0 && scale.is_finite() {
        delta / scale
    } else {
        delta
    }
}

/// Inverse of [`to_display_rect`].
pub fn from_display_rect(rect: Rect, scale: f64) -> Rect {
    let origin = from_display_delta(Vec2::new(rect.x, rect.y), scale);
    let size = from_display_delta(Vec2::new(rect.width, rect.height), scale);
    Rect::new(origin.x, origin.y, size.x, size.y)
}

// ─── Clamping ────────────────────────────────────────────────────────────

/// Keep a moved rectangle on the page without changing its size.
/// A rectangle larger than the page is pinned to the top-left edge.
pub fn clamp_to_page(rect: Rect, format: PageFormat) -> Rect {
    let (w, h) = canonical_size_px(format);
    Rect::new(
        rect.x.min(w - rect.width).max(0.0),
        rect.y.min(h - rect.height).max(0.0),
        rect.width,
        rect.height,
    )
}

// ─── PDF projection ──────────────────────────────────────────────────────

/// Rectangle in PDF user space: origin at the bottom-left of the page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Project a canonical-pixel rectangle into PDF points, flipping Y.
/// `y` of the result is the rectangle's *bottom* edge in PDF space.
pub fn to_pdf_point(rect: Rect, format: PageFormat) -> PdfRect {
    let (_, page_height_pt) = canonical_size_of(format);
    PdfRect {
        x: rect.x * PT_PER_PX,
        y: page_height_pt - (rect.y + rect.height) * PT_PER_PX,
        width: rect.width * PT_PER_PX,
        height: rect.height * PT_PER_PX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn format_table_is_exact() {
        assert_eq!(canonical_size_of(PageFormat::A4), (595.0, 842.0));
        assert_eq!(canonical_size_of(PageFormat::A5), (420.0, 595.0));
        assert_eq!(canonical_size_of(PageFormat::Letter), (612.0, 792.0));
    }

    #[test]
    fn canonical_pixels_use_96_dpi() {
        let (w, h) = canonical_size_px(PageFormat::Letter);
        assert!(approx(w, 816.0));
        assert!(approx(h, 1056.0));
    }

    #[test]
    fn format_names_roundtrip() {
        for f in PageFormat::ALL {
            assert_eq!(PageFormat::from_name(f.name()), Some(f));
        }
        assert_eq!(PageFormat::from_name(" letter "), Some(PageFormat::Letter));
        assert_eq!(PageFormat::from_name("A3"), None);
    }

    #[test]
    fn display_scale_maps_canonical_width_to_target() {
        let s = display_scale(PageFormat::A4, canonical_width_px(PageFormat::A4) / 2.0);
        assert!(approx(s, 0.5));
    }

    #[test]
    fn display_roundtrip_is_identity() {
        let r = Rect::new(12.5, 300.25, 150.0, 40.0);
        for s in [0.3, 0.75, 1.0, 1.6, 3.2] {
            let back = from_display_rect(to_display_rect(r, s), s);
            assert!(approx(back.x, r.x) && approx(back.y, r.y));
            assert!(approx(back.width, r.width) && approx(back.height, r.height));
        }
    }

    #[test]
    fn delta_is_divided_by_scale() {
        let d = from_display_delta(Vec2::new(100.0, 50.0), 2.0);
        assert_eq!(d, Vec2::new(50.0, 25.0));
        // Degenerate scale is ignored rather than producing inf.
        assert_eq!(from_display_delta(Vec2::new(3.0, 4.0), 0.0), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn pdf_projection_flips_y() {
        // 96 px square at the top-left of an A4 page → 72 pt square.
        let pt = to_pdf_point(Rect::new(0.0, 0.0, 96.0, 96.0), PageFormat::A4);
        assert!(approx(pt.x, 0.0));
        assert!(approx(pt.width, 72.0));
        assert!(approx(pt.height, 72.0));
        assert!(approx(pt.y, 842.0 - 72.0));
    }

    #[test]
    fn clamp_keeps_size_and_stays_inside() {
        let (w, h) = canonical_size_px(PageFormat::A5);
        let r = clamp_to_page(Rect::new(-30.0, h - 5.0, 150.0, 40.0), PageFormat::A5);
        assert_eq!(r.x, 0.0);
        assert!(approx(r.bottom(), h));
        assert_eq!((r.width, r.height), (150.0, 40.0));
        assert!(r.is_within(w, h));
    }

    #[test]
    fn whole_coordinates_serialize_as_integers() {
        let json = serde_json::to_string(&Rect::new(10.0, 20.5, 150.0, 40.0)).unwrap();
        assert_eq!(json, r#"{"x":10,"y":20.5,"width":150,"height":40}"#);
    }
}
