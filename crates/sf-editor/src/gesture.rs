//! Drag and resize gestures.
//!
//! A [`Gesture`] is the pure math of one pointer gesture: it remembers where
//! the pointer went down and what the field's rectangle was at that moment,
//! and maps any later pointer position to the rectangle the field should
//! have. Deltas are always taken from the gesture start (not accumulated
//! frame to frame), converted to canonical pixels, then clamped to the page.
//!
//! [`DragSession`] wraps a gesture in a scoped handle that holds the
//! engine's pointer capture: `begin_drag → move_to… → end`, with the capture
//! released on `Drop` too, so an abandoned gesture never leaks into the next.

use crate::builder::{BuilderEngine, FieldMutation};
use sf_core::geometry::{self, PageFormat};
use sf_core::{FieldId, Point, Rect, Vec2};

/// A resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    fn moves_left_edge(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    fn moves_top_edge(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    /// Position of this corner on `rect`.
    pub fn point_of(self, rect: &Rect) -> Point {
        let x = if self.moves_left_edge() {
            rect.x
        } else {
            rect.right()
        };
        let y = if self.moves_top_edge() {
            rect.y
        } else {
            rect.bottom()
        };
        Point::new(x, y)
    }

    pub fn name(self) -> &'static str {
        match self {
            Corner::TopLeft => "top-left",
            Corner::TopRight => "top-right",
            Corner::BottomLeft => "bottom-left",
            Corner::BottomRight => "bottom-right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Resize(Corner),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    pub field: FieldId,
    pub kind: GestureKind,
    /// Pointer position at gesture start, display pixels.
    start: Point,
    /// Field rectangle at gesture start, canonical pixels.
    origin: Rect,
    scale: f64,
    format: PageFormat,
    min_size: (f64, f64),
}

impl Gesture {
    pub fn new(
        field: FieldId,
        kind: GestureKind,
        start: Point,
        origin: Rect,
        scale: f64,
        format: PageFormat,
        min_size: (f64, f64),
    ) -> Self {
        Self {
            field,
            kind,
            start,
            origin,
            scale,
            format,
            min_size,
        }
    }

    pub fn origin(&self) -> Rect {
        self.origin
    }

    /// Rectangle for the pointer at `pointer`. With `constrain_axis`, a move
    /// keeps only the dominant axis of the delta.
    pub fn rect_at(&self, pointer: Point, constrain_axis: bool) -> Rect {
        let mut delta = geometry::from_display_delta(pointer - self.start, self.scale);
        match self.kind {
            GestureKind::Move => {
                if constrain_axis {
                    if delta.x.abs() > delta.y.abs() {
                        delta.y = 0.0;
                    } else {
                        delta.x = 0.0;
                    }
                }
                geometry::clamp_to_page(self.origin.translate(delta), self.format)
            }
            GestureKind::Resize(corner) => self.resized(corner, delta),
        }
    }

    /// Resize against the anchored opposite corner.
    fn resized(&self, corner: Corner, delta: Vec2) -> Rect {
        let (page_w, page_h) = geometry::canonical_size_px(self.format);
        let (min_w, min_h) = self.min_size;
        let o = self.origin;

        let (x, width) = resize_axis(
            o.x,
            o.width,
            delta.x,
            corner.moves_left_edge(),
            min_w,
            page_w,
        );
        let (y, height) = resize_axis(
            o.y,
            o.height,
            delta.y,
            corner.moves_top_edge(),
            min_h,
            page_h,
        );
        Rect::new(x, y, width, height)
    }
}

/// One axis of a resize. The anchored edge is first pulled onto the page so
/// the result always fits in `[0, page]` with at least `min` extent.
fn resize_axis(
    start: f64,
    extent: f64,
    delta: f64,
    moves_start: bool,
    min: f64,
    page: f64,
) -> (f64, f64) {
    let min = min.min(page);
    if moves_start {
        let end = (start + extent).clamp(min, page);
        let start = (start + delta).clamp(0.0, end - min);
        (start, end - start)
    } else {
        let start = start.clamp(0.0, page - min);
        let extent = (extent + delta).clamp(min, page - start);
        (start, extent)
    }
}

// ─── Scoped session ──────────────────────────────────────────────────────

/// A gesture in progress against a [`BuilderEngine`].
///
/// Holds the engine's pointer capture for as long as it lives. Created by
/// [`BuilderEngine::begin_drag`] / [`BuilderEngine::begin_resize`].
pub struct DragSession<'a> {
    engine: &'a mut BuilderEngine,
    gesture: Gesture,
    last: Rect,
}

impl<'a> DragSession<'a> {
    pub(crate) fn new(engine: &'a mut BuilderEngine, gesture: Gesture) -> Self {
        engine.set_pointer_capture(Some(gesture.field));
        log::debug!("gesture {:?} began on {}", gesture.kind, gesture.field);
        Self {
            engine,
            last: gesture.origin,
            gesture,
        }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Read access to the engine mid-gesture.
    pub fn engine(&self) -> &BuilderEngine {
        &*self.engine
    }

    /// Track the pointer and commit the resulting rectangle.
    pub fn move_to(&mut self, pointer: Point) -> Rect {
        self.move_with(pointer, false)
    }

    /// Like [`move_to`](Self::move_to), optionally constraining a move to
    /// its dominant axis (Shift held).
    pub fn move_with(&mut self, pointer: Point, constrain_axis: bool) -> Rect {
        let rect = self.gesture.rect_at(pointer, constrain_axis);
        log::trace!("gesture frame {} → {rect:?}", self.gesture.field);
        self.engine.apply(FieldMutation::SetRect {
            id: self.gesture.field,
            rect,
        });
        self.last = rect;
        rect
    }

    /// Finish the gesture, returning the committed rectangle.
    pub fn end(self) -> Rect {
        self.last
    }
}

impl Drop for DragSession<'_> {
    fn drop(&mut self) {
        self.engine.set_pointer_capture(None);
        log::debug!("gesture on {} released", self.gesture.field);
    }
}
