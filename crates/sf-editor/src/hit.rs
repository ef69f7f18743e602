//! Hit testing: display point → field lookup on one page.
//!
//! Walks the page's fields back-to-front (last in the list = topmost), in
//! display space, so the answer matches what the user sees at any zoom.

use crate::gesture::Corner;
use sf_core::geometry::to_display_rect;
use sf_core::{FieldId, Page, Point};

/// What the pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub field: FieldId,
    /// Set when the pointer is on one of the selected field's resize handles.
    pub handle: Option<Corner>,
}

/// Find the topmost field at `(px, py)` on a page drawn at `scale`.
///
/// Resize handles of `selected` win over field bodies, since they sit on the
/// border where a neighbour may overlap.
pub fn hit_test(
    page: &Page,
    scale: f64,
    px: f64,
    py: f64,
    selected: Option<FieldId>,
    handle_radius: f64,
) -> Option<Hit> {
    if let Some(id) = selected
        && let Some(field) = page.field(id)
    {
        let rect = to_display_rect(field.rect, scale);
        let pointer = Point::new(px, py);
        if let Some(corner) = Corner::ALL
            .into_iter()
            .find(|c| c.point_of(&rect).distance(pointer) <= handle_radius)
        {
            return Some(Hit {
                field: id,
                handle: Some(corner),
            });
        }
    }

    page.fields
        .iter()
        .rev()
        .find(|f| to_display_rect(f.rect, scale).contains(px, py))
        .map(|f| Hit {
            field: f.id,
            handle: None,
        })
}
