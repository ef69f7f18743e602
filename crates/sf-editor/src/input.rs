//! Input abstraction layer.
//!
//! Normalizes mouse, touch and pen events from the builder canvas into a
//! unified `InputEvent` consumed by tools. Coordinates are page-local
//! display pixels: origin at the page's top-left corner as drawn, at the
//! canvas's current zoom.

use sf_core::PageId;
use sf_core::Point;

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A normalized input event from any pointing device or the keyboard.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed on a page.
    PointerDown {
        page: PageId,
        x: f64,
        y: f64,
        modifiers: Modifiers,
    },

    /// Pointer moved. During a gesture this arrives from the global
    /// listener, still relative to the page the gesture started on.
    PointerMove {
        page: PageId,
        x: f64,
        y: f64,
        modifiers: Modifiers,
    },

    /// Pointer released.
    PointerUp {
        page: PageId,
        x: f64,
        y: f64,
        modifiers: Modifiers,
    },

    /// The gesture was torn down without a release (pointer cancel,
    /// canvas unmounted mid-drag).
    Cancel,

    /// Key press, `key` as reported by the DOM (`"Delete"`, `"ArrowLeft"`, `"+"`).
    Key { key: String, modifiers: Modifiers },
}

impl InputEvent {
    pub fn pointer_down(page: PageId, x: f64, y: f64, modifiers: Modifiers) -> Self {
        Self::PointerDown {
            page,
            x,
            y,
            modifiers,
        }
    }

    pub fn pointer_move(page: PageId, x: f64, y: f64, modifiers: Modifiers) -> Self {
        Self::PointerMove {
            page,
            x,
            y,
            modifiers,
        }
    }

    pub fn pointer_up(page: PageId, x: f64, y: f64, modifiers: Modifiers) -> Self {
        Self::PointerUp {
            page,
            x,
            y,
            modifiers,
        }
    }

    pub fn key(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self::Key {
            key: key.into(),
            modifiers,
        }
    }

    /// Extract the page and position if this is a pointer event.
    pub fn position(&self) -> Option<(PageId, Point)> {
        match self {
            Self::PointerDown { page, x, y, .. }
            | Self::PointerMove { page, x, y, .. }
            | Self::PointerUp { page, x, y, .. } => Some((*page, Point::new(*x, *y))),
            _ => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::PointerDown { modifiers, .. }
            | Self::PointerMove { modifiers, .. }
            | Self::PointerUp { modifiers, .. }
            | Self::Key { modifiers, .. } => *modifiers,
            Self::Cancel => Modifiers::NONE,
        }
    }
}
