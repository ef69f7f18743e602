//! Keyboard shortcut mapping for the builder canvas.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives
//! in Rust so the WASM canvas and native tests agree on it.
//!
//! - Delete / Backspace removes the selected field
//! - Arrows nudge by 1px, Shift+Arrow by 10px
//! - ⌘D duplicates, ⌘] / ⌘[ bring to front / send to back
//! - + / - / 0 zoom (with or without ⌘)

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Delete,
    Duplicate,
    /// Move the selection one step; `large` with Shift held.
    Nudge { dx: i8, dy: i8, large: bool },

    // ── Z-order ──
    BringToFront,
    SendToBack,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomReset,

    // ── UI ──
    Deselect,
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a `KeyboardEvent.key` value to an action.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if let Some((dx, dy)) = arrow(key) {
            return Some(ShortcutAction::Nudge {
                dx,
                dy,
                large: modifiers.shift,
            });
        }

        if modifiers.command() {
            return match key {
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "]" => Some(ShortcutAction::BringToFront),
                "[" => Some(ShortcutAction::SendToBack),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                _ => None,
            };
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            "=" | "+" => Some(ShortcutAction::ZoomIn),
            "-" => Some(ShortcutAction::ZoomOut),
            "0" => Some(ShortcutAction::ZoomReset),
            _ => None,
        }
    }
}

fn arrow(key: &str) -> Option<(i8, i8)> {
    match key {
        "ArrowLeft" => Some((-1, 0)),
        "ArrowRight" => Some((1, 0)),
        "ArrowUp" => Some((0, -1)),
        "ArrowDown" => Some((0, 1)),
        _ => None,
    }
}
