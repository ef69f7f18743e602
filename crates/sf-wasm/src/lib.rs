//! WASM bridge for Sign Form: exposes the builder and fill engines to the
//! browser.
//!
//! Compiled via `wasm-pack build --target web`. Structured results cross the
//! boundary as JSON strings; binary output (the exported PDF) as bytes.

mod builder;
mod fill;
mod logger;

pub use builder::SignBuilder;
pub use fill::SignFill;

use serde::Serialize;
use sf_core::{PageFormat, geometry};
use wasm_bindgen::prelude::*;

/// Route `log` output to the browser console. Call once at startup;
/// `level` is one of `error`, `warn`, `info`, `debug`, `trace`.
#[wasm_bindgen]
pub fn init_logging(level: &str) {
    console_error_panic_hook_setup();
    logger::init(level.parse().unwrap_or(log::LevelFilter::Info));
}

/// Canonical pixel size of a page format as `[width, height]`.
#[wasm_bindgen]
pub fn page_size(format: &str) -> Vec<f64> {
    let (w, h) = geometry::canonical_size_px(PageFormat::from_name(format).unwrap_or_default());
    vec![w, h]
}

/// Validate template JSON. Returns `{"ok":true,"issues":[...]}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_template(json: &str) -> String {
    match sf_core::Template::from_json(json) {
        Ok(template) => {
            let issues: Vec<String> = template.validate().iter().map(|i| i.to_string()).collect();
            serde_json::json!({ "ok": true, "issues": issues }).to_string()
        }
        Err(e) => error_json(&e.to_string()),
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn to_json<T: Serialize + ?Sized>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| fallback.to_string())
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "ok": false, "error": message }).to_string()
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Sign Form WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
