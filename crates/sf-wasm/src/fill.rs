//! Fill view controller.

use crate::{error_json, to_json};
use serde_json::{Value, json};
use sf_core::{FieldId, PredefinedCatalog, Template};
use sf_export::{ExportConfig, ExportWarning, export_pdf};
use sf_fill::{FillConfig, FillLayout, FillSession, PrefillLookup};
use wasm_bindgen::prelude::*;

/// The WASM-facing fill controller: one signer, one template.
#[wasm_bindgen]
pub struct SignFill {
    session: FillSession,
    layout: FillLayout,
    export_config: ExportConfig,
    warnings: Vec<ExportWarning>,
}

#[wasm_bindgen]
impl SignFill {
    /// Start filling `template_json`. `prefill_json` is the sender's data
    /// object and `catalog_json` the predefined options; either may be
    /// empty.
    #[wasm_bindgen(constructor)]
    pub fn new(
        template_json: &str,
        prefill_json: &str,
        catalog_json: &str,
        viewport_width: f64,
    ) -> Result<SignFill, JsError> {
        let template =
            Template::from_json(template_json).map_err(|e| JsError::new(&e.to_string()))?;
        let lookup: PrefillLookup = parse_or_default(prefill_json)?;
        let catalog: PredefinedCatalog = parse_or_default(catalog_json)?;
        Ok(Self::start(template, &lookup, &catalog, viewport_width))
    }

    /// Recompute placement after a viewport resize.
    pub fn resize(&mut self, viewport_width: f64) {
        self.layout = self.session.layout(viewport_width);
    }

    pub fn layout_json(&self) -> String {
        to_json(&self.layout, "{}")
    }

    /// Every field with its display rect, state and value.
    pub fn views_json(&self) -> String {
        to_json(&self.session.views(&self.layout), "[]")
    }

    // ─── Navigation ──────────────────────────────────────────────────────

    pub fn active(&self) -> Option<String> {
        self.session.active().map(|id| id.to_string())
    }

    pub fn activate(&mut self, id: &str) -> bool {
        self.session.activate(FieldId::intern(id))
    }

    pub fn next(&mut self) -> Option<String> {
        self.session.next().map(|id| id.to_string())
    }

    pub fn previous(&mut self) -> Option<String> {
        self.session.previous().map(|id| id.to_string())
    }

    pub fn goto(&mut self, index: usize) -> Option<String> {
        self.session.goto(index).map(|id| id.to_string())
    }

    /// Scroll offset that brings the active field into view.
    pub fn scroll_target(&self) -> Option<f64> {
        self.session.scroll_target(&self.layout)
    }

    // ─── Values ──────────────────────────────────────────────────────────

    /// Commit a value given as JSON (`"text"` or `true`). Returns
    /// `{"ok":true,"changed":…}` or `{"ok":false,"error":…}`.
    pub fn commit(&mut self, id: &str, value_json: &str) -> String {
        let raw: Value = match serde_json::from_str(value_json) {
            Ok(v) => v,
            Err(e) => return error_json(&e.to_string()),
        };
        match self.session.commit_json(FieldId::intern(id), &raw) {
            Ok(changed) => json!({ "ok": true, "changed": changed }).to_string(),
            Err(e) => error_json(&e.to_string()),
        }
    }

    pub fn clear(&mut self, id: &str) -> bool {
        self.session.clear(FieldId::intern(id))
    }

    pub fn values_json(&self) -> String {
        to_json(self.session.values(), "{}")
    }

    pub fn progress_json(&self) -> String {
        to_json(&self.session.progress(), "{}")
    }

    pub fn can_submit(&self) -> bool {
        self.session.can_submit()
    }

    /// `{"ok":true,"values":{…}}`, or `{"ok":false,"missing":[…]}` with the
    /// first missing field made active.
    pub fn submit_json(&mut self) -> String {
        match self.session.submit() {
            Ok(values) => json!({ "ok": true, "values": values }).to_string(),
            Err(e) => json!({ "ok": false, "error": e.to_string(), "missing": e.missing })
                .to_string(),
        }
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Replace the export tuning. Returns `false` on invalid JSON.
    pub fn set_export_config_json(&mut self, json: &str) -> bool {
        match serde_json::from_str(json) {
            Ok(config) => {
                self.export_config = config;
                true
            }
            Err(_) => false,
        }
    }

    /// Flatten the submitted values into a PDF. `base_pdf` is the background
    /// document, or empty when the template has none. Fails, naming the
    /// missing fields, while required fields are empty.
    pub fn export_pdf(&mut self, base_pdf: &[u8]) -> Result<Vec<u8>, JsError> {
        let values = self
            .session
            .submit()
            .map_err(|e| JsError::new(&e.to_string()))?;
        let base = (!base_pdf.is_empty()).then_some(base_pdf);
        let output = export_pdf(self.session.template(), &values, base, &self.export_config)
            .map_err(|e| JsError::new(&e.to_string()))?;
        self.warnings = output.warnings;
        Ok(output.bytes)
    }

    /// Warnings from the last export as `[{"field":…,"message":…}]`.
    pub fn export_warnings_json(&self) -> String {
        let warnings: Vec<Value> = self
            .warnings
            .iter()
            .map(|w| json!({ "field": w.field, "message": w.message }))
            .collect();
        to_json(&warnings, "[]")
    }
}

impl SignFill {
    fn start(
        template: Template,
        lookup: &PrefillLookup,
        catalog: &PredefinedCatalog,
        viewport_width: f64,
    ) -> Self {
        let session = FillSession::start(template, lookup, catalog, FillConfig::default());
        let layout = session.layout(viewport_width);
        Self {
            session,
            layout,
            export_config: ExportConfig::default(),
            warnings: Vec::new(),
        }
    }
}

fn parse_or_default<T: serde::de::DeserializeOwned + Default>(json: &str) -> Result<T, JsError> {
    if json.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(json).map_err(|e| JsError::new(&e.to_string()))
}
