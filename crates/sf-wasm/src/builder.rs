//! Builder canvas controller.

use crate::{error_json, to_json};
use sf_core::{
    FieldId, FieldKind, PageFormat, PageId, Point, PredefinedCatalog, Template,
};
use sf_editor::{
    BuilderConfig, BuilderEngine, FieldPatch, InputEvent, InputOutcome, Modifiers, PlaceTool,
    SelectTool, Tool, ToolKind,
};
use wasm_bindgen::prelude::*;

/// The WASM-facing builder controller.
///
/// Owns the builder engine and the tools. Every pointer and key event from
/// the canvas goes through this struct; the host re-renders when a handler
/// returns `true`.
#[wasm_bindgen]
pub struct SignBuilder {
    engine: BuilderEngine,
    select_tool: SelectTool,
    /// Armed palette entry, if any.
    place_tool: Option<PlaceTool>,
}

impl Default for SignBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl SignBuilder {
    /// A builder over a blank A4 template.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            engine: BuilderEngine::blank(PageFormat::A4, BuilderConfig::default()),
            select_tool: SelectTool::new(),
            place_tool: None,
        }
    }

    // ─── Template ────────────────────────────────────────────────────────

    /// Replace the template. Returns `false` (keeping the current one) on a
    /// parse error.
    pub fn set_template_json(&mut self, json: &str) -> bool {
        let template = if json.trim().is_empty() {
            let mut t = Template::new(PageFormat::A4);
            t.pages.push(sf_core::Page::blank(PageFormat::A4));
            t
        } else {
            match Template::from_json(json) {
                Ok(t) => t,
                Err(e) => {
                    log::warn!("template rejected: {e}");
                    return false;
                }
            }
        };
        self.teardown();
        let config = self.engine.config().clone();
        self.engine = BuilderEngine::new(template, config);
        self.select_tool.selected = None;
        true
    }

    pub fn template_json(&self) -> String {
        self.engine
            .template()
            .to_json()
            .unwrap_or_else(|_| r#"{"pages":[]}"#.to_string())
    }

    /// Replace the tuning. Returns `false` on invalid JSON.
    pub fn set_config_json(&mut self, json: &str) -> bool {
        let Ok(config) = serde_json::from_str::<BuilderConfig>(json) else {
            return false;
        };
        let template = self.engine.template().clone();
        let zoom = self.engine.zoom();
        self.teardown();
        self.engine = BuilderEngine::new(template, config);
        self.engine.set_zoom(zoom);
        true
    }

    pub fn set_default_format(&mut self, format: &str) -> bool {
        match PageFormat::from_name(format) {
            Some(format) => {
                self.engine.set_default_format(format);
                true
            }
            None => false,
        }
    }

    pub fn add_page(&mut self) -> String {
        self.engine.add_page().to_string()
    }

    pub fn remove_page(&mut self, page: &str) -> bool {
        self.engine.apply(sf_editor::FieldMutation::RemovePage {
            id: PageId::intern(page),
        })
    }

    // ─── Tools ───────────────────────────────────────────────────────────

    /// Name of the active tool: `select` or a field type.
    pub fn tool(&self) -> String {
        match self.active_kind() {
            ToolKind::Select => "select".to_string(),
            ToolKind::Place(kind) => kind.name().to_string(),
        }
    }

    /// Switch tools by name. Unknown names leave the current tool active.
    pub fn set_tool(&mut self, name: &str) -> bool {
        let next = if name == "select" {
            None
        } else {
            match FieldKind::from_name(name) {
                Some(kind) => Some(PlaceTool::new(kind)),
                None => return false,
            }
        };
        self.teardown();
        self.place_tool = next;
        true
    }

    pub fn selected(&self) -> Option<String> {
        self.select_tool.selected.map(|id| id.to_string())
    }

    /// Select a field (e.g. from a side panel). Returns `false` for
    /// unknown ids.
    pub fn select(&mut self, id: &str) -> bool {
        let id = FieldId::intern(id);
        if self.engine.template().find_field(id).is_none() {
            return false;
        }
        self.set_tool("select");
        self.select_tool.selected = Some(id);
        true
    }

    pub fn deselect(&mut self) {
        self.select_tool.selected = None;
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Pointer down on a page. Coordinates are page-local display pixels.
    /// Returns `true` if the canvas must re-render.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        page: &str,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let mods = modifiers(shift, ctrl, alt, meta);
        let before = self.select_tool.selected;
        let outcome = self.route(&InputEvent::pointer_down(PageId::intern(page), x, y, mods));
        outcome.changed || before != self.select_tool.selected
    }

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_move(
        &mut self,
        page: &str,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let mods = modifiers(shift, ctrl, alt, meta);
        self.route(&InputEvent::pointer_move(PageId::intern(page), x, y, mods))
            .changed
    }

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_up(
        &mut self,
        page: &str,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let mods = modifiers(shift, ctrl, alt, meta);
        self.route(&InputEvent::pointer_up(PageId::intern(page), x, y, mods))
            .changed
    }

    pub fn handle_key(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let before = self.select_tool.selected;
        let outcome = self.route(&InputEvent::key(key, modifiers(shift, ctrl, alt, meta)));
        outcome.changed || before != self.select_tool.selected
    }

    /// Abort the gesture in progress, restoring the field.
    pub fn cancel(&mut self) -> bool {
        self.route(&InputEvent::Cancel).changed
    }

    /// Release everything held on behalf of the canvas (unmount).
    pub fn teardown(&mut self) {
        match self.place_tool.as_mut() {
            Some(tool) => self.engine.cancel_gesture(tool),
            None => self.engine.cancel_gesture(&mut self.select_tool),
        }
    }

    /// Field currently holding the pointer capture.
    pub fn pointer_capture(&self) -> Option<String> {
        self.engine.pointer_capture().map(|id| id.to_string())
    }

    // ─── Fields ──────────────────────────────────────────────────────────

    /// Add a field at the default spot. Returns its id.
    pub fn add_field(&mut self, page: &str, kind: &str) -> Option<String> {
        let kind = FieldKind::from_name(kind)?;
        let id = self.engine.add_field(PageId::intern(page), kind)?;
        self.select_tool.selected = Some(id);
        Some(id.to_string())
    }

    /// Add a field dropped from the palette at a display-pixel point.
    pub fn drop_field(&mut self, page: &str, kind: &str, x: f64, y: f64) -> Option<String> {
        let kind = FieldKind::from_name(kind)?;
        let id = self
            .engine
            .add_field_at(PageId::intern(page), kind, Point::new(x, y))?;
        self.select_tool.selected = Some(id);
        Some(id.to_string())
    }

    pub fn remove_field(&mut self, id: &str) -> bool {
        let id = FieldId::intern(id);
        if self.select_tool.selected == Some(id) {
            self.select_tool.selected = None;
        }
        self.engine.remove_field(id)
    }

    pub fn duplicate_field(&mut self, id: &str) -> Option<String> {
        let new_id = self.engine.duplicate_field(FieldId::intern(id))?;
        self.select_tool.selected = Some(new_id);
        Some(new_id.to_string())
    }

    /// Apply a settings-panel patch (`{"placeholder":…,"required":…}`).
    pub fn configure(&mut self, id: &str, patch_json: &str) -> bool {
        match serde_json::from_str::<FieldPatch>(patch_json) {
            Ok(patch) => self.engine.configure(FieldId::intern(id), patch),
            Err(e) => {
                log::warn!("field patch rejected: {e}");
                false
            }
        }
    }

    /// Bind a field to a catalog key. `catalog_json` maps field types to
    /// `[{"value":…,"label":…}]`.
    pub fn bind_predefined(&mut self, id: &str, catalog_json: &str, value_id: &str) -> bool {
        let Ok(catalog) = serde_json::from_str::<PredefinedCatalog>(catalog_json) else {
            return false;
        };
        self.engine
            .bind_predefined(FieldId::intern(id), &catalog, value_id)
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn zoom(&self) -> f64 {
        self.engine.zoom()
    }

    /// Returns the zoom actually applied after clamping.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.engine.set_zoom(zoom)
    }

    /// `[width, height]` of a page at the current zoom; empty if unknown.
    pub fn canvas_size(&self, page: &str) -> Vec<f64> {
        self.engine
            .canvas_size(PageId::intern(page))
            .map(|(w, h)| vec![w, h])
            .unwrap_or_default()
    }

    /// Display rect of a field as JSON, or `null`.
    pub fn display_rect_json(&self, id: &str) -> String {
        to_json(&self.engine.display_rect(FieldId::intern(id)), "null")
    }

    /// Validation issues of the current template as
    /// `{"ok":true,"issues":[...]}`.
    pub fn issues_json(&self) -> String {
        let issues: Vec<String> = self
            .engine
            .template()
            .validate()
            .iter()
            .map(|i| i.to_string())
            .collect();
        if issues.is_empty() {
            return r#"{"ok":true,"issues":[]}"#.to_string();
        }
        match serde_json::to_string(&issues) {
            Ok(json) => format!(r#"{{"ok":true,"issues":{json}}}"#),
            Err(e) => error_json(&e.to_string()),
        }
    }
}

impl SignBuilder {
    fn active_kind(&self) -> ToolKind {
        match &self.place_tool {
            Some(tool) => tool.kind(),
            None => ToolKind::Select,
        }
    }

    fn route(&mut self, event: &InputEvent) -> InputOutcome {
        let outcome = match self.place_tool.as_mut() {
            Some(tool) => self.engine.handle_input(tool, event),
            None => self.engine.handle_input(&mut self.select_tool, event),
        };
        // A placed field becomes the selection and the palette disarms.
        if let Some(added) = outcome.added
            && self.place_tool.is_some()
        {
            self.place_tool = None;
            self.select_tool.selected = Some(added);
        }
        outcome
    }
}

fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers {
        shift,
        ctrl,
        alt,
        meta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_page(builder: &SignBuilder) -> String {
        builder.engine.template().pages[0].id.to_string()
    }

    #[test]
    fn place_then_drag() {
        let mut b = SignBuilder::new();
        let page = first_page(&b);
        assert!(b.set_tool("text"));
        assert_eq!(b.tool(), "text");

        assert!(b.handle_pointer_down(&page, 100.0, 120.0, false, false, false, false));
        let id = b.selected().unwrap();
        assert_eq!(b.tool(), "select");

        // Grab the new field and move it.
        assert!(b.handle_pointer_down(&page, 110.0, 130.0, false, false, false, false));
        assert_eq!(b.pointer_capture(), Some(id.clone()));
        assert!(b.handle_pointer_move(&page, 160.0, 160.0, false, false, false, false));
        b.handle_pointer_up(&page, 160.0, 160.0, false, false, false, false);
        assert_eq!(b.pointer_capture(), None);

        let rect = b.engine.field_rect(FieldId::intern(&id)).unwrap();
        assert_eq!((rect.x, rect.y), (150.0, 150.0));
    }

    #[test]
    fn unknown_tool_is_refused() {
        let mut b = SignBuilder::new();
        assert!(!b.set_tool("stamp"));
        assert_eq!(b.tool(), "select");
    }

    #[test]
    fn configure_from_patch_json() {
        let mut b = SignBuilder::new();
        let page = first_page(&b);
        let id = b.add_field(&page, "select").unwrap();
        assert!(b.configure(&id, r#"{"required":true,"options":["Yes","No"]}"#));
        let (_, field) = b
            .engine
            .template()
            .find_field(FieldId::intern(&id))
            .unwrap();
        assert!(field.required);
        assert_eq!(field.options().to_vec(), vec!["Yes".to_string(), "No".to_string()]);
        assert!(!b.configure(&id, "not json"));
    }

    #[test]
    fn template_survives_reload() {
        let mut b = SignBuilder::new();
        let page = first_page(&b);
        b.add_field(&page, "signature").unwrap();
        let json = b.template_json();

        let mut other = SignBuilder::new();
        assert!(other.set_template_json(&json));
        assert_eq!(other.template_json(), json);
        assert!(!other.set_template_json("{ nope"));
        assert_eq!(other.template_json(), json);
    }

    #[test]
    fn teardown_releases_capture() {
        let mut b = SignBuilder::new();
        let page = first_page(&b);
        b.add_field(&page, "text").unwrap();
        b.handle_pointer_down(&page, 50.0, 50.0, false, false, false, false);
        assert!(b.pointer_capture().is_some());
        b.teardown();
        assert_eq!(b.pointer_capture(), None);
    }
}
