//! Builder engine: the single owner of the template while it is edited.
//!
//! Every change to the template goes through [`BuilderEngine::apply`] as a
//! [`FieldMutation`], whether it comes from a tool reacting to pointer
//! input, from a [`DragSession`], or from a direct API call. Mutations are
//! synchronous and infallible: one that names an unknown page or field is a
//! silent no-op (the UI only ever issues ids it created).
//!
//! Interactive moves and resizes are clamped to the canonical page;
//! programmatic [`FieldMutation::SetRect`] is stored as given.

use crate::config::BuilderConfig;
use crate::gesture::{Corner, DragSession, Gesture, GestureKind};
use crate::hit::hit_test;
use crate::input::InputEvent;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::{Tool, ToolContext};
use serde::Deserialize;
use sf_core::geometry::{self, PageFormat};
use sf_core::{
    Field, FieldId, FieldKind, FieldRole, Page, PageId, Point, PredefinedCatalog, Rect, Template,
    TemplateError, TemplateRepository, Vec2,
};

/// Where to move a field in its page's z-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    Front,
    Back,
}

/// Change to a field's pre-defined binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum BindingChange {
    #[default]
    Keep,
    Clear,
    Set {
        #[serde(rename = "valueId")]
        value_id: String,
        #[serde(default)]
        label: Option<String>,
    },
}

/// Configuration edits for one field. `None` leaves a property unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldPatch {
    pub placeholder: Option<String>,
    pub required: Option<bool>,
    pub role: Option<FieldRole>,
    /// Only honoured on `select` fields.
    pub options: Option<Vec<String>>,
    pub binding: BindingChange,
}

/// A mutation of the template from canvas interaction or API calls.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldMutation {
    AddField {
        page: PageId,
        field: Box<Field>,
    },
    /// Interactive move by a canonical-pixel delta, clamped to the page.
    MoveField {
        id: FieldId,
        dx: f64,
        dy: f64,
    },
    /// Store a rectangle verbatim.
    SetRect {
        id: FieldId,
        rect: Rect,
    },
    RemoveField {
        id: FieldId,
    },
    Configure {
        id: FieldId,
        patch: Box<FieldPatch>,
    },
    /// Copy a field (new id, offset, clamped) to the top of its page.
    DuplicateField {
        id: FieldId,
        new_id: FieldId,
    },
    Reorder {
        id: FieldId,
        to: ZOrder,
    },
    AddPage {
        page: Box<Page>,
    },
    RemovePage {
        id: PageId,
    },
}

/// Result of routing one input event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputOutcome {
    /// The template or the view (zoom) changed.
    pub changed: bool,
    /// Id of a field the event created.
    pub added: Option<FieldId>,
}

pub struct BuilderEngine {
    template: Template,
    config: BuilderConfig,
    zoom: f64,
    /// Field whose gesture currently owns global pointer events.
    pointer_capture: Option<FieldId>,
}

impl BuilderEngine {
    pub fn new(template: Template, config: BuilderConfig) -> Self {
        Self {
            template,
            config,
            zoom: 1.0,
            pointer_capture: None,
        }
    }

    /// Start a fresh document with one blank page.
    pub fn blank(format: PageFormat, config: BuilderConfig) -> Self {
        let mut engine = Self::new(Template::new(format), config);
        engine.add_page();
        engine
    }

    /// Open whatever the repository holds, or a blank A4 document.
    pub fn load(
        repo: &dyn TemplateRepository,
        config: BuilderConfig,
    ) -> Result<Self, TemplateError> {
        Ok(match repo.load()? {
            Some(template) => Self::new(template, config),
            None => Self::blank(PageFormat::default(), config),
        })
    }

    pub fn save(&self, repo: &mut dyn TemplateRepository) -> Result<(), TemplateError> {
        repo.save(&self.template)
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn into_template(self) -> Template {
        self.template
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the canvas zoom, clamped to the configured range.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.zoom = self.config.clamp_zoom(zoom);
        self.zoom
    }

    /// Display scale of a page on the builder canvas: the canonical page
    /// width stretched by the zoom factor.
    pub fn canvas_scale(&self, format: PageFormat) -> f64 {
        geometry::display_scale(format, geometry::canonical_width_px(format) * self.zoom)
    }

    /// On-screen size of a page at the current zoom.
    pub fn canvas_size(&self, page: PageId) -> Option<(f64, f64)> {
        let page = self.template.page(page)?;
        let (w, h) = geometry::canonical_size_px(page.format);
        let scale = self.canvas_scale(page.format);
        Some((w * scale, h * scale))
    }

    /// Field rectangle as drawn on the builder canvas.
    pub fn display_rect(&self, id: FieldId) -> Option<Rect> {
        let (page, field) = self.template.find_field(id)?;
        Some(geometry::to_display_rect(
            field.rect,
            self.canvas_scale(page.format),
        ))
    }

    pub fn pointer_capture(&self) -> Option<FieldId> {
        self.pointer_capture
    }

    pub(crate) fn set_pointer_capture(&mut self, capture: Option<FieldId>) {
        self.pointer_capture = capture;
    }

    // ─── Pages ───────────────────────────────────────────────────────────

    pub fn set_default_format(&mut self, format: PageFormat) {
        self.template.format = Some(format);
    }

    /// Append a blank page in the template's default format.
    pub fn add_page(&mut self) -> PageId {
        let page = Page::blank(self.template.default_format());
        let id = page.id;
        self.apply(FieldMutation::AddPage {
            page: Box::new(page),
        });
        id
    }

    // ─── Fields ──────────────────────────────────────────────────────────

    /// Add a field of `kind` at the default origin, on top of the page.
    pub fn add_field(&mut self, page: PageId, kind: FieldKind) -> Option<FieldId> {
        let (x, y) = self.config.default_origin;
        self.place_field(page, kind, Point::new(x, y))
    }

    /// Add a field whose top-left corner lands under a drop point given in
    /// page-local display pixels.
    pub fn add_field_at(&mut self, page: PageId, kind: FieldKind, drop: Point) -> Option<FieldId> {
        let format = self.template.page(page)?.format;
        let origin = geometry::from_display_delta(drop.to_vec2(), self.canvas_scale(format));
        self.place_field(page, kind, origin.to_point())
    }

    fn place_field(&mut self, page: PageId, kind: FieldKind, origin: Point) -> Option<FieldId> {
        let field = new_field(self.template.page(page)?, kind, origin, &self.config);
        let id = field.id;
        self.apply(FieldMutation::AddField {
            page,
            field: Box::new(field),
        });
        Some(id)
    }

    pub fn remove_field(&mut self, id: FieldId) -> bool {
        self.apply(FieldMutation::RemoveField { id })
    }

    pub fn configure(&mut self, id: FieldId, patch: FieldPatch) -> bool {
        self.apply(FieldMutation::Configure {
            id,
            patch: Box::new(patch),
        })
    }

    /// Bind a field to a catalog key offered for its type. Keys the catalog
    /// does not list for that type are refused.
    pub fn bind_predefined(
        &mut self,
        id: FieldId,
        catalog: &PredefinedCatalog,
        value_id: &str,
    ) -> bool {
        let Some((_, field)) = self.template.find_field(id) else {
            return false;
        };
        let Some(option) = catalog.find(field.kind, value_id) else {
            log::debug!("{value_id} is not offered for {} fields", field.kind.name());
            return false;
        };
        let binding = BindingChange::Set {
            value_id: option.value.clone(),
            label: Some(option.label.clone()),
        };
        self.configure(
            id,
            FieldPatch {
                binding,
                ..FieldPatch::default()
            },
        )
    }

    pub fn duplicate_field(&mut self, id: FieldId) -> Option<FieldId> {
        let (_, field) = self.template.find_field(id)?;
        let new_id = FieldId::with_prefix(field.kind.name());
        self.apply(FieldMutation::DuplicateField { id, new_id })
            .then_some(new_id)
    }

    pub fn field_rect(&self, id: FieldId) -> Option<Rect> {
        self.template.find_field(id).map(|(_, f)| f.rect)
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    /// Start dragging a field; `pointer` is in page-local display pixels.
    pub fn begin_drag(&mut self, id: FieldId, pointer: Point) -> Option<DragSession<'_>> {
        self.begin_gesture(id, GestureKind::Move, pointer)
    }

    /// Start resizing a field from one of its corner handles.
    pub fn begin_resize(
        &mut self,
        id: FieldId,
        corner: Corner,
        pointer: Point,
    ) -> Option<DragSession<'_>> {
        self.begin_gesture(id, GestureKind::Resize(corner), pointer)
    }

    fn begin_gesture(
        &mut self,
        id: FieldId,
        kind: GestureKind,
        pointer: Point,
    ) -> Option<DragSession<'_>> {
        let gesture = self.gesture_for(id, kind, pointer)?;
        Some(DragSession::new(self, gesture))
    }

    pub(crate) fn gesture_for(&self, id: FieldId, kind: GestureKind, pointer: Point) -> Option<Gesture> {
        gesture_in(&self.template, &self.config, self.zoom, id, kind, pointer)
    }

    // ─── Input routing ───────────────────────────────────────────────────

    /// Route one input event through `tool`, apply what it produces, and
    /// sync the pointer capture with the tool's gesture state.
    pub fn handle_input(&mut self, tool: &mut dyn Tool, event: &InputEvent) -> InputOutcome {
        if let InputEvent::Key { key, modifiers } = event
            && let Some(action) = ShortcutMap::resolve(key, *modifiers)
            && let Some(zoom) = self.zoom_for(action)
        {
            let before = self.zoom;
            return InputOutcome {
                changed: self.set_zoom(zoom) != before,
                added: None,
            };
        }

        let hit = event.position().and_then(|(page_id, p)| {
            let page = self.template.page(page_id)?;
            hit_test(
                page,
                self.canvas_scale(page.format),
                p.x,
                p.y,
                tool.selected(),
                self.config.handle_radius,
            )
        });

        let mutations = {
            let ctx = ToolContext {
                template: &self.template,
                config: &self.config,
                zoom: self.zoom,
                hit,
            };
            tool.handle(event, &ctx)
        };

        let mut outcome = InputOutcome::default();
        for mutation in mutations {
            if let FieldMutation::AddField { field, .. } = &mutation {
                outcome.added = Some(field.id);
            }
            outcome.changed |= self.apply(mutation);
        }
        self.pointer_capture = tool.captured();
        outcome
    }

    /// Tear down any gesture `tool` holds (canvas unmounted mid-drag).
    pub fn cancel_gesture(&mut self, tool: &mut dyn Tool) {
        tool.cancel();
        self.pointer_capture = None;
    }

    fn zoom_for(&self, action: ShortcutAction) -> Option<f64> {
        match action {
            ShortcutAction::ZoomIn => Some(self.zoom + self.config.zoom_step),
            ShortcutAction::ZoomOut => Some(self.zoom - self.config.zoom_step),
            ShortcutAction::ZoomReset => Some(1.0),
            _ => None,
        }
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Apply a mutation. Returns whether the template changed.
    pub fn apply(&mut self, mutation: FieldMutation) -> bool {
        match mutation {
            FieldMutation::AddField { page, field } => match self.template.page_mut(page) {
                Some(p) => {
                    log::debug!("add {} field {} on {page}", field.kind.name(), field.id);
                    p.fields.push(*field);
                    true
                }
                None => false,
            },
            FieldMutation::MoveField { id, dx, dy } => {
                let Some(page) = self.page_of_mut(id) else {
                    return false;
                };
                let format = page.format;
                match page.field_mut(id) {
                    Some(field) => {
                        let moved = geometry::clamp_to_page(
                            field.rect.translate(Vec2::new(dx, dy)),
                            format,
                        );
                        let changed = moved != field.rect;
                        field.rect = moved;
                        changed
                    }
                    None => false,
                }
            }
            FieldMutation::SetRect { id, rect } => match self.field_mut(id) {
                Some(field) => {
                    let changed = field.rect != rect;
                    field.rect = rect;
                    changed
                }
                None => false,
            },
            FieldMutation::RemoveField { id } => match self.page_of_mut(id) {
                Some(page) => {
                    page.fields.retain(|f| f.id != id);
                    log::debug!("removed field {id}");
                    true
                }
                None => false,
            },
            FieldMutation::Configure { id, patch } => match self.field_mut(id) {
                Some(field) => apply_patch(field, *patch),
                None => false,
            },
            FieldMutation::DuplicateField { id, new_id } => {
                let offset = self.config.duplicate_offset;
                let Some(page) = self.page_of_mut(id) else {
                    return false;
                };
                let format = page.format;
                let Some(mut copy) = page.field(id).cloned() else {
                    return false;
                };
                copy.id = new_id;
                copy.rect =
                    geometry::clamp_to_page(copy.rect.translate(Vec2::new(offset, offset)), format);
                page.fields.push(copy);
                true
            }
            FieldMutation::Reorder { id, to } => {
                let Some(page) = self.page_of_mut(id) else {
                    return false;
                };
                let Some(pos) = page.position_of(id) else {
                    return false;
                };
                let target = match to {
                    ZOrder::Front => page.fields.len() - 1,
                    ZOrder::Back => 0,
                };
                if pos == target {
                    return false;
                }
                let field = page.fields.remove(pos);
                page.fields.insert(target, field);
                true
            }
            FieldMutation::AddPage { page } => {
                log::debug!("add {} page {}", page.format.name(), page.id);
                self.template.pages.push(*page);
                true
            }
            FieldMutation::RemovePage { id } => {
                let before = self.template.pages.len();
                self.template.pages.retain(|p| p.id != id);
                before != self.template.pages.len()
            }
        }
    }

    fn page_of_mut(&mut self, id: FieldId) -> Option<&mut Page> {
        self.template
            .pages
            .iter_mut()
            .find(|p| p.field(id).is_some())
    }

    fn field_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        self.template
            .pages
            .iter_mut()
            .find_map(|p| p.field_mut(id))
    }
}

/// Build a new field of `kind` with its top-left at `origin`, kept on the page.
pub(crate) fn new_field(page: &Page, kind: FieldKind, origin: Point, config: &BuilderConfig) -> Field {
    let (w, h) = config.default_size_for(kind);
    let rect = geometry::clamp_to_page(Rect::new(origin.x, origin.y, w, h), page.format);
    let mut field = Field::new(FieldId::with_prefix(kind.name()), kind, rect);
    if kind == FieldKind::Select {
        field.options = Some(Default::default());
    }
    field
}

/// Gesture for a field of `template` on a canvas at `zoom`.
pub(crate) fn gesture_in(
    template: &Template,
    config: &BuilderConfig,
    zoom: f64,
    id: FieldId,
    kind: GestureKind,
    pointer: Point,
) -> Option<Gesture> {
    let (page, field) = template.find_field(id)?;
    let scale = geometry::display_scale(
        page.format,
        geometry::canonical_width_px(page.format) * zoom,
    );
    Some(Gesture::new(
        id,
        kind,
        pointer,
        field.rect,
        scale,
        page.format,
        (config.min_width, config.min_height),
    ))
}

fn apply_patch(field: &mut Field, patch: FieldPatch) -> bool {
    let before = field.clone();
    if let Some(placeholder) = patch.placeholder {
        field.placeholder = placeholder;
    }
    if let Some(required) = patch.required {
        field.required = required;
    }
    if let Some(role) = patch.role {
        field.role = Some(role);
    }
    if let Some(options) = patch.options {
        if field.kind == FieldKind::Select {
            field.options = Some(options.into_iter().collect());
        } else {
            log::debug!("ignoring options on {} field {}", field.kind.name(), field.id);
        }
    }
    match patch.binding {
        BindingChange::Keep => {}
        BindingChange::Clear => {
            field.pre_defined_value_id = None;
            field.pre_defined_label = None;
        }
        BindingChange::Set { value_id, label } => {
            field.pre_defined_value_id = Some(value_id);
            field.pre_defined_label = label;
        }
    }
    *field != before
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> (BuilderEngine, PageId) {
        let engine = BuilderEngine::blank(PageFormat::A4, BuilderConfig::default());
        let page = engine.template().pages[0].id;
        (engine, page)
    }

    #[test]
    fn add_field_uses_default_sizes() {
        let (mut e, page) = engine();
        let text = e.add_field(page, FieldKind::Text).unwrap();
        let check = e.add_field(page, FieldKind::Checkbox).unwrap();
        assert_eq!(e.field_rect(text), Some(Rect::new(40.0, 40.0, 150.0, 40.0)));
        assert_eq!(e.field_rect(check), Some(Rect::new(40.0, 40.0, 20.0, 20.0)));
        // Newest field is on top.
        assert_eq!(e.template().pages[0].fields.last().map(|f| f.id), Some(check));
    }

    #[test]
    fn add_field_on_unknown_page_is_noop() {
        let (mut e, _) = engine();
        assert!(e.add_field(PageId::intern("b_nowhere"), FieldKind::Text).is_none());
        assert_eq!(e.template().field_count(), 0);
    }

    #[test]
    fn drop_point_is_unscaled_by_zoom() {
        let (mut e, page) = engine();
        e.set_zoom(2.0);
        let id = e.add_field_at(page, FieldKind::Date, Point::new(300.0, 200.0)).unwrap();
        assert_eq!(e.field_rect(id), Some(Rect::new(150.0, 100.0, 150.0, 40.0)));
    }

    #[test]
    fn drop_near_edge_is_clamped() {
        let (mut e, page) = engine();
        let id = e.add_field_at(page, FieldKind::Text, Point::new(790.0, 10.0)).unwrap();
        let rect = e.field_rect(id).unwrap();
        let (w, _) = geometry::canonical_size_px(PageFormat::A4);
        assert!((rect.right() - w).abs() < 1e-9);
    }

    #[test]
    fn move_field_is_clamped_but_set_rect_is_not() {
        let (mut e, page) = engine();
        let id = e.add_field(page, FieldKind::Text).unwrap();
        e.apply(FieldMutation::MoveField {
            id,
            dx: -100.0,
            dy: 0.0,
        });
        assert_eq!(e.field_rect(id).map(|r| r.x), Some(0.0));

        let outside = Rect::new(-10.0, 2000.0, 150.0, 40.0);
        assert!(e.apply(FieldMutation::SetRect { id, rect: outside }));
        assert_eq!(e.field_rect(id), Some(outside));
    }

    #[test]
    fn unknown_ids_are_silent_noops() {
        let (mut e, _) = engine();
        let ghost = FieldId::intern("b_ghost");
        assert!(!e.remove_field(ghost));
        assert!(!e.apply(FieldMutation::MoveField {
            id: ghost,
            dx: 1.0,
            dy: 1.0
        }));
        assert!(!e.configure(ghost, FieldPatch::default()));
        assert!(e.begin_drag(ghost, Point::ZERO).is_none());
        assert!(e.duplicate_field(ghost).is_none());
    }

    #[test]
    fn configure_sets_properties() {
        let (mut e, page) = engine();
        let id = e.add_field(page, FieldKind::Select).unwrap();
        let changed = e.configure(
            id,
            FieldPatch {
                placeholder: Some("Plan".into()),
                required: Some(true),
                role: Some(FieldRole::Source),
                options: Some(vec!["Basic".into(), "Pro".into()]),
                binding: BindingChange::Keep,
            },
        );
        assert!(changed);
        let (_, f) = e.template().find_field(id).unwrap();
        assert_eq!(f.placeholder, "Plan");
        assert!(f.required);
        assert_eq!(f.role(), FieldRole::Source);
        assert_eq!(f.options(), ["Basic".to_string(), "Pro".to_string()]);
        // Same patch again changes nothing.
        assert!(!e.configure(
            id,
            FieldPatch {
                required: Some(true),
                ..FieldPatch::default()
            }
        ));
    }

    #[test]
    fn options_ignored_on_non_select() {
        let (mut e, page) = engine();
        let id = e.add_field(page, FieldKind::Text).unwrap();
        e.configure(
            id,
            FieldPatch {
                options: Some(vec!["x".into()]),
                ..FieldPatch::default()
            },
        );
        assert!(e.template().find_field(id).unwrap().1.options.is_none());
    }

    #[test]
    fn binding_uses_catalog_for_field_type() {
        let (mut e, page) = engine();
        let id = e.add_field(page, FieldKind::Text).unwrap();
        let mut catalog = PredefinedCatalog::new();
        catalog.insert(
            FieldKind::Text,
            sf_core::PredefinedOption::new("client.name", "Client name"),
        );
        catalog.insert(
            FieldKind::Date,
            sf_core::PredefinedOption::new("today", "Today"),
        );

        assert!(!e.bind_predefined(id, &catalog, "today"));
        assert!(e.bind_predefined(id, &catalog, "client.name"));
        let (_, f) = e.template().find_field(id).unwrap();
        assert_eq!(f.pre_defined_value_id.as_deref(), Some("client.name"));
        assert_eq!(f.pre_defined_label.as_deref(), Some("Client name"));
        assert!(f.is_prefilled());

        e.configure(
            id,
            FieldPatch {
                binding: BindingChange::Clear,
                ..FieldPatch::default()
            },
        );
        assert!(!e.template().find_field(id).unwrap().1.is_prefilled());
    }

    #[test]
    fn duplicate_and_reorder() {
        let (mut e, page) = engine();
        let a = e.add_field(page, FieldKind::Text).unwrap();
        let b = e.add_field(page, FieldKind::Date).unwrap();
        let copy = e.duplicate_field(a).unwrap();
        assert_eq!(e.field_rect(copy), Some(Rect::new(60.0, 60.0, 150.0, 40.0)));

        let order = |e: &BuilderEngine| -> Vec<FieldId> {
            e.template().pages[0].fields.iter().map(|f| f.id).collect()
        };
        assert_eq!(order(&e), vec![a, b, copy]);
        assert!(e.apply(FieldMutation::Reorder { id: a, to: ZOrder::Front }));
        assert_eq!(order(&e), vec![b, copy, a]);
        assert!(e.apply(FieldMutation::Reorder { id: a, to: ZOrder::Back }));
        assert!(!e.apply(FieldMutation::Reorder { id: a, to: ZOrder::Back }));
        assert_eq!(order(&e), vec![a, b, copy]);
    }

    #[test]
    fn add_page_uses_default_format() {
        let (mut e, _) = engine();
        e.set_default_format(PageFormat::Letter);
        let p = e.add_page();
        assert_eq!(e.template().page(p).map(|p| p.format), Some(PageFormat::Letter));
        assert_eq!(e.template().pages.len(), 2);
        assert!(e.apply(FieldMutation::RemovePage { id: p }));
        assert!(!e.apply(FieldMutation::RemovePage { id: p }));
    }

    #[test]
    fn zoom_is_clamped_and_drives_canvas_size() {
        let (mut e, page) = engine();
        assert_eq!(e.set_zoom(10.0), 4.0);
        assert_eq!(e.set_zoom(0.01), 0.25);
        e.set_zoom(0.5);
        let (w, h) = e.canvas_size(page).unwrap();
        let (cw, ch) = geometry::canonical_size_px(PageFormat::A4);
        assert!((w - cw / 2.0).abs() < 1e-9 && (h - ch / 2.0).abs() < 1e-9);
    }
}
