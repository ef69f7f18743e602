//! Tool system for canvas interactions.
//!
//! Each tool translates input events into `FieldMutation`s that the
//! `BuilderEngine` applies. The engine hit-tests pointer events before
//! calling the tool and hands the result over in [`ToolContext`].
//!
//! ## Modifier behaviors
//!
//! | Modifier | Select Tool | Place Tool |
//! |----------|-------------|------------|
//! | **Shift** | Axis-constrain drag, 10px nudge | |

use crate::builder::{FieldMutation, ZOrder, gesture_in, new_field};
use crate::config::BuilderConfig;
use crate::gesture::{Gesture, GestureKind};
use crate::hit::Hit;
use crate::input::InputEvent;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use sf_core::geometry::{self, PageFormat};
use sf_core::{FieldId, FieldKind, Point, Template};

/// The active tool determines how input events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Select,
    /// Drop a new field of this type where the pointer goes down.
    Place(FieldKind),
}

/// Read-only view of the engine handed to a tool for one event.
pub struct ToolContext<'a> {
    pub template: &'a Template,
    pub config: &'a BuilderConfig,
    pub zoom: f64,
    /// What the pointer landed on, for pointer events.
    pub hit: Option<Hit>,
}

impl ToolContext<'_> {
    /// Canvas scale of a page in `format`.
    pub fn scale(&self, format: PageFormat) -> f64 {
        geometry::display_scale(format, geometry::canonical_width_px(format) * self.zoom)
    }
}

/// Trait for tools that handle input and produce mutations.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Handle an input event, returning zero or more mutations.
    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext<'_>) -> Vec<FieldMutation>;

    /// Field whose gesture should hold the pointer capture.
    fn captured(&self) -> Option<FieldId> {
        None
    }

    /// Field whose resize handles take part in hit testing.
    fn selected(&self) -> Option<FieldId> {
        None
    }

    /// Abandon any gesture in progress.
    fn cancel(&mut self) {}
}

// ─── Select Tool ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SelectTool {
    /// Currently selected field.
    pub selected: Option<FieldId>,
    /// Move or resize in progress.
    gesture: Option<Gesture>,
}

impl SelectTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    fn key_action(
        &mut self,
        action: ShortcutAction,
        ctx: &ToolContext<'_>,
    ) -> Vec<FieldMutation> {
        let Some(id) = self.selected else {
            return vec![];
        };
        match action {
            ShortcutAction::Delete => {
                self.selected = None;
                self.gesture = None;
                vec![FieldMutation::RemoveField { id }]
            }
            ShortcutAction::Nudge { dx, dy, large } => {
                let step = if large {
                    ctx.config.nudge_large
                } else {
                    ctx.config.nudge
                };
                vec![FieldMutation::MoveField {
                    id,
                    dx: f64::from(dx) * step,
                    dy: f64::from(dy) * step,
                }]
            }
            ShortcutAction::Duplicate => {
                let Some((_, field)) = ctx.template.find_field(id) else {
                    return vec![];
                };
                let new_id = FieldId::with_prefix(field.kind.name());
                self.selected = Some(new_id);
                vec![FieldMutation::DuplicateField { id, new_id }]
            }
            ShortcutAction::BringToFront => vec![FieldMutation::Reorder {
                id,
                to: ZOrder::Front,
            }],
            ShortcutAction::SendToBack => vec![FieldMutation::Reorder {
                id,
                to: ZOrder::Back,
            }],
            ShortcutAction::Deselect => {
                self.selected = None;
                vec![]
            }
            ShortcutAction::ZoomIn | ShortcutAction::ZoomOut | ShortcutAction::ZoomReset => vec![],
        }
    }
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext<'_>) -> Vec<FieldMutation> {
        match event {
            InputEvent::PointerDown { x, y, .. } => {
                self.gesture = None;
                match ctx.hit {
                    Some(hit) => {
                        self.selected = Some(hit.field);
                        let kind = hit.handle.map_or(GestureKind::Move, GestureKind::Resize);
                        self.gesture = gesture_in(
                            ctx.template,
                            ctx.config,
                            ctx.zoom,
                            hit.field,
                            kind,
                            Point::new(*x, *y),
                        );
                    }
                    None => self.selected = None,
                }
                vec![]
            }
            InputEvent::PointerMove {
                x, y, modifiers, ..
            } => match &self.gesture {
                Some(g) => vec![FieldMutation::SetRect {
                    id: g.field,
                    rect: g.rect_at(Point::new(*x, *y), modifiers.shift),
                }],
                None => vec![],
            },
            InputEvent::PointerUp {
                x, y, modifiers, ..
            } => match self.gesture.take() {
                Some(g) => vec![FieldMutation::SetRect {
                    id: g.field,
                    rect: g.rect_at(Point::new(*x, *y), modifiers.shift),
                }],
                None => vec![],
            },
            InputEvent::Cancel => match self.gesture.take() {
                Some(g) => vec![FieldMutation::SetRect {
                    id: g.field,
                    rect: g.origin(),
                }],
                None => vec![],
            },
            InputEvent::Key { key, modifiers } => match ShortcutMap::resolve(key, *modifiers) {
                Some(action) => self.key_action(action, ctx),
                None => vec![],
            },
        }
    }

    fn captured(&self) -> Option<FieldId> {
        self.gesture.map(|g| g.field)
    }

    fn selected(&self) -> Option<FieldId> {
        self.selected
    }

    fn cancel(&mut self) {
        self.gesture = None;
    }
}

// ─── Place Tool ──────────────────────────────────────────────────────────

/// Palette drop: a pointer-down on a page adds a field with its top-left
/// corner under the pointer.
pub struct PlaceTool {
    pub field_kind: FieldKind,
    /// Last field this tool created.
    pub placed: Option<FieldId>,
}

impl PlaceTool {
    pub fn new(field_kind: FieldKind) -> Self {
        Self {
            field_kind,
            placed: None,
        }
    }
}

impl Tool for PlaceTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Place(self.field_kind)
    }

    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext<'_>) -> Vec<FieldMutation> {
        let InputEvent::PointerDown { page, x, y, .. } = event else {
            return vec![];
        };
        let Some(page) = ctx.template.page(*page) else {
            return vec![];
        };
        let origin = geometry::from_display_delta(
            Point::new(*x, *y).to_vec2(),
            ctx.scale(page.format),
        );
        let field = new_field(page, self.field_kind, origin.to_point(), ctx.config);
        self.placed = Some(field.id);
        vec![FieldMutation::AddField {
            page: page.id,
            field: Box::new(field),
        }]
    }
}

/// Build a tool from its name, as the canvas host names them.
pub fn tool_by_name(name: &str) -> Option<Box<dyn Tool>> {
    if name == "select" {
        return Some(Box::new(SelectTool::new()));
    }
    FieldKind::from_name(name).map(|kind| Box::new(PlaceTool::new(kind)) as Box<dyn Tool>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use sf_core::{Field, Page, Rect};

    fn template() -> (Template, FieldId) {
        let mut page = Page::blank(PageFormat::A4);
        let id = FieldId::intern("tool_field");
        page.fields.push(Field::new(
            id,
            FieldKind::Text,
            Rect::new(100.0, 100.0, 150.0, 40.0),
        ));
        let mut template = Template::new(PageFormat::A4);
        template.pages.push(page);
        (template, id)
    }

    fn ctx<'a>(template: &'a Template, config: &'a BuilderConfig, hit: Option<Hit>) -> ToolContext<'a> {
        ToolContext {
            template,
            config,
            zoom: 1.0,
            hit,
        }
    }

    #[test]
    fn select_tool_drag_emits_set_rect() {
        let (template, id) = template();
        let config = BuilderConfig::default();
        let page = template.pages[0].id;
        let mut tool = SelectTool::new();

        let hit = Some(Hit {
            field: id,
            handle: None,
        });
        let down = InputEvent::pointer_down(page, 110.0, 110.0, Modifiers::NONE);
        assert!(tool.handle(&down, &ctx(&template, &config, hit)).is_empty());
        assert_eq!(tool.selected, Some(id));
        assert_eq!(tool.captured(), Some(id));

        let mv = InputEvent::pointer_move(page, 130.0, 115.0, Modifiers::NONE);
        let out = tool.handle(&mv, &ctx(&template, &config, None));
        assert_eq!(
            out,
            vec![FieldMutation::SetRect {
                id,
                rect: Rect::new(120.0, 105.0, 150.0, 40.0)
            }]
        );

        let up = InputEvent::pointer_up(page, 130.0, 115.0, Modifiers::NONE);
        assert_eq!(tool.handle(&up, &ctx(&template, &config, None)).len(), 1);
        assert_eq!(tool.captured(), None);
        assert_eq!(tool.selected, Some(id));
    }

    #[test]
    fn select_tool_click_empty_deselects() {
        let (template, id) = template();
        let config = BuilderConfig::default();
        let mut tool = SelectTool {
            selected: Some(id),
            gesture: None,
        };
        let down = InputEvent::pointer_down(template.pages[0].id, 700.0, 900.0, Modifiers::NONE);
        tool.handle(&down, &ctx(&template, &config, None));
        assert_eq!(tool.selected, None);
    }

    #[test]
    fn cancel_restores_origin() {
        let (template, id) = template();
        let config = BuilderConfig::default();
        let page = template.pages[0].id;
        let mut tool = SelectTool::new();
        let hit = Some(Hit {
            field: id,
            handle: None,
        });
        tool.handle(
            &InputEvent::pointer_down(page, 110.0, 110.0, Modifiers::NONE),
            &ctx(&template, &config, hit),
        );
        let out = tool.handle(&InputEvent::Cancel, &ctx(&template, &config, None));
        assert_eq!(
            out,
            vec![FieldMutation::SetRect {
                id,
                rect: Rect::new(100.0, 100.0, 150.0, 40.0)
            }]
        );
        assert_eq!(tool.captured(), None);
    }

    #[test]
    fn arrow_keys_nudge_selection() {
        let (template, id) = template();
        let config = BuilderConfig::default();
        let mut tool = SelectTool {
            selected: Some(id),
            gesture: None,
        };
        let out = tool.handle(
            &InputEvent::key("ArrowRight", Modifiers::SHIFT),
            &ctx(&template, &config, None),
        );
        assert_eq!(
            out,
            vec![FieldMutation::MoveField {
                id,
                dx: 10.0,
                dy: 0.0
            }]
        );
        let out = tool.handle(
            &InputEvent::key("ArrowUp", Modifiers::NONE),
            &ctx(&template, &config, None),
        );
        assert_eq!(
            out,
            vec![FieldMutation::MoveField {
                id,
                dx: 0.0,
                dy: -1.0
            }]
        );
    }

    #[test]
    fn delete_key_removes_and_deselects() {
        let (template, id) = template();
        let config = BuilderConfig::default();
        let mut tool = SelectTool {
            selected: Some(id),
            gesture: None,
        };
        let out = tool.handle(
            &InputEvent::key("Delete", Modifiers::NONE),
            &ctx(&template, &config, None),
        );
        assert_eq!(out, vec![FieldMutation::RemoveField { id }]);
        assert_eq!(tool.selected, None);
        // Nothing selected: keys do nothing.
        assert!(
            tool.handle(
                &InputEvent::key("Delete", Modifiers::NONE),
                &ctx(&template, &config, None)
            )
            .is_empty()
        );
    }

    #[test]
    fn place_tool_adds_field_under_pointer() {
        let (template, _) = template();
        let config = BuilderConfig::default();
        let page = template.pages[0].id;
        let mut tool = PlaceTool::new(FieldKind::Checkbox);
        let out = tool.handle(
            &InputEvent::pointer_down(page, 300.0, 400.0, Modifiers::NONE),
            &ctx(&template, &config, None),
        );
        assert_eq!(out.len(), 1);
        let FieldMutation::AddField { page: p, field } = &out[0] else {
            panic!("expected AddField, got {:?}", out[0]);
        };
        assert_eq!(*p, page);
        assert_eq!(field.kind, FieldKind::Checkbox);
        assert_eq!(field.rect, Rect::new(300.0, 400.0, 20.0, 20.0));
        assert_eq!(tool.placed, Some(field.id));
    }

    #[test]
    fn tools_by_name() {
        assert_eq!(tool_by_name("select").map(|t| t.kind()), Some(ToolKind::Select));
        assert_eq!(
            tool_by_name("signature").map(|t| t.kind()),
            Some(ToolKind::Place(FieldKind::Signature))
        );
        assert!(tool_by_name("lasso").is_none());
    }
}
