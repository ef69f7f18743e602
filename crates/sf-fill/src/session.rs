//! Fill session: one signer filling one template.
//!
//! The session owns the value map and only reads the template. Each field
//! moves through `Empty → Active → Filled` (and back to `Active` when it is
//! re-opened for editing). Sender-filled fields (bound to a pre-defined key,
//! or `role = source`) are resolved once at start, shown read-only, and
//! never enter the state machine or the guided stepper.

use crate::config::FillConfig;
use crate::layout::{FieldView, FillLayout};
use crate::prefill::{PrefillLookup, resolve_prefill};
use serde::Serialize;
use sf_core::{FieldId, FieldKind, FieldValue, FormValues, PredefinedCatalog, Template};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldState {
    Empty,
    Active,
    Filled,
}

/// `completed / total` over every field of the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// Rounded percentage; 0 for an empty template.
    pub percent: u8,
}

impl Progress {
    fn new(completed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            (completed as f64 / total as f64 * 100.0).round() as u8
        };
        Self {
            completed,
            total,
            percent,
        }
    }
}

/// A value the session refused to store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    #[error("field {0} is filled by the sender")]
    ReadOnly(FieldId),

    #[error("field {field} takes a {expected} value, got {got}")]
    KindMismatch {
        field: FieldId,
        expected: &'static str,
        got: &'static str,
    },

    #[error("`{value}` is not an option of field {field}")]
    NotAnOption { field: FieldId, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingField {
    pub id: FieldId,
    pub label: String,
}

/// Submit refused: required fields without a value, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("please fill in: {}", join_labels(.missing))]
pub struct ValidationError {
    pub missing: Vec<MissingField>,
}

fn join_labels(missing: &[MissingField]) -> String {
    let labels: Vec<&str> = missing.iter().map(|m| m.label.as_str()).collect();
    labels.join(", ")
}

pub struct FillSession {
    template: Template,
    values: FormValues,
    config: FillConfig,
    /// Sender-filled, read-only fields.
    prefilled: HashSet<FieldId>,
    /// Guided navigation order: signer fields in document order.
    steps: Vec<FieldId>,
    /// Position in `steps`.
    cursor: usize,
    active: Option<FieldId>,
}

impl FillSession {
    /// Start a session. Sender-filled fields are populated from `lookup`;
    /// every other field starts empty.
    pub fn start(
        template: Template,
        lookup: &PrefillLookup,
        catalog: &PredefinedCatalog,
        config: FillConfig,
    ) -> Self {
        let mut values = FormValues::new();
        let mut prefilled = HashSet::new();
        let mut steps = Vec::new();

        for (_, field) in template.fields() {
            let resolved = resolve_prefill(field, lookup, catalog);
            if field.is_prefilled() {
                prefilled.insert(field.id);
                match resolved {
                    Some(value) => {
                        values.insert(field.id, value);
                    }
                    None => log::warn!("no pre-fill value for field {}", field.id),
                }
            } else {
                steps.push(field.id);
            }
        }

        log::debug!(
            "fill session: {} fields, {} pre-filled, {} steps",
            template.field_count(),
            prefilled.len(),
            steps.len()
        );

        Self {
            template,
            values,
            config,
            prefilled,
            steps,
            cursor: 0,
            active: None,
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn config(&self) -> &FillConfig {
        &self.config
    }

    pub fn is_read_only(&self, id: FieldId) -> bool {
        self.prefilled.contains(&id)
    }

    pub fn state(&self, id: FieldId) -> Option<FieldState> {
        self.template.find_field(id)?;
        Some(if self.prefilled.contains(&id) {
            FieldState::Filled
        } else if self.active == Some(id) {
            FieldState::Active
        } else if self.values.is_filled(id) {
            FieldState::Filled
        } else {
            FieldState::Empty
        })
    }

    // ─── Guided navigation ───────────────────────────────────────────────

    /// Fields the stepper walks through.
    pub fn steps(&self) -> &[FieldId] {
        &self.steps
    }

    /// Field under the stepper cursor.
    pub fn current(&self) -> Option<FieldId> {
        self.steps.get(self.cursor).copied()
    }

    pub fn active(&self) -> Option<FieldId> {
        self.active
    }

    /// Open a field for input. Read-only and unknown fields are ignored.
    pub fn activate(&mut self, id: FieldId) -> bool {
        if self.prefilled.contains(&id) || self.template.find_field(id).is_none() {
            return false;
        }
        if let Some(pos) = self.steps.iter().position(|s| *s == id) {
            self.cursor = pos;
        }
        self.active = Some(id);
        log::debug!("activate {id}");
        true
    }

    /// Advance the stepper and activate the field it lands on.
    pub fn next(&mut self) -> Option<FieldId> {
        if self.steps.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1).min(self.steps.len() - 1);
        let id = self.steps[self.cursor];
        self.active = Some(id);
        Some(id)
    }

    pub fn previous(&mut self) -> Option<FieldId> {
        if self.steps.is_empty() {
            return None;
        }
        self.cursor = self.cursor.saturating_sub(1);
        let id = self.steps[self.cursor];
        self.active = Some(id);
        Some(id)
    }

    /// Move the stepper to the `index`-th step.
    pub fn goto(&mut self, index: usize) -> Option<FieldId> {
        let id = *self.steps.get(index)?;
        self.activate(id);
        Some(id)
    }

    // ─── Values ──────────────────────────────────────────────────────────

    /// Commit a value. The field leaves `Active`; it is `Filled` when the
    /// value is non-empty / non-false. Unknown ids return `Ok(false)`.
    pub fn commit(&mut self, id: FieldId, value: FieldValue) -> Result<bool, CommitError> {
        let Some((_, field)) = self.template.find_field(id) else {
            return Ok(false);
        };
        if self.prefilled.contains(&id) {
            return Err(CommitError::ReadOnly(id));
        }
        if value.kind() != field.kind {
            return Err(CommitError::KindMismatch {
                field: id,
                expected: field.kind.name(),
                got: value.kind().name(),
            });
        }
        if let FieldValue::Select(choice) = &value
            && !choice.is_empty()
            && !field.options().iter().any(|o| o == choice)
        {
            return Err(CommitError::NotAnOption {
                field: id,
                value: choice.clone(),
            });
        }

        log::debug!("commit {} value for {id}", field.kind.name());
        self.values.insert(id, value);
        if self.active == Some(id) {
            self.active = None;
        }
        Ok(true)
    }

    /// Commit from the external JSON shape (`string | bool`).
    pub fn commit_json(
        &mut self,
        id: FieldId,
        raw: &serde_json::Value,
    ) -> Result<bool, CommitError> {
        let Some((_, field)) = self.template.find_field(id) else {
            return Ok(false);
        };
        let kind = field.kind;
        match FieldValue::from_json(kind, raw) {
            Some(value) => self.commit(id, value),
            None => Err(CommitError::KindMismatch {
                field: id,
                expected: kind.name(),
                got: json_kind(raw),
            }),
        }
    }

    /// Drop a field's value, back to `Empty`.
    pub fn clear(&mut self, id: FieldId) -> bool {
        if self.prefilled.contains(&id) {
            return false;
        }
        let removed = self.values.remove(id).is_some();
        if self.active == Some(id) {
            self.active = None;
        }
        removed
    }

    pub fn value(&self, id: FieldId) -> Option<&FieldValue> {
        self.values.get(id)
    }

    // ─── Progress & submit ───────────────────────────────────────────────

    /// Pre-filled fields count as complete.
    pub fn progress(&self) -> Progress {
        let total = self.template.field_count();
        let completed = self
            .template
            .fields()
            .filter(|(_, f)| self.prefilled.contains(&f.id) || self.values.is_filled(f.id))
            .count();
        Progress::new(completed, total)
    }

    /// Required signer fields without a value, in document order.
    pub fn missing_required(&self) -> Vec<MissingField> {
        self.template
            .fields()
            .filter(|(_, f)| {
                f.required && !self.prefilled.contains(&f.id) && !self.values.is_filled(f.id)
            })
            .map(|(_, f)| MissingField {
                id: f.id,
                label: f.label().to_string(),
            })
            .collect()
    }

    pub fn can_submit(&self) -> bool {
        self.missing_required().is_empty()
    }

    /// Hand off the terminal value snapshot, or report what is missing and
    /// move the cursor to the first offender.
    pub fn submit(&mut self) -> Result<FormValues, ValidationError> {
        let missing = self.missing_required();
        if let Some(first) = missing.first() {
            self.activate(first.id);
            log::debug!("submit blocked: {} required fields missing", missing.len());
            return Err(ValidationError { missing });
        }
        Ok(self.values.clone())
    }

    // ─── View ────────────────────────────────────────────────────────────

    /// Page placement for a viewport.
    pub fn layout(&self, viewport_width: f64) -> FillLayout {
        FillLayout::compute(&self.template, viewport_width, &self.config)
    }

    /// Render plan: every field, with its display rect under `layout`.
    pub fn views(&self, layout: &FillLayout) -> Vec<FieldView> {
        self.template
            .fields()
            .filter_map(|(page, field)| {
                let placed = layout.page(page.id)?;
                Some(FieldView {
                    id: field.id,
                    page: page.id,
                    kind: field.kind,
                    rect: placed.display_rect(field.rect),
                    label: field.label().to_string(),
                    required: field.required,
                    read_only: self.prefilled.contains(&field.id),
                    state: self.state(field.id).unwrap_or(FieldState::Empty),
                    value: self.values.get(field.id).cloned(),
                    options: match field.kind {
                        FieldKind::Select => field.options().to_vec(),
                        _ => Vec::new(),
                    },
                })
            })
            .collect()
    }

    /// Scroll offset that brings the active field into view.
    pub fn scroll_target(&self, layout: &FillLayout) -> Option<f64> {
        layout.scroll_target(&self.template, self.active?)
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
