//! Typed field values and the per-session value map.
//!
//! On the wire a value is a bare JSON string (text, date, select, signature
//! and image data URLs) or a boolean (checkbox). In memory it is a variant
//! per field type so fill and export code can match exhaustively.

use crate::id::FieldId;
use crate::model::{FieldKind, Template};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// Date as committed by the picker (ISO `YYYY-MM-DD` in practice).
    Date(String),
    Select(String),
    Checkbox(bool),
    /// `data:image/...;base64,...`
    Signature(String),
    /// `data:image/...;base64,...`
    Image(String),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Date(_) => FieldKind::Date,
            FieldValue::Select(_) => FieldKind::Select,
            FieldValue::Checkbox(_) => FieldKind::Checkbox,
            FieldValue::Signature(_) => FieldKind::Signature,
            FieldValue::Image(_) => FieldKind::Image,
        }
    }

    /// Non-empty string or a ticked checkbox.
    pub fn is_filled(&self) -> bool {
        match self {
            FieldValue::Checkbox(checked) => *checked,
            FieldValue::Text(s)
            | FieldValue::Date(s)
            | FieldValue::Select(s)
            | FieldValue::Signature(s)
            | FieldValue::Image(s) => !s.trim().is_empty(),
        }
    }

    /// The string payload, if this variant carries one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Checkbox(_) => None,
            FieldValue::Text(s)
            | FieldValue::Date(s)
            | FieldValue::Select(s)
            | FieldValue::Signature(s)
            | FieldValue::Image(s) => Some(s),
        }
    }

    /// Wrap a string in the variant matching `kind`.
    /// Checkboxes accept `"true"`/`"false"` (and `"on"`, `"yes"`, `"1"`).
    pub fn from_string(kind: FieldKind, s: impl Into<String>) -> Self {
        let s = s.into();
        match kind {
            FieldKind::Text => FieldValue::Text(s),
            FieldKind::Date => FieldValue::Date(s),
            FieldKind::Select => FieldValue::Select(s),
            FieldKind::Signature => FieldValue::Signature(s),
            FieldKind::Image => FieldValue::Image(s),
            FieldKind::Checkbox => FieldValue::Checkbox(matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "true" | "on" | "yes" | "1"
            )),
        }
    }

    /// Interpret a JSON value for a field of `kind`. Numbers are accepted for
    /// string kinds (a pre-fill source may hand out numeric ids); anything
    /// else that does not fit the kind yields `None`.
    pub fn from_json(kind: FieldKind, value: &Value) -> Option<Self> {
        match (kind, value) {
            (FieldKind::Checkbox, Value::Bool(b)) => Some(FieldValue::Checkbox(*b)),
            (_, Value::String(s)) => Some(Self::from_string(kind, s.as_str())),
            (FieldKind::Checkbox, _) => None,
            (_, Value::Number(n)) => Some(Self::from_string(kind, n.to_string())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Checkbox(b) => Value::Bool(*b),
            other => Value::String(other.as_str().unwrap_or_default().to_string()),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Checkbox(b) => serializer.serialize_bool(*b),
            other => serializer.serialize_str(other.as_str().unwrap_or_default()),
        }
    }
}

// ─── Value map ───────────────────────────────────────────────────────────

/// Field id → committed value for one fill session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues {
    values: HashMap<FieldId, FieldValue>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: FieldId) -> Option<&FieldValue> {
        self.values.get(&id)
    }

    pub fn insert(&mut self, id: FieldId, value: FieldValue) -> Option<FieldValue> {
        self.values.insert(id, value)
    }

    pub fn remove(&mut self, id: FieldId) -> Option<FieldValue> {
        self.values.remove(&id)
    }

    /// Whether the field has a non-empty / non-false value.
    pub fn is_filled(&self, id: FieldId) -> bool {
        self.values.get(&id).is_some_and(FieldValue::is_filled)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &FieldValue)> {
        self.values.iter().map(|(id, v)| (*id, v))
    }

    /// Read the external `{ id: value }` object against a template.
    /// Unknown ids and values that do not fit the field's type are skipped.
    pub fn from_json(template: &Template, json: &Value) -> Self {
        let mut out = Self::new();
        let Some(map) = json.as_object() else {
            log::warn!("form values are not a JSON object; ignoring");
            return out;
        };
        for (key, raw) in map {
            let id = FieldId::intern(key);
            match template.find_field(id) {
                Some((_, field)) => match FieldValue::from_json(field.kind, raw) {
                    Some(value) => {
                        out.insert(id, value);
                    }
                    None => log::warn!("value for `{key}` does not fit a {} field", field.kind.name()),
                },
                None => log::debug!("skipping value for unknown field `{key}`"),
            }
        }
        out
    }
}

impl Serialize for FormValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Sorted so the snapshot is stable across runs.
        let mut entries: Vec<_> = self.values.iter().collect();
        entries.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (id, value) in entries {
            map.serialize_entry(id.as_str(), value)?;
        }
        map.end()
    }
}
