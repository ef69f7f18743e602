//! Catalog of pre-defined data keys a field can be bound to.
//!
//! Supplied by an external collaborator, per field type, as
//! `{ "text": [{ "value": "client.name", "label": "Client name" }], … }`.

use crate::model::FieldKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredefinedOption {
    /// Key into the pre-fill value lookup.
    pub value: String,
    pub label: String,
}

impl PredefinedOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredefinedCatalog {
    entries: HashMap<FieldKind, Vec<PredefinedOption>>,
}

impl PredefinedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: FieldKind, option: PredefinedOption) {
        self.entries.entry(kind).or_default().push(option);
    }

    /// Options offered for a field type, in catalog order.
    pub fn options_for(&self, kind: FieldKind) -> &[PredefinedOption] {
        self.entries.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find(&self, kind: FieldKind, value: &str) -> Option<&PredefinedOption> {
        self.options_for(kind).iter().find(|o| o.value == value)
    }

    /// Exact label match, ignoring case and surrounding whitespace.
    pub fn find_by_label(&self, kind: FieldKind, label: &str) -> Option<&PredefinedOption> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        self.options_for(kind)
            .iter()
            .find(|o| o.label.trim().eq_ignore_ascii_case(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PredefinedCatalog {
        serde_json::from_str(
            r#"{
                "text": [
                    {"value": "client.name", "label": "Client name"},
                    {"value": "client.email", "label": "Client email"}
                ],
                "date": [{"value": "today", "label": "Today"}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn options_are_per_kind() {
        let c = catalog();
        assert_eq!(c.options_for(FieldKind::Text).len(), 2);
        assert_eq!(c.options_for(FieldKind::Date)[0].value, "today");
        assert!(c.options_for(FieldKind::Signature).is_empty());
    }

    #[test]
    fn label_lookup_is_exact_but_case_insensitive() {
        let c = catalog();
        assert_eq!(
            c.find_by_label(FieldKind::Text, "  client NAME ").map(|o| o.value.as_str()),
            Some("client.name")
        );
        assert!(c.find_by_label(FieldKind::Text, "client").is_none());
        assert!(c.find_by_label(FieldKind::Date, "Client name").is_none());
        assert!(c.find_by_label(FieldKind::Text, " ").is_none());
    }
}
