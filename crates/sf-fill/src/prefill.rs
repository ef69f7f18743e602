//! Pre-fill resolution for sender-filled fields.
//!
//! Precedence, first match wins:
//! 1. the field's `preDefinedValueId` as a key of the lookup;
//! 2. for a `source` field with no binding, the catalog entry for its type
//!    whose label equals the field's `preDefinedLabel` (or, failing that, its
//!    placeholder), compared trimmed and case-insensitively, provided the
//!    entry's key is in the lookup.
//!
//! Nothing else is tried.

use serde_json::{Map, Value};
use sf_core::{Field, FieldRole, FieldValue, PredefinedCatalog};

/// External `{ preDefinedKey: value }` object. Read, never written.
pub type PrefillLookup = Map<String, Value>;

/// Value a sender-filled field starts the session with, if any.
pub fn resolve_prefill(
    field: &Field,
    lookup: &PrefillLookup,
    catalog: &PredefinedCatalog,
) -> Option<FieldValue> {
    let key = match field.pre_defined_value_id.as_deref() {
        Some(key) => key,
        None if field.role() == FieldRole::Source => {
            let known = |label: &str| {
                catalog
                    .find_by_label(field.kind, label)
                    .filter(|option| lookup.contains_key(&option.value))
            };
            let option = field
                .pre_defined_label
                .as_deref()
                .and_then(known)
                .or_else(|| known(&field.placeholder))?;
            option.value.as_str()
        }
        None => return None,
    };

    let raw = lookup.get(key)?;
    let value = FieldValue::from_json(field.kind, raw);
    if value.is_none() {
        log::warn!(
            "pre-fill `{key}` does not fit {} field {}",
            field.kind.name(),
            field.id
        );
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sf_core::{FieldId, FieldKind, PredefinedOption, Rect};

    fn field(name: &str, kind: FieldKind) -> Field {
        Field::new(FieldId::intern(name), kind, Rect::new(0.0, 0.0, 150.0, 40.0))
    }

    fn lookup() -> PrefillLookup {
        let Value::Object(map) = json!({
            "client.name": "Ada Lovelace",
            "client.email": "ada@example.com",
            "contract.signed": true,
            "contract.pages": 3,
        }) else {
            unreachable!()
        };
        map
    }

    fn catalog() -> PredefinedCatalog {
        let mut c = PredefinedCatalog::new();
        c.insert(FieldKind::Text, PredefinedOption::new("client.name", "Client name"));
        c.insert(FieldKind::Text, PredefinedOption::new("client.email", "Email"));
        c.insert(FieldKind::Text, PredefinedOption::new("client.phone", "Phone"));
        c
    }

    #[test]
    fn explicit_binding_wins() {
        let mut f = field("pf_bound", FieldKind::Text);
        f.pre_defined_value_id = Some("client.email".into());
        f.pre_defined_label = Some("Client name".into());
        f.role = Some(FieldRole::Source);
        assert_eq!(
            resolve_prefill(&f, &lookup(), &catalog()),
            Some(FieldValue::Text("ada@example.com".into()))
        );
    }

    #[test]
    fn source_field_matches_catalog_label() {
        let mut f = field("pf_source", FieldKind::Text);
        f.role = Some(FieldRole::Source);
        f.placeholder = "  client NAME ".into();
        assert_eq!(
            resolve_prefill(&f, &lookup(), &catalog()),
            Some(FieldValue::Text("Ada Lovelace".into()))
        );
    }

    #[test]
    fn label_match_needs_key_in_lookup() {
        let mut f = field("pf_phone", FieldKind::Text);
        f.role = Some(FieldRole::Source);
        f.placeholder = "Phone".into();
        assert_eq!(resolve_prefill(&f, &lookup(), &catalog()), None);
    }

    #[test]
    fn placeholder_is_tried_when_label_key_is_unknown() {
        let mut f = field("pf_fallback", FieldKind::Text);
        f.role = Some(FieldRole::Source);
        f.pre_defined_label = Some("Phone".into());
        f.placeholder = "Email".into();
        assert_eq!(
            resolve_prefill(&f, &lookup(), &catalog()),
            Some(FieldValue::Text("ada@example.com".into()))
        );
    }

    #[test]
    fn target_fields_are_never_label_matched() {
        let mut f = field("pf_target", FieldKind::Text);
        f.placeholder = "Client name".into();
        assert_eq!(resolve_prefill(&f, &lookup(), &catalog()), None);
    }

    #[test]
    fn value_shape_follows_field_kind() {
        let mut f = field("pf_check", FieldKind::Checkbox);
        f.pre_defined_value_id = Some("contract.signed".into());
        assert_eq!(
            resolve_prefill(&f, &lookup(), &catalog()),
            Some(FieldValue::Checkbox(true))
        );
        f.pre_defined_value_id = Some("contract.pages".into());
        assert_eq!(resolve_prefill(&f, &lookup(), &catalog()), None);
    }
}
