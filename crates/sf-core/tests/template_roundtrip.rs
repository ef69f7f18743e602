//! Integration tests: template JSON ↔ model round-trip.
//!
//! Verifies the persisted `data` payload keeps its exact bytes when a
//! template is loaded and saved without edits, and that the model reads the
//! external shape correctly.

use pretty_assertions::assert_eq;
use sf_core::geometry::{self, PageFormat, Rect};
use sf_core::*;

const CONTRACT: &str = include_str!("fixtures/contract.json");

fn contract() -> Template {
    Template::from_json(CONTRACT.trim()).expect("fixture should parse")
}

// ─── Byte stability ──────────────────────────────────────────────────────

#[test]
fn untouched_template_reserializes_byte_for_byte() {
    let template = contract();
    assert_eq!(template.to_json().unwrap(), CONTRACT.trim());
}

#[test]
fn reserialize_is_idempotent_for_generated_documents() {
    let mut template = Template::new(PageFormat::Letter);
    let mut page = Page::blank(PageFormat::Letter);
    page.fields.push(Field::new(
        FieldId::with_prefix("text"),
        FieldKind::Text,
        Rect::new(10.25, 33.0, 150.0, 40.0),
    ));
    template.pages.push(page);

    let first = template.to_json().unwrap();
    let second = Template::from_json(&first).unwrap().to_json().unwrap();
    assert_eq!(first, second);
}

// ─── Shape ───────────────────────────────────────────────────────────────

#[test]
fn reads_external_shape() {
    let template = contract();
    assert_eq!(template.pages.len(), 2);
    assert_eq!(template.default_format(), PageFormat::A4);

    let page = &template.pages[0];
    assert_eq!(page.background_image.as_deref(), Some("uploads/contract.pdf#1"));
    assert_eq!(page.fields.len(), 4);

    let name = &page.fields[0];
    assert_eq!(name.kind, FieldKind::Text);
    assert_eq!(name.rect, Rect::new(96.0, 120.0, 150.0, 40.0));
    assert!(name.required);
    assert_eq!(name.role(), FieldRole::Source);
    assert_eq!(name.pre_defined_value_id.as_deref(), Some("client.name"));
    assert!(name.is_prefilled());

    let plan = &page.fields[1];
    assert_eq!(plan.options(), ["Basic".to_string(), "Pro".to_string()]);
    assert_eq!(plan.extra.get("fontSize"), Some(&serde_json::json!(14)));
    assert_eq!(plan.role(), FieldRole::Target);

    assert_eq!(page.fields[2].rect.y, 240.5);
    assert_eq!(template.pages[1].format, PageFormat::Letter);
    assert!(template.pages[1].fields.is_empty());
}

#[test]
fn minimal_field_gets_defaults() {
    let t = Template::from_json(
        r#"{"pages":[{"id":"p","format":"A5","elements":[{"id":"f","type":"date","x":1,"y":2,"width":3,"height":4}]}]}"#,
    )
    .unwrap();
    let f = &t.pages[0].fields[0];
    assert!(!f.required);
    assert_eq!(f.placeholder, "");
    assert!(f.options.is_none());
    assert_eq!(f.role(), FieldRole::Target);
    assert_eq!(t.default_format(), PageFormat::A5);
}

#[test]
fn unknown_field_type_is_rejected() {
    let err = Template::from_json(
        r#"{"pages":[{"id":"p","format":"A4","elements":[{"id":"f","type":"radio","x":0,"y":0,"width":1,"height":1}]}]}"#,
    );
    assert!(err.is_err());
}

// ─── Geometry properties ─────────────────────────────────────────────────

#[test]
fn every_contract_field_projects_inside_its_pdf_page() {
    let template = contract();
    for (page, field) in template.fields() {
        let (w, h) = geometry::canonical_size_of(page.format);
        let pt = geometry::to_pdf_point(field.rect, page.format);
        assert!(pt.x >= 0.0 && pt.x + pt.width <= w, "{} x out of page", field.id);
        assert!(pt.y >= 0.0 && pt.y + pt.height <= h, "{} y out of page", field.id);
    }
}

#[test]
fn display_rect_roundtrip_for_all_fields_and_scales() {
    let template = contract();
    for (_, field) in template.fields() {
        for scale in [0.25, 0.5, 0.9, 1.0, 1.5, 2.75] {
            let back = geometry::from_display_rect(
                geometry::to_display_rect(field.rect, scale),
                scale,
            );
            assert!((back.x - field.rect.x).abs() < 1e-9);
            assert!((back.y - field.rect.y).abs() < 1e-9);
            assert!((back.width - field.rect.width).abs() < 1e-9);
            assert!((back.height - field.rect.height).abs() < 1e-9);
        }
    }
}

#[test]
fn mobile_and_desktop_scales_differ_only_by_target_width() {
    let rect = Rect::new(96.0, 120.0, 150.0, 40.0);
    let desktop = geometry::display_scale(PageFormat::A4, 793.0 + 1.0 / 3.0);
    let mobile = geometry::display_scale(PageFormat::A4, 358.0);
    let d = geometry::to_display_rect(rect, desktop);
    let m = geometry::to_display_rect(rect, mobile);
    assert!((d.x - 96.0).abs() < 1e-9);
    assert!((m.x / d.x - 358.0 / (793.0 + 1.0 / 3.0)).abs() < 1e-9);
}
