use std::path::Path;

use serde_json::json;
use sf_core::geometry::to_pdf_point;
use sf_fill::{FillConfig, FillLayout};

use crate::shared::load_template;

pub fn run(template: &Path, viewport_width: f64) -> Result<(), i32> {
    if !viewport_width.is_finite() || viewport_width <= 0.0 {
        eprintln!("Error: viewport width must be positive");
        return Err(1);
    }
    let template = load_template(template)?;
    let layout = FillLayout::compute(&template, viewport_width, &FillConfig::default());

    let pages: Vec<serde_json::Value> = template
        .pages
        .iter()
        .zip(&layout.pages)
        .map(|(page, placed)| {
            let fields: Vec<serde_json::Value> = page
                .fields
                .iter()
                .map(|field| {
                    json!({
                        "id": field.id,
                        "type": field.kind,
                        "display": placed.display_rect(field.rect),
                        "pdf": to_pdf_point(field.rect, page.format),
                    })
                })
                .collect();
            json!({
                "id": page.id,
                "format": page.format,
                "scale": placed.scale,
                "left": placed.left,
                "top": placed.top,
                "width": placed.width,
                "height": placed.height,
                "fields": fields,
            })
        })
        .collect();

    let output = json!({
        "mode": layout.mode,
        "viewportWidth": layout.viewport_width,
        "contentHeight": layout.content_height,
        "pages": pages,
    });
    match serde_json::to_string_pretty(&output) {
        Ok(text) => {
            println!("{text}");
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {e}");
            Err(1)
        }
    }
}
