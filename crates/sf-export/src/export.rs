//! Flatten a template and its values into a PDF.

use crate::config::ExportConfig;
use crate::data_url::{DataUrlError, decode_image};
use crate::draw::PageCanvas;
use crate::error::{ExportError, ExportWarning};
use crate::writer::PdfWriter;
use sf_core::geometry::{canonical_size_px, to_pdf_point};
use sf_core::{Field, FieldValue, FormValues, Page, Rect, Template};

/// The produced document plus everything that was drawn differently from
/// what was asked.
#[derive(Debug)]
pub struct ExportOutput {
    pub bytes: Vec<u8>,
    pub warnings: Vec<ExportWarning>,
}

/// What sits under a page's fields.
enum Background<'a> {
    Blank,
    /// Full-page raster from an image data URL.
    Raster(&'a str),
    /// Page `n` (1-based) of the base PDF.
    BasePage(u32),
}

impl<'a> Background<'a> {
    fn of(page: &'a Page, index: usize) -> Self {
        match page.background_image.as_deref().map(str::trim) {
            None | Some("") => Background::Blank,
            Some(handle) if handle.starts_with("data:image/") => Background::Raster(handle),
            Some(_) => Background::BasePage(index as u32 + 1),
        }
    }
}

/// Produce the final PDF.
///
/// Every template page becomes one output page: a base PDF page when the
/// page's background refers to one, otherwise a blank page of the page's
/// format. Fields with a non-empty value are drawn at their PDF-point
/// rectangle. A signature or image that fails to decode is replaced by the
/// placeholder text and reported as a warning; a missing or unreadable
/// background is fatal.
pub fn export_pdf(
    template: &Template,
    values: &FormValues,
    base_pdf: Option<&[u8]>,
    config: &ExportConfig,
) -> Result<ExportOutput, ExportError> {
    let needs_base = template
        .pages
        .iter()
        .enumerate()
        .any(|(i, p)| matches!(Background::of(p, i), Background::BasePage(_)));

    let mut writer = match base_pdf {
        Some(bytes) => PdfWriter::with_base(bytes)?,
        None if needs_base => {
            return Err(ExportError::SourceDocument(
                "template pages refer to a background PDF but none was supplied".into(),
            ));
        }
        None => PdfWriter::new(&config.pdf_version),
    };

    let mut warnings = Vec::new();
    for (index, page) in template.pages.iter().enumerate() {
        let mut canvas = PageCanvas::new();
        let mut images = Vec::new();

        let page_id = match Background::of(page, index) {
            Background::BasePage(number) => writer.adopt_base_page(number)?,
            Background::Blank => writer.blank_page(page.format),
            Background::Raster(url) => {
                let raster = decode_image(url).map_err(|e| {
                    ExportError::SourceDocument(format!("background of page {}: {e}", page.id))
                })?;
                let id = writer.blank_page(page.format);
                let (name, image_id) = writer.add_image(&raster);
                let (w, h) = canonical_size_px(page.format);
                canvas.image(to_pdf_point(Rect::new(0.0, 0.0, w, h), page.format), &name);
                images.push((name, image_id));
                id
            }
        };

        for field in &page.fields {
            let Some(value) = values.get(field.id).filter(|v| v.is_filled()) else {
                continue;
            };
            if value.kind() != field.kind {
                warnings.push(ExportWarning::new(
                    field.id,
                    format!(
                        "{} value on a {} field, skipped",
                        value.kind().name(),
                        field.kind.name()
                    ),
                ));
                continue;
            }
            draw_field(
                &mut writer,
                &mut canvas,
                &mut images,
                &mut warnings,
                page,
                field,
                value,
                config,
            );
        }

        writer.finish_page(page_id, canvas, &images)?;
    }

    for warning in &warnings {
        log::warn!("export: {warning}");
    }
    let bytes = writer.finish()?;
    log::debug!(
        "export: {} pages, {} bytes, {} warnings",
        template.pages.len(),
        bytes.len(),
        warnings.len()
    );
    Ok(ExportOutput { bytes, warnings })
}

#[allow(clippy::too_many_arguments)]
fn draw_field(
    writer: &mut PdfWriter,
    canvas: &mut PageCanvas,
    images: &mut Vec<(String, lopdf::ObjectId)>,
    warnings: &mut Vec<ExportWarning>,
    page: &Page,
    field: &Field,
    value: &FieldValue,
    config: &ExportConfig,
) {
    let rect = to_pdf_point(field.rect, page.format);
    match value {
        FieldValue::Text(s) | FieldValue::Date(s) | FieldValue::Select(s) => {
            canvas.text(rect, s, config.font_size, config.padding);
        }
        FieldValue::Checkbox(checked) => {
            if *checked {
                canvas.check(rect);
            }
        }
        FieldValue::Signature(url) | FieldValue::Image(url) => match decode_image(url) {
            Ok(raster) => {
                let (name, id) = writer.add_image(&raster);
                canvas.image(rect, &name);
                images.push((name, id));
            }
            Err(e) => {
                warnings.push(ExportWarning::new(field.id, describe(&e)));
                canvas.text(rect, &config.placeholder, config.font_size, config.padding);
            }
        },
    }
}

fn describe(e: &DataUrlError) -> String {
    format!("could not decode image ({e}); drew placeholder")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::{FieldId, FieldKind, PageFormat};

    fn page_with(background: Option<&str>) -> Page {
        let mut page = Page::blank(PageFormat::A4);
        page.background_image = background.map(str::to_string);
        page
    }

    #[test]
    fn background_classification() {
        assert!(matches!(Background::of(&page_with(None), 0), Background::Blank));
        assert!(matches!(
            Background::of(&page_with(Some("  ")), 0),
            Background::Blank
        ));
        assert!(matches!(
            Background::of(&page_with(Some("data:image/png;base64,AAAA")), 0),
            Background::Raster(_)
        ));
        assert!(matches!(
            Background::of(&page_with(Some("uploads/contract.pdf#2")), 2),
            Background::BasePage(3)
        ));
    }

    #[test]
    fn empty_template_gives_empty_document() {
        let out = export_pdf(
            &Template::new(PageFormat::A4),
            &FormValues::new(),
            None,
            &ExportConfig::default(),
        )
        .unwrap();
        assert!(out.bytes.starts_with(b"%PDF-1.7"));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn mismatched_value_is_skipped_with_warning() {
        let id = FieldId::intern("exp_mismatch");
        let mut page = page_with(None);
        page.fields.push(Field::new(
            id,
            FieldKind::Checkbox,
            Rect::new(10.0, 10.0, 20.0, 20.0),
        ));
        let mut template = Template::new(PageFormat::A4);
        template.pages.push(page);
        let mut values = FormValues::new();
        values.insert(id, FieldValue::Text("yes".into()));

        let out = export_pdf(&template, &values, None, &ExportConfig::default()).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].field, id);
    }

    #[test]
    fn unreadable_raster_background_is_fatal() {
        let mut template = Template::new(PageFormat::A4);
        template
            .pages
            .push(page_with(Some("data:image/png;base64,bm90IGFuIGltYWdl")));
        let err = export_pdf(&template, &FormValues::new(), None, &ExportConfig::default())
            .unwrap_err();
        assert!(matches!(err, ExportError::SourceDocument(_)));
    }
}
