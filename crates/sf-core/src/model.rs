//! Field / page / template data model.
//!
//! A [`Template`] is an ordered list of [`Page`]s; each page owns an ordered
//! list of [`Field`]s (order = z-order = tab order). Field rectangles are
//! stored in canonical page pixels (see [`crate::geometry`]) and are the only
//! source of truth for placement. The serde layout of these types *is* the
//! persisted template JSON.

use crate::geometry::{PageFormat, Rect, canonical_size_px};
use crate::id::{FieldId, PageId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashSet;
use std::fmt;

// ─── Field kinds & roles ─────────────────────────────────────────────────

/// What a field collects. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Signature,
    Date,
    Checkbox,
    Select,
    Image,
}

impl FieldKind {
    pub const ALL: [FieldKind; 6] = [
        FieldKind::Text,
        FieldKind::Signature,
        FieldKind::Date,
        FieldKind::Checkbox,
        FieldKind::Select,
        FieldKind::Image,
    ];

    /// Wire name (`"text"`, `"checkbox"`, …).
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Signature => "signature",
            FieldKind::Date => "date",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Select => "select",
            FieldKind::Image => "image",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Human-readable name used when a field has no label of its own.
    pub fn display_name(self) -> &'static str {
        match self {
            FieldKind::Text => "Text",
            FieldKind::Signature => "Signature",
            FieldKind::Date => "Date",
            FieldKind::Checkbox => "Checkbox",
            FieldKind::Select => "Select",
            FieldKind::Image => "Image",
        }
    }
}

/// Who fills a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    /// Filled by the sender before the document is shared.
    Source,
    /// Filled by the signer.
    #[default]
    Target,
}

// ─── Field ───────────────────────────────────────────────────────────────

/// One placeable form element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: FieldId,

    #[serde(rename = "type")]
    pub kind: FieldKind,

    /// Placement in canonical page pixels.
    #[serde(flatten)]
    pub rect: Rect,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub placeholder: String,

    /// Choices for `select` fields. `None` and `Some([])` are kept distinct.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<SmallVec<[String; 4]>>,

    /// Binding to an external data key; makes the field sender-filled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_defined_value_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_defined_label: Option<String>,

    /// Absent means [`FieldRole::Target`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<FieldRole>,

    /// Keys this model does not know about, carried through unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Field {
    pub fn new(id: FieldId, kind: FieldKind, rect: Rect) -> Self {
        Self {
            id,
            kind,
            rect,
            required: false,
            placeholder: String::new(),
            options: None,
            pre_defined_value_id: None,
            pre_defined_label: None,
            role: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn role(&self) -> FieldRole {
        self.role.unwrap_or_default()
    }

    /// Sender-filled: bound to a pre-defined key or owned by the sender.
    /// Such fields are populated at fill time and read-only to the signer.
    pub fn is_prefilled(&self) -> bool {
        self.pre_defined_value_id.is_some() || self.role() == FieldRole::Source
    }

    /// Label for user-facing messages: placeholder, then the pre-defined
    /// label, then the kind's display name.
    pub fn label(&self) -> &str {
        let placeholder = self.placeholder.trim();
        if !placeholder.is_empty() {
            return placeholder;
        }
        match self.pre_defined_label.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label,
            _ => self.kind.display_name(),
        }
    }

    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }
}

// ─── Page ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub format: PageFormat,

    #[serde(rename = "elements", default)]
    pub fields: Vec<Field>,

    /// Opaque handle to an externally stored raster or PDF page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
}

impl Page {
    pub fn new(id: PageId, format: PageFormat) -> Self {
        Self {
            id,
            format,
            fields: Vec::new(),
            background_image: None,
        }
    }

    /// A blank page with a generated id.
    pub fn blank(format: PageFormat) -> Self {
        Self::new(PageId::with_prefix("page"), format)
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    pub fn position_of(&self, id: FieldId) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    pub fn has_background(&self) -> bool {
        self.background_image.is_some()
    }
}

// ─── Template ────────────────────────────────────────────────────────────

/// The unit of persistence: ordered pages plus a default format.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub pages: Vec<Page>,

    /// Format for newly added pages. When absent, the first page's format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<PageFormat>,
}

impl Template {
    /// An empty template with a chosen default format.
    pub fn new(format: PageFormat) -> Self {
        Self {
            pages: Vec::new(),
            format: Some(format),
        }
    }

    pub fn default_format(&self) -> PageFormat {
        self.format
            .or_else(|| self.pages.first().map(|p| p.format))
            .unwrap_or_default()
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    pub fn page_mut(&mut self, id: PageId) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == id)
    }

    /// Find a field anywhere in the template.
    pub fn find_field(&self, id: FieldId) -> Option<(&Page, &Field)> {
        self.pages
            .iter()
            .find_map(|p| p.field(id).map(|f| (p, f)))
    }

    /// All fields in document order (page order, then z-order).
    pub fn fields(&self) -> impl Iterator<Item = (&Page, &Field)> {
        self.pages
            .iter()
            .flat_map(|p| p.fields.iter().map(move |f| (p, f)))
    }

    pub fn field_count(&self) -> usize {
        self.pages.iter().map(|p| p.fields.len()).sum()
    }

    /// Report rectangle and identity problems without fixing them.
    pub fn validate(&self) -> Vec<TemplateIssue> {
        let mut issues = Vec::new();
        let mut page_ids = HashSet::new();
        let mut field_ids = HashSet::new();

        for page in &self.pages {
            if !page_ids.insert(page.id) {
                issues.push(TemplateIssue::DuplicatePage(page.id));
            }
            let (w, h) = canonical_size_px(page.format);
            for field in &page.fields {
                let r = field.rect;
                if !field_ids.insert(field.id) {
                    issues.push(TemplateIssue::DuplicateField(field.id));
                }
                if !(r.width > 0.0 && r.height > 0.0) {
                    issues.push(TemplateIssue::EmptyRect(field.id));
                } else if r.x < 0.0 || r.y < 0.0 {
                    issues.push(TemplateIssue::NegativeOrigin(field.id));
                } else if !r.is_within(w, h) {
                    issues.push(TemplateIssue::OutsidePage(field.id));
                }
                if field.kind == FieldKind::Select && field.options().is_empty() {
                    issues.push(TemplateIssue::SelectWithoutOptions(field.id));
                }
            }
        }
        issues
    }
}

/// A structural problem found by [`Template::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateIssue {
    DuplicatePage(PageId),
    DuplicateField(FieldId),
    EmptyRect(FieldId),
    NegativeOrigin(FieldId),
    OutsidePage(FieldId),
    SelectWithoutOptions(FieldId),
}

impl fmt::Display for TemplateIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateIssue::DuplicatePage(id) => write!(f, "page id `{id}` is used more than once"),
            TemplateIssue::DuplicateField(id) => {
                write!(f, "field id `{id}` is used more than once")
            }
            TemplateIssue::EmptyRect(id) => write!(f, "field `{id}` has a non-positive size"),
            TemplateIssue::NegativeOrigin(id) => write!(f, "field `{id}` starts above or left of the page"),
            TemplateIssue::OutsidePage(id) => write!(f, "field `{id}` extends past the page edge"),
            TemplateIssue::SelectWithoutOptions(id) => {
                write!(f, "select field `{id}` has no options")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(id: &str, kind: FieldKind) -> Field {
        Field::new(FieldId::intern(id), kind, Rect::new(10.0, 10.0, 150.0, 40.0))
    }

    #[test]
    fn label_precedence() {
        let mut f = field("m_label", FieldKind::Signature);
        assert_eq!(f.label(), "Signature");
        f.pre_defined_label = Some("Client name".into());
        assert_eq!(f.label(), "Client name");
        f.placeholder = "Full name".into();
        assert_eq!(f.label(), "Full name");
    }

    #[test]
    fn prefilled_by_binding_or_source_role() {
        let mut f = field("m_pre", FieldKind::Text);
        assert!(!f.is_prefilled());
        f.role = Some(FieldRole::Source);
        assert!(f.is_prefilled());
        f.role = None;
        f.pre_defined_value_id = Some("client.name".into());
        assert!(f.is_prefilled());
    }

    #[test]
    fn default_format_falls_back_to_first_page() {
        let mut t = Template::default();
        assert_eq!(t.default_format(), PageFormat::A4);
        t.pages.push(Page::blank(PageFormat::Letter));
        assert_eq!(t.default_format(), PageFormat::Letter);
        t.format = Some(PageFormat::A5);
        assert_eq!(t.default_format(), PageFormat::A5);
    }

    #[test]
    fn find_field_across_pages() {
        let mut t = Template::new(PageFormat::A4);
        let mut p1 = Page::blank(PageFormat::A4);
        let mut p2 = Page::blank(PageFormat::A5);
        p1.fields.push(field("m_find_a", FieldKind::Text));
        p2.fields.push(field("m_find_b", FieldKind::Date));
        let p2_id = p2.id;
        t.pages.extend([p1, p2]);

        let (page, f) = t.find_field(FieldId::intern("m_find_b")).unwrap();
        assert_eq!(page.id, p2_id);
        assert_eq!(f.kind, FieldKind::Date);
        assert_eq!(t.field_count(), 2);
        assert!(t.find_field(FieldId::intern("m_find_missing")).is_none());
    }

    #[test]
    fn validate_reports_without_fixing() {
        let mut t = Template::new(PageFormat::A4);
        let mut page = Page::blank(PageFormat::A4);
        let mut off = field("m_val_off", FieldKind::Text);
        off.rect.x = 780.0;
        let mut empty = field("m_val_empty", FieldKind::Text);
        empty.rect.height = 0.0;
        page.fields.extend([off, empty, field("m_val_sel", FieldKind::Select)]);
        t.pages.push(page);

        let issues = t.validate();
        assert_eq!(
            issues,
            vec![
                TemplateIssue::OutsidePage(FieldId::intern("m_val_off")),
                TemplateIssue::EmptyRect(FieldId::intern("m_val_empty")),
                TemplateIssue::SelectWithoutOptions(FieldId::intern("m_val_sel")),
            ]
        );
        // Nothing was clamped.
        assert_eq!(t.pages[0].fields[0].rect.x, 780.0);
    }
}
