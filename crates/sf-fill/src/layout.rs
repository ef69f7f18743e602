//! Fill view placement.
//!
//! The same template renders on desktop and mobile purely by picking a
//! different target width per page; field geometry is never duplicated.
//! Pages stack vertically: the first one `page_margin` below the top of the
//! scroll content, then `page_gap` between pages. All numbers here are CSS
//! pixels of the scroll content.

use crate::config::FillConfig;
use crate::session::FieldState;
use serde::Serialize;
use sf_core::geometry::{self, PageFormat};
use sf_core::{FieldId, FieldKind, FieldValue, PageId, Rect, Template};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Desktop,
    Mobile,
}

/// One page placed in the scroll content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLayout {
    pub page: PageId,
    pub format: PageFormat,
    pub scale: f64,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PageLayout {
    /// Page-local display rect of a stored field rect.
    pub fn display_rect(&self, rect: Rect) -> Rect {
        geometry::to_display_rect(rect, self.scale)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillLayout {
    pub mode: ViewMode,
    pub viewport_width: f64,
    pub pages: Vec<PageLayout>,
    /// Height of the whole scroll content.
    pub content_height: f64,
    /// Fixed chrome a scrolled-to field must clear.
    pub chrome_height: f64,
}

impl FillLayout {
    pub fn compute(template: &Template, viewport_width: f64, config: &FillConfig) -> Self {
        let mode = if viewport_width < config.mobile_breakpoint {
            ViewMode::Mobile
        } else {
            ViewMode::Desktop
        };
        let available = (viewport_width - 2.0 * config.page_margin).max(1.0);

        let mut top = config.page_margin;
        let mut pages = Vec::with_capacity(template.pages.len());
        for page in &template.pages {
            let canonical_width = geometry::canonical_width_px(page.format);
            let target = match mode {
                ViewMode::Mobile => available,
                ViewMode::Desktop => available.min(canonical_width),
            };
            let scale = geometry::display_scale(page.format, target);
            let height = geometry::canonical_height_px(page.format) * scale;
            pages.push(PageLayout {
                page: page.id,
                format: page.format,
                scale,
                left: ((viewport_width - target) / 2.0).max(0.0),
                top,
                width: target,
                height,
            });
            top += height + config.page_gap;
        }
        let content_height = match pages.last() {
            Some(last) => last.top + last.height + config.page_margin,
            None => 0.0,
        };

        let chrome_height = match mode {
            ViewMode::Mobile => config.header_height + config.mobile_nav_height,
            ViewMode::Desktop => config.header_height,
        };

        Self {
            mode,
            viewport_width,
            pages,
            content_height,
            chrome_height,
        }
    }

    pub fn page(&self, id: PageId) -> Option<&PageLayout> {
        self.pages.iter().find(|p| p.page == id)
    }

    /// Top of a field in scroll-content pixels.
    pub fn field_top(&self, template: &Template, id: FieldId) -> Option<f64> {
        let (page, field) = template.find_field(id)?;
        let placed = self.page(page.id)?;
        Some(placed.top + field.rect.y * placed.scale)
    }

    /// Scroll offset that puts a field just below the fixed chrome.
    pub fn scroll_target(&self, template: &Template, id: FieldId) -> Option<f64> {
        self.field_top(template, id)
            .map(|top| (top - self.chrome_height).max(0.0))
    }
}

/// Everything the UI needs to draw one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub id: FieldId,
    pub page: PageId,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Page-local display pixels.
    pub rect: Rect,
    pub label: String,
    pub required: bool,
    pub read_only: bool,
    pub state: FieldState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}
