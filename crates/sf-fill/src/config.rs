use serde::{Deserialize, Serialize};

/// Fill view tuning, in CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FillConfig {
    /// Viewports narrower than this render the mobile layout.
    pub mobile_breakpoint: f64,
    /// Space left and right of a page, and above the first one.
    pub page_margin: f64,
    pub page_gap: f64,
    /// Fixed header a scrolled-to field must clear.
    pub header_height: f64,
    /// Guided-navigation bar, shown on mobile only.
    pub mobile_nav_height: f64,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint: 768.0,
            page_margin: 16.0,
            page_gap: 24.0,
            header_height: 64.0,
            mobile_nav_height: 72.0,
        }
    }
}
