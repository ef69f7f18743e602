use serde::{Deserialize, Serialize};
use sf_core::FieldKind;

/// Builder tuning. Sizes are canonical page pixels unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuilderConfig {
    pub default_width: f64,
    pub default_height: f64,
    /// Checkboxes are square.
    pub checkbox_size: f64,

    /// Resize floor that keeps a field grabbable.
    pub min_width: f64,
    pub min_height: f64,

    /// Where a click-added field lands.
    pub default_origin: (f64, f64),

    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,

    /// Arrow-key nudge, and with Shift held.
    pub nudge: f64,
    pub nudge_large: f64,

    /// Offset applied to a duplicated field.
    pub duplicate_offset: f64,

    /// Corner handle hit radius in *display* pixels.
    pub handle_radius: f64,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            default_width: 150.0,
            default_height: 40.0,
            checkbox_size: 20.0,
            min_width: 20.0,
            min_height: 15.0,
            default_origin: (40.0, 40.0),
            min_zoom: 0.25,
            max_zoom: 4.0,
            zoom_step: 0.1,
            nudge: 1.0,
            nudge_large: 10.0,
            duplicate_offset: 20.0,
            handle_radius: 8.0,
        }
    }
}

impl BuilderConfig {
    /// Initial size of a newly placed field.
    pub fn default_size_for(&self, kind: FieldKind) -> (f64, f64) {
        match kind {
            FieldKind::Checkbox => (self.checkbox_size, self.checkbox_size),
            _ => (self.default_width, self.default_height),
        }
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            zoom.clamp(self.min_zoom, self.max_zoom)
        } else {
            1.0
        }
    }
}
