use serde::{Deserialize, Serialize};

/// Output tuning. Lengths are PDF points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    /// Text size before shrinking to the field height.
    pub font_size: f64,
    /// Inset between a field's edge and its text.
    pub padding: f64,
    /// Drawn instead of a signature or image that fails to decode.
    pub placeholder: String,
    /// Header version of a synthesized document.
    pub pdf_version: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            padding: 2.0,
            placeholder: "[Signature]".to_string(),
            pdf_version: "1.7".to_string(),
        }
    }
}
