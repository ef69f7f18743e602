use sf_core::FieldId;
use std::fmt;
use thiserror::Error;

/// Failures that abort an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Background document missing or unreadable.
    #[error("source document: {0}")]
    SourceDocument(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("failed to write PDF: {0}")]
    Write(#[from] std::io::Error),
}

/// A field that could not be drawn as-is. The export still succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportWarning {
    pub field: FieldId,
    pub message: String,
}

impl ExportWarning {
    pub fn new(field: FieldId, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
