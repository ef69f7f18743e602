//! Template JSON and the repository seam between builder and fill screens.
//!
//! The template is persisted as the opaque `data` payload of an external
//! document record. Nothing here is global: callers hand a
//! [`TemplateRepository`] to whichever engine needs one.

use crate::model::Template;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("invalid template JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("template storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Template {
    pub fn from_json(text: &str) -> Result<Self, TemplateError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Compact JSON. Key order follows declaration order and, for unknown
    /// keys, insertion order, so an untouched template re-serializes to the
    /// same bytes.
    pub fn to_json(&self) -> Result<String, TemplateError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, TemplateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Load/save seam for the template being edited or filled.
pub trait TemplateRepository {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Template>, TemplateError>;

    fn save(&mut self, template: &Template) -> Result<(), TemplateError>;
}

/// Keeps the serialized JSON in memory, so a save/load cycle exercises the
/// same path as real storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    json: Option<String>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw payload last saved.
    pub fn raw(&self) -> Option<&str> {
        self.json.as_deref()
    }
}

impl TemplateRepository for MemoryRepository {
    fn load(&self) -> Result<Option<Template>, TemplateError> {
        self.json.as_deref().map(Template::from_json).transpose()
    }

    fn save(&mut self, template: &Template) -> Result<(), TemplateError> {
        self.json = Some(template.to_json()?);
        Ok(())
    }
}

/// One template per JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> TemplateError {
        TemplateError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TemplateRepository for JsonFileRepository {
    fn load(&self) -> Result<Option<Template>, TemplateError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Template::from_json(&text).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&mut self, template: &Template) -> Result<(), TemplateError> {
        let json = template.to_json_pretty()?;
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        log::debug!("saved template to {}", self.path.display());
        Ok(())
    }
}
