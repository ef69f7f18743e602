pub mod catalog;
pub mod geometry;
pub mod id;
pub mod model;
pub mod persist;
pub mod value;

pub use catalog::{PredefinedCatalog, PredefinedOption};
pub use geometry::{PageFormat, PdfRect, Rect};
pub use id::{FieldId, PageId};
pub use model::*;
pub use persist::{JsonFileRepository, MemoryRepository, TemplateError, TemplateRepository};
pub use value::{FieldValue, FormValues};

// Re-export kurbo vector types so downstream crates share one geometry vocabulary
pub use kurbo::{Point, Vec2};
