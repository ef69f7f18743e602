pub mod config;
pub mod layout;
pub mod prefill;
pub mod session;

pub use config::FillConfig;
pub use layout::{FieldView, FillLayout, PageLayout, ViewMode};
pub use prefill::{PrefillLookup, resolve_prefill};
pub use session::{CommitError, FieldState, FillSession, MissingField, Progress, ValidationError};
