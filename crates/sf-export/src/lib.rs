pub mod config;
pub mod data_url;
pub mod draw;
pub mod error;
pub mod export;
pub mod writer;

pub use config::ExportConfig;
pub use data_url::{DataUrl, DataUrlError, DecodedImage, decode_image, parse_data_url};
pub use error::{ExportError, ExportWarning};
pub use export::{ExportOutput, export_pdf};
