use std::path::Path;

use serde_json::Value;
use sf_core::{JsonFileRepository, Template, TemplateRepository};

/// Load a template file with user-friendly error messages.
///
/// Returns `Err(1)` with a message printed to stderr if the file is missing
/// or is not a valid template.
pub fn load_template(path: &Path) -> Result<Template, i32> {
    match JsonFileRepository::new(path).load() {
        Ok(Some(template)) => Ok(template),
        Ok(None) => {
            eprintln!("Error: file not found: {}", path.display());
            Err(1)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            Err(1)
        }
    }
}

pub async fn read_bytes(path: &Path) -> Result<Vec<u8>, i32> {
    tokio::fs::read(path).await.map_err(|e| {
        eprintln!("Error: cannot read {}: {e}", path.display());
        1
    })
}

/// Read an optional JSON file; a missing argument yields `Value::Null`.
pub async fn read_json(path: Option<&Path>) -> Result<Value, i32> {
    let Some(path) = path else {
        return Ok(Value::Null);
    };
    let bytes = read_bytes(path).await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        eprintln!("Error: {} is not valid JSON: {e}", path.display());
        1
    })
}

/// Deserialize `value` into `T`, falling back to `T::default()` for `null`.
pub fn from_json_or_default<T>(value: Value, what: &str) -> Result<T, i32>
where
    T: serde::de::DeserializeOwned + Default,
{
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value).map_err(|e| {
        eprintln!("Error: invalid {what}: {e}");
        1
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_export::ExportConfig;

    #[test]
    fn null_json_gives_defaults() {
        let config: ExportConfig = from_json_or_default(Value::Null, "config").unwrap();
        assert_eq!(config, ExportConfig::default());

        let config: ExportConfig =
            from_json_or_default(serde_json::json!({ "fontSize": 9.0 }), "config").unwrap();
        assert_eq!(config.font_size, 9.0);
        assert_eq!(config.placeholder, "[Signature]");
    }
}
