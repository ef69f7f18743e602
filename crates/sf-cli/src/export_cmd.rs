use std::path::{Path, PathBuf};

use sf_core::{FieldId, FormValues, PredefinedCatalog};
use sf_export::{ExportConfig, export_pdf};
use sf_fill::{FillConfig, FillSession, PrefillLookup};

use crate::shared::{from_json_or_default, load_template, read_bytes, read_json};

pub struct ExportArgs {
    pub template: PathBuf,
    pub values: Option<PathBuf>,
    pub prefill: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub base: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub out: PathBuf,
    /// Export even when required fields are empty.
    pub allow_incomplete: bool,
}

pub async fn run(args: ExportArgs) -> Result<(), i32> {
    let template = load_template(&args.template)?;
    for issue in template.validate() {
        log::warn!("template: {issue}");
    }

    let lookup: PrefillLookup =
        from_json_or_default(read_json(args.prefill.as_deref()).await?, "pre-fill data")?;
    let catalog: PredefinedCatalog =
        from_json_or_default(read_json(args.catalog.as_deref()).await?, "catalog")?;
    let config: ExportConfig =
        from_json_or_default(read_json(args.config.as_deref()).await?, "export config")?;
    let values = read_json(args.values.as_deref()).await?;
    let base = match &args.base {
        Some(path) => Some(read_bytes(path).await?),
        None => None,
    };

    let mut session = FillSession::start(template, &lookup, &catalog, FillConfig::default());
    commit_values(&mut session, &values);
    let values = submitted_values(&mut session, args.allow_incomplete)?;

    let template = session.template().clone();
    let output = tokio::task::spawn_blocking(move || {
        export_pdf(&template, &values, base.as_deref(), &config)
    })
    .await
    .map_err(|e| {
        eprintln!("Error: export task failed: {e}");
        1
    })?
    .map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;

    for warning in &output.warnings {
        log::warn!("{warning}");
    }
    write_output(&args.out, &output.bytes).await?;
    println!(
        "Wrote {} ({} bytes, {} warning(s))",
        args.out.display(),
        output.bytes.len(),
        output.warnings.len()
    );
    Ok(())
}

/// Commit the signer's `{ id: value }` object. Entries the session refuses
/// are logged and skipped.
fn commit_values(session: &mut FillSession, values: &serde_json::Value) {
    let Some(map) = values.as_object() else {
        if !values.is_null() {
            log::warn!("values are not a JSON object; ignoring");
        }
        return;
    };
    for (key, raw) in map {
        match session.commit_json(FieldId::intern(key), raw) {
            Ok(true) => {}
            Ok(false) => log::warn!("no field `{key}` in the template"),
            Err(e) => log::warn!("{e}"),
        }
    }
}

/// Run the submit gate. With `allow_incomplete` a failed gate is logged and
/// the partial values are exported.
fn submitted_values(
    session: &mut FillSession,
    allow_incomplete: bool,
) -> Result<FormValues, i32> {
    match session.submit() {
        Ok(values) => Ok(values),
        Err(e) if allow_incomplete => {
            log::warn!("{e}");
            Ok(session.values().clone())
        }
        Err(e) => {
            eprintln!("Error: {e}");
            for field in &e.missing {
                eprintln!("  missing: {} ({})", field.label, field.id);
            }
            Err(1)
        }
    }
}

async fn write_output(path: &Path, bytes: &[u8]) -> Result<(), i32> {
    tokio::fs::write(path, bytes).await.map_err(|e| {
        eprintln!("Error: cannot write {}: {e}", path.display());
        1
    })
}
