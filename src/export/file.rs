use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::storage::entities::Record;

pub const EXPORT_EXTENSION: &str = "json";

/// Writes `records` as a pretty printed JSON array into `<dir>/<base_name>.json`.
pub async fn save_records(records: &[Record], dir: &Path, base_name: &str) -> Result<PathBuf> {
    let path = dir.join(format!("{base_name}.{EXPORT_EXTENSION}"));
    let content = serde_json::to_string_pretty(records)?;
    tokio::fs::write(&path, content)
        .await
        .with_context(|| format!("Couldn't write {path:?}"))?;
    info!("Saved {} records into {path:?}", records.len());
    Ok(path)
}

/// Reads a file produced by [save_records]. Anything that isn't a JSON array of records is an
/// error.
pub async fn read_records(path: &Path) -> Result<Vec<Record>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Couldn't read {path:?}"))?;
    let records = serde_json::from_str(&content)
        .with_context(|| format!("{path:?} doesn't contain valid records"))?;
    Ok(records)
}
