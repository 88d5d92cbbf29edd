//! Environment/runtime helpers
//!
//! Sanity checks run once at startup, before any store is opened.

use std::path::Path;

use anyhow::anyhow;
use tracing::info;

/// Ensure the flat file backing the resort store exists and is a regular file.
///
/// A missing data file is a startup error; it is never created implicitly.
pub async fn ensure_data_file(path: &Path) -> anyhow::Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {
            info!(path = %path.display(), bytes = meta.len(), "resort data file found");
            Ok(())
        }
        Ok(_) => Err(anyhow!("{} is not a regular file", path.display())),
        Err(e) => Err(anyhow!("cannot access resort data file {}: {e}", path.display())),
    }
}
