#![cfg(test)]
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Header used by the resort backing file.
pub const RESORT_HEADER: &str = "Region,State,Name,Latitude,Longitude\n";

/// Write `contents` to a fresh file under the system temp dir.
pub async fn temp_csv(contents: &str) -> Result<PathBuf, anyhow::Error> {
    let path = std::env::temp_dir().join(format!("svc_resorts_{}.csv", Uuid::new_v4()));
    tokio::fs::write(&path, contents).await?;
    Ok(path)
}

/// Backing file holding the given data rows under the resort header.
pub async fn resort_csv(rows: &[&str]) -> Result<PathBuf, anyhow::Error> {
    let mut contents = RESORT_HEADER.to_string();
    for row in rows {
        contents.push_str(row);
        contents.push('\n');
    }
    temp_csv(&contents).await
}

pub async fn remove(path: &Path) {
    let _ = tokio::fs::remove_file(path).await;
}
