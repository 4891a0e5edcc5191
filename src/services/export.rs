use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const DEFAULT_EXPORT_FILE: &str = "rutinas.csv";

/// Write the server's CSV bytes unchanged and return the absolute path.
pub async fn save_export(bytes: &[u8], path: &Path) -> Result<PathBuf> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("get current directory")?
            .join(path)
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create {}", parent.display()))?;
    }
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("write {}", path.display()))?;

    tracing::info!(path = %path.display(), size = bytes.len(), "routines.export_saved");
    Ok(path)
}
