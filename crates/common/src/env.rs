//! Environment/runtime helpers
//!
//! Sanity checks to ensure the data file the service persists to is in place
//! at startup.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the parent directory of `data_file` exists and, when
/// `create_if_missing` is set, seed a missing file with `seed`.
///
/// Returns `true` when the file was created by this call. An existing file is
/// never touched, whatever its contents.
pub async fn ensure_data_file(data_file: &Path, seed: &[u8], create_if_missing: bool) -> anyhow::Result<bool> {
    if let Some(parent) = data_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    }

    if tokio::fs::metadata(data_file).await.is_ok() {
        return Ok(false);
    }
    if !create_if_missing {
        warn!(path = %data_file.display(), "data file not found; requests will fail until it exists");
        return Ok(false);
    }

    tokio::fs::write(data_file, seed)
        .await
        .map_err(|e| anyhow::anyhow!("cannot seed {}: {e}", data_file.display()))?;
    info!(path = %data_file.display(), event = "data_file_seeded", "created empty data file");
    Ok(true)
}
