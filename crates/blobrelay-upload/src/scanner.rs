//! Directory scanner: one flat listing, regular files only.

use std::path::Path;

use tracing::warn;

use crate::error::{UploadError, UploadResult};

/// List the regular files of `dir`. Each returned name is a candidate blob
/// name (the claimed content hash). Subdirectories are not traversed.
///
/// Failure to open or list the directory is fatal for the run. Entries whose
/// names are not valid UTF-8 cannot be blob names and are logged and skipped.
pub async fn scan_dir(dir: &Path) -> UploadResult<Vec<String>> {
    let scan_err = |source: std::io::Error| UploadError::Scan {
        dir: dir.display().to_string(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(scan_err)?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(scan_err)? {
        let file_type = entry.file_type().await.map_err(scan_err)?;
        if !file_type.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => warn!(name = ?raw, "skipping non-UTF-8 filename"),
        }
    }
    Ok(names)
}
