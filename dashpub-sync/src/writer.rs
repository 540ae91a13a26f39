//! Deterministic serialization and atomic writes for dashboard files.
//!
//! ## Write protocol
//!
//! 1. Render the dashboard model as pretty-printed JSON. Object keys are
//!    stored sorted, so the same model always renders to the same bytes.
//! 2. Ensure the parent directory exists.
//! 3. Write to `<path>.dashpub.tmp` next to the target.
//! 4. Rename to the final path (atomic on POSIX).
//!
//! On rename failure the temp file is removed and any existing target file
//! stays intact.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{io_err, PublishError};

/// Render the dashboard model exactly as it is stored in the target tree.
pub(crate) fn render(data: &Value) -> Result<String, PublishError> {
    let mut body = serde_json::to_string_pretty(data)?;
    body.push('\n');
    Ok(body)
}

/// Atomically write the rendered dashboard model to `path`.
pub(crate) fn write_dashboard(path: &Path, data: &Value) -> Result<(), PublishError> {
    let tmp = PathBuf::from(format!("{}.dashpub.tmp", path.display()));
    write_with_tmp(path, data, &tmp)
}

fn write_with_tmp(path: &Path, data: &Value, tmp: &Path) -> Result<(), PublishError> {
    let content = render(data)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, &content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
