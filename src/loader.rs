//! Source loading and the final write.

use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::PatchError;

pub fn read_source(path: &Path) -> Result<String, PatchError> {
    let source = fs::read_to_string(path).map_err(|e| PatchError::io("read", path, e))?;
    tracing::debug!(path = %path.display(), bytes = source.len(), "loaded source");
    Ok(source)
}

/// Replaces `path` with `contents` in one rename. The temporary file lives in
/// the destination directory so the rename never crosses filesystems.
pub fn write_atomically(path: &Path, contents: &str) -> Result<(), PatchError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PatchError::io("create temp file in", dir, e))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| PatchError::io("write", tmp.path().to_path_buf(), e))?;

    // Keep the original file's permissions.
    if let Ok(meta) = fs::metadata(path) {
        if let Err(e) = fs::set_permissions(tmp.path(), meta.permissions()) {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "could not copy permissions, output gets default permissions"
            );
        }
    }

    tmp.persist(path)
        .map_err(|e| PatchError::io("replace", path, e.error))?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote output");
    Ok(())
}
