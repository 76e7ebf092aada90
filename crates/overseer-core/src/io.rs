use crate::error::{OverseerError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Prevents partial writes from corrupting phase documents.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    ensure_dir(dir)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| OverseerError::at(dir, e))?;
    tmp.write_all(data).map_err(|e| OverseerError::at(path, e))?;
    tmp.persist(path)
        .map_err(|e| OverseerError::at(path, e.error))?;
    Ok(())
}

/// Create a directory and all parents, idempotent. Fails if `path` exists
/// and is not a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    if path.exists() {
        if !path.is_dir() {
            return Err(OverseerError::NotADirectory(path.to_path_buf()));
        }
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|e| OverseerError::at(path, e))
}

/// Write a file only if it does not already exist. Returns true if written.
pub fn write_if_missing(path: &Path, data: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    atomic_write(path, data)?;
    Ok(true)
}

/// Read a UTF-8 file, returning `None` when it does not exist.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(OverseerError::at(path, e)),
    }
}
