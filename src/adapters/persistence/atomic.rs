//! Write-replace helper shared by the output writers.

use crate::domain::DomainError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomic save using write-replace pattern.
/// 1. Write to temp file next to the target
/// 2. sync_all() to ensure flush to disk
/// 3. Atomic rename to target path
///
/// A failure leaves either the previous file or no file, never a truncated one.
pub fn write_replace(path: &Path, bytes: &[u8]) -> Result<(), DomainError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| DomainError::Write(format!("create {}: {}", parent.display(), e)))?;
    }

    let temp_path = temp_path_for(path);
    let result = (|| {
        let mut f = fs::File::create(&temp_path)
            .map_err(|e| DomainError::Write(format!("create temp file: {}", e)))?;
        f.write_all(bytes)
            .map_err(|e| DomainError::Write(format!("write temp file: {}", e)))?;
        f.sync_all()
            .map_err(|e| DomainError::Write(format!("sync temp file: {}", e)))?;
        drop(f);
        fs::rename(&temp_path, path)
            .map_err(|e| DomainError::Write(format!("atomic rename failed: {}", e)))
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
