//! Atomic file replacement for small state files
//!
//! Settings and database snapshots are rewritten whole. A reader must never
//! observe a half-written file, so every write goes to a temporary file in the
//! target directory, is fsynced, and is then renamed over the target.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

#[cfg(target_os = "windows")]
use std::{thread, time::Duration};

/// Result of an atomic write operation
#[derive(Debug, Clone, Default)]
pub struct AtomicWriteResult {
    /// Number of rename retries that occurred (Windows only)
    pub rename_retry_count: u32,
    /// Bytes written to the target
    pub bytes_written: usize,
}

/// Atomically replace `path` with `content`.
///
/// Parent directories are created when missing.
pub fn write_file_atomic(path: &Utf8Path, content: &[u8]) -> Result<AtomicWriteResult> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create parent directory: {parent}"))?;
    }

    let temp_dir = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let mut temp_file = NamedTempFile::new_in(temp_dir)
        .with_context(|| format!("Failed to create temporary file in: {temp_dir}"))?;

    temp_file
        .write_all(content)
        .context("Failed to write content to temporary file")?;
    temp_file
        .as_file()
        .sync_all()
        .context("Failed to fsync temporary file")?;

    let rename_retry_count = atomic_rename(temp_file, path.as_std_path())
        .with_context(|| format!("Failed to atomically write file: {path}"))?;

    Ok(AtomicWriteResult {
        rename_retry_count,
        bytes_written: content.len(),
    })
}

/// Rename with bounded retry; Windows virus scanners and indexers briefly hold
/// handles on freshly written files.
#[cfg(target_os = "windows")]
fn atomic_rename(mut temp_file: NamedTempFile, target: &Path) -> Result<u32> {
    use std::io::ErrorKind;

    const MAX_RETRIES: u32 = 5;
    const INITIAL_DELAY_MS: u64 = 10;

    let mut retry_count = 0;
    loop {
        match temp_file.persist(target) {
            Ok(_) => return Ok(retry_count),
            Err(persist_error) => {
                let retryable = matches!(
                    persist_error.error.kind(),
                    ErrorKind::PermissionDenied | ErrorKind::Other
                );
                if retry_count >= MAX_RETRIES || !retryable {
                    return Err(anyhow::anyhow!(persist_error.error));
                }
                thread::sleep(Duration::from_millis(INITIAL_DELAY_MS << retry_count));
                retry_count += 1;
                temp_file = persist_error.file;
            }
        }
    }
}

#[cfg(not(target_os = "windows"))]
fn atomic_rename(temp_file: NamedTempFile, target: &Path) -> Result<u32> {
    temp_file
        .persist(target)
        .map(|_| 0)
        .map_err(|e| anyhow::anyhow!(e.error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir, rel: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(rel)).unwrap()
    }

    #[test]
    fn test_atomic_write_basic() {
        let temp_dir = TempDir::new().unwrap();
        let path = utf8(&temp_dir, "settings.json");

        let result = write_file_atomic(&path, b"{\"a\":\"b\"}").unwrap();
        assert_eq!(result.rename_retry_count, 0);
        assert_eq!(result.bytes_written, 9);
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\":\"b\"}");
    }

    #[test]
    fn test_atomic_write_replaces_existing_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = utf8(&temp_dir, "db.json");

        write_file_atomic(&path, b"first version, longer than the second").unwrap();
        write_file_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_atomic_write_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = utf8(&temp_dir, "nested/dir/state.json");

        write_file_atomic(&path, b"{}").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = utf8(&temp_dir, "only.json");

        write_file_atomic(&path, b"{}").unwrap();

        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
