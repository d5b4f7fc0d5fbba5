// src/sync/files.rs
// =============================================================================
// Small filesystem helpers for the update cycle.
//
// - read_existing: load the current output file, treating any problem as
//   "there is no file yet"
// - write_atomic: replace the output file in one rename so nobody ever
//   sees half old, half new content
// =============================================================================

use std::fs::Permissions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::UpdateError;
use crate::report::Reporter;

/// Reads the file at `path` as text.
///
/// Returns None when the file is missing, empty, or unreadable. Read errors
/// other than "not found" are passed to the reporter as warnings.
pub async fn read_existing(path: &Path, reporter: &dyn Reporter) -> Option<String> {
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.is_empty() => None,
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            reporter.warn(&format!(
                "Could not read existing file {}: {}",
                path.display(),
                e
            ));
            None
        }
    }
}

// Directory a file lives in; a bare file name lives in "."
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Writes `content` to `path`, creating parent directories as needed.
///
/// The data goes to a temporary file next to the target which is then
/// renamed over it.
pub async fn write_atomic(path: &Path, content: &str) -> Result<(), UpdateError> {
    let dir = parent_dir(path);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| UpdateError::fs("create directory", &dir, e))?;

    let target = path.to_path_buf();
    let content = content.to_owned();

    // tempfile is a blocking API, keep it off the async workers
    tokio::task::spawn_blocking(move || persist_via_tempfile(&dir, &target, &content))
        .await
        .map_err(|e| UpdateError::fs("write", path, std::io::Error::other(e)))?
}

fn persist_via_tempfile(dir: &Path, target: &Path, content: &str) -> Result<(), UpdateError> {
    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| UpdateError::fs("create temporary file in", dir, e))?;

    tmp.write_all(content.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| UpdateError::fs("write", tmp.path(), e))?;

    if let Some(permissions) = target_permissions(target) {
        tmp.as_file()
            .set_permissions(permissions)
            .map_err(|e| UpdateError::fs("set permissions on", tmp.path(), e))?;
    }

    tmp.persist(target)
        .map_err(|e| UpdateError::fs("replace", target, e.error))?;

    Ok(())
}

// Temporary files are created owner-only; keep whatever the old file had,
// or use ordinary file permissions for a new one
fn target_permissions(target: &Path) -> Option<Permissions> {
    if let Ok(metadata) = std::fs::metadata(target) {
        return Some(metadata.permissions());
    }

    #[cfg(unix)]
    let fallback = {
        use std::os::unix::fs::PermissionsExt;
        Some(Permissions::from_mode(0o644))
    };
    #[cfg(not(unix))]
    let fallback = None;

    fallback
}
