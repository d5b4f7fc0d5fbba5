// src/sync/backup.rs
// =============================================================================
// Backup creation and rotation.
//
// Backups are named  iconfont-<timestamp>.css  where the timestamp is an
// RFC 3339 UTC time with ':' and '.' swapped for '-', for example
//   iconfont-2024-05-01T08-30-00-123Z.css
//
// Names sort roughly by time, but rotation orders by the file's actual
// modification time so a clock jump cannot make us delete the wrong files.
// =============================================================================

use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::UpdateError;

pub const BACKUP_PREFIX: &str = "iconfont-";
pub const BACKUP_SUFFIX: &str = ".css";

/// A backup file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub name: String,
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// File name for a backup taken at `now`
pub fn backup_file_name(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{BACKUP_PREFIX}{stamp}{BACKUP_SUFFIX}")
}

/// Whether `name` follows the backup naming convention
pub fn is_backup_name(name: &str) -> bool {
    name.len() > BACKUP_PREFIX.len() + BACKUP_SUFFIX.len()
        && name.starts_with(BACKUP_PREFIX)
        && name.ends_with(BACKUP_SUFFIX)
}

/// Writes `content` to a new timestamped backup in `dir`
pub async fn create_backup(
    dir: &Path,
    content: &str,
    now: DateTime<Utc>,
) -> Result<PathBuf, UpdateError> {
    let path = dir.join(backup_file_name(now));
    tokio::fs::write(&path, content)
        .await
        .map_err(|e| UpdateError::fs("write backup", &path, e))?;
    Ok(path)
}

/// Lists backups in `dir`, newest modification time first
pub async fn list_backups(dir: &Path) -> Result<Vec<BackupEntry>, UpdateError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| UpdateError::fs("list backup directory", dir, e))?;

    let mut backups = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| UpdateError::fs("list backup directory", dir, e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_backup_name(&name) {
            continue;
        }

        let path = entry.path();
        let metadata = entry
            .metadata()
            .await
            .map_err(|e| UpdateError::fs("inspect backup", &path, e))?;
        if !metadata.is_file() {
            continue;
        }

        let modified = metadata
            .modified()
            .map_err(|e| UpdateError::fs("inspect backup", &path, e))?;

        backups.push(BackupEntry {
            name,
            path,
            modified,
        });
    }

    // Ties (same mtime) fall back to the name so the order is stable
    backups.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| b.name.cmp(&a.name))
    });

    Ok(backups)
}

/// Deletes all but the `keep` most recently modified backups.
///
/// Returns the entries that were removed.
pub async fn prune_backups(dir: &Path, keep: usize) -> Result<Vec<BackupEntry>, UpdateError> {
    let backups = list_backups(dir).await?;
    let stale: Vec<BackupEntry> = backups.into_iter().skip(keep).collect();

    for entry in &stale {
        tokio::fs::remove_file(&entry.path)
            .await
            .map_err(|e| UpdateError::fs("delete old backup", &entry.path, e))?;
    }

    Ok(stale)
}
