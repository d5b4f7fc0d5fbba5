// src/error.rs
// =============================================================================
// Errors that end an update cycle.
//
// Only two things are fatal: the download failing, or the filesystem
// refusing the final write. Problems reading the old file or managing
// backups are reported and worked around instead.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

use crate::fetch::FetchError;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to {action} {}: {source}", .path.display())]
    FileSystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UpdateError {
    pub(crate) fn fs(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        UpdateError::FileSystem {
            action,
            path: path.into(),
            source,
        }
    }
}
