// src/sync/updater.rs
// =============================================================================
// One update cycle: compare the remote stylesheet with the local copy and
// replace the local copy if it changed.
//
// Steps:
// 1. Read the current output file (missing/unreadable = no file)
// 2. Download the remote file
// 3. Compare MD5 digests; if equal, stop without touching the disk
// 4. Otherwise: back up the old file, prune old backups, write the new file
//
// Failure policy:
// - download errors and the final write are fatal
// - anything that goes wrong while backing up is reported and skipped
// =============================================================================

use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use super::backup::{create_backup, prune_backups};
use super::files::{read_existing, write_atomic};
use super::hash::content_hash;
use crate::config::Config;
use crate::error::UpdateError;
use crate::fetch::Fetcher;
use crate::report::Reporter;

/// Outcome of one update cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    /// Whether the output file was rewritten
    pub updated: bool,
    /// MD5 of the downloaded content
    pub hash: String,
    /// Backup of the previous file, if one was made
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
}

/// Keeps the output file in sync with the configured URL
pub struct Synchronizer {
    config: Config,
    fetcher: Fetcher,
    reporter: Arc<dyn Reporter>,
}

impl Synchronizer {
    pub fn new(config: Config, reporter: Arc<dyn Reporter>) -> Result<Self, UpdateError> {
        let fetcher = Fetcher::new(config.timeout)?.with_max_redirects(config.max_redirects);
        Ok(Self {
            config,
            fetcher,
            reporter,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs a single fetch/compare/replace cycle
    pub async fn run_update_cycle(&self) -> Result<UpdateResult, UpdateError> {
        let reporter = self.reporter.as_ref();
        let output = &self.config.output;

        reporter.info(&format!("Source: {}", self.config.source_url));
        reporter.info(&format!("Output: {}", output.display()));

        let existing = read_existing(output, reporter).await;
        let existing_hash = existing.as_deref().map(content_hash);

        match &existing_hash {
            Some(hash) => reporter.info(&format!("Found existing file (md5 {hash})")),
            None => reporter.info("No existing file found, a new one will be created"),
        }

        reporter.info("Downloading latest stylesheet...");
        let started = Instant::now();
        let download = self
            .fetcher
            .fetch(self.config.source_url.as_str())
            .await?;
        let elapsed = started.elapsed();

        if download.redirects > 0 {
            reporter.debug(&format!(
                "Followed {} redirect(s) to {}",
                download.redirects, download.final_url
            ));
        }

        let new_hash = content_hash(&download.body);
        reporter.success(&format!(
            "Download complete ({}ms, {} bytes)",
            elapsed.as_millis(),
            download.body.len()
        ));

        if existing_hash.as_deref() == Some(new_hash.as_str()) {
            reporter.info("Content unchanged, nothing to update");
            return Ok(UpdateResult {
                updated: false,
                hash: new_hash,
                backup_path: None,
            });
        }

        let backup_path = match self.backup(existing.as_deref()).await {
            Ok(Some(path)) => {
                reporter.success(&format!("Backup created: {}", path.display()));
                Some(path)
            }
            Ok(None) => {
                reporter.info("Skipping backup (no previous file)");
                None
            }
            Err(e) => {
                reporter.warn(&format!("Backup failed, continuing without one: {e}"));
                None
            }
        };

        write_atomic(output, &download.body).await?;
        reporter.success(&format!("File updated: {}", output.display()));

        Ok(UpdateResult {
            updated: true,
            hash: new_hash,
            backup_path,
        })
    }

    // Ensures the backup directory, saves the previous content (if any) and
    // trims the directory down to max_backups
    async fn backup(&self, previous: Option<&str>) -> Result<Option<PathBuf>, UpdateError> {
        let dir = &self.config.backup_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| UpdateError::fs("create backup directory", dir, e))?;

        let created = match previous {
            Some(content) => Some(create_backup(dir, content, Utc::now()).await?),
            None => None,
        };

        let removed = prune_backups(dir, self.config.max_backups).await?;
        for entry in &removed {
            self.reporter
                .debug(&format!("Removed old backup {}", entry.name));
        }

        Ok(created)
    }
}
