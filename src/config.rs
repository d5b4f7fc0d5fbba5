// src/config.rs
// =============================================================================
// Configuration for one update run.
//
// Three layers, each overriding the one before it field by field:
//   1. DEFAULTS (compiled in)
//   2. the JSON file given with --config
//   3. flags given on the command line
//
// The layers 2 and 3 share one shape, ConfigOverrides, where every field is
// optional. resolve() fills the gaps from DEFAULTS, validates, and produces
// the immutable Config that the rest of the program uses.
// =============================================================================

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::fetch::MAX_REDIRECTS;

/// Values used for any field the caller leaves out
#[derive(Debug, Clone, Copy)]
pub struct ConfigDefaults {
    pub output: &'static str,
    pub backup_dir: &'static str,
    pub max_backups: usize,
    pub max_redirects: usize,
    pub timeout_ms: u64,
}

pub const DEFAULTS: ConfigDefaults = ConfigDefaults {
    output: "./iconfont.css",
    backup_dir: "./backup",
    max_backups: 5,
    max_redirects: MAX_REDIRECTS,
    timeout_ms: 30_000,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("a source URL is required (use --url or set \"url\" in the config file)")]
    MissingUrl,

    #[error("invalid source URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported URL scheme '{scheme}' (expected http or https)")]
    UnsupportedScheme { scheme: String },

    #[error("{field} must be a positive integer")]
    InvalidValue { field: &'static str },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Fully resolved, validated settings for an update cycle
#[derive(Debug, Clone)]
pub struct Config {
    pub source_url: Url,
    pub output: PathBuf,
    pub backup_dir: PathBuf,
    pub max_backups: usize,
    pub max_redirects: usize,
    pub timeout: Duration,
}

/// Partial configuration: the JSON file format and the CLI flags
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(alias = "sourceUrl")]
    pub url: Option<String>,
    pub output: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    pub max_backups: Option<usize>,
    pub max_redirects: Option<usize>,
    /// Milliseconds
    pub timeout: Option<u64>,
}

impl ConfigOverrides {
    /// Parses overrides from JSON text
    pub fn from_json_str(json: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads overrides from a JSON file.
    ///
    /// Returns Ok(None) if the file does not exist.
    pub fn from_json_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::from_json_str(&content, path).map(Some)
    }

    /// Shallow merge: every field set in `other` replaces ours
    pub fn merge(self, other: ConfigOverrides) -> ConfigOverrides {
        ConfigOverrides {
            url: other.url.or(self.url),
            output: other.output.or(self.output),
            backup_dir: other.backup_dir.or(self.backup_dir),
            max_backups: other.max_backups.or(self.max_backups),
            max_redirects: other.max_redirects.or(self.max_redirects),
            timeout: other.timeout.or(self.timeout),
        }
    }

    /// Applies DEFAULTS to missing fields and validates the result
    pub fn resolve(self) -> Result<Config, ConfigError> {
        let raw_url = self
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingUrl)?;

        let source_url = Url::parse(raw_url.trim()).map_err(|e| ConfigError::InvalidUrl {
            url: raw_url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(source_url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme {
                scheme: source_url.scheme().to_string(),
            });
        }

        let max_backups = self.max_backups.unwrap_or(DEFAULTS.max_backups);
        if max_backups == 0 {
            return Err(ConfigError::InvalidValue {
                field: "maxBackups",
            });
        }

        let timeout_ms = self.timeout.unwrap_or(DEFAULTS.timeout_ms);
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidValue { field: "timeout" });
        }

        Ok(Config {
            source_url,
            output: self.output.unwrap_or_else(|| PathBuf::from(DEFAULTS.output)),
            backup_dir: self
                .backup_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULTS.backup_dir)),
            max_backups,
            max_redirects: self.max_redirects.unwrap_or(DEFAULTS.max_redirects),
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}
