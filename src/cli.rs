// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// Every option is optional here: values can also come from a JSON config
// file, and whether a URL was given at all is only known after merging.
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

use crate::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(
    name = "iconfont-updater",
    version,
    about = "Download an icon font stylesheet and update the local copy when it changes",
    after_help = "Examples:\n  \
        iconfont-updater --url https://at.alicdn.com/t/c/font_xxx.css\n  \
        iconfont-updater --url https://at.alicdn.com/t/c/font_xxx.css --output ./static/font/iconfont.css\n  \
        iconfont-updater --config iconfont.config.json"
)]
pub struct Cli {
    /// URL of the icon font stylesheet
    #[arg(short, long)]
    pub url: Option<String>,

    /// Output file path [default: ./iconfont.css]
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Backup directory [default: ./backup]
    #[arg(short, long = "backup-dir", value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,

    /// Number of backups to keep [default: 5]
    #[arg(short, long = "max-backups", value_name = "N")]
    pub max_backups: Option<usize>,

    /// Redirects to follow before giving up [default: 10]
    #[arg(long = "max-redirects", value_name = "N")]
    pub max_redirects: Option<usize>,

    /// Per-request timeout in milliseconds [default: 30000]
    #[arg(short, long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// JSON config file; command-line options override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the result as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// The configuration values given as flags
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            url: self.url.clone(),
            output: self.output.clone(),
            backup_dir: self.backup_dir.clone(),
            max_backups: self.max_backups,
            max_redirects: self.max_redirects,
            timeout: self.timeout,
        }
    }
}
