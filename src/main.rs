// src/main.rs
// =============================================================================
// Entry point of the iconfont-updater CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Merge the optional JSON config file with the flags into a Config
// 3. Run one update cycle
// 4. Print the result and exit with the proper code
//    (0 = success, 1 = update failed, 2 = usage or configuration error)
// =============================================================================

mod cli;
mod config;
mod error;
mod fetch;
mod logger;
mod report;
mod sync;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use cli::Cli;
use config::{ConfigError, ConfigOverrides};
use report::{Reporter, TracingReporter};
use sync::{Synchronizer, UpdateResult};

const EXIT_OK: i32 = 0;
const EXIT_UPDATE_FAILED: i32 = 1;
const EXIT_USAGE: i32 = 2;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_UPDATE_FAILED
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logger::init(&cli.log_level)?;

    let config = match load_overrides(&cli).and_then(ConfigOverrides::resolve) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            return Ok(EXIT_USAGE);
        }
    };

    let reporter: Arc<dyn Reporter> = Arc::new(TracingReporter);
    let synchronizer = Synchronizer::new(config, reporter.clone())?;

    match synchronizer.run_update_cycle().await {
        Ok(result) => {
            print_result(&result, cli.json)?;
            Ok(EXIT_OK)
        }
        Err(e) => {
            // Error messages already embed their underlying cause
            reporter.error(&format!(
                "Update from {} failed: {}",
                synchronizer.config().source_url,
                e
            ));
            if cli.json {
                let failure = serde_json::json!({ "updated": false, "error": e.to_string() });
                println!("{}", serde_json::to_string_pretty(&failure)?);
            }
            Ok(EXIT_UPDATE_FAILED)
        }
    }
}

// Config file first, then flags on top
fn load_overrides(cli: &Cli) -> Result<ConfigOverrides, ConfigError> {
    let mut overrides = ConfigOverrides::default();

    if let Some(path) = &cli.config {
        match ConfigOverrides::from_json_file(path)? {
            Some(from_file) => overrides = from_file,
            None => tracing::warn!(path = %path.display(), "config file not found, ignoring it"),
        }
    }

    Ok(overrides.merge(cli.overrides()))
}

fn print_result(result: &UpdateResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    if result.updated {
        println!("✅ Updated (md5 {})", result.hash);
        match &result.backup_path {
            Some(path) => println!("   Backup: {}", path.display()),
            None => println!("   No backup made"),
        }
    } else {
        println!("ℹ️  Already up to date (md5 {})", result.hash);
    }

    Ok(())
}
