// src/sync/mod.rs
// =============================================================================
// This module keeps the local stylesheet in sync with the remote one.
//
// Submodules:
// - updater: the Synchronizer that runs one update cycle
// - backup: naming, listing and pruning backup files
// - files: reading the current file and replacing it atomically
// - hash: MD5 digest used for change detection
// =============================================================================

mod backup;
mod files;
mod hash;
mod updater;

pub use updater::{Synchronizer, UpdateResult};
