// src/fetch/mod.rs
// =============================================================================
// This module downloads the remote stylesheet.
//
// Submodules:
// - http: the Fetcher itself (redirect loop, per-hop timeout, body decoding)
// - error: the FetchError taxonomy
// =============================================================================

mod error;
mod http;

pub use error::FetchError;
pub use http::{Fetcher, MAX_REDIRECTS};
