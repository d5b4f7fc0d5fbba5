// src/fetch/error.rs
// =============================================================================
// Error type for downloading the stylesheet.
//
// Every way a download can fail gets its own variant so the caller can tell
// a server problem (bad status, empty body) from a network problem
// (timeout, connection failure).
// =============================================================================

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a status that is neither 200 nor a redirect
    #[error("download failed: HTTP {status} from {url}")]
    Download { status: u16, url: String },

    /// The server answered 200 but sent no body
    #[error("downloaded content is empty: {url}")]
    EmptyContent { url: String },

    /// No complete response arrived within the configured window
    #[error("download timed out after {}ms: {url}", .timeout.as_millis())]
    Timeout { url: String, timeout: Duration },

    /// Connection, TLS or protocol failure below HTTP
    #[error("transport error while fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("too many redirects (more than {limit}) starting at {url}")]
    TooManyRedirects { url: String, limit: usize },

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported URL scheme (expected http or https): {url}")]
    UnsupportedScheme { url: String },
}
