// src/fetch/http.rs
// =============================================================================
// This module downloads a single URL and returns its body as text.
//
// Key functionality:
// - Follows 301/302/307/308 redirects itself (reqwest's automatic redirect
//   handling is switched off) with an explicit, capped loop
// - Applies the configured timeout to every hop separately, so a redirect
//   starts a fresh window for the next request
// - Maps every failure to a FetchError variant
//
// Each hop is one future: it is either Redirected (go round the loop again)
// or Complete (we have the body). Wrapping that future in
// tokio::time::timeout means an expired timer drops it, and dropping a
// reqwest future aborts the in-flight request.
// =============================================================================

use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

use super::FetchError;

/// Maximum number of redirects followed before giving up
pub const MAX_REDIRECTS: usize = 10;

// Status codes we treat as "go look over there"
const REDIRECT_STATUSES: [StatusCode; 4] = [
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::FOUND,
    StatusCode::TEMPORARY_REDIRECT,
    StatusCode::PERMANENT_REDIRECT,
];

// Outcome of a single request in the redirect chain
#[derive(Debug)]
enum Hop {
    Redirected(Url),
    Complete(String),
}

/// Result of a successful download, with the route it took
#[derive(Debug, Clone)]
pub struct Download {
    /// Response body decoded as UTF-8
    pub body: String,
    /// URL that finally answered 200
    pub final_url: Url,
    /// Number of redirects followed to get there
    pub redirects: usize,
}

/// Downloads text resources over HTTP(S)
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    max_redirects: usize,
}

impl Fetcher {
    /// Creates a fetcher whose every hop must complete within `timeout`
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        // reqwest picks the transport (TLS or plain TCP) from the URL scheme.
        // Redirects are disabled here because we follow them ourselves.
        let client = Client::builder()
            .redirect(Policy::none())
            .user_agent(concat!("iconfont-updater/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            timeout,
            max_redirects: MAX_REDIRECTS,
        })
    }

    /// Overrides the redirect cap (MAX_REDIRECTS by default)
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Downloads `url`, following redirects, and returns the body text
    /// along with where it ended up
    pub async fn fetch(&self, url: &str) -> Result<Download, FetchError> {
        let mut current = parse_http_url(url)?;
        let mut redirects = 0;

        loop {
            let hop = tokio::time::timeout(self.timeout, self.fetch_hop(&current))
                .await
                .map_err(|_| FetchError::Timeout {
                    url: current.to_string(),
                    timeout: self.timeout,
                })??;

            match hop {
                Hop::Complete(body) => {
                    return Ok(Download {
                        body,
                        final_url: current,
                        redirects,
                    });
                }
                Hop::Redirected(next) => {
                    if redirects >= self.max_redirects {
                        return Err(FetchError::TooManyRedirects {
                            url: url.to_string(),
                            limit: self.max_redirects,
                        });
                    }
                    ensure_http_scheme(&next)?;
                    redirects += 1;
                    current = next;
                }
            }
        }
    }

    // Performs one GET and classifies the response
    async fn fetch_hop(&self, url: &Url) -> Result<Hop, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();

        if REDIRECT_STATUSES.contains(&status) {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok());

            // A redirect with no usable Location falls through to the
            // status check below and fails as a Download error
            if let Some(location) = location {
                // join() handles absolute, scheme-relative and relative targets
                let next = url.join(location).map_err(|e| FetchError::InvalidUrl {
                    url: location.to_string(),
                    reason: e.to_string(),
                })?;
                return Ok(Hop::Redirected(next));
            }
        }

        if status != StatusCode::OK {
            return Err(FetchError::Download {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        if bytes.is_empty() {
            return Err(FetchError::EmptyContent {
                url: url.to_string(),
            });
        }

        Ok(Hop::Complete(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

// Parses a user-supplied URL and makes sure we know how to fetch it
fn parse_http_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw).map_err(|e| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    ensure_http_scheme(&url)?;
    Ok(url)
}

fn ensure_http_scheme(url: &Url) -> Result<(), FetchError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(FetchError::UnsupportedScheme {
            url: url.to_string(),
        }),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does `??` mean?
//    - tokio::time::timeout returns Result<T, Elapsed>
//    - Our hop itself returns Result<Hop, FetchError>
//    - So the combined value is Result<Result<Hop, FetchError>, Elapsed>
//    - The first ? handles the timeout (after map_err), the second the hop
//
// 2. Why a loop instead of calling fetch() again for each redirect?
//    - A recursive async fn needs boxing and can grow without bound
//    - A loop with a counter makes the redirect cap obvious
//
// 3. Why String::from_utf8_lossy?
//    - Stylesheets are text; any invalid byte sequence becomes U+FFFD
//      instead of failing the whole download
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_server;
    use axum::http::{header, StatusCode as MockStatus};
    use axum::routing::get;
    use axum::Router;

    fn fetcher(timeout_ms: u64) -> Fetcher {
        Fetcher::new(Duration::from_millis(timeout_ms)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_plain_200() {
        let base = spawn_server(|_| {
            Router::new().route("/font.css", get(|| async { ".icon { color: red; }" }))
        })
        .await;

        let body = fetcher(5_000).fetch(&format!("{base}/font.css")).await.unwrap().body;
        assert_eq!(body, ".icon { color: red; }");
    }

    #[tokio::test]
    async fn test_follows_relative_redirect() {
        let base = spawn_server(|_| {
            Router::new()
                .route(
                    "/start.css",
                    get(|| async { (MockStatus::FOUND, [(header::LOCATION, "/final.css")]) }),
                )
                .route("/final.css", get(|| async { "redirected content" }))
        })
        .await;

        let download = fetcher(5_000)
            .fetch(&format!("{base}/start.css"))
            .await
            .unwrap();
        assert_eq!(download.body, "redirected content");
        assert_eq!(download.redirects, 1);
        assert_eq!(download.final_url.path(), "/final.css");
    }

    #[tokio::test]
    async fn test_follows_absolute_redirect() {
        let base = spawn_server(|base| {
            let target = format!("{base}/final.css");
            Router::new()
                .route(
                    "/start.css",
                    get(move || async move { (MockStatus::FOUND, [(header::LOCATION, target)]) }),
                )
                .route("/final.css", get(|| async { "redirected content" }))
        })
        .await;

        let body = fetcher(5_000).fetch(&format!("{base}/start.css")).await.unwrap().body;
        assert_eq!(body, "redirected content");
    }

    #[tokio::test]
    async fn test_follows_every_redirect_status() {
        let base = spawn_server(|_| {
            Router::new()
                .route(
                    "/a",
                    get(|| async { (MockStatus::MOVED_PERMANENTLY, [(header::LOCATION, "/b")]) }),
                )
                .route(
                    "/b",
                    get(|| async { (MockStatus::TEMPORARY_REDIRECT, [(header::LOCATION, "c")]) }),
                )
                .route(
                    "/c",
                    get(|| async { (MockStatus::PERMANENT_REDIRECT, [(header::LOCATION, "/end")]) }),
                )
                .route("/end", get(|| async { "done" }))
        })
        .await;

        let download = fetcher(5_000).fetch(&format!("{base}/a")).await.unwrap();
        assert_eq!(download.body, "done");
        assert_eq!(download.redirects, 3);
    }

    #[tokio::test]
    async fn test_not_found_reports_status() {
        let base = spawn_server(|_| {
            Router::new().route("/gone.css", get(|| async { (MockStatus::NOT_FOUND, "nope") }))
        })
        .await;

        let err = fetcher(5_000)
            .fetch(&format!("{base}/gone.css"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Download { status: 404, .. }));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_other_success_codes_are_not_accepted() {
        let base = spawn_server(|_| {
            Router::new().route("/partial", get(|| async { (MockStatus::NO_CONTENT, "") }))
        })
        .await;

        let err = fetcher(5_000).fetch(&format!("{base}/partial")).await.unwrap_err();
        assert!(matches!(err, FetchError::Download { status: 204, .. }));
    }

    #[tokio::test]
    async fn test_redirect_without_location_is_download_error() {
        let base = spawn_server(|_| {
            Router::new().route("/moved", get(|| async { (MockStatus::FOUND, "no location") }))
        })
        .await;

        let err = fetcher(5_000).fetch(&format!("{base}/moved")).await.unwrap_err();
        assert!(matches!(err, FetchError::Download { status: 302, .. }));
    }

    #[tokio::test]
    async fn test_empty_body_is_rejected() {
        let base = spawn_server(|_| Router::new().route("/empty.css", get(|| async { "" })))
            .await;

        let err = fetcher(5_000)
            .fetch(&format!("{base}/empty.css"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::EmptyContent { .. }));
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let base = spawn_server(|_| {
            Router::new().route(
                "/slow.css",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    "too late"
                }),
            )
        })
        .await;

        let err = fetcher(100).fetch(&format!("{base}/slow.css")).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_timeout_window_restarts_on_redirect() {
        // Each hop takes 150ms; together they exceed the 250ms window,
        // individually they do not
        let base = spawn_server(|_| {
            Router::new()
                .route(
                    "/first",
                    get(|| async {
                        tokio::time::sleep(Duration::from_millis(150)).await;
                        (MockStatus::FOUND, [(header::LOCATION, "/second")])
                    }),
                )
                .route(
                    "/second",
                    get(|| async {
                        tokio::time::sleep(Duration::from_millis(150)).await;
                        "made it"
                    }),
                )
        })
        .await;

        let body = fetcher(250).fetch(&format!("{base}/first")).await.unwrap().body;
        assert_eq!(body, "made it");
    }

    #[tokio::test]
    async fn test_redirect_loop_hits_cap() {
        let base = spawn_server(|_| {
            Router::new().route(
                "/loop",
                get(|| async { (MockStatus::FOUND, [(header::LOCATION, "/loop")]) }),
            )
        })
        .await;

        let err = fetcher(5_000)
            .with_max_redirects(3)
            .fetch(&format!("{base}/loop"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::TooManyRedirects { limit: 3, .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Grab a free port, then close it again so nothing is listening
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let err = fetcher(5_000)
            .fetch(&format!("http://{addr}/font.css"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_rejects_non_http_scheme() {
        let err = fetcher(5_000)
            .fetch("ftp://example.com/font.css")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedScheme { .. }));
    }

    #[tokio::test]
    async fn test_rejects_unparseable_url() {
        let err = fetcher(5_000).fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }
}
