// src/core/fetch.rs

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tracing::{error, info};
use url::Url;

use crate::core::models::ScanError;

pub const USER_AGENT: &str = concat!("WatchtowerRS/", env!("CARGO_PKG_VERSION"));
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// The single top-level fetch of one target page. Everything the checks need
/// from the network round-trip is captured here, read-only.
#[derive(Debug)]
pub struct FetchedPage {
    pub final_url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl FetchedPage {
    /// Host component of the final URL, used by the TLS and DNS checks.
    pub fn host(&self) -> Option<&str> {
        self.final_url.host_str()
    }
}

/// Parses a raw target into a URL, defaulting the scheme to https when the
/// input omits it (the common case for bare domains).
pub fn normalize_target(raw: &str) -> Result<Url, ScanError> {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    Url::parse(&with_scheme).map_err(|source| ScanError::InvalidTarget {
        url: raw.to_string(),
        source,
    })
}

/// Performs the one GET request a scan is allowed. A failure here is fatal
/// for the URL's scan: no checks run and no assessment is produced.
pub async fn fetch_page(url: &Url) -> Result<FetchedPage, ScanError> {
    info!(url = %url, "Fetching target page.");

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|source| ScanError::Fetch {
            url: url.to_string(),
            source,
        })?;

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| {
            error!(url = %url, error = %source, "Top-level fetch failed.");
            ScanError::Fetch {
                url: url.to_string(),
                source,
            }
        })?;

    let final_url = response.url().clone();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.text().await.map_err(|source| {
        error!(url = %url, error = %source, "Failed to read response body.");
        ScanError::Fetch {
            url: url.to_string(),
            source,
        }
    })?;

    info!(status = %status, bytes = body.len(), "Fetched target page.");
    Ok(FetchedPage {
        final_url,
        status,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_defaults_to_https() {
        let url = normalize_target("example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn normalize_preserves_explicit_scheme() {
        let url = normalize_target("http://example.com/login").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.path(), "/login");
    }

    #[test]
    fn normalize_trims_whitespace() {
        let url = normalize_target("  example.com \n").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn normalize_rejects_garbage() {
        assert!(normalize_target("http://").is_err());
    }
}
