// src/core/scanner/methods_scanner.rs

use reqwest::Method;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::core::fetch::USER_AGENT;
use crate::core::models::{CheckKind, CheckPayload, CheckResult, HttpMethodsPayload};

const METHOD_TIMEOUT: Duration = Duration::from_secs(10);

const PROBED_METHODS: &[Method] = &[
    Method::GET,
    Method::POST,
    Method::HEAD,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
    Method::TRACE,
    Method::CONNECT,
    Method::PATCH,
];

// Methods that enable modification or request echoing when left open.
const RISKY_METHODS: &[&str] = &["PUT", "DELETE", "TRACE"];

pub fn is_risky_method(method: &str) -> bool {
    RISKY_METHODS.contains(&method)
}

/// Probes which HTTP methods the server answers for the target URL.
///
/// A method counts as supported unless the server answers 405 Method Not
/// Allowed or 501 Not Implemented; methods whose requests error out are
/// skipped. Informational only, never scored.
pub async fn run_http_methods_check(url: &Url) -> CheckResult {
    info!(url = %url, "Starting HTTP method check.");

    let client = match reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(METHOD_TIMEOUT)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "Could not build HTTP method probe client.");
            return CheckResult::unavailable(
                CheckKind::HttpMethods,
                format!("client error: {}", e),
            );
        }
    };

    let mut payload = HttpMethodsPayload::default();
    for method in PROBED_METHODS {
        match client.request(method.clone(), url.clone()).send().await {
            Ok(response) if !matches!(response.status().as_u16(), 405 | 501) => {
                payload.supported_methods.push(method.to_string());
                if is_risky_method(method.as_str()) {
                    payload.risky_methods.push(method.to_string());
                }
            }
            Ok(_) => {}
            Err(e) => {
                debug!(method = %method, error = %e, "Method probe errored, skipping.");
            }
        }
    }

    info!(
        supported = payload.supported_methods.len(),
        risky = payload.risky_methods.len(),
        "HTTP method check finished."
    );
    CheckResult::success(CheckPayload::HttpMethods(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modification_and_debug_methods_are_risky() {
        assert!(is_risky_method("PUT"));
        assert!(is_risky_method("DELETE"));
        assert!(is_risky_method("TRACE"));
        assert!(!is_risky_method("GET"));
        assert!(!is_risky_method("OPTIONS"));
    }

    #[test]
    fn probe_list_covers_the_risky_set() {
        for risky in RISKY_METHODS {
            assert!(PROBED_METHODS.iter().any(|m| m.as_str() == *risky));
        }
    }
}
