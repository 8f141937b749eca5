// src/core/scanner/headers_scanner.rs
//
// Checks that only need the already-fetched response headers (and the final
// URL scheme). These are pure functions over read-only input and cannot fail,
// so they always return a Success outcome.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::HeaderMap;
use tracing::debug;
use url::Url;

use crate::core::models::{
    CachingPayload, CheckPayload, CheckResult, ClickjackingPayload, CorsPayload, CspPayload,
    SecHeadersPayload, SecurityPayload, ServerInfoPayload,
};

/// The broader inventory of recommended security headers checked by the
/// sec_headers check, beyond the core five of the security check.
const RECOMMENDED_HEADERS: &[&str] = &[
    "Strict-Transport-Security",
    "Content-Security-Policy",
    "X-Content-Type-Options",
    "X-Frame-Options",
    "X-XSS-Protection",
    "Referrer-Policy",
    "Feature-Policy",
    "Permissions-Policy",
    "Cache-Control",
    "Clear-Site-Data",
];

static FRAME_ANCESTORS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"frame-ancestors\s+([^;]+)").unwrap());

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// HTTPS transport check: scheme plus the five core security headers.
pub fn run_security_check(final_url: &Url, headers: &HeaderMap) -> CheckResult {
    let payload = SecurityPayload {
        is_https: final_url.scheme() == "https",
        hsts: headers.contains_key("strict-transport-security"),
        content_security_policy: headers.contains_key("content-security-policy"),
        x_content_type_options: headers.contains_key("x-content-type-options"),
        x_frame_options: headers.contains_key("x-frame-options"),
        x_xss_protection: headers.contains_key("x-xss-protection"),
    };
    debug!(is_https = payload.is_https, "Security check done.");
    CheckResult::success(CheckPayload::Security(payload))
}

/// Inventory of the ten recommended security headers.
pub fn run_sec_headers_check(headers: &HeaderMap) -> CheckResult {
    let mut payload = SecHeadersPayload::default();
    for name in RECOMMENDED_HEADERS {
        match header_value(headers, name) {
            Some(value) => {
                payload.present.insert(name.to_string(), value);
            }
            None => payload.missing.push(name.to_string()),
        }
    }
    debug!(missing = payload.missing.len(), "Security header inventory done.");
    CheckResult::success(CheckPayload::SecHeaders(payload))
}

/// Content-Security-Policy presence and unsafe directive usage. A policy
/// served only in report-only mode does not count as an enforced CSP.
pub fn run_csp_check(headers: &HeaderMap) -> CheckResult {
    let mut payload = CspPayload::default();

    if let Some(csp) = header_value(headers, "content-security-policy") {
        payload.has_csp = true;
        payload.unsafe_inline = csp.contains("'unsafe-inline'");
        payload.unsafe_eval = csp.contains("'unsafe-eval'");
        payload.policy = Some(csp);
    }

    if let Some(report_only) = header_value(headers, "content-security-policy-report-only") {
        payload.report_only = true;
        if !payload.has_csp {
            payload.policy = Some(report_only);
        }
    }

    CheckResult::success(CheckPayload::Csp(payload))
}

/// CORS policy summary: wildcard origins and credential sharing.
pub fn run_cors_check(headers: &HeaderMap) -> CheckResult {
    let mut payload = CorsPayload::default();

    if let Some(origin) = header_value(headers, "access-control-allow-origin") {
        payload.has_cors_headers = true;
        payload.allows_any_origin = origin == "*";
        payload.allowed_origins = Some(origin);
    }
    if header_value(headers, "access-control-allow-credentials").as_deref() == Some("true") {
        payload.allows_credentials = true;
    }
    payload.allowed_methods = header_value(headers, "access-control-allow-methods");

    CheckResult::success(CheckPayload::Cors(payload))
}

/// Framing protection via X-Frame-Options and/or CSP frame-ancestors.
pub fn run_clickjacking_check(headers: &HeaderMap) -> CheckResult {
    let mut payload = ClickjackingPayload::default();

    if let Some(xfo) = header_value(headers, "x-frame-options") {
        payload.x_frame_options = Some(xfo);
        payload.protected = true;
        payload.protection_method = Some("X-Frame-Options".to_string());
    }

    if let Some(csp) = header_value(headers, "content-security-policy") {
        if let Some(caps) = FRAME_ANCESTORS_RE.captures(&csp) {
            payload.csp_frame_ancestors = Some(caps[1].trim().to_string());
            payload.protected = true;
            payload.protection_method = Some(match payload.protection_method {
                Some(_) => "Both X-Frame-Options and CSP frame-ancestors".to_string(),
                None => "CSP frame-ancestors".to_string(),
            });
        }
    }

    CheckResult::success(CheckPayload::Clickjacking(payload))
}

/// Server identification disclosed through response headers.
pub fn run_server_info_check(headers: &HeaderMap) -> CheckResult {
    let mut payload = ServerInfoPayload {
        server: header_value(headers, "server"),
        powered_by: header_value(headers, "x-powered-by"),
        technology_hints: Vec::new(),
    };
    for name in ["x-aspnet-version", "x-aspnetmvc-version", "x-generator", "x-drupal-cache"] {
        if let Some(value) = header_value(headers, name) {
            payload.technology_hints.push(format!("{}: {}", name, value));
        }
    }
    CheckResult::success(CheckPayload::ServerInfo(payload))
}

/// Caching directives on the page response.
pub fn run_caching_check(headers: &HeaderMap) -> CheckResult {
    let payload = CachingPayload {
        cache_control: header_value(headers, "cache-control"),
        pragma: header_value(headers, "pragma"),
        expires: header_value(headers, "expires"),
        has_etag: headers.contains_key("etag"),
    };
    CheckResult::success(CheckPayload::Caching(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    fn header_map(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(
                name.parse::<HeaderName>().unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        headers
    }

    #[test]
    fn security_check_reflects_scheme_and_headers() {
        let url = Url::parse("https://example.com/").unwrap();
        let headers = header_map(&[
            ("strict-transport-security", "max-age=31536000"),
            ("x-content-type-options", "nosniff"),
        ]);
        let result = run_security_check(&url, &headers);
        let Some(CheckPayload::Security(payload)) = result.payload() else {
            panic!("expected security payload");
        };
        assert!(payload.is_https);
        assert!(payload.hsts);
        assert!(payload.x_content_type_options);
        assert!(!payload.content_security_policy);
        assert!(!payload.x_frame_options);
    }

    #[test]
    fn plain_http_page_is_not_https() {
        let url = Url::parse("http://example.com/").unwrap();
        let result = run_security_check(&url, &HeaderMap::new());
        let Some(CheckPayload::Security(payload)) = result.payload() else {
            panic!("expected security payload");
        };
        assert!(!payload.is_https);
    }

    #[test]
    fn sec_headers_partitions_present_and_missing() {
        let headers = header_map(&[
            ("content-security-policy", "default-src 'self'"),
            ("referrer-policy", "no-referrer"),
        ]);
        let result = run_sec_headers_check(&headers);
        let Some(CheckPayload::SecHeaders(payload)) = result.payload() else {
            panic!("expected sec_headers payload");
        };
        assert_eq!(payload.present.len(), 2);
        assert_eq!(payload.missing.len(), 8);
        assert!(payload.missing.contains(&"X-Frame-Options".to_string()));
    }

    #[test]
    fn csp_detects_unsafe_directives() {
        let headers = header_map(&[(
            "content-security-policy",
            "default-src 'self'; script-src 'unsafe-inline' 'unsafe-eval'",
        )]);
        let result = run_csp_check(&headers);
        let Some(CheckPayload::Csp(payload)) = result.payload() else {
            panic!("expected csp payload");
        };
        assert!(payload.has_csp);
        assert!(payload.unsafe_inline);
        assert!(payload.unsafe_eval);
        assert!(!payload.report_only);
    }

    #[test]
    fn report_only_policy_is_not_an_enforced_csp() {
        let headers = header_map(&[(
            "content-security-policy-report-only",
            "default-src 'self'",
        )]);
        let result = run_csp_check(&headers);
        let Some(CheckPayload::Csp(payload)) = result.payload() else {
            panic!("expected csp payload");
        };
        assert!(!payload.has_csp);
        assert!(payload.report_only);
        assert_eq!(payload.policy.as_deref(), Some("default-src 'self'"));
    }

    #[test]
    fn cors_flags_wildcard_origin_with_credentials() {
        let headers = header_map(&[
            ("access-control-allow-origin", "*"),
            ("access-control-allow-credentials", "true"),
            ("access-control-allow-methods", "GET, POST"),
        ]);
        let result = run_cors_check(&headers);
        let Some(CheckPayload::Cors(payload)) = result.payload() else {
            panic!("expected cors payload");
        };
        assert!(payload.has_cors_headers);
        assert!(payload.allows_any_origin);
        assert!(payload.allows_credentials);
        assert_eq!(payload.allowed_methods.as_deref(), Some("GET, POST"));
    }

    #[test]
    fn clickjacking_protected_by_either_mechanism() {
        let unprotected = run_clickjacking_check(&HeaderMap::new());
        let Some(CheckPayload::Clickjacking(payload)) = unprotected.payload() else {
            panic!("expected clickjacking payload");
        };
        assert!(!payload.protected);

        let via_xfo = run_clickjacking_check(&header_map(&[("x-frame-options", "DENY")]));
        let Some(CheckPayload::Clickjacking(payload)) = via_xfo.payload() else {
            panic!("expected clickjacking payload");
        };
        assert!(payload.protected);
        assert_eq!(payload.protection_method.as_deref(), Some("X-Frame-Options"));

        let via_both = run_clickjacking_check(&header_map(&[
            ("x-frame-options", "SAMEORIGIN"),
            ("content-security-policy", "frame-ancestors 'self'; default-src 'self'"),
        ]));
        let Some(CheckPayload::Clickjacking(payload)) = via_both.payload() else {
            panic!("expected clickjacking payload");
        };
        assert!(payload.protected);
        assert_eq!(payload.csp_frame_ancestors.as_deref(), Some("'self'"));
        assert_eq!(
            payload.protection_method.as_deref(),
            Some("Both X-Frame-Options and CSP frame-ancestors")
        );
    }

    #[test]
    fn server_info_collects_version_hints() {
        let headers = header_map(&[
            ("server", "nginx/1.25.3"),
            ("x-powered-by", "PHP/8.2"),
            ("x-generator", "Drupal 10"),
        ]);
        let result = run_server_info_check(&headers);
        let Some(CheckPayload::ServerInfo(payload)) = result.payload() else {
            panic!("expected server_info payload");
        };
        assert_eq!(payload.server.as_deref(), Some("nginx/1.25.3"));
        assert_eq!(payload.powered_by.as_deref(), Some("PHP/8.2"));
        assert_eq!(payload.technology_hints, vec!["x-generator: Drupal 10"]);
    }
}
