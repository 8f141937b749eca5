// src/core/scanner/cookie_scanner.rs

use reqwest::header::HeaderMap;
use tracing::debug;

use crate::core::models::{CheckPayload, CheckResult, CookieFlags, CookieSecPayload};

/// Parses one Set-Cookie header value into its security-relevant flags.
/// Returns None for values with no readable cookie name.
fn parse_set_cookie(raw: &str) -> Option<CookieFlags> {
    let mut segments = raw.split(';');
    let name_value = segments.next()?.trim();
    let name = name_value.split('=').next()?.trim();
    if name.is_empty() {
        return None;
    }

    let mut flags = CookieFlags {
        name: name.to_string(),
        secure: false,
        http_only: false,
        same_site: None,
    };

    for segment in segments {
        let attribute = segment.trim();
        if attribute.eq_ignore_ascii_case("secure") {
            flags.secure = true;
        } else if attribute.eq_ignore_ascii_case("httponly") {
            flags.http_only = true;
        } else if let Some(value) = attribute
            .split_once('=')
            .filter(|(key, _)| key.trim().eq_ignore_ascii_case("samesite"))
            .map(|(_, value)| value.trim())
        {
            flags.same_site = Some(value.to_string());
        }
    }

    Some(flags)
}

/// Examines every cookie the response sets for the Secure, HttpOnly and
/// SameSite attributes. A response that sets no cookies yields an empty
/// payload with zero counts, which scores 0.
pub fn run_cookie_check(headers: &HeaderMap) -> CheckResult {
    let cookies: Vec<CookieFlags> = headers
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(parse_set_cookie)
        .collect();

    let payload = CookieSecPayload {
        cookies_without_secure: cookies.iter().filter(|c| !c.secure).count() as u32,
        cookies_without_httponly: cookies.iter().filter(|c| !c.http_only).count() as u32,
        cookies_without_samesite: cookies.iter().filter(|c| c.same_site.is_none()).count() as u32,
        cookies,
    };

    debug!(
        cookies = payload.cookies.len(),
        without_secure = payload.cookies_without_secure,
        "Cookie security check done."
    );
    CheckResult::success(CheckPayload::CookieSec(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers_with_cookies(values: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append("set-cookie", HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn parses_attributes_case_insensitively() {
        let flags = parse_set_cookie("sid=abc123; Path=/; Secure; HTTPONLY; SameSite=Lax").unwrap();
        assert_eq!(flags.name, "sid");
        assert!(flags.secure);
        assert!(flags.http_only);
        assert_eq!(flags.same_site.as_deref(), Some("Lax"));
    }

    #[test]
    fn bare_cookie_has_no_flags() {
        let flags = parse_set_cookie("tracking=xyz").unwrap();
        assert!(!flags.secure);
        assert!(!flags.http_only);
        assert!(flags.same_site.is_none());
    }

    #[test]
    fn counts_missing_attributes_per_cookie() {
        let headers = headers_with_cookies(&[
            "a=1; Secure; HttpOnly; SameSite=Strict",
            "b=2; Secure",
            "c=3",
        ]);
        let result = run_cookie_check(&headers);
        let Some(CheckPayload::CookieSec(payload)) = result.payload() else {
            panic!("expected cookie_sec payload");
        };
        assert_eq!(payload.cookies.len(), 3);
        assert_eq!(payload.cookies_without_secure, 1);
        assert_eq!(payload.cookies_without_httponly, 2);
        assert_eq!(payload.cookies_without_samesite, 2);
    }

    #[test]
    fn no_cookies_is_an_empty_success() {
        let result = run_cookie_check(&HeaderMap::new());
        let Some(CheckPayload::CookieSec(payload)) = result.payload() else {
            panic!("expected cookie_sec payload");
        };
        assert!(payload.cookies.is_empty());
        assert_eq!(payload.cookies_without_secure, 0);
    }
}
