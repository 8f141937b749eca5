// src/core/scanner/mod.rs
//
// The orchestration layer: for one target URL, fetch the page once, run the
// selected checks exactly once each in fixed registration order, feed the
// scoring-eligible results into a per-URL session, and aggregate them into
// the final threat assessment.

pub mod content_scanner;
pub mod cookie_scanner;
pub mod dns_scanner;
pub mod headers_scanner;
pub mod methods_scanner;
pub mod ssl_scanner;

use chrono::Utc;
use scraper::Html;
use std::collections::BTreeSet;
use strum::IntoEnumIterator;
use tracing::{info, warn};

use crate::core::fetch::{FetchedPage, fetch_page, normalize_target};
use crate::core::knowledge_base;
use crate::core::models::{CheckKind, CheckResult, ScanError, ScanReport, ThreatAssessment};
use crate::core::scoring::{ScanSession, aggregate};

use self::content_scanner::{
    run_deserialize_check, run_email_protection_check, run_file_upload_check, run_iframe_check,
    run_leaks_check, run_mixed_content_check, run_password_forms_check, run_sql_leak_check,
    run_vulns_check,
};
use self::cookie_scanner::run_cookie_check;
use self::dns_scanner::run_dns_check;
use self::headers_scanner::{
    run_caching_check, run_clickjacking_check, run_cors_check, run_csp_check,
    run_sec_headers_check, run_security_check, run_server_info_check,
};
use self::methods_scanner::run_http_methods_check;
use self::ssl_scanner::run_ssl_check;

/// The set of checks one scan invocation should run. Built by the caller
/// (the CLI layer); the core never parses flags itself.
#[derive(Debug, Clone)]
pub struct CheckSelection {
    kinds: BTreeSet<CheckKind>,
}

impl CheckSelection {
    pub fn all() -> Self {
        Self {
            kinds: CheckKind::iter().collect(),
        }
    }

    pub fn from_kinds(kinds: impl IntoIterator<Item = CheckKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn contains(&self, kind: CheckKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl Default for CheckSelection {
    fn default() -> Self {
        Self::all()
    }
}

/// Scans one target URL.
///
/// Only the top-level fetch can fail; once the page is in hand, every
/// selected check runs to completion and degrades individually into an
/// `Unavailable` result instead of aborting the scan.
pub async fn run_scan(target: &str, selection: &CheckSelection) -> Result<ScanReport, ScanError> {
    let url = normalize_target(target)?;
    info!(target, url = %url, "Starting scan.");

    let page = fetch_page(&url).await?;
    let results = run_selected_checks(&page, selection).await;
    let assessment = assess(&results);

    info!(
        checks = results.len(),
        scored = assessment.is_some(),
        "Scan finished."
    );
    Ok(ScanReport {
        target: target.to_string(),
        final_url: page.final_url.to_string(),
        status_code: page.status.as_u16(),
        scanned_at: Utc::now(),
        results,
        assessment,
    })
}

/// Executes the selected checks in registration order. The order is fixed so
/// console output is reproducible run to run; the aggregate score does not
/// depend on it.
async fn run_selected_checks(page: &FetchedPage, selection: &CheckSelection) -> Vec<CheckResult> {
    let mut results = Vec::new();
    let headers = &page.headers;

    if selection.contains(CheckKind::Security) {
        results.push(run_security_check(&page.final_url, headers));
    }
    if selection.contains(CheckKind::SecHeaders) {
        results.push(run_sec_headers_check(headers));
    }
    if selection.contains(CheckKind::Csp) {
        results.push(run_csp_check(headers));
    }
    if selection.contains(CheckKind::Cors) {
        results.push(run_cors_check(headers));
    }
    if selection.contains(CheckKind::Clickjacking) {
        results.push(run_clickjacking_check(headers));
    }
    if selection.contains(CheckKind::CookieSec) {
        results.push(run_cookie_check(headers));
    }
    if selection.contains(CheckKind::ServerInfo) {
        results.push(run_server_info_check(headers));
    }
    if selection.contains(CheckKind::Caching) {
        results.push(run_caching_check(headers));
    }

    if selection.contains(CheckKind::HttpMethods) {
        results.push(run_http_methods_check(&page.final_url).await);
    }
    if selection.contains(CheckKind::Ssl) {
        results.push(match page.host() {
            Some(host) => run_ssl_check(host).await,
            None => {
                warn!("Final URL has no host, skipping TLS probe.");
                CheckResult::unavailable(CheckKind::Ssl, "final URL has no host")
            }
        });
    }
    if selection.contains(CheckKind::Dns) {
        results.push(match page.host() {
            Some(host) => run_dns_check(host).await,
            None => CheckResult::unavailable(CheckKind::Dns, "final URL has no host"),
        });
    }

    // Document checks are synchronous and share one parse of the body. The
    // parsed tree is not Send, so it stays inside this scope with no awaits.
    let wants_document_checks = [
        CheckKind::MixedContent,
        CheckKind::IframeSecurity,
        CheckKind::Passwords,
        CheckKind::Vulns,
        CheckKind::Deserialize,
        CheckKind::Leaks,
        CheckKind::SqlLeak,
        CheckKind::FileUpload,
        CheckKind::EmailProtection,
    ]
    .iter()
    .any(|k| selection.contains(*k));

    if wants_document_checks {
        let doc = Html::parse_document(&page.body);
        if selection.contains(CheckKind::MixedContent) {
            results.push(run_mixed_content_check(&doc, &page.final_url));
        }
        if selection.contains(CheckKind::IframeSecurity) {
            results.push(run_iframe_check(&doc));
        }
        if selection.contains(CheckKind::Passwords) {
            results.push(run_password_forms_check(&doc));
        }
        if selection.contains(CheckKind::Vulns) {
            results.push(run_vulns_check(&doc, &page.body, &page.final_url));
        }
        if selection.contains(CheckKind::Deserialize) {
            results.push(run_deserialize_check(&doc));
        }
        if selection.contains(CheckKind::Leaks) {
            results.push(run_leaks_check(&doc, &page.body, headers));
        }
        if selection.contains(CheckKind::SqlLeak) {
            results.push(run_sql_leak_check(&doc));
        }
        if selection.contains(CheckKind::FileUpload) {
            results.push(run_file_upload_check(&doc));
        }
        if selection.contains(CheckKind::EmailProtection) {
            results.push(run_email_protection_check(&doc, &page.body));
        }
    }

    results
}

/// Scores and aggregates a finished set of check results.
///
/// Returns `None` when no scoring-eligible check ran at all (for example a
/// purely informational selection). When scoring-eligible checks ran but
/// all came back unavailable, the defined terminal assessment (score 0,
/// Low, no contributions) is returned instead.
pub fn assess(results: &[CheckResult]) -> Option<ThreatAssessment> {
    if !results.iter().any(|r| knowledge_base::is_scoring(r.kind)) {
        return None;
    }
    let mut session = ScanSession::new();
    for result in results {
        session.record(result);
    }
    Some(aggregate(&session))
}
