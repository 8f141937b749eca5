// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use strum::{Display, EnumIter, EnumString};

// --- Check Identity ---

/// Identifies one independent check. The declaration order here is the fixed
/// registration order the orchestrator executes checks in, so reordering
/// variants changes the run order (but never the aggregate score, which is
/// order-independent).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CheckKind {
    Security,
    SecHeaders,
    Csp,
    Cors,
    Clickjacking,
    CookieSec,
    ServerInfo,
    Caching,
    HttpMethods,
    Ssl,
    Dns,
    MixedContent,
    IframeSecurity,
    Passwords,
    Vulns,
    Deserialize,
    Leaks,
    SqlLeak,
    FileUpload,
    EmailProtection,
}

// --- Severity of individual findings ---

/// Severity of a single vulnerability finding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

// --- Per-check Payloads ---

/// HTTPS transport and security-header booleans for the page response.
/// Absent headers are `false`, never missing fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityPayload {
    pub is_https: bool,
    pub hsts: bool,
    pub content_security_policy: bool,
    pub x_content_type_options: bool,
    pub x_frame_options: bool,
    pub x_xss_protection: bool,
}

/// Presence/absence inventory of the broader set of security headers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecHeadersPayload {
    pub present: BTreeMap<String, String>,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CspPayload {
    pub has_csp: bool,
    pub policy: Option<String>,
    pub unsafe_inline: bool,
    pub unsafe_eval: bool,
    pub report_only: bool,
}

/// CORS policy summary. Informational only, never scored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsPayload {
    pub has_cors_headers: bool,
    pub allows_any_origin: bool,
    pub allows_credentials: bool,
    pub allowed_origins: Option<String>,
    pub allowed_methods: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClickjackingPayload {
    pub protected: bool,
    pub protection_method: Option<String>,
    pub x_frame_options: Option<String>,
    pub csp_frame_ancestors: Option<String>,
}

/// Security attributes of one cookie set by the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieFlags {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CookieSecPayload {
    pub cookies: Vec<CookieFlags>,
    pub cookies_without_secure: u32,
    pub cookies_without_httponly: u32,
    pub cookies_without_samesite: u32,
}

/// Server identification leaked through response headers. Informational.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerInfoPayload {
    pub server: Option<String>,
    pub powered_by: Option<String>,
    pub technology_hints: Vec<String>,
}

/// Caching directives on the page response. Informational.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CachingPayload {
    pub cache_control: Option<String>,
    pub pragma: Option<String>,
    pub expires: Option<String>,
    pub has_etag: bool,
}

/// Which HTTP methods the server answers for the target URL. Informational.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpMethodsPayload {
    pub supported_methods: Vec<String>,
    /// Supported methods that enable modification or debugging (PUT, DELETE,
    /// TRACE).
    pub risky_methods: Vec<String>,
}

/// Certificate facts gathered from the TLS probe on port 443.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SslPayload {
    pub valid: bool,
    pub expired: bool,
    pub self_signed: bool,
    pub weak_signature: bool,
    pub subject: String,
    pub issuer: String,
    pub signature_algorithm: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub days_until_expiry: i64,
}

/// Basic record inventory for the target domain. Informational.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DnsPayload {
    pub addresses: Vec<String>,
    pub mx: Vec<String>,
    pub ns: Vec<String>,
    pub txt: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixedResource {
    pub tag: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MixedContentPayload {
    pub is_https_page: bool,
    pub has_mixed_content: bool,
    pub resources: Vec<MixedResource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsecureIframe {
    pub src: String,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IframeSecurityPayload {
    pub total_iframes: usize,
    pub sandboxed_iframes: usize,
    pub insecure_iframes: Vec<InsecureIframe>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordForm {
    pub action: String,
    pub method: String,
    pub submits_over_https: bool,
    pub has_autocomplete_off: bool,
    pub has_csrf_token: bool,
    pub has_captcha: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PasswordsPayload {
    pub total_password_forms: u32,
    pub secure_forms: u32,
    pub insecure_forms: u32,
    pub forms: Vec<PasswordForm>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnFinding {
    pub kind: String,
    pub description: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VulnsPayload {
    pub vulnerabilities: Vec<VulnFinding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskyPattern {
    pub pattern: String,
    pub occurrences: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeserializePayload {
    pub potentially_vulnerable: bool,
    pub patterns: Vec<RiskyPattern>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaksPayload {
    pub html_comments: Vec<String>,
    pub server_header: Option<String>,
    pub email_addresses: Vec<String>,
    pub ip_addresses: Vec<String>,
    pub potential_credentials: bool,
    /// High-signal leaks that enter scoring, one entry per leaked item.
    pub sensitive_items: Vec<String>,
}

/// Database error text surfacing in the rendered page. Informational.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqlLeakPayload {
    pub found: bool,
    pub potential_leaks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadForm {
    pub action: String,
    pub method: String,
    pub enctype: Option<String>,
    pub file_input_names: Vec<String>,
    pub correct_enctype: bool,
}

/// Forms accepting file uploads. Informational.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileUploadPayload {
    pub total_upload_forms: u32,
    pub forms: Vec<UploadForm>,
}

/// How the page exposes or shields email addresses. Informational.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailProtectionPayload {
    pub plain_emails: Vec<String>,
    pub obfuscated_emails: Vec<String>,
    pub using_protection: bool,
    pub protection_methods: Vec<String>,
}

// --- Tagged result union ---

/// One payload variant per `CheckKind`, so the scorer's field lookups are
/// statically checked instead of guarded at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckPayload {
    Security(SecurityPayload),
    SecHeaders(SecHeadersPayload),
    Csp(CspPayload),
    Cors(CorsPayload),
    Clickjacking(ClickjackingPayload),
    CookieSec(CookieSecPayload),
    ServerInfo(ServerInfoPayload),
    Caching(CachingPayload),
    HttpMethods(HttpMethodsPayload),
    Ssl(SslPayload),
    Dns(DnsPayload),
    MixedContent(MixedContentPayload),
    IframeSecurity(IframeSecurityPayload),
    Passwords(PasswordsPayload),
    Vulns(VulnsPayload),
    Deserialize(DeserializePayload),
    Leaks(LeaksPayload),
    SqlLeak(SqlLeakPayload),
    FileUpload(FileUploadPayload),
    EmailProtection(EmailProtectionPayload),
}

impl CheckPayload {
    pub fn kind(&self) -> CheckKind {
        match self {
            CheckPayload::Security(_) => CheckKind::Security,
            CheckPayload::SecHeaders(_) => CheckKind::SecHeaders,
            CheckPayload::Csp(_) => CheckKind::Csp,
            CheckPayload::Cors(_) => CheckKind::Cors,
            CheckPayload::Clickjacking(_) => CheckKind::Clickjacking,
            CheckPayload::CookieSec(_) => CheckKind::CookieSec,
            CheckPayload::ServerInfo(_) => CheckKind::ServerInfo,
            CheckPayload::Caching(_) => CheckKind::Caching,
            CheckPayload::HttpMethods(_) => CheckKind::HttpMethods,
            CheckPayload::Ssl(_) => CheckKind::Ssl,
            CheckPayload::Dns(_) => CheckKind::Dns,
            CheckPayload::MixedContent(_) => CheckKind::MixedContent,
            CheckPayload::IframeSecurity(_) => CheckKind::IframeSecurity,
            CheckPayload::Passwords(_) => CheckKind::Passwords,
            CheckPayload::Vulns(_) => CheckKind::Vulns,
            CheckPayload::Deserialize(_) => CheckKind::Deserialize,
            CheckPayload::Leaks(_) => CheckKind::Leaks,
            CheckPayload::SqlLeak(_) => CheckKind::SqlLeak,
            CheckPayload::FileUpload(_) => CheckKind::FileUpload,
            CheckPayload::EmailProtection(_) => CheckKind::EmailProtection,
        }
    }
}

/// A check either produced a fully populated payload or declares itself
/// unavailable with a reason. Checks never propagate errors past this type,
/// which is what lets the orchestrator run every check without per-call
/// error handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    Success(CheckPayload),
    Unavailable { reason: String },
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Success(_) => write!(f, "ok"),
            CheckOutcome::Unavailable { reason } => write!(f, "unavailable: {}", reason),
        }
    }
}

/// The output of one check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub kind: CheckKind,
    pub outcome: CheckOutcome,
}

impl CheckResult {
    pub fn success(payload: CheckPayload) -> Self {
        Self {
            kind: payload.kind(),
            outcome: CheckOutcome::Success(payload),
        }
    }

    pub fn unavailable(kind: CheckKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            outcome: CheckOutcome::Unavailable {
                reason: reason.into(),
            },
        }
    }

    pub fn payload(&self) -> Option<&CheckPayload> {
        match &self.outcome {
            CheckOutcome::Success(payload) => Some(payload),
            CheckOutcome::Unavailable { .. } => None,
        }
    }
}

// --- Threat Assessment ---

/// A scored, weighted input to the aggregator from one scoring-eligible check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreContribution {
    pub kind: CheckKind,
    pub score: u8,
    pub reason: String,
}

/// Human-readable label for a 0-100 risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ThreatCategory {
    Low,
    Moderate,
    Medium,
    High,
    Critical,
}

impl ThreatCategory {
    /// Maps a score onto its category. The intervals are contiguous and
    /// half-open with inclusive lower bounds, so every score in [0,100]
    /// lands in exactly one category.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=19 => ThreatCategory::Low,
            20..=39 => ThreatCategory::Moderate,
            40..=59 => ThreatCategory::Medium,
            60..=79 => ThreatCategory::High,
            _ => ThreatCategory::Critical,
        }
    }
}

/// The final weighted risk assessment for one target URL. Recomputed per
/// scan, consumed by presentation/export, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatAssessment {
    pub overall_score: u8,
    pub category: ThreatCategory,
    pub contributions: BTreeMap<CheckKind, ScoreContribution>,
}

impl ThreatAssessment {
    pub fn empty() -> Self {
        Self {
            overall_score: 0,
            category: ThreatCategory::Low,
            contributions: BTreeMap::new(),
        }
    }
}

// --- Scan Report ---

/// Everything learned about one target URL: fetch metadata, every check
/// result in run order, and the threat assessment when any scoring-eligible
/// check ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub target: String,
    pub final_url: String,
    pub status_code: u16,
    pub scanned_at: DateTime<Utc>,
    pub results: Vec<CheckResult>,
    pub assessment: Option<ThreatAssessment>,
}

impl ScanReport {
    pub fn result_for(&self, kind: CheckKind) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.kind == kind)
    }
}

// --- Errors ---

/// Fetch failure is the only error that surfaces from a scan; everything
/// else degrades into `Unavailable` check outcomes.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("invalid target URL '{url}': {source}")]
    InvalidTarget {
        url: String,
        source: url::ParseError,
    },
    #[error("could not connect to {url}: {source}")]
    Fetch {
        url: String,
        source: reqwest::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn category_mapping_partitions_full_range() {
        for score in 0..=100u8 {
            let category = ThreatCategory::from_score(score);
            let expected = match score {
                0..=19 => ThreatCategory::Low,
                20..=39 => ThreatCategory::Moderate,
                40..=59 => ThreatCategory::Medium,
                60..=79 => ThreatCategory::High,
                _ => ThreatCategory::Critical,
            };
            assert_eq!(category, expected, "score {}", score);
        }
    }

    #[test]
    fn category_boundaries_are_inclusive_lower() {
        assert_eq!(ThreatCategory::from_score(0), ThreatCategory::Low);
        assert_eq!(ThreatCategory::from_score(19), ThreatCategory::Low);
        assert_eq!(ThreatCategory::from_score(20), ThreatCategory::Moderate);
        assert_eq!(ThreatCategory::from_score(40), ThreatCategory::Medium);
        assert_eq!(ThreatCategory::from_score(60), ThreatCategory::High);
        assert_eq!(ThreatCategory::from_score(79), ThreatCategory::High);
        assert_eq!(ThreatCategory::from_score(80), ThreatCategory::Critical);
        assert_eq!(ThreatCategory::from_score(100), ThreatCategory::Critical);
    }

    #[test]
    fn check_kind_round_trips_through_snake_case() {
        for kind in CheckKind::iter() {
            let name = kind.to_string();
            let parsed: CheckKind = name.parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert_eq!(
            "mixed_content".parse::<CheckKind>().unwrap(),
            CheckKind::MixedContent
        );
        assert_eq!(
            "email_protection".parse::<CheckKind>().unwrap(),
            CheckKind::EmailProtection
        );
    }

    #[test]
    fn outcome_display_carries_the_unavailable_reason() {
        let ok = CheckOutcome::Success(CheckPayload::Csp(CspPayload::default()));
        assert_eq!(ok.to_string(), "ok");

        let missing = CheckOutcome::Unavailable {
            reason: "handshake failed".to_string(),
        };
        assert_eq!(missing.to_string(), "unavailable: handshake failed");
    }

    #[test]
    fn success_result_carries_kind_of_payload() {
        let result = CheckResult::success(CheckPayload::Csp(CspPayload::default()));
        assert_eq!(result.kind, CheckKind::Csp);
        assert!(result.payload().is_some());

        let missing = CheckResult::unavailable(CheckKind::Ssl, "timed out");
        assert_eq!(missing.kind, CheckKind::Ssl);
        assert!(missing.payload().is_none());
    }
}
