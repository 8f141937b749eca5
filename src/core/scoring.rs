// src/core/scoring.rs
//
// Converts check payloads into 0-100 risk contributions and combines them
// into one weighted assessment. This module performs no I/O.

use tracing::debug;

use crate::core::knowledge_base;
use crate::core::models::{
    CheckOutcome, CheckPayload, CheckResult, ScoreContribution, ThreatAssessment, ThreatCategory,
};

// Per-finding point values. Findings are additive within a check and the
// per-check total saturates at 100.
const NO_HTTPS: u32 = 30;
const NO_HSTS: u32 = 10;
const NO_CSP_HEADER: u32 = 10;
const NO_X_CONTENT_TYPE_OPTIONS: u32 = 5;
const NO_X_FRAME_OPTIONS: u32 = 5;
const NO_X_XSS_PROTECTION: u32 = 5;
const MIXED_CONTENT_PRESENT: u32 = 40;
const PER_COOKIE_WITHOUT_SECURE: u32 = 10;
const PER_COOKIE_WITHOUT_HTTPONLY: u32 = 8;
const PER_COOKIE_WITHOUT_SAMESITE: u32 = 5;
const CLICKJACKING_UNPROTECTED: u32 = 25;
const CSP_MISSING: u32 = 20;
const CSP_UNSAFE_INLINE: u32 = 10;
const CSP_UNSAFE_EVAL: u32 = 10;
const PER_INSECURE_IFRAME: u32 = 15;
const SSL_INVALID: u32 = 40;
const SSL_EXPIRED: u32 = 40;
const SSL_SELF_SIGNED: u32 = 20;
const SSL_WEAK_SIGNATURE: u32 = 15;
const PER_VULNERABILITY: u32 = 20;
const PER_INSECURE_PASSWORD_FORM: u32 = 30;
const DESERIALIZE_VULNERABLE: u32 = 35;
const PER_LEAKED_ITEM: u32 = 15;
const PER_MISSING_SEC_HEADER: u32 = 5;

const MAX_SCORE: u32 = 100;

/// Maps one check payload to an integer risk score in [0,100].
///
/// Informational payload variants (CORS, DNS, server info, caching) score 0:
/// a kind outside the scoring table never affects the assessment.
pub fn score_check(payload: &CheckPayload) -> u8 {
    let raw: u32 = match payload {
        CheckPayload::Security(s) => {
            let mut score = 0;
            if !s.is_https {
                score += NO_HTTPS;
            }
            if !s.hsts {
                score += NO_HSTS;
            }
            if !s.content_security_policy {
                score += NO_CSP_HEADER;
            }
            if !s.x_content_type_options {
                score += NO_X_CONTENT_TYPE_OPTIONS;
            }
            if !s.x_frame_options {
                score += NO_X_FRAME_OPTIONS;
            }
            if !s.x_xss_protection {
                score += NO_X_XSS_PROTECTION;
            }
            score
        }
        CheckPayload::MixedContent(m) => {
            if m.has_mixed_content {
                MIXED_CONTENT_PRESENT
            } else {
                0
            }
        }
        CheckPayload::CookieSec(c) => {
            c.cookies_without_secure * PER_COOKIE_WITHOUT_SECURE
                + c.cookies_without_httponly * PER_COOKIE_WITHOUT_HTTPONLY
                + c.cookies_without_samesite * PER_COOKIE_WITHOUT_SAMESITE
        }
        CheckPayload::Clickjacking(c) => {
            if c.protected {
                0
            } else {
                CLICKJACKING_UNPROTECTED
            }
        }
        CheckPayload::Csp(c) => {
            let mut score = 0;
            if !c.has_csp {
                score += CSP_MISSING;
            }
            if c.unsafe_inline {
                score += CSP_UNSAFE_INLINE;
            }
            if c.unsafe_eval {
                score += CSP_UNSAFE_EVAL;
            }
            score
        }
        CheckPayload::IframeSecurity(i) => {
            i.insecure_iframes.len() as u32 * PER_INSECURE_IFRAME
        }
        CheckPayload::Ssl(s) => {
            let mut score = 0;
            if !s.valid {
                score += SSL_INVALID;
            }
            if s.expired {
                score += SSL_EXPIRED;
            }
            if s.self_signed {
                score += SSL_SELF_SIGNED;
            }
            if s.weak_signature {
                score += SSL_WEAK_SIGNATURE;
            }
            score
        }
        CheckPayload::Vulns(v) => v.vulnerabilities.len() as u32 * PER_VULNERABILITY,
        CheckPayload::Passwords(p) => p.insecure_forms * PER_INSECURE_PASSWORD_FORM,
        CheckPayload::Deserialize(d) => {
            if d.potentially_vulnerable {
                DESERIALIZE_VULNERABLE
            } else {
                0
            }
        }
        CheckPayload::Leaks(l) => l.sensitive_items.len() as u32 * PER_LEAKED_ITEM,
        CheckPayload::SecHeaders(s) => s.missing.len() as u32 * PER_MISSING_SEC_HEADER,
        // Informational kinds never contribute.
        CheckPayload::Cors(_)
        | CheckPayload::ServerInfo(_)
        | CheckPayload::Caching(_)
        | CheckPayload::HttpMethods(_)
        | CheckPayload::Dns(_)
        | CheckPayload::SqlLeak(_)
        | CheckPayload::FileUpload(_)
        | CheckPayload::EmailProtection(_) => 0,
    };

    raw.min(MAX_SCORE) as u8
}

/// Per-URL accumulator of score contributions, keyed by check kind.
///
/// Owned exclusively by the orchestrator for the duration of one URL's scan;
/// batch processing creates one session per URL and never shares them.
#[derive(Debug, Default)]
pub struct ScanSession {
    contributions: std::collections::BTreeMap<crate::core::models::CheckKind, ScoreContribution>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one check result into the session. Only successful results of
    /// scoring-eligible kinds produce a contribution; everything else is a
    /// no-op. A zero score is still recorded, since it pulls the weighted
    /// mean down exactly as the scoring model intends.
    pub fn record(&mut self, result: &CheckResult) {
        let payload = match &result.outcome {
            CheckOutcome::Success(payload) => payload,
            CheckOutcome::Unavailable { .. } => return,
        };
        let Some(profile) = knowledge_base::profile(result.kind) else {
            return;
        };
        let score = score_check(payload);
        debug!(kind = %result.kind, score, "Recorded score contribution.");
        self.contributions.insert(
            result.kind,
            ScoreContribution {
                kind: result.kind,
                score,
                reason: profile.reason.to_string(),
            },
        );
    }

    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }
}

/// Combines all contributions of one session into a threat assessment using
/// a weighted arithmetic mean. The sum is commutative, so check execution
/// order never changes the result. An empty session yields the defined
/// terminal result: score 0, category Low, no contributions.
pub fn aggregate(session: &ScanSession) -> ThreatAssessment {
    if session.contributions.is_empty() {
        return ThreatAssessment::empty();
    }

    let mut weighted_total = 0.0_f64;
    let mut total_weight = 0.0_f64;
    for contribution in session.contributions.values() {
        let weight = knowledge_base::weight_for(contribution.kind);
        weighted_total += f64::from(contribution.score) * weight;
        total_weight += weight;
    }

    if total_weight == 0.0 {
        return ThreatAssessment::empty();
    }

    let overall_score = (weighted_total / total_weight).round().clamp(0.0, 100.0) as u8;
    ThreatAssessment {
        overall_score,
        category: ThreatCategory::from_score(overall_score),
        contributions: session.contributions.clone(),
    }
}
