//! Static, read-only table describing the twelve scoring-eligible check
//! kinds: the weight each carries in the aggregate assessment, the reason
//! string attached to its contribution, and a short explanation for reports.
//! Keeping this data-driven makes the scoring model auditable in one place.
//!
//! The weights and the per-finding point values in `scoring` are hand-tuned
//! constants that define the scoring model, not placeholders to re-derive.

use crate::core::models::CheckKind;

/// Everything the aggregator and presentation layers need to know about one
/// scoring-eligible check kind.
pub struct KindProfile {
    pub kind: CheckKind,
    /// Relative weight in the overall weighted mean. Kinds not listed here
    /// default to 1.0.
    pub weight: f64,
    /// Human-readable reason attached to this kind's score contribution.
    pub reason: &'static str,
    /// Short description of what the check probes, for report output.
    pub description: &'static str,
}

/// The scoring-eligible kinds, with their aggregation weights. Any kind
/// absent from this table never contributes to the overall score.
static PROFILES: &[KindProfile] = &[
    KindProfile {
        kind: CheckKind::Security,
        weight: 1.2,
        reason: "HTTPS and security header issues",
        description: "HTTPS usage and the presence of core browser security headers (HSTS, CSP, X-Content-Type-Options, X-Frame-Options, X-XSS-Protection).",
    },
    KindProfile {
        kind: CheckKind::Ssl,
        weight: 1.5,
        reason: "SSL/TLS certificate issues",
        description: "Validity window, self-signed status and signature strength of the certificate served on port 443.",
    },
    KindProfile {
        kind: CheckKind::Vulns,
        weight: 1.5,
        reason: "Vulnerability issues",
        description: "Passive heuristics: reflected parameters, forms without CSRF tokens, open redirect parameters, protocol-relative URLs and outdated JavaScript libraries.",
    },
    KindProfile {
        kind: CheckKind::Csp,
        weight: 1.2,
        reason: "Content Security Policy issues",
        description: "Presence of a Content-Security-Policy and use of the unsafe-inline/unsafe-eval directives.",
    },
    KindProfile {
        kind: CheckKind::Clickjacking,
        weight: 1.0,
        reason: "Clickjacking protection issues",
        description: "Framing protection via X-Frame-Options or a CSP frame-ancestors directive.",
    },
    KindProfile {
        kind: CheckKind::MixedContent,
        weight: 1.2,
        reason: "Mixed content issues",
        description: "Plain-HTTP resources embedded in an HTTPS page.",
    },
    KindProfile {
        kind: CheckKind::Passwords,
        weight: 1.3,
        reason: "Password form security issues",
        description: "Password forms that do not submit via POST over HTTPS.",
    },
    KindProfile {
        kind: CheckKind::IframeSecurity,
        weight: 0.8,
        reason: "Iframe security issues",
        description: "Iframes without a sandbox attribute or loaded over plain HTTP.",
    },
    KindProfile {
        kind: CheckKind::CookieSec,
        weight: 1.0,
        reason: "Cookie security issues",
        description: "Cookies set without the Secure, HttpOnly or SameSite attributes.",
    },
    KindProfile {
        kind: CheckKind::Deserialize,
        weight: 1.0,
        reason: "Insecure deserialization issues",
        description: "JavaScript patterns that deserialize untrusted data into executable sinks.",
    },
    KindProfile {
        kind: CheckKind::Leaks,
        weight: 1.1,
        reason: "Information leakage issues",
        description: "Credentials, internal addresses and version banners exposed in the page source or headers.",
    },
    KindProfile {
        kind: CheckKind::SecHeaders,
        weight: 0.9,
        reason: "Missing security headers",
        description: "Inventory of ten recommended security headers and which of them are absent.",
    },
];

/// Looks up the profile for a check kind.
///
/// Returns `None` for informational-only kinds, which is exactly the set of
/// kinds the aggregator ignores.
pub fn profile(kind: CheckKind) -> Option<&'static KindProfile> {
    PROFILES.iter().find(|p| p.kind == kind)
}

/// Whether a kind participates in threat scoring at all.
pub fn is_scoring(kind: CheckKind) -> bool {
    profile(kind).is_some()
}

/// Aggregation weight for a kind, defaulting to 1.0 when unlisted.
pub fn weight_for(kind: CheckKind) -> f64 {
    profile(kind).map(|p| p.weight).unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn exactly_twelve_kinds_are_scoring_eligible() {
        let scoring: Vec<_> = CheckKind::iter().filter(|k| is_scoring(*k)).collect();
        assert_eq!(scoring.len(), 12);
        assert!(!is_scoring(CheckKind::Cors));
        assert!(!is_scoring(CheckKind::Dns));
        assert!(!is_scoring(CheckKind::ServerInfo));
        assert!(!is_scoring(CheckKind::Caching));
        assert!(!is_scoring(CheckKind::HttpMethods));
        assert!(!is_scoring(CheckKind::SqlLeak));
        assert!(!is_scoring(CheckKind::FileUpload));
        assert!(!is_scoring(CheckKind::EmailProtection));
    }

    #[test]
    fn weights_match_the_tuned_table() {
        assert_eq!(weight_for(CheckKind::Ssl), 1.5);
        assert_eq!(weight_for(CheckKind::Vulns), 1.5);
        assert_eq!(weight_for(CheckKind::Passwords), 1.3);
        assert_eq!(weight_for(CheckKind::Security), 1.2);
        assert_eq!(weight_for(CheckKind::IframeSecurity), 0.8);
        assert_eq!(weight_for(CheckKind::SecHeaders), 0.9);
        // Unlisted kinds fall back to the neutral weight.
        assert_eq!(weight_for(CheckKind::Cors), 1.0);
    }

    #[test]
    fn every_profile_has_a_reason_and_positive_weight() {
        for kind in CheckKind::iter() {
            if let Some(p) = profile(kind) {
                assert!(p.weight > 0.0);
                assert!(!p.reason.is_empty());
                assert!(!p.description.is_empty());
            }
        }
    }
}
