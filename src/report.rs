// src/report.rs
//
// Console rendering of scan reports: per-check findings followed by the
// weighted threat assessment. File logging is separate; everything here is
// user-facing output.

use colored::{ColoredString, Colorize};

use crate::core::models::{
    CheckOutcome, CheckPayload, CheckResult, ScanError, ScanReport, ThreatAssessment,
    ThreatCategory,
};

const BAR_LENGTH: usize = 50;

fn category_colored(text: &str, category: ThreatCategory) -> ColoredString {
    match category {
        ThreatCategory::Low => text.green(),
        ThreatCategory::Moderate => text.cyan(),
        ThreatCategory::Medium => text.yellow(),
        ThreatCategory::High => text.yellow().bold(),
        ThreatCategory::Critical => text.red().bold(),
    }
}

pub fn render_fetch_failure(target: &str, error: &ScanError) {
    eprintln!("{} {}: {}", "[ERROR]".red().bold(), target, error);
}

pub fn render_report(report: &ScanReport, quiet: bool) {
    println!();
    println!("{}", format!("Scan results for {}", report.target).bold());
    println!(
        "  final URL: {} (HTTP {})",
        report.final_url, report.status_code
    );

    if !quiet {
        for result in &report.results {
            render_result(result);
        }
    }

    if let Some(assessment) = &report.assessment {
        render_assessment(&report.target, assessment);
    }
}

fn render_result(result: &CheckResult) {
    match &result.outcome {
        CheckOutcome::Success(payload) => {
            println!("\n{}", format!("[{}]", result.kind).bold());
            for line in summary_lines(payload) {
                println!("  {}", line);
            }
        }
        CheckOutcome::Unavailable { .. } => {
            println!("\n{}", format!("[{}]", result.kind).bold());
            println!("  {}", result.outcome.to_string().yellow());
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

pub(crate) fn summary_lines(payload: &CheckPayload) -> Vec<String> {
    match payload {
        CheckPayload::Security(s) => vec![
            format!("HTTPS: {}", yes_no(s.is_https)),
            format!("HSTS: {}", yes_no(s.hsts)),
            format!("Content-Security-Policy: {}", yes_no(s.content_security_policy)),
            format!("X-Content-Type-Options: {}", yes_no(s.x_content_type_options)),
            format!("X-Frame-Options: {}", yes_no(s.x_frame_options)),
            format!("X-XSS-Protection: {}", yes_no(s.x_xss_protection)),
        ],
        CheckPayload::SecHeaders(s) => {
            let mut lines = vec![format!(
                "{} of {} recommended headers present",
                s.present.len(),
                s.present.len() + s.missing.len()
            )];
            if !s.missing.is_empty() {
                lines.push(format!("missing: {}", s.missing.join(", ")));
            }
            lines
        }
        CheckPayload::Csp(c) => {
            let mut lines = vec![format!("CSP enforced: {}", yes_no(c.has_csp))];
            if c.report_only {
                lines.push("policy served in report-only mode".to_string());
            }
            if c.unsafe_inline {
                lines.push("uses 'unsafe-inline'".to_string());
            }
            if c.unsafe_eval {
                lines.push("uses 'unsafe-eval'".to_string());
            }
            lines
        }
        CheckPayload::Cors(c) => {
            if !c.has_cors_headers {
                return vec!["no CORS headers".to_string()];
            }
            let mut lines = vec![format!(
                "allowed origins: {}",
                c.allowed_origins.as_deref().unwrap_or("-")
            )];
            if c.allows_any_origin {
                lines.push("allows any origin (*)".to_string());
            }
            if c.allows_credentials {
                lines.push("allows credentials".to_string());
            }
            lines
        }
        CheckPayload::Clickjacking(c) => match &c.protection_method {
            Some(method) => vec![format!("protected via {}", method)],
            None => vec!["no framing protection".to_string()],
        },
        CheckPayload::CookieSec(c) => {
            if c.cookies.is_empty() {
                return vec!["no cookies set".to_string()];
            }
            vec![
                format!("{} cookie(s) set", c.cookies.len()),
                format!("without Secure: {}", c.cookies_without_secure),
                format!("without HttpOnly: {}", c.cookies_without_httponly),
                format!("without SameSite: {}", c.cookies_without_samesite),
            ]
        }
        CheckPayload::ServerInfo(s) => {
            let mut lines = Vec::new();
            if let Some(server) = &s.server {
                lines.push(format!("Server: {}", server));
            }
            if let Some(powered_by) = &s.powered_by {
                lines.push(format!("X-Powered-By: {}", powered_by));
            }
            lines.extend(s.technology_hints.iter().cloned());
            if lines.is_empty() {
                lines.push("no server identification disclosed".to_string());
            }
            lines
        }
        CheckPayload::Caching(c) => vec![
            format!("Cache-Control: {}", c.cache_control.as_deref().unwrap_or("-")),
            format!("Expires: {}", c.expires.as_deref().unwrap_or("-")),
            format!("ETag: {}", yes_no(c.has_etag)),
        ],
        CheckPayload::HttpMethods(m) => {
            let mut lines = vec![format!(
                "supported methods: {}",
                join_or_dash(&m.supported_methods)
            )];
            if !m.risky_methods.is_empty() {
                lines.push(format!("risky methods enabled: {}", m.risky_methods.join(", ")));
            }
            lines
        }
        CheckPayload::Ssl(s) => vec![
            format!("subject: {}", s.subject),
            format!("issuer: {}", s.issuer),
            format!("valid: {}", yes_no(s.valid)),
            format!("expires in {} day(s)", s.days_until_expiry),
            format!("self-signed: {}", yes_no(s.self_signed)),
            format!("weak signature: {}", yes_no(s.weak_signature)),
        ],
        CheckPayload::Dns(d) => vec![
            format!("addresses: {}", join_or_dash(&d.addresses)),
            format!("MX: {}", join_or_dash(&d.mx)),
            format!("NS: {}", join_or_dash(&d.ns)),
            format!("TXT records: {}", d.txt.len()),
        ],
        CheckPayload::MixedContent(m) => {
            if m.has_mixed_content {
                let mut lines = vec![format!("{} mixed resource(s)", m.resources.len())];
                lines.extend(
                    m.resources
                        .iter()
                        .take(5)
                        .map(|r| format!("{}: {}", r.tag, r.url)),
                );
                lines
            } else {
                vec!["no mixed content".to_string()]
            }
        }
        CheckPayload::IframeSecurity(i) => vec![format!(
            "{} iframe(s), {} sandboxed, {} insecure",
            i.total_iframes,
            i.sandboxed_iframes,
            i.insecure_iframes.len()
        )],
        CheckPayload::Passwords(p) => {
            if p.total_password_forms == 0 {
                vec!["no password forms".to_string()]
            } else {
                vec![format!(
                    "{} password form(s): {} secure, {} insecure",
                    p.total_password_forms, p.secure_forms, p.insecure_forms
                )]
            }
        }
        CheckPayload::Vulns(v) => {
            if v.vulnerabilities.is_empty() {
                vec!["no findings".to_string()]
            } else {
                v.vulnerabilities
                    .iter()
                    .map(|f| format!("{}: {}", f.kind, f.description))
                    .collect()
            }
        }
        CheckPayload::Deserialize(d) => {
            if d.potentially_vulnerable {
                d.patterns
                    .iter()
                    .map(|p| format!("{} ({}x)", p.pattern, p.occurrences))
                    .collect()
            } else {
                vec!["no risky deserialization patterns".to_string()]
            }
        }
        CheckPayload::Leaks(l) => {
            let mut lines = vec![format!(
                "{} comment(s), {} email(s), {} IP(s) in page source",
                l.html_comments.len(),
                l.email_addresses.len(),
                l.ip_addresses.len()
            )];
            lines.extend(l.sensitive_items.iter().cloned());
            lines
        }
        CheckPayload::SqlLeak(s) => {
            if s.found {
                let mut lines = vec![format!("{} database error string(s)", s.potential_leaks.len())];
                lines.extend(s.potential_leaks.iter().take(5).cloned());
                lines
            } else {
                vec!["no database error text".to_string()]
            }
        }
        CheckPayload::FileUpload(f) => {
            if f.total_upload_forms == 0 {
                vec!["no file upload forms".to_string()]
            } else {
                f.forms
                    .iter()
                    .map(|form| {
                        format!(
                            "{} {} ({} file input(s), enctype {})",
                            form.method,
                            form.action,
                            form.file_input_names.len(),
                            if form.correct_enctype { "ok" } else { "wrong" }
                        )
                    })
                    .collect()
            }
        }
        CheckPayload::EmailProtection(e) => {
            let mut lines = vec![format!(
                "{} plain email(s), {} obfuscated",
                e.plain_emails.len(),
                e.obfuscated_emails.len()
            )];
            if e.using_protection {
                lines.push(format!("protection: {}", e.protection_methods.join(", ")));
            }
            lines
        }
    }
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn render_assessment(target: &str, assessment: &ThreatAssessment) {
    let score = assessment.overall_score;
    let category = assessment.category;

    let filled = (BAR_LENGTH as f64 * f64::from(score) / 100.0).round() as usize;
    let bar = format!(
        "{}{}",
        "\u{2588}".repeat(filled),
        "\u{2591}".repeat(BAR_LENGTH.saturating_sub(filled))
    );

    println!("\n{}", "=".repeat(70));
    println!("{}", format!("SECURITY THREAT ASSESSMENT: {}", target).bold());
    println!("{}", "=".repeat(70));
    println!(
        "{}",
        category_colored(
            &format!("Threat Score: {}/100 - {} Risk", score, category),
            category
        )
    );
    println!("{}", category_colored(&bar, category));

    let factors: Vec<_> = assessment
        .contributions
        .values()
        .filter(|c| c.score > 0)
        .collect();
    if !factors.is_empty() {
        println!("\nRisk Factors:");
        for contribution in factors {
            let line = format!(
                " \u{2022} {}: {} points - {}",
                contribution.kind, contribution.score, contribution.reason
            );
            println!(
                "{}",
                category_colored(&line, ThreatCategory::from_score(contribution.score))
            );
        }
    }
    println!("{}\n", "=".repeat(70));
}
