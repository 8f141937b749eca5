// src/core/scanner/content_scanner.rs
//
// Checks that analyze the parsed HTML document (and, for leaks, the raw body
// and response headers). All of them are synchronous pure functions over
// read-only input; failure modes are expressed as conservative "nothing
// found" payloads rather than errors.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::HeaderMap;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use tracing::debug;
use url::Url;

use crate::core::models::{
    CheckPayload, CheckResult, DeserializePayload, EmailProtectionPayload, FileUploadPayload,
    IframeSecurityPayload, InsecureIframe, LeaksPayload, MixedContentPayload, MixedResource,
    PasswordForm, PasswordsPayload, RiskyPattern, Severity, SqlLeakPayload, UploadForm,
    VulnFinding, VulnsPayload,
};

// Tag/attribute pairs that can pull in subresources over plain HTTP.
const RESOURCE_ATTRS: &[(&str, &str)] = &[
    ("script", "src"),
    ("link", "href"),
    ("img", "src"),
    ("iframe", "src"),
    ("audio", "src"),
    ("video", "src"),
    ("source", "src"),
    ("form", "action"),
];

// Query parameter names commonly used for redirect targets.
const REDIRECT_PARAMS: &[&str] = &[
    "redirect", "url", "next", "return", "returnUrl", "returnTo", "redirect_uri", "redir",
];

static STYLE_HTTP_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"url\(['"]?(http://[^'")\s]+)"#).unwrap());

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());

static IP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").unwrap());

static CREDENTIAL_RES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r#"(?i)password\s*=\s*['"][^'"]+['"]"#, "password assignment"),
        (r#"(?i)passwd\s*=\s*['"][^'"]+['"]"#, "passwd assignment"),
        (r#"(?i)pwd\s*=\s*['"][^'"]+['"]"#, "pwd assignment"),
        (r#"(?i)apikey\s*=\s*['"][^'"]+['"]"#, "apikey assignment"),
        (r#"(?i)api_key\s*=\s*['"][^'"]+['"]"#, "api_key assignment"),
        (r#"(?i)token\s*=\s*['"][^'"]+['"]"#, "token assignment"),
    ]
    .into_iter()
    .map(|(pattern, label)| (Regex::new(pattern).unwrap(), label))
    .collect()
});

// Risky client-side deserialization sinks.
static DESERIALIZE_RES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (
            r"eval\s*\(\s*(?:JSON\.parse|atob)\s*\(",
            "eval() with JSON.parse or atob",
        ),
        (
            r"document\.write\s*\(\s*(?:JSON\.parse|atob)\s*\(",
            "document.write with parsed data",
        ),
        (
            r"innerHTML\s*=\s*(?:JSON\.parse|atob)\s*\(",
            "innerHTML assignment with parsed data",
        ),
        (
            r"JSON\.parse\s*\(\s*localStorage\.getItem",
            "JSON.parse with localStorage data",
        ),
        (
            r"JSON\.parse\s*\(\s*sessionStorage\.getItem",
            "JSON.parse with sessionStorage data",
        ),
        (r"unserialize\s*\(", "PHP-style unserialize function"),
        (r"deserialize\s*\(", "custom deserialize function"),
        (r"fromJSON\s*\(", "custom fromJSON function"),
    ]
    .into_iter()
    .map(|(pattern, label)| (Regex::new(pattern).unwrap(), label))
    .collect()
});

// Error strings the common database engines leak into rendered pages.
static SQL_ERROR_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"SQL syntax.*?MySQL",
        r"Warning.*?mysql_",
        r"valid MySQL result",
        r"MySqlClient\.",
        r"ORA-[0-9]{5}",
        r"Oracle error",
        r"SQL Server.*?Error",
        r"Microsoft SQL Server",
        r"PostgreSQL.*?ERROR",
        r"Driver.*? SQL[-_ ]*Server",
        r"ODBC SQL Server Driver",
        r"SQLite/JDBCDriver",
        r"SQLException",
        r"Syntax error.*?in query expression",
        r"DB2 SQL error",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

static ENTITY_ENCODED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#[0-9]+;&#[0-9]+;&#[0-9]+;").unwrap());

// Known-outdated JavaScript library fingerprints in script src attributes.
static OUTDATED_LIB_RES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)jquery.+?[0-2]\.[0-9]+\.[0-9]+", "jQuery < 3.0.0"),
        (r"(?i)bootstrap.+?[0-3]\.[0-9]+\.[0-9]+", "Bootstrap < 4.0.0"),
        (r"(?i)angular.+?1\.[0-6]\.[0-9]+", "AngularJS < 1.7.0"),
    ]
    .into_iter()
    .map(|(pattern, label)| (Regex::new(pattern).unwrap(), label))
    .collect()
});

fn select_all<'a>(doc: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => doc.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

// --- mixed_content ---

/// Flags plain-HTTP subresources on an HTTPS page. HTTP pages trivially have
/// no mixed content and return an empty payload.
pub fn run_mixed_content_check(doc: &Html, page_url: &Url) -> CheckResult {
    let mut payload = MixedContentPayload {
        is_https_page: page_url.scheme() == "https",
        ..Default::default()
    };

    if !payload.is_https_page {
        return CheckResult::success(CheckPayload::MixedContent(payload));
    }

    for (tag, attr) in RESOURCE_ATTRS {
        for element in select_all(doc, &format!("{}[{}]", tag, attr)) {
            if let Some(value) = element.value().attr(attr) {
                if value.starts_with("http://") {
                    payload.resources.push(MixedResource {
                        tag: tag.to_string(),
                        url: value.to_string(),
                    });
                }
            }
        }
    }

    // Inline <style> blocks and style attributes can also reference HTTP URLs.
    for element in select_all(doc, "style") {
        let css: String = element.text().collect();
        for caps in STYLE_HTTP_URL_RE.captures_iter(&css) {
            payload.resources.push(MixedResource {
                tag: "style".to_string(),
                url: caps[1].to_string(),
            });
        }
    }
    for element in select_all(doc, "[style]") {
        if let Some(style) = element.value().attr("style") {
            for caps in STYLE_HTTP_URL_RE.captures_iter(style) {
                payload.resources.push(MixedResource {
                    tag: "inline style".to_string(),
                    url: caps[1].to_string(),
                });
            }
        }
    }

    payload.has_mixed_content = !payload.resources.is_empty();
    debug!(resources = payload.resources.len(), "Mixed content check done.");
    CheckResult::success(CheckPayload::MixedContent(payload))
}

// --- iframe_security ---

pub fn run_iframe_check(doc: &Html) -> CheckResult {
    let mut payload = IframeSecurityPayload::default();

    for iframe in select_all(doc, "iframe") {
        payload.total_iframes += 1;
        let src = iframe.value().attr("src").unwrap_or_default();
        let has_sandbox = iframe.value().attr("sandbox").is_some();
        let uses_https = src.starts_with("https://");

        if has_sandbox {
            payload.sandboxed_iframes += 1;
        }

        let mut issues = Vec::new();
        if !has_sandbox {
            issues.push("No sandbox attribute".to_string());
        }
        // Relative srcs inherit the page scheme and are not flagged.
        if !uses_https && !src.is_empty() && !src.starts_with('/') {
            issues.push("Not using HTTPS".to_string());
        }
        if !issues.is_empty() {
            payload.insecure_iframes.push(InsecureIframe {
                src: src.to_string(),
                issues,
            });
        }
    }

    CheckResult::success(CheckPayload::IframeSecurity(payload))
}

// --- passwords ---

fn form_has_csrf_token(form: ElementRef<'_>) -> bool {
    select_all_in(form, "input[type='hidden']").iter().any(|input| {
        input
            .value()
            .attr("name")
            .map(|name| {
                let name = name.to_lowercase();
                name.contains("csrf") || name.contains("token")
            })
            .unwrap_or(false)
    })
}

fn select_all_in<'a>(element: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => element.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Analyzes forms containing password fields. A form only counts as secure
/// when it submits via POST to an HTTPS (or same-scheme relative) action.
pub fn run_password_forms_check(doc: &Html) -> CheckResult {
    let mut payload = PasswordsPayload::default();

    for form in select_all(doc, "form") {
        let password_inputs = select_all_in(form, "input[type='password']");
        if password_inputs.is_empty() {
            continue;
        }

        let action = form.value().attr("action").unwrap_or_default().to_string();
        let method = form
            .value()
            .attr("method")
            .unwrap_or("GET")
            .to_uppercase();
        let submits_over_https =
            action.starts_with("https://") || (!action.starts_with("http://") && !action.starts_with("//"));
        let has_autocomplete_off = password_inputs.iter().any(|input| {
            input
                .value()
                .attr("autocomplete")
                .map(|v| v.eq_ignore_ascii_case("off"))
                .unwrap_or(false)
        });
        let has_captcha = form.html().to_lowercase().contains("captcha");

        let form_data = PasswordForm {
            submits_over_https,
            has_autocomplete_off,
            has_csrf_token: form_has_csrf_token(form),
            has_captcha,
            action,
            method,
        };

        if form_data.method == "POST" && form_data.submits_over_https {
            payload.secure_forms += 1;
        } else {
            payload.insecure_forms += 1;
        }
        payload.total_password_forms += 1;
        payload.forms.push(form_data);
    }

    CheckResult::success(CheckPayload::Passwords(payload))
}

// --- vulns ---

/// Passive vulnerability heuristics. Every positive is "potential": the
/// check sends no probe requests of its own.
pub fn run_vulns_check(doc: &Html, body: &str, page_url: &Url) -> CheckResult {
    let mut vulnerabilities = Vec::new();

    // Reflected query parameters: a parameter value echoed verbatim in the
    // page is a classic XSS entry point.
    for (param, value) in page_url.query_pairs() {
        if !value.is_empty() && body.contains(value.as_ref()) {
            vulnerabilities.push(VulnFinding {
                kind: "Potential Reflected XSS".to_string(),
                description: format!(
                    "Parameter '{}' with value '{}' found in page response",
                    param, value
                ),
                severity: Severity::Warning,
            });
        }
    }

    // POST forms without a recognizable CSRF token.
    for form in select_all(doc, "form") {
        let is_post = form
            .value()
            .attr("method")
            .map(|m| m.eq_ignore_ascii_case("post"))
            .unwrap_or(false);
        if is_post && !form_has_csrf_token(form) {
            let action = form.value().attr("action").unwrap_or("[no action]");
            vulnerabilities.push(VulnFinding {
                kind: "Potential CSRF Vulnerability".to_string(),
                description: format!("Form with action '{}' lacks CSRF protection", action),
                severity: Severity::Warning,
            });
        }
    }

    // Links carrying open-redirect style parameters.
    for link in select_all(doc, "a[href]") {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some((_, query)) = href.split_once('?') else {
            continue;
        };
        let params: BTreeSet<String> = url::form_urlencoded::parse(query.as_bytes())
            .map(|(key, _)| key.into_owned())
            .collect();
        if let Some(param) = REDIRECT_PARAMS.iter().find(|p| params.contains(**p)) {
            vulnerabilities.push(VulnFinding {
                kind: "Potential Open Redirect".to_string(),
                description: format!("Link contains redirect parameter '{}': {}", param, href),
                severity: Severity::Info,
            });
        }
    }

    // Protocol-relative URLs resolve against whatever host served the page,
    // which enables host-header injection. One finding is enough.
    'outer: for (tag, attr) in RESOURCE_ATTRS {
        for element in select_all(doc, &format!("{}[{}]", tag, attr)) {
            if let Some(value) = element.value().attr(attr) {
                if value.starts_with("//") {
                    vulnerabilities.push(VulnFinding {
                        kind: "Potential Host Header Injection".to_string(),
                        description: format!("Protocol-relative URL found: {}", value),
                        severity: Severity::Info,
                    });
                    break 'outer;
                }
            }
        }
    }

    // Outdated JavaScript libraries referenced by script tags.
    for script in select_all(doc, "script[src]") {
        let Some(src) = script.value().attr("src") else {
            continue;
        };
        for (re, label) in OUTDATED_LIB_RES.iter() {
            if re.is_match(src) {
                vulnerabilities.push(VulnFinding {
                    kind: "Potentially Outdated Library".to_string(),
                    description: format!("{} detected: {}", label, src),
                    severity: Severity::Info,
                });
            }
        }
    }

    debug!(findings = vulnerabilities.len(), "Vulnerability check done.");
    CheckResult::success(CheckPayload::Vulns(VulnsPayload { vulnerabilities }))
}

// --- deserialize ---

pub fn run_deserialize_check(doc: &Html) -> CheckResult {
    let combined_js: String = select_all(doc, "script")
        .iter()
        .flat_map(|script| script.text())
        .collect::<Vec<_>>()
        .join("\n");

    let patterns: Vec<RiskyPattern> = DESERIALIZE_RES
        .iter()
        .filter_map(|(re, label)| {
            let occurrences = re.find_iter(&combined_js).count();
            (occurrences > 0).then(|| RiskyPattern {
                pattern: label.to_string(),
                occurrences,
            })
        })
        .collect();

    CheckResult::success(CheckPayload::Deserialize(DeserializePayload {
        potentially_vulnerable: !patterns.is_empty(),
        patterns,
    }))
}

// --- sql_leak ---

/// Looks for database error text in the rendered page, which usually means
/// raw query failures reach the user. Informational only.
pub fn run_sql_leak_check(doc: &Html) -> CheckResult {
    let text: String = doc.root_element().text().collect::<Vec<_>>().join(" ");

    let mut payload = SqlLeakPayload::default();
    for re in SQL_ERROR_RES.iter() {
        for m in re.find_iter(&text) {
            payload.found = true;
            payload.potential_leaks.push(m.as_str().to_string());
        }
    }

    debug!(leaks = payload.potential_leaks.len(), "SQL leak check done.");
    CheckResult::success(CheckPayload::SqlLeak(payload))
}

// --- file_upload ---

/// Inventories forms with file inputs: method, enctype and whether the
/// enctype is the multipart one uploads require. Informational only.
pub fn run_file_upload_check(doc: &Html) -> CheckResult {
    let mut payload = FileUploadPayload::default();

    for form in select_all(doc, "form") {
        let file_inputs = select_all_in(form, "input[type='file']");
        if file_inputs.is_empty() {
            continue;
        }

        let enctype = form.value().attr("enctype").map(|e| e.to_string());
        payload.forms.push(UploadForm {
            action: form.value().attr("action").unwrap_or_default().to_string(),
            method: form
                .value()
                .attr("method")
                .unwrap_or("GET")
                .to_uppercase(),
            correct_enctype: enctype.as_deref() == Some("multipart/form-data"),
            file_input_names: file_inputs
                .iter()
                .map(|input| input.value().attr("name").unwrap_or_default().to_string())
                .collect(),
            enctype,
        });
        payload.total_upload_forms += 1;
    }

    CheckResult::success(CheckPayload::FileUpload(payload))
}

// --- email_protection ---

const AT_OBFUSCATIONS: &[&str] = &[" at ", "[at]", "(at)", "{at}", " AT "];
const DOT_OBFUSCATIONS: &[&str] = &[" dot ", "[dot]", "(dot)", "{dot}", " DOT "];

fn note_protection(payload: &mut EmailProtectionPayload, method: &str) {
    payload.using_protection = true;
    if !payload.protection_methods.iter().any(|m| m == method) {
        payload.protection_methods.push(method.to_string());
    }
}

/// Reports how the page handles email exposure: plain addresses in the
/// source, and the common shielding techniques (script-written addresses,
/// entity encoding, image alts, contact forms, "name at domain dot tld"
/// spelling). Informational only.
pub fn run_email_protection_check(doc: &Html, body: &str) -> CheckResult {
    let mut payload = EmailProtectionPayload::default();

    let mut plain: BTreeSet<String> = BTreeSet::new();
    for m in EMAIL_RE.find_iter(body) {
        plain.insert(m.as_str().to_string());
        if plain.len() >= 10 {
            break;
        }
    }
    payload.plain_emails = plain.into_iter().collect();

    for script in select_all(doc, "script") {
        let js: String = script.text().collect();
        if js.contains("document.write") && (js.contains('@') || js.contains("&#")) {
            note_protection(&mut payload, "JavaScript encoding");
        }
    }

    if ENTITY_ENCODED_RE.is_match(body) {
        note_protection(&mut payload, "HTML entity encoding");
    }

    if select_all(doc, "img[alt]")
        .iter()
        .any(|img| img.value().attr("alt").is_some_and(|alt| alt.contains('@')))
    {
        note_protection(&mut payload, "Image-based emails");
    }

    if select_all(doc, "form[action]")
        .iter()
        .any(|form| {
            form.value()
                .attr("action")
                .is_some_and(|a| a.to_lowercase().contains("contact"))
        })
    {
        note_protection(&mut payload, "Contact form");
    }

    let text: String = doc.root_element().text().collect::<Vec<_>>().join("\n");
    let mut obfuscated: BTreeSet<String> = BTreeSet::new();
    for line in text.lines().filter(|line| line.len() < 100) {
        let has_at = AT_OBFUSCATIONS.iter().any(|r| line.contains(r));
        let has_dot = DOT_OBFUSCATIONS.iter().any(|r| line.contains(r));
        if has_at && has_dot {
            obfuscated.insert(line.trim().to_string());
            note_protection(&mut payload, "Text obfuscation");
        }
    }
    payload.obfuscated_emails = obfuscated.into_iter().collect();

    CheckResult::success(CheckPayload::EmailProtection(payload))
}

// --- leaks ---

fn is_private_ipv4(text: &str) -> bool {
    text.parse::<Ipv4Addr>()
        .map(|ip| ip.is_private() || ip.is_loopback())
        .unwrap_or(false)
}

fn truncate_comment(comment: &str) -> String {
    if comment.len() > 150 {
        let cut = comment
            .char_indices()
            .take_while(|(i, _)| *i <= 150)
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        format!("{}...", &comment[..cut])
    } else {
        comment.to_string()
    }
}

/// Scans the page source and headers for information leaks. Emails, IPs and
/// comments are reported informationally; `sensitive_items` collects only
/// the high-signal leaks that enter scoring: credential-looking assignments,
/// private/loopback addresses, and version-bearing Server banners.
pub fn run_leaks_check(doc: &Html, body: &str, headers: &HeaderMap) -> CheckResult {
    let mut payload = LeaksPayload::default();

    for node in doc.tree.nodes() {
        if let Node::Comment(comment) = node.value() {
            let text = comment.trim();
            if text.len() > 5 {
                payload.html_comments.push(truncate_comment(text));
            }
        }
    }

    payload.server_header = headers
        .get("server")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let mut emails: BTreeSet<String> = BTreeSet::new();
    for m in EMAIL_RE.find_iter(body) {
        emails.insert(m.as_str().to_string());
        if emails.len() >= 10 {
            break;
        }
    }
    payload.email_addresses = emails.into_iter().collect();

    let mut ips: BTreeSet<String> = BTreeSet::new();
    for m in IP_RE.find_iter(body) {
        ips.insert(m.as_str().to_string());
        if ips.len() >= 10 {
            break;
        }
    }
    payload.ip_addresses = ips.into_iter().collect();

    for (re, label) in CREDENTIAL_RES.iter() {
        if re.is_match(body) {
            payload.potential_credentials = true;
            payload
                .sensitive_items
                .push(format!("Credential-like {} in page source", label));
        }
    }
    for ip in payload.ip_addresses.iter().filter(|ip| is_private_ipv4(ip)) {
        payload
            .sensitive_items
            .push(format!("Internal IP address disclosed: {}", ip));
    }
    if let Some(server) = payload.server_header.as_deref() {
        if server.contains('/') {
            payload
                .sensitive_items
                .push(format!("Server version disclosed: {}", server));
        }
    }

    debug!(
        sensitive = payload.sensitive_items.len(),
        comments = payload.html_comments.len(),
        "Leak check done."
    );
    CheckResult::success(CheckPayload::Leaks(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    fn https_url() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn mixed_content_found_on_https_page() {
        let html = r#"
            <html><head>
              <script src="http://cdn.example.com/app.js"></script>
              <link href="https://cdn.example.com/site.css" rel="stylesheet">
              <style>.hero { background: url('http://img.example.com/bg.png'); }</style>
            </head>
            <body><div style="background: url(http://img.example.com/inline.png)"></div></body></html>
        "#;
        let result = run_mixed_content_check(&doc(html), &https_url());
        let Some(CheckPayload::MixedContent(payload)) = result.payload() else {
            panic!("expected mixed_content payload");
        };
        assert!(payload.has_mixed_content);
        assert_eq!(payload.resources.len(), 3);
        assert!(payload.resources.iter().any(|r| r.tag == "script"));
        assert!(payload.resources.iter().any(|r| r.tag == "style"));
        assert!(payload.resources.iter().any(|r| r.tag == "inline style"));
    }

    #[test]
    fn http_page_has_no_mixed_content_by_definition() {
        let html = r#"<script src="http://cdn.example.com/app.js"></script>"#;
        let url = Url::parse("http://example.com/").unwrap();
        let result = run_mixed_content_check(&doc(html), &url);
        let Some(CheckPayload::MixedContent(payload)) = result.payload() else {
            panic!("expected mixed_content payload");
        };
        assert!(!payload.is_https_page);
        assert!(!payload.has_mixed_content);
    }

    #[test]
    fn iframes_without_sandbox_or_https_are_insecure() {
        let html = r#"
            <iframe src="https://trusted.example.com" sandbox="allow-scripts"></iframe>
            <iframe src="http://ads.example.com"></iframe>
            <iframe src="/relative"></iframe>
        "#;
        let result = run_iframe_check(&doc(html));
        let Some(CheckPayload::IframeSecurity(payload)) = result.payload() else {
            panic!("expected iframe payload");
        };
        assert_eq!(payload.total_iframes, 3);
        assert_eq!(payload.sandboxed_iframes, 1);
        assert_eq!(payload.insecure_iframes.len(), 2);
        let ad_frame = &payload.insecure_iframes[0];
        assert_eq!(ad_frame.src, "http://ads.example.com");
        assert_eq!(
            ad_frame.issues,
            vec!["No sandbox attribute".to_string(), "Not using HTTPS".to_string()]
        );
        // The relative iframe is only missing the sandbox.
        assert_eq!(payload.insecure_iframes[1].issues, vec!["No sandbox attribute"]);
    }

    #[test]
    fn password_form_over_get_is_insecure() {
        let html = r#"
            <form action="/login" method="get">
              <input type="password" name="pw">
            </form>
        "#;
        let result = run_password_forms_check(&doc(html));
        let Some(CheckPayload::Passwords(payload)) = result.payload() else {
            panic!("expected passwords payload");
        };
        assert_eq!(payload.total_password_forms, 1);
        assert_eq!(payload.insecure_forms, 1);
        assert_eq!(payload.secure_forms, 0);
    }

    #[test]
    fn password_form_posting_to_https_is_secure() {
        let html = r#"
            <form action="https://example.com/login" method="POST">
              <input type="hidden" name="csrf_token" value="x">
              <input type="password" name="pw" autocomplete="off">
              <div class="g-recaptcha"></div>
            </form>
        "#;
        let result = run_password_forms_check(&doc(html));
        let Some(CheckPayload::Passwords(payload)) = result.payload() else {
            panic!("expected passwords payload");
        };
        assert_eq!(payload.secure_forms, 1);
        assert_eq!(payload.insecure_forms, 0);
        let form = &payload.forms[0];
        assert!(form.has_csrf_token);
        assert!(form.has_autocomplete_off);
        assert!(form.has_captcha);
    }

    #[test]
    fn password_form_posting_to_plain_http_is_insecure() {
        let html = r#"
            <form action="http://example.com/login" method="post">
              <input type="password" name="pw">
            </form>
        "#;
        let result = run_password_forms_check(&doc(html));
        let Some(CheckPayload::Passwords(payload)) = result.payload() else {
            panic!("expected passwords payload");
        };
        assert_eq!(payload.insecure_forms, 1);
        assert!(!payload.forms[0].submits_over_https);
    }

    #[test]
    fn forms_without_password_fields_are_ignored() {
        let html = r#"<form method="get"><input type="text" name="q"></form>"#;
        let result = run_password_forms_check(&doc(html));
        let Some(CheckPayload::Passwords(payload)) = result.payload() else {
            panic!("expected passwords payload");
        };
        assert_eq!(payload.total_password_forms, 0);
    }

    #[test]
    fn reflected_query_parameter_is_flagged() {
        let url = Url::parse("https://example.com/search?q=zebra-crossing").unwrap();
        let body = "<html><body>Results for zebra-crossing</body></html>";
        let result = run_vulns_check(&doc(body), body, &url);
        let Some(CheckPayload::Vulns(payload)) = result.payload() else {
            panic!("expected vulns payload");
        };
        assert!(payload
            .vulnerabilities
            .iter()
            .any(|v| v.kind == "Potential Reflected XSS"));
    }

    #[test]
    fn post_form_without_csrf_token_is_flagged() {
        let html = r#"
            <form action="/transfer" method="POST"><input type="text" name="amount"></form>
            <form action="/safe" method="POST"><input type="hidden" name="csrf" value="x"></form>
        "#;
        let result = run_vulns_check(&doc(html), html, &https_url());
        let Some(CheckPayload::Vulns(payload)) = result.payload() else {
            panic!("expected vulns payload");
        };
        let csrf_findings: Vec<_> = payload
            .vulnerabilities
            .iter()
            .filter(|v| v.kind == "Potential CSRF Vulnerability")
            .collect();
        assert_eq!(csrf_findings.len(), 1);
        assert!(csrf_findings[0].description.contains("/transfer"));
    }

    #[test]
    fn redirect_parameters_and_protocol_relative_urls_are_flagged() {
        let html = r#"
            <a href="/out?redirect=https://evil.example.com">out</a>
            <img src="//cdn.example.com/pixel.png">
        "#;
        let result = run_vulns_check(&doc(html), html, &https_url());
        let Some(CheckPayload::Vulns(payload)) = result.payload() else {
            panic!("expected vulns payload");
        };
        assert!(payload
            .vulnerabilities
            .iter()
            .any(|v| v.kind == "Potential Open Redirect"));
        assert!(payload
            .vulnerabilities
            .iter()
            .any(|v| v.kind == "Potential Host Header Injection"));
    }

    #[test]
    fn outdated_jquery_is_flagged() {
        let html = r#"<script src="/js/jquery-1.8.3.min.js"></script>"#;
        let result = run_vulns_check(&doc(html), html, &https_url());
        let Some(CheckPayload::Vulns(payload)) = result.payload() else {
            panic!("expected vulns payload");
        };
        assert!(payload
            .vulnerabilities
            .iter()
            .any(|v| v.kind == "Potentially Outdated Library" && v.description.contains("jQuery")));
    }

    #[test]
    fn clean_page_yields_no_vulnerabilities() {
        let html = r#"<html><body><a href="/about">About</a></body></html>"#;
        let result = run_vulns_check(&doc(html), html, &https_url());
        let Some(CheckPayload::Vulns(payload)) = result.payload() else {
            panic!("expected vulns payload");
        };
        assert!(payload.vulnerabilities.is_empty());
    }

    #[test]
    fn risky_deserialization_patterns_are_counted() {
        let html = r#"
            <script>
              var state = JSON.parse(localStorage.getItem('state'));
              eval(atob(payload));
              eval(atob(other));
            </script>
        "#;
        let result = run_deserialize_check(&doc(html));
        let Some(CheckPayload::Deserialize(payload)) = result.payload() else {
            panic!("expected deserialize payload");
        };
        assert!(payload.potentially_vulnerable);
        let eval_pattern = payload
            .patterns
            .iter()
            .find(|p| p.pattern == "eval() with JSON.parse or atob")
            .unwrap();
        assert_eq!(eval_pattern.occurrences, 2);
    }

    #[test]
    fn page_without_scripts_is_not_deserialization_vulnerable() {
        let result = run_deserialize_check(&doc("<html><body>hi</body></html>"));
        let Some(CheckPayload::Deserialize(payload)) = result.payload() else {
            panic!("expected deserialize payload");
        };
        assert!(!payload.potentially_vulnerable);
        assert!(payload.patterns.is_empty());
    }

    #[test]
    fn database_error_text_in_the_page_is_a_sql_leak() {
        let html = r#"
            <html><body>
              <h1>Something went wrong</h1>
              <pre>You have an error in your SQL syntax; check the manual for MySQL</pre>
              <pre>ORA-01017: invalid username/password</pre>
            </body></html>
        "#;
        let result = run_sql_leak_check(&doc(html));
        let Some(CheckPayload::SqlLeak(payload)) = result.payload() else {
            panic!("expected sql_leak payload");
        };
        assert!(payload.found);
        assert_eq!(payload.potential_leaks.len(), 2);
        assert!(payload.potential_leaks.iter().any(|l| l.contains("ORA-01017")));
    }

    #[test]
    fn clean_page_has_no_sql_leak() {
        let result = run_sql_leak_check(&doc("<html><body>All good</body></html>"));
        let Some(CheckPayload::SqlLeak(payload)) = result.payload() else {
            panic!("expected sql_leak payload");
        };
        assert!(!payload.found);
        assert!(payload.potential_leaks.is_empty());
    }

    #[test]
    fn upload_forms_report_enctype_correctness() {
        let html = r#"
            <form action="/upload" method="post" enctype="multipart/form-data">
              <input type="file" name="avatar" accept="image/*">
            </form>
            <form action="/broken" method="post">
              <input type="file" name="doc">
              <input type="file" name="extra">
            </form>
            <form action="/plain" method="get"><input type="text" name="q"></form>
        "#;
        let result = run_file_upload_check(&doc(html));
        let Some(CheckPayload::FileUpload(payload)) = result.payload() else {
            panic!("expected file_upload payload");
        };
        assert_eq!(payload.total_upload_forms, 2);
        assert!(payload.forms[0].correct_enctype);
        assert!(!payload.forms[1].correct_enctype);
        assert_eq!(payload.forms[1].file_input_names, vec!["doc", "extra"]);
    }

    #[test]
    fn email_protection_detects_plain_and_shielded_addresses() {
        let html = r#"
            <html><body>
              <p>Write to sales@example.com</p>
              <p>Or reach ops [at] example [dot] com</p>
              <img src="/mail.png" alt="support@example.com">
              <form action="/contact-us"><input type="text" name="msg"></form>
            </body></html>
        "#;
        let result = run_email_protection_check(&doc(html), html);
        let Some(CheckPayload::EmailProtection(payload)) = result.payload() else {
            panic!("expected email_protection payload");
        };
        assert!(payload.using_protection);
        assert!(payload.plain_emails.iter().any(|e| e == "sales@example.com"));
        assert!(payload
            .protection_methods
            .iter()
            .any(|m| m == "Image-based emails"));
        assert!(payload.protection_methods.iter().any(|m| m == "Contact form"));
        assert!(payload
            .protection_methods
            .iter()
            .any(|m| m == "Text obfuscation"));
        assert_eq!(payload.obfuscated_emails.len(), 1);
    }

    #[test]
    fn page_without_emails_uses_no_protection() {
        let html = "<html><body>Nothing to see</body></html>";
        let result = run_email_protection_check(&doc(html), html);
        let Some(CheckPayload::EmailProtection(payload)) = result.payload() else {
            panic!("expected email_protection payload");
        };
        assert!(!payload.using_protection);
        assert!(payload.plain_emails.is_empty());
        assert!(payload.protection_methods.is_empty());
    }

    #[test]
    fn leaks_check_collects_comments_emails_and_sensitive_items() {
        let html = r#"
            <html><!-- TODO remove before launch: db at 192.168.1.50 -->
            <body>
              Contact ops@example.com or admin@example.com.
              <script>var api_key = "sk-123456";</script>
            </body></html>
        "#;
        let mut headers = HeaderMap::new();
        headers.insert("server", HeaderValue::from_static("Apache/2.4.41"));

        let result = run_leaks_check(&doc(html), html, &headers);
        let Some(CheckPayload::Leaks(payload)) = result.payload() else {
            panic!("expected leaks payload");
        };
        assert_eq!(payload.html_comments.len(), 1);
        assert_eq!(payload.email_addresses.len(), 2);
        assert!(payload.potential_credentials);
        assert_eq!(payload.server_header.as_deref(), Some("Apache/2.4.41"));
        // api_key assignment + internal IP + server version banner.
        assert!(payload
            .sensitive_items
            .iter()
            .any(|i| i.contains("api_key")));
        assert!(payload
            .sensitive_items
            .iter()
            .any(|i| i.contains("192.168.1.50")));
        assert!(payload
            .sensitive_items
            .iter()
            .any(|i| i.contains("Apache/2.4.41")));
    }

    #[test]
    fn clean_page_leaks_nothing_scorable() {
        let html = "<html><body>Hello</body></html>";
        let result = run_leaks_check(&doc(html), html, &HeaderMap::new());
        let Some(CheckPayload::Leaks(payload)) = result.payload() else {
            panic!("expected leaks payload");
        };
        assert!(payload.sensitive_items.is_empty());
        assert!(!payload.potential_credentials);
    }

    #[test]
    fn long_comments_are_truncated() {
        let long = "x".repeat(400);
        let html = format!("<html><!-- {} --></html>", long);
        let result = run_leaks_check(&doc(&html), &html, &HeaderMap::new());
        let Some(CheckPayload::Leaks(payload)) = result.payload() else {
            panic!("expected leaks payload");
        };
        assert!(payload.html_comments[0].ends_with("..."));
        assert!(payload.html_comments[0].len() <= 154);
    }
}
