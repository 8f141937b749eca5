// src/core/scanner/dns_scanner.rs

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use tracing::{debug, info, warn};

use crate::core::models::{CheckKind, CheckPayload, CheckResult, DnsPayload};

/// Informational DNS inventory for the target domain: addresses, mail
/// exchangers, name servers and TXT records.
///
/// Address resolution failing means the domain is effectively unreachable
/// for us, so that case degrades to `Unavailable`; failures of the other
/// lookups just leave their lists empty.
pub async fn run_dns_check(domain: &str) -> CheckResult {
    // Record lookups are usually served at the root domain.
    let root_domain = domain.strip_prefix("www.").unwrap_or(domain);
    info!(domain = %root_domain, "Starting DNS check.");

    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

    let (ip_result, mx_result, ns_result, txt_result) = tokio::join!(
        resolver.lookup_ip(root_domain),
        resolver.mx_lookup(root_domain),
        resolver.ns_lookup(root_domain),
        resolver.txt_lookup(root_domain),
    );

    let addresses = match ip_result {
        Ok(lookup) => lookup.iter().map(|ip| ip.to_string()).collect::<Vec<_>>(),
        Err(e) => {
            warn!(domain = %root_domain, error = %e, "Address lookup failed.");
            return CheckResult::unavailable(CheckKind::Dns, format!("DNS error: {}", e));
        }
    };

    let mx = match mx_result {
        Ok(lookup) => lookup.iter().map(|mx| mx.exchange().to_string()).collect(),
        Err(e) => {
            debug!(domain = %root_domain, error = %e, "MX lookup failed.");
            Vec::new()
        }
    };
    let ns = match ns_result {
        Ok(lookup) => lookup.iter().map(|ns| ns.to_string()).collect(),
        Err(e) => {
            debug!(domain = %root_domain, error = %e, "NS lookup failed.");
            Vec::new()
        }
    };
    let txt = match txt_result {
        Ok(lookup) => lookup.iter().map(|txt| txt.to_string()).collect(),
        Err(e) => {
            debug!(domain = %root_domain, error = %e, "TXT lookup failed.");
            Vec::new()
        }
    };

    info!(addresses = addresses.len(), "DNS check finished.");
    CheckResult::success(CheckPayload::Dns(DnsPayload {
        addresses,
        mx,
        ns,
        txt,
    }))
}
