// src/core/scanner/ssl_scanner.rs

use chrono::{DateTime, Utc};
use native_tls::TlsConnector;
use std::net::TcpStream;
use std::time::Duration;
use tokio::task::spawn_blocking;
use tracing::{debug, error, info};
use x509_parser::prelude::*;

use crate::core::models::{CheckKind, CheckPayload, CheckResult, SslPayload};

const TLS_PORT: u16 = 443;
const TLS_TIMEOUT: Duration = Duration::from_secs(10);

// Signature algorithms considered broken for certificate signing.
const WEAK_SIGNATURE_OIDS: &[&str] = &[
    "1.2.840.113549.1.1.2", // md2WithRSAEncryption
    "1.2.840.113549.1.1.4", // md5WithRSAEncryption
    "1.2.840.113549.1.1.5", // sha1WithRSAEncryption
    "1.2.840.10040.4.3",    // dsa-with-sha1
    "1.2.840.10045.4.1",    // ecdsa-with-SHA1
];

/// Probes the TLS certificate on port 443 of the target host.
///
/// The blocking connect runs on the blocking pool; a panic there is absorbed
/// into an `Unavailable` outcome so the scan as a whole never aborts because
/// of this check.
pub async fn run_ssl_check(host: &str) -> CheckResult {
    info!(host, "Starting SSL/TLS check.");
    let host_owned = host.to_string();

    let probe = spawn_blocking(move || perform_tls_probe(&host_owned))
        .await
        .unwrap_or_else(|e| {
            error!(panic = %e, "Blocking TLS probe task panicked.");
            Err(format!("TLS probe task panicked: {}", e))
        });

    match probe {
        Ok(payload) => {
            info!(
                valid = payload.valid,
                days_until_expiry = payload.days_until_expiry,
                "SSL/TLS check finished."
            );
            CheckResult::success(CheckPayload::Ssl(payload))
        }
        Err(reason) => CheckResult::unavailable(CheckKind::Ssl, reason),
    }
}

fn perform_tls_probe(host: &str) -> Result<SslPayload, String> {
    debug!(host, "Connecting TCP stream to port 443.");

    // Invalid and self-signed certificates are exactly what this check wants
    // to look at, so validation happens here instead of in the handshake.
    let connector = TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()
        .map_err(|e| format!("TlsConnector error: {}", e))?;

    let addr = (host, TLS_PORT);
    let stream = {
        use std::net::ToSocketAddrs;
        let resolved = addr
            .to_socket_addrs()
            .map_err(|e| format!("DNS resolution error: {}", e))?
            .next()
            .ok_or_else(|| "no address resolved".to_string())?;
        TcpStream::connect_timeout(&resolved, TLS_TIMEOUT)
            .map_err(|e| format!("TCP connection error: {}", e))?
    };
    stream
        .set_read_timeout(Some(TLS_TIMEOUT))
        .and_then(|_| stream.set_write_timeout(Some(TLS_TIMEOUT)))
        .map_err(|e| format!("Socket timeout error: {}", e))?;

    debug!(host, "Performing TLS handshake.");
    let stream = connector
        .connect(host, stream)
        .map_err(|e| format!("TLS handshake error: {}", e))?;

    let cert = stream
        .peer_certificate()
        .map_err(|e| format!("Could not get peer certificate: {}", e))?
        .ok_or_else(|| "no peer certificate presented".to_string())?;

    let cert_der = cert
        .to_der()
        .map_err(|e| format!("Could not convert certificate to DER: {}", e))?;
    let (_, x509) = parse_x509_certificate(&cert_der)
        .map_err(|e| format!("X.509 parse error: {}", e))?;

    Ok(inspect_certificate(&x509, Utc::now()))
}

/// Derives the scoring-relevant facts from a parsed certificate. Pure, so
/// time-dependent behavior can be pinned in tests.
fn inspect_certificate(x509: &X509Certificate<'_>, now: DateTime<Utc>) -> SslPayload {
    let validity = x509.validity();
    let not_before = asn1_time_to_chrono_utc(&validity.not_before);
    let not_after = asn1_time_to_chrono_utc(&validity.not_after);

    let expired = now > not_after;
    let valid = now >= not_before && !expired;
    let subject = x509.subject().to_string();
    let issuer = x509.issuer().to_string();
    let signature_algorithm = x509.signature_algorithm.algorithm.to_id_string();

    SslPayload {
        valid,
        expired,
        self_signed: subject == issuer,
        weak_signature: WEAK_SIGNATURE_OIDS.contains(&signature_algorithm.as_str()),
        subject,
        issuer,
        signature_algorithm,
        not_before,
        not_after,
        days_until_expiry: not_after.signed_duration_since(now).num_days(),
    }
}

fn asn1_time_to_chrono_utc(time: &ASN1Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_signature_oid_table_knows_sha1_rsa() {
        assert!(WEAK_SIGNATURE_OIDS.contains(&"1.2.840.113549.1.1.5"));
        // SHA-256 with RSA is fine.
        assert!(!WEAK_SIGNATURE_OIDS.contains(&"1.2.840.113549.1.1.11"));
    }

    #[test]
    fn probe_against_unroutable_host_degrades_to_error_string() {
        // Reserved TEST-NET-1 address; the connect must fail, not panic.
        let result = perform_tls_probe("192.0.2.1");
        assert!(result.is_err());
    }
}
