// src/webhook.rs

use std::time::Duration;

use tracing::{error, info};

use crate::core::models::ScanReport;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts the finished reports as a JSON array to the given endpoint.
/// Delivery is best-effort: failures are logged and reported to the caller,
/// never retried.
pub async fn deliver(url: &str, reports: &[ScanReport]) -> bool {
    let client = match reqwest::Client::builder().timeout(WEBHOOK_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to build webhook client");
            return false;
        }
    };

    match client.post(url).json(reports).send().await {
        Ok(response) if response.status().is_success() => {
            info!(url, status = %response.status(), "webhook delivered");
            true
        }
        Ok(response) => {
            error!(url, status = %response.status(), "webhook rejected");
            false
        }
        Err(e) => {
            error!(url, error = %e, "webhook delivery failed");
            false
        }
    }
}
