// src/cli.rs

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing::{error, info, warn};

use crate::core::models::{CheckKind, ScanReport};
use crate::core::scanner::{run_scan, CheckSelection};
use crate::export::{export_reports, ExportFormat};
use crate::report::{render_fetch_failure, render_report};
use crate::webhook;

/// Upper bound on scans running at once in batch mode.
const MAX_CONCURRENT_SCANS: usize = 8;

#[derive(Debug, Parser)]
#[command(
    name = "watchtower",
    version,
    about = "Website reconnaissance and threat scoring from the command line"
)]
pub struct Cli {
    /// Target URLs to scan. A bare domain gets an https:// prefix.
    pub targets: Vec<String>,

    /// Scan every target listed in FILE, one per line. Blank lines and
    /// lines starting with '#' are skipped.
    #[arg(long, value_name = "FILE")]
    pub batch: Option<PathBuf>,

    /// Run only these checks (comma-separated snake_case names, e.g.
    /// "security,ssl,cookie_sec"). Default is all checks.
    #[arg(long, value_delimiter = ',', value_name = "CHECKS")]
    pub checks: Option<Vec<CheckKind>>,

    /// Write the reports to a file in the given format.
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub export: Option<ExportFormat>,

    /// Output path for --export. Defaults to a timestamped file in the
    /// current directory.
    #[arg(long, value_name = "PATH", requires = "export")]
    pub output: Option<PathBuf>,

    /// POST the reports as JSON to this URL when the scan finishes.
    #[arg(long, value_name = "URL")]
    pub webhook: Option<String>,

    /// Print only the threat assessment, not per-check findings.
    #[arg(long, short)]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    pub async fn run(self) -> Result<()> {
        let targets = self.collect_targets()?;
        if targets.is_empty() {
            return Err(eyre!(
                "no targets given; pass URLs as arguments or use --batch"
            ));
        }

        let selection = match &self.checks {
            Some(kinds) => CheckSelection::from_kinds(kinds.iter().copied()),
            None => CheckSelection::all(),
        };
        if selection.is_empty() {
            return Err(eyre!("--checks selected no checks"));
        }

        info!(count = targets.len(), "starting scan run");
        let reports = self.scan_all(&targets, &selection).await;

        if reports.is_empty() {
            return Err(eyre!("all {} target(s) failed to scan", targets.len()));
        }

        if let Some(format) = self.export {
            let path = self
                .output
                .clone()
                .unwrap_or_else(|| default_export_path(format));
            export_reports(&reports, format, &path)?;
            println!("Report written to {}", path.display());
        }

        if let Some(url) = &self.webhook {
            if webhook::deliver(url, &reports).await {
                println!("Webhook delivered to {}", url);
            } else {
                eprintln!("Webhook delivery to {} failed", url);
            }
        }

        Ok(())
    }

    /// Positional targets first, then the batch file, preserving order.
    fn collect_targets(&self) -> Result<Vec<String>> {
        let mut targets = self.targets.clone();
        if let Some(path) = &self.batch {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| eyre!("cannot read batch file {}: {}", path.display(), e))?;
            targets.extend(
                contents
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(String::from),
            );
        }
        Ok(targets)
    }

    /// Scans every target, at most `MAX_CONCURRENT_SCANS` in flight.
    /// A target that fails to fetch is reported and dropped; it never
    /// aborts the rest of the run.
    async fn scan_all(&self, targets: &[String], selection: &CheckSelection) -> Vec<ScanReport> {
        let mut reports = Vec::with_capacity(targets.len());

        for chunk in targets.chunks(MAX_CONCURRENT_SCANS) {
            let mut handles = Vec::with_capacity(chunk.len());
            for target in chunk {
                let target = target.clone();
                let selection = selection.clone();
                handles.push((
                    target.clone(),
                    tokio::spawn(async move { run_scan(&target, &selection).await }),
                ));
            }

            for (target, handle) in handles {
                match handle.await {
                    Ok(Ok(report)) => {
                        render_report(&report, self.quiet);
                        reports.push(report);
                    }
                    Ok(Err(e)) => {
                        warn!(target, error = %e, "scan failed");
                        render_fetch_failure(&target, &e);
                    }
                    Err(e) => {
                        error!(target, error = %e, "scan task panicked");
                        eprintln!("scan of {} aborted unexpectedly", target);
                    }
                }
            }
        }

        reports
    }
}

fn default_export_path(format: ExportFormat) -> PathBuf {
    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("watchtower_report_{}.{}", stamp, format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_targets_and_flags() {
        let cli = Cli::parse_from([
            "watchtower",
            "example.com",
            "https://other.test",
            "--quiet",
            "--export",
            "json",
        ]);
        assert_eq!(cli.targets, vec!["example.com", "https://other.test"]);
        assert!(cli.quiet);
        assert_eq!(cli.export, Some(ExportFormat::Json));
        assert!(cli.webhook.is_none());
    }

    #[test]
    fn parses_comma_separated_checks() {
        let cli = Cli::parse_from(["watchtower", "example.com", "--checks", "security,ssl,leaks"]);
        assert_eq!(
            cli.checks,
            Some(vec![CheckKind::Security, CheckKind::Ssl, CheckKind::Leaks])
        );
    }

    #[test]
    fn rejects_unknown_check_name() {
        let result = Cli::try_parse_from(["watchtower", "example.com", "--checks", "nonsense"]);
        assert!(result.is_err());
    }

    #[test]
    fn output_requires_export() {
        let result = Cli::try_parse_from(["watchtower", "example.com", "--output", "out.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn batch_file_lines_are_appended() {
        let dir = std::env::temp_dir();
        let path = dir.join("watchtower-batch-test.txt");
        std::fs::write(&path, "one.example\n\n# comment\n  two.example  \n").unwrap();

        let cli = Cli::parse_from([
            "watchtower",
            "zero.example",
            "--batch",
            path.to_str().unwrap(),
        ]);
        let targets = cli.collect_targets().unwrap();
        assert_eq!(targets, vec!["zero.example", "one.example", "two.example"]);
        std::fs::remove_file(&path).ok();
    }
}
