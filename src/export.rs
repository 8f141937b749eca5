// src/export.rs
//
// Serialization of finished scan reports to files. JSON is the lossless
// format; CSV flattens one report per row with each check payload embedded
// as a JSON cell; TXT mirrors the console report without color codes.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use clap::ValueEnum;
use color_eyre::Result;
use strum::IntoEnumIterator;

use crate::core::models::{CheckKind, CheckOutcome, ScanReport};
use crate::report::summary_lines;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
    Txt,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Txt => "txt",
        }
    }
}

pub fn export_reports(reports: &[ScanReport], format: ExportFormat, path: &Path) -> Result<()> {
    match format {
        ExportFormat::Json => export_json(reports, path),
        ExportFormat::Csv => export_csv(reports, path),
        ExportFormat::Txt => export_txt(reports, path),
    }
}

fn export_json(reports: &[ScanReport], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, reports)?;
    Ok(())
}

fn export_csv(reports: &[ScanReport], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec![
        "target".to_string(),
        "final_url".to_string(),
        "status_code".to_string(),
        "scanned_at".to_string(),
        "overall_score".to_string(),
        "category".to_string(),
    ];
    header.extend(CheckKind::iter().map(|kind| kind.to_string()));
    writer.write_record(&header)?;

    for report in reports {
        let (score, category) = match &report.assessment {
            Some(a) => (a.overall_score.to_string(), a.category.to_string()),
            None => (String::new(), String::new()),
        };
        let mut record = vec![
            report.target.clone(),
            report.final_url.clone(),
            report.status_code.to_string(),
            report.scanned_at.to_rfc3339(),
            score,
            category,
        ];
        for kind in CheckKind::iter() {
            let cell = match report.result_for(kind) {
                Some(result) => match &result.outcome {
                    CheckOutcome::Success(payload) => serde_json::to_string(payload)?,
                    CheckOutcome::Unavailable { .. } => result.outcome.to_string(),
                },
                None => String::new(),
            };
            record.push(cell);
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

fn export_txt(reports: &[ScanReport], path: &Path) -> Result<()> {
    let mut file = File::create(path)?;

    for report in reports {
        writeln!(file, "{}", "=".repeat(70))?;
        writeln!(file, "Scan results for {}", report.target)?;
        writeln!(
            file,
            "final URL: {} (HTTP {})",
            report.final_url, report.status_code
        )?;
        writeln!(file, "scanned at: {}", report.scanned_at.to_rfc3339())?;

        for result in &report.results {
            writeln!(file, "\n[{}]", result.kind)?;
            match &result.outcome {
                CheckOutcome::Success(payload) => {
                    for line in summary_lines(payload) {
                        writeln!(file, "  {}", line)?;
                    }
                }
                CheckOutcome::Unavailable { .. } => {
                    writeln!(file, "  {}", result.outcome)?;
                }
            }
        }

        if let Some(assessment) = &report.assessment {
            writeln!(
                file,
                "\nThreat Score: {}/100 - {} Risk",
                assessment.overall_score, assessment.category
            )?;
            for contribution in assessment.contributions.values() {
                if contribution.score > 0 {
                    writeln!(
                        file,
                        " * {}: {} points - {}",
                        contribution.kind, contribution.score, contribution.reason
                    )?;
                }
            }
        }
        writeln!(file)?;
    }

    Ok(())
}
