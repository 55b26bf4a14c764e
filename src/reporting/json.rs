//! # JSON Reporting Module / JSON 报告模块
//!
//! Machine-readable counterpart of the HTML report.
//! HTML 报告的机器可读版本。

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::core::models::{AuditResult, RunOutcome};

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub generated_at: DateTime<Local>,
    pub target: &'a str,
    pub any_issues: bool,
    pub total_issues: usize,
    pub results: &'a [AuditResult],
}

impl<'a> JsonReport<'a> {
    pub fn new(outcome: &'a RunOutcome, target: &'a str) -> Self {
        Self {
            generated_at: Local::now(),
            target,
            any_issues: outcome.any_issues(),
            total_issues: outcome.total_issues(),
            results: &outcome.results,
        }
    }
}

/// Serializes `outcome` as pretty-printed JSON to `output_path`.
pub fn write_json_report(outcome: &RunOutcome, target: &str, output_path: &Path) -> Result<()> {
    let report = JsonReport::new(outcome, target);
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize JSON report")?;
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report: {}", output_path.display()))?;
    Ok(())
}
