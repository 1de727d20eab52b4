//! Report rendering.

use anyhow::Result;
use ctd_core::{AnalysisResult, LogEntry, RuleReport};
use std::fmt::Write as _;

use crate::ReportFormat;

/// Renders the whole aggregate in the requested format.
pub fn render(result: &AnalysisResult, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Markdown => Ok(markdown(result)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        ReportFormat::Text => Ok(text(result)),
    }
}

/// Every rule section, in registration order.
pub fn markdown(result: &AnalysisResult) -> String {
    result.iter().map(markdown_section).collect()
}

/// One rule section: `## key`, then a table per domain.
pub fn markdown_section(report: &RuleReport) -> String {
    let mut out = format!("## {}\n", report.meta.key);

    for (domain, entries) in &report.result {
        let _ = writeln!(out, "### {domain}");
        for header in &report.meta.headers {
            let _ = write!(out, "| {} ", cell(header));
        }
        out.push_str("|\n");
        for _ in &report.meta.headers {
            out.push_str("| ------- ");
        }
        out.push_str("|\n");
        for entry in entries {
            out.push_str(&markdown_row(entry, &report.meta.header_keys));
        }
    }

    out
}

fn markdown_row(entry: &LogEntry, header_keys: &[String]) -> String {
    let cells: Vec<String> = header_keys
        .iter()
        .map(|key| entry.field(key).map(|v| cell(&v)).unwrap_or_default())
        .collect();
    format!("| {} |\n", cells.join(" | "))
}

/// Keeps a value on one table row.
fn cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}

fn text(result: &AnalysisResult) -> String {
    let mut out = String::new();

    for report in result.iter() {
        let _ = writeln!(out, "{} ({} entries)", report.meta.key, report.entry_count());
        for (domain, entries) in &report.result {
            let label = if domain.is_empty() { "(no tag)" } else { domain.as_str() };
            let _ = writeln!(out, "  {label:<24} {}", entries.len());
        }
    }

    let _ = writeln!(
        out,
        "\nFound {} entries from {} rule(s) in {} file(s)",
        result.total_entries(),
        result.reports.len(),
        result.files_analyzed
    );
    out
}
