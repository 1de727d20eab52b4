//! Scan command implementation.

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use ctd_core::{AnalysisResult, Analyzer, RuleBox};
use ctd_rules::{builtin_rules, RuleRegistry};
use std::path::{Path, PathBuf};

use super::output;
use crate::config_resolver::LoadedConfig;
use crate::ReportFormat;

/// Command-line options of `ctd scan`.
#[derive(Debug, Default)]
pub struct ScanOptions {
    /// `--output`.
    pub output: Option<PathBuf>,
    /// `--format`.
    pub format: Option<ReportFormat>,
    /// `--rules`, comma-separated keys.
    pub rules: Option<String>,
    /// `--exclude` globs, added to the configured ones.
    pub exclude: Vec<String>,
    /// `--split`.
    pub split: bool,
}

/// Runs the scan command.
pub fn run(path: &Path, options: &ScanOptions, loaded: LoadedConfig) -> Result<()> {
    let LoadedConfig {
        config, plugins, ..
    } = loaded;

    let format = resolve_format(options.format, config.output.format.as_deref())?;
    let output_path = options
        .output
        .clone()
        .unwrap_or_else(|| config.output.path.clone());

    let mut rules = RuleRegistry::new()
        .builtins(builtin_rules(&config))
        .candidates(plugins)
        .build();
    if let Some(filter) = &options.rules {
        let keys: Vec<&str> = filter.split(',').map(str::trim).collect();
        rules = filter_rules(rules, &keys);
    }

    let analyzer = Analyzer::builder()
        .root(path)
        .config(config)
        .rules(rules)
        .excludes(options.exclude.iter().cloned())
        .build()
        .context("Failed to build analyzer")?;

    tracing::info!(
        "Scanning {} with {} rule(s)",
        path.display(),
        analyzer.rule_count()
    );

    let result = analyzer.analyze().context("Analysis failed")?;
    let rendered = output::render(&result, format)?;

    if options.split {
        write_sections(&result, &output_path)?;
    }

    if format == ReportFormat::Text && options.output.is_none() {
        print!("{rendered}");
        return Ok(());
    }

    write_file(&output_path, &rendered)?;

    println!(
        "Wrote {} entries to {}",
        result.total_entries(),
        output_path.display()
    );
    Ok(())
}

fn resolve_format(flag: Option<ReportFormat>, configured: Option<&str>) -> Result<ReportFormat> {
    if let Some(format) = flag {
        return Ok(format);
    }
    match configured {
        Some(name) => ReportFormat::from_str(name, true)
            .map_err(|_| anyhow!("Unknown output format in config: {name}")),
        None => Ok(ReportFormat::default()),
    }
}

/// Keeps the rules named in `keys`, in their registration order.
fn filter_rules(rules: Vec<RuleBox>, keys: &[&str]) -> Vec<RuleBox> {
    for key in keys {
        if !rules.iter().any(|r| r.key() == *key) {
            tracing::warn!("Unknown rule: {}", key);
        }
    }
    rules
        .into_iter()
        .filter(|r| keys.contains(&r.key()))
        .collect()
}

/// Writes each rule section next to the main report, at its `result_path`.
fn write_sections(result: &AnalysisResult, report_path: &Path) -> Result<()> {
    let dir = report_path.parent().unwrap_or_else(|| Path::new(""));

    for report in result.iter() {
        if report.meta.result_path.trim().is_empty() {
            tracing::warn!("Rule '{}' has no result path, not split", report.meta.key);
            continue;
        }
        let path = dir.join(&report.meta.result_path);
        write_file(&path, &output::markdown_section(report))?;
        tracing::debug!("Wrote {}", path.display());
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
