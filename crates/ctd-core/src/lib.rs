//! # ctd-core
//!
//! Core framework for auditing reporting call sites in TypeScript and
//! JavaScript projects, built on Tree-sitter.
//!
//! This crate provides the foundational pieces shared by all rules:
//!
//! - [`SourceFile`] and [`SyntaxNode`], a read-only facade over parsed trees
//! - [`Project`] for discovering and parsing a project's files
//! - [`Rule`] trait for per-node classification rules
//! - [`Analyzer`] and [`analyze_project`] for folding rule output
//! - [`AnalysisResult`] for the grouped, ordered aggregate
//!
//! ## Example
//!
//! ```ignore
//! use ctd_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./app")
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! for report in result.iter() {
//!     println!("{}: {} entries", report.meta.key, report.entry_count());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod project;
mod rule;
mod syntax;
mod types;

pub use analyzer::{analyze_project, Analyzer, AnalyzerBuilder, AnalyzerError};
pub use config::{AnalyzerConfig, Config, ConfigError, OutputConfig, RuleConfig};
pub use project::{Project, ProjectError, ProjectOptions};
pub use rule::{Rule, RuleBox};
pub use syntax::{Descendants, Dialect, SourceFile, SyntaxError, SyntaxNode};
pub use types::{
    AnalysisResult, LogEntry, Reason, RuleMeta, RuleReport, RuleResult, Severity, DEFAULT_TITLE,
};
