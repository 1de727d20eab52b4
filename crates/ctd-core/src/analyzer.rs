//! Core analyzer for orchestrating rule execution.

use crate::config::Config;
use crate::project::{Project, ProjectError, ProjectOptions};
use crate::rule::{Rule, RuleBox};
use crate::syntax::SourceFile;
use crate::types::AnalysisResult;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error resolving the root.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Project discovery or parsing failed.
    #[error(transparent)]
    Project(#[from] ProjectError),
}

/// Runs every rule on every named node of every file and folds the results.
///
/// Files are visited in project order, nodes depth-first in document order,
/// rules in slice order. Every rule gets a report, even when it matches
/// nothing.
#[must_use]
pub fn analyze_project(project: &Project, rules: &[RuleBox]) -> AnalysisResult {
    let mut result = AnalysisResult::new();
    for rule in rules {
        result.register(rule.meta());
    }

    for file in project.files() {
        analyze_file(&mut result, file, rules);
        result.files_analyzed += 1;
    }

    result
}

fn analyze_file(result: &mut AnalysisResult, file: &SourceFile, rules: &[RuleBox]) {
    debug!("Analyzing: {}", file.relative_path().display());

    for node in file.descendants() {
        for rule in rules {
            let partial = rule.execute(&node);
            if !partial.is_empty() {
                result.merge(rule.meta(), partial);
            }
        }
    }
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    skip_invalid_files: Option<bool>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several boxed rules, keeping their order.
    #[must_use]
    pub fn rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = RuleBox>,
    {
        self.rules.extend(rules);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets whether unparsable files are skipped (default: from config, else false).
    #[must_use]
    pub fn skip_invalid_files(mut self, skip: bool) -> Self {
        self.skip_invalid_files = Some(skip);
        self
    }

    /// Builds the analyzer.
    ///
    /// Rules disabled in the configuration are dropped here.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be resolved.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut options = config.analyzer.project_options();
        options.exclude.extend(self.exclude_patterns);
        if let Some(skip) = self.skip_invalid_files {
            options.skip_invalid_files = skip;
        }

        let rules = self
            .rules
            .into_iter()
            .filter(|rule| {
                let enabled = config.is_rule_enabled(rule.key());
                if !enabled {
                    debug!("Skipping disabled rule: {}", rule.key());
                }
                enabled
            })
            .collect();

        Ok(Analyzer {
            root,
            rules,
            options,
        })
    }
}

/// The main analyzer that orchestrates rule execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    options: ProjectOptions,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the active rules in execution order.
    #[must_use]
    pub fn rules(&self) -> &[RuleBox] {
        &self.rules
    }

    /// Returns the number of active rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Loads the project under the root and analyzes it.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery, reading, or parsing fails.
    pub fn analyze(&self) -> Result<AnalysisResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let project = Project::load(&self.root, &self.options)?;
        info!("Found {} files to analyze", project.len());

        Ok(self.analyze_loaded(&project))
    }

    /// Analyzes an already loaded project.
    #[must_use]
    pub fn analyze_loaded(&self, project: &Project) -> AnalysisResult {
        let result = analyze_project(project, &self.rules);

        info!(
            "Analysis complete: {} entries from {} rule(s) in {} file(s)",
            result.total_entries(),
            self.rules.len(),
            result.files_analyzed
        );

        result
    }
}
