//! Core types for classified call sites and aggregated results.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Title used when no error message could be extracted from a call.
pub const DEFAULT_TITLE: &str = "MapToError";

/// Severity of a reporting call, derived from the invoked method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    /// `sendError`.
    Error,
    /// `sendWarning`.
    Warning,
    /// `sendInfo`. The only severity whose context is inspected.
    Info,
    /// `debug`.
    Debug,
    /// `sendUnhandledError`.
    UnhandledError,
}

impl Severity {
    /// Label used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::UnhandledError => "unhandledError",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a reporting call happened, judged from its surrounding code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reason {
    /// No recovery path was looked for.
    #[default]
    NoExceptionHandling,
    /// A toast or snackbar is shown nearby.
    ToastShown,
    /// A modal or alert is shown nearby.
    ModalShown,
    /// The title marks a failed lookup with a fallback screen.
    FallbackScreen,
    /// Nothing user-facing; the call only keeps a record.
    RecordKeeping,
}

impl Reason {
    /// Label used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoExceptionHandling => "no exception handling",
            Self::ToastShown => "toast shown",
            Self::ModalShown => "modal shown",
            Self::FallbackScreen => "fallback screen shown",
            Self::RecordKeeping => "logged for record-keeping",
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified reporting call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Error message extracted from the call, or [`DEFAULT_TITLE`].
    pub title: String,
    /// Severity derived from the method name.
    pub severity: Severity,
    /// Domain tag, empty when none was found.
    pub domain: String,
    /// Why the call happened.
    pub reason: Reason,
    /// File containing the call, relative to the project root.
    pub file: PathBuf,
    /// Line of the call (1-indexed).
    pub line: usize,
}

impl LogEntry {
    /// Creates an entry with the default title, domain and reason.
    #[must_use]
    pub fn new(severity: Severity, file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            severity,
            domain: String::new(),
            reason: Reason::default(),
            file: file.into(),
            line,
        }
    }

    /// Resolves a report column key to its display text.
    ///
    /// Returns `None` for keys the entry does not carry.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<String> {
        match key {
            "title" => Some(self.title.clone()),
            "severity" => Some(self.severity.to_string()),
            "domain" => Some(self.domain.clone()),
            "reason" => Some(self.reason.to_string()),
            "file" => Some(self.file.display().to_string()),
            "line" => Some(self.line.to_string()),
            "location" => Some(format!("{}:{}", self.file.display(), self.line)),
            _ => None,
        }
    }
}

/// Static description of a rule and of its report table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMeta {
    /// Unique rule key, also the report section title.
    pub key: String,
    /// Column labels, in order.
    pub headers: Vec<String>,
    /// Entry field for each column, aligned with `headers`.
    pub header_keys: Vec<String>,
    /// Suggested output path for this rule's own report.
    pub result_path: String,
}

impl RuleMeta {
    /// Creates rule metadata.
    #[must_use]
    pub fn new<H, K>(
        key: impl Into<String>,
        headers: H,
        header_keys: K,
        result_path: impl Into<String>,
    ) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        Self {
            key: key.into(),
            headers: headers.into_iter().map(Into::into).collect(),
            header_keys: header_keys.into_iter().map(Into::into).collect(),
            result_path: result_path.into(),
        }
    }

    /// A usable meta has a key and one field per column.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.key.trim().is_empty() && self.headers.len() == self.header_keys.len()
    }
}

/// Entries produced by one rule, grouped by domain key in first-seen order.
pub type RuleResult = IndexMap<String, Vec<LogEntry>>;

/// Everything one rule contributed to an analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleReport {
    /// Metadata of the rule.
    pub meta: RuleMeta,
    /// Entries grouped by domain key.
    pub result: RuleResult,
}

impl RuleReport {
    /// Creates an empty report for a rule.
    #[must_use]
    pub fn new(meta: RuleMeta) -> Self {
        Self {
            meta,
            result: RuleResult::new(),
        }
    }

    /// Number of entries across all domains.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.result.values().map(Vec::len).sum()
    }
}

/// Aggregate of one analysis run, keyed by rule key in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Reports keyed by rule key.
    pub reports: IndexMap<String, RuleReport>,
    /// Number of files traversed.
    pub files_analyzed: usize,
}

impl AnalysisResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures a report exists for the rule. Existing reports are kept.
    pub fn register(&mut self, meta: &RuleMeta) {
        if !self.reports.contains_key(&meta.key) {
            self.reports
                .insert(meta.key.clone(), RuleReport::new(meta.clone()));
        }
    }

    /// Appends a rule's partial result for one node.
    ///
    /// Entries are appended under their domain key; nothing is merged or
    /// deduplicated.
    pub fn merge(&mut self, meta: &RuleMeta, partial: RuleResult) {
        self.register(meta);
        let Some(report) = self.reports.get_mut(&meta.key) else {
            return;
        };
        for (domain, entries) in partial {
            report.result.entry(domain).or_default().extend(entries);
        }
    }

    /// Report for a rule key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RuleReport> {
        self.reports.get(key)
    }

    /// Reports in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RuleReport> {
        self.reports.values()
    }

    /// Total number of entries across all rules.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.reports.values().map(RuleReport::entry_count).sum()
    }

    /// Returns true if no rule produced any entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_entries() == 0
    }
}
