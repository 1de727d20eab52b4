//! Assembly of the active rule set.
//!
//! The active set is the built-in rules, then rules registered by the host,
//! then rules declared as `[[plugins]]` in configuration:
//!
//! ```toml
//! [[plugins]]
//! [plugins.meta]
//! key = "findLoggerCalls"
//! headers = ["Message", "Severity"]
//! header_keys = ["title", "severity"]
//! result_path = "findLoggerCalls.md"
//! [plugins.execute]
//! receiver = "Logger"
//! methods = ["sendError"]
//! ```
//!
//! A candidate is only accepted when it has both a `meta` and an `execute`
//! table. Rejected candidates never fail the assembly.

use crate::arguments::ArgumentTemplates;
use crate::invocation::{InvocationPattern, InvocationRule};
use crate::reason::ReasonMarkers;
use ctd_core::{RuleBox, RuleMeta};
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors reading plugin declarations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The declarations are not valid TOML or have the wrong types.
    #[error("Failed to parse plugin declarations: {message}")]
    Parse {
        /// Parser message.
        message: String,
    },
}

#[derive(Debug, Default, Deserialize)]
struct PluginsFile {
    #[serde(default)]
    plugins: Vec<RuleCandidate>,
}

/// An externally declared rule, before its shape is checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RuleCandidate {
    /// Rule metadata.
    #[serde(default)]
    pub meta: Option<PluginMeta>,
    /// What the rule matches.
    #[serde(default)]
    pub execute: Option<PluginExecute>,
}

/// The `meta` table of a plugin.
///
/// Missing fields are left empty here and rejected when the registry is
/// built, so one bad plugin does not fail the whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PluginMeta {
    /// Rule key.
    pub key: String,
    /// Column labels.
    pub headers: Vec<String>,
    /// Entry field per column.
    pub header_keys: Vec<String>,
    /// Output path for the rule's own report.
    pub result_path: String,
}

impl From<PluginMeta> for RuleMeta {
    fn from(table: PluginMeta) -> Self {
        RuleMeta::new(table.key, table.headers, table.header_keys, table.result_path)
    }
}

/// The `execute` table of a plugin: an invocation pattern.
///
/// Unset templates and markers fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PluginExecute {
    /// Receiver whose calls are reported.
    pub receiver: String,
    /// Accepted methods; all reporting methods when empty.
    pub methods: Vec<String>,
    /// Error constructor for the title template.
    pub error_constructor: Option<String>,
    /// Property name for the domain template.
    pub tag_field: Option<String>,
    /// Enumeration name for the domain template.
    pub tag_enum: Option<String>,
    /// Toast markers.
    pub toast: Option<Vec<String>>,
    /// Modal markers.
    pub modal: Option<Vec<String>>,
    /// Fallback title markers.
    pub fallback: Option<Vec<String>>,
    /// Shown by `list-rules`.
    pub description: Option<String>,
}

impl PluginExecute {
    fn into_pattern(self) -> (InvocationPattern, Option<String>) {
        let defaults = ArgumentTemplates::default();
        let templates = ArgumentTemplates {
            error_constructor: self
                .error_constructor
                .unwrap_or(defaults.error_constructor),
            tag_field: self.tag_field.unwrap_or(defaults.tag_field),
            tag_enum: self.tag_enum.unwrap_or(defaults.tag_enum),
        };

        let defaults = ReasonMarkers::default();
        let markers = ReasonMarkers {
            toast: self.toast.unwrap_or(defaults.toast),
            modal: self.modal.unwrap_or(defaults.modal),
            fallback: self.fallback.unwrap_or(defaults.fallback),
        };

        let mut pattern = InvocationPattern::new(self.receiver)
            .templates(templates)
            .markers(markers);
        if !self.methods.is_empty() {
            pattern = pattern.methods(self.methods);
        }
        (pattern, self.description)
    }
}

/// Reads every `[[plugins]]` entry of a TOML document.
///
/// Other tables in the document are ignored, so a whole `ctd.toml` can be
/// passed in.
///
/// # Errors
///
/// Returns an error if the document does not parse.
pub fn load_candidates(content: &str) -> Result<Vec<RuleCandidate>, RegistryError> {
    let file: PluginsFile = toml::from_str(content).map_err(|e| RegistryError::Parse {
        message: e.to_string(),
    })?;
    Ok(file.plugins)
}

/// Builder for the active rule set.
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<RuleBox>,
    candidates: Vec<RuleCandidate>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the built-in rules.
    #[must_use]
    pub fn builtins<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = RuleBox>,
    {
        self.rules.extend(rules);
        self
    }

    /// Adds a rule supplied by the host.
    #[must_use]
    pub fn register(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds declared plugin candidates.
    #[must_use]
    pub fn candidates<I>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = RuleCandidate>,
    {
        self.candidates.extend(candidates);
        self
    }

    /// Returns the active rules in registration order.
    ///
    /// Candidates without `meta` or `execute` are dropped quietly. Candidates
    /// with malformed metadata, no receiver, or a key already in use are
    /// dropped with a warning. Host rules are never dropped.
    #[must_use]
    pub fn build(self) -> Vec<RuleBox> {
        let mut keys: HashSet<String> = self.rules.iter().map(|r| r.key().to_string()).collect();
        let mut rules = self.rules;

        for (index, candidate) in self.candidates.into_iter().enumerate() {
            let (Some(meta), Some(execute)) = (candidate.meta, candidate.execute) else {
                debug!("Dropping plugin #{index}: missing meta or execute");
                continue;
            };
            let meta = RuleMeta::from(meta);

            if !meta.is_well_formed() {
                warn!(
                    "Dropping plugin #{index} '{}': needs a key and one header key per header ({} headers, {} header keys)",
                    meta.key,
                    meta.headers.len(),
                    meta.header_keys.len()
                );
                continue;
            }
            if execute.receiver.trim().is_empty() {
                warn!("Dropping plugin '{}': execute.receiver is empty", meta.key);
                continue;
            }
            if !keys.insert(meta.key.clone()) {
                warn!("Dropping plugin '{}': rule key already registered", meta.key);
                continue;
            }

            debug!("Registering plugin '{}' on '{}'", meta.key, execute.receiver);
            let (pattern, description) = execute.into_pattern();
            let mut rule = InvocationRule::new(meta, pattern);
            if let Some(description) = description {
                rule = rule.with_description(description);
            }
            rules.push(Box::new(rule));
        }

        rules
    }
}
