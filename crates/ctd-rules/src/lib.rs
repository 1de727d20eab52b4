//! # ctd-rules
//!
//! Built-in call-site rules for ctd, and the registry that assembles the
//! active rule set.
//!
//! ## Available Rules
//!
//! | Key | Receiver | Columns |
//! |-----|----------|---------|
//! | `findCrashAnalyticService` | `CrashAnalyticsService` | Error message, Severity, Reason |
//!
//! Further rules of the same shape can be declared as `[[plugins]]` in
//! `ctd.toml`; see [`RuleRegistry`].
//!
//! ## Usage
//!
//! ```ignore
//! use ctd_core::{Analyzer, Config};
//! use ctd_rules::{builtin_rules, RuleRegistry};
//!
//! let config = Config::default();
//! let rules = RuleRegistry::new().builtins(builtin_rules(&config)).build();
//! let analyzer = Analyzer::builder()
//!     .root("./app")
//!     .config(config)
//!     .rules(rules)
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod arguments;
mod invocation;
mod presets;
mod reason;
mod registry;
mod severity;

pub use arguments::{ArgumentTemplates, ExtractedFields};
pub use invocation::{InvocationPattern, InvocationRule};
pub use presets::{
    all_rules, builtin_rules, find_crash_analytic_service, CRASH_ANALYTICS_RECEIVER,
    FIND_CRASH_ANALYTIC_SERVICE,
};
pub use reason::{context_text, ReasonMarkers};
pub use registry::{load_candidates, PluginExecute, PluginMeta, RegistryError, RuleCandidate, RuleRegistry};
pub use severity::{classify_method, method_name, REPORTING_METHODS};

/// Re-export core types for convenience.
pub use ctd_core::{LogEntry, Reason, Rule, Severity};
