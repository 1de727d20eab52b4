//! Built-in rules.

use crate::invocation::{InvocationPattern, InvocationRule};
use ctd_core::{Config, RuleBox, RuleMeta};
use tracing::warn;

/// Key of the crash analytics rule.
pub const FIND_CRASH_ANALYTIC_SERVICE: &str = "findCrashAnalyticService";

/// Receiver the crash analytics rule matches by default.
pub const CRASH_ANALYTICS_RECEIVER: &str = "CrashAnalyticsService";

/// Reporting calls on `CrashAnalyticsService`, grouped by error tag.
///
/// Columns: error message, severity and reason.
#[must_use]
pub fn find_crash_analytic_service() -> InvocationRule {
    crash_analytic_service(InvocationPattern::new(CRASH_ANALYTICS_RECEIVER))
}

fn crash_analytic_service(pattern: InvocationPattern) -> InvocationRule {
    InvocationRule::new(
        RuleMeta::new(
            FIND_CRASH_ANALYTIC_SERVICE,
            ["Error message", "Severity", "Reason"],
            ["title", "severity", "reason"],
            format!("{FIND_CRASH_ANALYTIC_SERVICE}.md"),
        ),
        pattern,
    )
    .with_description("Crash analytics reporting calls, grouped by error tag")
}

/// Returns the built-in rules with `[rules.<key>]` options applied.
///
/// Recognised options: `receiver` (string) and `methods` (array of strings).
/// A blank `receiver` is ignored with a warning.
/// Disabled rules are still returned; the analyzer drops them.
#[must_use]
pub fn builtin_rules(config: &Config) -> Vec<RuleBox> {
    let pattern = crash_analytics_pattern(config);
    vec![Box::new(crash_analytic_service(pattern))]
}

fn crash_analytics_pattern(config: &Config) -> InvocationPattern {
    let mut pattern = InvocationPattern::new(CRASH_ANALYTICS_RECEIVER);
    let Some(rule_config) = config.rule(FIND_CRASH_ANALYTIC_SERVICE) else {
        return pattern;
    };

    let receiver = rule_config.get_str("receiver", CRASH_ANALYTICS_RECEIVER).trim();
    if receiver.is_empty() {
        warn!(
            "Ignoring empty receiver for '{FIND_CRASH_ANALYTIC_SERVICE}', using '{CRASH_ANALYTICS_RECEIVER}'"
        );
    } else {
        pattern.receiver = receiver.to_string();
    }

    let methods = rule_config.get_str_array("methods");
    if !methods.is_empty() {
        pattern = pattern.methods(methods);
    }
    pattern
}

/// Returns all built-in rules with their defaults.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![Box::new(find_crash_analytic_service())]
}
