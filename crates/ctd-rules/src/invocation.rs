//! Rule reporting calls made on a named receiver.

use crate::arguments::ArgumentTemplates;
use crate::reason::{context_text, ReasonMarkers};
use crate::severity::{classify_method, method_name, REPORTING_METHODS};
use ctd_core::{LogEntry, Rule, RuleMeta, RuleResult, Severity, SyntaxNode};

/// What an [`InvocationRule`] looks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationPattern {
    /// Exact text of the callee's object (`CrashAnalyticsService`).
    pub receiver: String,
    /// Method names accepted on the receiver. Names without a severity are
    /// never reported.
    pub methods: Vec<String>,
    /// Templates for title and domain.
    pub templates: ArgumentTemplates,
    /// Markers used to classify informational calls.
    pub markers: ReasonMarkers,
}

impl InvocationPattern {
    /// Pattern for every reporting method on `receiver`, with default
    /// templates and markers.
    #[must_use]
    pub fn new(receiver: impl Into<String>) -> Self {
        Self {
            receiver: receiver.into(),
            methods: REPORTING_METHODS
                .iter()
                .map(|(name, _)| (*name).to_string())
                .collect(),
            templates: ArgumentTemplates::default(),
            markers: ReasonMarkers::default(),
        }
    }

    /// Restricts the accepted method names.
    #[must_use]
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the argument templates.
    #[must_use]
    pub fn templates(mut self, templates: ArgumentTemplates) -> Self {
        self.templates = templates;
        self
    }

    /// Replaces the reason markers.
    #[must_use]
    pub fn markers(mut self, markers: ReasonMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// Severity of a call on this pattern's receiver, if it is one.
    fn match_call(&self, node: &SyntaxNode<'_>) -> Option<Severity> {
        if !node.is_call_expression() {
            return None;
        }
        let callee = node.callee()?;
        if !callee.is_member_expression() {
            return None;
        }
        if callee.field("object")?.text() != self.receiver {
            return None;
        }

        let method = method_name(callee.text())?;
        if !self.methods.iter().any(|m| m == method) {
            return None;
        }
        classify_method(method)
    }
}

/// Turns every matching call into a [`LogEntry`] grouped by domain.
///
/// A call matches when its callee is `<receiver>.<method>` with a recognised
/// reporting method. Title and domain come from the argument templates;
/// only `info` calls get a reason from their surrounding code.
#[derive(Debug, Clone)]
pub struct InvocationRule {
    meta: RuleMeta,
    description: String,
    pattern: InvocationPattern,
}

impl InvocationRule {
    /// Creates a rule from its metadata and pattern.
    #[must_use]
    pub fn new(meta: RuleMeta, pattern: InvocationPattern) -> Self {
        let description = format!("Reporting calls on `{}`", pattern.receiver);
        Self {
            meta,
            description,
            pattern,
        }
    }

    /// Sets the description shown by `list-rules`.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The pattern this rule matches.
    #[must_use]
    pub fn pattern(&self) -> &InvocationPattern {
        &self.pattern
    }

    fn entry(&self, node: &SyntaxNode<'_>, severity: Severity) -> LogEntry {
        let mut entry = LogEntry::new(severity, node.file().relative_path(), node.line());

        let fields = self.pattern.templates.extract(&node.arguments());
        if let Some(title) = fields.title {
            entry.title = title;
        }
        if let Some(domain) = fields.domain {
            entry.domain = domain;
        }

        if severity == Severity::Info {
            entry.reason = self
                .pattern
                .markers
                .classify(context_text(node), &entry.title);
        }

        entry
    }
}

impl Rule for InvocationRule {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn execute(&self, node: &SyntaxNode<'_>) -> RuleResult {
        let mut result = RuleResult::new();
        if let Some(severity) = self.pattern.match_call(node) {
            let entry = self.entry(node, severity);
            result.entry(entry.domain.clone()).or_default().push(entry);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctd_core::{Dialect, Reason, SourceFile};

    fn rule() -> InvocationRule {
        InvocationRule::new(
            RuleMeta::new("calls", ["Title"], ["title"], "calls.md"),
            InvocationPattern::new("Service"),
        )
    }

    fn run(rule: &InvocationRule, src: &str) -> Vec<LogEntry> {
        let file = SourceFile::parse("app.ts", "app.ts", src.to_string(), Dialect::TypeScript)
            .expect("test source should parse");
        file.descendants()
            .flat_map(|node| rule.execute(&node).into_values().flatten())
            .collect()
    }

    #[test]
    fn fallback_lookup_is_classified() {
        let entries = run(
            &rule(),
            "Service.sendInfo({ error: new Error('lookup failed'), tag: ErrorTag.Profile });",
        );
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.title, "lookup failed");
        assert_eq!(entry.domain, "Profile");
        assert_eq!(entry.severity, Severity::Info);
        assert_eq!(entry.reason, Reason::FallbackScreen);
        assert_eq!(entry.line, 1);
    }

    #[test]
    fn defaults_without_templates() {
        let entries = run(&rule(), "Service.sendError(err);");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, ctd_core::DEFAULT_TITLE);
        assert_eq!(entries[0].domain, "");
        assert_eq!(entries[0].reason, Reason::NoExceptionHandling);
    }

    #[test]
    fn only_info_gets_a_reason() {
        let src = "try { go(); } catch (e) { toast('x'); Service.sendWarning({ error: new Error('w') }); }";
        let entries = run(&rule(), src);
        assert_eq!(entries[0].severity, Severity::Warning);
        assert_eq!(entries[0].reason, Reason::NoExceptionHandling);
    }

    #[test]
    fn toast_in_catch_wins_over_title() {
        let src = "try { go(); } catch (e) { ToastService.show(); Service.sendInfo({ error: new Error('lookup failed') }); }";
        let entries = run(&rule(), src);
        assert_eq!(entries[0].reason, Reason::ToastShown);
    }

    #[test]
    fn other_receivers_and_methods_are_ignored() {
        let src = "Other.sendInfo({}); Service.send({}); sendInfo({}); this.Service.sendInfo({}); Service.sendInfo.call(x);";
        assert!(run(&rule(), src).is_empty());
    }

    #[test]
    fn chained_call_across_lines_matches() {
        let src = "Service\n  .sendError({ error: new Error('split') });";
        let entries = run(&rule(), src);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "split");
        assert_eq!(entries[0].severity, Severity::Error);
    }

    #[test]
    fn method_filter_applies() {
        let rule = InvocationRule::new(
            RuleMeta::new("calls", ["Title"], ["title"], "calls.md"),
            InvocationPattern::new("Service").methods(["sendError", "unknownMethod"]),
        );
        let entries = run(&rule, "Service.sendInfo({}); Service.unknownMethod({}); Service.sendError({});");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Error);
    }

    #[test]
    fn debug_calls_are_reported() {
        let entries = run(&rule(), "Service.debug({ tag: ErrorTag.Cart });");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Debug);
        assert_eq!(entries[0].domain, "Cart");
    }

    #[test]
    fn non_matching_node_yields_empty_result() {
        let file = SourceFile::parse("a.ts", "a.ts", "let x = 1;".to_string(), Dialect::TypeScript)
            .unwrap();
        let rule = rule();
        assert!(file.descendants().all(|n| rule.execute(&n).is_empty()));
    }
}
