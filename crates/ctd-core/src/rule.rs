//! Rule trait for defining call-site rules.

use crate::syntax::SyntaxNode;
use crate::types::{RuleMeta, RuleResult};

/// A rule that classifies individual syntax nodes.
///
/// The analyzer calls [`Rule::execute`] once for every named node of every
/// file. A rule answers for that node only, usually with zero or one
/// entry; merging across nodes is the analyzer's job. Rules hold no
/// mutable state between calls, and "no match" is an empty result, never
/// an error.
///
/// # Example
///
/// ```ignore
/// use ctd_core::{LogEntry, Rule, RuleMeta, RuleResult, Severity, SyntaxNode};
///
/// pub struct FindConsoleError {
///     meta: RuleMeta,
/// }
///
/// impl Rule for FindConsoleError {
///     fn meta(&self) -> &RuleMeta { &self.meta }
///
///     fn execute(&self, node: &SyntaxNode<'_>) -> RuleResult {
///         let mut result = RuleResult::new();
///         if node.is_call_expression()
///             && node.callee().is_some_and(|c| c.text() == "console.error")
///         {
///             let entry = LogEntry::new(Severity::Error, node.file().relative_path(), node.line());
///             result.entry(String::new()).or_default().push(entry);
///         }
///         result
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the rule's metadata.
    fn meta(&self) -> &RuleMeta;

    /// Returns the unique rule key (e.g., `findCrashAnalyticService`).
    fn key(&self) -> &str {
        &self.meta().key
    }

    /// Returns a brief description of what this rule finds.
    fn description(&self) -> &str {
        ""
    }

    /// Classifies a single node.
    ///
    /// # Returns
    ///
    /// Entries produced for this node, grouped by domain key.
    fn execute(&self, node: &SyntaxNode<'_>) -> RuleResult;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
