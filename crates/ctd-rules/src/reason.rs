//! Classification of why an informational report was sent.
//!
//! The surrounding code is the nearest enclosing `catch` clause, or failing
//! that the nearest enclosing arrow function. Its text is searched for
//! markers of a user-facing recovery, in a fixed priority order:
//!
//! 1. toast or snackbar
//! 2. modal or alert
//! 3. a title that names a failed lookup (fallback screen)
//! 4. otherwise the report only keeps a record

use ctd_core::{Reason, SyntaxNode};

/// Substrings that identify each recovery kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonMarkers {
    /// Matched against the context text.
    pub toast: Vec<String>,
    /// Matched against the context text.
    pub modal: Vec<String>,
    /// Matched against the entry title.
    pub fallback: Vec<String>,
}

impl Default for ReasonMarkers {
    fn default() -> Self {
        Self {
            toast: vec!["ToastService".to_string(), "toast".to_string()],
            modal: vec!["alert".to_string()],
            fallback: vec!["lookup failed".to_string(), "조회 실패".to_string()],
        }
    }
}

impl ReasonMarkers {
    /// Picks the reason for a call given its context text and title.
    #[must_use]
    pub fn classify(&self, context: &str, title: &str) -> Reason {
        if contains_any(context, &self.toast) {
            Reason::ToastShown
        } else if contains_any(context, &self.modal) {
            Reason::ModalShown
        } else if contains_any(title, &self.fallback) {
            Reason::FallbackScreen
        } else {
            Reason::RecordKeeping
        }
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|n| !n.is_empty() && haystack.contains(n.as_str()))
}

/// Text of the code region that handles the call.
///
/// Empty when the call is neither inside a `catch` clause nor inside an
/// arrow function.
#[must_use]
pub fn context_text<'a>(node: &SyntaxNode<'a>) -> &'a str {
    node.first_ancestor(SyntaxNode::is_catch_clause)
        .or_else(|| node.first_ancestor(SyntaxNode::is_arrow_function))
        .map_or("", |region| region.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctd_core::{Dialect, SourceFile};

    fn context_of_report(src: &str) -> String {
        let file = SourceFile::parse("t.ts", "t.ts", src.to_string(), Dialect::TypeScript)
            .expect("test source should parse");
        let call = file
            .descendants()
            .filter(SyntaxNode::is_call_expression)
            .find(|n| n.text().starts_with("report("))
            .expect("report call present");
        context_text(&call).to_string()
    }

    #[test]
    fn toast_has_priority() {
        let markers = ReasonMarkers::default();
        assert_eq!(
            markers.classify("toast(); alert();", "lookup failed"),
            Reason::ToastShown
        );
    }

    #[test]
    fn modal_before_fallback() {
        let markers = ReasonMarkers::default();
        assert_eq!(
            markers.classify("window.alert('x')", "lookup failed"),
            Reason::ModalShown
        );
    }

    #[test]
    fn fallback_from_title() {
        let markers = ReasonMarkers::default();
        assert_eq!(
            markers.classify("", "profile lookup failed"),
            Reason::FallbackScreen
        );
        assert_eq!(
            markers.classify("", "고객 잔여 캐시 조회 실패"),
            Reason::FallbackScreen
        );
    }

    #[test]
    fn record_keeping_otherwise() {
        let markers = ReasonMarkers::default();
        assert_eq!(markers.classify("", "MapToError"), Reason::RecordKeeping);
    }

    #[test]
    fn fallback_marker_ignores_context() {
        let markers = ReasonMarkers::default();
        assert_eq!(
            markers.classify("lookup failed", "other"),
            Reason::RecordKeeping
        );
    }

    #[test]
    fn empty_markers_never_match() {
        let markers = ReasonMarkers {
            toast: vec![String::new()],
            modal: vec![],
            fallback: vec![],
        };
        assert_eq!(markers.classify("anything", "x"), Reason::RecordKeeping);
    }

    #[test]
    fn catch_clause_is_preferred() {
        let ctx = context_of_report(
            "const f = () => { try { go(); } catch (e) { report(e); } };",
        );
        assert_eq!(ctx, "catch (e) { report(e); }");
    }

    #[test]
    fn nearest_arrow_function_without_catch() {
        let ctx = context_of_report(
            "const outer = () => { const inner = async () => { report(1); }; toast(); };",
        );
        assert_eq!(ctx, "async () => { report(1); }");
    }

    #[test]
    fn empty_without_enclosing_region() {
        let ctx = context_of_report("function plain() { report(1); }\nreport(2);");
        assert_eq!(ctx, "");
    }
}
