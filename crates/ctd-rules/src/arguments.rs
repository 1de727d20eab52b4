//! Extraction of a title and a domain tag from reporting call arguments.
//!
//! Reporting calls conventionally take one object literal:
//!
//! ```ignore
//! CrashAnalyticsService.sendInfo({
//!     error: new Error('lookup failed'),   // title
//!     tag: ErrorTag.Profile,               // domain
//! });
//! ```
//!
//! Each property of the object is checked against two templates. Matching is
//! syntactic: the node shapes must line up, nothing is resolved. When a
//! template matches on several properties, the last one in source order wins.

use ctd_core::SyntaxNode;

/// Names that make up the two argument templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentTemplates {
    /// Constructor of the error object carrying the title (`new Error('...')`).
    pub error_constructor: String,
    /// Property holding the domain tag (`tag: ...`).
    pub tag_field: String,
    /// Enumeration the tag is read from (`ErrorTag.Member`).
    pub tag_enum: String,
}

impl Default for ArgumentTemplates {
    fn default() -> Self {
        Self {
            error_constructor: "Error".to_string(),
            tag_field: "tag".to_string(),
            tag_enum: "ErrorTag".to_string(),
        }
    }
}

/// Fields pulled out of a call's arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    /// Message of the constructed error, if any.
    pub title: Option<String>,
    /// Tag member name, if any.
    pub domain: Option<String>,
}

impl ArgumentTemplates {
    /// Scans every object-literal argument, property by property.
    #[must_use]
    pub fn extract(&self, args: &[SyntaxNode<'_>]) -> ExtractedFields {
        let mut fields = ExtractedFields::default();

        for arg in args.iter().filter(|a| a.is_object_literal()) {
            for child in arg.children() {
                if let Some(title) = self.error_message(&child) {
                    fields.title = Some(title.to_string());
                }
                if let Some(domain) = self.domain_tag(&child) {
                    fields.domain = Some(domain.to_string());
                }
            }
        }

        fields
    }

    /// Template A: the first `new <error_constructor>(<string>)` within `node`.
    #[must_use]
    pub fn error_message<'a>(&self, node: &SyntaxNode<'a>) -> Option<&'a str> {
        std::iter::once(*node)
            .chain(node.descendants())
            .find_map(|n| self.error_construction(&n))
    }

    /// Template B: the first `<tag_field>: <tag_enum>.<Member>` within `node`.
    #[must_use]
    pub fn domain_tag<'a>(&self, node: &SyntaxNode<'a>) -> Option<&'a str> {
        std::iter::once(*node)
            .chain(node.descendants())
            .find_map(|n| self.tag_pair(&n))
    }

    fn error_construction<'a>(&self, node: &SyntaxNode<'a>) -> Option<&'a str> {
        if !node.is_new_expression() || node.callee()?.text() != self.error_constructor {
            return None;
        }
        match node.arguments().as_slice() {
            [message] => message.string_value(),
            _ => None,
        }
    }

    fn tag_pair<'a>(&self, node: &SyntaxNode<'a>) -> Option<&'a str> {
        if !node.is_kind("pair") {
            return None;
        }

        let key = node.field("key")?;
        if key.string_value().unwrap_or_else(|| key.text()) != self.tag_field {
            return None;
        }

        let value = node.field("value")?;
        if !value.is_member_expression() {
            return None;
        }
        value
            .text()
            .strip_prefix(self.tag_enum.as_str())?
            .strip_prefix('.')
            .filter(|member| !member.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctd_core::{Dialect, SourceFile};

    fn with_args<T>(src: &str, f: impl FnOnce(&[SyntaxNode<'_>]) -> T) -> T {
        let file = SourceFile::parse("t.ts", "t.ts", src.to_string(), Dialect::TypeScript)
            .expect("test source should parse");
        let call = file
            .descendants()
            .find(SyntaxNode::is_call_expression)
            .expect("call present");
        f(&call.arguments())
    }

    fn extract(src: &str) -> ExtractedFields {
        with_args(src, |args| ArgumentTemplates::default().extract(args))
    }

    #[test]
    fn extracts_title_and_domain() {
        let fields = extract("S.sendInfo({ error: new Error('lookup failed'), tag: ErrorTag.Profile });");
        assert_eq!(fields.title.as_deref(), Some("lookup failed"));
        assert_eq!(fields.domain.as_deref(), Some("Profile"));
    }

    #[test]
    fn missing_templates_leave_fields_empty() {
        let fields = extract("S.sendError({ error: err, tag: 'x' });");
        assert_eq!(fields, ExtractedFields::default());
    }

    #[test]
    fn last_match_wins() {
        let fields = extract(
            "S.sendError({ error: new Error('first'), tag: ErrorTag.A, original: new Error('second'), tag2: 1, tag: ErrorTag.B });",
        );
        assert_eq!(fields.title.as_deref(), Some("second"));
        assert_eq!(fields.domain.as_deref(), Some("B"));
    }

    #[test]
    fn nested_values_are_found() {
        let fields = extract(
            "S.sendError({ meta: { cause: new Error(\"deep\"), tag: ErrorTag.Nested } });",
        );
        assert_eq!(fields.title.as_deref(), Some("deep"));
        assert_eq!(fields.domain.as_deref(), Some("Nested"));
    }

    #[test]
    fn non_object_arguments_are_ignored() {
        let fields = extract("S.sendError(new Error('positional'), ErrorTag.X);");
        assert_eq!(fields, ExtractedFields::default());
    }

    #[test]
    fn rejects_other_constructors_and_enums() {
        let fields = extract(
            "S.sendError({ error: new TypeError('nope'), tag: OtherTag.X, also: new Error(msg) });",
        );
        assert_eq!(fields, ExtractedFields::default());
    }

    #[test]
    fn quoted_tag_key_matches() {
        let fields = extract("S.sendError({ 'tag': ErrorTag.Quoted });");
        assert_eq!(fields.domain.as_deref(), Some("Quoted"));
    }

    #[test]
    fn custom_templates() {
        let templates = ArgumentTemplates {
            error_constructor: "AppError".to_string(),
            tag_field: "domain".to_string(),
            tag_enum: "Domain".to_string(),
        };
        let fields = with_args(
            "L.sendError({ error: new AppError('x'), domain: Domain.Billing });",
            |args| templates.extract(args),
        );
        assert_eq!(fields.title.as_deref(), Some("x"));
        assert_eq!(fields.domain.as_deref(), Some("Billing"));
    }
}
