//! Syntax tree facade over Tree-sitter.
//!
//! Rules never touch `tree_sitter` directly. They receive a [`SyntaxNode`],
//! a cheap borrowed view that knows its [`SourceFile`] and exposes the
//! handful of queries call-site rules need: kind tests, source text,
//! call structure and the ancestor chain.

use std::fmt;
use std::path::{Path, PathBuf};

use tree_sitter::{Language, Node, Parser, Tree, TreeCursor};

/// Grammar used to parse a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Plain TypeScript (`.ts`, `.mts`, `.cts`).
    TypeScript,
    /// TypeScript with JSX. Also used for JavaScript sources.
    Tsx,
}

impl Dialect {
    /// Picks the grammar for a path from its extension.
    ///
    /// Returns `None` for files the analyzer does not understand.
    #[must_use]
    pub fn for_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str())? {
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" | "js" | "jsx" | "mjs" | "cjs" => Some(Self::Tsx),
            _ => None,
        }
    }

    fn language(self) -> Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeScript => write!(f, "typescript"),
            Self::Tsx => write!(f, "tsx"),
        }
    }
}

/// Errors produced while turning source text into a syntax tree.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    /// The grammar could not be loaded into the parser.
    #[error("failed to load {dialect} grammar: {message}")]
    Language {
        /// Grammar that failed.
        dialect: Dialect,
        /// Loader message.
        message: String,
    },

    /// The parser gave up without producing a tree.
    #[error("parser produced no tree for {path}")]
    NoTree {
        /// File being parsed.
        path: PathBuf,
    },

    /// The tree contains syntax errors.
    #[error("syntax error in {path} at {line}:{column}")]
    Invalid {
        /// File being parsed.
        path: PathBuf,
        /// Line of the first error node (1-indexed).
        line: usize,
        /// Column of the first error node (1-indexed).
        column: usize,
    },
}

/// A parsed source file. Owns both the text and the tree.
pub struct SourceFile {
    path: PathBuf,
    relative_path: PathBuf,
    dialect: Dialect,
    source: String,
    tree: Tree,
}

impl SourceFile {
    /// Parses `source` with the given dialect.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::Invalid`] if the tree contains error or
    /// missing nodes, since a half-parsed file has no defined meaning
    /// for the analysis.
    pub fn parse(
        path: impl Into<PathBuf>,
        relative_path: impl Into<PathBuf>,
        source: String,
        dialect: Dialect,
    ) -> Result<Self, SyntaxError> {
        let path = path.into();

        let mut parser = Parser::new();
        parser
            .set_language(&dialect.language())
            .map_err(|e| SyntaxError::Language {
                dialect,
                message: e.to_string(),
            })?;

        let tree = parser
            .parse(source.as_bytes(), None)
            .ok_or_else(|| SyntaxError::NoTree { path: path.clone() })?;

        if tree.root_node().has_error() {
            let (line, column) = first_error_position(tree.root_node());
            return Err(SyntaxError::Invalid { path, line, column });
        }

        Ok(Self {
            path,
            relative_path: relative_path.into(),
            dialect,
            source,
            tree,
        })
    }

    /// Path the file was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the project root.
    #[must_use]
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Grammar the file was parsed with.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Full source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The `program` node.
    #[must_use]
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode {
            node: self.tree.root_node(),
            file: self,
        }
    }

    /// Every named node below the root, depth-first in document order.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        self.root().descendants()
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path)
            .field("dialect", &self.dialect)
            .field("bytes", &self.source.len())
            .finish_non_exhaustive()
    }
}

fn first_error_position(root: Node<'_>) -> (usize, usize) {
    let mut cursor = root.walk();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return (pos.row + 1, pos.column + 1);
        }
        if node.has_error() {
            let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    let pos = root.start_position();
    (pos.row + 1, pos.column + 1)
}

/// Borrowed view of one syntax node.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'a> {
    node: Node<'a>,
    file: &'a SourceFile,
}

impl<'a> SyntaxNode<'a> {
    fn wrap(&self, node: Node<'a>) -> Self {
        Self {
            node,
            file: self.file,
        }
    }

    /// The file this node belongs to.
    #[must_use]
    pub fn file(&self) -> &'a SourceFile {
        self.file
    }

    /// Grammar kind, e.g. `call_expression`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.node.kind()
    }

    /// Returns true if the node has the given grammar kind.
    #[must_use]
    pub fn is_kind(&self, kind: &str) -> bool {
        self.node.kind() == kind
    }

    /// Raw source text covered by the node.
    #[must_use]
    pub fn text(&self) -> &'a str {
        self.file.source.get(self.node.byte_range()).unwrap_or("")
    }

    /// Line number (1-indexed).
    #[must_use]
    pub fn line(&self) -> usize {
        self.node.start_position().row + 1
    }

    /// Column number (1-indexed).
    #[must_use]
    pub fn column(&self) -> usize {
        self.node.start_position().column + 1
    }

    /// `f(x)`, `a.b(x)`, `a?.b(x)`.
    #[must_use]
    pub fn is_call_expression(&self) -> bool {
        self.is_kind("call_expression")
    }

    /// `{ a: 1, b }`.
    #[must_use]
    pub fn is_object_literal(&self) -> bool {
        self.is_kind("object")
    }

    /// `catch (e) { ... }`.
    #[must_use]
    pub fn is_catch_clause(&self) -> bool {
        self.is_kind("catch_clause")
    }

    /// `(x) => ...`.
    #[must_use]
    pub fn is_arrow_function(&self) -> bool {
        self.is_kind("arrow_function")
    }

    /// `a.b`.
    #[must_use]
    pub fn is_member_expression(&self) -> bool {
        self.is_kind("member_expression")
    }

    /// `new Foo(x)`.
    #[must_use]
    pub fn is_new_expression(&self) -> bool {
        self.is_kind("new_expression")
    }

    /// Child stored under a grammar field name (`function`, `object`, ...).
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Self> {
        self.node.child_by_field_name(name).map(|n| self.wrap(n))
    }

    /// Named children in source order, comments skipped.
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        let mut cursor = self.node.walk();
        self.node
            .named_children(&mut cursor)
            .filter(|n| n.kind() != "comment")
            .map(|n| self.wrap(n))
            .collect()
    }

    /// Named nodes below this one, depth-first in document order.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants {
            cursor: self.node.walk(),
            file: self.file,
            depth: 0,
            done: false,
        }
    }

    /// Enclosing node, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.node.parent().map(|n| self.wrap(n))
    }

    /// Enclosing nodes, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode<'a>> {
        std::iter::successors(self.parent(), SyntaxNode::parent)
    }

    /// Nearest enclosing node that satisfies `pred`.
    #[must_use]
    pub fn first_ancestor(&self, pred: impl Fn(&SyntaxNode<'a>) -> bool) -> Option<Self> {
        self.ancestors().find(|a| pred(a))
    }

    /// The invoked expression of a call (`a.b` in `a.b(x)`) or the
    /// constructor of a `new` expression.
    #[must_use]
    pub fn callee(&self) -> Option<Self> {
        match self.kind() {
            "call_expression" => self.field("function"),
            "new_expression" => self.field("constructor"),
            _ => None,
        }
    }

    /// Arguments of a call or `new` expression, in order.
    ///
    /// Tagged templates and argument-less `new Foo` yield an empty list.
    #[must_use]
    pub fn arguments(&self) -> Vec<Self> {
        if !self.is_call_expression() && !self.is_new_expression() {
            return Vec::new();
        }
        match self.field("arguments") {
            Some(args) if args.is_kind("arguments") => args.children(),
            _ => Vec::new(),
        }
    }

    /// Content of a string literal without its quotes, as written.
    #[must_use]
    pub fn string_value(&self) -> Option<&'a str> {
        let quoted = match self.kind() {
            "string" => self.text(),
            "template_string"
                if !self
                    .children()
                    .iter()
                    .any(|c| c.is_kind("template_substitution")) =>
            {
                self.text()
            }
            _ => return None,
        };
        let mut chars = quoted.chars();
        chars.next()?;
        chars.next_back()?;
        Some(chars.as_str())
    }
}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}:{}:{}",
            self.kind(),
            self.file.relative_path.display(),
            self.line(),
            self.column()
        )
    }
}

/// Pre-order iterator over named descendants. See [`SyntaxNode::descendants`].
pub struct Descendants<'a> {
    cursor: TreeCursor<'a>,
    file: &'a SourceFile,
    depth: usize,
    done: bool,
}

impl Descendants<'_> {
    fn advance(&mut self) -> bool {
        if self.cursor.goto_first_child() {
            self.depth += 1;
            return true;
        }
        loop {
            if self.depth == 0 {
                return false;
            }
            if self.cursor.goto_next_sibling() {
                return true;
            }
            self.cursor.goto_parent();
            self.depth -= 1;
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = SyntaxNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if !self.advance() {
                self.done = true;
                break;
            }
            let node = self.cursor.node();
            if node.is_named() {
                return Some(SyntaxNode {
                    node,
                    file: self.file,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> SourceFile {
        SourceFile::parse("test.ts", "test.ts", src.to_string(), Dialect::TypeScript)
            .expect("test source should parse")
    }

    #[test]
    fn dialect_from_extension() {
        assert_eq!(
            Dialect::for_path(Path::new("a/b.ts")),
            Some(Dialect::TypeScript)
        );
        assert_eq!(Dialect::for_path(Path::new("a/b.tsx")), Some(Dialect::Tsx));
        assert_eq!(Dialect::for_path(Path::new("a/b.js")), Some(Dialect::Tsx));
        assert_eq!(Dialect::for_path(Path::new("a/b.rs")), None);
        assert_eq!(Dialect::for_path(Path::new("Makefile")), None);
    }

    #[test]
    fn rejects_broken_source() {
        let err = SourceFile::parse(
            "bad.ts",
            "bad.ts",
            "const x = ;".to_string(),
            Dialect::TypeScript,
        )
        .unwrap_err();
        assert!(matches!(err, SyntaxError::Invalid { line: 1, .. }));
    }

    #[test]
    fn descendants_are_in_document_order() {
        let file = parse("foo(1);\nbar(2);\n");
        let calls: Vec<&str> = file
            .descendants()
            .filter(SyntaxNode::is_call_expression)
            .map(|n| n.text())
            .collect();
        assert_eq!(calls, vec!["foo(1)", "bar(2)"]);
    }

    #[test]
    fn descendants_visit_nested_calls_outer_first() {
        let file = parse("outer(inner(1));");
        let calls: Vec<&str> = file
            .descendants()
            .filter(SyntaxNode::is_call_expression)
            .map(|n| n.text())
            .collect();
        assert_eq!(calls, vec!["outer(inner(1))", "inner(1)"]);
    }

    #[test]
    fn descendants_exclude_root() {
        let file = parse("x;");
        assert!(file.descendants().all(|n| n.kind() != "program"));
    }

    #[test]
    fn call_structure() {
        let file = parse("Service.send({ a: 1 }, 'x');");
        let call = file
            .descendants()
            .find(SyntaxNode::is_call_expression)
            .expect("call present");
        let callee = call.callee().expect("callee present");
        assert!(callee.is_member_expression());
        assert_eq!(callee.text(), "Service.send");
        let args = call.arguments();
        assert_eq!(args.len(), 2);
        assert!(args[0].is_object_literal());
        assert_eq!(args[1].string_value(), Some("x"));
    }

    #[test]
    fn string_value_strips_quotes() {
        let file = parse("f(\"double\", `tpl`, `a${b}`);");
        let call = file
            .descendants()
            .find(SyntaxNode::is_call_expression)
            .expect("call present");
        let values: Vec<Option<&str>> = call.arguments().iter().map(|a| a.string_value()).collect();
        assert_eq!(values, vec![Some("double"), Some("tpl"), None]);
    }

    #[test]
    fn ancestors_nearest_first() {
        let file = parse("try { go(); } catch (e) { const f = () => { report(); }; }");
        let call = file
            .descendants()
            .filter(SyntaxNode::is_call_expression)
            .find(|n| n.text() == "report()")
            .expect("call present");
        let arrow = call
            .first_ancestor(SyntaxNode::is_arrow_function)
            .expect("arrow present");
        let catch = call
            .first_ancestor(SyntaxNode::is_catch_clause)
            .expect("catch present");
        assert!(arrow.text().starts_with("() =>"));
        assert!(catch.text().starts_with("catch (e)"));
        assert_eq!(call.ancestors().last().map(|n| n.kind()), Some("program"));
    }

    #[test]
    fn children_skip_comments() {
        let file = parse("f({\n  // note\n  a: 1,\n  b,\n});");
        let object = file
            .descendants()
            .find(SyntaxNode::is_object_literal)
            .expect("object present");
        let kinds: Vec<&str> = object.children().iter().map(SyntaxNode::kind).collect();
        assert_eq!(kinds, vec!["pair", "shorthand_property_identifier"]);
    }

    #[test]
    fn tsx_dialect_parses_jsx() {
        let file = SourceFile::parse(
            "a.tsx",
            "a.tsx",
            "const v = <Main onClick={() => go()} />;".to_string(),
            Dialect::Tsx,
        )
        .expect("tsx should parse");
        assert!(file.descendants().any(|n| n.is_arrow_function()));
    }
}
