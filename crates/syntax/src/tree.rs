use context_code_window::{Language, Position};
use serde::Serialize;
use std::collections::HashSet;

/// Node kinds that invoke or instantiate something, across the supported grammars.
pub const CALL_NODE_KINDS: &[&str] = &[
    "call_expression",            // javascript, typescript, rust
    "method_invocation",          // java
    "call",                       // python
    "new_expression",             // javascript, typescript
    "object_creation_expression", // java
];

const IDENTIFIER_KINDS: &[&str] = &["identifier", "type_identifier"];

fn import_kinds(language: Language) -> &'static [&'static str] {
    match language {
        Language::Rust => &["use_declaration", "extern_crate_declaration"],
        Language::Python => &["import_statement", "import_from_statement"],
        Language::JavaScript | Language::TypeScript => &["import_statement"],
        Language::Java => &["import_declaration"],
        Language::Go => &["import_declaration"],
        Language::Notebook | Language::Unknown => &[],
    }
}

/// A named syntax node with byte and line/column spans
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxNode {
    pub kind: String,
    pub start_byte: usize,
    pub end_byte: usize,
    pub start: Position,
    pub end: Position,
    /// Index of the parent node in [`SyntaxTree::nodes`]
    pub parent: Option<usize>,
}

impl SyntaxNode {
    pub fn new(
        kind: impl Into<String>,
        start_byte: usize,
        end_byte: usize,
        start: Position,
        end: Position,
        parent: Option<usize>,
    ) -> Self {
        Self {
            kind: kind.into(),
            start_byte,
            end_byte,
            start,
            end,
            parent,
        }
    }

    /// Whether this node calls a function or constructs an object
    #[must_use]
    pub fn is_call(&self) -> bool {
        CALL_NODE_KINDS.contains(&self.kind.as_str())
    }

    #[must_use]
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start_byte <= offset && offset <= self.end_byte
    }

    fn encloses(&self, other: &SyntaxNode) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }
}

/// Owned syntax tree: named nodes in pre-order, root first.
#[derive(Debug, Clone, Serialize)]
pub struct SyntaxTree {
    language: Language,
    source: String,
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    /// Build a tree from pre-ordered nodes whose parents precede them.
    pub fn from_nodes(
        language: Language,
        source: impl Into<String>,
        nodes: Vec<SyntaxNode>,
    ) -> Self {
        Self {
            language,
            source: source.into(),
            nodes,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn nodes(&self) -> &[SyntaxNode] {
        &self.nodes
    }

    pub fn root(&self) -> Option<&SyntaxNode> {
        self.nodes.first()
    }

    /// Source text covered by `node`
    pub fn text(&self, node: &SyntaxNode) -> &str {
        self.source
            .get(node.start_byte..node.end_byte.min(self.source.len()))
            .unwrap_or("")
    }

    /// Nodes enclosing `offset`, innermost first, root last.
    ///
    /// A node encloses the offset when `start <= offset <= end`, so a cursor
    /// right after a closing parenthesis still sits inside the call.
    pub fn enclosing_node_path(&self, offset: usize) -> Vec<&SyntaxNode> {
        let innermost = self
            .nodes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, node)| node.contains_offset(offset))
            .map(|(idx, _)| idx);

        let mut path = Vec::new();
        let mut current = innermost;
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            path.push(node);
            current = node.parent;
        }
        path
    }

    /// Identifiers introduced by import statements, first occurrence wins.
    pub fn imported_symbols(&self) -> Vec<(String, Position)> {
        let kinds = import_kinds(self.language);
        let mut seen = HashSet::new();
        let mut symbols = Vec::new();

        for (idx, node) in self.nodes.iter().enumerate() {
            if !kinds.contains(&node.kind.as_str()) {
                continue;
            }
            for inner in self.nodes[idx + 1..]
                .iter()
                .take_while(|inner| node.encloses(inner))
            {
                if !IDENTIFIER_KINDS.contains(&inner.kind.as_str()) {
                    continue;
                }
                let name = self.text(inner);
                if !name.is_empty() && seen.insert(name.to_string()) {
                    symbols.push((name.to_string(), inner.start));
                }
            }
        }
        symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node(kind: &str, start: usize, end: usize, parent: Option<usize>) -> SyntaxNode {
        SyntaxNode::new(
            kind,
            start,
            end,
            Position::new(0, start),
            Position::new(0, end),
            parent,
        )
    }

    // x = foo.bar(y)
    fn call_tree() -> SyntaxTree {
        SyntaxTree::from_nodes(
            Language::Python,
            "x = foo.bar(y)",
            vec![
                node("module", 0, 14, None),
                node("expression_statement", 0, 14, Some(0)),
                node("assignment", 0, 14, Some(1)),
                node("identifier", 0, 1, Some(2)),
                node("call", 4, 14, Some(2)),
                node("attribute", 4, 11, Some(4)),
                node("identifier", 4, 7, Some(5)),
                node("identifier", 8, 11, Some(5)),
                node("argument_list", 11, 14, Some(4)),
                node("identifier", 12, 13, Some(8)),
            ],
        )
    }

    #[test]
    fn test_enclosing_path_innermost_first() {
        let tree = call_tree();
        let kinds: Vec<&str> = tree
            .enclosing_node_path(12)
            .iter()
            .map(|n| n.kind.as_str())
            .collect();
        assert_eq!(
            kinds,
            vec![
                "identifier",
                "argument_list",
                "call",
                "assignment",
                "expression_statement",
                "module"
            ]
        );
    }

    #[test]
    fn test_enclosing_path_outside_tree_is_empty() {
        let tree = call_tree();
        assert!(tree.enclosing_node_path(99).is_empty());
    }

    #[test]
    fn test_call_kinds() {
        let tree = call_tree();
        let calls: Vec<&str> = tree
            .enclosing_node_path(12)
            .into_iter()
            .filter(|n| n.is_call())
            .map(|n| tree.text(n))
            .collect();
        assert_eq!(calls, vec!["foo.bar(y)"]);
    }

    #[test]
    fn test_imported_symbols_deduplicated() {
        // from a import b
        // import b
        let source = "from a import b\nimport b";
        let tree = SyntaxTree::from_nodes(
            Language::Python,
            source,
            vec![
                node("module", 0, 24, None),
                node("import_from_statement", 0, 15, Some(0)),
                node("dotted_name", 5, 6, Some(1)),
                node("identifier", 5, 6, Some(2)),
                node("dotted_name", 14, 15, Some(1)),
                node("identifier", 14, 15, Some(4)),
                node("import_statement", 16, 24, Some(0)),
                node("dotted_name", 23, 24, Some(6)),
                node("identifier", 23, 24, Some(7)),
            ],
        );
        let names: Vec<String> = tree.imported_symbols().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }
}
