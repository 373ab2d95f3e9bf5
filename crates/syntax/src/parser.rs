use crate::error::{Result, SyntaxError};
use crate::tree::{SyntaxNode, SyntaxTree};
use context_code_window::{Language, Position};
use tree_sitter::{Node, Parser};

const IMPORT_SCAN_MAX_BYTES: usize = 10_000;
const IMPORT_SCAN_MAX_LINES: usize = 100;

/// Produces syntax trees for buffers
pub trait SyntaxParser: Send + Sync {
    /// Parse `content` as the language implied by `path`.
    ///
    /// Returns `Ok(None)` for languages without a grammar.
    fn parse(&self, path: &str, content: &str) -> Result<Option<SyntaxTree>>;
}

/// Tree-sitter backed parser for Rust, Python, JavaScript and TypeScript
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeSitterParser;

impl TreeSitterParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn grammar(language: Language) -> Result<tree_sitter::Language> {
        match language {
            Language::Rust => Ok(tree_sitter_rust::LANGUAGE.into()),
            Language::Python => Ok(tree_sitter_python::LANGUAGE.into()),
            Language::JavaScript => Ok(tree_sitter_javascript::LANGUAGE.into()),
            Language::TypeScript => Ok(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
            other => Err(SyntaxError::NoGrammar(other.as_str())),
        }
    }
}

impl SyntaxParser for TreeSitterParser {
    fn parse(&self, path: &str, content: &str) -> Result<Option<SyntaxTree>> {
        let language = Language::from_path(path);
        if !language.supports_ast() {
            log::debug!("No grammar for {path} ({})", language.as_str());
            return Ok(None);
        }

        let grammar = Self::grammar(language)?;
        let mut parser = Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|e| SyntaxError::GrammarRejected {
                language: language.as_str(),
                reason: e.to_string(),
            })?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| SyntaxError::NoTree(path.to_string()))?;

        let nodes = flatten(tree.root_node(), content);
        Ok(Some(SyntaxTree::from_nodes(language, content, nodes)))
    }
}

/// Named nodes in pre-order with parent indices
fn flatten(root: Node<'_>, source: &str) -> Vec<SyntaxNode> {
    let columns = ColumnIndex::new(source);
    let mut nodes = Vec::new();
    let mut stack: Vec<(Node<'_>, Option<usize>)> = vec![(root, None)];

    while let Some((node, parent)) = stack.pop() {
        let idx = nodes.len();
        nodes.push(SyntaxNode::new(
            node.kind(),
            node.start_byte(),
            node.end_byte(),
            columns.position(node.start_byte()),
            columns.position(node.end_byte()),
            parent,
        ));

        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        for child in children.into_iter().rev() {
            stack.push((child, Some(idx)));
        }
    }
    nodes
}

/// Converts byte offsets into character-column positions
struct ColumnIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> ColumnIndex<'a> {
    fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    fn position(&self, byte: usize) -> Position {
        let byte = byte.min(self.source.len());
        let line = self
            .line_starts
            .partition_point(|&start| start <= byte)
            .saturating_sub(1);
        let line_start = self.line_starts[line];
        let column = self
            .source
            .get(line_start..byte)
            .map_or(byte - line_start, |text| text.chars().count());
        Position::new(line, column)
    }
}

/// Leading part of a buffer scanned for imports: at most 10 000 bytes and 100 lines.
pub fn import_scan_prefix(content: &str) -> &str {
    let mut end = content.len().min(IMPORT_SCAN_MAX_BYTES);
    while end > 0 && !content.is_char_boundary(end) {
        end -= 1;
    }
    let head = &content[..end];
    match head.match_indices('\n').nth(IMPORT_SCAN_MAX_LINES - 1) {
        Some((idx, _)) => &head[..idx],
        None => head,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unsupported_language_yields_none() {
        let parser = TreeSitterParser::new();
        assert!(parser.parse("Main.java", "class Main {}").unwrap().is_none());
        assert!(parser.parse("notes.ipynb", "{}").unwrap().is_none());
    }

    #[test]
    fn test_nodes_are_preorder_with_parents() {
        let parser = TreeSitterParser::new();
        let tree = parser.parse("a.py", "x = 1\n").unwrap().unwrap();
        let nodes = tree.nodes();
        assert_eq!(nodes[0].kind, "module");
        assert_eq!(nodes[0].parent, None);
        for (idx, node) in nodes.iter().enumerate().skip(1) {
            let parent = node.parent.expect("non-root node has a parent");
            assert!(parent < idx);
        }
    }

    #[test]
    fn test_column_index_counts_chars() {
        let source = "é = 1\nab";
        let columns = ColumnIndex::new(source);
        assert_eq!(columns.position(0), Position::new(0, 0));
        assert_eq!(columns.position(3), Position::new(0, 2));
        assert_eq!(columns.position(source.len()), Position::new(1, 2));
    }

    #[test]
    fn test_import_scan_prefix_limits_lines() {
        let content = (0..150).map(|i| format!("import m{i}")).collect::<Vec<_>>().join("\n");
        let prefix = import_scan_prefix(&content);
        assert_eq!(prefix.lines().count(), 100);
        assert!(prefix.ends_with("import m99"));
    }

    #[test]
    fn test_import_scan_prefix_limits_bytes() {
        let content = "é".repeat(6_000);
        let prefix = import_scan_prefix(&content);
        assert!(prefix.len() <= 10_000);
        assert_eq!(prefix.chars().count(), 5_000);
    }
}
