//! # Context Syntax
//!
//! The syntax-tree collaborator used by completion retrieval.
//!
//! Trees are flattened into an owned [`SyntaxTree`] (named nodes in
//! pre-order with parent links) so retrievers never hold parser lifetimes and
//! tests can build trees by hand.
//!
//! ```text
//! path + content ──> SyntaxParser::parse ──> SyntaxTree
//!                                              ├─> enclosing_node_path(offset)
//!                                              └─> imported_symbols()
//! ```

mod error;
mod parser;
mod tree;

pub use error::{Result, SyntaxError};
pub use parser::{import_scan_prefix, SyntaxParser, TreeSitterParser};
pub use tree::{SyntaxNode, SyntaxTree, CALL_NODE_KINDS};
