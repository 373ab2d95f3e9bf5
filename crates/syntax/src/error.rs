use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyntaxError>;

/// Failures while turning a buffer into a [`SyntaxTree`](crate::SyntaxTree)
#[derive(Error, Debug)]
pub enum SyntaxError {
    #[error("No grammar bundled for {0}")]
    NoGrammar(&'static str),

    /// The grammar was built against an incompatible tree-sitter ABI
    #[error("Grammar for {language} rejected: {reason}")]
    GrammarRejected {
        language: &'static str,
        reason: String,
    },

    /// Parsing was cancelled or timed out inside tree-sitter
    #[error("No tree produced for {0}")]
    NoTree(String),
}
