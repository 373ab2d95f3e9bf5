use context_code_window::Position;
use context_search::{ScoredSnippet, SnippetOrigin};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One completion request: the buffer and where the cursor is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub filepath: String,
    pub contents: String,
    pub cursor: Position,
    /// Buffer text the prompt already shows; cut around the cursor when absent
    #[serde(default)]
    pub visible_window: Option<String>,
}

impl CompletionRequest {
    pub fn new(filepath: impl Into<String>, contents: impl Into<String>, cursor: Position) -> Self {
        Self {
            filepath: filepath.into(),
            contents: contents.into(),
            cursor,
            visible_window: None,
        }
    }

    #[must_use]
    pub fn with_visible_window(mut self, window: impl Into<String>) -> Self {
        self.visible_window = Some(window.into());
        self
    }
}

/// Snippets chosen for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledContext {
    pub generation: u64,
    /// Tokens available to snippets after the visible window
    pub budget: usize,
    pub tokens_used: usize,
    /// Candidates each source produced before ranking
    pub candidate_counts: BTreeMap<SnippetOrigin, usize>,
    /// Accepted snippets in rank order
    pub snippets: Vec<ScoredSnippet>,
}

impl AssembledContext {
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }
}
