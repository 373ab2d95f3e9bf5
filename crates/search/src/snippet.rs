use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A piece of context offered to the completion model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Snippet {
    /// Text taken from a file
    Code { filepath: String, content: String },

    /// One hunk-set of the working tree diff
    Diff { content: String },

    /// Clipboard text; undated clipboard entries are never valid
    Clipboard {
        content: String,
        copied_at: Option<DateTime<Utc>>,
    },
}

impl Snippet {
    pub fn code(filepath: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Code {
            filepath: filepath.into(),
            content: content.into(),
        }
    }

    pub fn diff(content: impl Into<String>) -> Self {
        Self::Diff {
            content: content.into(),
        }
    }

    pub fn clipboard(content: impl Into<String>, copied_at: Option<DateTime<Utc>>) -> Self {
        Self::Clipboard {
            content: content.into(),
            copied_at,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Code { content, .. }
            | Self::Diff { content }
            | Self::Clipboard { content, .. } => {
                content
            }
        }
    }

    /// Source file, only known for code snippets
    pub fn filepath(&self) -> Option<&str> {
        match self {
            Self::Code { filepath, .. } => Some(filepath),
            Self::Diff { .. } | Self::Clipboard { .. } => None,
        }
    }
}

/// Which source produced a snippet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnippetOrigin {
    SimilarCode,
    SimilarUsage,
    ImportDefinition,
    RecentlyEdited,
    Diff,
    Clipboard,
}

impl SnippetOrigin {
    pub const ALL: [SnippetOrigin; 6] = [
        SnippetOrigin::SimilarCode,
        SnippetOrigin::SimilarUsage,
        SnippetOrigin::ImportDefinition,
        SnippetOrigin::RecentlyEdited,
        SnippetOrigin::Diff,
        SnippetOrigin::Clipboard,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SnippetOrigin::SimilarCode => "similar-code",
            SnippetOrigin::SimilarUsage => "similar-usage",
            SnippetOrigin::ImportDefinition => "import-definition",
            SnippetOrigin::RecentlyEdited => "recently-edited",
            SnippetOrigin::Diff => "diff",
            SnippetOrigin::Clipboard => "clipboard",
        }
    }
}

/// Unscored snippet together with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub origin: SnippetOrigin,
    pub snippet: Snippet,
}

impl Candidate {
    pub fn new(origin: SnippetOrigin, snippet: Snippet) -> Self {
        Self { origin, snippet }
    }
}

/// Candidate scored against the query window, score in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSnippet {
    pub origin: SnippetOrigin,
    pub snippet: Snippet,
    pub score: f32,
}

impl ScoredSnippet {
    pub fn content(&self) -> &str {
        self.snippet.content()
    }
}
