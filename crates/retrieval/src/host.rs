//! Capabilities the editor host provides.
//!
//! The pipeline only talks to these traits, so any editor integration (or a
//! test double) can drive it.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use context_code_window::{split_lines, Position, Range};
use serde::{Deserialize, Serialize};

/// A span inside a file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub filepath: String,
    pub range: Range,
}

impl Location {
    pub fn new(filepath: impl Into<String>, range: Range) -> Self {
        Self {
            filepath: filepath.into(),
            range,
        }
    }

    #[must_use]
    pub fn start(&self) -> Position {
        self.range.start
    }
}

/// Current clipboard text and when it was copied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardContent {
    pub text: String,
    pub copied_at: Option<DateTime<Utc>>,
}

/// Lines the user edited recently
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentlyEditedRange {
    pub filepath: String,
    pub lines: Vec<String>,
}

/// File access and workspace layout
#[async_trait]
pub trait FileHost: Send + Sync {
    /// Full file text; fails with [`RetrievalError::NotFound`](crate::RetrievalError::NotFound)
    /// when the file is gone.
    async fn read_file(&self, path: &str) -> Result<String>;

    /// Text of the whole lines covered by `range`
    async fn read_range(&self, path: &str, range: Range) -> Result<String> {
        let content = self.read_file(path).await?;
        let lines = split_lines(&content);
        let start = range.start.line.min(lines.len());
        let end = (range.end.line + 1).min(lines.len()).max(start);
        Ok(lines[start..end].join("\n"))
    }

    async fn workspace_dirs(&self) -> Result<Vec<String>>;

    /// Every file under the workspace directories
    async fn list_files(&self) -> Result<Vec<String>>;
}

/// Go-to-definition and find-references
#[async_trait]
pub trait SymbolNavigator: Send + Sync {
    async fn definition(&self, path: &str, position: Position) -> Result<Option<Location>>;

    async fn references(&self, path: &str, position: Position) -> Result<Vec<Location>>;
}

/// Editor state consumed as-is
#[async_trait]
pub trait EditorSources: Send + Sync {
    async fn clipboard(&self) -> Result<Option<ClipboardContent>>;

    /// Diff of the working tree, one entry per file
    async fn diff(&self, staged: bool) -> Result<Vec<String>>;

    async fn recently_edited_ranges(&self) -> Result<Vec<RecentlyEditedRange>>;
}
