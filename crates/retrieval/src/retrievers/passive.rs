use super::{RetrievalContext, Retriever};
use crate::error::Result;
use crate::host::EditorSources;
use async_trait::async_trait;
use context_search::{Candidate, Snippet, SnippetOrigin};
use std::sync::Arc;

/// Recently edited ranges as code snippets
pub struct RecentlyEditedRetriever {
    editor: Arc<dyn EditorSources>,
}

impl RecentlyEditedRetriever {
    pub fn new(editor: Arc<dyn EditorSources>) -> Self {
        Self { editor }
    }
}

#[async_trait]
impl Retriever for RecentlyEditedRetriever {
    fn name(&self) -> &'static str {
        "recently-edited"
    }

    async fn retrieve(&self, _ctx: &RetrievalContext) -> Result<Vec<Candidate>> {
        let ranges = self.editor.recently_edited_ranges().await?;
        Ok(ranges
            .into_iter()
            .map(|range| {
                Candidate::new(
                    SnippetOrigin::RecentlyEdited,
                    Snippet::code(range.filepath, range.lines.join("\n")),
                )
            })
            .collect())
    }
}

/// Staged diff, one snippet per entry
pub struct DiffRetriever {
    editor: Arc<dyn EditorSources>,
}

impl DiffRetriever {
    pub fn new(editor: Arc<dyn EditorSources>) -> Self {
        Self { editor }
    }
}

#[async_trait]
impl Retriever for DiffRetriever {
    fn name(&self) -> &'static str {
        "diff"
    }

    async fn retrieve(&self, _ctx: &RetrievalContext) -> Result<Vec<Candidate>> {
        let diff = self.editor.diff(true).await?;
        Ok(diff
            .into_iter()
            .map(|content| Candidate::new(SnippetOrigin::Diff, Snippet::diff(content)))
            .collect())
    }
}

/// Current clipboard text
pub struct ClipboardRetriever {
    editor: Arc<dyn EditorSources>,
}

impl ClipboardRetriever {
    pub fn new(editor: Arc<dyn EditorSources>) -> Self {
        Self { editor }
    }
}

#[async_trait]
impl Retriever for ClipboardRetriever {
    fn name(&self) -> &'static str {
        "clipboard"
    }

    async fn retrieve(&self, _ctx: &RetrievalContext) -> Result<Vec<Candidate>> {
        let clipboard = self.editor.clipboard().await?;
        Ok(clipboard
            .into_iter()
            .map(|item| {
                Candidate::new(
                    SnippetOrigin::Clipboard,
                    Snippet::clipboard(item.text, item.copied_at),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ClipboardContent, RecentlyEditedRange};
    use chrono::Utc;
    use context_code_window::Position;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct FakeEditor {
        staged_requested: AtomicBool,
    }

    #[async_trait]
    impl EditorSources for FakeEditor {
        async fn clipboard(&self) -> Result<Option<ClipboardContent>> {
            Ok(Some(ClipboardContent {
                text: "copied()".into(),
                copied_at: Some(Utc::now()),
            }))
        }

        async fn diff(&self, staged: bool) -> Result<Vec<String>> {
            self.staged_requested.store(staged, Ordering::SeqCst);
            Ok(vec!["+a".into(), "-b".into()])
        }

        async fn recently_edited_ranges(&self) -> Result<Vec<RecentlyEditedRange>> {
            Ok(vec![RecentlyEditedRange {
                filepath: "a.py".into(),
                lines: vec!["x = 1".into(), "y = 2".into()],
            }])
        }
    }

    fn ctx() -> RetrievalContext {
        RetrievalContext {
            filepath: "a.py".into(),
            contents: String::new(),
            cursor: Position::new(0, 0),
            query_window: String::new(),
        }
    }

    #[tokio::test]
    async fn test_recently_edited_lines_are_joined() {
        let retriever = RecentlyEditedRetriever::new(Arc::new(FakeEditor::default()));
        let candidates = retriever.retrieve(&ctx()).await.unwrap();
        assert_eq!(
            candidates,
            vec![Candidate::new(
                SnippetOrigin::RecentlyEdited,
                Snippet::code("a.py", "x = 1\ny = 2")
            )]
        );
    }

    #[tokio::test]
    async fn test_diff_reads_staged_changes() {
        let editor = Arc::new(FakeEditor::default());
        let retriever = DiffRetriever::new(editor.clone());
        let candidates = retriever.retrieve(&ctx()).await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert!(editor.staged_requested.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_clipboard_keeps_timestamp() {
        let retriever = ClipboardRetriever::new(Arc::new(FakeEditor::default()));
        let candidates = retriever.retrieve(&ctx()).await.unwrap();
        assert!(matches!(
            &candidates[0].snippet,
            Snippet::Clipboard { copied_at: Some(_), .. }
        ));
    }
}
