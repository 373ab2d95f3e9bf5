use super::{RetrievalContext, Retriever};
use crate::chunk_store::{ChunkStore, StoredChunk};
use crate::config::{AssemblyOptions, SimilaritySource};
use crate::error::{Result, RetrievalError};
use crate::host::FileHost;
use async_trait::async_trait;
use context_code_window::{
    build_windows, extend_window_forward, CodeChunk, Language, TokenEncoder, WindowMetadata,
    WorkspaceFile,
};
use context_search::{jaccard_similarity, Candidate, Snippet, SnippetOrigin};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Deserialize)]
struct Notebook {
    #[serde(default)]
    cells: Vec<NotebookCell>,
}

#[derive(Deserialize)]
struct NotebookCell {
    cell_type: String,
    #[serde(default)]
    source: CellSource,
}

/// nbformat stores cell source as a list of lines or as one string
#[derive(Deserialize)]
#[serde(untagged)]
enum CellSource {
    Lines(Vec<String>),
    Text(String),
}

impl Default for CellSource {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// Code cells of an `.ipynb` document, one cell after another
fn notebook_source(raw: &str) -> Result<String> {
    let notebook: Notebook = serde_json::from_str(raw)?;
    let cells: Vec<String> = notebook
        .cells
        .into_iter()
        .filter(|cell| cell.cell_type == "code")
        .map(|cell| match cell.source {
            CellSource::Lines(lines) => lines.concat(),
            CellSource::Text(text) => text,
        })
        .collect();
    Ok(cells.join("\n"))
}

/// Workspace code that looks like the text around the cursor.
///
/// Candidates come either from sliding windows rebuilt over every eligible
/// workspace file or from a chunk store. The best `top_k` by Jaccard score
/// against the query window are returned, optionally extended forward.
pub struct SimilarCodeRetriever {
    files: Arc<dyn FileHost>,
    encoder: Arc<dyn TokenEncoder>,
    store: Option<Arc<dyn ChunkStore>>,
    options: Arc<AssemblyOptions>,
}

impl SimilarCodeRetriever {
    pub fn new(
        files: Arc<dyn FileHost>,
        encoder: Arc<dyn TokenEncoder>,
        options: Arc<AssemblyOptions>,
    ) -> Self {
        Self {
            files,
            encoder,
            store: None,
            options,
        }
    }

    #[must_use]
    pub fn with_chunk_store(mut self, store: Option<Arc<dyn ChunkStore>>) -> Self {
        self.store = store;
        self
    }

    /// File text as windows see it; notebooks are reduced to their code cells
    async fn read_source(&self, path: &str) -> Result<String> {
        let raw = self.files.read_file(path).await?;
        if Language::from_path(path) == Language::Notebook {
            return notebook_source(&raw);
        }
        Ok(raw)
    }

    /// Eligible workspace files; the open buffer replaces its on-disk copy
    async fn load_workspace(&self, ctx: &RetrievalContext) -> Result<Vec<WorkspaceFile>> {
        let paths = self.files.list_files().await?;
        let mut files = Vec::new();

        for path in paths.into_iter().filter(|p| self.options.is_eligible(p)) {
            if path == ctx.filepath {
                files.push(WorkspaceFile::new(path, ctx.contents.clone()));
                continue;
            }
            match self.read_source(&path).await {
                Ok(content) => files.push(WorkspaceFile::new(path, content)),
                Err(e) => log::debug!("Skipping {path} for similar code: {e}"),
            }
        }
        Ok(files)
    }

    /// Score `items` and keep the best `top_k`, ties in input order
    fn top_k<T>(&self, query: &[u32], items: Vec<T>, content: impl Fn(&T) -> &str) -> Vec<T> {
        let mut scored: Vec<(f32, T)> = items
            .into_iter()
            .map(|item| {
                let tokens = self.encoder.encode(content(&item));
                (jaccard_similarity(query, &tokens), item)
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(self.options.top_k);
        scored.into_iter().map(|(_, item)| item).collect()
    }

    fn extension_lines(&self) -> usize {
        self.options.window_config().slice_step()
    }

    async fn from_workspace_windows(
        &self,
        ctx: &RetrievalContext,
        query: &[u32],
    ) -> Result<Vec<Candidate>> {
        let files = self.load_workspace(ctx).await?;
        let chunks = build_windows(&files, &self.options.window_config());
        log::debug!("Scoring {} workspace windows from {} files", chunks.len(), files.len());

        let best = self.top_k(query, chunks, |chunk: &CodeChunk| chunk.content.as_str());
        let contents: HashMap<&str, &str> = files
            .iter()
            .map(|file| (file.path.as_str(), file.content.as_str()))
            .collect();

        Ok(best
            .into_iter()
            .filter_map(|chunk| {
                let location = chunk.primary_location()?.clone();
                let content = match contents.get(location.filepath.as_str()) {
                    Some(text) if self.options.extend_forward => {
                        extend_window_forward(text, &location, self.extension_lines())
                    }
                    _ => chunk.content,
                };
                Some(Candidate::new(
                    SnippetOrigin::SimilarCode,
                    Snippet::code(location.filepath, content),
                ))
            })
            .collect())
    }

    async fn from_chunk_store(
        &self,
        store: &dyn ChunkStore,
        query: &[u32],
    ) -> Result<Vec<Candidate>> {
        let mut chunks: Vec<StoredChunk> = Vec::new();
        for dir in self.files.workspace_dirs().await? {
            chunks.extend(store.chunks_in(&dir).await?);
        }
        log::debug!("Scoring {} stored chunks", chunks.len());

        let best = self.top_k(query, chunks, |chunk: &StoredChunk| chunk.content.as_str());
        let mut candidates = Vec::with_capacity(best.len());
        for chunk in best {
            let content = if self.options.extend_forward {
                self.extend_stored(&chunk).await
            } else {
                chunk.content
            };
            candidates.push(Candidate::new(
                SnippetOrigin::SimilarCode,
                Snippet::code(chunk.filepath, content),
            ));
        }
        Ok(candidates)
    }

    /// Re-read the chunk's file and extend it; falls back to the stored text
    async fn extend_stored(&self, chunk: &StoredChunk) -> String {
        let location = WindowMetadata {
            filepath: chunk.filepath.clone(),
            line_no: chunk.start_line,
            start_line: chunk.start_line,
            end_line: chunk.end_line,
            window_size: self.options.window_size,
            slice_size: self.options.slice_size,
        };
        match self.read_source(&chunk.filepath).await {
            Ok(text) => extend_window_forward(&text, &location, self.extension_lines()),
            Err(e) => {
                log::debug!("Keeping stored chunk of {}: {e}", chunk.filepath);
                chunk.content.clone()
            }
        }
    }
}

#[async_trait]
impl Retriever for SimilarCodeRetriever {
    fn name(&self) -> &'static str {
        "similar-code"
    }

    async fn retrieve(&self, ctx: &RetrievalContext) -> Result<Vec<Candidate>> {
        let query = self.encoder.encode(&ctx.query_window);
        match self.options.similarity_source {
            SimilaritySource::WorkspaceWindows => self.from_workspace_windows(ctx, &query).await,
            SimilaritySource::ChunkStore => {
                let store = self.store.as_deref().ok_or_else(|| {
                    RetrievalError::invalid_config(
                        "similarity_source is chunk-store but no store was given",
                    )
                })?;
                self.from_chunk_store(store, &query).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk_store::InMemoryChunkStore;
    use context_code_window::{LexicalEncoder, Position};
    use pretty_assertions::assert_eq;

    struct MemoryFiles {
        files: Vec<(String, String)>,
    }

    #[async_trait]
    impl FileHost for MemoryFiles {
        async fn read_file(&self, path: &str) -> Result<String> {
            self.files
                .iter()
                .find(|(p, _)| p == path)
                .map(|(_, c)| c.clone())
                .ok_or_else(|| RetrievalError::not_found(path))
        }

        async fn workspace_dirs(&self) -> Result<Vec<String>> {
            Ok(vec!["/ws".into()])
        }

        async fn list_files(&self) -> Result<Vec<String>> {
            Ok(self.files.iter().map(|(p, _)| p.clone()).collect())
        }
    }

    fn ctx(query: &str) -> RetrievalContext {
        RetrievalContext {
            filepath: "/ws/main.py".into(),
            contents: query.into(),
            cursor: Position::new(0, 0),
            query_window: query.into(),
        }
    }

    fn retriever(files: Vec<(&str, &str)>, options: AssemblyOptions) -> SimilarCodeRetriever {
        let files = files
            .into_iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect();
        SimilarCodeRetriever::new(
            Arc::new(MemoryFiles { files }),
            Arc::new(LexicalEncoder::new()),
            Arc::new(options),
        )
    }

    #[tokio::test]
    async fn test_best_window_comes_first() {
        let options = AssemblyOptions {
            top_k: 2,
            extend_forward: false,
            ..AssemblyOptions::default()
        };
        let retriever = retriever(
            vec![
                ("/ws/noise.py", "import os\nprint(os.getcwd())"),
                ("/ws/users.py", "def load_user(user_id):\n    return db.get(user_id)"),
                ("/ws/README.md", "load_user user_id db get"),
            ],
            options,
        );
        let candidates = retriever
            .retrieve(&ctx("user = load_user(user_id)"))
            .await
            .unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].snippet.filepath(), Some("/ws/users.py"));
        assert!(candidates
            .iter()
            .all(|c| c.snippet.filepath() != Some("/ws/README.md")));
    }

    #[tokio::test]
    async fn test_forward_extension_adds_following_lines() {
        let body: String = (0..40).map(|i| format!("value_{i} = compute({i})\n")).collect();
        let options = AssemblyOptions {
            top_k: 1,
            ..AssemblyOptions::default()
        };
        let retriever = retriever(vec![("/ws/values.py", body.as_str())], options);
        let candidates = retriever
            .retrieve(&ctx("value_0 = compute(0)"))
            .await
            .unwrap();

        // first window spans lines 0..10, extension adds 10 more
        assert_eq!(candidates[0].snippet.content().lines().count(), 20);
    }

    #[tokio::test]
    async fn test_chunk_store_source() {
        let options = AssemblyOptions {
            similarity_source: SimilaritySource::ChunkStore,
            extend_forward: false,
            ..AssemblyOptions::default()
        };
        let store = InMemoryChunkStore::with_chunks(vec![
            StoredChunk::new("/ws/a.py", 0, 2, "def parse_header(raw):\n    return raw"),
            StoredChunk::new("/elsewhere/b.py", 0, 2, "def parse_header(raw):\n    pass"),
        ]);
        let retriever = retriever(vec![], options).with_chunk_store(Some(Arc::new(store)));
        let candidates = retriever.retrieve(&ctx("parse_header(raw)")).await.unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].snippet.filepath(), Some("/ws/a.py"));
    }

    #[tokio::test]
    async fn test_chunk_store_required() {
        let options = AssemblyOptions {
            similarity_source: SimilaritySource::ChunkStore,
            ..AssemblyOptions::default()
        };
        let result = retriever(vec![], options).retrieve(&ctx("x")).await;
        assert!(matches!(result, Err(RetrievalError::InvalidConfig(_))));
    }

    const NOTEBOOK: &str = r##"{"cells": [
        {"cell_type": "markdown", "source": ["# Load the sales data"]},
        {"cell_type": "code", "source": ["import pandas as pd\n", "sales = pd.read_csv(path)"]},
        {"cell_type": "code", "source": "sales.describe()"}
    ]}"##;

    #[test]
    fn test_notebook_source_keeps_code_cells() {
        assert_eq!(
            notebook_source(NOTEBOOK).unwrap(),
            "import pandas as pd\nsales = pd.read_csv(path)\nsales.describe()"
        );
        assert!(notebook_source("{not json").is_err());
    }

    #[tokio::test]
    async fn test_notebooks_are_windowed_over_code_cells() {
        let options = AssemblyOptions {
            top_k: 1,
            ..AssemblyOptions::default()
        };
        let retriever = retriever(
            vec![
                ("/ws/analysis.ipynb", NOTEBOOK),
                ("/ws/broken.ipynb", "{not json"),
                ("/ws/noise.py", "import os\nprint(os.getcwd())"),
            ],
            options,
        );
        let candidates = retriever
            .retrieve(&ctx("sales = pd.read_csv(path)"))
            .await
            .unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].snippet.filepath(), Some("/ws/analysis.ipynb"));
        assert_eq!(
            candidates[0].snippet.content(),
            "import pandas as pd\nsales = pd.read_csv(path)\nsales.describe()"
        );
    }
}
