use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// A chunk persisted by an external indexing pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredChunk {
    pub filepath: String,
    pub start_line: usize,
    pub end_line: usize,
    pub content: String,
}

impl StoredChunk {
    pub fn new(
        filepath: impl Into<String>,
        start_line: usize,
        end_line: usize,
        content: impl Into<String>,
    ) -> Self {
        Self {
            filepath: filepath.into(),
            start_line,
            end_line,
            content: content.into(),
        }
    }
}

/// Read side of a chunk table; populating it is somebody else's job
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Chunks whose path contains `workspace_dir`
    async fn chunks_in(&self, workspace_dir: &str) -> Result<Vec<StoredChunk>>;
}

/// Chunk store held in memory
#[derive(Debug, Default)]
pub struct InMemoryChunkStore {
    chunks: RwLock<Vec<StoredChunk>>,
}

impl InMemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunks(chunks: Vec<StoredChunk>) -> Self {
        Self {
            chunks: RwLock::new(chunks),
        }
    }

    pub fn add(&self, chunk: StoredChunk) {
        self.chunks
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(chunk);
    }

    /// Remove every chunk of `filepath`
    pub fn remove_file(&self, filepath: &str) -> usize {
        let mut chunks = self
            .chunks
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let before = chunks.len();
        chunks.retain(|chunk| chunk.filepath != filepath);
        before - chunks.len()
    }

    pub fn len(&self) -> usize {
        self.chunks
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ChunkStore for InMemoryChunkStore {
    async fn chunks_in(&self, workspace_dir: &str) -> Result<Vec<StoredChunk>> {
        let chunks = self
            .chunks
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(chunks
            .iter()
            .filter(|chunk| chunk.filepath.contains(workspace_dir))
            .cloned()
            .collect())
    }
}
