//! # Context Retrieval
//!
//! Gathers candidate snippets for a completion request from several sources
//! at once and packs the best of them into the prompt budget.
//!
//! ## Architecture
//!
//! ```text
//! CompletionRequest (file, buffer, cursor)
//!     │
//!     ├──> query window (token-bounded, around the cursor)
//!     │
//!     ├──> tokio::join! (each under its own timeout, failures → empty)
//!     │      ├─> ImportDefinitionRetriever  (reads the per-file import cache)
//!     │      ├─> RecentlyEditedRetriever
//!     │      ├─> SimilarCodeRetriever       (workspace windows or chunk store)
//!     │      ├─> SimilarUsageRetriever      (call → definition → references)
//!     │      ├─> DiffRetriever
//!     │      └─> ClipboardRetriever
//!     │
//!     ├──> generation check (newer request → Superseded)
//!     │
//!     └──> rank → filter → pack  ──> AssembledContext
//! ```
//!
//! Host capabilities ([`FileHost`], [`SymbolNavigator`], [`EditorSources`])
//! are injected, so an editor integration, a CLI or a test double can drive
//! the same pipeline.
//!
//! ## Example
//!
//! ```rust,no_run
//! use context_code_window::Position;
//! use context_retrieval::{AssemblyOptions, CompletionRequest, ContextAssembler};
//! # use context_retrieval::{EditorSources, FileHost, SymbolNavigator};
//! # use std::sync::Arc;
//! # async fn demo(
//! #     files: Arc<dyn FileHost>,
//! #     navigator: Arc<dyn SymbolNavigator>,
//! #     editor: Arc<dyn EditorSources>,
//! # ) -> context_retrieval::Result<()> {
//! let assembler = ContextAssembler::new(AssemblyOptions::default(), files, navigator, editor)?;
//! assembler.on_active_file_changed("src/app.py").await;
//!
//! let request = CompletionRequest::new("src/app.py", "user = load_user(", Position::new(0, 17));
//! let context = assembler.assemble_context(&request).await?;
//! println!("{} snippets, {} tokens", context.len(), context.tokens_used);
//! # Ok(())
//! # }
//! ```

mod cache;
mod chunk_store;
mod config;
mod error;
mod host;
mod navigation;
mod pipeline;
mod request;
mod retrievers;

pub use cache::{BoundedCache, DefinitionSnippet, FileInfo, ImportDefinitionCache};
pub use chunk_store::{ChunkStore, InMemoryChunkStore, StoredChunk};
pub use config::{load_options, AssemblyOptions, SimilaritySource, TimeoutOptions};
pub use error::{Result, RetrievalError};
pub use host::{
    ClipboardContent, EditorSources, FileHost, Location, RecentlyEditedRange, SymbolNavigator,
};
pub use navigation::CachedNavigator;
pub use pipeline::ContextAssembler;
pub use request::{AssembledContext, CompletionRequest};
pub use retrievers::{
    text_around_cursor, ClipboardRetriever, DiffRetriever, ImportDefinitionIndexer,
    ImportDefinitionRetriever, RecentlyEditedRetriever, RetrievalContext, Retriever,
    SimilarCodeRetriever, SimilarUsageRetriever, SymbolUsage,
};
