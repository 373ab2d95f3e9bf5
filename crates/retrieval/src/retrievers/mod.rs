//! Candidate retrievers.
//!
//! Every retriever turns a completion request into candidate snippets. They
//! run concurrently and independently; the assembler turns any error or
//! timeout into an empty result.

mod import_definitions;
mod passive;
mod similar_code;
mod similar_usage;

pub use import_definitions::{
    text_around_cursor, ImportDefinitionIndexer, ImportDefinitionRetriever,
};
pub use passive::{ClipboardRetriever, DiffRetriever, RecentlyEditedRetriever};
pub use similar_code::SimilarCodeRetriever;
pub use similar_usage::{SimilarUsageRetriever, SymbolUsage};

use crate::error::Result;
use async_trait::async_trait;
use context_code_window::Position;
use context_search::Candidate;

/// Per-request input shared by all retrievers
#[derive(Debug, Clone)]
pub struct RetrievalContext {
    pub filepath: String,
    pub contents: String,
    pub cursor: Position,
    /// Token-bounded window around the cursor
    pub query_window: String,
}

#[async_trait]
pub trait Retriever: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn retrieve(&self, ctx: &RetrievalContext) -> Result<Vec<Candidate>>;
}
