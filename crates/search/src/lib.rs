//! # Context Search
//!
//! Scores, filters and packs completion snippets.
//!
//! ## Pipeline
//!
//! ```text
//! Candidates (every retriever + passive sources)
//!     │
//!     ├──> rank_snippets: Jaccard(query tokens, snippet tokens), stable sort desc
//!     │
//!     └──> BudgetPacker::pack
//!            ├─> ValidityFilter (empty / already visible / stale clipboard)
//!            └─> greedy fill: cost = tokens + overhead, skip what does not fit
//! ```
//!
//! Scoring and packing are synchronous; callers supply the token encoder so
//! that ranking and budget costs use the same tokenization.

mod error;
mod filter;
mod packer;
mod rank;
mod similarity;
mod snippet;

pub use error::{Result, SearchError};
pub use filter::{Rejection, ValidityFilter, DEFAULT_MAX_CLIPBOARD_AGE};
pub use packer::{BudgetPacker, PackedSnippets, DEFAULT_SNIPPET_OVERHEAD};
pub use rank::rank_snippets;
pub use similarity::{jaccard_similarity, symbols_for_snippet};
pub use snippet::{Candidate, ScoredSnippet, Snippet, SnippetOrigin};
