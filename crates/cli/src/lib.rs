//! Local-filesystem host for the context assembler.
//!
//! Backs [`context_retrieval::ContextAssembler`] with the disk, `git` and no
//! language server, which is enough for similar-code, diff and whatever a
//! config enables.

mod host;
#[cfg(feature = "hf-tokenizer")]
mod tokenizer;

pub use host::{split_diff, GitEditor, LocalHost, NullNavigator};
#[cfg(feature = "hf-tokenizer")]
pub use tokenizer::HfEncoder;
