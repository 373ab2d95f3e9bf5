use crate::filter::ValidityFilter;
use crate::snippet::ScoredSnippet;
use serde::Serialize;

/// Tokens reserved per snippet for the delimiter and description added at render time
pub const DEFAULT_SNIPPET_OVERHEAD: usize = 10;

/// Snippets accepted by [`BudgetPacker::pack`], in rank order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackedSnippets {
    pub snippets: Vec<ScoredSnippet>,
    /// Sum of accepted costs, overhead included
    pub tokens_used: usize,
}

/// Greedy rank-order packing under a token budget.
///
/// Invalid snippets are skipped for free. A valid snippet is accepted when
/// `tokens + overhead` fits in what is left; one that does not fit is skipped
/// and scanning continues, since a later, smaller snippet may still fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetPacker {
    budget: usize,
    snippet_overhead: usize,
}

impl BudgetPacker {
    #[must_use]
    pub const fn new(budget: usize) -> Self {
        Self {
            budget,
            snippet_overhead: DEFAULT_SNIPPET_OVERHEAD,
        }
    }

    #[must_use]
    pub const fn with_snippet_overhead(mut self, overhead: usize) -> Self {
        self.snippet_overhead = overhead;
        self
    }

    #[must_use]
    pub const fn budget(&self) -> usize {
        self.budget
    }

    pub fn pack<F>(
        &self,
        ranked: Vec<ScoredSnippet>,
        filter: &ValidityFilter,
        token_cost: F,
    ) -> PackedSnippets
    where
        F: Fn(&str) -> usize,
    {
        let mut remaining = self.budget;
        let mut packed = PackedSnippets::default();

        for snippet in ranked {
            if remaining == 0 {
                break;
            }
            if let Some(reason) = filter.check(&snippet.snippet) {
                log::debug!("Skipping {} snippet: {reason:?}", snippet.origin.as_str());
                continue;
            }

            let cost = token_cost(snippet.content()) + self.snippet_overhead;
            if cost <= remaining {
                remaining -= cost;
                packed.tokens_used += cost;
                packed.snippets.push(snippet);
            } else {
                log::debug!(
                    "Skipping {} snippet: {cost} tokens, {remaining} left",
                    snippet.origin.as_str()
                );
            }
        }

        log::debug!(
            "Packed {} snippets, {}/{} tokens",
            packed.snippets.len(),
            packed.tokens_used,
            self.budget
        );
        packed
    }
}
