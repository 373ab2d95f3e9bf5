use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static SYMBOL_SEPARATORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\s.,/#!$%\^&*;:{}=\-_`~()\[\]]").expect("symbol separator pattern is valid")
});

/// Jaccard index over the distinct token ids of two sequences.
///
/// Order and repetition are ignored. Two empty sequences score 0.
pub fn jaccard_similarity(a: &[u32], b: &[u32]) -> f32 {
    let left: HashSet<u32> = a.iter().copied().collect();
    let right: HashSet<u32> = b.iter().copied().collect();

    let intersection = left.intersection(&right).count();
    let union = left.len() + right.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f32 / union as f32
}

/// Identifier-like fragments of `text`, deduplicated in first-seen order.
///
/// Splits on whitespace, punctuation and underscores, so `get_user_name`
/// yields `get`, `user`, `name`.
pub fn symbols_for_snippet(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    SYMBOL_SEPARATORS
        .split(text)
        .map(str::trim)
        .filter(|symbol| !symbol.is_empty())
        .filter(|symbol| seen.insert(*symbol))
        .map(str::to_string)
        .collect()
}
