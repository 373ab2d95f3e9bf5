use crate::similarity::jaccard_similarity;
use crate::snippet::{Candidate, ScoredSnippet};
use context_code_window::TokenEncoder;

/// Score every candidate against `query` and sort by descending score.
///
/// The sort is stable: equal scores keep their input order.
pub fn rank_snippets<E>(query: &str, candidates: Vec<Candidate>, encoder: &E) -> Vec<ScoredSnippet>
where
    E: TokenEncoder + ?Sized,
{
    let query_tokens = encoder.encode(query);
    let mut scored: Vec<ScoredSnippet> = candidates
        .into_iter()
        .map(|candidate| {
            let tokens = encoder.encode(candidate.snippet.content());
            ScoredSnippet {
                score: jaccard_similarity(&query_tokens, &tokens),
                origin: candidate.origin,
                snippet: candidate.snippet,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    log::debug!(
        "Ranked {} snippets against {} query tokens",
        scored.len(),
        query_tokens.len()
    );
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippet::{Snippet, SnippetOrigin};
    use context_code_window::LexicalEncoder;
    use pretty_assertions::assert_eq;

    fn code(content: &str) -> Candidate {
        Candidate::new(SnippetOrigin::SimilarCode, Snippet::code("a.py", content))
    }

    #[test]
    fn test_descending_order() {
        let ranked = rank_snippets(
            "user name",
            vec![code("unrelated"), code("user name"), code("user")],
            &LexicalEncoder::new(),
        );
        let contents: Vec<&str> = ranked.iter().map(ScoredSnippet::content).collect();
        assert_eq!(contents, vec!["user name", "user", "unrelated"]);
        assert_eq!(ranked[0].score, 1.0);
        assert_eq!(ranked[2].score, 0.0);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranked = rank_snippets(
            "query",
            vec![code("first"), code("second"), code("third")],
            &LexicalEncoder::new(),
        );
        let contents: Vec<&str> = ranked.iter().map(ScoredSnippet::content).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_origin_is_preserved() {
        let candidates = vec![Candidate::new(SnippetOrigin::Diff, Snippet::diff("+ user"))];
        let ranked = rank_snippets("user", candidates, &LexicalEncoder::new());
        assert_eq!(ranked[0].origin, SnippetOrigin::Diff);
    }
}
