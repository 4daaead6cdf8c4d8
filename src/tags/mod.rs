//! Keyword tag extraction.

use crate::domain::TagMethod;

pub mod budget;
pub mod textrank;
pub mod tfidf;
pub mod tokenize;

pub use budget::TagBudget;
pub use textrank::TextRank;
pub use tfidf::TfIdf;
pub use tokenize::tokenize;

/// Ranks tag candidates for a batch of documents.
///
/// `docs` holds one token list per article; the result has one ranked list,
/// best first, of at most `limit` candidates per article.
pub trait TagExtractor {
    fn name(&self) -> &'static str;
    fn rank_candidates(&self, docs: &[Vec<String>], limit: usize) -> Vec<Vec<String>>;
}

/// `None` when tagging is disabled.
pub fn extractor_for(method: TagMethod) -> Option<Box<dyn TagExtractor>> {
    match method {
        TagMethod::Tfidf => Some(Box::new(TfIdf)),
        TagMethod::Textrank => Some(Box::new(TextRank)),
        TagMethod::None => None,
    }
}

/// How many ranked candidates to consider per article.
pub fn candidate_limit(tag_count: usize) -> usize {
    30.max(tag_count.saturating_mul(10))
}

/// Sort by score descending, ties by token, and keep the top `limit`.
pub(crate) fn rank_by_score(
    scored: impl IntoIterator<Item = (String, f64)>,
    limit: usize,
) -> Vec<String> {
    let mut items: Vec<(String, f64)> = scored.into_iter().collect();
    items.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    items.into_iter().take(limit).map(|(token, _)| token).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_selection() {
        assert_eq!(extractor_for(TagMethod::Tfidf).map(|e| e.name()), Some("tfidf"));
        assert_eq!(extractor_for(TagMethod::Textrank).map(|e| e.name()), Some("textrank"));
        assert!(extractor_for(TagMethod::None).is_none());
    }

    #[test]
    fn candidate_limit_has_a_floor() {
        assert_eq!(candidate_limit(0), 30);
        assert_eq!(candidate_limit(3), 30);
        assert_eq!(candidate_limit(5), 50);
    }

    #[test]
    fn extracted_tags_come_from_article_text() {
        let docs = vec![
            tokenize("Tokio runtime internals. Tokio schedules tasks."),
            tokenize("Django views and Django models."),
        ];
        let ranked = TfIdf.rank_candidates(&docs, candidate_limit(3));
        let mut budget = TagBudget::new(100);
        assert_eq!(budget.select(&ranked[0], 3)[0], "Tokio");
        assert_eq!(budget.select(&ranked[1], 3)[0], "Django");
    }
}
