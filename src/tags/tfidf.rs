//! TF-IDF ranking with document frequencies taken over the whole run.

use super::{rank_by_score, TagExtractor};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, Default)]
pub struct TfIdf;

impl TagExtractor for TfIdf {
    fn name(&self) -> &'static str {
        "tfidf"
    }

    fn rank_candidates(&self, docs: &[Vec<String>], limit: usize) -> Vec<Vec<String>> {
        let n = docs.len() as f64;

        let mut df: HashMap<String, usize> = HashMap::new();
        for doc in docs {
            let mut unique: Vec<String> = doc.iter().map(|t| t.to_lowercase()).collect();
            unique.sort();
            unique.dedup();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        docs.iter()
            .map(|doc| {
                if doc.is_empty() {
                    return Vec::new();
                }
                // lowercase key -> (count, first surface form)
                let mut counts: BTreeMap<String, (usize, &str)> = BTreeMap::new();
                for token in doc {
                    counts.entry(token.to_lowercase()).or_insert((0, token.as_str())).0 += 1;
                }
                let len = doc.len() as f64;
                let scored = counts.iter().map(|(key, (count, surface))| {
                    let df = df.get(key).copied().unwrap_or(0) as f64;
                    let idf = ((1.0 + n) / (1.0 + df)).ln() + 1.0;
                    (surface.to_string(), (*count as f64 / len) * idf)
                });
                rank_by_score(scored, limit)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(words: &str) -> Vec<String> {
        words.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn rare_terms_outrank_common_ones() {
        let docs = vec![
            doc("rust rust tokio common"),
            doc("python django common"),
            doc("common golang"),
        ];
        let ranked = TfIdf.rank_candidates(&docs, 10);
        assert_eq!(ranked[0][0], "rust");
        assert_eq!(ranked[0].last().map(String::as_str), Some("common"));
        assert_eq!(ranked[1], vec!["django", "python", "common"]);
    }

    #[test]
    fn case_variants_merge_and_keep_first_surface() {
        let docs = vec![doc("Redis redis cache")];
        let ranked = TfIdf.rank_candidates(&docs, 5);
        assert_eq!(ranked[0], vec!["Redis", "cache"]);
    }

    #[test]
    fn respects_limit_and_empty_docs() {
        let docs = vec![doc("a1 b1 c1 d1"), Vec::new()];
        let ranked = TfIdf.rank_candidates(&docs, 2);
        assert_eq!(ranked[0], vec!["a1", "b1"]);
        assert!(ranked[1].is_empty());
    }
}
