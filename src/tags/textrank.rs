//! TextRank: PageRank over a co-occurrence graph of adjacent tokens.

use super::{rank_by_score, TagExtractor};
use std::collections::BTreeMap;

const DAMPING: f64 = 0.85;
const WINDOW: usize = 2;
const MAX_ITERATIONS: usize = 30;
const CONVERGENCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextRank;

impl TagExtractor for TextRank {
    fn name(&self) -> &'static str {
        "textrank"
    }

    fn rank_candidates(&self, docs: &[Vec<String>], limit: usize) -> Vec<Vec<String>> {
        docs.iter().map(|doc| rank_document(doc, limit)).collect()
    }
}

fn rank_document(doc: &[String], limit: usize) -> Vec<String> {
    if doc.is_empty() {
        return Vec::new();
    }

    let mut surface: BTreeMap<String, &str> = BTreeMap::new();
    let keys: Vec<String> = doc
        .iter()
        .map(|t| {
            let key = t.to_lowercase();
            surface.entry(key.clone()).or_insert(t.as_str());
            key
        })
        .collect();

    let index: BTreeMap<&str, usize> =
        surface.keys().enumerate().map(|(i, k)| (k.as_str(), i)).collect();
    let n = index.len();

    let mut weights = vec![BTreeMap::<usize, f64>::new(); n];
    for window in keys.windows(WINDOW.min(keys.len()).max(1)) {
        for (i, a) in window.iter().enumerate() {
            for b in &window[i + 1..] {
                if a == b {
                    continue;
                }
                let (ia, ib) = (index[a.as_str()], index[b.as_str()]);
                *weights[ia].entry(ib).or_insert(0.0) += 1.0;
                *weights[ib].entry(ia).or_insert(0.0) += 1.0;
            }
        }
    }
    let out_weight: Vec<f64> = weights.iter().map(|edges| edges.values().sum()).collect();

    let mut scores = vec![1.0f64; n];
    for _ in 0..MAX_ITERATIONS {
        let mut next = vec![1.0 - DAMPING; n];
        for (v, edges) in weights.iter().enumerate() {
            let mut acc = 0.0;
            for (&u, &w) in edges {
                if out_weight[u] > 0.0 {
                    acc += w / out_weight[u] * scores[u];
                }
            }
            next[v] += DAMPING * acc;
        }
        let delta: f64 = next.iter().zip(&scores).map(|(a, b)| (a - b).abs()).sum();
        scores = next;
        if delta < CONVERGENCE {
            break;
        }
    }

    let scored = surface
        .iter()
        .map(|(key, s)| (s.to_string(), scores[index[key.as_str()]]));
    rank_by_score(scored, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(words: &str) -> Vec<String> {
        words.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn hub_tokens_rank_first() {
        let d = doc("cache redis cache memcached cache eviction policy");
        let ranked = TextRank.rank_candidates(&[d], 3);
        assert_eq!(ranked[0][0], "cache");
        assert_eq!(ranked[0].len(), 3);
    }

    #[test]
    fn ranking_is_deterministic() {
        let d = doc("alpha beta gamma delta alpha beta");
        let first = TextRank.rank_candidates(&[d.clone()], 10);
        let second = TextRank.rank_candidates(&[d], 10);
        assert_eq!(first, second);
        assert_eq!(first[0].len(), 4);
    }

    #[test]
    fn single_token_documents() {
        let ranked = TextRank.rank_candidates(&[doc("solo"), Vec::new()], 5);
        assert_eq!(ranked[0], vec!["solo"]);
        assert!(ranked[1].is_empty());
    }
}
