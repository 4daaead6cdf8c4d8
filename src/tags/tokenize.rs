//! Tag candidate tokenization.
//!
//! Latin words and numbers are taken as whole runs; CJK text, which has no
//! word separators, is split into overlapping character bigrams.

use crate::article::images::code_ranges;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static MD_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("valid image regex"));
static MD_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("valid link regex"));
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid html regex"));
static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:https?://|\bwww\.)\S+").expect("valid url regex"));

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z][A-Za-z0-9+#]*(?:[._\-][A-Za-z0-9+#]+)*|[0-9]+|[\p{Han}\p{Hiragana}\p{Katakana}\p{Hangul}]+")
        .expect("valid token regex")
});

const PATH_SUFFIXES: &[&str] = &[
    ".md", ".markdown", ".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".html", ".txt",
];

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // markup and link noise
        "note_image", "images", "image", "img", "http", "https", "www", "true", "false", "null",
        "none", "png", "jpg", "jpeg", "gif", "src", "alt", "href", "nbsp", "amp", "quot",
        // english function words
        "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her",
        "was", "one", "our", "out", "has", "have", "how", "its", "may", "new", "now", "use",
        "used", "using", "way", "who", "did", "get", "got", "let", "say", "she", "too", "that",
        "this", "with", "from", "they", "will", "would", "there", "their", "what", "about",
        "which", "when", "make", "like", "just", "into", "than", "then", "them", "these",
        "some", "could", "other", "also", "only", "more", "most", "such", "each", "very",
        "been", "being", "were", "does", "doing", "here", "where", "why", "your", "yours",
        "should", "because", "while", "after", "before", "over", "under", "again", "further",
        "both", "same", "own", "off", "once", "well", "is", "it", "in", "on", "of", "to", "as",
        "at", "by", "an", "be", "or", "if", "we", "so", "no", "do", "up", "my", "me", "he",
        // common chinese bigrams
        "一个", "我们", "可以", "这个", "没有", "什么", "就是", "如果", "因为", "所以", "但是",
        "然后", "进行", "使用", "这样", "那么", "需要", "已经", "时候", "通过", "以及", "或者",
        "不是", "这些", "那些", "其中", "之后", "之前", "的话", "也是", "还是", "是否",
    ]
    .into_iter()
    .collect()
});

/// Strip code, images, link targets, HTML and URLs from a Markdown body.
pub fn clean_text(body: &str) -> String {
    let mut prose = String::with_capacity(body.len());
    let mut cursor = 0usize;
    for range in code_ranges(body) {
        prose.push_str(&body[cursor..range.start]);
        prose.push(' ');
        cursor = range.end;
    }
    prose.push_str(&body[cursor..]);

    let text = MD_IMAGE.replace_all(&prose, " ");
    let text = MD_LINK.replace_all(&text, " $1 ");
    let text = HTML_TAG.replace_all(&text, " ");
    let text = URL.replace_all(&text, " ");
    text.into_owned()
}

fn is_cjk_run(token: &str) -> bool {
    token.chars().next().map(|c| !c.is_ascii()).unwrap_or(false)
}

fn is_path_like(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    token.contains('/') || token.contains('\\') || PATH_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token.to_lowercase().as_str())
}

fn keep(token: &str) -> bool {
    token.chars().count() >= 2
        && !token.chars().all(|c| c.is_ascii_digit())
        && !is_path_like(token)
        && !is_stopword(token)
}

/// Candidate tokens of a body in reading order, duplicates included.
pub fn tokenize(body: &str) -> Vec<String> {
    let clean = clean_text(body);
    let mut out = Vec::new();
    for m in TOKEN.find_iter(&clean) {
        let word = m.as_str();
        if is_cjk_run(word) {
            let chars: Vec<char> = word.chars().collect();
            if chars.len() <= 2 {
                out.push(word.to_string());
            } else {
                out.extend(chars.windows(2).map(|pair| pair.iter().collect::<String>()));
            }
        } else {
            out.push(word.to_string());
        }
    }
    out.retain(|t| keep(t));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_code_links_and_urls() {
        let body = "Intro to Tokio.\n```rust\nfn hidden_code() {}\n```\nSee [async docs](https://x.org/a) and `inline_span`.\n![diagram](img/flow.png) <b>bold</b> https://example.com/x\n";
        let tokens = tokenize(body);
        assert_eq!(tokens, vec!["Intro", "Tokio", "See", "async", "docs", "bold"]);
    }

    #[test]
    fn filters_noise_tokens() {
        let tokens = tokenize("a 2024 image readme.md node.js x86 C++ the");
        assert_eq!(tokens, vec!["node.js", "x86", "C++"]);
    }

    #[test]
    fn cjk_runs_become_bigrams() {
        assert_eq!(tokenize("数据库索引"), vec!["数据", "据库", "库索", "索引"]);
        assert_eq!(tokenize("缓存 的"), vec!["缓存"]);
        // stopword bigram
        assert!(tokenize("我们").is_empty());
    }
}
