//! Image reference rewriting and extraction.
//!
//! Covers Markdown `![alt](url "title")` and HTML `<img src="...">`.
//! Fenced code blocks and inline code spans are never touched.

use crate::utils::join_posix_normalized;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::ops::Range;

static MD_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(!\[[^\]]*\]\(\s*<?)([^\s)<>]+)(>?(?:\s+["'][^"']*["'])?\s*\))"#)
        .expect("valid markdown image regex")
});

static HTML_IMG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["'][^>]*>"#)
        .expect("valid html img regex")
});

static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`[^`\n]+`").expect("valid inline code regex"));

/// Byte ranges of `body` covered by fenced code blocks or inline code spans.
pub fn code_ranges(body: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut fence: Option<(char, usize, usize)> = None; // marker, length, start
    let mut offset = 0usize;
    let mut prose_start = 0usize;

    for line in body.split_inclusive('\n') {
        let trimmed = line.trim_start();
        match fence {
            None => {
                if let Some((marker, len)) = fence_marker(trimmed) {
                    push_inline(body, prose_start..offset, &mut ranges);
                    fence = Some((marker, len, offset));
                }
            }
            Some((marker, len, start)) => {
                let closes = fence_marker(trimmed)
                    .map(|(m, l)| m == marker && l >= len && trimmed.trim_end().chars().all(|c| c == marker))
                    .unwrap_or(false);
                if closes {
                    ranges.push(start..offset + line.len());
                    fence = None;
                    prose_start = offset + line.len();
                }
            }
        }
        offset += line.len();
    }

    match fence {
        Some((_, _, start)) => ranges.push(start..body.len()),
        None => push_inline(body, prose_start..body.len(), &mut ranges),
    }
    ranges
}

fn fence_marker(trimmed: &str) -> Option<(char, usize)> {
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == marker).count();
    (len >= 3).then_some((marker, len))
}

fn push_inline(body: &str, prose: Range<usize>, ranges: &mut Vec<Range<usize>>) {
    let text = &body[prose.clone()];
    for m in INLINE_CODE.find_iter(text) {
        ranges.push(prose.start + m.start()..prose.start + m.end());
    }
}

/// Alternating prose/code segments covering all of `body`.
fn segments(body: &str) -> Vec<(Range<usize>, bool)> {
    let mut out = Vec::new();
    let mut cursor = 0usize;
    for code in code_ranges(body) {
        if code.start > cursor {
            out.push((cursor..code.start, false));
        }
        out.push((code.clone(), true));
        cursor = code.end;
    }
    if cursor < body.len() {
        out.push((cursor..body.len(), false));
    }
    out
}

/// Rewrite a single relative image URL to a site-absolute one.
///
/// `md_dir` is the article's directory relative to the posts root (`.` for
/// the root itself). Returns `None` when the URL should be left alone.
pub fn rewrite_url(url: &str, md_dir: &str, image_root: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("data:")
        || url.starts_with("//")
        || url.starts_with('/')
    {
        return None;
    }

    let split_at = url.find(['?', '#']).unwrap_or(url.len());
    let (path, suffix) = url.split_at(split_at);
    let path = path.replace('\\', "/");

    let root = image_root.trim_end_matches('/');
    let bare_root = root.trim_start_matches('/');
    if !bare_root.is_empty() && (path == bare_root || path.starts_with(&format!("{bare_root}/"))) {
        return None;
    }

    let base = if md_dir == "." { "" } else { md_dir };
    let joined = join_posix_normalized(base, &path);
    let mut out = if joined.is_empty() {
        format!("{root}/")
    } else {
        format!("{root}/{joined}")
    };
    out.push_str(suffix);
    Some(out)
}

/// Rewrite every relative image reference outside code.
pub fn rewrite_image_urls(body: &str, md_dir: &str, image_root: &str) -> String {
    let mut out = String::with_capacity(body.len());
    for (range, is_code) in segments(body) {
        let text = &body[range];
        if is_code {
            out.push_str(text);
            continue;
        }
        let pass = MD_IMAGE.replace_all(text, |caps: &Captures<'_>| {
            let url = &caps[2];
            let new_url = rewrite_url(url, md_dir, image_root).unwrap_or_else(|| url.to_string());
            format!("{}{}{}", &caps[1], new_url, &caps[3])
        });
        let pass = HTML_IMG.replace_all(&pass, |caps: &Captures<'_>| {
            let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            let Some(src) = caps.get(1) else {
                return whole.to_string();
            };
            match rewrite_url(src.as_str(), md_dir, image_root) {
                Some(new_url) => {
                    let tag_start = caps.get(0).map(|m| m.start()).unwrap_or(0);
                    let (s, e) = (src.start() - tag_start, src.end() - tag_start);
                    format!("{}{}{}", &whole[..s], new_url, &whole[e..])
                }
                None => whole.to_string(),
            }
        });
        out.push_str(&pass);
    }
    out
}

/// Image URLs outside code, in document order.
pub fn extract_images(body: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = Vec::new();
    for (range, is_code) in segments(body) {
        if is_code {
            continue;
        }
        let text = &body[range.clone()];
        for caps in MD_IMAGE.captures_iter(text) {
            if let Some(url) = caps.get(2) {
                found.push((range.start + url.start(), url.as_str().to_string()));
            }
        }
        for caps in HTML_IMG.captures_iter(text) {
            if let Some(url) = caps.get(1) {
                found.push((range.start + url.start(), url.as_str().to_string()));
            }
        }
    }
    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, url)| url).collect()
}
