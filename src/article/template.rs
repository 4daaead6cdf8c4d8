//! Protection of article bodies from Hexo's template engine.

use crate::domain::RawWrapMode;

const RAW_OPEN: &str = "{% raw %}";
const RAW_CLOSE: &str = "{% endraw %}";

/// Whether the body contains anything Nunjucks would interpret.
pub fn has_template_syntax(body: &str) -> bool {
    body.contains("{{") || body.contains("{%") || body.contains("{#")
}

pub fn is_raw_wrapped(body: &str) -> bool {
    let trimmed = body.trim();
    trimmed.starts_with(RAW_OPEN) && trimmed.ends_with(RAW_CLOSE)
}

pub fn should_wrap(body: &str, mode: RawWrapMode) -> bool {
    if is_raw_wrapped(body) {
        return false;
    }
    match mode {
        RawWrapMode::Always => true,
        RawWrapMode::Never => false,
        RawWrapMode::Auto => has_template_syntax(body),
    }
}

/// Wrap the body in a raw block, keeping leading blank lines outside it.
pub fn wrap_raw(body: &str) -> String {
    let content = body.trim_start_matches(['\n', '\r']);
    let lead = &body[..body.len() - content.len()];
    let mut out = String::with_capacity(body.len() + RAW_OPEN.len() + RAW_CLOSE.len() + 2);
    out.push_str(lead);
    out.push_str(RAW_OPEN);
    out.push('\n');
    out.push_str(content);
    if !content.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(RAW_CLOSE);
    out.push('\n');
    out
}

/// Replace double braces with HTML entities.
pub fn escape_curly(body: &str) -> String {
    body.replace("{{", "&#123;&#123;").replace("}}", "&#125;&#125;")
}

/// Apply curly escaping and raw wrapping to a body.
pub fn protect_body(body: &str, mode: RawWrapMode, escape: bool) -> String {
    let body = if escape { escape_curly(body) } else { body.to_string() };
    if should_wrap(&body, mode) {
        wrap_raw(&body)
    } else {
        body
    }
}
