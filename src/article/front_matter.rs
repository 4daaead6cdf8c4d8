//! Front matter splitting, parsing, merging and rendering.
//!
//! Two header styles are recognized at the very start of a file: YAML
//! between `---` lines and Hexo's JSON style between `;;;` lines. Headers are
//! always written back as YAML.

use anyhow::{bail, Context, Result};
use serde_yaml::{Mapping, Value};

pub const KEY_TITLE: &str = "title";
pub const KEY_DATE: &str = "date";
pub const KEY_UPDATED: &str = "updated";
pub const KEY_COVER: &str = "cover";
pub const KEY_TAGS: &str = "tags";
pub const KEY_CATEGORIES: &str = "categories";

/// Keys this tool owns, in the order they are written.
pub const KNOWN_KEYS: &[&str] =
    &[KEY_TITLE, KEY_DATE, KEY_UPDATED, KEY_COVER, KEY_TAGS, KEY_CATEGORIES];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Yaml,
    Json,
}

impl Delimiter {
    fn token(&self) -> &'static str {
        match self {
            Delimiter::Yaml => "---",
            Delimiter::Json => ";;;",
        }
    }
}

/// An unparsed header block and the body that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDocument<'a> {
    pub header: Option<RawHeader<'a>>,
    pub body: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHeader<'a> {
    pub delimiter: Delimiter,
    pub inner: &'a str,
}

/// Split a leading header block from `content`.
///
/// The block must open on the first line and close on a later line holding
/// the same token. Without a closing line the whole input is body.
pub fn split_front_matter(content: &str) -> SplitDocument<'_> {
    let no_header = SplitDocument { header: None, body: content };

    let delimiter = if content.starts_with("---\n") || content.starts_with("---\r\n") {
        Delimiter::Yaml
    } else if content.starts_with(";;;\n") || content.starts_with(";;;\r\n") {
        Delimiter::Json
    } else {
        return no_header;
    };

    let token = delimiter.token();
    let Some(first_end) = content.find('\n').map(|i| i + 1) else {
        return no_header;
    };

    let mut offset = first_end;
    for line in content[first_end..].split_inclusive('\n') {
        if line.trim() == token {
            let inner = &content[first_end..offset];
            let body = &content[offset + line.len()..];
            return SplitDocument { header: Some(RawHeader { delimiter, inner }), body };
        }
        offset += line.len();
    }
    no_header
}

/// Parsed header: an ordered key/value mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrontMatter {
    pub mapping: Mapping,
}

impl FrontMatter {
    pub fn parse(raw: &RawHeader<'_>) -> Result<Self> {
        let value = match raw.delimiter {
            Delimiter::Yaml => {
                serde_yaml::from_str::<Value>(raw.inner).context("Invalid YAML front matter")?
            }
            Delimiter::Json => parse_json_header(raw.inner)?,
        };
        match value {
            Value::Mapping(mapping) => Ok(Self { mapping }),
            Value::Null => Ok(Self::default()),
            _ => bail!("Front matter is not a key/value mapping"),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.mapping.get(key).filter(|v| !v.is_null())
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// True when every key this tool derives is already present.
    pub fn is_complete(&self) -> bool {
        KNOWN_KEYS.iter().all(|k| self.has(k))
    }

    /// Tags listed in the header, accepting a sequence or a single string.
    pub fn tags(&self) -> Vec<String> {
        string_list(self.get(KEY_TAGS))
    }

    pub fn covers(&self) -> Vec<String> {
        string_list(self.get(KEY_COVER))
    }

    pub fn render(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(&self.mapping).context("Failed to encode front matter")?;
        Ok(format!("---\n{yaml}---\n"))
    }
}

fn parse_json_header(inner: &str) -> Result<Value> {
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    // Hexo accepts the object with or without its surrounding braces.
    let json: serde_json::Value = serde_json::from_str(trimmed)
        .or_else(|_| serde_json::from_str(&format!("{{{trimmed}}}")))
        .context("Invalid JSON front matter")?;
    serde_yaml::to_value(json).context("Failed to convert JSON front matter")
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar_string).collect(),
        Some(other) => scalar_string(other).into_iter().collect(),
        None => Vec::new(),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Values computed for one article.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DerivedFields {
    pub title: String,
    pub date: String,
    pub updated: String,
    pub covers: Vec<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
}

impl DerivedFields {
    fn value_for(&self, key: &str) -> Value {
        let seq = |items: &[String]| {
            Value::Sequence(items.iter().map(|s| Value::String(s.clone())).collect())
        };
        match key {
            KEY_TITLE => Value::String(self.title.clone()),
            KEY_DATE => Value::String(self.date.clone()),
            KEY_UPDATED => Value::String(self.updated.clone()),
            KEY_COVER => match self.covers.as_slice() {
                [] => Value::Null,
                [single] => Value::String(single.clone()),
                many => seq(many),
            },
            KEY_TAGS => seq(&self.tags),
            KEY_CATEGORIES => seq(&self.categories),
            _ => Value::Null,
        }
    }
}

/// Merge derived values into an existing header.
///
/// Known keys come first in canonical order. With `overwrite` every derived
/// key replaces the existing value; otherwise only missing keys are filled.
/// Other keys follow in their original order, untouched.
pub fn merge(existing: Option<&FrontMatter>, derived: &DerivedFields, overwrite: bool) -> FrontMatter {
    let mut mapping = Mapping::new();
    for key in KNOWN_KEYS {
        let kept = if overwrite { None } else { existing.and_then(|fm| fm.get(key)) };
        let value = match kept {
            Some(v) => v.clone(),
            None => derived.value_for(key),
        };
        if !value.is_null() {
            mapping.insert(Value::String((*key).to_string()), value);
        }
    }

    if let Some(fm) = existing {
        for (key, value) in &fm.mapping {
            let is_known = key.as_str().map(|k| KNOWN_KEYS.contains(&k)).unwrap_or(false);
            if !is_known {
                mapping.insert(key.clone(), value.clone());
            }
        }
    }
    FrontMatter { mapping }
}
