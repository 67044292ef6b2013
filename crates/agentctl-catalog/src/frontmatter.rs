//! YAML frontmatter parsing
//!
//! Values are flattened to strings or string lists. Key order is preserved
//! so renderers can emit keys in source order.

use serde::Serialize;
use serde_yaml::Value;

/// A frontmatter value: a scalar string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FrontmatterValue {
    Text(String),
    List(Vec<String>),
}

impl FrontmatterValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// Non-empty trimmed text, if this is a scalar.
    pub fn trimmed_text(&self) -> Option<&str> {
        self.as_text().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Ordered key/value frontmatter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Frontmatter {
    entries: Vec<(String, FrontmatterValue)>,
}

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FrontmatterValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FrontmatterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split a leading `---` block from the body.
///
/// Returns `(None, content)` when there is no complete block.
pub fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let trimmed = content.trim_start_matches('\u{feff}');
    let Some(after_open) = trimmed
        .strip_prefix("---\n")
        .or_else(|| trimmed.strip_prefix("---\r\n"))
    else {
        return (None, content);
    };

    // Closing fence immediately after the opening one.
    if let Some(rest) = after_open.strip_prefix("---") {
        return (Some(""), strip_fence_newline(rest));
    }

    match after_open.find("\n---") {
        Some(end) => {
            let yaml = after_open[..end].trim_end_matches('\r');
            let rest = &after_open[end + 4..];
            (Some(yaml), strip_fence_newline(rest))
        }
        None => (None, content),
    }
}

fn strip_fence_newline(rest: &str) -> &str {
    rest.strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest)
}

/// Parse frontmatter and body from raw item text.
pub fn parse_frontmatter(content: &str) -> Result<(Frontmatter, String), String> {
    let (yaml, body) = split_frontmatter(content);
    let mut frontmatter = Frontmatter::new();
    let Some(yaml) = yaml else {
        return Ok((frontmatter, body.to_string()));
    };
    if yaml.trim().is_empty() {
        return Ok((frontmatter, body.to_string()));
    }

    let value: Value =
        serde_yaml::from_str(yaml).map_err(|e| format!("Invalid YAML frontmatter: {e}"))?;
    let mapping = match value {
        Value::Mapping(mapping) => mapping,
        Value::Null => return Ok((frontmatter, body.to_string())),
        _ => return Err("frontmatter must be a mapping".to_string()),
    };

    for (key, value) in mapping {
        let Some(key) = scalar_to_string(&key) else {
            return Err("frontmatter keys must be scalars".to_string());
        };
        if let Some(value) = to_frontmatter_value(value) {
            frontmatter.insert(key, value);
        }
    }
    Ok((frontmatter, body.to_string()))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn to_frontmatter_value(value: Value) -> Option<FrontmatterValue> {
    match value {
        Value::Null => None,
        Value::Sequence(items) => Some(FrontmatterValue::List(
            items
                .iter()
                .filter_map(|item| scalar_to_string(item).or_else(|| yaml_text(item)))
                .collect(),
        )),
        Value::Tagged(tagged) => to_frontmatter_value(tagged.value),
        other => scalar_to_string(&other)
            .or_else(|| yaml_text(&other))
            .map(FrontmatterValue::Text),
    }
}

/// Nested structures pass through as their YAML text.
fn yaml_text(value: &Value) -> Option<String> {
    if value.is_null() {
        return None;
    }
    serde_yaml::to_string(value)
        .ok()
        .map(|s| s.trim_end().to_string())
}
