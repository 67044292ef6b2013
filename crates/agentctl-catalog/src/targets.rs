//! Frontmatter target restriction resolution

use agentctl_targets::TargetRegistry;

use crate::frontmatter::{Frontmatter, FrontmatterValue};

/// Keys that restrict an item to specific targets.
pub const TARGET_KEYS: [&str; 2] = ["targets", "targetAgents"];

/// Result of resolving raw target values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetResolution {
    /// Canonical target ids in first-seen order; `None` when no raw values were given.
    pub targets: Option<Vec<String>>,
    /// Names the registry does not know, normalized.
    pub invalid: Vec<String>,
    /// Whether a `targets`/`targetAgents` key was present, whatever its content.
    pub had_raw_values: bool,
}

fn raw_entries(value: &FrontmatterValue) -> Vec<&str> {
    let parts: Vec<&str> = match value {
        FrontmatterValue::Text(s) => vec![s.as_str()],
        FrontmatterValue::List(items) => items.iter().map(String::as_str).collect(),
    };
    parts
        .into_iter()
        .flat_map(|part| part.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Resolve `targets`/`targetAgents` into canonical ids.
///
/// Names are trimmed, lowercased, split on commas and de-duplicated. Aliases
/// map to their canonical id.
pub fn resolve_targets(frontmatter: &Frontmatter, registry: &TargetRegistry) -> TargetResolution {
    let raw: Vec<&FrontmatterValue> = TARGET_KEYS
        .iter()
        .filter_map(|key| frontmatter.get(key))
        .collect();
    if raw.is_empty() {
        return TargetResolution::default();
    }

    let mut targets: Vec<String> = Vec::new();
    let mut invalid: Vec<String> = Vec::new();
    for entry in raw.into_iter().flat_map(raw_entries) {
        let normalized = entry.to_ascii_lowercase();
        match registry.canonical_id(&normalized) {
            Some(id) => {
                if !targets.iter().any(|t| t == id) {
                    targets.push(id.to_string());
                }
            }
            None => {
                if !invalid.contains(&normalized) {
                    invalid.push(normalized);
                }
            }
        }
    }

    // A present key restricts the item even when it lists nothing.
    TargetResolution {
        targets: Some(targets),
        invalid,
        had_raw_values: true,
    }
}
