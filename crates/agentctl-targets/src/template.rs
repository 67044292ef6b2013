//! Output path templates
//!
//! Templates use `{repoRoot}`, `{homeDir}` and `{itemName}` placeholders.
//! A template that renders to a relative path is resolved against the
//! repository root.

use std::path::Path;

use agentctl_fs::NormalizedPath;

/// Roots that output templates are rendered against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContext {
    pub repo_root: NormalizedPath,
    pub home_dir: NormalizedPath,
}

impl TemplateContext {
    pub fn new(repo_root: impl AsRef<Path>, home_dir: impl AsRef<Path>) -> Self {
        Self {
            repo_root: NormalizedPath::new(repo_root),
            home_dir: NormalizedPath::new(home_dir),
        }
    }

    /// Substitute placeholders without resolving the result.
    pub fn expand(&self, template: &str, item_name: Option<&str>) -> String {
        let mut out = template
            .replace("{repoRoot}", self.repo_root.as_str())
            .replace("{homeDir}", self.home_dir.as_str());
        if let Some(name) = item_name {
            out = out.replace("{itemName}", name);
        }
        out
    }

    /// Render `template` for `item_name` into an absolute output path.
    pub fn render(&self, template: &str, item_name: Option<&str>) -> NormalizedPath {
        let expanded = NormalizedPath::new(self.expand(template, item_name));
        if expanded.is_absolute() {
            expanded
        } else {
            self.repo_root.join(expanded.as_str())
        }
    }
}

/// True when `template` varies per item.
pub fn has_item_placeholder(template: &str) -> bool {
    template.contains("{itemName}")
}
