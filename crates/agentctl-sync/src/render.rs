//! Desired output content for each target convention

use agentctl_catalog::{FrontmatterValue, SourceItem};
use agentctl_fs::NormalizedPath;
use toml_edit::{Array, DocumentMut, value};

/// Frontmatter keys never copied into TOML commands.
const TOML_RESERVED_KEYS: [&str; 3] = ["prompt", "targets", "targetagents"];

/// One file a conversion wants on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: NormalizedPath,
    pub content: String,
}

impl RenderedFile {
    pub fn new(path: NormalizedPath, content: impl Into<String>) -> Self {
        Self {
            path,
            content: content.into(),
        }
    }
}

/// Outcome of converting one item for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertResult {
    Created(RenderedFile),
    /// Multi-file outputs such as a skill with support files.
    CreatedMany(Vec<RenderedFile>),
    /// The target has no place for the item; reported as a warning.
    Skipped(String),
    /// Another catalog item already provides the output.
    Satisfied(String),
    Failed(String),
}

impl ConvertResult {
    /// Files to plan, empty for the non-writing variants.
    pub fn into_files(self) -> Vec<RenderedFile> {
        match self {
            Self::Created(file) => vec![file],
            Self::CreatedMany(files) => files,
            Self::Skipped(_) | Self::Satisfied(_) | Self::Failed(_) => Vec::new(),
        }
    }
}

fn ensure_trailing_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// Markdown command or prompt file: the prompt with trailing whitespace trimmed.
pub fn render_markdown_command(prompt: &str) -> String {
    ensure_trailing_newline(prompt.trim_end().to_string())
}

/// TOML command file: non-reserved frontmatter keys in source order, then `prompt`.
pub fn render_toml_command(item: &SourceItem) -> String {
    let mut doc = DocumentMut::new();
    for (key, entry) in item.frontmatter.iter() {
        let key = key.trim();
        if key.is_empty() || TOML_RESERVED_KEYS.contains(&key.to_ascii_lowercase().as_str()) {
            continue;
        }
        match entry {
            FrontmatterValue::Text(text) => doc[key] = value(text.as_str()),
            FrontmatterValue::List(items) => {
                let array: Array = items.iter().map(String::as_str).collect();
                doc[key] = value(array);
            }
        }
    }
    doc["prompt"] = value(item.prompt());
    ensure_trailing_newline(doc.to_string())
}

/// Skill body generated from a command or subagent.
pub fn render_skill_from_item(item: &SourceItem) -> String {
    ensure_trailing_newline(format!("# {}\n\n{}", item.name, item.prompt().trim()))
}

/// Instruction file: the body with frontmatter stripped.
pub fn render_instruction(item: &SourceItem) -> String {
    ensure_trailing_newline(item.body.clone())
}
