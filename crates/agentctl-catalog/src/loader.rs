//! Catalog loading from `<repo>/agents`

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use agentctl_fs::{CATALOG_DIR, NormalizedPath, io};
use agentctl_targets::{ItemType, TargetRegistry};

use crate::error::{Error, Result};
use crate::frontmatter::{Frontmatter, parse_frontmatter};
use crate::item::{ItemDetails, SkillFile, SourceItem, SourceType};
use crate::targets::resolve_targets;

/// File holding a skill's main prompt.
pub const SKILL_FILE: &str = "SKILL.md";

const LOCAL_SUFFIX: &str = ".local";
const OUTPUT_PATH_KEYS: [&str; 2] = ["outPutPath", "outputPath"];

/// All items loaded from one repository's catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub repo_root: NormalizedPath,
    pub items: Vec<SourceItem>,
}

impl Catalog {
    /// Items of one kind, sorted by name.
    pub fn items_of(&self, item_type: ItemType) -> impl Iterator<Item = &SourceItem> {
        self.items.iter().filter(move |i| i.item_type == item_type)
    }

    pub fn find(&self, item_type: ItemType, name: &str) -> Option<&SourceItem> {
        self.items_of(item_type).find(|i| i.name == name)
    }

    pub fn contains(&self, item_type: ItemType, name: &str) -> bool {
        self.find(item_type, name).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Load every item under `<repo_root>/agents`.
///
/// Fails when the catalog directory is missing, when an item lists unknown
/// or empty targets, or when two items of one kind share a name.
pub fn load(repo_root: &Path, registry: &TargetRegistry) -> Result<Catalog> {
    let root = NormalizedPath::new(repo_root);
    let catalog_dir = root.join(CATALOG_DIR);
    if !catalog_dir.is_dir() {
        return Err(Error::CatalogNotFound {
            path: catalog_dir.to_native(),
        });
    }

    let mut items = Vec::new();
    let mut seen: HashMap<(ItemType, String), NormalizedPath> = HashMap::new();

    for item_type in ItemType::ALL {
        let dir = catalog_dir.join(item_type.catalog_dir());
        if !dir.is_dir() {
            continue;
        }
        for entry in sorted_entries(&dir.to_native())? {
            let Some(item) = load_entry(&root, item_type, &entry, registry)? else {
                continue;
            };
            if !is_valid_name(&item.name) {
                return Err(Error::InvalidName {
                    path: item.source_path.to_native(),
                    name: item.name,
                });
            }
            let key = (item.item_type, item.name.clone());
            if let Some(first) = seen.get(&key) {
                return Err(Error::DuplicateItem {
                    item_type,
                    name: item.name,
                    first: first.to_native(),
                    second: item.source_path.to_native(),
                });
            }
            seen.insert(key, item.source_path.clone());
            items.push(item);
        }
    }

    items.sort_by(|a, b| (a.item_type, &a.name).cmp(&(b.item_type, &b.name)));
    tracing::debug!(count = items.len(), catalog = %catalog_dir, "Loaded catalog");

    Ok(Catalog {
        repo_root: root,
        items,
    })
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| agentctl_fs::Error::io(dir, e))? {
        let entry = entry.map_err(|e| agentctl_fs::Error::io(dir, e))?;
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

/// Item names become single path components in output templates.
fn is_valid_name(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Split `deploy.local` into (`deploy`, Local).
fn split_local(stem: &str) -> (String, SourceType) {
    match stem.strip_suffix(LOCAL_SUFFIX) {
        Some(name) if !name.is_empty() => (name.to_string(), SourceType::Local),
        _ => (stem.to_string(), SourceType::Shared),
    }
}

fn load_entry(
    root: &NormalizedPath,
    item_type: ItemType,
    path: &Path,
    registry: &TargetRegistry,
) -> Result<Option<SourceItem>> {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };
    if item_type == ItemType::Skill {
        return load_skill(path, registry);
    }
    let Some(stem) = file_name.strip_suffix(".md") else {
        return Ok(None);
    };
    if !path.is_file() {
        return Ok(None);
    }

    let source_path = NormalizedPath::new(path);
    let raw = io::read_text(&source_path)?;
    let (frontmatter, body, target_restriction) = parse_item(path, &raw, registry)?;
    let (stem_name, source_type) = split_local(stem);

    let (name, details) = match item_type {
        ItemType::Command => {
            let prompt = frontmatter
                .get("prompt")
                .and_then(|v| v.as_text())
                .map(str::to_string)
                .unwrap_or_else(|| body.clone());
            (stem_name, ItemDetails::Command { prompt })
        }
        ItemType::Subagent => {
            let name = frontmatter
                .get("name")
                .and_then(|v| v.trimmed_text())
                .map(str::to_string)
                .unwrap_or(stem_name);
            (
                name,
                ItemDetails::Subagent {
                    file_name: file_name.to_string(),
                },
            )
        }
        ItemType::Instruction => {
            let output_dir = OUTPUT_PATH_KEYS
                .iter()
                .find_map(|key| frontmatter.get(key).and_then(|v| v.trimmed_text()))
                .map(|raw| resolve_output_dir(root, raw));
            let group = frontmatter
                .get("group")
                .and_then(|v| v.trimmed_text())
                .map(str::to_string);
            (stem_name, ItemDetails::Instruction { output_dir, group })
        }
        ItemType::Skill => return Ok(None),
    };

    Ok(Some(SourceItem {
        item_type,
        source_path,
        source_type,
        name,
        raw,
        frontmatter,
        body,
        target_restriction,
        details,
    }))
}

fn load_skill(
    dir: &Path,
    registry: &TargetRegistry,
) -> Result<Option<SourceItem>> {
    let skill_path = dir.join(SKILL_FILE);
    if !dir.is_dir() || !skill_path.is_file() {
        return Ok(None);
    }
    let Some(dir_name) = dir.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };

    let source_path = NormalizedPath::new(&skill_path);
    let raw = io::read_text(&source_path)?;
    let (frontmatter, body, target_restriction) = parse_item(&skill_path, &raw, registry)?;
    let (name, source_type) = split_local(dir_name);

    let mut files = Vec::new();
    collect_skill_files(dir, dir, &mut files)?;
    files.sort_by(|a: &SkillFile, b| a.relative_path.cmp(&b.relative_path));

    Ok(Some(SourceItem {
        item_type: ItemType::Skill,
        source_path,
        source_type,
        name,
        raw,
        frontmatter,
        body,
        target_restriction,
        details: ItemDetails::Skill {
            directory: NormalizedPath::new(dir),
            files,
        },
    }))
}

fn collect_skill_files(base: &Path, dir: &Path, files: &mut Vec<SkillFile>) -> Result<()> {
    for path in sorted_entries(dir)? {
        if path.is_dir() {
            collect_skill_files(base, &path, files)?;
            continue;
        }
        let Ok(relative) = path.strip_prefix(base) else {
            continue;
        };
        let relative_path = NormalizedPath::new(relative).as_str().to_string();
        if relative_path == SKILL_FILE {
            continue;
        }
        let bytes = fs::read(&path).map_err(|e| agentctl_fs::Error::io(&path, e))?;
        match String::from_utf8(bytes) {
            Ok(content) => files.push(SkillFile {
                relative_path,
                content,
            }),
            Err(_) => {
                tracing::warn!(path = %path.display(), "Skipping non-UTF-8 skill file");
            }
        }
    }
    Ok(())
}

fn parse_item(
    path: &Path,
    raw: &str,
    registry: &TargetRegistry,
) -> Result<(Frontmatter, String, Option<BTreeSet<String>>)> {
    let (frontmatter, body) = parse_frontmatter(raw).map_err(|message| Error::Frontmatter {
        path: path.to_path_buf(),
        message,
    })?;

    let resolution = resolve_targets(&frontmatter, registry);
    if !resolution.invalid.is_empty() {
        return Err(Error::InvalidTargets {
            path: path.to_path_buf(),
            targets: resolution.invalid.join(", "),
        });
    }
    let restriction = match resolution.targets {
        Some(targets) if targets.is_empty() && resolution.had_raw_values => {
            return Err(Error::EmptyTargets {
                path: path.to_path_buf(),
            });
        }
        Some(targets) => Some(targets.into_iter().collect()),
        None => None,
    };

    Ok((frontmatter, body, restriction))
}

/// Resolve an instruction's `outputPath` to a directory.
fn resolve_output_dir(root: &NormalizedPath, raw: &str) -> NormalizedPath {
    let trimmed = raw.trim_end_matches(['/', '\\']);
    let candidate = NormalizedPath::new(if trimmed.is_empty() { raw } else { trimmed });
    let absolute = if candidate.is_absolute() {
        candidate
    } else {
        root.join(candidate.as_str())
    };
    let is_markdown = absolute
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
    match (is_markdown, absolute.parent()) {
        (true, Some(parent)) => parent,
        _ => absolute,
    }
}
