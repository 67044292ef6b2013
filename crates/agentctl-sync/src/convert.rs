//! Per-target item conversion
//!
//! Maps one catalog item onto one target's conventions, applying the
//! target's fallbacks and the run's options. The result says which files
//! the item should produce; it never touches the filesystem.

use std::collections::BTreeSet;

use agentctl_catalog::{ItemDetails, SKILL_FILE, SourceItem};
use agentctl_fs::NormalizedPath;
use agentctl_targets::{
    CommandFormat, CommandSupport, FallbackPolicy, ItemType, Scope, ScopedTemplates,
    SubagentSupport, TargetProfile, TemplateContext,
};

use crate::options::{CodexOption, PlanOptions};
use crate::render::{
    ConvertResult, RenderedFile, render_instruction, render_markdown_command,
    render_skill_from_item, render_toml_command,
};

/// Inputs shared by every conversion for one target.
#[derive(Debug, Clone, Copy)]
pub struct ConvertContext<'a> {
    pub templates: &'a TemplateContext,
    /// Scope chosen for this target's commands.
    pub scope: Scope,
    pub options: &'a PlanOptions,
    /// Catalog skills synced natively to this target.
    pub native_skills: &'a BTreeSet<String>,
}

/// Convert `item` for `profile`.
pub fn convert(item: &SourceItem, profile: &TargetProfile, ctx: &ConvertContext<'_>) -> ConvertResult {
    match item.item_type {
        ItemType::Command => convert_command(item, profile, ctx),
        ItemType::Skill => convert_skill(item, profile, ctx),
        ItemType::Subagent => match &profile.subagents {
            SubagentSupport::Native { template } => ConvertResult::Created(RenderedFile::new(
                ctx.templates.render(template, Some(&item.name)),
                item.raw.clone(),
            )),
            SubagentSupport::Fallback(FallbackPolicy::ConvertToSkills) => {
                skill_from_item(item, profile, ctx, ctx.scope)
            }
            SubagentSupport::Fallback(FallbackPolicy::Skip) => ConvertResult::Skipped(format!(
                "{} does not support subagents",
                profile.display_name
            )),
        },
        ItemType::Instruction => convert_instruction(item, profile, ctx),
    }
}

fn convert_command(item: &SourceItem, profile: &TargetProfile, ctx: &ConvertContext<'_>) -> ConvertResult {
    match &profile.commands {
        CommandSupport::Native { templates, format } => match scoped(templates, ctx.scope) {
            Some((_, template)) => command_file(item, ctx, template, *format),
            None => ConvertResult::Failed(format!(
                "{} declares no command path",
                profile.display_name
            )),
        },
        CommandSupport::GlobalPromptsOnly { template, format } => match ctx.options.codex_option {
            CodexOption::Prompts => command_file(item, ctx, template, *format),
            CodexOption::ConvertToSkills => match ctx.options.codex_conversion_scope.scope() {
                Some(scope) => skill_from_item(item, profile, ctx, scope),
                None => ConvertResult::Skipped("command to skill conversion is disabled".to_string()),
            },
            CodexOption::Skip => ConvertResult::Skipped(format!(
                "{} prompts are skipped",
                profile.display_name
            )),
        },
        CommandSupport::Unsupported => match ctx.options.unsupported_fallback {
            FallbackPolicy::ConvertToSkills => skill_from_item(item, profile, ctx, ctx.scope),
            FallbackPolicy::Skip => ConvertResult::Skipped(format!(
                "{} does not support slash commands",
                profile.display_name
            )),
        },
    }
}

fn command_file(
    item: &SourceItem,
    ctx: &ConvertContext<'_>,
    template: &str,
    format: CommandFormat,
) -> ConvertResult {
    let content = match format {
        CommandFormat::Markdown => render_markdown_command(item.prompt()),
        CommandFormat::Toml => render_toml_command(item),
    };
    ConvertResult::Created(RenderedFile::new(
        ctx.templates.render(template, Some(&item.name)),
        content,
    ))
}

fn convert_skill(item: &SourceItem, profile: &TargetProfile, ctx: &ConvertContext<'_>) -> ConvertResult {
    let Some(dir) = skill_dir(&profile.skills, ctx, ctx.scope, &item.name) else {
        return ConvertResult::Skipped(format!("{} does not support skills", profile.display_name));
    };
    let mut files = vec![RenderedFile::new(dir.join(SKILL_FILE), item.raw.clone())];
    if let ItemDetails::Skill { files: support, .. } = &item.details {
        files.extend(
            support
                .iter()
                .map(|file| RenderedFile::new(dir.join(&file.relative_path), file.content.clone())),
        );
    }
    ConvertResult::CreatedMany(files)
}

/// Write a command or subagent as a generated skill.
fn skill_from_item(
    item: &SourceItem,
    profile: &TargetProfile,
    ctx: &ConvertContext<'_>,
    scope: Scope,
) -> ConvertResult {
    if ctx.native_skills.contains(&item.name) {
        return ConvertResult::Satisfied(format!(
            "skill '{}' already exists in the catalog",
            item.name
        ));
    }
    match skill_dir(&profile.skills, ctx, scope, &item.name) {
        Some(dir) => ConvertResult::Created(RenderedFile::new(
            dir.join(SKILL_FILE),
            render_skill_from_item(item),
        )),
        None => ConvertResult::Failed(format!(
            "{} has no skill path to convert {} '{}' into",
            profile.display_name, item.item_type, item.name
        )),
    }
}

fn convert_instruction(
    item: &SourceItem,
    profile: &TargetProfile,
    ctx: &ConvertContext<'_>,
) -> ConvertResult {
    let Some(file_name) = &profile.instructions else {
        return ConvertResult::Skipped(format!(
            "{} has no instruction file",
            profile.display_name
        ));
    };
    let dir = match &item.details {
        ItemDetails::Instruction {
            output_dir: Some(dir),
            ..
        } => dir.clone(),
        _ => ctx.templates.repo_root.clone(),
    };
    ConvertResult::Created(RenderedFile::new(dir.join(file_name), render_instruction(item)))
}

/// Template for `scope`, falling back to the other scope.
fn scoped(templates: &ScopedTemplates, scope: Scope) -> Option<(Scope, &str)> {
    templates
        .get(scope)
        .map(|t| (scope, t))
        .or_else(|| {
            templates
                .scopes()
                .into_iter()
                .find_map(|s| templates.get(s).map(|t| (s, t)))
        })
}

fn skill_dir(
    templates: &ScopedTemplates,
    ctx: &ConvertContext<'_>,
    scope: Scope,
    name: &str,
) -> Option<NormalizedPath> {
    scoped(templates, scope).map(|(_, template)| ctx.templates.render(template, Some(name)))
}
