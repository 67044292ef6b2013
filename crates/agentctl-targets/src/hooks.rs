//! Target lifecycle hooks
//!
//! `before_sync`/`after_sync` run once per target, `before_convert`/
//! `after_convert` once per item. Hooks declared in `agentctl.toml` are
//! executed as subprocesses; hooks registered in code can be any
//! [`TargetHook`] implementation.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use agentctl_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::item::ItemType;

/// The item a convert hook runs for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookItem {
    pub item_type: ItemType,
    pub name: String,
    pub source_path: NormalizedPath,
}

/// Everything a hook is told about the current sync step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookPayload {
    pub target_id: String,
    pub repo_root: NormalizedPath,
    pub home_dir: NormalizedPath,
    pub item: Option<HookItem>,
}

impl HookPayload {
    /// Environment variables exported to subprocess hooks.
    pub fn env(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("AGENTCTL_TARGET".to_string(), self.target_id.clone());
        vars.insert(
            "AGENTCTL_REPO_ROOT".to_string(),
            self.repo_root.as_str().to_string(),
        );
        vars.insert(
            "AGENTCTL_HOME_DIR".to_string(),
            self.home_dir.as_str().to_string(),
        );
        if let Some(item) = &self.item {
            vars.insert(
                "AGENTCTL_ITEM_TYPE".to_string(),
                item.item_type.as_str().to_string(),
            );
            vars.insert("AGENTCTL_ITEM_NAME".to_string(), item.name.clone());
            vars.insert(
                "AGENTCTL_ITEM_SOURCE".to_string(),
                item.source_path.as_str().to_string(),
            );
        }
        vars
    }
}

/// A callback run around a sync step. An `Err` marks the step failed.
pub trait TargetHook: Send + Sync + fmt::Debug {
    fn run(&self, payload: &HookPayload) -> Result<()>;
}

/// A hook that runs an external command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandHook {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory relative to the repository root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl CommandHook {
    pub fn new<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            working_dir: None,
        }
    }
}

impl TargetHook for CommandHook {
    fn run(&self, payload: &HookPayload) -> Result<()> {
        let repo_root = payload.repo_root.to_native();
        let work_dir = match &self.working_dir {
            Some(dir) => repo_root.join(dir),
            None => repo_root.clone(),
        };

        if let (Ok(canon_work), Ok(canon_root)) =
            (work_dir.canonicalize(), repo_root.canonicalize())
            && !canon_work.starts_with(&canon_root)
        {
            return Err(Error::HookCommand {
                command: self.command.clone(),
                message: format!(
                    "working_dir {:?} is outside the repository root {:?}",
                    work_dir, repo_root
                ),
            });
        }

        let vars = payload.env();
        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| substitute_vars(arg, &vars))
            .collect();

        tracing::debug!(command = %self.command, ?args, target = %payload.target_id, "Running hook");

        let output = Command::new(&self.command)
            .args(&args)
            .current_dir(&work_dir)
            .envs(&vars)
            .output()
            .map_err(|e| Error::HookCommand {
                command: self.command.clone(),
                message: e.to_string(),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        let message = if stderr.is_empty() {
            format!("exited with status {:?}", output.status.code())
        } else {
            format!("exited with status {:?}: {}", output.status.code(), stderr)
        };
        Err(Error::HookCommand {
            command: self.command.clone(),
            message,
        })
    }
}

/// A hook backed by a closure.
pub struct FnHook {
    name: String,
    f: Box<dyn Fn(&HookPayload) -> std::result::Result<(), String> + Send + Sync>,
}

impl FnHook {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&HookPayload) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f: Box::new(f),
        }
    }
}

impl fmt::Debug for FnHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHook").field("name", &self.name).finish()
    }
}

impl TargetHook for FnHook {
    fn run(&self, payload: &HookPayload) -> Result<()> {
        (self.f)(payload).map_err(|message| Error::Hook { message })
    }
}

/// The four hook slots of a target.
#[derive(Debug, Clone, Default)]
pub struct TargetHooks {
    pub before_sync: Option<Arc<dyn TargetHook>>,
    pub after_sync: Option<Arc<dyn TargetHook>>,
    pub before_convert: Option<Arc<dyn TargetHook>>,
    pub after_convert: Option<Arc<dyn TargetHook>>,
}

impl TargetHooks {
    pub fn is_empty(&self) -> bool {
        self.before_sync.is_none()
            && self.after_sync.is_none()
            && self.before_convert.is_none()
            && self.after_convert.is_none()
    }

    /// Fill every slot set in `other`, keeping the rest.
    pub fn merge(&mut self, other: TargetHooks) {
        if other.before_sync.is_some() {
            self.before_sync = other.before_sync;
        }
        if other.after_sync.is_some() {
            self.after_sync = other.after_sync;
        }
        if other.before_convert.is_some() {
            self.before_convert = other.before_convert;
        }
        if other.after_convert.is_some() {
            self.after_convert = other.after_convert;
        }
    }
}

/// Substitute `${VAR_NAME}` patterns with hook environment values.
fn substitute_vars(input: &str, vars: &HashMap<String, String>) -> String {
    let mut result = input.to_string();
    for (key, value) in vars {
        let pattern = format!("${{{}}}", key);
        result = result.replace(&pattern, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn payload(root: &std::path::Path) -> HookPayload {
        HookPayload {
            target_id: "claude".into(),
            repo_root: NormalizedPath::new(root),
            home_dir: NormalizedPath::new("/home/dev"),
            item: Some(HookItem {
                item_type: ItemType::Command,
                name: "deploy".into(),
                source_path: NormalizedPath::new("/repo/agents/commands/deploy.md"),
            }),
        }
    }

    #[test]
    fn env_includes_item_fields() {
        let vars = payload(std::path::Path::new("/repo")).env();
        assert_eq!(vars["AGENTCTL_TARGET"], "claude");
        assert_eq!(vars["AGENTCTL_ITEM_TYPE"], "command");
        assert_eq!(vars["AGENTCTL_ITEM_NAME"], "deploy");
    }

    #[test]
    fn substitutes_vars_in_args() {
        let mut vars = HashMap::new();
        vars.insert("AGENTCTL_TARGET".to_string(), "gemini".to_string());
        assert_eq!(
            substitute_vars("sync ${AGENTCTL_TARGET}", &vars),
            "sync gemini"
        );
        assert_eq!(substitute_vars("plain", &vars), "plain");
    }

    #[cfg(unix)]
    #[test]
    fn command_hook_success() {
        let temp = TempDir::new().unwrap();
        let hook = CommandHook::new("sh", ["-c", "test \"$AGENTCTL_ITEM_NAME\" = deploy"]);
        hook.run(&payload(temp.path())).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn command_hook_failure_carries_stderr() {
        let temp = TempDir::new().unwrap();
        let hook = CommandHook::new("sh", ["-c", "echo nope >&2; exit 3"]);
        let err = hook.run(&payload(temp.path())).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Some(3)"));
        assert!(msg.contains("nope"));
    }

    #[test]
    fn command_hook_missing_binary_is_error() {
        let temp = TempDir::new().unwrap();
        let hook = CommandHook::new("agentctl-definitely-missing-binary", Vec::<String>::new());
        assert!(hook.run(&payload(temp.path())).is_err());
    }

    #[test]
    fn fn_hook_maps_message() {
        let hook = FnHook::new("boom", |_| Err("exploded".to_string()));
        let err = hook.run(&payload(std::path::Path::new("/repo"))).unwrap_err();
        assert_eq!(err.to_string(), "exploded");
    }

    #[test]
    fn merge_keeps_unset_slots() {
        let mut base = TargetHooks {
            before_sync: Some(Arc::new(FnHook::new("a", |_| Ok(())))),
            ..TargetHooks::default()
        };
        base.merge(TargetHooks {
            after_sync: Some(Arc::new(FnHook::new("b", |_| Ok(())))),
            ..TargetHooks::default()
        });
        assert!(base.before_sync.is_some());
        assert!(base.after_sync.is_some());
        assert!(base.before_convert.is_none());
    }

    #[test]
    fn command_hook_parses_from_toml() {
        let hook: CommandHook = toml::from_str(
            r#"
command = "sh"
args = ["-c", "mkdir -p .acme"]
working_dir = "tools"
"#,
        )
        .unwrap();
        assert_eq!(hook.command, "sh");
        assert_eq!(hook.args.len(), 2);
        assert_eq!(hook.working_dir, Some(PathBuf::from("tools")));
    }
}
