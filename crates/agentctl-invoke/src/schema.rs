//! Per-CLI invocation schema
//!
//! A [`CliSchema`] is pure data apart from the optional [`CustomTranslate`]
//! escape hatch. It deserializes from TOML so that repository config can
//! describe custom targets.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::request::{
    ApprovalPolicy, FlagKey, InvocationMode, InvocationRequest, OutputFormat, SandboxMode,
};
use crate::translate::TranslationResult;

/// Arguments emitted for one abstract value.
///
/// `Unsupported` is an explicit "this CLI cannot do that" marker. It is
/// written as `false` in config files, since TOML has no null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagArgs {
    Args(Vec<String>),
    Unsupported,
}

impl FlagArgs {
    pub fn args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Args(args.into_iter().map(Into::into).collect())
    }

    /// A supported value that needs no arguments (the CLI default).
    pub fn none() -> Self {
        Self::Args(Vec::new())
    }

    pub fn as_args(&self) -> Option<&[String]> {
        match self {
            Self::Args(args) => Some(args),
            Self::Unsupported => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlagArgs {
    Args(Vec<String>),
    Toggle(bool),
    Null(()),
}

impl<'de> Deserialize<'de> for FlagArgs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawFlagArgs::deserialize(deserializer)? {
            RawFlagArgs::Args(args) => Ok(FlagArgs::Args(args)),
            RawFlagArgs::Toggle(false) | RawFlagArgs::Null(()) => Ok(FlagArgs::Unsupported),
            RawFlagArgs::Toggle(true) => Err(serde::de::Error::custom(
                "flag mapping must be an argument list or `false`",
            )),
        }
    }
}

impl Serialize for FlagArgs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FlagArgs::Args(args) => args.serialize(serializer),
            FlagArgs::Unsupported => serializer.serialize_bool(false),
        }
    }
}

/// Mapping from an abstract value to CLI arguments, optionally per mode.
///
/// Lookup prefers `by_mode[mode][value]` and falls back to `values[value]`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagMap<K> {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    values: BTreeMap<String, FlagArgs>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    by_mode: BTreeMap<String, BTreeMap<String, FlagArgs>>,
    #[serde(skip)]
    _key: PhantomData<K>,
}

impl<K> Default for FlagMap<K> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
            by_mode: BTreeMap::new(),
            _key: PhantomData,
        }
    }
}

impl<K> fmt::Debug for FlagMap<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagMap")
            .field("values", &self.values)
            .field("by_mode", &self.by_mode)
            .finish()
    }
}

impl<K: FlagKey> FlagMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `key` to `args` in every mode.
    pub fn value(mut self, key: K, args: FlagArgs) -> Self {
        self.values.insert(key.as_str().to_string(), args);
        self
    }

    /// Map `key` to `args` only when running in `mode`.
    pub fn mode_value(mut self, mode: InvocationMode, key: K, args: FlagArgs) -> Self {
        self.by_mode
            .entry(mode.as_str().to_string())
            .or_default()
            .insert(key.as_str().to_string(), args);
        self
    }

    /// Resolve the mapping for `key` in `mode`.
    ///
    /// Returns `None` both when no entry exists and when the entry is
    /// explicitly unsupported.
    pub fn resolve(&self, mode: InvocationMode, key: K) -> Option<&[String]> {
        self.by_mode
            .get(mode.as_str())
            .and_then(|m| m.get(key.as_str()))
            .or_else(|| self.values.get(key.as_str()))
            .and_then(FlagArgs::as_args)
    }
}

/// Base command and arguments for one invocation mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeInvocation {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ModeInvocation {
    pub fn new<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CliModes {
    pub interactive: ModeInvocation,
    pub one_shot: ModeInvocation,
}

impl CliModes {
    pub fn get(&self, mode: InvocationMode) -> &ModeInvocation {
        match mode {
            InvocationMode::Interactive => &self.interactive,
            InvocationMode::OneShot => &self.one_shot,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptPosition {
    First,
    #[default]
    Last,
}

/// How a one-shot prompt is passed to the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PromptSpec {
    /// `[...flag, prompt]`, placed after the other arguments.
    Flag { flag: Vec<String> },
    /// A bare positional argument.
    Positional {
        #[serde(default)]
        position: PromptPosition,
    },
}

/// `--model` style flag; the model name is appended after `flag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFlag {
    pub flag: Vec<String>,
    /// Modes that accept the flag. Empty means all modes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modes: Vec<InvocationMode>,
}

/// Web access toggle. A missing or unsupported side warns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebFlag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<FlagArgs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off: Option<FlagArgs>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modes: Vec<InvocationMode>,
}

fn mode_allowed(modes: &[InvocationMode], mode: InvocationMode) -> bool {
    modes.is_empty() || modes.contains(&mode)
}

impl ModelFlag {
    pub fn allows(&self, mode: InvocationMode) -> bool {
        mode_allowed(&self.modes, mode)
    }
}

impl WebFlag {
    pub fn allows(&self, mode: InvocationMode) -> bool {
        mode_allowed(&self.modes, mode)
    }

    pub fn resolve(&self, enabled: bool) -> Option<&[String]> {
        let side = if enabled { &self.on } else { &self.off };
        side.as_ref().and_then(FlagArgs::as_args)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<FlagMap<ApprovalPolicy>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<FlagMap<SandboxMode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<FlagMap<OutputFormat>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<WebFlag>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PassthroughPosition {
    BeforePrompt,
    #[default]
    After,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassthroughSpec {
    #[serde(default)]
    pub position: PassthroughPosition,
}

/// A target-provided translation that replaces the generic algorithm.
#[derive(Clone)]
pub struct CustomTranslate(
    pub Arc<dyn Fn(&InvocationRequest) -> TranslationResult + Send + Sync>,
);

impl CustomTranslate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&InvocationRequest) -> TranslationResult + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, request: &InvocationRequest) -> TranslationResult {
        (self.0)(request)
    }
}

impl fmt::Debug for CustomTranslate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomTranslate(..)")
    }
}

impl PartialEq for CustomTranslate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for CustomTranslate {}

/// One target CLI's invocation dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliSchema {
    /// Target id, used in warnings.
    #[serde(default)]
    pub agent: String,
    pub modes: CliModes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<PromptSpec>,
    #[serde(default)]
    pub flags: CliFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passthrough: Option<PassthroughSpec>,
    #[serde(skip)]
    pub translate: Option<CustomTranslate>,
}

impl CliSchema {
    /// Schema running `command` with no base arguments in either mode.
    pub fn new(agent: impl Into<String>, command: impl Into<String>) -> Self {
        let command = command.into();
        Self {
            agent: agent.into(),
            modes: CliModes {
                interactive: ModeInvocation::new(command.clone(), Vec::<String>::new()),
                one_shot: ModeInvocation::new(command, Vec::<String>::new()),
            },
            ..Self::default()
        }
    }

    pub fn passthrough_position(&self) -> PassthroughPosition {
        self.passthrough.map(|p| p.position).unwrap_or_default()
    }
}
