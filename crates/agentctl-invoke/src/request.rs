//! Abstract invocation request types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A value that can key a per-CLI flag mapping.
///
/// Keys are the kebab-case wire names (`auto-edit`, `stream-json`), which
/// lets mappings round-trip through TOML tables and JSON objects alike.
pub trait FlagKey: Copy {
    /// Name of the abstract field, used in warnings (e.g. `--approval`).
    const FIELD: &'static str;

    fn as_str(&self) -> &'static str;
}

macro_rules! flag_enum {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal {
            $($variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl FlagKey for $name {
            const FIELD: &'static str = $field;

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(Error::UnknownValue {
                        field: $field,
                        value: other.to_string(),
                        expected: [$($wire),+].join(", "),
                    }),
                }
            }
        }
    };
}

flag_enum! {
    /// Whether the agent runs as an interactive session or a single turn.
    InvocationMode, field = "--mode" {
        Interactive => "interactive",
        OneShot => "one-shot",
    }
}

flag_enum! {
    /// How much the agent may do without asking.
    ApprovalPolicy, field = "--approval" {
        Prompt => "prompt",
        AutoEdit => "auto-edit",
        Yolo => "yolo",
    }
}

flag_enum! {
    /// Filesystem isolation requested for the agent.
    SandboxMode, field = "--sandbox" {
        WorkspaceWrite => "workspace-write",
        ReadOnly => "read-only",
        Off => "off",
    }
}

flag_enum! {
    /// Output encoding requested from the agent.
    OutputFormat, field = "--output" {
        Text => "text",
        Json => "json",
        StreamJson => "stream-json",
    }
}

impl Default for InvocationMode {
    fn default() -> Self {
        Self::Interactive
    }
}

/// Raw arguments forwarded to the target CLI untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passthrough {
    #[serde(default)]
    pub args: Vec<String>,
}

/// An abstract description of how to run an agent.
///
/// Every field but `mode` is optional; an unset field contributes no
/// arguments and no warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationRequest {
    pub mode: InvocationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<SandboxMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<bool>,
    #[serde(default)]
    pub passthrough: Passthrough,
}

impl InvocationRequest {
    pub fn new(mode: InvocationMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_approval(mut self, approval: ApprovalPolicy) -> Self {
        self.approval = Some(approval);
        self
    }

    pub fn with_sandbox(mut self, sandbox: SandboxMode) -> Self {
        self.sandbox = Some(sandbox);
        self
    }

    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_web(mut self, web: bool) -> Self {
        self.web = Some(web);
        self
    }

    pub fn with_passthrough<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.passthrough.args = args.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("prompt", ApprovalPolicy::Prompt)]
    #[case("auto-edit", ApprovalPolicy::AutoEdit)]
    #[case("yolo", ApprovalPolicy::Yolo)]
    fn approval_parses_wire_names(#[case] input: &str, #[case] expected: ApprovalPolicy) {
        assert_eq!(input.parse::<ApprovalPolicy>().unwrap(), expected);
        assert_eq!(expected.as_str(), input);
    }

    #[test]
    fn unknown_value_lists_expected() {
        let err = "fast".parse::<OutputFormat>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("--output"));
        assert!(msg.contains("text, json, stream-json"));
    }

    #[test]
    fn request_deserializes_from_camel_case_json() {
        let request: InvocationRequest = serde_json::from_str(
            r#"{"mode":"one-shot","prompt":"hi","approval":"auto-edit","passthrough":{"args":["-x"]}}"#,
        )
        .unwrap();
        assert_eq!(request.mode, InvocationMode::OneShot);
        assert_eq!(request.prompt.as_deref(), Some("hi"));
        assert_eq!(request.approval, Some(ApprovalPolicy::AutoEdit));
        assert_eq!(request.passthrough.args, vec!["-x"]);
    }
}
