//! Invocation translation for agentctl.
//!
//! An [`InvocationRequest`] describes how to run an agent (mode, prompt,
//! approval policy, sandbox, output format, model, web access) without
//! reference to any particular CLI. A [`CliSchema`] describes one target
//! CLI's dialect. [`translate`] combines the two into a concrete command
//! and argument vector.
//!
//! Translation is best-effort: a feature the target cannot express becomes
//! a warning in the [`TranslationResult`], never an error. The translator
//! holds no state and never touches the filesystem.
//!
//! # Example
//!
//! ```
//! use agentctl_invoke::{
//!     ApprovalPolicy, CliSchema, FlagArgs, FlagMap, InvocationMode, InvocationRequest, translate,
//! };
//!
//! let mut schema = CliSchema::new("claude", "claude");
//! schema.flags.approval = Some(
//!     FlagMap::new().value(ApprovalPolicy::Yolo, FlagArgs::args(["--dangerously-skip-permissions"])),
//! );
//!
//! let request = InvocationRequest::new(InvocationMode::OneShot).with_approval(ApprovalPolicy::Yolo);
//! let result = translate(&request, &schema);
//!
//! assert_eq!(result.command, "claude");
//! assert_eq!(result.args, vec!["--dangerously-skip-permissions"]);
//! assert!(result.warnings.is_empty());
//! ```

pub mod error;
pub mod request;
pub mod schema;
pub mod translate;

pub use error::{Error, Result};
pub use request::{
    ApprovalPolicy, FlagKey, InvocationMode, InvocationRequest, OutputFormat, Passthrough,
    SandboxMode,
};
pub use schema::{
    CliFlags, CliModes, CliSchema, CustomTranslate, FlagArgs, FlagMap, ModeInvocation, ModelFlag,
    PassthroughPosition, PassthroughSpec, PromptPosition, PromptSpec, WebFlag,
};
pub use translate::{TranslateOptions, TranslationResult, translate, translate_with};
