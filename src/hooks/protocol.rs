//! Wire format between the agent host and the hook binaries.
//!
//! Hosts write one JSON document to the hook's stdin:
//! ```json
//! {
//!   "session_id": "...",
//!   "cwd": "/project/path",
//!   "hook_event_name": "PreToolUse",
//!   "tool_name": "Bash",
//!   "tool_input": { "command": "git push origin main" }
//! }
//! ```
//! Only `tool_name` and `tool_input` matter to the gates; everything else is
//! optional. Advisory output goes back on stdout as `HookOutput`.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tool name the command gate cares about.
pub const BASH_TOOL: &str = "Bash";

/// Input from the host's hook system.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub hook_event_name: Option<String>,
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: serde_json::Value,
}

impl HookInput {
    pub fn parse(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// A string field of `tool_input`; missing or non-string reads as "".
    pub fn field(&self, name: &str) -> &str {
        self.tool_input
            .get(name)
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }

    pub fn command(&self) -> &str {
        self.field("command")
    }

    pub fn subject(&self) -> &str {
        self.field("subject")
    }

    pub fn description(&self) -> &str {
        self.field("description")
    }

    pub fn is_bash(&self) -> bool {
        self.tool_name == BASH_TOOL
    }

    /// Host-reported working directory, if it sent a non-empty one.
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(Path::new)
    }
}

/// Structured stdout payload for a non-blocking advisory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookOutput {
    #[serde(rename = "hookSpecificOutput")]
    pub hook_specific_output: HookSpecificOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: String,
    pub additional_context: String,
}

impl HookOutput {
    pub fn advisory(event_name: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            hook_specific_output: HookSpecificOutput {
                hook_event_name: event_name.into(),
                additional_context: context.into(),
            },
        }
    }
}
