//! Hook entry points: raw stdin in, exit status + output out.
//!
//! Failure policy:
//!   - unreadable or unparseable input → exit 0, no output (fail open)
//!   - broken or unknown config keys → warn, fall back to built-in defaults
//!   - a matched block rule → exit 2 with the reason on stderr
//!
//! The `run_*` functions do the loading; `git_guard` / `task_gate` take
//! everything as arguments so tests can drive them directly.

use crate::git::{BranchLookup, GitCli};
use crate::hooks::protocol::{HookInput, HookOutput};
use crate::policy::config::{load_config, GateConfig};
use crate::policy::defaults::{PRE_TOOL_USE_EVENT, TASK_COMPLETED_EVENT};
use crate::policy::types::{Decision, EXIT_ALLOW};
use crate::policy::{CommandGate, TaskGate};
use std::io::Read;
use std::path::PathBuf;
use std::process;

/// What a hook invocation writes and how it exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookOutcome {
    pub exit_code: i32,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl HookOutcome {
    /// Silent allow.
    pub fn allow() -> Self {
        Self {
            exit_code: EXIT_ALLOW,
            stdout: None,
            stderr: None,
        }
    }

    /// Translate a gate decision into the host contract.
    pub fn from_decision(decision: &Decision, event_name: &str) -> Self {
        match decision {
            Decision::Allowed { .. } => Self::allow(),
            Decision::Denied { reason, .. } => Self {
                exit_code: decision.exit_code(),
                stdout: None,
                stderr: Some(reason.clone()),
            },
            Decision::Advised { context, .. } => {
                let output = HookOutput::advisory(event_name, context.clone());
                match serde_json::to_string(&output) {
                    Ok(json) => Self {
                        exit_code: decision.exit_code(),
                        stdout: Some(json),
                        stderr: None,
                    },
                    Err(e) => {
                        tracing::warn!("Failed to encode advisory: {}", e);
                        Self::allow()
                    }
                }
            }
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.exit_code != EXIT_ALLOW
    }

    /// Write the outcome to the real stdout/stderr and exit.
    pub fn emit(self) -> ! {
        if let Some(stdout) = &self.stdout {
            println!("{}", stdout);
        }
        if let Some(stderr) = &self.stderr {
            eprintln!("{}", stderr);
        }
        process::exit(self.exit_code)
    }
}

/// Read the whole of stdin. `None` on I/O errors.
pub fn read_stdin() -> Option<String> {
    let mut input = String::new();
    match std::io::stdin().read_to_string(&mut input) {
        Ok(_) => Some(input),
        Err(e) => {
            tracing::debug!("Failed to read stdin: {}", e);
            None
        }
    }
}

/// Full command-gate hook: parse, load config, query git, decide.
pub fn run_git_guard(raw: &str) -> HookOutcome {
    let Some(input) = parse_input(raw) else {
        return HookOutcome::allow();
    };
    if !input.is_bash() {
        return HookOutcome::allow();
    }

    let config = config_for(&input);
    let branches = GitCli::new(config.branch_query_timeout());
    git_guard(&input, &config, &branches)
}

/// Command-gate hook with config and branch lookup supplied by the caller.
pub fn git_guard(input: &HookInput, config: &GateConfig, branches: &dyn BranchLookup) -> HookOutcome {
    if !input.is_bash() {
        return HookOutcome::allow();
    }

    let gate = match CommandGate::new(config) {
        Ok(gate) => gate,
        Err(e) => {
            tracing::warn!("Failed to build command gate: {:#}", e);
            return HookOutcome::allow();
        }
    };

    let decision = gate.evaluate(input.command(), input.cwd(), branches);
    tracing::debug!(
        session = input.session_id.as_deref().unwrap_or("-"),
        %decision,
        "git-guard decision"
    );
    HookOutcome::from_decision(&decision, event_name(input, PRE_TOOL_USE_EVENT))
}

/// Full task-gate hook: parse, load config, read activation, decide.
pub fn run_task_gate(raw: &str) -> HookOutcome {
    let Some(input) = parse_input(raw) else {
        return HookOutcome::allow();
    };

    let config = config_for(&input);
    match TaskGate::from_env(&config.task_gate) {
        Ok(gate) => task_gate(&input, &gate),
        Err(e) => {
            tracing::warn!("Failed to build task gate: {:#}", e);
            HookOutcome::allow()
        }
    }
}

/// Task-gate hook with a gate built by the caller.
pub fn task_gate(input: &HookInput, gate: &TaskGate) -> HookOutcome {
    let decision = gate.evaluate(input.subject(), input.description());
    tracing::debug!(
        session = input.session_id.as_deref().unwrap_or("-"),
        %decision,
        "task-gate decision"
    );
    HookOutcome::from_decision(&decision, event_name(input, TASK_COMPLETED_EVENT))
}

/// The event name to echo back: the one the host sent, else `fallback`.
fn event_name<'a>(input: &'a HookInput, fallback: &'a str) -> &'a str {
    input
        .hook_event_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(fallback)
}

fn parse_input(raw: &str) -> Option<HookInput> {
    match HookInput::parse(raw) {
        Ok(input) => Some(input),
        Err(e) => {
            // Don't block on parse errors — fail open
            tracing::debug!("Failed to parse hook input: {}", e);
            None
        }
    }
}

/// Config for the event's working directory. A broken file falls back to
/// the defaults so the branch guards stay on.
fn config_for(input: &HookInput) -> GateConfig {
    let start = input
        .cwd()
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    match load_config(&start) {
        Ok(loaded) => {
            if let Some(source) = &loaded.source {
                tracing::debug!("Using config {}", source.display());
            }
            loaded.config
        }
        Err(e) => {
            tracing::warn!("Ignoring config, using defaults: {:#}", e);
            GateConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::TaskGateSettings;
    use std::path::Path;

    fn bash(command: &str) -> HookInput {
        HookInput::parse(
            &serde_json::json!({ "tool_name": "Bash", "tool_input": { "command": command } })
                .to_string(),
        )
        .unwrap()
    }

    fn task(subject: &str, description: &str) -> HookInput {
        HookInput::parse(
            &serde_json::json!({
                "tool_name": "TaskUpdate",
                "tool_input": { "subject": subject, "description": description }
            })
            .to_string(),
        )
        .unwrap()
    }

    fn on_main(_: Option<&Path>) -> Option<String> {
        Some("main".to_string())
    }

    #[test]
    fn test_malformed_input_fails_open() {
        assert_eq!(run_git_guard("{not json"), HookOutcome::allow());
        assert_eq!(run_task_gate(""), HookOutcome::allow());
    }

    #[test]
    fn test_non_bash_tool_allowed() {
        let input = HookInput::parse(
            r#"{"tool_name":"Write","tool_input":{"command":"git push origin main"}}"#,
        )
        .unwrap();
        assert_eq!(
            git_guard(&input, &GateConfig::default(), &on_main),
            HookOutcome::allow()
        );
    }

    #[test]
    fn test_block_writes_stderr() {
        let outcome = git_guard(&bash("git push origin master"), &GateConfig::default(), &on_main);
        assert_eq!(outcome.exit_code, 2);
        assert!(outcome.is_blocked());
        assert!(outcome.stdout.is_none());
        assert!(outcome.stderr.unwrap().contains("BLOCKED"));
    }

    #[test]
    fn test_advisory_writes_stdout_json() {
        let unknown = |_: Option<&Path>| -> Option<String> { None };
        let outcome = git_guard(&bash("gh pr merge 12"), &GateConfig::default(), &unknown);
        assert_eq!(outcome.exit_code, 0);
        assert!(outcome.stderr.is_none());

        let output: HookOutput = serde_json::from_str(&outcome.stdout.unwrap()).unwrap();
        assert_eq!(output.hook_specific_output.hook_event_name, "PreToolUse");
        assert!(!output.hook_specific_output.additional_context.is_empty());
    }

    #[test]
    fn test_plain_command_silent() {
        let outcome = git_guard(&bash("cargo test"), &GateConfig::default(), &on_main);
        assert_eq!(outcome, HookOutcome::allow());
    }

    #[test]
    fn test_task_gate_outcomes() {
        let settings = TaskGateSettings::default();
        let active = TaskGate::new(&settings, true).unwrap();
        let inactive = TaskGate::new(&settings, false).unwrap();

        let blocked = task_gate(&task("Implement task 3.2: add retry logic", ""), &active);
        assert_eq!(blocked.exit_code, 2);
        assert!(blocked.stderr.unwrap().starts_with("Task requires review"));

        let skipped = task_gate(&task("Implement task 3.2: add retry logic", ""), &inactive);
        assert_eq!(skipped, HookOutcome::allow());

        let empty = task_gate(&task("", ""), &active);
        assert_eq!(empty, HookOutcome::allow());
    }

    #[test]
    fn test_event_name_echoes_input() {
        let mut input = task("Implement exporter", "");
        assert_eq!(event_name(&input, TASK_COMPLETED_EVENT), "TaskCompleted");

        input.hook_event_name = Some("TaskCompleted".to_string());
        assert_eq!(event_name(&input, PRE_TOOL_USE_EVENT), "TaskCompleted");

        input.hook_event_name = Some(String::new());
        assert_eq!(event_name(&input, PRE_TOOL_USE_EVENT), "PreToolUse");
    }

    #[test]
    fn test_advisory_names_the_event_it_answers() {
        let unknown = |_: Option<&Path>| -> Option<String> { None };
        let mut input = bash("gh pr merge 3");
        input.hook_event_name = Some("PreToolUse".to_string());
        let outcome = git_guard(&input, &GateConfig::default(), &unknown);
        let output: HookOutput = serde_json::from_str(&outcome.stdout.unwrap()).unwrap();
        assert_eq!(output.hook_specific_output.hook_event_name, "PreToolUse");
    }

    #[test]
    fn test_same_input_same_outcome() {
        let config = GateConfig::default();
        let input = bash("git add -A && git commit -m wip");
        let first = git_guard(&input, &config, &on_main);
        let second = git_guard(&input, &config, &on_main);
        assert_eq!(first, second);
        assert!(first.is_blocked());
    }
}
