//! hookgate-git-guard — PreToolUse hook for Bash commands.
//!
//! Called by the host before every Bash tool use. Reads the tool call JSON
//! from stdin and either:
//!   - exits 0 (allow), optionally printing an advisory JSON to stdout
//!   - exits 2 with the reason on stderr (block)
//!
//! Stdin format:
//! {
//!   "cwd": "/project/path",
//!   "hook_event_name": "PreToolUse",
//!   "tool_name": "Bash",
//!   "tool_input": { "command": "git push origin main" }
//! }

use hookgate::hooks::{run_git_guard, runner::read_stdin, HookOutcome};

fn main() {
    hookgate::utils::logging::init();

    let outcome = match read_stdin() {
        Some(raw) => run_git_guard(&raw),
        // Don't block on read errors — fail open
        None => HookOutcome::allow(),
    };
    outcome.emit()
}
