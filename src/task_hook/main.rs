//! hookgate-task-gate — TaskCompleted hook for agent team development.
//!
//! Keeps implementation tasks from being marked complete before review.
//! Only enforced when `CLAUDE_CODE_EXPERIMENTAL_AGENT_TEAMS` (or the
//! variable named in `.hookgate.yaml`) is set; otherwise always exits 0.
//!
//! Stdin format:
//! {
//!   "tool_input": { "subject": "Implement task 3.2", "description": "..." }
//! }

use hookgate::hooks::{run_task_gate, runner::read_stdin, HookOutcome};

fn main() {
    hookgate::utils::logging::init();

    let outcome = match read_stdin() {
        Some(raw) => run_task_gate(&raw),
        None => HookOutcome::allow(),
    };
    outcome.emit()
}
