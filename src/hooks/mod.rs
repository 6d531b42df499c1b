pub mod protocol;
pub mod runner;

pub use protocol::{HookInput, HookOutput};
pub use runner::{git_guard, run_git_guard, run_task_gate, task_gate, HookOutcome};
