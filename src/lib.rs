//! hookgate — policy gates for AI coding agents.
//!
//! Two hooks sit between an agent and its actions:
//!   - the command gate (`hookgate-git-guard`) blocks pushes and commits to
//!     protected branches and attaches a checklist to PR merges;
//!   - the task gate (`hookgate-task-gate`) keeps implementation tasks from
//!     being marked complete before someone has reviewed them.
//!
//! The binaries are thin; everything they do lives here so it can be tested.

pub mod cli;
pub mod git;
pub mod hooks;
pub mod policy;
pub mod utils;
