//! `hookgate eval` — run a gate by hand and show what it decides.
//!
//! Useful for checking a config against real commands before installing the
//! hooks. Uses the same gates and the same git lookup as the hook binaries.

use crate::git::{BranchLookup, GitCli};
use crate::policy::config::{load_config, GateConfig};
use crate::policy::{CommandGate, Decision, TaskGate};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Evaluate a command against the config governing `cwd`.
pub fn eval_command(
    config: &GateConfig,
    command: &str,
    cwd: Option<&Path>,
    branches: &dyn BranchLookup,
) -> Result<Decision> {
    let gate = CommandGate::new(config)?;
    Ok(gate.evaluate(command, cwd, branches))
}

/// Evaluate a task with the activation flag given by the caller.
pub fn eval_task(
    config: &GateConfig,
    subject: &str,
    description: &str,
    active: bool,
) -> Result<Decision> {
    let gate = TaskGate::new(&config.task_gate, active)?;
    Ok(gate.evaluate(subject, description))
}

/// Run `hookgate eval command`.
pub fn run_eval_command(command: &str, cwd: Option<&Path>, as_json: bool) -> Result<()> {
    let start = resolve_start(cwd)?;
    let config = load_config(&start)?.config;
    let branches = GitCli::new(config.branch_query_timeout());
    let decision = eval_command(&config, command, Some(&start), &branches)?;
    print_decision(&decision, as_json)
}

/// Run `hookgate eval task`. `force` treats the gate as active regardless
/// of the environment.
pub fn run_eval_task(subject: &str, description: &str, force: bool, as_json: bool) -> Result<()> {
    let start = resolve_start(None)?;
    let config = load_config(&start)?.config;
    let active = force || TaskGate::active_in_env();
    let decision = eval_task(&config, subject, description, active)?;
    print_decision(&decision, as_json)
}

fn resolve_start(cwd: Option<&Path>) -> Result<PathBuf> {
    match cwd {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir().context("Failed to get current directory"),
    }
}

fn print_decision(decision: &Decision, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(decision)?);
        return Ok(());
    }

    let rule = decision.matched_rule().unwrap_or("no rule matched");
    println!();
    match decision {
        Decision::Allowed { .. } => {
            println!(
                "  {} {} {}",
                "✓".green().bold(),
                "ALLOW".green().bold(),
                format!("({})", rule).dimmed()
            );
        }
        Decision::Advised { context, .. } => {
            println!(
                "  {} {} {}",
                "⚠".yellow().bold(),
                "ALLOW + ADVISORY".yellow().bold(),
                format!("({})", rule).dimmed()
            );
            println!();
            for line in context.lines() {
                println!("    {}", line);
            }
        }
        Decision::Denied { reason, .. } => {
            println!(
                "  {} {} {}",
                "✗".red().bold(),
                "BLOCK".red().bold(),
                format!("({})", rule).dimmed()
            );
            println!();
            for line in reason.lines() {
                println!("    {}", line);
            }
        }
    }
    println!();
    println!("  Exit status as a hook: {}", decision.exit_code());
    println!();
    Ok(())
}
