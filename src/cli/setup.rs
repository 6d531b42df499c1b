//! `hookgate setup` — register both hooks in Claude Code's settings.
//!
//! Adds two entries to `~/.claude/settings.json` (or the path given):
//!   - `PreToolUse` with matcher `Bash` → `hookgate-git-guard`
//!   - `TaskCompleted` → `hookgate-task-gate`
//!
//! Existing hooks are left alone, and running setup twice changes nothing.

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

pub const GIT_GUARD_BINARY: &str = "hookgate-git-guard";
pub const TASK_GATE_BINARY: &str = "hookgate-task-gate";

const PRE_TOOL_USE: &str = "PreToolUse";
const TASK_COMPLETED: &str = "TaskCompleted";

/// What `install_hooks` changed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub git_guard_added: bool,
    pub task_gate_added: bool,
}

impl InstallReport {
    pub fn changed(&self) -> bool {
        self.git_guard_added || self.task_gate_added
    }
}

/// Run the `hookgate setup` command.
pub fn run_setup(settings_path: Option<&Path>) -> Result<()> {
    let settings_path = match settings_path {
        Some(p) => p.to_path_buf(),
        None => claude_code_settings_path()?,
    };

    // Read existing settings or start fresh
    let mut settings: Value = if settings_path.exists() {
        let content = std::fs::read_to_string(&settings_path)
            .with_context(|| format!("Failed to read {}", settings_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", settings_path.display()))?
    } else {
        if let Some(parent) = settings_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        json!({})
    };

    let git_guard = find_hook_binary(GIT_GUARD_BINARY);
    let task_gate = find_hook_binary(TASK_GATE_BINARY);
    let report = install_hooks(
        &mut settings,
        &git_guard.to_string_lossy(),
        &task_gate.to_string_lossy(),
    )?;

    println!();
    if !report.changed() {
        println!("  {} hookgate hooks already installed", "✓".green());
        println!("    {}", settings_path.display().to_string().dimmed());
        println!();
        return Ok(());
    }

    let content = serde_json::to_string_pretty(&settings)?;
    std::fs::write(&settings_path, content)
        .with_context(|| format!("Failed to write {}", settings_path.display()))?;

    if report.git_guard_added {
        println!(
            "  {} Installed {} hook → {}",
            "✓".green(),
            PRE_TOOL_USE.bold(),
            git_guard.display()
        );
    }
    if report.task_gate_added {
        println!(
            "  {} Installed {} hook → {}",
            "✓".green(),
            TASK_COMPLETED.bold(),
            task_gate.display()
        );
    }
    println!("    {}", settings_path.display().to_string().dimmed());
    println!();
    println!("  {} The task gate only runs when this is set:", "ℹ".blue());
    println!(
        "    {}",
        format!(
            "export {}=1",
            crate::policy::defaults::TASK_GATE_ACTIVATION_ENV
        )
        .bold()
    );
    println!();

    Ok(())
}

/// Merge the hookgate entries into a settings document.
/// Doesn't clobber existing hooks; skips entries that are already present.
pub fn install_hooks(
    settings: &mut Value,
    git_guard_command: &str,
    task_gate_command: &str,
) -> Result<InstallReport> {
    let hooks = settings
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("settings.json is not an object"))?
        .entry("hooks")
        .or_insert(json!({}))
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("hooks is not an object"))?;

    let mut report = InstallReport::default();

    let pretool = event_array(hooks, PRE_TOOL_USE)?;
    if !has_hook(pretool, GIT_GUARD_BINARY) {
        pretool.push(json!({
            "matcher": "Bash",
            "hooks": [{ "type": "command", "command": git_guard_command }]
        }));
        report.git_guard_added = true;
    }

    let completed = event_array(hooks, TASK_COMPLETED)?;
    if !has_hook(completed, TASK_GATE_BINARY) {
        completed.push(json!({
            "hooks": [{ "type": "command", "command": task_gate_command }]
        }));
        report.task_gate_added = true;
    }

    Ok(report)
}

fn event_array<'a>(
    hooks: &'a mut serde_json::Map<String, Value>,
    event: &str,
) -> Result<&'a mut Vec<Value>> {
    hooks
        .entry(event)
        .or_insert(json!([]))
        .as_array_mut()
        .ok_or_else(|| anyhow::anyhow!("{} is not an array", event))
}

/// Whether any rule in an event array already runs `binary`.
fn has_hook(rules: &[Value], binary: &str) -> bool {
    rules.iter().any(|rule| {
        rule.get("hooks")
            .and_then(|h| h.as_array())
            .map(|hooks| {
                hooks.iter().any(|h| {
                    h.get("command")
                        .and_then(|c| c.as_str())
                        .map(|c| c.contains(binary))
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false)
    })
}

/// Get the path to Claude Code's user settings.json
fn claude_code_settings_path() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(home.join(".claude").join("settings.json"))
}

/// Find a hook binary: next to the running executable, then the usual
/// install locations, then assume it's on PATH.
fn find_hook_binary(name: &str) -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let path = dir.join(name);
            if path.exists() {
                return path;
            }
        }
    }

    for dir in ["/usr/local/bin", "/usr/bin"] {
        let path = Path::new(dir).join(name);
        if path.exists() {
            return path;
        }
    }

    if let Some(home) = dirs::home_dir() {
        let path = home.join(".local/bin").join(name);
        if path.exists() {
            return path;
        }
    }

    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_install_into_empty_settings() {
        let mut settings = json!({});
        let report = install_hooks(&mut settings, "/bin/hookgate-git-guard", "/bin/hookgate-task-gate")
            .unwrap();
        assert!(report.git_guard_added && report.task_gate_added);

        let pretool = &settings["hooks"]["PreToolUse"][0];
        assert_eq!(pretool["matcher"], "Bash");
        assert_eq!(pretool["hooks"][0]["command"], "/bin/hookgate-git-guard");
        assert_eq!(
            settings["hooks"]["TaskCompleted"][0]["hooks"][0]["command"],
            "/bin/hookgate-task-gate"
        );
    }

    #[test]
    fn test_install_is_idempotent() {
        let mut settings = json!({});
        install_hooks(&mut settings, "hookgate-git-guard", "hookgate-task-gate").unwrap();
        let before = settings.clone();

        let report = install_hooks(&mut settings, "hookgate-git-guard", "hookgate-task-gate").unwrap();
        assert!(!report.changed());
        assert_eq!(settings, before);
    }

    #[test]
    fn test_install_keeps_existing_hooks() {
        let mut settings = json!({
            "model": "opus",
            "hooks": {
                "PreToolUse": [
                    { "matcher": "Write", "hooks": [{ "type": "command", "command": "lint-hook" }] }
                ]
            }
        });
        install_hooks(&mut settings, "hookgate-git-guard", "hookgate-task-gate").unwrap();

        assert_eq!(settings["model"], "opus");
        let pretool = settings["hooks"]["PreToolUse"].as_array().unwrap();
        assert_eq!(pretool.len(), 2);
        assert_eq!(pretool[0]["hooks"][0]["command"], "lint-hook");
    }

    #[test]
    fn test_install_rejects_malformed_settings() {
        assert!(install_hooks(&mut json!([]), "a", "b").is_err());
        assert!(install_hooks(&mut json!({ "hooks": [] }), "a", "b").is_err());
        assert!(install_hooks(&mut json!({ "hooks": { "PreToolUse": {} } }), "a", "b").is_err());
    }

    #[test]
    fn test_run_setup_writes_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".claude/settings.json");

        run_setup(Some(&path)).unwrap();
        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(written["hooks"]["PreToolUse"].is_array());
        assert!(written["hooks"]["TaskCompleted"].is_array());

        // Second run leaves the file as it was
        run_setup(Some(&path)).unwrap();
        let again: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, again);
    }
}
