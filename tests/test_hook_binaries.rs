//! End-to-end tests: run the hook binaries the way the host does.
//!
//! Each test pipes a JSON event into `hookgate-git-guard` or
//! `hookgate-task-gate` and checks the exit status and output channels.
//! Tests run from a scratch directory so no stray `.hookgate.yaml` is found.

use assert_cmd::Command;
use hookgate::hooks::HookOutput;
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

const TEAMS_ENV: &str = "CLAUDE_CODE_EXPERIMENTAL_AGENT_TEAMS";

fn git_guard(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hookgate-git-guard").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

fn task_gate(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hookgate-task-gate").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

fn bash_event(command: &str, cwd: &Path) -> String {
    json!({
        "session_id": "test-session",
        "cwd": cwd,
        "hook_event_name": "PreToolUse",
        "tool_name": "Bash",
        "tool_input": { "command": command }
    })
    .to_string()
}

fn task_event(subject: &str, description: &str) -> String {
    json!({
        "tool_name": "TaskUpdate",
        "tool_input": { "subject": subject, "description": description }
    })
    .to_string()
}

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// A scratch repository with one commit on `branch`.
fn scratch_repo(branch: &str) -> TempDir {
    let repo = TempDir::new().unwrap();
    for args in [
        vec!["init", "-q"],
        vec!["symbolic-ref", "HEAD", &format!("refs/heads/{}", branch)],
        vec!["commit", "-q", "--allow-empty", "-m", "init"],
    ] {
        let status = std::process::Command::new("git")
            .arg("-C")
            .arg(repo.path())
            .args(["-c", "user.name=hookgate", "-c", "user.email=hookgate@example.com"])
            .args(&args)
            .status()
            .unwrap();
        assert!(status.success(), "git {:?}", args);
    }
    repo
}

#[test]
fn test_push_to_main_blocked() {
    let tmp = TempDir::new().unwrap();
    git_guard(tmp.path())
        .write_stdin(bash_event("git push origin main", tmp.path()))
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("BLOCKED: Direct push to main/master"))
        .stderr(predicate::str::contains("Command: git push origin main"));
}

#[test]
fn test_plain_command_allowed_silently() {
    let tmp = TempDir::new().unwrap();
    git_guard(tmp.path())
        .write_stdin(bash_event("cargo build --release", tmp.path()))
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_pr_merge_prints_advisory() {
    let tmp = TempDir::new().unwrap();
    let output = git_guard(tmp.path())
        .write_stdin(bash_event("gh pr merge 42 --squash", tmp.path()))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let payload: HookOutput = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload.hook_specific_output.hook_event_name, "PreToolUse");
    assert!(payload
        .hook_specific_output
        .additional_context
        .contains("Wait for CI to pass"));
}

#[test]
fn test_non_bash_and_garbage_input_fail_open() {
    let tmp = TempDir::new().unwrap();

    let write_event = json!({
        "tool_name": "Write",
        "tool_input": { "file_path": "x", "content": "git push origin main" }
    })
    .to_string();

    for stdin in [write_event.as_str(), "not json at all", "", "[]"] {
        git_guard(tmp.path())
            .write_stdin(stdin)
            .assert()
            .code(0)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::is_empty());
    }
}

#[test]
fn test_commit_on_main_blocked_in_real_repo() {
    if !git_available() {
        eprintln!("git not installed — skipping");
        return;
    }
    let repo = scratch_repo("main");

    git_guard(repo.path())
        .write_stdin(bash_event("git add -A && git commit -m wip", repo.path()))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Cannot commit directly"))
        .stderr(predicate::str::contains("git checkout -b"));

    // Heredoc body mentioning git commit is not a commit
    git_guard(repo.path())
        .write_stdin(bash_event(
            "cat <<EOF > NOTES.md\ngit commit -m later\nEOF",
            repo.path(),
        ))
        .assert()
        .code(0);
}

#[test]
fn test_commit_with_c_path_uses_that_worktree() {
    if !git_available() {
        return;
    }
    let protected = scratch_repo("master");
    let feature = scratch_repo("feature/login");
    let elsewhere = TempDir::new().unwrap();

    let cmd = format!("git -C \"{}\" commit -m wip", protected.path().display());
    git_guard(elsewhere.path())
        .write_stdin(bash_event(&cmd, elsewhere.path()))
        .assert()
        .code(2);

    let cmd = format!("git -C {} commit -m wip", feature.path().display());
    git_guard(elsewhere.path())
        .write_stdin(bash_event(&cmd, elsewhere.path()))
        .assert()
        .code(0);
}

#[test]
fn test_commit_outside_repo_allowed() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("no-such-dir");
    git_guard(tmp.path())
        .write_stdin(bash_event("git commit -m wip", &missing))
        .assert()
        .code(0);
}

#[test]
fn test_config_file_is_honored() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join(".hookgate.yaml"),
        "extra_protected_branches: [trunk]\n",
    )
    .unwrap();

    for branch in ["trunk", "main"] {
        git_guard(tmp.path())
            .write_stdin(bash_event(&format!("git push origin {}", branch), tmp.path()))
            .assert()
            .code(2)
            .stderr(predicate::str::contains("main/master/trunk"));
    }
}

#[test]
fn test_repo_config_cannot_lift_guards() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join(".hookgate.yaml"),
        "protected_branches: []\nmerge_advisory: false\n",
    )
    .unwrap();

    git_guard(tmp.path())
        .write_stdin(bash_event("git push origin main", tmp.path()))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("BLOCKED: Direct push to main/master"));

    git_guard(tmp.path())
        .write_stdin(bash_event("gh pr merge 3", tmp.path()))
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Wait for CI to pass"));
}

#[test]
fn test_heredoc_commit_text_allowed_on_main() {
    if !git_available() {
        return;
    }
    let repo = scratch_repo("main");

    for cmd in [
        "cat > README.md <<'EOF'\n| Command | Meaning |\n|---|---|\n| git commit | record changes |\nEOF",
        "cat > ci.sh <<'EOF'\nset -e;\ngit commit -m release\nEOF",
        "echo \"next: make && git commit -m done\"",
    ] {
        git_guard(repo.path())
            .write_stdin(bash_event(cmd, repo.path()))
            .assert()
            .code(0)
            .stderr(predicate::str::is_empty());
    }
}

#[test]
fn test_broken_config_keeps_default_guards() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join(".hookgate.yaml"), "extra_protected_branches: [main\n").unwrap();

    git_guard(tmp.path())
        .write_stdin(bash_event("git push origin main", tmp.path()))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("BLOCKED"));
}

#[test]
fn test_task_gate_blocks_unreviewed_work() {
    let tmp = TempDir::new().unwrap();
    task_gate(tmp.path())
        .env(TEAMS_ENV, "1")
        .write_stdin(task_event("Implement task 3.2: add retry logic", ""))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Task requires review before completion"));
}

#[test]
fn test_task_gate_allows_reviewed_and_review_tasks() {
    let tmp = TempDir::new().unwrap();
    for (subject, description) in [
        ("Implement task 3.2: add retry logic", "reviewed, approved"),
        ("Review PR #42 for correctness", ""),
        ("", ""),
    ] {
        task_gate(tmp.path())
            .env(TEAMS_ENV, "1")
            .write_stdin(task_event(subject, description))
            .assert()
            .code(0)
            .stderr(predicate::str::is_empty());
    }
}

#[test]
fn test_task_gate_inactive_without_flag() {
    let tmp = TempDir::new().unwrap();
    for flag in [None, Some("")] {
        let mut cmd = task_gate(tmp.path());
        match flag {
            Some(value) => cmd.env(TEAMS_ENV, value),
            None => cmd.env_remove(TEAMS_ENV),
        };
        cmd.write_stdin(task_event("Implement task 3.2: add retry logic", ""))
            .assert()
            .code(0);
    }
}

#[test]
fn test_task_gate_garbage_input() {
    let tmp = TempDir::new().unwrap();
    task_gate(tmp.path())
        .env(TEAMS_ENV, "1")
        .write_stdin("{\"tool_input\": ")
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_cli_eval_command_json() {
    let tmp = TempDir::new().unwrap();
    let output = Command::cargo_bin("hookgate")
        .unwrap()
        .current_dir(tmp.path())
        .args(["eval", "command", "git push origin master", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let decision: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(decision["decision"], "denied");
    assert_eq!(decision["matched_rule"], "protected-push");
}

#[test]
fn test_cli_check_rejects_bad_config() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.yaml");
    std::fs::write(&path, "branch_query_timeout_ms: 0\n").unwrap();

    Command::cargo_bin("hookgate")
        .unwrap()
        .arg("check")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("branch_query_timeout_ms"));
}

#[test]
fn test_cli_hook_subcommand_matches_binary() {
    let tmp = TempDir::new().unwrap();
    Command::cargo_bin("hookgate")
        .unwrap()
        .current_dir(tmp.path())
        .env_remove("RUST_LOG")
        .arg("git-guard")
        .write_stdin(bash_event("git push origin main", tmp.path()))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("BLOCKED"));
}
