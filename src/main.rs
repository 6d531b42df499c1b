//! hookgate — policy gates for AI coding agents.
//!
//! Quick start:
//!   hookgate setup       # install the hooks into Claude Code
//!   hookgate init        # write a .hookgate.yaml to customize them
//!   hookgate eval command "git push origin main"
//!
//! For more info: hookgate --help

use clap::{Parser, Subcommand};
use colored::Colorize;
use hookgate::cli;
use hookgate::hooks::{self, HookOutcome};
use hookgate::policy::{self, config, defaults, CommandGate, GateConfig, TaskGate};
use std::path::{Path, PathBuf};

/// hookgate — keeps your AI agent off protected branches.
#[derive(Parser)]
#[command(
    name = "hookgate",
    version,
    about = "Policy gates for AI coding agents",
    long_about = "hookgate blocks pushes and commits to protected branches,\n\
                  adds a checklist before PR merges, and keeps implementation\n\
                  tasks open until they have been reviewed.\n\n\
                  Quick start:\n  \
                  hookgate setup       # install the hooks\n  \
                  hookgate init        # write a config to customize them\n  \
                  hookgate             # show what is in effect here"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Install the hooks into Claude Code's settings.json
    Setup {
        /// Settings file to edit (default: ~/.claude/settings.json)
        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// Write a default .hookgate.yaml
    Init {
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a config file
    Check {
        /// Path to config file
        #[arg(default_value = defaults::CONFIG_FILE_NAME)]
        config: PathBuf,
    },

    /// Dry-run a gate and print its decision
    Eval {
        #[command(subcommand)]
        target: EvalTarget,
    },

    // ── Hook entry points (read the event from stdin) ──
    /// Run the command gate as a PreToolUse hook
    #[command(hide = true)]
    GitGuard,

    /// Run the task gate as a TaskCompleted hook
    #[command(hide = true)]
    TaskGate,
}

#[derive(Subcommand)]
enum EvalTarget {
    /// Check a shell command
    Command {
        /// The command, as the agent would run it
        command: String,
        /// Directory the command runs in (default: current directory)
        #[arg(long)]
        cwd: Option<PathBuf>,
        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a task completion
    Task {
        #[arg(short, long, default_value = "")]
        subject: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Evaluate even if the activation variable is not set
        #[arg(long)]
        force: bool,
        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    hookgate::utils::logging::init();

    let cli = Cli::parse();

    let result = match cli.command {
        None => show_status(),

        Some(Commands::Setup { settings }) => cli::setup::run_setup(settings.as_deref()),

        Some(Commands::Init { output, force }) => cli::init::run_init(output.as_deref(), force),

        Some(Commands::Check { config }) => run_check(&config),

        Some(Commands::Eval { target }) => match target {
            EvalTarget::Command { command, cwd, json } => {
                cli::eval::run_eval_command(&command, cwd.as_deref(), json)
            }
            EvalTarget::Task {
                subject,
                description,
                force,
                json,
            } => cli::eval::run_eval_task(&subject, &description, force, json),
        },

        Some(Commands::GitGuard) => run_hook(hooks::run_git_guard),

        Some(Commands::TaskGate) => run_hook(hooks::run_task_gate),
    };

    if let Err(e) = result {
        eprintln!();
        eprintln!("  {} {}", "✗".red().bold(), e);
        for cause in e.chain().skip(1) {
            eprintln!("  {} {}", "caused by:".dimmed(), cause);
        }
        eprintln!();
        std::process::exit(1);
    }
}

fn run_hook(gate: fn(&str) -> HookOutcome) -> ! {
    let outcome = match hooks::runner::read_stdin() {
        Some(raw) => gate(&raw),
        None => HookOutcome::allow(),
    };
    outcome.emit()
}

/// When the user just types `hookgate`: show the settings in effect here.
fn show_status() -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let loaded = config::load_config(&cwd)?;
    let config = &loaded.config;

    println!();
    println!("  {}  {}", "hookgate".bold(), "— policy gates for AI agents".dimmed());
    println!("  {}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".dimmed());
    println!();
    match &loaded.source {
        Some(path) => println!("  Config:   {}", path.display().to_string().dimmed()),
        None => println!("  Config:   {}", "built-in defaults".dimmed()),
    }
    print_settings(config)?;

    println!();
    println!("  {}", "Commands:".dimmed());
    println!("    {}         install the hooks into Claude Code", "hookgate setup".bold());
    println!("    {}          write a config to customize them", "hookgate init".bold());
    println!("    {}         validate a config", "hookgate check".bold());
    println!("    {}  try a command against the gate", "hookgate eval command".bold());
    println!();

    Ok(())
}

fn print_settings(config: &GateConfig) -> anyhow::Result<()> {
    let gate = CommandGate::new(config)?;
    println!(
        "  Protected branches: {}",
        config.protected_branches().join(", ").cyan()
    );
    println!("  Command rules:      {}", gate.rule_names().join(" → "));
    println!("  Branch lookup:      {} ms timeout", config.branch_query_timeout_ms);

    let task_gate = TaskGate::from_env(&config.task_gate)?;
    let task_state = if task_gate.is_active() {
        "active".green()
    } else {
        "inactive".yellow()
    };
    println!(
        "  Task gate:          {} ({})",
        task_state,
        defaults::TASK_GATE_ACTIVATION_ENV.dimmed()
    );
    Ok(())
}

/// Run the `hookgate check` command with linting.
fn run_check(config_path: &Path) -> anyhow::Result<()> {
    let config = config::parse_config_file(config_path)?;
    CommandGate::new(&config)?;
    TaskGate::new(&config.task_gate, true)?;

    println!();
    println!("  {} Config is valid!", "✓".green().bold());
    println!("  File: {}", config_path.display().to_string().cyan());
    println!();
    print_settings(&config)?;

    let warnings = policy::linter::lint_config(&config, TaskGate::active_in_env());
    if warnings.is_empty() {
        println!();
        println!("  {} No issues found — config looks solid.", "✓".green());
    } else {
        println!();
        println!(
            "  {} {} {}:",
            "─".repeat(20).dimmed(),
            warnings.len(),
            if warnings.len() == 1 {
                "suggestion"
            } else {
                "suggestions"
            }
        );
        println!();
        for warning in &warnings {
            println!("{}", warning.display());
        }
    }

    println!();
    Ok(())
}
