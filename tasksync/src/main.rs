//! `tasksync`: reconcile two task snapshots and rank tasks by importance.
//!
//! ```bash
//! # Show what a two-way sync would write, then apply it
//! tasksync merge --local local.json --remote remote.json
//! tasksync merge --local local.json --remote remote.json --write
//!
//! # Top 3 tasks by importance
//! tasksync rank --tasks local.json -n 3
//!
//! # Quick-add parsing
//! tasksync parse "Buy milk @shopping !2 #tomorrow"
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::{CommandFactory, Parser};
use tracing_appender::non_blocking::WorkerGuard;

use tasksync::config::{CliArgs, Command, Config};
use tasksync::tasks::{
    MemoryStore, SyncReport, TaskError, calculate_task_score, parse_task_from_text, synchronize,
    top_priority,
};
use tasksync_proto::codec::{self, CodecError};
use tasksync_proto::{Task, TaskCollection, TaskId};

/// Errors surfaced by the command-line driver.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid snapshot {path}: {source}")]
    Snapshot { path: PathBuf, source: CodecError },
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("failed to render task: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let config = match Config::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = init_logging(&config.log_level, config.log_file.as_deref());

    let Some(command) = cli.command else {
        if let Err(e) = CliArgs::command().print_help() {
            tracing::warn!(error = %e, "failed to print help");
        }
        return ExitCode::FAILURE;
    };

    match run(command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging to stderr, or to a file when one is configured.
///
/// Returns a [`WorkerGuard`] for file logging that must be held until exit
/// so buffered entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let Some((log_dir, file_name)) = file_path.and_then(|p| Some((p.parent()?, p.file_name()?)))
    else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
        return None;
    };

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

fn run(command: Command, config: &Config) -> Result<(), CliError> {
    match command {
        Command::Merge { local, remote, .. } => run_merge(&local, &remote, config.write_back),
        Command::Rank { tasks, limit } => run_rank(&tasks, limit.unwrap_or(config.default_limit)),
        Command::Parse { text } => {
            let task = parse_task_from_text(&text, Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&task)?);
            Ok(())
        }
    }
}

fn run_merge(local_path: &Path, remote_path: &Path, write_back: bool) -> Result<(), CliError> {
    let mut local = MemoryStore::from(read_snapshot(local_path)?);
    let mut remote = MemoryStore::from(read_snapshot(remote_path)?);

    let report = synchronize(&mut local, &mut remote)?;
    print_report(&report);

    if write_back {
        write_snapshot(local_path, local.tasks())?;
        write_snapshot(remote_path, remote.tasks())?;
        tracing::info!(
            local = %local_path.display(),
            remote = %remote_path.display(),
            "wrote synchronized snapshots"
        );
    } else if report.total_writes() > 0 {
        println!("(dry run: pass --write to apply)");
    }
    Ok(())
}

fn run_rank(path: &Path, limit: usize) -> Result<(), CliError> {
    let tasks = read_snapshot(path)?;
    // Id order keeps ties stable between runs.
    let mut ordered: Vec<&Task> = tasks.values().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));

    let now = Utc::now();
    for task in top_priority(ordered, now, Some(limit)) {
        println!(
            "{:>4}  {:<8} {:<12} {}  ({})",
            calculate_task_score(task, now),
            task.priority.to_string(),
            task.status.to_string(),
            task.title,
            task.id
        );
    }
    Ok(())
}

fn print_report(report: &SyncReport) {
    println!("merged tasks: {}", report.merged.len());
    print_ids("create locally", &report.created_local);
    print_ids("update locally", &report.updated_local);
    print_ids("create remotely", &report.created_remote);
    print_ids("update remotely", &report.updated_remote);
}

fn print_ids(label: &str, ids: &[TaskId]) {
    println!("{label}: {}", ids.len());
    for id in ids {
        println!("  {id}");
    }
}

fn read_snapshot(path: &Path) -> Result<TaskCollection, CliError> {
    let bytes = std::fs::read(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    codec::decode_snapshot(&bytes).map_err(|source| CliError::Snapshot {
        path: path.to_path_buf(),
        source,
    })
}

fn write_snapshot(path: &Path, tasks: &TaskCollection) -> Result<(), CliError> {
    let bytes = codec::encode_snapshot(tasks).map_err(|source| CliError::Snapshot {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, bytes).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
