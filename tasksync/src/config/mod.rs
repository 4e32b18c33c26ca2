//! Configuration for the `tasksync` command-line driver.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/tasksync/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::{Path, PathBuf};

use crate::tasks::DEFAULT_TOP_LIMIT;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    rank: RankFileConfig,
    sync: SyncFileConfig,
    log: LogFileConfig,
}

/// `[rank]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct RankFileConfig {
    default_limit: Option<usize>,
}

/// `[sync]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SyncFileConfig {
    write_back: Option<bool>,
}

/// `[log]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct LogFileConfig {
    level: Option<String>,
    file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of tasks `rank` prints when `--limit` is not given.
    pub default_limit: usize,
    /// Whether `merge` writes the synchronized snapshots back to disk.
    pub write_back: bool,
    /// Log level filter string.
    pub log_level: String,
    /// Log file; `None` logs to stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_TOP_LIMIT,
            write_back: false,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read,
    /// or if any config file that exists cannot be parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Priority: CLI > file > default. Separated from `load()` so it can be
    /// tested without CLI parsing or touching the filesystem.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        let merge_write = matches!(cli.command, Some(Command::Merge { write: true, .. }));

        Self {
            default_limit: file.rank.default_limit.unwrap_or(defaults.default_limit),
            write_back: merge_write || file.sync.write_back.unwrap_or(defaults.write_back),
            log_level: cli
                .log_level
                .clone()
                .or_else(|| file.log.level.clone())
                .unwrap_or(defaults.log_level),
            log_file: cli.log_file.clone().or_else(|| file.log.file.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(
    version,
    about = "Reconcile local and remote task lists and rank tasks by importance",
    arg_required_else_help = true
)]
pub struct CliArgs {
    /// Path to config file (default: `~/.config/tasksync/config.toml`).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, global = true, env = "TASKSYNC_LOG")]
    pub log_level: Option<String>,

    /// Path to log file (default: stderr).
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands of the `tasksync` binary.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Merge two task snapshots and report the writes each side needs.
    Merge {
        /// Local snapshot (JSON array of tasks).
        #[arg(long)]
        local: PathBuf,
        /// Remote snapshot (JSON array of tasks).
        #[arg(long)]
        remote: PathBuf,
        /// Write the synchronized snapshots back to both files.
        #[arg(long)]
        write: bool,
    },
    /// Print the most important tasks of a snapshot.
    Rank {
        /// Snapshot to rank.
        #[arg(long)]
        tasks: PathBuf,
        /// Number of tasks to print.
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Parse quick-add text (e.g. `Buy milk @shopping !2 #tomorrow`) into a task.
    Parse {
        /// Text to parse.
        text: String,
    },
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    }

    let Some(config_dir) = dirs::config_dir() else {
        return Ok(ConfigFile::default());
    };
    let path = config_dir.join("tasksync").join("config.toml");

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
