//! Logging Module
//!
//! tracing-based logging shared by the tools in this workspace:
//! - a daily-rolling log file in the system temp directory
//! - a stderr layer, quieter than the file by default so stdout stays readable
//! - structured records for every external tool invocation
//!
//! # Examples
//!
//! ```no_run
//! use shared_utils::logging::{LogConfig, init_logging};
//! use tracing::info;
//!
//! let config = LogConfig::default();
//! init_logging("my_program", config).expect("Failed to initialize logging");
//!
//! info!("Program started");
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory for `{program}.log.*` files (default: system temp dir)
    pub log_dir: PathBuf,
    /// Number of rotated log files to keep
    pub max_files: usize,
    /// Level written to the log file
    pub level: Level,
    /// Level echoed to stderr
    pub stderr_level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: std::env::temp_dir(),
            max_files: 5,
            level: Level::INFO,
            stderr_level: Level::WARN,
        }
    }
}

impl LogConfig {
    /// Debug everywhere, used by `--verbose`.
    pub fn verbose(self) -> Self {
        Self {
            level: Level::DEBUG,
            stderr_level: Level::DEBUG,
            ..self
        }
    }
}

/// Install the global subscriber.
///
/// Logs go to `{program_name}.log` (rotated daily) in `config.log_dir` and to
/// stderr. `RUST_LOG` overrides the configured levels.
///
/// # Arguments
///
/// * `program_name` - log file name and default filter target
/// * `config` - directories, retention and levels
///
/// # Errors
///
/// The log directory cannot be created or read, or a global subscriber is
/// already installed (only the first call per process succeeds).
pub fn init_logging(program_name: &str, config: LogConfig) -> Result<()> {
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

    let log_file_name = format!("{}.log", program_name);
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, &log_file_name);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}={level},shared_utils={level}",
            program_name,
            level = config.level.max(config.stderr_level)
        ))
    });

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_filter(LevelFilter::from_level(config.level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_line_number(false)
        .with_filter(LevelFilter::from_level(config.stderr_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(
        program = program_name,
        log_dir = ?config.log_dir,
        log_file = log_file_name,
        max_files = config.max_files,
        level = ?config.level,
        "Logging system initialized"
    );

    cleanup_old_logs(&config.log_dir, program_name, config.max_files)?;

    Ok(())
}

/// Delete all but the newest `max_files` logs belonging to `program_name`.
fn cleanup_old_logs(log_dir: &Path, program_name: &str, max_files: usize) -> Result<()> {
    use std::fs;

    let entries = fs::read_dir(log_dir)
        .with_context(|| format!("Failed to read log directory: {:?}", log_dir))?;

    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();

    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        let is_ours = path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with(&format!("{}.log", program_name)))
            .unwrap_or(false);
        if !is_ours {
            continue;
        }

        if let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) {
            log_files.push((path, modified));
        }
    }

    if log_files.len() > max_files {
        // newest first
        log_files.sort_by(|a, b| b.1.cmp(&a.1));

        for (path, _) in log_files.iter().skip(max_files) {
            match fs::remove_file(path) {
                Ok(()) => tracing::debug!(path = ?path, "Removed old log file"),
                Err(e) => tracing::warn!(path = ?path, error = %e, "Failed to remove old log file"),
            }
        }
    }

    Ok(())
}

/// Record one external tool run (command line, exit code, elapsed time).
///
/// A non-zero exit is logged at `debug`, not `error`: `ffmpeg -i` without an
/// output always exits 1 and callers decide what a failure is.
pub fn log_external_tool(
    tool_name: &str,
    args: &[&str],
    output: &str,
    exit_code: Option<i32>,
    duration: std::time::Duration,
) {
    let command = format!("{} {}", tool_name, args.join(" "));

    match exit_code {
        Some(code) => {
            tracing::info!(
                tool = tool_name,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                exit_code = code,
                "External tool finished"
            );
        }
        None => {
            tracing::warn!(
                tool = tool_name,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                "External tool terminated without exit code"
            );
        }
    }

    if !output.is_empty() {
        tracing::debug!(tool = tool_name, output = %output, "External tool output");
    }
}
