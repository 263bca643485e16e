//! FFmpeg process management
//!
//! Two ways of running the transcoder:
//!
//! - [`ToolRunner::capture`]: stdout and stderr piped and collected. Used to
//!   read the `ffmpeg -i` banner. The exit code is reported, not judged.
//! - [`ToolRunner::passthrough`]: stdout and stderr inherited so the user
//!   sees encoder progress live.
//!
//! [`FfmpegRunner`] is the real implementation. Anything that can produce
//! canned output (tests, other front ends) can implement the trait instead.
//!
//! ## Pipe deadlock
//!
//! When both stdout and stderr are piped but only one is read, a child that
//! fills the other pipe (64KB on most systems) blocks forever. `FfmpegProcess`
//! drains stderr on its own thread while the caller reads stdout.

use crate::logging::log_external_tool;
use std::ffi::OsStr;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Captured result of one external tool run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl ToolOutput {
    /// stderr followed by stdout. ffmpeg writes its diagnostics to stderr,
    /// stdout is normally empty.
    pub fn diagnostic_text(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stderr, self.stdout)
        }
    }
}

/// Something that can run the transcoder.
pub trait ToolRunner {
    /// Run with piped output.
    ///
    /// # Arguments
    ///
    /// * `args` - arguments after the program name
    ///
    /// # Returns
    ///
    /// Collected output. A non-zero exit is reported in
    /// [`ToolOutput::exit_code`] and is not an error.
    ///
    /// # Errors
    ///
    /// The tool could not be started, or its output could not be read.
    fn capture(&self, args: &[&OsStr]) -> io::Result<ToolOutput>;

    /// Run with inherited stdout/stderr.
    ///
    /// # Returns
    ///
    /// The exit code, `None` when terminated by a signal.
    ///
    /// # Errors
    ///
    /// The tool could not be started or waited on.
    fn passthrough(&self, args: &[&OsStr]) -> io::Result<Option<i32>>;

    /// Human-readable program name for messages.
    fn program(&self) -> &Path;
}

/// Runs a real ffmpeg binary.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    program: PathBuf,
}

impl FfmpegRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve `program` on `PATH` (or as an explicit path).
    ///
    /// # Errors
    ///
    /// [`which::Error`] when no executable by that name exists.
    pub fn locate(program: impl AsRef<OsStr>) -> Result<Self, which::Error> {
        let resolved = which::which(program.as_ref())?;
        debug!(program = ?program.as_ref(), resolved = %resolved.display(), "Resolved ffmpeg binary");
        Ok(Self::new(resolved))
    }
}

fn display_args(args: &[&OsStr]) -> Vec<String> {
    args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
}

impl ToolRunner for FfmpegRunner {
    fn capture(&self, args: &[&OsStr]) -> io::Result<ToolOutput> {
        let start = Instant::now();

        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        let process = FfmpegProcess::spawn(&mut cmd)?;
        let (status, stdout, stderr) = process.collect_output()?;

        let output = ToolOutput {
            exit_code: status.code(),
            stdout,
            stderr,
            duration: start.elapsed(),
        };

        let shown = display_args(args);
        let shown: Vec<&str> = shown.iter().map(String::as_str).collect();
        log_external_tool(
            &self.program.to_string_lossy(),
            &shown,
            &output.diagnostic_text(),
            output.exit_code,
            output.duration,
        );

        Ok(output)
    }

    fn passthrough(&self, args: &[&OsStr]) -> io::Result<Option<i32>> {
        let shown = display_args(args);
        info!(
            command = %format!("{} {}", self.program.display(), shown.join(" ")),
            "Executing FFmpeg command"
        );

        let start = Instant::now();
        let status = Command::new(&self.program)
            .args(args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        let shown: Vec<&str> = shown.iter().map(String::as_str).collect();
        log_external_tool(
            &self.program.to_string_lossy(),
            &shown,
            "",
            status.code(),
            start.elapsed(),
        );

        Ok(status.code())
    }

    fn program(&self) -> &Path {
        &self.program
    }
}

/// FFmpeg child with stderr drained on a background thread.
pub struct FfmpegProcess {
    child: Child,
    stderr_thread: Option<JoinHandle<String>>,
}

impl FfmpegProcess {
    /// Spawn `cmd` with stdin closed and stdout/stderr piped.
    ///
    /// # Errors
    ///
    /// The spawn failed (missing binary, no permission), or stderr could not
    /// be captured.
    pub fn spawn(cmd: &mut Command) -> io::Result<Self> {
        debug!(command = ?cmd, "Spawning FFmpeg");

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn()?;

        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("failed to capture FFmpeg stderr"))?;

        let stderr_thread = thread::spawn(move || {
            let mut buf = Vec::new();
            // a read error mid-stream keeps whatever arrived before it
            let _ = stderr.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        });

        Ok(Self {
            child,
            stderr_thread: Some(stderr_thread),
        })
    }

    fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    fn id(&self) -> u32 {
        self.child.id()
    }

    /// Read stdout to the end, then wait for exit.
    ///
    /// # Returns
    ///
    /// Exit status, stdout and stderr (both decoded lossily).
    ///
    /// # Errors
    ///
    /// Fails if stdout cannot be read or the wait fails. The child is reaped
    /// before a stdout read error is returned.
    pub fn collect_output(self) -> io::Result<(ExitStatus, String, String)> {
        self.collect_output_with(|out| {
            let mut buf = Vec::new();
            out.read_to_end(&mut buf).map(|_| buf)
        })
    }

    fn collect_output_with<F>(mut self, read: F) -> io::Result<(ExitStatus, String, String)>
    where
        F: FnOnce(&mut ChildStdout) -> io::Result<Vec<u8>>,
    {
        // the pipe is closed at the end of this match, so a child still
        // writing to it cannot block the wait
        let stdout = match self.take_stdout() {
            Some(mut out) => read(&mut out),
            None => Ok(Vec::new()),
        };

        let (status, stderr) = self.wait_with_output()?;
        let stdout = stdout?;
        Ok((status, String::from_utf8_lossy(&stdout).into_owned(), stderr))
    }

    /// Wait for exit and collect stderr.
    fn wait_with_output(mut self) -> io::Result<(ExitStatus, String)> {
        let status = self.child.wait()?;
        let stderr = self
            .stderr_thread
            .take()
            .map(|t| t.join().unwrap_or_default())
            .unwrap_or_default();

        debug!(exit_code = ?status.code(), stderr_len = stderr.len(), "FFmpeg process exited");
        Ok((status, stderr))
    }
}

/// Most useful line of an ffmpeg stderr dump for an error message.
///
/// Prefers the last line mentioning an error, then the last non-progress
/// line.
pub fn format_ffmpeg_error(stderr: &str) -> String {
    if let Some(error_line) = stderr
        .lines()
        .rev()
        .find(|line| line.contains("Error") || line.contains("error"))
    {
        return error_line.trim().to_string();
    }

    stderr
        .lines()
        .rev()
        .find(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty()
                && !trimmed.starts_with("frame=")
                && !trimmed.starts_with("fps=")
                && !trimmed.starts_with("size=")
        })
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "Unknown FFmpeg error".to_string())
}
