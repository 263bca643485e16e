//! Size-targeted conversion: probe → bitrate budget → encode.

use crate::bitrate_budget::{calculate_video_bitrate, BitrateBudget};
use crate::probe::{probe_input, ProbeResult};
use serde::{Serialize, Serializer};
use shared_utils::{Result, ShrinkError, SizeTarget, ToolRunner};
use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const OUTPUT_PREFIX: &str = "compressed_";

#[derive(Debug, Clone)]
pub struct ShrinkConfig {
    pub input: PathBuf,
    pub target: SizeTarget,
    /// Stop after the calculation.
    pub dry_run: bool,
}

/// Outcome of one [`run`], printed by `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct ShrinkReport {
    #[serde(serialize_with = "serialize_path_lossy")]
    pub input: PathBuf,
    #[serde(serialize_with = "serialize_path_lossy")]
    pub output: PathBuf,
    pub target_mb: SizeTarget,
    pub probe: ProbeResult,
    pub budget: BitrateBudget,
    pub encoded: bool,
}

// invalid UTF-8 becomes U+FFFD instead of failing the whole report
fn serialize_path_lossy<S: Serializer>(path: &Path, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

impl ShrinkReport {
    /// The report as one line of JSON.
    ///
    /// # Errors
    ///
    /// [`ShrinkError::Report`] if serialization fails.
    pub fn to_json_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ShrinkError::Report(e.to_string()))
    }
}

/// `compressed_<file name>` in the current directory. `None` when `input`
/// has no file name (`/`, `..`).
pub fn output_path_for(input: &Path) -> Option<PathBuf> {
    let name = input.file_name()?;
    let mut out = OsString::from(OUTPUT_PREFIX);
    out.push(name);
    Some(PathBuf::from(out))
}

/// `-i <input> -b:v <n>k <output>`
pub fn build_encode_args(input: &Path, video_bitrate_kbps: u32, output: &Path) -> Vec<OsString> {
    vec![
        OsString::from("-i"),
        input.as_os_str().to_os_string(),
        OsString::from("-b:v"),
        OsString::from(format!("{}k", video_bitrate_kbps)),
        output.as_os_str().to_os_string(),
    ]
}

fn say<W: Write + ?Sized>(out: &mut W, line: std::fmt::Arguments<'_>) {
    if let Err(e) = writeln!(out, "{}", line) {
        warn!(error = %e, "Failed to write progress line");
    }
}

/// Run the whole pipeline. Progress lines go to `out`; the encoder's own
/// output goes straight to the terminal.
///
/// # Arguments
///
/// * `config` - input, target size and dry-run switch
/// * `runner` - executes ffmpeg for the probe and the encode
/// * `out` - receives the progress lines; write failures are only logged
///
/// # Returns
///
/// A [`ShrinkReport`]; `encoded` is false for a dry run.
///
/// # Errors
///
/// The first failing step's error: probe, bitrate budget or encode. Nothing
/// is encoded after a probe or budget failure.
pub fn run<R, W>(config: &ShrinkConfig, runner: &R, out: &mut W) -> Result<ShrinkReport>
where
    R: ToolRunner + ?Sized,
    W: Write + ?Sized,
{
    info!(
        input = %config.input.display(),
        target = %config.target,
        dry_run = config.dry_run,
        "Starting size-targeted conversion"
    );

    let probe = probe_input(runner, &config.input)?;
    say(out, format_args!("video duration: {:.2} seconds", probe.duration_secs));
    say(out, format_args!("original video bitrate: {} kbps", probe.video_bitrate_kbps));
    say(out, format_args!("audio bitrate: {} kbps", probe.audio_bitrate_kbps));

    let budget = calculate_video_bitrate(probe.duration_secs, config.target, probe.audio_bitrate_kbps)?;
    say(
        out,
        format_args!(
            "calculated video bitrate for desired output size: {} kbps",
            budget.video_bitrate_kbps
        ),
    );

    let output = output_path_for(&config.input).ok_or_else(|| ShrinkError::EncodeInvocation {
        message: format!("input path has no file name: {}", config.input.display()),
        exit_code: None,
    })?;

    let mut report = ShrinkReport {
        input: config.input.clone(),
        output,
        target_mb: config.target,
        probe,
        budget,
        encoded: false,
    };

    if config.dry_run {
        say(
            out,
            format_args!(
                "dry run: would write {} with bitrate {} kbps",
                report.output.display(),
                budget.video_bitrate_kbps
            ),
        );
        return Ok(report);
    }

    encode(runner, &config.input, budget.video_bitrate_kbps, &report.output)?;
    report.encoded = true;

    say(
        out,
        format_args!(
            "video compressed successfully to {} with bitrate {} kbps",
            report.output.display(),
            budget.video_bitrate_kbps
        ),
    );
    info!(output = %report.output.display(), video_bitrate_kbps = budget.video_bitrate_kbps, "Conversion complete");

    Ok(report)
}

fn encode<R: ToolRunner + ?Sized>(
    runner: &R,
    input: &Path,
    video_bitrate_kbps: u32,
    output: &Path,
) -> Result<()> {
    let args = build_encode_args(input, video_bitrate_kbps, output);
    let args: Vec<&OsStr> = args.iter().map(OsString::as_os_str).collect();

    let exit_code = runner
        .passthrough(&args)
        .map_err(|e| ShrinkError::EncodeInvocation {
            message: format!("failed to run {}: {}", runner.program().display(), e),
            exit_code: None,
        })?;

    match exit_code {
        Some(0) => Ok(()),
        Some(code) => Err(ShrinkError::EncodeInvocation {
            message: format!("exit status {}", code),
            exit_code: Some(code),
        }),
        None => Err(ShrinkError::EncodeInvocation {
            message: "terminated by signal".into(),
            exit_code: None,
        }),
    }
}
