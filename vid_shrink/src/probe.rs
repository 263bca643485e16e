//! Probe step: run `ffmpeg -i <input>` and turn its banner into a
//! [`ProbeResult`].

use serde::Serialize;
use shared_utils::ffmpeg_banner::{extract_audio_bitrate, extract_duration, extract_video_bitrate};
use shared_utils::{format_ffmpeg_error, Result, ShrinkError, ToolRunner};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, info};

/// Audio bitrate assumed when the banner does not state one.
pub const DEFAULT_AUDIO_BITRATE_KBPS: u32 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbeResult {
    pub duration_secs: f64,
    pub video_bitrate_kbps: u32,
    pub audio_bitrate_kbps: u32,
}

/// Extract the probe facts from diagnostic text.
///
/// A missing duration or bitrate is an error; a missing audio bitrate falls
/// back to [`DEFAULT_AUDIO_BITRATE_KBPS`]. Only the first audio stream is
/// considered.
pub fn probe_from_text(text: &str) -> Result<ProbeResult> {
    let duration_secs = extract_duration(text);
    if duration_secs == 0.0 {
        return Err(ShrinkError::ProbeParse("could not parse duration".into()));
    }

    let video_bitrate_kbps = extract_video_bitrate(text);
    if video_bitrate_kbps == 0 {
        return Err(ShrinkError::ProbeParse(
            "could not parse video bitrate".into(),
        ));
    }

    let audio_bitrate_kbps = match extract_audio_bitrate(text) {
        0 => {
            debug!(
                fallback_kbps = DEFAULT_AUDIO_BITRATE_KBPS,
                "No audio bitrate in banner, using default"
            );
            DEFAULT_AUDIO_BITRATE_KBPS
        }
        kbps => kbps,
    };

    Ok(ProbeResult {
        duration_secs,
        video_bitrate_kbps,
        audio_bitrate_kbps,
    })
}

/// Probe `input` through `runner`.
///
/// `ffmpeg -i` without an output file always exits non-zero, so the exit code
/// is ignored; only a failure to run the tool at all is reported as such.
///
/// # Errors
///
/// * [`ShrinkError::ProbeInvocation`] - the tool could not be run
/// * [`ShrinkError::ProbeParse`] - no duration or bitrate in the banner;
///   the message quotes ffmpeg's most relevant line
pub fn probe_input<R: ToolRunner + ?Sized>(runner: &R, input: &Path) -> Result<ProbeResult> {
    let output = runner
        .capture(&[OsStr::new("-i"), input.as_os_str()])
        .map_err(|e| {
            ShrinkError::probe_io(format!("failed to run {}", runner.program().display()), e)
        })?;

    debug!(
        exit_code = ?output.exit_code,
        stderr_len = output.stderr.len(),
        "Probe finished"
    );

    let result = probe_from_text(&output.diagnostic_text()).map_err(|e| match e {
        ShrinkError::ProbeParse(msg) => ShrinkError::ProbeParse(format!(
            "{} (ffmpeg said: {})",
            msg,
            format_ffmpeg_error(&output.stderr)
        )),
        other => other,
    })?;

    info!(
        input = %input.display(),
        duration_secs = result.duration_secs,
        video_bitrate_kbps = result.video_bitrate_kbps,
        audio_bitrate_kbps = result.audio_bitrate_kbps,
        "Probed input"
    );

    Ok(result)
}
