//! vid-shrink - re-encode a video so it lands near a target file size
//!
//! Reads duration and bitrates from the `ffmpeg -i` banner, works out the
//! video bitrate that fills the requested size once audio is accounted for,
//! and hands that bitrate to ffmpeg.
//!
//! ```rust,ignore
//! use shared_utils::{FfmpegRunner, SizeTarget};
//! use vid_shrink::{run, ShrinkConfig};
//!
//! let config = ShrinkConfig {
//!     input: "clip.mp4".into(),
//!     target: SizeTarget::new(8).unwrap(),
//!     dry_run: false,
//! };
//! let runner = FfmpegRunner::locate("ffmpeg")?;
//! run(&config, &runner, &mut std::io::stdout())?;
//! ```

pub mod bitrate_budget;
pub mod conversion_api;
pub mod probe;

pub use bitrate_budget::{calculate_video_bitrate, BitrateBudget, MIN_VIDEO_BITRATE_KBPS};
pub use conversion_api::{
    build_encode_args, output_path_for, run, ShrinkConfig, ShrinkReport, OUTPUT_PREFIX,
};
pub use probe::{probe_from_text, probe_input, ProbeResult, DEFAULT_AUDIO_BITRATE_KBPS};

pub use shared_utils::errors::{Result, ShrinkError};
