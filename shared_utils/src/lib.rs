//! Shared Utilities for the vid-shrink tools
//!
//! - Error taxonomy and exit codes
//! - Logging setup and external tool records
//! - FFmpeg process runner (capture / passthrough)
//! - FFmpeg banner scanner (duration, bitrates)
//! - Type-safe size target

pub mod errors;
pub mod ffmpeg_banner;
pub mod ffmpeg_process;
pub mod logging;
pub mod types;

pub use errors::{Result, ShrinkError};
pub use ffmpeg_banner::{
    extract_audio_bitrate, extract_duration, extract_video_bitrate, parse_timecode,
};
pub use ffmpeg_process::{
    format_ffmpeg_error, FfmpegProcess, FfmpegRunner, ToolOutput, ToolRunner, DEFAULT_FFMPEG,
};
pub use types::SizeTarget;
