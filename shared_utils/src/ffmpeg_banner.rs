//! FFmpeg banner scanner
//!
//! `ffmpeg -i <file>` prints a human-readable description of the input on
//! stderr. This module pulls the few numbers the size calculation needs out
//! of that text:
//!
//! ```text
//!   Duration: 00:01:00.00, start: 0.000000, bitrate: 1632 kb/s
//!   Stream #0:0(und): Video: h264 (High), yuv420p, 1920x1080, 1500 kb/s, 30 fps
//!   Stream #0:1(und): Audio: aac (LC), 48000 Hz, stereo, fltp, 128 kb/s
//! ```
//!
//! Every extractor scans for a marker, skips the delimiter after it and reads
//! up to the next delimiter or unit. A missing marker or an unreadable value
//! yields `0`; callers decide whether that is fatal.
//!
//! Only the first occurrence of each marker is used. With several audio
//! tracks the first one wins.

pub const DURATION_MARKER: &str = "Duration:";
pub const BITRATE_MARKER: &str = "bitrate:";
pub const AUDIO_MARKER: &str = "Audio:";
pub const KBPS_UNIT: &str = "kb/s";

fn after_marker<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    text.find(marker).map(|idx| &text[idx + marker.len()..])
}

/// Total duration in seconds, or `0.0` when absent (`Duration: N/A` included).
pub fn extract_duration(text: &str) -> f64 {
    let Some(rest) = after_marker(text, DURATION_MARKER) else {
        return 0.0;
    };
    let token = rest
        .trim_start()
        .split(|c: char| c == ',' || c.is_whitespace())
        .next()
        .unwrap_or("");
    parse_timecode(token).unwrap_or(0.0)
}

/// Parse `HH:MM:SS[.frac]` into seconds.
///
/// Returns `None` unless there are exactly three fields. Individual fields
/// that do not parse count as zero.
pub fn parse_timecode(token: &str) -> Option<f64> {
    let parts: Vec<&str> = token.split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let field = |s: &str| {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(0.0)
    };

    Some(field(parts[0]) * 3600.0 + field(parts[1]) * 60.0 + field(parts[2]))
}

/// Overall bitrate from the `Duration:` line, in kb/s. `0` on miss.
pub fn extract_video_bitrate(text: &str) -> u32 {
    let Some(rest) = after_marker(text, BITRATE_MARKER) else {
        return 0;
    };
    // the value and its unit share a line; `bitrate: N/A` must not run into
    // the next stream's figures
    let line = rest.lines().next().unwrap_or("");
    match line.find(KBPS_UNIT) {
        Some(end) => line[..end].trim().parse::<u32>().unwrap_or(0),
        None => 0,
    }
}

/// Bitrate of the first audio stream in kb/s, read from the number right
/// before the first `kb/s` that follows `Audio:`. `0` on miss.
pub fn extract_audio_bitrate(text: &str) -> u32 {
    let Some(rest) = after_marker(text, AUDIO_MARKER) else {
        return 0;
    };
    let Some(unit_idx) = rest.find(KBPS_UNIT) else {
        return 0;
    };

    let before = rest[..unit_idx].trim_end();
    let digits_start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);

    match digits_start {
        Some(start) => before[start..].parse::<u32>().unwrap_or(0),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANNER: &str = r#"ffmpeg version 6.1.1 Copyright (c) 2000-2023 the FFmpeg developers
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'clip.mp4':
  Metadata:
    major_brand     : isom
    encoder         : Lavf60.16.100
  Duration: 00:01:00.00, start: 0.000000, bitrate: 1632 kb/s
  Stream #0:0[0x1](und): Video: h264 (High) (avc1 / 0x31637661), yuv420p(progressive), 1920x1080 [SAR 1:1 DAR 16:9], 1500 kb/s, 30 fps, 30 tbr, 15360 tbn (default)
  Stream #0:1[0x2](und): Audio: aac (LC) (mp4a / 0x6134706D), 48000 Hz, stereo, fltp, 128 kb/s (default)
At least one output file must be specified
"#;

    #[test]
    fn test_extract_from_full_banner() {
        assert_eq!(extract_duration(BANNER), 60.0);
        assert_eq!(extract_video_bitrate(BANNER), 1632);
        assert_eq!(extract_audio_bitrate(BANNER), 128);
    }

    #[test]
    fn test_extract_duration_hours_minutes_fraction() {
        let text = "  Duration: 01:02:03.45, start: 0.000000, bitrate: 900 kb/s";
        let expected = 1.0 * 3600.0 + 2.0 * 60.0 + 3.45;
        assert!((extract_duration(text) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_extract_duration_missing_marker() {
        assert_eq!(extract_duration("no timing information here"), 0.0);
        assert_eq!(extract_duration(""), 0.0);
    }

    #[test]
    fn test_extract_duration_not_available() {
        assert_eq!(extract_duration("  Duration: N/A, bitrate: N/A"), 0.0);
    }

    #[test]
    fn test_extract_duration_lenient_fields() {
        // unreadable minutes count as zero
        assert_eq!(extract_duration("Duration: 00:xx:30.00,"), 30.0);
    }

    #[test]
    fn test_extract_duration_tolerates_extra_spacing() {
        assert_eq!(extract_duration("Duration:    00:00:10.50 , start"), 10.5);
        assert_eq!(extract_duration("Duration:00:00:05.00\n"), 5.0);
    }

    #[test]
    fn test_parse_timecode_field_count() {
        assert_eq!(parse_timecode("00:00:10"), Some(10.0));
        assert_eq!(parse_timecode("00:10"), None);
        assert_eq!(parse_timecode("00:00:00:10"), None);
        assert_eq!(parse_timecode(""), None);
    }

    #[test]
    fn test_extract_video_bitrate() {
        assert_eq!(extract_video_bitrate("bitrate: 1234 kb/s"), 1234);
        assert_eq!(extract_video_bitrate("nothing to see"), 0);
    }

    #[test]
    fn test_extract_video_bitrate_not_available() {
        let text = "  Duration: 00:00:10.00, start: 0.000000, bitrate: N/A\n  Stream #0:0: Audio: mp3, 44100 Hz, stereo, 320 kb/s";
        assert_eq!(extract_video_bitrate(text), 0);
    }

    #[test]
    fn test_extract_video_bitrate_missing_unit() {
        assert_eq!(extract_video_bitrate("bitrate: 1234"), 0);
    }

    #[test]
    fn test_extract_audio_bitrate() {
        let text = "Stream #0:1: Audio: aac, 44100 Hz, stereo, fltp, 128 kb/s";
        assert_eq!(extract_audio_bitrate(text), 128);
    }

    #[test]
    fn test_extract_audio_bitrate_wide_values() {
        // four-digit and two-digit bitrates both read correctly
        assert_eq!(extract_audio_bitrate("Audio: dts, 48000 Hz, 5.1, 1536 kb/s"), 1536);
        assert_eq!(extract_audio_bitrate("Audio: opus, 48000 Hz, mono, 64 kb/s"), 64);
    }

    #[test]
    fn test_extract_audio_bitrate_absent() {
        assert_eq!(extract_audio_bitrate("Video: h264, 1500 kb/s"), 0);
        assert_eq!(extract_audio_bitrate("Audio: pcm_s16le, 44100 Hz, stereo"), 0);
        assert_eq!(extract_audio_bitrate("Audio: aac, N/A kb/s"), 0);
    }

    #[test]
    fn test_extract_audio_bitrate_first_stream_only() {
        let text = "Audio: aac, 128 kb/s (default)\n  Stream #0:2: Audio: ac3, 384 kb/s";
        assert_eq!(extract_audio_bitrate(text), 128);
    }
}
