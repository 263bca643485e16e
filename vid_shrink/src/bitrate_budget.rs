//! Bitrate budget: the video bitrate that makes the output land on a size
//! target.

use serde::Serialize;
use shared_utils::{Result, ShrinkError, SizeTarget};

/// Budgets below this are refused rather than clamped.
pub const MIN_VIDEO_BITRATE_KBPS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BitrateBudget {
    /// Bitrate handed to the encoder (`-b:v <n>k`).
    pub video_bitrate_kbps: u32,
    /// Audio + video bitrate that fills the target exactly.
    pub total_bitrate_kbps: f64,
}

/// `(target_kb * 8 / duration) - audio`, rounded to the nearest kb/s.
///
/// # Arguments
///
/// * `duration_secs` - input duration, must be positive
/// * `target` - desired output size
/// * `audio_bitrate_kbps` - bitrate reserved for the audio stream
///
/// # Errors
///
/// * [`ShrinkError::BitrateTooLow`] - the result is under
///   [`MIN_VIDEO_BITRATE_KBPS`]; carries the unrounded value truncated
///   toward zero. There is no upper bound.
/// * [`ShrinkError::ProbeParse`] - `duration_secs` is zero, negative or not
///   finite
pub fn calculate_video_bitrate(
    duration_secs: f64,
    target: SizeTarget,
    audio_bitrate_kbps: u32,
) -> Result<BitrateBudget> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(ShrinkError::ProbeParse(format!(
            "duration must be positive, got {}",
            duration_secs
        )));
    }

    let total_bitrate_kbps = target.kilobits() as f64 / duration_secs;
    let video_bitrate = total_bitrate_kbps - audio_bitrate_kbps as f64;

    if video_bitrate < MIN_VIDEO_BITRATE_KBPS as f64 {
        return Err(ShrinkError::BitrateTooLow {
            computed_kbps: video_bitrate as i64,
        });
    }

    Ok(BitrateBudget {
        // float-to-int casts saturate, absurd budgets pin to u32::MAX
        video_bitrate_kbps: video_bitrate.round() as u32,
        total_bitrate_kbps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mb(n: u32) -> SizeTarget {
        SizeTarget::new(n).unwrap()
    }

    #[test]
    fn test_ten_megabytes_over_hundred_seconds() {
        let budget = calculate_video_bitrate(100.0, mb(10), 128).unwrap();
        assert_eq!(budget.video_bitrate_kbps, 691);
        assert!((budget.total_bitrate_kbps - 819.2).abs() < 1e-9);
    }

    #[test]
    fn test_five_megabytes_over_one_minute() {
        let budget = calculate_video_bitrate(60.0, mb(5), 128).unwrap();
        assert_eq!(budget.video_bitrate_kbps, 555);
    }

    #[test]
    fn test_too_low_is_refused() {
        let err = calculate_video_bitrate(1000.0, mb(1), 128).unwrap_err();
        match err {
            ShrinkError::BitrateTooLow { computed_kbps } => assert_eq!(computed_kbps, -119),
            other => panic!("expected BitrateTooLow, got {:?}", other),
        }
    }

    #[test]
    fn test_floor_boundary() {
        // 57 MB over 2048 s is exactly 228 kb/s in total
        let budget = calculate_video_bitrate(2048.0, mb(57), 128).unwrap();
        assert_eq!(budget.video_bitrate_kbps, MIN_VIDEO_BITRATE_KBPS);

        let err = calculate_video_bitrate(2048.0, mb(57), 129).unwrap_err();
        assert!(matches!(err, ShrinkError::BitrateTooLow { computed_kbps: 99 }));
    }

    #[test]
    fn test_zero_audio() {
        let budget = calculate_video_bitrate(100.0, mb(10), 0).unwrap();
        assert_eq!(budget.video_bitrate_kbps, 819);
    }

    #[test]
    fn test_no_upper_bound() {
        let budget = calculate_video_bitrate(1.0, mb(1000), 128).unwrap();
        assert_eq!(budget.video_bitrate_kbps, 1000 * 1024 * 8 - 128);
    }

    #[test]
    fn test_non_positive_duration_rejected() {
        for duration in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = calculate_video_bitrate(duration, mb(10), 128).unwrap_err();
            assert!(matches!(err, ShrinkError::ProbeParse(_)), "{}", duration);
        }
    }
}
