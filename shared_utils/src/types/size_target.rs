//! SizeTarget Type-Safe Wrapper
//!
//! The desired output size, in whole megabytes. Zero is rejected at
//! construction so the bitrate budget never starts from an empty file.

use crate::errors::ShrinkError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Kilobytes per megabyte used by the size calculation.
pub const KB_PER_MB: u64 = 1024;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SizeTarget(u32);

impl SizeTarget {
    /// Returns `None` for zero.
    pub const fn new(megabytes: u32) -> Option<Self> {
        if megabytes == 0 {
            None
        } else {
            Some(Self(megabytes))
        }
    }

    #[inline]
    pub const fn megabytes(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn kilobytes(&self) -> u64 {
        self.0 as u64 * KB_PER_MB
    }

    /// Total kilobits the output may occupy.
    #[inline]
    pub const fn kilobits(&self) -> u64 {
        self.kilobytes() * 8
    }
}

impl fmt::Debug for SizeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SizeTarget({} MB)", self.0)
    }
}

impl fmt::Display for SizeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} MB", self.0)
    }
}

impl FromStr for SizeTarget {
    type Err = ShrinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| ShrinkError::InvalidSizeArgument {
            value: s.to_string(),
            reason,
        };

        let megabytes = s.trim().parse::<u32>().map_err(|e| invalid(e.to_string()))?;
        SizeTarget::new(megabytes).ok_or_else(|| invalid("size must be greater than zero".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero() {
        assert!(SizeTarget::new(0).is_none());
        assert_eq!(SizeTarget::new(5).map(|t| t.megabytes()), Some(5));
    }

    #[test]
    fn test_units() {
        let target = SizeTarget::new(10).unwrap();
        assert_eq!(target.kilobytes(), 10_240);
        assert_eq!(target.kilobits(), 81_920);
    }

    #[test]
    fn test_large_target_does_not_overflow() {
        let target = SizeTarget::new(u32::MAX).unwrap();
        assert_eq!(target.kilobytes(), u32::MAX as u64 * 1024);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("25".parse::<SizeTarget>().unwrap().megabytes(), 25);
        assert_eq!(" 8 ".parse::<SizeTarget>().unwrap().megabytes(), 8);
    }

    #[test]
    fn test_from_str_invalid() {
        for input in ["abc", "", "1.5", "-3", "10MB"] {
            match input.parse::<SizeTarget>() {
                Err(ShrinkError::InvalidSizeArgument { value, .. }) => assert_eq!(value, input),
                other => panic!("{:?} should be rejected, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_from_str_zero() {
        let err = "0".parse::<SizeTarget>().unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_display() {
        assert_eq!(SizeTarget::new(5).unwrap().to_string(), "5 MB");
        assert_eq!(format!("{:?}", SizeTarget::new(5).unwrap()), "SizeTarget(5 MB)");
    }
}
