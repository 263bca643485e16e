//! Type-Safe Wrappers Module
//!
//! - `size_target`: desired output size in megabytes

pub mod size_target;

pub use size_target::{SizeTarget, KB_PER_MB};

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn size_target_parse_accepts_positive_integers(mb in 1u32..=u32::MAX) {
            let target: SizeTarget = mb.to_string().parse().unwrap();
            prop_assert_eq!(target.megabytes(), mb);
            prop_assert_eq!(target.kilobytes(), mb as u64 * KB_PER_MB);
        }

        #[test]
        fn size_target_parse_rejects_non_digits(s in "[a-zA-Z_.]{1,12}") {
            prop_assert!(s.parse::<SizeTarget>().is_err());
        }
    }
}
