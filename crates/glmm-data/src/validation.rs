//! Range checks for numeric generation parameters.
//!
//! # Validation Rules
//!
//! - Observation and group counts must be positive integers
//! - The dispersion `phi` must be finite and strictly positive
//! - The group standard deviation must be finite and non-negative

use crate::error::GenerationError;

/// Rejects a zero count.
pub(crate) fn require_positive_count(
    name: &'static str,
    value: usize,
) -> Result<usize, GenerationError> {
    if value == 0 {
        return Err(GenerationError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: "must be a positive integer",
        });
    }
    Ok(value)
}

/// Rejects a value that is not finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, GenerationError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(GenerationError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: "must be finite and strictly positive",
        });
    }
    Ok(value)
}

/// Rejects a value that is not finite and non-negative.
pub(crate) fn require_non_negative(
    name: &'static str,
    value: f64,
) -> Result<f64, GenerationError> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(GenerationError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: "must be finite and non-negative",
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    //! Covers the accepted and rejected ranges of each check.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1)]
    #[case(10_000)]
    fn positive_counts_pass(#[case] value: usize) {
        assert_eq!(require_positive_count("n_obs", value), Ok(value));
    }

    #[test]
    fn zero_count_fails() {
        assert_eq!(
            require_positive_count("n_groups", 0),
            Err(GenerationError::InvalidParameter {
                name: "n_groups",
                value: "0".to_owned(),
                reason: "must be a positive integer",
            })
        );
    }

    #[rstest]
    #[case(0.0, false)]
    #[case(-0.6, false)]
    #[case(f64::INFINITY, false)]
    #[case(f64::NAN, false)]
    #[case(1e-12, true)]
    #[case(0.6, true)]
    fn positive_values(#[case] value: f64, #[case] accepted: bool) {
        assert_eq!(require_positive("phi", value).is_ok(), accepted);
    }

    #[rstest]
    #[case(-1e-12, false)]
    #[case(f64::NAN, false)]
    #[case(f64::NEG_INFINITY, false)]
    #[case(0.0, true)]
    #[case(3.0, true)]
    fn non_negative_values(#[case] value: f64, #[case] accepted: bool) {
        assert_eq!(require_non_negative("group_sd", value).is_ok(), accepted);
    }
}
