//! Input validation errors for the rebalancing core.

use thiserror::Error;

/// Errors returned when caller-supplied arrays or scalars are unusable.
///
/// Degenerate-but-defined situations (zero change, a sale larger than the
/// portfolio, a target weight of 100%) are branches of the algorithms, not
/// errors.
#[derive(Clone, Debug, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Error {
    /// Two parallel sequences disagree in length.
    #[error("{what}: expected {expected} entries, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A sequence that needs at least one entry was empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// `max_iter` was zero.
    #[error("max_iter must be at least 1")]
    ZeroIterations,

    /// A value was NaN or infinite.
    #[error("{0} must be finite")]
    NonFinite(&'static str),

    /// Target weights are fractions and cannot be negative.
    #[error("target weight at index {index} is negative ({weight})")]
    NegativeWeight { index: usize, weight: f64 },

    /// Buy-only / sell-only amounts are magnitudes.
    #[error("amount must be non-negative, got {0}")]
    NegativeAmount(f64),

    /// A date sequence was not sorted ascending.
    #[error("{what} are not sorted ascending (first violation at index {index})")]
    Unsorted { what: &'static str, index: usize },

    /// Glide path ends before it starts.
    #[error("end date precedes start date")]
    InvalidDateRange,

    /// The same ticker appears twice in one portfolio.
    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Check that `actual` has the same length as the reference sequence.
pub(crate) fn ensure_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::LengthMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Check every entry of `values` is finite.
pub(crate) fn ensure_finite(what: &'static str, values: &[f64]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(Error::NonFinite(what))
    }
}

/// Check target weights are finite and non-negative.
pub(crate) fn ensure_weights(weights: &[f64]) -> Result<()> {
    ensure_finite("target weights", weights)?;
    match weights.iter().position(|&w| w < 0.0) {
        Some(index) => Err(Error::NegativeWeight {
            index,
            weight: weights[index],
        }),
        None => Ok(()),
    }
}

/// Check a sequence is sorted ascending (ties allowed).
pub(crate) fn ensure_sorted<T: PartialOrd>(what: &'static str, items: &[T]) -> Result<()> {
    match items.windows(2).position(|w| w[1] < w[0]) {
        Some(i) => Err(Error::Unsorted { what, index: i + 1 }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let err = Error::LengthMismatch {
            what: "asset values",
            expected: 3,
            actual: 2,
        };
        assert_eq!(format!("{err}"), "asset values: expected 3 entries, got 2");
        assert_eq!(
            format!("{}", Error::ZeroIterations),
            "max_iter must be at least 1"
        );
    }

    #[test]
    fn is_error() {
        let err: Box<dyn std::error::Error> = Box::new(Error::Empty("tickers"));
        assert!(err.to_string().contains("tickers"));
    }

    #[test]
    fn negative_weight_reports_first_offender() {
        let err = ensure_weights(&[0.5, -0.1, -0.2]).unwrap_err();
        assert_eq!(
            err,
            Error::NegativeWeight {
                index: 1,
                weight: -0.1
            }
        );
    }

    #[test]
    fn sorted_allows_ties() {
        assert!(ensure_sorted("dates", &[1, 2, 2, 3]).is_ok());
        assert_eq!(
            ensure_sorted("dates", &[1, 3, 2]),
            Err(Error::Unsorted {
                what: "dates",
                index: 2
            })
        );
    }

    #[test]
    fn finite_rejects_nan() {
        assert!(ensure_finite("values", &[1.0, f64::NAN]).is_err());
        assert!(ensure_finite("values", &[1.0, 2.0]).is_ok());
    }
}
