//! Glide-path target weights: linear interpolation between two allocations.

use chrono::{NaiveDate, Utc};

use crate::error::{Error, Result, ensure_len};

/// Target weights for `today` on a straight line from `start_weights` (on
/// `start_date`) to `final_weights` (on `end_date`), at whole-day resolution.
///
/// - `today == start_date` returns `start_weights` verbatim,
/// - `today >= end_date` returns `final_weights` verbatim,
/// - otherwise `start_i + (final_i - start_i) * elapsed_days / total_days`.
///
/// Days before `start_date` count as negative elapsed days, so the line is
/// extrapolated backwards and the result may fall outside `[0, 1]`.
///
/// ```
/// use chrono::NaiveDate;
/// use glidepath::glide::target_weights_on;
///
/// let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2026, 1, 11).unwrap();
/// let mid = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
///
/// let w = target_weights_on(&[0.8, 0.2], &[0.4, 0.6], start, end, mid).unwrap();
/// assert!((w[0] - 0.6).abs() < 1e-12);
/// assert!((w[1] - 0.4).abs() < 1e-12);
/// ```
pub fn target_weights_on(
    start_weights: &[f64],
    final_weights: &[f64],
    start_date: NaiveDate,
    end_date: NaiveDate,
    today: NaiveDate,
) -> Result<Vec<f64>> {
    ensure_len("final weights", start_weights.len(), final_weights.len())?;
    if end_date < start_date {
        return Err(Error::InvalidDateRange);
    }

    if today == start_date {
        return Ok(start_weights.to_vec());
    }
    if today >= end_date {
        return Ok(final_weights.to_vec());
    }

    let total_days = (end_date - start_date).num_days() as f64;
    let elapsed = (today - start_date).num_days() as f64;
    let progress = elapsed / total_days;

    Ok(start_weights
        .iter()
        .zip(final_weights)
        .map(|(s, f)| s + (f - s) * progress)
        .collect())
}

/// [`target_weights_on`] evaluated for the current UTC day.
pub fn target_weights(
    start_weights: &[f64],
    final_weights: &[f64],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<f64>> {
    target_weights_on(
        start_weights,
        final_weights,
        start_date,
        end_date,
        Utc::now().date_naive(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const START: [f64; 5] = [0.10, 0.49, 0.18, 0.23, 0.00];
    const FINAL: [f64; 5] = [0.04, 0.44, 0.22, 0.10, 0.20];

    #[test]
    fn start_day_returns_start_weights() {
        let w = target_weights_on(&START, &FINAL, day(2023, 4, 2), day(2023, 4, 3), day(2023, 4, 2))
            .unwrap();
        assert_eq!(w, START.to_vec());
    }

    #[test]
    fn end_day_and_after_return_final_weights() {
        for today in [day(2023, 4, 3), day(2030, 1, 1)] {
            let w = target_weights_on(&START, &FINAL, day(2023, 4, 2), day(2023, 4, 3), today)
                .unwrap();
            assert_eq!(w, FINAL.to_vec());
        }
    }

    #[test]
    fn before_start_extrapolates_backwards() {
        let w = target_weights_on(&[0.5, 0.5], &[0.7, 0.3], day(2024, 1, 11), day(2024, 1, 21), day(2024, 1, 6))
            .unwrap();
        assert!((w[0] - 0.4).abs() < 1e-12);
        assert!((w[1] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn quarter_way() {
        let w = target_weights_on(&[1.0, 0.0], &[0.0, 1.0], day(2024, 1, 1), day(2024, 1, 5), day(2024, 1, 2))
            .unwrap();
        assert_eq!(w, vec![0.75, 0.25]);
    }

    #[test]
    fn interpolated_weights_keep_their_sum() {
        let w = target_weights_on(&START, &FINAL, day(2023, 1, 1), day(2033, 1, 1), day(2027, 6, 30))
            .unwrap();
        let sum: f64 = w.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn same_start_and_end() {
        let d = day(2025, 5, 5);
        assert_eq!(target_weights_on(&START, &FINAL, d, d, d).unwrap(), START.to_vec());
        assert_eq!(
            target_weights_on(&START, &FINAL, d, d, day(2025, 5, 6)).unwrap(),
            FINAL.to_vec()
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            target_weights_on(&START, &FINAL, day(2025, 1, 2), day(2025, 1, 1), day(2025, 1, 1)),
            Err(Error::InvalidDateRange)
        );
        assert!(matches!(
            target_weights_on(&START, &FINAL[..3], day(2025, 1, 1), day(2025, 1, 2), day(2025, 1, 1)),
            Err(Error::LengthMismatch { .. })
        ));
    }
}
