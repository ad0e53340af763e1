//! Share counts across stock splits.

use chrono::NaiveDate;

use crate::error::{Result, ensure_len, ensure_sorted};

/// Net shares held after a sequence of transactions and stock splits.
///
/// Both date sequences must be sorted ascending and pair one-to-one with their
/// quantities / ratios. A single pass merges the two: before each transaction
/// is added, every split dated on or before it multiplies the running count.
/// A split on the same day as a purchase therefore applies to the shares held
/// before that day, not to the new ones. Splits after the last transaction
/// are applied at the end.
///
/// Quantities are signed: positive for buys, negative for sales.
///
/// ```
/// use chrono::NaiveDate;
/// use glidepath::shares::share_count;
///
/// let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
///
/// // 10 shares, then a 2:1 split, then 5 more.
/// let n = share_count(&[d(2020, 1, 1), d(2021, 1, 1)], &[10.0, 5.0], &[d(2020, 6, 1)], &[2.0])
///     .unwrap();
/// assert_eq!(n, 25.0);
/// ```
pub fn share_count(
    transaction_dates: &[NaiveDate],
    quantities: &[f64],
    split_dates: &[NaiveDate],
    split_ratios: &[f64],
) -> Result<f64> {
    ensure_len("transaction quantities", transaction_dates.len(), quantities.len())?;
    ensure_len("split ratios", split_dates.len(), split_ratios.len())?;
    ensure_sorted("transaction dates", transaction_dates)?;
    ensure_sorted("split dates", split_dates)?;

    let mut shares = 0.0;
    let mut next_split = 0;

    for (date, quantity) in transaction_dates.iter().zip(quantities) {
        while next_split < split_dates.len() && split_dates[next_split] <= *date {
            shares *= split_ratios[next_split];
            next_split += 1;
        }
        shares += quantity;
    }

    shares *= split_ratios[next_split..].iter().product::<f64>();
    Ok(shares)
}
