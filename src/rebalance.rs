//! Unconstrained rebalance arithmetic.
//!
//! Everything here is a closed-form O(N) pass over parallel slices of target
//! weights and asset values. The constrained (single-direction) allocator in
//! [`crate::engine`] is built on top of these primitives.

use crate::error::{Result, ensure_finite, ensure_len, ensure_weights};

/// Ideal cash movement per asset, with no sign constraint.
///
/// `delta_i = portfolio_value * target_weights_i - asset_values_i`. Positive
/// entries are underweight (buy), negative entries overweight (sell).
///
/// `portfolio_value` is the hypothetical total the weights apply to; pass
/// `Σ asset_values + cash_change` to rebalance around a deposit or withdrawal.
/// The two slices must have equal length.
///
/// ```
/// use glidepath::rebalance;
///
/// let deltas = rebalance(&[0.6, 0.4], &[700.0, 300.0], 1_000.0);
/// assert_eq!(deltas, vec![-100.0, 100.0]);
/// ```
pub fn rebalance(target_weights: &[f64], asset_values: &[f64], portfolio_value: f64) -> Vec<f64> {
    debug_assert_eq!(
        target_weights.len(),
        asset_values.len(),
        "target_weights and asset_values must be the same length"
    );
    target_weights
        .iter()
        .zip(asset_values)
        .map(|(tw, av)| portfolio_value * tw - av)
        .collect()
}

/// [`rebalance`] into a caller-owned buffer, for loops that recompute the
/// vector every step.
#[inline]
pub(crate) fn rebalance_into(
    target_weights: &[f64],
    asset_values: &[f64],
    portfolio_value: f64,
    out: &mut [f64],
) {
    for ((delta, tw), av) in out.iter_mut().zip(target_weights).zip(asset_values) {
        *delta = portfolio_value * tw - av;
    }
}

/// Index of the largest delta (the most underweight asset).
///
/// Ties resolve to the first index. Returns `None` for an empty slice.
#[inline]
pub fn most_underweight_index(deltas: &[f64]) -> Option<usize> {
    extreme_index(deltas.iter().copied(), |candidate, best| candidate > best)
}

/// Index of the smallest delta (the most overweight asset).
///
/// Ties resolve to the first index. Returns `None` for an empty slice.
#[inline]
pub fn most_overweight_index(deltas: &[f64]) -> Option<usize> {
    extreme_index(deltas.iter().copied(), |candidate, best| candidate < best)
}

/// Left-to-right fold keeping the current best unless `beats` is strictly true.
pub(crate) fn extreme_index(
    deltas: impl IntoIterator<Item = f64>,
    beats: impl Fn(f64, f64) -> bool,
) -> Option<usize> {
    let mut deltas = deltas.into_iter().enumerate();
    let (mut best, mut best_delta) = deltas.next()?;
    for (i, delta) in deltas {
        if beats(delta, best_delta) {
            best = i;
            best_delta = delta;
        }
    }
    Some(best)
}

/// Per-asset change in total portfolio value after which the asset's current
/// value is exactly its target weight: `av_i / tw_i - total`, i.e.
/// `-delta_i / tw_i`.
///
/// An asset with zero weight and zero value is already at target for every
/// total and is skipped.
pub(crate) fn breakeven_changes<'a>(
    target_weights: &'a [f64],
    asset_values: &'a [f64],
    portfolio_value: f64,
) -> impl Iterator<Item = f64> + 'a {
    target_weights
        .iter()
        .zip(asset_values)
        .filter_map(move |(&tw, &av)| breakeven_change(tw, av, portfolio_value))
}

/// One asset's breakeven change; `None` for zero weight and zero value.
#[inline]
pub(crate) fn breakeven_change(
    target_weight: f64,
    asset_value: f64,
    portfolio_value: f64,
) -> Option<f64> {
    let x = -(target_weight * portfolio_value - asset_value) / target_weight;
    (!x.is_nan()).then_some(x)
}

/// Smallest cash injection for which the closed-form split
/// `rebalance(tw, av, total + cash)` contains no sales.
///
/// Equals `max_i(-delta_i / tw_i)`. It is driven by the asset that is hardest
/// to bring back to weight by buying alone, which is usually (not always) the
/// most overweight one. A single-asset portfolio needs nothing and returns 0.
pub fn min_investment_for_full_buy_rebalance(target_weights: &[f64], asset_values: &[f64]) -> f64 {
    if asset_values.len() <= 1 {
        return 0.0;
    }
    let total: f64 = asset_values.iter().sum();
    threshold(breakeven_changes(target_weights, asset_values, total), f64::max)
}

/// Largest (closest to zero) withdrawal for which the closed-form split
/// contains no purchases. The value is non-positive; withdrawals at or beyond
/// it (more negative) can be served by selling alone.
///
/// Equals `min_i(-delta_i / tw_i)`. A single-asset portfolio returns 0.
pub fn min_extraction_for_full_sell_rebalance(
    target_weights: &[f64],
    asset_values: &[f64],
) -> f64 {
    if asset_values.len() <= 1 {
        return 0.0;
    }
    let total: f64 = asset_values.iter().sum();
    threshold(breakeven_changes(target_weights, asset_values, total), f64::min)
}

pub(crate) fn threshold(changes: impl Iterator<Item = f64>, pick: fn(f64, f64) -> f64) -> f64 {
    changes.reduce(pick).unwrap_or(0.0)
}

/// Move straight to the target weights, buying and selling as needed.
///
/// Intended for tax-advantaged accounts where selling carries no cost.
/// `target_change` is the net deposit (positive) or withdrawal (negative) made
/// at the same time. If the withdrawal empties the account every holding is
/// sold.
///
/// ```
/// use glidepath::full_rebalance_now;
///
/// let deltas = full_rebalance_now(&[0.5, 0.5], &[80.0, 20.0], 100.0).unwrap();
/// assert_eq!(deltas, vec![20.0, 80.0]);
/// ```
pub fn full_rebalance_now(
    target_weights: &[f64],
    asset_values: &[f64],
    target_change: f64,
) -> Result<Vec<f64>> {
    ensure_len("asset values", target_weights.len(), asset_values.len())?;
    ensure_weights(target_weights)?;
    ensure_finite("asset values", asset_values)?;
    ensure_finite("target change", &[target_change])?;

    let total = asset_values.iter().sum::<f64>() + target_change;
    if total <= 0.0 {
        return Ok(asset_values.iter().map(|v| -v).collect());
    }
    Ok(rebalance(target_weights, asset_values, total))
}
