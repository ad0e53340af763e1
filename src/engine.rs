//! Single-operation transactions: buy-only or sell-only cash allocation.
//!
//! A regular [`rebalance`](crate::rebalance()) may ask to sell one asset while
//! buying another. In a taxable account that is exactly what we want to avoid:
//! a deposit should only ever buy, a withdrawal should only ever sell. The
//! closed-form solve cannot express that sign constraint, so the allocation is
//! built greedily instead:
//!
//! - the requested change is cut into `max_iter` equal *packets*,
//! - each packet goes to whichever asset is currently furthest from its ideal
//!   value (most underweight when buying, most overweight when selling),
//! - the rebalance vector is recomputed after every packet.
//!
//! Two variants share the same guards:
//!
//! - [`single_operation_transaction`]: the plain loop, O(`max_iter` × N).
//! - [`fast_single_operation_transaction`]: returns the closed form when it is
//!   already single-signed, and otherwise skips the opening stretch where one
//!   asset absorbs every packet by computing analytically how much it takes
//!   before another asset becomes the most extreme one.
//!
//! Both converge to the same allocation as `max_iter` grows; the plain loop is
//! the reference.
//!
//! ```
//! use glidepath::engine::{single_operation_transaction, DEFAULT_MAX_ITER};
//!
//! let weights = [0.5, 0.5];
//! let values = [70.0, 30.0];
//!
//! // Depositing 20: everything goes to the underweight asset, nothing is sold.
//! let deltas = single_operation_transaction(&weights, &values, 100.0, 20.0, DEFAULT_MAX_ITER)
//!     .unwrap();
//! assert!(deltas.iter().all(|d| *d >= 0.0));
//! assert!((deltas[1] - 20.0).abs() < 1e-9);
//! ```

use log::{debug, trace};

use crate::error::{Error, Result, ensure_finite, ensure_len, ensure_weights};
use crate::rebalance::{
    breakeven_changes, most_overweight_index, most_underweight_index, rebalance, rebalance_into,
    threshold,
};

/// Default number of packets the requested change is divided into.
pub const DEFAULT_MAX_ITER: usize = 1000;

/// Which single-operation variant to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Algorithm {
    /// Plain packet-by-packet loop.
    Iterative,
    /// Closed-form and crossover shortcuts, then the loop.
    #[default]
    Fast,
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Iterative => write!(f, "iterative"),
            Algorithm::Fast => write!(f, "fast"),
        }
    }
}

/// Direction of a single-operation transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Buy,
    Sell,
}

impl Direction {
    fn of(target_change: f64) -> Self {
        if target_change < 0.0 {
            Direction::Sell
        } else {
            Direction::Buy
        }
    }

    /// The asset the next packet should go to.
    #[inline]
    fn select(self, deltas: &[f64]) -> usize {
        let picked = match self {
            Direction::Buy => most_underweight_index(deltas),
            Direction::Sell => most_overweight_index(deltas),
        };
        picked.unwrap_or(0)
    }

    /// Whether `amount` moves in this direction (strictly).
    #[inline]
    fn agrees(self, amount: f64) -> bool {
        match self {
            Direction::Buy => amount > 0.0,
            Direction::Sell => amount < 0.0,
        }
    }
}

/// Run the variant selected by `algorithm`.
pub fn transact(
    algorithm: Algorithm,
    target_weights: &[f64],
    asset_values: &[f64],
    portfolio_value: f64,
    target_change: f64,
    max_iter: usize,
) -> Result<Vec<f64>> {
    match algorithm {
        Algorithm::Iterative => single_operation_transaction(
            target_weights,
            asset_values,
            portfolio_value,
            target_change,
            max_iter,
        ),
        Algorithm::Fast => fast_single_operation_transaction(
            target_weights,
            asset_values,
            portfolio_value,
            target_change,
            max_iter,
        ),
    }
}

/// Allocate `target_change` across assets without mixing buys and sells.
///
/// # Arguments
///
/// * `target_weights`: target fraction per asset (expected to sum to 1)
/// * `asset_values`: current value per asset, same order
/// * `portfolio_value`: `Σ asset_values`, passed explicitly
/// * `target_change`: positive to buy, negative to sell
/// * `max_iter`: number of packets; higher is finer and slower
///
/// # Returns
///
/// Per-asset cash deltas, all with the sign of `target_change` (or zero),
/// summing to `target_change`.
///
/// Defined branches, checked in order: zero change gives zeros; a sale of at
/// least the whole portfolio sells everything; a single asset takes the whole
/// change; any weight `>= 1` routes `weight * target_change` to that asset and
/// nothing elsewhere.
pub fn single_operation_transaction(
    target_weights: &[f64],
    asset_values: &[f64],
    portfolio_value: f64,
    target_change: f64,
    max_iter: usize,
) -> Result<Vec<f64>> {
    validate(
        target_weights,
        asset_values,
        portfolio_value,
        target_change,
        max_iter,
    )?;
    if let Some(deltas) = defined_branch(target_weights, asset_values, portfolio_value, target_change)
    {
        return Ok(deltas);
    }

    let direction = Direction::of(target_change);
    let packet = target_change / max_iter as f64;
    let mut running = asset_values.to_vec();
    let mut deltas = vec![0.0; running.len()];

    for i in 0..max_iter {
        let hypothetical_total = portfolio_value + i as f64 * packet;
        rebalance_into(target_weights, &running, hypothetical_total, &mut deltas);
        running[direction.select(&deltas)] += packet;
    }

    Ok(settle(&running, asset_values))
}

/// Same contract as [`single_operation_transaction`], with two shortcuts.
///
/// 1. If the unconstrained rebalance around `portfolio_value + target_change`
///    is already single-signed (the change clears
///    [`min_investment_for_full_buy_rebalance`] or
///    [`min_extraction_for_full_sell_rebalance`]) it is returned as is.
/// 2. Otherwise the most extreme asset first receives, in one step, the amount
///    after which some other asset becomes equally extreme. Solving
///    `rebalance(pv + x, tw_t, av_t + x) = rebalance(pv + x, tw_i, av_i)` for
///    `x` gives
///    `x_i = (pv * (tw_i - tw_t) + av_t - av_i) / (tw_t - tw_i - 1)`,
///    and the smallest crossover (largest, when selling) is used, capped at
///    `target_change`. The rest is allocated in packets of
///    `target_change / max_iter` and the final partial packet keeps the sum
///    exact.
///
/// [`min_investment_for_full_buy_rebalance`]: crate::min_investment_for_full_buy_rebalance
/// [`min_extraction_for_full_sell_rebalance`]: crate::min_extraction_for_full_sell_rebalance
pub fn fast_single_operation_transaction(
    target_weights: &[f64],
    asset_values: &[f64],
    portfolio_value: f64,
    target_change: f64,
    max_iter: usize,
) -> Result<Vec<f64>> {
    validate(
        target_weights,
        asset_values,
        portfolio_value,
        target_change,
        max_iter,
    )?;
    if let Some(deltas) = defined_branch(target_weights, asset_values, portfolio_value, target_change)
    {
        return Ok(deltas);
    }

    let direction = Direction::of(target_change);
    if let Some(deltas) = closed_form(
        target_weights,
        asset_values,
        portfolio_value,
        target_change,
        direction,
    ) {
        debug!("change {target_change} clears the closed-form threshold");
        return Ok(deltas);
    }

    let packet = target_change / max_iter as f64;
    let mut running = asset_values.to_vec();
    let mut deltas = rebalance(target_weights, &running, portfolio_value);

    let first = direction.select(&deltas);
    let init_change = crossover_change(
        target_weights,
        &running,
        portfolio_value,
        first,
        target_change,
        direction,
    );
    running[first] += init_change;
    trace!("crossover: {init_change} into asset {first} before the lead changes");

    let steps = ((target_change - init_change) / packet).floor();
    let steps = if steps.is_finite() && steps > 0.0 {
        (steps as usize).min(max_iter)
    } else {
        0
    };

    let base_total = portfolio_value + init_change;
    for k in 0..steps {
        rebalance_into(
            target_weights,
            &running,
            base_total + k as f64 * packet,
            &mut deltas,
        );
        running[direction.select(&deltas)] += packet;
    }

    let allocated = init_change + steps as f64 * packet;
    let leftover = target_change - allocated;
    if direction.agrees(leftover) {
        rebalance_into(
            target_weights,
            &running,
            portfolio_value + allocated,
            &mut deltas,
        );
        running[direction.select(&deltas)] += leftover;
    }

    Ok(settle(&running, asset_values))
}

fn validate(
    target_weights: &[f64],
    asset_values: &[f64],
    portfolio_value: f64,
    target_change: f64,
    max_iter: usize,
) -> Result<()> {
    if asset_values.is_empty() {
        return Err(Error::Empty("asset values"));
    }
    ensure_len("target weights", asset_values.len(), target_weights.len())?;
    if max_iter == 0 {
        return Err(Error::ZeroIterations);
    }
    ensure_weights(target_weights)?;
    ensure_finite("asset values", asset_values)?;
    ensure_finite("portfolio value", &[portfolio_value])?;
    ensure_finite("target change", &[target_change])?;
    Ok(())
}

/// The cases that never reach the allocation loop.
fn defined_branch(
    target_weights: &[f64],
    asset_values: &[f64],
    portfolio_value: f64,
    target_change: f64,
) -> Option<Vec<f64>> {
    if target_change == 0.0 {
        return Some(vec![0.0; asset_values.len()]);
    }
    if -target_change >= portfolio_value {
        debug!("sale of {} covers the whole portfolio, liquidating", -target_change);
        return Some(asset_values.iter().map(|v| -v).collect());
    }
    if asset_values.len() <= 1 {
        return Some(vec![target_change]);
    }
    if target_weights.iter().any(|&w| w >= 1.0) {
        // The crossover formula divides by (tw_t - tw_i - 1).
        debug!("target weight >= 1 present, routing change by weight");
        return Some(
            target_weights
                .iter()
                .map(|&w| if w >= 1.0 { w * target_change } else { 0.0 })
                .collect(),
        );
    }
    None
}

/// `rebalance(tw, av, pv + change)` when every entry already has the
/// direction's sign.
fn closed_form(
    target_weights: &[f64],
    asset_values: &[f64],
    portfolio_value: f64,
    target_change: f64,
    direction: Direction,
) -> Option<Vec<f64>> {
    let changes = breakeven_changes(target_weights, asset_values, portfolio_value);
    let clears = match direction {
        Direction::Buy => target_change >= threshold(changes, f64::max),
        Direction::Sell => target_change <= threshold(changes, f64::min),
    };
    clears.then(|| rebalance(target_weights, asset_values, portfolio_value + target_change))
}

/// Amount asset `lead` can absorb before another asset becomes the most
/// extreme one, capped at `target_change`.
fn crossover_change(
    target_weights: &[f64],
    asset_values: &[f64],
    portfolio_value: f64,
    lead: usize,
    target_change: f64,
    direction: Direction,
) -> f64 {
    let (tw_t, av_t) = (target_weights[lead], asset_values[lead]);
    let crossings = target_weights
        .iter()
        .zip(asset_values)
        .enumerate()
        .filter(|&(i, _)| i != lead)
        .map(|(_, (tw_i, av_i))| {
            (portfolio_value * (tw_i - tw_t) + av_t - av_i) / (tw_t - tw_i - 1.0)
        });
    match direction {
        Direction::Buy => crossings.fold(target_change, f64::min).max(0.0),
        Direction::Sell => crossings.fold(target_change, f64::max).min(0.0),
    }
}

fn settle(running: &[f64], original: &[f64]) -> Vec<f64> {
    running.iter().zip(original).map(|(new, old)| new - old).collect()
}
