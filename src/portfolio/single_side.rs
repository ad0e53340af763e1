//! Buy-only and sell-only rebalancing over a live [`Portfolio`] view.
//!
//! When the amount is large enough that the proportional split
//! `tw_i * amount + delta_i` is already single-signed, that exact answer is
//! returned. Otherwise the amount is handed out in `max_iter` packets, each to
//! the asset that is currently furthest from ideal in the operation's
//! direction.

use log::debug;

use super::Portfolio;
use crate::error::{Error, Result};

/// Split `money_to_invest` across assets without selling anything.
///
/// Returns one non-negative cash amount per ticker, in input order, summing to
/// `money_to_invest`.
///
/// ```
/// use glidepath::portfolio::only_buy_rebalance;
///
/// let buys = only_buy_rebalance(&["VTI", "BND"], &[0.5, 0.5], &[70.0, 30.0], 60.0, 1000).unwrap();
/// assert_eq!(buys, vec![10.0, 50.0]);
/// ```
pub fn only_buy_rebalance<S: AsRef<str>>(
    tickers: &[S],
    target_weights: &[f64],
    asset_values: &[f64],
    money_to_invest: f64,
    max_iter: usize,
) -> Result<Vec<f64>> {
    check_amount(money_to_invest, max_iter)?;
    let mut portfolio = Portfolio::new(tickers, target_weights, asset_values)?;

    if portfolio.len() == 1 {
        return Ok(vec![money_to_invest]);
    }
    if money_to_invest == 0.0 {
        return Ok(vec![0.0; portfolio.len()]);
    }

    if money_to_invest >= portfolio.min_investment() {
        return Ok(proportional_split(&portfolio, money_to_invest));
    }

    debug!(
        "investment {money_to_invest} below {}, allocating in {max_iter} packets",
        portfolio.min_investment()
    );
    let packet = money_to_invest / max_iter as f64;
    for _ in 0..max_iter {
        if let Some(i) = portfolio.most_underweight() {
            portfolio.adjust_value(i, packet);
        }
    }
    Ok(changes(&portfolio, asset_values))
}

/// Raise `money_to_extract` (a positive amount) without buying anything.
///
/// Returns one non-positive cash amount per ticker, in input order, summing to
/// `-money_to_extract`. Extracting the whole portfolio or more sells
/// everything.
pub fn only_sell_rebalance<S: AsRef<str>>(
    tickers: &[S],
    target_weights: &[f64],
    asset_values: &[f64],
    money_to_extract: f64,
    max_iter: usize,
) -> Result<Vec<f64>> {
    check_amount(money_to_extract, max_iter)?;
    let mut portfolio = Portfolio::new(tickers, target_weights, asset_values)?;

    if money_to_extract >= portfolio.total_value() {
        return Ok(asset_values.iter().map(|v| -v).collect());
    }
    if portfolio.len() == 1 {
        return Ok(vec![-money_to_extract]);
    }
    if money_to_extract == 0.0 {
        return Ok(vec![0.0; portfolio.len()]);
    }

    if -money_to_extract <= portfolio.min_extraction() {
        return Ok(proportional_split(&portfolio, -money_to_extract));
    }

    debug!(
        "extraction {money_to_extract} above {}, allocating in {max_iter} packets",
        portfolio.min_extraction()
    );
    let packet = money_to_extract / max_iter as f64;
    for _ in 0..max_iter {
        if let Some(i) = portfolio.most_overweight() {
            portfolio.adjust_value(i, -packet);
        }
    }
    Ok(changes(&portfolio, asset_values))
}

fn check_amount(amount: f64, max_iter: usize) -> Result<()> {
    if !amount.is_finite() {
        return Err(Error::NonFinite("amount"));
    }
    if amount < 0.0 {
        return Err(Error::NegativeAmount(amount));
    }
    if max_iter == 0 {
        return Err(Error::ZeroIterations);
    }
    Ok(())
}

/// In-place rebalance first, then spread `amount` by weight.
fn proportional_split(portfolio: &Portfolio, amount: f64) -> Vec<f64> {
    let total = portfolio.total_value();
    portfolio
        .assets()
        .iter()
        .map(|a| a.target_weight() * amount + a.delta_from_ideal(total))
        .collect()
}

fn changes(portfolio: &Portfolio, original: &[f64]) -> Vec<f64> {
    portfolio
        .assets()
        .iter()
        .zip(original)
        .map(|(a, old)| a.current_value() - old)
        .collect()
}
