//! Mutable portfolio view and the buy-only / sell-only wrappers built on it.
//!
//! [`Portfolio`] holds assets in caller order with a cached total value. Every
//! value change goes through [`Portfolio::set_value`] or
//! [`Portfolio::adjust_value`], which update the total in O(1), so loops that
//! nudge one asset at a time never pay for a full re-summation.
//!
//! # Example
//!
//! ```
//! use glidepath::portfolio::Portfolio;
//!
//! let mut portfolio = Portfolio::new(&["VTI", "BND"], &[0.6, 0.4], &[500.0, 500.0]).unwrap();
//! assert_eq!(portfolio.total_value(), 1_000.0);
//! assert_eq!(portfolio.most_underweight(), Some(0));
//!
//! portfolio.adjust_value(0, 250.0);
//! assert_eq!(portfolio.total_value(), 1_250.0);
//! ```

pub mod asset;
pub mod single_side;

pub use asset::Asset;
pub use single_side::{only_buy_rebalance, only_sell_rebalance};

use std::fmt;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result, ensure_finite, ensure_len, ensure_weights};
use crate::rebalance;

/// Ordered assets plus a cached total value.
///
/// Built fresh for one computation from caller arrays; nothing here is meant
/// to outlive it.
#[derive(Clone, Debug)]
pub struct Portfolio {
    assets: Vec<Asset>,
    /// Ticker → position in `assets`
    index: FxHashMap<String, usize>,
    /// Always equal to the sum of `assets[..].current_value`
    total_value: f64,
}

impl Portfolio {
    /// Build a view from parallel slices.
    ///
    /// Rejects empty input, mismatched lengths, duplicate tickers, negative or
    /// non-finite weights, and non-finite values. Weights are not required to
    /// sum to 1.
    pub fn new<S: AsRef<str>>(
        tickers: &[S],
        target_weights: &[f64],
        asset_values: &[f64],
    ) -> Result<Self> {
        if tickers.is_empty() {
            return Err(Error::Empty("tickers"));
        }
        ensure_len("target weights", tickers.len(), target_weights.len())?;
        ensure_len("asset values", tickers.len(), asset_values.len())?;
        ensure_weights(target_weights)?;
        ensure_finite("asset values", asset_values)?;

        let mut index = FxHashMap::default();
        let mut assets = Vec::with_capacity(tickers.len());
        for (i, ((ticker, &weight), &value)) in tickers
            .iter()
            .zip(target_weights)
            .zip(asset_values)
            .enumerate()
        {
            let ticker = ticker.as_ref().to_string();
            if index.insert(ticker.clone(), i).is_some() {
                return Err(Error::DuplicateTicker(ticker));
            }
            assets.push(Asset::new(ticker, weight, value));
        }

        Ok(Self {
            assets,
            index,
            total_value: asset_values.iter().sum(),
        })
    }

    // === Queries ===

    #[inline]
    pub fn total_value(&self) -> f64 {
        self.total_value
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Assets in construction order.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Look up an asset by ticker.
    pub fn asset(&self, ticker: &str) -> Option<&Asset> {
        self.index_of(ticker).map(|i| &self.assets[i])
    }

    /// Position of `ticker` in construction order.
    pub fn index_of(&self, ticker: &str) -> Option<usize> {
        self.index.get(ticker).copied()
    }

    /// `target_weight * total - value` for asset `i`.
    ///
    /// # Panics
    ///
    /// If `i` is out of range.
    #[inline]
    pub fn delta_from_ideal(&self, i: usize) -> f64 {
        self.assets[i].delta_from_ideal(self.total_value)
    }

    /// Current share of the total held by asset `i`.
    ///
    /// # Panics
    ///
    /// If `i` is out of range.
    #[inline]
    pub fn current_weight(&self, i: usize) -> f64 {
        self.assets[i].current_weight(self.total_value)
    }

    /// The live rebalance vector.
    pub fn deltas(&self) -> Vec<f64> {
        self.assets
            .iter()
            .map(|a| a.delta_from_ideal(self.total_value))
            .collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.assets.iter().map(Asset::current_value).collect()
    }

    pub fn target_weights(&self) -> Vec<f64> {
        self.assets.iter().map(Asset::target_weight).collect()
    }

    /// Index of the asset with the largest delta; ties go to the first.
    pub fn most_underweight(&self) -> Option<usize> {
        self.extreme(|candidate, best| candidate > best)
    }

    /// Index of the asset with the smallest delta; ties go to the first.
    pub fn most_overweight(&self) -> Option<usize> {
        self.extreme(|candidate, best| candidate < best)
    }

    fn extreme(&self, beats: impl Fn(f64, f64) -> bool) -> Option<usize> {
        let total = self.total_value;
        rebalance::extreme_index(self.assets.iter().map(|a| a.delta_from_ideal(total)), beats)
    }

    /// Smallest deposit whose proportional split needs no sales:
    /// `max_i(-delta_i / tw_i)`.
    pub fn min_investment(&self) -> f64 {
        rebalance::threshold(self.breakevens(), f64::max)
    }

    /// Withdrawal threshold below which a proportional split needs no
    /// purchases: `min_i(-delta_i / tw_i)`. Non-positive.
    pub fn min_extraction(&self) -> f64 {
        rebalance::threshold(self.breakevens(), f64::min)
    }

    fn breakevens(&self) -> impl Iterator<Item = f64> + '_ {
        self.assets
            .iter()
            .filter_map(|a| a.breakeven_change(self.total_value))
    }

    // === Mutation ===

    /// Replace asset `i`'s value, keeping the cached total in sync.
    ///
    /// # Panics
    ///
    /// If `i` is out of range.
    pub fn set_value(&mut self, i: usize, value: f64) {
        let asset = &mut self.assets[i];
        self.total_value += value - asset.current_value();
        asset.set_current_value(value);
    }

    /// Add `change` to asset `i`'s value, keeping the cached total in sync.
    ///
    /// # Panics
    ///
    /// If `i` is out of range.
    #[inline]
    pub fn adjust_value(&mut self, i: usize, change: f64) {
        let asset = &mut self.assets[i];
        asset.set_current_value(asset.current_value() + change);
        self.total_value += change;
    }
}

impl fmt::Display for Portfolio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  {:8} {:>8} {:>8} {:>14} {:>14}",
            "Ticker", "Target", "Actual", "Value", "To ideal"
        )?;
        for asset in &self.assets {
            writeln!(
                f,
                "  {:8} {:>7.2}% {:>7.2}% {:>14.2} {:>14.2}",
                asset.ticker(),
                asset.target_weight() * 100.0,
                asset.current_weight(self.total_value) * 100.0,
                asset.current_value(),
                asset.delta_from_ideal(self.total_value),
            )?;
        }
        writeln!(f, "  total value: {:.2}", self.total_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Portfolio {
        Portfolio::new(&["VTI", "VXUS", "BND"], &[0.5, 0.3, 0.2], &[400.0, 400.0, 200.0]).unwrap()
    }

    #[test]
    fn construction_and_lookup() {
        let p = sample();
        assert_eq!(p.len(), 3);
        assert_eq!(p.total_value(), 1_000.0);
        assert_eq!(p.index_of("VXUS"), Some(1));
        assert_eq!(p.asset("BND").map(Asset::current_value), Some(200.0));
        assert!(p.asset("QQQ").is_none());
    }

    #[test]
    fn deltas_and_extremes() {
        let p = sample();
        assert_eq!(p.deltas(), vec![100.0, -100.0, 0.0]);
        assert_eq!(p.most_underweight(), Some(0));
        assert_eq!(p.most_overweight(), Some(1));
        assert_eq!(p.current_weight(1), 0.4);
    }

    #[test]
    fn ties_go_to_first_asset() {
        let p = Portfolio::new(&["A", "B"], &[0.5, 0.5], &[50.0, 50.0]).unwrap();
        assert_eq!(p.most_underweight(), Some(0));
        assert_eq!(p.most_overweight(), Some(0));
    }

    #[test]
    fn agrees_with_slice_functions() {
        use crate::rebalance::{
            min_extraction_for_full_sell_rebalance, min_investment_for_full_buy_rebalance,
            most_overweight_index, most_underweight_index,
        };

        // CASH has neither weight nor value, so it has no breakeven.
        let tw = [0.4, 0.0, 0.4, 0.2];
        let av = [10.0, 0.0, 50.0, 40.0];
        let p = Portfolio::new(&["VTI", "CASH", "VXUS", "BND"], &tw, &av).unwrap();
        let deltas = p.deltas();

        assert_eq!(p.most_underweight(), most_underweight_index(&deltas));
        assert_eq!(p.most_overweight(), most_overweight_index(&deltas));
        assert_eq!(p.min_investment(), min_investment_for_full_buy_rebalance(&tw, &av));
        assert_eq!(p.min_extraction(), min_extraction_for_full_sell_rebalance(&tw, &av));
        assert_eq!(p.min_investment(), 100.0);
        assert_eq!(p.min_extraction(), -75.0);
    }

    #[test]
    fn mutation_keeps_total_in_sync() {
        let mut p = sample();
        p.adjust_value(0, 100.0);
        p.set_value(2, 50.0);
        p.adjust_value(1, -25.5);
        let live: f64 = p.values().iter().sum();
        assert_eq!(p.total_value(), live);
        assert_eq!(p.total_value(), 500.0 + 374.5 + 50.0);
    }

    #[test]
    fn thresholds() {
        let p = Portfolio::new(&["A", "B"], &[0.5, 0.5], &[70.0, 30.0]).unwrap();
        assert_eq!(p.min_investment(), 40.0);
        assert_eq!(p.min_extraction(), -40.0);
    }

    #[test]
    fn rejects_bad_input() {
        let empty: [&str; 0] = [];
        assert_eq!(
            Portfolio::new(&empty, &[], &[]).unwrap_err(),
            Error::Empty("tickers")
        );
        assert!(matches!(
            Portfolio::new(&["A", "B"], &[0.5], &[1.0, 2.0]),
            Err(Error::LengthMismatch { .. })
        ));
        assert_eq!(
            Portfolio::new(&["A", "A"], &[0.5, 0.5], &[1.0, 2.0]).unwrap_err(),
            Error::DuplicateTicker("A".into())
        );
    }

    #[test]
    fn display_lists_every_asset() {
        let text = sample().to_string();
        assert!(text.contains("VTI"));
        assert!(text.contains("VXUS"));
        assert!(text.contains("total value: 1000.00"));
    }
}
