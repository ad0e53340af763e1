//! A single holding inside a [`Portfolio`](super::Portfolio).

use crate::rebalance;

/// One asset: ticker, target weight, and current value.
///
/// The value is only changed through the owning portfolio so that the cached
/// portfolio total never drifts from the sum of asset values.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Asset {
    ticker: String,
    target_weight: f64,
    current_value: f64,
}

impl Asset {
    pub(super) fn new(ticker: String, target_weight: f64, current_value: f64) -> Self {
        Self {
            ticker,
            target_weight,
            current_value,
        }
    }

    #[inline]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    #[inline]
    pub fn target_weight(&self) -> f64 {
        self.target_weight
    }

    #[inline]
    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    pub(super) fn set_current_value(&mut self, value: f64) {
        self.current_value = value;
    }

    /// `target_weight * total - current_value`; positive means underweight.
    #[inline]
    pub fn delta_from_ideal(&self, total_value: f64) -> f64 {
        self.target_weight * total_value - self.current_value
    }

    /// Share of `total_value` this asset currently holds (0 for an empty portfolio).
    #[inline]
    pub fn current_weight(&self, total_value: f64) -> f64 {
        if total_value == 0.0 {
            0.0
        } else {
            self.current_value / total_value
        }
    }

    /// Change in total portfolio value after which the current value is
    /// exactly on target: `-delta / target_weight`.
    ///
    /// `None` when the asset has neither weight nor value (on target at any total).
    pub fn breakeven_change(&self, total_value: f64) -> Option<f64> {
        rebalance::breakeven_change(self.target_weight, self.current_value, total_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_and_weight() {
        let a = Asset::new("VTI".into(), 0.6, 500.0);
        assert_eq!(a.delta_from_ideal(1_000.0), 100.0);
        assert_eq!(a.current_weight(1_000.0), 0.5);
        assert_eq!(a.current_weight(0.0), 0.0);
    }

    #[test]
    fn breakeven() {
        let a = Asset::new("VTI".into(), 0.5, 70.0);
        assert_eq!(a.breakeven_change(100.0), Some(40.0));

        let idle = Asset::new("CASH".into(), 0.0, 0.0);
        assert_eq!(idle.breakeven_change(100.0), None);

        let stranded = Asset::new("OLD".into(), 0.0, 10.0);
        assert_eq!(stranded.breakeven_change(100.0), Some(f64::INFINITY));
    }
}
