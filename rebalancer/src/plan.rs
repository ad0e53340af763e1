//! HOLDINGS→PLAN: per-asset cash movements for one rebalance request.
//!
//! The arithmetic lives in `glidepath`; this module picks the operation,
//! feeds it the holdings and effective weights, and labels the result.

use std::fmt;

use chrono::NaiveDate;
use glidepath::Algorithm;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::holdings::Holdings;

/// Deltas smaller than half a cent are shown as holds.
const HOLD_EPSILON: f64 = 0.005;

/// Which rebalance operation to plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Invest new cash without selling.
    Buy,
    /// Raise cash without buying.
    Sell,
    /// Signed single-operation transaction.
    Transact,
    /// Unconstrained rebalance, buying and selling as needed.
    Full,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Buy => write!(f, "buy-only"),
            Mode::Sell => write!(f, "sell-only"),
            Mode::Transact => write!(f, "single-operation"),
            Mode::Full => write!(f, "full rebalance"),
        }
    }
}

/// Trade direction for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    fn of(delta: f64) -> Self {
        if delta >= HOLD_EPSILON {
            Action::Buy
        } else if delta <= -HOLD_EPSILON {
            Action::Sell
        } else {
            Action::Hold
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::Hold => write!(f, "HOLD"),
        }
    }
}

/// One asset's line in the plan.
#[derive(Debug, Clone, Serialize)]
pub struct PlanLine {
    pub ticker: String,
    pub action: Action,
    pub target_weight: f64,
    pub current_value: f64,
    pub delta: f64,
}

impl PlanLine {
    pub fn value_after(&self) -> f64 {
        self.current_value + self.delta
    }
}

/// A computed rebalance plan.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub mode: Mode,
    /// Requested amount as passed on the command line.
    pub amount: f64,
    /// Date the target weights were evaluated for.
    pub weights_date: NaiveDate,
    /// Variant used; only `transact` depends on it.
    pub algorithm: Algorithm,
    pub max_iter: usize,
    pub lines: Vec<PlanLine>,
}

impl Plan {
    /// Sum of all deltas: positive when cash goes in.
    pub fn net_change(&self) -> f64 {
        self.lines.iter().map(|l| l.delta).sum()
    }

    pub fn total_before(&self) -> f64 {
        self.lines.iter().map(|l| l.current_value).sum()
    }

    pub fn total_after(&self) -> f64 {
        self.lines.iter().map(PlanLine::value_after).sum()
    }

    /// Lines that actually trade.
    pub fn trades(&self) -> impl Iterator<Item = &PlanLine> {
        self.lines.iter().filter(|l| l.action != Action::Hold)
    }
}

/// Compute the plan for `mode` and `amount` against `holdings`, with target
/// weights evaluated on `today`.
///
/// `amount` is a magnitude for [`Mode::Buy`] and [`Mode::Sell`] and a signed
/// change for [`Mode::Transact`] and [`Mode::Full`].
pub fn compute_plan(
    holdings: &Holdings,
    mode: Mode,
    amount: f64,
    today: NaiveDate,
    engine: &EngineConfig,
) -> Result<Plan> {
    let tickers = holdings.tickers();
    let values = holdings.values();
    let weights = holdings.effective_weights(today)?;
    let max_iter = engine.max_iter;

    let deltas = match mode {
        Mode::Buy => glidepath::only_buy_rebalance(&tickers, &weights, &values, amount, max_iter)?,
        Mode::Sell => {
            glidepath::only_sell_rebalance(&tickers, &weights, &values, amount, max_iter)?
        }
        Mode::Transact => glidepath::transact(
            engine.algorithm,
            &weights,
            &values,
            holdings.total_value(),
            amount,
            max_iter,
        )?,
        Mode::Full => glidepath::full_rebalance_now(&weights, &values, amount)?,
    };

    let lines = holdings
        .assets
        .iter()
        .zip(&weights)
        .zip(deltas)
        .map(|((asset, &target_weight), delta)| PlanLine {
            ticker: asset.ticker.clone(),
            action: Action::of(delta),
            target_weight,
            current_value: asset.value,
            delta,
        })
        .collect();

    Ok(Plan {
        mode,
        amount,
        weights_date: today,
        algorithm: engine.algorithm,
        max_iter,
        lines,
    })
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "\n{} PLAN (weights as of {}):",
            self.mode.to_string().to_uppercase(),
            self.weights_date
        )?;
        writeln!(
            f,
            "  {:6} {:8} {:>8} {:>14} {:>14} {:>14}",
            "Action", "Ticker", "Target", "Current", "Change", "After"
        )?;
        for line in &self.lines {
            writeln!(
                f,
                "  {:6} {:8} {:>7.2}% {:>14.2} {:>+14.2} {:>14.2}",
                line.action.to_string(),
                line.ticker,
                line.target_weight * 100.0,
                line.current_value,
                line.delta,
                line.value_after(),
            )?;
        }
        writeln!(
            f,
            "\n  Net change: {:+.2}   Total: {:.2} -> {:.2}",
            self.net_change(),
            self.total_before(),
            self.total_after()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn holdings() -> Holdings {
        Holdings::from_json(
            r#"{"assets":[
                {"ticker":"VTI","weight":0.5,"value":70.0},
                {"ticker":"BND","weight":0.5,"value":30.0}
            ]}"#,
        )
        .unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 8).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn buy_small_deposit() {
        let plan = compute_plan(&holdings(), Mode::Buy, 20.0, today(), &EngineConfig::default())
            .unwrap();
        assert_eq!(plan.lines[0].action, Action::Hold);
        assert_eq!(plan.lines[1].action, Action::Buy);
        assert!(close(plan.lines[1].delta, 20.0));
        assert!(close(plan.net_change(), 20.0));
        assert_eq!(plan.trades().count(), 1);
    }

    #[test]
    fn sell_large_withdrawal() {
        let plan = compute_plan(&holdings(), Mode::Sell, 60.0, today(), &EngineConfig::default())
            .unwrap();
        assert_eq!(plan.lines[0].delta, -50.0);
        assert_eq!(plan.lines[1].delta, -10.0);
        assert!(plan.lines.iter().all(|l| l.action == Action::Sell));
        assert!(close(plan.total_after(), 40.0));
    }

    #[test]
    fn transact_accepts_signed_change() {
        let engine = EngineConfig {
            max_iter: 1000,
            algorithm: Algorithm::Iterative,
        };
        let plan = compute_plan(&holdings(), Mode::Transact, -20.0, today(), &engine).unwrap();
        assert!(close(plan.lines[0].delta, -20.0));
        assert_eq!(plan.lines[1].action, Action::Hold);
        assert_eq!(plan.algorithm, Algorithm::Iterative);
    }

    #[test]
    fn full_rebalance_trades_both_ways() {
        let plan = compute_plan(&holdings(), Mode::Full, 0.0, today(), &EngineConfig::default())
            .unwrap();
        assert_eq!(plan.lines[0].action, Action::Sell);
        assert_eq!(plan.lines[1].action, Action::Buy);
        assert_eq!(plan.lines[0].delta, -20.0);
    }

    #[test]
    fn negative_buy_is_rejected() {
        let err = compute_plan(&holdings(), Mode::Buy, -5.0, today(), &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::Core(glidepath::Error::NegativeAmount(_))));
    }

    #[test]
    fn display_lists_actions() {
        let plan = compute_plan(&holdings(), Mode::Full, 0.0, today(), &EngineConfig::default())
            .unwrap();
        let text = plan.to_string();
        assert!(text.contains("FULL REBALANCE PLAN"));
        assert!(text.contains("SELL"));
        assert!(text.contains("BUY"));
        assert!(text.contains("-20.00"));
    }
}
