//! # glidepath
//!
//! Portfolio rebalancing arithmetic for accounts where selling has a cost.
//!
//! ## Features
//!
//! - **Full rebalance**: closed-form per-asset deltas to hit target weights
//! - **Single-operation transactions**: split a deposit without selling, or a
//!   withdrawal without buying, converging on the target allocation
//! - **Buy-only / sell-only wrappers** over a ticker-keyed portfolio view
//! - **Glide paths**: target weights interpolated linearly between two dates
//! - **Share counts** across stock splits
//!
//! ## Quick Start
//!
//! ```
//! use glidepath::rebalance;
//!
//! // 60/40 target, currently 50/50 on a 1000 portfolio.
//! let deltas = rebalance(&[0.6, 0.4], &[500.0, 500.0], 1_000.0);
//! assert_eq!(deltas, vec![100.0, -100.0]);
//! ```
//!
//! ## Depositing Without Selling
//!
//! ```
//! use glidepath::{fast_single_operation_transaction, DEFAULT_MAX_ITER};
//!
//! let deltas =
//!     fast_single_operation_transaction(&[0.6, 0.4], &[500.0, 500.0], 1_000.0, 50.0, DEFAULT_MAX_ITER)
//!         .unwrap();
//!
//! // Too small to reach the target, so it all goes to the underweight asset.
//! assert!((deltas[0] - 50.0).abs() < 1e-9);
//! assert!(deltas[1].abs() < 1e-9);
//! ```
//!
//! ## Withdrawing Without Buying
//!
//! ```
//! use glidepath::only_sell_rebalance;
//!
//! let sells = only_sell_rebalance(&["VTI", "BND"], &[0.5, 0.5], &[70.0, 30.0], 60.0, 1000).unwrap();
//! assert_eq!(sells, vec![-50.0, -10.0]);
//! ```
//!
//! ## Glide Paths
//!
//! ```
//! use chrono::NaiveDate;
//! use glidepath::target_weights_on;
//!
//! let start = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2030, 1, 5).unwrap();
//! let today = NaiveDate::from_ymd_opt(2030, 1, 2).unwrap();
//!
//! let w = target_weights_on(&[1.0, 0.0], &[0.0, 1.0], start, end, today).unwrap();
//! assert_eq!(w, vec![0.75, 0.25]);
//! ```

#[cfg(feature = "parallel")]
pub mod batch;
pub mod engine;
mod error;
pub mod glide;
pub mod portfolio;
mod rebalance;
pub mod shares;

// Re-export public API
pub use engine::{
    Algorithm, DEFAULT_MAX_ITER, fast_single_operation_transaction, single_operation_transaction,
    transact,
};
pub use error::{Error, Result};
pub use glide::{target_weights, target_weights_on};
pub use portfolio::{Asset, Portfolio, only_buy_rebalance, only_sell_rebalance};
pub use rebalance::{
    full_rebalance_now, min_extraction_for_full_sell_rebalance,
    min_investment_for_full_buy_rebalance, most_overweight_index, most_underweight_index,
    rebalance,
};
pub use shares::share_count;
