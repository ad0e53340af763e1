//! glidepath-rebalancer: command-line planner on top of `glidepath`.
//!
//! Reads holdings and target weights from a JSON file, optionally moves the
//! weights along a glide path, and prints the per-asset cash movements for a
//! buy-only, sell-only, single-operation or full rebalance, with an audit
//! trail.

pub mod audit;
pub mod config;
pub mod error;
pub mod holdings;
pub mod lots;
pub mod plan;
pub mod run;
