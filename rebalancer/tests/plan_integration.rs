//! Integration tests for the file-driven rebalancer workflow.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use glidepath_rebalancer::config::Config;
use glidepath_rebalancer::error::Error;
use glidepath_rebalancer::plan::{Action, Mode};
use glidepath_rebalancer::run::{RunOptions, run_plan, run_shares, run_weights};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 8).unwrap()
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn holdings_json() -> &'static str {
    r#"{
        "as_of": "2026-02-08",
        "assets": [
            { "ticker": "VTI",  "weight": 0.50, "value": 700.0 },
            { "ticker": "VXUS", "weight": 0.30, "value": 100.0 },
            { "ticker": "BND",  "weight": 0.20, "value": 200.0 }
        ]
    }"#
}

/// Config whose audit trail lands inside `dir`.
fn config_in(dir: &Path) -> Config {
    let toml = format!(
        "[engine]\nmax_iter = 1000\n\n[logging]\ndir = {:?}\naudit_file = \"audit.jsonl\"\n",
        dir.join("logs").display().to_string()
    );
    Config::from_toml(&toml).unwrap()
}

fn opts(audit: bool) -> RunOptions {
    RunOptions {
        audit,
        today: today(),
    }
}

// ============================================================================
// Plans
// ============================================================================

#[test]
fn buy_plan_never_sells() {
    let dir = tempfile::tempdir().unwrap();
    let holdings = write(dir.path(), "holdings.json", holdings_json());

    let plan = run_plan(&config_in(dir.path()), &holdings, Mode::Buy, 150.0, &opts(false)).unwrap();
    assert!(plan.lines.iter().all(|l| l.action != Action::Sell));
    assert!((plan.net_change() - 150.0).abs() < 1e-9);
    // VXUS is 200 short of target and takes the whole deposit.
    assert!((plan.lines[1].delta - 150.0).abs() < 1e-9);
}

#[test]
fn sell_plan_never_buys() {
    let dir = tempfile::tempdir().unwrap();
    let holdings = write(dir.path(), "holdings.json", holdings_json());

    let plan = run_plan(&config_in(dir.path()), &holdings, Mode::Sell, 100.0, &opts(false)).unwrap();
    assert!(plan.lines.iter().all(|l| l.action != Action::Buy));
    assert!((plan.net_change() + 100.0).abs() < 1e-9);
    assert_eq!(plan.lines[0].action, Action::Sell);
}

#[test]
fn full_plan_hits_targets() {
    let dir = tempfile::tempdir().unwrap();
    let holdings = write(dir.path(), "holdings.json", holdings_json());

    let plan = run_plan(&config_in(dir.path()), &holdings, Mode::Full, 0.0, &opts(false)).unwrap();
    let after: Vec<f64> = plan.lines.iter().map(|l| l.value_after()).collect();
    assert_eq!(after, vec![500.0, 300.0, 200.0]);
    assert_eq!(plan.lines[2].action, Action::Hold);
}

#[test]
fn glide_path_moves_targets() {
    let dir = tempfile::tempdir().unwrap();
    let holdings = write(
        dir.path(),
        "holdings.json",
        r#"{
            "assets": [
                { "ticker": "VTI", "weight": 1.0, "value": 500.0, "final_weight": 0.0 },
                { "ticker": "BND", "weight": 0.0, "value": 500.0, "final_weight": 1.0 }
            ],
            "glide_path": { "start_date": "2026-01-01", "end_date": "2026-01-05" }
        }"#,
    );

    let weights = run_weights(&holdings, NaiveDate::from_ymd_opt(2026, 1, 2).unwrap()).unwrap();
    assert_eq!(weights, vec![("VTI".to_string(), 0.75), ("BND".to_string(), 0.25)]);

    // Past the end date the plan targets the final weights.
    let plan = run_plan(&config_in(dir.path()), &holdings, Mode::Full, 0.0, &opts(false)).unwrap();
    assert_eq!(plan.lines[0].delta, -500.0);
    assert_eq!(plan.lines[1].delta, 500.0);
}

// ============================================================================
// Audit trail
// ============================================================================

#[test]
fn audit_trail_records_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let holdings = write(dir.path(), "holdings.json", holdings_json());
    let config = config_in(dir.path());

    run_plan(&config, &holdings, Mode::Transact, -50.0, &opts(true)).unwrap();

    let contents = std::fs::read_to_string(config.audit_path()).unwrap();
    let events: Vec<String> = contents
        .lines()
        .map(|line| {
            let v: serde_json::Value = serde_json::from_str(line).unwrap();
            v["event"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(
        events,
        vec!["run_started", "holdings_loaded", "plan_computed", "run_completed"]
    );
}

#[test]
fn no_audit_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let holdings = write(dir.path(), "holdings.json", holdings_json());
    let config = config_in(dir.path());

    run_plan(&config, &holdings, Mode::Buy, 10.0, &opts(false)).unwrap();
    assert!(!config.audit_path().exists());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn invalid_holdings_are_flagged() {
    let dir = tempfile::tempdir().unwrap();
    let holdings = write(
        dir.path(),
        "holdings.json",
        r#"{"assets":[{"ticker":"VTI","weight":0.7,"value":1.0}]}"#,
    );
    let err = run_plan(&config_in(dir.path()), &holdings, Mode::Buy, 1.0, &opts(false)).unwrap_err();
    assert!(err.is_invalid_holdings());
}

#[test]
fn missing_holdings_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_plan(
        &config_in(dir.path()),
        &dir.path().join("nope.json"),
        Mode::Buy,
        1.0,
        &opts(false),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InputRead { .. }));
    assert!(!err.is_invalid_holdings());
}

// ============================================================================
// Shares
// ============================================================================

#[test]
fn shares_from_lots_file() {
    let dir = tempfile::tempdir().unwrap();
    let lots = write(
        dir.path(),
        "lots.json",
        r#"{
            "ticker": "AAPL",
            "transactions": [
                { "date": "2000-12-12", "quantity": 10 },
                { "date": "2002-01-01", "quantity": -5 }
            ],
            "splits": [
                { "date": "2000-12-12", "ratio": 2 },
                { "date": "2000-12-13", "ratio": 3 },
                { "date": "2000-12-14", "ratio": 2 },
                { "date": "2005-12-15", "ratio": 4 }
            ]
        }"#,
    );
    assert_eq!(run_shares(&lots).unwrap(), ("AAPL".to_string(), 220.0));
}
