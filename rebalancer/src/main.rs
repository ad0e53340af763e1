//! CLI entry point for the glidepath rebalancer.

use std::path::{Path, PathBuf};
use std::process;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

use glidepath_rebalancer::config::Config;
use glidepath_rebalancer::error::Result;
use glidepath_rebalancer::plan::Mode;
use glidepath_rebalancer::run::{self, RunOptions};

#[derive(Parser)]
#[command(name = "rebalancer")]
#[command(about = "Portfolio rebalancer: buy-only, sell-only and glide-path plans")]
#[command(version)]
struct Cli {
    /// Path to config.toml
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Do not append to the audit trail
    #[arg(long)]
    no_audit: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Invest new cash without selling anything
    Buy {
        /// Path to holdings.json
        holdings: PathBuf,
        /// Cash to invest
        amount: f64,
    },

    /// Raise cash without buying anything
    Sell {
        /// Path to holdings.json
        holdings: PathBuf,
        /// Cash to raise (positive)
        amount: f64,
    },

    /// Single-operation transaction: positive buys, negative sells
    Transact {
        /// Path to holdings.json
        holdings: PathBuf,
        /// Signed cash change
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },

    /// Rebalance fully to target, buying and selling as needed
    Full {
        /// Path to holdings.json
        holdings: PathBuf,
        /// Net deposit (positive) or withdrawal (negative) made at the same time
        #[arg(allow_negative_numbers = true, default_value_t = 0.0)]
        amount: f64,
    },

    /// Show the target weights in force on a date
    Weights {
        /// Path to holdings.json
        holdings: PathBuf,
        /// Evaluation date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        on: Option<NaiveDate>,
    },

    /// Count shares held across stock splits
    Shares {
        /// Path to lots.json
        lots: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match Config::load_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    let opts = RunOptions {
        audit: !cli.no_audit,
        today: Utc::now().date_naive(),
    };

    let result = match cli.command {
        Command::Buy { holdings, amount } => plan(&config, &holdings, Mode::Buy, amount, &opts),
        Command::Sell { holdings, amount } => plan(&config, &holdings, Mode::Sell, amount, &opts),
        Command::Transact { holdings, amount } => {
            plan(&config, &holdings, Mode::Transact, amount, &opts)
        }
        Command::Full { holdings, amount } => plan(&config, &holdings, Mode::Full, amount, &opts),
        Command::Weights { holdings, on } => {
            let on = on.unwrap_or(opts.today);
            run::run_weights(&holdings, on).map(|weights| {
                println!("Target weights on {on}:");
                for (ticker, w) in weights {
                    println!("  {ticker:8} {:>7.2}%", w * 100.0);
                }
            })
        }
        Command::Shares { lots } => run::run_shares(&lots).map(|(ticker, shares)| {
            println!("{ticker}: {shares} shares");
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        if e.is_invalid_holdings() {
            process::exit(2);
        }
        process::exit(1);
    }
}

fn plan(
    config: &Config,
    holdings: &Path,
    mode: Mode,
    amount: f64,
    opts: &RunOptions,
) -> Result<()> {
    let plan = run::run_plan(config, holdings, mode, amount, opts)?;
    print!("{plan}");
    Ok(())
}
