//! Run orchestrator: load → plan → audit.
//!
//! Ties together holdings, the planner and the audit trail. Printing is left
//! to the caller.

use std::path::Path;

use chrono::NaiveDate;
use log::{debug, info};

use crate::audit::{self, AuditLog};
use crate::config::Config;
use crate::error::Result;
use crate::holdings::Holdings;
use crate::lots::Lots;
use crate::plan::{self, Mode, Plan};

/// Options shared by every command.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Append events to the audit trail.
    pub audit: bool,
    /// Date the target weights are evaluated for.
    pub today: NaiveDate,
}

fn open_audit(config: &Config, opts: &RunOptions) -> Result<Option<AuditLog>> {
    if !opts.audit {
        return Ok(None);
    }
    let path = config.audit_path();
    debug!("audit trail: {}", path.display());
    AuditLog::open(&path).map(Some)
}

/// Plan a rebalance for the holdings file at `holdings_path`.
pub fn run_plan(
    config: &Config,
    holdings_path: &Path,
    mode: Mode,
    amount: f64,
    opts: &RunOptions,
) -> Result<Plan> {
    let mut audit = open_audit(config, opts)?;
    let input = holdings_path.display().to_string();
    if let Some(log) = audit.as_mut() {
        audit::log_run_started(log, &mode.to_string(), &input)?;
    }

    let holdings = Holdings::load(holdings_path)?;
    info!(
        "loaded {} assets worth {:.2} from {input}",
        holdings.assets.len(),
        holdings.total_value()
    );
    if let Some(log) = audit.as_mut() {
        audit::log_holdings(log, &holdings)?;
    }

    let plan = plan::compute_plan(&holdings, mode, amount, opts.today, &config.engine)?;
    info!(
        "{mode} plan: {} trades, net change {:.2}",
        plan.trades().count(),
        plan.net_change()
    );
    if let Some(log) = audit.as_mut() {
        audit::log_plan(log, &plan)?;
        audit::log_run_completed(log, plan.trades().count(), plan.net_change())?;
    }

    Ok(plan)
}

/// Effective target weights per ticker on `on`.
pub fn run_weights(holdings_path: &Path, on: NaiveDate) -> Result<Vec<(String, f64)>> {
    let holdings = Holdings::load(holdings_path)?;
    let weights = holdings.effective_weights(on)?;
    Ok(holdings
        .assets
        .iter()
        .map(|a| a.ticker.clone())
        .zip(weights)
        .collect())
}

/// Net share count for the lots file at `lots_path`.
pub fn run_shares(lots_path: &Path) -> Result<(String, f64)> {
    let lots = Lots::load(lots_path)?;
    debug!(
        "{}: {} transactions, {} splits",
        lots.ticker,
        lots.transactions.len(),
        lots.splits.len()
    );
    let shares = lots.share_count()?;
    Ok((lots.ticker, shares))
}
