//! JSONL audit trail logging.
//!
//! Each rebalancer run appends events to an audit.jsonl file, one JSON object
//! per line.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::holdings::Holdings;
use crate::plan::Plan;

/// An audit event written to the JSONL trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event: &'static str,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// Append-only audit logger.
pub struct AuditLog {
    writer: BufWriter<std::fs::File>,
}

impl AuditLog {
    /// Open (or create) the audit log file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Log an event with arbitrary JSON data.
    pub fn log(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let entry = AuditEvent {
            event,
            ts: Utc::now(),
            data,
        };
        let json = serde_json::to_string(&entry)?;
        writeln!(self.writer, "{json}")?;
        self.writer.flush()?;
        Ok(())
    }
}

pub fn log_run_started(audit: &mut AuditLog, command: &str, input_file: &str) -> Result<()> {
    audit.log(
        "run_started",
        serde_json::json!({
            "command": command,
            "input_file": input_file,
        }),
    )
}

pub fn log_holdings(audit: &mut AuditLog, holdings: &Holdings) -> Result<()> {
    let assets: Vec<_> = holdings
        .assets
        .iter()
        .map(|a| {
            serde_json::json!({
                "ticker": a.ticker,
                "weight": a.weight,
                "value": a.value,
            })
        })
        .collect();

    audit.log(
        "holdings_loaded",
        serde_json::json!({
            "as_of": holdings.as_of,
            "assets": assets,
            "total_value": holdings.total_value(),
            "glide_path": holdings.glide_path.is_some(),
        }),
    )
}

pub fn log_plan(audit: &mut AuditLog, plan: &Plan) -> Result<()> {
    audit.log("plan_computed", serde_json::to_value(plan)?)
}

pub fn log_run_completed(audit: &mut AuditLog, trades: usize, net_change: f64) -> Result<()> {
    audit.log(
        "run_completed",
        serde_json::json!({
            "trades": trades,
            "net_change": net_change,
        }),
    )
}
