//! Holdings file (holdings.json) loading and validation.

use std::path::Path;

use chrono::NaiveDate;
use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Weights must sum to 1 within this tolerance.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Current holdings and their target allocation.
#[derive(Debug, Clone, Deserialize)]
pub struct Holdings {
    /// Date the values were observed. Informational.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    pub assets: Vec<HoldingEntry>,
    /// When present, `weight` is the allocation on `start_date` and
    /// `final_weight` the allocation on `end_date`.
    #[serde(default)]
    pub glide_path: Option<GlidePath>,
}

/// One asset: ticker, target weight, current value.
#[derive(Debug, Clone, Deserialize)]
pub struct HoldingEntry {
    pub ticker: String,
    pub weight: f64,
    pub value: f64,
    #[serde(default)]
    pub final_weight: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GlidePath {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Holdings {
    /// Load and validate a holdings file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::InputRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Parse from a JSON string (useful for testing).
    pub fn from_json(json: &str) -> Result<Self> {
        let holdings: Holdings = serde_json::from_str(json)?;
        holdings.validate()?;
        Ok(holdings)
    }

    /// Validate the holdings.
    fn validate(&self) -> Result<()> {
        if self.assets.is_empty() {
            return Err(Error::Holdings("assets list is empty".into()));
        }

        let mut seen = FxHashSet::default();
        for a in &self.assets {
            if a.ticker.is_empty() {
                return Err(Error::Holdings("empty ticker".into()));
            }
            if !seen.insert(a.ticker.as_str()) {
                return Err(Error::Holdings(format!("duplicate ticker: {}", a.ticker)));
            }
            check_weight(&a.ticker, "weight", a.weight)?;
            if !a.value.is_finite() || a.value < 0.0 {
                return Err(Error::Holdings(format!(
                    "value for {} ({}) must be finite and >= 0",
                    a.ticker, a.value
                )));
            }
        }
        check_sum("weights", self.assets.iter().map(|a| a.weight))?;

        if let Some(glide) = &self.glide_path {
            if glide.end_date < glide.start_date {
                return Err(Error::Holdings(format!(
                    "glide path ends ({}) before it starts ({})",
                    glide.end_date, glide.start_date
                )));
            }
            let mut finals = Vec::with_capacity(self.assets.len());
            for a in &self.assets {
                let w = a.final_weight.ok_or_else(|| {
                    Error::Holdings(format!("{} has no final_weight for the glide path", a.ticker))
                })?;
                check_weight(&a.ticker, "final_weight", w)?;
                finals.push(w);
            }
            check_sum("final weights", finals.into_iter())?;
        }

        Ok(())
    }

    pub fn tickers(&self) -> Vec<&str> {
        self.assets.iter().map(|a| a.ticker.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.assets.iter().map(|a| a.value).collect()
    }

    pub fn total_value(&self) -> f64 {
        self.assets.iter().map(|a| a.value).sum()
    }

    /// Target weights in force on `today`: interpolated along the glide path
    /// when one is configured, the plain weights otherwise.
    pub fn effective_weights(&self, today: NaiveDate) -> Result<Vec<f64>> {
        let start: Vec<f64> = self.assets.iter().map(|a| a.weight).collect();
        let Some(glide) = self.glide_path else {
            return Ok(start);
        };
        let finals: Vec<f64> = self
            .assets
            .iter()
            .map(|a| a.final_weight.unwrap_or(a.weight))
            .collect();
        let weights = glidepath::target_weights_on(
            &start,
            &finals,
            glide.start_date,
            glide.end_date,
            today,
        )?;
        // Before the start date the line is extrapolated and can leave [0, 1].
        for (asset, &w) in self.assets.iter().zip(&weights) {
            if !(0.0..=1.0).contains(&w) {
                return Err(Error::Holdings(format!(
                    "glide path gives {} a weight of {w:.4} on {today}, outside [0, 1]",
                    asset.ticker
                )));
            }
        }
        Ok(weights)
    }
}

fn check_weight(ticker: &str, field: &str, w: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&w) {
        return Err(Error::Holdings(format!(
            "{field} for {ticker} ({w}) must be in [0, 1]"
        )));
    }
    Ok(())
}

fn check_sum(what: &str, weights: impl Iterator<Item = f64>) -> Result<()> {
    let sum: f64 = weights.sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(Error::Holdings(format!("{what} sum to {sum:.6}, expected 1")));
    }
    Ok(())
}
