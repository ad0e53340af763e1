//! Transaction history (lots.json) for share counting across splits.

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Buys, sales and stock splits of a single ticker.
#[derive(Debug, Clone, Deserialize)]
pub struct Lots {
    pub ticker: String,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub splits: Vec<Split>,
}

/// Signed share quantity: positive bought, negative sold.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub quantity: f64,
}

/// `ratio` new shares per old share (2.0 for a 2:1 split, 0.1 for 1:10 reverse).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Split {
    pub date: NaiveDate,
    pub ratio: f64,
}

impl Lots {
    /// Load and validate a lots file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::InputRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Parse from a JSON string. Entries are put in date order; entries on
    /// the same date keep their file order.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut lots: Lots = serde_json::from_str(json)?;
        lots.validate()?;
        lots.transactions.sort_by_key(|t| t.date);
        lots.splits.sort_by_key(|s| s.date);
        Ok(lots)
    }

    fn validate(&self) -> Result<()> {
        if self.ticker.is_empty() {
            return Err(Error::Lots("empty ticker".into()));
        }
        if let Some(t) = self.transactions.iter().find(|t| !t.quantity.is_finite()) {
            return Err(Error::Lots(format!("non-finite quantity on {}", t.date)));
        }
        if let Some(s) = self
            .splits
            .iter()
            .find(|s| !s.ratio.is_finite() || s.ratio <= 0.0)
        {
            return Err(Error::Lots(format!(
                "split ratio on {} ({}) must be finite and > 0",
                s.date, s.ratio
            )));
        }
        Ok(())
    }

    /// Net shares held after every transaction and split.
    pub fn share_count(&self) -> Result<f64> {
        let dates: Vec<NaiveDate> = self.transactions.iter().map(|t| t.date).collect();
        let quantities: Vec<f64> = self.transactions.iter().map(|t| t.quantity).collect();
        let split_dates: Vec<NaiveDate> = self.splits.iter().map(|s| s.date).collect();
        let ratios: Vec<f64> = self.splits.iter().map(|s| s.ratio).collect();
        Ok(glidepath::share_count(
            &dates,
            &quantities,
            &split_dates,
            &ratios,
        )?)
    }
}
