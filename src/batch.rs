//! Parallel evaluation of independent single-operation transactions.

use rayon::prelude::*;

use crate::engine::{Algorithm, transact};
use crate::error::Result;

/// One portfolio and the cash change to apply to it.
///
/// The portfolio value is taken as the sum of `asset_values`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransactionRequest {
    pub target_weights: Vec<f64>,
    pub asset_values: Vec<f64>,
    pub target_change: f64,
}

impl TransactionRequest {
    pub fn new(target_weights: Vec<f64>, asset_values: Vec<f64>, target_change: f64) -> Self {
        Self {
            target_weights,
            asset_values,
            target_change,
        }
    }

    /// Run this request on the current thread.
    pub fn run(&self, algorithm: Algorithm, max_iter: usize) -> Result<Vec<f64>> {
        let portfolio_value = self.asset_values.iter().sum();
        transact(
            algorithm,
            &self.target_weights,
            &self.asset_values,
            portfolio_value,
            self.target_change,
            max_iter,
        )
    }
}

/// Evaluate every request in parallel.
///
/// Results come back in request order. Each request runs sequentially on one
/// worker; a failing request does not affect the others.
///
/// # Example
///
/// ```
/// use glidepath::{Algorithm, batch::{transact_many, TransactionRequest}};
///
/// let requests = vec![
///     TransactionRequest::new(vec![0.5, 0.5], vec![70.0, 30.0], 20.0),
///     TransactionRequest::new(vec![0.5, 0.5], vec![70.0, 30.0], -20.0),
/// ];
/// let results = transact_many(&requests, Algorithm::Fast, 1000);
/// assert_eq!(results.len(), 2);
/// ```
pub fn transact_many(
    requests: &[TransactionRequest],
    algorithm: Algorithm,
    max_iter: usize,
) -> Vec<Result<Vec<f64>>> {
    requests
        .par_iter()
        .map(|request| request.run(algorithm, max_iter))
        .collect()
}
