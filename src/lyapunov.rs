//! Doubling algorithm for the discrete Lyapunov equation `V = A V A' + B`.
//!
//! Iterates `gamma_{k+1} = gamma_k + a_k gamma_k a_k'` with `a_{k+1} = a_k^2`,
//! which after `k` steps sums the first `2^k` terms of `sum_j A^j B A'^j`.

use ndarray::Array2;
use tracing::{debug, warn};

use crate::error::{DpError, DpResult};

#[derive(Clone, Debug)]
pub struct DoublingConfig {
    /// Max absolute change between successive iterates.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for DoublingConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-15,
            max_iterations: 100,
        }
    }
}

pub fn solve_discrete_lyapunov(
    a: &Array2<f64>,
    b: &Array2<f64>,
    config: &DoublingConfig,
) -> DpResult<Array2<f64>> {
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(DpError::shape(rows, cols, "A must be square"));
    }
    if b.dim() != (rows, cols) {
        let (b_rows, b_cols) = b.dim();
        return Err(DpError::shape(b_rows, b_cols, "B must match the shape of A"));
    }
    if !(config.tolerance > 0.0) {
        return Err(DpError::parameter(
            "tolerance",
            config.tolerance,
            "must be positive",
        ));
    }
    if config.max_iterations == 0 {
        return Err(DpError::parameter(
            "max_iterations",
            0.0,
            "must be at least 1",
        ));
    }

    let mut alpha = a.clone();
    let mut gamma = b.clone();
    let mut diff = f64::INFINITY;
    let mut iterations = 0;

    for iteration in 1..=config.max_iterations {
        iterations = iteration;
        let next_gamma = &gamma + &alpha.dot(&gamma).dot(&alpha.t());
        alpha = alpha.dot(&alpha);

        diff = next_gamma
            .iter()
            .zip(gamma.iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max);
        gamma = next_gamma;
        debug!(iteration, diff, "doubling step");

        if !diff.is_finite() || gamma.iter().any(|x| !x.is_finite()) {
            break;
        }
        if diff < config.tolerance {
            return Ok(gamma);
        }
    }

    warn!(iterations, diff, "doubling algorithm did not converge");
    Err(DpError::NonConvergence {
        iterations,
        metric: diff,
    })
}
