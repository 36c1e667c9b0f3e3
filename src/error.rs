//! Error taxonomy shared by every solver and simulator in the crate.

use thiserror::Error;

pub type DpResult<T> = Result<T, DpError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DpError {
    #[error("invalid grid [{min}, {max}] with step {step}: {reason}")]
    InvalidGrid {
        min: f64,
        max: f64,
        step: f64,
        reason: &'static str,
    },

    #[error("invalid shape {rows}x{cols}: {reason}")]
    InvalidShape {
        rows: usize,
        cols: usize,
        reason: &'static str,
    },

    #[error("invalid probabilities in row {row}: {reason} (value {value})")]
    InvalidProbabilities {
        row: usize,
        value: f64,
        reason: &'static str,
    },

    #[error("no convergence after {iterations} iterations (last metric {metric:e})")]
    NonConvergence { iterations: usize, metric: f64 },

    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl DpError {
    pub(crate) fn parameter(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter { name, value, reason }
    }

    pub(crate) fn shape(rows: usize, cols: usize, reason: &'static str) -> Self {
        Self::InvalidShape { rows, cols, reason }
    }
}
