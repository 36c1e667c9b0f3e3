//! Finite-State Markov Chain Simulation
//!
//! Draws paths through a user-supplied discrete Markov chain by inverse-CDF
//! sampling against the current state's row of the transition matrix.
//!
//! ## Conventions
//! - `transition[[i, j]] = P(state_{t+1} = j | state_t = i)`
//! - A simulated path of horizon `n` holds the `n` states reached after each
//!   of `n` transitions. The initial state is not part of the output.
//! - Randomness comes only from the caller's RNG, so a seeded RNG gives a
//!   reproducible path.

use ndarray::{Array1, Array2};
use rand::Rng;
use tracing::debug;

use crate::error::{DpError, DpResult};
use crate::stationary::{iterate_to_fixed_point, StationaryConfig};

/// Allowed deviation of a row sum from 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-10;

/// Checks that `transition` is a square, row-stochastic matrix over at least
/// two states. Shape problems are reported before probability problems.
pub fn validate_transition_matrix(transition: &Array2<f64>) -> DpResult<()> {
    let (rows, cols) = transition.dim();
    if rows != cols {
        return Err(DpError::shape(rows, cols, "transition matrix must be square"));
    }
    if rows < 2 {
        return Err(DpError::shape(
            rows,
            cols,
            "transition matrix must have at least two states",
        ));
    }

    for (i, row) in transition.outer_iter().enumerate() {
        if let Some(&bad) = row.iter().find(|p| !p.is_finite()) {
            return Err(DpError::InvalidProbabilities {
                row: i,
                value: bad,
                reason: "entries must be finite numbers",
            });
        }
        if let Some(&bad) = row.iter().find(|&&p| p < 0.0) {
            return Err(DpError::InvalidProbabilities {
                row: i,
                value: bad,
                reason: "entries must be non-negative",
            });
        }
        let sum = row.sum();
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(DpError::InvalidProbabilities {
                row: i,
                value: sum,
                reason: "row must sum to 1",
            });
        }
    }

    Ok(())
}

/// A validated transition matrix with its row-wise cumulative probabilities.
#[derive(Debug, Clone)]
pub struct MarkovChain {
    transition: Array2<f64>,
    cumulative: Array2<f64>,
    // Highest index with positive probability per row, used when a draw lands
    // above a cumulative row that rounds to slightly less than 1.
    last_reachable: Vec<usize>,
}

/// Output of [`MarkovChain::simulate`].
#[derive(Debug, Clone)]
pub struct MarkovPath {
    /// Mapped value of the state after each transition.
    pub values: Vec<f64>,
    /// One-hot state indicators, one row per period (`horizon x n_states`).
    pub states: Array2<f64>,
    /// Index of the state after each transition.
    pub indices: Vec<usize>,
}

impl MarkovChain {
    pub fn new(transition: Array2<f64>) -> DpResult<Self> {
        validate_transition_matrix(&transition)?;

        let n = transition.nrows();
        let upper = Array2::from_shape_fn((n, n), |(i, j)| if i <= j { 1.0 } else { 0.0 });
        let cumulative = transition.dot(&upper);

        let last_reachable = transition
            .outer_iter()
            .map(|row| row.iter().rposition(|&p| p > 0.0).unwrap_or(n - 1))
            .collect();

        Ok(Self {
            transition,
            cumulative,
            last_reachable,
        })
    }

    pub fn n_states(&self) -> usize {
        self.transition.nrows()
    }

    pub fn transition(&self) -> &Array2<f64> {
        &self.transition
    }

    pub fn cumulative(&self) -> &Array2<f64> {
        &self.cumulative
    }

    /// Next state for a uniform draw `x` in `[0, 1)`: the first `j` with
    /// `x < cum[j]`. States with zero probability are never selected.
    ///
    /// This is the half-open rule `cum[j-1] <= x < cum[j]`, which deliberately
    /// departs from the closed-right `cum[j-1] < x <= cum[j]` form: a draw that
    /// lands exactly on a boundary goes to the upper state, and `x = 0` can
    /// never pick a leading zero-probability state.
    pub fn next_state(&self, current: usize, x: f64) -> usize {
        self.cumulative
            .row(current)
            .iter()
            .position(|&c| x < c)
            .unwrap_or(self.last_reachable[current])
    }

    pub fn simulate(
        &self,
        horizon: usize,
        initial: usize,
        state_values: &[f64],
        rng: &mut impl Rng,
    ) -> DpResult<MarkovPath> {
        let n = self.n_states();
        if initial >= n {
            return Err(DpError::shape(
                initial,
                n,
                "initial state index out of range",
            ));
        }
        if state_values.len() != n {
            return Err(DpError::shape(
                state_values.len(),
                n,
                "one value per state is required",
            ));
        }

        let mut states = Array2::<f64>::zeros((horizon, n));
        let mut indices = Vec::with_capacity(horizon);
        let mut values = Vec::with_capacity(horizon);

        let mut current = initial;
        for t in 0..horizon {
            let x: f64 = rng.gen();
            current = self.next_state(current, x);
            states[[t, current]] = 1.0;
            indices.push(current);
            values.push(state_values[current]);
        }

        debug!(horizon, initial, final_state = current, "simulated markov path");

        Ok(MarkovPath {
            values,
            states,
            indices,
        })
    }

    /// Long-run distribution of the chain, by power iteration from uniform.
    pub fn stationary_distribution(&self, config: &StationaryConfig) -> DpResult<Array1<f64>> {
        let n = self.n_states();
        let initial = Array1::from_elem(n, 1.0 / n as f64);
        let transposed = self.transition.t();
        let (pi, _) = iterate_to_fixed_point(initial, config, |pi| transposed.dot(pi))?;
        Ok(pi)
    }
}
