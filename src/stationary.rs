//! Stationary Distribution of the Solved Model
//!
//! Once the Bellman solver has converged, the decision rule together with the
//! shock transition matrix defines a Markov chain over the product state
//! space (capital index x shock). This module builds that chain and
//! power-iterates it to its long-run distribution.
//!
//! ## Layout
//! Product states are ordered shock-major: state `(i, s)` lives at
//! `s * n_grid + i`. Block `(s, s')` of the induced matrix is
//! `prob[s, s'] * G_s`, where `G_s[i, decision[i, s]] = 1`.

use ndarray::{Array1, Array2};
use tracing::{debug, info, warn};

use crate::error::{DpError, DpResult};
use crate::markov::validate_transition_matrix;

#[derive(Clone, Debug)]
pub struct StationaryConfig {
    /// Sup-norm tolerance on successive distributions.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for StationaryConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 100_000,
        }
    }
}

impl StationaryConfig {
    pub(crate) fn validate(&self) -> DpResult<()> {
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(DpError::parameter(
                "tolerance",
                self.tolerance,
                "must be positive and finite",
            ));
        }
        if self.max_iterations == 0 {
            return Err(DpError::parameter(
                "max_iterations",
                0.0,
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Applies `step` until the sup-norm change drops below the tolerance.
/// Returns the last iterate and the number of steps taken.
pub(crate) fn iterate_to_fixed_point<F>(
    initial: Array1<f64>,
    config: &StationaryConfig,
    mut step: F,
) -> DpResult<(Array1<f64>, usize)>
where
    F: FnMut(&Array1<f64>) -> Array1<f64>,
{
    config.validate()?;

    let mut current = initial;
    let mut metric = f64::INFINITY;
    let mut iterations = 0;

    for iteration in 1..=config.max_iterations {
        iterations = iteration;
        let next = step(&current);
        metric = next
            .iter()
            .zip(current.iter())
            .map(|(a, b)| (a - b).abs())
            .map(|d| if d.is_nan() { f64::INFINITY } else { d })
            .fold(0.0, f64::max);
        current = next;

        // a NaN or infinite mass never recovers
        if !metric.is_finite() {
            break;
        }
        if metric < config.tolerance {
            info!(iterations = iteration, metric, "distribution converged");
            return Ok((current, iteration));
        }
    }

    warn!(iterations, metric, "distribution did not converge");
    Err(DpError::NonConvergence { iterations, metric })
}

/// Chain over (capital index, shock) implied by a converged decision rule.
///
/// The matrix is stored through its generators (one chosen index per state
/// and the shock probabilities); [`InducedTransition::to_dense`] expands it.
#[derive(Debug, Clone)]
pub struct InducedTransition {
    decisions: Array2<usize>,
    prob: Array2<f64>,
}

impl InducedTransition {
    /// `decisions[[i, s]]` is the next-period grid index chosen at grid index
    /// `i` under shock `s`.
    pub fn new(decisions: &Array2<usize>, prob: &Array2<f64>) -> DpResult<Self> {
        validate_transition_matrix(prob)?;

        let (n_grid, n_shocks) = decisions.dim();
        if n_shocks != prob.nrows() {
            return Err(DpError::shape(
                n_grid,
                n_shocks,
                "decision rule needs one column per shock",
            ));
        }
        if n_grid == 0 {
            return Err(DpError::shape(n_grid, n_shocks, "empty decision rule"));
        }
        if let Some(&bad) = decisions.iter().find(|&&d| d >= n_grid) {
            return Err(DpError::shape(
                bad,
                n_grid,
                "decision index outside the grid",
            ));
        }

        Ok(Self {
            decisions: decisions.clone(),
            prob: prob.clone(),
        })
    }

    pub fn n_grid(&self) -> usize {
        self.decisions.nrows()
    }

    pub fn n_shocks(&self) -> usize {
        self.decisions.ncols()
    }

    pub fn n_states(&self) -> usize {
        self.n_grid() * self.n_shocks()
    }

    /// The full row-stochastic matrix, row = state today, column = tomorrow.
    pub fn to_dense(&self) -> Array2<f64> {
        let n = self.n_grid();
        let mut trans = Array2::<f64>::zeros((self.n_states(), self.n_states()));
        for s in 0..self.n_shocks() {
            for i in 0..n {
                let d = self.decisions[[i, s]];
                for s_next in 0..self.n_shocks() {
                    trans[[s * n + i, s_next * n + d]] = self.prob[[s, s_next]];
                }
            }
        }
        trans
    }

    /// One step of `pi_{t+1} = M^T pi_t`.
    pub fn step(&self, pi: &Array1<f64>) -> Array1<f64> {
        let n = self.n_grid();
        let mut next = Array1::<f64>::zeros(self.n_states());
        for s in 0..self.n_shocks() {
            for i in 0..n {
                let mass = pi[s * n + i];
                if mass == 0.0 {
                    continue;
                }
                let d = self.decisions[[i, s]];
                for s_next in 0..self.n_shocks() {
                    next[s_next * n + d] += mass * self.prob[[s, s_next]];
                }
            }
        }
        next
    }
}

#[derive(Debug, Clone)]
pub struct StationaryDistribution {
    /// Probability of each product state, shock-major.
    pub probabilities: Array1<f64>,
    pub n_grid: usize,
    pub n_shocks: usize,
    pub iterations: usize,
}

impl StationaryDistribution {
    pub fn get(&self, grid_index: usize, shock: usize) -> f64 {
        self.probabilities[shock * self.n_grid + grid_index]
    }

    /// Distribution over grid indices, summed across shocks.
    pub fn grid_marginal(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.n_grid, |i| {
            (0..self.n_shocks).map(|s| self.get(i, s)).sum::<f64>()
        })
    }

    pub fn shock_marginal(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.n_shocks, |s| {
            (0..self.n_grid).map(|i| self.get(i, s)).sum::<f64>()
        })
    }

    /// Expected value of `values[[i, s]]` under the distribution.
    pub fn expectation(&self, values: &Array2<f64>) -> DpResult<f64> {
        if values.dim() != (self.n_grid, self.n_shocks) {
            let (rows, cols) = values.dim();
            return Err(DpError::shape(
                rows,
                cols,
                "values must be indexed by (grid index, shock)",
            ));
        }
        let mut total = 0.0;
        for s in 0..self.n_shocks {
            for i in 0..self.n_grid {
                total += self.get(i, s) * values[[i, s]];
            }
        }
        Ok(total)
    }
}

/// Long-run distribution over (capital index, shock) implied by `decisions`
/// and the shock transition matrix `prob`, iterated from uniform.
pub fn stationary_distribution(
    decisions: &Array2<usize>,
    prob: &Array2<f64>,
    config: &StationaryConfig,
) -> DpResult<StationaryDistribution> {
    let induced = InducedTransition::new(decisions, prob)?;
    let n_states = induced.n_states();
    debug!(n_states, "iterating induced transition");

    let initial = Array1::from_elem(n_states, 1.0 / n_states as f64);
    let (probabilities, iterations) =
        iterate_to_fixed_point(initial, config, |pi| induced.step(pi))?;

    Ok(StationaryDistribution {
        probabilities,
        n_grid: induced.n_grid(),
        n_shocks: induced.n_shocks(),
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn persistent() -> Array2<f64> {
        array![[0.8, 0.2], [0.2, 0.8]]
    }

    #[test]
    fn test_dense_matrix_is_row_stochastic() {
        let decisions = array![[1, 0], [2, 1], [2, 1]];
        let induced = InducedTransition::new(&decisions, &persistent()).unwrap();
        let dense = induced.to_dense();

        assert_eq!(dense.dim(), (6, 6));
        for row in dense.outer_iter() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
        // (i=0, s=1) chooses index 0; stays low with 0.8
        assert!((dense[[3, 3]] - 0.8).abs() < 1e-12);
        assert!((dense[[3, 0]] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_step_matches_dense_transpose() {
        let decisions = array![[1, 0], [2, 1], [2, 1]];
        let induced = InducedTransition::new(&decisions, &persistent()).unwrap();
        let pi = array![0.1, 0.2, 0.3, 0.15, 0.15, 0.1];

        let sparse = induced.step(&pi);
        let dense = induced.to_dense().t().dot(&pi);
        for (a, b) in sparse.iter().zip(dense.iter()) {
            assert!((a - b).abs() < 1e-14);
        }
    }

    #[test]
    fn test_absorbing_capital_level() {
        let decisions = array![[1, 1], [1, 1], [1, 1]];
        let dist =
            stationary_distribution(&decisions, &persistent(), &StationaryConfig::default())
                .unwrap();

        assert!((dist.get(1, 0) - 0.5).abs() < 1e-7);
        assert!((dist.get(1, 1) - 0.5).abs() < 1e-7);
        assert!(dist.get(0, 0).abs() < 1e-12);

        let marginal = dist.grid_marginal();
        assert!((marginal[1] - 1.0).abs() < 1e-7);
    }

    #[test]
    fn test_result_is_fixed_point() {
        let decisions = array![[1, 0], [2, 0], [2, 1], [3, 2]];
        let prob = array![[0.9, 0.1], [0.3, 0.7]];
        let config = StationaryConfig::default();
        let dist = stationary_distribution(&decisions, &prob, &config).unwrap();

        assert!((dist.probabilities.sum() - 1.0).abs() < 1e-9);
        assert!(dist.probabilities.iter().all(|&p| p >= 0.0));

        let induced = InducedTransition::new(&decisions, &prob).unwrap();
        let again = induced.step(&dist.probabilities);
        let change = again
            .iter()
            .zip(dist.probabilities.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        assert!(change < config.tolerance);

        let shocks = dist.shock_marginal();
        assert!((shocks[0] - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_expectation() {
        let decisions = array![[1, 1], [1, 1]];
        let dist =
            stationary_distribution(&decisions, &persistent(), &StationaryConfig::default())
                .unwrap();
        let values = array![[0.0, 0.0], [2.0, 4.0]];
        assert!((dist.expectation(&values).unwrap() - 3.0).abs() < 1e-6);
        assert!(dist.expectation(&array![[1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_invalid_inputs() {
        let prob = persistent();
        assert!(matches!(
            InducedTransition::new(&array![[0, 5], [1, 1]], &prob),
            Err(DpError::InvalidShape { .. })
        ));
        assert!(matches!(
            InducedTransition::new(&array![[0], [1]], &prob),
            Err(DpError::InvalidShape { .. })
        ));
        assert!(matches!(
            InducedTransition::new(&array![[0, 1], [1, 1]], &array![[0.5, 0.4], [0.5, 0.5]]),
            Err(DpError::InvalidProbabilities { .. })
        ));
    }

    #[test]
    fn test_iteration_bound() {
        let decisions = array![[1, 0], [2, 0], [2, 1], [3, 2]];
        let prob = array![[0.9, 0.1], [0.3, 0.7]];
        let config = StationaryConfig {
            tolerance: 1e-14,
            max_iterations: 2,
        };
        let err = stationary_distribution(&decisions, &prob, &config).unwrap_err();
        assert!(matches!(err, DpError::NonConvergence { iterations: 2, .. }));
    }

    #[test]
    fn test_nan_iterate_stops_early() {
        let config = StationaryConfig::default();
        let err = iterate_to_fixed_point(array![0.5, 0.5], &config, |_| array![f64::NAN, 1.0])
            .unwrap_err();
        match err {
            DpError::NonConvergence { iterations, metric } => {
                assert_eq!(iterations, 1);
                assert!(metric.is_infinite());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
