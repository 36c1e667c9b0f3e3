//! Value Function Iteration
//!
//! Solves `V = T(V)` on a finite grid, where
//!
//! ```text
//! T(V)[i, s] = max_j { payoff_s[i, j] + beta * sum_s' prob[s, s'] * V[j, s'] }
//! ```
//!
//! The deterministic problem is the one-shock case with `prob = [[1]]`.
//!
//! ## Update rule
//! Every sweep reads only the previous iterate. The candidate for shock `s`
//! never sees values computed for another shock in the same sweep, so the
//! result does not depend on the order in which shocks are visited.
//!
//! ## Convergence
//! The metric is the relative sup-norm `max |V_new - V_old| / |V_old|`. The
//! seed must therefore be a nonzero constant (negative is fine). States with
//! no feasible transition keep the value `-inf` and count as unchanged.

use ndarray::{Array1, Array2};
use tracing::{debug, info, warn};

use crate::error::{DpError, DpResult};
use crate::grid::Grid;
use crate::markov::validate_transition_matrix;
use crate::utility::infeasible_rows;

#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Discount factor, in (0, 1).
    pub beta: f64,
    /// Relative sup-norm tolerance.
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Constant seed for the value function; must be nonzero.
    pub initial_value: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            beta: 0.90,
            tolerance: 1e-8,
            max_iterations: 10_000,
            initial_value: -1.0,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> DpResult<()> {
        if !(self.beta > 0.0 && self.beta < 1.0) {
            return Err(DpError::parameter("beta", self.beta, "must lie in (0, 1)"));
        }
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
        if !self.initial_value.is_finite() || self.initial_value == 0.0 {
            return Err(DpError::parameter(
                "initial_value",
                self.initial_value,
                "must be finite and nonzero",
            ));
        }
        Ok(())
    }
}

/// Converged value function and decision rule, indexed `[grid index, shock]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BellmanSolution {
    pub value: Array2<f64>,
    pub decision: Array2<usize>,
    pub iterations: usize,
    /// Convergence metric after each sweep.
    pub metrics: Vec<f64>,
}

impl BellmanSolution {
    pub fn final_metric(&self) -> f64 {
        self.metrics.last().copied().unwrap_or(f64::INFINITY)
    }

    /// Decision rule mapped to next-period grid values.
    pub fn decision_values(&self, grid: &Grid) -> Array2<f64> {
        self.decision.mapv(|d| grid.value_at(d))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeterministicSolution {
    pub value: Array1<f64>,
    pub decision: Array1<usize>,
    pub iterations: usize,
    pub metrics: Vec<f64>,
}

impl DeterministicSolution {
    pub fn final_metric(&self) -> f64 {
        self.metrics.last().copied().unwrap_or(f64::INFINITY)
    }

    pub fn decision_values(&self, grid: &Grid) -> Array1<f64> {
        self.decision.mapv(|d| grid.value_at(d))
    }
}

/// Expected continuation value `sum_s' prob[s, s'] * V[j, s']` for every
/// next state `j`. Zero-probability shocks are skipped so that `0 * -inf`
/// never produces NaN.
fn expected_continuation(prob: &Array2<f64>, value: &Array2<f64>, shock: usize) -> Array1<f64> {
    let mut expected = Array1::<f64>::zeros(value.nrows());
    for (s_next, &p) in prob.row(shock).iter().enumerate() {
        if p == 0.0 {
            continue;
        }
        expected.scaled_add(p, &value.column(s_next));
    }
    expected
}

/// One synchronous application of the Bellman operator.
///
/// Ties are broken toward the lowest next-state index; a row with no feasible
/// transition yields value `-inf` and decision `0`.
pub fn bellman_step(
    payoffs: &[Array2<f64>],
    prob: &Array2<f64>,
    beta: f64,
    value: &Array2<f64>,
) -> (Array2<f64>, Array2<usize>) {
    let (n, n_shocks) = value.dim();
    let mut next_value = Array2::from_elem((n, n_shocks), f64::NEG_INFINITY);
    let mut decision = Array2::<usize>::zeros((n, n_shocks));

    for (s, payoff) in payoffs.iter().enumerate() {
        let continuation = expected_continuation(prob, value, s) * beta;

        for (i, row) in payoff.outer_iter().enumerate() {
            let mut best = f64::NEG_INFINITY;
            let mut best_j = 0;
            for (j, (&u, &c)) in row.iter().zip(continuation.iter()).enumerate() {
                let candidate = u + c;
                if candidate > best {
                    best = candidate;
                    best_j = j;
                }
            }
            next_value[[i, s]] = best;
            decision[[i, s]] = best_j;
        }
    }

    (next_value, decision)
}

fn relative_change(new: f64, old: f64) -> f64 {
    if new == old {
        return 0.0;
    }
    let change = ((new - old) / old).abs();
    if change.is_nan() {
        f64::INFINITY
    } else {
        change
    }
}

/// `max |new - old| / |old|` over all entries.
pub fn convergence_metric(new: &Array2<f64>, old: &Array2<f64>) -> f64 {
    new.iter()
        .zip(old.iter())
        .map(|(&a, &b)| relative_change(a, b))
        .fold(0.0, f64::max)
}

fn check_tables(payoffs: &[Array2<f64>], n_shocks: usize) -> DpResult<usize> {
    if payoffs.len() != n_shocks {
        return Err(DpError::shape(
            payoffs.len(),
            n_shocks,
            "one payoff table per shock is required",
        ));
    }
    let n = payoffs[0].nrows();
    for table in payoffs {
        let (rows, cols) = table.dim();
        if rows != cols || rows != n {
            return Err(DpError::shape(
                rows,
                cols,
                "payoff tables must be square and share one grid",
            ));
        }
        if table.iter().any(|u| u.is_nan()) {
            return Err(DpError::shape(rows, cols, "payoff table contains NaN"));
        }
    }
    if n == 0 {
        return Err(DpError::shape(0, 0, "payoff tables are empty"));
    }
    Ok(n)
}

fn iterate(
    payoffs: &[Array2<f64>],
    prob: &Array2<f64>,
    config: &SolverConfig,
) -> DpResult<BellmanSolution> {
    let n_shocks = prob.nrows();
    let n = payoffs[0].nrows();

    for (s, table) in payoffs.iter().enumerate() {
        let dead = infeasible_rows(table);
        if !dead.is_empty() {
            warn!(
                shock = s,
                states = dead.len(),
                first = dead[0],
                "states with no feasible transition"
            );
        }
    }

    let mut value = Array2::from_elem((n, n_shocks), config.initial_value);
    let mut metrics = Vec::new();

    for iteration in 1..=config.max_iterations {
        let (next_value, decision) = bellman_step(payoffs, prob, config.beta, &value);
        let metric = convergence_metric(&next_value, &value);
        value = next_value;
        metrics.push(metric);
        debug!(iteration, metric, "bellman sweep");

        if metric < config.tolerance {
            info!(iterations = iteration, metric, n, n_shocks, "value function converged");
            return Ok(BellmanSolution {
                value,
                decision,
                iterations: iteration,
                metrics,
            });
        }
    }

    let metric = metrics.last().copied().unwrap_or(f64::INFINITY);
    warn!(
        max_iterations = config.max_iterations,
        metric, "value function iteration bound reached"
    );
    Err(DpError::NonConvergence {
        iterations: config.max_iterations,
        metric,
    })
}

/// Solves the problem with one payoff table per shock, coupled by the shock
/// transition matrix `prob`.
pub fn solve_stochastic(
    payoffs: &[Array2<f64>],
    prob: &Array2<f64>,
    config: &SolverConfig,
) -> DpResult<BellmanSolution> {
    config.validate()?;
    validate_transition_matrix(prob)?;
    check_tables(payoffs, prob.nrows())?;
    iterate(payoffs, prob, config)
}

/// Solves the problem with a single payoff table and no uncertainty.
pub fn solve_deterministic(
    payoff: &Array2<f64>,
    config: &SolverConfig,
) -> DpResult<DeterministicSolution> {
    config.validate()?;
    let payoffs = std::slice::from_ref(payoff);
    check_tables(payoffs, 1)?;

    let certain = Array2::from_elem((1, 1), 1.0);
    let solution = iterate(payoffs, &certain, config)?;

    Ok(DeterministicSolution {
        value: solution.value.column(0).to_owned(),
        decision: solution.decision.column(0).to_owned(),
        iterations: solution.iterations,
        metrics: solution.metrics,
    })
}
