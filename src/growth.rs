//! Optimal Growth Models
//!
//! Parameter sets and end-to-end solves for the two growth problems the
//! solvers were built for.
//!
//! ## Deterministic model
//! `max sum_t beta^t ln c_t` subject to `c_t + k_{t+1} = A k_t^alpha`,
//! `A = exp(tfp_exponent)`. Full depreciation and log utility give a closed
//! form, used as a benchmark for the numerical solution.
//!
//! ## Stochastic model
//! `max E sum_t beta^t u(c_t)` with CRRA `u`, subject to
//! `c_t + k_{t+1} = A_t k_t^alpha + undepreciated * k_t`, where `A_t` follows
//! a finite Markov chain.

use ndarray::{array, Array1, Array2};
use tracing::info;

use crate::bellman::{
    solve_deterministic, solve_stochastic, BellmanSolution, DeterministicSolution, SolverConfig,
};
use crate::error::{DpError, DpResult};
use crate::grid::{Grid, GridSpec, ShockProcess};
use crate::stationary::{stationary_distribution, StationaryConfig, StationaryDistribution};
use crate::utility::{payoff_table, shock_payoff_tables, Utility};

fn check_share(name: &'static str, value: f64) -> DpResult<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(DpError::parameter(name, value, "must lie in (0, 1)"))
    }
}

#[derive(Clone, Debug)]
pub struct DeterministicGrowth {
    /// Capital share of income.
    pub alpha: f64,
    /// TFP is `exp(tfp_exponent)`.
    pub tfp_exponent: f64,
    pub grid: GridSpec,
    pub solver: SolverConfig,
}

impl Default for DeterministicGrowth {
    fn default() -> Self {
        Self {
            alpha: 0.35,
            tfp_exponent: 0.40,
            grid: GridSpec {
                min: 0.001,
                max: 1.0,
                step: 0.001,
            },
            solver: SolverConfig {
                beta: 0.90,
                tolerance: 1e-10,
                ..SolverConfig::default()
            },
        }
    }
}

/// Closed-form value function and decision rule on the grid.
#[derive(Debug, Clone)]
pub struct AnalyticalSolution {
    pub value: Array1<f64>,
    pub decision: Array1<f64>,
    pub steady_state: f64,
}

#[derive(Debug, Clone)]
pub struct DeterministicGrowthSolution {
    pub grid: Grid,
    pub solution: DeterministicSolution,
}

impl DeterministicGrowthSolution {
    pub fn decision_values(&self) -> Array1<f64> {
        self.solution.decision_values(&self.grid)
    }

    /// Next-period capital chosen at the grid point nearest `k`.
    pub fn policy_at(&self, k: f64) -> f64 {
        let i = self.grid.nearest_index(k);
        self.grid.value_at(self.solution.decision[i])
    }
}

impl DeterministicGrowth {
    pub fn tfp(&self) -> f64 {
        self.tfp_exponent.exp()
    }

    pub fn output(&self, k: f64) -> f64 {
        self.tfp() * k.powf(self.alpha)
    }

    /// `k_ss = (alpha * beta * A)^(1 / (1 - alpha))`.
    pub fn steady_state(&self) -> f64 {
        (self.alpha * self.solver.beta * self.tfp()).powf(1.0 / (1.0 - self.alpha))
    }

    pub fn analytical(&self) -> DpResult<AnalyticalSolution> {
        check_share("alpha", self.alpha)?;
        self.solver.validate()?;
        let grid = self.grid.build()?;

        let (alpha, beta, a) = (self.alpha, self.solver.beta, self.tfp());
        let ab = alpha * beta;
        let intercept =
            ((a * (1.0 - ab)).ln() + (ab / (1.0 - ab)) * (a * ab).ln()) / (1.0 - beta);
        let slope = alpha / (1.0 - ab);

        Ok(AnalyticalSolution {
            value: grid.points().mapv(|k| intercept + slope * k.ln()),
            decision: grid.points().mapv(|k| ab * a * k.powf(alpha)),
            steady_state: self.steady_state(),
        })
    }

    pub fn solve(&self) -> DpResult<DeterministicGrowthSolution> {
        check_share("alpha", self.alpha)?;
        let grid = self.grid.build()?;
        let table = payoff_table(&grid, &grid, Utility::Log, |k| self.output(k));
        let solution = solve_deterministic(&table, &self.solver)?;

        info!(
            grid_points = grid.len(),
            iterations = solution.iterations,
            "deterministic growth model solved"
        );
        Ok(DeterministicGrowthSolution { grid, solution })
    }
}

#[derive(Clone, Debug)]
pub struct StochasticGrowth {
    pub alpha: f64,
    /// Share of capital that survives into next period (1 - depreciation).
    pub undepreciated: f64,
    /// CRRA curvature; 1 selects log utility.
    pub sigma: f64,
    pub shock_values: Vec<f64>,
    /// `prob[[i, j]] = P(A_{t+1} = A_j | A_t = A_i)`.
    pub shock_prob: Array2<f64>,
    pub grid: GridSpec,
    pub solver: SolverConfig,
    pub stationary: StationaryConfig,
}

impl Default for StochasticGrowth {
    fn default() -> Self {
        Self {
            alpha: 0.40,
            undepreciated: 0.50,
            sigma: 2.0,
            shock_values: vec![1.25, 0.50],
            shock_prob: array![[0.8, 0.2], [0.2, 0.8]],
            grid: GridSpec {
                min: 0.01,
                max: 25.0,
                step: 0.01,
            },
            solver: SolverConfig {
                beta: 0.60,
                tolerance: 1e-7,
                ..SolverConfig::default()
            },
            stationary: StationaryConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StochasticGrowthSolution {
    pub grid: Grid,
    pub shocks: ShockProcess,
    pub solution: BellmanSolution,
    pub distribution: StationaryDistribution,
}

impl StochasticGrowthSolution {
    pub fn decision_values(&self) -> Array2<f64> {
        self.solution.decision_values(&self.grid)
    }

    /// Mean next-period capital under the stationary distribution.
    pub fn mean_capital(&self) -> DpResult<f64> {
        self.distribution.expectation(&self.decision_values())
    }
}

impl StochasticGrowth {
    pub fn output(&self, k: f64, shock: f64) -> f64 {
        shock * k.powf(self.alpha) + self.undepreciated * k
    }

    pub fn solve(&self) -> DpResult<StochasticGrowthSolution> {
        check_share("alpha", self.alpha)?;
        if !(0.0..=1.0).contains(&self.undepreciated) {
            return Err(DpError::parameter(
                "undepreciated",
                self.undepreciated,
                "must lie in [0, 1]",
            ));
        }
        let utility = Utility::from_sigma(self.sigma)?;
        let grid = self.grid.build()?;
        let shocks = ShockProcess::new(self.shock_values.clone(), self.shock_prob.clone())?;

        let tables = shock_payoff_tables(&grid, &grid, utility, &shocks, |k, a| self.output(k, a));
        let solution = solve_stochastic(&tables, shocks.prob(), &self.solver)?;
        let distribution =
            stationary_distribution(&solution.decision, shocks.prob(), &self.stationary)?;

        info!(
            grid_points = grid.len(),
            shocks = shocks.len(),
            iterations = solution.iterations,
            distribution_iterations = distribution.iterations,
            "stochastic growth model solved"
        );
        Ok(StochasticGrowthSolution {
            grid,
            shocks,
            solution,
            distribution,
        })
    }
}
