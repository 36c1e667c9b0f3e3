//! End-to-end checks of the growth models against known solutions.

use growth_dp::bellman::SolverConfig;
use growth_dp::growth::{DeterministicGrowth, StochasticGrowth};
use growth_dp::grid::GridSpec;
use growth_dp::stationary::InducedTransition;

#[test]
fn deterministic_steady_state_is_fixed_point() {
    let model = DeterministicGrowth::default();
    let solved = model.solve().expect("deterministic model solves");
    let k_ss = model.steady_state();
    let step = model.grid.step;

    assert!(solved.solution.final_metric() < model.solver.tolerance);
    assert!(
        (solved.policy_at(k_ss) - k_ss).abs() <= step,
        "k'(k_ss) = {}, k_ss = {}",
        solved.policy_at(k_ss),
        k_ss
    );
}

#[test]
fn deterministic_rule_tracks_closed_form() {
    let model = DeterministicGrowth {
        grid: GridSpec {
            min: 0.005,
            max: 1.0,
            step: 0.005,
        },
        ..DeterministicGrowth::default()
    };
    let solved = model.solve().unwrap();
    let analytical = model.analytical().unwrap();
    let numeric = solved.decision_values();

    for (n, a) in numeric.iter().zip(analytical.decision.iter()) {
        assert!((n - a).abs() <= 4.0 * model.grid.step, "numeric {n} vs analytical {a}");
    }

    // the rule is monotone in current capital
    for w in solved.solution.decision.as_slice().unwrap().windows(2) {
        assert!(w[1] >= w[0]);
    }
}

#[test]
fn deterministic_solve_is_reproducible() {
    let model = DeterministicGrowth {
        grid: GridSpec {
            min: 0.01,
            max: 1.0,
            step: 0.01,
        },
        ..DeterministicGrowth::default()
    };
    let a = model.solve().unwrap();
    let b = model.solve().unwrap();
    assert_eq!(a.solution, b.solution);
}

#[test]
fn stochastic_pipeline_on_coarse_grid() {
    let model = StochasticGrowth {
        grid: GridSpec {
            min: 0.02,
            max: 4.0,
            step: 0.02,
        },
        solver: SolverConfig {
            beta: 0.60,
            tolerance: 1e-9,
            ..SolverConfig::default()
        },
        ..StochasticGrowth::default()
    };
    let solved = model.solve().unwrap();
    let dist = &solved.distribution;

    assert!((dist.probabilities.sum() - 1.0).abs() < 1e-9);
    assert!(dist.probabilities.iter().all(|&p| p >= 0.0));

    let induced = InducedTransition::new(&solved.solution.decision, solved.shocks.prob()).unwrap();
    let again = induced.step(&dist.probabilities);
    let change = again
        .iter()
        .zip(dist.probabilities.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max);
    assert!(change < model.stationary.tolerance);

    let mean = solved.mean_capital().unwrap();
    assert!(mean > 0.0 && mean < 4.0);
}
