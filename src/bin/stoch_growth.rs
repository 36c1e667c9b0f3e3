//! Stochastic Growth Model Binary
//!
//! Solves the two-state stochastic growth model with CRRA utility, then
//! computes the stationary distribution over (capital, technology).
//!
//! ## Usage
//! ```bash
//! cargo run --bin stoch_growth --release
//! ```

use growth_dp::growth::StochasticGrowth;
use growth_dp::DpResult;
use tracing_subscriber::EnvFilter;

fn main() -> DpResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let model = StochasticGrowth::default();

    println!("=======================================================");
    println!("  Stochastic Growth: Two-State Technology Shocks");
    println!("=======================================================");
    println!();
    println!("Parameters:");
    println!(
        "  alpha: {:.2}, beta: {:.2}, undepreciated: {:.2}, sigma: {:.2}",
        model.alpha, model.solver.beta, model.undepreciated, model.sigma
    );
    println!("  A (high, low): {:?}", model.shock_values);
    let rows: Vec<Vec<f64>> = model.shock_prob.outer_iter().map(|r| r.to_vec()).collect();
    println!("  P(A'|A): {:?}", rows);
    println!(
        "  Grid: [{}, {}] step {}",
        model.grid.min, model.grid.max, model.grid.step
    );
    println!();

    let solved = model.solve()?;
    let rule = solved.decision_values();

    println!(
        "Value function: {} iterations (metric {:.2e})",
        solved.solution.iterations,
        solved.solution.final_metric()
    );
    println!("Stationary distribution: {} iterations", solved.distribution.iterations);
    println!();

    println!("| k       | k' (high) | k' (low) | V (high)  | V (low)   |");
    println!("|---------|-----------|----------|-----------|-----------|");
    for &k in [0.1, 0.25, 0.5, 1.0, 2.0, 5.0].iter() {
        let i = solved.grid.nearest_index(k);
        println!(
            "| {:7.2} | {:9.2} | {:8.2} | {:9.4} | {:9.4} |",
            solved.grid.value_at(i),
            rule[[i, 0]],
            rule[[i, 1]],
            solved.solution.value[[i, 0]],
            solved.solution.value[[i, 1]],
        );
    }
    println!();

    let marginal = solved.distribution.grid_marginal();
    let support: Vec<usize> = marginal
        .iter()
        .enumerate()
        .filter(|(_, &p)| p > 1e-6)
        .map(|(i, _)| i)
        .collect();

    println!("Ergodic set:");
    if let (Some(&lo), Some(&hi)) = (support.first(), support.last()) {
        println!(
            "  Capital range:           [{:.2}, {:.2}]",
            solved.grid.value_at(lo),
            solved.grid.value_at(hi)
        );
    }
    let shocks = solved.distribution.shock_marginal();
    println!("  P(high), P(low):         {:.3}, {:.3}", shocks[0], shocks[1]);
    println!("  Mean capital:            {:.4}", solved.mean_capital()?);

    Ok(())
}
