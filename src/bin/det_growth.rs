//! Deterministic Growth Model Binary
//!
//! Solves the log-utility growth model by value function iteration and
//! compares the decision rule with the closed-form solution.
//!
//! ## Usage
//! ```bash
//! RUST_LOG=debug cargo run --bin det_growth --release
//! ```

use growth_dp::growth::DeterministicGrowth;
use growth_dp::DpResult;
use tracing_subscriber::EnvFilter;

const REPORT_POINTS: [f64; 7] = [0.05, 0.1, 0.2, 0.3, 0.5, 0.75, 1.0];

fn main() -> DpResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let model = DeterministicGrowth::default();

    println!("=======================================================");
    println!("  Deterministic Growth: Value Function Iteration");
    println!("=======================================================");
    println!();
    println!("Parameters:");
    println!(
        "  alpha: {:.2}, beta: {:.2}, A: exp({:.2})",
        model.alpha, model.solver.beta, model.tfp_exponent
    );
    println!(
        "  Grid: [{}, {}] step {}",
        model.grid.min, model.grid.max, model.grid.step
    );
    println!("  Tolerance: {:e}", model.solver.tolerance);
    println!();

    let solved = model.solve()?;
    let analytical = model.analytical()?;
    let numeric = solved.decision_values();

    let max_error = numeric
        .iter()
        .zip(analytical.decision.iter())
        .map(|(n, a)| (n - a).abs())
        .fold(0.0, f64::max);

    println!(
        "Converged in {} iterations (metric {:.2e})",
        solved.solution.iterations,
        solved.solution.final_metric()
    );
    println!();
    println!("| k       | k' (numeric) | k' (analytical) | V (numeric) | V (analytical) |");
    println!("|---------|--------------|-----------------|-------------|----------------|");
    for &k in REPORT_POINTS.iter() {
        let i = solved.grid.nearest_index(k);
        println!(
            "| {:7.3} | {:12.4} | {:15.4} | {:11.4} | {:14.4} |",
            solved.grid.value_at(i),
            numeric[i],
            analytical.decision[i],
            solved.solution.value[i],
            analytical.value[i],
        );
    }
    println!();

    let k_ss = analytical.steady_state;
    println!("Steady state:");
    println!("  Analytical k_ss:         {:.4}", k_ss);
    println!("  Numeric k'(k_ss):        {:.4}", solved.policy_at(k_ss));
    println!("  Max decision rule error: {:.4}", max_error);

    Ok(())
}
