//! Markov Chain and AR(1) Simulation Binary
//!
//! Simulates a four-state Markov chain and a few AR(1) paths.
//!
//! ## Usage
//! ```bash
//! cargo run --bin sim_markov --release -- 42
//! ```
//! The optional argument seeds the random number generator.

use growth_dp::ar1::{simulate_ar1, Ar1Config, Innovation};
use growth_dp::markov::MarkovChain;
use growth_dp::stationary::StationaryConfig;
use growth_dp::DpResult;
use ndarray::array;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

const HORIZON: usize = 100;
const INITIAL_STATE: usize = 2;
const STATE_VALUES: [f64; 4] = [-1.0, 0.0, 1.0, 2.0];

fn main() -> DpResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(2020);
    let mut rng = StdRng::seed_from_u64(seed);

    let chain = MarkovChain::new(array![
        [0.1, 0.5, 0.3, 0.1],
        [0.4, 0.2, 0.1, 0.3],
        [0.2, 0.3, 0.2, 0.3],
        [0.5, 0.2, 0.1, 0.2],
    ])?;

    println!("=======================================================");
    println!("  Markov Chain Simulation");
    println!("=======================================================");
    println!();
    println!("Parameters:");
    println!("  States: {}, values: {:?}", chain.n_states(), STATE_VALUES);
    println!("  Horizon: {}, initial state: {}, seed: {}", HORIZON, INITIAL_STATE, seed);
    println!();

    let path = chain.simulate(HORIZON, INITIAL_STATE, &STATE_VALUES, &mut rng)?;
    let stationary = chain.stationary_distribution(&StationaryConfig::default())?;

    println!("| State | Value | Visits | Share  | Stationary |");
    println!("|-------|-------|--------|--------|------------|");
    for (s, &v) in STATE_VALUES.iter().enumerate() {
        let visits = path.indices.iter().filter(|&&i| i == s).count();
        println!(
            "| {:5} | {:5.1} | {:6} | {:5.1}% | {:9.1}% |",
            s,
            v,
            visits,
            visits as f64 / HORIZON as f64 * 100.0,
            stationary[s] * 100.0
        );
    }
    println!();
    let mean = path.values.iter().sum::<f64>() / HORIZON as f64;
    println!("  Path mean value:         {:.3}", mean);
    println!("  First 20 values:         {:?}", &path.values[..20]);
    println!();

    println!("=======================================================");
    println!("  AR(1) Simulation");
    println!("=======================================================");
    println!();

    for innovation in [Innovation::CoinFlip, Innovation::Gaussian { std: 1.0 }] {
        let config = Ar1Config {
            innovation,
            ..Ar1Config::default()
        };
        println!("Innovation: {} (rho = {})", innovation.name(), config.rho);
        println!("{}", "-".repeat(50));
        for run in 0..3 {
            let series = simulate_ar1(&config, &mut rng)?;
            let min = series.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = series.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            println!(
                "  Series {}: final {:7.3}, min {:7.3}, max {:7.3}",
                run + 1,
                series[series.len() - 1],
                min,
                max
            );
        }
        println!();
    }

    Ok(())
}
