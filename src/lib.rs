//! Discrete Dynamic Programming for Growth Models
//!
//! This library solves optimal-growth problems on a finite capital grid by
//! value function iteration, and simulates the finite Markov chains that
//! drive their productivity shocks.
//!
//! ## Modules
//!
//! - `grid`: capital grid and finite shock process
//! - `utility`: period utility and payoff tables with infeasible moves masked
//! - `bellman`: value function iteration (deterministic and Markov shocks)
//! - `stationary`: stationary distribution over (capital, shock)
//! - `markov`: finite-state Markov chain simulation
//! - `growth`: the deterministic and stochastic growth models end to end
//! - `ar1`: AR(1) path simulation
//! - `lyapunov`: doubling algorithm for `V = A V A' + B`
//!
//! ## Usage
//!
//! ```bash
//! # Deterministic growth model vs. its closed form
//! cargo run --bin det_growth --release
//!
//! # Two-state stochastic growth model and its stationary distribution
//! cargo run --bin stoch_growth --release
//!
//! # Markov chain and AR(1) simulations
//! cargo run --bin sim_markov --release
//! ```

pub mod error;
pub mod grid;
pub mod utility;
pub mod bellman;
pub mod stationary;
pub mod markov;
pub mod growth;
pub mod ar1;
pub mod lyapunov;

pub use error::{DpError, DpResult};
