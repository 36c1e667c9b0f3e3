//! AR(1) Simulation
//!
//! `x_{t+1} = rho * x_t + e_{t+1}`, starting from `x_0 = 0`.
//!
//! ## Innovations
//! - Coin flip: `e = +1` or `-1` with equal probability
//! - Gaussian: `e ~ Normal(0, std)`

use rand::prelude::*;
use rand_distr::{Distribution, Normal};

use crate::error::{DpError, DpResult};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Innovation {
    CoinFlip,
    Gaussian { std: f64 },
}

impl Innovation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CoinFlip => "coin flip (+1/-1)",
            Self::Gaussian { .. } => "Gaussian",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Ar1Config {
    pub rho: f64,
    /// Path length, including `x_0`.
    pub periods: usize,
    pub innovation: Innovation,
}

impl Default for Ar1Config {
    fn default() -> Self {
        Self {
            rho: 0.95,
            periods: 100,
            innovation: Innovation::CoinFlip,
        }
    }
}

pub fn simulate_ar1(config: &Ar1Config, rng: &mut impl Rng) -> DpResult<Vec<f64>> {
    if !config.rho.is_finite() {
        return Err(DpError::parameter("rho", config.rho, "must be finite"));
    }

    let gaussian = match config.innovation {
        Innovation::Gaussian { std } => {
            if !(std.is_finite() && std > 0.0) {
                return Err(DpError::parameter("std", std, "must be positive and finite"));
            }
            Normal::new(0.0, std)
                .map(Some)
                .map_err(|_| DpError::parameter("std", std, "rejected by normal distribution"))?
        }
        Innovation::CoinFlip => None,
    };

    let mut path = Vec::with_capacity(config.periods);
    let mut x = 0.0;
    for t in 0..config.periods {
        if t > 0 {
            let shock = match &gaussian {
                Some(normal) => normal.sample(rng),
                None if rng.gen_bool(0.5) => 1.0,
                None => -1.0,
            };
            x = config.rho * x + shock;
        }
        path.push(x);
    }

    Ok(path)
}
