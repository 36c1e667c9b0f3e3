//! Period utility and payoff tables over (current state, next state) pairs.
//!
//! Infeasible transitions (consumption <= 0) are assigned `-inf` directly;
//! utility is never evaluated on a non-positive argument, so tables never
//! contain NaN.

use ndarray::Array2;

use crate::error::{DpError, DpResult};
use crate::grid::{Grid, ShockProcess};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Utility {
    Log,
    Crra { sigma: f64 },
}

impl Utility {
    /// CRRA utility with curvature `sigma`; `sigma == 1` selects log utility.
    pub fn from_sigma(sigma: f64) -> DpResult<Self> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(DpError::parameter(
                "sigma",
                sigma,
                "must be positive and finite",
            ));
        }
        if sigma == 1.0 {
            Ok(Self::Log)
        } else {
            Ok(Self::Crra { sigma })
        }
    }

    pub fn eval(&self, consumption: f64) -> f64 {
        if !is_feasible(consumption) {
            return f64::NEG_INFINITY;
        }
        match *self {
            Self::Log => consumption.ln(),
            Self::Crra { sigma } => (consumption.powf(1.0 - sigma) - 1.0) / (1.0 - sigma),
        }
    }
}

pub fn is_feasible(consumption: f64) -> bool {
    consumption > 0.0
}

/// Payoff of moving from `current[i]` to `next[j]`, with consumption
/// `resource(current[i]) - next[j]`. Rows index today's state.
pub fn payoff_table(
    current: &Grid,
    next: &Grid,
    utility: Utility,
    resource: impl Fn(f64) -> f64,
) -> Array2<f64> {
    let output: Vec<f64> = current.points().iter().map(|&k| resource(k)).collect();
    let next_points = next.points();

    Array2::from_shape_fn((current.len(), next.len()), |(i, j)| {
        utility.eval(output[i] - next_points[j])
    })
}

/// One payoff table per shock realization, with output
/// `resource(current[i], shock)`.
pub fn shock_payoff_tables(
    current: &Grid,
    next: &Grid,
    utility: Utility,
    shocks: &ShockProcess,
    resource: impl Fn(f64, f64) -> f64,
) -> Vec<Array2<f64>> {
    shocks
        .values()
        .iter()
        .map(|&a| payoff_table(current, next, utility, |k| resource(k, a)))
        .collect()
}

/// Rows of `table` with no feasible transition.
pub fn infeasible_rows(table: &Array2<f64>) -> Vec<usize> {
    table
        .outer_iter()
        .enumerate()
        .filter(|(_, row)| row.iter().all(|&u| u == f64::NEG_INFINITY))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sigma_selects_form() {
        assert_eq!(Utility::from_sigma(1.0).unwrap(), Utility::Log);
        assert_eq!(
            Utility::from_sigma(2.0).unwrap(),
            Utility::Crra { sigma: 2.0 }
        );
        assert!(Utility::from_sigma(0.0).is_err());
        assert!(Utility::from_sigma(f64::NAN).is_err());
    }

    #[test]
    fn test_crra_values() {
        let u = Utility::Crra { sigma: 2.0 };
        // (c^-1 - 1) / -1 = 1 - 1/c
        assert!((u.eval(2.0) - 0.5).abs() < 1e-12);
        assert!((u.eval(1.0)).abs() < 1e-12);
        assert!((Utility::Log.eval(std::f64::consts::E) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_positive_consumption_is_neg_infinity() {
        for u in [Utility::Log, Utility::Crra { sigma: 0.5 }, Utility::Crra { sigma: 3.0 }] {
            assert_eq!(u.eval(0.0), f64::NEG_INFINITY);
            assert_eq!(u.eval(-1.0), f64::NEG_INFINITY);
            assert_eq!(u.eval(f64::NAN), f64::NEG_INFINITY);
        }
    }

    #[test]
    fn test_table_masks_infeasible() {
        let grid = Grid::new(1.0, 3.0, 1.0).unwrap();
        // output = 2k
        let table = payoff_table(&grid, &grid, Utility::Log, |k| 2.0 * k);

        assert_eq!(table.dim(), (3, 3));
        assert_eq!(table[[0, 1]], f64::NEG_INFINITY); // 2 - 2
        assert_eq!(table[[0, 2]], f64::NEG_INFINITY); // 2 - 3
        assert!((table[[0, 0]] - 1.0_f64.ln()).abs() < 1e-12);
        assert!((table[[2, 0]] - 5.0_f64.ln()).abs() < 1e-12);
        assert!(table.iter().all(|u| !u.is_nan()));
    }

    #[test]
    fn test_all_infeasible_row() {
        let grid = Grid::new(1.0, 3.0, 1.0).unwrap();
        let table = payoff_table(&grid, &grid, Utility::Log, |k| k - 0.5);
        assert_eq!(infeasible_rows(&table), vec![0]);
    }

    #[test]
    fn test_one_table_per_shock() {
        let grid = Grid::new(0.5, 2.0, 0.5).unwrap();
        let shocks = ShockProcess::new(vec![1.25, 0.5], array![[0.8, 0.2], [0.2, 0.8]]).unwrap();
        let utility = Utility::Crra { sigma: 2.0 };
        let tables =
            shock_payoff_tables(&grid, &grid, utility, &shocks, |k, a| a * k.powf(0.4) + 0.5 * k);

        assert_eq!(tables.len(), 2);
        let high = &tables[0];
        let low = &tables[1];
        for (h, l) in high.iter().zip(low.iter()) {
            assert!(h >= l);
        }
    }
}
