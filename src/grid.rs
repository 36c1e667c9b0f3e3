//! State-space discretization: the capital grid and the finite shock process.

use ndarray::{Array1, Array2};

use crate::error::{DpError, DpResult};
use crate::markov::validate_transition_matrix;

/// Upper bound on the number of points in a grid.
pub const MAX_GRID_POINTS: usize = 10_000_000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl GridSpec {
    pub fn build(&self) -> DpResult<Grid> {
        Grid::new(self.min, self.max, self.step)
    }
}

/// Evenly spaced points `min + i * step`, `i = 0..count`, with
/// `count = round((max - min) / step) + 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    min: f64,
    step: f64,
    points: Array1<f64>,
}

impl Grid {
    pub fn new(min: f64, max: f64, step: f64) -> DpResult<Self> {
        let invalid = |reason: &'static str| DpError::InvalidGrid {
            min,
            max,
            step,
            reason,
        };

        if !(min.is_finite() && max.is_finite() && step.is_finite()) {
            return Err(invalid("bounds and step must be finite"));
        }
        if step <= 0.0 {
            return Err(invalid("step must be positive"));
        }
        if max < min {
            return Err(invalid("max must not be below min"));
        }

        let intervals = ((max - min) / step).round();
        if !intervals.is_finite() || intervals >= MAX_GRID_POINTS as f64 {
            return Err(invalid("too many grid points"));
        }
        if min + step == min {
            return Err(invalid("step is below the float resolution at min"));
        }

        let count = intervals as usize + 1;
        let points = Array1::from_shape_fn(count, |i| min + i as f64 * step);
        if points.iter().zip(points.iter().skip(1)).any(|(a, b)| b <= a) {
            return Err(invalid("grid points are not strictly increasing"));
        }

        Ok(Self { min, step, points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn max(&self) -> f64 {
        self.points[self.len() - 1]
    }

    pub fn points(&self) -> &Array1<f64> {
        &self.points
    }

    /// Grid value for a decision index.
    pub fn value_at(&self, index: usize) -> f64 {
        self.min + index as f64 * self.step
    }

    /// Index of the grid point closest to `x`, clamped to the grid.
    pub fn nearest_index(&self, x: f64) -> usize {
        let raw = ((x - self.min) / self.step).round();
        if raw <= 0.0 {
            0
        } else {
            (raw as usize).min(self.len() - 1)
        }
    }

    pub fn values_of(&self, indices: &[usize]) -> Vec<f64> {
        indices.iter().map(|&i| self.value_at(i)).collect()
    }
}

/// Finite set of shock realizations with a row-stochastic transition matrix,
/// `prob[[i, j]] = P(shock_{t+1} = j | shock_t = i)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ShockProcess {
    values: Vec<f64>,
    prob: Array2<f64>,
}

impl ShockProcess {
    pub fn new(values: Vec<f64>, prob: Array2<f64>) -> DpResult<Self> {
        validate_transition_matrix(&prob)?;
        if values.len() != prob.nrows() {
            return Err(DpError::shape(
                values.len(),
                prob.nrows(),
                "one shock value per transition state is required",
            ));
        }
        Ok(Self { values, prob })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn prob(&self) -> &Array2<f64> {
        &self.prob
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_deterministic_model_grid() {
        let grid = Grid::new(0.001, 1.0, 0.001).unwrap();
        assert_eq!(grid.len(), 1000);
        assert_eq!(grid.points()[0], 0.001);
        assert!((grid.max() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_stochastic_model_grid() {
        let grid = Grid::new(0.01, 25.0, 0.01).unwrap();
        assert_eq!(grid.len(), 2500);
        assert!((grid.value_at(2499) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_point_grid() {
        let grid = Grid::new(2.0, 2.0, 0.5).unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.max(), 2.0);
    }

    #[test]
    fn test_rejects_bad_grids() {
        assert!(matches!(
            Grid::new(0.0, 1.0, 0.0),
            Err(DpError::InvalidGrid { .. })
        ));
        assert!(matches!(
            Grid::new(0.0, 1.0, -0.1),
            Err(DpError::InvalidGrid { .. })
        ));
        assert!(matches!(
            Grid::new(1.0, 0.0, 0.1),
            Err(DpError::InvalidGrid { .. })
        ));
        assert!(matches!(
            Grid::new(0.0, f64::NAN, 0.1),
            Err(DpError::InvalidGrid { .. })
        ));
    }

    #[test]
    fn test_rejects_oversized_grids() {
        // span overflows to infinity
        assert!(matches!(
            Grid::new(-1e308, 1e308, 1.0),
            Err(DpError::InvalidGrid { .. })
        ));
        assert!(matches!(
            Grid::new(0.0, 1e9, 1e-9),
            Err(DpError::InvalidGrid { .. })
        ));
    }

    #[test]
    fn test_rejects_step_below_resolution() {
        assert!(matches!(
            Grid::new(1e16, 1e16 + 8.0, 1.0),
            Err(DpError::InvalidGrid { .. })
        ));
        assert!(matches!(
            Grid::new(1e16, 1e16 + 6.0, 1.5),
            Err(DpError::InvalidGrid { .. })
        ));
    }

    #[test]
    fn test_nearest_index() {
        let grid = Grid::new(0.5, 2.5, 0.5).unwrap();
        assert_eq!(grid.nearest_index(1.4), 2);
        assert_eq!(grid.nearest_index(-3.0), 0);
        assert_eq!(grid.nearest_index(100.0), 4);
        assert_eq!(grid.values_of(&[0, 4]), vec![0.5, 2.5]);
    }

    #[test]
    fn test_shock_process() {
        let shocks = ShockProcess::new(vec![1.25, 0.5], array![[0.8, 0.2], [0.2, 0.8]]).unwrap();
        assert_eq!(shocks.len(), 2);

        assert!(ShockProcess::new(vec![1.0], array![[0.8, 0.2], [0.2, 0.8]]).is_err());
        assert!(matches!(
            ShockProcess::new(vec![1.0, 2.0], array![[0.8, 0.1], [0.2, 0.8]]),
            Err(DpError::InvalidProbabilities { .. })
        ));
    }
}
