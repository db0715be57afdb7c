//! Sample statistics over halos, with bins as variables.

use crate::error::{ProfileError, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Transformation applied to profile values before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scale {
    /// Compare `log10(value)`.
    Log10,
    /// Compare raw values.
    Linear,
}

impl Scale {
    pub fn from_log10_flag(take_log10: bool) -> Self {
        if take_log10 {
            Scale::Log10
        } else {
            Scale::Linear
        }
    }

    /// Apply the transformation element-wise.
    ///
    /// Log scaling requires strictly positive values.
    pub fn apply(&self, values: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        match self {
            Scale::Linear => Ok(values.clone()),
            Scale::Log10 => {
                if let Some((idx, &val)) = values.iter().enumerate().find(|(_, &v)| v <= 0.0) {
                    let (row, col) = (idx % values.nrows(), idx / values.nrows());
                    return Err(ProfileError::Numerical(format!(
                        "log10 requires positive values; found {} at ({}, {})",
                        val, row, col
                    )));
                }
                Ok(values.map(|x| x.log10()))
            }
        }
    }
}

/// Per-column means.
pub fn column_means(values: &DMatrix<f64>) -> DVector<f64> {
    values.row_mean().transpose()
}

/// Unbiased sample covariance of the columns (rows are observations).
///
/// Needs at least two observations.
pub fn covariance(values: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let n = values.nrows();
    if n < 2 {
        return Err(ProfileError::EmptyData(format!(
            "Covariance needs at least two halos, got {}",
            n
        )));
    }

    let means = values.row_mean();
    let mut centered = values.clone();
    for mut row in centered.row_iter_mut() {
        row -= &means;
    }

    Ok(centered.transpose() * &centered / (n - 1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_column_means() {
        let values = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 9.0]);
        let means = column_means(&values);
        assert_relative_eq!(means[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(means[1], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_covariance_manual() {
        // x = [1, 3, 5], y = [2, 4, 9]
        // var(x) = 4, var(y) = 13, cov(x, y) = 7
        let values = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 9.0]);
        let cov = covariance(&values).unwrap();

        assert_eq!(cov.shape(), (2, 2));
        assert_relative_eq!(cov[(0, 0)], 4.0, epsilon = 1e-12);
        assert_relative_eq!(cov[(1, 1)], 13.0, epsilon = 1e-12);
        assert_relative_eq!(cov[(0, 1)], 7.0, epsilon = 1e-12);
        assert_relative_eq!(cov[(1, 0)], 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_covariance_needs_two_rows() {
        let values = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        assert!(covariance(&values).is_err());
    }

    #[test]
    fn test_log10_scale() {
        let values = DMatrix::from_row_slice(1, 3, &[1.0, 10.0, 1000.0]);
        let scaled = Scale::Log10.apply(&values).unwrap();
        assert_relative_eq!(scaled[(0, 0)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(scaled[(0, 1)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(scaled[(0, 2)], 3.0, epsilon = 1e-12);

        assert_eq!(Scale::Linear.apply(&values).unwrap(), values);
    }

    #[test]
    fn test_log10_rejects_non_positive() {
        let values = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, -1.0]);
        match Scale::Log10.apply(&values) {
            Err(ProfileError::Numerical(msg)) => assert!(msg.contains("(1, 1)")),
            other => panic!("expected Numerical error, got {:?}", other),
        }
    }
}
