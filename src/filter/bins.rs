//! Radius-bin selection shared by two profile tables.

use crate::data::ProfileTable;
use crate::error::{ProfileError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Boolean mask over radius bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinMask {
    mask: Vec<bool>,
    /// Bins finite in every fiducial halo, before the other cuts.
    pub n_finite_fiducial: usize,
}

impl BinMask {
    /// Select bins usable for comparing `test` against `fiducial`.
    ///
    /// A bin is kept iff `field` is finite for every halo of both tables and
    /// the fiducial radius is strictly below `max_radius`. The two tables
    /// must share their radius axis.
    pub fn from_tables(
        fiducial: &ProfileTable,
        test: &ProfileTable,
        field: &str,
        max_radius: f64,
    ) -> Result<Self> {
        fiducial.check_radius_axis(test)?;

        let fid_finite = finite_columns(fiducial.field(field)?);
        let test_finite = finite_columns(test.field(field)?);
        let n_finite_fiducial = fid_finite.iter().filter(|&&b| b).count();

        let mask = fid_finite
            .iter()
            .zip(test_finite.iter())
            .zip(fiducial.r().iter())
            .map(|((&a, &b), &r)| a && b && r < max_radius)
            .collect();

        Ok(Self {
            mask,
            n_finite_fiducial,
        })
    }

    /// Build a mask directly from booleans.
    pub fn from_vec(mask: Vec<bool>) -> Self {
        let n_finite_fiducial = mask.iter().filter(|&&b| b).count();
        Self {
            mask,
            n_finite_fiducial,
        }
    }

    /// Indices of the selected bins.
    pub fn selected(&self) -> Vec<usize> {
        self.mask
            .iter()
            .enumerate()
            .filter(|(_, &keep)| keep)
            .map(|(k, _)| k)
            .collect()
    }

    /// Number of selected bins.
    pub fn n_selected(&self) -> usize {
        self.mask.iter().filter(|&&b| b).count()
    }

    /// Total number of bins.
    pub fn len(&self) -> usize {
        self.mask.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.mask
    }

    /// Restrict a halos × bins matrix to the selected bins.
    pub fn apply(&self, values: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if values.ncols() != self.mask.len() {
            return Err(ProfileError::DimensionMismatch {
                expected: self.mask.len(),
                actual: values.ncols(),
            });
        }
        Ok(values.select_columns(&self.selected()))
    }
}

/// For each column, whether all its entries are finite.
fn finite_columns(values: &DMatrix<f64>) -> Vec<bool> {
    values
        .column_iter()
        .map(|col| col.iter().all(|x| x.is_finite()))
        .collect()
}
