//! Percentile bands of profiles across halos.

use crate::data::ProfileTable;
use crate::error::{ProfileError, Result};
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Percentiles used for the usual 1-sigma band and median.
pub const DEFAULT_PERCENTILES: [f64; 3] = [16.0, 50.0, 84.0];

/// Per-bin percentiles of a halos × bins array.
///
/// NaN entries are ignored. A bin whose values are all NaN yields NaN for
/// every percentile rather than an error. Values between order statistics
/// are linearly interpolated.
///
/// # Arguments
/// * `profiles` - Profiles (halos × bins)
/// * `percentiles` - Percentiles to compute, each in [0, 100]
///
/// # Returns
/// One vector per requested percentile, in the order given, each with one
/// entry per bin.
pub fn profile_percentiles(profiles: &DMatrix<f64>, percentiles: &[f64]) -> Result<Vec<Vec<f64>>> {
    if let Some(&p) = percentiles.iter().find(|p| !(0.0..=100.0).contains(*p)) {
        return Err(ProfileError::InvalidParameter(format!(
            "Percentile {} outside [0, 100]",
            p
        )));
    }

    // bins × percentiles
    let per_bin: Vec<Vec<f64>> = (0..profiles.ncols())
        .into_par_iter()
        .map(|k| {
            let mut values: Vec<f64> = profiles
                .column(k)
                .iter()
                .copied()
                .filter(|v| !v.is_nan())
                .collect();
            values.sort_unstable_by(|a, b| a.total_cmp(b));
            percentiles
                .iter()
                .map(|&p| interpolate_sorted(&values, p))
                .collect()
        })
        .collect();

    Ok((0..percentiles.len())
        .map(|j| per_bin.iter().map(|bin| bin[j]).collect())
        .collect())
}

/// Linear-interpolation percentile of sorted values; NaN when empty.
fn interpolate_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    let rank = p / 100.0 * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Lower, median and upper profile of a table field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PercentileBands {
    /// Radius axis.
    pub r: Vec<f64>,
    /// 16th percentile per bin.
    pub lower: Vec<f64>,
    /// Median per bin.
    pub median: Vec<f64>,
    /// 84th percentile per bin.
    pub upper: Vec<f64>,
}

impl PercentileBands {
    /// Compute the default bands of a field over all halos of a table.
    pub fn from_table(table: &ProfileTable, field: &str) -> Result<Self> {
        let mut bands = profile_percentiles(table.field(field)?, &DEFAULT_PERCENTILES)?.into_iter();
        let mut next = || {
            bands
                .next()
                .ok_or_else(|| ProfileError::Numerical("Missing percentile band".to_string()))
        };
        Ok(Self {
            r: table.r().to_vec(),
            lower: next()?,
            median: next()?,
            upper: next()?,
        })
    }
}
