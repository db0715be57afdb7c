//! Reading raw snapshot catalogues.

use crate::error::{ProfileError, Result};
use nalgebra::DMatrix;
use std::path::Path;

/// Contents of one snapshot file, before unit conversion and masking.
#[derive(Debug, Clone)]
pub struct RawSnapshot {
    /// `GroupMass` in catalogue units (1e10 Msun/h).
    pub group_mass: Vec<f64>,
    /// `GroupLen`, when requested.
    pub group_len: Option<Vec<i64>>,
    /// Radius bins.
    pub r: Vec<f64>,
    /// `Profiles`, one halos × bins matrix per profile variant.
    pub profiles: Vec<DMatrix<f64>>,
}

impl RawSnapshot {
    /// Number of halos in the snapshot.
    pub fn n_halos(&self) -> usize {
        self.group_mass.len()
    }

    /// Split a row-major `[variants, halos, bins]` buffer into matrices.
    pub fn split_profiles(raw: &[f64], shape: &[usize]) -> Result<Vec<DMatrix<f64>>> {
        let &[n_variants, n_halos, n_bins] = shape else {
            return Err(ProfileError::DimensionMismatch {
                expected: 3,
                actual: shape.len(),
            });
        };
        let block = n_halos * n_bins;
        if raw.len() != n_variants * block {
            return Err(ProfileError::DimensionMismatch {
                expected: n_variants * block,
                actual: raw.len(),
            });
        }
        Ok((0..n_variants)
            .map(|v| DMatrix::from_row_slice(n_halos, n_bins, &raw[v * block..(v + 1) * block]))
            .collect())
    }
}

/// Source of snapshot catalogues.
pub trait SnapshotReader {
    /// Read the datasets of one snapshot file.
    ///
    /// `GroupLen` is only read when `with_group_len` is set.
    fn read(&self, path: &Path, with_group_len: bool) -> Result<RawSnapshot>;
}

/// Reader for the HDF5 catalogues.
#[cfg(feature = "hdf5")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Hdf5Reader;

#[cfg(feature = "hdf5")]
impl SnapshotReader for Hdf5Reader {
    fn read(&self, path: &Path, with_group_len: bool) -> Result<RawSnapshot> {
        if !path.exists() {
            return Err(ProfileError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Snapshot file not found: {}", path.display()),
            )));
        }
        let file = hdf5::File::open(path)?;

        let group_mass = file.dataset("GroupMass")?.read_raw::<f64>()?;
        let group_len = if with_group_len {
            Some(file.dataset("GroupLen")?.read_raw::<i64>()?)
        } else {
            None
        };
        let r = file.dataset("r")?.read_raw::<f64>()?;

        let dataset = file.dataset("Profiles")?;
        let profiles = RawSnapshot::split_profiles(&dataset.read_raw::<f64>()?, &dataset.shape())?;

        Ok(RawSnapshot {
            group_mass,
            group_len,
            r,
            profiles,
        })
    }
}
