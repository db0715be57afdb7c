//! Halo selection by mass.

use crate::data::ProfileTable;
use crate::error::{ProfileError, Result};
use serde::{Deserialize, Serialize};

/// Closed halo-mass interval `[10^min_log_mass, 10^max_log_mass]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassWindow {
    /// Lower bound in physical mass units.
    pub min_mass: f64,
    /// Upper bound in physical mass units.
    pub max_mass: f64,
}

impl MassWindow {
    /// Build a window from base-10 logarithmic bounds.
    pub fn from_log10(min_log_mass: f64, max_log_mass: f64) -> Result<Self> {
        if !min_log_mass.is_finite() || !max_log_mass.is_finite() {
            return Err(ProfileError::InvalidParameter(
                "Mass window bounds must be finite".to_string(),
            ));
        }
        if max_log_mass < min_log_mass {
            return Err(ProfileError::InvalidParameter(
                "max_log_mass cannot be less than min_log_mass".to_string(),
            ));
        }
        Ok(Self {
            min_mass: 10f64.powf(min_log_mass),
            max_mass: 10f64.powf(max_log_mass),
        })
    }

    /// Whether a mass lies inside the window (both ends inclusive).
    #[inline]
    pub fn contains(&self, mass: f64) -> bool {
        mass >= self.min_mass && mass <= self.max_mass
    }

    /// Boolean mask over the given masses.
    pub fn mask(&self, masses: &[f64]) -> Vec<bool> {
        masses.iter().map(|&m| self.contains(m)).collect()
    }

    /// Indices of the masses inside the window.
    pub fn select(&self, masses: &[f64]) -> Vec<usize> {
        masses
            .iter()
            .enumerate()
            .filter(|(_, &m)| self.contains(m))
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of halos of a table inside the window.
    pub fn count(&self, table: &ProfileTable) -> usize {
        table.group_mass().iter().filter(|&&m| self.contains(m)).count()
    }
}

/// Keep only halos whose mass lies inside the window.
pub fn filter_mass(table: &ProfileTable, window: &MassWindow) -> Result<ProfileTable> {
    let keep_indices = window.select(table.group_mass());

    if keep_indices.is_empty() {
        return Err(ProfileError::EmptyData(format!(
            "No halos with mass between {:.3e} and {:.3e}",
            window.min_mass, window.max_mass
        )));
    }

    table.subset_halos(&keep_indices)
}
