//! Per-halo radial profile tables.

use crate::error::{ProfileError, Result};
use nalgebra::DMatrix;
use std::collections::BTreeMap;

/// Name of the gas-density profile field.
pub const GAS_DENSITY: &str = "GasDensity";

/// Relative tolerance used when deciding whether two radius axes agree.
const RADIUS_RTOL: f64 = 1e-12;

/// Radial profiles for a set of halos.
///
/// Every field is stored as a dense `n_halos × n_bins` matrix; rows are halos
/// and columns follow the shared radius axis `r`. Missing data is NaN.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    /// Halo masses in physical units.
    group_mass: Vec<f64>,
    /// Particle counts per halo, when the source provides them.
    group_len: Option<Vec<i64>>,
    /// Radius bins shared by all halos.
    r: Vec<f64>,
    /// Named profile fields (halos × bins).
    fields: BTreeMap<String, DMatrix<f64>>,
}

impl ProfileTable {
    /// Create a table with no profile fields.
    pub fn new(group_mass: Vec<f64>, r: Vec<f64>) -> Self {
        Self {
            group_mass,
            group_len: None,
            r,
            fields: BTreeMap::new(),
        }
    }

    /// Attach a named profile field.
    ///
    /// The field must have one row per halo and one column per radius bin.
    pub fn with_field(mut self, name: &str, values: DMatrix<f64>) -> Result<Self> {
        check_shape(&values, self.n_halos(), self.n_bins())?;
        self.fields.insert(name.to_string(), values);
        Ok(self)
    }

    /// Attach per-halo particle counts.
    pub fn with_group_len(mut self, group_len: Vec<i64>) -> Result<Self> {
        if group_len.len() != self.n_halos() {
            return Err(ProfileError::DimensionMismatch {
                expected: self.n_halos(),
                actual: group_len.len(),
            });
        }
        self.group_len = Some(group_len);
        Ok(self)
    }

    /// Number of halos (rows).
    #[inline]
    pub fn n_halos(&self) -> usize {
        self.group_mass.len()
    }

    /// Number of radius bins (columns).
    #[inline]
    pub fn n_bins(&self) -> usize {
        self.r.len()
    }

    #[inline]
    pub fn group_mass(&self) -> &[f64] {
        &self.group_mass
    }

    #[inline]
    pub fn group_len(&self) -> Option<&[i64]> {
        self.group_len.as_deref()
    }

    #[inline]
    pub fn r(&self) -> &[f64] {
        &self.r
    }

    /// Look up a profile field by name.
    pub fn field(&self, name: &str) -> Result<&DMatrix<f64>> {
        self.fields
            .get(name)
            .ok_or_else(|| ProfileError::MissingField(name.to_string()))
    }

    /// Names of the stored fields, in sorted order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().map(|s| s.as_str())
    }

    /// Replace zero entries of a field with NaN.
    ///
    /// A zero in the raw profiles means the bin holds no particles, not that
    /// the density vanishes.
    pub fn mask_zeros(mut self, name: &str) -> Result<Self> {
        let values = self
            .fields
            .get_mut(name)
            .ok_or_else(|| ProfileError::MissingField(name.to_string()))?;
        values.apply(|x| {
            if *x == 0.0 {
                *x = f64::NAN;
            }
        });
        Ok(self)
    }

    /// Check that another table uses the same radius axis.
    pub fn check_radius_axis(&self, other: &ProfileTable) -> Result<()> {
        if self.n_bins() != other.n_bins() {
            return Err(ProfileError::DimensionMismatch {
                expected: self.n_bins(),
                actual: other.n_bins(),
            });
        }
        for (k, (&a, &b)) in self.r.iter().zip(other.r.iter()).enumerate() {
            let scale = a.abs().max(b.abs());
            if (a - b).abs() > RADIUS_RTOL * scale {
                return Err(ProfileError::RadiusMismatch(format!(
                    "bin {} has r = {} vs r = {}",
                    k, a, b
                )));
            }
        }
        Ok(())
    }

    /// Subset the table to the given halos (by index).
    pub fn subset_halos(&self, indices: &[usize]) -> Result<Self> {
        for &i in indices {
            if i >= self.n_halos() {
                return Err(ProfileError::InvalidParameter(format!(
                    "Halo index {} out of bounds",
                    i
                )));
            }
        }

        let group_mass = indices.iter().map(|&i| self.group_mass[i]).collect();
        let group_len = self
            .group_len
            .as_ref()
            .map(|len| indices.iter().map(|&i| len[i]).collect());
        let fields = self
            .fields
            .iter()
            .map(|(name, values)| (name.clone(), values.select_rows(indices)))
            .collect();

        Ok(Self {
            group_mass,
            group_len,
            r: self.r.clone(),
            fields,
        })
    }

    /// Stack several tables halo-wise.
    ///
    /// All tables must share the radius axis and carry the same fields.
    /// `GroupLen` survives only if every table has it.
    pub fn concat(tables: &[ProfileTable]) -> Result<Self> {
        let first = tables
            .first()
            .ok_or_else(|| ProfileError::EmptyData("No tables to concatenate".to_string()))?;

        for table in &tables[1..] {
            first.check_radius_axis(table)?;
            if table.fields.len() != first.fields.len()
                || !table.fields.keys().all(|k| first.fields.contains_key(k))
            {
                return Err(ProfileError::InvalidParameter(
                    "Tables carry different profile fields".to_string(),
                ));
            }
        }

        let n_halos: usize = tables.iter().map(|t| t.n_halos()).sum();
        let n_bins = first.n_bins();

        let group_mass: Vec<f64> = tables
            .iter()
            .flat_map(|t| t.group_mass.iter().copied())
            .collect();
        let group_len: Option<Vec<i64>> = tables
            .iter()
            .map(|t| t.group_len.clone())
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.concat());

        let mut fields = BTreeMap::new();
        for name in first.fields.keys() {
            let mut stacked = DMatrix::zeros(n_halos, n_bins);
            let mut offset = 0;
            for table in tables {
                let part = &table.fields[name];
                stacked
                    .rows_mut(offset, part.nrows())
                    .copy_from(part);
                offset += part.nrows();
            }
            fields.insert(name.clone(), stacked);
        }

        Ok(Self {
            group_mass,
            group_len,
            r: first.r.clone(),
            fields,
        })
    }
}

fn check_shape(values: &DMatrix<f64>, n_halos: usize, n_bins: usize) -> Result<()> {
    if values.nrows() != n_halos {
        return Err(ProfileError::DimensionMismatch {
            expected: n_halos,
            actual: values.nrows(),
        });
    }
    if values.ncols() != n_bins {
        return Err(ProfileError::DimensionMismatch {
            expected: n_bins,
            actual: values.ncols(),
        });
    }
    Ok(())
}
