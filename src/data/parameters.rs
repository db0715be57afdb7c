//! Cosmological and astrophysical parameters of the simulation runs.
//!
//! The suite ships its run parameters as a fixed-width text table:
//!
//! ```text
//! +---------+---------+----------+------+
//! | Name    | Omega_m | sigma_8  | Seed |
//! +---------+---------+----------+------+
//! | LH_0    | 0.3090  | 0.9790   | 10   |
//! | CV_0    | 0.3000  | 0.8000   | 11   |
//! +---------+---------+----------+------+
//! ```
//!
//! Border lines start with `+`, header and data lines with `|`.

use crate::error::{ProfileError, Result};
use nalgebra::DMatrix;
use std::fs;
use std::path::Path;

/// Column holding the run name.
pub const NAME_COLUMN: &str = "Name";

/// Prefix identifying Latin-Hypercube runs.
pub const LH_PREFIX: &str = "LH";

/// Parameter values of the Latin-Hypercube runs.
#[derive(Debug, Clone)]
pub struct ParameterTable {
    /// Run names, one per row.
    names: Vec<String>,
    /// Numeric column names in file order (without `Name`).
    column_names: Vec<String>,
    /// Values (runs × columns).
    values: DMatrix<f64>,
}

impl ParameterTable {
    /// Read a parameter table from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse_str(&text)
    }

    /// Parse a parameter table from text.
    ///
    /// Every column other than `Name` must be numeric. Only rows whose name
    /// starts with [`LH_PREFIX`] are kept.
    pub fn parse_str(text: &str) -> Result<Self> {
        let mut header: Option<Vec<String>> = None;
        let mut rows: Vec<Vec<String>> = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.starts_with('+') {
                continue;
            }
            if !line.starts_with('|') {
                continue;
            }
            let items: Vec<String> = line
                .trim_matches('|')
                .split('|')
                .map(|item| item.trim().to_string())
                .collect();
            if let Some(h) = &header {
                if items.len() != h.len() {
                    return Err(ProfileError::DimensionMismatch {
                        expected: h.len(),
                        actual: items.len(),
                    });
                }
                rows.push(items);
            } else {
                header = Some(items);
            }
        }

        let header = header
            .ok_or_else(|| ProfileError::EmptyData("No header line in parameter table".to_string()))?;
        let name_idx = header
            .iter()
            .position(|h| h == NAME_COLUMN)
            .ok_or_else(|| ProfileError::MissingColumn(NAME_COLUMN.to_string()))?;

        let numeric_idx: Vec<usize> = (0..header.len()).filter(|&i| i != name_idx).collect();
        let column_names: Vec<String> = numeric_idx.iter().map(|&i| header[i].clone()).collect();

        // Coerce every row before the LH filter.
        let mut parsed: Vec<(String, Vec<f64>)> = Vec::with_capacity(rows.len());
        for (row_idx, row) in rows.iter().enumerate() {
            let values = numeric_idx
                .iter()
                .map(|&i| {
                    row[i].parse::<f64>().map_err(|_| ProfileError::InvalidNumber {
                        value: row[i].clone(),
                        row: row_idx,
                        column: header[i].clone(),
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            parsed.push((row[name_idx].clone(), values));
        }

        let (names, data): (Vec<String>, Vec<Vec<f64>>) = parsed
            .into_iter()
            .filter(|(name, _)| name.starts_with(LH_PREFIX))
            .unzip();

        let flat: Vec<f64> = data.concat();
        let values = DMatrix::from_row_slice(names.len(), column_names.len(), &flat);

        Ok(Self {
            names,
            column_names,
            values,
        })
    }

    /// Number of runs (rows).
    pub fn n_rows(&self) -> usize {
        self.names.len()
    }

    /// Run names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Numeric column names.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Underlying values matrix (runs × columns).
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Get all values of a column.
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(name)?;
        Ok(self.values.column(idx).iter().copied().collect())
    }

    /// Get a single value by run name and column name.
    pub fn get(&self, run: &str, column: &str) -> Option<f64> {
        let row = self.names.iter().position(|n| n == run)?;
        let col = self.column_names.iter().position(|c| c == column)?;
        Some(self.values[(row, col)])
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.column_names
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ProfileError::MissingColumn(name.to_string()))
    }

    /// Write the table as CSV with a leading `Name` column.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;

        let mut header = vec![NAME_COLUMN.to_string()];
        header.extend(self.column_names.iter().cloned());
        writer.write_record(&header)?;

        for (row, name) in self.names.iter().enumerate() {
            let mut record = vec![name.clone()];
            record.extend(self.values.row(row).iter().map(|v| v.to_string()));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
