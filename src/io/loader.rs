//! Loading profile tables from the catalogue tree.

use crate::data::{ParameterTable, ProfileTable, GAS_DENSITY};
use crate::error::{ProfileError, Result};
use crate::io::layout::{LoaderConfig, SuiteLayout};
use crate::io::reader::{RawSnapshot, SnapshotReader};
use std::path::Path;

/// Catalogue masses are stored in units of 1e10 Msun/h.
pub const MASS_UNIT: f64 = 1e10;

/// Index of the gas-density variant in the `Profiles` dataset.
pub const GAS_DENSITY_VARIANT: usize = 0;

/// Loads profile tables from one catalogue root.
#[derive(Debug, Clone)]
pub struct ProfileLoader<R> {
    layout: SuiteLayout,
    reader: R,
}

#[cfg(feature = "hdf5")]
impl ProfileLoader<crate::io::reader::Hdf5Reader> {
    /// Loader reading HDF5 catalogues under the configured root.
    pub fn hdf5(config: &LoaderConfig) -> Self {
        Self::new(config, crate::io::reader::Hdf5Reader)
    }
}

impl<R: SnapshotReader> ProfileLoader<R> {
    pub fn new(config: &LoaderConfig, reader: R) -> Self {
        Self {
            layout: SuiteLayout::new(config),
            reader,
        }
    }

    pub fn layout(&self) -> &SuiteLayout {
        &self.layout
    }

    /// Read every cosmic-variance run of a simulation set into one table.
    ///
    /// Halos are concatenated in increasing run index. All runs must share
    /// the radius axis. `GroupLen` is not read.
    pub fn read_cv(&self, simulation_set: &str, snapnum: u32) -> Result<ProfileTable> {
        let indices = self.layout.discover_cv_indices(simulation_set)?;
        if indices.is_empty() {
            return Err(ProfileError::EmptyData(format!(
                "No CV runs found for {}",
                simulation_set
            )));
        }
        log::info!(
            "Reading {} CV files for {} (snapshot {:03})",
            indices.len(),
            simulation_set,
            snapnum
        );

        let tables = indices
            .iter()
            .map(|&i| {
                let path = self.layout.cv_path(simulation_set, i, snapnum);
                self.read_table(&path, false)
            })
            .collect::<Result<Vec<_>>>()?;

        let table = ProfileTable::concat(&tables)?.mask_zeros(GAS_DENSITY)?;
        log::info!(
            "Loaded {} halos × {} bins from {} CV runs",
            table.n_halos(),
            table.n_bins(),
            tables.len()
        );
        Ok(table)
    }

    /// Read a single run of a suite, including `GroupLen`.
    pub fn read_single(
        &self,
        index: usize,
        simulation_set: &str,
        suite: &str,
        snapnum: u32,
    ) -> Result<ProfileTable> {
        let path = self.layout.snapshot_path(simulation_set, suite, index, snapnum);
        self.read_table(&path, true)?.mask_zeros(GAS_DENSITY)
    }

    /// Read the Latin-Hypercube parameter table of the catalogue.
    pub fn read_lh_parameters(&self) -> Result<ParameterTable> {
        let path = self.layout.parameters_path();
        log::debug!("Reading parameters from {}", path.display());
        ParameterTable::from_file(path)
    }

    /// Read one file into a table with physical masses and the gas density.
    fn read_table(&self, path: &Path, with_group_len: bool) -> Result<ProfileTable> {
        let raw = self.reader.read(path, with_group_len)?;
        log::debug!("Read {} halos from {}", raw.n_halos(), path.display());
        raw_to_table(raw)
    }
}

fn raw_to_table(raw: RawSnapshot) -> Result<ProfileTable> {
    let n_variants = raw.profiles.len();
    let density = raw
        .profiles
        .into_iter()
        .nth(GAS_DENSITY_VARIANT)
        .ok_or(ProfileError::DimensionMismatch {
            expected: GAS_DENSITY_VARIANT + 1,
            actual: n_variants,
        })?;

    let group_mass = raw.group_mass.iter().map(|m| m * MASS_UNIT).collect();
    let table = ProfileTable::new(group_mass, raw.r).with_field(GAS_DENSITY, density)?;
    match raw.group_len {
        Some(len) => table.with_group_len(len),
        None => Ok(table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::layout::CV_SUITE;
    use nalgebra::DMatrix;
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    /// Serves snapshots from memory, keyed by path.
    struct MemoryReader {
        files: HashMap<PathBuf, RawSnapshot>,
    }

    impl SnapshotReader for MemoryReader {
        fn read(&self, path: &Path, with_group_len: bool) -> Result<RawSnapshot> {
            let mut raw = self.files.get(path).cloned().ok_or_else(|| {
                ProfileError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    path.display().to_string(),
                ))
            })?;
            if !with_group_len {
                raw.group_len = None;
            }
            Ok(raw)
        }
    }

    fn snapshot(masses: &[f64], first_density: f64, r: &[f64]) -> RawSnapshot {
        let n = masses.len();
        let density = DMatrix::from_fn(n, r.len(), |i, k| {
            if i == 0 && k == 0 {
                0.0
            } else {
                first_density + (i * 10 + k) as f64
            }
        });
        let temperature = DMatrix::from_element(n, r.len(), -1.0);
        RawSnapshot {
            group_mass: masses.to_vec(),
            group_len: Some((0..n as i64).map(|i| 100 + i).collect()),
            r: r.to_vec(),
            profiles: vec![density, temperature],
        }
    }

    fn setup(cv_indices: &[usize]) -> (TempDir, ProfileLoader<MemoryReader>) {
        let dir = tempdir().unwrap();
        let config = LoaderConfig::new(dir.path());
        let layout = SuiteLayout::new(&config);
        let r = [0.1, 0.2, 0.3];

        let mut files = HashMap::new();
        for &i in cv_indices {
            let path = layout.cv_path("IllustrisTNG", i, 33);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            files.insert(path, snapshot(&[1.0 + i as f64, 2.0], 1000.0 * i as f64 + 1.0, &r));
        }
        files.insert(
            layout.snapshot_path("IllustrisTNG", "LH", 5, 33),
            snapshot(&[0.5, 3.0, 40.0], 1.0, &r),
        );

        (dir, ProfileLoader::new(&config, MemoryReader { files }))
    }

    #[test]
    fn test_read_single() {
        let (_dir, loader) = setup(&[]);
        let table = loader.read_single(5, "IllustrisTNG", "LH", 33).unwrap();

        assert_eq!(table.n_halos(), 3);
        assert_eq!(table.n_bins(), 3);
        assert_eq!(table.group_mass(), &[0.5e10, 3e10, 40e10]);
        assert_eq!(table.group_len(), Some(&[100, 101, 102][..]));

        let density = table.field(GAS_DENSITY).unwrap();
        assert!(density[(0, 0)].is_nan());
        assert_eq!(density[(1, 2)], 13.0);
    }

    #[test]
    fn test_read_single_missing_file() {
        let (_dir, loader) = setup(&[]);
        assert!(matches!(
            loader.read_single(6, "IllustrisTNG", "LH", 33),
            Err(ProfileError::Io(_))
        ));
    }

    #[test]
    fn test_read_cv_concatenates_in_index_order() {
        let (_dir, loader) = setup(&[10, 0, 2]);
        let table = loader.read_cv("IllustrisTNG", 33).unwrap();

        assert_eq!(table.n_halos(), 6);
        assert!(table.group_len().is_none());
        assert_eq!(
            table.group_mass(),
            &[1e10, 2e10, 3e10, 2e10, 11e10, 2e10]
        );

        let density = table.field(GAS_DENSITY).unwrap();
        // First halo of every run has its innermost bin zeroed.
        assert!(density[(0, 0)].is_nan());
        assert!(density[(2, 0)].is_nan());
        assert!(density[(4, 0)].is_nan());
        assert_eq!(density[(3, 0)], 2011.0);
        assert_eq!(density[(5, 1)], 10012.0);
    }

    #[test]
    fn test_read_cv_without_runs() {
        let (_dir, loader) = setup(&[]);
        fs::create_dir_all(loader.layout().suite_dir("IllustrisTNG", CV_SUITE)).unwrap();
        assert!(matches!(
            loader.read_cv("IllustrisTNG", 33),
            Err(ProfileError::EmptyData(_))
        ));
    }

    #[test]
    fn test_read_lh_parameters() {
        let (dir, loader) = setup(&[]);
        fs::write(
            dir.path().join("CosmoAstroSeed_params_IllustrisTNG.txt"),
            "+----+---+\n| Name | Omega_m |\n+----+---+\n| LH_0 | 0.3 |\n| CV_0 | 0.3 |\n",
        )
        .unwrap();

        let params = loader.read_lh_parameters().unwrap();
        assert_eq!(params.names(), &["LH_0"]);
        assert_eq!(params.column("Omega_m").unwrap(), vec![0.3]);
    }

    #[test]
    fn test_missing_density_variant() {
        let raw = RawSnapshot {
            group_mass: vec![1.0],
            group_len: None,
            r: vec![0.1],
            profiles: vec![],
        };
        assert!(matches!(
            raw_to_table(raw),
            Err(ProfileError::DimensionMismatch { .. })
        ));
    }
}
