//! On-disk layout of the profile catalogues.
//!
//! ```text
//! <base>/CosmoAstroSeed_params_IllustrisTNG.txt
//! <base>/Profiles/<set>/CV/CV_<i>/<set>_CV_<i>_<snap>.hdf5
//! <base>/Profiles/<set>/<suite>/<suite>_<i>/<set>_<suite>_<i>_<snap>.hdf5
//! ```
//!
//! Snapshot numbers are zero-padded to three digits (033 is z = 0).

use crate::error::{ProfileError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File holding the Latin-Hypercube run parameters.
pub const PARAMETERS_FILE: &str = "CosmoAstroSeed_params_IllustrisTNG.txt";

/// Directory holding the profile catalogues.
const PROFILES_DIR: &str = "Profiles";

/// Suite name of the cosmic-variance runs.
pub const CV_SUITE: &str = "CV";

/// Loader configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Root directory of the catalogues.
    pub base_path: PathBuf,
}

impl LoaderConfig {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(ProfileError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(ProfileError::from)
    }
}

/// Path builder for a catalogue root.
#[derive(Debug, Clone)]
pub struct SuiteLayout {
    base_path: PathBuf,
}

impl SuiteLayout {
    pub fn new(config: &LoaderConfig) -> Self {
        Self {
            base_path: config.base_path.clone(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the parameter table.
    pub fn parameters_path(&self) -> PathBuf {
        self.base_path.join(PARAMETERS_FILE)
    }

    /// Directory holding all runs of a suite.
    pub fn suite_dir(&self, simulation_set: &str, suite: &str) -> PathBuf {
        self.base_path
            .join(PROFILES_DIR)
            .join(simulation_set)
            .join(suite)
    }

    /// Snapshot file of one run.
    pub fn snapshot_path(
        &self,
        simulation_set: &str,
        suite: &str,
        index: usize,
        snapnum: u32,
    ) -> PathBuf {
        self.suite_dir(simulation_set, suite)
            .join(format!("{}_{}", suite, index))
            .join(format!(
                "{}_{}_{}_{:03}.hdf5",
                simulation_set, suite, index, snapnum
            ))
    }

    /// Snapshot file of one cosmic-variance run.
    pub fn cv_path(&self, simulation_set: &str, index: usize, snapnum: u32) -> PathBuf {
        self.snapshot_path(simulation_set, CV_SUITE, index, snapnum)
    }

    /// Indices of the cosmic-variance runs present on disk, sorted numerically.
    pub fn discover_cv_indices(&self, simulation_set: &str) -> Result<Vec<usize>> {
        let dir = self.suite_dir(simulation_set, CV_SUITE);
        let pattern = Regex::new(r"^CV_(\d+)$")
            .map_err(|e| ProfileError::InvalidParameter(format!("CV pattern: {}", e)))?;

        let mut indices = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(caps) = pattern.captures(name) {
                let index = caps[1].parse::<usize>().map_err(|_| {
                    ProfileError::InvalidParameter(format!("CV index out of range: {}", name))
                })?;
                indices.push(index);
            }
        }
        indices.sort_unstable();
        Ok(indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_snapshot_path() {
        let layout = SuiteLayout::new(&LoaderConfig::new("/data/CAMELS"));
        assert_eq!(layout.base_path(), Path::new("/data/CAMELS"));
        let path = layout.snapshot_path("IllustrisTNG", "LH", 42, 33);
        assert_eq!(
            path,
            PathBuf::from("/data/CAMELS/Profiles/IllustrisTNG/LH/LH_42/IllustrisTNG_LH_42_033.hdf5")
        );
    }

    #[test]
    fn test_cv_path_and_parameters() {
        let layout = SuiteLayout::new(&LoaderConfig::new("/data"));
        assert_eq!(
            layout.cv_path("SIMBA", 7, 5),
            PathBuf::from("/data/Profiles/SIMBA/CV/CV_7/SIMBA_CV_7_005.hdf5")
        );
        assert_eq!(
            layout.parameters_path(),
            PathBuf::from("/data/CosmoAstroSeed_params_IllustrisTNG.txt")
        );
    }

    #[test]
    fn test_discover_cv_indices() {
        let dir = tempdir().unwrap();
        let cv_dir = dir.path().join("Profiles").join("IllustrisTNG").join("CV");
        for name in ["CV_10", "CV_2", "CV_0", "CV_x", "notes"] {
            fs::create_dir_all(cv_dir.join(name)).unwrap();
        }

        let layout = SuiteLayout::new(&LoaderConfig::new(dir.path()));
        assert_eq!(layout.discover_cv_indices("IllustrisTNG").unwrap(), vec![0, 2, 10]);
    }

    #[test]
    fn test_discover_missing_dir() {
        let dir = tempdir().unwrap();
        let layout = SuiteLayout::new(&LoaderConfig::new(dir.path()));
        assert!(matches!(
            layout.discover_cv_indices("Astrid"),
            Err(ProfileError::Io(_))
        ));
    }

    #[test]
    fn test_config_yaml() {
        let config = LoaderConfig::from_yaml("base_path: /mnt/camels\n").unwrap();
        assert_eq!(config.base_path, PathBuf::from("/mnt/camels"));
        assert_eq!(LoaderConfig::from_yaml(&config.to_yaml().unwrap()).unwrap(), config);
    }
}
