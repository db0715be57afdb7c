//! Reading profile catalogues and run parameters from disk.

pub mod layout;
pub mod loader;
pub mod reader;

pub use layout::{LoaderConfig, SuiteLayout, CV_SUITE, PARAMETERS_FILE};
pub use loader::{ProfileLoader, GAS_DENSITY_VARIANT, MASS_UNIT};
#[cfg(feature = "hdf5")]
pub use reader::Hdf5Reader;
pub use reader::{RawSnapshot, SnapshotReader};
