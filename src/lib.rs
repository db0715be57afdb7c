//! Radial Gas-Density Profile Comparison for CAMELS
//!
//! This library loads per-halo radial profiles extracted from the CAMELS
//! simulation suites and compares them between simulations.
//!
//! # Overview
//!
//! - **data**: Core data structures (ProfileTable, ParameterTable)
//! - **filter**: Halo selection by mass, radius-bin selection
//! - **compare**: Chi-squared comparison of mean profiles
//! - **summary**: Percentile bands across halos
//! - **io**: Catalogue layout, snapshot readers and the profile loader
//!
//! # Example
//!
//! ```no_run
//! use camels_profiles::prelude::*;
//! # fn load(loader: &ProfileLoader<impl SnapshotReader>) -> Result<()> {
//! let fiducial = loader.read_cv("IllustrisTNG", 33)?;
//! let test = loader.read_single(0, "IllustrisTNG", "LH", 33)?;
//!
//! let config = ComparisonConfig::new(12.5, 13.5, 1.0);
//! let result = compare_profiles(&test, &fiducial, &config)?;
//! println!("{}", result);
//! # Ok(())
//! # }
//! ```

pub mod compare;
pub mod data;
pub mod error;
pub mod filter;
pub mod io;
pub mod summary;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::compare::{chi2, compare_profiles, ComparisonConfig, ComparisonResult, Scale};
    pub use crate::data::{ParameterTable, ProfileTable, GAS_DENSITY, LH_PREFIX};
    pub use crate::error::{ProfileError, Result};
    pub use crate::filter::{filter_mass, BinMask, MassWindow};
    #[cfg(feature = "hdf5")]
    pub use crate::io::Hdf5Reader;
    pub use crate::io::{LoaderConfig, ProfileLoader, RawSnapshot, SnapshotReader, SuiteLayout};
    pub use crate::summary::{profile_percentiles, PercentileBands, DEFAULT_PERCENTILES};
}
