//! Data structures for halo profiles and run parameters.

mod parameters;
mod profile_table;

pub use parameters::{ParameterTable, LH_PREFIX, NAME_COLUMN};
pub use profile_table::{ProfileTable, GAS_DENSITY};
