//! Halo and radius-bin selection for profile tables.

pub mod bins;
pub mod mass;

pub use bins::BinMask;
pub use mass::{filter_mass, MassWindow};
