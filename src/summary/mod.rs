//! Summaries of profiles across halos.

pub mod percentile;

pub use percentile::{profile_percentiles, PercentileBands, DEFAULT_PERCENTILES};
