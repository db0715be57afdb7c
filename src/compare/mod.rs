//! Statistical comparison of profile tables.

pub mod chi2;
pub mod covariance;

pub use chi2::{chi2, compare_profiles, ComparisonConfig, ComparisonResult};
pub use covariance::{column_means, covariance, Scale};
