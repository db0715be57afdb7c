//! Chi-squared comparison of mean profiles between two simulations.
//!
//! For the bins usable in both tables, the statistic is
//!
//! ```text
//! chi2 = dx^T (C_fid + C_test)^-1 dx,    dx = mean_test - mean_fid
//! ```
//!
//! where the means and covariances are taken over halos of each table,
//! optionally after a `log10` transform.

use crate::compare::covariance::{column_means, covariance, Scale};
use crate::data::{ProfileTable, GAS_DENSITY};
use crate::error::{ProfileError, Result};
use crate::filter::{filter_mass, BinMask, MassWindow};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use std::borrow::Cow;

/// Settings for a profile comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// log10 of the lower halo-mass bound.
    pub min_log_mass: f64,
    /// log10 of the upper halo-mass bound.
    pub max_log_mass: f64,
    /// Bins with `r >= max_radius` are excluded.
    pub max_radius: f64,
    /// Profile field to compare.
    #[serde(default = "default_field")]
    pub field: String,
    /// Compare in log10 space.
    #[serde(default = "default_true")]
    pub take_log10: bool,
    /// Report halo and bin counts at info level.
    #[serde(default = "default_true")]
    pub verbose: bool,
    /// Restrict both tables to the mass window before computing statistics.
    ///
    /// Off by default: the window is then only reported, and every halo of
    /// each table enters the means and covariances.
    #[serde(default)]
    pub apply_mass_mask: bool,
}

fn default_field() -> String {
    GAS_DENSITY.to_string()
}

fn default_true() -> bool {
    true
}

impl ComparisonConfig {
    /// Configuration with default field, log10 scaling and verbose output.
    pub fn new(min_log_mass: f64, max_log_mass: f64, max_radius: f64) -> Self {
        Self {
            min_log_mass,
            max_log_mass,
            max_radius,
            field: default_field(),
            take_log10: true,
            verbose: true,
            apply_mass_mask: false,
        }
    }

    pub fn with_field(mut self, field: &str) -> Self {
        self.field = field.to_string();
        self
    }

    pub fn with_log10(mut self, take_log10: bool) -> Self {
        self.take_log10 = take_log10;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_mass_mask(mut self, apply_mass_mask: bool) -> Self {
        self.apply_mass_mask = apply_mass_mask;
        self
    }

    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(ProfileError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(ProfileError::from)
    }

    fn validate(&self) -> Result<()> {
        if self.max_radius.is_nan() {
            return Err(ProfileError::InvalidParameter(
                "max_radius must not be NaN".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a profile comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// The chi-squared statistic.
    pub statistic: f64,
    /// Number of bins that entered the statistic.
    pub n_bins: usize,
    /// Number of bins on the radius axis.
    pub n_bins_total: usize,
    /// Selected bins.
    pub bin_mask: BinMask,
    /// Fiducial halos inside the mass window.
    pub n_fiducial_in_window: usize,
    /// Test halos inside the mass window.
    pub n_test_in_window: usize,
    /// Fiducial halos used for the statistics.
    pub n_fiducial_used: usize,
    /// Test halos used for the statistics.
    pub n_test_used: usize,
}

impl ComparisonResult {
    /// Probability of a statistic at least this large for a chi-squared
    /// distribution with `n_bins` degrees of freedom.
    pub fn p_value(&self) -> Result<f64> {
        let dist = ChiSquared::new(self.n_bins as f64)
            .map_err(|e| ProfileError::Numerical(format!("Chi-squared distribution: {}", e)))?;
        Ok(dist.sf(self.statistic))
    }

    /// Reduced statistic (per selected bin).
    pub fn reduced(&self) -> f64 {
        self.statistic / self.n_bins as f64
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl std::fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Profile Comparison")?;
        writeln!(f, "  chi2:             {:.4}", self.statistic)?;
        writeln!(f, "  chi2 / bin:       {:.4}", self.reduced())?;
        writeln!(f, "  Bins:             {} / {}", self.n_bins, self.n_bins_total)?;
        writeln!(
            f,
            "  Fiducial haloes:  {} in window, {} used",
            self.n_fiducial_in_window, self.n_fiducial_used
        )?;
        writeln!(
            f,
            "  Test haloes:      {} in window, {} used",
            self.n_test_in_window, self.n_test_used
        )?;
        Ok(())
    }
}

/// Compute the chi-squared statistic between `test` and `fiducial`.
///
/// Convenience wrapper around [`compare_profiles`] returning only the
/// statistic.
pub fn chi2(test: &ProfileTable, fiducial: &ProfileTable, config: &ComparisonConfig) -> Result<f64> {
    compare_profiles(test, fiducial, config).map(|r| r.statistic)
}

/// Compare the mean profiles of two tables.
///
/// # Arguments
/// * `test` - Profiles of the simulation under test
/// * `fiducial` - Profiles of the reference simulation
/// * `config` - Mass window, radius cutoff, field and scaling
///
/// # Errors
/// * `DimensionMismatch` / `RadiusMismatch` if the radius axes differ
/// * `EmptyData` if no bin survives the selection or a table has fewer
///   than two halos
/// * `Numerical` if there are more selected bins than halo degrees of
///   freedom, or the combined covariance is singular
pub fn compare_profiles(
    test: &ProfileTable,
    fiducial: &ProfileTable,
    config: &ComparisonConfig,
) -> Result<ComparisonResult> {
    config.validate()?;
    let window = MassWindow::from_log10(config.min_log_mass, config.max_log_mass)?;

    let n_fiducial_in_window = window.count(fiducial);
    let n_test_in_window = window.count(test);

    let (fiducial, test) = if config.apply_mass_mask {
        (
            Cow::Owned(filter_mass(fiducial, &window)?),
            Cow::Owned(filter_mass(test, &window)?),
        )
    } else {
        (Cow::Borrowed(fiducial), Cow::Borrowed(test))
    };

    let bin_mask = BinMask::from_tables(&fiducial, &test, &config.field, config.max_radius)?;
    report_counts(
        config.verbose,
        n_fiducial_in_window,
        n_test_in_window,
        &bin_mask,
    );

    let n_bins = bin_mask.n_selected();
    if n_bins == 0 {
        return Err(ProfileError::EmptyData(
            "No radius bins pass the finiteness and radius cuts".to_string(),
        ));
    }

    let scale = Scale::from_log10_flag(config.take_log10);
    let x_fid = scale.apply(&bin_mask.apply(fiducial.field(&config.field)?)?)?;
    let x_test = scale.apply(&bin_mask.apply(test.field(&config.field)?)?)?;

    let combined = covariance(&x_fid)? + covariance(&x_test)?;

    let dof = (x_fid.nrows() - 1) + (x_test.nrows() - 1);
    if n_bins > dof {
        return Err(ProfileError::Numerical(format!(
            "{} bins exceed the {} degrees of freedom of {} + {} halos",
            n_bins,
            dof,
            x_fid.nrows(),
            x_test.nrows()
        )));
    }

    let dx = column_means(&x_test) - column_means(&x_fid);
    let statistic = quadratic_form(combined, &dx)?;

    Ok(ComparisonResult {
        statistic,
        n_bins,
        n_bins_total: bin_mask.len(),
        bin_mask,
        n_fiducial_in_window,
        n_test_in_window,
        n_fiducial_used: x_fid.nrows(),
        n_test_used: x_test.nrows(),
    })
}

/// Smallest accepted ratio of extreme eigenvalues of the combined covariance.
const MIN_RCOND: f64 = 1e-12;

/// `dx^T C^-1 dx` for a symmetric positive-definite `C`, via Cholesky.
fn quadratic_form(combined: DMatrix<f64>, dx: &DVector<f64>) -> Result<f64> {
    let eigenvalues = combined.symmetric_eigenvalues();
    let max = eigenvalues.max();
    let min = eigenvalues.min();
    if !(max > 0.0 && min / max >= MIN_RCOND) {
        return Err(ProfileError::Numerical(format!(
            "Combined covariance matrix is singular (eigenvalues {:e} .. {:e})",
            min, max
        )));
    }

    let cholesky = combined.cholesky().ok_or_else(|| {
        ProfileError::Numerical("Combined covariance matrix is not positive definite".to_string())
    })?;
    let statistic = dx.dot(&cholesky.solve(dx));
    if !statistic.is_finite() || statistic < 0.0 {
        return Err(ProfileError::Numerical(format!(
            "Invalid chi-squared statistic {}",
            statistic
        )));
    }
    Ok(statistic)
}

fn report_counts(verbose: bool, n_fiducial: usize, n_test: usize, bin_mask: &BinMask) {
    let level = if verbose {
        log::Level::Info
    } else {
        log::Level::Debug
    };
    log::log!(level, "{:<25} {}", "Num. fiducial haloes:", n_fiducial);
    log::log!(
        level,
        "{:<25} {} / {}",
        "Num. fiducial bins:",
        bin_mask.n_finite_fiducial,
        bin_mask.len()
    );
    log::log!(level, "{:<25} {}", "Num. test haloes:", n_test);
    log::log!(
        level,
        "{:<25} {} / {}",
        "Num. bins:",
        bin_mask.n_selected(),
        bin_mask.len()
    );
}
