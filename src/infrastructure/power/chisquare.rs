//! Power of the chi-square goodness-of-fit test

use crate::domain::experiment::{validate_alpha, validate_arms, validate_sample_size};
use crate::domain::{ExperimentFamily, PowerAnalysis, PowerError};
use crate::infrastructure::distributions::{chi2_isf, noncentral_chi2_sf};

/// Goodness-of-fit chi-square power over `n_bins` cells
///
/// Under the alternative the statistic follows a non-central chi-square with
/// `n_bins - 1` degrees of freedom and non-centrality `effect_size^2 * nobs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GofChisquarePower {
    n_bins: u32,
}

impl GofChisquarePower {
    pub fn new(n_bins: u32) -> Result<Self, PowerError> {
        validate_arms(n_bins)?;
        Ok(Self { n_bins })
    }

    pub fn n_bins(&self) -> u32 {
        self.n_bins
    }

    fn degrees_of_freedom(&self) -> f64 {
        f64::from(self.n_bins - 1)
    }
}

impl PowerAnalysis for GofChisquarePower {
    fn family(&self) -> ExperimentFamily {
        ExperimentFamily::ChiSquareGoodnessOfFit
    }

    fn min_sample_size(&self) -> f64 {
        1.0
    }

    fn power(&self, effect_size: f64, nobs: f64, alpha: f64) -> Result<f64, PowerError> {
        validate_alpha(alpha)?;
        validate_sample_size(nobs)?;

        let df = self.degrees_of_freedom();
        let critical = chi2_isf(alpha, df)?;
        let noncentrality = effect_size * effect_size * nobs;

        noncentral_chi2_sf(critical, df, noncentrality)
    }
}
