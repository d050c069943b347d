//! Power of the two-sample t-test on a standardized effect

use crate::domain::experiment::{validate_alpha, validate_sample_size};
use crate::domain::{ExperimentFamily, PowerAnalysis, PowerError};
use crate::infrastructure::distributions::{noncentral_t_cdf, noncentral_t_sf, t_isf};

/// Two-sided independent two-sample t-test with equal arms
///
/// `nobs` is the size of each arm, so the test has `2 * nobs - 2` degrees of
/// freedom and non-centrality `effect_size * sqrt(nobs / 2)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TTestIndPower;

impl TTestIndPower {
    pub fn new() -> Self {
        Self
    }
}

impl PowerAnalysis for TTestIndPower {
    fn family(&self) -> ExperimentFamily {
        ExperimentFamily::NormalApproxProportion
    }

    fn min_sample_size(&self) -> f64 {
        2.0
    }

    fn power(&self, effect_size: f64, nobs: f64, alpha: f64) -> Result<f64, PowerError> {
        validate_alpha(alpha)?;
        validate_sample_size(nobs)?;

        if nobs < self.min_sample_size() {
            return Err(PowerError::validation(format!(
                "t-test needs at least 2 observations per arm, got {nobs}"
            )));
        }

        let df = 2.0 * nobs - 2.0;
        let noncentrality = effect_size.abs() * (nobs / 2.0).sqrt();
        let critical = t_isf(alpha / 2.0, df)?;

        let upper = noncentral_t_sf(critical, df, noncentrality)?;
        let lower = noncentral_t_cdf(-critical, df, noncentrality)?;

        Ok((upper + lower).clamp(0.0, 1.0))
    }
}
