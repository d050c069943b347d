//! Power analysis seam
//!
//! A [`PowerAnalysis`] knows the forward power function of one test family.
//! Both forward inversions (effect size to sample size, sample size to effect
//! size) are solved here by bisection on that monotone function; inverting an
//! effect size back to a lift is the root finder's job.

use super::error::PowerError;
use super::experiment::{validate_alpha, validate_power, validate_sample_size, ExperimentFamily};
use super::solver::{bisect, BISECTION_MAX_ITERATIONS, BISECTION_TOLERANCE};

/// Largest standardized effect considered when bracketing an effect-size solve
pub const MAX_EFFECT_SIZE: f64 = 1024.0;

/// Power function of a statistical test family
#[cfg_attr(test, mockall::automock)]
pub trait PowerAnalysis: Send + Sync {
    /// Family this analysis models
    fn family(&self) -> ExperimentFamily;

    /// Smallest sample size the power function accepts
    fn min_sample_size(&self) -> f64;

    /// Probability of rejecting the null for `|effect_size|` at `nobs` and `alpha`
    fn power(&self, effect_size: f64, nobs: f64, alpha: f64) -> Result<f64, PowerError>;

    /// Sample size that reaches `power`, or `NoSolution` above `ceiling`
    fn required_sample_size(
        &self,
        effect_size: f64,
        power: f64,
        alpha: f64,
        ceiling: f64,
    ) -> Result<f64, PowerError> {
        validate_power(power)?;
        validate_alpha(alpha)?;

        let effect = effect_size.abs();
        let lower = self.min_sample_size();

        if ceiling.is_nan() || ceiling <= lower {
            return Err(PowerError::validation(format!(
                "sample size ceiling {ceiling} must exceed {lower}"
            )));
        }

        let gap = |nobs: f64| -> Result<f64, PowerError> {
            Ok(self.power(effect, nobs, alpha)? - power)
        };

        if gap(ceiling)? < 0.0 {
            return Err(PowerError::no_solution(effect, ceiling));
        }

        if gap(lower)? >= 0.0 {
            return Ok(lower);
        }

        bisect(
            gap,
            lower,
            ceiling,
            BISECTION_TOLERANCE,
            BISECTION_MAX_ITERATIONS,
        )
    }

    /// Smallest effect size that reaches `power` at `nobs`
    fn known_effect_for_sample_size(
        &self,
        nobs: f64,
        power: f64,
        alpha: f64,
    ) -> Result<f64, PowerError> {
        validate_sample_size(nobs)?;
        validate_power(power)?;
        validate_alpha(alpha)?;

        if nobs < self.min_sample_size() {
            return Err(PowerError::validation(format!(
                "sample size {nobs} is below the minimum of {}",
                self.min_sample_size()
            )));
        }

        let gap = |effect: f64| -> Result<f64, PowerError> {
            Ok(self.power(effect, nobs, alpha)? - power)
        };

        if gap(0.0)? >= 0.0 {
            return Ok(0.0);
        }

        let mut upper = 1.0;
        while gap(upper)? < 0.0 {
            upper *= 2.0;
            if upper > MAX_EFFECT_SIZE {
                return Err(PowerError::distribution(format!(
                    "power {power} is not reached at {nobs} observations"
                )));
            }
        }

        bisect(
            gap,
            0.0,
            upper,
            BISECTION_TOLERANCE,
            BISECTION_MAX_ITERATIONS,
        )
    }
}
