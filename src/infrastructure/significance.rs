//! Significance tests on proportions
//!
//! Provides the chi-square test of independence over `k` proportions (no
//! continuity correction), the p-value of a hypothetical two-arm outcome used
//! by the minimum-significant-lift search, and evaluation of observed counts.

use serde::Serialize;

use crate::domain::experiment::{validate_alpha, validate_counts, validate_sample_size};
use crate::domain::{treated_rate, PowerError, SignificanceResult};
use crate::infrastructure::distributions::chi2_sf;

/// Chi-square statistic, p-value and degrees of freedom of a contingency test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: u32,
}

/// Chi-square test that `k` groups share one success proportion
///
/// `successes[i]` out of `trials[i]`; counts may be fractional.
pub fn proportions_chisquare(successes: &[f64], trials: &[f64]) -> Result<ChiSquareTest, PowerError> {
    if successes.len() != trials.len() {
        return Err(PowerError::validation(format!(
            "{} success counts for {} groups",
            successes.len(),
            trials.len()
        )));
    }

    if successes.len() < 2 {
        return Err(PowerError::validation("at least 2 groups are required"));
    }

    for (&count, &nobs) in successes.iter().zip(trials) {
        if !(nobs > 0.0) || !nobs.is_finite() {
            return Err(PowerError::validation(format!(
                "group size must be positive, got {nobs}"
            )));
        }
        if !(0.0..=nobs).contains(&count) {
            return Err(PowerError::out_of_domain(format!(
                "{count} successes out of {nobs} trials"
            )));
        }
    }

    let degrees_of_freedom = (successes.len() - 1) as u32;
    let pooled = successes.iter().sum::<f64>() / trials.iter().sum::<f64>();

    // Every group at 0% (or 100%): no evidence of a difference
    if pooled <= 0.0 || pooled >= 1.0 {
        return Ok(ChiSquareTest {
            statistic: 0.0,
            p_value: 1.0,
            degrees_of_freedom,
        });
    }

    let statistic: f64 = successes
        .iter()
        .zip(trials)
        .map(|(&count, &nobs)| {
            let expected_success = nobs * pooled;
            let expected_failure = nobs * (1.0 - pooled);
            (count - expected_success).powi(2) / expected_success
                + ((nobs - count) - expected_failure).powi(2) / expected_failure
        })
        .sum();

    Ok(ChiSquareTest {
        statistic,
        p_value: chi2_sf(statistic, f64::from(degrees_of_freedom))?,
        degrees_of_freedom,
    })
}

/// P-value of a two-arm test where `nobs` recipients per arm convert at
/// `rate` and `rate + lift`
pub fn two_proportion_p_value(rate: f64, lift: f64, nobs: f64) -> Result<f64, PowerError> {
    validate_sample_size(nobs)?;
    let treated = treated_rate(rate, lift)?;

    let test = proportions_chisquare(&[rate * nobs, treated * nobs], &[nobs, nobs])?;
    Ok(test.p_value)
}

/// Test observed control and treatment counts at significance level `alpha`
pub fn evaluate_observed(
    control_successes: u64,
    control_trials: u64,
    treatment_successes: u64,
    treatment_trials: u64,
    alpha: f64,
) -> Result<SignificanceResult, PowerError> {
    validate_alpha(alpha)?;
    validate_counts(control_successes, control_trials)?;
    validate_counts(treatment_successes, treatment_trials)?;

    let control_rate = control_successes as f64 / control_trials as f64;
    let treatment_rate = treatment_successes as f64 / treatment_trials as f64;

    let test = proportions_chisquare(
        &[control_successes as f64, treatment_successes as f64],
        &[control_trials as f64, treatment_trials as f64],
    )?;

    Ok(SignificanceResult::new(
        test.statistic,
        test.p_value,
        alpha,
        control_rate,
        treatment_rate,
    ))
}
