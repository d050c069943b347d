//! Experiment parameter validation utilities

use thiserror::Error;

/// Maximum number of arms supported by the chi-square goodness-of-fit family
pub const MAX_ARMS: u32 = 20;

/// Validation errors for experiment parameters
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParameterValidationError {
    #[error("Rate must be in [0, 1), got {0}")]
    RateOutOfRange(f64),

    #[error("Significance level must be in (0, 1), got {0}")]
    AlphaOutOfRange(f64),

    #[error("Power must be in (0, 1), got {0}")]
    PowerOutOfRange(f64),

    #[error("Sample size must be positive and finite, got {0}")]
    InvalidSampleSize(f64),

    #[error("Lift must be finite, got {0}")]
    InvalidLift(f64),

    #[error("Experiment needs between 2 and {max} arms, got {got}")]
    InvalidArmCount { got: u32, max: u32 },

    #[error("Normal approximation family supports exactly 2 arms, got {0}")]
    UnsupportedArmCount(u32),

    #[error("Trial count must be positive, got {0}")]
    EmptyArm(u64),

    #[error("Successes ({successes}) exceed trials ({trials})")]
    SuccessesExceedTrials { successes: u64, trials: u64 },
}

/// Validate a baseline rate
pub fn validate_rate(rate: f64) -> Result<(), ParameterValidationError> {
    if !rate.is_finite() || !(0.0..1.0).contains(&rate) {
        return Err(ParameterValidationError::RateOutOfRange(rate));
    }

    Ok(())
}

/// Validate a significance level
pub fn validate_alpha(alpha: f64) -> Result<(), ParameterValidationError> {
    if !is_open_unit(alpha) {
        return Err(ParameterValidationError::AlphaOutOfRange(alpha));
    }

    Ok(())
}

/// Validate a target power
pub fn validate_power(power: f64) -> Result<(), ParameterValidationError> {
    if !is_open_unit(power) {
        return Err(ParameterValidationError::PowerOutOfRange(power));
    }

    Ok(())
}

/// Validate a per-arm sample size
pub fn validate_sample_size(nobs: f64) -> Result<(), ParameterValidationError> {
    if !nobs.is_finite() || nobs <= 0.0 {
        return Err(ParameterValidationError::InvalidSampleSize(nobs));
    }

    Ok(())
}

pub fn validate_lift(lift: f64) -> Result<(), ParameterValidationError> {
    if !lift.is_finite() {
        return Err(ParameterValidationError::InvalidLift(lift));
    }

    Ok(())
}

/// Validate the number of arms of a chi-square experiment
pub fn validate_arms(arms: u32) -> Result<(), ParameterValidationError> {
    if !(2..=MAX_ARMS).contains(&arms) {
        return Err(ParameterValidationError::InvalidArmCount {
            got: arms,
            max: MAX_ARMS,
        });
    }

    Ok(())
}

/// Validate observed counts for one arm
pub fn validate_counts(successes: u64, trials: u64) -> Result<(), ParameterValidationError> {
    if trials == 0 {
        return Err(ParameterValidationError::EmptyArm(trials));
    }

    if successes > trials {
        return Err(ParameterValidationError::SuccessesExceedTrials { successes, trials });
    }

    Ok(())
}

fn is_open_unit(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value < 1.0
}
