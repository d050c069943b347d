use thiserror::Error;

use super::experiment::ParameterValidationError;

/// Errors produced by the power and significance computations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PowerError {
    #[error("Out of domain: {message}")]
    OutOfDomain { message: String },

    #[error("No solution: effect size {effect_size} needs more than {ceiling} observations")]
    NoSolution { effect_size: f64, ceiling: f64 },

    #[error(
        "No solution: target {target} lies beyond {boundary_value}, \
         the value at the edge of the valid lift range"
    )]
    OutOfReach { target: f64, boundary_value: f64 },

    #[error(
        "Root finder did not converge after {iterations} iterations \
         (last lift {last_lift}, residual {residual})"
    )]
    NonConvergence {
        iterations: u32,
        last_lift: f64,
        residual: f64,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Distribution error: {message}")]
    Distribution { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PowerError {
    pub fn out_of_domain(message: impl Into<String>) -> Self {
        Self::OutOfDomain {
            message: message.into(),
        }
    }

    pub fn no_solution(effect_size: f64, ceiling: f64) -> Self {
        Self::NoSolution {
            effect_size,
            ceiling,
        }
    }

    pub fn out_of_reach(target: f64, boundary_value: f64) -> Self {
        Self::OutOfReach {
            target,
            boundary_value,
        }
    }

    pub fn non_convergence(iterations: u32, last_lift: f64, residual: f64) -> Self {
        Self::NonConvergence {
            iterations,
            last_lift,
            residual,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn distribution(message: impl Into<String>) -> Self {
        Self::Distribution {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error only signals the edge of the feasible region
    pub fn is_no_solution(&self) -> bool {
        matches!(self, Self::NoSolution { .. } | Self::OutOfReach { .. })
    }
}

impl From<ParameterValidationError> for PowerError {
    fn from(err: ParameterValidationError) -> Self {
        Self::validation(err.to_string())
    }
}
