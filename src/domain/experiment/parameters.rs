//! Experiment parameter types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::validation::{
    validate_alpha, validate_arms, validate_power, validate_rate, ParameterValidationError,
};

// ============================================================================
// Probabilities
// ============================================================================

macro_rules! probability_newtype {
    ($(#[$meta:meta])* $name:ident, $validate:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
        #[serde(try_from = "f64", into = "f64")]
        pub struct $name(f64);

        impl $name {
            /// Create a new value with validation
            pub fn new(value: f64) -> Result<Self, ParameterValidationError> {
                $validate(value)?;
                Ok(Self(value))
            }

            pub fn value(self) -> f64 {
                self.0
            }
        }

        impl TryFrom<f64> for $name {
            type Error = ParameterValidationError;

            fn try_from(value: f64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for f64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

probability_newtype!(
    /// Baseline conversion rate in [0, 1)
    Rate,
    validate_rate
);

probability_newtype!(
    /// Two-sided significance level in (0, 1)
    Alpha,
    validate_alpha
);

probability_newtype!(
    /// Target statistical power in (0, 1)
    Power,
    validate_power
);

// ============================================================================
// ExperimentFamily
// ============================================================================

/// Statistical family used to model a two-proportion experiment
///
/// The families answer the same question with different tests and give
/// numerically different results, so one computation never mixes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentFamily {
    /// Chi-square goodness-of-fit against a uniform expected distribution
    #[default]
    ChiSquareGoodnessOfFit,
    /// Arcsine-transformed proportion difference with a two-sample t power model
    NormalApproxProportion,
}

impl ExperimentFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChiSquareGoodnessOfFit => "chi_square_goodness_of_fit",
            Self::NormalApproxProportion => "normal_approx_proportion",
        }
    }
}

impl fmt::Display for ExperimentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExperimentFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "chi_square_goodness_of_fit" | "chisquare" | "chi_square" | "gof" => {
                Ok(Self::ChiSquareGoodnessOfFit)
            }
            "normal_approx_proportion" | "normal" | "ttest" | "t_test" => {
                Ok(Self::NormalApproxProportion)
            }
            other => Err(format!("Unknown experiment family: '{other}'")),
        }
    }
}

// ============================================================================
// TestDesign
// ============================================================================

/// Family plus arm count for one computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDesign {
    pub family: ExperimentFamily,
    pub arms: u32,
}

impl TestDesign {
    /// Two-arm design of the given family
    pub fn two_arm(family: ExperimentFamily) -> Self {
        Self { family, arms: 2 }
    }

    /// Multi-arm chi-square goodness-of-fit design
    pub fn chisquare(arms: u32) -> Result<Self, ParameterValidationError> {
        validate_arms(arms)?;
        Ok(Self {
            family: ExperimentFamily::ChiSquareGoodnessOfFit,
            arms,
        })
    }

    /// Check the arm count against the family
    pub fn validate(&self) -> Result<(), ParameterValidationError> {
        validate_arms(self.arms)?;

        if self.family == ExperimentFamily::NormalApproxProportion && self.arms != 2 {
            return Err(ParameterValidationError::UnsupportedArmCount(self.arms));
        }

        Ok(())
    }
}

impl Default for TestDesign {
    fn default() -> Self {
        Self::two_arm(ExperimentFamily::default())
    }
}

// ============================================================================
// ExperimentParams
// ============================================================================

/// Scalar inputs shared by every computation of one request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperimentParams {
    pub design: TestDesign,
    pub rate: Rate,
    pub alpha: Alpha,
    pub power: Power,
}

impl ExperimentParams {
    /// Validate and bundle raw scalars
    pub fn new(
        design: TestDesign,
        rate: f64,
        alpha: f64,
        power: f64,
    ) -> Result<Self, ParameterValidationError> {
        design.validate()?;

        Ok(Self {
            design,
            rate: Rate::new(rate)?,
            alpha: Alpha::new(alpha)?,
            power: Power::new(power)?,
        })
    }
}
