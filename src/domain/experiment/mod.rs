//! Experiment domain module for two-proportion A/B tests
//!
//! This module provides the parameter, curve and result types shared by the
//! effect-size models, power solvers and sweeps.

mod curve;
mod parameters;
mod result;
mod validation;

// Re-export all public types
pub use curve::{Curve, CurvePoint};
pub use parameters::{Alpha, ExperimentFamily, ExperimentParams, Power, Rate, TestDesign};
pub use result::{MetricPlan, PlanResult, SignificanceResult, SolveFor};
pub use validation::{
    validate_alpha, validate_arms, validate_counts, validate_lift, validate_power, validate_rate,
    validate_sample_size, ParameterValidationError, MAX_ARMS,
};
