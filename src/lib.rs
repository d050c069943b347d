//! lift-power
//!
//! Sample size, detectable lift and significance for two-proportion A/B
//! experiments (email open and click rates):
//! - Chi-square goodness-of-fit and normal-approximation effect-size models
//! - Forward power solves on non-central chi-square and t distributions
//! - Lift inversion with an adaptive-step root finder
//! - Curve sweeps that truncate at the edge of the feasible region

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{ExperimentFamily, PowerError};
pub use infrastructure::services::PowerService;
