//! Domain layer - Core statistical models, solvers and value types

pub mod effect_size;
pub mod error;
pub mod experiment;
pub mod power;
pub mod solver;
pub mod sweep;

pub use effect_size::{
    chisquare_effect_size, design_effect_size, effect_size, proportion_effect_size, treated_rate,
};
pub use error::PowerError;
pub use experiment::{
    Alpha, Curve, CurvePoint, ExperimentFamily, ExperimentParams, MetricPlan,
    ParameterValidationError, PlanResult, Power, Rate, SignificanceResult, SolveFor, TestDesign,
};
pub use power::PowerAnalysis;
pub use solver::{Monotonicity, RootEstimate, RootFinder, SearchBounds, SolverConfig};
pub use sweep::{linear_grid, sweep};
