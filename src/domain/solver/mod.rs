//! Numeric solvers
//!
//! - [`RootFinder`]: adaptive-step inversion of monotone functions of lift
//! - [`bisect`]: bracketed bisection for the forward power solves

mod bisection;
mod config;
mod root_finder;

pub use bisection::{bisect, BISECTION_MAX_ITERATIONS, BISECTION_TOLERANCE};
pub use config::SolverConfig;
pub use root_finder::{Monotonicity, RootEstimate, RootFinder, SearchBounds, LIFT_MARGIN};
