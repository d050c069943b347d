//! Adaptive-step root finder used to invert monotone functions of lift
//!
//! Starting from `start`, the finder walks in the direction that reduces
//! `|target - f(lift)|` with a fixed step until two consecutive evaluations
//! fall on opposite sides of the target. From then on the step is halved on
//! every evaluation, which is bisection of the bracket the walk found. Every
//! candidate is clamped into [`SearchBounds`], so `f` is never evaluated at an
//! invalid rate.
//!
//! A root is accepted once `|target - f(lift)| <= tolerance` and the bracket
//! around it is at most `tolerance` wide, so the returned lift is within
//! `tolerance` of the true root even where `f` is flat. The iteration cap
//! turns pathological inputs into [`PowerError::NonConvergence`].

use serde::Serialize;
use tracing::{debug, warn};

use super::config::SolverConfig;
use crate::domain::error::PowerError;

/// Gap kept between a search bound and an invalid rate of 0 or 1
pub const LIFT_MARGIN: f64 = 1e-9;

/// Direction in which `f` moves as lift grows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Monotonicity {
    /// Effect sizes grow with lift
    Increasing,
    /// P-values shrink with lift
    Decreasing,
}

impl Monotonicity {
    /// Step direction (+1 or -1) that moves `f` toward the target
    fn direction(self, residual: f64) -> f64 {
        let towards = if residual > 0.0 { 1.0 } else { -1.0 };

        match self {
            Self::Increasing => towards,
            Self::Decreasing => -towards,
        }
    }
}

/// Closed interval of lifts the finder may visit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchBounds {
    pub lower: f64,
    pub upper: f64,
}

impl SearchBounds {
    pub fn new(lower: f64, upper: f64) -> Result<Self, PowerError> {
        if !lower.is_finite() || !upper.is_finite() || lower > upper {
            return Err(PowerError::validation(format!(
                "invalid search bounds [{lower}, {upper}]"
            )));
        }

        Ok(Self { lower, upper })
    }

    /// Lifts at or above `floor` that keep `rate + lift` inside (0, 1)
    pub fn lift(rate: f64, floor: f64) -> Result<Self, PowerError> {
        Self::new(floor.max(LIFT_MARGIN - rate), 1.0 - rate - LIFT_MARGIN)
    }

    pub fn clamp(&self, lift: f64) -> f64 {
        lift.clamp(self.lower, self.upper)
    }
}

/// Converged root
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RootEstimate {
    pub lift: f64,
    /// `target - f(lift)` at the returned lift
    pub residual: f64,
    pub iterations: u32,
}

/// Adaptive-step root finder
#[derive(Debug, Clone, PartialEq)]
pub struct RootFinder {
    tolerance: f64,
    max_iterations: u32,
    initial_step: f64,
}

impl RootFinder {
    pub fn new(tolerance: f64, max_iterations: u32, initial_step: f64) -> Self {
        Self {
            tolerance,
            max_iterations,
            initial_step,
        }
    }

    /// Finder tuned for effect-size targets
    pub fn for_effect_size(config: &SolverConfig) -> Self {
        Self::new(
            config.tolerance,
            config.max_iterations,
            config.effect_initial_step,
        )
    }

    /// Finder tuned for p-value targets
    pub fn for_p_value(config: &SolverConfig) -> Self {
        Self::new(
            config.tolerance,
            config.max_iterations,
            config.pvalue_initial_step,
        )
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Find `lift` in `bounds` within `tolerance` of the root of `f(lift) = target`
    pub fn solve<F>(
        &self,
        target: f64,
        monotonicity: Monotonicity,
        bounds: SearchBounds,
        start: f64,
        mut f: F,
    ) -> Result<RootEstimate, PowerError>
    where
        F: FnMut(f64) -> Result<f64, PowerError>,
    {
        if !target.is_finite() {
            return Err(PowerError::validation(format!(
                "root finder target must be finite, got {target}"
            )));
        }

        if !(self.tolerance > 0.0 && self.initial_step > 0.0) {
            return Err(PowerError::validation(
                "root finder tolerance and step must be positive",
            ));
        }

        let mut lift = bounds.clamp(start);
        let mut residual = target - f(lift)?;
        let mut direction = monotonicity.direction(residual);
        let mut iterations = 0;

        // Walk until the target is bracketed
        let (mut low, mut high, low_direction) = loop {
            if residual == 0.0 {
                return Ok(self.converged(lift, residual, iterations));
            }

            let next = bounds.clamp(lift + direction * self.initial_step);

            // Pinned against a bound with the target already within reach
            if next == lift && residual.abs() <= self.tolerance {
                return Ok(self.converged(lift, residual, iterations));
            }

            if iterations == self.max_iterations {
                return Err(self.exhausted(target, lift, residual));
            }

            iterations += 1;
            let next_residual = target - f(next)?;
            let next_direction = monotonicity.direction(next_residual);

            if next_direction != direction {
                let bracket = if next > lift {
                    (lift, next, direction)
                } else {
                    (next, lift, next_direction)
                };
                lift = next;
                residual = next_residual;
                break bracket;
            }

            lift = next;
            residual = next_residual;
            direction = next_direction;
        };

        while residual.abs() > self.tolerance || high - low > self.tolerance {
            if iterations == self.max_iterations {
                return Err(self.exhausted(target, lift, residual));
            }

            iterations += 1;
            lift = 0.5 * (low + high);
            residual = target - f(lift)?;

            if residual == 0.0 {
                break;
            }

            if monotonicity.direction(residual) == low_direction {
                low = lift;
            } else {
                high = lift;
            }
        }

        Ok(self.converged(lift, residual, iterations))
    }

    fn converged(&self, lift: f64, residual: f64, iterations: u32) -> RootEstimate {
        debug!(lift, residual, iterations, "Root finder converged");
        RootEstimate {
            lift,
            residual,
            iterations,
        }
    }

    fn exhausted(&self, target: f64, lift: f64, residual: f64) -> PowerError {
        warn!(
            target_value = target,
            lift,
            residual,
            max_iterations = self.max_iterations,
            "Root finder hit the iteration cap"
        );

        PowerError::non_convergence(self.max_iterations, lift, residual)
    }
}
