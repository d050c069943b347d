//! Curve sweeps
//!
//! A sweep evaluates one computation per independent value and collects the
//! points into a [`Curve`]. Running off the feasible region (`NoSolution`)
//! ends the curve early instead of failing it.

use tracing::debug;

use super::error::PowerError;
use super::experiment::{Curve, CurvePoint};

/// Largest number of points [`linear_grid`] produces
pub const MAX_GRID_POINTS: usize = 10_000;

/// Drive `compute` over `values` in order, stopping at the first `NoSolution`
pub fn sweep<I, F>(values: I, mut compute: F) -> Result<Curve, PowerError>
where
    I: IntoIterator<Item = f64>,
    F: FnMut(f64) -> Result<CurvePoint, PowerError>,
{
    let mut curve = Curve::new();

    for value in values {
        match compute(value) {
            Ok(point) => curve.push(point),
            Err(err) if err.is_no_solution() => {
                debug!(value, points = curve.len(), "Sweep left the feasible region");
                curve.truncated = true;
                break;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(curve)
}

/// Evenly spaced values from `start` to `end` inclusive
pub fn linear_grid(start: f64, end: f64, step: f64) -> Result<Vec<f64>, PowerError> {
    if !(start.is_finite() && end.is_finite() && step.is_finite()) || step <= 0.0 || end < start
    {
        return Err(PowerError::validation(format!(
            "invalid grid {start}..={end} step {step}"
        )));
    }

    // Small slack so that e.g. 0.01..=0.25 step 0.01 keeps its last value
    let intervals = ((end - start) / step + 1e-9).floor();

    if intervals + 1.0 > MAX_GRID_POINTS as f64 {
        return Err(PowerError::validation(format!(
            "grid {start}..={end} step {step} exceeds {MAX_GRID_POINTS} points"
        )));
    }

    let count = intervals as usize + 1;
    Ok((0..count).map(|i| start + i as f64 * step).collect())
}
