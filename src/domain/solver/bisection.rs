use crate::domain::error::PowerError;

/// Default relative width at which [`bisect`] stops
pub const BISECTION_TOLERANCE: f64 = 1e-10;

/// Default iteration cap of [`bisect`]
pub const BISECTION_MAX_ITERATIONS: u32 = 200;

/// Find a root of `f` in `[lower, upper]` by bisection
///
/// `f(lower)` and `f(upper)` must have opposite signs (or one of them must be
/// zero). Stops when the bracket is narrower than `tolerance` relative to
/// `max(1, |x|)`.
pub fn bisect<F>(
    mut f: F,
    lower: f64,
    upper: f64,
    tolerance: f64,
    max_iterations: u32,
) -> Result<f64, PowerError>
where
    F: FnMut(f64) -> Result<f64, PowerError>,
{
    if lower.is_nan() || upper.is_nan() || lower >= upper {
        return Err(PowerError::validation(format!(
            "invalid bracket [{lower}, {upper}]"
        )));
    }

    let mut lo = lower;
    let mut hi = upper;
    let f_lo = f(lo)?;
    let f_hi = f(hi)?;

    if f_lo == 0.0 {
        return Ok(lo);
    }
    if f_hi == 0.0 {
        return Ok(hi);
    }
    if f_lo.signum() == f_hi.signum() {
        return Err(PowerError::validation(format!(
            "root is not bracketed by [{lower}, {upper}]"
        )));
    }

    let lo_positive = f_lo > 0.0;

    for _ in 0..max_iterations {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid)?;

        if f_mid == 0.0 {
            return Ok(mid);
        }

        if (f_mid > 0.0) == lo_positive {
            lo = mid;
        } else {
            hi = mid;
        }

        if hi - lo <= tolerance * mid.abs().max(1.0) {
            break;
        }
    }

    Ok(0.5 * (lo + hi))
}
