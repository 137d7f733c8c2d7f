//! Bracketed root finding

use crate::error::{CanopyRtError, Result};

/// Bisection iteration cap; 200 halvings exhaust f64 resolution on any bracket.
const MAX_BISECTIONS: usize = 200;

/// Find a root of `f` in `[lo, hi]` by bisection.
///
/// `f(lo)` and `f(hi)` must have opposite signs (or one of them be zero),
/// otherwise a domain error naming `parameter` is returned. Errors from `f`
/// itself propagate unchanged.
pub fn bisect<F>(mut f: F, mut lo: f64, mut hi: f64, xtol: f64, parameter: &'static str) -> Result<f64>
where
    F: FnMut(f64) -> Result<f64>,
{
    let mut f_lo = f(lo)?;
    let f_hi = f(hi)?;
    if f_lo == 0.0 {
        return Ok(lo);
    }
    if f_hi == 0.0 {
        return Ok(hi);
    }
    if f_lo.signum() == f_hi.signum() {
        return Err(CanopyRtError::domain(
            parameter,
            f_lo,
            format!("has no sign change on [{lo}, {hi}]"),
        ));
    }

    for _ in 0..MAX_BISECTIONS {
        let mid = 0.5 * (lo + hi);
        if (hi - lo).abs() <= xtol {
            return Ok(mid);
        }
        let f_mid = f(mid)?;
        if f_mid == 0.0 {
            return Ok(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    Ok(0.5 * (lo + hi))
}
