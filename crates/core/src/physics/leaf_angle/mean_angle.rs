//! Mean leaf inclination angle and its relation to the ellipsoidal shape ratio

use tracing::trace;

use super::pdf::{check_shape_ratio, PdfFamily, THETA_MAX};
use crate::config::QuadratureConfig;
use crate::error::{CanopyRtError, IntegrandContext, Result};
use crate::numerics::{bisect, integrate};

/// Bracket searched when inverting the integrated mean leaf angle
pub const SHAPE_RATIO_BRACKET: (f64, f64) = (0.01, 100.0);

/// Campbell (1990) empirical mean leaf angle (degrees) for shape ratio `x`
pub fn x_to_mla_approx(x: f64) -> Result<f64> {
    check_shape_ratio(x)?;
    Ok((9.65 * (3.0 + x).powf(-1.65)).to_degrees())
}

/// Inverse of [`x_to_mla_approx`].
///
/// Mean angles above roughly 90.2° have no positive `x`.
pub fn mla_to_x_approx(mla_deg: f64) -> Result<f64> {
    if !(mla_deg.is_finite() && mla_deg > 0.0) {
        return Err(CanopyRtError::domain(
            "mean leaf angle",
            mla_deg,
            "must be finite and > 0 degrees",
        ));
    }
    let x = (mla_deg.to_radians() / 9.65).powf(-1.0 / 1.65) - 3.0;
    if x > 0.0 {
        Ok(x)
    } else {
        Err(CanopyRtError::domain(
            "mean leaf angle",
            mla_deg,
            "no positive ellipsoidal shape ratio reproduces this angle",
        ))
    }
}

/// Mean leaf inclination (degrees) of an inclination PDF, ∫ θ g(θ) dθ
pub fn mla_from_pdf(family: PdfFamily, config: &QuadratureConfig) -> Result<f64> {
    family.validate()?;
    let context = IntegrandContext {
        family: family.name().to_string(),
        shape: family.shape_parameter(),
        lai: None,
        quantity: "mean leaf angle",
    };
    let q = integrate(|t| t * family.density(t), 0.0, THETA_MAX, config, &context)?;
    Ok(q.value.to_degrees())
}

/// Mean leaf angle (degrees) of the exact ellipsoidal PDF
pub fn x_to_mla_integ(x: f64) -> Result<f64> {
    mla_from_pdf(
        PdfFamily::Ellipsoidal { x },
        &QuadratureConfig::mean_leaf_angle(),
    )
}

/// Shape ratio whose ellipsoidal PDF has the given mean angle, by bisection
/// over [`SHAPE_RATIO_BRACKET`].
pub fn mla_to_x_integ(mla_deg: f64) -> Result<f64> {
    if !mla_deg.is_finite() {
        return Err(CanopyRtError::domain(
            "mean leaf angle",
            mla_deg,
            "must be finite",
        ));
    }
    let (lo, hi) = SHAPE_RATIO_BRACKET;
    let x = bisect(
        |x| Ok(x_to_mla_integ(x)? - mla_deg),
        lo,
        hi,
        1e-10,
        "mean leaf angle",
    )?;
    trace!("mean leaf angle {mla_deg} deg -> x = {x}");
    Ok(x)
}
