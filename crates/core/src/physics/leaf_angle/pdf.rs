//! Leaf inclination angle PDFs `g(θ_l)`
//!
//! `θ_l` is the leaf inclination relative to the horizontal, in radians on
//! [0, π/2]. Azimuth is assumed uniform throughout, so only inclination
//! matters.
//!
//! # References
//!
//! - de Wit, C.T. (1965). "Photosynthesis of leaf canopies". Agricultural
//!   Research Report 663, Pudoc, Wageningen.
//! - Bonan, G. (2019). "Climate Change and Terrestrial Ecosystem Modeling".
//!   Cambridge University Press, eqs. 2.11-2.14.

use std::f64::consts::{FRAC_2_PI, FRAC_PI_2};

use serde::{Deserialize, Serialize};

use crate::error::{CanopyRtError, Result};

/// Spherical distribution: leaf normals uniform over the hemisphere
pub fn spherical(theta_l: f64) -> f64 {
    theta_l.sin()
}

/// Uniform in inclination angle
pub fn uniform(_theta_l: f64) -> f64 {
    FRAC_2_PI
}

/// Mostly horizontal leaves
pub fn planophile(theta_l: f64) -> f64 {
    FRAC_2_PI * (1.0 + (2.0 * theta_l).cos())
}

/// Mostly vertical leaves
pub fn erectophile(theta_l: f64) -> f64 {
    FRAC_2_PI * (1.0 - (2.0 * theta_l).cos())
}

/// Mostly oblique leaves (peak at 45°)
pub fn plagiophile(theta_l: f64) -> f64 {
    FRAC_2_PI * (1.0 - (4.0 * theta_l).cos())
}

/// Area ratio Λ of an ellipsoid with horizontal/vertical semi-axis ratio `x`
///
/// Shared by the ellipsoidal PDF normalisation and the exact G denominator.
/// Equals 2 for the sphere (`x == 1`).
pub(crate) fn ellipsoid_area_ratio(x: f64) -> f64 {
    if x == 1.0 {
        2.0
    } else if x < 1.0 {
        let e1 = (1.0 - x * x).sqrt();
        x + e1.asin() / e1
    } else {
        let e2 = (1.0 - 1.0 / (x * x)).sqrt();
        x + (e2.ln_1p() - (-e2).ln_1p()) / (2.0 * e2 * x)
    }
}

/// Check an ellipsoidal shape ratio
pub(crate) fn check_shape_ratio(x: f64) -> Result<()> {
    if x.is_finite() && x > 0.0 {
        Ok(())
    } else {
        Err(CanopyRtError::domain(
            "ellipsoidal shape ratio x",
            x,
            "must be finite and > 0",
        ))
    }
}

/// Ellipsoidal distribution PDF with shape ratio `x` (x = 1 is spherical)
pub fn ellipsoidal(theta_l: f64, x: f64) -> Result<f64> {
    check_shape_ratio(x)?;
    Ok(ellipsoidal_unchecked(theta_l, x, ellipsoid_area_ratio(x)))
}

fn ellipsoidal_unchecked(theta_l: f64, x: f64, area_ratio: f64) -> f64 {
    let (s, c) = theta_l.sin_cos();
    let numer = 2.0 * x.powi(3) * s;
    let denom = (c * c + x * x * s * s).powi(2);
    numer / (area_ratio * denom)
}

/// Named inclination PDF families
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum PdfFamily {
    Spherical,
    Uniform,
    Planophile,
    Erectophile,
    Plagiophile,
    Ellipsoidal { x: f64 },
}

impl PdfFamily {
    /// Validate parameters (only the ellipsoidal family has one)
    pub fn validate(&self) -> Result<()> {
        match self {
            PdfFamily::Ellipsoidal { x } => check_shape_ratio(*x),
            _ => Ok(()),
        }
    }

    /// Evaluate `g(θ_l)`; parameters are assumed validated
    pub fn density(&self, theta_l: f64) -> f64 {
        match *self {
            PdfFamily::Spherical => spherical(theta_l),
            PdfFamily::Uniform => uniform(theta_l),
            PdfFamily::Planophile => planophile(theta_l),
            PdfFamily::Erectophile => erectophile(theta_l),
            PdfFamily::Plagiophile => plagiophile(theta_l),
            PdfFamily::Ellipsoidal { x } => {
                ellipsoidal_unchecked(theta_l, x, ellipsoid_area_ratio(x))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PdfFamily::Spherical => "spherical",
            PdfFamily::Uniform => "uniform",
            PdfFamily::Planophile => "planophile",
            PdfFamily::Erectophile => "erectophile",
            PdfFamily::Plagiophile => "plagiophile",
            PdfFamily::Ellipsoidal { .. } => "ellipsoidal",
        }
    }

    pub fn shape_parameter(&self) -> Option<f64> {
        match self {
            PdfFamily::Ellipsoidal { x } => Some(*x),
            _ => None,
        }
    }
}

/// Integration domain for inclination angles
pub(crate) const THETA_MAX: f64 = FRAC_PI_2;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuadratureConfig;
    use crate::error::IntegrandContext;
    use crate::numerics::integrate;
    use approx::assert_relative_eq;

    fn normalisation(family: PdfFamily) -> f64 {
        let ctx = IntegrandContext {
            family: family.name().to_string(),
            shape: family.shape_parameter(),
            lai: None,
            quantity: "pdf normalisation",
        };
        integrate(
            |t| family.density(t),
            0.0,
            THETA_MAX,
            &QuadratureConfig::mean_leaf_angle(),
            &ctx,
        )
        .unwrap()
        .value
    }

    #[test]
    fn test_pdfs_are_normalised() {
        for family in [
            PdfFamily::Spherical,
            PdfFamily::Uniform,
            PdfFamily::Planophile,
            PdfFamily::Erectophile,
            PdfFamily::Plagiophile,
            PdfFamily::Ellipsoidal { x: 0.5 },
            PdfFamily::Ellipsoidal { x: 1.0 },
            PdfFamily::Ellipsoidal { x: 3.0 },
        ] {
            assert_relative_eq!(normalisation(family), 1.0, max_relative = 1e-7);
        }
    }

    #[test]
    fn test_ellipsoidal_x1_is_spherical() {
        for theta in [0.1, 0.5, 1.0, 1.4] {
            assert_relative_eq!(ellipsoidal(theta, 1.0).unwrap(), spherical(theta), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_area_ratio_continuous_at_one() {
        let below = ellipsoid_area_ratio(1.0 - 1e-7);
        let above = ellipsoid_area_ratio(1.0 + 1e-7);
        assert_relative_eq!(below, 2.0, max_relative = 1e-6);
        assert_relative_eq!(above, 2.0, max_relative = 1e-6);
    }

    #[test]
    fn test_invalid_shape_ratio() {
        assert!(ellipsoidal(0.3, 0.0).is_err());
        assert!(ellipsoidal(0.3, -1.0).is_err());
        assert!(PdfFamily::Ellipsoidal { x: f64::NAN }.validate().is_err());
    }
}
