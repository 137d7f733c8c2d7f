//! Leaf projection function G(ψ)
//!
//! G(ψ) is the mean projection of unit leaf area onto the plane normal to
//! direction ψ (zenith angle, radians). The black-leaf direct-beam extinction
//! coefficient is `K_b = G(ψ) / cos ψ`.
//!
//! Every closed form here accepts a scalar angle or any [`Elementwise`]
//! container and returns the same shape.
//!
//! # References
//!
//! - Campbell, G.S. (1986). "Extinction coefficients for radiation in plant
//!   canopies calculated using an ellipsoidal inclination angle distribution".
//!   Agricultural and Forest Meteorology, 36, 317-321.
//! - Campbell, G.S. & Norman, J.M. (1998). "An Introduction to Environmental
//!   Biophysics", eq. 15.4.
//! - Goudriaan, J. (1977); Ross, J. (1981), as summarised by Bonan (2019).

use std::f64::consts::{FRAC_2_PI, FRAC_PI_2};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::pdf::{check_shape_ratio, ellipsoid_area_ratio, PdfFamily, THETA_MAX};
use crate::config::QuadratureConfig;
use crate::core_types::Elementwise;
use crate::error::{CanopyRtError, IntegrandContext, Result};
use crate::numerics::{integrate, BSpline};

/// G for the spherical distribution (constant 0.5)
pub fn spherical<A: Elementwise>(psi: A) -> A::Output {
    psi.map_elementwise(|_| 0.5)
}

/// G for horizontal leaves
pub fn horizontal<A: Elementwise>(psi: A) -> A::Output {
    psi.map_elementwise(f64::cos)
}

/// G for vertical leaves
pub fn vertical<A: Elementwise>(psi: A) -> A::Output {
    psi.map_elementwise(|p| FRAC_2_PI * p.sin())
}

/// Exact ellipsoidal G (Campbell 1986, eqs. 5-6).
///
/// `x == 1` returns the spherical constant directly; the general formula is
/// 0/0 there.
pub fn ellipsoidal<A: Elementwise>(psi: A, x: f64) -> Result<A::Output> {
    check_shape_ratio(x)?;
    if x == 1.0 {
        return Ok(spherical(psi));
    }
    let area_ratio = ellipsoid_area_ratio(x);
    Ok(psi.map_elementwise(|p| ellipsoidal_kernel(p, x, area_ratio)))
}

/// `sqrt(x² + tan²ψ) / Λ · cos ψ`, written to stay finite at grazing angles
#[inline]
fn ellipsoidal_kernel(psi: f64, x: f64, denominator: f64) -> f64 {
    let (s, c) = psi.sin_cos();
    (x * x * c * c + s * s).sqrt() / denominator
}

/// Campbell's approximate ellipsoidal G (Campbell & Norman eq. 15.4).
///
/// Within a few percent of [`ellipsoidal`]; not interchangeable with it.
pub fn ellipsoidal_approx<A: Elementwise>(psi: A, x: f64) -> Result<A::Output> {
    check_shape_ratio(x)?;
    let denominator = campbell_denominator(x);
    Ok(psi.map_elementwise(|p| ellipsoidal_kernel(p, x, denominator)))
}

#[inline]
fn campbell_denominator(x: f64) -> f64 {
    x + 1.774 * (x + 1.182).powf(-0.733)
}

/// Lower and upper bound applied to the Ross-Goudriaan `χ_l`
pub const CHI_L_RANGE: (f64, f64) = (-0.4, 0.6);

/// Ross-Goudriaan approximate G with leaf angle index `χ_l`.
///
/// `χ_l = 0` is spherical, unlike the ellipsoidal `x` where x = 1 is spherical.
/// `χ_l` is clamped to [-0.4, 0.6] before use.
pub fn ross_goudriaan<A: Elementwise>(psi: A, chi_l: f64) -> Result<A::Output> {
    if !chi_l.is_finite() {
        return Err(CanopyRtError::domain("chi_l", chi_l, "must be finite"));
    }
    let (phi1, phi2) = ross_goudriaan_terms(chi_l);
    Ok(psi.map_elementwise(|p| phi1 + phi2 * p.cos()))
}

fn ross_goudriaan_terms(chi_l: f64) -> (f64, f64) {
    let chi = chi_l.clamp(CHI_L_RANGE.0, CHI_L_RANGE.1);
    let phi1 = 0.5 - 0.633 * chi - 0.330 * chi * chi;
    let phi2 = 0.877 * (1.0 - 2.0 * phi1);
    (phi1, phi2)
}

/// Source of G(ψ) and `K_b(ψ)` used by the extinction engine and the schemes
pub trait ProjectionFunction: Send + Sync {
    /// G(ψ)
    fn g(&self, psi: f64) -> f64;

    /// `K_b(ψ) = G(ψ) / cos ψ`; diverges at grazing incidence
    fn k_b(&self, psi: f64) -> f64 {
        self.g(psi) / psi.cos()
    }

    /// Distribution family name, used in diagnostics
    fn family(&self) -> &str;

    /// Shape parameter of the family, if any
    fn shape_parameter(&self) -> Option<f64> {
        None
    }
}

/// Closed-form leaf angle distributions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum LeafAngleDistribution {
    Spherical,
    Horizontal,
    Vertical,
    /// Exact ellipsoidal with shape ratio `x`
    Ellipsoidal { x: f64 },
    /// Campbell approximation with shape ratio `x`
    EllipsoidalApprox { x: f64 },
    /// Ross-Goudriaan with leaf angle index `χ_l`
    RossGoudriaan { chi_l: f64 },
}

impl LeafAngleDistribution {
    pub fn ellipsoidal(x: f64) -> Result<Self> {
        check_shape_ratio(x)?;
        Ok(Self::Ellipsoidal { x })
    }

    pub fn ellipsoidal_approx(x: f64) -> Result<Self> {
        check_shape_ratio(x)?;
        Ok(Self::EllipsoidalApprox { x })
    }

    pub fn ross_goudriaan(chi_l: f64) -> Result<Self> {
        if !chi_l.is_finite() {
            return Err(CanopyRtError::domain("chi_l", chi_l, "must be finite"));
        }
        Ok(Self::RossGoudriaan { chi_l })
    }

    /// Approximate ellipsoidal distribution for a mean leaf angle (degrees)
    pub fn from_mean_leaf_angle(mla_deg: f64) -> Result<Self> {
        Self::ellipsoidal_approx(super::mean_angle::mla_to_x_approx(mla_deg)?)
    }

    /// Validate a deserialized distribution
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Ellipsoidal { x } | Self::EllipsoidalApprox { x } => check_shape_ratio(x),
            Self::RossGoudriaan { chi_l } if !chi_l.is_finite() => {
                Err(CanopyRtError::domain("chi_l", chi_l, "must be finite"))
            }
            _ => Ok(()),
        }
    }

    /// G over any elementwise container
    pub fn g_elementwise<A: Elementwise>(&self, psi: A) -> A::Output {
        psi.map_elementwise(|p| self.g(p))
    }
}

impl ProjectionFunction for LeafAngleDistribution {
    fn g(&self, psi: f64) -> f64 {
        match *self {
            Self::Spherical => 0.5,
            Self::Horizontal => psi.cos(),
            Self::Vertical => FRAC_2_PI * psi.sin(),
            Self::Ellipsoidal { x } if x == 1.0 => 0.5,
            Self::Ellipsoidal { x } => ellipsoidal_kernel(psi, x, ellipsoid_area_ratio(x)),
            Self::EllipsoidalApprox { x } => ellipsoidal_kernel(psi, x, campbell_denominator(x)),
            Self::RossGoudriaan { chi_l } => {
                let (phi1, phi2) = ross_goudriaan_terms(chi_l);
                phi1 + phi2 * psi.cos()
            }
        }
    }

    fn family(&self) -> &str {
        match self {
            Self::Spherical => "spherical",
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Ellipsoidal { .. } => "ellipsoidal",
            Self::EllipsoidalApprox { .. } => "ellipsoidal (Campbell approx.)",
            Self::RossGoudriaan { .. } => "Ross-Goudriaan",
        }
    }

    fn shape_parameter(&self) -> Option<f64> {
        match *self {
            Self::Ellipsoidal { x } | Self::EllipsoidalApprox { x } => Some(x),
            Self::RossGoudriaan { chi_l } => Some(chi_l),
            _ => None,
        }
    }
}

/// Azimuth-averaged projection of a leaf with inclination `theta_l` onto the
/// plane normal to zenith angle `psi`.
fn leaf_projection(psi: f64, theta_l: f64) -> f64 {
    let (sp, cp) = psi.sin_cos();
    let (st, ct) = theta_l.sin_cos();
    if psi + theta_l <= FRAC_PI_2 {
        cp * ct
    } else {
        let beta = ((cp * ct) / (sp * st)).clamp(-1.0, 1.0).acos();
        cp * ct * (1.0 - beta * FRAC_2_PI) + FRAC_2_PI * sp * st * beta.sin()
    }
}

/// Number of zenith nodes used to tabulate a PDF-derived G
const PDF_TABLE_NODES: usize = 91;

/// G(ψ) derived numerically from an inclination PDF, tabulated over
/// [0, π/2] and interpolated with a cubic spline.
#[derive(Debug, Clone)]
pub struct PdfProjection {
    family: PdfFamily,
    spline: BSpline,
}

impl PdfProjection {
    /// Integrate `g(θ)·A(ψ, θ)` at each table node.
    pub fn new(family: PdfFamily, config: &QuadratureConfig) -> Result<Self> {
        family.validate()?;
        let step = FRAC_PI_2 / (PDF_TABLE_NODES - 1) as f64;
        let psi: Vec<f64> = (0..PDF_TABLE_NODES).map(|i| i as f64 * step).collect();
        let mut g = Vec::with_capacity(psi.len());
        for &p in &psi {
            let context = IntegrandContext {
                family: family.name().to_string(),
                shape: family.shape_parameter(),
                lai: None,
                quantity: "G(psi) from inclination PDF",
            };
            let integrand = |t: f64| family.density(t) * leaf_projection(p, t);
            // Split at the kink where the leaf starts to self-shade
            let kink = FRAC_PI_2 - p;
            let value = if kink > 0.0 && kink < THETA_MAX {
                integrate(integrand, 0.0, kink, config, &context)?.value
                    + integrate(integrand, kink, THETA_MAX, config, &context)?.value
            } else {
                integrate(integrand, 0.0, THETA_MAX, config, &context)?.value
            };
            g.push(value);
        }
        debug!(
            "tabulated G for {} distribution at {} zenith nodes",
            family.name(),
            psi.len()
        );
        let spline = BSpline::interpolate(&psi, &g, 3)?;
        Ok(Self { family, spline })
    }

    pub fn pdf_family(&self) -> PdfFamily {
        self.family
    }
}

impl ProjectionFunction for PdfProjection {
    fn g(&self, psi: f64) -> f64 {
        self.spline.evaluate(psi.clamp(0.0, FRAC_PI_2))
    }

    fn family(&self) -> &str {
        self.family.name()
    }

    fn shape_parameter(&self) -> Option<f64> {
        self.family.shape_parameter()
    }
}

/// User-supplied G closure
pub struct CustomProjection<F> {
    name: String,
    g: F,
}

impl<F> CustomProjection<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    pub fn new(name: impl Into<String>, g: F) -> Self {
        Self {
            name: name.into(),
            g,
        }
    }
}

impl<F> ProjectionFunction for CustomProjection<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn g(&self, psi: f64) -> f64 {
        (self.g)(psi)
    }

    fn family(&self) -> &str {
        &self.name
    }
}
