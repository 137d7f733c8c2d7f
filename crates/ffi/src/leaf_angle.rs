use canopy_rt_core::physics::leaf_angle::mla_to_x_approx;
use canopy_rt_core::{
    diffuse_extinction_coefficient, diffuse_transmittance, LeafAngleDistribution,
    ProjectionFunction, QuadratureConfig,
};

use crate::error::{CanopyRtErrorCode, DefaultFfiError};
use crate::helpers::{track_result, write_out};

/// Leaf angle distribution family tag.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanopyRtLeafAngleFamily {
    Spherical = 0,
    Horizontal = 1,
    Vertical = 2,
    /// Exact ellipsoidal, `parameter` is the shape ratio x
    Ellipsoidal = 3,
    /// Campbell approximation, `parameter` is the shape ratio x
    EllipsoidalApprox = 4,
    /// Ross-Goudriaan, `parameter` is the leaf angle index `χ_l`
    RossGoudriaan = 5,
}

/// Leaf angle distribution passed by value across the C boundary.
///
/// `parameter` is ignored for the parameterless families.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanopyRtLeafAngle {
    pub family: CanopyRtLeafAngleFamily,
    pub parameter: f64,
}

impl TryFrom<CanopyRtLeafAngle> for LeafAngleDistribution {
    type Error = DefaultFfiError;

    fn try_from(angle: CanopyRtLeafAngle) -> Result<Self, Self::Error> {
        let p = angle.parameter;
        let dist = match angle.family {
            CanopyRtLeafAngleFamily::Spherical => LeafAngleDistribution::Spherical,
            CanopyRtLeafAngleFamily::Horizontal => LeafAngleDistribution::Horizontal,
            CanopyRtLeafAngleFamily::Vertical => LeafAngleDistribution::Vertical,
            CanopyRtLeafAngleFamily::Ellipsoidal => LeafAngleDistribution::ellipsoidal(p)?,
            CanopyRtLeafAngleFamily::EllipsoidalApprox => {
                LeafAngleDistribution::ellipsoidal_approx(p)?
            }
            CanopyRtLeafAngleFamily::RossGoudriaan => LeafAngleDistribution::ross_goudriaan(p)?,
        };
        Ok(dist)
    }
}

#[no_mangle]
/// Leaf projection function G(ψ) for solar zenith `psi` (radians).
///
/// Returns
/// - `CanopyRtErrorCode::Ok` (0) on success
/// - `CanopyRtErrorCode::NullPointer` if `out_g` is null
/// - `CanopyRtErrorCode::Domain` if the distribution parameter is out of range
///
/// # Safety
/// `out_g` must be null or valid for a single `double` write.
pub unsafe extern "C" fn canopy_rt_projection_g(
    angle: CanopyRtLeafAngle,
    psi: f64,
    out_g: *mut f64,
) -> CanopyRtErrorCode {
    track_result(|| {
        let dist = LeafAngleDistribution::try_from(angle)?;
        unsafe { write_out(out_g, dist.g(psi), "out_g") }
    })
}

#[no_mangle]
/// Direct beam extinction coefficient `K_b(ψ) = G(ψ) / cos ψ`.
///
/// # Safety
/// `out_k_b` must be null or valid for a single `double` write.
pub unsafe extern "C" fn canopy_rt_k_b(
    angle: CanopyRtLeafAngle,
    psi: f64,
    out_k_b: *mut f64,
) -> CanopyRtErrorCode {
    track_result(|| {
        let dist = LeafAngleDistribution::try_from(angle)?;
        unsafe { write_out(out_k_b, dist.k_b(psi), "out_k_b") }
    })
}

#[no_mangle]
/// Hemispherical diffuse transmittance `τ_d` through cumulative `lai`.
///
/// Uses the default quadrature tolerances. Returns
/// `CanopyRtErrorCode::NonConvergence` if the integral does not converge.
///
/// # Safety
/// `out_tau` must be null or valid for a single `double` write.
pub unsafe extern "C" fn canopy_rt_diffuse_transmittance(
    angle: CanopyRtLeafAngle,
    lai: f64,
    out_tau: *mut f64,
) -> CanopyRtErrorCode {
    track_result(|| {
        let dist = LeafAngleDistribution::try_from(angle)?;
        let tau = diffuse_transmittance(&dist, lai, &QuadratureConfig::default())?;
        unsafe { write_out(out_tau, tau, "out_tau") }
    })
}

#[no_mangle]
/// Diffuse extinction coefficient `K_d = -ln(τ_d) / LAI`.
///
/// `lai` must be positive; zero returns `CanopyRtErrorCode::Domain`.
///
/// # Safety
/// `out_k_d` must be null or valid for a single `double` write.
pub unsafe extern "C" fn canopy_rt_k_d(
    angle: CanopyRtLeafAngle,
    lai: f64,
    out_k_d: *mut f64,
) -> CanopyRtErrorCode {
    track_result(|| {
        let dist = LeafAngleDistribution::try_from(angle)?;
        let k_d = diffuse_extinction_coefficient(&dist, lai, &QuadratureConfig::default())?;
        unsafe { write_out(out_k_d, k_d, "out_k_d") }
    })
}

#[no_mangle]
/// Ellipsoidal shape ratio x for a mean leaf angle in degrees (Campbell 1990).
///
/// # Safety
/// `out_x` must be null or valid for a single `double` write.
pub unsafe extern "C" fn canopy_rt_shape_ratio_from_mean_leaf_angle(
    mla_deg: f64,
    out_x: *mut f64,
) -> CanopyRtErrorCode {
    track_result(|| {
        let x = mla_to_x_approx(mla_deg)?;
        unsafe { write_out(out_x, x, "out_x") }
    })
}
