use canopy_rt_core::{
    CanopyLayerProfile, LeafAngleDistribution, OutputKey, SchemeInputs, SchemeRegistry,
    SolverConfig, SpectralOptics, TopOfCanopyIrradiance,
};
use std::os::raw::c_char;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{CanopyRtErrorCode, DefaultFfiError};
use crate::helpers::{slice_from_raw, slice_from_raw_mut, str_from_raw, track_result};
use crate::leaf_angle::CanopyRtLeafAngle;

/// Built-in schemes, created once per process
static REGISTRY: LazyLock<SchemeRegistry> = LazyLock::new(SchemeRegistry::with_builtin_schemes);

/// Top-of-canopy irradiance for one band, already integrated over its width.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanopyRtBand {
    /// Band centre (μm)
    pub wavelength: f64,
    /// Band width (μm)
    pub width: f64,
    /// Direct beam irradiance on a horizontal plane (W/m²)
    pub direct: f64,
    /// Diffuse irradiance (W/m²)
    pub diffuse: f64,
}

/// Leaf and soil optical properties for one band.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanopyRtBandOptics {
    pub leaf_reflectance: f64,
    pub leaf_transmittance: f64,
    pub soil_reflectance: f64,
    /// Green leaf fraction in (0, 1]
    pub green: f64,
}

/// Caller-owned output buffers, each holding at least `capacity` doubles.
///
/// Level 0 is the ground and the last level is the canopy top, matching the
/// order of the LAI array. The absorption buffers may be null.
#[repr(C)]
#[derive(Debug)]
pub struct CanopyRtBandProfile {
    pub direct: *mut f64,
    pub diffuse_down: *mut f64,
    pub diffuse_up: *mut f64,
    pub scalar: *mut f64,
    pub absorbed_sunlit: *mut f64,
    pub absorbed_shaded: *mut f64,
    pub capacity: usize,
}

#[no_mangle]
/// Solve one band with the scheme registered under `scheme_id` (`"gd"` or `"bl"`).
///
/// - `lai` points to `n_levels` cumulative LAI values, ground first.
/// - `psi` is the solar zenith angle in radians.
/// - `out_has_absorption` is set to whether the scheme reports sunlit/shaded
///   absorption. When it does and the absorption buffers are non-null they are filled.
///
/// Returns
/// - `CanopyRtErrorCode::Ok` (0) on success
/// - `CanopyRtErrorCode::NullPointer` if a required pointer is null
/// - `CanopyRtErrorCode::BufferTooSmall` if `capacity < n_levels`
/// - `CanopyRtErrorCode::Validation` for a malformed profile or unknown scheme
/// - `CanopyRtErrorCode::Domain` for out-of-range optics or angles
///
/// Example:
/// ```c
/// double lai[11];
/// for (int i = 0; i < 11; i++) lai[i] = 0.4 * (10 - i);
/// double dr[11], df_dn[11], df_up[11], sc[11];
/// CanopyRtBandProfile out = { dr, df_dn, df_up, sc, NULL, NULL, 11 };
/// CanopyRtBand band = { 0.55, 0.01, 15.0, 4.0 };
/// CanopyRtBandOptics optics = { 0.1, 0.05, 0.11, 1.0 };
/// CanopyRtLeafAngle angle = { Spherical, 0.0 };
/// bool has_abs = false;
/// canopy_rt_solve_band("gd", lai, 11, band, optics, 0.35, angle, &out, &has_abs);
/// ```
///
/// # Safety
/// `scheme_id` must be null or a valid C string. `lai` must be null or point to
/// `n_levels` doubles. Non-null buffers in `out` must hold `capacity` doubles.
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn canopy_rt_solve_band(
    scheme_id: *const c_char,
    lai: *const f64,
    n_levels: usize,
    band: CanopyRtBand,
    optics: CanopyRtBandOptics,
    psi: f64,
    angle: CanopyRtLeafAngle,
    out: *mut CanopyRtBandProfile,
    out_has_absorption: *mut bool,
) -> CanopyRtErrorCode {
    track_result(|| {
        let id = unsafe { str_from_raw(scheme_id, "scheme_id") }?;
        let lai = unsafe { slice_from_raw(lai, n_levels, "lai") }?;
        let out = unsafe { out.as_ref() }.ok_or_else(|| DefaultFfiError::null_pointer("out"))?;
        if out_has_absorption.is_null() {
            return Err(DefaultFfiError::null_pointer("out_has_absorption"));
        }

        // Every buffer is checked before anything is written
        let capacity = out.capacity;
        let [direct, diffuse_down, diffuse_up, scalar] = [
            (out.direct, "direct"),
            (out.diffuse_down, "diffuse_down"),
            (out.diffuse_up, "diffuse_up"),
            (out.scalar, "scalar"),
        ]
        .map(|(ptr, name)| unsafe { slice_from_raw_mut(ptr, capacity, n_levels, name) });
        let (direct, diffuse_down, diffuse_up, scalar) =
            (direct?, diffuse_down?, diffuse_up?, scalar?);
        let [absorbed_sunlit, absorbed_shaded] = [
            (out.absorbed_sunlit, "absorbed_sunlit"),
            (out.absorbed_shaded, "absorbed_shaded"),
        ]
        .map(|(ptr, name)| {
            (!ptr.is_null())
                .then(|| unsafe { slice_from_raw_mut(ptr, capacity, n_levels, name) })
                .transpose()
        });
        let (absorbed_sunlit, absorbed_shaded) = (absorbed_sunlit?, absorbed_shaded?);

        let profile = CanopyLayerProfile::new(lai.to_vec())?;
        let toc = TopOfCanopyIrradiance::from_arrays(
            &[band.wavelength],
            &[band.width],
            &[band.direct],
            &[band.diffuse],
            psi,
        )?;
        let optics = SpectralOptics::new(
            vec![optics.leaf_reflectance],
            vec![optics.leaf_transmittance],
            vec![optics.soil_reflectance],
            optics.green,
        )?;
        let distribution = LeafAngleDistribution::try_from(angle)?;
        let inputs = SchemeInputs::new(&toc, &profile, &optics, &distribution)?
            .with_config(SolverConfig::sequential());
        debug!("FFI band solve: scheme {id}, {n_levels} levels, psi = {psi:.4}");
        let solved = REGISTRY.solve(id, &inputs)?;
        let has_absorption = solved.output(OutputKey::AbsorbedSunlit).is_some();
        let result = solved.band_profile(0).ok_or_else(|| {
            DefaultFfiError::invalid_parameter("scheme returned no bands".to_string())
        })?;

        direct[..n_levels].copy_from_slice(&result.direct);
        diffuse_down[..n_levels].copy_from_slice(&result.diffuse_down);
        diffuse_up[..n_levels].copy_from_slice(&result.diffuse_up);
        scalar[..n_levels].copy_from_slice(&result.scalar);
        if has_absorption {
            if let Some(buf) = absorbed_sunlit {
                buf[..n_levels].copy_from_slice(&result.absorbed_sunlit);
            }
            if let Some(buf) = absorbed_shaded {
                buf[..n_levels].copy_from_slice(&result.absorbed_shaded);
            }
        }
        unsafe {
            *out_has_absorption = has_absorption;
        }
        Ok(())
    })
}
