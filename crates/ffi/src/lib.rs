//! C ABI for the canopy radiative-transfer core.
//!
//! Every entry point returns a [`CanopyRtErrorCode`]; on failure a message is
//! available from `canopy_rt_get_last_error` on the same thread. Results are
//! written into caller-owned buffers, so nothing allocated here crosses the
//! boundary.

mod error;
mod helpers;
mod leaf_angle;
mod solver;
mod spectral;

pub use error::{canopy_rt_get_last_error, canopy_rt_get_last_error_code, CanopyRtErrorCode};
pub use leaf_angle::{
    canopy_rt_diffuse_transmittance, canopy_rt_k_b, canopy_rt_k_d, canopy_rt_projection_g,
    canopy_rt_shape_ratio_from_mean_leaf_angle, CanopyRtLeafAngle, CanopyRtLeafAngleFamily,
};
pub use solver::{canopy_rt_solve_band, CanopyRtBand, CanopyRtBandOptics, CanopyRtBandProfile};
pub use spectral::{canopy_rt_rebin, CanopyRtRebinMethod};

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn test_last_error_cleared_on_success() {
        let mut x = 0.0;
        let code = unsafe { canopy_rt_shape_ratio_from_mean_leaf_angle(120.0, &mut x) };
        assert_eq!(code, CanopyRtErrorCode::Domain);
        let msg = unsafe { CStr::from_ptr(canopy_rt_get_last_error()) };
        assert!(msg.to_string_lossy().contains("120"));

        let code = unsafe { canopy_rt_shape_ratio_from_mean_leaf_angle(57.0, &mut x) };
        assert_eq!(code, CanopyRtErrorCode::Ok);
        assert!(canopy_rt_get_last_error().is_null());
        assert_eq!(canopy_rt_get_last_error_code(), CanopyRtErrorCode::Ok);
        assert!(x > 0.9 && x < 1.1);
    }
}
