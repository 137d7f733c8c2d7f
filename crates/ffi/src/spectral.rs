use canopy_rt_core::spectral::rebin;
use canopy_rt_core::{RebinMethod, SplineTarget};

use crate::error::{CanopyRtErrorCode, DefaultFfiError};
use crate::helpers::{slice_from_raw, slice_from_raw_mut, track_result};

/// Rebinning algorithm selector.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanopyRtRebinMethod {
    /// Segment-overlap trapezoidal areas
    Overlap = 0,
    /// Spline through the cumulative integral, differenced at the edges
    SplineCumulative = 1,
    /// Spline through the values, integrated over each bin
    SplineValues = 2,
}

impl CanopyRtRebinMethod {
    fn to_core(self, degree: usize) -> RebinMethod {
        match self {
            CanopyRtRebinMethod::Overlap => RebinMethod::Overlap,
            CanopyRtRebinMethod::SplineCumulative => RebinMethod::Spline {
                degree,
                target: SplineTarget::CumulativeIntegral,
            },
            CanopyRtRebinMethod::SplineValues => RebinMethod::Spline {
                degree,
                target: SplineTarget::Values,
            },
        }
    }
}

#[no_mangle]
/// Rebin the spectrum `y(x)` onto the bins delimited by `edges`.
///
/// `out` receives `n_edges - 1` bin averages. `spline_degree` is ignored for
/// `Overlap`.
///
/// Returns
/// - `CanopyRtErrorCode::Ok` (0) on success
/// - `CanopyRtErrorCode::NullPointer` if any array pointer is null
/// - `CanopyRtErrorCode::BufferTooSmall` if `out_capacity < n_edges - 1`
/// - `CanopyRtErrorCode::Validation` for non-increasing grids or bad spline degree
///
/// # Safety
/// `x` and `y` must point to `n_points` doubles, `edges` to `n_edges` doubles
/// and `out` to `out_capacity` writable doubles.
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn canopy_rt_rebin(
    x: *const f64,
    y: *const f64,
    n_points: usize,
    edges: *const f64,
    n_edges: usize,
    method: CanopyRtRebinMethod,
    spline_degree: usize,
    out: *mut f64,
    out_capacity: usize,
) -> CanopyRtErrorCode {
    track_result(|| {
        if n_edges < 2 {
            return Err(DefaultFfiError::invalid_parameter(format!(
                "At least two bin edges required, got {n_edges}"
            )));
        }
        let x = unsafe { slice_from_raw(x, n_points, "x") }?;
        let y = unsafe { slice_from_raw(y, n_points, "y") }?;
        let edges = unsafe { slice_from_raw(edges, n_edges, "edges") }?;
        let n_bins = n_edges - 1;
        let out = unsafe { slice_from_raw_mut(out, out_capacity, n_bins, "out") }?;
        let values = rebin(x, y, edges, method.to_core(spline_degree))?;
        out[..n_bins].copy_from_slice(&values);
        Ok(())
    })
}
