//! Conservative spectral rebinning ("smearing")
//!
//! Both methods take a spectrum `y(x)` sampled at strictly increasing `x`
//! and return one in-bin mean value per bin of `edges`, such that
//! `Σ value·width` reproduces the trapezoidal integral of the input over the
//! rebinned domain.
//!
//! - [`rebin_overlap`]: exact trapezoidal area of every input segment that
//!   overlaps a bin (after the TUV radiative transfer model's smearing).
//! - [`rebin_spline`]: interpolating spline through the cumulative integral
//!   (conservative) or through the values (smoother), differenced at the edges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Result, ValidationError};
use crate::numerics::{cumulative_trapezoid, BSpline};

/// What the spline interpolates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SplineTarget {
    /// Cumulative trapezoidal integral of the input (selector `"F"`)
    #[default]
    #[serde(rename = "F")]
    CumulativeIntegral,
    /// The input values themselves (selector `"f"`)
    #[serde(rename = "f")]
    Values,
}

impl SplineTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            SplineTarget::CumulativeIntegral => "F",
            SplineTarget::Values => "f",
        }
    }
}

impl fmt::Display for SplineTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplineTarget {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "F" => Ok(SplineTarget::CumulativeIntegral),
            "f" => Ok(SplineTarget::Values),
            other => Err(ValidationError::InvalidSelector {
                setting: "spline interpolation target",
                value: other.to_string(),
                expected: "\"F\" (cumulative integral), \"f\" (values)",
            }),
        }
    }
}

/// Rebinning algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum RebinMethod {
    /// Segment-overlap trapezoidal areas (selector `"tuv"`)
    #[default]
    Overlap,
    /// Spline through cumulative integral or values (selector `"trapz_interp"`)
    Spline { degree: usize, target: SplineTarget },
}

impl RebinMethod {
    /// Default spline settings: cubic through the cumulative integral
    pub const DEFAULT_SPLINE: RebinMethod = RebinMethod::Spline {
        degree: 3,
        target: SplineTarget::CumulativeIntegral,
    };
}

impl fmt::Display for RebinMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebinMethod::Overlap => f.write_str("tuv"),
            RebinMethod::Spline { degree, target } => {
                write!(f, "trapz_interp(k={degree}, interp={target})")
            }
        }
    }
}

impl FromStr for RebinMethod {
    type Err = ValidationError;

    /// Parse a method name; spline methods get [`RebinMethod::DEFAULT_SPLINE`]
    /// settings.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "tuv" | "overlap" => Ok(RebinMethod::Overlap),
            "trapz_interp" | "spline" => Ok(RebinMethod::DEFAULT_SPLINE),
            other => Err(ValidationError::InvalidSelector {
                setting: "rebinning method",
                value: other.to_string(),
                expected: "\"tuv\", \"trapz_interp\"",
            }),
        }
    }
}

fn check_increasing(grid: &'static str, v: &[f64], min_len: usize) -> Result<()> {
    if v.len() < min_len {
        return Err(ValidationError::SpectralGrid {
            grid,
            detail: format!("needs at least {min_len} values, got {}", v.len()),
        }
        .into());
    }
    if let Some(i) = v.iter().position(|x| !x.is_finite()) {
        return Err(ValidationError::SpectralGrid {
            grid,
            detail: format!("non-finite value at index {i}"),
        }
        .into());
    }
    if let Some(i) = v.windows(2).position(|w| w[1] <= w[0]) {
        return Err(ValidationError::SpectralGrid {
            grid,
            detail: format!("not strictly increasing at index {}", i + 1),
        }
        .into());
    }
    Ok(())
}

fn check_inputs(x: &[f64], y: &[f64], edges: &[f64]) -> Result<()> {
    check_increasing("input abscissae", x, 2)?;
    if y.len() != x.len() {
        return Err(ValidationError::LengthMismatch {
            what: "input spectrum",
            expected: x.len(),
            actual: y.len(),
        }
        .into());
    }
    check_increasing("bin edges", edges, 2)
}

/// Trapezoidal area of `y(x)` over `[lo, hi]`, with `first` the index of the
/// first segment that can overlap it.
fn overlap_area(x: &[f64], y: &[f64], lo: f64, hi: f64, first: usize) -> f64 {
    let mut area = 0.0;
    for k in first..x.len() - 1 {
        if x[k] > hi {
            break;
        }
        if x[k + 1] < lo {
            continue;
        }
        let a1 = x[k].max(lo);
        let a2 = x[k + 1].min(hi);
        let slope = (y[k + 1] - y[k]) / (x[k + 1] - x[k]);
        let b1 = y[k] + slope * (a1 - x[k]);
        let b2 = y[k] + slope * (a2 - x[k]);
        area += (a2 - a1) * (b1 + b2) / 2.0;
    }
    area
}

/// Rebin by accumulating the overlap of every input segment with each bin.
///
/// No extrapolation: the parts of bins outside `[x[0], x[n-1]]` contribute
/// nothing, so their mean values are biased low.
pub fn rebin_overlap(x: &[f64], y: &[f64], edges: &[f64]) -> Result<Vec<f64>> {
    check_inputs(x, y, edges)?;
    let (x_min, x_max) = (x[0], x[x.len() - 1]);
    let clipped = edges
        .windows(2)
        .filter(|e| e[0] < x_min || e[1] > x_max)
        .count();
    if clipped > 0 {
        debug!(
            "{clipped} of {} bins extend beyond the input domain [{x_min}, {x_max}]; \
             contributions outside it are dropped",
            edges.len() - 1
        );
    }

    let values = edges
        .windows(2)
        .map(|e| {
            let (lo, hi) = (e[0], e[1]);
            let first = x.partition_point(|&v| v < lo).saturating_sub(1);
            let mean = overlap_area(x, y, lo, hi, first) / (hi - lo);
            trace!("bin [{lo}, {hi}] from segment {first}: {mean}");
            mean
        })
        .collect();
    Ok(values)
}

/// Rebin by spline interpolation of degree `degree` (1-5).
///
/// With [`SplineTarget::CumulativeIntegral`] the spline passes through the
/// cumulative trapezoidal integral and bin means are its differences over
/// the bin widths, which conserves the total exactly when the outer edges
/// coincide with data points. [`SplineTarget::Values`] interpolates `y` at
/// the edges and integrates trapezoidally between them.
pub fn rebin_spline(
    x: &[f64],
    y: &[f64],
    edges: &[f64],
    degree: usize,
    target: SplineTarget,
) -> Result<Vec<f64>> {
    check_inputs(x, y, edges)?;
    let values = match target {
        SplineTarget::CumulativeIntegral => {
            let cumulative = cumulative_trapezoid(x, y);
            let spline = BSpline::interpolate(x, &cumulative, degree)?;
            let at_edges = spline.evaluate_all(edges);
            at_edges
                .windows(2)
                .zip(edges.windows(2))
                .map(|(f, e)| (f[1] - f[0]) / (e[1] - e[0]))
                .collect()
        }
        SplineTarget::Values => {
            let spline = BSpline::interpolate(x, y, degree)?;
            let at_edges = spline.evaluate_all(edges);
            let cumulative = cumulative_trapezoid(edges, &at_edges);
            cumulative
                .windows(2)
                .zip(edges.windows(2))
                .map(|(f, e)| (f[1] - f[0]) / (e[1] - e[0]))
                .collect()
        }
    };
    debug!(
        "spline rebin (k = {degree}, interp = {target}): {} points -> {} bins",
        x.len(),
        edges.len() - 1
    );
    Ok(values)
}

/// Rebin with the chosen method
pub fn rebin(x: &[f64], y: &[f64], edges: &[f64], method: RebinMethod) -> Result<Vec<f64>> {
    match method {
        RebinMethod::Overlap => rebin_overlap(x, y, edges),
        RebinMethod::Spline { degree, target } => rebin_spline(x, y, edges, degree, target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CanopyRtError;
    use approx::assert_relative_eq;

    #[test]
    fn test_selector_parsing() {
        assert_eq!("tuv".parse::<RebinMethod>().unwrap(), RebinMethod::Overlap);
        assert_eq!(
            "trapz_interp".parse::<RebinMethod>().unwrap(),
            RebinMethod::DEFAULT_SPLINE
        );
        assert_eq!("f".parse::<SplineTarget>().unwrap(), SplineTarget::Values);
        let err = "G".parse::<SplineTarget>().unwrap_err();
        assert!(err.to_string().contains("\"G\""));
        assert!(matches!(
            "cubic".parse::<RebinMethod>(),
            Err(ValidationError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&RebinMethod::DEFAULT_SPLINE).unwrap();
        assert_eq!(json, r#"{"method":"spline","degree":3,"target":"F"}"#);
        let back: RebinMethod = serde_json::from_str(r#"{"method":"overlap"}"#).unwrap();
        assert_eq!(back, RebinMethod::Overlap);
    }

    #[test]
    fn test_overlap_linear_function_is_exact() {
        // Bin means of a linear function are its values at the bin centres
        let x: Vec<f64> = (0..11).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let edges = [0.03, 0.07, 0.25, 0.61, 0.99];
        let out = rebin_overlap(&x, &y, &edges).unwrap();
        for (i, e) in edges.windows(2).enumerate() {
            let centre = 0.5 * (e[0] + e[1]);
            assert_relative_eq!(out[i], 2.0 * centre + 1.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_overlap_drops_outside_domain() {
        let x = [1.0, 2.0];
        let y = [1.0, 1.0];
        // Half of the bin lies below the data
        let out = rebin_overlap(&x, &y, &[0.0, 2.0]).unwrap();
        assert_relative_eq!(out[0], 0.5);
        // Entirely outside
        let out = rebin_overlap(&x, &y, &[3.0, 4.0]).unwrap();
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn test_spline_linear_degree_matches_overlap_on_aligned_edges() {
        let x: Vec<f64> = (0..21).map(|i| 0.3 + i as f64 * 0.05).collect();
        let y: Vec<f64> = x.iter().map(|v| (3.0 * v).sin() + 2.0).collect();
        let edges: Vec<f64> = x.iter().step_by(4).copied().collect();
        let overlap = rebin_overlap(&x, &y, &edges).unwrap();
        let spline = rebin_spline(&x, &y, &edges, 1, SplineTarget::CumulativeIntegral).unwrap();
        for (a, b) in overlap.iter().zip(&spline) {
            assert_relative_eq!(a, b, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_invalid_grids() {
        assert!(matches!(
            rebin_overlap(&[1.0, 1.0], &[1.0, 2.0], &[0.0, 1.0]),
            Err(CanopyRtError::Validation(ValidationError::SpectralGrid { .. }))
        ));
        assert!(rebin_overlap(&[1.0, 2.0], &[1.0], &[0.0, 1.0]).is_err());
        assert!(rebin_overlap(&[1.0, 2.0], &[1.0, 2.0], &[1.0]).is_err());
        assert!(rebin_spline(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], &[1.0, 3.0], 6, SplineTarget::Values).is_err());
    }
}
