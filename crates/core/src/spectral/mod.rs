//! Spectral grids: rebinning and top-of-canopy irradiance preparation

pub mod irradiance;
pub mod rebin;

pub use irradiance::{edges_from_centers, smear_irradiance};
pub use rebin::{rebin, rebin_overlap, rebin_spline, RebinMethod, SplineTarget};
