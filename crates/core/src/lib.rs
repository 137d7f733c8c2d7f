//! One-dimensional canopy radiative transfer
//!
//! Computes how shortwave radiation is attenuated, scattered and absorbed in
//! a horizontally homogeneous plant canopy, band by band: vertical profiles
//! of direct, diffuse (down and up) and scalar flux, plus absorption by
//! sunlit and shaded leaves.
//!
//! ## Components
//!
//! - [`physics::leaf_angle`]: leaf inclination PDFs and projection functions G(ψ)
//! - [`physics::extinction`]: `K_b(ψ)`, diffuse transmittance `τ_d` and `K_d`
//! - [`solver`]: per-band schemes (Goudriaan, Beer–Lambert) behind a common
//!   trait and an explicit registry
//! - [`spectral`]: conservative rebinning of spectra onto model bands
//!
//! All computations are pure. Per-band solves and per-layer quadratures run
//! on the rayon pool when [`SolverConfig::parallel`] is set.

// Core types and utilities
pub mod config;
pub mod core_types;
pub mod error;
pub mod numerics;

// Canopy optics and radiative transfer
pub mod physics;
pub mod solver;
pub mod spectral;

// Re-export core types
pub use config::{QuadratureConfig, SolverConfig};
pub use core_types::{
    CanopyLayerProfile, Elementwise, LeafOpticalProperties, RadiationProfile, SpectralBand,
    SpectralOptics, TopOfCanopyIrradiance,
};
pub use error::{CanopyRtError, IntegrandContext, QuadratureFailure, Result, ValidationError};

// Re-export physics and schemes
pub use physics::{
    diffuse_extinction_coefficient, diffuse_transmittance, CustomProjection,
    LeafAngleDistribution, PdfFamily, PdfProjection, ProjectionFunction,
};
pub use solver::{
    OutputKey, RadiativeTransferScheme, SchemeInputs, SchemeOutput, SchemeRegistry,
    SpectralWindow,
};
pub use spectral::{RebinMethod, SplineTarget};
