//! Canopy radiative-transfer schemes
//!
//! The core abstraction is the [`RadiativeTransferScheme`] trait: every
//! scheme takes the same [`SchemeInputs`] and returns a [`SchemeOutput`] of
//! `levels × bands` spectral cubes. Schemes are collected in an explicit
//! [`SchemeRegistry`] owned by the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use canopy_rt_core::solver::{SchemeInputs, SchemeRegistry};
//!
//! let registry = SchemeRegistry::with_builtin_schemes();
//! let inputs = SchemeInputs::new(&toc, &profile, &optics, &distribution)?;
//! let output = registry.solve("gd", &inputs)?;
//! let absorbed_par = output.absorption_summary().map(|s| s.par);
//! ```

mod beer_lambert;
pub mod goudriaan;
mod registry;
mod spectrum;
#[allow(clippy::module_name_repetitions)]
mod r#trait;

pub use beer_lambert::BeerLambertScheme;
pub use goudriaan::{solve_band, GoudriaanScheme};
pub use r#trait::{OutputKey, RadiativeTransferScheme, SchemeInputs, SchemeOutput};
pub use registry::SchemeRegistry;
pub use spectrum::{window_sum, AbsorptionSummary, SpectralWindow};
