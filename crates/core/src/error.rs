//! Error types shared by every component of the canopy radiative-transfer core.
//!
//! All computations are deterministic, so nothing here is retried: an error is
//! returned to the caller as soon as it is detected.

use std::fmt;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CanopyRtError>;

/// Top-level error for the canopy RT core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CanopyRtError {
    /// Malformed input structure (profile shape, selector strings, array lengths).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A physical or leaf-angle parameter lies outside the range where the
    /// formulas are defined.
    #[error("domain error: {parameter} = {value} {reason}")]
    Domain {
        parameter: &'static str,
        value: f64,
        reason: String,
    },

    /// Adaptive quadrature exhausted its subdivision budget.
    #[error(transparent)]
    NonConvergence(#[from] QuadratureFailure),
}

impl CanopyRtError {
    pub(crate) fn domain(parameter: &'static str, value: f64, reason: impl Into<String>) -> Self {
        CanopyRtError::Domain {
            parameter,
            value,
            reason: reason.into(),
        }
    }
}

/// Structural validation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("LAI profile violates `{invariant}` at index {index}: {detail}")]
    LaiProfile {
        invariant: &'static str,
        index: usize,
        detail: String,
    },

    #[error("invalid {setting} {value:?}; expected one of {expected}")]
    InvalidSelector {
        setting: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("length mismatch: {what} has {actual} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid spectral grid `{grid}`: {detail}")]
    SpectralGrid { grid: &'static str, detail: String },

    #[error("no scheme registered under id {0:?}")]
    UnknownScheme(String),
}

/// What was being integrated when a quadrature failed.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrandContext {
    /// Leaf angle distribution family (e.g. `"ellipsoidal"`).
    pub family: String,
    /// Shape parameter of the family, if it has one.
    pub shape: Option<f64>,
    /// Cumulative LAI the integrand was evaluated for, if any.
    pub lai: Option<f64>,
    /// Short name of the integrated quantity (e.g. `"tau_d"`).
    pub quantity: &'static str,
}

impl fmt::Display for IntegrandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for {} distribution", self.quantity, self.family)?;
        if let Some(shape) = self.shape {
            write!(f, " (shape = {shape})")?;
        }
        if let Some(lai) = self.lai {
            write!(f, " at LAI = {lai}")?;
        }
        Ok(())
    }
}

/// Non-convergence report from the adaptive integrator.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "quadrature of {context} over [{lower}, {upper}] did not converge after {subdivisions} \
     subdivisions (estimate {estimate:e}, error {abs_error:e})"
)]
pub struct QuadratureFailure {
    pub context: IntegrandContext,
    pub lower: f64,
    pub upper: f64,
    pub subdivisions: usize,
    pub estimate: f64,
    pub abs_error: f64,
}
