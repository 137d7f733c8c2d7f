//! Solver configuration
//!
//! Numerical knobs shared by the extinction engine and the scheme orchestrator.
//! Everything here is plain data with sensible defaults and serde support so a
//! run can be described in JSON alongside its inputs.

use serde::{Deserialize, Serialize};

/// Tolerances and subdivision budget for adaptive quadrature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadratureConfig {
    /// Absolute error tolerance
    pub epsabs: f64,
    /// Relative error tolerance
    pub epsrel: f64,
    /// Maximum number of interval bisections before reporting non-convergence
    pub max_subdivisions: usize,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        Self {
            epsabs: 1.49e-8,
            epsrel: 1e-9,
            max_subdivisions: 100,
        }
    }
}

impl QuadratureConfig {
    /// Tolerances used for mean-leaf-angle integrals
    ///
    /// Inclination PDFs of strongly erectophile ellipsoids are sharply peaked,
    /// so these integrals use the looser default relative tolerance.
    pub fn mean_leaf_angle() -> Self {
        Self {
            epsrel: 1.49e-8,
            ..Self::default()
        }
    }
}

/// Configuration for a full-spectrum solve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub quadrature: QuadratureConfig,
    /// Run per-band solves and per-layer quadratures on the rayon pool
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            quadrature: QuadratureConfig::default(),
            parallel: true,
        }
    }
}

impl SolverConfig {
    /// Single-threaded configuration (deterministic scheduling, handy for profiling)
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SolverConfig::default();
        assert!(cfg.parallel);
        assert_eq!(cfg.quadrature.epsrel, 1e-9);
        assert_eq!(cfg.quadrature.max_subdivisions, 100);
        assert!(!SolverConfig::sequential().parallel);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: SolverConfig =
            serde_json::from_str(r#"{"quadrature": {"max_subdivisions": 7}}"#).unwrap();
        assert_eq!(cfg.quadrature.max_subdivisions, 7);
        assert_eq!(cfg.quadrature.epsrel, 1e-9);
        assert!(cfg.parallel);
    }
}
