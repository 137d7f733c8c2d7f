//! Per-band radiation profile produced by a band solve

use serde::{Deserialize, Serialize};

/// Fluxes and leaf absorption at every profile level for one band.
///
/// Arrays are indexed like the [`CanopyLayerProfile`](super::CanopyLayerProfile)
/// they were computed on: index 0 is the ground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiationProfile {
    /// Direct-beam flux on a horizontal surface, `I_dr` (W m⁻²)
    pub direct: Vec<f64>,
    /// Downward diffuse flux, `I_df_d` (W m⁻²)
    pub diffuse_down: Vec<f64>,
    /// Upward diffuse flux, `I_df_u` (W m⁻²)
    pub diffuse_up: Vec<f64>,
    /// Scalar (actinic) flux `F = I_dr/cos ψ + 2 (I_df_u + I_df_d)`
    pub scalar: Vec<f64>,
    /// Absorption by sunlit leaves
    pub absorbed_sunlit: Vec<f64>,
    /// Absorption by shaded leaves
    pub absorbed_shaded: Vec<f64>,
}

impl RadiationProfile {
    /// Number of levels
    pub fn len(&self) -> usize {
        self.direct.len()
    }

    pub fn is_empty(&self) -> bool {
        self.direct.is_empty()
    }

    /// Total leaf absorption (sunlit + shaded) per level
    pub fn absorbed(&self) -> Vec<f64> {
        self.absorbed_sunlit
            .iter()
            .zip(&self.absorbed_shaded)
            .map(|(sl, sh)| sl + sh)
            .collect()
    }

    /// Largest violation of ``F = I_dr/cos ψ + 2 (I_df_u + I_df_d)`` over all levels
    pub fn scalar_flux_residual(&self, psi: f64) -> f64 {
        let mu = psi.cos();
        (0..self.len())
            .map(|i| {
                let expected =
                    self.direct[i] / mu + 2.0 * (self.diffuse_up[i] + self.diffuse_down[i]);
                (self.scalar[i] - expected).abs()
            })
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorbed_and_residual() {
        let p = RadiationProfile {
            direct: vec![1.0, 2.0],
            diffuse_down: vec![0.5, 0.5],
            diffuse_up: vec![0.25, 0.0],
            scalar: vec![2.5, 3.0],
            absorbed_sunlit: vec![0.1, 0.2],
            absorbed_shaded: vec![0.3, 0.4],
        };
        assert_eq!(p.len(), 2);
        let absorbed = p.absorbed();
        assert!((absorbed[0] - 0.4).abs() < 1e-12);
        assert!((absorbed[1] - 0.6).abs() < 1e-12);
        assert!(p.scalar_flux_residual(0.0) < 1e-12);
    }
}
