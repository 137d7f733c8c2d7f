//! Extinction coefficients
//!
//! `K_b(ψ) = G(ψ)/cos ψ` attenuates the direct beam of a black-leaved canopy.
//! Integrating `exp(−K_b·LAI)` over the upper hemisphere gives the diffuse
//! transmittance `τ_d` and from it the bulk diffuse coefficient
//! `K_d = −ln(τ_d)/LAI`.
//!
//! `K_b` is left unclamped: it diverges at grazing incidence like the physical
//! path length does.

use std::f64::consts::FRAC_PI_2;

use rayon::prelude::*;
use tracing::debug;

use super::leaf_angle::ProjectionFunction;
use crate::config::{QuadratureConfig, SolverConfig};
use crate::error::{CanopyRtError, IntegrandContext, Result};
use crate::numerics::integrate;

/// Direct-beam extinction coefficient `K_b(ψ)`
pub fn k_b(projection: &dyn ProjectionFunction, psi: f64) -> f64 {
    projection.k_b(psi)
}

/// Direct-beam transmittance `τ_b(ψ, LAI) = exp(−K_b(ψ)·LAI)`
pub fn direct_transmittance(projection: &dyn ProjectionFunction, psi: f64, lai: f64) -> f64 {
    (-projection.k_b(psi) * lai).exp()
}

fn check_lai(lai: f64) -> Result<()> {
    if lai.is_finite() && lai >= 0.0 {
        Ok(())
    } else {
        Err(CanopyRtError::domain("LAI", lai, "must be finite and >= 0"))
    }
}

/// Hemispherical diffuse transmittance
/// `τ_d(LAI) = 2 ∫₀^{π/2} exp(−K_b(ψ)·LAI) sin ψ cos ψ dψ`.
///
/// `LAI == 0` returns exactly 1 without integrating.
pub fn diffuse_transmittance(
    projection: &dyn ProjectionFunction,
    lai: f64,
    config: &QuadratureConfig,
) -> Result<f64> {
    check_lai(lai)?;
    if lai == 0.0 {
        return Ok(1.0);
    }
    let context = IntegrandContext {
        family: projection.family().to_string(),
        shape: projection.shape_parameter(),
        lai: Some(lai),
        quantity: "diffuse transmittance",
    };
    let integrand = |psi: f64| {
        let (s, c) = psi.sin_cos();
        (-projection.k_b(psi) * lai).exp() * s * c
    };
    let q = integrate(integrand, 0.0, FRAC_PI_2, config, &context)?;
    Ok(2.0 * q.value)
}

/// `τ_d` for every element of an LAI array.
///
/// Elements are independent; with `config.parallel` they are integrated on
/// the rayon pool. The first failure is returned.
pub fn diffuse_transmittance_profile(
    projection: &dyn ProjectionFunction,
    lai: &[f64],
    config: &SolverConfig,
) -> Result<Vec<f64>> {
    let quadrature = &config.quadrature;
    let tau = if config.parallel {
        lai.par_iter()
            .map(|&l| diffuse_transmittance(projection, l, quadrature))
            .collect::<Result<Vec<_>>>()?
    } else {
        lai.iter()
            .map(|&l| diffuse_transmittance(projection, l, quadrature))
            .collect::<Result<Vec<_>>>()?
    };
    debug!(
        "diffuse transmittance for {} LAI values ({} distribution)",
        lai.len(),
        projection.family()
    );
    Ok(tau)
}

/// Bulk diffuse extinction coefficient `K_d(LAI_total) = −ln(τ_d)/LAI_total`.
///
/// Undefined at zero LAI; that boundary is a domain error.
pub fn diffuse_extinction_coefficient(
    projection: &dyn ProjectionFunction,
    lai_total: f64,
    config: &QuadratureConfig,
) -> Result<f64> {
    if !(lai_total.is_finite() && lai_total > 0.0) {
        return Err(CanopyRtError::domain(
            "total LAI",
            lai_total,
            "K_d requires finite LAI > 0",
        ));
    }
    let tau = diffuse_transmittance(projection, lai_total, config)?;
    let k_d = -tau.ln() / lai_total;
    debug!(
        "K_d = {k_d:.6} for LAI {lai_total} ({} distribution)",
        projection.family()
    );
    Ok(k_d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::leaf_angle::{CustomProjection, LeafAngleDistribution};
    use approx::assert_relative_eq;

    fn cfg() -> QuadratureConfig {
        QuadratureConfig::default()
    }

    #[test]
    fn test_k_b_spherical() {
        let sph = LeafAngleDistribution::Spherical;
        assert_relative_eq!(k_b(&sph, 0.0), 0.5);
        assert_relative_eq!(k_b(&sph, 1.0), 0.5 / 1.0_f64.cos());
        assert_relative_eq!(direct_transmittance(&sph, 0.0, 1.0), (-0.5_f64).exp());
    }

    #[test]
    fn test_k_b_grows_towards_grazing() {
        let sph = LeafAngleDistribution::Spherical;
        assert!(k_b(&sph, 1.5) > 7.0);
        assert!(k_b(&sph, FRAC_PI_2 - 1e-9) > 1e8);
    }

    #[test]
    fn test_tau_d_zero_lai_is_one() {
        let sph = LeafAngleDistribution::Spherical;
        assert_eq!(diffuse_transmittance(&sph, 0.0, &cfg()).unwrap(), 1.0);
    }

    #[test]
    fn test_tau_d_horizontal_closed_form() {
        // K_b = 1 for horizontal leaves, so τ_d = exp(−LAI)
        let hz = LeafAngleDistribution::Horizontal;
        for lai in [0.5, 2.0, 5.0] {
            assert_relative_eq!(
                diffuse_transmittance(&hz, lai, &cfg()).unwrap(),
                (-lai).exp(),
                max_relative = 1e-8
            );
        }
    }

    #[test]
    fn test_k_d_constant_k_b() {
        let unit = CustomProjection::new("unit", f64::cos);
        assert_relative_eq!(
            diffuse_extinction_coefficient(&unit, 3.0, &cfg()).unwrap(),
            1.0,
            max_relative = 1e-8
        );
    }

    #[test]
    fn test_k_d_zero_lai_is_domain_error() {
        let sph = LeafAngleDistribution::Spherical;
        assert!(matches!(
            diffuse_extinction_coefficient(&sph, 0.0, &cfg()),
            Err(CanopyRtError::Domain { .. })
        ));
        assert!(diffuse_transmittance(&sph, -1.0, &cfg()).is_err());
    }

    #[test]
    fn test_non_convergence_names_distribution_and_lai() {
        let ell = LeafAngleDistribution::ellipsoidal(0.5).unwrap();
        let starved = QuadratureConfig {
            epsabs: 0.0,
            epsrel: 1e-15,
            max_subdivisions: 1,
        };
        let results = [
            diffuse_transmittance(&ell, 3.0, &starved),
            diffuse_extinction_coefficient(&ell, 3.0, &starved),
        ];
        for result in results {
            match result {
                Err(CanopyRtError::NonConvergence(failure)) => {
                    assert_eq!(failure.context.family, "ellipsoidal");
                    assert_eq!(failure.context.shape, Some(0.5));
                    assert_eq!(failure.context.lai, Some(3.0));
                    assert_eq!(failure.subdivisions, 1);
                    assert_eq!((failure.lower, failure.upper), (0.0, FRAC_PI_2));
                }
                other => panic!("expected non-convergence, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_profile_parallel_matches_sequential() {
        let dist = LeafAngleDistribution::ellipsoidal(2.0).unwrap();
        let lai = [3.0, 2.0, 1.0, 0.5, 0.0];
        let par = diffuse_transmittance_profile(&dist, &lai, &SolverConfig::default()).unwrap();
        let seq = diffuse_transmittance_profile(&dist, &lai, &SolverConfig::sequential()).unwrap();
        assert_eq!(par, seq);
        assert_eq!(par[4], 1.0);
    }
}
