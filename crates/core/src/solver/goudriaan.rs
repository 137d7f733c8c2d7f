//! Goudriaan (1977) single-scattering scheme, following Bodin & Franklin (2012)
//!
//! One band at a time: the direct beam is attenuated with `K_b`, incoming
//! diffuse with the scheme's own `k_d = 0.8·√(1−σ)`, and radiation scattered out
//! of the direct beam is split evenly between the upward and downward
//! streams. The ground reflects everything reaching it back up.
//!
//! # References
//!
//! - Goudriaan, J. (1977). "Crop Micrometeorology: A Simulation Study".
//! - Spitters, C.J.T. (1986). Agricultural and Forest Meteorology, 38, 231-242, eq. 1.
//! - Bodin, P. & Franklin, O. (2012). Geoscientific Model Development, 5, 535-541.

use rayon::prelude::*;
use tracing::{debug, info};

use super::r#trait::{RadiativeTransferScheme, SchemeInputs, SchemeOutput};
use crate::core_types::{
    check_zenith, CanopyLayerProfile, LeafOpticalProperties, RadiationProfile,
};
use crate::error::{CanopyRtError, Result};

/// Canopy hemispherical reflectance `ρ_c` (Spitters 1986 eq. 1)
#[inline]
fn canopy_reflectance(k_prime: f64, mu: f64) -> f64 {
    ((1.0 - k_prime) / (1.0 + k_prime)) * (2.0 / (1.0 + 1.6 * mu))
}

/// Solve one band.
///
/// `direct0` and `diffuse0` are the band-integrated top-of-canopy
/// irradiances (W m⁻²), `k_b` the direct-beam extinction coefficient at the
/// solar zenith angle `psi`.
///
/// # Errors
///
/// Domain error for ψ outside [0, π/2), a non-finite or negative `K_b`, or
/// optics with non-positive absorptance.
pub fn solve_band(
    profile: &CanopyLayerProfile,
    optics: &LeafOpticalProperties,
    direct0: f64,
    diffuse0: f64,
    psi: f64,
    k_b: f64,
) -> Result<RadiationProfile> {
    check_zenith(psi)?;
    if !(k_b.is_finite() && k_b >= 0.0) {
        return Err(CanopyRtError::domain("K_b", k_b, "must be finite and >= 0"));
    }
    let r_l = optics.reflectance;
    let t_l = optics.transmittance;
    let w = optics.soil_reflectance;
    let sigma = optics.scattering();
    let alpha = optics.checked_absorptance()?;
    let k_prime = alpha.sqrt();
    let mu = psi.cos();

    let rho_c = canopy_reflectance(k_prime, mu);
    // Scheme-local diffuse attenuation; not the hemispherical K_d
    let k_d = 0.8 * (1.0 - sigma).sqrt();

    let lai = profile.as_slice();
    let lai_total = profile.lai_total();
    let n = lai.len();

    let sunlit: Vec<f64> = lai.iter().map(|&l| (-k_b * l).exp()).collect();
    let direct: Vec<f64> = sunlit.iter().map(|&a| direct0 * a).collect();
    let diffuse_unscattered: Vec<f64> = lai
        .iter()
        .map(|&l| diffuse0 * (1.0 - rho_c) * (-k_d * l).exp())
        .collect();
    let scattered_half: Vec<f64> = lai
        .iter()
        .zip(&sunlit)
        .map(|(&l, &a)| {
            let released = direct0 * (1.0 - rho_c) * (-k_b * k_prime * l).exp()
                - direct0 * (1.0 - sigma) * a;
            0.5 * released
        })
        .collect();

    // Index 0 is the ground
    let ground_incident = direct0 * sunlit[0] + diffuse_unscattered[0] + scattered_half[0];
    let soil_reflected: Vec<f64> = lai
        .iter()
        .map(|&l| w * ground_incident * (-k_d * (lai_total - l)).exp())
        .collect();

    let c_unscattered = k_d / k_prime;
    let c_up = k_d / (1.0 - r_l).sqrt();
    let c_down = k_d / (1.0 - t_l).sqrt();

    let mut out = RadiationProfile {
        direct,
        diffuse_down: Vec::with_capacity(n),
        diffuse_up: Vec::with_capacity(n),
        scalar: Vec::with_capacity(n),
        absorbed_sunlit: Vec::with_capacity(n),
        absorbed_shaded: Vec::with_capacity(n),
    };
    for i in 0..n {
        let a_sl = sunlit[i];
        let i_sc = scattered_half[i];
        let diffuse_absorbed =
            c_unscattered * diffuse_unscattered[i] + c_up * i_sc + c_down * i_sc;
        out.absorbed_shaded.push((1.0 - a_sl) * diffuse_absorbed);
        out.absorbed_sunlit
            .push(a_sl * diffuse_absorbed + a_sl * k_b * direct0);

        let down = i_sc + diffuse_unscattered[i];
        let up = i_sc + soil_reflected[i];
        out.diffuse_down.push(down);
        out.diffuse_up.push(up);
        out.scalar.push(out.direct[i] / mu + 2.0 * (up + down));
    }
    Ok(out)
}

/// Goudriaan scheme, registered as `gd`
#[derive(Debug, Clone, Copy, Default)]
pub struct GoudriaanScheme;

impl RadiativeTransferScheme for GoudriaanScheme {
    fn id(&self) -> &str {
        "gd"
    }

    fn short_name(&self) -> &str {
        "Gou"
    }

    fn long_name(&self) -> &str {
        "Goudriaan"
    }

    fn solve(&self, inputs: &SchemeInputs<'_>) -> Result<SchemeOutput> {
        inputs.validate()?;
        let psi = inputs.psi();
        let k_b = inputs.projection.k_b(psi);
        let toc = inputs.irradiance;
        info!(
            "Goudriaan solve: {} bands, {} levels, psi = {psi:.4} rad, K_b = {k_b:.4}",
            toc.n_bands(),
            inputs.profile.len()
        );

        let solve_one = |j: usize| {
            let band = &toc.bands[j];
            let optics = inputs.optics.band(j)?;
            debug!("band {j} at {:.4} um", band.wavelength);
            solve_band(inputs.profile, &optics, band.direct, band.diffuse, psi, k_b)
        };
        let bands = if inputs.config.parallel {
            (0..toc.n_bands())
                .into_par_iter()
                .map(solve_one)
                .collect::<Result<Vec<_>>>()?
        } else {
            (0..toc.n_bands())
                .map(solve_one)
                .collect::<Result<Vec<_>>>()?
        };
        Ok(SchemeOutput::from_band_profiles(
            toc,
            inputs.profile.len(),
            &bands,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference_optics() -> LeafOpticalProperties {
        LeafOpticalProperties::new(0.10, 0.05, 0.15, 1.0).unwrap()
    }

    fn two_level() -> CanopyLayerProfile {
        CanopyLayerProfile::new(vec![1.0, 0.0]).unwrap()
    }

    #[test]
    fn test_direct_beam_two_levels() {
        let out = solve_band(&two_level(), &reference_optics(), 500.0, 100.0, 0.0, 0.5).unwrap();
        assert_relative_eq!(out.direct[1], 500.0);
        assert_relative_eq!(out.direct[0], 500.0 * (-0.5_f64).exp(), max_relative = 1e-12);
        assert!(out.direct[0] < out.direct[1]);
    }

    #[test]
    fn test_top_of_canopy_closure() {
        // At the top the unscattered diffuse is I_df0·(1−ρ_c)
        let optics = reference_optics();
        let out = solve_band(&two_level(), &optics, 500.0, 100.0, 0.0, 0.5).unwrap();
        let k_prime = optics.absorptance().sqrt();
        let rho_c = canopy_reflectance(k_prime, 1.0);
        let scattered = 0.5 * (500.0 * (1.0 - rho_c) - 500.0 * 0.85);
        assert_relative_eq!(out.diffuse_down[1], scattered + 100.0 * (1.0 - rho_c), max_relative = 1e-12);
    }

    #[test]
    fn test_scalar_flux_identity() {
        let profile = CanopyLayerProfile::uniform(4.0, 9).unwrap();
        let psi = 0.7;
        let out = solve_band(&profile, &reference_optics(), 300.0, 80.0, psi, 0.5 / psi.cos()).unwrap();
        assert!(out.scalar_flux_residual(psi) < 1e-9);
    }

    #[test]
    fn test_sunlit_absorption_includes_direct_interception() {
        let optics = reference_optics();
        let with_beam = solve_band(&two_level(), &optics, 500.0, 100.0, 0.0, 0.5).unwrap();
        let no_beam = solve_band(&two_level(), &optics, 0.0, 100.0, 0.0, 0.5).unwrap();
        // Top level: A_sl = 1, so the beam adds exactly K_b·I_dr0 plus its scattered share
        assert!(with_beam.absorbed_sunlit[1] - no_beam.absorbed_sunlit[1] > 0.5 * 500.0 - 1e-9);
        // Fully sunlit top level has no shaded leaves
        assert_eq!(with_beam.absorbed_shaded[1], 0.0);
    }

    #[test]
    fn test_zero_absorptance_is_domain_error() {
        let optics = LeafOpticalProperties {
            reflectance: 0.6,
            transmittance: 0.4,
            soil_reflectance: 0.1,
            green: 1.0,
        };
        assert!(matches!(
            solve_band(&two_level(), &optics, 1.0, 1.0, 0.0, 0.5),
            Err(CanopyRtError::Domain { .. })
        ));
    }

    #[test]
    fn test_grazing_angle_rejected() {
        let err = solve_band(
            &two_level(),
            &reference_optics(),
            1.0,
            1.0,
            std::f64::consts::FRAC_PI_2,
            0.5,
        );
        assert!(err.is_err());
    }
}
