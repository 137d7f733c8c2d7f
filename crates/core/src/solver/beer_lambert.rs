//! Beer–Lambert black-leaf scheme
//!
//! No scattering: the direct beam decays with `K_b(ψ)`, incoming diffuse with
//! the hemispherically integrated `K_d` of the canopy, and nothing travels
//! upward. Useful as a lower bound on canopy transmission and as a check on
//! the extinction engine.

use rayon::prelude::*;
use tracing::info;

use super::r#trait::{cube, RadiativeTransferScheme, SchemeInputs, SchemeOutput};
use crate::core_types::RadiationProfile;
use crate::error::Result;
use crate::physics::diffuse_extinction_coefficient;

/// Beer–Lambert scheme, registered as `bl`
#[derive(Debug, Clone, Copy, Default)]
pub struct BeerLambertScheme;

impl RadiativeTransferScheme for BeerLambertScheme {
    fn id(&self) -> &str {
        "bl"
    }

    fn short_name(&self) -> &str {
        "B–L"
    }

    fn long_name(&self) -> &str {
        "Beer–Lambert"
    }

    fn solve(&self, inputs: &SchemeInputs<'_>) -> Result<SchemeOutput> {
        inputs.validate()?;
        let psi = inputs.psi();
        let mu = psi.cos();
        let k_b = inputs.projection.k_b(psi);
        let lai_total = inputs.profile.lai_total();
        // Leafless canopy: K_d is undefined but nothing attenuates
        let k_d = if lai_total > 0.0 {
            diffuse_extinction_coefficient(
                inputs.projection,
                lai_total,
                &inputs.config.quadrature,
            )?
        } else {
            0.0
        };
        info!(
            "Beer-Lambert solve: {} bands, K_b = {k_b:.4}, K_d = {k_d:.4}",
            inputs.n_bands()
        );

        let lai = inputs.profile.as_slice();
        let beam: Vec<f64> = lai.iter().map(|&l| (-k_b * l).exp()).collect();
        let sky: Vec<f64> = lai.iter().map(|&l| (-k_d * l).exp()).collect();

        let toc = inputs.irradiance;
        let solve_one = |j: usize| {
            let band = &toc.bands[j];
            let direct: Vec<f64> = beam.iter().map(|&t| band.direct * t).collect();
            let diffuse_down: Vec<f64> = sky.iter().map(|&t| band.diffuse * t).collect();
            let scalar = direct
                .iter()
                .zip(&diffuse_down)
                .map(|(dr, df)| dr / mu + 2.0 * df)
                .collect();
            RadiationProfile {
                direct,
                diffuse_down,
                diffuse_up: vec![0.0; lai.len()],
                scalar,
                absorbed_sunlit: Vec::new(),
                absorbed_shaded: Vec::new(),
            }
        };
        let bands: Vec<RadiationProfile> = if inputs.config.parallel {
            (0..toc.n_bands()).into_par_iter().map(solve_one).collect()
        } else {
            (0..toc.n_bands()).map(solve_one).collect()
        };

        let n = lai.len();
        Ok(SchemeOutput::new(
            toc,
            cube(&bands, n, |b| b.direct.as_slice()),
            cube(&bands, n, |b| b.diffuse_down.as_slice()),
            cube(&bands, n, |b| b.diffuse_up.as_slice()),
            cube(&bands, n, |b| b.scalar.as_slice()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfig;
    use crate::core_types::{CanopyLayerProfile, SpectralOptics, TopOfCanopyIrradiance};
    use crate::physics::LeafAngleDistribution;
    use approx::assert_relative_eq;

    #[test]
    fn test_horizontal_leaves_share_one_coefficient() {
        // Horizontal leaves: K_b = K_d = 1
        let toc =
            TopOfCanopyIrradiance::from_arrays(&[0.55], &[0.01], &[400.0], &[100.0], 0.0).unwrap();
        let profile = CanopyLayerProfile::new(vec![2.0, 1.0, 0.0]).unwrap();
        let optics = SpectralOptics::new(vec![0.1], vec![0.05], vec![0.1], 1.0).unwrap();
        let dist = LeafAngleDistribution::Horizontal;
        let inputs = SchemeInputs::new(&toc, &profile, &optics, &dist)
            .unwrap()
            .with_config(SolverConfig::sequential());
        let out = BeerLambertScheme.solve(&inputs).unwrap();
        for (i, lai) in [2.0_f64, 1.0, 0.0].into_iter().enumerate() {
            assert_relative_eq!(out.direct[(i, 0)], 400.0 * (-lai).exp(), max_relative = 1e-12);
            assert_relative_eq!(out.diffuse_down[(i, 0)], 100.0 * (-lai).exp(), max_relative = 1e-7);
            assert_eq!(out.diffuse_up[(i, 0)], 0.0);
        }
        assert!(out.get("aI").is_none());
    }

    #[test]
    fn test_leafless_canopy_is_transparent() {
        let toc = TopOfCanopyIrradiance::from_arrays(&[0.55], &[0.01], &[400.0], &[100.0], 0.3)
            .unwrap();
        let profile = CanopyLayerProfile::new(vec![0.0, 0.0]).unwrap();
        let optics = SpectralOptics::new(vec![0.1], vec![0.05], vec![0.1], 1.0).unwrap();
        let dist = LeafAngleDistribution::Spherical;
        let inputs = SchemeInputs::new(&toc, &profile, &optics, &dist).unwrap();
        let out = BeerLambertScheme.solve(&inputs).unwrap();
        assert_eq!(out.direct[(0, 0)], 400.0);
        assert_eq!(out.diffuse_down[(0, 0)], 100.0);
    }
}
