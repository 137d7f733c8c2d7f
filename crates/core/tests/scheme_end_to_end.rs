//! End-to-end radiative transfer through the scheme registry
//!
//! Run tests with: cargo test --test `scheme_end_to_end`

use approx::assert_relative_eq;
use canopy_rt_core::solver::{solve_band, SpectralWindow};
use canopy_rt_core::spectral::{smear_irradiance, RebinMethod};
use canopy_rt_core::{
    CanopyLayerProfile, CanopyRtError, LeafAngleDistribution, LeafOpticalProperties, OutputKey,
    ProjectionFunction, SchemeInputs, SchemeRegistry, SolverConfig, SpectralOptics,
    TopOfCanopyIrradiance, ValidationError,
};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Single band reference case
// ═══════════════════════════════════════════════════════════════════════════════

fn reference_optics() -> LeafOpticalProperties {
    LeafOpticalProperties::new(0.10, 0.05, 0.15, 1.0).unwrap()
}

#[test]
fn test_two_level_reference_case() {
    let profile = CanopyLayerProfile::new(vec![1.0, 0.0]).unwrap();
    let k_b = LeafAngleDistribution::Spherical.k_b(0.0);
    assert_relative_eq!(k_b, 0.5);

    let out = solve_band(&profile, &reference_optics(), 500.0, 100.0, 0.0, k_b).unwrap();
    assert_relative_eq!(out.direct[1], 500.0);
    assert_relative_eq!(out.direct[0], 303.265_329_856_316_7, max_relative = 1e-12);
    assert!(out.direct[0] < out.direct[1]);
    assert!(out.scalar_flux_residual(0.0) < 1e-10);
}

#[test]
fn test_direct_decreases_towards_ground() {
    let profile = CanopyLayerProfile::uniform(5.0, 21).unwrap();
    let out = solve_band(&profile, &reference_optics(), 500.0, 100.0, 0.4, 0.6).unwrap();
    // index 0 is the ground, so direct flux increases with index
    for w in out.direct.windows(2) {
        assert!(w[0] < w[1]);
    }
    for i in 0..out.len() {
        assert!(out.absorbed_sunlit[i] >= 0.0 && out.absorbed_shaded[i] >= 0.0);
        assert!(out.diffuse_up[i] >= 0.0 && out.diffuse_down[i] >= 0.0);
    }
}

#[test]
fn test_malformed_profiles_rejected_before_solving() {
    for lai in [vec![], vec![0.0, 1.0], vec![1.0, -0.1], vec![f64::NAN, 0.0]] {
        assert!(matches!(
            CanopyLayerProfile::new(lai),
            Err(CanopyRtError::Validation(ValidationError::LaiProfile { .. }))
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Full spectrum through the registry
// ═══════════════════════════════════════════════════════════════════════════════

struct Case {
    toc: TopOfCanopyIrradiance,
    profile: CanopyLayerProfile,
    optics: SpectralOptics,
    distribution: LeafAngleDistribution,
}

fn idealized_case() -> Case {
    let wl: Vec<f64> = (0..400).map(|i| 0.3 + 0.0057 * f64::from(i)).collect();
    let si_dr: Vec<f64> = wl
        .iter()
        .map(|&w| 1600.0 * (-(w - 0.55).powi(2) / 0.15).exp() + 20.0)
        .collect();
    let si_df: Vec<f64> = si_dr.iter().map(|v| 0.25 * v).collect();
    let edges: Vec<f64> = (0..=30).map(|i| 0.3 + 0.075 * f64::from(i)).collect();
    let toc = smear_irradiance(&wl, &si_dr, &si_df, &edges, 20_f64.to_radians(), RebinMethod::Overlap)
        .unwrap();

    let centers = toc.wavelengths();
    let leaf_r = centers.iter().map(|&w| if w < 0.7 { 0.08 } else { 0.45 }).collect();
    let leaf_t = centers.iter().map(|&w| if w < 0.7 { 0.05 } else { 0.40 }).collect();
    let soil_r = centers.iter().map(|&w| if w <= 0.7 { 0.11 } else { 0.225 }).collect();
    Case {
        toc,
        profile: CanopyLayerProfile::uniform(4.0, 11).unwrap(),
        optics: SpectralOptics::new(leaf_r, leaf_t, soil_r, 1.0).unwrap(),
        distribution: LeafAngleDistribution::from_mean_leaf_angle(57.0).unwrap(),
    }
}

#[test]
fn test_goudriaan_full_spectrum() {
    let case = idealized_case();
    let registry = SchemeRegistry::with_builtin_schemes();
    let inputs = SchemeInputs::new(&case.toc, &case.profile, &case.optics, &case.distribution).unwrap();
    let out = registry.solve("gd", &inputs).unwrap();

    assert_eq!(out.n_levels(), 11);
    assert_eq!(out.n_bands(), 30);
    for key in OutputKey::REQUIRED {
        assert!(out.get(key.as_str()).is_some(), "missing {key}");
    }
    // Top of canopy direct equals the boundary condition in every band
    for (j, band) in case.toc.bands.iter().enumerate() {
        assert_relative_eq!(out.direct[(10, j)], band.direct);
    }
    for j in 0..out.n_bands() {
        let profile = out.band_profile(j).unwrap();
        assert!(profile.scalar_flux_residual(case.toc.psi) < 1e-9);
    }

    let summary = out.absorption_summary().unwrap();
    for i in 0..out.n_levels() {
        assert!(summary.par[i] <= summary.solar[i] + 1e-12);
        assert_relative_eq!(
            summary.par[i],
            summary.par_sunlit[i] + summary.par_shaded[i],
            max_relative = 1e-12
        );
    }
    let uv = out
        .window_sum(OutputKey::Direct, SpectralWindow::UV)
        .unwrap();
    assert!(uv[10] > 0.0);
}

#[test]
fn test_parallel_and_sequential_agree() {
    let case = idealized_case();
    let registry = SchemeRegistry::with_builtin_schemes();
    let inputs = SchemeInputs::new(&case.toc, &case.profile, &case.optics, &case.distribution).unwrap();
    for id in registry.ids() {
        let par = registry.solve(id, &inputs).unwrap();
        let seq = registry
            .solve(id, &inputs.with_config(SolverConfig::sequential()))
            .unwrap();
        assert_eq!(par, seq, "scheme {id}");
    }
}

#[test]
fn test_schemes_are_swappable() {
    let case = idealized_case();
    let registry = SchemeRegistry::with_builtin_schemes();
    let inputs = SchemeInputs::new(&case.toc, &case.profile, &case.optics, &case.distribution).unwrap();
    let gd = registry.solve("gd", &inputs).unwrap();
    let bl = registry.solve("bl", &inputs).unwrap();
    // Same direct beam, different diffuse treatment
    assert_eq!(gd.direct, bl.direct);
    assert!(bl.diffuse_up.iter().all(|&v| v == 0.0));
    assert!(gd.get("aI").is_some());
    assert!(bl.get("aI").is_none());
}

#[test]
fn test_band_count_mismatch() {
    let case = idealized_case();
    let optics = SpectralOptics::new(vec![0.1], vec![0.05], vec![0.1], 1.0).unwrap();
    assert!(matches!(
        SchemeInputs::new(&case.toc, &case.profile, &optics, &case.distribution),
        Err(CanopyRtError::Validation(ValidationError::LengthMismatch { .. }))
    ));
}

#[test]
fn test_unknown_scheme_id() {
    let case = idealized_case();
    let registry = SchemeRegistry::with_builtin_schemes();
    let inputs = SchemeInputs::new(&case.toc, &case.profile, &case.optics, &case.distribution).unwrap();
    assert!(matches!(
        registry.solve("2s", &inputs),
        Err(CanopyRtError::Validation(ValidationError::UnknownScheme(_)))
    ));
}
