//! Radiative-transfer scheme trait and its input/output records
//!
//! Every scheme consumes the same [`SchemeInputs`] and produces a
//! [`SchemeOutput`] holding the four required spectral cubes (`I_dr`,
//! `I_df_d`, `I_df_u`, `F`) plus whatever optional quantities it computes.

use std::fmt;
use std::str::FromStr;

use nalgebra::DMatrix;
use rustc_hash::FxHashMap;

use crate::config::SolverConfig;
use crate::core_types::{
    check_zenith, CanopyLayerProfile, RadiationProfile, SpectralOptics, TopOfCanopyIrradiance,
};
use crate::error::{Result, ValidationError};
use crate::physics::ProjectionFunction;

/// Backend-agnostic interface for a canopy radiative-transfer scheme
///
/// Implementations must be pure: the same inputs always give the same output.
pub trait RadiativeTransferScheme: Send + Sync {
    /// Registry identifier (e.g. `"gd"`)
    fn id(&self) -> &str;

    /// Short display name
    fn short_name(&self) -> &str;

    /// Long descriptive name
    fn long_name(&self) -> &str;

    /// Solve every band of `inputs`.
    ///
    /// # Errors
    ///
    /// Validation errors for inconsistent inputs, domain errors from the band
    /// physics, quadrature failures from extinction integrals.
    fn solve(&self, inputs: &SchemeInputs<'_>) -> Result<SchemeOutput>;
}

/// Everything a scheme needs for one canopy case
#[derive(Clone, Copy)]
pub struct SchemeInputs<'a> {
    /// Top-of-canopy band irradiance and solar zenith angle ψ
    pub irradiance: &'a TopOfCanopyIrradiance,
    /// Cumulative LAI, index 0 = ground
    pub profile: &'a CanopyLayerProfile,
    /// Per-band leaf and soil optics, same band count as `irradiance`
    pub optics: &'a SpectralOptics,
    /// Source of G(ψ) and `K_b(ψ)`
    pub projection: &'a dyn ProjectionFunction,
    pub config: SolverConfig,
}

impl<'a> SchemeInputs<'a> {
    /// Bundle and cross-check case inputs with the default solver config.
    pub fn new(
        irradiance: &'a TopOfCanopyIrradiance,
        profile: &'a CanopyLayerProfile,
        optics: &'a SpectralOptics,
        projection: &'a dyn ProjectionFunction,
    ) -> Result<Self> {
        let inputs = Self {
            irradiance,
            profile,
            optics,
            projection,
            config: SolverConfig::default(),
        };
        inputs.validate()?;
        Ok(inputs)
    }

    #[must_use]
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Solar zenith angle ψ (radians)
    pub fn psi(&self) -> f64 {
        self.irradiance.psi
    }

    pub fn n_bands(&self) -> usize {
        self.irradiance.n_bands()
    }

    /// Band counts agree and ψ is in range
    pub fn validate(&self) -> Result<()> {
        let n = self.irradiance.n_bands();
        if self.optics.n_bands() != n {
            return Err(ValidationError::LengthMismatch {
                what: "spectral optics",
                expected: n,
                actual: self.optics.n_bands(),
            }
            .into());
        }
        check_zenith(self.irradiance.psi)
    }
}

impl fmt::Debug for SchemeInputs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeInputs")
            .field("psi", &self.irradiance.psi)
            .field("n_bands", &self.irradiance.n_bands())
            .field("n_levels", &self.profile.len())
            .field("projection", &self.projection.family())
            .field("config", &self.config)
            .finish()
    }
}

/// Names of the quantities a scheme can return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKey {
    /// `I_dr`, direct-beam flux
    Direct,
    /// `I_df_d`, downward diffuse flux
    DiffuseDown,
    /// `I_df_u`, upward diffuse flux
    DiffuseUp,
    /// `F`, scalar flux
    Scalar,
    /// `aI_sl`, absorption by sunlit leaves
    AbsorbedSunlit,
    /// `aI_sh`, absorption by shaded leaves
    AbsorbedShaded,
    /// `aI`, total leaf absorption
    Absorbed,
}

impl OutputKey {
    /// Keys every scheme must return
    pub const REQUIRED: [OutputKey; 4] = [
        OutputKey::Direct,
        OutputKey::DiffuseDown,
        OutputKey::DiffuseUp,
        OutputKey::Scalar,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputKey::Direct => "I_dr",
            OutputKey::DiffuseDown => "I_df_d",
            OutputKey::DiffuseUp => "I_df_u",
            OutputKey::Scalar => "F",
            OutputKey::AbsorbedSunlit => "aI_sl",
            OutputKey::AbsorbedShaded => "aI_sh",
            OutputKey::Absorbed => "aI",
        }
    }

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

impl fmt::Display for OutputKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "I_dr" => OutputKey::Direct,
            "I_df_d" => OutputKey::DiffuseDown,
            "I_df_u" => OutputKey::DiffuseUp,
            "F" => OutputKey::Scalar,
            "aI_sl" => OutputKey::AbsorbedSunlit,
            "aI_sh" => OutputKey::AbsorbedShaded,
            "aI" => OutputKey::Absorbed,
            other => {
                return Err(ValidationError::InvalidSelector {
                    setting: "output key",
                    value: other.to_string(),
                    expected: "I_dr, I_df_d, I_df_u, F, aI_sl, aI_sh, aI",
                })
            }
        })
    }
}

/// Spectral cubes returned by a scheme, each `levels × bands`
#[derive(Debug, Clone, PartialEq)]
pub struct SchemeOutput {
    /// Band wavelengths (μm), one per column
    pub wavelength: Vec<f64>,
    /// Band widths (μm)
    pub width: Vec<f64>,
    pub direct: DMatrix<f64>,
    pub diffuse_down: DMatrix<f64>,
    pub diffuse_up: DMatrix<f64>,
    pub scalar: DMatrix<f64>,
    /// Scheme-specific extras keyed by name
    pub optional: FxHashMap<OutputKey, DMatrix<f64>>,
}

impl SchemeOutput {
    /// Output holding only the required cubes
    pub fn new(
        irradiance: &TopOfCanopyIrradiance,
        direct: DMatrix<f64>,
        diffuse_down: DMatrix<f64>,
        diffuse_up: DMatrix<f64>,
        scalar: DMatrix<f64>,
    ) -> Self {
        Self {
            wavelength: irradiance.wavelengths(),
            width: irradiance.widths(),
            direct,
            diffuse_down,
            diffuse_up,
            scalar,
            optional: FxHashMap::default(),
        }
    }

    /// Assemble from one [`RadiationProfile`] per band; the absorption
    /// breakdown is kept as optional outputs.
    pub fn from_band_profiles(
        irradiance: &TopOfCanopyIrradiance,
        n_levels: usize,
        bands: &[RadiationProfile],
    ) -> Self {
        let mut output = Self::new(
            irradiance,
            cube(bands, n_levels, |b| b.direct.as_slice()),
            cube(bands, n_levels, |b| b.diffuse_down.as_slice()),
            cube(bands, n_levels, |b| b.diffuse_up.as_slice()),
            cube(bands, n_levels, |b| b.scalar.as_slice()),
        );
        let sunlit = cube(bands, n_levels, |b| b.absorbed_sunlit.as_slice());
        let shaded = cube(bands, n_levels, |b| b.absorbed_shaded.as_slice());
        let total = &sunlit + &shaded;
        output.optional.insert(OutputKey::AbsorbedSunlit, sunlit);
        output.optional.insert(OutputKey::AbsorbedShaded, shaded);
        output.optional.insert(OutputKey::Absorbed, total);
        output
    }

    pub fn n_levels(&self) -> usize {
        self.direct.nrows()
    }

    pub fn n_bands(&self) -> usize {
        self.direct.ncols()
    }

    /// Look up an output by typed key
    pub fn output(&self, key: OutputKey) -> Option<&DMatrix<f64>> {
        match key {
            OutputKey::Direct => Some(&self.direct),
            OutputKey::DiffuseDown => Some(&self.diffuse_down),
            OutputKey::DiffuseUp => Some(&self.diffuse_up),
            OutputKey::Scalar => Some(&self.scalar),
            other => self.optional.get(&other),
        }
    }

    /// Look up an output by its name (`"I_dr"`, `"aI_sl"`, ...)
    pub fn get(&self, name: &str) -> Option<&DMatrix<f64>> {
        name.parse().ok().and_then(|key| self.output(key))
    }

    /// Keys present in this output, required ones first
    pub fn keys(&self) -> Vec<OutputKey> {
        let mut keys = OutputKey::REQUIRED.to_vec();
        let mut extra: Vec<OutputKey> = self.optional.keys().copied().collect();
        extra.sort_by_key(|k| k.as_str());
        keys.extend(extra);
        keys
    }

    /// Profile of band `j`; absorption is zero when the scheme did not report it
    pub fn band_profile(&self, j: usize) -> Option<RadiationProfile> {
        if j >= self.n_bands() {
            return None;
        }
        let col = |m: &DMatrix<f64>| m.column(j).iter().copied().collect::<Vec<f64>>();
        let zeros = vec![0.0; self.n_levels()];
        let optional_col =
            |key: OutputKey| self.optional.get(&key).map_or_else(|| zeros.clone(), col);
        Some(RadiationProfile {
            direct: col(&self.direct),
            diffuse_down: col(&self.diffuse_down),
            diffuse_up: col(&self.diffuse_up),
            scalar: col(&self.scalar),
            absorbed_sunlit: optional_col(OutputKey::AbsorbedSunlit),
            absorbed_shaded: optional_col(OutputKey::AbsorbedShaded),
        })
    }
}

/// Stack one field of every band profile into a `levels × bands` matrix
pub(super) fn cube<F>(bands: &[RadiationProfile], n_levels: usize, field: F) -> DMatrix<f64>
where
    F: Fn(&RadiationProfile) -> &[f64],
{
    DMatrix::from_fn(n_levels, bands.len(), |i, j| field(&bands[j])[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_key_names() {
        for key in [
            OutputKey::Direct,
            OutputKey::DiffuseDown,
            OutputKey::DiffuseUp,
            OutputKey::Scalar,
            OutputKey::AbsorbedSunlit,
            OutputKey::AbsorbedShaded,
            OutputKey::Absorbed,
        ] {
            assert_eq!(key.as_str().parse::<OutputKey>().unwrap(), key);
        }
        assert!(OutputKey::Scalar.is_required());
        assert!(!OutputKey::Absorbed.is_required());
        assert!("I_direct".parse::<OutputKey>().is_err());
    }

    fn two_band_output() -> SchemeOutput {
        let irradiance =
            TopOfCanopyIrradiance::from_arrays(&[0.5, 0.6], &[0.1, 0.1], &[1.0, 2.0], &[0.5, 0.5], 0.0)
                .unwrap();
        let band = |scale: f64| RadiationProfile {
            direct: vec![scale, 2.0 * scale],
            diffuse_down: vec![0.0; 2],
            diffuse_up: vec![0.0; 2],
            scalar: vec![scale, 2.0 * scale],
            absorbed_sunlit: vec![0.1, 0.2],
            absorbed_shaded: vec![0.3, 0.4],
        };
        SchemeOutput::from_band_profiles(&irradiance, 2, &[band(1.0), band(10.0)])
    }

    #[test]
    fn test_from_band_profiles_layout() {
        let out = two_band_output();
        assert_eq!((out.n_levels(), out.n_bands()), (2, 2));
        // rows are levels, columns are bands
        assert_eq!(out.direct[(1, 0)], 2.0);
        assert_eq!(out.direct[(0, 1)], 10.0);
        let total = out.get("aI").unwrap();
        assert!((total[(1, 1)] - 0.6).abs() < 1e-12);
        assert!(out.get("I_dr").is_some());
        assert!(out.get("nonsense").is_none());
        assert_eq!(out.keys().len(), 7);
    }

    #[test]
    fn test_band_profile_round_trip() {
        let out = two_band_output();
        let band = out.band_profile(1).unwrap();
        assert_eq!(band.direct, vec![10.0, 20.0]);
        assert_eq!(band.absorbed_shaded, vec![0.3, 0.4]);
        assert!(out.band_profile(2).is_none());
    }
}
