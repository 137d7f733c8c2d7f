//! Top-of-canopy irradiance
//!
//! Irradiances here are already integrated over each band (W m⁻²). Spectral
//! irradiance (W m⁻² μm⁻¹) is turned into this form by
//! [`crate::spectral::smear_irradiance`].

use serde::{Deserialize, Serialize};

use crate::error::{CanopyRtError, Result, ValidationError};

/// One wavelength band of the top-of-canopy boundary condition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralBand {
    /// Band wavelength (μm); centre or left edge, as supplied by the loader
    pub wavelength: f64,
    /// Band width Δλ (μm)
    pub width: f64,
    /// Direct-beam irradiance in the band (W m⁻²)
    pub direct: f64,
    /// Diffuse irradiance in the band (W m⁻²)
    pub diffuse: f64,
}

/// Top-of-canopy boundary condition for a whole spectrum plus solar geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopOfCanopyIrradiance {
    pub bands: Vec<SpectralBand>,
    /// Solar zenith angle ψ (radians)
    pub psi: f64,
}

impl TopOfCanopyIrradiance {
    /// Assemble from parallel arrays.
    pub fn from_arrays(
        wavelength: &[f64],
        width: &[f64],
        direct: &[f64],
        diffuse: &[f64],
        psi: f64,
    ) -> Result<Self> {
        let n = wavelength.len();
        for (what, len) in [
            ("band widths", width.len()),
            ("direct irradiance", direct.len()),
            ("diffuse irradiance", diffuse.len()),
        ] {
            if len != n {
                return Err(ValidationError::LengthMismatch {
                    what,
                    expected: n,
                    actual: len,
                }
                .into());
            }
        }
        check_zenith(psi)?;
        let bands = (0..n)
            .map(|i| SpectralBand {
                wavelength: wavelength[i],
                width: width[i],
                direct: direct[i],
                diffuse: diffuse[i],
            })
            .collect();
        Ok(Self { bands, psi })
    }

    pub fn n_bands(&self) -> usize {
        self.bands.len()
    }

    pub fn wavelengths(&self) -> Vec<f64> {
        self.bands.iter().map(|b| b.wavelength).collect()
    }

    pub fn widths(&self) -> Vec<f64> {
        self.bands.iter().map(|b| b.width).collect()
    }

    /// Total (direct + diffuse) irradiance summed over all bands
    pub fn total(&self) -> f64 {
        self.bands.iter().map(|b| b.direct + b.diffuse).sum()
    }
}

/// Solar zenith angle must be finite and in [0, π/2)
pub(crate) fn check_zenith(psi: f64) -> Result<()> {
    if psi.is_finite() && (0.0..std::f64::consts::FRAC_PI_2).contains(&psi) {
        Ok(())
    } else {
        Err(CanopyRtError::domain(
            "solar zenith angle",
            psi,
            "must lie in [0, pi/2) radians",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_arrays() {
        let toc = TopOfCanopyIrradiance::from_arrays(
            &[0.5, 0.6],
            &[0.1, 0.1],
            &[50.0, 40.0],
            &[10.0, 8.0],
            0.3,
        )
        .unwrap();
        assert_eq!(toc.n_bands(), 2);
        assert_eq!(toc.total(), 108.0);
        assert_eq!(toc.wavelengths(), vec![0.5, 0.6]);
    }

    #[test]
    fn test_length_and_zenith_checks() {
        assert!(TopOfCanopyIrradiance::from_arrays(&[0.5], &[], &[1.0], &[1.0], 0.0).is_err());
        assert!(
            TopOfCanopyIrradiance::from_arrays(&[0.5], &[0.1], &[1.0], &[1.0], std::f64::consts::FRAC_PI_2)
                .is_err()
        );
        assert!(TopOfCanopyIrradiance::from_arrays(&[0.5], &[0.1], &[1.0], &[1.0], -0.1).is_err());
    }
}
