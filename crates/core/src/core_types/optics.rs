//! Leaf and soil optical properties

use serde::{Deserialize, Serialize};

use crate::error::{CanopyRtError, Result, ValidationError};

/// Optical properties of leaves and ground for a single wavelength band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeafOpticalProperties {
    /// Leaf reflectance `r_l`, in [0, 1)
    pub reflectance: f64,
    /// Leaf transmittance `t_l`, in [0, 1)
    pub transmittance: f64,
    /// Ground (soil) reflectance W, in [0, 1]
    pub soil_reflectance: f64,
    /// Green leaf area fraction, in [0, 1]
    pub green: f64,
}

impl LeafOpticalProperties {
    /// Validate and build band optical properties.
    ///
    /// # Errors
    /// Domain error when a value is out of range or when the resulting leaf
    /// absorptance `1 - green * (r_l + t_l)` is not positive.
    pub fn new(reflectance: f64, transmittance: f64, soil_reflectance: f64, green: f64) -> Result<Self> {
        check_unit("leaf reflectance", reflectance, false)?;
        check_unit("leaf transmittance", transmittance, false)?;
        check_unit("soil reflectance", soil_reflectance, true)?;
        check_unit("green fraction", green, true)?;
        let props = Self {
            reflectance,
            transmittance,
            soil_reflectance,
            green,
        };
        props.checked_absorptance()?;
        Ok(props)
    }

    /// Leaf scattering coefficient `sigma = green * (r_l + t_l)`
    pub fn scattering(&self) -> f64 {
        self.green * (self.reflectance + self.transmittance)
    }

    /// Leaf absorptance alpha = 1 - sigma
    pub fn absorptance(&self) -> f64 {
        1.0 - self.scattering()
    }

    /// Absorptance, failing if it is not strictly positive
    pub fn checked_absorptance(&self) -> Result<f64> {
        let alpha = self.absorptance();
        if alpha > 0.0 {
            Ok(alpha)
        } else {
            Err(CanopyRtError::domain(
                "leaf absorptance",
                alpha,
                "must be > 0 (green * (r_l + t_l) < 1)",
            ))
        }
    }
}

fn check_unit(parameter: &'static str, value: f64, closed: bool) -> Result<()> {
    let ok = value.is_finite() && value >= 0.0 && if closed { value <= 1.0 } else { value < 1.0 };
    if ok {
        Ok(())
    } else {
        let range = if closed { "[0, 1]" } else { "[0, 1)" };
        Err(CanopyRtError::domain(parameter, value, format!("must lie in {range}")))
    }
}

/// Per-band leaf and soil optics for a whole spectrum plus the canopy green fraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralOptics {
    pub leaf_reflectance: Vec<f64>,
    pub leaf_transmittance: Vec<f64>,
    pub soil_reflectance: Vec<f64>,
    pub green: f64,
}

impl SpectralOptics {
    /// Bundle per-band arrays; all three must have the same length.
    pub fn new(
        leaf_reflectance: Vec<f64>,
        leaf_transmittance: Vec<f64>,
        soil_reflectance: Vec<f64>,
        green: f64,
    ) -> Result<Self> {
        let n = leaf_reflectance.len();
        for (what, len) in [
            ("leaf transmittance", leaf_transmittance.len()),
            ("soil reflectance", soil_reflectance.len()),
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
        Ok(Self {
            leaf_reflectance,
            leaf_transmittance,
            soil_reflectance,
            green,
        })
    }

    /// Number of bands
    pub fn n_bands(&self) -> usize {
        self.leaf_reflectance.len()
    }

    /// Validated properties of band `i`
    pub fn band(&self, i: usize) -> Result<LeafOpticalProperties> {
        LeafOpticalProperties::new(
            self.leaf_reflectance[i],
            self.leaf_transmittance[i],
            self.soil_reflectance[i],
            self.green,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_derived_quantities() {
        let p = LeafOpticalProperties::new(0.10, 0.05, 0.15, 1.0).unwrap();
        assert_relative_eq!(p.scattering(), 0.15, epsilon = 1e-12);
        assert_relative_eq!(p.absorptance(), 0.85, epsilon = 1e-12);
        let half_green = LeafOpticalProperties::new(0.10, 0.05, 0.15, 0.5).unwrap();
        assert_relative_eq!(half_green.scattering(), 0.075, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(LeafOpticalProperties::new(1.0, 0.0, 0.1, 1.0).is_err());
        assert!(LeafOpticalProperties::new(0.1, -0.01, 0.1, 1.0).is_err());
        assert!(LeafOpticalProperties::new(0.1, 0.1, 1.1, 1.0).is_err());
        assert!(LeafOpticalProperties::new(0.1, 0.1, 0.1, f64::NAN).is_err());
    }

    #[test]
    fn test_zero_absorptance_is_domain_error() {
        let err = LeafOpticalProperties::new(0.6, 0.4, 0.1, 1.0).unwrap_err();
        assert!(matches!(
            err,
            CanopyRtError::Domain {
                parameter: "leaf absorptance",
                ..
            }
        ));
    }

    #[test]
    fn test_spectral_optics_length_check() {
        assert!(SpectralOptics::new(vec![0.1, 0.2], vec![0.1], vec![0.1, 0.1], 1.0).is_err());
        let s = SpectralOptics::new(vec![0.1, 0.4], vec![0.05, 0.4], vec![0.1, 0.2], 1.0).unwrap();
        assert_eq!(s.n_bands(), 2);
        assert_relative_eq!(s.band(1).unwrap().absorptance(), 0.2, epsilon = 1e-12);
    }
}
