//! Spectral irradiance onto model bands

use tracing::info;

use super::rebin::{rebin, RebinMethod};
use crate::core_types::{check_zenith, SpectralBand, TopOfCanopyIrradiance};
use crate::error::{Result, ValidationError};

/// Estimate bin edges from bin centres by extrapolating the end spacing.
///
/// The true edges may differ; this is only a guess from the grid.
pub fn edges_from_centers(centers: &[f64]) -> Result<Vec<f64>> {
    let n = centers.len();
    if n < 2 {
        return Err(ValidationError::SpectralGrid {
            grid: "bin centres",
            detail: format!("needs at least 2 values, got {n}"),
        }
        .into());
    }
    let mut edges = Vec::with_capacity(n + 1);
    edges.push(centers[0] - 0.5 * (centers[1] - centers[0]));
    edges.extend(centers.windows(2).map(|w| 0.5 * (w[0] + w[1])));
    edges.push(centers[n - 1] + 0.5 * (centers[n - 1] - centers[n - 2]));
    Ok(edges)
}

/// Rebin spectral direct and diffuse irradiance (W m⁻² μm⁻¹), sampled at
/// `wavelength`, onto `edges` and integrate over each new band.
///
/// The result has one band per bin, centred in the bin, with its width and
/// band-integrated irradiance (W m⁻²).
pub fn smear_irradiance(
    wavelength: &[f64],
    spectral_direct: &[f64],
    spectral_diffuse: &[f64],
    edges: &[f64],
    psi: f64,
    method: RebinMethod,
) -> Result<TopOfCanopyIrradiance> {
    check_zenith(psi)?;
    let direct = rebin(wavelength, spectral_direct, edges, method)?;
    let diffuse = rebin(wavelength, spectral_diffuse, edges, method)?;
    let bands: Vec<SpectralBand> = edges
        .windows(2)
        .zip(direct.iter().zip(&diffuse))
        .map(|(e, (&dr, &df))| {
            let width = e[1] - e[0];
            SpectralBand {
                wavelength: e[0] + 0.5 * width,
                width,
                direct: dr * width,
                diffuse: df * width,
            }
        })
        .collect();
    info!(
        "smeared {} spectral points onto {} bands ({method})",
        wavelength.len(),
        bands.len()
    );
    Ok(TopOfCanopyIrradiance { bands, psi })
}
