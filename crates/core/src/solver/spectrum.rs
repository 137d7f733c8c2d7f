//! Band-integrated summaries of scheme output over wavelength windows

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use super::r#trait::{OutputKey, SchemeOutput};

/// Half-open wavelength window `[lower, upper)` in μm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralWindow {
    pub lower: f64,
    pub upper: f64,
}

impl SpectralWindow {
    /// Photosynthetically active radiation
    pub const PAR: SpectralWindow = SpectralWindow {
        lower: 0.4,
        upper: 0.7,
    };
    /// Ultraviolet
    pub const UV: SpectralWindow = SpectralWindow {
        lower: 0.0,
        upper: 0.4,
    };
    /// Every band
    pub const SOLAR: SpectralWindow = SpectralWindow {
        lower: 0.0,
        upper: f64::INFINITY,
    };

    pub fn contains(&self, wavelength: f64) -> bool {
        wavelength >= self.lower && wavelength < self.upper
    }
}

/// Per-level sum over the bands of `cube` whose wavelength is in `window`
pub fn window_sum(cube: &DMatrix<f64>, wavelength: &[f64], window: SpectralWindow) -> Vec<f64> {
    (0..cube.nrows())
        .map(|i| {
            wavelength
                .iter()
                .enumerate()
                .filter(|&(_, &wl)| window.contains(wl))
                .map(|(j, _)| cube[(i, j)])
                .sum()
        })
        .collect()
}

/// Leaf absorption integrated over the standard windows, per level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsorptionSummary {
    pub par: Vec<f64>,
    pub par_sunlit: Vec<f64>,
    pub par_shaded: Vec<f64>,
    pub uv: Vec<f64>,
    pub solar: Vec<f64>,
}

impl SchemeOutput {
    /// Sum output `key` over a wavelength window; `None` if the scheme did
    /// not produce it
    pub fn window_sum(&self, key: OutputKey, window: SpectralWindow) -> Option<Vec<f64>> {
        self.output(key)
            .map(|cube| window_sum(cube, &self.wavelength, window))
    }

    /// PAR, UV and solar absorption; requires the sunlit/shaded breakdown
    pub fn absorption_summary(&self) -> Option<AbsorptionSummary> {
        let sunlit = self.window_sum(OutputKey::AbsorbedSunlit, SpectralWindow::PAR)?;
        let shaded = self.window_sum(OutputKey::AbsorbedShaded, SpectralWindow::PAR)?;
        Some(AbsorptionSummary {
            par: self.window_sum(OutputKey::Absorbed, SpectralWindow::PAR)?,
            par_sunlit: sunlit,
            par_shaded: shaded,
            uv: self.window_sum(OutputKey::Absorbed, SpectralWindow::UV)?,
            solar: self.window_sum(OutputKey::Absorbed, SpectralWindow::SOLAR)?,
        })
    }
}
