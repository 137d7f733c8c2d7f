//! Cumulative LAI profile
//!
//! Index 0 is the ground, where cumulative LAI (leaf area above that level)
//! equals the total LAI; the last index is the canopy top. Getting this
//! ordering backwards silently mirrors every profile, so the convention is
//! checked once here and never re-derived at use sites.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Validated cumulative leaf area index profile, ground first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct CanopyLayerProfile {
    lai: Vec<f64>,
}

impl CanopyLayerProfile {
    /// Build a profile from cumulative LAI values ordered ground to top.
    ///
    /// # Errors
    /// Returns [`ValidationError::LaiProfile`] when the profile is empty,
    /// contains a non-finite or negative value, or increases with height
    /// (which also means index 0 is not the maximum).
    pub fn new(lai: Vec<f64>) -> Result<Self> {
        if lai.is_empty() {
            return Err(ValidationError::LaiProfile {
                invariant: "at least one level",
                index: 0,
                detail: "profile is empty".to_string(),
            }
            .into());
        }
        for (i, &v) in lai.iter().enumerate() {
            if !v.is_finite() || v < 0.0 {
                return Err(ValidationError::LaiProfile {
                    invariant: "finite and non-negative",
                    index: i,
                    detail: format!("cumulative LAI {v}"),
                }
                .into());
            }
        }
        if let Some(i) = lai.windows(2).position(|w| w[1] > w[0]) {
            return Err(ValidationError::LaiProfile {
                invariant: "non-increasing with height (index 0 = ground = total LAI)",
                index: i + 1,
                detail: format!("{} above {}", lai[i + 1], lai[i]),
            }
            .into());
        }
        Ok(Self { lai })
    }

    /// Evenly spaced profile from `lai_total` at the ground to zero at the top.
    ///
    /// `n_levels` counts levels including both ground and top.
    pub fn uniform(lai_total: f64, n_levels: usize) -> Result<Self> {
        if n_levels < 2 {
            return Err(ValidationError::LaiProfile {
                invariant: "at least two levels for a uniform profile",
                index: 0,
                detail: format!("{n_levels} levels requested"),
            }
            .into());
        }
        let step = lai_total / (n_levels - 1) as f64;
        let lai = (0..n_levels)
            .map(|i| {
                if i == n_levels - 1 {
                    0.0
                } else {
                    lai_total - step * i as f64
                }
            })
            .collect();
        Self::new(lai)
    }

    /// Build from per-layer LAI increments listed top to bottom.
    ///
    /// The resulting profile has `dlai.len() + 1` levels.
    pub fn from_layer_increments(dlai_top_down: &[f64]) -> Result<Self> {
        let mut lai = Vec::with_capacity(dlai_top_down.len() + 1);
        let mut total = 0.0;
        lai.push(total);
        for &d in dlai_top_down {
            total += d;
            lai.push(total);
        }
        lai.reverse();
        Self::new(lai)
    }

    /// Total LAI (the ground value)
    pub fn lai_total(&self) -> f64 {
        self.lai[0]
    }

    /// Cumulative LAI at the ground level (index 0)
    pub fn ground(&self) -> f64 {
        self.lai[0]
    }

    /// Cumulative LAI values, ground first
    pub fn as_slice(&self) -> &[f64] {
        &self.lai
    }

    /// Number of levels
    pub fn len(&self) -> usize {
        self.lai.len()
    }

    /// Always false; kept for API symmetry with slices
    pub fn is_empty(&self) -> bool {
        self.lai.is_empty()
    }

    /// Iterate over cumulative LAI, ground first
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.lai.iter().copied()
    }
}

impl TryFrom<Vec<f64>> for CanopyLayerProfile {
    type Error = crate::error::CanopyRtError;

    fn try_from(lai: Vec<f64>) -> Result<Self> {
        Self::new(lai)
    }
}

impl From<CanopyLayerProfile> for Vec<f64> {
    fn from(profile: CanopyLayerProfile) -> Self {
        profile.lai
    }
}
