//! Canopy optics: leaf angle distributions and extinction coefficients

pub mod extinction;
pub mod leaf_angle;

pub use extinction::{
    diffuse_extinction_coefficient, diffuse_transmittance, diffuse_transmittance_profile,
    direct_transmittance, k_b,
};
pub use leaf_angle::{
    CustomProjection, LeafAngleDistribution, PdfFamily, PdfProjection, ProjectionFunction,
};
