//! Leaf angle distributions
//!
//! - [`pdf`]: inclination PDFs `g(θ_l)`
//! - [`projection`]: projection functions G(ψ), closed form or derived from a PDF
//! - [`mean_angle`]: mean leaf angle and the ellipsoidal shape ratio

pub mod mean_angle;
pub mod pdf;
pub mod projection;

pub use mean_angle::{
    mla_from_pdf, mla_to_x_approx, mla_to_x_integ, x_to_mla_approx, x_to_mla_integ,
    SHAPE_RATIO_BRACKET,
};
pub use pdf::PdfFamily;
pub use projection::{
    CustomProjection, LeafAngleDistribution, PdfProjection, ProjectionFunction, CHI_L_RANGE,
};
