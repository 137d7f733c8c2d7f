//! Numerical building blocks: quadrature, splines and root finding

pub mod bspline;
pub mod quadrature;
pub mod root;

pub use bspline::BSpline;
pub use quadrature::{cumulative_trapezoid, integrate, trapezoid, Quadrature};
pub use root::bisect;
