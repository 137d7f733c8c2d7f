//! Scalar/array polymorphism for angle-dependent formulas
//!
//! Leaf angle functions take either one angle or many and must return the
//! same shape they were given. Rather than branching on shape at each call
//! site, every accepted container implements [`Elementwise`] and the formula
//! is written once as a scalar closure.

use nalgebra::DVector;

/// A container of `f64` values that can be mapped element by element into a
/// container of the same shape.
pub trait Elementwise {
    type Output;

    fn map_elementwise<F: Fn(f64) -> f64>(self, f: F) -> Self::Output;
}

impl Elementwise for f64 {
    type Output = f64;

    #[inline]
    fn map_elementwise<F: Fn(f64) -> f64>(self, f: F) -> f64 {
        f(self)
    }
}

impl Elementwise for &[f64] {
    type Output = Vec<f64>;

    fn map_elementwise<F: Fn(f64) -> f64>(self, f: F) -> Vec<f64> {
        self.iter().map(|&v| f(v)).collect()
    }
}

impl Elementwise for &Vec<f64> {
    type Output = Vec<f64>;

    fn map_elementwise<F: Fn(f64) -> f64>(self, f: F) -> Vec<f64> {
        self.as_slice().map_elementwise(f)
    }
}

impl<const N: usize> Elementwise for [f64; N] {
    type Output = [f64; N];

    fn map_elementwise<F: Fn(f64) -> f64>(self, f: F) -> [f64; N] {
        self.map(f)
    }
}

impl Elementwise for &DVector<f64> {
    type Output = DVector<f64>;

    fn map_elementwise<F: Fn(f64) -> f64>(self, f: F) -> DVector<f64> {
        self.map(f)
    }
}
