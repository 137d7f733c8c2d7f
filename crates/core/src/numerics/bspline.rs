//! Interpolating B-spline of degree 1-5
//!
//! Knot placement follows FITPACK's zero-smoothing case (the one used by
//! `InterpolatedUnivariateSpline`): boundary knots repeated `k + 1` times,
//! interior knots on the data points for odd degree and on the midpoints
//! between data points for even degree. The collocation system is banded
//! and totally positive, so Gaussian elimination without pivoting is stable.
//!
//! # References
//!
//! - de Boor, C. (1978). "A Practical Guide to Splines". Springer.
//! - Dierckx, P. (1993). "Curve and Surface Fitting with Splines". Oxford.

use crate::error::{Result, ValidationError};

/// Highest supported spline degree
pub const MAX_DEGREE: usize = 5;

/// Interpolating spline through `(x_i, y_i)`
#[derive(Debug, Clone)]
pub struct BSpline {
    degree: usize,
    knots: Vec<f64>,
    coeffs: Vec<f64>,
}

impl BSpline {
    /// Fit an interpolating spline of the given degree.
    ///
    /// `x` must be strictly increasing and contain at least `degree + 1` points.
    pub fn interpolate(x: &[f64], y: &[f64], degree: usize) -> Result<Self> {
        if !(1..=MAX_DEGREE).contains(&degree) {
            return Err(ValidationError::InvalidSelector {
                setting: "spline degree",
                value: degree.to_string(),
                expected: "1, 2, 3, 4, 5",
            }
            .into());
        }
        if x.len() != y.len() {
            return Err(ValidationError::LengthMismatch {
                what: "spline ordinates",
                expected: x.len(),
                actual: y.len(),
            }
            .into());
        }
        let n = x.len();
        if n <= degree {
            return Err(ValidationError::SpectralGrid {
                grid: "spline abscissae",
                detail: format!("degree {degree} spline needs at least {} points, got {n}", degree + 1),
            }
            .into());
        }
        if let Some(i) = x.windows(2).position(|w| w[1] <= w[0] || !w[1].is_finite()) {
            return Err(ValidationError::SpectralGrid {
                grid: "spline abscissae",
                detail: format!("not strictly increasing at index {}", i + 1),
            }
            .into());
        }

        let knots = interpolation_knots(x, degree);
        let k = degree;

        // Collocation matrix in band storage: row i holds columns i-k ..= i+k
        let mut band = BandMatrix::new(n, k, k);
        for (i, &xi) in x.iter().enumerate() {
            let span = find_span(&knots, n, k, xi);
            let basis = basis_functions(&knots, k, span, xi);
            for r in 0..=k {
                band.set(i, span - k + r, basis[r]);
            }
        }

        let coeffs = band.solve(y.to_vec()).ok_or_else(|| ValidationError::SpectralGrid {
            grid: "spline abscissae",
            detail: "singular collocation system".to_string(),
        })?;

        Ok(Self {
            degree,
            knots,
            coeffs,
        })
    }

    /// Spline degree
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Evaluate at `x`; outside the data range the end polynomial pieces are
    /// extrapolated.
    pub fn evaluate(&self, x: f64) -> f64 {
        let k = self.degree;
        let n = self.coeffs.len();
        let span = find_span(&self.knots, n, k, x);
        let basis = basis_functions(&self.knots, k, span, x);
        (0..=k).map(|r| basis[r] * self.coeffs[span - k + r]).sum()
    }

    /// Evaluate at every point of `xs`
    pub fn evaluate_all(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }
}

fn interpolation_knots(x: &[f64], k: usize) -> Vec<f64> {
    let n = x.len();
    let mut knots = Vec::with_capacity(n + k + 1);
    knots.extend(std::iter::repeat(x[0]).take(k + 1));
    for j in 0..n - k - 1 {
        let t = if k % 2 == 1 {
            x[j + (k + 1) / 2]
        } else {
            0.5 * (x[j + k / 2] + x[j + k / 2 + 1])
        };
        knots.push(t);
    }
    knots.extend(std::iter::repeat(x[n - 1]).take(k + 1));
    knots
}

/// Knot span index `m` in `[k, n - 1]` with `t[m] <= x < t[m + 1]`, clamped at the ends.
fn find_span(knots: &[f64], n: usize, k: usize, x: f64) -> usize {
    if x >= knots[n] {
        return n - 1;
    }
    if x.is_nan() || x <= knots[k] {
        return k;
    }
    // First knot strictly greater than x, within the active range
    let upper = knots[k..=n].partition_point(|&t| t <= x) + k;
    upper - 1
}

/// Non-zero basis functions `N_{span-k..=span, k}(x)` (Cox-de Boor).
fn basis_functions(knots: &[f64], k: usize, span: usize, x: f64) -> [f64; MAX_DEGREE + 1] {
    let mut n = [0.0; MAX_DEGREE + 1];
    let mut left = [0.0; MAX_DEGREE + 1];
    let mut right = [0.0; MAX_DEGREE + 1];
    n[0] = 1.0;
    for j in 1..=k {
        left[j] = x - knots[span + 1 - j];
        right[j] = knots[span + j] - x;
        let mut saved = 0.0;
        for r in 0..j {
            let temp = n[r] / (right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }
    n
}

/// Square band matrix with `kl` sub- and `ku` super-diagonals
struct BandMatrix {
    n: usize,
    kl: usize,
    ku: usize,
    data: Vec<f64>,
}

impl BandMatrix {
    fn new(n: usize, kl: usize, ku: usize) -> Self {
        Self {
            n,
            kl,
            ku,
            data: vec![0.0; n * (kl + ku + 1)],
        }
    }

    fn width(&self) -> usize {
        self.kl + self.ku + 1
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.width() + (col + self.kl - row)
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        self.data[self.index(row, col)]
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        let idx = self.index(row, col);
        self.data[idx] = value;
    }

    /// Solve `A x = b` in place by band Gaussian elimination without pivoting.
    fn solve(mut self, mut b: Vec<f64>) -> Option<Vec<f64>> {
        let n = self.n;
        for p in 0..n {
            let pivot = self.get(p, p);
            if pivot.abs() < f64::MIN_POSITIVE || !pivot.is_finite() {
                return None;
            }
            let last_row = (p + self.kl).min(n - 1);
            let last_col = (p + self.ku).min(n - 1);
            for r in p + 1..=last_row {
                let factor = self.get(r, p) / pivot;
                if factor == 0.0 {
                    continue;
                }
                for c in p..=last_col {
                    let v = self.get(r, c) - factor * self.get(p, c);
                    self.set(r, c, v);
                }
                b[r] -= factor * b[p];
            }
        }
        for i in (0..n).rev() {
            let last_col = (i + self.ku).min(n - 1);
            let mut sum = b[i];
            for c in i + 1..=last_col {
                sum -= self.get(i, c) * b[c];
            }
            b[i] = sum / self.get(i, i);
        }
        Some(b)
    }
}
