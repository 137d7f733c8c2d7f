//! Adaptive Gauss-Kronrod quadrature and trapezoidal helpers
//!
//! The adaptive integrator is a globally adaptive 7/15-point Gauss-Kronrod
//! scheme in the style of QUADPACK's QAG: the interval with the largest error
//! estimate is bisected until the summed error meets the tolerance or the
//! subdivision budget runs out. It keeps no global state, so it is safe to
//! call concurrently from a rayon map.

use tracing::{debug, trace};

use crate::config::QuadratureConfig;
use crate::error::{IntegrandContext, QuadratureFailure};

/// Kronrod abscissae on [-1, 1] (positive half, descending, centre last)
const XGK: [f64; 8] = [
    0.991455371120812639206854697526329,
    0.949107912342758524526189684047851,
    0.864864423359769072789712788640926,
    0.741531185599394439863864773280788,
    0.586087235467691130294144845693013,
    0.405845151377397166906606412076961,
    0.207784955007898467600689403773245,
    0.000000000000000000000000000000000,
];

/// Kronrod weights matching `XGK`
const WGK: [f64; 8] = [
    0.022935322010529224963732008058970,
    0.063092092629978553290700663189204,
    0.104790010322250183839876322541518,
    0.140653259715525918745189590510238,
    0.169004726639267902826583426598550,
    0.190350578064785409913256402421014,
    0.204432940075298892414161999234649,
    0.209482141084727828012999174891714,
];

/// Gauss weights for the odd-indexed `XGK` nodes and the centre
const WG: [f64; 4] = [
    0.129484966168869693270611432679082,
    0.279705391489276667901467771423780,
    0.381830050505118944950369775488975,
    0.417959183673469387755102040816327,
];

/// Converged quadrature result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrature {
    pub value: f64,
    pub abs_error: f64,
    pub subdivisions: usize,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

fn gauss_kronrod_15<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64) -> Segment {
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);

    let fc = f(center);
    let mut kronrod = fc * WGK[7];
    let mut gauss = fc * WG[3];

    for j in 0..7 {
        let dx = half * XGK[j];
        let pair = f(center - dx) + f(center + dx);
        kronrod += WGK[j] * pair;
        if j % 2 == 1 {
            gauss += WG[j / 2] * pair;
        }
    }

    Segment {
        a,
        b,
        value: kronrod * half,
        error: ((kronrod - gauss) * half).abs(),
    }
}

/// Integrate `f` over `[a, b]` with adaptive Gauss-Kronrod quadrature.
///
/// Converges when the summed error estimate is at most
/// `max(epsabs, epsrel * |I|)`. Exceeding `max_subdivisions` bisections, or a
/// non-finite estimate, is reported as a [`QuadratureFailure`] carrying
/// `context` so the caller can see what was being integrated.
pub fn integrate<F>(
    f: F,
    a: f64,
    b: f64,
    config: &QuadratureConfig,
    context: &IntegrandContext,
) -> Result<Quadrature, QuadratureFailure>
where
    F: Fn(f64) -> f64,
{
    let fail = |subdivisions: usize, estimate: f64, abs_error: f64| QuadratureFailure {
        context: context.clone(),
        lower: a,
        upper: b,
        subdivisions,
        estimate,
        abs_error,
    };

    let first = gauss_kronrod_15(&f, a, b);
    let mut segments = vec![first];
    let mut value = first.value;
    let mut error = first.error;
    let mut subdivisions = 0;

    loop {
        if !value.is_finite() || !error.is_finite() {
            return Err(fail(subdivisions, value, error));
        }
        let tolerance = config.epsabs.max(config.epsrel * value.abs());
        if error <= tolerance {
            debug!(
                "{} converged: {:.12e} +/- {:.2e} after {} subdivisions",
                context.quantity, value, error, subdivisions
            );
            return Ok(Quadrature {
                value,
                abs_error: error,
                subdivisions,
            });
        }
        if subdivisions >= config.max_subdivisions {
            return Err(fail(subdivisions, value, error));
        }

        // Bisect the worst segment
        let worst = segments
            .iter()
            .enumerate()
            .max_by(|(_, l), (_, r)| l.error.total_cmp(&r.error))
            .map_or(0, |(i, _)| i);
        let seg = segments.swap_remove(worst);
        let mid = 0.5 * (seg.a + seg.b);
        let left = gauss_kronrod_15(&f, seg.a, mid);
        let right = gauss_kronrod_15(&f, mid, seg.b);
        trace!(
            "split [{:.6}, {:.6}] err {:.2e} -> {:.2e} + {:.2e}",
            seg.a,
            seg.b,
            seg.error,
            left.error,
            right.error
        );

        value += left.value + right.value - seg.value;
        error += left.error + right.error - seg.error;
        segments.push(left);
        segments.push(right);
        subdivisions += 1;

        // Re-sum periodically so the running totals don't drift
        if subdivisions % 16 == 0 {
            value = segments.iter().map(|s| s.value).sum();
            error = segments.iter().map(|s| s.error).sum();
        }
    }
}

/// Cumulative trapezoidal integral of `y(x)`, starting from zero.
///
/// The output has the same length as the input; `out[0] == 0`.
pub fn cumulative_trapezoid(x: &[f64], y: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(x.len());
    if x.is_empty() {
        return out;
    }
    let mut total = 0.0;
    out.push(total);
    for i in 1..x.len().min(y.len()) {
        total += 0.5 * (y[i] + y[i - 1]) * (x[i] - x[i - 1]);
        out.push(total);
    }
    out
}

/// Trapezoidal integral of `y(x)`.
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (ys[0] + ys[1]) * (xs[1] - xs[0]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn context() -> IntegrandContext {
        IntegrandContext {
            family: "test".to_string(),
            shape: None,
            lai: None,
            quantity: "test integral",
        }
    }

    #[test]
    fn test_polynomial_exact() {
        let q = integrate(
            |x| 3.0 * x * x + 1.0,
            0.0,
            2.0,
            &QuadratureConfig::default(),
            &context(),
        )
        .unwrap();
        assert_relative_eq!(q.value, 10.0, max_relative = 1e-14);
        assert_eq!(q.subdivisions, 0);
    }

    #[test]
    fn test_trig_integral() {
        let q = integrate(
            |x: f64| x.sin() * x.cos(),
            0.0,
            FRAC_PI_2,
            &QuadratureConfig::default(),
            &context(),
        )
        .unwrap();
        assert_relative_eq!(q.value, 0.5, max_relative = 1e-12);
    }

    #[test]
    fn test_peaked_integrand_needs_subdivision() {
        // Narrow Lorentzian: integral over R is pi
        let w = 1e-2;
        let q = integrate(
            |x: f64| w / (x * x + w * w),
            -1.0,
            1.0,
            &QuadratureConfig::default(),
            &context(),
        )
        .unwrap();
        let exact = 2.0 * (1.0 / w).atan();
        assert_relative_eq!(q.value, exact, max_relative = 1e-8);
        assert!(q.subdivisions > 0);
        assert!(q.value < PI);
    }

    #[test]
    fn test_budget_exhaustion_is_an_error() {
        let config = QuadratureConfig {
            epsabs: 0.0,
            epsrel: 1e-14,
            max_subdivisions: 2,
        };
        let err = integrate(|x: f64| x.abs().sqrt(), -1.0, 1.0, &config, &context()).unwrap_err();
        assert_eq!(err.subdivisions, 2);
        assert_eq!(err.lower, -1.0);
        assert_eq!(err.upper, 1.0);
    }

    #[test]
    fn test_nan_integrand_is_an_error() {
        let err = integrate(
            |_| f64::NAN,
            0.0,
            1.0,
            &QuadratureConfig::default(),
            &context(),
        )
        .unwrap_err();
        assert_eq!(err.subdivisions, 0);
    }

    #[test]
    fn test_cumulative_trapezoid() {
        let x = [0.0, 1.0, 2.0, 4.0];
        let y = [0.0, 2.0, 2.0, 0.0];
        let c = cumulative_trapezoid(&x, &y);
        assert_eq!(c, vec![0.0, 1.0, 3.0, 5.0]);
        assert_eq!(trapezoid(&x, &y), 5.0);
    }
}
