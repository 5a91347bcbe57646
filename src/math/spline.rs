use super::CubicFn;
use crate::util::Interval;

/// A periodic cubic spline through a set of knots.
///
/// The spline passes through every knot, has continuous first and second
/// derivatives, and repeats every `period`, including across the closing
/// interval from the last knot back round to the first.
#[derive(Clone, Debug)]
pub struct CubicSpline {
    /// The knots, closed with a copy of the first knot shifted by one period.
    knots: Vec<f64>,
    pieces: Vec<CubicFn>,
    domain: Interval<f64>,
}

impl CubicSpline {
    /// Fits a periodic spline through the points `(xs[i], ys[i])`.
    ///
    /// Returns `None` unless there are at least two knots, the slices have equal
    /// length, `xs` is strictly increasing, and every knot lies within one period
    /// of the first.
    pub fn periodic(xs: &[f64], ys: &[f64], period: f64) -> Option<Self> {
        let n = xs.len();
        if n < 2 || ys.len() != n || xs.windows(2).any(|w| !(w[0] < w[1])) {
            return None;
        }
        if !(period.is_finite() && xs[n - 1] - xs[0] < period) {
            return None;
        }

        let knots = xs
            .iter()
            .copied()
            .chain(std::iter::once(xs[0] + period))
            .collect::<Vec<_>>();
        let values = ys
            .iter()
            .copied()
            .chain(std::iter::once(ys[0]))
            .collect::<Vec<_>>();
        let slopes = knot_slopes(&knots, &values);
        let pieces = (0..n)
            .map(|i| {
                let j = (i + 1) % n;
                CubicFn::fit(knots[i], values[i], slopes[i], knots[i + 1], values[i + 1], slopes[j])
            })
            .collect();

        Some(Self {
            domain: Interval::new(knots[0], knots[n]),
            knots,
            pieces,
        })
    }

    /// Samples the spline.
    pub fn sample(&self, x: f64) -> f64 {
        let x = self.domain.wrap(x);
        self.piece(x).y(x)
    }

    /// Samples the first derivative of the spline.
    pub fn sample_dx(&self, x: f64) -> f64 {
        let x = self.domain.wrap(x);
        self.piece(x).dy(x)
    }

    /// Samples the second derivative of the spline.
    pub fn sample_dx2(&self, x: f64) -> f64 {
        let x = self.domain.wrap(x);
        self.piece(x).d2y(x)
    }

    fn piece(&self, x: f64) -> &CubicFn {
        let idx = self.knots.partition_point(|k| *k <= x).saturating_sub(1);
        &self.pieces[usize::min(idx, self.pieces.len() - 1)]
    }
}

/// Solves for the knot slopes of a periodic cubic spline.
///
/// `knots` and `values` hold the `n` distinct knots followed by the closing knot.
/// Continuity of the second derivative at every knot, the first one included,
/// gives a cyclic tridiagonal system in the `n` slopes.
fn knot_slopes(knots: &[f64], values: &[f64]) -> Vec<f64> {
    let n = knots.len() - 1;
    let h = knots.windows(2).map(|w| w[1] - w[0]).collect::<Vec<_>>();
    let delta = (0..n)
        .map(|i| (values[i + 1] - values[i]) / h[i])
        .collect::<Vec<_>>();

    let mut sub = vec![0.0; n];
    let mut diag = vec![0.0; n];
    let mut sup = vec![0.0; n];
    let mut rhs = vec![0.0; n];
    for i in 0..n {
        let prev = (i + n - 1) % n;
        sub[i] = h[i];
        diag[i] = 2.0 * (h[prev] + h[i]);
        sup[i] = h[prev];
        rhs[i] = 3.0 * (h[i] * delta[prev] + h[prev] * delta[i]);
    }
    solve_cyclic(&sub, &diag, &sup, &rhs)
}

/// Solves a cyclic tridiagonal system with the Sherman-Morrison correction.
///
/// Row `i` reads `sub[i] x[i-1] + diag[i] x[i] + sup[i] x[i+1] = rhs[i]` with
/// indices taken modulo `n`, so `sub[0]` and `sup[n-1]` are the corner entries.
fn solve_cyclic(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = diag.len();
    let corner_top = sub[0];
    let corner_bottom = sup[n - 1];
    let gamma = -diag[0];

    let mut modified = diag.to_vec();
    modified[0] -= gamma;
    modified[n - 1] -= corner_bottom * corner_top / gamma;

    let x = solve_tridiagonal(sub, &modified, sup, rhs);
    let mut u = vec![0.0; n];
    u[0] = gamma;
    u[n - 1] = corner_bottom;
    let z = solve_tridiagonal(sub, &modified, sup, &u);

    let factor = (x[0] + corner_top * x[n - 1] / gamma)
        / (1.0 + z[0] + corner_top * z[n - 1] / gamma);
    x.iter().zip(z).map(|(x, z)| x - factor * z).collect()
}

/// Solves a tridiagonal system with the Thomas algorithm, ignoring `sub[0]` and
/// `sup[n-1]`.
fn solve_tridiagonal(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = diag.len();
    let mut c_prime = vec![0.0; n];
    let mut r_prime = vec![0.0; n];
    c_prime[0] = sup[0] / diag[0];
    r_prime[0] = rhs[0] / diag[0];
    for i in 1..n {
        let m = diag[i] - sub[i] * c_prime[i - 1];
        c_prime[i] = if i + 1 < n { sup[i] / m } else { 0.0 };
        r_prime[i] = (rhs[i] - sub[i] * r_prime[i - 1]) / m;
    }

    let mut x = r_prime;
    for i in (0..n - 1).rev() {
        x[i] -= c_prime[i] * x[i + 1];
    }
    x
}
