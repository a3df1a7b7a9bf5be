//! Quadric error metrics
//!
//! A metric is an additive per-vertex statistic. Merging two vertices sums
//! their metrics, the merged vertex is placed at the sum's minimizer, and the
//! sum evaluated there is the cost of the collapse.

use manifoldcrate_core::{to_f64, to_point3f, Point3f, Vector3d};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Error metric that ranks and places edge collapses.
pub trait ErrorMetric: Copy + Default + fmt::Debug {
    /// Build the metric of a vertex at `center` from the positions of its one-ring
    fn from_one_ring<I>(center: &Point3f, ring: I) -> Self
    where
        I: IntoIterator<Item = Point3f>;

    /// Metric of the vertex obtained by merging `self` and `other`
    fn combine(&self, other: &Self) -> Self;

    /// Error of placing the vertex at `p`
    fn evaluate_at(&self, p: &Point3f) -> f64;

    /// Position with the least error, if the metric determines one
    fn minimizer(&self) -> Option<Point3f>;
}

/// Sum of squared distances to a set of sample points.
///
/// For samples `x_i`, `cost(p) = sum |p - x_i|^2 = n p.p - 2 p.Sv + Svtv`
/// where `n` is the sample count, `Sv` their sum and `Svtv` the sum of their
/// squared lengths. The minimizer is the sample mean `Sv / n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsotropicQuadric {
    pub n: f64,
    pub sv: Vector3d,
    pub svtv: f64,
}

impl IsotropicQuadric {
    pub fn new(n: f64, sv: Vector3d, svtv: f64) -> Self {
        Self { n, sv, svtv }
    }

    /// Add one sample point
    pub fn add_sample(&mut self, p: &Point3f) {
        let v = to_f64(p);
        self.n += 1.0;
        self.sv += v;
        self.svtv += v.dot(&v);
    }
}

impl Default for IsotropicQuadric {
    fn default() -> Self {
        Self {
            n: 0.0,
            sv: Vector3d::zeros(),
            svtv: 0.0,
        }
    }
}

impl ErrorMetric for IsotropicQuadric {
    fn from_one_ring<I>(_center: &Point3f, ring: I) -> Self
    where
        I: IntoIterator<Item = Point3f>,
    {
        let mut q = Self::default();
        for p in ring {
            q.add_sample(&p);
        }
        q
    }

    fn combine(&self, other: &Self) -> Self {
        *self + *other
    }

    fn evaluate_at(&self, p: &Point3f) -> f64 {
        let v = to_f64(p);
        self.n * v.dot(&v) - 2.0 * v.dot(&self.sv) + self.svtv
    }

    fn minimizer(&self) -> Option<Point3f> {
        (self.n > 0.0).then(|| to_point3f(&(self.sv / self.n)))
    }
}

impl Add for IsotropicQuadric {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            n: self.n + rhs.n,
            sv: self.sv + rhs.sv,
            svtv: self.svtv + rhs.svtv,
        }
    }
}

impl AddAssign for IsotropicQuadric {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Where the merge of two vertices goes and what it costs.
///
/// Falls back to the midpoint of `a` and `b` when the combined metric has no
/// minimizer. Negative costs from rounding are clamped to zero.
pub fn collapse_target<Q: ErrorMetric>(qa: &Q, qb: &Q, a: &Point3f, b: &Point3f) -> (Point3f, f64) {
    let q = qa.combine(qb);
    let position = q
        .minimizer()
        .unwrap_or_else(|| Point3f::from((a.coords + b.coords) * 0.5));
    let cost = q.evaluate_at(&position).max(0.0);
    (position, cost)
}
