//! Fixed-size 2-D linear algebra.
//!
//! The mixture model is fixed at two input and two output dimensions, so
//! vectors and matrices are plain `Copy` structs with named entries rather
//! than heap-backed arrays. Matrices are row-major:
//!
//! ```text
//! | a  b |
//! | c  d |
//! ```
//!
//! None of these operations guard against degeneracy. A singular matrix
//! inverts to non-finite entries and a non positive-definite matrix factors
//! to NaN; callers detect that downstream through the normalization factor.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

/// A 2-vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub a: f64,
    pub b: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { a: 0.0, b: 0.0 };

    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    pub fn dot(&self, other: &Vec2) -> f64 {
        self.a * other.a + self.b * other.b
    }

    /// Rank-one outer product `self ⊗ other`.
    pub fn outer(&self, other: &Vec2) -> Mat2x2 {
        Mat2x2 {
            a: self.a * other.a,
            b: self.a * other.b,
            c: self.b * other.a,
            d: self.b * other.b,
        }
    }

    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite()
    }

    /// Component-wise minimum.
    pub fn min(&self, other: &Vec2) -> Vec2 {
        Vec2::new(self.a.min(other.a), self.b.min(other.b))
    }

    /// Component-wise maximum.
    pub fn max(&self, other: &Vec2) -> Vec2 {
        Vec2::new(self.a.max(other.a), self.b.max(other.b))
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.a + rhs.a, self.b + rhs.b)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.a += rhs.a;
        self.b += rhs.b;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.a - rhs.a, self.b - rhs.b)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, scale: f64) -> Vec2 {
        Vec2::new(self.a * scale, self.b * scale)
    }
}

impl From<[f64; 2]> for Vec2 {
    fn from(v: [f64; 2]) -> Self {
        Vec2::new(v[0], v[1])
    }
}

/// A 2×2 matrix, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Mat2x2 {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Mat2x2 {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn identity() -> Self {
        Self::isotropic(1.0)
    }

    /// `v` on the diagonal, zero elsewhere.
    pub fn isotropic(v: f64) -> Self {
        Self::new(v, 0.0, 0.0, v)
    }

    pub fn transpose(&self) -> Self {
        Self::new(self.a, self.c, self.b, self.d)
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Matrix–vector product `M·v`.
    pub fn dot_vec(&self, v: &Vec2) -> Vec2 {
        Vec2::new(self.a * v.a + self.b * v.b, self.c * v.a + self.d * v.b)
    }

    /// `vᵀ·M·v`.
    pub fn quadratic_form(&self, v: &Vec2) -> f64 {
        v.dot(&self.dot_vec(v))
    }

    /// Adjugate over determinant. Singular input yields non-finite entries.
    pub fn inverse(&self) -> Self {
        let det = self.determinant();
        Self::new(self.d / det, -self.b / det, -self.c / det, self.a / det)
    }

    /// Lower-triangular Cholesky factor `L` with `L·Lᵀ = M`.
    ///
    /// Uses the lower off-diagonal entry `c`. A non positive-definite input
    /// produces NaN (negative radicand) or infinite entries (zero pivot).
    pub fn cholesky(&self) -> Self {
        let l11 = self.a.sqrt();
        let l21 = self.c / l11;
        let l22 = (self.d - l21 * l21).sqrt();
        Self::new(l11, 0.0, l21, l22)
    }

    pub fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite() && self.c.is_finite() && self.d.is_finite()
    }
}

impl Add for Mat2x2 {
    type Output = Mat2x2;

    fn add(self, rhs: Mat2x2) -> Mat2x2 {
        Mat2x2::new(self.a + rhs.a, self.b + rhs.b, self.c + rhs.c, self.d + rhs.d)
    }
}

impl Sub for Mat2x2 {
    type Output = Mat2x2;

    fn sub(self, rhs: Mat2x2) -> Mat2x2 {
        Mat2x2::new(self.a - rhs.a, self.b - rhs.b, self.c - rhs.c, self.d - rhs.d)
    }
}

impl Mul<f64> for Mat2x2 {
    type Output = Mat2x2;

    fn mul(self, scale: f64) -> Mat2x2 {
        Mat2x2::new(self.a * scale, self.b * scale, self.c * scale, self.d * scale)
    }
}

/// Mean and covariance of a 2-D Gaussian.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Gaussian2D {
    pub mean: Vec2,
    pub covariance: Mat2x2,
}

impl Gaussian2D {
    pub fn new(mean: Vec2, covariance: Mat2x2) -> Self {
        Self { mean, covariance }
    }

    /// Move the mean toward `x` by `weight`, returning the step taken.
    pub fn weighted_mean_update(&mut self, x: &Vec2, weight: f64) -> Vec2 {
        let delta = (*x - self.mean) * weight;
        self.mean += delta;
        delta
    }

    /// Blend the covariance toward the rank-one term `p ⊗ q`:
    /// `cov += weight · (p⊗q − cov)`.
    pub fn weighted_covariance_update(&mut self, p: &Vec2, q: &Vec2, weight: f64) {
        let target = p.outer(q);
        self.covariance = self.covariance + (target - self.covariance) * weight;
    }
}
