//! Three-component vector used for node state and obstacle geometry.

use crate::float::Float;
use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Lengths below this are treated as zero when normalizing.
pub const NORMALIZE_EPSILON: f64 = 1e-10;

/// 3D vector for positions, velocities, accelerations and forces.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3<F: Float> {
    pub x: F,
    pub y: F,
    pub z: F,
}

impl<F: Float> Vec3<F> {
    /// Create a new 3D vector.
    pub fn new(x: F, y: F, z: F) -> Self { Vec3 { x, y, z } }

    /// Zero vector.
    pub fn zero() -> Self { Vec3 { x: F::zero(), y: F::zero(), z: F::zero() } }

    /// Dot product.
    pub fn dot(self, other: Self) -> F {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Squared length (avoids sqrt).
    pub fn length_sq(self) -> F {
        self.dot(self)
    }

    /// Length (magnitude).
    pub fn length(self) -> F {
        self.length_sq().sqrt()
    }

    /// Distance between two points.
    pub fn distance(self, other: Self) -> F {
        (self - other).length()
    }

    /// Scale all components by a scalar.
    pub fn scale(self, s: F) -> Self {
        Vec3 { x: self.x * s, y: self.y * s, z: self.z * s }
    }

    /// Normalize to unit length.
    ///
    /// Returns the zero vector when the length is below
    /// [`NORMALIZE_EPSILON`]. Every direction the solver derives (spring
    /// axis, drag direction, sphere projection ray) goes through here, so a
    /// coincident pair of points yields no force instead of NaN.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len.is_near_zero(F::from_f64(NORMALIZE_EPSILON)) {
            Self::zero()
        } else {
            self.scale(F::one() / len)
        }
    }

    /// `true` when every component is finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl<F: Float> Add for Vec3<F> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Vec3 { x: self.x + rhs.x, y: self.y + rhs.y, z: self.z + rhs.z }
    }
}

impl<F: Float> Sub for Vec3<F> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Vec3 { x: self.x - rhs.x, y: self.y - rhs.y, z: self.z - rhs.z }
    }
}

impl<F: Float> Neg for Vec3<F> {
    type Output = Self;
    fn neg(self) -> Self { Vec3 { x: -self.x, y: -self.y, z: -self.z } }
}

impl<F: Float> Mul<F> for Vec3<F> {
    type Output = Self;
    fn mul(self, s: F) -> Self { self.scale(s) }
}

impl<F: Float> AddAssign for Vec3<F> {
    fn add_assign(&mut self, rhs: Self) { *self = *self + rhs; }
}

impl<F: Float> SubAssign for Vec3<F> {
    fn sub_assign(&mut self, rhs: Self) { *self = *self - rhs; }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_of_pythagorean_triple() {
        let v = Vec3::new(2.0f32, 3.0, 6.0);
        assert!((v.length() - 7.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_zero_vector() {
        let v = Vec3::<f32>::zero();
        assert_eq!(v.normalize(), Vec3::zero());
    }

    #[test]
    fn normalize_tiny_vector_is_zero() {
        let v = Vec3::new(1e-12f64, 0.0, 0.0);
        assert_eq!(v.normalize(), Vec3::zero());
    }

    #[test]
    fn normalize_has_unit_length() {
        let n = Vec3::new(0.0f64, -4.0, 3.0).normalize();
        assert!((n.length() - 1.0).abs() < 1e-12);
        assert!((n.y + 0.8).abs() < 1e-12);
    }

    #[test]
    fn operators_compose() {
        let mut a = Vec3::new(1.0f32, 2.0, 3.0);
        a += Vec3::new(1.0, 1.0, 1.0);
        a -= Vec3::new(0.0, 0.0, 4.0);
        assert_eq!(a * 2.0, Vec3::new(4.0, 6.0, 0.0));
        assert_eq!(-a, Vec3::new(-2.0, -3.0, 0.0));
    }

    #[test]
    fn non_finite_detected() {
        assert!(Vec3::new(0.0f32, 1.0, 2.0).is_finite());
        assert!(!Vec3::new(0.0f32, f32::NAN, 2.0).is_finite());
    }
}
