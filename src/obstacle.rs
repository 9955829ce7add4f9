//! Rigid obstacles the cloth collides with: the capability trait and shapes.

use crate::error::ClothError;
use crate::float::Float;
use crate::vec::Vec3;
use alloc::rc::Rc;
use core::cell::RefCell;

/// Outward slack on the inside test: relative to the radius for spheres,
/// an absolute distance for planes.
///
/// Without it a node projected exactly onto the surface flickers between
/// inside and outside on the next step.
pub const INSIDE_TOLERANCE: f64 = 0.001;

/// A rigid body usable as a collision constraint.
///
/// Both methods are pure. [`ClothGrid`](crate::ClothGrid) only calls
/// [`project`](Obstacle::project) on points for which
/// [`is_inside`](Obstacle::is_inside) returned `true`; calling it on an
/// outside point returns an unspecified (but finite) point.
pub trait Obstacle<F: Float> {
    /// `true` if `point` lies within or on the solid region.
    fn is_inside(&self, point: Vec3<F>) -> bool;

    /// Nearest point on the boundary to an inside `point`.
    fn project(&self, point: Vec3<F>) -> Vec3<F>;
}

/// Caller-owned obstacle handle that can be moved between steps.
///
/// The grid keeps only a `Weak` to it; dropping the last `Rc` detaches it.
pub type SharedObstacle<F> = Rc<RefCell<dyn Obstacle<F>>>;

/// Solid sphere.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SphereObstacle<F: Float> {
    pub center: Vec3<F>,
    pub radius: F,
}

impl<F: Float> SphereObstacle<F> {
    pub fn new(center: Vec3<F>, radius: F) -> Self {
        SphereObstacle { center, radius }
    }

    /// Wrap in a shareable handle for [`ClothGrid::add_obstacle`](crate::ClothGrid::add_obstacle).
    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }
}

impl<F: Float> Obstacle<F> for SphereObstacle<F> {
    fn is_inside(&self, point: Vec3<F>) -> bool {
        let limit = self.radius * (F::one() + F::from_f64(INSIDE_TOLERANCE));
        point.distance(self.center) <= limit
    }

    /// Pushes the point out along the ray from the centre.
    ///
    /// A point exactly at the centre has no ray and stays where it is.
    fn project(&self, point: Vec3<F>) -> Vec3<F> {
        let dir = (point - self.center).normalize();
        self.center + dir.scale(self.radius)
    }
}

/// Solid half-space below a plane: everything on the side opposite `normal`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaneObstacle<F: Float> {
    point: Vec3<F>,
    normal: Vec3<F>,
}

impl<F: Float> PlaneObstacle<F> {
    /// Plane through `point` whose free side faces `normal`.
    pub fn new(point: Vec3<F>, normal: Vec3<F>) -> Result<Self, ClothError> {
        let normal = normal.normalize();
        if normal == Vec3::zero() {
            return Err(ClothError::DegenerateNormal);
        }
        Ok(PlaneObstacle { point, normal })
    }

    /// Horizontal floor at height `z`, free side facing +z.
    pub fn floor(z: F) -> Self {
        PlaneObstacle {
            point: Vec3::new(F::zero(), F::zero(), z),
            normal: Vec3::new(F::zero(), F::zero(), F::one()),
        }
    }

    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    pub fn point(&self) -> Vec3<F> { self.point }
    pub fn normal(&self) -> Vec3<F> { self.normal }

    /// Move the plane without changing its orientation.
    pub fn set_point(&mut self, point: Vec3<F>) {
        self.point = point;
    }

    fn signed_distance(&self, point: Vec3<F>) -> F {
        (point - self.point).dot(self.normal)
    }
}

impl<F: Float> Obstacle<F> for PlaneObstacle<F> {
    fn is_inside(&self, point: Vec3<F>) -> bool {
        self.signed_distance(point) <= F::from_f64(INSIDE_TOLERANCE)
    }

    fn project(&self, point: Vec3<F>) -> Vec3<F> {
        point - self.normal.scale(self.signed_distance(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_inside_includes_tolerance_band() {
        let s = SphereObstacle::new(Vec3::new(0.0f64, 0.0, 0.0), 2.0);
        assert!(s.is_inside(Vec3::new(0.0, 0.0, 2.0)));
        assert!(s.is_inside(Vec3::new(0.0, 0.0, 2.0019)));
        assert!(!s.is_inside(Vec3::new(0.0, 0.0, 2.003)));
    }

    #[test]
    fn large_sphere_tolerance_is_exact_in_f64() {
        let s = SphereObstacle::new(Vec3::new(0.0f64, 0.0, 0.0), 1000.0);
        assert!(s.is_inside(Vec3::new(0.0, 0.0, 1000.99999)));
        assert!(!s.is_inside(Vec3::new(0.0, 0.0, 1001.00000004)));
    }

    #[test]
    fn sphere_project_at_center_is_finite() {
        let s = SphereObstacle::new(Vec3::new(1.0f32, 2.0, 3.0), 1.0);
        let q = s.project(s.center);
        assert!(q.is_finite());
        assert_eq!(q, s.center);
    }

    #[test]
    fn plane_rejects_zero_normal() {
        let err = PlaneObstacle::new(Vec3::<f32>::zero(), Vec3::zero()).unwrap_err();
        assert_eq!(err, ClothError::DegenerateNormal);
    }

    #[test]
    fn plane_projects_onto_surface() {
        let p = PlaneObstacle::new(Vec3::new(0.0f64, 0.0, -1.0), Vec3::new(0.0, 0.0, 5.0)).unwrap();
        let below = Vec3::new(0.3, -0.7, -1.5);
        assert!(p.is_inside(below));
        let q = p.project(below);
        assert!((q.z + 1.0).abs() < 1e-12);
        assert!((q.x - 0.3).abs() < 1e-12);
        assert!(!p.is_inside(Vec3::new(0.0, 0.0, 0.0)));
    }
}
