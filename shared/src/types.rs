/*!
Core math aliases and small value types shared by the gesture, spawn and contact modules.

This module intentionally contains no algorithms. It defines the data exchanged between:
- the hand model and the thumbs-up classifier
- the spawn capacity manager and the authority service
- the ground contact resolver and the surface query service
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Point3 = na::Point3<f32>;
pub type Quat = na::UnitQuaternion<f32>;

/// Axis-aligned bounds of a body in world space.
pub use rapier3d::parry::bounding_volume::Aabb;

/// World "up". Gesture thresholds and spawn heights are expressed against it.
#[inline]
pub fn up() -> Vec3 {
    Vec3::y()
}

/// A position + orientation in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    #[inline]
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pose at `position` with identity orientation.
    #[inline]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::identity(),
        }
    }
}

/// A half-line used for surface queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub dir: Vec3,
}

impl Ray {
    #[inline]
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    /// Ray pointing straight down from `origin`.
    #[inline]
    pub fn down(origin: Vec3) -> Self {
        Self {
            origin,
            dir: -up(),
        }
    }

    #[inline]
    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.origin + self.dir * distance
    }
}

/// Nearest intersection returned by a surface query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
    /// World-space impact point.
    pub point: Vec3,
    /// World-space unit surface normal at the impact point.
    pub normal: Vec3,
}

/// Bottom-center of an `Aabb` (center in X/Z, `mins.y` in Y).
#[inline]
pub fn aabb_bottom_center(bounds: &Aabb) -> Vec3 {
    let c = bounds.center();
    Vec3::new(c.x, bounds.mins.y, c.z)
}
