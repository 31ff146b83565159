//! Rapier query world for labelled room surfaces.
//!
//! Builds an immutable in-memory scene from scanned room surfaces (floor/wall planes,
//! furniture boxes, the global mesh) and answers labelled ray queries against it.
//!
//! - Deterministic: definitions are inserted sorted by `id`.
//! - Query only: nothing here steps dynamics.
//! - Each collider stores its label mask in `user_data`, so filtering is a bit test.

use std::fmt;

use log::info;
use rapier3d::na::{Translation3, UnitQuaternion};
use rapier3d::prelude::*;

use crate::{
    bitmask_flags::{FlagBitmask, LabelContainer, SurfaceFilter, SurfaceLabel},
    constants::DIR_EPS_SQ,
    surface::{SurfaceQuery, SurfaceStatus},
    types::{self, SurfaceHit, Vec3},
};

/// One static surface of the scanned room.
///
/// Planes use a pose-derived normal: `normal = rotation * +Y`, passing through
/// `translation`.
#[derive(Clone, Debug)]
pub struct RoomSurfaceDef {
    /// Stable identifier; fixes insertion order.
    pub id: u32,
    pub translation: Vec3,
    pub rotation: UnitQuaternion<f32>,
    pub label: SurfaceLabel,
    pub shape: SurfaceShapeDef,
}

#[derive(Clone, Debug)]
pub enum SurfaceShapeDef {
    /// Infinite plane (half-space). Anything below it counts as solid.
    Plane,
    Cuboid { half_extents: Vec3 },
    Sphere { radius: f32 },
    /// Triangle mesh in local space, e.g. the scanned global mesh.
    TriMesh {
        vertices: Vec<Vec3>,
        indices: Vec<[u32; 3]>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum RoomBuildError {
    /// Translation, rotation or a shape parameter is NaN/infinite.
    NonFinite { id: u32 },
    /// Zero or negative extents/radius.
    DegenerateShape { id: u32 },
    /// Triangle mesh rejected by Rapier.
    InvalidTriMesh { id: u32, reason: String },
}

impl fmt::Display for RoomBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite { id } => write!(f, "surface {id} has non-finite values"),
            Self::DegenerateShape { id } => write!(f, "surface {id} has a degenerate shape"),
            Self::InvalidTriMesh { id, reason } => {
                write!(f, "surface {id} has an invalid triangle mesh: {reason}")
            }
        }
    }
}

impl std::error::Error for RoomBuildError {}

/// Static room scene answering [`SurfaceQuery`] ray casts.
pub struct RoomGeometry {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
}

impl RoomGeometry {
    /// Build the scene. An empty list yields a room that reports `NoRoom`.
    pub fn build(mut defs: Vec<RoomSurfaceDef>) -> Result<Self, RoomBuildError> {
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        for def in &defs {
            let (pose, collider) = collider_from_def(def)?;
            let rb_handle = bodies.insert(RigidBodyBuilder::fixed().pose(pose).build());
            colliders.insert_with_parent(collider, rb_handle, &mut bodies);
        }

        // Collision detection only, so the broad phase BVH is populated for queries.
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        let mut collision_pipeline = CollisionPipeline::new();
        collision_pipeline.step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &(),
            &(),
        );

        info!("room geometry built with {} surfaces", colliders.len());

        Ok(Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
        })
    }

    pub fn surface_count(&self) -> usize {
        self.colliders.len()
    }

    /// Borrowed `QueryPipeline` over the room.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }
}

impl SurfaceQuery for RoomGeometry {
    fn status(&self) -> SurfaceStatus {
        if self.colliders.len() == 0 {
            SurfaceStatus::NoRoom
        } else {
            SurfaceStatus::Tracking
        }
    }

    fn raycast(
        &self,
        ray: &types::Ray,
        max_distance: f32,
        filter: SurfaceFilter,
    ) -> Option<SurfaceHit> {
        let accepts = |_handle: ColliderHandle, collider: &Collider| {
            filter.intersects(collider.user_data as LabelContainer)
        };
        let query_pipeline = self.query_pipeline(QueryFilter::default().predicate(&accepts));

        let rapier_ray = Ray::new(Point::from(ray.origin), ray.dir);
        let (_handle, hit) =
            query_pipeline.cast_ray_and_get_normal(&rapier_ray, max_distance.max(0.0), true)?;

        // Origin inside a solid: Rapier reports a zero normal.
        if hit.normal.norm_squared() <= DIR_EPS_SQ {
            return None;
        }

        Some(SurfaceHit {
            point: ray.point_at(hit.time_of_impact),
            normal: hit.normal,
        })
    }
}

fn collider_from_def(def: &RoomSurfaceDef) -> Result<(Isometry<f32>, Collider), RoomBuildError> {
    let id = def.id;
    let finite_pose = def.translation.iter().all(|v| v.is_finite())
        && def.rotation.coords.iter().all(|v| v.is_finite());
    if !finite_pose {
        return Err(RoomBuildError::NonFinite { id });
    }

    let pose = Isometry::from_parts(Translation3::from(def.translation), def.rotation);

    let (pose, builder) = match &def.shape {
        SurfaceShapeDef::Plane => {
            let n = UnitVector::try_new(def.rotation * Vector::y(), DIR_EPS_SQ)
                .ok_or(RoomBuildError::DegenerateShape { id })?;
            // Half-space boundary passes through the body origin, so only translate.
            let plane_pose = Isometry::translation(
                def.translation.x,
                def.translation.y,
                def.translation.z,
            );
            (plane_pose, ColliderBuilder::halfspace(n))
        }

        SurfaceShapeDef::Cuboid { half_extents } => {
            if !half_extents.iter().all(|v| v.is_finite()) {
                return Err(RoomBuildError::NonFinite { id });
            }
            if half_extents.iter().any(|v| *v <= 0.0) {
                return Err(RoomBuildError::DegenerateShape { id });
            }
            (
                pose,
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z),
            )
        }

        SurfaceShapeDef::Sphere { radius } => {
            if !radius.is_finite() {
                return Err(RoomBuildError::NonFinite { id });
            }
            if *radius <= 0.0 {
                return Err(RoomBuildError::DegenerateShape { id });
            }
            (pose, ColliderBuilder::ball(*radius))
        }

        SurfaceShapeDef::TriMesh { vertices, indices } => {
            if !vertices.iter().flat_map(|v| v.iter()).all(|c| c.is_finite()) {
                return Err(RoomBuildError::NonFinite { id });
            }
            let points: Vec<Point<f32>> = vertices.iter().map(|v| Point::from(*v)).collect();
            let builder = ColliderBuilder::trimesh(points, indices.clone()).map_err(|e| {
                RoomBuildError::InvalidTriMesh {
                    id,
                    reason: format!("{e:?}"),
                }
            })?;
            (pose, builder)
        }
    };

    let collider = builder.user_data(def.label.mask() as u128).build();
    Ok((pose, collider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn floor_at(id: u32, height: f32) -> RoomSurfaceDef {
        RoomSurfaceDef {
            id,
            translation: Vec3::new(0.0, height, 0.0),
            rotation: UnitQuaternion::identity(),
            label: SurfaceLabel::Floor,
            shape: SurfaceShapeDef::Plane,
        }
    }

    fn down_from(x: f32, y: f32, z: f32) -> types::Ray {
        types::Ray::down(Vec3::new(x, y, z))
    }

    #[test]
    fn empty_room_reports_no_room() {
        let room = RoomGeometry::build(Vec::new()).expect("empty room builds");
        assert_eq!(room.status(), SurfaceStatus::NoRoom);
        assert!(!room.is_available());
    }

    #[test]
    fn plane_hit_reports_height_and_up_normal() {
        let room = RoomGeometry::build(vec![floor_at(1, 0.5)]).expect("room builds");
        assert_eq!(room.status(), SurfaceStatus::Tracking);

        let hit = room
            .raycast(
                &down_from(1.0, 2.0, -3.0),
                5.0,
                SurfaceFilter::floor_and_global_mesh(),
            )
            .expect("floor below the ray");
        assert!((hit.point.y - 0.5).abs() < 1.0e-4);
        assert!((hit.normal - Vec3::y()).norm() < 1.0e-4);

        // Out of range.
        assert!(
            room.raycast(
                &down_from(0.0, 2.0, 0.0),
                1.0,
                SurfaceFilter::floor_and_global_mesh()
            )
            .is_none()
        );
    }

    #[test]
    fn filter_skips_unlisted_labels() {
        // A table top above the floor; the floor probe should see through it.
        let table = RoomSurfaceDef {
            id: 2,
            translation: Vec3::new(0.0, 0.7, 0.0),
            rotation: UnitQuaternion::identity(),
            label: SurfaceLabel::Table,
            shape: SurfaceShapeDef::Cuboid {
                half_extents: Vec3::new(0.5, 0.05, 0.5),
            },
        };
        let room = RoomGeometry::build(vec![table, floor_at(1, 0.0)]).expect("room builds");

        let floor_hit = room
            .raycast(
                &down_from(0.0, 2.0, 0.0),
                5.0,
                SurfaceFilter::floor_and_global_mesh(),
            )
            .map(|h| h.point.y);
        assert!(floor_hit.is_some_and(|y| y.abs() < 1.0e-4));

        let any_hit = room
            .raycast(&down_from(0.0, 2.0, 0.0), 5.0, SurfaceFilter::all())
            .map(|h| h.point.y);
        assert!(any_hit.is_some_and(|y| (y - 0.75).abs() < 1.0e-4));
    }

    #[test]
    fn wall_plane_is_not_ground() {
        // Wall at x = 1 facing -X.
        let wall = RoomSurfaceDef {
            id: 3,
            translation: Vec3::new(1.0, 0.0, 0.0),
            rotation: UnitQuaternion::from_axis_angle(&Vector::z_axis(), FRAC_PI_2),
            label: SurfaceLabel::WallFace,
            shape: SurfaceShapeDef::Plane,
        };
        let room = RoomGeometry::build(vec![wall]).expect("room builds");
        assert!(
            room.raycast(
                &down_from(0.0, 1.0, 0.0),
                5.0,
                SurfaceFilter::floor_and_global_mesh()
            )
            .is_none()
        );
    }

    #[test]
    fn global_mesh_trimesh_is_hit() {
        let mesh = RoomSurfaceDef {
            id: 9,
            translation: Vec3::new(0.0, 0.1, 0.0),
            rotation: UnitQuaternion::identity(),
            label: SurfaceLabel::GlobalMesh,
            shape: SurfaceShapeDef::TriMesh {
                vertices: vec![
                    Vec3::new(-2.0, 0.0, -2.0),
                    Vec3::new(2.0, 0.0, -2.0),
                    Vec3::new(2.0, 0.0, 2.0),
                    Vec3::new(-2.0, 0.0, 2.0),
                ],
                indices: vec![[0, 2, 1], [0, 3, 2]],
            },
        };
        let room = RoomGeometry::build(vec![mesh]).expect("room builds");
        let hit = room
            .raycast(
                &down_from(0.3, 1.0, 0.2),
                5.0,
                SurfaceFilter::floor_and_global_mesh(),
            )
            .map(|h| h.point.y);
        assert!(hit.is_some_and(|y| (y - 0.1).abs() < 1.0e-4));
    }

    #[test]
    fn ray_starting_below_floor_is_a_miss() {
        let room = RoomGeometry::build(vec![floor_at(1, 0.0)]).expect("room builds");
        assert!(
            room.raycast(
                &down_from(0.0, -0.5, 0.0),
                5.0,
                SurfaceFilter::floor_and_global_mesh()
            )
            .is_none()
        );
    }

    #[test]
    fn invalid_definitions_are_rejected() {
        let mut bad = floor_at(4, f32::NAN);
        assert_eq!(
            RoomGeometry::build(vec![bad.clone()]).err(),
            Some(RoomBuildError::NonFinite { id: 4 })
        );

        bad.translation = Vec3::zeros();
        bad.shape = SurfaceShapeDef::Sphere { radius: 0.0 };
        assert_eq!(
            RoomGeometry::build(vec![bad]).err(),
            Some(RoomBuildError::DegenerateShape { id: 4 })
        );

        let empty_mesh = RoomSurfaceDef {
            shape: SurfaceShapeDef::TriMesh {
                vertices: Vec::new(),
                indices: Vec::new(),
            },
            ..floor_at(5, 0.0)
        };
        assert!(matches!(
            RoomGeometry::build(vec![empty_mesh]),
            Err(RoomBuildError::InvalidTriMesh { id: 5, .. })
        ));
    }
}
