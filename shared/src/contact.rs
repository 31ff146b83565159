//! Ground contact resolution against scanned room geometry.
//!
//! The room is an arbitrarily shaped scanned mesh that can only be sampled with ray
//! queries, so contact is approximated from a single downward ray per body per step:
//! - Cast from just above the body's bottom-center, straight down.
//! - Ignore the body unless its bottom is within `snap_distance` of the hit.
//! - Push it out along the hit normal when it has sunk below the surface.
//! - Reflect the approaching normal velocity (scaled by `bounce`, or zeroed under
//!   `min_bounce_speed`) and damp the tangential part.
//!
//! Runs every fixed step, independently for each body, after the rigid-body solver.

use log::debug;

use crate::{
    authority::{AuthorityService, PhysicsBody},
    bitmask_flags::SurfaceFilter,
    config::ContactConfig,
    constants::DIR_EPS_SQ,
    surface::SurfaceQuery,
    types::{Ray, Vec3, aabb_bottom_center, up},
};

/// Why a body was left untouched this step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Turned off globally or for this body.
    Disabled,
    Kinematic,
    NoRoom,
    NoHit,
    /// Bottom is more than `snap_distance` above the hit.
    Airborne,
}

/// What the resolver did to one body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ContactOutcome {
    Skipped(SkipReason),
    Resolved {
        /// Translation applied to resolve interpenetration (zero if none).
        correction: Vec3,
        /// Normal speed before resolution; negative when approaching.
        normal_speed: f32,
        /// Whether the velocity was rewritten.
        velocity_changed: bool,
    },
}

impl ContactOutcome {
    #[inline]
    pub fn is_contact(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GroundContactResolver {
    pub config: ContactConfig,
}

impl GroundContactResolver {
    pub fn new(config: ContactConfig) -> Self {
        Self { config }
    }

    /// Velocity after a bounce off a surface with unit `normal`.
    ///
    /// Returns `None` when the body is not approaching the surface.
    pub fn bounce_velocity(&self, velocity: Vec3, normal: Vec3) -> Option<Vec3> {
        let normal_speed = velocity.dot(&normal);
        if normal_speed >= 0.0 {
            return None;
        }

        let tangent = velocity - normal * normal_speed;
        let mut bounced = normal_speed.abs();
        if bounced < self.config.min_bounce_speed {
            bounced = 0.0;
        } else {
            bounced *= self.config.bounce;
        }

        Some(normal * bounced + tangent * self.config.tangent_damping)
    }

    /// Resolve one body for this step.
    pub fn resolve(
        &self,
        body: &mut impl PhysicsBody,
        surface: &impl SurfaceQuery,
    ) -> ContactOutcome {
        if !self.config.enabled || !body.ground_physics_enabled() {
            return ContactOutcome::Skipped(SkipReason::Disabled);
        }
        if body.is_kinematic() {
            return ContactOutcome::Skipped(SkipReason::Kinematic);
        }
        if !surface.is_available() {
            return ContactOutcome::Skipped(SkipReason::NoRoom);
        }

        let bounds = body.bounds();
        let bottom = aabb_bottom_center(&bounds);
        let ray = Ray::down(bottom + up() * self.config.ray_start_offset);

        let Some(hit) = surface.raycast(
            &ray,
            self.config.ray_distance,
            SurfaceFilter::floor_and_global_mesh(),
        ) else {
            return ContactOutcome::Skipped(SkipReason::NoHit);
        };

        // A zero normal means the ray started inside the surface; nothing reliable to
        // push along.
        let n_len_sq = hit.normal.norm_squared();
        if n_len_sq <= DIR_EPS_SQ {
            return ContactOutcome::Skipped(SkipReason::NoHit);
        }
        let normal = hit.normal / n_len_sq.sqrt();

        let separation = bottom.y - hit.point.y;
        if separation > self.config.snap_distance {
            return ContactOutcome::Skipped(SkipReason::Airborne);
        }

        let mut correction = Vec3::zeros();
        let penetration = hit.point.y - bottom.y;
        if penetration > 0.0 {
            correction = normal * (penetration + self.config.penetration_epsilon);
            body.translate(correction);
        }

        let velocity = body.linear_velocity();
        let normal_speed = velocity.dot(&normal);
        let new_velocity = self.bounce_velocity(velocity, normal);
        if let Some(v) = new_velocity {
            body.set_linear_velocity(v);
        }

        ContactOutcome::Resolved {
            correction,
            normal_speed,
            velocity_changed: new_velocity.is_some(),
        }
    }

    /// Resolve every listed object that still exists. Returns how many were in contact.
    pub fn resolve_all<A: AuthorityService>(
        &self,
        handles: impl IntoIterator<Item = A::Handle>,
        authority: &mut A,
        surface: &impl SurfaceQuery,
    ) -> usize {
        let mut contacts = 0;
        for handle in handles {
            let Some(body) = authority.body_mut(handle) else {
                continue;
            };
            let outcome = self.resolve(body, surface);
            match outcome {
                ContactOutcome::Resolved {
                    correction,
                    normal_speed,
                    velocity_changed,
                } => {
                    contacts += 1;
                    debug!(
                        "{handle:?} ground contact: v_n {normal_speed:.3}, correction {:.4}, bounced {velocity_changed}",
                        correction.norm()
                    );
                }
                ContactOutcome::Skipped(_) => {}
            }
        }
        contacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        authority::tests::{FakeAuthority, TestBody},
        constants::PENETRATION_EPSILON,
        surface::{SurfaceStatus, tests::FlatFloor},
        types::SurfaceHit,
    };

    const EPS: f32 = 1.0e-5;

    /// Cube of half extent 0.1 whose bottom is at `bottom_y`.
    fn body_at(bottom_y: f32, velocity: Vec3) -> TestBody {
        let mut body = TestBody::cube(Vec3::new(0.0, bottom_y + 0.1, 0.0), 0.1);
        body.velocity = velocity;
        body
    }

    fn bottom_of(body: &TestBody) -> f32 {
        body.bounds().mins.y
    }

    #[test]
    fn fast_impact_bounces_with_coefficient() {
        let resolver = GroundContactResolver::default();
        let mut body = body_at(0.0, Vec3::new(0.0, -2.0, 0.0));

        let outcome = resolver.resolve(&mut body, &FlatFloor::at(0.0));
        assert!(outcome.is_contact());
        assert!((body.velocity.y - 2.0 * 0.35).abs() < EPS);
        // Exactly at the surface: no correction.
        assert!((bottom_of(&body) - 0.0).abs() < EPS);
    }

    #[test]
    fn slow_impact_is_zeroed() {
        let resolver = GroundContactResolver::default();
        let mut body = body_at(0.0, Vec3::new(0.0, -0.15, 0.0));

        resolver.resolve(&mut body, &FlatFloor::at(0.0));
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn min_bounce_speed_boundary_still_bounces() {
        let resolver = GroundContactResolver::default();
        let v = resolver
            .bounce_velocity(Vec3::new(0.0, -0.2, 0.0), Vec3::y())
            .map(|v| v.y);
        assert!(v.is_some_and(|y| (y - 0.2 * 0.35).abs() < EPS));
    }

    #[test]
    fn tangential_velocity_is_damped() {
        let resolver = GroundContactResolver::default();
        let mut body = body_at(0.0, Vec3::new(1.0, -1.0, -0.5));

        resolver.resolve(&mut body, &FlatFloor::at(0.0));
        assert!((body.velocity.x - 0.92).abs() < EPS);
        assert!((body.velocity.z + 0.46).abs() < EPS);
        assert!((body.velocity.y - 0.35).abs() < EPS);
    }

    #[test]
    fn moving_away_keeps_velocity_but_still_corrects() {
        let resolver = GroundContactResolver::default();
        let v = Vec3::new(0.3, 1.5, 0.0);
        let mut body = body_at(-0.01, v);

        let outcome = resolver.resolve(&mut body, &FlatFloor::at(0.0));
        assert_eq!(body.velocity, v);
        assert!((bottom_of(&body) - PENETRATION_EPSILON).abs() < EPS);
        let ContactOutcome::Resolved {
            velocity_changed,
            correction,
            ..
        } = outcome
        else {
            panic!("expected contact, got {outcome:?}");
        };
        assert!(!velocity_changed);
        assert!((correction.y - (0.01 + PENETRATION_EPSILON)).abs() < EPS);
    }

    #[test]
    fn penetration_is_pushed_out_along_normal() {
        let resolver = GroundContactResolver::default();
        let mut body = body_at(-0.05, Vec3::new(0.0, -1.0, 0.0));

        resolver.resolve(&mut body, &FlatFloor::at(0.0));
        assert!((bottom_of(&body) - PENETRATION_EPSILON).abs() < EPS);
        assert!((body.velocity.y - 0.35).abs() < EPS);
    }

    #[test]
    fn body_above_snap_distance_is_left_alone() {
        let resolver = GroundContactResolver::default();
        let v = Vec3::new(0.0, -3.0, 0.0);
        let mut body = body_at(0.05, v);

        let outcome = resolver.resolve(&mut body, &FlatFloor::at(0.0));
        assert_eq!(outcome, ContactOutcome::Skipped(SkipReason::Airborne));
        assert_eq!(body.velocity, v);

        // Within snap distance but not touching: velocity handled, no correction.
        let mut near = body_at(0.02, v);
        let outcome = resolver.resolve(&mut near, &FlatFloor::at(0.0));
        assert!(outcome.is_contact());
        assert!((bottom_of(&near) - 0.02).abs() < EPS);
        assert!((near.velocity.y - 3.0 * 0.35).abs() < EPS);
    }

    #[test]
    fn skips_without_room_hit_or_when_disabled() {
        let resolver = GroundContactResolver::default();
        let v = Vec3::new(0.0, -1.0, 0.0);

        let mut body = body_at(0.0, v);
        let loading = FlatFloor {
            status: SurfaceStatus::Initializing,
            ..FlatFloor::at(0.0)
        };
        assert_eq!(
            resolver.resolve(&mut body, &loading),
            ContactOutcome::Skipped(SkipReason::NoRoom)
        );

        // Floor far below the ray range.
        assert_eq!(
            resolver.resolve(&mut body, &FlatFloor::at(-10.0)),
            ContactOutcome::Skipped(SkipReason::NoHit)
        );

        let disabled = GroundContactResolver::new(ContactConfig {
            enabled: false,
            ..ContactConfig::default()
        });
        assert_eq!(
            disabled.resolve(&mut body, &FlatFloor::at(0.0)),
            ContactOutcome::Skipped(SkipReason::Disabled)
        );

        body.kinematic = true;
        assert_eq!(
            resolver.resolve(&mut body, &FlatFloor::at(0.0)),
            ContactOutcome::Skipped(SkipReason::Kinematic)
        );
        assert_eq!(body.velocity, v);
    }

    #[test]
    fn per_body_switch_disables_only_that_body() {
        let resolver = GroundContactResolver::default();
        let v = Vec3::new(0.0, -1.0, 0.0);
        let mut off = body_at(-0.02, v);
        off.ground_physics = false;
        let mut on = body_at(-0.02, v);

        assert_eq!(
            resolver.resolve(&mut off, &FlatFloor::at(0.0)),
            ContactOutcome::Skipped(SkipReason::Disabled)
        );
        assert_eq!(off.velocity, v);
        assert!((bottom_of(&off) + 0.02).abs() < EPS);

        assert!(resolver.resolve(&mut on, &FlatFloor::at(0.0)).is_contact());
    }

    #[test]
    fn resting_contact_is_stable() {
        let resolver = GroundContactResolver::default();
        let mut body = body_at(-0.004, Vec3::zeros());
        let floor = FlatFloor::at(0.0);

        resolver.resolve(&mut body, &floor);
        let settled = body.center;
        for _ in 0..100 {
            resolver.resolve(&mut body, &floor);
        }
        assert_eq!(body.center, settled);
        assert_eq!(body.velocity, Vec3::zeros());
    }

    /// Slope tilted 45 degrees around Z with its surface through the origin.
    struct Slope;

    impl SurfaceQuery for Slope {
        fn status(&self) -> SurfaceStatus {
            SurfaceStatus::Tracking
        }

        fn raycast(
            &self,
            ray: &Ray,
            _max_distance: f32,
            _filter: SurfaceFilter,
        ) -> Option<SurfaceHit> {
            // Plane y = x below the ray origin (straight down ray).
            Some(SurfaceHit {
                point: Vec3::new(ray.origin.x, ray.origin.x, ray.origin.z),
                normal: Vec3::new(-1.0, 1.0, 0.0).normalize(),
            })
        }
    }

    #[test]
    fn slope_reflects_along_surface_normal() {
        let resolver = GroundContactResolver::default();
        let mut body = body_at(0.0, Vec3::new(0.0, -2.0, 0.0));

        resolver.resolve(&mut body, &Slope);

        let n = Vec3::new(-1.0, 1.0, 0.0).normalize();
        let v_n = body.velocity.dot(&n);
        // Approach speed along the normal was 2 / sqrt(2).
        assert!((v_n - std::f32::consts::SQRT_2 * 0.35).abs() < 1.0e-4);
        let tangent = body.velocity - n * v_n;
        let expected_tangent = (Vec3::new(0.0, -2.0, 0.0) + n * std::f32::consts::SQRT_2) * 0.92;
        assert!((tangent - expected_tangent).norm() < 1.0e-4);
    }

    #[test]
    fn resolve_all_visits_existing_bodies_only() {
        let mut authority = FakeAuthority::local();
        authority
            .bodies
            .insert(1, body_at(0.0, Vec3::new(0.0, -1.0, 0.0)));
        authority
            .bodies
            .insert(2, body_at(1.0, Vec3::new(0.0, -1.0, 0.0)));

        let resolver = GroundContactResolver::default();
        let contacts = resolver.resolve_all([1, 2, 3], &mut authority, &FlatFloor::at(0.0));

        assert_eq!(contacts, 1);
        assert!((authority.bodies[&1].velocity.y - 0.35).abs() < EPS);
        assert_eq!(authority.bodies[&2].velocity.y, -1.0);
    }
}
