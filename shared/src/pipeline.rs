//! Frame and fixed-step entry points over injected services.
//!
//! The owner calls [`RainPipeline::tick`] once per rendered frame and
//! [`RainPipeline::fixed_tick`] once per physics step, after the rigid-body solver.

use log::warn;
use rand::Rng;

use crate::{
    authority::AuthorityService,
    config::RainConfig,
    contact::GroundContactResolver,
    hand::HandProvider,
    spawner::{FrameOutcome, SpawnManager, SpawnerStatus},
    surface::{SurfaceQuery, SurfaceStatus},
};

/// Combined status for debug panels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineStatus {
    pub elapsed_s: f64,
    pub spawner: SpawnerStatus,
    pub surface: SurfaceStatus,
    pub shared_session: bool,
}

pub struct RainPipeline<Hp, S, A: AuthorityService, R> {
    config: RainConfig,
    hand: Option<Hp>,
    surface: S,
    authority: A,
    rng: R,
    spawner: SpawnManager<A::Handle>,
    resolver: GroundContactResolver,
    elapsed_s: f64,
}

impl<Hp, S, A, R> RainPipeline<Hp, S, A, R>
where
    Hp: HandProvider,
    S: SurfaceQuery,
    A: AuthorityService,
    R: Rng,
{
    /// Out-of-range configuration is clamped (and reported) rather than rejected.
    pub fn new(config: RainConfig, hand: Option<Hp>, surface: S, authority: A, rng: R) -> Self {
        if let Err(reason) = config.validate() {
            warn!("invalid configuration, clamping: {reason}");
        }
        let config = config.sanitized();

        Self {
            config,
            hand,
            surface,
            authority,
            rng,
            spawner: SpawnManager::new(config.spawn, config.gesture),
            resolver: GroundContactResolver::new(config.contact),
            elapsed_s: 0.0,
        }
    }

    /// Advance the frame clock by `dt` seconds and run the spawn path.
    pub fn tick(&mut self, dt: f32) -> FrameOutcome<A::Handle> {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed_s += f64::from(dt);
        }
        self.spawner.update(
            self.elapsed_s,
            self.hand.as_ref(),
            &self.surface,
            &mut self.authority,
            &mut self.rng,
        )
    }

    /// Resolve ground contact for every spawned object in the scene, including objects
    /// evicted from the queue or spawned by other participants. Returns how many were in
    /// contact.
    pub fn fixed_tick(&mut self, _dt: f32) -> usize {
        let handles = self.authority.spawned_handles();
        self.resolver
            .resolve_all(handles, &mut self.authority, &self.surface)
    }

    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            elapsed_s: self.elapsed_s,
            spawner: self.spawner.status(self.elapsed_s),
            surface: self.surface.status(),
            shared_session: self.authority.is_shared_session(),
        }
    }

    #[inline]
    pub fn config(&self) -> &RainConfig {
        &self.config
    }

    #[inline]
    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    #[inline]
    pub fn spawner(&self) -> &SpawnManager<A::Handle> {
        &self.spawner
    }

    /// Replace the hand input (e.g. a new tracking snapshot).
    pub fn set_hand(&mut self, hand: Option<Hp>) {
        self.hand = hand;
    }

    #[inline]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[inline]
    pub fn authority(&self) -> &A {
        &self.authority
    }

    pub fn authority_mut(&mut self) -> &mut A {
        &mut self.authority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        authority::{PhysicsBody, tests::FakeAuthority},
        config::{ContactConfig, SpawnConfig},
        gesture::tests::{open_hand, thumbs_up_hand},
        hand::HandPose,
        spawner::SpawnOutcome,
        surface::tests::FlatFloor,
        types::Vec3,
    };
    use rand::{SeedableRng, rngs::StdRng};

    type TestPipeline = RainPipeline<HandPose, FlatFloor, FakeAuthority, StdRng>;

    fn pipeline(config: RainConfig) -> TestPipeline {
        RainPipeline::new(
            config,
            Some(open_hand()),
            FlatFloor::at(0.0),
            FakeAuthority::local(),
            StdRng::seed_from_u64(1),
        )
    }

    #[test]
    fn gesture_spawns_above_floor_then_bounces() {
        let mut p = pipeline(RainConfig::default());
        assert!(matches!(p.tick(0.016), FrameOutcome::NoTrigger));

        p.set_hand(Some(thumbs_up_hand()));
        let FrameOutcome::Triggered(SpawnOutcome::Spawned {
            handle, position, ..
        }) = p.tick(0.016)
        else {
            panic!("thumbs-up edge should spawn");
        };
        assert!((position.y - 2.3).abs() < 1.0e-5);

        // Held gesture: no second spawn.
        assert!(matches!(p.tick(0.016), FrameOutcome::NoTrigger));
        assert_eq!(p.spawner().live_count(), 1);

        // Drop the body onto the floor and step contact.
        let body = p.authority_mut().bodies.get_mut(&handle).expect("spawned body");
        body.center = Vec3::new(position.x, body.half_extent - 0.01, position.z);
        body.velocity = Vec3::new(0.0, -3.0, 0.0);

        assert_eq!(p.fixed_tick(1.0 / 72.0), 1);
        let body = &p.authority().bodies[&handle];
        assert!((body.velocity.y - 3.0 * 0.35).abs() < 1.0e-5);
        assert!(body.bounds().mins.y > 0.0);
    }

    fn spawn_on_next_edge(p: &mut TestPipeline) -> u32 {
        p.set_hand(Some(open_hand()));
        p.tick(0.1);
        p.set_hand(Some(thumbs_up_hand()));
        let FrameOutcome::Triggered(SpawnOutcome::Spawned { handle, .. }) = p.tick(0.1) else {
            panic!("thumbs-up edge should spawn");
        };
        handle
    }

    #[test]
    fn evicted_foreign_object_still_lands() {
        let config = RainConfig {
            spawn: SpawnConfig {
                max_objects: 1,
                cooldown_s: 0.0,
                ..SpawnConfig::default()
            },
            ..RainConfig::default()
        };
        let mut p = RainPipeline::new(
            config,
            Some(open_hand()),
            FlatFloor::at(0.0),
            FakeAuthority::shared(),
            StdRng::seed_from_u64(3),
        );

        let handed_off = spawn_on_next_edge(&mut p);
        p.authority_mut().foreign.push(handed_off);
        let mine = spawn_on_next_edge(&mut p);

        // Evicted from the queue, but still in the scene.
        assert_eq!(p.spawner().live_count(), 1);
        assert!(p.authority().bodies.contains_key(&handed_off));
        assert!(p.authority().despawned().is_empty());

        for handle in [handed_off, mine] {
            let body = p.authority_mut().bodies.get_mut(&handle).expect("body");
            body.center.y = body.half_extent - 0.01;
            body.velocity = Vec3::new(0.0, -2.0, 0.0);
        }

        assert_eq!(p.fixed_tick(1.0 / 72.0), 2);
        let body = &p.authority().bodies[&handed_off];
        assert!(body.velocity.y > 0.0);
        assert!(body.bounds().mins.y >= -1.0e-5);
    }

    #[test]
    fn status_reflects_hand_surface_and_queue() {
        let mut p = pipeline(RainConfig::default());
        p.set_hand(None);
        p.tick(0.1);

        let status = p.status();
        assert!(!status.spawner.hand_tracked);
        assert_eq!(status.surface, SurfaceStatus::Tracking);
        assert!(!status.shared_session);
        assert_eq!(status.spawner.live_count, 0);
        assert!((status.elapsed_s - 0.1).abs() < 1.0e-6);
    }

    #[test]
    fn invalid_config_is_clamped() {
        let config = RainConfig {
            contact: ContactConfig {
                bounce: 2.0,
                ..ContactConfig::default()
            },
            ..RainConfig::default()
        };
        let p = pipeline(config);
        assert_eq!(p.config().contact.bounce, 1.0);
    }

    #[test]
    fn bad_frame_time_does_not_move_clock() {
        let mut p = pipeline(RainConfig::default());
        p.tick(f32::NAN);
        p.tick(-1.0);
        assert_eq!(p.elapsed_s(), 0.0);
    }
}
