//! Spawn capacity manager.
//!
//! Once per frame:
//! - Read the configured hand; if it is not usable, forget the gesture signal and stop.
//! - Classify the frame and feed the rising-edge trigger (with cooldown).
//! - On an accepted trigger, compute a spawn position above the hand (or above the floor
//!   under it), create the object through the authority service, and append its handle to
//!   the live queue.
//! - Keep the live queue at or under `max_objects`, evicting oldest first and never
//!   destroying replicated objects owned by another participant.
//!
//! Nothing on this path returns an error. Missing inputs skip the frame, failed creations
//! are no-ops, floor probe misses fall back to the hand-relative height.

use std::{collections::VecDeque, f32::consts::TAU};

use log::{debug, info};
use rand::Rng;

use crate::{
    authority::{AuthorityService, Origin, Ownership, PhysicsBody, SpawnedObject},
    bitmask_flags::SurfaceFilter,
    config::{GestureConfig, SpawnConfig},
    gesture::{GestureState, GestureTrigger, ThumbsUpClassifier, TriggerState},
    hand::HandProvider,
    surface::SurfaceQuery,
    types::{Quat, Ray, Vec3, up},
};

/// What a single frame did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameOutcome<H> {
    /// Configured hand absent, disconnected or invalid.
    HandLost,
    /// Hand tracked, no trigger this frame.
    NoTrigger,
    /// A trigger was accepted and a spawn attempted.
    Triggered(SpawnOutcome<H>),
}

/// Result of one spawn attempt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnOutcome<H> {
    Spawned {
        handle: H,
        origin: Origin,
        position: Vec3,
        /// Entries removed from the live queue to restore the capacity bound.
        evicted: usize,
    },
    /// The hand root pose was unavailable.
    NoRootPose,
    /// The authority service returned no object.
    CreationFailed,
}

/// Snapshot for status displays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnerStatus {
    pub hand_tracked: bool,
    pub gesture_active: bool,
    pub trigger: TriggerState,
    pub live_count: usize,
    pub max_objects: usize,
}

/// Compute where a triggered object appears.
///
/// `offset` is the horizontal (X, Z) offset sampled inside the rain disk.
pub fn spawn_position(
    config: &SpawnConfig,
    root_position: Vec3,
    offset: (f32, f32),
    surface: &impl SurfaceQuery,
) -> Vec3 {
    let target = root_position + up() * config.target_height_offset;
    let column = Vec3::new(target.x + offset.0, target.y, target.z + offset.1);

    let mut base_height = target.y;
    if config.use_floor_height {
        if let Some(floor_y) = floor_height(config, column, surface) {
            base_height = floor_y + config.target_height_offset;
        }
    }

    Vec3::new(column.x, base_height + config.rain_height, column.z)
}

/// Height of the floor (or scanned mesh) under `column`, if the room can be queried.
pub fn floor_height(
    config: &SpawnConfig,
    column: Vec3,
    surface: &impl SurfaceQuery,
) -> Option<f32> {
    if !surface.is_available() {
        return None;
    }
    let ray = Ray::down(column + up() * config.floor_ray_start_height);
    let hit = surface.raycast(
        &ray,
        config.floor_ray_distance,
        SurfaceFilter::floor_and_global_mesh(),
    );
    if hit.is_none() {
        debug!(
            "floor probe from {:?} missed within {}m",
            ray.origin, config.floor_ray_distance
        );
    }
    hit.map(|h| h.point.y)
}

/// Uniform sample inside a disk of `radius`, returned as (x, z).
pub fn sample_disk(rng: &mut impl Rng, radius: f32) -> (f32, f32) {
    if radius <= 0.0 {
        return (0.0, 0.0);
    }
    let r = radius * rng.gen_range(0.0f32..1.0).sqrt();
    let theta = rng.gen_range(0.0f32..TAU);
    (r * theta.cos(), r * theta.sin())
}

/// Owns the live-object queue and the gesture trigger for one hand.
#[derive(Debug)]
pub struct SpawnManager<H> {
    config: SpawnConfig,
    classifier: ThumbsUpClassifier,
    trigger: GestureTrigger,
    live: VecDeque<SpawnedObject<H>>,
    hand_tracked: bool,
}

impl<H: Copy + Eq + std::fmt::Debug> SpawnManager<H> {
    pub fn new(config: SpawnConfig, gesture: GestureConfig) -> Self {
        Self {
            config,
            classifier: ThumbsUpClassifier::new(gesture),
            trigger: GestureTrigger::new(config.cooldown_s),
            live: VecDeque::with_capacity(config.max_objects + 1),
            hand_tracked: false,
        }
    }

    #[inline]
    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    #[inline]
    pub fn gesture_state(&self) -> GestureState {
        self.trigger.state()
    }

    /// Live handles, oldest first.
    pub fn live(&self) -> impl ExactSizeIterator<Item = &SpawnedObject<H>> + '_ {
        self.live.iter()
    }

    #[inline]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn status(&self, now: f64) -> SpawnerStatus {
        SpawnerStatus {
            hand_tracked: self.hand_tracked,
            gesture_active: self.trigger.state().is_active_now,
            trigger: self.trigger.trigger_state(now),
            live_count: self.live.len(),
            max_objects: self.config.max_objects,
        }
    }

    /// Run one frame at time `now` (seconds).
    pub fn update<A>(
        &mut self,
        now: f64,
        hand: Option<&impl HandProvider>,
        surface: &impl SurfaceQuery,
        authority: &mut A,
        rng: &mut impl Rng,
    ) -> FrameOutcome<H>
    where
        A: AuthorityService<Handle = H>,
    {
        let Some(hand) = hand.filter(|h| h.is_usable_as(self.config.hand)) else {
            if self.hand_tracked {
                debug!("{:?} hand lost", self.config.hand);
            }
            self.hand_tracked = false;
            self.trigger.reset_signal();
            return FrameOutcome::HandLost;
        };
        self.hand_tracked = true;

        let active = self.classifier.is_active(hand);
        if !self.trigger.update(active, now) {
            return FrameOutcome::NoTrigger;
        }

        let offset = sample_disk(rng, self.config.rain_radius);
        FrameOutcome::Triggered(self.spawn(hand, offset, surface, authority))
    }

    /// Spawn one object for `hand`, then restore the capacity bound.
    pub fn spawn<A>(
        &mut self,
        hand: &impl HandProvider,
        offset: (f32, f32),
        surface: &impl SurfaceQuery,
        authority: &mut A,
    ) -> SpawnOutcome<H>
    where
        A: AuthorityService<Handle = H>,
    {
        let Some(root) = hand.root_pose() else {
            debug!("spawn skipped: no root pose");
            return SpawnOutcome::NoRootPose;
        };

        let position = spawn_position(&self.config, root.position, offset, surface);
        let rotation = Quat::identity();

        let (created, origin) = if authority.is_shared_session() {
            let handle =
                authority.spawn_replicated(position, rotation, &mut |body: &mut A::Body| {
                    body.reset_velocity();
                });
            (handle, Origin::Replicated)
        } else {
            let handle = authority.instantiate_local(position, rotation);
            if let Some(h) = handle {
                if let Some(body) = authority.body_mut(h) {
                    body.reset_velocity();
                }
            }
            (handle, Origin::LocalOnly)
        };

        let Some(handle) = created else {
            debug!("spawn at {position:?} failed: no object returned");
            return SpawnOutcome::CreationFailed;
        };

        // Drop entries destroyed behind our back before counting.
        self.prune(&*authority);
        self.live.push_back(SpawnedObject { handle, origin });
        let evicted = self.evict_overflow(authority);

        info!(
            "spawned {handle:?} ({origin:?}) at [{:.2}, {:.2}, {:.2}], live {}/{}",
            position.x,
            position.y,
            position.z,
            self.live.len(),
            self.config.max_objects
        );

        SpawnOutcome::Spawned {
            handle,
            origin,
            position,
            evicted,
        }
    }

    /// Pop oldest entries until the queue fits. Returns how many were removed.
    fn evict_overflow<A>(&mut self, authority: &mut A) -> usize
    where
        A: AuthorityService<Handle = H>,
    {
        let mut evicted = 0;
        while self.live.len() > self.config.max_objects {
            let Some(oldest) = self.live.pop_front() else {
                break;
            };
            evicted += 1;

            if !authority.exists(oldest.handle) {
                continue;
            }

            match oldest.ownership(authority) {
                Ownership::OwnedHere => {
                    info!("evicting {:?}: despawn", oldest.handle);
                    authority.despawn(oldest.handle);
                }
                Ownership::OwnedElsewhere => {
                    info!(
                        "evicting {:?}: owned by another participant, dropping reference",
                        oldest.handle
                    );
                }
                Ownership::LocalOnly => {
                    info!("evicting {:?}: destroy", oldest.handle);
                    authority.destroy_local(oldest.handle);
                }
            }
        }
        evicted
    }

    /// Drop queue entries whose object is gone.
    pub fn prune(&mut self, authority: &impl AuthorityService<Handle = H>) {
        self.live.retain(|o| authority.exists(o.handle));
    }
}
