//! Object creation, replication authority and physics body seams.
//!
//! Spawned objects live in an external world (engine scene and/or a networked session).
//! The core never owns them: it keeps opaque handles and goes through
//! [`AuthorityService`] to create, destroy and reach their [`PhysicsBody`].

use std::fmt;

use crate::types::{Aabb, Quat, Vec3};

/// Rigid body state the contact resolver reads and writes.
pub trait PhysicsBody {
    fn linear_velocity(&self) -> Vec3;
    fn set_linear_velocity(&mut self, velocity: Vec3);
    fn set_angular_velocity(&mut self, velocity: Vec3);
    fn is_kinematic(&self) -> bool;
    /// World-space bounds of the body's collider.
    fn bounds(&self) -> Aabb;
    /// Move the body by `delta` without touching its velocity.
    fn translate(&mut self, delta: Vec3);

    /// Per-object switch for scanned-room ground contact.
    fn ground_physics_enabled(&self) -> bool {
        true
    }

    /// Stop all motion.
    fn reset_velocity(&mut self) {
        self.set_linear_velocity(Vec3::zeros());
        self.set_angular_velocity(Vec3::zeros());
    }
}

/// Object creation + ownership, for both shared sessions and local-only play.
///
/// Replicated calls are only made while [`AuthorityService::is_shared_session`] holds.
/// Authority over a replicated object is exclusive to one process at a time and may move,
/// so it is queried when needed rather than cached.
pub trait AuthorityService {
    type Handle: Copy + Eq + fmt::Debug;
    type Body: PhysicsBody;

    fn is_running(&self) -> bool;
    fn is_single_participant(&self) -> bool;

    /// Create a replicated object visible to every participant.
    ///
    /// `on_spawned` runs once creation has completed, with the new body.
    /// `None` means the request failed.
    fn spawn_replicated(
        &mut self,
        position: Vec3,
        rotation: Quat,
        on_spawned: &mut dyn FnMut(&mut Self::Body),
    ) -> Option<Self::Handle>;

    /// Request destruction of a replicated object. Only valid with authority.
    fn despawn(&mut self, handle: Self::Handle);

    fn has_authority(&self, handle: Self::Handle) -> bool;

    /// Create an object that exists only in this process.
    fn instantiate_local(&mut self, position: Vec3, rotation: Quat) -> Option<Self::Handle>;

    fn destroy_local(&mut self, handle: Self::Handle);

    /// False once the object has been destroyed by anyone.
    fn exists(&self, handle: Self::Handle) -> bool;

    fn body_mut(&mut self, handle: Self::Handle) -> Option<&mut Self::Body>;

    /// Every spawned object alive in this process's scene, whoever spawned it or holds
    /// authority over it. Not limited to the spawn queue.
    fn spawned_handles(&self) -> Vec<Self::Handle>;

    /// Running with more than one participant: spawns must be replicated.
    fn is_shared_session(&self) -> bool {
        self.is_running() && !self.is_single_participant()
    }
}

/// How an object was created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Replicated,
    LocalOnly,
}

/// Who may destroy an object, as of now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ownership {
    /// Replicated, this process holds authority.
    OwnedHere,
    /// Replicated, another participant holds authority.
    OwnedElsewhere,
    LocalOnly,
}

/// One entry of the live-object queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnedObject<H> {
    pub handle: H,
    pub origin: Origin,
}

impl<H: Copy + Eq + fmt::Debug> SpawnedObject<H> {
    pub fn ownership<A: AuthorityService<Handle = H>>(&self, authority: &A) -> Ownership {
        match self.origin {
            Origin::LocalOnly => Ownership::LocalOnly,
            Origin::Replicated if authority.has_authority(self.handle) => Ownership::OwnedHere,
            Origin::Replicated => Ownership::OwnedElsewhere,
        }
    }
}
