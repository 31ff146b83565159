//! In-process object world standing in for the engine scene and the network session.
//!
//! Bodies are axis-aligned cubes under gravity. There is no body-body collision; ground
//! contact is left entirely to the contact resolver.

use std::collections::BTreeMap;

use log::{debug, warn};
use nalgebra::Point3;
use shared::{Aabb, AuthorityService, PhysicsBody, Quat, Vec3};

use crate::constants::GRAVITY_Y;

pub type ObjectId = u64;
pub type ParticipantId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionMode {
    /// No networking running.
    Offline,
    /// Session running with only this participant.
    Solo,
    /// Session running with `participants` participants, including this one.
    Shared { participants: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimBody {
    pub center: Vec3,
    pub half_extent: f32,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub kinematic: bool,
}

impl SimBody {
    pub fn cube(center: Vec3, half_extent: f32) -> Self {
        Self {
            center,
            half_extent,
            velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            kinematic: false,
        }
    }

    /// Semi-implicit Euler under gravity.
    pub fn integrate(&mut self, dt: f32) {
        if self.kinematic {
            return;
        }
        self.velocity.y += GRAVITY_Y * dt;
        self.center += self.velocity * dt;
    }
}

impl PhysicsBody for SimBody {
    fn linear_velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.angular_velocity = velocity;
    }

    fn is_kinematic(&self) -> bool {
        self.kinematic
    }

    fn bounds(&self) -> Aabb {
        let h = Vec3::repeat(self.half_extent);
        Aabb::new(Point3::from(self.center - h), Point3::from(self.center + h))
    }

    fn translate(&mut self, delta: Vec3) {
        self.center += delta;
    }
}

#[derive(Debug)]
struct SimObject {
    body: SimBody,
    replicated: bool,
    owner: ParticipantId,
}

#[derive(Debug)]
pub struct SimWorld {
    mode: SessionMode,
    local: ParticipantId,
    cube_half_extent: f32,
    objects: BTreeMap<ObjectId, SimObject>,
    next_id: ObjectId,
}

impl SimWorld {
    pub fn new(mode: SessionMode, cube_half_extent: f32) -> Self {
        Self {
            mode,
            local: 0,
            cube_half_extent,
            objects: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn body(&self, id: ObjectId) -> Option<&SimBody> {
        self.objects.get(&id).map(|o| &o.body)
    }

    /// Integrate every body by `dt`.
    pub fn step(&mut self, dt: f32) {
        for object in self.objects.values_mut() {
            object.body.integrate(dt);
        }
    }

    /// Hand a replicated object to another participant.
    pub fn transfer_authority(&mut self, id: ObjectId, to: ParticipantId) -> bool {
        match self.objects.get_mut(&id) {
            Some(object) if object.replicated => {
                debug!("{id} authority {} -> {to}", object.owner);
                object.owner = to;
                true
            }
            _ => false,
        }
    }

    /// Another participant destroyed the object.
    pub fn remote_destroy(&mut self, id: ObjectId) {
        if self.objects.remove(&id).is_some() {
            debug!("{id} destroyed remotely");
        }
    }

    fn insert(&mut self, position: Vec3, replicated: bool) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        self.objects.insert(
            id,
            SimObject {
                body: SimBody::cube(position, self.cube_half_extent),
                replicated,
                owner: self.local,
            },
        );
        id
    }
}

impl AuthorityService for SimWorld {
    type Handle = ObjectId;
    type Body = SimBody;

    fn is_running(&self) -> bool {
        self.mode != SessionMode::Offline
    }

    fn is_single_participant(&self) -> bool {
        match self.mode {
            SessionMode::Offline | SessionMode::Solo => true,
            SessionMode::Shared { participants } => participants <= 1,
        }
    }

    fn spawn_replicated(
        &mut self,
        position: Vec3,
        _rotation: Quat,
        on_spawned: &mut dyn FnMut(&mut SimBody),
    ) -> Option<ObjectId> {
        if !self.is_running() {
            warn!("replicated spawn requested without a running session");
            return None;
        }
        let id = self.insert(position, true);
        if let Some(object) = self.objects.get_mut(&id) {
            on_spawned(&mut object.body);
        }
        Some(id)
    }

    fn despawn(&mut self, id: ObjectId) {
        if !self.has_authority(id) {
            warn!("despawn of {id} rejected: no authority");
            return;
        }
        self.objects.remove(&id);
    }

    fn has_authority(&self, id: ObjectId) -> bool {
        self.objects.get(&id).is_some_and(|o| o.owner == self.local)
    }

    fn instantiate_local(&mut self, position: Vec3, _rotation: Quat) -> Option<ObjectId> {
        Some(self.insert(position, false))
    }

    fn destroy_local(&mut self, id: ObjectId) {
        self.objects.remove(&id);
    }

    fn exists(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    fn body_mut(&mut self, id: ObjectId) -> Option<&mut SimBody> {
        self.objects.get_mut(&id).map(|o| &mut o.body)
    }

    fn spawned_handles(&self) -> Vec<ObjectId> {
        self.objects.keys().copied().collect()
    }
}
