//! Tunable parameters for the three pipeline stages.
//!
//! All values default to the constants in [`crate::constants`]. Configuration is supplied
//! once at construction; nothing here is read from disk.

use crate::{constants::*, hand::Handedness};

/// Thumbs-up classifier thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureConfig {
    /// Minimum `dot(thumb_dir, up)`.
    pub thumb_up_dot: f32,
    /// Curl distance for a hand of scale 1.
    pub finger_tip_to_root_threshold: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            thumb_up_dot: THUMB_UP_DOT,
            finger_tip_to_root_threshold: FINGER_TIP_TO_ROOT_THRESHOLD,
        }
    }
}

/// Spawn trigger, placement and capacity settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnConfig {
    /// Which hand triggers spawns.
    pub hand: Handedness,
    pub cooldown_s: f32,
    /// Live-queue capacity. Zero is allowed: each new object is evicted as soon as it
    /// is created.
    pub max_objects: usize,
    pub target_height_offset: f32,
    pub rain_height: f32,
    pub rain_radius: f32,
    /// Place the rain column relative to the detected floor instead of the hand.
    pub use_floor_height: bool,
    pub floor_ray_start_height: f32,
    pub floor_ray_distance: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            hand: Handedness::Right,
            cooldown_s: SPAWN_COOLDOWN_S,
            max_objects: MAX_LIVE_OBJECTS,
            target_height_offset: TARGET_HEIGHT_OFFSET,
            rain_height: RAIN_HEIGHT,
            rain_radius: RAIN_RADIUS,
            use_floor_height: true,
            floor_ray_start_height: FLOOR_RAY_START_HEIGHT,
            floor_ray_distance: FLOOR_RAY_DISTANCE,
        }
    }
}

/// Ground contact resolution settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactConfig {
    pub enabled: bool,
    pub ray_start_offset: f32,
    pub ray_distance: f32,
    pub snap_distance: f32,
    pub penetration_epsilon: f32,
    /// In `[0, 1]`.
    pub bounce: f32,
    /// In `[0, 1]`.
    pub tangent_damping: f32,
    pub min_bounce_speed: f32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ray_start_offset: GROUND_RAY_START_OFFSET,
            ray_distance: GROUND_RAY_DISTANCE,
            snap_distance: GROUND_SNAP_DISTANCE,
            penetration_epsilon: PENETRATION_EPSILON,
            bounce: BOUNCE,
            tangent_damping: TANGENT_DAMPING,
            min_bounce_speed: MIN_BOUNCE_SPEED,
        }
    }
}

/// Full pipeline configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RainConfig {
    pub gesture: GestureConfig,
    pub spawn: SpawnConfig,
    pub contact: ContactConfig,
}

impl RainConfig {
    /// Clamp every value into its supported range.
    ///
    /// Non-finite values fall back to the default for that field.
    pub fn sanitized(self) -> Self {
        let g = GestureConfig::default();
        let s = SpawnConfig::default();
        let c = ContactConfig::default();

        Self {
            gesture: GestureConfig {
                thumb_up_dot: finite_or(self.gesture.thumb_up_dot, g.thumb_up_dot)
                    .clamp(-1.0, 1.0),
                finger_tip_to_root_threshold: finite_or(
                    self.gesture.finger_tip_to_root_threshold,
                    g.finger_tip_to_root_threshold,
                )
                .max(MIN_CURL_THRESHOLD),
            },
            spawn: SpawnConfig {
                cooldown_s: finite_or(self.spawn.cooldown_s, s.cooldown_s).max(0.0),
                target_height_offset: finite_or(
                    self.spawn.target_height_offset,
                    s.target_height_offset,
                ),
                rain_height: finite_or(self.spawn.rain_height, s.rain_height),
                rain_radius: finite_or(self.spawn.rain_radius, s.rain_radius).max(0.0),
                floor_ray_start_height: finite_or(
                    self.spawn.floor_ray_start_height,
                    s.floor_ray_start_height,
                )
                .max(MIN_FLOOR_RAY_SETTING),
                floor_ray_distance: finite_or(self.spawn.floor_ray_distance, s.floor_ray_distance)
                    .max(MIN_FLOOR_RAY_SETTING),
                ..self.spawn
            },
            contact: ContactConfig {
                ray_start_offset: finite_or(self.contact.ray_start_offset, c.ray_start_offset)
                    .max(MIN_GROUND_RAY_START_OFFSET),
                ray_distance: finite_or(self.contact.ray_distance, c.ray_distance)
                    .max(MIN_GROUND_RAY_DISTANCE),
                snap_distance: finite_or(self.contact.snap_distance, c.snap_distance).max(0.0),
                penetration_epsilon: finite_or(
                    self.contact.penetration_epsilon,
                    c.penetration_epsilon,
                )
                .max(0.0),
                bounce: finite_or(self.contact.bounce, c.bounce).clamp(0.0, 1.0),
                tangent_damping: finite_or(self.contact.tangent_damping, c.tangent_damping)
                    .clamp(0.0, 1.0),
                min_bounce_speed: finite_or(self.contact.min_bounce_speed, c.min_bounce_speed)
                    .max(0.0),
                ..self.contact
            },
        }
    }

    /// Check the configuration without modifying it.
    ///
    /// Use at startup to report misconfiguration; [`RainConfig::sanitized`] is what the
    /// pipeline actually runs with.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(self.spawn.cooldown_s >= 0.0) {
            return Err("cooldown must be a non-negative number of seconds");
        }
        if !(0.0..=1.0).contains(&self.contact.bounce) {
            return Err("bounce must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.contact.tangent_damping) {
            return Err("tangent damping must be within [0, 1]");
        }
        if !(self.contact.ray_start_offset >= MIN_GROUND_RAY_START_OFFSET) {
            return Err("ground ray start offset is below the minimum");
        }
        if !(self.contact.ray_distance >= MIN_GROUND_RAY_DISTANCE) {
            return Err("ground ray distance is below the minimum");
        }
        if !(self.spawn.floor_ray_start_height >= MIN_FLOOR_RAY_SETTING)
            || !(self.spawn.floor_ray_distance >= MIN_FLOOR_RAY_SETTING)
        {
            return Err("floor ray settings are below the minimum");
        }
        if *self != self.sanitized() {
            return Err("configuration contains out-of-range or non-finite values");
        }
        Ok(())
    }
}

#[inline]
fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}
