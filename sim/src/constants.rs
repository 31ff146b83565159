//! Driver clock constants.
//!
//! The frame path runs at the display rate; contact resolution runs on a fixed step fed by an
//! accumulator, with the frame dt clamped so a stall cannot trigger a catch-up spiral.

/// Simulated display refresh rate (Hz).
pub const FRAME_HZ: f32 = 90.0;

/// Fixed physics step (seconds).
pub const FIXED_DT_S: f32 = 1.0 / 72.0;

/// Max frame dt (seconds) fed into the accumulator.
pub const MAX_FRAME_DT_S: f32 = 0.25;

/// Max fixed steps run for a single frame. Leftover time is dropped.
pub const MAX_FIXED_STEPS_PER_FRAME: u32 = 8;

/// Gravity along world Y (m/s^2).
pub const GRAVITY_Y: f32 = -9.81;

/// Half extent of a spawned cube (meters).
pub const CUBE_HALF_EXTENT: f32 = 0.05;

/// Total simulated time (seconds).
pub const SIM_DURATION_S: f32 = 30.0;

/// Seed for the rain disk sampler.
pub const RNG_SEED: u64 = 0x5EED;
