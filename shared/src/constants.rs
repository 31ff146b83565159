/*!
Default tuning constants for the gesture, spawn and ground contact stages.

These are the values `RainConfig::default()` is built from. Keeping them together makes
tuning easier; per-instance overrides go through the config structs.

Notes
- Distances are in meters, time in seconds, speeds in meters per second.
*/

// --- Thumbs-up detection ---

/// Minimum `dot(thumb_dir, up)` for the thumb to count as pointing up.
pub const THUMB_UP_DOT: f32 = 0.7;

/// Fingertip-to-wrist distance under which a finger counts as curled, for a hand of scale 1.
pub const FINGER_TIP_TO_ROOT_THRESHOLD: f32 = 0.11;

/// Lower clamp applied to the hand scale before scaling the curl threshold.
pub const MIN_CURL_HAND_SCALE: f32 = 0.5;

/// Absolute floor of the scaled curl threshold.
pub const MIN_CURL_THRESHOLD: f32 = 0.01;

// --- Spawn capacity ---

/// Seconds between two accepted thumbs-up triggers.
pub const SPAWN_COOLDOWN_S: f32 = 2.0;

/// Maximum number of live spawned objects kept by one spawner.
pub const MAX_LIVE_OBJECTS: usize = 10;

/// Height above the hand (or above the floor) the rain column is centered on.
pub const TARGET_HEIGHT_OFFSET: f32 = 0.3;

/// Extra height above the target objects are dropped from.
pub const RAIN_HEIGHT: f32 = 2.0;

/// Radius of the horizontal disk spawn positions are sampled from.
pub const RAIN_RADIUS: f32 = 0.25;

/// Height above the target the floor probe starts at.
/// Must stay above the hand so the probe does not start under a table top.
pub const FLOOR_RAY_START_HEIGHT: f32 = 2.5;

/// Length of the floor probe.
pub const FLOOR_RAY_DISTANCE: f32 = 6.0;

/// Lower bound for both floor probe settings.
pub const MIN_FLOOR_RAY_SETTING: f32 = 0.5;

// --- Ground contact ---

/// Offset above the body's bottom the ground ray starts at.
pub const GROUND_RAY_START_OFFSET: f32 = 0.2;

/// Length of the ground ray.
pub const GROUND_RAY_DISTANCE: f32 = 2.5;

/// Bodies whose bottom is further than this above the floor are left to the solver.
pub const GROUND_SNAP_DISTANCE: f32 = 0.03;

/// Extra push-out applied on top of the measured penetration.
/// Too large creates visible hops; too small leaves the body touching and re-correcting.
pub const PENETRATION_EPSILON: f32 = 0.002;

/// Fraction of the normal speed kept after a bounce, in `[0, 1]`.
pub const BOUNCE: f32 = 0.35;

/// Per-step multiplier on the tangential velocity while in contact, in `[0, 1]`.
pub const TANGENT_DAMPING: f32 = 0.92;

/// Normal impact speeds below this are zeroed instead of bounced.
pub const MIN_BOUNCE_SPEED: f32 = 0.2;

/// Lower bound for the ground ray start offset.
pub const MIN_GROUND_RAY_START_OFFSET: f32 = 0.05;

/// Lower bound for the ground ray length.
pub const MIN_GROUND_RAY_DISTANCE: f32 = 0.1;

/// Squared length under which a direction or normal is treated as degenerate.
pub const DIR_EPS_SQ: f32 = 1.0e-12;
