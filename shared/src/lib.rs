pub mod authority;
pub mod bitmask_flags;
pub mod config;
pub mod constants;
pub mod contact;
pub mod gesture;
pub mod hand;
pub mod pipeline;
pub mod room;
pub mod spawner;
pub mod surface;
pub mod types;

// Re-export Rapier so the driver can build room definitions without its own dependency.
pub use rapier3d;

pub use authority::{AuthorityService, Origin, Ownership, PhysicsBody, SpawnedObject};
pub use bitmask_flags::{SurfaceFilter, SurfaceLabel};
pub use config::{ContactConfig, GestureConfig, RainConfig, SpawnConfig};
pub use contact::{ContactOutcome, GroundContactResolver, SkipReason};
pub use gesture::{GestureState, GestureTrigger, ThumbsUpClassifier, TriggerState};
pub use hand::{HandJoint, HandPose, HandProvider, Handedness};
pub use pipeline::{PipelineStatus, RainPipeline};
pub use room::{RoomBuildError, RoomGeometry, RoomSurfaceDef, SurfaceShapeDef};
pub use spawner::{FrameOutcome, SpawnManager, SpawnOutcome, SpawnerStatus};
pub use surface::{SurfaceQuery, SurfaceStatus};
pub use types::{Aabb, Pose, Quat, Ray, SurfaceHit, Vec3};
