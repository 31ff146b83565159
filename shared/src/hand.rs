//! Hand tracking model.
//!
//! The tracking runtime is an external collaborator. The core only sees it through
//! [`HandProvider`]; [`HandPose`] is a plain per-frame snapshot implementing it, used by
//! drivers that copy tracking data once per frame and by tests.

use crate::types::Pose;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

/// Joints the thumbs-up heuristic reads.
///
/// The root (wrist) pose is exposed separately through [`HandProvider::root_pose`]; `WristRoot`
/// exists so snapshots can store it alongside the other joints.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HandJoint {
    WristRoot = 0,
    Thumb2 = 1,
    ThumbTip = 2,
    IndexTip = 3,
    MiddleTip = 4,
    RingTip = 5,
    PinkyTip = 6,
}

impl HandJoint {
    pub const COUNT: usize = 7;

    pub const ALL: [HandJoint; Self::COUNT] = [
        HandJoint::WristRoot,
        HandJoint::Thumb2,
        HandJoint::ThumbTip,
        HandJoint::IndexTip,
        HandJoint::MiddleTip,
        HandJoint::RingTip,
        HandJoint::PinkyTip,
    ];

    /// The four non-thumb fingertips that must be curled for a thumbs-up.
    pub const CURLED_TIPS: [HandJoint; 4] = [
        HandJoint::IndexTip,
        HandJoint::MiddleTip,
        HandJoint::RingTip,
        HandJoint::PinkyTip,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Read access to one tracked hand for the current frame.
///
/// Absence of a usable hand is a normal state: every accessor that can fail returns
/// `Option` / `false` instead of an error.
pub trait HandProvider {
    fn handedness(&self) -> Handedness;
    fn is_connected(&self) -> bool;
    fn is_tracked_data_valid(&self) -> bool;
    /// Uniform hand scale reported by the runtime (1.0 = reference hand).
    fn scale(&self) -> f32;
    fn joint_pose(&self, joint: HandJoint) -> Option<Pose>;
    fn root_pose(&self) -> Option<Pose>;

    /// Connected, with valid data, and of the requested handedness.
    fn is_usable_as(&self, handedness: Handedness) -> bool {
        self.handedness() == handedness && self.is_connected() && self.is_tracked_data_valid()
    }
}

impl<T: HandProvider + ?Sized> HandProvider for &T {
    fn handedness(&self) -> Handedness {
        (**self).handedness()
    }
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
    fn is_tracked_data_valid(&self) -> bool {
        (**self).is_tracked_data_valid()
    }
    fn scale(&self) -> f32 {
        (**self).scale()
    }
    fn joint_pose(&self, joint: HandJoint) -> Option<Pose> {
        (**self).joint_pose(joint)
    }
    fn root_pose(&self) -> Option<Pose> {
        (**self).root_pose()
    }
}

/// Per-frame snapshot of a tracked hand.
#[derive(Clone, Debug, PartialEq)]
pub struct HandPose {
    pub handedness: Handedness,
    pub connected: bool,
    pub tracked_data_valid: bool,
    pub scale: f32,
    joints: [Option<Pose>; HandJoint::COUNT],
}

impl HandPose {
    /// A connected, valid hand of scale 1 with no joints yet.
    pub fn new(handedness: Handedness) -> Self {
        Self {
            handedness,
            connected: true,
            tracked_data_valid: true,
            scale: 1.0,
            joints: [None; HandJoint::COUNT],
        }
    }

    /// A hand the runtime reports as not connected.
    pub fn disconnected(handedness: Handedness) -> Self {
        Self {
            connected: false,
            tracked_data_valid: false,
            ..Self::new(handedness)
        }
    }

    pub fn with_joint(mut self, joint: HandJoint, pose: Pose) -> Self {
        self.set_joint(joint, Some(pose));
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn set_joint(&mut self, joint: HandJoint, pose: Option<Pose>) {
        self.joints[joint.index()] = pose;
    }
}

impl HandProvider for HandPose {
    fn handedness(&self) -> Handedness {
        self.handedness
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn is_tracked_data_valid(&self) -> bool {
        self.tracked_data_valid
    }

    fn scale(&self) -> f32 {
        self.scale
    }

    fn joint_pose(&self, joint: HandJoint) -> Option<Pose> {
        self.joints[joint.index()]
    }

    fn root_pose(&self) -> Option<Pose> {
        self.joints[HandJoint::WristRoot.index()]
    }
}
