//! Scripted right hand for the headless driver.
//!
//! Replays a fixed timeline of poses: open hand, thumbs-up, and tracking loss.

use shared::{HandJoint, HandPose, Handedness, Pose, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    Open,
    ThumbsUp,
    /// Tracking lost; the runtime reports the hand as disconnected.
    Lost,
}

/// `(start_s, gesture)` pairs, sorted by start time. Each gesture lasts until the next.
pub type Timeline = Vec<(f32, Gesture)>;

/// Wrist position for the scripted hand.
const WRIST: [f32; 3] = [0.0, 1.1, 0.35];

/// Thumbs-up repeated faster than the cooldown, a tracking drop mid-gesture, then enough
/// raises to overflow the live queue.
pub fn default_timeline() -> Timeline {
    let mut timeline = vec![
        (0.0, Gesture::Open),
        (0.5, Gesture::ThumbsUp),
        (0.8, Gesture::Open),
        (1.0, Gesture::ThumbsUp),
        (1.4, Gesture::Lost),
        (1.6, Gesture::ThumbsUp),
        (2.0, Gesture::Open),
    ];
    let mut t = 3.0;
    while t < 28.0 {
        timeline.push((t, Gesture::ThumbsUp));
        timeline.push((t + 1.0, Gesture::Open));
        t += 2.2;
    }
    timeline
}

#[derive(Clone, Debug)]
pub struct ScriptedHand {
    timeline: Timeline,
}

impl ScriptedHand {
    pub fn new(mut timeline: Timeline) -> Self {
        timeline.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { timeline }
    }

    pub fn gesture_at(&self, t: f32) -> Gesture {
        self.timeline
            .iter()
            .take_while(|(start, _)| *start <= t)
            .last()
            .map_or(Gesture::Lost, |(_, g)| *g)
    }

    /// Hand snapshot at time `t`. The wrist sways slowly so spawns do not stack exactly.
    pub fn pose_at(&self, t: f32) -> HandPose {
        let gesture = self.gesture_at(t);
        if gesture == Gesture::Lost {
            return HandPose::disconnected(Handedness::Right);
        }

        let wrist = Vec3::new(
            WRIST[0] + 0.15 * (t * 0.4).sin(),
            WRIST[1],
            WRIST[2] + 0.1 * (t * 0.3).cos(),
        );
        let at = |dx: f32, dy: f32, dz: f32| Pose::from_position(wrist + Vec3::new(dx, dy, dz));

        let hand = HandPose::new(Handedness::Right)
            .with_joint(HandJoint::WristRoot, at(0.0, 0.0, 0.0))
            .with_joint(HandJoint::Thumb2, at(0.02, 0.04, 0.0));

        match gesture {
            Gesture::ThumbsUp => hand
                .with_joint(HandJoint::ThumbTip, at(0.02, 0.09, 0.0))
                .with_joint(HandJoint::IndexTip, at(0.03, 0.02, 0.05))
                .with_joint(HandJoint::MiddleTip, at(0.01, 0.01, 0.05))
                .with_joint(HandJoint::RingTip, at(-0.01, 0.0, 0.05))
                .with_joint(HandJoint::PinkyTip, at(-0.03, -0.01, 0.04)),
            _ => hand
                .with_joint(HandJoint::ThumbTip, at(0.08, 0.05, 0.0))
                .with_joint(HandJoint::IndexTip, at(0.0, 0.02, 0.18))
                .with_joint(HandJoint::MiddleTip, at(0.0, 0.0, 0.19))
                .with_joint(HandJoint::RingTip, at(0.0, -0.01, 0.18))
                .with_joint(HandJoint::PinkyTip, at(0.0, -0.02, 0.15)),
        }
    }
}
