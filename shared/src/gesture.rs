//! Thumbs-up detection and rising-edge triggering.
//!
//! [`ThumbsUpClassifier`] is stateless: it looks at one frame of hand data and answers
//! "is the hand doing a thumbs-up right now". Turning that continuous signal into discrete
//! spawn events (rising edge + cooldown) is [`GestureTrigger`]'s job.

use log::debug;

use crate::{
    config::GestureConfig,
    constants::{DIR_EPS_SQ, MIN_CURL_HAND_SCALE, MIN_CURL_THRESHOLD},
    hand::{HandJoint, HandProvider},
    types::up,
};

#[derive(Clone, Copy, Debug, Default)]
pub struct ThumbsUpClassifier {
    pub config: GestureConfig,
}

impl ThumbsUpClassifier {
    pub fn new(config: GestureConfig) -> Self {
        Self { config }
    }

    /// Curl threshold scaled to the hand size.
    #[inline]
    pub fn scaled_curl_threshold(&self, hand_scale: f32) -> f32 {
        let scale = if hand_scale.is_finite() {
            hand_scale.max(MIN_CURL_HAND_SCALE)
        } else {
            MIN_CURL_HAND_SCALE
        };
        (self.config.finger_tip_to_root_threshold * scale).max(MIN_CURL_THRESHOLD)
    }

    /// Thumb pointing up with the four other fingers curled into the palm.
    ///
    /// Any missing joint, a disconnected hand or invalid tracking data yields `false`.
    pub fn is_active(&self, hand: &impl HandProvider) -> bool {
        if !hand.is_connected() || !hand.is_tracked_data_valid() {
            return false;
        }

        let (Some(thumb_tip), Some(thumb_2)) = (
            hand.joint_pose(HandJoint::ThumbTip),
            hand.joint_pose(HandJoint::Thumb2),
        ) else {
            return false;
        };

        let thumb = thumb_tip.position - thumb_2.position;
        let len_sq = thumb.norm_squared();
        if len_sq <= DIR_EPS_SQ {
            return false;
        }
        let thumb_dir = thumb / len_sq.sqrt();
        if thumb_dir.dot(&up()) < self.config.thumb_up_dot {
            return false;
        }

        let Some(root) = hand.root_pose() else {
            return false;
        };

        let threshold = self.scaled_curl_threshold(hand.scale());
        HandJoint::CURLED_TIPS.into_iter().all(|tip| {
            hand.joint_pose(tip)
                .is_some_and(|pose| (pose.position - root.position).norm() < threshold)
        })
    }
}

/// Cooldown state of the trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerState {
    Idle,
    CooldownActive,
}

/// Edge-trigger bookkeeping for the gesture signal.
///
/// Time is seconds on the caller's frame clock.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureState {
    pub is_active_now: bool,
    pub was_active_previously: bool,
    /// `None` means no trigger has ever been accepted (treated as −∞).
    pub last_trigger: Option<f64>,
}

/// Rising-edge detector with a cooldown between accepted edges.
#[derive(Clone, Copy, Debug)]
pub struct GestureTrigger {
    pub cooldown_s: f64,
    state: GestureState,
}

impl GestureTrigger {
    pub fn new(cooldown_s: f32) -> Self {
        Self {
            cooldown_s: f64::from(cooldown_s.max(0.0)),
            state: GestureState::default(),
        }
    }

    #[inline]
    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn trigger_state(&self, now: f64) -> TriggerState {
        if self.cooldown_elapsed(now) {
            TriggerState::Idle
        } else {
            TriggerState::CooldownActive
        }
    }

    #[inline]
    fn cooldown_elapsed(&self, now: f64) -> bool {
        self.state
            .last_trigger
            .is_none_or(|last| now - last >= self.cooldown_s)
    }

    /// Feed this frame's signal. Returns true if a trigger was accepted.
    ///
    /// Holding the gesture never re-triggers; a rising edge inside the cooldown is dropped
    /// and only updates the previous-frame flag.
    pub fn update(&mut self, active: bool, now: f64) -> bool {
        self.state.is_active_now = active;
        let rising = active && !self.state.was_active_previously;
        self.state.was_active_previously = active;

        if !rising {
            return false;
        }
        if !self.cooldown_elapsed(now) {
            debug!("thumbs-up edge at {now:.3}s ignored: cooldown active");
            return false;
        }

        self.state.last_trigger = Some(now);
        true
    }

    /// Forget the signal history (hand lost). The cooldown clock is kept.
    pub fn reset_signal(&mut self) {
        self.state.is_active_now = false;
        self.state.was_active_previously = false;
    }
}
