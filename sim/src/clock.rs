use crate::constants::{FIXED_DT_S, MAX_FIXED_STEPS_PER_FRAME, MAX_FRAME_DT_S};

/// Fixed-step accumulator fed by variable frame times.
#[derive(Clone, Copy, Debug)]
pub struct FixedStepClock {
    accumulator_s: f32,
    fixed_dt_s: f32,
}

impl Default for FixedStepClock {
    fn default() -> Self {
        Self::new(FIXED_DT_S)
    }
}

impl FixedStepClock {
    pub fn new(fixed_dt_s: f32) -> Self {
        Self {
            accumulator_s: 0.0,
            fixed_dt_s,
        }
    }

    #[inline]
    pub fn fixed_dt_s(&self) -> f32 {
        self.fixed_dt_s
    }

    /// Clamp a raw frame dt to something safe to integrate.
    pub fn clamp_frame_dt(dt: f32) -> f32 {
        if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT_S)
        } else {
            0.0
        }
    }

    /// Add a frame's time and return how many fixed steps to run now.
    pub fn advance(&mut self, frame_dt_s: f32) -> u32 {
        self.accumulator_s += Self::clamp_frame_dt(frame_dt_s);

        let mut steps = 0;
        while self.accumulator_s >= self.fixed_dt_s && steps < MAX_FIXED_STEPS_PER_FRAME {
            self.accumulator_s -= self.fixed_dt_s;
            steps += 1;
        }
        if steps == MAX_FIXED_STEPS_PER_FRAME {
            // Too far behind; drop the backlog.
            self.accumulator_s = self.accumulator_s.min(self.fixed_dt_s);
        }
        steps
    }
}
