//! Fixed timestep accumulator
//!
//! Converts variable wall-clock frame times into a whole number of
//! simulation ticks.

use crate::consts::SIM_DT;
use crate::settings::Settings;

/// Longest frame time accepted (avoids a burst of ticks after a stall)
pub const MAX_FRAME_DT: f32 = 0.1;

#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    accumulator: f32,
}

impl FixedClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks to run for a frame that took `dt` seconds.
    ///
    /// Fast-forward scales both the elapsed time and the substep cap, so a
    /// tick means the same thing at every speed.
    pub fn advance(&mut self, dt: f32, fast_forward: bool, settings: &Settings) -> u32 {
        let factor = if fast_forward {
            settings.effective_fast_forward()
        } else {
            1
        };
        let max_substeps = settings.effective_max_substeps() * factor;

        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT) * factor as f32;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < max_substeps {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// Fraction of a tick left over (for render interpolation)
    pub fn alpha(&self) -> f32 {
        (self.accumulator / SIM_DT).clamp(0.0, 1.0)
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
