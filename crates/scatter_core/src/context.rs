//! Per-invocation evaluation context.

use crate::config::MotionConfig;
use crate::motion::{reverse_time_sample, TimeReversal};

/// Everything an invocation needs to know about time.
///
/// Built fresh for each invocation and never shared mutably.
#[derive(Clone, Debug)]
pub struct InvocationContext {
    /// Current evaluation time
    pub current_time: f64,

    /// Frame-relative motion sample offsets, in order
    pub motion_sample_offsets: Vec<f64>,

    /// Whether stored time keys must be reversed
    pub motion_backward: bool,

    /// Reversal applied to time keys when motion is backward
    pub time_reversal: TimeReversal,
}

impl Default for InvocationContext {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            motion_sample_offsets: vec![0.0],
            motion_backward: false,
            time_reversal: reverse_time_sample,
        }
    }
}

impl InvocationContext {
    pub fn new(current_time: f64, motion_sample_offsets: Vec<f64>, motion_backward: bool) -> Self {
        Self {
            current_time,
            motion_sample_offsets,
            motion_backward,
            ..Default::default()
        }
    }

    pub fn from_config(config: &MotionConfig) -> Self {
        Self::new(config.current_time, config.offsets(), config.is_backward())
    }

    pub fn with_time_reversal(mut self, time_reversal: TimeReversal) -> Self {
        self.time_reversal = time_reversal;
        self
    }

    /// Offsets to sample an attribute at; a static attribute gets a single `0.0`.
    pub fn motion_offsets_for(&self, time_varying: bool) -> Vec<f64> {
        if time_varying && !self.motion_sample_offsets.is_empty() {
            self.motion_sample_offsets.clone()
        } else {
            vec![0.0]
        }
    }
}
