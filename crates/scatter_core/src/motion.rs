//! Motion sample resolution.
//!
//! Motion blur samples are authored as offsets relative to the current frame.
//! Transforms are evaluated at absolute times (`current + offset`), while the
//! results are stored under frame-relative time keys. When motion is backward,
//! the stored key is passed through a self-inverse reversal; the evaluation
//! time never is.

/// A self-inverse mapping of frame-relative time keys.
pub type TimeReversal = fn(f64) -> f64;

/// Default time reversal: negate, keeping `0.0` as is so no `-0` key is written.
pub fn reverse_time_sample(time: f64) -> f64 {
    if time == 0.0 {
        time
    } else {
        -time
    }
}

/// One resolved motion sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionSample {
    /// Frame-relative offset
    pub offset: f64,

    /// Absolute evaluation time (`current + offset`)
    pub time: f64,
}

impl MotionSample {
    /// The key results for this sample are stored under.
    pub fn time_key(&self, backward: bool, reversal: TimeReversal) -> f64 {
        if backward {
            reversal(self.offset)
        } else {
            self.offset
        }
    }
}

/// Resolve offsets against `current_time`, preserving order.
///
/// No offsets means a single sample at the current time.
pub fn resolve_motion_samples(current_time: f64, offsets: &[f64]) -> Vec<MotionSample> {
    if offsets.is_empty() {
        return vec![MotionSample {
            offset: 0.0,
            time: current_time,
        }];
    }

    offsets
        .iter()
        .map(|&offset| MotionSample {
            offset,
            time: current_time + offset,
        })
        .collect()
}

/// Offsets that run from later to earlier describe backward motion.
pub fn is_motion_backward(offsets: &[f64]) -> bool {
    match (offsets.first(), offsets.last()) {
        (Some(first), Some(last)) => offsets.len() > 1 && first > last,
        _ => false,
    }
}

/// `count` evenly spaced offsets from `open` to `close`, both inclusive.
///
/// A zero-width shutter yields the single offset `open`.
pub fn shutter_offsets(open: f64, close: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        _ if open == close => vec![open],
        1 => vec![open],
        _ => {
            let step = (close - open) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { close } else { open + step * i as f64 })
                .collect()
        }
    }
}
