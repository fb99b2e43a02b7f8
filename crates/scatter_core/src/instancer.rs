//! Point instancer data model.
//!
//! These types hold already-resolved scene description values. Reading them
//! from a scene file format is left to the caller (see [`crate::scene`] for the
//! JSON form used by the CLI and tests).

use scatter_math::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// The minimum an assembler needs to know about an instancer primitive.
pub trait InstancerPrim {
    /// Scene path of the primitive (e.g. `/World/Forest`)
    fn path(&self) -> &str;

    /// Whether the instance transforms can change across motion samples.
    fn is_motion_varying(&self) -> bool;
}

/// A value authored at a given time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    pub time: f64,
    pub value: T,
}

/// An attribute that is either constant or sampled over time.
///
/// Time samples must be sorted by time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sampled<T> {
    Static(T),
    TimeSampled(Vec<Keyframe<T>>),
}

impl<T: Default> Default for Sampled<T> {
    fn default() -> Self {
        Sampled::Static(T::default())
    }
}

impl<T> Sampled<T> {
    /// True when more than one distinct sample is authored.
    pub fn is_time_varying(&self) -> bool {
        matches!(self, Sampled::TimeSampled(frames) if frames.len() > 1)
    }

    /// Held value at `time` and the time it was authored at.
    ///
    /// Uses the latest sample at or before `time`, or the first sample when
    /// `time` precedes them all. A static value reports `time` itself.
    pub fn sample_at(&self, time: f64) -> Option<(f64, &T)> {
        match self {
            Sampled::Static(value) => Some((time, value)),
            Sampled::TimeSampled(frames) => {
                let held = frames.iter().rev().find(|k| k.time <= time).or(frames.first())?;
                Some((held.time, &held.value))
            }
        }
    }
}

/// A point instancer primitive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PointInstancer {
    /// Prim path
    pub path: String,

    /// Paths to prototype prims, indexed by `proto_indices`
    pub prototypes: Vec<String>,

    /// Prototype indices (which prototype each instance uses)
    pub proto_indices: Sampled<Vec<i32>>,

    /// Instance positions
    pub positions: Sampled<Vec<DVec3>>,

    /// Instance orientations (as quaternions)
    pub orientations: Option<Sampled<Vec<DQuat>>>,

    /// Instance scales (per-axis)
    pub scales: Option<Sampled<Vec<DVec3>>>,

    /// Linear velocities, units per second
    pub velocities: Option<Sampled<Vec<DVec3>>>,

    /// Angular velocities, degrees per second
    pub angular_velocities: Option<Sampled<Vec<DVec3>>>,

    /// Time codes per second, used to turn time deltas into seconds
    pub time_codes_per_second: f64,
}

impl Default for PointInstancer {
    fn default() -> Self {
        Self {
            path: String::new(),
            prototypes: Vec::new(),
            proto_indices: Sampled::default(),
            positions: Sampled::default(),
            orientations: None,
            scales: None,
            velocities: None,
            angular_velocities: None,
            time_codes_per_second: 24.0,
        }
    }
}

impl PointInstancer {
    /// Prim name (last component of the path).
    pub fn name(&self) -> &str {
        prim_name(&self.path)
    }

    /// Number of instances at `time`, from the prototype indices.
    pub fn instance_count(&self, time: f64) -> usize {
        self.proto_indices
            .sample_at(time)
            .map(|(_, indices)| indices.len())
            .unwrap_or(0)
    }

    pub fn has_velocities(&self) -> bool {
        self.velocities.is_some() || self.angular_velocities.is_some()
    }

    /// True when any transform-affecting attribute is time sampled.
    pub fn is_time_varying(&self) -> bool {
        self.positions.is_time_varying()
            || self.orientations.as_ref().is_some_and(Sampled::is_time_varying)
            || self.scales.as_ref().is_some_and(Sampled::is_time_varying)
            || self.velocities.as_ref().is_some_and(Sampled::is_time_varying)
            || self.angular_velocities.as_ref().is_some_and(Sampled::is_time_varying)
    }
}

impl InstancerPrim for PointInstancer {
    fn path(&self) -> &str {
        &self.path
    }

    fn is_motion_varying(&self) -> bool {
        self.is_time_varying() || self.has_velocities()
    }
}

/// Last component of a prim path.
pub fn prim_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
