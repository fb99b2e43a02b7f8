//! Instance transform computation.
//!
//! [`TransformBatchComputer`] is the contract the assembler relies on; a
//! batch with zero produced samples means the instancer could not be
//! evaluated consistently (topology mismatch, empty instancer, ...).
//! [`PointInstancerTransforms`] implements it for [`PointInstancer`].

use scatter_math::{compose_instance_matrix, integrate_angular_velocity, DMat4, DQuat, DVec3};

use crate::instancer::{PointInstancer, Sampled};

/// Per-instance matrices for one absolute sample time.
pub type InstanceTransformSet = Vec<DMat4>;

/// The result of evaluating instance transforms at a set of sample times.
///
/// Holds one transform set per produced sample, in request order. A computer
/// may produce fewer samples than requested; zero means no usable samples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformBatch {
    samples: Vec<InstanceTransformSet>,
}

impl TransformBatch {
    /// A batch signalling that no usable samples could be computed.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(samples: Vec<InstanceTransformSet>) -> Self {
        Self { samples }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of samples produced.
    pub fn produced(&self) -> usize {
        self.samples.len()
    }

    /// Instance count of the first sample.
    pub fn instance_count(&self) -> usize {
        self.samples.first().map(Vec::len).unwrap_or(0)
    }

    pub fn samples(&self) -> &[InstanceTransformSet] {
        &self.samples
    }
}

/// Computes per-instance transforms for an instancer at absolute times.
///
/// Implementations must be callable from independent invocations running on
/// different threads.
pub trait TransformBatchComputer<I: ?Sized>: Send + Sync {
    /// Evaluate `instancer` at each of `sample_times`.
    ///
    /// `default_time` resolves attributes that do not vary per sample, such as
    /// prototype assignment.
    fn compute(&self, instancer: &I, sample_times: &[f64], default_time: f64) -> TransformBatch;
}

/// Reference transform computer for [`PointInstancer`].
///
/// Each instance is `translate(position + velocity * dt) * rotate(orientation
/// advanced by angular velocity * dt) * scale`, where `dt` is the distance in
/// seconds from the authored position sample to the requested time.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointInstancerTransforms;

impl PointInstancerTransforms {
    pub fn new() -> Self {
        Self
    }

    fn transforms_at(&self, instancer: &PointInstancer, time: f64, count: usize) -> Option<InstanceTransformSet> {
        let (position_time, positions) = instancer.positions.sample_at(time)?;
        if positions.len() != count {
            log::debug!(
                "{}: {} positions at time {} but {} instances",
                instancer.path,
                positions.len(),
                time,
                count
            );
            return None;
        }

        let orientations = optional_values(&instancer.orientations, time, count)?;
        let scales = optional_values(&instancer.scales, time, count)?;
        let velocities = optional_values(&instancer.velocities, time, count)?;
        let angular_velocities = optional_values(&instancer.angular_velocities, time, count)?;

        let dt = if instancer.time_codes_per_second > 0.0 {
            (time - position_time) / instancer.time_codes_per_second
        } else {
            0.0
        };

        let transforms = (0..count)
            .map(|i| {
                let mut translation = positions[i];
                if let Some(velocities) = velocities {
                    translation += velocities[i] * dt;
                }

                let mut rotation = orientations.map(|o| o[i].normalize()).unwrap_or(DQuat::IDENTITY);
                if let Some(angular) = angular_velocities {
                    rotation = integrate_angular_velocity(rotation, angular[i], dt);
                }

                let scale = scales.map(|s| s[i]).unwrap_or(DVec3::ONE);

                compose_instance_matrix(translation, rotation, scale)
            })
            .collect();

        Some(transforms)
    }
}

/// `Some(None)` when the attribute is not authored, `None` when it is authored
/// with the wrong number of elements.
fn optional_values<T>(attr: &Option<Sampled<Vec<T>>>, time: f64, count: usize) -> Option<Option<&[T]>> {
    match attr {
        None => Some(None),
        Some(sampled) => match sampled.sample_at(time) {
            Some((_, values)) if values.len() == count => Some(Some(values.as_slice())),
            _ => None,
        },
    }
}

impl TransformBatchComputer<PointInstancer> for PointInstancerTransforms {
    fn compute(&self, instancer: &PointInstancer, sample_times: &[f64], default_time: f64) -> TransformBatch {
        let count = instancer.instance_count(default_time);
        if count == 0 || sample_times.is_empty() {
            return TransformBatch::empty();
        }

        // Nothing moves: one sample stands for all of them.
        let times = if !instancer.is_time_varying() && !instancer.has_velocities() {
            &sample_times[..1]
        } else {
            sample_times
        };

        let mut samples = Vec::with_capacity(times.len());
        for &time in times {
            match self.transforms_at(instancer, time, count) {
                Some(transforms) => samples.push(transforms),
                None => {
                    log::warn!(
                        "{}: inconsistent instance attributes at time {}",
                        instancer.path,
                        time
                    );
                    return TransformBatch::empty();
                }
            }
        }

        TransformBatch::new(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instancer::Keyframe;

    fn grid(count: usize) -> PointInstancer {
        PointInstancer {
            path: "/World/Grid".to_string(),
            prototypes: vec!["/World/Grid/Protos/Cube".to_string()],
            proto_indices: Sampled::Static(vec![0; count]),
            positions: Sampled::Static((0..count).map(|i| DVec3::new(i as f64, 0.0, 0.0)).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn test_static_instancer_collapses_samples() {
        let batch = PointInstancerTransforms.compute(&grid(3), &[9.5, 10.5], 10.0);

        assert_eq!(batch.produced(), 1);
        assert_eq!(batch.instance_count(), 3);
        let p = batch.samples()[0][2].transform_point3(DVec3::ZERO);
        assert!((p - DVec3::new(2.0, 0.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_velocity_extrapolates_per_sample() {
        let mut instancer = grid(1);
        instancer.time_codes_per_second = 1.0;
        instancer.positions = Sampled::TimeSampled(vec![Keyframe { time: 10.0, value: vec![DVec3::ZERO] }]);
        instancer.velocities = Some(Sampled::Static(vec![DVec3::new(2.0, 0.0, 0.0)]));

        let batch = PointInstancerTransforms.compute(&instancer, &[10.0, 10.5], 10.0);

        assert_eq!(batch.produced(), 2);
        let p0 = batch.samples()[0][0].transform_point3(DVec3::ZERO);
        let p1 = batch.samples()[1][0].transform_point3(DVec3::ZERO);
        assert!(p0.length() < 1e-9);
        assert!((p1.x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_orientation_and_scale() {
        let mut instancer = grid(1);
        instancer.orientations = Some(Sampled::Static(vec![DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2)]));
        instancer.scales = Some(Sampled::Static(vec![DVec3::splat(2.0)]));

        let batch = PointInstancerTransforms.compute(&instancer, &[0.0], 0.0);
        let v = batch.samples()[0][0].transform_vector3(DVec3::X);

        assert!(v.x.abs() < 1e-9);
        assert!((v.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_topology_mismatch_yields_no_samples() {
        let mut instancer = grid(3);
        instancer.positions = Sampled::TimeSampled(vec![
            Keyframe { time: 1.0, value: vec![DVec3::ZERO; 3] },
            Keyframe { time: 2.0, value: vec![DVec3::ZERO; 2] },
        ]);

        let batch = PointInstancerTransforms.compute(&instancer, &[1.0, 2.0], 1.0);
        assert!(batch.is_empty());
        assert!(batch.samples().is_empty());
    }

    #[test]
    fn test_mismatched_optional_attribute_yields_no_samples() {
        let mut instancer = grid(2);
        instancer.scales = Some(Sampled::Static(vec![DVec3::ONE]));

        assert!(PointInstancerTransforms.compute(&instancer, &[0.0], 0.0).is_empty());
    }

    #[test]
    fn test_empty_instancer_yields_no_samples() {
        let batch = PointInstancerTransforms.compute(&grid(0), &[0.0], 0.0);
        assert_eq!(batch.produced(), 0);
    }

    #[test]
    fn test_produced_counts_stored_samples() {
        let batch = TransformBatch::new(vec![vec![DMat4::IDENTITY], vec![DMat4::IDENTITY]]);
        assert_eq!(batch.produced(), 2);
        assert_eq!(batch.instance_count(), 1);
        assert!(!batch.is_empty());
        assert!(TransformBatch::new(Vec::new()).is_empty());
    }
}
