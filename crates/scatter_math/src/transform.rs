// Transform utilities for DMat4
//
// Scene descriptions store matrices in the row-vector convention (translation in
// the last row). glam uses column vectors, so the scene's row-major layout is
// exactly glam's column-major array.

use glam::{DMat4, DQuat, DVec3};

/// Extension trait for DMat4 to move matrices in and out of flat scene buffers.
pub trait DMat4Ext {
    /// The 16 components in the scene's row-major layout.
    /// Translation occupies elements 12, 13 and 14.
    fn to_scene_array(&self) -> [f64; 16];

    /// Inverse of [`DMat4Ext::to_scene_array`].
    fn from_scene_array(values: &[f64; 16]) -> Self;
}

impl DMat4Ext for DMat4 {
    fn to_scene_array(&self) -> [f64; 16] {
        self.to_cols_array()
    }

    fn from_scene_array(values: &[f64; 16]) -> Self {
        DMat4::from_cols_array(values)
    }
}

/// Build an instance matrix from its components.
///
/// Order: Scale -> Rotate -> Translate (SRT)
pub fn compose_instance_matrix(translation: DVec3, orientation: DQuat, scale: DVec3) -> DMat4 {
    DMat4::from_scale_rotation_translation(scale, orientation, translation)
}

/// Advance an orientation by an angular velocity (degrees per second) over `dt` seconds.
pub fn integrate_angular_velocity(orientation: DQuat, angular_velocity: DVec3, dt: f64) -> DQuat {
    let speed = angular_velocity.length();
    if speed == 0.0 || dt == 0.0 {
        return orientation;
    }

    let axis = angular_velocity / speed;
    let delta = DQuat::from_axis_angle(axis, (speed * dt).to_radians());
    (delta * orientation).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_array_translation_in_last_row() {
        let mat = DMat4::from_translation(DVec3::new(10.0, 20.0, 30.0));
        let values = mat.to_scene_array();

        assert_eq!(values[12], 10.0);
        assert_eq!(values[13], 20.0);
        assert_eq!(values[14], 30.0);
        assert_eq!(values[15], 1.0);
        assert_eq!(values[3], 0.0);
    }

    #[test]
    fn test_scene_array_identity() {
        let values = DMat4::IDENTITY.to_scene_array();
        for (i, v) in values.iter().enumerate() {
            let expected = if i % 5 == 0 { 1.0 } else { 0.0 };
            assert_eq!(*v, expected);
        }
    }

    #[test]
    fn test_from_scene_array_inverts() {
        let mat = compose_instance_matrix(
            DVec3::new(1.0, 2.0, 3.0),
            DQuat::from_rotation_y(0.3),
            DVec3::splat(2.0),
        );
        let back = DMat4::from_scene_array(&mat.to_scene_array());
        assert_eq!(back, mat);
    }

    #[test]
    fn test_compose_applies_scale_before_translation() {
        let mat = compose_instance_matrix(DVec3::new(5.0, 0.0, 0.0), DQuat::IDENTITY, DVec3::splat(2.0));
        let p = mat.transform_point3(DVec3::new(1.0, 0.0, 0.0));
        assert!((p - DVec3::new(7.0, 0.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_angular_velocity_quarter_turn() {
        // 90 degrees per second around Z for one second
        let q = integrate_angular_velocity(DQuat::IDENTITY, DVec3::new(0.0, 0.0, 90.0), 1.0);
        let v = q * DVec3::X;

        assert!((v.x - 0.0).abs() < 1e-9);
        assert!((v.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_angular_velocity_zero_is_noop() {
        let orientation = DQuat::from_rotation_x(0.5);
        let q = integrate_angular_velocity(orientation, DVec3::ZERO, 3.0);
        assert_eq!(q, orientation);
    }
}
