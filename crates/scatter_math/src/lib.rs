// Re-export glam for convenience
pub use glam::*;

// Scatter math helpers
mod transform;
pub use transform::{compose_instance_matrix, integrate_angular_velocity, DMat4Ext};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dvec3_creation() {
        let v = DVec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_dquat_identity() {
        let q = DQuat::IDENTITY;
        assert_eq!(q * DVec3::X, DVec3::X);
    }
}
