//! Transform of a scene entity

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position, orientation and scale of an entity in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn from_pose(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Create transform from position, XYZ euler angles in radians, and scale
    pub fn from_euler(position: Vec3, rotation_euler: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::from_euler(
                EulerRot::XYZ,
                rotation_euler.x,
                rotation_euler.y,
                rotation_euler.z,
            ),
            scale,
        }
    }

    /// Rotation as XYZ euler angles in radians
    pub fn euler_angles(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    /// Blend between two simulated states for display.
    ///
    /// Position and scale are lerped, rotation is slerped. A factor of 0 yields
    /// `previous`, a factor of 1 yields `current`.
    pub fn interpolate(previous: &Transform, current: &Transform, factor: f32) -> Transform {
        if previous == current {
            return *current;
        }
        Transform {
            position: previous.position.lerp(current.position, factor),
            rotation: previous.rotation.slerp(current.rotation, factor).normalize(),
            scale: previous.scale.lerp(current.scale, factor),
        }
    }

    /// Get the model matrix for this transform
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Build uniform data for shaders
    pub fn uniform_data(&self) -> TransformUniformData {
        let model = self.matrix();
        TransformUniformData {
            model,
            normal_matrix: model.inverse().transpose(),
        }
    }
}

/// Transform uniform data for GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TransformUniformData {
    pub model: Mat4,
    pub normal_matrix: Mat4,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample() -> Transform {
        Transform::from_euler(
            Vec3::new(15.0, 30.0, -50.0),
            Vec3::new(0.3, -1.2, 0.7),
            Vec3::splat(6.0),
        )
    }

    #[rstest]
    #[case::start(0.0)]
    #[case::quarter(0.25)]
    #[case::middle(0.5)]
    #[case::almost_next(0.999)]
    fn interpolating_identical_states_is_identity(#[case] factor: f32) {
        let t = sample();
        assert_eq!(Transform::interpolate(&t, &t, factor), t);
    }

    #[test]
    fn endpoints_match_inputs() {
        let previous = Transform::IDENTITY;
        let current = sample();

        let start = Transform::interpolate(&previous, &current, 0.0);
        assert!(start.position.abs_diff_eq(previous.position, 1e-5));
        assert!(start.rotation.abs_diff_eq(previous.rotation, 1e-5));

        let end = Transform::interpolate(&previous, &current, 1.0);
        assert!(end.position.abs_diff_eq(current.position, 1e-4));
        assert!(end.rotation.abs_diff_eq(current.rotation, 1e-5));
        assert!(end.scale.abs_diff_eq(current.scale, 1e-5));
    }

    #[test]
    fn halfway_position_is_midpoint() {
        let previous = Transform::from_position(Vec3::new(0.0, 10.0, 0.0));
        let current = Transform::from_position(Vec3::new(0.0, 8.0, 2.0));
        let mid = Transform::interpolate(&previous, &current, 0.5);
        assert!(mid.position.abs_diff_eq(Vec3::new(0.0, 9.0, 1.0), 1e-6));
    }

    #[test]
    fn euler_round_trip() {
        let t = sample();
        let back = Transform::from_euler(t.position, t.euler_angles(), t.scale);
        assert!(back.rotation.abs_diff_eq(t.rotation, 1e-5));
    }
}
