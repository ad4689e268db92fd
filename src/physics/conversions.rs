//! Conversion helpers between glam rendering types and rapier's nalgebra types.

use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::{Isometry, Point, Real, Vector};

/// Converts a rendering `Vec3` to a physics vector.
pub fn vec3_to_na(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

/// Converts a physics vector to a rendering `Vec3`.
pub fn vec3_from_na(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Converts a rendering `Vec3` to a physics point.
pub fn point3_to_na(v: Vec3) -> Point<Real> {
    Point::new(v.x, v.y, v.z)
}

/// Converts a physics point to a rendering `Vec3`.
pub fn point3_from_na(p: &Point<Real>) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

/// Converts a rendering `Quat` to a physics unit quaternion.
pub fn quat_to_na(q: Quat) -> UnitQuaternion<Real> {
    UnitQuaternion::new_normalize(Quaternion::new(q.w, q.x, q.y, q.z))
}

/// Converts a physics unit quaternion to a rendering `Quat`.
pub fn quat_from_na(q: &UnitQuaternion<Real>) -> Quat {
    let q = q.quaternion();
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

/// Converts a rendering `Vec3` + `Quat` to a physics isometry.
pub fn isometry3_to_na(translation: Vec3, rotation: Quat) -> Isometry<Real> {
    Isometry::from_parts(
        Translation3::new(translation.x, translation.y, translation.z),
        quat_to_na(rotation),
    )
}

/// Extracts position and rotation from a physics isometry.
pub fn isometry3_from_na(iso: &Isometry<Real>) -> (Vec3, Quat) {
    let t = &iso.translation;
    (Vec3::new(t.x, t.y, t.z), quat_from_na(&iso.rotation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isometry_round_trip() {
        let position = Vec3::new(15.0, 30.0, -50.0);
        let rotation = Quat::from_euler(glam::EulerRot::XYZ, 0.4, -0.2, 1.1);
        let (p, r) = isometry3_from_na(&isometry3_to_na(position, rotation));
        assert!(p.abs_diff_eq(position, 1e-6));
        assert!(r.abs_diff_eq(rotation, 1e-6));
    }

    #[test]
    fn quaternion_components_keep_their_axes() {
        let q = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let na = quat_to_na(q);
        let rotated = na * Vector::new(1.0, 0.0, 0.0);
        let expected = q * Vec3::X;
        assert!(vec3_from_na(&rotated).abs_diff_eq(expected, 1e-6));
    }
}
