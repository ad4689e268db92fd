//! Camera

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3, Vec4};

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 800.0,
        }
    }
}

impl Projection {
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }
}

/// Camera for viewing the scene
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub projection: Projection,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(10.0, -10.0, 0.0), Vec3::new(10.0, -10.0, -1.0))
    }
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            up: Vec3::Y,
            projection: Projection::default(),
        }
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection.matrix()
    }

    /// Get the forward direction
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Update aspect ratio from a surface size
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.projection.aspect = width as f32 / height as f32;
        }
    }

    /// Build camera uniform data for shaders
    pub fn uniform_data(&self) -> CameraUniformData {
        let view = self.view_matrix();
        let proj = self.projection_matrix();
        // The sky is drawn around the eye, so its matrix drops the translation.
        let sky_view = Mat4::from_mat3(Mat3::from_mat4(view));

        CameraUniformData {
            view_proj: proj * view,
            inv_sky_view_proj: (proj * sky_view).inverse(),
            position: self.position.extend(1.0),
        }
    }
}

/// Camera uniform data for GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniformData {
    pub view_proj: Mat4,
    pub inv_sky_view_proj: Mat4,
    pub position: Vec4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ignores_zero_sized_surface() {
        let mut camera = Camera::default();
        camera.set_aspect(1920, 1080);
        assert!((camera.projection.aspect - 16.0 / 9.0).abs() < 1e-6);
        camera.set_aspect(0, 1080);
        assert!((camera.projection.aspect - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let camera = Camera::new(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO);
        let clip = camera.uniform_data().view_proj * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
    }
}
