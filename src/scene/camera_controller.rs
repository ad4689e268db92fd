//! Fly camera controller
//!
//! - WASD: Move forward/backward/left/right
//! - Q/E: Move down/up
//! - Shift: Sprint
//! - Mouse: Look around (yaw/pitch)
//! - Scroll: Zoom (narrows the field of view)

use glam::{Vec2, Vec3};

use super::Camera;

/// Input state for the camera controller
#[derive(Debug, Clone, Default)]
pub struct CameraInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,

    /// Sprint modifier (shift)
    pub sprint: bool,

    /// Mouse delta since last frame (in pixels, +y is down)
    pub mouse_delta: Vec2,

    /// Mouse scroll delta (positive = scroll up)
    pub scroll_delta: f32,

    /// Whether mouse look is active
    pub mouse_look_active: bool,
}

impl CameraInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-frame deltas (call after update)
    pub fn reset_deltas(&mut self) {
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }
}

/// First-person fly camera
#[derive(Debug, Clone)]
pub struct FlyCameraController {
    /// Horizontal angle in degrees, -90 looks down -Z
    pub yaw: f32,
    /// Vertical angle in degrees
    pub pitch: f32,
    /// Movement speed in units per second
    pub move_speed: f32,
    /// Degrees per pixel of mouse motion
    pub mouse_sensitivity: f32,
    pub sprint_multiplier: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for FlyCameraController {
    fn default() -> Self {
        Self {
            yaw: -90.0,
            pitch: 0.0,
            move_speed: 15.0,
            mouse_sensitivity: 0.1,
            sprint_multiplier: 2.0,
            min_zoom: 1.0,
            max_zoom: 45.0,
        }
    }
}

impl FlyCameraController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.move_speed = speed;
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.mouse_sensitivity = sensitivity;
        self
    }

    /// Initialize yaw/pitch from the camera's current orientation
    pub fn sync_with_camera(&mut self, camera: &Camera) {
        let front = camera.forward();
        if front != Vec3::ZERO {
            self.yaw = front.z.atan2(front.x).to_degrees();
            self.pitch = front.y.clamp(-1.0, 1.0).asin().to_degrees();
        }
    }

    /// Unit vector the camera looks along; also the punch direction
    pub fn front(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
    }

    fn right(&self) -> Vec3 {
        self.front().cross(Vec3::Y).normalize()
    }

    pub fn update(&mut self, camera: &mut Camera, input: &CameraInput, dt: f32) {
        if input.scroll_delta != 0.0 {
            camera.projection.fov_y_degrees = (camera.projection.fov_y_degrees
                - input.scroll_delta)
                .clamp(self.min_zoom, self.max_zoom);
        }

        if input.mouse_look_active && input.mouse_delta != Vec2::ZERO {
            self.yaw += input.mouse_delta.x * self.mouse_sensitivity;
            self.pitch -= input.mouse_delta.y * self.mouse_sensitivity;
            self.pitch = self.pitch.clamp(-89.0, 89.0);
            self.yaw %= 360.0;
        }

        let front = self.front();
        let right = self.right();

        let mut velocity = Vec3::ZERO;
        if input.forward {
            velocity += front;
        }
        if input.backward {
            velocity -= front;
        }
        if input.right {
            velocity += right;
        }
        if input.left {
            velocity -= right;
        }
        if input.up {
            velocity += Vec3::Y;
        }
        if input.down {
            velocity -= Vec3::Y;
        }

        let speed = if input.sprint {
            self.move_speed * self.sprint_multiplier
        } else {
            self.move_speed
        };
        camera.position += velocity.normalize_or_zero() * speed * dt;
        camera.target = camera.position + front;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_looks_down_negative_z() {
        let controller = FlyCameraController::default();
        assert!(controller.front().abs_diff_eq(-Vec3::Z, 1e-5));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut controller = FlyCameraController::default();
        let mut camera = Camera::default();
        let input = CameraInput {
            mouse_look_active: true,
            mouse_delta: Vec2::new(0.0, -100_000.0),
            ..CameraInput::new()
        };
        controller.update(&mut camera, &input, 0.016);
        assert_eq!(controller.pitch, 89.0);
    }

    #[test]
    fn forward_moves_along_front() {
        let mut controller = FlyCameraController::default().with_speed(10.0);
        let mut camera = Camera::default();
        let start = camera.position;
        let input = CameraInput {
            forward: true,
            ..CameraInput::new()
        };
        controller.update(&mut camera, &input, 0.5);
        assert!((camera.position - start).abs_diff_eq(-Vec3::Z * 5.0, 1e-4));
        assert!(camera.forward().abs_diff_eq(-Vec3::Z, 1e-5));
    }

    #[test]
    fn scroll_zooms_within_limits() {
        let mut controller = FlyCameraController::default();
        let mut camera = Camera::default();
        let input = CameraInput {
            scroll_delta: 100.0,
            ..CameraInput::new()
        };
        controller.update(&mut camera, &input, 0.0);
        assert_eq!(camera.projection.fov_y_degrees, 1.0);
    }

    #[test]
    fn sync_recovers_orientation() {
        let camera = Camera::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
        let mut controller = FlyCameraController::default();
        controller.sync_with_camera(&camera);
        assert!(controller.front().abs_diff_eq(camera.forward(), 1e-5));
    }
}
