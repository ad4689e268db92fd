//! Input conversion utilities.
//!
//! Maps winit key codes onto the fly camera's movement flags.

use winit::keyboard::KeyCode;

use crate::scene::CameraInput;

/// Update `input` for a key press or release.
///
/// Returns `true` if the key is a camera key.
pub fn apply_camera_key(input: &mut CameraInput, key: KeyCode, pressed: bool) -> bool {
    let flag = match key {
        KeyCode::KeyW | KeyCode::ArrowUp => &mut input.forward,
        KeyCode::KeyS | KeyCode::ArrowDown => &mut input.backward,
        KeyCode::KeyA | KeyCode::ArrowLeft => &mut input.left,
        KeyCode::KeyD | KeyCode::ArrowRight => &mut input.right,
        KeyCode::KeyE => &mut input.up,
        KeyCode::KeyQ => &mut input.down,
        KeyCode::ShiftLeft | KeyCode::ShiftRight => &mut input.sprint,
        _ => return false,
    };
    *flag = pressed;
    true
}
