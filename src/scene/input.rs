use nalgebra::{Vector2, Vector3};

/// Plain-data camera input for one frame.
///
/// Whatever produces it (a window, a script, a test) is outside the camera;
/// the camera only ever sees these deltas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// x = strafe (right positive), y = forward/back (forward positive).
    /// Time-integrated by the camera.
    pub movement: Vector2<f32>,
    /// Mouse-like look delta: x turns (yaw), y tilts (pitch, down positive).
    pub rotation: Vector2<f32>,
    /// Applied directly along right (x), up (y) and forward (z).
    pub pan: Vector3<f32>,
    /// Doubles the movement speed while held.
    pub fast: bool,
}

impl FrameInput {
    pub fn is_idle(&self) -> bool {
        self.movement == Vector2::zeros()
            && self.rotation == Vector2::zeros()
            && self.pan == Vector3::zeros()
    }
}
