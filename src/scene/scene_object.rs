use crate::core::math::transform::TransformFactory;
use nalgebra::{Matrix4, Vector3};

/// Where a mesh sits in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vector3<f32>,
    /// Euler angles in degrees, applied X then Y then Z.
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Placement {
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// World matrix with an extra `spin` (radians) about the object's own Y
    /// axis, applied after its fixed orientation.
    pub fn matrix(&self, spin: f32) -> Matrix4<f32> {
        let translation = TransformFactory::translation(&self.position);
        let rotation = TransformFactory::rotation_x(self.rotation.x.to_radians())
            * TransformFactory::rotation_y(self.rotation.y.to_radians())
            * TransformFactory::rotation_z(self.rotation.z.to_radians());
        let scale = TransformFactory::scaling_nonuniform(&self.scale);
        translation * TransformFactory::rotation_y(spin) * rotation * scale
    }
}
