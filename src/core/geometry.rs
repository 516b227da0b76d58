use crate::core::color::Color;
use nalgebra::{Point3, Vector2, Vector3, Vector4};

/// Represents a single vertex in 3D space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in local object space.
    pub position: Point3<f32>,
    /// Base color, used when no diffuse map is bound.
    pub color: Color,
    /// Texture coordinates (UV).
    pub texcoord: Vector2<f32>,
    /// Normal vector for lighting calculations.
    pub normal: Vector3<f32>,
    /// Tangent vector (xyz) for Normal Mapping.
    pub tangent: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, texcoord: Vector2<f32>) -> Self {
        Self {
            position,
            color: Vector3::new(1.0, 1.0, 1.0),
            texcoord,
            normal,
            tangent: Vector3::zeros(),
        }
    }

    pub fn with_tangent(mut self, tangent: Vector3<f32>) -> Self {
        self.tangent = tangent;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// A vertex after the per-frame transform.
///
/// `position.x/y` are screen pixels (top-left origin), `position.z` is the
/// depth after the perspective divide and `position.w` is the clip-space w.
/// Everything else is ready for interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformedVertex {
    pub position: Vector4<f32>,
    pub color: Color,
    pub uv: Vector2<f32>,
    /// World-space normal, normalized.
    pub normal: Vector3<f32>,
    /// World-space tangent, normalized.
    pub tangent: Vector3<f32>,
    /// Camera origin minus world position, normalized.
    pub view_direction: Vector3<f32>,
}

impl Default for TransformedVertex {
    fn default() -> Self {
        Self {
            position: Vector4::zeros(),
            color: Vector3::zeros(),
            uv: Vector2::zeros(),
            normal: Vector3::zeros(),
            tangent: Vector3::zeros(),
            view_direction: Vector3::zeros(),
        }
    }
}

impl TransformedVertex {
    #[inline(always)]
    pub fn screen_xy(&self) -> Vector2<f32> {
        Vector2::new(self.position.x, self.position.y)
    }
}
