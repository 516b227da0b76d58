use nalgebra::{Vector2, Vector3};
use std::ops::{Add, Mul};

/// 2D cross product (z component of the 3D cross product).
#[inline(always)]
pub fn cross_2d(a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Twice the signed area of the screen-space triangle (t0, t1, t2).
///
/// Positive for clockwise winding on a y-down screen, which is the
/// front-facing orientation of the left-handed pipeline.
#[inline(always)]
pub fn signed_area_x2(t0: Vector2<f32>, t1: Vector2<f32>, t2: Vector2<f32>) -> f32 {
    cross_2d(t1 - t0, t2 - t0)
}

/// Edge-function setup for one screen-space triangle.
///
/// Each weight is the sub-triangle area opposite its vertex, normalized by
/// the full signed area, so covered points get three non-negative weights
/// summing to one regardless of the winding.
#[derive(Debug, Clone, Copy)]
pub struct EdgeFunctions {
    t0: Vector2<f32>,
    t1: Vector2<f32>,
    t2: Vector2<f32>,
    edge0: Vector2<f32>,
    edge1: Vector2<f32>,
    edge2: Vector2<f32>,
    inv_area: f32,
}

impl EdgeFunctions {
    /// Returns `None` when the triangle has zero area.
    pub fn new(t0: Vector2<f32>, t1: Vector2<f32>, t2: Vector2<f32>) -> Option<Self> {
        let area = signed_area_x2(t0, t1, t2);
        if area == 0.0 || !area.is_finite() {
            return None;
        }
        Some(Self {
            t0,
            t1,
            t2,
            edge0: t1 - t0,
            edge1: t2 - t1,
            edge2: t0 - t2,
            inv_area: 1.0 / area,
        })
    }

    /// Barycentric weights of `p`, or `None` as soon as one weight is negative.
    #[inline]
    pub fn weights(&self, p: Vector2<f32>) -> Option<Vector3<f32>> {
        let w0 = cross_2d(self.edge1, p - self.t1) * self.inv_area;
        if w0 < 0.0 {
            return None;
        }
        let w1 = cross_2d(self.edge2, p - self.t2) * self.inv_area;
        if w1 < 0.0 {
            return None;
        }
        let w2 = cross_2d(self.edge0, p - self.t0) * self.inv_area;
        if w2 < 0.0 {
            return None;
        }
        Some(Vector3::new(w0, w1, w2))
    }
}

/// Plain (affine) barycentric blend of three attributes.
#[inline(always)]
pub fn interpolate<T>(weights: &Vector3<f32>, a: T, b: T, c: T) -> T
where
    T: Add<Output = T> + Mul<f32, Output = T>,
{
    a * weights.x + b * weights.y + c * weights.z
}

/// Reciprocal-weighted interpolation: `1 / (w0/v0 + w1/v1 + w2/v2)`.
///
/// Used both for the perspective-correct depth (with post-divide z values)
/// and for the interpolated clip-space w.
#[inline(always)]
pub fn interpolate_reciprocal(weights: &Vector3<f32>, v0: f32, v1: f32, v2: f32) -> f32 {
    1.0 / (weights.x / v0 + weights.y / v1 + weights.z / v2)
}

/// Perspective-correct blend: each attribute is divided by its vertex's
/// clip w, blended, then multiplied back by the interpolated w.
#[inline]
pub fn interpolate_perspective<T>(weights: &Vector3<f32>, values: [T; 3], w: [f32; 3]) -> T
where
    T: Add<Output = T> + Mul<f32, Output = T> + Copy,
{
    let w_interp = interpolate_reciprocal(weights, w[0], w[1], w[2]);
    (values[0] * (weights.x / w[0]) + values[1] * (weights.y / w[1]) + values[2] * (weights.z / w[2]))
        * w_interp
}
