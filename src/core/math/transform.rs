use nalgebra::{Matrix3, Matrix4, Point3, Vector2, Vector3, Vector4};

//=================================
// Transform Matrix Factory
//=================================

/// Factory for creating various transformation matrices.
///
/// Matrices act on column vectors (`M * v`). The coordinate system is
/// left-handed: +X right, +Y up, +Z into the screen, with NDC depth in [0, 1].
pub struct TransformFactory;

#[rustfmt::skip]
impl TransformFactory {
    /// Rotation around the X-axis. Positive angles tilt +Z towards +Y.
    pub fn rotation_x(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c,   s,   0.0,
            0.0, -s,  c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Rotation around the Y-axis. Positive angles turn +Z towards +X.
    pub fn rotation_y(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            c,   0.0, s,   0.0,
            0.0, 1.0, 0.0, 0.0,
           -s,   0.0, c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Rotation around the Z-axis.
    pub fn rotation_z(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            c,  -s,   0.0, 0.0,
            s,   c,   0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Combined rotation: roll first, then pitch, then yaw.
    pub fn rotation(pitch: f32, yaw: f32, roll: f32) -> Matrix4<f32> {
        Self::rotation_y(yaw) * Self::rotation_x(pitch) * Self::rotation_z(roll)
    }

    /// Creates a translation matrix.
    pub fn translation(translation: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            1.0, 0.0, 0.0, translation.x,
            0.0, 1.0, 0.0, translation.y,
            0.0, 0.0, 1.0, translation.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a non-uniform scaling matrix.
    pub fn scaling_nonuniform(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            scale.x, 0.0,     0.0,     0.0,
            0.0,     scale.y, 0.0,     0.0,
            0.0,     0.0,     scale.z, 0.0,
            0.0,     0.0,     0.0,     1.0,
        )
    }

    /// Camera-to-world matrix from an orthonormal basis and an origin.
    pub fn basis(
        right: &Vector3<f32>,
        up: &Vector3<f32>,
        forward: &Vector3<f32>,
        origin: &Point3<f32>,
    ) -> Matrix4<f32> {
        Matrix4::new(
            right.x, up.x, forward.x, origin.x,
            right.y, up.y, forward.y, origin.y,
            right.z, up.z, forward.z, origin.z,
            0.0,     0.0,  0.0,       1.0,
        )
    }

    /// Inverse of a rigid (rotation + translation) matrix: transposed
    /// rotation block and negated, rotated translation.
    pub fn rigid_inverse(m: &Matrix4<f32>) -> Matrix4<f32> {
        let rotation_t: Matrix3<f32> = m.fixed_view::<3, 3>(0, 0).transpose();
        let translation: Vector3<f32> = m.fixed_view::<3, 1>(0, 3).into_owned();
        let t = -(rotation_t * translation);
        Matrix4::new(
            rotation_t[(0, 0)], rotation_t[(0, 1)], rotation_t[(0, 2)], t.x,
            rotation_t[(1, 0)], rotation_t[(1, 1)], rotation_t[(1, 2)], t.y,
            rotation_t[(2, 0)], rotation_t[(2, 1)], rotation_t[(2, 2)], t.z,
            0.0,                0.0,                0.0,                1.0,
        )
    }

    /// Left-handed perspective projection.
    ///
    /// `fov` is `tan(vertical_fov / 2)`. View-space depth `near` maps to NDC
    /// z = 0 and `far` to z = 1; clip w equals view-space depth.
    pub fn perspective_fov_lh(fov: f32, aspect_ratio: f32, near: f32, far: f32) -> Matrix4<f32> {
        let depth = far / (far - near);
        Matrix4::new(
            1.0 / (aspect_ratio * fov), 0.0,       0.0,   0.0,
            0.0,                        1.0 / fov, 0.0,   0.0,
            0.0,                        0.0,       depth, -near * depth,
            0.0,                        0.0,       1.0,   0.0,
        )
    }
}

//=================================
// Core Transformation Functions
//=================================

/// Transforms a point (w = 1) into homogeneous coordinates without dividing.
#[inline]
pub fn transform_point4(m: &Matrix4<f32>, p: &Point3<f32>) -> Vector4<f32> {
    m * p.to_homogeneous()
}

/// Transforms a direction (w = 0): translation is ignored.
#[inline]
pub fn transform_vector(m: &Matrix4<f32>, v: &Vector3<f32>) -> Vector3<f32> {
    m.fixed_view::<3, 3>(0, 0) * v
}

/// Divides x, y and z by w; w itself is kept for perspective correction.
#[inline]
pub fn apply_perspective_division(clip: &Vector4<f32>) -> Vector4<f32> {
    Vector4::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w, clip.w)
}

/// Converts NDC coordinates to Screen coordinates (Viewport Transform).
/// Note: Y-axis is flipped (NDC +Y is up, Screen +Y is down).
#[inline]
pub fn ndc_to_screen(ndc_x: f32, ndc_y: f32, width: f32, height: f32) -> Vector2<f32> {
    Vector2::new((ndc_x + 1.0) * 0.5 * width, (1.0 - ndc_y) * 0.5 * height)
}
