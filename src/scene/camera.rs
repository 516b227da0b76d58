use crate::core::math::transform::{TransformFactory, transform_vector};
use crate::scene::input::FrameInput;
use nalgebra::{Matrix4, Point3, Vector3};

/// Read-only view of the camera the rasterizer consumes.
#[derive(Debug, Clone, Copy)]
pub struct CameraSnapshot {
    pub inverse_view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub origin: Point3<f32>,
}

impl CameraSnapshot {
    /// World-to-clip transform (inverse view, then projection).
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection * self.inverse_view
    }
}

/// Speed constants for `Camera::update`.
#[derive(Debug, Clone, Copy)]
pub struct CameraSpeeds {
    /// World units per second.
    pub movement: f32,
    /// Radians per input unit.
    pub rotation: f32,
    /// World units per input unit.
    pub pan: f32,
}

impl Default for CameraSpeeds {
    fn default() -> Self {
        Self {
            movement: 50.0,
            rotation: 0.004,
            pan: 0.02,
        }
    }
}

/// First-person camera in a left-handed world (+Y up, looking down +Z at
/// zero yaw and pitch).
///
/// The basis is kept orthonormal and the view matrices are only rebuilt
/// when origin or orientation actually changed.
#[derive(Debug, Clone)]
pub struct Camera {
    pub origin: Point3<f32>,
    pub forward: Vector3<f32>,
    pub right: Vector3<f32>,
    pub up: Vector3<f32>,

    pub fov_angle: f32,
    /// `tan(fov_angle / 2)`.
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,

    pub total_pitch: f32,
    pub total_yaw: f32,

    pub speeds: CameraSpeeds,

    view_matrix: Matrix4<f32>,
    inverse_view_matrix: Matrix4<f32>,
    projection_matrix: Matrix4<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        let mut cam = Self {
            origin: Point3::origin(),
            forward: Vector3::z(),
            right: Vector3::x(),
            up: Vector3::y(),
            fov_angle: 90.0,
            fov: (90.0_f32.to_radians() / 2.0).tan(),
            aspect_ratio: 1.0,
            near: 1.0,
            far: 100.0,
            total_pitch: 0.0,
            total_yaw: 0.0,
            speeds: CameraSpeeds::default(),
            view_matrix: Matrix4::identity(),
            inverse_view_matrix: Matrix4::identity(),
            projection_matrix: Matrix4::identity(),
        };
        cam.calculate_projection_matrix();
        cam.calculate_view_matrix();
        cam
    }
}

impl Camera {
    /// Pitch never reaches straight up or down.
    pub const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

    pub fn new(width: usize, height: usize, fov_degrees: f32, origin: Point3<f32>) -> Self {
        let mut cam = Self::default();
        cam.initialize(width, height, fov_degrees, origin);
        cam
    }

    /// Sets aspect ratio, field of view and origin, then rebuilds both matrices.
    pub fn initialize(&mut self, width: usize, height: usize, fov_degrees: f32, origin: Point3<f32>) {
        self.aspect_ratio = width as f32 / height.max(1) as f32;
        self.fov_angle = fov_degrees;
        self.fov = (fov_degrees.to_radians() / 2.0).tan();
        self.origin = origin;

        self.calculate_projection_matrix();
        self.calculate_view_matrix();
    }

    /// Viewport change: only the projection depends on the aspect ratio.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.aspect_ratio = width as f32 / height.max(1) as f32;
        self.calculate_projection_matrix();
    }

    /// Sets near/far planes and rebuilds the projection.
    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
        self.calculate_projection_matrix();
    }

    /// Advances the camera by one frame of input.
    ///
    /// Returns whether the view changed.
    pub fn update(&mut self, elapsed_seconds: f32, input: &FrameInput) -> bool {
        if input.is_idle() {
            return false;
        }

        self.origin += self.right * input.pan.x * self.speeds.pan;
        self.origin += self.up * input.pan.y * self.speeds.pan;
        self.origin += self.forward * input.pan.z * self.speeds.pan;

        self.total_yaw += input.rotation.x * self.speeds.rotation;
        self.total_pitch -= input.rotation.y * self.speeds.rotation;
        self.total_pitch = self.total_pitch.clamp(-Self::MAX_PITCH, Self::MAX_PITCH);

        let speed = if input.fast {
            self.speeds.movement * 2.0
        } else {
            self.speeds.movement
        };
        self.origin += self.forward * input.movement.y * speed * elapsed_seconds;
        self.origin += self.right * input.movement.x * speed * elapsed_seconds;

        self.calculate_view_matrix();
        true
    }

    /// Rebuilds the basis from yaw/pitch and the view matrices from it.
    fn calculate_view_matrix(&mut self) {
        let rotation = TransformFactory::rotation(self.total_pitch, self.total_yaw, 0.0);
        self.forward = transform_vector(&rotation, &Vector3::z()).normalize();
        self.right = Vector3::y().cross(&self.forward).normalize();
        self.up = self.forward.cross(&self.right).normalize();

        self.view_matrix = TransformFactory::basis(&self.right, &self.up, &self.forward, &self.origin);
        self.inverse_view_matrix = TransformFactory::rigid_inverse(&self.view_matrix);
    }

    fn calculate_projection_matrix(&mut self) {
        self.projection_matrix =
            TransformFactory::perspective_fov_lh(self.fov, self.aspect_ratio, self.near, self.far);
    }

    /// Camera-to-world.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view_matrix
    }

    /// World-to-camera.
    pub fn inverse_view_matrix(&self) -> Matrix4<f32> {
        self.inverse_view_matrix
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix
    }

    pub fn world_view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix * self.inverse_view_matrix
    }

    pub fn snapshot(&self) -> CameraSnapshot {
        CameraSnapshot {
            inverse_view: self.inverse_view_matrix,
            projection: self.projection_matrix,
            origin: self.origin,
        }
    }
}
