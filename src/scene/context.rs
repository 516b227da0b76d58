use crate::scene::camera::{Camera, CameraSnapshot};
use crate::scene::input::FrameInput;
use crate::scene::mesh::Mesh;
use crate::scene::scene_object::Placement;
use log::info;
use std::f32::consts::PI;

/// Holds all scene resources required for rendering.
pub struct Scene {
    pub camera: Camera,
    pub meshes: Vec<Mesh>,
    placements: Vec<Placement>,
    pub rotation_enabled: bool,
    /// Accumulated spin angle in radians.
    spin: f32,
}

impl Scene {
    /// Radians per second while rotation is enabled.
    pub const SPIN_SPEED: f32 = PI;

    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            meshes: Vec::new(),
            placements: Vec::new(),
            rotation_enabled: false,
            spin: 0.0,
        }
    }

    pub fn add_mesh(&mut self, mut mesh: Mesh, placement: Placement) {
        mesh.set_world_matrix(placement.matrix(self.spin));
        self.meshes.push(mesh);
        self.placements.push(placement);
    }

    /// Advances the camera and, when enabled, the spin of every mesh.
    pub fn update(&mut self, elapsed_seconds: f32, input: &FrameInput) {
        self.camera.update(elapsed_seconds, input);

        if self.rotation_enabled {
            self.spin = (self.spin + Self::SPIN_SPEED * elapsed_seconds) % (2.0 * PI);
            for (mesh, placement) in self.meshes.iter_mut().zip(&self.placements) {
                mesh.set_world_matrix(placement.matrix(self.spin));
            }
        }
    }

    pub fn toggle_rotation(&mut self) {
        self.rotation_enabled = !self.rotation_enabled;
        info!("Rotation: {}", self.rotation_enabled);
    }

    /// Back -> Front -> None -> Back on every mesh.
    pub fn cycle_cull_modes(&mut self) {
        for mesh in &mut self.meshes {
            mesh.cycle_cull_mode();
        }
        if let Some(first) = self.meshes.first() {
            info!("Cull mode: {:?}", first.cull_mode);
        }
    }

    pub fn snapshot(&self) -> CameraSnapshot {
        self.camera.snapshot()
    }
}
