use crate::core::pipeline::{RenderSettings, ShadingMode, ViewMode};
use crate::scene::input::FrameInput;
use nalgebra::{Vector2, Vector3};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub shading: ShadingConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default = "default_objects")]
    pub objects: Vec<ObjectConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            camera: CameraConfig::default(),
            shading: ShadingConfig::default(),
            input: InputConfig::default(),
            objects: default_objects(),
        }
    }
}

fn default_objects() -> Vec<ObjectConfig> {
    vec![ObjectConfig {
        source: "cube".to_string(),
        rotation: [25.0, 35.0, 0.0],
        scale: [2.0, 2.0, 2.0],
        procedural_maps: true,
        ..ObjectConfig::default()
    }]
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    // --- Output ---
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_frames")]
    pub frames: usize,
    /// Seconds advanced per frame of the headless loop.
    #[serde(default = "default_frame_time")]
    pub frame_time: f32,
    #[serde(default = "default_background")]
    pub background_color: [f32; 3],

    // --- Pipeline & Debug ---
    #[serde(default = "default_view_mode")]
    pub view_mode: String, // "color", "depth"
    #[serde(default = "default_shading_mode")]
    pub shading_mode: String, // "observed_area", "diffuse", "specular", "combined"
    #[serde(default = "default_true")]
    pub normal_mapping: bool,
    #[serde(default = "default_false")]
    pub show_bounding_box: bool,
    #[serde(default = "default_depth_band")]
    pub depth_band: [f32; 2],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            output: default_output(),
            frames: default_frames(),
            frame_time: default_frame_time(),
            background_color: default_background(),
            view_mode: default_view_mode(),
            shading_mode: default_shading_mode(),
            normal_mapping: true,
            show_bounding_box: false,
            depth_band: default_depth_band(),
        }
    }
}

fn default_width() -> usize {
    640
}
fn default_height() -> usize {
    480
}
fn default_output() -> String {
    "output.png".to_string()
}
fn default_frames() -> usize {
    1
}
fn default_frame_time() -> f32 {
    1.0 / 60.0
}
fn default_background() -> [f32; 3] {
    [0.39, 0.39, 0.39]
}
fn default_view_mode() -> String {
    "color".to_string()
}
fn default_shading_mode() -> String {
    "combined".to_string()
}
fn default_depth_band() -> [f32; 2] {
    [0.985, 1.0]
}
fn default_false() -> bool {
    false
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_origin")]
    pub origin: [f32; 3],
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default = "default_movement_speed")]
    pub movement_speed: f32,
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f32,
    #[serde(default = "default_pan_speed")]
    pub pan_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            origin: default_camera_origin(),
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
            movement_speed: default_movement_speed(),
            rotation_speed: default_rotation_speed(),
            pan_speed: default_pan_speed(),
        }
    }
}

fn default_camera_origin() -> [f32; 3] {
    [0.0, 0.0, -5.0]
}
fn default_fov() -> f32 {
    45.0
}
fn default_near() -> f32 {
    1.0
}
fn default_far() -> f32 {
    100.0
}
fn default_movement_speed() -> f32 {
    50.0
}
fn default_rotation_speed() -> f32 {
    0.004
}
fn default_pan_speed() -> f32 {
    0.02
}

#[derive(Debug, Deserialize)]
pub struct ShadingConfig {
    /// Direction the light travels; normalized on load.
    #[serde(default = "default_light_direction")]
    pub light_direction: [f32; 3],
    #[serde(default = "default_light_intensity")]
    pub light_intensity: f32,
    #[serde(default = "default_shininess")]
    pub shininess: f32,
    #[serde(default = "default_ambient")]
    pub ambient: f32,
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            light_direction: default_light_direction(),
            light_intensity: default_light_intensity(),
            shininess: default_shininess(),
            ambient: default_ambient(),
        }
    }
}

fn default_light_direction() -> [f32; 3] {
    [0.577, -0.577, 0.577]
}
fn default_light_intensity() -> f32 {
    7.0
}
fn default_shininess() -> f32 {
    25.0
}
fn default_ambient() -> f32 {
    0.025
}

/// Scripted per-frame input for the headless loop.
#[derive(Debug, Deserialize, Default)]
pub struct InputConfig {
    #[serde(default)]
    pub movement: [f32; 2],
    #[serde(default)]
    pub rotation: [f32; 2],
    #[serde(default)]
    pub pan: [f32; 3],
    #[serde(default)]
    pub fast: bool,
    /// Spins every mesh about its own Y axis.
    #[serde(default)]
    pub rotate: bool,
}

impl InputConfig {
    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            movement: Vector2::from(self.movement),
            rotation: Vector2::from(self.rotation),
            pan: Vector3::from(self.pan),
            fast: self.fast,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ObjectConfig {
    /// `quad`, `cube`, `triangle` or a path to an `.obj` file.
    #[serde(default = "default_source")]
    pub source: String,
    pub name: Option<String>,

    // --- Transform ---
    #[serde(default)]
    pub position: [f32; 3],
    /// Euler angles in degrees.
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],

    // --- Geometry & Pipeline ---
    pub topology: Option<String>, // "list", "strip"
    #[serde(default = "default_cull_mode")]
    pub cull_mode: String, // "back", "front", "none"
    #[serde(default = "default_true")]
    pub visible: bool,
    /// `false` keeps the mesh out of the CPU rasterizer.
    #[serde(default = "default_true")]
    pub software: bool,
    /// Converts OBJ data from right-handed to the renderer's left-handed space.
    #[serde(default = "default_true")]
    pub flip_handedness: bool,
    /// Overrides every vertex's base color.
    pub color: Option<[f32; 3]>,

    // --- Textures ---
    pub diffuse_texture: Option<String>,
    pub normal_texture: Option<String>,
    pub specular_texture: Option<String>,
    pub glossiness_texture: Option<String>,
    /// Fills every unbound slot with a generated map.
    #[serde(default = "default_false")]
    pub procedural_maps: bool,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            name: None,
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: default_scale(),
            topology: None,
            cull_mode: default_cull_mode(),
            visible: true,
            software: true,
            flip_handedness: true,
            color: None,
            diffuse_texture: None,
            normal_texture: None,
            specular_texture: None,
            glossiness_texture: None,
            procedural_maps: false,
        }
    }
}

fn default_source() -> String {
    "cube".to_string()
}
fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_cull_mode() -> String {
    "back".to_string()
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Builds the initial renderer toggles from the `[render]` section.
    pub fn render_settings(&self) -> Result<RenderSettings, String> {
        Ok(RenderSettings {
            view_mode: self.render.view_mode.parse::<ViewMode>()?,
            shading_mode: self.render.shading_mode.parse::<ShadingMode>()?,
            normal_mapping: self.render.normal_mapping,
            show_bounding_box: self.render.show_bounding_box,
        })
    }
}
