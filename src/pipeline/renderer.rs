use crate::core::color::Color;
use crate::core::framebuffer::FrameBuffer;
use crate::core::geometry::TransformedVertex;
use crate::core::pipeline::RenderSettings;
use crate::core::rasterizer::Rasterizer;
use crate::pipeline::shader::Shader;
use crate::pipeline::vertex::VertexTransformer;
use crate::scene::camera::CameraSnapshot;
use crate::scene::mesh::{Mesh, TextureSlot};
use log::{debug, info};
use nalgebra::Vector3;
use std::fmt;

/// Reasons a frame cannot be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The active shading or normal-mapping mode needs a texture the mesh lacks.
    MissingTexture { mesh: String, slot: TextureSlot },
    /// An index points past the end of the vertex list.
    IndexOutOfRange {
        mesh: String,
        index: usize,
        vertex_count: usize,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::MissingTexture { mesh, slot } => {
                write!(f, "mesh '{}' has no {} map bound", mesh, slot)
            }
            RenderError::IndexOutOfRange {
                mesh,
                index,
                vertex_count,
            } => write!(
                f,
                "mesh '{}' references vertex {} but only has {}",
                mesh, index, vertex_count
            ),
        }
    }
}

impl std::error::Error for RenderError {}

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub meshes_drawn: usize,
    /// Triangles assembled from drawn meshes, including those the rasterizer
    /// then rejects as degenerate, out of the depth band or culled.
    pub triangles: usize,
    pub pixels_written: usize,
}

/// Capability shared by every render backend.
///
/// Only the software rasterizer is provided here; other backends plug in at
/// composition time behind the same interface.
pub trait RenderBackend {
    /// Clears the target and draws every eligible mesh as seen from `camera`.
    fn render(&mut self, camera: &CameraSnapshot, meshes: &[Mesh]) -> Result<FrameStats, RenderError>;
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn set_background_color(&mut self, color: Color);
}

/// The high-level renderer that orchestrates the pipeline stages on the CPU.
pub struct SoftwareRenderer {
    pub rasterizer: Rasterizer,
    pub framebuffer: FrameBuffer,
    pub shader: Shader,
    transformer: VertexTransformer,
    settings: RenderSettings,
    background: Color,
    /// Per-mesh transform output, reused across meshes and frames.
    scratch: Vec<TransformedVertex>,
}

impl SoftwareRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            rasterizer: Rasterizer::new(),
            framebuffer: FrameBuffer::new(width, height),
            shader: Shader::default(),
            transformer: VertexTransformer::new(width, height),
            settings: RenderSettings::default(),
            background: Vector3::new(0.39, 0.39, 0.39),
            scratch: Vec::new(),
        }
    }

    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_shader(mut self, shader: Shader) -> Self {
        self.shader = shader;
        self
    }

    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    /// Reallocates the color and depth buffers for a new viewport size.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.framebuffer = FrameBuffer::new(width, height);
        self.transformer = VertexTransformer::new(width, height);
    }

    pub fn cycle_view_mode(&mut self) {
        self.settings = self.settings.with_next_view_mode();
        info!("View mode: {:?}", self.settings.view_mode);
    }

    pub fn cycle_shading_mode(&mut self) {
        self.settings = self.settings.with_next_shading_mode();
        info!("Shading mode: {}", self.settings.shading_mode);
    }

    pub fn toggle_normal_map(&mut self) {
        self.settings = self.settings.with_normal_mapping_toggled();
        info!("Normal mapping: {}", self.settings.normal_mapping);
    }

    pub fn toggle_bounding_box(&mut self) {
        self.settings = self.settings.with_bounding_box_toggled();
        info!("Bounding box view: {}", self.settings.show_bounding_box);
    }

    fn validate_indices(mesh: &Mesh) -> Result<(), RenderError> {
        let vertex_count = mesh.vertices.len();
        match mesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
            Some(&index) => Err(RenderError::IndexOutOfRange {
                mesh: mesh.name.clone(),
                index: index as usize,
                vertex_count,
            }),
            None => Ok(()),
        }
    }
}

impl RenderBackend for SoftwareRenderer {
    fn render(&mut self, camera: &CameraSnapshot, meshes: &[Mesh]) -> Result<FrameStats, RenderError> {
        // Toggles never change mid-frame.
        let settings = self.settings;

        // Every mesh is checked before the target is touched, so a failed
        // frame leaves the previous one intact.
        let bound = meshes
            .iter()
            .filter(|m| m.is_drawable())
            .map(|mesh| -> Result<_, RenderError> {
                Self::validate_indices(mesh)?;
                Ok((mesh, self.shader.bind(mesh, &settings)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.framebuffer.clear(self.background);
        let mut stats = FrameStats::default();

        for (mesh, shader) in &bound {
            self.transformer.transform(mesh, camera, &mut self.scratch);

            for [i0, i1, i2] in mesh.triangles() {
                stats.triangles += 1;
                stats.pixels_written += self.rasterizer.rasterize_triangle(
                    &mut self.framebuffer,
                    [&self.scratch[i0], &self.scratch[i1], &self.scratch[i2]],
                    mesh.cull_mode,
                    &settings,
                    shader,
                );
            }
            stats.meshes_drawn += 1;
        }

        debug!(
            "Frame: {} meshes, {} triangles, {} pixels",
            stats.meshes_drawn, stats.triangles, stats.pixels_written
        );
        Ok(stats)
    }

    fn width(&self) -> usize {
        self.framebuffer.width
    }

    fn height(&self) -> usize {
        self.framebuffer.height
    }

    fn set_background_color(&mut self, color: Color) {
        self.background = color;
    }
}
