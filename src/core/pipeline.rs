use crate::core::color::Color;
use nalgebra::{Vector2, Vector3};
use std::fmt;
use std::str::FromStr;

/// What the rasterizer writes for a covered pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Shaded color.
    #[default]
    FinalColor,
    /// Greyscale visualization of the interpolated depth.
    DepthBuffer,
}

impl ViewMode {
    pub fn next(self) -> Self {
        match self {
            ViewMode::FinalColor => ViewMode::DepthBuffer,
            ViewMode::DepthBuffer => ViewMode::FinalColor,
        }
    }
}

/// Reflectance model used by the pixel shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingMode {
    ObservedArea,
    Diffuse,
    Specular,
    #[default]
    Combined,
}

impl ShadingMode {
    /// Round-robin: observed area -> diffuse -> specular -> combined.
    pub fn next(self) -> Self {
        match self {
            ShadingMode::ObservedArea => ShadingMode::Diffuse,
            ShadingMode::Diffuse => ShadingMode::Specular,
            ShadingMode::Specular => ShadingMode::Combined,
            ShadingMode::Combined => ShadingMode::ObservedArea,
        }
    }
}

impl fmt::Display for ShadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShadingMode::ObservedArea => "observed_area",
            ShadingMode::Diffuse => "diffuse",
            ShadingMode::Specular => "specular",
            ShadingMode::Combined => "combined",
        };
        f.write_str(name)
    }
}

impl FromStr for ShadingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "observed_area" | "observedarea" => Ok(ShadingMode::ObservedArea),
            "diffuse" => Ok(ShadingMode::Diffuse),
            "specular" | "phong" => Ok(ShadingMode::Specular),
            "combined" => Ok(ShadingMode::Combined),
            other => Err(format!("Unknown shading mode: '{}'", other)),
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "color" | "final_color" => Ok(ViewMode::FinalColor),
            "depth" | "depth_buffer" => Ok(ViewMode::DepthBuffer),
            other => Err(format!("Unknown view mode: '{}'", other)),
        }
    }
}

/// All renderer toggles in one value.
///
/// Held immutably for the duration of a frame; toggling produces a new value
/// that replaces the old one wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub view_mode: ViewMode,
    pub shading_mode: ShadingMode,
    pub normal_mapping: bool,
    pub show_bounding_box: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::FinalColor,
            shading_mode: ShadingMode::Combined,
            normal_mapping: true,
            show_bounding_box: false,
        }
    }
}

impl RenderSettings {
    pub fn with_next_view_mode(self) -> Self {
        Self {
            view_mode: self.view_mode.next(),
            ..self
        }
    }

    pub fn with_next_shading_mode(self) -> Self {
        Self {
            shading_mode: self.shading_mode.next(),
            ..self
        }
    }

    pub fn with_normal_mapping_toggled(self) -> Self {
        Self {
            normal_mapping: !self.normal_mapping,
            ..self
        }
    }

    pub fn with_bounding_box_toggled(self) -> Self {
        Self {
            show_bounding_box: !self.show_bounding_box,
            ..self
        }
    }

    /// Whether covered pixels go through the fragment shader. The depth and
    /// bounding-box views never sample a texture.
    pub fn shades_fragments(self) -> bool {
        self.view_mode == ViewMode::FinalColor && !self.show_bounding_box
    }
}

/// Interpolated attributes of one covered pixel.
#[derive(Debug, Clone, Copy)]
pub struct Fragment {
    /// Affine blend of the vertices' (screen x, screen y, depth).
    pub position: Vector3<f32>,
    pub color: Color,
    /// Perspective-correct UV.
    pub uv: Vector2<f32>,
    /// Normalized, affinely interpolated world-space normal.
    pub normal: Vector3<f32>,
    /// Normalized, affinely interpolated world-space tangent.
    pub tangent: Vector3<f32>,
    /// Normalized, affinely interpolated view direction.
    pub view_direction: Vector3<f32>,
    /// Perspective-correct depth in (0, 1].
    pub depth: f32,
}

/// Per-pixel shading stage.
///
/// Returns the color before the ambient term and the final clamp, which the
/// rasterizer applies uniformly to every written pixel.
pub trait FragmentShader {
    fn shade(&self, fragment: &Fragment) -> Color;
}

impl<F> FragmentShader for F
where
    F: Fn(&Fragment) -> Color,
{
    fn shade(&self, fragment: &Fragment) -> Color {
        self(fragment)
    }
}
