use crate::core::color::{Color, WHITE, max_to_one};
use crate::core::pipeline::{Fragment, FragmentShader, RenderSettings, ShadingMode};
use crate::pipeline::renderer::RenderError;
use crate::scene::mesh::{Mesh, TextureSlot};
use crate::scene::texture::Texture;
use nalgebra::{Vector2, Vector3};
use std::f32::consts::PI;

/// Fixed directional light and the Phong constants shared by every mesh.
#[derive(Debug, Clone, Copy)]
pub struct Shader {
    /// Direction the light travels, unit length.
    pub light_direction: Vector3<f32>,
    pub light_intensity: f32,
    /// Scales the glossiness sample into a Phong exponent.
    pub shininess: f32,
}

impl Default for Shader {
    fn default() -> Self {
        Self {
            light_direction: Vector3::new(0.577, -0.577, 0.577),
            light_intensity: 7.0,
            shininess: 25.0,
        }
    }
}

/// Specular color and glossiness maps, both required for Phong terms.
#[derive(Debug, Clone, Copy)]
pub struct PhongMaps<'a> {
    pub specular: &'a Texture,
    pub glossiness: &'a Texture,
}

/// A shading mode with the maps it needs already resolved.
#[derive(Debug, Clone, Copy)]
pub enum Reflectance<'a> {
    ObservedArea,
    Diffuse,
    Specular(PhongMaps<'a>),
    Combined(PhongMaps<'a>),
}

/// Shader state bound to one mesh for one frame.
#[derive(Debug, Clone, Copy)]
pub struct MeshShader<'a> {
    shader: &'a Shader,
    reflectance: Reflectance<'a>,
    diffuse_map: Option<&'a Texture>,
    normal_map: Option<&'a Texture>,
}

fn require<'a>(mesh: &'a Mesh, slot: TextureSlot) -> Result<&'a Texture, RenderError> {
    mesh.textures
        .get(slot)
        .ok_or_else(|| RenderError::MissingTexture {
            mesh: mesh.name.clone(),
            slot,
        })
}

/// Mirrors `v` about `n`: `v - 2 (v . n) n`.
#[inline]
pub fn reflect(v: &Vector3<f32>, n: &Vector3<f32>) -> Vector3<f32> {
    v - n * (2.0 * v.dot(n))
}

impl Shader {
    pub fn new(light_direction: Vector3<f32>, light_intensity: f32, shininess: f32) -> Self {
        Self {
            light_direction: light_direction.normalize(),
            light_intensity,
            shininess,
        }
    }

    /// Resolves the textures `settings` requires from `mesh`.
    ///
    /// Fails before any pixel is shaded when a required map is not bound.
    /// Views that never shade require no maps.
    pub fn bind<'a>(
        &'a self,
        mesh: &'a Mesh,
        settings: &RenderSettings,
    ) -> Result<MeshShader<'a>, RenderError> {
        if !settings.shades_fragments() {
            return Ok(MeshShader {
                shader: self,
                reflectance: Reflectance::ObservedArea,
                diffuse_map: None,
                normal_map: None,
            });
        }

        let normal_map = if settings.normal_mapping {
            Some(require(mesh, TextureSlot::Normal)?)
        } else {
            None
        };

        let phong_maps = || -> Result<PhongMaps<'a>, RenderError> {
            Ok(PhongMaps {
                specular: require(mesh, TextureSlot::Specular)?,
                glossiness: require(mesh, TextureSlot::Glossiness)?,
            })
        };

        let reflectance = match settings.shading_mode {
            ShadingMode::ObservedArea => Reflectance::ObservedArea,
            ShadingMode::Diffuse => Reflectance::Diffuse,
            ShadingMode::Specular => Reflectance::Specular(phong_maps()?),
            ShadingMode::Combined => Reflectance::Combined(phong_maps()?),
        };

        Ok(MeshShader {
            shader: self,
            reflectance,
            diffuse_map: mesh.textures.get(TextureSlot::Diffuse),
            normal_map,
        })
    }

    /// Cosine between the surface normal and the direction towards the light.
    #[inline]
    pub fn observed_area(&self, normal: &Vector3<f32>) -> f32 {
        normal.dot(&-self.light_direction).max(0.0)
    }

    /// Lambert BRDF scaled by the light intensity.
    #[inline]
    pub fn lambert(&self, base: &Color) -> Color {
        base * self.light_intensity / PI
    }

    /// Phong specular term.
    pub fn phong(
        &self,
        maps: &PhongMaps<'_>,
        uv: &Vector2<f32>,
        normal: &Vector3<f32>,
        view_direction: &Vector3<f32>,
    ) -> Color {
        let exponent = max_to_one(maps.glossiness.sample(uv)).x * self.shininess;
        let specular_color = maps.specular.sample(uv);

        let reflected = reflect(&self.light_direction, normal);
        let angle = reflected.dot(view_direction).max(0.0);
        specular_color * angle.powf(exponent)
    }
}

impl<'a> MeshShader<'a> {
    pub fn reflectance(&self) -> Reflectance<'a> {
        self.reflectance
    }

    /// The interpolated normal, or the normal map sample moved into world
    /// space through the tangent frame.
    fn surface_normal(&self, fragment: &Fragment) -> Vector3<f32> {
        let Some(normal_map) = self.normal_map else {
            return fragment.normal;
        };

        let n = fragment.normal;
        let t = fragment.tangent;
        let b = n.cross(&t).normalize();

        let sample = normal_map.sample(&fragment.uv) * 2.0 - Vector3::new(1.0, 1.0, 1.0);
        (t * sample.x + b * sample.y + n * sample.z).normalize()
    }

    fn base_color(&self, fragment: &Fragment) -> Color {
        match self.diffuse_map {
            Some(map) => map.sample(&fragment.uv),
            None => fragment.color,
        }
    }
}

impl FragmentShader for MeshShader<'_> {
    fn shade(&self, fragment: &Fragment) -> Color {
        let shader = self.shader;
        let normal = self.surface_normal(fragment);

        match &self.reflectance {
            Reflectance::ObservedArea => WHITE * shader.observed_area(&normal),
            Reflectance::Diffuse => shader.lambert(&self.base_color(fragment)),
            Reflectance::Specular(maps) => {
                shader.phong(maps, &fragment.uv, &normal, &fragment.view_direction)
            }
            Reflectance::Combined(maps) => {
                let diffuse = shader.lambert(&max_to_one(self.base_color(fragment)));
                let specular = shader.phong(maps, &fragment.uv, &normal, &fragment.view_direction);
                max_to_one(diffuse * shader.observed_area(&normal) + specular)
            }
        }
    }
}
