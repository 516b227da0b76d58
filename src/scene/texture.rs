use crate::core::color::Color;
use image::{Rgb, RgbImage};
use log::info;
use nalgebra::{Vector2, Vector3};
use std::path::Path;

/// Represents a 2D texture map.
///
/// Sampling is nearest-texel with repeat wrapping; there is no filtering,
/// no mipmapping and no color-space conversion. Textures are immutable once
/// built and shared between meshes through `Arc`.
#[derive(Debug, Clone)]
pub struct Texture {
    pub image: RgbImage,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path_ref = path.as_ref();
        let img = image::open(path_ref)
            .map_err(|e| format!("Failed to load texture {:?}: {}", path_ref, e))?
            .to_rgb8();

        info!(
            "Loaded texture: {:?} ({}x{})",
            path_ref,
            img.width(),
            img.height()
        );

        Self::from_image(img)
    }

    pub fn from_image(image: RgbImage) -> Result<Self, String> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err("Texture has zero size".to_string());
        }
        Ok(Self {
            image,
            width,
            height,
        })
    }

    /// Builds a texture by evaluating `f(x, y)` for every texel.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> Color) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let image = RgbImage::from_fn(width, height, |x, y| to_rgb8(f(x, y)));
        Self {
            image,
            width,
            height,
        }
    }

    /// A 1x1 texture of a single color.
    pub fn solid(color: Color) -> Self {
        Self::from_fn(1, 1, |_, _| color)
    }

    /// Two-color checkerboard with `cells` squares per side.
    pub fn checkerboard(size: u32, cells: u32, a: Color, b: Color) -> Self {
        let cell = (size / cells.max(1)).max(1);
        Self::from_fn(size, size, |x, y| {
            if ((x / cell) + (y / cell)) % 2 == 0 { a } else { b }
        })
    }

    /// A tangent-space normal map whose every texel encodes +Z (no perturbation).
    pub fn flat_normal_map() -> Self {
        Self::solid(Vector3::new(0.5, 0.5, 1.0))
    }

    /// Samples the texel under `uv`. UV is wrapped into [0, 1) first.
    pub fn sample(&self, uv: &Vector2<f32>) -> Color {
        let u = uv.x - uv.x.floor();
        let v = uv.y - uv.y.floor();

        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);

        let Rgb([r, g, b]) = *self.image.get_pixel(x, y);
        Vector3::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }
}

fn to_rgb8(color: Color) -> Rgb<u8> {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgb([channel(color.x), channel(color.y), channel(color.z)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadrants() -> Texture {
        Texture::from_fn(2, 2, |x, y| match (x, y) {
            (0, 0) => Vector3::new(1.0, 0.0, 0.0),
            (1, 0) => Vector3::new(0.0, 1.0, 0.0),
            (0, 1) => Vector3::new(0.0, 0.0, 1.0),
            _ => Vector3::new(1.0, 1.0, 1.0),
        })
    }

    #[test]
    fn sample_is_nearest_texel() {
        let tex = quadrants();
        assert_eq!(tex.sample(&Vector2::new(0.1, 0.1)), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(tex.sample(&Vector2::new(0.9, 0.1)), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(tex.sample(&Vector2::new(0.1, 0.9)), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn sample_wraps_uv() {
        let tex = quadrants();
        assert_eq!(
            tex.sample(&Vector2::new(1.1, -0.9)),
            tex.sample(&Vector2::new(0.1, 0.1))
        );
        assert_eq!(
            tex.sample(&Vector2::new(1.0, 1.0)),
            tex.sample(&Vector2::new(0.0, 0.0))
        );
    }

    #[test]
    fn flat_normal_map_decodes_to_plus_z() {
        let s = Texture::flat_normal_map().sample(&Vector2::new(0.3, 0.7));
        let decoded = s * 2.0 - Vector3::new(1.0, 1.0, 1.0);
        assert!((decoded - Vector3::z()).norm() < 0.01);
    }

    #[test]
    fn empty_image_is_rejected() {
        assert!(Texture::from_image(RgbImage::new(0, 4)).is_err());
    }
}
