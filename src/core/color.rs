use nalgebra::Vector3;

/// Linear RGB color, nominally in [0, 1] per channel.
pub type Color = Vector3<f32>;

pub const WHITE: Color = Vector3::new(1.0, 1.0, 1.0);

/// Scales the color down so that its brightest channel is exactly 1.0.
/// Colors whose channels are all <= 1.0 are returned unchanged, so the
/// channel ratios (hue) are always preserved.
#[inline]
pub fn max_to_one(color: Color) -> Color {
    let max = color.x.max(color.y).max(color.z);
    if max > 1.0 { color / max } else { color }
}

/// Packs a color into an ARGB `u32` word with alpha forced to 0xFF,
/// the layout expected by presentation surfaces.
#[inline]
pub fn pack_argb(color: Color) -> u32 {
    let r = (color.x.clamp(0.0, 1.0) * 255.0) as u32;
    let g = (color.y.clamp(0.0, 1.0) * 255.0) as u32;
    let b = (color.z.clamp(0.0, 1.0) * 255.0) as u32;
    (255 << 24) | (r << 16) | (g << 8) | b
}

/// Builds a grey color from a single intensity.
#[inline]
pub fn grey(value: f32) -> Color {
    Vector3::new(value, value, value)
}
