use crate::core::color::{Color, pack_argb};
use nalgebra::Vector3;
use rayon::prelude::*;

/// Represents a 2D buffer containing color and depth information.
///
/// Both buffers are row-major and sized `width * height`. The renderer owns
/// the framebuffer exclusively for the duration of a frame.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,

    pub color_buffer: Vec<Color>,

    /// `f32::MAX` means "nothing drawn yet".
    pub depth_buffer: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            color_buffer: vec![Vector3::zeros(); size],
            depth_buffer: vec![f32::MAX; size],
        }
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Resets depth to the maximum representable value and fills the color
    /// buffer with `background`.
    pub fn clear(&mut self, background: Color) {
        self.depth_buffer.fill(f32::MAX);
        self.color_buffer.fill(background);
    }

    /// Unconditional overwrite. Callers must have passed the depth test.
    #[inline]
    pub fn write_pixel(&mut self, x: usize, y: usize, color: Color, depth: f32) {
        let idx = self.index(x, y);
        self.color_buffer[idx] = color;
        self.depth_buffer[idx] = depth;
    }

    /// Writes color only, leaving the depth buffer untouched (debug overlays).
    #[inline]
    pub fn write_color(&mut self, x: usize, y: usize, color: Color) {
        let idx = self.index(x, y);
        self.color_buffer[idx] = color;
    }

    #[inline]
    pub fn depth_at(&self, x: usize, y: usize) -> f32 {
        self.depth_buffer[self.index(x, y)]
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.color_buffer[self.index(x, y)])
    }

    /// Packs the finished frame into ARGB words, one row per rayon task.
    /// Only reads the color buffer, so it never overlaps a frame's writes.
    pub fn to_argb_buffer(&self, buffer: &mut [u32]) {
        if self.width == 0 {
            return;
        }
        buffer
            .par_chunks_mut(self.width)
            .zip(self.color_buffer.par_chunks(self.width))
            .for_each(|(row_out, row_in)| {
                for (pixel, color) in row_out.iter_mut().zip(row_in) {
                    *pixel = pack_argb(*color);
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_resets_color_and_depth() {
        let mut fb = FrameBuffer::new(4, 3);
        fb.write_pixel(1, 2, Vector3::new(1.0, 0.0, 0.0), 0.5);
        let bg = Vector3::new(0.39, 0.39, 0.39);
        fb.clear(bg);
        assert!(fb.color_buffer.iter().all(|c| *c == bg));
        assert!(fb.depth_buffer.iter().all(|d| *d == f32::MAX));
    }

    #[test]
    fn write_pixel_is_row_major() {
        let mut fb = FrameBuffer::new(4, 3);
        fb.write_pixel(3, 1, Vector3::new(0.0, 1.0, 0.0), 0.25);
        assert_eq!(fb.color_buffer[1 * 4 + 3], Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(fb.depth_at(3, 1), 0.25);
        assert_eq!(fb.get_pixel(4, 0), None);
    }

    #[test]
    fn argb_buffer_matches_pixels() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.clear(Vector3::zeros());
        fb.write_pixel(1, 1, Vector3::new(1.0, 1.0, 1.0), 0.5);
        let mut out = vec![0u32; 4];
        fb.to_argb_buffer(&mut out);
        assert_eq!(out, vec![0xFF000000, 0xFF000000, 0xFF000000, 0xFFFFFFFF]);
    }

    #[test]
    fn empty_frame_packs_nothing() {
        let fb = FrameBuffer::new(0, 4);
        let mut out: Vec<u32> = Vec::new();
        fb.to_argb_buffer(&mut out);
        assert!(out.is_empty());
    }
}
