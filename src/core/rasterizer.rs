use crate::core::color::{Color, WHITE, grey, max_to_one};
use crate::core::framebuffer::FrameBuffer;
use crate::core::geometry::TransformedVertex;
use crate::core::math::interpolation::{
    EdgeFunctions, interpolate, interpolate_perspective, interpolate_reciprocal, signed_area_x2,
};
use crate::core::pipeline::{Fragment, FragmentShader, RenderSettings, ViewMode};
use nalgebra::{Vector2, Vector3};
use std::str::FromStr;

/// The Rasterizer is responsible for drawing triangles onto the FrameBuffer.
pub struct Rasterizer {
    /// Added to every shaded pixel before the final clamp.
    pub ambient: Color,
    /// `(near, far)` of the depth view's greyscale ramp.
    pub depth_band: (f32, f32),
}

#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub enum CullMode {
    #[default]
    Back,
    Front,
    None,
}

impl CullMode {
    /// Back -> Front -> None -> Back.
    pub fn next(self) -> Self {
        match self {
            CullMode::Back => CullMode::Front,
            CullMode::Front => CullMode::None,
            CullMode::None => CullMode::Back,
        }
    }

    /// Whether a triangle with the given doubled signed area survives culling.
    /// Zero-area triangles never survive.
    #[inline]
    pub fn keeps(self, signed_area: f32) -> bool {
        if signed_area == 0.0 {
            return false;
        }
        match self {
            CullMode::Back => signed_area > 0.0,
            CullMode::Front => signed_area < 0.0,
            CullMode::None => true,
        }
    }
}

impl FromStr for CullMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "back" => Ok(CullMode::Back),
            "front" => Ok(CullMode::Front),
            "none" => Ok(CullMode::None),
            other => Err(format!("Unknown cull mode: '{}'", other)),
        }
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            ambient: grey(0.025),
            depth_band: (0.985, 1.0),
        }
    }

    /// Rasterize a single screen-space triangle and return the number of
    /// pixels written.
    ///
    /// Triangles are rejected whole when degenerate, when any vertex depth
    /// lies outside the open (0, 1) band (no clipping is done), or when the
    /// cull mode discards their winding. Pixels are rejected by coverage and
    /// by the depth test; everything else is written with the ambient term
    /// added and `max_to_one` applied.
    pub fn rasterize_triangle<S: FragmentShader + ?Sized>(
        &self,
        framebuffer: &mut FrameBuffer,
        vertices: [&TransformedVertex; 3],
        cull_mode: CullMode,
        settings: &RenderSettings,
        shader: &S,
    ) -> usize {
        let [v0, v1, v2] = vertices;

        // 1. Degenerate rejection
        if v0.position == v1.position || v1.position == v2.position || v2.position == v0.position {
            return 0;
        }

        // 2. Coarse near/far rejection
        let in_band = |v: &TransformedVertex| v.position.z > 0.0 && v.position.z < 1.0;
        if !(in_band(v0) && in_band(v1) && in_band(v2)) {
            return 0;
        }

        // 3. Winding and culling
        let t0 = v0.screen_xy();
        let t1 = v1.screen_xy();
        let t2 = v2.screen_xy();
        if !cull_mode.keeps(signed_area_x2(t0, t1, t2)) {
            return 0;
        }
        let Some(edges) = EdgeFunctions::new(t0, t1, t2) else {
            return 0;
        };

        // 4. Bounding box, clamped to the screen
        let Some((start_x, start_y, end_x, end_y)) =
            self.compute_bounding_box(&[t0, t1, t2], framebuffer.width, framebuffer.height)
        else {
            return 0;
        };

        if settings.show_bounding_box {
            for y in start_y..end_y {
                for x in start_x..end_x {
                    framebuffer.write_color(x, y, WHITE);
                }
            }
            return (end_x - start_x) * (end_y - start_y);
        }

        let z = [v0.position.z, v1.position.z, v2.position.z];
        let w = [v0.position.w, v1.position.w, v2.position.w];
        let mut written = 0;

        // 5. Pixel Loop
        for y in start_y..end_y {
            for x in start_x..end_x {
                let pixel_center = Vector2::new(x as f32 + 0.5, y as f32 + 0.5);
                let Some(weights) = edges.weights(pixel_center) else {
                    continue;
                };

                // 6. Depth test: cheap affine reject first, then the
                // perspective-correct depth that is actually stored.
                let affine_z = interpolate(&weights, z[0], z[1], z[2]);
                if affine_z >= framebuffer.depth_at(x, y) || affine_z < f32::EPSILON {
                    continue;
                }
                let depth = interpolate_reciprocal(&weights, z[0], z[1], z[2]);
                if depth <= 0.0 || depth > 1.0 {
                    continue;
                }

                // 8. Shade or visualize depth
                let color = match settings.view_mode {
                    ViewMode::DepthBuffer => grey(self.remap_depth(depth)),
                    ViewMode::FinalColor => {
                        let fragment = Self::build_fragment(&weights, [v0, v1, v2], w, depth);
                        shader.shade(&fragment)
                    }
                };

                // 9. Ambient + clamp
                let color = max_to_one(color + self.ambient);
                framebuffer.write_pixel(x, y, color, depth);
                written += 1;
            }
        }

        written
    }

    /// UV is perspective-correct; normal, tangent, position and view
    /// direction are blended affinely with the screen-space weights.
    #[inline]
    fn build_fragment(
        weights: &Vector3<f32>,
        v: [&TransformedVertex; 3],
        w: [f32; 3],
        depth: f32,
    ) -> Fragment {
        let uv = interpolate_perspective(weights, [v[0].uv, v[1].uv, v[2].uv], w);
        let position = interpolate(
            weights,
            v[0].position.xyz(),
            v[1].position.xyz(),
            v[2].position.xyz(),
        );
        let color = interpolate(weights, v[0].color, v[1].color, v[2].color);
        let normal = interpolate(weights, v[0].normal, v[1].normal, v[2].normal);
        let tangent = interpolate(weights, v[0].tangent, v[1].tangent, v[2].tangent);
        let view_direction = interpolate(
            weights,
            v[0].view_direction,
            v[1].view_direction,
            v[2].view_direction,
        );

        Fragment {
            position,
            color,
            uv,
            normal: normal.normalize(),
            // Meshes without tangents keep a zero vector.
            tangent: tangent.try_normalize(f32::EPSILON).unwrap_or(tangent),
            view_direction: view_direction.normalize(),
            depth,
        }
    }

    /// Depth view grey level: `(far - near) / (far - depth)` over
    /// `depth_band`. Rises steeply towards `far` and exceeds 1 past `near`;
    /// the final `max_to_one` brings it back to white.
    #[inline]
    pub fn remap_depth(&self, depth: f32) -> f32 {
        let (near, far) = self.depth_band;
        let span = far - depth;
        if span <= 0.0 {
            return 1.0;
        }
        (far - near) / span
    }

    /// Integer pixel box `[start, end)` covering the triangle, clamped to the
    /// framebuffer. `None` when nothing of it is on screen.
    fn compute_bounding_box(
        &self,
        points: &[Vector2<f32>; 3],
        width: usize,
        height: usize,
    ) -> Option<(usize, usize, usize, usize)> {
        let min_x = points[0].x.min(points[1].x).min(points[2].x).floor() as i64;
        let min_y = points[0].y.min(points[1].y).min(points[2].y).floor() as i64;
        let max_x = points[0].x.max(points[1].x).max(points[2].x).ceil() as i64;
        let max_y = points[0].y.max(points[1].y).max(points[2].y).ceil() as i64;

        let start_x = min_x.max(0);
        let start_y = min_y.max(0);
        let end_x = max_x.min(width as i64);
        let end_y = max_y.min(height as i64);

        if start_x >= end_x || start_y >= end_y {
            return None;
        }
        Some((
            start_x as usize,
            start_y as usize,
            end_x as usize,
            end_y as usize,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector4;

    fn screen_vertex(x: f32, y: f32, z: f32) -> TransformedVertex {
        TransformedVertex {
            position: Vector4::new(x, y, z, 1.0),
            color: Vector3::new(1.0, 1.0, 1.0),
            normal: Vector3::new(0.0, 0.0, -1.0),
            tangent: Vector3::new(1.0, 0.0, 0.0),
            view_direction: Vector3::new(0.0, 0.0, -1.0),
            ..Default::default()
        }
    }

    fn flat(color: Color) -> impl Fn(&Fragment) -> Color {
        move |_: &Fragment| color
    }

    fn no_ambient() -> Rasterizer {
        Rasterizer {
            ambient: Vector3::zeros(),
            ..Rasterizer::new()
        }
    }

    fn covered(fb: &FrameBuffer) -> usize {
        fb.depth_buffer.iter().filter(|d| **d != f32::MAX).count()
    }

    #[test]
    fn right_triangle_coverage_is_deterministic() {
        let raster = Rasterizer::new();
        let settings = RenderSettings::default();
        let a = screen_vertex(0.0, 0.0, 0.5);
        let b = screen_vertex(10.0, 0.0, 0.5);
        let c = screen_vertex(0.0, 10.0, 0.5);

        let mut fb = FrameBuffer::new(32, 32);
        let written = raster.rasterize_triangle(
            &mut fb,
            [&a, &b, &c],
            CullMode::Back,
            &settings,
            &flat(WHITE),
        );
        // Pixel centers with x + y <= 9 (the hypotenuse itself is inclusive).
        assert_eq!(written, 55);
        assert_eq!(covered(&fb), 55);

        let mut again = FrameBuffer::new(32, 32);
        raster.rasterize_triangle(&mut again, [&a, &b, &c], CullMode::Back, &settings, &flat(WHITE));
        assert_eq!(fb.depth_buffer, again.depth_buffer);
    }

    #[test]
    fn degenerate_triangle_is_skipped() {
        let raster = Rasterizer::new();
        let a = screen_vertex(1.0, 1.0, 0.5);
        let b = screen_vertex(8.0, 1.0, 0.5);
        let mut fb = FrameBuffer::new(16, 16);
        let written = raster.rasterize_triangle(
            &mut fb,
            [&a, &b, &a],
            CullMode::None,
            &RenderSettings::default(),
            &flat(WHITE),
        );
        assert_eq!(written, 0);
    }

    #[test]
    fn depth_band_boundaries_are_open() {
        let raster = Rasterizer::new();
        for bad_z in [0.0, 1.0, -0.2, 1.3] {
            let a = screen_vertex(0.0, 0.0, bad_z);
            let b = screen_vertex(10.0, 0.0, 0.5);
            let c = screen_vertex(0.0, 10.0, 0.5);
            let mut fb = FrameBuffer::new(16, 16);
            let written = raster.rasterize_triangle(
                &mut fb,
                [&a, &b, &c],
                CullMode::None,
                &RenderSettings::default(),
                &flat(WHITE),
            );
            assert_eq!(written, 0, "z = {} must reject the triangle", bad_z);
            assert_eq!(covered(&fb), 0);
        }
    }

    #[test]
    fn cull_mode_selects_winding() {
        let a = screen_vertex(0.0, 0.0, 0.5);
        let b = screen_vertex(10.0, 0.0, 0.5);
        let c = screen_vertex(0.0, 10.0, 0.5);
        let raster = Rasterizer::new();
        let settings = RenderSettings::default();
        let count = |verts: [&TransformedVertex; 3], mode: CullMode| {
            let mut fb = FrameBuffer::new(16, 16);
            raster.rasterize_triangle(&mut fb, verts, mode, &settings, &flat(WHITE))
        };

        assert_eq!(count([&a, &b, &c], CullMode::Back), 55);
        assert_eq!(count([&a, &c, &b], CullMode::Back), 0);
        assert_eq!(count([&a, &b, &c], CullMode::Front), 0);
        assert_eq!(count([&a, &c, &b], CullMode::Front), 55);
        assert_eq!(count([&a, &b, &c], CullMode::None), 55);
        assert_eq!(count([&a, &c, &b], CullMode::None), 55);
    }

    #[test]
    fn closer_triangle_wins_regardless_of_draw_order() {
        let raster = no_ambient();
        let settings = RenderSettings::default();
        let near = [
            screen_vertex(0.0, 0.0, 0.3),
            screen_vertex(12.0, 0.0, 0.3),
            screen_vertex(0.0, 12.0, 0.3),
        ];
        let far = [
            screen_vertex(2.0, 2.0, 0.7),
            screen_vertex(16.0, 2.0, 0.7),
            screen_vertex(2.0, 16.0, 0.7),
        ];
        let red = flat(Vector3::new(1.0, 0.0, 0.0));
        let blue = flat(Vector3::new(0.0, 0.0, 1.0));

        let mut near_first = FrameBuffer::new(20, 20);
        near_first.clear(Vector3::zeros());
        raster.rasterize_triangle(&mut near_first, [&near[0], &near[1], &near[2]], CullMode::Back, &settings, &red);
        raster.rasterize_triangle(&mut near_first, [&far[0], &far[1], &far[2]], CullMode::Back, &settings, &blue);

        let mut far_first = FrameBuffer::new(20, 20);
        far_first.clear(Vector3::zeros());
        raster.rasterize_triangle(&mut far_first, [&far[0], &far[1], &far[2]], CullMode::Back, &settings, &blue);
        raster.rasterize_triangle(&mut far_first, [&near[0], &near[1], &near[2]], CullMode::Back, &settings, &red);

        assert_eq!(near_first.color_buffer, far_first.color_buffer);
        assert_eq!(near_first.depth_buffer, far_first.depth_buffer);
        // Overlap region belongs to the near triangle.
        assert_eq!(near_first.get_pixel(3, 3), Some(Vector3::new(1.0, 0.0, 0.0)));
        assert_eq!(near_first.get_pixel(12, 3), Some(Vector3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn ambient_is_added_and_clamped() {
        let raster = Rasterizer::new();
        let a = screen_vertex(0.0, 0.0, 0.5);
        let b = screen_vertex(10.0, 0.0, 0.5);
        let c = screen_vertex(0.0, 10.0, 0.5);
        let mut fb = FrameBuffer::new(16, 16);
        raster.rasterize_triangle(
            &mut fb,
            [&a, &b, &c],
            CullMode::Back,
            &RenderSettings::default(),
            &flat(Vector3::new(2.0, 1.0, 0.0)),
        );
        let pixel = fb.get_pixel(1, 1).unwrap();
        let expected = max_to_one(Vector3::new(2.025, 1.025, 0.025));
        assert!((pixel - expected).norm() < 1e-6);
        assert!((pixel.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn bounding_box_mode_fills_box_white_without_depth() {
        let raster = Rasterizer::new();
        let settings = RenderSettings::default().with_bounding_box_toggled();
        let a = screen_vertex(2.0, 3.0, 0.5);
        let b = screen_vertex(9.5, 3.0, 0.5);
        let c = screen_vertex(2.0, 7.2, 0.5);
        let mut fb = FrameBuffer::new(16, 16);
        fb.clear(Vector3::zeros());
        let written = raster.rasterize_triangle(
            &mut fb,
            [&a, &b, &c],
            CullMode::Back,
            &settings,
            &flat(Vector3::new(0.0, 1.0, 0.0)),
        );
        // x in [2, 10), y in [3, 8)
        assert_eq!(written, 8 * 5);
        assert_eq!(fb.get_pixel(9, 7), Some(WHITE));
        assert_eq!(fb.get_pixel(10, 7), Some(Vector3::zeros()));
        assert_eq!(covered(&fb), 0);
    }

    #[test]
    fn depth_view_writes_grey() {
        let raster = Rasterizer::new();
        let settings = RenderSettings::default().with_next_view_mode();
        let a = screen_vertex(0.0, 0.0, 0.98);
        let b = screen_vertex(10.0, 0.0, 0.98);
        let c = screen_vertex(0.0, 10.0, 0.98);
        let mut fb = FrameBuffer::new(16, 16);
        raster.rasterize_triangle(
            &mut fb,
            [&a, &b, &c],
            CullMode::Back,
            &settings,
            &flat(Vector3::new(1.0, 0.0, 0.0)),
        );
        let pixel = fb.get_pixel(1, 1).unwrap();
        assert!((pixel.x - pixel.y).abs() < 1e-6 && (pixel.y - pixel.z).abs() < 1e-6);
        // 0.015 / 0.02 plus ambient.
        assert!((pixel.x - 0.775).abs() < 1e-3);
    }

    #[test]
    fn depth_ramp_keeps_a_gradient_below_the_band() {
        let raster = Rasterizer::new();
        for (depth, grey_level) in [(0.5, 0.03), (0.8, 0.075), (0.9, 0.15), (0.98, 0.75)] {
            let level = raster.remap_depth(depth);
            assert!((level - grey_level).abs() < 1e-4, "depth {} gave {}", depth, level);
        }
        assert!(raster.remap_depth(0.99) > 1.0);
        assert_eq!(raster.remap_depth(1.0), 1.0);
    }

    #[test]
    fn offscreen_triangle_writes_nothing() {
        let raster = Rasterizer::new();
        let a = screen_vertex(-30.0, -30.0, 0.5);
        let b = screen_vertex(-10.0, -30.0, 0.5);
        let c = screen_vertex(-30.0, -10.0, 0.5);
        let mut fb = FrameBuffer::new(16, 16);
        let written = raster.rasterize_triangle(
            &mut fb,
            [&a, &b, &c],
            CullMode::None,
            &RenderSettings::default(),
            &flat(WHITE),
        );
        assert_eq!(written, 0);
    }
}
