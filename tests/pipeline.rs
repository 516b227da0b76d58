use dual_rasterizer::core::color::{Color, grey};
use dual_rasterizer::core::geometry::Vertex;
use dual_rasterizer::core::math::transform::TransformFactory;
use dual_rasterizer::core::pipeline::{RenderSettings, ShadingMode, ViewMode};
use dual_rasterizer::core::rasterizer::CullMode;
use dual_rasterizer::pipeline::renderer::{RenderBackend, RenderError, SoftwareRenderer};
use dual_rasterizer::pipeline::shader::Shader;
use dual_rasterizer::scene::camera::{Camera, CameraSnapshot};
use dual_rasterizer::scene::context::Scene;
use dual_rasterizer::scene::input::FrameInput;
use dual_rasterizer::scene::mesh::{Mesh, MeshTextures, PrimitiveTopology, TextureSlot};
use dual_rasterizer::scene::scene_object::Placement;
use dual_rasterizer::scene::texture::Texture;
use nalgebra::{Point3, Vector2, Vector3};
use std::sync::Arc;

const SIZE: usize = 64;
const BACKGROUND: Color = Vector3::new(0.0, 0.0, 0.25);

fn camera() -> CameraSnapshot {
    Camera::new(SIZE, SIZE, 90.0, Point3::origin()).snapshot()
}

fn renderer(shading_mode: ShadingMode) -> SoftwareRenderer {
    let mut renderer = SoftwareRenderer::new(SIZE, SIZE)
        .with_settings(RenderSettings {
            shading_mode,
            normal_mapping: false,
            ..RenderSettings::default()
        })
        .with_shader(Shader::new(Vector3::z(), 7.0, 25.0));
    renderer.set_background_color(BACKGROUND);
    renderer
}

fn placed(mut mesh: Mesh, z: f32) -> Mesh {
    mesh.set_world_matrix(TransformFactory::translation(&Vector3::new(0.0, 0.0, z)));
    mesh
}

fn covered(renderer: &SoftwareRenderer) -> Vec<Color> {
    renderer
        .framebuffer
        .color_buffer
        .iter()
        .copied()
        .filter(|c| *c != BACKGROUND)
        .collect()
}

/// One triangle wound each way over the same positions, colored red and blue.
fn double_sided_triangle() -> Mesh {
    let n = Vector3::new(0.0, 0.0, -1.0);
    let corner = |x: f32, y: f32, color: Color| {
        Vertex::new(Point3::new(x, y, 0.0), n, Vector2::zeros())
            .with_tangent(Vector3::x())
            .with_color(color)
    };
    let red = Vector3::new(1.0, 0.0, 0.0);
    let blue = Vector3::new(0.0, 0.0, 1.0);
    let vertices = vec![
        corner(0.0, 1.0, red),
        corner(1.0, -1.0, red),
        corner(-1.0, -1.0, red),
        corner(0.0, 1.0, blue),
        corner(1.0, -1.0, blue),
        corner(-1.0, -1.0, blue),
    ];
    Mesh::new(PrimitiveTopology::TriangleList, vertices, vec![0, 1, 2, 3, 5, 4])
}

#[test]
fn facing_quad_is_uniform_over_background() {
    let mut renderer = renderer(ShadingMode::ObservedArea);
    // A quarter-pixel shift keeps every pixel center off the shared diagonal.
    let mut quad = Mesh::create_quad(2.0);
    quad.set_world_matrix(TransformFactory::translation(&Vector3::new(0.0390625, 0.0, 5.0)));
    renderer.render(&camera(), &[quad]).unwrap();

    // Screen x spans 25.85 .. 38.65 and y spans 25.6 .. 38.4.
    let pixels = covered(&renderer);
    assert_eq!(pixels.len(), 13 * 12);
    let first = pixels[0];
    assert!(first.norm() > 0.0);
    assert!(pixels.iter().all(|c| (c - first).norm() < 1e-5));

    let fb = &renderer.framebuffer;
    assert_eq!(fb.get_pixel(0, 0), Some(BACKGROUND));
    assert_eq!(fb.get_pixel(25, 32), Some(BACKGROUND));
    assert_eq!(fb.get_pixel(39, 32), Some(BACKGROUND));
    assert_eq!(fb.get_pixel(32, 38), Some(BACKGROUND));
    assert_ne!(fb.get_pixel(26, 26), Some(BACKGROUND));
    assert_ne!(fb.get_pixel(38, 37), Some(BACKGROUND));
}

#[test]
fn hidden_and_hardware_only_meshes_draw_nothing() {
    let mut renderer = renderer(ShadingMode::ObservedArea);

    let mut hidden = placed(Mesh::create_quad(2.0), 5.0);
    hidden.visible = false;
    let mut hardware_only = placed(Mesh::create_cube(2.0), 4.0);
    hardware_only.disable_software_rendering();

    let stats = renderer.render(&camera(), &[hidden, hardware_only]).unwrap();
    assert_eq!(stats.meshes_drawn, 0);
    assert_eq!(stats.pixels_written, 0);
    assert!(covered(&renderer).is_empty());
}

#[test]
fn cull_mode_selects_winding() {
    let mut renderer = renderer(ShadingMode::Diffuse);
    let center = SIZE / 2;

    let mut mesh = placed(double_sided_triangle(), 4.0);
    let back = renderer.render(&camera(), std::slice::from_ref(&mesh)).unwrap();
    let back_culled = renderer.framebuffer.get_pixel(center, center).unwrap();
    assert!(back_culled.x > back_culled.z);

    mesh.cycle_cull_mode();
    assert_eq!(mesh.cull_mode, CullMode::Front);
    renderer.render(&camera(), std::slice::from_ref(&mesh)).unwrap();
    let front_culled = renderer.framebuffer.get_pixel(center, center).unwrap();
    assert!(front_culled.z > front_culled.x);

    // Both sides pass culling. Which one wins the coplanar depth tie is
    // down to float rounding, so only coverage is checked.
    mesh.cycle_cull_mode();
    let both = renderer.render(&camera(), std::slice::from_ref(&mesh)).unwrap();
    assert!(both.pixels_written >= back.pixels_written);
    assert_ne!(renderer.framebuffer.get_pixel(center, center), Some(BACKGROUND));
}

#[test]
fn draw_order_does_not_matter() {
    let near = placed(Mesh::create_quad(2.0), 4.0);
    let far = placed(Mesh::create_cube(3.0), 8.0);
    let mut a = renderer(ShadingMode::ObservedArea);
    let mut b = renderer(ShadingMode::ObservedArea);

    a.render(&camera(), &[near, far]).unwrap();
    let near = placed(Mesh::create_quad(2.0), 4.0);
    let far = placed(Mesh::create_cube(3.0), 8.0);
    b.render(&camera(), &[far, near]).unwrap();

    assert_eq!(a.framebuffer.color_buffer, b.framebuffer.color_buffer);
    assert_eq!(a.framebuffer.depth_buffer, b.framebuffer.depth_buffer);
}

#[test]
fn depth_view_needs_no_maps_and_stores_depth() {
    // Default settings shade with normal and Phong maps this quad lacks.
    let mut renderer = SoftwareRenderer::new(SIZE, SIZE);
    renderer.set_background_color(BACKGROUND);
    renderer.cycle_view_mode();
    assert_eq!(renderer.settings().view_mode, ViewMode::DepthBuffer);

    renderer.render(&camera(), &[placed(Mesh::create_quad(2.0), 5.0)]).unwrap();

    let fb = &renderer.framebuffer;
    let c = SIZE / 2;
    // far / (far - near) * (1 - near / z) for near 1, far 100, z 5.
    let expected = 100.0 / 99.0 * 0.8;
    assert!((fb.depth_at(c, c) - expected).abs() < 1e-4);
    // (1 - 0.985) / (1 - depth) plus ambient.
    let level = 0.015 / (1.0 - expected) + 0.025;
    let pixel = fb.get_pixel(c, c).unwrap();
    assert!((pixel - grey(level)).norm() < 1e-3);
}

#[test]
fn bounding_box_view_fills_white() {
    let mut renderer = renderer(ShadingMode::ObservedArea);
    renderer.toggle_bounding_box();
    let stats = renderer
        .render(&camera(), &[placed(Mesh::create_test_triangle(), 2.0)])
        .unwrap();

    let pixels = covered(&renderer);
    assert_eq!(pixels.len(), stats.pixels_written);
    assert!(pixels.iter().all(|c| *c == Vector3::new(1.0, 1.0, 1.0)));
    assert!(renderer.framebuffer.depth_buffer.iter().all(|d| *d == f32::MAX));
}

#[test]
fn missing_maps_fail_before_drawing() {
    let mut renderer = renderer(ShadingMode::Combined);
    renderer.render(&camera(), &[]).unwrap();

    let textured = placed(Mesh::create_quad(2.0), 5.0).with_textures(MeshTextures {
        specular: Some(Arc::new(Texture::solid(grey(0.5)))),
        glossiness: Some(Arc::new(Texture::solid(grey(0.6)))),
        ..MeshTextures::default()
    });
    let bare = placed(Mesh::create_quad(2.0), 6.0).with_name("bare");
    let err = renderer.render(&camera(), &[textured, bare]).unwrap_err();
    assert_eq!(
        err,
        RenderError::MissingTexture {
            mesh: "bare".to_string(),
            slot: TextureSlot::Specular
        }
    );
    // The textured quad ahead of it was not drawn either.
    assert!(covered(&renderer).is_empty());
}

#[test]
fn moving_closer_grows_the_quad() {
    let mut scene = Scene::new(Camera::new(SIZE, SIZE, 90.0, Point3::origin()));
    scene.add_mesh(Mesh::create_quad(2.0), Placement::at(Vector3::new(0.0, 0.0, 5.0)));
    let mut renderer = renderer(ShadingMode::ObservedArea);

    renderer.render(&scene.snapshot(), &scene.meshes).unwrap();
    let before = covered(&renderer).len();

    // 50 units per second for 0.02 s moves one unit forward.
    let input = FrameInput {
        movement: Vector2::new(0.0, 1.0),
        ..FrameInput::default()
    };
    scene.update(0.02, &input);
    renderer.render(&scene.snapshot(), &scene.meshes).unwrap();
    let after = covered(&renderer).len();

    assert!(after > before);
}
