use crate::core::color::grey;
use crate::core::rasterizer::CullMode;
use crate::io::config::{Config, ObjectConfig};
use crate::io::obj_loader::load_obj;
use crate::scene::camera::{Camera, CameraSpeeds};
use crate::scene::context::Scene;
use crate::scene::mesh::{Mesh, MeshTextures, PrimitiveTopology};
use crate::scene::scene_object::Placement;
use crate::scene::texture::Texture;
use log::{info, warn};
use nalgebra::{Point3, Vector3};
use std::sync::Arc;

/// Generated maps shared by every mesh that asks for them.
struct ProceduralMaps {
    diffuse: Arc<Texture>,
    normal: Arc<Texture>,
    specular: Arc<Texture>,
    glossiness: Arc<Texture>,
}

impl ProceduralMaps {
    fn new() -> Self {
        Self {
            diffuse: Arc::new(Texture::checkerboard(
                256,
                8,
                Vector3::new(0.9, 0.9, 0.9),
                Vector3::new(0.8, 0.2, 0.1),
            )),
            normal: Arc::new(Texture::flat_normal_map()),
            specular: Arc::new(Texture::solid(grey(0.5))),
            glossiness: Arc::new(Texture::solid(grey(0.6))),
        }
    }
}

/// Builds the camera from the `[camera]` and `[render]` sections.
pub fn build_camera(config: &Config) -> Camera {
    let mut camera = Camera::new(
        config.render.width,
        config.render.height,
        config.camera.fov,
        Point3::from(config.camera.origin),
    );
    camera.speeds = CameraSpeeds {
        movement: config.camera.movement_speed,
        rotation: config.camera.rotation_speed,
        pan: config.camera.pan_speed,
    };
    camera.set_clip_planes(config.camera.near, config.camera.far);
    camera
}

fn load_geometry(obj_conf: &ObjectConfig) -> Mesh {
    match obj_conf.source.as_str() {
        "quad" => Mesh::create_quad(1.0),
        "cube" => Mesh::create_cube(1.0),
        "triangle" => Mesh::create_test_triangle(),
        path => match load_obj(path, obj_conf.flip_handedness) {
            Ok(mesh) => mesh,
            Err(e) => {
                warn!(
                    "Error loading model '{}': {}. Using fallback mesh.",
                    path, e
                );
                Mesh::create_test_triangle()
            }
        },
    }
}

fn load_texture(path: &Option<String>, slot: &str) -> Option<Arc<Texture>> {
    let path = path.as_ref()?;
    match Texture::load(path) {
        Ok(tex) => Some(Arc::new(tex)),
        Err(e) => {
            warn!("Failed to load {} texture '{}': {}", slot, path, e);
            None
        }
    }
}

fn load_textures(obj_conf: &ObjectConfig, procedural: &ProceduralMaps) -> MeshTextures {
    let mut textures = MeshTextures {
        diffuse: load_texture(&obj_conf.diffuse_texture, "diffuse"),
        normal: load_texture(&obj_conf.normal_texture, "normal"),
        specular: load_texture(&obj_conf.specular_texture, "specular"),
        glossiness: load_texture(&obj_conf.glossiness_texture, "glossiness"),
    };

    if obj_conf.procedural_maps {
        textures.diffuse.get_or_insert_with(|| procedural.diffuse.clone());
        textures.normal.get_or_insert_with(|| procedural.normal.clone());
        textures.specular.get_or_insert_with(|| procedural.specular.clone());
        textures.glossiness.get_or_insert_with(|| procedural.glossiness.clone());
    }
    textures
}

/// Builds one mesh from its `[[objects]]` entry.
pub fn build_mesh(obj_conf: &ObjectConfig) -> Result<Mesh, String> {
    build_mesh_with(obj_conf, &ProceduralMaps::new())
}

fn build_mesh_with(obj_conf: &ObjectConfig, procedural: &ProceduralMaps) -> Result<Mesh, String> {
    let mut mesh = load_geometry(obj_conf);

    if let Some(name) = &obj_conf.name {
        mesh.name = name.clone();
    }

    if let Some(topology) = &obj_conf.topology {
        match topology.parse::<PrimitiveTopology>()? {
            PrimitiveTopology::TriangleList => mesh.convert_to_triangle_list(),
            PrimitiveTopology::TriangleStrip if mesh.topology != PrimitiveTopology::TriangleStrip => {
                warn!(
                    "Mesh '{}' cannot be re-indexed as a strip; keeping a triangle list.",
                    mesh.name
                );
            }
            PrimitiveTopology::TriangleStrip => {}
        }
    }

    if let Some(color) = obj_conf.color {
        let color = Vector3::from(color);
        for vertex in &mut mesh.vertices {
            vertex.color = color;
        }
    }

    mesh.cull_mode = obj_conf.cull_mode.parse::<CullMode>()?;
    mesh.visible = obj_conf.visible;
    if !obj_conf.software {
        mesh.disable_software_rendering();
    }
    mesh.textures = load_textures(obj_conf, procedural);

    Ok(mesh)
}

/// Initial resource loading (heavy I/O). Returns a ready-to-render Scene.
pub fn build_scene(config: &Config) -> Result<Scene, String> {
    let mut scene = Scene::new(build_camera(config));
    scene.rotation_enabled = config.input.rotate;

    let procedural = ProceduralMaps::new();
    for obj_conf in &config.objects {
        let mesh = build_mesh_with(obj_conf, &procedural)?;
        let placement = Placement {
            position: Vector3::from(obj_conf.position),
            rotation: Vector3::from(obj_conf.rotation),
            scale: Vector3::from(obj_conf.scale),
        };
        scene.add_mesh(mesh, placement);
    }

    info!("Scene initialized with {} meshes.", scene.meshes.len());
    Ok(scene)
}
