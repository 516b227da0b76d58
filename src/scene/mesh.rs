use crate::core::geometry::Vertex;
use crate::core::rasterizer::CullMode;
use crate::scene::texture::Texture;
use nalgebra::{Matrix4, Point3, Vector2, Vector3};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// How the index list is assembled into triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveTopology {
    #[default]
    TriangleList,
    TriangleStrip,
}

impl FromStr for PrimitiveTopology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "list" | "triangle_list" => Ok(PrimitiveTopology::TriangleList),
            "strip" | "triangle_strip" => Ok(PrimitiveTopology::TriangleStrip),
            other => Err(format!("Unknown topology: '{}'", other)),
        }
    }
}

/// Texture slots a mesh can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSlot {
    Diffuse,
    Normal,
    Specular,
    Glossiness,
}

impl fmt::Display for TextureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextureSlot::Diffuse => "diffuse",
            TextureSlot::Normal => "normal",
            TextureSlot::Specular => "specular",
            TextureSlot::Glossiness => "glossiness",
        };
        f.write_str(name)
    }
}

/// Up to four shared, read-only texture maps.
#[derive(Debug, Clone, Default)]
pub struct MeshTextures {
    pub diffuse: Option<Arc<Texture>>,
    pub normal: Option<Arc<Texture>>,
    pub specular: Option<Arc<Texture>>,
    pub glossiness: Option<Arc<Texture>>,
}

impl MeshTextures {
    pub fn get(&self, slot: TextureSlot) -> Option<&Texture> {
        let texture = match slot {
            TextureSlot::Diffuse => &self.diffuse,
            TextureSlot::Normal => &self.normal,
            TextureSlot::Specular => &self.specular,
            TextureSlot::Glossiness => &self.glossiness,
        };
        texture.as_deref()
    }
}

/// A collection of vertices and indices representing a 3D object.
pub struct Mesh {
    pub name: String,
    /// List of vertices, immutable after load.
    pub vertices: Vec<Vertex>,
    /// Indices interpreted according to `topology`.
    pub indices: Vec<u32>,
    pub topology: PrimitiveTopology,
    pub world_matrix: Matrix4<f32>,
    pub cull_mode: CullMode,
    pub visible: bool,
    /// Meshes that only make sense on a hardware backend opt out here.
    pub software_renderable: bool,
    pub textures: MeshTextures,
}

impl Mesh {
    pub fn new(topology: PrimitiveTopology, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            name: String::from("mesh"),
            vertices,
            indices,
            topology,
            world_matrix: Matrix4::identity(),
            cull_mode: CullMode::Back,
            visible: true,
            software_renderable: true,
            textures: MeshTextures::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_textures(mut self, textures: MeshTextures) -> Self {
        self.textures = textures;
        self
    }

    pub fn set_world_matrix(&mut self, matrix: Matrix4<f32>) {
        self.world_matrix = matrix;
    }

    pub fn cycle_cull_mode(&mut self) {
        self.cull_mode = self.cull_mode.next();
    }

    pub fn disable_software_rendering(&mut self) {
        self.software_renderable = false;
    }

    /// Whether the CPU rasterizer should draw this mesh at all.
    pub fn is_drawable(&self) -> bool {
        self.visible && self.software_renderable
    }

    /// Iterates the triangles as index triples.
    ///
    /// Lists take consecutive triples (a trailing partial triple is ignored).
    /// Strips slide a window of three; odd windows swap their last two
    /// indices so every triangle keeps the winding of the first.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let indices = &self.indices;
        let count = match self.topology {
            PrimitiveTopology::TriangleList => indices.len() / 3,
            PrimitiveTopology::TriangleStrip => indices.len().saturating_sub(2),
        };
        let topology = self.topology;

        (0..count).map(move |i| match topology {
            PrimitiveTopology::TriangleList => [
                indices[i * 3] as usize,
                indices[i * 3 + 1] as usize,
                indices[i * 3 + 2] as usize,
            ],
            PrimitiveTopology::TriangleStrip if i % 2 == 1 => [
                indices[i] as usize,
                indices[i + 2] as usize,
                indices[i + 1] as usize,
            ],
            PrimitiveTopology::TriangleStrip => [
                indices[i] as usize,
                indices[i + 1] as usize,
                indices[i + 2] as usize,
            ],
        })
    }

    /// Re-indexes the mesh as a triangle list with the same triangles.
    pub fn convert_to_triangle_list(&mut self) {
        if self.topology == PrimitiveTopology::TriangleList {
            return;
        }
        self.indices = self
            .triangles()
            .flat_map(|tri| tri.map(|i| i as u32))
            .collect();
        self.topology = PrimitiveTopology::TriangleList;
    }

    /// Creates a simple triangle mesh for testing purposes.
    ///
    /// Vertices are clockwise when seen from -Z, i.e. front-facing for a
    /// camera at the origin looking down +Z.
    pub fn create_test_triangle() -> Self {
        let normal = Vector3::new(0.0, 0.0, -1.0);
        let tangent = Vector3::new(1.0, 0.0, 0.0);
        let vertices = vec![
            Vertex::new(Point3::new(0.0, 0.5, 0.0), normal, Vector2::new(0.5, 0.0))
                .with_tangent(tangent),
            Vertex::new(Point3::new(0.5, -0.5, 0.0), normal, Vector2::new(1.0, 1.0))
                .with_tangent(tangent),
            Vertex::new(Point3::new(-0.5, -0.5, 0.0), normal, Vector2::new(0.0, 1.0))
                .with_tangent(tangent),
        ];

        Self::new(PrimitiveTopology::TriangleList, vertices, vec![0, 1, 2]).with_name("triangle")
    }

    /// An axis-aligned square in the XY plane facing -Z, as a 4-index strip.
    pub fn create_quad(size: f32) -> Self {
        let h = size * 0.5;
        let normal = Vector3::new(0.0, 0.0, -1.0);
        let tangent = Vector3::new(1.0, 0.0, 0.0);
        let corner = |x: f32, y: f32, u: f32, v: f32| {
            Vertex::new(Point3::new(x, y, 0.0), normal, Vector2::new(u, v)).with_tangent(tangent)
        };
        let vertices = vec![
            corner(-h, h, 0.0, 0.0),
            corner(h, h, 1.0, 0.0),
            corner(-h, -h, 0.0, 1.0),
            corner(h, -h, 1.0, 1.0),
        ];

        Self::new(PrimitiveTopology::TriangleStrip, vertices, vec![0, 1, 2, 3]).with_name("quad")
    }

    /// A cube centered on the origin with per-face normals, tangents and UVs.
    pub fn create_cube(size: f32) -> Self {
        let h = size * 0.5;
        let faces = [
            (Vector3::new(0.0, 0.0, -1.0), Vector3::y()),
            (Vector3::new(0.0, 0.0, 1.0), Vector3::y()),
            (Vector3::new(-1.0, 0.0, 0.0), Vector3::y()),
            (Vector3::new(1.0, 0.0, 0.0), Vector3::y()),
            (Vector3::new(0.0, 1.0, 0.0), Vector3::z()),
            (Vector3::new(0.0, -1.0, 0.0), -Vector3::z()),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, up) in faces {
            // Right-hand side as seen from outside the face.
            let right: Vector3<f32> = normal.cross(&up);
            let center = normal * h;
            let base = vertices.len() as u32;
            for (sx, sy, u, v) in [
                (-1.0, 1.0, 0.0, 0.0),
                (1.0, 1.0, 1.0, 0.0),
                (-1.0, -1.0, 0.0, 1.0),
                (1.0, -1.0, 1.0, 1.0),
            ] {
                let p = center + right * (sx * h) + up * (sy * h);
                vertices.push(
                    Vertex::new(Point3::from(p), normal, Vector2::new(u, v)).with_tangent(right),
                );
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 1, base + 3, base + 2]);
        }

        Self::new(PrimitiveTopology::TriangleList, vertices, indices).with_name("cube")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy(topology: PrimitiveTopology, indices: Vec<u32>) -> Mesh {
        let vertices = vec![
            Vertex::new(Point3::origin(), Vector3::z(), Vector2::zeros());
            indices.iter().map(|i| *i as usize + 1).max().unwrap_or(0)
        ];
        Mesh::new(topology, vertices, indices)
    }

    #[test]
    fn list_uses_consecutive_triples() {
        let mesh = dummy(PrimitiveTopology::TriangleList, vec![0, 1, 2, 2, 1, 3, 4]);
        let tris: Vec<_> = mesh.triangles().collect();
        assert_eq!(tris, vec![[0, 1, 2], [2, 1, 3]]);
    }

    #[test]
    fn strip_reverses_odd_windows() {
        let mesh = dummy(PrimitiveTopology::TriangleStrip, vec![0, 1, 2, 3, 4]);
        let tris: Vec<_> = mesh.triangles().collect();
        assert_eq!(tris, vec![[0, 1, 2], [1, 3, 2], [2, 3, 4]]);
    }

    #[test]
    fn strip_converts_to_equivalent_list() {
        let mut mesh = Mesh::create_quad(1.0);
        let before: Vec<_> = mesh.triangles().collect();
        mesh.convert_to_triangle_list();
        assert_eq!(mesh.topology, PrimitiveTopology::TriangleList);
        assert_eq!(mesh.indices, vec![0, 1, 2, 1, 3, 2]);
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), before);
    }

    #[test]
    fn short_strip_has_no_triangles() {
        let mesh = dummy(PrimitiveTopology::TriangleStrip, vec![0, 1]);
        assert_eq!(mesh.triangles().count(), 0);
    }

    #[test]
    fn cull_mode_cycles_back_front_none() {
        let mut mesh = Mesh::create_test_triangle();
        assert_eq!(mesh.cull_mode, CullMode::Back);
        mesh.cycle_cull_mode();
        assert_eq!(mesh.cull_mode, CullMode::Front);
        mesh.cycle_cull_mode();
        assert_eq!(mesh.cull_mode, CullMode::None);
        mesh.cycle_cull_mode();
        assert_eq!(mesh.cull_mode, CullMode::Back);
    }

    #[test]
    fn cube_faces_point_outwards() {
        let cube = Mesh::create_cube(2.0);
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.triangles().count(), 12);
        for v in &cube.vertices {
            assert!(v.position.coords.dot(&v.normal) > 0.0);
            assert!(v.normal.dot(&v.tangent).abs() < 1e-6);
        }
    }

    #[test]
    fn drawable_requires_visible_and_software() {
        let mut mesh = Mesh::create_quad(1.0);
        assert!(mesh.is_drawable());
        mesh.visible = false;
        assert!(!mesh.is_drawable());
        mesh.visible = true;
        mesh.disable_software_rendering();
        assert!(!mesh.is_drawable());
    }
}
