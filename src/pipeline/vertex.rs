use crate::core::geometry::TransformedVertex;
use crate::core::math::transform::{
    apply_perspective_division, ndc_to_screen, transform_point4, transform_vector,
};
use crate::scene::camera::CameraSnapshot;
use crate::scene::mesh::Mesh;
use nalgebra::{Point3, Vector3, Vector4};

/// Maps object-space vertices to screen space for one viewport size.
#[derive(Debug, Clone, Copy)]
pub struct VertexTransformer {
    pub width: usize,
    pub height: usize,
}

impl VertexTransformer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Transforms every vertex of `mesh` into `out`.
    ///
    /// `out` is cleared and refilled so that `out[i]` corresponds to
    /// `mesh.vertices[i]`; the mesh's indices stay valid against it.
    /// Normals and tangents go through the world matrix only, which is exact
    /// for rotations and uniform scale.
    pub fn transform(&self, mesh: &Mesh, camera: &CameraSnapshot, out: &mut Vec<TransformedVertex>) {
        let world = mesh.world_matrix;
        let world_view_projection = camera.view_projection() * world;
        let (width, height) = (self.width as f32, self.height as f32);

        out.clear();
        out.reserve(mesh.vertices.len());

        for vertex in &mesh.vertices {
            let clip = transform_point4(&world_view_projection, &vertex.position);
            let ndc = apply_perspective_division(&clip);
            let screen = ndc_to_screen(ndc.x, ndc.y, width, height);

            let world_position = Point3::from_homogeneous(world * vertex.position.to_homogeneous())
                .unwrap_or(vertex.position);

            out.push(TransformedVertex {
                position: Vector4::new(screen.x, screen.y, ndc.z, ndc.w),
                color: vertex.color,
                uv: vertex.texcoord,
                normal: transform_vector(&world, &vertex.normal).normalize(),
                tangent: transform_vector(&world, &vertex.tangent)
                    .try_normalize(f32::EPSILON)
                    .unwrap_or_else(Vector3::zeros),
                view_direction: (camera.origin - world_position).normalize(),
            });
        }
    }
}
