use crate::core::geometry::Vertex;
use crate::scene::mesh::{Mesh, PrimitiveTopology};
use log::{info, warn};
use nalgebra::{Point3, Vector2, Vector3};
use std::path::Path;

/// Loads an OBJ file and returns a single triangle-list Mesh.
///
/// All sub-models are merged. Vertices get a white base color and tangents
/// generated from the UV layout. With `flip_handedness` the data is moved
/// from the usual right-handed OBJ convention into the renderer's
/// left-handed space (z negated, triangle winding reversed).
pub fn load_obj(path: &str, flip_handedness: bool) -> Result<Mesh, String> {
    let path_obj = Path::new(path);
    if !path_obj.exists() {
        return Err(format!("File not found: {}", path));
    }

    info!("Loading OBJ file: {}", path);

    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true, // Unifies indices for Position/Normal/UV
        ..Default::default()
    };

    let (models, _materials) = tobj::load_obj(path_obj, &load_options)
        .map_err(|e| format!("Failed to load OBJ: {}", e))?;

    let z_sign = if flip_handedness { -1.0 } else { 1.0 };

    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let mut index_offset = 0;
    let mut missing_normals = false;

    for model in models {
        let mesh = &model.mesh;
        let num_vertices = mesh.positions.len() / 3;

        let has_normals = !mesh.normals.is_empty();
        let has_texcoords = !mesh.texcoords.is_empty();

        if !has_normals {
            warn!(
                "Mesh '{}' is missing normals. Generating smooth normals.",
                model.name
            );
            missing_normals = true;
        }

        for i in 0..num_vertices {
            let position = Point3::new(
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2] * z_sign,
            );

            let normal = if has_normals {
                Vector3::new(
                    mesh.normals[i * 3],
                    mesh.normals[i * 3 + 1],
                    mesh.normals[i * 3 + 2] * z_sign,
                )
            } else {
                Vector3::zeros()
            };

            // OBJ puts v = 0 at the bottom of the image.
            let texcoord = if has_texcoords {
                Vector2::new(mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1])
            } else {
                Vector2::zeros()
            };

            vertices.push(Vertex::new(position, normal, texcoord));
        }

        for tri in mesh.indices.chunks_exact(3) {
            if flip_handedness {
                indices.extend_from_slice(&[
                    tri[0] + index_offset,
                    tri[2] + index_offset,
                    tri[1] + index_offset,
                ]);
            } else {
                indices.extend(tri.iter().map(|i| i + index_offset));
            }
        }

        index_offset += num_vertices as u32;
    }

    if missing_normals {
        generate_normals(&mut vertices, &indices);
    }
    generate_tangents(&mut vertices, &indices);

    info!(
        "OBJ loaded successfully. Total vertices: {}, Total indices: {}",
        vertices.len(),
        indices.len()
    );

    let name = path_obj
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    Ok(Mesh::new(PrimitiveTopology::TriangleList, vertices, indices).with_name(name))
}

/// Replaces zero normals with the area-weighted average of adjacent faces.
///
/// Faces are clockwise when seen from the front, so the outward normal is
/// `(b - a) x (c - a)` in the left-handed frame.
pub fn generate_normals(vertices: &mut [Vertex], indices: &[u32]) {
    let mut accumulated = vec![Vector3::zeros(); vertices.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= vertices.len() || b >= vertices.len() || c >= vertices.len() {
            continue;
        }
        let face = (vertices[b].position - vertices[a].position)
            .cross(&(vertices[c].position - vertices[a].position));
        for i in [a, b, c] {
            accumulated[i] += face;
        }
    }

    for (vertex, sum) in vertices.iter_mut().zip(accumulated) {
        if vertex.normal == Vector3::zeros() {
            vertex.normal = sum.try_normalize(1e-12).unwrap_or_else(Vector3::y);
        }
    }
}

/// Computes per-vertex tangents from UV gradients, Gram-Schmidt
/// orthogonalised against the normal.
pub fn generate_tangents(vertices: &mut [Vertex], indices: &[u32]) {
    let mut accumulated = vec![Vector3::zeros(); vertices.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= vertices.len() || b >= vertices.len() || c >= vertices.len() {
            continue;
        }

        let edge0 = vertices[b].position - vertices[a].position;
        let edge1 = vertices[c].position - vertices[a].position;
        let diff_x = Vector2::new(
            vertices[b].texcoord.x - vertices[a].texcoord.x,
            vertices[c].texcoord.x - vertices[a].texcoord.x,
        );
        let diff_y = Vector2::new(
            vertices[b].texcoord.y - vertices[a].texcoord.y,
            vertices[c].texcoord.y - vertices[a].texcoord.y,
        );

        let det = diff_x.x * diff_y.y - diff_y.x * diff_x.y;
        if det.abs() < f32::EPSILON {
            continue;
        }
        let tangent = (edge0 * diff_y.y - edge1 * diff_y.x) / det;

        for i in [a, b, c] {
            accumulated[i] += tangent;
        }
    }

    for (vertex, sum) in vertices.iter_mut().zip(accumulated) {
        let n = vertex.normal;
        let projected = sum - n * n.dot(&sum);
        vertex.tangent = projected
            .try_normalize(1e-12)
            .unwrap_or_else(|| any_perpendicular(&n));
    }
}

fn any_perpendicular(n: &Vector3<f32>) -> Vector3<f32> {
    let helper = if n.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
    (helper - n * n.dot(&helper))
        .try_normalize(1e-12)
        .unwrap_or_else(Vector3::x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn quad_vertices() -> Vec<Vertex> {
        let n = Vector3::new(0.0, 0.0, -1.0);
        vec![
            Vertex::new(Point3::new(-1.0, 1.0, 0.0), n, Vector2::new(0.0, 0.0)),
            Vertex::new(Point3::new(1.0, 1.0, 0.0), n, Vector2::new(1.0, 0.0)),
            Vertex::new(Point3::new(-1.0, -1.0, 0.0), n, Vector2::new(0.0, 1.0)),
        ]
    }

    #[test]
    fn tangent_follows_u_direction() {
        let mut vertices = quad_vertices();
        generate_tangents(&mut vertices, &[0, 1, 2]);
        for v in &vertices {
            assert!((v.tangent - Vector3::x()).norm() < 1e-5);
        }
    }

    #[test]
    fn degenerate_uvs_still_give_perpendicular_tangent() {
        let mut vertices = quad_vertices();
        for v in &mut vertices {
            v.texcoord = Vector2::zeros();
        }
        generate_tangents(&mut vertices, &[0, 1, 2]);
        for v in &vertices {
            assert!((v.tangent.norm() - 1.0).abs() < 1e-5);
            assert!(v.tangent.dot(&v.normal).abs() < 1e-5);
        }
    }

    #[test]
    fn generated_normals_face_the_viewer() {
        let mut vertices = quad_vertices();
        for v in &mut vertices {
            v.normal = Vector3::zeros();
        }
        generate_normals(&mut vertices, &[0, 1, 2]);
        for v in &vertices {
            assert!((v.normal - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-5);
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_obj("does/not/exist.obj", true).is_err());
    }

    #[test]
    fn loads_and_flips_a_triangle() {
        let path = std::env::temp_dir().join("dual_rasterizer_loader_test.obj");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "v 0 1 1\nv 1 0 1\nv -1 0 1\nvt 0.5 1\nvt 1 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 2/2/1 3/3/1"
        )
        .unwrap();
        drop(file);

        let mesh = load_obj(path.to_str().unwrap(), true).unwrap();
        assert_eq!(mesh.name, "dual_rasterizer_loader_test");
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices, vec![0, 2, 1]);
        assert!(mesh.vertices.iter().all(|v| v.position.z == -1.0));
        assert!(mesh.vertices.iter().all(|v| v.normal == Vector3::new(0.0, 0.0, -1.0)));
        assert_eq!(mesh.vertices[0].texcoord, Vector2::new(0.5, 0.0));
        assert_eq!(mesh.vertices[0].color, Vector3::new(1.0, 1.0, 1.0));

        std::fs::remove_file(path).ok();
    }
}
