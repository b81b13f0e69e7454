//! Wavefront OBJ loading.
//!
//! Parsing goes through the `wavefront_obj` crate, which splits polygons into
//! triangle fans. All objects in the file are merged into a single [`Mesh`].

use std::path::Path;

use caustic_math::{Vec2, Vec3};
use wavefront_obj::obj::{self, Primitive};

use crate::mesh::{FaceIndices, Mesh, MeshResult};

impl Mesh {
    /// Load a mesh from an OBJ file on disk.
    pub fn load_obj(path: impl AsRef<Path>) -> MeshResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let mesh = Self::from_obj_str(&data)?;
        log::info!(
            "Loaded {}: {} vertices, {} triangles",
            path.display(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    /// Parse a mesh from OBJ source text.
    pub fn from_obj_str(input: &str) -> MeshResult<Self> {
        let set = obj::parse(input)?;

        let mut positions = Vec::new();
        let mut tex_coords = Vec::new();
        let mut normals = Vec::new();
        let mut faces = Vec::new();

        for object in &set.objects {
            // Object indices are local to the object's own arrays
            let vertex_base = positions.len() as u32;
            let tex_base = tex_coords.len() as u32;
            let normal_base = normals.len() as u32;

            positions.extend(
                object
                    .vertices
                    .iter()
                    .map(|v| Vec3::new(v.x as f32, v.y as f32, v.z as f32)),
            );
            tex_coords.extend(
                object
                    .tex_vertices
                    .iter()
                    .map(|t| Vec2::new(t.u as f32, t.v as f32)),
            );
            normals.extend(
                object
                    .normals
                    .iter()
                    .map(|n| Vec3::new(n.x as f32, n.y as f32, n.z as f32)),
            );

            let shapes = object.geometry.iter().flat_map(|g| g.shapes.iter());
            for shape in shapes {
                // Fans are anchored on the last corner, which comes first
                let Primitive::Triangle(c, a, b) = shape.primitive else {
                    continue;
                };
                let corners = [a, b, c];

                let vertices = corners.map(|(v, _, _)| vertex_base + v as u32);
                let tex = match corners.map(|(_, t, _)| t) {
                    [Some(ta), Some(tb), Some(tc)] => {
                        Some([ta, tb, tc].map(|t| tex_base + t as u32))
                    }
                    _ => None,
                };
                let norm = match corners.map(|(_, _, n)| n) {
                    [Some(na), Some(nb), Some(nc)] => {
                        Some([na, nb, nc].map(|n| normal_base + n as u32))
                    }
                    _ => None,
                };

                faces.push(FaceIndices {
                    vertices,
                    tex_coords: tex,
                    normals: norm,
                });
            }
        }

        Mesh::new(positions, normals, tex_coords, faces)
    }
}
