//! Triangle mesh geometry.
//!
//! Holds positions, normals and texture coordinates as separately indexed
//! arrays, the way OBJ files store them. Every face ends up with normal
//! indices: either the ones supplied by the source or ones generated at
//! construction time.

use caustic_math::{Aabb, BoundsError, Vec2, Vec3};
use thiserror::Error;

/// Meshes with more faces than this get smooth generated normals; smaller
/// meshes get one flat normal per face.
pub const SMOOTH_NORMAL_THRESHOLD: usize = 200;

/// Errors that can occur while building or loading a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("mesh has no faces")]
    NoFaces,

    #[error("face {face} references {kind} index {index}, but only {len} exist")]
    IndexOutOfRange {
        face: usize,
        kind: &'static str,
        index: u32,
        len: usize,
    },

    #[error("invalid mesh bounds: {0}")]
    Bounds(#[from] BoundsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OBJ parse error: {0}")]
    Parse(#[from] wavefront_obj::ParseError),
}

pub type MeshResult<T> = Result<T, MeshError>;

/// Face indices as read from a source file.
///
/// Normal and texture-coordinate indices are optional per face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceIndices {
    pub vertices: [u32; 3],
    pub tex_coords: Option<[u32; 3]>,
    pub normals: Option<[u32; 3]>,
}

impl FaceIndices {
    /// A face with positions only.
    pub fn new(vertices: [u32; 3]) -> Self {
        Self {
            vertices,
            tex_coords: None,
            normals: None,
        }
    }
}

/// A resolved triangle: every corner has a position and a normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub vertices: [u32; 3],
    pub normals: [u32; 3],
    pub tex_coords: Option<[u32; 3]>,
}

/// Where the normals of a mesh came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalSource {
    /// Indexed normals supplied with the geometry
    Supplied,
    /// One generated normal per face
    Flat,
    /// Generated per-vertex normals averaged over adjacent faces
    Smooth,
}

/// A triangle mesh with indexed positions, normals and texture coordinates.
#[derive(Clone, Debug)]
pub struct Mesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    tex_coords: Vec<Vec2>,
    faces: Vec<Face>,
    normal_source: NormalSource,
    bounds: Aabb,
}

impl Mesh {
    /// Build a mesh, validating every index and resolving normals.
    ///
    /// Normals are generated when any face lacks normal indices. Generated
    /// normals are smooth for meshes above [`SMOOTH_NORMAL_THRESHOLD`] faces
    /// and flat otherwise.
    pub fn new(
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        tex_coords: Vec<Vec2>,
        faces: Vec<FaceIndices>,
    ) -> MeshResult<Self> {
        if faces.is_empty() {
            return Err(MeshError::NoFaces);
        }

        for (i, face) in faces.iter().enumerate() {
            check_indices(i, "vertex", &face.vertices, positions.len())?;
            if let Some(tex) = &face.tex_coords {
                check_indices(i, "texture coordinate", tex, tex_coords.len())?;
            }
            if let Some(norm) = &face.normals {
                check_indices(i, "normal", norm, normals.len())?;
            }
        }

        let bounds = Aabb::from_points(positions.iter().copied()).ok_or(MeshError::NoFaces)??;

        let supplied = faces.iter().all(|f| f.normals.is_some());
        let (normals, faces, normal_source) = if supplied {
            let faces: Vec<Face> = faces
                .iter()
                .map(|f| Face {
                    vertices: f.vertices,
                    normals: f.normals.unwrap_or(f.vertices),
                    tex_coords: f.tex_coords,
                })
                .collect();
            (normals, faces, NormalSource::Supplied)
        } else if faces.len() > SMOOTH_NORMAL_THRESHOLD {
            let normals = smooth_normals(&positions, &faces);
            let faces: Vec<Face> = faces
                .iter()
                .map(|f| Face {
                    vertices: f.vertices,
                    normals: f.vertices,
                    tex_coords: f.tex_coords,
                })
                .collect();
            (normals, faces, NormalSource::Smooth)
        } else {
            let normals = flat_normals(&positions, &faces);
            let faces: Vec<Face> = faces
                .iter()
                .enumerate()
                .map(|(i, f)| Face {
                    vertices: f.vertices,
                    normals: [i as u32; 3],
                    tex_coords: f.tex_coords,
                })
                .collect();
            (normals, faces, NormalSource::Flat)
        };

        log::debug!(
            "Built mesh: {} vertices, {} faces, {:?} normals",
            positions.len(),
            faces.len(),
            normal_source
        );

        Ok(Self {
            positions,
            normals,
            tex_coords,
            faces,
            normal_source,
            bounds,
        })
    }

    /// Build a mesh from positions and face indices only.
    pub fn from_triangles(positions: Vec<Vec3>, triangles: &[[u32; 3]]) -> MeshResult<Self> {
        let faces = triangles.iter().map(|t| FaceIndices::new(*t)).collect();
        Self::new(positions, Vec::new(), Vec::new(), faces)
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn normal_source(&self) -> NormalSource {
        self.normal_source
    }

    /// Bounds of all vertex positions.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// True when faces carry texture coordinates.
    pub fn has_tex_coords(&self) -> bool {
        self.faces.iter().any(|f| f.tex_coords.is_some())
    }

    /// Corner positions of triangle `i`.
    #[inline]
    pub fn triangle(&self, i: usize) -> [Vec3; 3] {
        let [a, b, c] = self.faces[i].vertices;
        [
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ]
    }

    /// Corner normals of triangle `i`.
    #[inline]
    pub fn corner_normals(&self, i: usize) -> [Vec3; 3] {
        let [a, b, c] = self.faces[i].normals;
        [
            self.normals[a as usize],
            self.normals[b as usize],
            self.normals[c as usize],
        ]
    }

    /// Corner texture coordinates of triangle `i`, if it has any.
    #[inline]
    pub fn corner_tex_coords(&self, i: usize) -> Option<[Vec2; 3]> {
        let [a, b, c] = self.faces[i].tex_coords?;
        Some([
            self.tex_coords[a as usize],
            self.tex_coords[b as usize],
            self.tex_coords[c as usize],
        ])
    }
}

fn check_indices(face: usize, kind: &'static str, indices: &[u32; 3], len: usize) -> MeshResult<()> {
    match indices.iter().find(|&&i| i as usize >= len) {
        Some(&index) => Err(MeshError::IndexOutOfRange {
            face,
            kind,
            index,
            len,
        }),
        None => Ok(()),
    }
}

/// Unnormalized face normal; its length is twice the triangle area.
fn face_normal(positions: &[Vec3], vertices: &[u32; 3]) -> Vec3 {
    let a = positions[vertices[0] as usize];
    let b = positions[vertices[1] as usize];
    let c = positions[vertices[2] as usize];
    (b - a).cross(c - a)
}

/// One normal per face.
fn flat_normals(positions: &[Vec3], faces: &[FaceIndices]) -> Vec<Vec3> {
    faces
        .iter()
        .map(|f| face_normal(positions, &f.vertices).try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

/// Area-weighted average of adjacent face normals at every vertex.
fn smooth_normals(positions: &[Vec3], faces: &[FaceIndices]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for face in faces {
        let n = face_normal(positions, &face.vertices);
        for &v in &face.vertices {
            normals[v as usize] += n;
        }
    }
    for normal in &mut normals {
        // Default up normal for unreferenced or degenerate vertices
        *normal = normal.try_normalize().unwrap_or(Vec3::Y);
    }
    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_positions() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = Mesh::from_triangles(quad_positions(), &[[0, 1, 2], [0, 2, 3]]).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(!mesh.has_tex_coords());
        assert_eq!(mesh.bounds().upper(), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let err = Mesh::from_triangles(quad_positions(), &[]).unwrap_err();
        assert!(matches!(err, MeshError::NoFaces));
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let err = Mesh::from_triangles(quad_positions(), &[[0, 1, 7]]).unwrap_err();
        assert!(matches!(
            err,
            MeshError::IndexOutOfRange {
                face: 0,
                index: 7,
                ..
            }
        ));
    }

    #[test]
    fn test_non_finite_vertex_rejected() {
        let mut positions = quad_positions();
        positions[2].x = f32::NAN;
        let err = Mesh::from_triangles(positions, &[[0, 1, 2]]).unwrap_err();
        assert!(matches!(err, MeshError::Bounds(_)));
    }

    #[test]
    fn test_flat_normals_for_small_mesh() {
        let mesh = Mesh::from_triangles(quad_positions(), &[[0, 1, 2], [0, 2, 3]]).unwrap();

        assert_eq!(mesh.normal_source(), NormalSource::Flat);
        // Counterclockwise in XY viewed from +Z faces +Z
        for i in 0..mesh.triangle_count() {
            for n in mesh.corner_normals(i) {
                assert!((n - Vec3::Z).length() < 1e-6);
            }
        }
    }

    #[test]
    fn test_smooth_normals_for_large_mesh() {
        // A fan of triangles around the origin, tilted so vertex normals differ
        let segments = SMOOTH_NORMAL_THRESHOLD + 1;
        let mut positions = vec![Vec3::new(0.0, 0.0, 1.0)];
        for i in 0..segments {
            let a = i as f32 / segments as f32 * std::f32::consts::TAU;
            positions.push(Vec3::new(a.cos(), a.sin(), 0.0));
        }
        let triangles: Vec<[u32; 3]> = (0..segments as u32)
            .map(|i| [0, 1 + i, 1 + (i + 1) % segments as u32])
            .collect();

        let mesh = Mesh::from_triangles(positions, &triangles).unwrap();
        assert_eq!(mesh.normal_source(), NormalSource::Smooth);

        // The apex normal averages the whole cone and points straight up
        let apex = mesh.corner_normals(0)[0];
        assert!((apex - Vec3::Z).length() < 1e-4);

        // Rim normals lean outward
        let rim = mesh.corner_normals(0)[1];
        assert!(rim.z > 0.0 && rim.z < 1.0);
        assert!((rim.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_supplied_normals_and_tex_coords() {
        let normals = vec![Vec3::X, Vec3::Y, Vec3::Z];
        let tex = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        let faces = vec![FaceIndices {
            vertices: [0, 1, 2],
            tex_coords: Some([2, 1, 0]),
            normals: Some([1, 2, 0]),
        }];

        let mesh = Mesh::new(quad_positions(), normals, tex, faces).unwrap();

        assert_eq!(mesh.normal_source(), NormalSource::Supplied);
        assert_eq!(mesh.corner_normals(0), [Vec3::Y, Vec3::Z, Vec3::X]);
        assert_eq!(
            mesh.corner_tex_coords(0),
            Some([Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 0.0)])
        );
        assert!(mesh.has_tex_coords());
    }

    #[test]
    fn test_partial_normals_fall_back_to_generated() {
        let faces = vec![
            FaceIndices {
                vertices: [0, 1, 2],
                tex_coords: None,
                normals: Some([0, 0, 0]),
            },
            FaceIndices::new([0, 2, 3]),
        ];
        let mesh = Mesh::new(quad_positions(), vec![Vec3::X], Vec::new(), faces).unwrap();
        assert_eq!(mesh.normal_source(), NormalSource::Flat);
    }
}
