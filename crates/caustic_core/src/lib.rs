//! Caustic Core - geometry and texture data for the renderer.
//!
//! This crate provides:
//!
//! - **Meshes**: indexed triangle meshes with generated or supplied normals
//! - **OBJ support**: Wavefront OBJ loading into [`Mesh`]
//! - **Textures**: bilinear image lookup for diffuse colour
//!
//! # Example
//!
//! ```ignore
//! use caustic_core::Mesh;
//!
//! let mesh = Mesh::load_obj("bunny.obj")?;
//! println!("Loaded {} triangles", mesh.triangle_count());
//! ```

pub mod mesh;
mod obj;
pub mod texture;

// Re-export commonly used types
pub use mesh::{Face, FaceIndices, Mesh, MeshError, NormalSource};
pub use texture::{Texture, TextureError};
