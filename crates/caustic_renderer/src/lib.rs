//! Caustic Renderer - recursive Monte Carlo ray tracing
//!
//! Traces primary rays through a [`Scene`] of analytic primitives and
//! BVH-accelerated triangle meshes. Surfaces are shaded by their
//! [`Material`]: Phong and glass surfaces spawn Fresnel-weighted reflection
//! and refraction rays, ambient and glossy surfaces sample random bounces.
//! A per-path [`MediumStack`] tracks the refraction index of nested
//! transparent objects, and emissive [`LightObject`]s double as area lights.
//!
//! Images are rendered in parallel buckets with [`render`].

mod bucket;
mod bvh;
mod camera;
mod config;
mod error;
mod hit;
mod light;
mod light_object;
mod material;
mod medium;
mod mesh_object;
mod object;
mod plane;
mod renderer;
mod scene;
mod sphere;
mod tracer;
mod transform;
mod triangle;
mod velocity;

pub mod optics;
pub mod sampling;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult};
pub use bvh::{Bvh, BvhError, BvhNode, LeafQuery, LEAF_SIZE};
pub use camera::PerspectiveCamera;
pub use config::{RenderConfig, TracerConfig};
pub use error::{ConfigError, RenderError, SceneError};
pub use hit::{Hit, Surface};
pub use light::{Illumination, Light};
pub use light_object::{LightGroup, LightObject, LightShape};
pub use material::{Color, Material, MaterialKind};
pub use medium::{MediumStack, VACUUM};
pub use mesh_object::MeshObject;
pub use object::{Group, Object};
pub use plane::Plane;
pub use renderer::{color_to_rgba, render, render_pixel, ImageBuffer, RenderStats};
pub use scene::Scene;
pub use sphere::Sphere;
pub use tracer::{clamp_color, TraceContext, Tracer};
pub use transform::Transform;
pub use triangle::Triangle;
pub use velocity::Velocity;

/// Re-export common math types from caustic_math
pub use caustic_math::{Aabb, Ray, Vec2, Vec3};
