//! Triangle meshes placed in a scene, accelerated by a [`Bvh`].

use std::sync::Arc;

use caustic_core::Mesh;
use caustic_math::Ray;

use crate::bvh::{Bvh, BvhError, LeafQuery};
use crate::triangle::intersect_triangle;
use crate::{Hit, Material};

/// A mesh with one material and its own BVH.
#[derive(Debug, Clone)]
pub struct MeshObject {
    mesh: Arc<Mesh>,
    bvh: Bvh,
    material: Arc<Material>,
}

impl MeshObject {
    /// Build the BVH for `mesh` and bind a material to it.
    pub fn new(mesh: Arc<Mesh>, material: Arc<Material>) -> Result<Self, BvhError> {
        let bvh = Bvh::build(&mesh)?;
        Ok(Self { mesh, bvh, material })
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn intersect<'a>(&'a self, ray: &Ray, hit: &mut Hit<'a>, tmin: f32) -> bool {
        let mut query = MeshQuery {
            mesh: &self.mesh,
            material: &self.material,
            ray,
            hit,
            tmin,
        };
        self.bvh.query(ray, &mut query)
    }
}

/// Query context handed to the BVH for one ray.
struct MeshQuery<'q, 'a> {
    mesh: &'a Mesh,
    material: &'a Material,
    ray: &'q Ray,
    hit: &'q mut Hit<'a>,
    tmin: f32,
}

impl LeafQuery for MeshQuery<'_, '_> {
    fn intersect(&mut self, triangle: usize) -> bool {
        let corners = self.mesh.triangle(triangle);
        let Some(bary) = intersect_triangle(self.ray, &corners, self.tmin, self.hit.t) else {
            return false;
        };

        let normal = bary
            .interpolate(self.mesh.corner_normals(triangle))
            .normalize_or_zero();
        self.hit.set(bary.t, self.material, normal);
        if let Some(tex) = self.mesh.corner_tex_coords(triangle) {
            self.hit.set_tex_coord(bary.interpolate(tex));
        }
        true
    }
}
