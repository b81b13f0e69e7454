//! Bounding Volume Hierarchy (BVH) over the triangles of a mesh.
//!
//! Nodes live in one arena and refer to their children by position. Leaves
//! own a contiguous run of one shared index array, which is partitioned in
//! place while the tree is built. The tree never stores hit state: callers
//! pass a [`LeafQuery`] that carries the ray, the running hit record and the
//! bias, so one BVH can be queried from many threads at once.

use caustic_core::Mesh;
use caustic_math::{Aabb, BoundsError, Ray, Vec3};
use thiserror::Error;

/// Maximum triangles per leaf node before splitting.
pub const LEAF_SIZE: usize = 50;

/// Errors raised while building a BVH.
#[derive(Error, Debug)]
pub enum BvhError {
    #[error("cannot build a BVH over a mesh with no triangles")]
    EmptyMesh,

    #[error("triangle {index} has invalid bounds: {source}")]
    InvalidBounds {
        index: usize,
        #[source]
        source: BoundsError,
    },
}

/// BVH node - either a branch with two children or a leaf with triangles.
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// Internal node; `back` holds the lower half along `axis`.
    Branch {
        bbox: Aabb,
        back: usize,
        front: usize,
        axis: usize,
    },
    /// Leaf covering `indices[start..start + len]`.
    Leaf { bbox: Aabb, start: usize, len: usize },
}

impl BvhNode {
    pub fn bbox(&self) -> &Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => bbox,
        }
    }
}

/// Per-query callback invoked for every triangle of every leaf whose box the
/// ray crosses.
///
/// Implementations intersect the triangle against their own ray and hit
/// record and return true when the record was updated.
pub trait LeafQuery {
    fn intersect(&mut self, triangle: usize) -> bool;
}

impl<F> LeafQuery for F
where
    F: FnMut(usize) -> bool,
{
    fn intersect(&mut self, triangle: usize) -> bool {
        self(triangle)
    }
}

/// Binary BVH over triangle indices.
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    indices: Vec<usize>,
}

impl Bvh {
    /// Build a BVH over every triangle of a mesh.
    pub fn build(mesh: &Mesh) -> Result<Self, BvhError> {
        let triangles: Vec<[Vec3; 3]> = (0..mesh.triangle_count()).map(|i| mesh.triangle(i)).collect();
        Self::from_triangles(&triangles)
    }

    /// Build a BVH over triangles given by their corners.
    ///
    /// Triangle `i` of the slice is reported as index `i` to queries.
    pub fn from_triangles(triangles: &[[Vec3; 3]]) -> Result<Self, BvhError> {
        if triangles.is_empty() {
            return Err(BvhError::EmptyMesh);
        }

        let boxes = triangles
            .iter()
            .enumerate()
            .map(|(index, corners)| {
                Aabb::from_points(corners.iter().copied())
                    .ok_or(BvhError::EmptyMesh)?
                    .map_err(|source| BvhError::InvalidBounds { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut bvh = Self {
            nodes: Vec::with_capacity(2 * triangles.len() / LEAF_SIZE + 1),
            indices: (0..triangles.len()).collect(),
        };
        bvh.build_node(&boxes, 0, triangles.len());

        log::info!(
            "BVH built: {} triangles, {} nodes, {} leaves, depth {}",
            triangles.len(),
            bvh.node_count(),
            bvh.leaves().count(),
            bvh.depth()
        );

        Ok(bvh)
    }

    /// Recursive construction over `indices[start..end]`, which is never
    /// empty. Returns the arena position of the new node.
    fn build_node(&mut self, boxes: &[Aabb], start: usize, end: usize) -> usize {
        let slice = &self.indices[start..end];
        let bbox = slice[1..]
            .iter()
            .fold(boxes[slice[0]], |acc, &i| Aabb::surrounding(&acc, &boxes[i]));

        let len = end - start;
        if len <= LEAF_SIZE {
            self.nodes.push(BvhNode::Leaf { bbox, start, len });
            return self.nodes.len() - 1;
        }

        // Median split along the longest axis of the aggregate box
        let axis = bbox.longest_axis();
        self.indices[start..end].sort_by(|&a, &b| {
            boxes[a]
                .mid(axis)
                .total_cmp(&boxes[b].mid(axis))
                .then(a.cmp(&b))
        });

        // Reserve this node's slot, children fill in behind it
        let node = self.nodes.len();
        self.nodes.push(BvhNode::Leaf { bbox, start, len });

        let mid = start + len / 2;
        let back = self.build_node(boxes, start, mid);
        let front = self.build_node(boxes, mid, end);
        self.nodes[node] = BvhNode::Branch {
            bbox,
            back,
            front,
            axis,
        };
        node
    }

    /// Visit every leaf triangle whose boxes the ray crosses.
    ///
    /// Returns true when any call to the query reported a hit.
    pub fn query<Q: LeafQuery + ?Sized>(&self, ray: &Ray, query: &mut Q) -> bool {
        self.query_node(0, ray, query)
    }

    fn query_node<Q: LeafQuery + ?Sized>(&self, index: usize, ray: &Ray, query: &mut Q) -> bool {
        let node = &self.nodes[index];
        if node.bbox().intersect(ray).is_none() {
            return false;
        }

        match *node {
            BvhNode::Leaf { start, len, .. } => {
                let mut hit_anything = false;
                for &triangle in &self.indices[start..start + len] {
                    hit_anything |= query.intersect(triangle);
                }
                hit_anything
            }
            BvhNode::Branch { back, front, .. } => {
                let hit_front = self.query_node(front, ray, query);
                let hit_back = self.query_node(back, ray, query);
                hit_front || hit_back
            }
        }
    }

    /// Bounds of the whole tree.
    pub fn bounds(&self) -> &Aabb {
        self.nodes[0].bbox()
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Triangle indices held by each leaf.
    pub fn leaves(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.nodes.iter().filter_map(|node| match *node {
            BvhNode::Leaf { start, len, .. } => Some(&self.indices[start..start + len]),
            BvhNode::Branch { .. } => None,
        })
    }

    /// Number of levels from the root to the deepest leaf.
    pub fn depth(&self) -> usize {
        self.depth_from(0)
    }

    fn depth_from(&self, index: usize) -> usize {
        match self.nodes[index] {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { back, front, .. } => 1 + self.depth_from(back).max(self.depth_from(front)),
        }
    }
}
