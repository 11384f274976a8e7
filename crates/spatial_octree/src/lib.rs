//! spatial_octree - Dynamic generic octree for ray hit-testing and
//! nearest-point search
//!
//! The tree indexes any item type that can report a bounding box, intersect a
//! ray and measure its distance to a point. Items live at the deepest node
//! whose bound fully contains theirs; items straddling an octant boundary
//! stay with the parent.
//!
//! # Features
//!
//! - **Bulk build**: top-down subdivision, level by level, no recursion
//! - **Incremental updates**: add, remove, re-split, auto-delete of empty
//!   nodes, root expansion and collapse
//! - **Queries**: closest ray hit with optional model transform and
//!   bounding-sphere filter, nearest point by sphere or from a point with a
//!   heuristic shrink factor
//! - **Adapters**: triangle meshes, point clouds, bounded objects and
//!   transformed instances
//!
//! # Example
//!
//! ```ignore
//! use glam::DVec3;
//! use spatial_octree::{items::triangles_from_indexed, BuildParams, Octree, Ray};
//!
//! let triangles = triangles_from_indexed(&positions, &indices)?;
//! let mut tree = Octree::build(triangles, BuildParams::DEFAULT)?;
//!
//! if let Some(hit) = tree.hit_test_nearest(Ray::new(DVec3::new(0.0, 0.0, -10.0), DVec3::Z)) {
//!   println!("hit triangle {} at {}", hit.item.index, hit.point);
//! }
//! ```

pub mod bounds;
pub mod config;
pub mod error;
pub mod item;
pub mod ray;
pub mod sphere;

// Re-export commonly used items
pub use bounds::{Containment, DAabb3};
pub use config::BuildParams;
pub use error::OctreeError;
pub use item::{HitRecord, NearestPoint, OctreeItem, RayHit};
pub use ray::{Ray, RayQuery};
pub use sphere::BoundingSphere;

// Arena, nodes and the walk shared by every operation
pub mod node;
pub mod traversal;
pub mod tree;
pub use node::{NodeId, OctreeNode};
pub use tree::Octree;

// Operations on the tree
pub mod build;
pub mod mutation;
pub mod query;
pub use mutation::MAX_EXPAND_ATTEMPTS;
pub use query::{clamp_heuristic, MAX_HEURISTIC_FACTOR, MIN_HEURISTIC_FACTOR};

// Ready-made item types
pub mod items;

// Engine-agnostic metrics (feature-gated)
pub mod metrics;
pub use metrics::TreeMetrics;

#[cfg(test)]
pub(crate) mod test_util;
