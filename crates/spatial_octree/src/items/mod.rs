//! Item types for common geometry.
//!
//! Each adapter implements [`OctreeItem`](crate::OctreeItem) and rejects
//! NaN/infinite input at construction, so the tree only ever sees valid
//! bounds.

pub mod bounded;
pub mod instances;
pub mod mesh;
pub mod points;

pub use bounded::BoundedItem;
pub use instances::InstanceItem;
pub use mesh::{triangles_from_indexed, Triangle};
pub use points::{points_from_positions, PointItem};

use glam::DVec3;

use crate::bounds::DAabb3;
use crate::error::OctreeError;

/// Reject a point with a NaN or infinite coordinate.
fn check_finite(point: DVec3) -> Result<DVec3, OctreeError> {
  if point.is_finite() {
    Ok(point)
  } else {
    Err(OctreeError::InvalidBounds {
      min: point,
      max: point,
    })
  }
}

/// Reject a box that is not finite and ordered.
fn check_bound(bound: DAabb3) -> Result<DAabb3, OctreeError> {
  if bound.is_valid() {
    Ok(bound)
  } else {
    Err(OctreeError::InvalidBounds {
      min: bound.min,
      max: bound.max,
    })
  }
}
