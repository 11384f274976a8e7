//! Instances of one local shape placed by affine transforms.
//!
//! The shape is represented by its local box. Ray tests run in local space
//! and are mapped back, so rotated instances are hit on their true (oriented)
//! box rather than on the world AABB used for indexing.

use glam::{DAffine3, DVec3};

use super::check_bound;
use crate::bounds::DAabb3;
use crate::error::OctreeError;
use crate::item::{OctreeItem, RayHit};
use crate::ray::Ray;

/// One placed instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InstanceItem {
  /// Instance index.
  pub index: usize,
  /// Local-to-world transform.
  pub transform: DAffine3,
  /// Bound of the shared shape in local space.
  pub local_bound: DAabb3,
}

impl InstanceItem {
  /// Create an instance. The transform must be finite and invertible.
  pub fn new(index: usize, transform: DAffine3, local_bound: DAabb3) -> Result<Self, OctreeError> {
    let local_bound = check_bound(local_bound)?;
    let det = transform.matrix3.determinant();
    if !(transform.is_finite() && det.is_finite() && det != 0.0) {
      return Err(OctreeError::InvalidParams("instance transform must be finite and invertible"));
    }
    Ok(Self {
      index,
      transform,
      local_bound,
    })
  }
}

impl OctreeItem for InstanceItem {
  fn bbox(&self) -> DAabb3 {
    self.local_bound.transformed(&self.transform)
  }

  fn ray_intersect(&self, ray: &Ray) -> Option<RayHit> {
    let local = ray.transformed(&self.transform.inverse());
    let (t, axis) = self.local_bound.ray_entry_axis(&local)?;
    let local_point = local.at(t);
    let point = self.transform.transform_point3(local_point);

    let normal = match axis {
      Some(axis) => {
        let mut n = DVec3::ZERO;
        n[axis] = -local.direction[axis].signum();
        (self.transform.matrix3.inverse().transpose() * n).normalize_or_zero()
      }
      None => -ray.direction,
    };
    Some(RayHit {
      distance: ray.origin.distance(point),
      point,
      normal,
    })
  }

  /// Distance to the world-space box of the instance.
  fn sphere_distance(&self, center: DVec3) -> (DVec3, f64) {
    let closest = self.bbox().closest_point(center);
    (closest, closest.distance(center))
  }
}
