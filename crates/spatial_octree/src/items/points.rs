//! Point cloud items.
//!
//! A point has no surface, so a ray "hits" it when it passes within
//! `hit_radius` of the point. The reported hit is the point itself. The
//! bounding box is padded by the same radius so node pruning never drops a
//! pickable point.

use glam::DVec3;

use super::check_finite;
use crate::bounds::DAabb3;
use crate::error::OctreeError;
use crate::item::{OctreeItem, RayHit};
use crate::ray::Ray;

/// One point of a cloud.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointItem {
  /// Index in the source position buffer.
  pub index: usize,
  /// Position.
  pub position: DVec3,
  /// Ray pick tolerance (perpendicular distance).
  pub hit_radius: f64,
}

impl PointItem {
  /// Create a point, rejecting non-finite positions and negative or
  /// non-finite radii.
  pub fn new(index: usize, position: DVec3, hit_radius: f64) -> Result<Self, OctreeError> {
    check_finite(position)?;
    if !(hit_radius.is_finite() && hit_radius >= 0.0) {
      return Err(OctreeError::InvalidParams("hit_radius must be finite and >= 0"));
    }
    Ok(Self {
      index,
      position,
      hit_radius,
    })
  }
}

impl OctreeItem for PointItem {
  fn bbox(&self) -> DAabb3 {
    DAabb3::from_center_half_extents(self.position, DVec3::splat(self.hit_radius))
  }

  fn ray_intersect(&self, ray: &Ray) -> Option<RayHit> {
    let along = (self.position - ray.origin).dot(ray.direction);
    if along < 0.0 {
      return None;
    }
    let foot = ray.at(along);
    if foot.distance_squared(self.position) > self.hit_radius * self.hit_radius {
      return None;
    }
    Some(RayHit {
      distance: ray.origin.distance(self.position),
      point: self.position,
      normal: -ray.direction,
    })
  }

  fn sphere_distance(&self, center: DVec3) -> (DVec3, f64) {
    (self.position, self.position.distance(center))
  }
}

/// Wrap a position buffer as point items sharing one pick radius.
pub fn points_from_positions(
  positions: &[DVec3],
  hit_radius: f64,
) -> Result<Vec<PointItem>, OctreeError> {
  positions
    .iter()
    .enumerate()
    .map(|(index, &position)| PointItem::new(index, position, hit_radius))
    .collect()
}
