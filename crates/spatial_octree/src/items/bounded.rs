//! Keyed objects indexed by an axis-aligned box.
//!
//! Ray hits land on the box surface. Nearest-point search measures to the
//! box, so a query point inside an object is at distance zero.

use glam::DVec3;

use super::check_bound;
use crate::bounds::DAabb3;
use crate::error::OctreeError;
use crate::item::{OctreeItem, RayHit};
use crate::ray::Ray;

/// Any object identified by `key` and occupying `bound`.
///
/// Equality compares keys only, so a moved object can be removed through
/// its old bound (see [`Octree::update`](crate::Octree::update)).
#[derive(Clone, Debug)]
pub struct BoundedItem<K> {
  /// Caller's identifier.
  pub key: K,
  /// Occupied box.
  pub bound: DAabb3,
}

impl<K> BoundedItem<K> {
  /// Create an item, rejecting non-finite or inverted boxes.
  pub fn new(key: K, bound: DAabb3) -> Result<Self, OctreeError> {
    Ok(Self {
      key,
      bound: check_bound(bound)?,
    })
  }
}

impl<K: PartialEq> PartialEq for BoundedItem<K> {
  fn eq(&self, other: &Self) -> bool {
    self.key == other.key
  }
}

impl<K: Clone + PartialEq> OctreeItem for BoundedItem<K> {
  fn bbox(&self) -> DAabb3 {
    self.bound
  }

  fn ray_intersect(&self, ray: &Ray) -> Option<RayHit> {
    let (t, axis) = self.bound.ray_entry_axis(ray)?;
    let normal = match axis {
      Some(axis) => {
        let mut n = DVec3::ZERO;
        n[axis] = -ray.direction[axis].signum();
        n
      }
      None => -ray.direction,
    };
    Some(RayHit {
      distance: t,
      point: ray.at(t),
      normal,
    })
  }

  fn sphere_distance(&self, center: DVec3) -> (DVec3, f64) {
    let closest = self.bound.closest_point(center);
    (closest, closest.distance(center))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn unit_box(key: u32) -> BoundedItem<u32> {
    BoundedItem::new(key, DAabb3::new(DVec3::ZERO, DVec3::ONE)).unwrap()
  }

  #[test]
  fn test_ray_hits_entry_face() {
    let item = unit_box(7);
    let hit = item
      .ray_intersect(&Ray::new(DVec3::new(0.5, 0.5, -3.0), DVec3::Z))
      .expect("ray enters through the -Z face");
    assert!((hit.distance - 3.0).abs() < 1e-12);
    assert_eq!(hit.normal, -DVec3::Z);
    assert!((hit.point - DVec3::new(0.5, 0.5, 0.0)).length() < 1e-12);
  }

  #[test]
  fn test_ray_from_inside_hits_at_origin() {
    let item = unit_box(7);
    let hit = item
      .ray_intersect(&Ray::new(DVec3::splat(0.5), DVec3::X))
      .unwrap();
    assert_eq!(hit.distance, 0.0);
    assert_eq!(hit.normal, -DVec3::X);
  }

  #[test]
  fn test_sphere_distance_zero_inside() {
    let item = unit_box(1);
    assert_eq!(item.sphere_distance(DVec3::splat(0.5)).1, 0.0);
    let (p, d) = item.sphere_distance(DVec3::new(3.0, 0.5, 0.5));
    assert_eq!(p, DVec3::new(1.0, 0.5, 0.5));
    assert!((d - 2.0).abs() < 1e-12);
  }

  #[test]
  fn test_rejects_invalid_bound() {
    let inverted = DAabb3 {
      min: DVec3::ONE,
      max: DVec3::ZERO,
    };
    assert!(BoundedItem::new(0u32, inverted).is_err());
  }
}
