//! The item contract consumed by the tree and the records queries produce.

use glam::DVec3;

use crate::bounds::DAabb3;
use crate::ray::Ray;

/// Geometric surface hit reported by an item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
  /// Distance from the ray origin.
  pub distance: f64,
  /// Hit position.
  pub point: DVec3,
  /// Surface normal at the hit (unit length).
  pub normal: DVec3,
}

/// Anything the octree can index.
///
/// Items are cheap handles (`Clone`) compared by value (`PartialEq`) when
/// they are removed.
pub trait OctreeItem: Clone + PartialEq {
  /// Bounding box of the item in tree space.
  fn bbox(&self) -> DAabb3;

  /// Intersect the item with a ray (unit direction, tree space).
  fn ray_intersect(&self, ray: &Ray) -> Option<RayHit>;

  /// Closest point on the item to `center` and its distance.
  fn sphere_distance(&self, center: DVec3) -> (DVec3, f64);
}

/// Best ray hit of a query, with the item that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct HitRecord<T> {
  /// Distance from the world-space ray origin.
  pub distance: f64,
  /// World-space hit position.
  pub point: DVec3,
  /// World-space surface normal.
  pub normal: DVec3,
  /// The item that was hit.
  pub item: T,
}

/// Best nearest-point candidate of a query.
#[derive(Clone, Debug, PartialEq)]
pub struct NearestPoint<T> {
  /// Distance from the query center.
  pub distance: f64,
  /// Closest point on the item.
  pub point: DVec3,
  /// The item that owns the point.
  pub item: T,
}

/// Single-slot "best so far" update used by every query.
///
/// The slot is a list for call-site compatibility but holds at most one
/// entry: an empty list takes the candidate, otherwise entry 0 is replaced
/// only when the candidate is strictly closer. Returns whether it changed.
pub(crate) fn offer_best<R>(results: &mut Vec<R>, candidate: R, distance_of: impl Fn(&R) -> f64) -> bool {
  match results.first() {
    None => {
      results.push(candidate);
      true
    }
    Some(current) if distance_of(&candidate) < distance_of(current) => {
      results[0] = candidate;
      true
    }
    Some(_) => false,
  }
}
