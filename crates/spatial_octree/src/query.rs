//! Ray hit-testing and nearest-point search.
//!
//! Both walk the tree breadth-first and prune every subtree whose node bound
//! misses the query volume. Results use a single "best so far" slot: the
//! result list holds at most one entry, and it is only replaced by a strictly
//! closer candidate. A list that already holds an entry (for example from a
//! query against another tree) is compared against, not cleared.

use std::cell::Cell;

use glam::DVec3;

use crate::bounds::DAabb3;
use crate::item::{offer_best, HitRecord, NearestPoint, OctreeItem, RayHit};
use crate::metrics::Stopwatch;
use crate::node::NodeId;
use crate::ray::{Ray, RayQuery};
use crate::sphere::BoundingSphere;
use crate::tree::Octree;

/// Lowest accepted heuristic factor for nearest-point search.
pub const MIN_HEURISTIC_FACTOR: f64 = 0.1;
/// Highest accepted heuristic factor; 1.0 gives exact search.
pub const MAX_HEURISTIC_FACTOR: f64 = 1.0;

impl<T: OctreeItem> Octree<T> {
  /// Ray hit test.
  ///
  /// Visits every node whose bound the (model-space) ray touches and tests
  /// that node's own items. `hits` is a single-slot result: it receives the
  /// closest hit, replacing an existing entry only when strictly closer.
  /// Returns whether this call improved `hits`.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "octree::hit_test"))]
  pub fn hit_test(&mut self, query: &RayQuery, hits: &mut Vec<HitRecord<T>>) -> bool {
    let stopwatch = Stopwatch::start();
    let root = self.root;
    if self[root].is_empty() {
      return false;
    }

    let ray = query.local_ray();
    if let Some(sphere) = &query.model_sphere {
      if !sphere.intersects_ray(&ray) {
        return false;
      }
    }

    let record_path = self.params.record_hit_path;
    if record_path {
      self.hit_path.clear();
    }

    let mut improved = false;
    self.traverse(
      root,
      |tree, id| tree[id].bound.intersects_ray(&ray),
      |tree, id| {
        let mut node_improved = false;
        for item in &tree[id].objects {
          if let Some(hit) = item.ray_intersect(&ray) {
            let record = to_world_hit(query, hit, item.clone());
            node_improved |= offer_best(hits, record, |r| r.distance);
          }
        }
        if node_improved {
          improved = true;
          if record_path {
            tree.record_hit_path(id);
          }
        }
      },
      |_| false,
    );

    if let Some(us) = stopwatch.elapsed_us() {
      self.metrics.record_query_timing(us);
    }
    improved
  }

  /// Closest hit of a plain ray, if any.
  pub fn hit_test_nearest(&mut self, ray: Ray) -> Option<HitRecord<T>> {
    let mut hits = Vec::with_capacity(1);
    self.hit_test(&RayQuery::new(ray), &mut hits);
    hits.pop()
  }

  /// Nearest item point inside `sphere`.
  ///
  /// Only nodes whose bound touches the sphere are visited, and only item
  /// points within the radius qualify. Same single-slot protocol as
  /// [`hit_test`](Self::hit_test).
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "octree::nearest_by_sphere"))]
  pub fn find_nearest_point_by_sphere(
    &mut self,
    sphere: &BoundingSphere,
    results: &mut Vec<NearestPoint<T>>,
  ) -> bool {
    self.nearest_search(*sphere, None, results)
  }

  /// Nearest item point to `point`, searching with a shrinking sphere.
  ///
  /// The search starts unbounded; each time a better candidate is found the
  /// radius becomes `best_distance * heuristic_factor`. With a factor of 1.0
  /// the result is exact. Smaller factors prune harder and may settle for a
  /// nearby point that is not the nearest. The factor is clamped to
  /// `[0.1, 1.0]`.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "octree::nearest_from_point"))]
  pub fn find_nearest_point_from_point(
    &mut self,
    point: DVec3,
    heuristic_factor: f64,
    results: &mut Vec<NearestPoint<T>>,
  ) -> bool {
    let factor = clamp_heuristic(heuristic_factor);
    self.nearest_search(BoundingSphere::infinite(point), Some(factor), results)
  }

  /// Single-result form of
  /// [`find_nearest_point_by_sphere`](Self::find_nearest_point_by_sphere).
  pub fn nearest_point_by_sphere(&mut self, sphere: &BoundingSphere) -> Option<NearestPoint<T>> {
    let mut results = Vec::with_capacity(1);
    self.find_nearest_point_by_sphere(sphere, &mut results);
    results.pop()
  }

  /// Single-result form of
  /// [`find_nearest_point_from_point`](Self::find_nearest_point_from_point).
  pub fn nearest_point_from_point(
    &mut self,
    point: DVec3,
    heuristic_factor: f64,
  ) -> Option<NearestPoint<T>> {
    let mut results = Vec::with_capacity(1);
    self.find_nearest_point_from_point(point, heuristic_factor, &mut results);
    results.pop()
  }

  fn nearest_search(
    &mut self,
    sphere: BoundingSphere,
    shrink_factor: Option<f64>,
    results: &mut Vec<NearestPoint<T>>,
  ) -> bool {
    let stopwatch = Stopwatch::start();
    let root = self.root;
    if self[root].is_empty() {
      return false;
    }

    let center = sphere.center;
    let radius = Cell::new(sphere.radius);
    let mut improved = false;
    self.traverse(
      root,
      |tree, id| {
        tree[id]
          .bound
          .intersects_sphere(&BoundingSphere::new(center, radius.get()))
      },
      |tree, id| {
        for item in &tree[id].objects {
          let (point, distance) = item.sphere_distance(center);
          if distance > radius.get() {
            continue;
          }
          let candidate = NearestPoint {
            distance,
            point,
            item: item.clone(),
          };
          if offer_best(results, candidate, |r| r.distance) {
            improved = true;
            if let Some(factor) = shrink_factor {
              radius.set(distance * factor);
            }
          }
        }
      },
      |_| false,
    );

    if let Some(us) = stopwatch.elapsed_us() {
      self.metrics.record_query_timing(us);
    }
    improved
  }
}

impl<T> Octree<T> {
  /// Store the bounds from the root down to `id`.
  fn record_hit_path(&mut self, id: NodeId) {
    let mut path: Vec<DAabb3> = Vec::new();
    let mut current = Some(id);
    while let Some(node) = current.and_then(|c| self.node(c)) {
      path.push(node.bound);
      current = node.parent;
    }
    path.reverse();
    self.hit_path = path;
  }
}

/// Clamp a heuristic factor into `[0.1, 1.0]`; NaN maps to exact search.
pub fn clamp_heuristic(factor: f64) -> f64 {
  if factor.is_nan() {
    return MAX_HEURISTIC_FACTOR;
  }
  factor.clamp(MIN_HEURISTIC_FACTOR, MAX_HEURISTIC_FACTOR)
}

/// Map a model-space hit back to world space.
fn to_world_hit<T>(query: &RayQuery, hit: RayHit, item: T) -> HitRecord<T> {
  match &query.model_transform {
    None => HitRecord {
      distance: hit.distance,
      point: hit.point,
      normal: hit.normal,
      item,
    },
    Some(m) => {
      let point = m.transform_point3(hit.point);
      let normal = (m.matrix3.inverse().transpose() * hit.normal).normalize_or_zero();
      HitRecord {
        distance: query.ray.origin.distance(point),
        point,
        normal,
        item,
      }
    }
  }
}

#[cfg(test)]
#[path = "query_test.rs"]
mod query_test;
