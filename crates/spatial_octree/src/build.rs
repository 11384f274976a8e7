//! Top-down subdivision.
//!
//! A node splits by moving every item that fits entirely inside one of its
//! octants into a child for that octant; items straddling an octant boundary
//! stay with the node. A full build feeds each new child back through the
//! breadth-first walk, so the tree is built level by level without recursion.

use crate::item::OctreeItem;
use crate::metrics::Stopwatch;
use crate::node::{NodeId, OctreeNode};
use crate::tree::Octree;

impl<T: OctreeItem> Octree<T> {
  /// Build the whole tree from the root.
  ///
  /// A zero-size root bound is first recomputed from the root's items. If
  /// the bound is still degenerate or smaller than `minimum_octant_size` on
  /// every axis, the root is left unbuilt and holds its items directly.
  /// Returns whether the root was built.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "octree::build_tree"))]
  pub fn build_tree(&mut self) -> bool {
    let stopwatch = Stopwatch::start();
    let root = self.root;

    if self[root].bound.is_degenerate() {
      let enclosing = self[root]
        .objects
        .iter()
        .map(|item| item.bbox())
        .reduce(|a, b| a.union(&b));
      if let Some(bound) = enclosing {
        self[root].set_bound(bound);
      }
    }

    let bound = self[root].bound;
    if !self.params.exceeds_minimum_size(&bound) {
      self[root].built = false;
      #[cfg(feature = "tracing")]
      tracing::debug!(?bound, "root too small to build");
      return false;
    }

    if self.params.cubify && !self[root].has_children() {
      self[root].set_bound(bound.cubify());
    }

    self.build_subtree(root);

    if let Some(us) = stopwatch.elapsed_us() {
      self.metrics.record_build_timing(us);
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(nodes = self.node_count(), items = self.len(), "octree built");
    true
  }

  /// Run the subdivision pass of a single node, leaving its children unbuilt.
  ///
  /// No-op for built nodes and stale handles. A node with at most one item
  /// is marked built without splitting.
  pub fn build_current_node_only(&mut self, id: NodeId) {
    let Some(node) = self.node_mut(id) else {
      return;
    };
    if node.built {
      return;
    }
    if node.objects.len() <= 1 {
      node.built = true;
      return;
    }
    self.subdivide(id);
  }

  /// Build `id` and everything below it, level by level.
  pub(crate) fn build_subtree(&mut self, id: NodeId) {
    self.traverse_all(id, |tree, node| tree.build_current_node_only(node));
  }

  /// Partition the node's items into octant children.
  ///
  /// Stops (marking the node built) unless the item count is above
  /// `min_object_size_to_split` and the bound reaches `minimum_octant_size`.
  /// Items go to the first octant that fully contains their bound. Octants
  /// that already have a child receive the items into that child, which is
  /// marked unbuilt so the ongoing walk splits it again.
  pub(crate) fn subdivide(&mut self, id: NodeId) {
    let Some((count, bound)) = self.node(id).map(|n| (n.objects.len(), n.bound)) else {
      return;
    };
    if !self.params.should_split(count, &bound) {
      self[id].built = true;
      return;
    }

    let node = &mut self[id];
    let octants = node.octant_bounds;
    let mut buckets: [Vec<T>; 8] = std::array::from_fn(|_| Vec::new());
    let mut retained = Vec::new();
    for item in std::mem::take(&mut node.objects) {
      let bbox = item.bbox();
      match octants.iter().position(|o| o.fully_contains(&bbox)) {
        Some(octant) => buckets[octant].push(item),
        None => retained.push(item),
      }
    }
    node.objects = retained;
    node.built = true;

    for (octant, bucket) in buckets.into_iter().enumerate() {
      if bucket.is_empty() {
        continue;
      }
      let slot = self[id].children[octant];
      match slot {
        Some(existing) => {
          let child = &mut self[existing];
          child.objects.extend(bucket);
          child.built = false;
        }
        None => {
          let child = self.alloc(OctreeNode::new(octants[octant], bucket, Some(id)));
          self[id].set_child(octant, child);
        }
      }
    }
  }
}

#[cfg(test)]
#[path = "build_test.rs"]
mod build_test;
