//! Incremental mutation: insertion, removal, root growth and root collapse.
//!
//! An `add` that lands outside the root is an expected outcome, not an
//! error: the caller grows the root with [`Octree::expand`] and retries, or
//! lets [`Octree::add_with_expand`] do that loop.

use std::cell::Cell;

use glam::DVec3;

use crate::bounds::DAabb3;
use crate::error::OctreeError;
use crate::item::OctreeItem;
use crate::node::{NodeId, OctreeNode};
use crate::tree::{checked_bbox, Octree};

/// Expansions attempted by [`Octree::add_with_expand`] before giving up.
pub const MAX_EXPAND_ATTEMPTS: usize = 10;

impl<T: OctreeItem> Octree<T> {
  /// Deepest existing node whose bound fully contains `bound`, or `None`
  /// when the root does not contain it.
  pub fn find_smallest_node_containing(&mut self, bound: &DAabb3) -> Option<NodeId> {
    let root = self.root;
    if !self[root].bound.fully_contains(bound) {
      return None;
    }
    // Breadth-first, so the last node accepted is the deepest one.
    let mut found = None;
    self.traverse(
      root,
      |tree, id| tree[id].bound.fully_contains(bound),
      |_, id| found = Some(id),
      |_| false,
    );
    found
  }

  /// Insert an item. Returns `false` when the item lies outside the root
  /// bound; the tree is unchanged in that case.
  pub fn add(&mut self, item: T) -> bool {
    self.try_add(item).is_ok()
  }

  /// Insert, handing the item back when it lies outside the root.
  ///
  /// The item goes to the deepest node containing its bound. If that node
  /// has already split and the item fits one of its vacant octants, a new
  /// child is created for it. If the node is a leaf that now holds more
  /// than `min_object_size_to_split` items, the leaf is split again locally.
  pub(crate) fn try_add(&mut self, item: T) -> Result<NodeId, T> {
    let bound = item.bbox();
    let root = self.root;

    if self[root].is_empty() && self[root].bound.is_degenerate() && bound.is_valid() {
      self[root].set_bound(bound);
    }

    let Some(id) = self.find_smallest_node_containing(&bound) else {
      #[cfg(feature = "tracing")]
      tracing::debug!(?bound, "item outside root bound");
      return Err(item);
    };

    let node = &self[id];
    if node.has_children() {
      if let Some(octant) = node.octant_bounds.iter().position(|o| o.fully_contains(&bound)) {
        return Ok(self.push_into_octant(id, octant, item));
      }
      self[id].objects.push(item);
      return Ok(id);
    }

    let node = &mut self[id];
    node.objects.push(item);
    let (count, node_bound) = (node.objects.len(), node.bound);
    if self.params.should_split(count, &node_bound) {
      #[cfg(feature = "tracing")]
      tracing::debug!(node = ?id, items = count, "re-splitting leaf");
      self[id].built = false;
      self.build_subtree(id);
    }
    Ok(id)
  }

  /// Hand `item` to child slot `octant` of `parent`, creating the child if
  /// the slot is vacant.
  fn push_into_octant(&mut self, parent: NodeId, octant: usize, item: T) -> NodeId {
    let slot = self[parent].children[octant];
    match slot {
      Some(child) => {
        // Children are created from their octant, so this only happens when
        // the child bound drifted by rounding; the child sorts it out.
        let node = &mut self[child];
        node.objects.push(item);
        node.built = false;
        self.build_subtree(child);
        child
      }
      None => {
        let bound = self[parent].octant_bounds[octant];
        let child = self.alloc(OctreeNode::new(bound, vec![item], Some(parent)));
        self[parent].set_child(octant, child);
        self.build_current_node_only(child);
        child
      }
    }
  }

  /// Insert, growing the root toward the item until it fits.
  ///
  /// Gives up with [`OctreeError::ExpandLimitExceeded`] after
  /// [`MAX_EXPAND_ATTEMPTS`] expansions. Items with NaN or infinite bounds
  /// are rejected up front.
  pub fn add_with_expand(&mut self, item: T) -> Result<NodeId, OctreeError> {
    let bound = checked_bbox(&item)?;
    self
      .expand_and_add(item, &bound)
      .map_err(|_| OctreeError::ExpandLimitExceeded {
        attempts: MAX_EXPAND_ATTEMPTS,
      })
  }

  /// Expansion loop behind `add_with_expand`; hands the item back when it
  /// still does not fit.
  fn expand_and_add(&mut self, mut item: T, bound: &DAabb3) -> Result<NodeId, T> {
    for _ in 0..MAX_EXPAND_ATTEMPTS {
      match self.try_add(item) {
        Ok(id) => return Ok(id),
        Err(rejected) => item = rejected,
      }
      let direction = bound.center() - self.bound().center();
      self.expand_root(direction);
    }
    self.try_add(item)
  }

  /// Remove an item located through its current bound.
  pub fn remove(&mut self, item: &T) -> bool {
    let bound = item.bbox();
    self.remove_by_bound(item, &bound)
  }

  /// Remove an item located through `bound`, which may be the bound the
  /// item had when it was inserted. Only nodes containing `bound` are
  /// searched; returns `false` when the item is not found there.
  pub fn remove_by_bound(&mut self, item: &T, bound: &DAabb3) -> bool {
    self.take_by_bound(item, bound).is_some()
  }

  /// Remove an item by searching every node. Slower than
  /// [`remove_by_bound`](Self::remove_by_bound); meant for items whose bound
  /// is no longer known.
  pub fn remove_safe(&mut self, item: &T) -> bool {
    self.take_first(item, |_, _| true).is_some()
  }

  fn take_by_bound(&mut self, item: &T, bound: &DAabb3) -> Option<T> {
    let root = self.root;
    if !self[root].bound.fully_contains(bound) {
      return None;
    }
    self.take_first(item, |tree, id| tree[id].bound.fully_contains(bound))
  }

  /// Take the first item equal to `item` from the nodes `keep` accepts,
  /// then prune the emptied chain when auto-delete is on.
  fn take_first<K>(&mut self, item: &T, keep: K) -> Option<T>
  where
    K: FnMut(&Self, NodeId) -> bool,
  {
    let root = self.root;
    let found = Cell::new(None);
    let mut taken = None;
    self.traverse(
      root,
      keep,
      |tree, id| {
        if let Some(stored) = take_item(&mut tree[id], item) {
          taken = Some(stored);
          found.set(Some(id));
        }
      },
      |_| found.get().is_some(),
    );
    let id = found.get()?;
    if self.params.auto_delete_if_empty && self[id].is_empty() {
      self.detach_empty_chain(id);
    }
    taken
  }

  /// Move an item whose bound changed since insertion: remove it through
  /// `old_bound` and insert it again, growing the root when needed.
  /// Returns `Ok(false)` when the item was not found.
  ///
  /// On error the stored item is left in the tree. The root may still have
  /// grown from the failed insertion.
  pub fn update(&mut self, item: T, old_bound: &DAabb3) -> Result<bool, OctreeError> {
    let bound = checked_bbox(&item)?;
    let Some(previous) = self.take_by_bound(&item, old_bound) else {
      return Ok(false);
    };
    if self.expand_and_add(item, &bound).is_ok() {
      return Ok(true);
    }
    // The root only grows, so the stored item still fits somewhere.
    let restored = self.try_add(previous).is_ok();
    debug_assert!(restored, "previous item fits the grown root");
    Err(OctreeError::ExpandLimitExceeded {
      attempts: MAX_EXPAND_ATTEMPTS,
    })
  }
}

impl<T> Octree<T> {
  /// Detach an empty non-root node from its parent and free it, then do the
  /// same for each ancestor that becomes empty as a result.
  ///
  /// Returns `Ok(false)` when `id` is the root or still holds something.
  pub fn remove_self(&mut self, id: NodeId) -> Result<bool, OctreeError> {
    let node = self.node(id).ok_or(OctreeError::UnknownNode(id))?;
    if node.parent.is_none() || !node.is_empty() {
      return Ok(false);
    }
    self.detach_empty_chain(id);
    Ok(true)
  }

  fn detach_empty_chain(&mut self, id: NodeId) {
    let mut current = id;
    loop {
      let Some(node) = self.node(current) else {
        return;
      };
      let Some(parent) = node.parent else {
        return;
      };
      if !node.is_empty() {
        return;
      }
      if let Some(octant) = self[parent].octant_of_child(current) {
        self[parent].clear_child(octant);
      }
      self.release(current);
      #[cfg(feature = "tracing")]
      tracing::debug!(node = ?current, ?parent, "removed empty node");
      current = parent;
    }
  }

  fn check_root(&self, id: NodeId) -> Result<(), OctreeError> {
    let node = self.node(id).ok_or(OctreeError::UnknownNode(id))?;
    if node.parent.is_some() || id != self.root {
      return Err(OctreeError::NotRoot(id));
    }
    Ok(())
  }

  /// Grow the tree by wrapping the root in a new root twice its size.
  ///
  /// The new bound extends from the old one toward the sign of `direction`
  /// on each axis (zero counts as positive), so the old root occupies
  /// exactly one octant of the new root and becomes that child. Axes where
  /// the old root has zero size grow by `minimum_octant_size`; a leaf root
  /// is widened to fill its octant, while a root with children keeps its
  /// bound so the children stay inside it. Returns the new root handle,
  /// which also becomes [`root`](Self::root).
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "octree::expand"))]
  pub fn expand(&mut self, node: NodeId, direction: DVec3) -> Result<NodeId, OctreeError> {
    self.check_root(node)?;
    Ok(self.expand_root(direction))
  }

  pub(crate) fn expand_root(&mut self, direction: DVec3) -> NodeId {
    let old_root = self.root;
    let old_bound = self[old_root].bound;

    let mut dimension = old_bound.size();
    let mut exact = true;
    for axis in 0..3 {
      if dimension[axis] <= 0.0 {
        dimension[axis] = self.params.minimum_octant_size;
        exact = false;
      }
    }
    let min = DVec3::new(
      if direction.x >= 0.0 { old_bound.min.x } else { old_bound.min.x - dimension.x },
      if direction.y >= 0.0 { old_bound.min.y } else { old_bound.min.y - dimension.y },
      if direction.z >= 0.0 { old_bound.min.z } else { old_bound.min.z - dimension.z },
    );
    let new_bound = DAabb3::new(min, min + dimension * 2.0);

    let mut new_root = OctreeNode::new(new_bound, Vec::new(), None);
    new_root.built = true;

    // Octant whose min corner is nearest the old root's min; first wins ties.
    let mut octant = 0;
    let mut best = f64::INFINITY;
    for (i, o) in new_root.octant_bounds.iter().enumerate() {
      let d = o.min.distance_squared(old_bound.min);
      if d < best {
        best = d;
        octant = i;
      }
    }

    if exact || self[old_root].has_children() {
      // Keep the old bound bit-exact so existing children stay valid.
      new_root.octant_bounds[octant] = old_bound;
    } else {
      let grown = new_root.octant_bounds[octant];
      self[old_root].set_bound(grown);
    }

    let new_id = self.alloc(new_root);
    self[new_id].set_child(octant, old_root);
    self[old_root].parent = Some(new_id);
    self.root = new_id;

    #[cfg(feature = "tracing")]
    tracing::debug!(?new_bound, octant, "expanded root");
    new_id
  }

  /// Collapse a root that holds no items and exactly one child: the child
  /// becomes the root. Any other root is returned unchanged.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "octree::shrink"))]
  pub fn shrink(&mut self, node: NodeId) -> Result<NodeId, OctreeError> {
    self.check_root(node)?;
    let root = &self[node];
    if !root.objects.is_empty() || root.active_mask.count_ones() != 1 {
      return Ok(node);
    }
    let Some(child) = root.children.iter().flatten().copied().next() else {
      return Ok(node);
    };
    self.release(node);
    self[child].parent = None;
    self.root = child;
    #[cfg(feature = "tracing")]
    tracing::debug!(new_root = ?child, "collapsed root");
    Ok(child)
  }

  /// Apply [`shrink`](Self::shrink) until the root no longer changes.
  pub fn shrink_all(&mut self) -> NodeId {
    loop {
      let root = self.root;
      match self.shrink(root) {
        Ok(next) if next != root => continue,
        _ => return self.root,
      }
    }
  }
}

/// Remove the first equal item from a node's list.
fn take_item<T: PartialEq>(node: &mut OctreeNode<T>, item: &T) -> Option<T> {
  let pos = node.objects.iter().position(|o| o == item)?;
  Some(node.objects.remove(pos))
}

#[cfg(test)]
#[path = "mutation_test.rs"]
mod mutation_test;
