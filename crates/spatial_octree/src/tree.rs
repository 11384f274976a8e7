//! Octree - arena owner of the nodes, the build parameters and the scratch
//! traversal queue of one tree.
//!
//! Nodes live in a slot vector addressed by [`NodeId`]. Children are owned
//! through their slot in the parent; the parent link is a non-owning handle.
//! Freed slots go on a free list and are reused by later nodes.

use std::ops::{Index, IndexMut};

use crate::bounds::DAabb3;
use crate::config::BuildParams;
use crate::error::OctreeError;
use crate::item::OctreeItem;
use crate::metrics::TreeMetrics;
use crate::node::{NodeId, OctreeNode};
use crate::traversal::TraversalQueue;

/// Dynamic octree over items of type `T`.
///
/// Every operation that walks the tree takes `&mut self`: the breadth-first
/// queue is pooled per tree, so walks on one tree are strictly sequential.
#[derive(Debug)]
pub struct Octree<T> {
  nodes: Vec<Option<OctreeNode<T>>>,
  free: Vec<u32>,
  pub(crate) root: NodeId,
  pub(crate) params: BuildParams,
  pub(crate) queue: TraversalQueue,
  pub(crate) hit_path: Vec<DAabb3>,
  pub(crate) metrics: TreeMetrics,
}

impl<T: OctreeItem> Octree<T> {
  /// Empty tree with a zero-size root. The first added item defines the
  /// root bound.
  pub fn new(params: BuildParams) -> Result<Self, OctreeError> {
    Self::with_bound(DAabb3::ZERO, Vec::new(), params)
  }

  /// Tree whose root bound encloses all `items`. Call
  /// [`build_tree`](Self::build_tree) to subdivide.
  pub fn with_items(items: Vec<T>, params: BuildParams) -> Result<Self, OctreeError> {
    Self::with_bound(DAabb3::ZERO, items, params)
  }

  /// Tree with an explicit root bound, grown where needed so that it
  /// encloses every item. A zero-size bound is replaced by the union of the
  /// item bounds.
  pub fn with_bound(bound: DAabb3, items: Vec<T>, params: BuildParams) -> Result<Self, OctreeError> {
    params.validate()?;
    if !bound.is_valid() {
      return Err(OctreeError::InvalidBounds {
        min: bound.min,
        max: bound.max,
      });
    }
    let mut enclosing: Option<DAabb3> = None;
    for item in &items {
      let b = checked_bbox(item)?;
      enclosing = Some(match enclosing {
        Some(acc) => acc.union(&b),
        None => b,
      });
    }
    let bound = match enclosing {
      Some(items_bound) if bound.is_degenerate() => items_bound,
      Some(items_bound) => bound.union(&items_bound),
      None => bound,
    };
    Ok(Self {
      nodes: vec![Some(OctreeNode::new(bound, items, None))],
      free: Vec::new(),
      root: NodeId(0),
      params,
      queue: TraversalQueue::default(),
      hit_path: Vec::new(),
      metrics: TreeMetrics::new(),
    })
  }

  /// Construct from items and build immediately.
  pub fn build(items: Vec<T>, params: BuildParams) -> Result<Self, OctreeError> {
    let mut tree = Self::with_items(items, params)?;
    tree.build_tree();
    Ok(tree)
  }

  /// Drop every item and node. The root keeps its bound.
  pub fn clear(&mut self) {
    let bound = self[self.root].bound;
    self.nodes.clear();
    self.free.clear();
    self.nodes.push(Some(OctreeNode::new(bound, Vec::new(), None)));
    self.root = NodeId(0);
    self.hit_path.clear();
  }

  /// Gather every item and build a fresh tree around them.
  pub fn rebuild(&mut self) {
    let items: Vec<T> = self
      .nodes
      .iter_mut()
      .flatten()
      .flat_map(|node| std::mem::take(&mut node.objects))
      .collect();
    let old_bound = self[self.root].bound;
    let bound = items
      .iter()
      .map(|item| item.bbox())
      .reduce(|a, b| a.union(&b))
      .unwrap_or(old_bound);
    self.nodes.clear();
    self.free.clear();
    self.nodes.push(Some(OctreeNode::new(bound, items, None)));
    self.root = NodeId(0);
    self.hit_path.clear();
    self.build_tree();
  }

  /// Replace all build parameters.
  pub fn set_params(&mut self, params: BuildParams) -> Result<(), OctreeError> {
    params.validate()?;
    self.params = params;
    Ok(())
  }

  /// Set the minimum octant size used by later splits.
  pub fn set_minimum_octant_size(&mut self, size: f64) -> Result<(), OctreeError> {
    self.set_params(BuildParams {
      minimum_octant_size: size,
      ..self.params.clone()
    })
  }

  /// Set the item-count split threshold used by later splits.
  pub fn set_min_object_size_to_split(&mut self, count: usize) -> Result<(), OctreeError> {
    self.set_params(BuildParams {
      min_object_size_to_split: count,
      ..self.params.clone()
    })
  }

  /// Toggle auto-deletion of empty nodes.
  pub fn set_auto_delete_if_empty(&mut self, enabled: bool) {
    self.params.auto_delete_if_empty = enabled;
  }

  /// Toggle hit-path recording.
  pub fn set_record_hit_path(&mut self, enabled: bool) {
    self.params.record_hit_path = enabled;
    if !enabled {
      self.hit_path.clear();
    }
  }

  /// Toggle cubification of the root on the next `build_tree`.
  pub fn set_cubify(&mut self, enabled: bool) {
    self.params.cubify = enabled;
  }
}

impl<T> Octree<T> {
  /// Current root handle. Changes on `expand` and `shrink`.
  #[inline]
  pub fn root(&self) -> NodeId {
    self.root
  }

  /// Root bound.
  #[inline]
  pub fn bound(&self) -> &DAabb3 {
    &self[self.root].bound
  }

  /// The tree's build parameters.
  #[inline]
  pub fn params(&self) -> &BuildParams {
    &self.params
  }

  /// Look up a node; `None` for a stale handle.
  #[inline]
  pub fn node(&self, id: NodeId) -> Option<&OctreeNode<T>> {
    self.nodes.get(id.index()).and_then(Option::as_ref)
  }

  #[inline]
  pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut OctreeNode<T>> {
    self.nodes.get_mut(id.index()).and_then(Option::as_mut)
  }

  /// Whether `id` refers to a live node.
  #[inline]
  pub fn contains_node(&self, id: NodeId) -> bool {
    self.node(id).is_some()
  }

  /// Whether `id` is the current root.
  #[inline]
  pub fn is_root(&self, id: NodeId) -> bool {
    id == self.root
  }

  /// Number of live nodes.
  pub fn node_count(&self) -> usize {
    self.nodes.len() - self.free.len()
  }

  /// Number of items held anywhere in the tree.
  pub fn len(&self) -> usize {
    self.nodes.iter().flatten().map(|n| n.objects.len()).sum()
  }

  /// Root has no items and no children.
  pub fn is_empty(&self) -> bool {
    self[self.root].is_empty()
  }

  /// Every item, in arena order.
  pub fn items(&self) -> impl Iterator<Item = &T> {
    self.nodes.iter().flatten().flat_map(|n| n.objects.iter())
  }

  /// Live node handles reachable from the root, breadth-first.
  pub fn node_ids(&self) -> Vec<NodeId> {
    let mut out = vec![self.root];
    let mut head = 0;
    while head < out.len() {
      let id = out[head];
      head += 1;
      if let Some(node) = self.node(id) {
        out.extend(node.children.iter().flatten().copied());
      }
    }
    out
  }

  /// Number of parent hops from `id` to the root.
  pub fn depth_of(&self, id: NodeId) -> Option<usize> {
    let mut depth = 0;
    let mut current = self.node(id)?;
    while let Some(parent) = current.parent {
      depth += 1;
      current = self.node(parent)?;
    }
    Some(depth)
  }

  /// Node bounds from the root down to the node of the last improving hit.
  /// Only filled while `record_hit_path` is enabled.
  pub fn hit_path(&self) -> &[DAabb3] {
    &self.hit_path
  }

  /// Collected metrics (populated with the `metrics` feature).
  pub fn metrics(&self) -> &TreeMetrics {
    &self.metrics
  }

  /// Mutable metrics access, e.g. to reset timings.
  pub fn metrics_mut(&mut self) -> &mut TreeMetrics {
    &mut self.metrics
  }

  /// Recount the structural metrics from the current tree shape.
  pub fn refresh_metrics(&mut self) {
    let mut metrics = std::mem::take(&mut self.metrics);
    metrics.update_from_tree(self);
    self.metrics = metrics;
  }

  pub(crate) fn alloc(&mut self, node: OctreeNode<T>) -> NodeId {
    match self.free.pop() {
      Some(slot) => {
        self.nodes[slot as usize] = Some(node);
        NodeId(slot)
      }
      None => {
        self.nodes.push(Some(node));
        NodeId((self.nodes.len() - 1) as u32)
      }
    }
  }

  pub(crate) fn release(&mut self, id: NodeId) -> Option<OctreeNode<T>> {
    let node = self.nodes.get_mut(id.index())?.take()?;
    self.free.push(id.0);
    Some(node)
  }
}

/// Node access by handle.
///
/// # Panics
/// Panics on a stale handle; use [`Octree::node`] to probe.
impl<T> Index<NodeId> for Octree<T> {
  type Output = OctreeNode<T>;

  fn index(&self, id: NodeId) -> &Self::Output {
    match self.node(id) {
      Some(node) => node,
      None => panic!("stale NodeId {:?}", id),
    }
  }
}

impl<T> IndexMut<NodeId> for Octree<T> {
  fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
    match self.node_mut(id) {
      Some(node) => node,
      None => panic!("stale NodeId {:?}", id),
    }
  }
}

/// Item bound, rejected when NaN/infinite or inverted.
pub(crate) fn checked_bbox<T: OctreeItem>(item: &T) -> Result<DAabb3, OctreeError> {
  let b = item.bbox();
  if b.is_valid() {
    Ok(b)
  } else {
    Err(OctreeError::InvalidBounds {
      min: b.min,
      max: b.max,
    })
  }
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
