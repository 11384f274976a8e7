//! Breadth-first traversal engine shared by build, mutation and queries.
//!
//! The FIFO queue is pooled per tree and cleared at the start and end of
//! every walk, so steady-state queries do not allocate.

use std::collections::VecDeque;

use crate::node::NodeId;
use crate::tree::Octree;

/// Scratch FIFO reused by every walk of one tree.
#[derive(Debug, Default)]
pub(crate) struct TraversalQueue {
  queue: VecDeque<NodeId>,
}

impl TraversalQueue {
  /// Current allocation, for pooling checks.
  #[cfg(test)]
  pub(crate) fn capacity(&self) -> usize {
    self.queue.capacity()
  }

  #[cfg(test)]
  pub(crate) fn is_empty(&self) -> bool {
    self.queue.is_empty()
  }
}

impl<T> Octree<T> {
  /// Walk the subtree at `start` breadth-first.
  ///
  /// For each dequeued node: if `keep` rejects it the node and its subtree
  /// are skipped; otherwise `visit` runs, then `stop` is checked (returning
  /// `true` ends the walk), then the node's children are enqueued. Nodes
  /// created by `visit` are therefore visited later in the same walk; nodes
  /// removed by `visit` are skipped.
  pub fn traverse<K, V, S>(&mut self, start: NodeId, mut keep: K, mut visit: V, mut stop: S)
  where
    K: FnMut(&Self, NodeId) -> bool,
    V: FnMut(&mut Self, NodeId),
    S: FnMut(&Self) -> bool,
  {
    // Taken out for the walk so `visit` can borrow the tree mutably. A nested
    // walk started from `visit` simply runs on a fresh queue.
    let mut queue = std::mem::take(&mut self.queue.queue);
    queue.clear();
    queue.push_back(start);

    while let Some(id) = queue.pop_front() {
      if !self.contains_node(id) || !keep(&*self, id) {
        continue;
      }
      visit(self, id);
      if stop(&*self) {
        break;
      }
      if let Some(node) = self.node(id) {
        queue.extend(node.children.iter().flatten().copied());
      }
    }

    queue.clear();
    self.queue.queue = queue;
  }

  /// Walk every node under `start` with no pruning and no early exit.
  pub fn traverse_all<V>(&mut self, start: NodeId, visit: V)
  where
    V: FnMut(&mut Self, NodeId),
  {
    self.traverse(start, |_, _| true, visit, |_| false);
  }
}

#[cfg(test)]
#[path = "traversal_test.rs"]
mod traversal_test;
