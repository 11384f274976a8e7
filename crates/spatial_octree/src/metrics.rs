//! Engine-agnostic metrics collection for octree statistics.
//!
//! Feature-gated and runtime-toggled to ensure zero overhead when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use spatial_octree::metrics::COLLECT_METRICS;
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! // Timings are recorded by build_tree and the queries.
//! // Structural counts are refreshed on demand:
//! tree.refresh_metrics();
//! println!("{} nodes, depth {}", tree.metrics().node_count, tree.metrics().max_depth);
//! ```

use std::collections::VecDeque;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;

use crate::tree::Octree;

/// Depth buckets tracked per level; deeper nodes share the last bucket.
pub const DEPTH_BUCKETS: usize = 16;

/// Runtime toggle for metrics collection.
/// Set to false to disable metrics gathering at runtime.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Wall-clock timer that only runs while metrics are enabled.
pub(crate) struct Stopwatch {
  #[cfg(feature = "metrics")]
  start: Option<web_time::Instant>,
}

impl Stopwatch {
  #[inline]
  pub(crate) fn start() -> Self {
    Self {
      #[cfg(feature = "metrics")]
      start: is_enabled().then(web_time::Instant::now),
    }
  }

  /// Microseconds since `start`, or `None` when metrics are off.
  #[inline]
  pub(crate) fn elapsed_us(&self) -> Option<u64> {
    #[cfg(feature = "metrics")]
    {
      self.start.map(|s| s.elapsed().as_micros() as u64)
    }
    #[cfg(not(feature = "metrics"))]
    {
      None
    }
  }
}

/// Rolling window for storing recent values (e.g., timing history).
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
  buffer: VecDeque<T>,
  capacity: usize,
}

impl<T> RollingWindow<T> {
  /// Create a new rolling window with the given capacity.
  pub fn new(capacity: usize) -> Self {
    Self {
      buffer: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  /// Push a new value, evicting the oldest if at capacity.
  pub fn push(&mut self, value: T) {
    if self.buffer.len() >= self.capacity {
      self.buffer.pop_front();
    }
    self.buffer.push_back(value);
  }

  /// Get the number of values in the window.
  pub fn len(&self) -> usize {
    self.buffer.len()
  }

  /// Check if the window is empty.
  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  /// Clear all values.
  pub fn clear(&mut self) {
    self.buffer.clear();
  }

  /// Iterate over values (oldest to newest).
  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.buffer.iter()
  }

  /// Get the most recent value.
  pub fn last(&self) -> Option<&T> {
    self.buffer.back()
  }
}

impl RollingWindow<u64> {
  /// Compute the average of all values.
  pub fn average(&self) -> f64 {
    if self.buffer.is_empty() {
      0.0
    } else {
      self.buffer.iter().sum::<u64>() as f64 / self.buffer.len() as f64
    }
  }

  /// Get min and max values.
  pub fn min_max(&self) -> Option<(u64, u64)> {
    let min = *self.buffer.iter().min()?;
    let max = *self.buffer.iter().max()?;
    Some((min, max))
  }
}

impl Default for RollingWindow<u64> {
  fn default() -> Self {
    Self::new(128)
  }
}

/// Tree statistics: timings recorded by the tree, structure refreshed on
/// demand by [`update_from_tree`](Self::update_from_tree).
#[derive(Debug, Clone)]
pub struct TreeMetrics {
  /// Live node count at each depth (index = depth).
  pub nodes_per_depth: [u32; DEPTH_BUCKETS],
  /// Directly held items at each depth.
  pub items_per_depth: [u64; DEPTH_BUCKETS],
  /// Live nodes reachable from the root.
  pub node_count: u32,
  /// Nodes without children.
  pub leaf_count: u32,
  /// Items in the tree.
  pub item_count: u64,
  /// Deepest node depth (root = 0).
  pub max_depth: u32,

  /// Rolling window of build times in microseconds.
  pub build_timings: RollingWindow<u64>,
  /// Rolling window of query times in microseconds.
  pub query_timings: RollingWindow<u64>,
  /// Last build time in microseconds.
  pub last_build_us: u64,
  /// Queries recorded since creation.
  pub total_queries: u64,
}

impl Default for TreeMetrics {
  fn default() -> Self {
    Self {
      nodes_per_depth: [0; DEPTH_BUCKETS],
      items_per_depth: [0; DEPTH_BUCKETS],
      node_count: 0,
      leaf_count: 0,
      item_count: 0,
      max_depth: 0,
      build_timings: RollingWindow::new(128),
      query_timings: RollingWindow::new(128),
      last_build_us: 0,
      total_queries: 0,
    }
  }
}

impl TreeMetrics {
  /// Create new metrics with default values.
  pub fn new() -> Self {
    Self::default()
  }

  /// Reset everything except the cumulative query count.
  pub fn reset(&mut self) {
    self.nodes_per_depth.fill(0);
    self.items_per_depth.fill(0);
    self.node_count = 0;
    self.leaf_count = 0;
    self.item_count = 0;
    self.max_depth = 0;
    self.build_timings.clear();
    self.query_timings.clear();
    self.last_build_us = 0;
  }

  /// Record a build timing.
  pub fn record_build_timing(&mut self, timing_us: u64) {
    if is_enabled() {
      self.build_timings.push(timing_us);
      self.last_build_us = timing_us;
    }
  }

  /// Record a query timing.
  pub fn record_query_timing(&mut self, timing_us: u64) {
    if is_enabled() {
      self.query_timings.push(timing_us);
      self.total_queries += 1;
    }
  }

  /// Recount nodes and items per depth.
  ///
  /// Runs regardless of the metrics toggle; it only reads the tree.
  pub fn update_from_tree<T>(&mut self, tree: &Octree<T>) {
    self.nodes_per_depth.fill(0);
    self.items_per_depth.fill(0);
    self.node_count = 0;
    self.leaf_count = 0;
    self.item_count = 0;
    self.max_depth = 0;

    let mut stack = vec![(tree.root(), 0u32)];
    while let Some((id, depth)) = stack.pop() {
      let Some(node) = tree.node(id) else {
        continue;
      };
      let bucket = (depth as usize).min(DEPTH_BUCKETS - 1);
      self.nodes_per_depth[bucket] += 1;
      self.items_per_depth[bucket] += node.objects().len() as u64;
      self.node_count += 1;
      if !node.has_children() {
        self.leaf_count += 1;
      }
      self.item_count += node.objects().len() as u64;
      self.max_depth = self.max_depth.max(depth);
      stack.extend(node.children().into_iter().map(|c| (c, depth + 1)));
    }
  }

  /// Average build timing in microseconds.
  pub fn avg_build_timing_us(&self) -> f64 {
    self.build_timings.average()
  }

  /// Average query timing in microseconds.
  pub fn avg_query_timing_us(&self) -> f64 {
    self.query_timings.average()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_rolling_window() {
    let mut window = RollingWindow::new(3);
    assert!(window.is_empty());

    window.push(10u64);
    window.push(20);
    window.push(30);
    assert_eq!(window.len(), 3);
    assert_eq!(window.average(), 20.0);

    // Push one more, oldest should be evicted
    window.push(40);
    assert_eq!(window.len(), 3);
    assert_eq!(window.average(), 30.0);

    let (min, max) = window.min_max().unwrap();
    assert_eq!(min, 20);
    assert_eq!(max, 40);
  }

  #[test]
  fn test_timing_disabled_without_feature() {
    let mut metrics = TreeMetrics::new();
    metrics.record_query_timing(100);
    if is_enabled() {
      assert_eq!(metrics.query_timings.len(), 1);
      assert_eq!(metrics.total_queries, 1);
    } else {
      assert!(metrics.query_timings.is_empty(), "no recording while disabled");
    }
  }
}
