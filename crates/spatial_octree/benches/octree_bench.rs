//! Benchmarks for octree build and queries.
//!
//! Workload: axis-aligned cubes scattered through a 200-unit box, sized like
//! scene objects (0.5 to 4 units).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spatial_octree::items::BoundedItem;
use spatial_octree::{BuildParams, DAabb3, Octree, Ray};

const SIZES: [usize; 3] = [1_000, 10_000, 50_000];
const QUERIES: usize = 256;

fn scatter(count: usize, seed: u64) -> Vec<BoundedItem<u32>> {
  let mut rng = StdRng::seed_from_u64(seed);
  (0..count as u32)
    .map(|key| {
      let min = DVec3::new(
        rng.random_range(0.0..200.0),
        rng.random_range(0.0..200.0),
        rng.random_range(0.0..200.0),
      );
      let size = rng.random_range(0.5..4.0);
      BoundedItem::new(key, DAabb3::new(min, min + DVec3::splat(size))).unwrap()
    })
    .collect()
}

fn rays(seed: u64) -> Vec<Ray> {
  let mut rng = StdRng::seed_from_u64(seed);
  (0..QUERIES)
    .map(|_| {
      let origin = DVec3::new(rng.random_range(-50.0..250.0), rng.random_range(-50.0..250.0), -50.0);
      let target = DVec3::new(rng.random_range(0.0..200.0), rng.random_range(0.0..200.0), 100.0);
      Ray::through(origin, target)
    })
    .collect()
}

// ============================================================================
// Build
// ============================================================================

fn bench_build(c: &mut Criterion) {
  let mut group = c.benchmark_group("octree_build");

  for &count in &SIZES {
    let items = scatter(count, 1);
    group.throughput(Throughput::Elements(count as u64));
    group.bench_with_input(BenchmarkId::from_parameter(count), &items, |b, items| {
      b.iter(|| {
        let tree = Octree::build(items.clone(), BuildParams::DEFAULT).unwrap();
        black_box(tree.node_count())
      })
    });
  }

  group.finish();
}

/// Incremental insertion into an empty tree with a fixed root.
fn bench_add(c: &mut Criterion) {
  let mut group = c.benchmark_group("octree_add");
  let bound = DAabb3::new(DVec3::ZERO, DVec3::splat(204.0));

  for &count in &SIZES[..2] {
    let items = scatter(count, 2);
    group.throughput(Throughput::Elements(count as u64));
    group.bench_with_input(BenchmarkId::from_parameter(count), &items, |b, items| {
      b.iter(|| {
        let mut tree = Octree::with_bound(bound, Vec::new(), BuildParams::DEFAULT).unwrap();
        for item in items {
          tree.add(item.clone());
        }
        black_box(tree.len())
      })
    });
  }

  group.finish();
}

// ============================================================================
// Queries
// ============================================================================

fn bench_hit_test(c: &mut Criterion) {
  let mut group = c.benchmark_group("octree_hit_test");
  group.throughput(Throughput::Elements(QUERIES as u64));
  let probes = rays(3);

  for &count in &SIZES {
    let mut tree = Octree::build(scatter(count, 1), BuildParams::DEFAULT).unwrap();
    group.bench_function(BenchmarkId::from_parameter(count), |b| {
      b.iter(|| {
        let mut hits = 0;
        for ray in &probes {
          hits += tree.hit_test_nearest(*ray).is_some() as usize;
        }
        black_box(hits)
      })
    });
  }

  group.finish();
}

/// Exact versus heuristic nearest-point search.
fn bench_nearest(c: &mut Criterion) {
  let mut group = c.benchmark_group("octree_nearest");
  group.throughput(Throughput::Elements(QUERIES as u64));

  let mut rng = StdRng::seed_from_u64(4);
  let points: Vec<DVec3> = (0..QUERIES)
    .map(|_| DVec3::new(rng.random_range(-20.0..220.0), rng.random_range(-20.0..220.0), rng.random_range(-20.0..220.0)))
    .collect();
  let mut tree = Octree::build(scatter(SIZES[1], 1), BuildParams::DEFAULT).unwrap();

  for factor in [1.0, 0.5, 0.1] {
    group.bench_function(BenchmarkId::new("factor", factor), |b| {
      b.iter(|| {
        let mut total = 0.0;
        for &p in &points {
          if let Some(found) = tree.nearest_point_from_point(p, factor) {
            total += found.distance;
          }
        }
        black_box(total)
      })
    });
  }

  group.finish();
}

criterion_group!(benches, bench_build, bench_add, bench_hit_test, bench_nearest);
criterion_main!(benches);
