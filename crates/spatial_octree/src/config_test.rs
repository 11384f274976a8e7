use super::*;
use glam::DVec3;

// =========================================================================
// Batch 1: Presets and validation
// =========================================================================

/// Defaults: 1.0 minimum octant, split above 2 items, auto-delete on.
#[test]
fn test_default_values() {
  let params = BuildParams::default();
  assert_eq!(params, BuildParams::DEFAULT);
  assert_eq!(params.minimum_octant_size, 1.0);
  assert_eq!(params.min_object_size_to_split, 2);
  assert!(!params.cubify);
  assert!(params.auto_delete_if_empty);
  assert!(!params.record_hit_path);
  assert!(params.validate().is_ok());
}

/// The cubified preset differs from the default only in `cubify`.
#[test]
fn test_cubified_preset() {
  let params = BuildParams::CUBIFIED;
  assert!(params.cubify);
  assert_eq!(
    BuildParams {
      cubify: false,
      ..params
    },
    BuildParams::DEFAULT
  );
}

/// Non-positive or non-finite minimum sizes and a zero threshold are rejected.
#[test]
fn test_validate_rejects_bad_params() {
  for size in [0.0, -1.0, f64::NAN, f64::INFINITY] {
    let params = BuildParams {
      minimum_octant_size: size,
      ..BuildParams::DEFAULT
    };
    assert!(
      matches!(params.validate(), Err(OctreeError::InvalidParams(_))),
      "minimum_octant_size {size} should be rejected"
    );
  }

  let params = BuildParams {
    min_object_size_to_split: 0,
    ..BuildParams::DEFAULT
  };
  assert!(params.validate().is_err());
}

// =========================================================================
// Batch 2: Split policy
// =========================================================================

/// One axis reaching the minimum is enough; degenerate bounds never split.
#[test]
fn test_exceeds_minimum_size() {
  let params = BuildParams::DEFAULT;

  let flat = DAabb3::new(DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0));
  assert!(params.exceeds_minimum_size(&flat), "x reaches 1.0");

  let small = DAabb3::new(DVec3::ZERO, DVec3::splat(0.5));
  assert!(!params.exceeds_minimum_size(&small));

  assert!(!params.exceeds_minimum_size(&DAabb3::ZERO));
}

/// Split requires strictly more items than the threshold.
#[test]
fn test_should_split_threshold() {
  let params = BuildParams::DEFAULT;
  let bound = DAabb3::new(DVec3::ZERO, DVec3::splat(8.0));

  assert!(!params.should_split(2, &bound), "at threshold: no split");
  assert!(params.should_split(3, &bound));
  assert!(!params.should_split(100, &DAabb3::ZERO), "too small to split");
}
