//! Tests for BoundingBox operations used to derive generation extents.

use dggs_common::BoundingBox;
use geo::{Area, Contains, Point};

// ============================================================================
// Validity and clamping
// ============================================================================

#[test]
fn test_is_valid() {
    assert!(BoundingBox::new(0.0, 0.0, 0.0, 0.0).is_valid());
    assert!(!BoundingBox::new(10.0, 0.0, 0.0, 5.0).is_valid());
    assert!(!BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0).is_valid());
}

#[test]
fn test_clamp_to_valid() {
    let bbox = BoundingBox::new(-200.0, -95.0, 190.0, 91.0).clamp_to_valid();
    assert_eq!(bbox, BoundingBox::default());
}

// ============================================================================
// Intersection and union
// ============================================================================

#[test]
fn test_intersects_is_symmetric() {
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
    assert!(a.intersects(&b));
    assert!(b.intersects(&a));
}

#[test]
fn test_intersects_adjacent_edge() {
    // Touching edges count as intersecting: cells sharing a border with the
    // extent are still candidates for generation.
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
    assert!(a.intersects(&b));
}

#[test]
fn test_shifted_box_meets_across_antimeridian() {
    let east = BoundingBox::new(179.5, -17.5, 180.5, -17.0);
    let west = BoundingBox::new(-179.9, -17.5, -179.5, -17.1);
    assert!(!east.intersects(&west));
    assert!(east.intersects(&west.shift_lon(360.0)));
    assert_eq!(west.shift_lon(360.0).width(), west.width());
}

#[test]
fn test_union() {
    let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
    let b = BoundingBox::new(-5.0, 0.5, 0.5, 3.0);
    assert_eq!(a.union(&b), BoundingBox::new(-5.0, 0.0, 1.0, 3.0));
}

// ============================================================================
// Geometry conversion
// ============================================================================

#[test]
fn test_to_polygon_area_and_containment() {
    let bbox = BoundingBox::new(-2.0, -1.0, 2.0, 1.0);
    let polygon = bbox.to_polygon();
    assert!((polygon.unsigned_area() - 8.0).abs() < 1e-12);
    assert!(polygon.contains(&Point::new(0.0, 0.0)));
    assert!(!polygon.contains(&Point::new(3.0, 0.0)));
}

#[test]
fn test_center() {
    let bbox = BoundingBox::new(10.0, 20.0, 20.0, 40.0);
    assert_eq!(bbox.center(), (15.0, 30.0));
}
