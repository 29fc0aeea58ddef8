//! Boundary map measurement tests
//!
//! Tests for interval measurement from synthetic geometry, the monotonic
//! ordering invariant, the square-aspect correction, and the cheap
//! equivalence comparison.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use chunkview::error::ChunkviewError;
use chunkview::layout::{BoundaryMap, ChunkBounds, SQUARE_ASPECT_TOP_CORRECTION};
use chunkview::types::FixedGeometry;
use common::{geometry, text_only_viewport, uniform_geometry};

#[test]
fn measures_one_interval_per_chunk() {
    let geometry = uniform_geometry(5, 200.0);
    let viewport = text_only_viewport(800.0, 0.0, 1000.0);
    let map = BoundaryMap::measure(&geometry, &viewport).unwrap();
    assert_eq!(map.len(), 5);
    assert_eq!(map.get(0), Some(ChunkBounds { top: 0.0, bottom: 200.0 }));
    assert_eq!(
        map.get(4),
        Some(ChunkBounds {
            top: 800.0,
            bottom: 1000.0
        })
    );
}

#[test]
fn empty_geometry_is_a_programmer_error() {
    let geometry = FixedGeometry::default();
    let viewport = text_only_viewport(800.0, 0.0, 1000.0);
    let err = BoundaryMap::measure(&geometry, &viewport).unwrap_err();
    assert!(matches!(err, ChunkviewError::EmptyBoundaryMap));
}

#[test]
fn monotonic_boundary_invariant() {
    // Uneven heights with overlapping margins must still never regress.
    let geometry = geometry(&[
        (0.0, 120.0, 110.0),
        (115.0, 340.0, 320.0),
        (450.0, 90.0, 88.0),
        (540.0, 1200.0, 1180.0),
    ]);
    let viewport = text_only_viewport(800.0, 0.0, 2000.0);
    let map = BoundaryMap::measure(&geometry, &viewport).unwrap();

    let epsilon = 8.0;
    for window in map.intervals().windows(2) {
        assert!(
            window[0].top <= window[1].top,
            "tops must be non-decreasing: {} then {}",
            window[0].top,
            window[1].top
        );
        assert!(
            window[0].bottom <= window[1].top + epsilon,
            "interval {} ends at {} but the next starts at {}",
            window[0].bottom,
            window[0].bottom,
            window[1].top
        );
    }
}

#[test]
fn square_viewport_shifts_tops_only() {
    let geometry = uniform_geometry(3, 100.0);
    let mut viewport = text_only_viewport(800.0, 0.0, 1000.0);
    viewport.inner_width = 800.0; // 1:1 aspect

    let map = BoundaryMap::measure(&geometry, &viewport).unwrap();
    assert_eq!(map.get(1).unwrap().top, 100.0 - SQUARE_ASPECT_TOP_CORRECTION);
    // Bottoms stay at the raw measured edge.
    assert_eq!(map.get(1).unwrap().bottom, 200.0);
}

#[test]
fn roughly_equals_compares_ends_only() {
    let viewport = text_only_viewport(800.0, 0.0, 1000.0);
    let a = BoundaryMap::measure(&uniform_geometry(4, 100.0), &viewport).unwrap();
    let b = BoundaryMap::measure(&uniform_geometry(4, 100.0), &viewport).unwrap();
    assert!(a.roughly_equals(&b));

    // Same length and ends, different middle: still "equal" by design.
    let c = BoundaryMap::from_intervals(vec![
        ChunkBounds { top: 0.0, bottom: 100.0 },
        ChunkBounds { top: 90.0, bottom: 250.0 },
        ChunkBounds { top: 250.0, bottom: 300.0 },
        ChunkBounds { top: 300.0, bottom: 400.0 },
    ]);
    assert!(a.roughly_equals(&c));

    // Different length is always a change.
    let d = BoundaryMap::measure(&uniform_geometry(5, 100.0), &viewport).unwrap();
    assert!(!a.roughly_equals(&d));

    // Different last bottom is a change.
    let e = BoundaryMap::measure(&uniform_geometry(4, 101.0), &viewport).unwrap();
    assert!(!a.roughly_equals(&e));
}
