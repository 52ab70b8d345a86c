//! Round-trip and lenient-decode tests for the scenario codec, exercised
//! through the public library API.
//!
//! Covered scenarios:
//! 1. Export → encode → decode → apply reproduces the marker set.
//! 2. A document without a markers array fails and the prior state survives.
//! 3. Malformed entries are skipped and counted; the rest still load.
//! 4. Omitted radius/density fall back to the generation defaults.
//! 5. Loaded positions are renormalized and velocities re-projected.

use bevy::math::Vec3;

use geodesic::constants::{DEFAULT_MARKER_DENSITY, DEFAULT_MARKER_RADIUS, SCENARIO_VERSION};
use geodesic::marker::Marker;
use geodesic::scenario::{decode_scenario, encode_scenario};
use geodesic::simulation::SphereSim;

// ── Tests ─────────────────────────────────────────────────────────────────────

/// The full persistence loop reproduces count, per-marker fields, and the
/// paused flag.
#[test]
fn export_encode_decode_apply_round_trips() {
    let mut source = SphereSim::new();
    source.apply_scenario(
        vec![
            Marker::new(Vec3::X, Vec3::Y * 0.4, 0.12, 2.0, [10, 200, 30]),
            Marker::new(Vec3::Y, Vec3::Z * 0.1, 0.05, 0.5, [255, 60, 90]),
            Marker::new(Vec3::new(0.3, -0.4, 0.9).normalize(), Vec3::ZERO, 0.2, 1.0, [60, 60, 60]),
        ],
        false,
    );

    let encoded = encode_scenario(&source.export_scenario()).expect("encoding must succeed");
    let decoded = decode_scenario(&encoded).expect("decoding our own output must succeed");
    assert_eq!(decoded.skipped, 0);
    assert_eq!(decoded.version, Some(SCENARIO_VERSION));

    let mut target = SphereSim::new();
    target.apply_scenario(decoded.markers, decoded.animation_enabled);

    assert_eq!(target.marker_count(), source.marker_count());
    assert!(!target.animation_enabled, "paused flag must survive the trip");
    for (loaded, original) in target.markers.iter().zip(&source.markers) {
        assert!((loaded.position - original.position).length() < 1e-6);
        assert!((loaded.velocity - original.velocity).length() < 1e-6);
        assert!((loaded.radius - original.radius).abs() < 1e-6);
        assert!((loaded.density - original.density).abs() < 1e-6);
        assert_eq!(loaded.base_color, original.base_color);
    }
}

/// A top-level shape failure rejects the whole load; since only a successful
/// decode is ever applied, the running arena survives.
#[test]
fn document_without_markers_array_fails_and_state_survives() {
    let mut sim = SphereSim::new();
    sim.apply_scenario(
        vec![Marker::new(Vec3::X, Vec3::ZERO, 0.1, 1.0, [1, 2, 3])],
        true,
    );

    let result = decode_scenario(r#"{"version": 1, "animationEnabled": true}"#);
    assert!(result.is_err(), "a document without markers must fail outright");

    assert_eq!(sim.marker_count(), 1);
    assert_eq!(sim.markers[0].base_color, [1, 2, 3]);
}

/// Entry-level problems are contained: every bad entry is dropped and
/// counted while the good ones load.
#[test]
fn malformed_entries_are_skipped_and_counted() {
    let doc = r#"{
        "version": 1,
        "animationEnabled": true,
        "markers": [
            {"radius": 0.1, "density": 1.0, "color": [10, 20, 30], "position": [1, 0, 0], "velocity": [0, 0.2, 0]},
            {"color": "red", "position": [0, 1, 0], "velocity": [0, 0, 0]},
            {"radius": 0.1, "density": 1.0, "color": [10, 20, 30], "position": [0, 0, 1]},
            "not an object"
        ]
    }"#;
    let decoded = decode_scenario(doc).expect("document shape is valid");
    assert_eq!(decoded.markers.len(), 1, "only the well-formed entry loads");
    assert_eq!(decoded.skipped, 3);
}

/// A minimal entry carrying only the mandatory fields picks up the
/// generation defaults, and a missing animation flag reads as enabled.
#[test]
fn omitted_radius_and_density_fall_back_to_defaults() {
    let doc = r#"{"markers": [
        {"color": [5, 5, 5], "position": [0, 0, 1], "velocity": [0.3, 0, 0]}
    ]}"#;
    let decoded = decode_scenario(doc).expect("minimal entry must decode");
    assert_eq!(decoded.markers.len(), 1);
    assert!((decoded.markers[0].radius - DEFAULT_MARKER_RADIUS).abs() < 1e-6);
    assert!((decoded.markers[0].density - DEFAULT_MARKER_DENSITY).abs() < 1e-6);
    assert!(decoded.animation_enabled, "missing flag reads as enabled");
}

/// Off-surface input is repaired on load: the position renormalizes and the
/// velocity loses its radial component.
#[test]
fn loaded_markers_are_pinned_back_onto_the_surface() {
    let doc = r#"{"markers": [
        {"color": [9, 9, 9], "position": [0, 0, 4], "velocity": [0.5, 0, 0.5]}
    ]}"#;
    let decoded = decode_scenario(doc).expect("entry must decode");
    let marker = &decoded.markers[0];
    assert!((marker.position.length() - 1.0).abs() < 1e-6);
    assert!(marker.position.dot(marker.velocity).abs() < 1e-6);
    assert!((marker.position - Vec3::Z).length() < 1e-6);
    assert!((marker.velocity - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
}
