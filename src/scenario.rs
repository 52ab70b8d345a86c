//! Scenario persistence: a versioned JSON document (`scenarios/scenario.grv`)
//! holding the animation flag and every marker.  Decoding is strict about the
//! document shape and lenient about individual entries: a file without a
//! markers array fails the whole load, a malformed entry is skipped.

use std::fs;
use std::path::PathBuf;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::*;
use crate::error::{SimError, SimResult};
use crate::marker::{Marker, MarkerSnapshot};
use crate::simulation::SphereSim;

#[derive(Message, Debug, Clone, Copy)]
pub struct SaveScenarioRequest;

#[derive(Message, Debug, Clone, Copy)]
pub struct LoadScenarioRequest;

/// The persisted document, serialized with camelCase keys.
#[derive(Serialize, Debug, Clone)]
pub struct ScenarioDoc {
    pub version: u32,
    #[serde(rename = "animationEnabled")]
    pub animation_enabled: bool,
    #[serde(rename = "sphereRadius")]
    pub sphere_radius: f32,
    pub markers: Vec<MarkerRecord>,
}

/// One marker row of the document.
///
/// `radius` and `density` may be omitted and fall back to the generation
/// defaults; `color`, `position`, and `velocity` are mandatory exact-3 lists
/// and an entry missing them (or carrying wrong-typed values, including color
/// channels outside `0..=255`) fails typed decode and is skipped.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct MarkerRecord {
    #[serde(default = "default_record_radius")]
    pub radius: f32,
    #[serde(default = "default_record_density")]
    pub density: f32,
    pub color: [u8; 3],
    pub position: [f32; 3],
    pub velocity: [f32; 3],
}

fn default_record_radius() -> f32 {
    DEFAULT_MARKER_RADIUS
}

fn default_record_density() -> f32 {
    DEFAULT_MARKER_DENSITY
}

impl From<MarkerSnapshot> for MarkerRecord {
    fn from(snapshot: MarkerSnapshot) -> Self {
        Self {
            radius: snapshot.radius,
            density: snapshot.density,
            color: snapshot.color,
            position: snapshot.position.to_array(),
            velocity: snapshot.velocity.to_array(),
        }
    }
}

/// Result of a successful decode, ready to hand to
/// [`SphereSim::apply_scenario`].
#[derive(Debug, Clone)]
pub struct DecodedScenario {
    pub markers: Vec<Marker>,
    pub animation_enabled: bool,
    /// Informational only; no version is rejected.
    pub version: Option<u32>,
    /// Count of entries dropped by the lenient per-entry pass.
    pub skipped: usize,
}

// ── Codec ─────────────────────────────────────────────────────────────────────

pub fn encode_scenario(document: &ScenarioDoc) -> Result<String, String> {
    serde_json::to_string_pretty(document)
        .map_err(|err| format!("failed to serialize scenario JSON: {err}"))
}

/// Decode a scenario document.
///
/// Top-level failures (unparseable JSON, a non-object root, a missing or
/// non-array `markers` field) return an error and the caller keeps its prior
/// state.  Within the array each entry decodes independently; failures are
/// logged and counted, never fatal.  Missing `animationEnabled` reads as
/// enabled; `version` and `sphereRadius` are carried for the file format but
/// not enforced.
pub fn decode_scenario(contents: &str) -> SimResult<DecodedScenario> {
    let document: Value = serde_json::from_str(contents).map_err(|err| SimError::ScenarioParse {
        detail: err.to_string(),
    })?;

    let root = document.as_object().ok_or(SimError::ScenarioShape {
        detail: "scenario root must be a JSON object",
    })?;

    let entries = root
        .get("markers")
        .and_then(Value::as_array)
        .ok_or(SimError::ScenarioShape {
            detail: "scenario must carry a markers array",
        })?;

    let version = root.get("version").and_then(Value::as_u64).map(|v| v as u32);
    let animation_enabled = root
        .get("animationEnabled")
        .and_then(Value::as_bool)
        .unwrap_or(true);

    let mut markers = Vec::with_capacity(entries.len());
    let mut skipped = 0;
    for (index, entry) in entries.iter().enumerate() {
        let record = match serde_json::from_value::<MarkerRecord>(entry.clone()) {
            Ok(record) => record,
            Err(err) => {
                warn!("Skipping malformed scenario entry {index}: {err}");
                skipped += 1;
                continue;
            }
        };
        match marker_from_record(record) {
            Some(marker) => markers.push(marker),
            None => {
                warn!("Skipping scenario entry {index}: unusable position or velocity");
                skipped += 1;
            }
        }
    }

    Ok(DecodedScenario {
        markers,
        animation_enabled,
        version,
        skipped,
    })
}

/// Turn a decoded row into a live marker, or reject it.
///
/// A zero (unnormalizable) or non-finite position and a non-finite velocity
/// drop the entry; out-of-range radius and density values fall back to the
/// generation defaults.  `Marker::new` renormalizes the position and
/// re-projects the velocity into the tangent plane.
fn marker_from_record(record: MarkerRecord) -> Option<Marker> {
    let position = Vec3::from_array(record.position);
    let velocity = Vec3::from_array(record.velocity);
    if !position.is_finite() || !velocity.is_finite() {
        return None;
    }
    if position.length_squared() <= DEGENERATE_EPSILON {
        return None;
    }

    let radius = if record.radius.is_finite() && record.radius > 0.0 {
        record.radius
    } else {
        DEFAULT_MARKER_RADIUS
    };
    let density = if record.density.is_finite() && record.density > 0.0 {
        record.density
    } else {
        DEFAULT_MARKER_DENSITY
    };

    Some(Marker::new(position, velocity, radius, density, record.color))
}

// ── File IO ───────────────────────────────────────────────────────────────────

fn scenario_dir() -> PathBuf {
    PathBuf::from(SCENARIO_DIR)
}

pub fn scenario_path() -> PathBuf {
    scenario_dir().join(SCENARIO_FILE)
}

pub fn save_scenario_file(document: &ScenarioDoc) -> Result<(), String> {
    fs::create_dir_all(scenario_dir())
        .map_err(|err| format!("failed to create scenario dir: {err}"))?;

    let serialized = encode_scenario(document)?;

    let path = scenario_path();
    fs::write(&path, serialized).map_err(|err| format!("failed to write {}: {err}", path.display()))
}

pub fn load_scenario_file() -> Result<DecodedScenario, String> {
    let path = scenario_path();
    let contents = fs::read_to_string(&path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;

    decode_scenario(&contents).map_err(|err| err.to_string())
}

// ── Plugin & systems ──────────────────────────────────────────────────────────

/// Registers the save/load request messages and their handlers.
pub struct ScenarioPlugin;

impl Plugin for ScenarioPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SaveScenarioRequest>()
            .add_message::<LoadScenarioRequest>()
            .add_systems(
                Update,
                (
                    handle_save_scenario_requests_system,
                    handle_load_scenario_requests_system,
                ),
            );
    }
}

pub fn handle_save_scenario_requests_system(
    mut requests: MessageReader<SaveScenarioRequest>,
    sim: Res<SphereSim>,
) {
    for _ in requests.read() {
        let document = sim.export_scenario();
        match save_scenario_file(&document) {
            Ok(()) => {
                info!(
                    "Saved {} markers to {}",
                    document.markers.len(),
                    scenario_path().display()
                );
            }
            Err(err) => {
                error!("Failed to save scenario: {err}");
            }
        }
    }
}

/// Applies a freshly loaded scenario, or logs why it could not; a failed load
/// leaves the running simulation untouched.
pub fn handle_load_scenario_requests_system(
    mut requests: MessageReader<LoadScenarioRequest>,
    mut sim: ResMut<SphereSim>,
) {
    for _ in requests.read() {
        match load_scenario_file() {
            Ok(decoded) => {
                if decoded.skipped > 0 {
                    warn!("Skipped {} malformed scenario entries", decoded.skipped);
                }
                info!(
                    "Loaded {} markers from {}",
                    decoded.markers.len(),
                    scenario_path().display()
                );
                sim.apply_scenario(decoded.markers, decoded.animation_enabled);
            }
            Err(err) => {
                error!("Failed to load scenario: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc() -> ScenarioDoc {
        ScenarioDoc {
            version: SCENARIO_VERSION,
            animation_enabled: false,
            sphere_radius: 1.0,
            markers: vec![MarkerRecord {
                radius: 0.12,
                density: 2.0,
                color: [10, 200, 30],
                position: [0.0, 0.0, 1.0],
                velocity: [0.3, 0.0, 0.0],
            }],
        }
    }

    // ── Round trip ────────────────────────────────────────────────────────────

    #[test]
    fn round_trip_preserves_marker_fields() {
        let text = encode_scenario(&sample_doc()).expect("encode must succeed");
        let decoded = decode_scenario(&text).expect("decode must succeed");

        assert_eq!(decoded.version, Some(SCENARIO_VERSION));
        assert!(!decoded.animation_enabled);
        assert_eq!(decoded.skipped, 0);
        assert_eq!(decoded.markers.len(), 1);

        let marker = &decoded.markers[0];
        assert_eq!(marker.base_color, [10, 200, 30]);
        assert!((marker.radius - 0.12).abs() < 1e-6);
        assert!((marker.density - 2.0).abs() < 1e-6);
        assert!((marker.position - Vec3::Z).length() < 1e-6);
        assert!((marker.velocity - Vec3::new(0.3, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn encode_writes_camel_case_keys() {
        let text = encode_scenario(&sample_doc()).expect("encode must succeed");
        assert!(text.contains("\"animationEnabled\""));
        assert!(text.contains("\"sphereRadius\""));
        assert!(text.contains("\"markers\""));
        assert!(text.contains('\n'), "document should be pretty-printed");
    }

    // ── Document-level strictness ─────────────────────────────────────────────

    #[test]
    fn unparseable_json_is_a_parse_error() {
        match decode_scenario("{ not json") {
            Err(SimError::ScenarioParse { .. }) => {}
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn wrong_document_shapes_are_shape_errors() {
        for contents in ["[1, 2, 3]", "{}", "{\"markers\": 7}", "\"grv\""] {
            match decode_scenario(contents) {
                Err(SimError::ScenarioShape { .. }) => {}
                other => panic!("expected a shape error for {contents}, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_top_level_fields_are_ignored() {
        let decoded = decode_scenario("{\"markers\": [], \"futureField\": {\"a\": 1}}")
            .expect("unknown fields must not fail the load");
        assert_eq!(decoded.markers.len(), 0);
    }

    #[test]
    fn missing_animation_flag_reads_as_enabled() {
        let decoded = decode_scenario("{\"markers\": []}").expect("decode must succeed");
        assert!(decoded.animation_enabled);
        assert_eq!(decoded.version, None);

        let decoded = decode_scenario("{\"markers\": [], \"animationEnabled\": \"yes\"}")
            .expect("decode must succeed");
        assert!(decoded.animation_enabled, "wrong-typed flag falls back to enabled");
    }

    // ── Entry-level leniency ──────────────────────────────────────────────────

    #[test]
    fn malformed_entries_are_skipped_not_fatal() {
        let contents = r#"{
            "version": 1,
            "markers": [
                {"radius": 0.1, "density": 1.0, "color": [100, 100, 100],
                 "position": [1.0, 0.0, 0.0], "velocity": [0.0, 0.0, 0.0]},
                42,
                {"color": [1, 2, 3], "position": [0.0, 1.0, 0.0]},
                {"color": [300, 0, 0], "position": [0.0, 0.0, 1.0],
                 "velocity": [0.0, 0.0, 0.0]}
            ]
        }"#;
        let decoded = decode_scenario(contents).expect("document itself is well-formed");
        assert_eq!(decoded.markers.len(), 1, "only the intact entry survives");
        assert_eq!(decoded.skipped, 3);
    }

    #[test]
    fn wrong_length_triples_skip_the_entry() {
        let contents = r#"{"markers": [
            {"color": [1, 2], "position": [1.0, 0.0, 0.0], "velocity": [0.0, 0.0, 0.0]},
            {"color": [1, 2, 3], "position": [1.0, 0.0], "velocity": [0.0, 0.0, 0.0]}
        ]}"#;
        let decoded = decode_scenario(contents).expect("decode must succeed");
        assert_eq!(decoded.markers.len(), 0);
        assert_eq!(decoded.skipped, 2);
    }

    #[test]
    fn missing_radius_and_density_fall_back_to_defaults() {
        let contents = r#"{"markers": [
            {"color": [50, 60, 70], "position": [0.0, 1.0, 0.0], "velocity": [0.0, 0.0, 0.0]}
        ]}"#;
        let decoded = decode_scenario(contents).expect("decode must succeed");
        assert_eq!(decoded.markers.len(), 1);
        assert_eq!(decoded.markers[0].radius, DEFAULT_MARKER_RADIUS);
        assert_eq!(decoded.markers[0].density, DEFAULT_MARKER_DENSITY);
    }

    #[test]
    fn non_positive_radius_and_density_fall_back_to_defaults() {
        let contents = r#"{"markers": [
            {"radius": -0.5, "density": 0.0, "color": [50, 60, 70],
             "position": [0.0, 1.0, 0.0], "velocity": [0.0, 0.0, 0.0]}
        ]}"#;
        let decoded = decode_scenario(contents).expect("decode must succeed");
        assert_eq!(decoded.markers.len(), 1);
        assert_eq!(decoded.markers[0].radius, DEFAULT_MARKER_RADIUS);
        assert_eq!(decoded.markers[0].density, DEFAULT_MARKER_DENSITY);
        assert_eq!(decoded.skipped, 0, "bad scalars degrade, they do not skip");
    }

    #[test]
    fn zero_position_entries_are_skipped() {
        let contents = r#"{"markers": [
            {"color": [50, 60, 70], "position": [0.0, 0.0, 0.0], "velocity": [0.1, 0.0, 0.0]}
        ]}"#;
        let decoded = decode_scenario(contents).expect("decode must succeed");
        assert_eq!(decoded.markers.len(), 0);
        assert_eq!(decoded.skipped, 1);
    }

    #[test]
    fn loaded_state_is_renormalized_and_reprojected() {
        let contents = r#"{"markers": [
            {"color": [50, 60, 70], "position": [0.0, 0.0, 2.0], "velocity": [1.0, 0.0, 1.0]}
        ]}"#;
        let decoded = decode_scenario(contents).expect("decode must succeed");
        let marker = &decoded.markers[0];
        assert!(
            (marker.position - Vec3::Z).length() < 1e-6,
            "off-sphere position must renormalize"
        );
        assert!(
            (marker.velocity - Vec3::X).length() < 1e-6,
            "normal component of velocity must be projected away"
        );
    }
}
