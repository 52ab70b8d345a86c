//! Headless verification scenarios for the simulation kernel.
//!
//! Each scenario is selected by name through the `SPHERE_SIM_TEST`
//! environment variable, runs for a fixed frame budget, prints a
//! verdict, and exits the app. Scenarios:
//!
//! - `collision_pair` — two markers converge along the equator, must
//!   register a collision and stay on the surface afterwards.
//! - `antipodal_pair` — two resting markers at exactly opposite points,
//!   must not move and must not produce non-finite state.
//! - `invariant_soak` — a random field integrated for 600 frames, every
//!   marker must hold the surface and tangency invariants throughout.

use bevy::app::AppExit;
use bevy::prelude::*;
use std::io::Write;

use crate::marker::Marker;
use crate::simulation::SphereSim;

// ── Test configuration ──────────────────────────────────────────────────────

/// Bookkeeping for the active verification scenario.
#[derive(Resource)]
pub struct TestConfig {
    pub enabled: bool,
    pub test_name: String,
    /// Frame at which the verdict is printed and the app exits.
    pub frame_limit: u32,
    pub frame_count: u32,
    /// Latched as soon as any marker is flagged colliding.
    pub collision_observed: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            test_name: String::new(),
            frame_limit: 240,
            frame_count: 0,
            collision_observed: false,
        }
    }
}

// ── Scenario spawners ───────────────────────────────────────────────────────

/// Two markers on the equator, offset ±0.35 rad from +X and closing
/// head-on at 0.4 rad/s each. Their discs (radius 0.1) meet well inside
/// the frame budget.
pub fn spawn_test_collision_pair(
    mut sim: ResMut<SphereSim>,
    mut test_config: ResMut<TestConfig>,
) {
    test_config.test_name = "collision_pair".to_string();
    test_config.frame_limit = 240;

    let offset = 0.35_f32;
    let speed = 0.4_f32;
    let markers = vec![
        Marker::new(
            Vec3::new(offset.cos(), -offset.sin(), 0.0),
            Vec3::new(offset.sin(), offset.cos(), 0.0) * speed,
            0.1,
            1.0,
            [220, 160, 90],
        ),
        Marker::new(
            Vec3::new(offset.cos(), offset.sin(), 0.0),
            Vec3::new(offset.sin(), -offset.cos(), 0.0) * speed,
            0.1,
            1.0,
            [90, 160, 220],
        ),
    ];
    sim.apply_scenario(markers, true);

    println!("✓ Spawned test: equator pair, arc 0.70 rad, closing at 0.80 rad/s");
}

/// Two resting markers at exactly +X and -X with radii large enough to
/// overlap. Both the gravity arc and the collision midpoint are
/// degenerate here; the pair must simply stay pinned.
pub fn spawn_test_antipodal_pair(
    mut sim: ResMut<SphereSim>,
    mut test_config: ResMut<TestConfig>,
) {
    test_config.test_name = "antipodal_pair".to_string();
    test_config.frame_limit = 240;

    let markers = vec![
        Marker::new(Vec3::X, Vec3::ZERO, 2.0, 1.0, [220, 90, 90]),
        Marker::new(-Vec3::X, Vec3::ZERO, 2.0, 1.0, [90, 90, 220]),
    ];
    sim.apply_scenario(markers, true);

    println!("✓ Spawned test: antipodal resting pair, radius 2.0 each");
}

/// A 24-marker random field soaked for 600 frames. Checks that repeated
/// force/integrate/collide rounds never let a marker drift off the
/// surface or pick up a radial velocity component.
pub fn spawn_test_invariant_soak(
    mut sim: ResMut<SphereSim>,
    mut test_config: ResMut<TestConfig>,
) {
    test_config.test_name = "invariant_soak".to_string();
    test_config.frame_limit = 600;

    sim.generate_spread(24, 0.2, 0.8, 0.05, 0.15);
    sim.set_animation_enabled(true);

    println!("✓ Spawned test: 24 random markers for a 600-frame soak");
}

// ── Logging and verification ────────────────────────────────────────────────

/// Counts frames, latches collisions, and prints periodic progress.
pub fn test_logging_system(mut test_config: ResMut<TestConfig>, sim: Res<SphereSim>) {
    if !test_config.enabled {
        return;
    }
    test_config.frame_count += 1;

    if sim.markers.iter().any(|m| m.colliding) {
        test_config.collision_observed = true;
    }

    if test_config.frame_count == 1 {
        println!(
            "[Frame 1] Test: {} | Markers: {}",
            test_config.test_name,
            sim.marker_count()
        );
        for (i, marker) in sim.markers.iter().enumerate() {
            println!(
                "  [{}] pos: ({:.3}, {:.3}, {:.3}), speed: {:.3}",
                i,
                marker.position.x,
                marker.position.y,
                marker.position.z,
                marker.speed()
            );
        }
    } else if test_config.frame_count.is_multiple_of(100)
        || test_config.frame_count == test_config.frame_limit
    {
        println!(
            "[Frame {}] markers: {} | worst |p|-1: {:.2e} | worst p.v: {:.2e}",
            test_config.frame_count,
            sim.marker_count(),
            worst_radial_error(&sim),
            worst_tangency_error(&sim)
        );
    }
}

/// Prints the verdict once the frame budget is spent, then exits.
pub fn test_verification_system(
    test_config: Res<TestConfig>,
    sim: Res<SphereSim>,
    mut exit: MessageWriter<AppExit>,
) {
    if !test_config.enabled || test_config.frame_count != test_config.frame_limit {
        return;
    }

    println!("\n╔════════════════════════════════════════════╗");
    println!("║               TEST COMPLETE                ║");
    println!("╚════════════════════════════════════════════╝");
    println!("Test: {}", test_config.test_name);
    println!("Frames: {}", test_config.frame_count);
    println!("Markers: {}", sim.marker_count());

    let verdict = verify_test_result(&test_config, &sim);
    println!("{verdict}\n");
    let _ = std::io::stdout().flush();

    exit.write(AppExit::Success);
}

fn verify_test_result(test_config: &TestConfig, sim: &SphereSim) -> String {
    let finite = sim
        .markers
        .iter()
        .all(|m| m.position.is_finite() && m.velocity.is_finite());
    let worst_radial = worst_radial_error(sim);
    let worst_tangency = worst_tangency_error(sim);
    let invariants_ok = finite && worst_radial <= 1e-4 && worst_tangency <= 1e-4;

    match test_config.test_name.as_str() {
        "collision_pair" => {
            if test_config.collision_observed && invariants_ok {
                "✓ PASS: pair collided and stayed on the surface".to_string()
            } else if !test_config.collision_observed {
                "✗ FAIL: markers never registered a collision".to_string()
            } else {
                format!(
                    "✗ FAIL: surface invariants violated (|p|-1: {worst_radial:.2e}, p.v: {worst_tangency:.2e})"
                )
            }
        }
        "antipodal_pair" => {
            let held = sim.markers.len() == 2
                && (sim.markers[0].position - Vec3::X).length() < 1e-3
                && (sim.markers[1].position + Vec3::X).length() < 1e-3;
            if held && finite {
                "✓ PASS: antipodal pair stayed pinned with no numerical blow-up".to_string()
            } else {
                "✗ FAIL: antipodal pair moved or went non-finite".to_string()
            }
        }
        "invariant_soak" => {
            if invariants_ok && sim.marker_count() == 24 {
                format!(
                    "✓ PASS: 24 markers held invariants for {} frames (worst |p|-1: {worst_radial:.2e})",
                    test_config.frame_count
                )
            } else {
                format!(
                    "✗ FAIL: invariants violated (|p|-1: {worst_radial:.2e}, p.v: {worst_tangency:.2e})"
                )
            }
        }
        other => format!("? UNKNOWN test name: {other}"),
    }
}

fn worst_radial_error(sim: &SphereSim) -> f32 {
    sim.markers
        .iter()
        .map(|m| (m.position.length() - 1.0).abs())
        .fold(0.0, f32::max)
}

fn worst_tangency_error(sim: &SphereSim) -> f32 {
    sim.markers
        .iter()
        .map(|m| m.position.dot(m.velocity).abs())
        .fold(0.0, f32::max)
}
