//! Headless app-level tests for the simulation plugin.
//!
//! These use [`MinimalPlugins`] — no window, no rendering — mirroring the
//! verification path in `main.rs`, so they run fast and deterministically
//! in CI.
//!
//! Covered scenarios:
//! 1. The plugin starts an empty, animating simulation with default config.
//! 2. A paused simulation is bit-for-bit frozen across frames.
//! 3. An animating simulation advances marker positions with wall time.
//! 4. Gravity can be disabled through the config resource.
//! 5. Resuming after a pause does not replay the paused interval.

use bevy::math::Vec3;
use bevy::prelude::*;
use std::thread;
use std::time::Duration;

use geodesic::config::SimConfig;
use geodesic::marker::Marker;
use geodesic::simulation::{SimulationPlugin, SphereSim};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a minimal headless app with the simulation plugin registered.
fn sim_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(SimulationPlugin);
    app
}

fn seed_markers(app: &mut App, markers: Vec<Marker>, animation_enabled: bool) {
    app.world_mut()
        .resource_mut::<SphereSim>()
        .apply_scenario(markers, animation_enabled);
}

fn positions(app: &App) -> Vec<Vec3> {
    app.world()
        .resource::<SphereSim>()
        .markers
        .iter()
        .map(|m| m.position)
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// The plugin's resources come up with an empty arena and default physics.
#[test]
fn plugin_starts_empty_and_animating() {
    let mut app = sim_app();
    app.update();

    let sim = app.world().resource::<SphereSim>();
    assert_eq!(sim.marker_count(), 0);
    assert!(sim.animation_enabled, "a fresh simulation must be animating");

    let config = app.world().resource::<SimConfig>();
    assert!(config.gravity_const > 0.0, "default gravity must be attractive");
}

/// While paused the step system never runs, so positions stay bit-for-bit
/// identical no matter how much wall time passes.
#[test]
fn paused_simulation_is_frozen_across_frames() {
    let mut app = sim_app();
    seed_markers(
        &mut app,
        vec![Marker::new(Vec3::X, Vec3::Y * 0.5, 0.1, 1.0, [100, 100, 100])],
        false,
    );
    app.update();
    let before = positions(&app);

    for _ in 0..5 {
        thread::sleep(Duration::from_millis(5));
        app.update();
    }

    assert_eq!(positions(&app), before, "a paused arena must not move at all");
}

/// With animation enabled, real frame deltas move the markers.
#[test]
fn animating_simulation_advances_markers() {
    let mut app = sim_app();
    seed_markers(
        &mut app,
        vec![Marker::new(Vec3::X, Vec3::Y * 0.5, 0.1, 1.0, [100, 100, 100])],
        true,
    );
    app.update(); // first frame has a zero delta
    let before = positions(&app);

    for _ in 0..3 {
        thread::sleep(Duration::from_millis(20));
        app.update();
    }

    let after = positions(&app);
    assert!(
        (after[0] - before[0]).length() > 1e-4,
        "an animating marker must move with wall time"
    );
}

/// Zeroing `gravity_const` in the config leaves a resting field static even
/// while the animation runs.
#[test]
fn gravity_can_be_disabled_through_config() {
    let mut app = sim_app();
    app.world_mut().resource_mut::<SimConfig>().gravity_const = 0.0;
    seed_markers(
        &mut app,
        vec![
            Marker::new(Vec3::X, Vec3::ZERO, 0.1, 1.0, [9, 9, 9]),
            Marker::new(Vec3::Y, Vec3::ZERO, 0.1, 1.0, [9, 9, 9]),
        ],
        true,
    );
    app.update();
    let before = positions(&app);

    for _ in 0..5 {
        thread::sleep(Duration::from_millis(10));
        app.update();
    }

    for (now, then) in positions(&app).iter().zip(&before) {
        assert!(
            (*now - *then).length() < 1e-6,
            "a resting field without gravity must stay put"
        );
    }
}

/// Steps consume frame-local deltas, so wall time that passes while paused
/// is dropped rather than applied in a burst on resume.
#[test]
fn resume_does_not_replay_the_paused_interval() {
    let mut app = sim_app();
    seed_markers(
        &mut app,
        vec![Marker::new(Vec3::X, Vec3::Y * 2.0, 0.1, 1.0, [100, 100, 100])],
        true,
    );
    app.update();

    // Pause, let wall time pass, and tick once more so the accumulated
    // delta is consumed by a frame that does not step.
    app.world_mut()
        .resource_mut::<SphereSim>()
        .set_animation_enabled(false);
    app.update();
    thread::sleep(Duration::from_millis(500));
    app.update();

    let before = positions(&app);
    app.world_mut()
        .resource_mut::<SphereSim>()
        .set_animation_enabled(true);
    app.update(); // this frame's delta is tiny, not the 500 ms pause

    let drift = (positions(&app)[0] - before[0]).length();
    assert!(
        drift < 0.5,
        "resume must not replay paused time, drift = {drift}"
    );
}
