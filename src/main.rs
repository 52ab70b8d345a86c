use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy::window::WindowResolution;
use std::env;
use std::time::Duration;

use geodesic::config::{self, SimConfig};
use geodesic::graphics;
use geodesic::marker_rendering;
use geodesic::rendering;
use geodesic::scenario::ScenarioPlugin;
use geodesic::simulation::{self, SimulationPlugin, SphereSim};
use geodesic::testing::{
    self, spawn_test_antipodal_pair, spawn_test_collision_pair, spawn_test_invariant_soak,
    TestConfig,
};

/// Applies the loaded config to the simulation and seeds the initial
/// marker field.
fn initialize_simulation(config: Res<SimConfig>, mut sim: ResMut<SphereSim>) {
    sim.time_scale = config.time_scale;
    sim.generate(
        config.default_marker_count,
        config.default_marker_speed,
        config.default_marker_radius,
        config.default_marker_density,
    );
    eprintln!("[SETUP] Initial field: {} markers", sim.marker_count());
}

fn main() {
    // Check for test mode
    let test_mode = env::var("SPHERE_SIM_TEST").ok();

    let mut app = App::new();

    if let Some(test_name) = test_mode {
        // Verification runs without a window: the kernel is pure data, so
        // MinimalPlugins plus a 60 Hz runner is enough to drive it.
        app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(
            Duration::from_secs_f64(1.0 / 60.0),
        )))
        .add_plugins(SimulationPlugin)
        .insert_resource(TestConfig {
            enabled: true,
            ..Default::default()
        });

        // Add startup system based on test name
        match test_name.as_str() {
            "collision_pair" => app.add_systems(Startup, spawn_test_collision_pair),
            "antipodal_pair" => app.add_systems(Startup, spawn_test_antipodal_pair),
            "invariant_soak" => app.add_systems(Startup, spawn_test_invariant_soak),
            _ => {
                eprintln!("⚠ Unknown test '{test_name}', running invariant_soak");
                app.add_systems(Startup, spawn_test_invariant_soak)
            }
        };

        // Logging counts the frame before verification checks the budget.
        app.add_systems(
            PostUpdate,
            (
                testing::test_logging_system,
                testing::test_verification_system,
            )
                .chain(),
        );

        println!("Running test: {test_name}");
    } else {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Geodesic Gravity Simulator".into(),
                resolution: WindowResolution::new(1280, 720),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        .add_plugins((SimulationPlugin, ScenarioPlugin))
        .add_systems(
            Startup,
            (
                // Load config first so every other startup system sees the
                // final values.
                config::load_sim_config,
                graphics::setup_camera.after(config::load_sim_config),
                marker_rendering::setup_scene.after(config::load_sim_config),
                rendering::setup_status_hud.after(config::load_sim_config),
                initialize_simulation.after(config::load_sim_config),
            ),
        )
        .add_systems(
            Update,
            (
                simulation::simulation_keyboard_system
                    .before(simulation::simulation_step_system),
                graphics::camera_follow_system.after(simulation::simulation_step_system),
                marker_rendering::spin_sphere_system,
                (
                    marker_rendering::sync_marker_entities_system,
                    marker_rendering::update_marker_transforms_system,
                    marker_rendering::update_marker_colors_system,
                )
                    .chain()
                    .after(simulation::simulation_step_system),
                rendering::status_hud_display_system.after(simulation::simulation_step_system),
            ),
        );
    }

    app.run();
}
