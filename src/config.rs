//! Runtime simulation configuration loaded from `assets/physics.toml`.
//!
//! [`SimConfig`] is a Bevy [`Resource`] that mirrors the tunable constants in
//! [`crate::constants`].  At startup, [`load_sim_config`] reads
//! `assets/physics.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the constants you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<SimConfig>` to any system parameter list and read values
//! with `config.gravity_const`, `config.time_scale`, etc.
//!
//! ## Tuning workflow
//!
//! 1. Edit `assets/physics.toml`.
//! 2. Restart the simulation — no recompilation required.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `SimConfig::default()`.

use crate::constants::*;
use crate::error::{validate_gravity_const, validate_time_scale};
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable simulation configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset by setting the value in
/// `assets/physics.toml`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // ── Physics ──────────────────────────────────────────────────────────────
    pub gravity_const: f32,
    pub time_scale: f32,

    // ── Generation defaults ──────────────────────────────────────────────────
    pub default_marker_count: i32,
    pub default_marker_speed: f32,
    pub default_marker_radius: f32,
    pub default_marker_density: f32,

    // ── Camera ───────────────────────────────────────────────────────────────
    pub camera_distance: f32,
    pub follow_distance: f32,

    // ── Rendering ────────────────────────────────────────────────────────────
    pub sphere_spin_deg_per_sec: f32,
    pub hud_font_size: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            // Physics
            gravity_const: GRAVITY_CONST,
            time_scale: TIME_SCALE_DEFAULT,
            // Generation defaults
            default_marker_count: DEFAULT_MARKER_COUNT,
            default_marker_speed: DEFAULT_MARKER_SPEED,
            default_marker_radius: DEFAULT_MARKER_RADIUS,
            default_marker_density: DEFAULT_MARKER_DENSITY,
            // Camera
            camera_distance: CAMERA_DISTANCE,
            follow_distance: FOLLOW_DISTANCE,
            // Rendering
            sphere_spin_deg_per_sec: SPHERE_SPIN_DEG_PER_SEC,
            hud_font_size: HUD_FONT_SIZE,
        }
    }
}

/// Startup system: attempt to load `assets/physics.toml` and overwrite the
/// `SimConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  TOML parse errors are printed
/// to stderr but do not abort the simulation.  A missing file is silently
/// ignored (defaults are already in place from `insert_resource`).  Loaded
/// physics values outside their safe ranges revert to the defaults.
pub fn load_sim_config(mut config: ResMut<SimConfig>) {
    let path = "assets/physics.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<SimConfig>(&contents) {
            Ok(loaded) => {
                *config = loaded;
                println!("✓ Loaded simulation config from {path}");
            }
            Err(e) => {
                eprintln!("⚠ Failed to parse {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            // File not present — defaults are already in place; not an error.
            println!("ℹ No {path} found; using compiled defaults");
        }
    }

    if let Err(e) = validate_gravity_const(config.gravity_const) {
        eprintln!("⚠ {e}; reverting gravity_const to {GRAVITY_CONST}");
        config.gravity_const = GRAVITY_CONST;
    }
    if let Err(e) = validate_time_scale(config.time_scale) {
        eprintln!("⚠ {e}; reverting time_scale to {TIME_SCALE_DEFAULT}");
        config.time_scale = TIME_SCALE_DEFAULT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let config: SimConfig =
            toml::from_str("gravity_const = 5.0\ndefault_marker_count = 12\n")
                .expect("partial config must parse");
        assert_eq!(config.gravity_const, 5.0);
        assert_eq!(config.default_marker_count, 12);
        assert_eq!(config.time_scale, TIME_SCALE_DEFAULT, "unnamed keys keep defaults");
        assert_eq!(config.default_marker_radius, DEFAULT_MARKER_RADIUS);
    }

    #[test]
    fn empty_toml_yields_compiled_defaults() {
        let config: SimConfig = toml::from_str("").expect("empty config must parse");
        assert_eq!(config.gravity_const, GRAVITY_CONST);
        assert_eq!(config.default_marker_count, DEFAULT_MARKER_COUNT);
        assert_eq!(config.hud_font_size, HUD_FONT_SIZE);
    }
}
