//! Simulation resource, per-frame step contract, and Bevy plugin wiring.
//!
//! [`SphereSim`] owns the marker arena and everything callers may do to it:
//! stepping, generation, clearing, per-index mutation, selection context, and
//! wholesale replacement from a loaded scenario.  The frame contract in
//! [`SphereSim::step`] is strict — forces from the pre-step snapshot, then
//! integration, then collision response against post-integration positions,
//! then recolour — and reordering it changes trajectories.

use bevy::input::ButtonInput;
use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

use crate::collision;
use crate::config::SimConfig;
use crate::constants::*;
use crate::forces;
use crate::integrator;
use crate::marker::{Marker, MarkerSnapshot};
use crate::scenario::{LoadScenarioRequest, MarkerRecord, SaveScenarioRequest, ScenarioDoc};

/// The simulation state: marker arena plus animation and selection context.
///
/// Markers are indexed by position in `markers`; indices are stable within a
/// frame and only invalidated by `generate`, `clear`, or `apply_scenario`
/// (all of which bump [`SphereSim::revision`] so display layers rebuild).
#[derive(Resource, Debug, Clone)]
pub struct SphereSim {
    pub markers: Vec<Marker>,
    /// When false the step system does not run at all; the arena is frozen.
    pub animation_enabled: bool,
    /// Multiplier applied to wall-clock frame deltas (`=` / `-` keys).
    pub time_scale: f32,
    selected: Option<usize>,
    highlighted: Option<usize>,
    follow_selected: bool,
    revision: u64,
}

impl Default for SphereSim {
    fn default() -> Self {
        Self::new()
    }
}

impl SphereSim {
    pub fn new() -> Self {
        Self {
            markers: Vec::new(),
            animation_enabled: true,
            time_scale: TIME_SCALE_DEFAULT,
            selected: None,
            highlighted: None,
            follow_selected: false,
            revision: 0,
        }
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Monotonic counter bumped whenever the marker set is structurally
    /// replaced.  Display layers compare it against the revision they last
    /// built entities for.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn clear_context(&mut self) {
        self.selected = None;
        self.highlighted = None;
        self.follow_selected = false;
    }

    // ── Stepping ──────────────────────────────────────────────────────────────

    /// Advance the whole arena by `dt` seconds.
    ///
    /// Order is part of the contract: (1) force accumulation from the
    /// pre-step snapshot and one velocity kick, (2) great-circle integration
    /// of every marker, (3) collision flagging and response against the new
    /// positions, (4) recolour.  A `dt ≤ 0` call moves nothing but still
    /// refreshes collision flags and display colours from static positions.
    pub fn step(&mut self, dt: f32, gravity_const: f32) {
        if dt > 0.0 {
            forces::apply(&mut self.markers, gravity_const, dt);
            for marker in &mut self.markers {
                integrator::advance(marker, dt);
            }
            collision::resolve(&mut self.markers);
        } else {
            collision::flag_overlaps(&mut self.markers);
        }
        self.recolor();
    }

    /// Recompute every marker's display colour.
    ///
    /// Precedence: highlighted > selected > colliding > base.  Also invoked
    /// directly by the selection setters so feedback is immediate while the
    /// animation is paused and no step runs.
    pub fn recolor(&mut self) {
        let (selected, highlighted) = (self.selected, self.highlighted);
        for (index, marker) in self.markers.iter_mut().enumerate() {
            marker.display_color = if highlighted == Some(index) {
                HIGHLIGHT_COLOR
            } else if selected == Some(index) {
                SELECTION_COLOR
            } else if marker.colliding {
                COLLISION_COLOR
            } else {
                marker.base_color
            };
        }
    }

    // ── Generation ────────────────────────────────────────────────────────────

    /// Replace the arena with `count` markers at uniform speed and size.
    pub fn generate(&mut self, count: i32, speed: f32, size: f32, density: f32) {
        self.populate(count, speed, speed, size, size, density);
    }

    /// Replace the arena with `count` markers at the default density,
    /// sampling speed and size uniformly from the given ranges.
    pub fn generate_spread(
        &mut self,
        count: i32,
        speed_min: f32,
        speed_max: f32,
        size_min: f32,
        size_max: f32,
    ) {
        self.populate(
            count,
            speed_min,
            speed_max,
            size_min,
            size_max,
            DEFAULT_MARKER_DENSITY,
        );
    }

    /// Shared generation path.
    ///
    /// `count ≤ 0`, a non-positive size bound, and a non-positive density are
    /// all silently ignored, leaving the current arena untouched.  Inverted
    /// ranges are swapped before sampling.  Positions are uniform over the
    /// sphere (uniform `z` plus uniform azimuth); each velocity points in a
    /// uniformly random tangent direction.
    fn populate(
        &mut self,
        count: i32,
        mut speed_min: f32,
        mut speed_max: f32,
        mut size_min: f32,
        mut size_max: f32,
        density: f32,
    ) {
        if count <= 0 || density <= 0.0 {
            return;
        }
        if speed_max < speed_min {
            std::mem::swap(&mut speed_min, &mut speed_max);
        }
        if size_max < size_min {
            std::mem::swap(&mut size_min, &mut size_max);
        }
        if size_min <= 0.0 {
            return;
        }
        // Speeds are magnitudes; a negative lower bound is read as zero.
        speed_min = speed_min.max(0.0);
        speed_max = speed_max.max(speed_min);

        let mut rng = rand::thread_rng();
        self.markers.clear();
        self.clear_context();

        for _ in 0..count {
            let z = rng.gen_range(-1.0_f32..=1.0);
            let azimuth = rng.gen_range(0.0..TAU);
            let ring = (1.0 - z * z).max(0.0).sqrt();
            let position = Vec3::new(ring * azimuth.cos(), ring * azimuth.sin(), z);

            let (east, north) = position.any_orthonormal_pair();
            let heading = rng.gen_range(0.0..TAU);
            let direction = east * heading.cos() + north * heading.sin();

            let speed = rng.gen_range(speed_min..=speed_max);
            let radius = rng.gen_range(size_min..=size_max);
            let color = [
                rng.gen_range(MARKER_COLOR_MIN_CHANNEL..=u8::MAX),
                rng.gen_range(MARKER_COLOR_MIN_CHANNEL..=u8::MAX),
                rng.gen_range(MARKER_COLOR_MIN_CHANNEL..=u8::MAX),
            ];

            self.markers
                .push(Marker::new(position, direction * speed, radius, density, color));
        }

        self.bump_revision();
        collision::flag_overlaps(&mut self.markers);
        self.recolor();
    }

    /// Remove every marker and reset the selection context.
    pub fn clear(&mut self) {
        self.markers.clear();
        self.clear_context();
        self.bump_revision();
    }

    // ── Per-index mutation ────────────────────────────────────────────────────

    /// Set a marker's radius.  Non-positive or non-finite values and
    /// out-of-range indices are silent no-ops.
    pub fn set_radius(&mut self, index: usize, radius: f32) {
        if !radius.is_finite() || radius <= 0.0 {
            return;
        }
        if let Some(marker) = self.markers.get_mut(index) {
            marker.radius = radius;
        }
    }

    /// Set a marker's density.  Same rejection rules as [`Self::set_radius`].
    pub fn set_density(&mut self, index: usize, density: f32) {
        if !density.is_finite() || density <= 0.0 {
            return;
        }
        if let Some(marker) = self.markers.get_mut(index) {
            marker.density = density;
        }
    }

    /// Rescale a marker's velocity to the requested magnitude, keeping its
    /// direction.  A marker at rest gets a deterministic fallback tangent
    /// direction.  Negative or non-finite magnitudes and out-of-range indices
    /// are silent no-ops; zero is valid and stops the marker.
    pub fn set_speed(&mut self, index: usize, magnitude: f32) {
        if !magnitude.is_finite() || magnitude < 0.0 {
            return;
        }
        let Some(marker) = self.markers.get_mut(index) else {
            return;
        };
        let current = marker.speed();
        if current <= SPEED_EPSILON {
            marker.velocity = marker.position.any_orthonormal_vector() * magnitude;
        } else {
            marker.velocity *= magnitude / current;
        }
    }

    // ── Animation control ─────────────────────────────────────────────────────

    /// Idempotent; the step system simply stops being invoked while false.
    /// No time reference needs resetting on resume because steps consume
    /// frame-local deltas, never accumulated wall-clock time.
    pub fn set_animation_enabled(&mut self, enabled: bool) {
        self.animation_enabled = enabled;
    }

    pub fn toggle_animation(&mut self) {
        self.animation_enabled = !self.animation_enabled;
    }

    /// Nudge the time scale, clamped to the supported range.
    pub fn adjust_time_scale(&mut self, delta: f32) {
        self.time_scale = (self.time_scale + delta).clamp(TIME_SCALE_MIN, TIME_SCALE_MAX);
    }

    // ── Selection context ─────────────────────────────────────────────────────

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn follow_selected(&self) -> bool {
        self.follow_selected
    }

    /// The marker the camera should ride above, if any.
    pub fn follow_target(&self) -> Option<usize> {
        if self.follow_selected {
            self.selected
        } else {
            None
        }
    }

    /// Select a marker by index, or `None` to deselect.  An out-of-range
    /// index is a no-op.
    pub fn set_selected(&mut self, index: Option<usize>) {
        if let Some(i) = index {
            if i >= self.markers.len() {
                return;
            }
        }
        self.selected = index;
        self.recolor();
    }

    /// Transient highlight override; same index rules as selection.
    pub fn set_highlighted(&mut self, index: Option<usize>) {
        if let Some(i) = index {
            if i >= self.markers.len() {
                return;
            }
        }
        self.highlighted = index;
        self.recolor();
    }

    /// Enable or disable the follow camera; it tracks whatever is selected.
    pub fn set_follow_selected(&mut self, enabled: bool) {
        self.follow_selected = enabled;
    }

    /// Advance the selection: nothing → first marker → … → last marker →
    /// nothing.  The empty arena always deselects.
    pub fn cycle_selection(&mut self) {
        let next = match (self.selected, self.markers.len()) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(i), len) if i + 1 >= len => None,
            (Some(i), _) => Some(i + 1),
        };
        self.selected = next;
        self.recolor();
    }

    // ── Snapshot & scenario exchange ──────────────────────────────────────────

    /// Read-only rows for display layers and the scenario encoder.
    pub fn snapshot(&self) -> Vec<MarkerSnapshot> {
        self.markers
            .iter()
            .enumerate()
            .map(|(index, marker)| marker.snapshot(index))
            .collect()
    }

    /// Build the persistable document for the current arena.
    pub fn export_scenario(&self) -> ScenarioDoc {
        ScenarioDoc {
            version: SCENARIO_VERSION,
            animation_enabled: self.animation_enabled,
            sphere_radius: 1.0,
            markers: self.snapshot().into_iter().map(MarkerRecord::from).collect(),
        }
    }

    /// Replace the whole arena with a decoded scenario.  Selection context is
    /// reset, collision flags and colours refresh immediately so the loaded
    /// state displays correctly even while paused.
    pub fn apply_scenario(&mut self, markers: Vec<Marker>, animation_enabled: bool) {
        self.markers = markers;
        self.animation_enabled = animation_enabled;
        self.clear_context();
        self.bump_revision();
        collision::flag_overlaps(&mut self.markers);
        self.recolor();
    }
}

// ── Plugin & systems ──────────────────────────────────────────────────────────

/// Registers the simulation resource and the per-frame step system.
///
/// Deliberately headless: input and display systems are wired separately in
/// `main.rs`, so this plugin runs unmodified under `MinimalPlugins` in tests.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SphereSim>()
            .init_resource::<SimConfig>()
            .add_systems(Update, simulation_step_system);
    }
}

/// Step the arena once per frame while animation is enabled.
///
/// Pausing stops invocation entirely rather than stepping with `dt = 0`;
/// because the delta is frame-local, resuming never replays paused time.
pub fn simulation_step_system(
    time: Res<Time>,
    config: Res<SimConfig>,
    mut sim: ResMut<SphereSim>,
) {
    if !sim.animation_enabled {
        return;
    }
    let dt = time.delta_secs() * sim.time_scale;
    sim.step(dt, config.gravity_const);
}

/// Keyboard controls for the running simulation.
///
/// Space pauses/resumes, `G` regenerates the default field, `C` clears,
/// `=`/`-` adjust the time scale, `Tab` cycles the selection, `H` and `F`
/// toggle highlight and camera-follow for the selected marker, `F5`/`F9`
/// request a scenario save/load.
pub fn simulation_keyboard_system(
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<SimConfig>,
    mut sim: ResMut<SphereSim>,
    mut save_requests: MessageWriter<SaveScenarioRequest>,
    mut load_requests: MessageWriter<LoadScenarioRequest>,
) {
    if keys.just_pressed(KeyCode::Space) {
        sim.toggle_animation();
        info!(
            "Animation {}",
            if sim.animation_enabled { "resumed" } else { "paused" }
        );
    }
    if keys.just_pressed(KeyCode::KeyG) {
        sim.generate(
            config.default_marker_count,
            config.default_marker_speed,
            config.default_marker_radius,
            config.default_marker_density,
        );
        info!("Generated {} markers", sim.marker_count());
    }
    if keys.just_pressed(KeyCode::KeyC) {
        sim.clear();
        info!("Cleared all markers");
    }
    if keys.just_pressed(KeyCode::Equal) {
        sim.adjust_time_scale(TIME_SCALE_STEP);
    }
    if keys.just_pressed(KeyCode::Minus) {
        sim.adjust_time_scale(-TIME_SCALE_STEP);
    }
    if keys.just_pressed(KeyCode::Tab) {
        sim.cycle_selection();
    }
    if keys.just_pressed(KeyCode::KeyH) {
        let target = sim.selected();
        if sim.highlighted() == target {
            sim.set_highlighted(None);
        } else {
            sim.set_highlighted(target);
        }
    }
    if keys.just_pressed(KeyCode::KeyF) {
        let enabled = !sim.follow_selected();
        sim.set_follow_selected(enabled);
    }
    if keys.just_pressed(KeyCode::F5) {
        save_requests.write(SaveScenarioRequest);
    }
    if keys.just_pressed(KeyCode::F9) {
        load_requests.write(LoadScenarioRequest);
    }
}
