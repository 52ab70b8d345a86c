//! Centralised physics and display constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//!
//! ## Tuning guidance
//!
//! Each constant includes the tested range and the observable consequence of
//! changing it.  Runtime overrides go in `assets/physics.toml` (see
//! [`crate::config`]); this file holds the authoritative defaults.

// ── Physics: Gravity ──────────────────────────────────────────────────────────

/// Pairwise gravity strength constant.
///
/// The force between two markers is `G·mᵢ·mⱼ·(1/arc² − 1/otherArc²)` where
/// `arc` is the short great-circle separation and `otherArc` the far-side
/// separation.  Higher values → stronger mutual attraction → faster clustering.
/// Tested range: 2.0–15.0.  Values above ~20.0 cause runaway acceleration when
/// two markers close within a few angular radii.
pub const GRAVITY_CONST: f32 = 10.0;

/// Floor applied to both arc lengths before the inverse-square terms.
///
/// Two markers at near-identical positions would otherwise divide by an arc of
/// zero.  At 1e-4 rad the strongest possible pair force is finite and the
/// collision resolver takes over well before separations get this small.
pub const MIN_ARC: f32 = 1e-4;

// ── Physics: Integration ──────────────────────────────────────────────────────

/// Speeds at or below this (sphere-radii per second) skip the great-circle
/// rotation entirely; the marker is treated as stationary for the frame.
pub const SPEED_EPSILON: f32 = 1e-6;

/// Squared-length floor below which a derived direction (pair tangent,
/// collision normal) is considered degenerate and the computation that needed
/// it is skipped for the frame.
pub const DEGENERATE_EPSILON: f32 = 1e-12;

// ── Physics: Time Scale ───────────────────────────────────────────────────────

/// Multiplier applied to the wall-clock frame delta before stepping.
///
/// 1.0 is real time.  The default of 2.5 keeps slow default-speed markers
/// visibly moving without destabilising the integrator at 60 FPS.
pub const TIME_SCALE_DEFAULT: f32 = 2.5;

/// Lower bound for the runtime time-scale adjustment (`-` key).
pub const TIME_SCALE_MIN: f32 = 0.1;

/// Upper bound for the runtime time-scale adjustment (`=` key).
///
/// Above 5.0 a 60 FPS frame advances fast markers by large angles per step and
/// collision pairs start tunnelling through each other.
pub const TIME_SCALE_MAX: f32 = 5.0;

/// Time-scale change per key press.
pub const TIME_SCALE_STEP: f32 = 0.1;

// ── Marker Generation ─────────────────────────────────────────────────────────

/// Number of markers spawned by the default generation request (`G` key).
pub const DEFAULT_MARKER_COUNT: i32 = 8;

/// Initial speed (sphere-radii per second) for default generation.
pub const DEFAULT_MARKER_SPEED: f32 = 0.5;

/// Marker radius for default generation, and the fallback for scenario
/// entries that omit their radius.  Expressed in sphere radii; doubles as the
/// angular footprint under the small-angle approximation.
pub const DEFAULT_MARKER_RADIUS: f32 = 0.1;

/// Marker density for default generation, and the fallback for scenario
/// entries that omit their density.
pub const DEFAULT_MARKER_DENSITY: f32 = 1.0;

/// Minimum value for each generated colour channel.
///
/// Full-range random RGB produces occasional near-black markers that vanish
/// against the dark background; flooring all channels at 60 keeps every
/// generated marker visible while preserving variety.
pub const MARKER_COLOR_MIN_CHANNEL: u8 = 60;

// ── Display Colours ───────────────────────────────────────────────────────────

/// Display colour for a marker overlapping another this frame.
pub const COLLISION_COLOR: [u8; 3] = [255, 40, 40];

/// Display colour override for the currently selected marker (`Tab` cycles).
pub const SELECTION_COLOR: [u8; 3] = [255, 220, 40];

/// Display colour override for a transiently highlighted marker (`H`).
/// Takes precedence over the selection colour so both remain distinguishable
/// while browsing.
pub const HIGHLIGHT_COLOR: [u8; 3] = [40, 255, 255];

// ── Scenario Persistence ──────────────────────────────────────────────────────

/// Scenario document format version written on save.
///
/// Read back for logging on load; the decoder accepts any version and relies
/// on per-field defaults rather than hard rejection.
pub const SCENARIO_VERSION: u32 = 1;

/// Directory scenario files are written to, relative to the working directory.
pub const SCENARIO_DIR: &str = "scenarios";

/// Default scenario file name (`F5` saves, `F9` loads).
pub const SCENARIO_FILE: &str = "scenario.grv";

// ── Camera ────────────────────────────────────────────────────────────────────

/// Distance from the sphere centre to the default camera position.
/// At 3.5 the full unit sphere fills roughly half the vertical frame.
pub const CAMERA_DISTANCE: f32 = 3.5;

/// Vertical field of view (degrees) for the perspective projection.
pub const CAMERA_FOV_DEG: f32 = 45.0;

/// Distance from the sphere centre while following a marker (`F` key).
/// Slightly closer than the default view so the followed marker reads large.
pub const FOLLOW_DISTANCE: f32 = 2.5;

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Base colour of the central sphere (warm orange).
pub const SPHERE_COLOR: [u8; 3] = [255, 165, 0];

/// Longitude/latitude segment count for the central sphere mesh.
/// 50×50 is smooth at the default camera distance; higher values buy nothing
/// visible and cost vertex memory.
pub const SPHERE_SEGMENTS: u32 = 50;

/// Ornamental spin rate of the central sphere (degrees per second).
///
/// Purely visual: markers are simulated in world space and do not ride the
/// spinning surface.
pub const SPHERE_SPIN_DEG_PER_SEC: f32 = 3.0;

/// Triangle-fan segment count for the marker disc mesh.
/// 32 segments renders circular at typical marker sizes.
pub const MARKER_DISC_SEGMENTS: u32 = 32;

/// Markers are drawn lifted off the surface at `(1 + lift·radius)·position`
/// so large discs do not clip into the sphere.  0.1 matches the disc's visual
/// thickness across the supported radius range.
pub const MARKER_LIFT_FACTOR: f32 = 0.1;

/// Font size for the status HUD line.
pub const HUD_FONT_SIZE: f32 = 18.0;
