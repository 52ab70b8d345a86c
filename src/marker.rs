//! Marker data model: one surface-bound particle per entry.
//!
//! Markers live in a plain `Vec` owned by [`crate::simulation::SphereSim`] and
//! are addressed by index.  Nothing in here touches the ECS; rendering
//! subscribes to the arena from the outside and the physics passes in
//! [`crate::forces`] and [`crate::collision`] operate on slices of this type.

use bevy::math::Vec3;

use crate::constants::*;

/// Component of `v` tangent to the sphere at unit position `p`.
///
/// Used everywhere a vector must be flattened into the local surface plane:
/// velocity re-projection after integration, pair tangents in the force pass,
/// and the collision normal construction.
pub fn tangent_component(v: Vec3, p: Vec3) -> Vec3 {
    v - p * v.dot(p)
}

/// One simulated particle pinned to the unit sphere.
///
/// Invariants, restored by [`Marker::clamp_to_surface`] after every update:
/// `position` has unit length and `velocity` is orthogonal to it.  `radius`
/// doubles as the angular footprint (small-angle approximation on a unit
/// sphere).  `base_color` is what the marker owns and what gets persisted;
/// `display_color` is the per-frame output of the recolour pass and may be a
/// collision or selection override.
#[derive(Debug, Clone)]
pub struct Marker {
    pub position: Vec3,
    pub velocity: Vec3,
    pub radius: f32,
    pub density: f32,
    pub base_color: [u8; 3],
    pub display_color: [u8; 3],
    /// Set by the collision pass each frame; read by the recolour pass.
    pub colliding: bool,
}

impl Marker {
    /// Build a marker from raw values, restoring the surface invariants:
    /// `position` is renormalized (a zero vector falls back to +Z) and
    /// `velocity` is projected into the tangent plane.
    pub fn new(position: Vec3, velocity: Vec3, radius: f32, density: f32, color: [u8; 3]) -> Self {
        let position = position.try_normalize().unwrap_or(Vec3::Z);
        let velocity = tangent_component(velocity, position);
        Self {
            position,
            velocity,
            radius,
            density,
            base_color: color,
            display_color: color,
            colliding: false,
        }
    }

    /// Gravitational mass: `density · radius³`.
    ///
    /// Note the asymmetry with [`Marker::collision_mass`]; the two conventions
    /// are intentionally different models and must not be unified.
    pub fn gravity_mass(&self) -> f32 {
        self.density * self.radius.powi(3)
    }

    /// Effective mass for elastic collision exchange: `radius²`.
    ///
    /// Contact is an angular-overlap event, so the exchange uses the disc
    /// footprint area rather than the volumetric gravity mass.
    pub fn collision_mass(&self) -> f32 {
        self.radius * self.radius
    }

    /// Current speed in sphere-radii per second.
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Re-pin the marker to the surface: renormalize `position` and project
    /// `velocity` back into the tangent plane.  Called after every position
    /// update to absorb floating-point drift.
    pub fn clamp_to_surface(&mut self) {
        self.position = self.position.try_normalize().unwrap_or(Vec3::Z);
        self.velocity = tangent_component(self.velocity, self.position);
    }
}

/// Read-only row handed to display layers and the scenario encoder.
///
/// `color` is the marker's base colour (the persisted one), not the per-frame
/// display override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerSnapshot {
    pub index: usize,
    pub radius: f32,
    pub density: f32,
    pub color: [u8; 3],
    pub position: Vec3,
    pub velocity: Vec3,
}

impl Marker {
    /// Snapshot row for this marker at collection index `index`.
    pub fn snapshot(&self, index: usize) -> MarkerSnapshot {
        MarkerSnapshot {
            index,
            radius: self.radius,
            density: self.density,
            color: self.base_color,
            position: self.position,
            velocity: self.velocity,
        }
    }
}

/// Default marker used as the starting point for scenario entries before
/// their fields are applied.
impl Default for Marker {
    fn default() -> Self {
        Marker::new(
            Vec3::Z,
            Vec3::ZERO,
            DEFAULT_MARKER_RADIUS,
            DEFAULT_MARKER_DENSITY,
            [255, 255, 255],
        )
    }
}
