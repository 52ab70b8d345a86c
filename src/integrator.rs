//! Great-circle integrator: advances one marker along the sphere surface.
//!
//! Instead of stepping in the tangent plane and projecting back (which bleeds
//! speed every frame), the step rotates position and velocity together about
//! the axis `p × v̂` by the arc the marker covers this frame.  The marker stays
//! on the sphere and the velocity stays tangent by construction; the final
//! clamp only mops up floating-point drift.

use bevy::math::Quat;

use crate::constants::*;
use crate::marker::{tangent_component, Marker};

/// Advance `marker` by `dt` seconds along its current great circle.
///
/// `dt ≤ 0` is a no-op.  A marker at or below [`SPEED_EPSILON`] keeps its
/// position; its velocity is still re-projected so stale radial components
/// from external mutation cannot accumulate.
pub fn advance(marker: &mut Marker, dt: f32) {
    if dt <= 0.0 {
        return;
    }

    marker.velocity = tangent_component(marker.velocity, marker.position);
    let speed = marker.velocity.length();
    if speed <= SPEED_EPSILON {
        return;
    }

    let axis = marker.position.cross(marker.velocity / speed);
    let Some(axis) = axis.try_normalize() else {
        // Position and velocity collinear; tangency was violated upstream.
        return;
    };

    let rotation = Quat::from_axis_angle(axis, speed * dt);
    marker.position = rotation * marker.position;
    marker.velocity = rotation * marker.velocity;
    marker.clamp_to_surface();
}
