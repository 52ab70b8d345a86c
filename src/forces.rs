//! Pairwise gravity along great-circle arcs.
//!
//! Every unordered marker pair exchanges a signed scalar force directed along
//! the geodesic connecting them.  The magnitude combines an attractive
//! inverse-square term over the short arc with a counteracting term over the
//! far-side arc, so the pull is strongest at small separations and fades to
//! zero as a pair approaches antipodal placement.
//!
//! The pass is strictly two-phase: all accelerations are accumulated from the
//! frame's starting positions, then applied as one velocity kick.  No marker
//! moves mid-accumulation, so pair ordering cannot skew the result.

use bevy::math::Vec3;
use std::f32::consts::TAU;

use crate::constants::*;
use crate::marker::{tangent_component, Marker};

/// Accumulate per-marker tangential accelerations for the current positions.
///
/// Returns one acceleration per marker, index-aligned with `markers`.  Pairs
/// whose connecting tangent is degenerate (coincident or exactly antipodal
/// markers) contribute nothing.
pub fn accumulate(markers: &[Marker], gravity_const: f32) -> Vec<Vec3> {
    let mut accelerations = vec![Vec3::ZERO; markers.len()];

    for i in 0..markers.len() {
        for j in (i + 1)..markers.len() {
            let p_i = markers[i].position;
            let p_j = markers[j].position;

            let theta = p_i.dot(p_j).clamp(-1.0, 1.0).acos();
            let arc = theta.max(MIN_ARC);
            let other_arc = (TAU - arc).max(MIN_ARC);

            let tangent_i = tangent_component(p_j, p_i);
            let tangent_j = tangent_component(p_i, p_j);
            if tangent_i.length_squared() <= DEGENERATE_EPSILON
                || tangent_j.length_squared() <= DEGENERATE_EPSILON
            {
                continue;
            }

            let m_i = markers[i].gravity_mass();
            let m_j = markers[j].gravity_mass();
            let force = gravity_const * m_i * m_j * (1.0 / (arc * arc) - 1.0 / (other_arc * other_arc));

            accelerations[i] += tangent_i.normalize() * (force / m_i);
            accelerations[j] += tangent_j.normalize() * (force / m_j);
        }
    }

    accelerations
}

/// Run the full force pass: accumulate pair accelerations, then kick every
/// marker's velocity by `a·dt`.  Tangency is restored by the integrator
/// immediately afterwards, so the kick itself does not re-project.
pub fn apply(markers: &mut [Marker], gravity_const: f32, dt: f32) {
    let accelerations = accumulate(markers, gravity_const);
    for (marker, acceleration) in markers.iter_mut().zip(accelerations) {
        marker.velocity += acceleration * dt;
    }
}
