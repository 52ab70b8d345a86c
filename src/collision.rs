//! Angular overlap detection and tangent-plane elastic collision response.
//!
//! Two markers collide when their great-circle separation falls below the sum
//! of their angular radii.  The response happens in the tangent plane at the
//! pair midpoint: both velocities are projected into that plane, decomposed
//! along the collision normal, and exchanged with the standard 1-D elastic
//! formulas using `radius²` as the effective mass.
//!
//! Pairs are visited in index order and velocities mutate as the scan goes;
//! the closing-speed gate keeps an already-resolved (now separating) pair from
//! being kicked twice, which also makes a full re-run of the pass a no-op.

use crate::constants::*;
use crate::marker::{tangent_component, Marker};

/// Whether the great-circle separation of `a` and `b` is within the sum of
/// their angular radii.
pub fn overlapping(a: &Marker, b: &Marker) -> bool {
    let theta = a.position.dot(b.position).clamp(-1.0, 1.0).acos();
    theta <= a.radius + b.radius
}

/// Recompute every marker's `colliding` flag from current positions without
/// touching any velocity.  Used for degenerate zero-`dt` passes where display
/// state must refresh but nothing may move.
pub fn flag_overlaps(markers: &mut [Marker]) {
    for marker in markers.iter_mut() {
        marker.colliding = false;
    }
    for i in 0..markers.len() {
        for j in (i + 1)..markers.len() {
            if overlapping(&markers[i], &markers[j]) {
                markers[i].colliding = true;
                markers[j].colliding = true;
            }
        }
    }
}

/// Detect overlaps, flag the markers involved, and resolve each closing pair
/// with an elastic velocity exchange.
pub fn resolve(markers: &mut [Marker]) {
    for marker in markers.iter_mut() {
        marker.colliding = false;
    }
    for i in 0..markers.len() {
        for j in (i + 1)..markers.len() {
            if !overlapping(&markers[i], &markers[j]) {
                continue;
            }
            markers[i].colliding = true;
            markers[j].colliding = true;

            let (head, tail) = markers.split_at_mut(j);
            resolve_pair(&mut head[i], &mut tail[0]);
        }
    }
}

/// Elastic exchange for one overlapping pair.  Leaves both velocities
/// untouched when the pair is separating, tangent, or geometrically
/// degenerate (near-antipodal).
fn resolve_pair(a: &mut Marker, b: &mut Marker) {
    // Shared tangent frame at the pair midpoint.  For a near-antipodal pair
    // the midpoint sum vanishes; fall back to the first marker's position.
    let mid_sum = a.position + b.position;
    let mid = if mid_sum.length_squared() <= DEGENERATE_EPSILON {
        a.position
    } else {
        mid_sum.normalize()
    };

    let normal = tangent_component(b.position - a.position, mid);
    if normal.length_squared() <= DEGENERATE_EPSILON {
        return;
    }
    let normal = normal.normalize();

    let v_a = tangent_component(a.velocity, mid);
    let v_b = tangent_component(b.velocity, mid);
    let a_n = v_a.dot(normal);
    let b_n = v_b.dot(normal);
    if a_n - b_n <= 0.0 {
        return;
    }

    let m_a = a.collision_mass();
    let m_b = b.collision_mass();
    let total = m_a + m_b;
    let a_n_next = (a_n * (m_a - m_b) + 2.0 * m_b * b_n) / total;
    let b_n_next = (b_n * (m_b - m_a) + 2.0 * m_a * a_n) / total;

    a.velocity = v_a + normal * (a_n_next - a_n);
    b.velocity = v_b + normal * (b_n_next - b_n);
    a.velocity = tangent_component(a.velocity, a.position);
    b.velocity = tangent_component(b.velocity, b.position);
}
