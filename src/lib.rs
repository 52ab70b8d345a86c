//! Geodesic gravity simulation library
//!
//! Markers living on the surface of a unit sphere attract each other along
//! great-circle arcs, collide elastically in their shared tangent planes, and
//! never leave the surface. The kernel modules (`marker`, `forces`,
//! `integrator`, `collision`, `simulation`) are plain data and math; the rest
//! wire that kernel into a Bevy app with rendering, input, scenario
//! persistence, and headless verification.

pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod forces;
pub mod graphics;
pub mod integrator;
pub mod marker;
pub mod marker_rendering;
pub mod rendering;
pub mod scenario;
pub mod simulation;
pub mod testing;
