//! Simulation-specific error types.
//!
//! Systems should propagate errors through these types rather than panicking
//! where practical, enabling graceful degradation instead of hard crashes.
//!
//! Most kernel operations deliberately do not error at all: invalid mutation
//! parameters and out-of-range indices are silent no-ops (see
//! [`crate::simulation::SphereSim`]).  The types here cover the cases that do
//! need a caller-visible failure, chiefly scenario decoding and configuration
//! validation.

use std::fmt;

/// Top-level error enum for the sphere simulation.
#[derive(Debug)]
pub enum SimError {
    /// Scenario text could not be parsed as JSON at all.
    ScenarioParse {
        /// Parser error message (position and cause).
        detail: String,
    },

    /// Scenario document parsed but its top-level shape is unusable,
    /// typically a missing or non-list `markers` field.  Individual malformed
    /// marker entries are skipped during decode and never produce this error.
    ScenarioShape {
        /// Human-readable description of the structural problem.
        detail: &'static str,
    },

    /// Physics constant is outside its safe operating range.
    /// Returned by validation helpers; not triggered at runtime by default.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::ScenarioParse { detail } => {
                write!(f, "scenario is not valid JSON: {}", detail)
            }
            SimError::ScenarioShape { detail } => {
                write!(f, "scenario document rejected: {}", detail)
            }
            SimError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
        }
    }
}

impl std::error::Error for SimError {}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error if `gravity_const` is outside its validated safe range.
///
/// Values above 20.0 have been observed to cause runaway acceleration once two
/// markers close within a few angular radii.
pub fn validate_gravity_const(value: f32) -> SimResult<()> {
    if value <= 0.0 || value > 20.0 {
        Err(SimError::UnsafeConstant {
            name: "GRAVITY_CONST",
            value,
            safe_range: "(0.0, 20.0]",
        })
    } else {
        Ok(())
    }
}

/// Returns an error if `time_scale` falls outside the slider range the
/// keyboard controls clamp to.
pub fn validate_time_scale(value: f32) -> SimResult<()> {
    if !(crate::constants::TIME_SCALE_MIN..=crate::constants::TIME_SCALE_MAX).contains(&value) {
        Err(SimError::UnsafeConstant {
            name: "TIME_SCALE",
            value,
            safe_range: "[0.1, 5.0]",
        })
    } else {
        Ok(())
    }
}
