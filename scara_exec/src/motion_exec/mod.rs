//! Motion execution module
//!
//! Turns a set of servo demands into a smooth trajectory: the joints step
//! from their last known position to the target one degree at a time, with
//! the inter-step delay set by the commanded speed factor. The gripper is
//! not interpolated and moves immediately.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod clock;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use clock::*;
pub use params::*;
pub use state::*;

use crate::servo_ctrl::ServoError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during MotionExec operation.
#[derive(Debug, thiserror::Error)]
pub enum MotionExecError {
    #[error("Could not load the motion parameters: {0}")]
    Load(#[from] util::params::LoadError),

    #[error("Invalid motion parameters: {0}")]
    InvalidParams(String),

    #[error("Expected there to be servo demands but couldn't find any")]
    NoServoDems,

    #[error("Servo write failed: {0}")]
    Servo(#[from] ServoError),
}
