//! Arm control module
//!
//! Maps parsed pose commands into calibrated servo demands. The mapping is
//! pure: the only outputs are the demanded servo angles and the gripper
//! decision, with clamping surfaced through the status report.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ArmCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ArmCtrlError {
    #[error("Could not load the calibration parameters: {0}")]
    Load(#[from] util::params::LoadError),

    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),

    #[error("Expected there to be a pose command but couldn't find one")]
    NoPoseCmd,
}
