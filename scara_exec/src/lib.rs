//! Library part of the SCARA controller executable.
//!
//! Holds the control modules so they can be exercised without the binary's
//! session and link plumbing.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod arm_ctrl;
pub mod data_store;
pub mod motion_exec;
pub mod params;
pub mod report;
pub mod servo_ctrl;
