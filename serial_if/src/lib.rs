//! # Serial interface crate.
//!
//! Provides the common interfaces between the host driving the arm and the
//! controller: the wire command format, the actuator demand types, and the
//! line-oriented command link abstraction.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Pose command definition and parsing
pub mod pose;

/// Demand and state definitions for the arm actuators
pub mod eqpt;

/// Command link module
pub mod link;
