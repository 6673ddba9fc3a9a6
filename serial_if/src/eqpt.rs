//! # Actuator Demands
//!
//! Types shared between the mapper (which computes servo demands) and the
//! motion executor (which actuates them).

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The number of interpolated joint axes on the arm (two revolute plus one
/// prismatic).
pub const NUM_JOINT_AXES: usize = 3;

/// The joint servo channel for each interpolated axis index.
pub const JOINT_CHANNELS: [ServoChannel; NUM_JOINT_AXES] =
    [ServoChannel::Q1, ServoChannel::Q2, ServoChannel::Q3];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands computed by the mapper for the motion executor to actuate.
///
/// All angles are calibrated servo angles, already clamped to the physical
/// range of their axis.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
pub struct ServoDems {
    /// The demanded position of each joint servo.
    ///
    /// Units: degrees
    pub pos_deg: [i16; NUM_JOINT_AXES],

    /// The demanded gripper servo position, applied instantly rather than
    /// interpolated.
    ///
    /// Units: degrees
    pub gripper_deg: i16,
}

/// The pose the joint servos currently hold.
///
/// Owned exclusively by the motion executor and committed only once a motion
/// has fully completed, so it always reflects the last reached pose rather
/// than an in-flight one.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ActuatorState {
    /// The position of each joint servo.
    ///
    /// Units: degrees
    pub pos_deg: [i16; NUM_JOINT_AXES],
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Servo channels available to the controller.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum ServoChannel {
    /// Base revolute joint servo
    Q1,
    /// Elbow revolute joint servo
    Q2,
    /// Prismatic joint servo
    Q3,
    /// Gripper servo
    Gripper,
}
