//! Parameters structure for ArmCtrl
//!
//! This is the full calibration profile of the arm: everything needed to turn
//! a kinematic setpoint into a physical servo angle lives here rather than in
//! code, so the core stays calibration-agnostic.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Calibration parameters for Arm control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    // ---- REVOLUTE JOINTS ----
    /// Servo angle at which the base joint reads zero.
    ///
    /// Units: degrees
    pub q1_center_deg: i16,

    /// Servo angle at which the elbow joint reads zero.
    ///
    /// Units: degrees
    pub q2_center_deg: i16,

    /// Sign convention of the base joint, `+1` or `-1`.
    pub q1_sign: i16,

    /// Sign convention of the elbow joint, `+1` or `-1`.
    pub q2_sign: i16,

    /// Physical range of the base servo, `[min, max]`.
    ///
    /// Units: degrees
    pub q1_range_deg: [i16; 2],

    /// Physical range of the elbow servo, `[min, max]`.
    ///
    /// Units: degrees
    pub q2_range_deg: [i16; 2],

    /// Largest extra elbow offset accepted on top of the base angle.
    ///
    /// Units: degrees
    pub q2_extra_max_deg: f64,

    // ---- PRISMATIC JOINT ----
    /// Model range of the prismatic joint, `[min, max]`.
    ///
    /// Units: meters
    pub q3_model_range_m: [f64; 2],

    /// Servo range the prismatic model range maps onto linearly, `[min, max]`.
    ///
    /// Units: degrees
    pub q3_servo_range_deg: [i16; 2],

    // ---- GRIPPER ----
    /// Gripper servo angle for the open position.
    ///
    /// Units: degrees
    pub gripper_open_deg: i16,

    /// Gripper servo angle for the closed position.
    ///
    /// Units: degrees
    pub gripper_close_deg: i16,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check that the calibration is physically usable.
    ///
    /// A violation here is a configuration error and must be fatal at
    /// startup, before any command is accepted.
    pub fn validate(&self) -> Result<(), String> {
        if self.q1_sign != 1 && self.q1_sign != -1 {
            return Err(format!("q1_sign must be +1 or -1, found {}", self.q1_sign));
        }
        if self.q2_sign != 1 && self.q2_sign != -1 {
            return Err(format!("q2_sign must be +1 or -1, found {}", self.q2_sign));
        }

        if self.q1_range_deg[0] > self.q1_range_deg[1] {
            return Err(format!(
                "q1_range_deg min must not exceed max, found {:?}",
                self.q1_range_deg
            ));
        }
        if self.q2_range_deg[0] > self.q2_range_deg[1] {
            return Err(format!(
                "q2_range_deg min must not exceed max, found {:?}",
                self.q2_range_deg
            ));
        }
        if self.q3_servo_range_deg[0] > self.q3_servo_range_deg[1] {
            return Err(format!(
                "q3_servo_range_deg min must not exceed max, found {:?}",
                self.q3_servo_range_deg
            ));
        }

        if self.q2_extra_max_deg < 0.0 {
            return Err(format!(
                "q2_extra_max_deg must not be negative, found {}",
                self.q2_extra_max_deg
            ));
        }

        // Zero width would make the prismatic normalisation divide by zero
        if self.q3_model_range_m[0] >= self.q3_model_range_m[1] {
            return Err(format!(
                "q3_model_range_m must have positive width, found {:?}",
                self.q3_model_range_m
            ));
        }

        Ok(())
    }
}

impl Default for Params {
    /// The calibration of the reference arm.
    fn default() -> Self {
        Self {
            q1_center_deg: 82,
            q2_center_deg: 87,
            q1_sign: 1,
            q2_sign: 1,
            q1_range_deg: [0, 150],
            q2_range_deg: [0, 180],
            q2_extra_max_deg: 45.0,
            q3_model_range_m: [0.0, 0.06],
            q3_servo_range_deg: [0, 90],
            gripper_open_deg: 10,
            gripper_close_deg: 73,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(Params::default().validate().is_ok());
    }

    #[test]
    fn test_zero_width_prismatic_range_rejected() {
        let params = Params {
            q3_model_range_m: [0.03, 0.03],
            ..Default::default()
        };

        assert!(params.validate().is_err());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let params = Params {
            q1_range_deg: [150, 0],
            ..Default::default()
        };

        assert!(params.validate().is_err());
    }

    #[test]
    fn test_invalid_sign_rejected() {
        let params = Params {
            q2_sign: 0,
            ..Default::default()
        };

        assert!(params.validate().is_err());
    }

    #[test]
    fn test_negative_extra_limit_rejected() {
        let params = Params {
            q2_extra_max_deg: -1.0,
            ..Default::default()
        };

        assert!(params.validate().is_err());
    }
}
