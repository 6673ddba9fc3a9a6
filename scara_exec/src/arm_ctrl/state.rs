//! Implementations for the ArmCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::{Deserialize, Serialize};

// Internal
use super::{ArmCtrlError, Params};
use serial_if::eqpt::{ActuatorState, ServoDems, NUM_JOINT_AXES};
use serial_if::pose::{Gripper, PoseCmd};
use util::{maths, module::State, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arm control module state
#[derive(Default)]
pub struct ArmCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    pub(crate) current_cmd: Option<PoseCmd>,

    pub(crate) output: Option<ServoDems>,
}

/// Input data to Arm Control.
#[derive(Default)]
pub struct InputData {
    /// The pose command to be executed, or `None` if there is no new command
    /// on this cycle.
    pub cmd: Option<PoseCmd>,
}

/// Status report for ArmCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Deserialize, Debug)]
pub struct StatusReport {
    /// Raised when the corresponding joint target had to be clamped to its
    /// physical range. Clamping is a policy, not an error, but operators
    /// should see it to detect calibration drift.
    pub pos_limited: [bool; NUM_JOINT_AXES],

    /// Raised when the commanded elbow extra offset exceeded the calibrated
    /// maximum.
    pub q2_extra_limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ArmCtrl {
    type InitData = &'static str;
    type InitError = ArmCtrlError;

    type InputData = InputData;
    type OutputData = ServoDems;
    type StatusReport = StatusReport;
    type ProcError = ArmCtrlError;

    /// Initialise the ArmCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(
        &mut self,
        init_data: Self::InitData,
        _session: &Session,
    ) -> Result<(), Self::InitError> {
        // Load the parameters
        self.params = util::params::load(init_data)?;

        // A degenerate calibration must stop the system before it accepts
        // any command
        self.params
            .validate()
            .map_err(ArmCtrlError::InvalidCalibration)?;

        Ok(())
    }

    /// Map one pose command into servo demands.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        let cmd = input_data.cmd.ok_or(ArmCtrlError::NoPoseCmd)?;

        // Update the internal copy of the command
        self.current_cmd = Some(cmd);

        debug!("New ArmCtrl PoseCmd: {:?}", cmd);

        let dems = self.calc_servo_dems(&cmd);
        self.output = Some(dems);

        Ok((dems, self.report))
    }
}

impl ArmCtrl {
    /// Build an ArmCtrl from an explicit calibration, bypassing the parameter
    /// file.
    pub fn with_params(params: Params) -> Result<Self, ArmCtrlError> {
        params.validate().map_err(ArmCtrlError::InvalidCalibration)?;

        Ok(Self {
            params,
            ..Default::default()
        })
    }

    /// The calibrated neutral pose the actuators are assumed to hold at
    /// startup.
    pub fn neutral_pose(&self) -> ActuatorState {
        ActuatorState {
            pos_deg: [
                self.params.q1_center_deg,
                self.params.q2_center_deg,
                self.params.q3_servo_range_deg[0],
            ],
        }
    }

    /// Compute the servo demands for a pose command.
    ///
    /// Rounding truncates toward zero, matching the legacy integer casts;
    /// at one degree of granularity the difference to round-half-up is
    /// immaterial.
    fn calc_servo_dems(&mut self, cmd: &PoseCmd) -> ServoDems {
        let p = &self.params;

        let q1_deg = cmd.q1_rad.to_degrees();

        // The commanded elbow value is an extra offset on top of q1, bounded
        // by the calibrated maximum
        let q2_extra_raw_deg = cmd.q2_rad.to_degrees();
        let q2_extra_deg = maths::clamp(
            q2_extra_raw_deg,
            -p.q2_extra_max_deg,
            p.q2_extra_max_deg,
        );
        if q2_extra_deg != q2_extra_raw_deg {
            self.report.q2_extra_limited = true;
        }

        let servo_q1 = clamp_axis(
            &mut self.report,
            0,
            (p.q1_center_deg as f64 + p.q1_sign as f64 * q1_deg) as i16,
            p.q1_range_deg,
        );

        // The elbow servo's physical angle depends on both joints because of
        // the mechanical coupling
        let theta2_virtual_deg = q1_deg + q2_extra_deg;
        let servo_q2 = clamp_axis(
            &mut self.report,
            1,
            (p.q2_center_deg as f64 + p.q2_sign as f64 * theta2_virtual_deg) as i16,
            p.q2_range_deg,
        );

        // Normalise the prismatic target into [0, 1] and map it linearly
        // onto the servo range. Both clamps guard out-of-range input and a
        // ratio pushed out of bounds by the division.
        let q3_m = maths::clamp(cmd.q3_m, p.q3_model_range_m[0], p.q3_model_range_m[1]);
        let ratio = maths::clamp(
            (q3_m - p.q3_model_range_m[0]) / (p.q3_model_range_m[1] - p.q3_model_range_m[0]),
            0.0,
            1.0,
        );
        if cmd.q3_m != q3_m {
            self.report.pos_limited[2] = true;
        }
        let servo_q3 = clamp_axis(
            &mut self.report,
            2,
            maths::lin_map(
                (0.0, 1.0),
                (
                    p.q3_servo_range_deg[0] as f64,
                    p.q3_servo_range_deg[1] as f64,
                ),
                ratio,
            ) as i16,
            p.q3_servo_range_deg,
        );

        let gripper_deg = match cmd.gripper {
            Gripper::Open => p.gripper_open_deg,
            Gripper::Closed => p.gripper_close_deg,
        };

        ServoDems {
            pos_deg: [servo_q1, servo_q2, servo_q3],
            gripper_deg,
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp a raw servo angle to the axis range, flagging the report if limited.
fn clamp_axis(report: &mut StatusReport, axis: usize, raw_deg: i16, range_deg: [i16; 2]) -> i16 {
    if raw_deg < range_deg[0] {
        report.pos_limited[axis] = true;
        return range_deg[0];
    }
    if raw_deg > range_deg[1] {
        report.pos_limited[axis] = true;
        return range_deg[1];
    }

    raw_deg
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn arm_ctrl() -> ArmCtrl {
        ArmCtrl::with_params(Params::default()).unwrap()
    }

    fn map(arm: &mut ArmCtrl, line: &str) -> (ServoDems, StatusReport) {
        let cmd = PoseCmd::from_line(line).unwrap().unwrap();
        let input = InputData { cmd: Some(cmd) };
        arm.proc(&input).unwrap()
    }

    #[test]
    fn test_neutral_command_maps_to_centers() {
        let mut arm = arm_ctrl();
        let (dems, report) = map(&mut arm, "0.0,0.0,0.0,1,1.0");

        assert_eq!(dems.pos_deg, [82, 87, 0]);
        assert_eq!(dems.gripper_deg, 10);
        assert!(!report.pos_limited.iter().any(|&l| l));
    }

    #[test]
    fn test_q1_over_travel_clamps_to_range_max() {
        // q1 = 90 deg puts the raw servo angle at 82 + 90 = 172, beyond the
        // 150 deg physical limit
        let mut arm = arm_ctrl();
        let (dems, report) = map(&mut arm, "1.5708,0.0,0.03");

        assert_eq!(dems.pos_deg[0], 150);
        assert!(report.pos_limited[0]);
    }

    #[test]
    fn test_elbow_couples_with_base() {
        // q1 = 30 deg, q2 extra = 10 deg: elbow servo sees the combined
        // virtual angle. 0.5236 rad is a hair over 30 deg and 0.1745 rad a
        // hair under 10 deg, so the sum is 39.999 deg and the truncating
        // cast lands the elbow at 126, not 127
        let mut arm = arm_ctrl();
        let (dems, _) = map(&mut arm, "0.5236,0.1745,0.0");

        assert_eq!(dems.pos_deg[0], 82 + 30);
        assert_eq!(dems.pos_deg[1], 126);
    }

    #[test]
    fn test_q2_extra_clamps_to_calibrated_max() {
        // 60 deg of extra elbow offset exceeds the 45 deg maximum, so the
        // servo lands exactly at center + q1 + 45
        let mut arm = arm_ctrl();
        let (dems, report) = map(&mut arm, "0.0,1.0472,0.0");

        assert_eq!(dems.pos_deg[1], 87 + 45);
        assert!(report.q2_extra_limited);
    }

    #[test]
    fn test_q3_out_of_range_maps_to_boundary() {
        let mut arm = arm_ctrl();

        let (low, low_report) = map(&mut arm, "0.0,0.0,-0.01");
        assert_eq!(low.pos_deg[2], 0);
        assert!(low_report.pos_limited[2]);

        let (high, high_report) = map(&mut arm, "0.0,0.0,0.10");
        assert_eq!(high.pos_deg[2], 90);
        assert!(high_report.pos_limited[2]);
    }

    #[test]
    fn test_q3_mid_range_maps_linearly() {
        let mut arm = arm_ctrl();
        let (dems, _) = map(&mut arm, "0.0,0.0,0.03");

        // Half the 60 mm stroke lands at half the 90 deg servo range, give
        // or take the truncating cast
        assert!((44..=45).contains(&dems.pos_deg[2]));
    }

    #[test]
    fn test_gripper_mapping() {
        let mut arm = arm_ctrl();

        let (open, _) = map(&mut arm, "0,0,0,1");
        assert_eq!(open.gripper_deg, 10);

        let (closed, _) = map(&mut arm, "0,0,0,0");
        assert_eq!(closed.gripper_deg, 73);
    }

    #[test]
    fn test_negative_sign_convention() {
        let params = Params {
            q1_sign: -1,
            ..Default::default()
        };
        let mut arm = ArmCtrl::with_params(params).unwrap();

        // q1 = 30 deg with a negative sign moves the servo below center.
        // 0.5236 rad is a hair over 30 deg, so 82 - 30.0001 truncates to 51
        let (dems, _) = map(&mut arm, "0.5236,0.0,0.0");
        assert_eq!(dems.pos_deg[0], 51);
    }

    #[test]
    fn test_neutral_pose_matches_calibration() {
        let arm = arm_ctrl();
        assert_eq!(arm.neutral_pose().pos_deg, [82, 87, 0]);
    }

    #[test]
    fn test_no_command_is_an_error() {
        let mut arm = arm_ctrl();
        let input = InputData { cmd: None };

        match arm.proc(&input) {
            Err(ArmCtrlError::NoPoseCmd) => (),
            other => panic!("Expected NoPoseCmd, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_invalid_calibration_rejected_at_build() {
        let params = Params {
            q3_model_range_m: [0.06, 0.06],
            ..Default::default()
        };

        assert!(ArmCtrl::with_params(params).is_err());
    }
}
