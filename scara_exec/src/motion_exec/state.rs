//! Implementations for the MotionExec state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Internal
use super::{MotionExecError, Params, StepClock, WallClock};
use crate::servo_ctrl::{LogWriter, ServoWriter};
use serial_if::eqpt::{ActuatorState, ServoChannel, ServoDems, JOINT_CHANNELS};
use serial_if::pose::PoseCmd;
use util::{module::State, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Motion execution module state.
///
/// Generic over the servo backend and the step clock so that trajectory
/// tests can run against recorded writes and instant time.
#[derive(Default)]
pub struct MotionExec<W: ServoWriter = LogWriter, C: StepClock = WallClock> {
    pub(crate) params: Params,

    pub(crate) writer: W,

    pub(crate) clock: C,

    /// Last committed joint positions, the starting point of the next move.
    pub(crate) actuator_state: ActuatorState,

    pub(crate) report: StatusReport,
}

/// Input data to Motion Execution.
pub struct InputData {
    /// The servo demands to drive to, or `None` if there is no new target on
    /// this cycle.
    pub dems: Option<ServoDems>,

    /// The speed factor commanded alongside the pose.
    pub speed_factor: f64,
}

impl Default for InputData {
    fn default() -> Self {
        Self {
            dems: None,
            speed_factor: PoseCmd::DEFAULT_SPEED_FACTOR,
        }
    }
}

/// Status report for MotionExec processing.
#[derive(Clone, Copy, Default, Serialize, Deserialize, Debug)]
pub struct StatusReport {
    /// Raised when the commanded speed factor was replaced by the fallback
    /// or clamped to the maximum.
    pub speed_adjusted: bool,

    /// Number of interpolation steps taken for the move.
    pub num_steps: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<W: ServoWriter, C: StepClock> State for MotionExec<W, C> {
    type InitData = (&'static str, ActuatorState);
    type InitError = MotionExecError;

    type InputData = InputData;
    type OutputData = ActuatorState;
    type StatusReport = StatusReport;
    type ProcError = MotionExecError;

    /// Initialise the MotionExec module.
    ///
    /// Expected init data is the path to the parameter file and the pose the
    /// actuators are assumed to hold at startup.
    fn init(
        &mut self,
        init_data: Self::InitData,
        _session: &Session,
    ) -> Result<(), Self::InitError> {
        let (param_file, initial_state) = init_data;

        // Load the parameters
        self.params = util::params::load(param_file)?;

        self.params
            .validate()
            .map_err(MotionExecError::InvalidParams)?;

        self.actuator_state = initial_state;

        Ok(())
    }

    /// Drive the servos from the last committed pose to the demanded one.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        let dems = input_data.dems.ok_or(MotionExecError::NoServoDems)?;

        let speed_factor = self.effective_speed_factor(input_data.speed_factor);

        // The gripper is not part of the interpolated pose and moves at its
        // own (hardware) speed, so command it before the joints start moving
        self.writer
            .write_angle_deg(ServoChannel::Gripper, dems.gripper_deg)?;

        let start = self.actuator_state.pos_deg;
        let target = dems.pos_deg;

        // One step per degree of the largest joint delta, so the slowest
        // axis still moves at most one degree per step
        let steps = JOINT_CHANNELS
            .iter()
            .enumerate()
            .map(|(axis, _)| (target[axis] as i32 - start[axis] as i32).abs())
            .max()
            .unwrap_or(0);

        debug!(
            "MotionExec: {:?} -> {:?} in {} steps at speed {}",
            start, target, steps, speed_factor
        );

        if steps > 0 {
            let delay =
                Duration::from_secs_f64(self.params.step_delay_base_ms / speed_factor / 1000.0);

            for i in 1..=steps {
                for (axis, channel) in JOINT_CHANNELS.iter().enumerate() {
                    let delta = target[axis] as i32 - start[axis] as i32;

                    // Integer interpolation: i == steps lands exactly on the
                    // target, and each axis moves monotonically
                    let pos_deg = (start[axis] as i32 + delta * i / steps) as i16;

                    self.writer.write_angle_deg(*channel, pos_deg)?;
                }

                self.clock.sleep(delay);
            }
        }

        // Commit the demanded pose as the new reference for the next move
        self.actuator_state.pos_deg = target;
        self.report.num_steps = steps as u32;

        Ok((self.actuator_state, self.report))
    }
}

impl<W: ServoWriter, C: StepClock> MotionExec<W, C> {
    /// Build a MotionExec from explicit parts, bypassing the parameter file.
    pub fn with_parts(
        params: Params,
        writer: W,
        clock: C,
        initial_state: ActuatorState,
    ) -> Result<Self, MotionExecError> {
        params.validate().map_err(MotionExecError::InvalidParams)?;

        Ok(Self {
            params,
            writer,
            clock,
            actuator_state: initial_state,
            report: StatusReport::default(),
        })
    }

    /// The last committed joint positions.
    pub fn actuator_state(&self) -> ActuatorState {
        self.actuator_state
    }

    /// Bring the commanded speed factor into the usable envelope.
    ///
    /// Anything below the fallback (zero, negative, NaN, or a vanishingly
    /// small positive) would stall the move or blow up the delay division,
    /// so it is replaced by the slow fallback rather than rejected: a
    /// malformed speed never loses the pose itself. The comparison is
    /// written so that NaN also takes the fallback branch.
    fn effective_speed_factor(&mut self, commanded: f64) -> f64 {
        if !(commanded >= self.params.speed_factor_fallback) {
            warn!(
                "Speed factor {} is below the usable minimum, using fallback {}",
                commanded, self.params.speed_factor_fallback
            );
            self.report.speed_adjusted = true;
            return self.params.speed_factor_fallback;
        }

        if commanded > self.params.speed_factor_max {
            warn!(
                "Speed factor {} exceeds maximum, clamping to {}",
                commanded, self.params.speed_factor_max
            );
            self.report.speed_adjusted = true;
            return self.params.speed_factor_max;
        }

        commanded
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::motion_exec::InstantClock;
    use crate::servo_ctrl::RecordingWriter;

    fn motion_exec(start: [i16; 3]) -> MotionExec<RecordingWriter, InstantClock> {
        MotionExec::with_parts(
            Params::default(),
            RecordingWriter::default(),
            InstantClock::default(),
            ActuatorState { pos_deg: start },
        )
        .unwrap()
    }

    fn input(pos_deg: [i16; 3], gripper_deg: i16, speed_factor: f64) -> InputData {
        InputData {
            dems: Some(ServoDems {
                pos_deg,
                gripper_deg,
            }),
            speed_factor,
        }
    }

    #[test]
    fn test_trajectory_is_monotone_and_reaches_target() {
        let mut exec = motion_exec([82, 87, 0]);
        let (state, report) = exec
            .proc(&input([112, 127, 45], 10, PoseCmd::DEFAULT_SPEED_FACTOR))
            .unwrap();

        // Largest delta is 45 degrees on q3
        assert_eq!(report.num_steps, 45);
        assert_eq!(state.pos_deg, [112, 127, 45]);

        for (channel, start, target) in [
            (ServoChannel::Q1, 82, 112),
            (ServoChannel::Q2, 87, 127),
            (ServoChannel::Q3, 0, 45),
        ] {
            let angles = exec.writer.angles_for(channel);
            assert_eq!(angles.len(), 45);
            assert_eq!(*angles.last().unwrap(), target);
            assert!(angles.windows(2).all(|w| w[0] <= w[1]));
            assert!(angles.iter().all(|&a| (start..=target).contains(&a)));
        }
    }

    #[test]
    fn test_descending_axis_is_monotone_decreasing() {
        let mut exec = motion_exec([150, 87, 45]);
        exec.proc(&input([100, 87, 45], 10, PoseCmd::DEFAULT_SPEED_FACTOR))
            .unwrap();

        let angles = exec.writer.angles_for(ServoChannel::Q1);
        assert_eq!(*angles.last().unwrap(), 100);
        assert!(angles.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_repeated_target_is_a_no_op_for_joints() {
        let mut exec = motion_exec([82, 87, 0]);
        let (_, report) = exec.proc(&input([82, 87, 0], 10, PoseCmd::DEFAULT_SPEED_FACTOR)).unwrap();

        assert_eq!(report.num_steps, 0);
        assert!(exec.clock.sleeps.is_empty());

        // Only the gripper is written
        assert_eq!(exec.writer.writes, vec![(ServoChannel::Gripper, 10)]);
    }

    #[test]
    fn test_gripper_written_before_joints_move() {
        let mut exec = motion_exec([82, 87, 0]);
        exec.proc(&input([85, 87, 0], 73, PoseCmd::DEFAULT_SPEED_FACTOR))
            .unwrap();

        assert_eq!(exec.writer.writes[0], (ServoChannel::Gripper, 73));
    }

    #[test]
    fn test_step_delay_scales_with_speed() {
        let mut exec = motion_exec([82, 87, 0]);
        exec.proc(&input([84, 87, 0], 10, 2.0)).unwrap();

        assert_eq!(exec.clock.sleeps.len(), 2);
        assert_eq!(
            exec.clock.sleeps[0],
            Duration::from_secs_f64(10.0 / 2.0 / 1000.0)
        );
    }

    #[test]
    fn test_non_positive_speed_uses_fallback() {
        let mut exec = motion_exec([82, 87, 0]);
        let (_, report) = exec.proc(&input([83, 87, 0], 10, 0.0)).unwrap();

        assert!(report.speed_adjusted);
        assert_eq!(
            exec.clock.sleeps[0],
            Duration::from_secs_f64(10.0 / 0.1 / 1000.0)
        );
    }

    #[test]
    fn test_vanishingly_small_speed_uses_fallback() {
        // A tiny positive factor would make the step delay longer than a
        // Duration can hold; it must drop to the fallback, not panic
        let mut exec = motion_exec([82, 87, 0]);
        let (_, report) = exec.proc(&input([83, 87, 0], 10, 1e-300)).unwrap();

        assert!(report.speed_adjusted);
        assert_eq!(
            exec.clock.sleeps[0],
            Duration::from_secs_f64(10.0 / 0.1 / 1000.0)
        );
    }

    #[test]
    fn test_nan_speed_uses_fallback() {
        let mut exec = motion_exec([82, 87, 0]);
        let (_, report) = exec.proc(&input([83, 87, 0], 10, f64::NAN)).unwrap();

        assert!(report.speed_adjusted);
        assert_eq!(
            exec.clock.sleeps[0],
            Duration::from_secs_f64(10.0 / 0.1 / 1000.0)
        );
    }

    #[test]
    fn test_excessive_speed_clamped_to_max() {
        let mut exec = motion_exec([82, 87, 0]);
        let (_, report) = exec.proc(&input([83, 87, 0], 10, 10.0)).unwrap();

        assert!(report.speed_adjusted);
        assert_eq!(
            exec.clock.sleeps[0],
            Duration::from_secs_f64(10.0 / 3.0 / 1000.0)
        );
    }

    #[test]
    fn test_no_dems_is_an_error() {
        let mut exec = motion_exec([82, 87, 0]);
        let input = InputData {
            dems: None,
            speed_factor: PoseCmd::DEFAULT_SPEED_FACTOR,
        };

        assert!(matches!(
            exec.proc(&input),
            Err(MotionExecError::NoServoDems)
        ));
    }
}
