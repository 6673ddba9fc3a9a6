//! # Data Store

use log::info;
use serial_if::eqpt::{ActuatorState, ServoDems};

use crate::{arm_ctrl, motion_exec};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // ArmCtrl
    pub arm_ctrl: arm_ctrl::ArmCtrl,
    pub arm_ctrl_input: arm_ctrl::InputData,
    pub arm_ctrl_output: Option<ServoDems>,
    pub arm_ctrl_status_rpt: arm_ctrl::StatusReport,

    // MotionExec
    pub motion_exec: motion_exec::MotionExec,
    pub motion_exec_input: motion_exec::InputData,
    pub motion_exec_output: ActuatorState,
    pub motion_exec_status_rpt: motion_exec::StatusReport,

    // Monitoring Counters
    /// Number of commands fully executed
    pub num_cmds_executed: u64,

    /// Number of received lines rejected by the parser
    pub num_parse_rejects: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a command cycle.
    ///
    /// Clears the per-command inputs, outputs and status reports so that
    /// stale data from the previous command can never leak into this one.
    pub fn cycle_start(&mut self) {
        self.arm_ctrl_input = arm_ctrl::InputData::default();
        self.arm_ctrl_output = None;
        self.arm_ctrl_status_rpt = arm_ctrl::StatusReport::default();

        self.motion_exec_input = motion_exec::InputData::default();
        self.motion_exec_status_rpt = motion_exec::StatusReport::default();
    }

    /// Log the monitoring counters at the end of execution.
    pub fn log_counters(&self) {
        info!(
            "Executed {} commands, rejected {} lines",
            self.num_cmds_executed, self.num_parse_rejects
        );
    }
}
