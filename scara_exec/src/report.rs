//! # Status Reporter
//!
//! Free-text diagnostics sent back over the command link so a host-side
//! monitor can follow what the controller did with each line. Every line
//! sent is mirrored into the log.
//!
//! The reporter never fails a command: link write errors propagate, but a
//! report itself carries no state.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};

// Internal
use crate::{arm_ctrl, motion_exec};
use serial_if::eqpt::{ActuatorState, ServoDems};
use serial_if::link::{CommandLink, LinkError};
use serial_if::pose::{PoseCmd, PoseParseError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Human-readable axis names, indexed like the demand arrays.
const AXIS_NAMES: [&str; 3] = ["q1", "q2", "q3"];

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Announce that the controller is up and at its assumed pose.
pub fn ready(link: &mut dyn CommandLink, pose: ActuatorState) -> Result<(), LinkError> {
    let line = format!(
        "READY pose ({}, {}, {})",
        pose.pos_deg[0], pose.pos_deg[1], pose.pos_deg[2]
    );

    info!("{}", line);
    link.send_line(&line)
}

/// Echo a received raw line back to the host.
pub fn echo(link: &mut dyn CommandLink, raw: &str) -> Result<(), LinkError> {
    info!("RX: {}", raw);
    link.send_line(&format!("RX: {}", raw))
}

/// Tell the host that a line was rejected by the parser.
pub fn parse_reject(link: &mut dyn CommandLink, error: &PoseParseError) -> Result<(), LinkError> {
    warn!("Command rejected: {}", error);
    link.send_line(&format!("ERR: {}", error))
}

/// Warn the host about every axis the mapper had to limit.
pub fn clamp_warnings(
    link: &mut dyn CommandLink,
    report: &arm_ctrl::StatusReport,
) -> Result<(), LinkError> {
    for (axis, &limited) in report.pos_limited.iter().enumerate() {
        if limited {
            let line = format!("WRN: {} demand limited to its servo range", AXIS_NAMES[axis]);
            warn!("{}", line);
            link.send_line(&line)?;
        }
    }

    if report.q2_extra_limited {
        let line = "WRN: q2 offset limited to the calibrated maximum".to_string();
        warn!("{}", line);
        link.send_line(&line)?;
    }

    Ok(())
}

/// Summarise a fully executed command.
pub fn cmd_summary(
    link: &mut dyn CommandLink,
    cmd: &PoseCmd,
    dems: &ServoDems,
    motion: &motion_exec::StatusReport,
) -> Result<(), LinkError> {
    let line = format!(
        "OK: q=({:.4}, {:.4}, {:.4}) -> servo ({}, {}, {}) gripper {} in {} steps",
        cmd.q1_rad,
        cmd.q2_rad,
        cmd.q3_m,
        dems.pos_deg[0],
        dems.pos_deg[1],
        dems.pos_deg[2],
        dems.gripper_deg,
        motion.num_steps
    );

    info!("{}", line);
    link.send_line(&line)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use serial_if::link::MemLink;

    #[test]
    fn test_clamp_warnings_name_each_limited_axis() {
        let mut link = MemLink::default();
        let report = arm_ctrl::StatusReport {
            pos_limited: [true, false, true],
            q2_extra_limited: true,
        };

        clamp_warnings(&mut link, &report).unwrap();

        assert_eq!(link.tx.len(), 3);
        assert!(link.tx[0].contains("q1"));
        assert!(link.tx[1].contains("q3"));
        assert!(link.tx[2].contains("q2 offset"));
    }

    #[test]
    fn test_nominal_report_sends_nothing() {
        let mut link = MemLink::default();

        clamp_warnings(&mut link, &arm_ctrl::StatusReport::default()).unwrap();

        assert!(link.tx.is_empty());
    }
}
