//! Main SCARA controller executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Poll the command link for a line
//!         - Parse the line into a pose command
//!         - ArmCtrl processing (kinematic to servo mapping)
//!         - MotionExec processing (interpolated, blocking motion)
//!         - Report the outcome back over the link
//!
//! One command is processed at a time: a line arriving while a motion is in
//! progress is not read until that motion completes.
//!
//! # Modules
//!
//! All modules (e.g. `arm_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use scara_lib::{data_store::DataStore, motion_exec, params::ScaraExecParams, report};
use serial_if::{
    link::{CommandLink, LinkError, SerialLink, StdioLink},
    pose::PoseCmd,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, warn};

// Internal
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("scara_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("SCARA Controller Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: ScaraExecParams =
        util::params::load("scara_exec.toml").wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.arm_ctrl
        .init("arm_ctrl.toml", &session)
        .wrap_err("Failed to initialise ArmCtrl")?;
    info!("ArmCtrl init complete");

    // The actuators are assumed to hold the calibrated neutral pose at
    // startup, there is no feedback to confirm it
    let neutral_pose = ds.arm_ctrl.neutral_pose();

    ds.motion_exec
        .init(("motion_exec.toml", neutral_pose), &session)
        .wrap_err("Failed to initialise MotionExec")?;
    info!("MotionExec init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE COMMAND LINK ----

    let mut link: Box<dyn CommandLink> = match exec_params.link.as_str() {
        "serial" => {
            let l = SerialLink::open(&exec_params.serial_device, exec_params.serial_baud)
                .wrap_err("Failed to open the serial link")?;
            info!(
                "SerialLink open on {} at {} baud",
                exec_params.serial_device, exec_params.serial_baud
            );
            Box::new(l)
        }
        "stdio" => {
            info!("StdioLink in use");
            Box::new(StdioLink::new())
        }
        other => return Err(eyre!("Unknown link type {:?} in exec params", other)),
    };

    report::ready(link.as_mut(), neutral_pose).wrap_err("Failed to send the readiness line")?;

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // ---- COMMAND ACQUISITION ----

        let raw = match link.recv_line() {
            Ok(Some(line)) => line,
            // Nothing pending yet, poll again
            Ok(None) => continue,
            // The peer closing the link is a normal shutdown, anything else
            // leaves the controller with no command source
            Err(LinkError::Closed) => {
                info!("Command link closed by the peer, stopping");
                break;
            }
            Err(e) => return Err(e).wrap_err("Command link failure"),
        };

        // ---- COMMAND PARSING ----

        let cmd = match PoseCmd::from_line(&raw) {
            // Blank lines are a silent no-op, not even echoed
            Ok(None) => continue,
            Ok(Some(cmd)) => {
                report::echo(link.as_mut(), &raw).wrap_err("Command link failure")?;
                cmd
            }
            Err(e) => {
                report::echo(link.as_mut(), &raw).wrap_err("Command link failure")?;
                ds.num_parse_rejects += 1;
                report::parse_reject(link.as_mut(), &e).wrap_err("Command link failure")?;
                continue;
            }
        };

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start();

        // ---- CONTROL ALGORITHM PROCESSING ----

        // ArmCtrl processing
        ds.arm_ctrl_input.cmd = Some(cmd);

        match ds.arm_ctrl.proc(&ds.arm_ctrl_input) {
            Ok((o, r)) => {
                ds.arm_ctrl_output = Some(o);
                ds.arm_ctrl_status_rpt = r;
            }
            Err(e) => {
                warn!("Error during ArmCtrl processing: {}", e);
                continue;
            }
        };

        report::clamp_warnings(link.as_mut(), &ds.arm_ctrl_status_rpt)
            .wrap_err("Command link failure")?;

        // MotionExec processing, blocks until the motion completes
        ds.motion_exec_input = motion_exec::InputData {
            dems: ds.arm_ctrl_output,
            speed_factor: cmd.speed_factor,
        };

        match ds.motion_exec.proc(&ds.motion_exec_input) {
            Ok((o, r)) => {
                ds.motion_exec_output = o;
                ds.motion_exec_status_rpt = r;
            }
            Err(e) => {
                warn!("Error during MotionExec processing: {}", e);
                continue;
            }
        };

        ds.num_cmds_executed += 1;

        // ---- REPORTING ----

        if let Some(ref dems) = ds.arm_ctrl_output {
            report::cmd_summary(link.as_mut(), &cmd, dems, &ds.motion_exec_status_rpt)
                .wrap_err("Command link failure")?;
        }
    }

    // ---- SHUTDOWN ----

    ds.log_counters();
    info!("End of execution");

    Ok(())
}
