//! # SCARA Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct ScaraExecParams {
    /// Which command link to use: "stdio" or "serial".
    pub link: String,

    /// Serial device to open when `link` is "serial".
    pub serial_device: String,

    /// Baud rate for the serial device.
    pub serial_baud: u32,
}
