//! Host platform (linux for example) utility functions

use std::path::PathBuf;
use uname;

/// Retrieve uname information.
pub fn get_uname() -> std::io::Result<uname::Info> {
    uname::uname()
}

/// Get the software root directory from the `SCARA_SW_ROOT` environment
/// variable.
pub fn get_scara_sw_root() -> Result<PathBuf, std::env::VarError> {
    Ok(PathBuf::from(std::env::var("SCARA_SW_ROOT")?))
}
