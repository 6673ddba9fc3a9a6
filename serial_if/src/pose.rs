//! # Pose commands
//!
//! A pose command is one line of comma separated text sent by the host:
//!
//! ```text
//! q1,q2,q3            legacy 3 field format
//! q1,q2,q3,g          legacy 4 field format
//! q1,q2,q3,g,vel      full format
//! ```
//!
//! `q1` and `q2` are floats in radians, `q3` is a float in meters, `g` is an
//! integer flag (`1` = open, anything else = closed) and `vel` is a float
//! speed factor. Missing or empty optional fields take their defaults; the
//! two cases are deliberately not distinguished, matching the legacy hosts.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single target pose for the arm, parsed from one line of the wire format.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct PoseCmd {
    /// Base revolute joint target.
    ///
    /// Units: radians
    pub q1_rad: f64,

    /// Extra elbow offset target, on top of `q1`.
    ///
    /// Units: radians
    pub q2_rad: f64,

    /// Prismatic joint target.
    ///
    /// Units: meters
    pub q3_m: f64,

    /// Gripper demand.
    pub gripper: Gripper,

    /// Speed factor for the motion; higher is faster.
    pub speed_factor: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Gripper demand carried by a pose command.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
pub enum Gripper {
    Open,
    Closed,
}

/// Possible parsing errors.
///
/// A command which fails to parse is dropped, never partially applied. In
/// particular an unparsable numeric field is fatal to the command rather than
/// coerced to zero, since zero is a valid and potentially dangerous target.
#[derive(Debug, Error)]
pub enum PoseParseError {
    #[error("Expected at least 3 comma separated fields, found {0}")]
    TooFewFields(usize),

    #[error("Expected at most 5 comma separated fields, found {0}")]
    TooManyFields(usize),

    #[error("Field {field} (\"{text}\") is not a valid number")]
    InvalidFloat { field: &'static str, text: String },

    #[error("Gripper field (\"{0}\") is not a valid integer flag")]
    InvalidGripperFlag(String),
}

/// Result of parsing one field of the wire format.
///
/// Distinguishes "present but empty" from "present and unparsable" so the
/// caller can apply a default for the former and reject the latter.
enum Field<T> {
    Present(T),
    Empty,
    Invalid(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PoseCmd {
    /// Speed factor used when the field is missing or empty.
    pub const DEFAULT_SPEED_FACTOR: f64 = 1.0;

    /// Parse a pose command from one received line.
    ///
    /// Returns `Ok(None)` for a line which is empty after trimming: such
    /// lines are a silent no-op and must produce no reply.
    pub fn from_line(line: &str) -> Result<Option<Self>, PoseParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let fields: Vec<&str> = line.split(',').collect();

        if fields.len() < 3 {
            return Err(PoseParseError::TooFewFields(fields.len()));
        }
        if fields.len() > 5 {
            return Err(PoseParseError::TooManyFields(fields.len()));
        }

        let q1_rad = require_float("q1", fields[0])?;
        let q2_rad = require_float("q2", fields[1])?;
        let q3_m = require_float("q3", fields[2])?;

        let gripper = match fields.get(3) {
            None => Gripper::Open,
            Some(text) => match parse_field::<i64>(text) {
                Field::Present(1) => Gripper::Open,
                Field::Present(_) => Gripper::Closed,
                Field::Empty => Gripper::Open,
                Field::Invalid(text) => return Err(PoseParseError::InvalidGripperFlag(text)),
            },
        };

        let speed_factor = match fields.get(4) {
            None => Self::DEFAULT_SPEED_FACTOR,
            Some(text) => match parse_field::<f64>(text) {
                Field::Present(v) if v.is_finite() => v,
                Field::Present(_) => {
                    return Err(PoseParseError::InvalidFloat {
                        field: "vel",
                        text: text.trim().to_string(),
                    })
                }
                Field::Empty => Self::DEFAULT_SPEED_FACTOR,
                Field::Invalid(text) => {
                    return Err(PoseParseError::InvalidFloat {
                        field: "vel",
                        text,
                    })
                }
            },
        };

        Ok(Some(PoseCmd {
            q1_rad,
            q2_rad,
            q3_m,
            gripper,
            speed_factor,
        }))
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Parse one field, reporting empty and unparsable text separately.
fn parse_field<T: FromStr>(text: &str) -> Field<T> {
    let text = text.trim();

    if text.is_empty() {
        return Field::Empty;
    }

    match text.parse() {
        Ok(v) => Field::Present(v),
        Err(_) => Field::Invalid(text.to_string()),
    }
}

/// Parse a required float field. Empty text is as fatal as unparsable text.
///
/// `NaN` and the infinities parse as floats but make no sense as targets,
/// so they are rejected here rather than left to saturate the mapper's
/// integer casts.
fn require_float(field: &'static str, text: &str) -> Result<f64, PoseParseError> {
    match parse_field::<f64>(text) {
        Field::Present(v) if v.is_finite() => Ok(v),
        _ => Err(PoseParseError::InvalidFloat {
            field,
            text: text.trim().to_string(),
        }),
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_full_format() {
        let cmd = PoseCmd::from_line("0.7854,-0.1745,0.0300,0,0.50")
            .unwrap()
            .unwrap();

        assert!((cmd.q1_rad - 0.7854).abs() < 1e-9);
        assert!((cmd.q2_rad + 0.1745).abs() < 1e-9);
        assert!((cmd.q3_m - 0.03).abs() < 1e-9);
        assert_eq!(cmd.gripper, Gripper::Closed);
        assert!((cmd.speed_factor - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_three_field_defaults() {
        let cmd = PoseCmd::from_line("1.5708,0.0,0.03").unwrap().unwrap();

        assert_eq!(cmd.gripper, Gripper::Open);
        assert_eq!(cmd.speed_factor, PoseCmd::DEFAULT_SPEED_FACTOR);
    }

    #[test]
    fn test_four_field_defaults_speed() {
        let cmd = PoseCmd::from_line("0.0,0.0,0.0,0").unwrap().unwrap();

        assert_eq!(cmd.gripper, Gripper::Closed);
        assert_eq!(cmd.speed_factor, PoseCmd::DEFAULT_SPEED_FACTOR);
    }

    #[test]
    fn test_empty_optional_fields_take_defaults() {
        let cmd = PoseCmd::from_line("0.1,0.2,0.03,,").unwrap().unwrap();

        assert_eq!(cmd.gripper, Gripper::Open);
        assert_eq!(cmd.speed_factor, PoseCmd::DEFAULT_SPEED_FACTOR);
    }

    #[test]
    fn test_gripper_flag_values() {
        let open = PoseCmd::from_line("0,0,0,1").unwrap().unwrap();
        let closed = PoseCmd::from_line("0,0,0,2").unwrap().unwrap();

        assert_eq!(open.gripper, Gripper::Open);
        assert_eq!(closed.gripper, Gripper::Closed);
    }

    #[test]
    fn test_whitespace_trimmed() {
        let cmd = PoseCmd::from_line("  0.1 , 0.2 , 0.03 \n").unwrap().unwrap();

        assert!((cmd.q1_rad - 0.1).abs() < 1e-9);
        assert!((cmd.q3_m - 0.03).abs() < 1e-9);
    }

    #[test]
    fn test_empty_line_is_silent_noop() {
        assert!(PoseCmd::from_line("").unwrap().is_none());
        assert!(PoseCmd::from_line("   \r\n").unwrap().is_none());
    }

    #[test]
    fn test_too_few_fields() {
        match PoseCmd::from_line("0.1,0.2") {
            Err(PoseParseError::TooFewFields(2)) => (),
            other => panic!("Expected TooFewFields, got {:?}", other),
        }
    }

    #[test]
    fn test_too_many_fields() {
        match PoseCmd::from_line("1,2,3,4,5,6") {
            Err(PoseParseError::TooManyFields(6)) => (),
            other => panic!("Expected TooManyFields, got {:?}", other),
        }
    }

    #[test]
    fn test_unparsable_required_field_is_fatal() {
        match PoseCmd::from_line("abc,0,0") {
            Err(PoseParseError::InvalidFloat { field: "q1", .. }) => (),
            other => panic!("Expected InvalidFloat for q1, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_required_field_is_fatal() {
        match PoseCmd::from_line("0.1,,0.03") {
            Err(PoseParseError::InvalidFloat { field: "q2", .. }) => (),
            other => panic!("Expected InvalidFloat for q2, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_required_field_is_fatal() {
        match PoseCmd::from_line("NaN,0,0") {
            Err(PoseParseError::InvalidFloat { field: "q1", .. }) => (),
            other => panic!("Expected InvalidFloat for q1, got {:?}", other),
        }

        match PoseCmd::from_line("0,0,inf") {
            Err(PoseParseError::InvalidFloat { field: "q3", .. }) => (),
            other => panic!("Expected InvalidFloat for q3, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_speed_is_fatal() {
        match PoseCmd::from_line("0,0,0,1,NaN") {
            Err(PoseParseError::InvalidFloat { field: "vel", .. }) => (),
            other => panic!("Expected InvalidFloat for vel, got {:?}", other),
        }
    }

    #[test]
    fn test_unparsable_gripper_flag_is_fatal() {
        match PoseCmd::from_line("0,0,0,open") {
            Err(PoseParseError::InvalidGripperFlag(_)) => (),
            other => panic!("Expected InvalidGripperFlag, got {:?}", other),
        }
    }
}
