//! # Servo Write Module
//!
//! This module provides a unified servo write interface which can abstract
//! over different ways of driving the physical servos. The controller core
//! only ever needs "write this angle to this channel"; how the angle becomes
//! a PWM pulse is the backend's concern and outside the controller's scope.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use serial_if::eqpt::ServoChannel;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for writing servo angles.
pub trait ServoWriter {
    /// Write a target angle to one servo channel.
    ///
    /// ## Arguments
    /// - `channel` - The servo channel to write
    /// - `angle_deg` - The target angle in degrees, already clamped to the
    ///   channel's physical range by the mapper
    fn write_angle_deg(&mut self, channel: ServoChannel, angle_deg: i16) -> Result<(), ServoError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors from a servo backend.
#[derive(thiserror::Error, Debug)]
pub enum ServoError {
    #[error("The servo backend rejected the write: {0}")]
    WriteRejected(String),
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Backend that trace-logs every write.
///
/// Stands in for the hardware PWM drive during bench runs; the log mirrors
/// exactly what a hardware backend would be asked to do.
#[derive(Default)]
pub struct LogWriter;

/// Backend that records every write, for trajectory tests.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingWriter {
    /// Every write made, in order.
    pub writes: Vec<(ServoChannel, i16)>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ServoWriter for LogWriter {
    fn write_angle_deg(&mut self, channel: ServoChannel, angle_deg: i16) -> Result<(), ServoError> {
        trace!("Servo {:?} <- {} deg", channel, angle_deg);
        Ok(())
    }
}

#[cfg(test)]
impl ServoWriter for RecordingWriter {
    fn write_angle_deg(&mut self, channel: ServoChannel, angle_deg: i16) -> Result<(), ServoError> {
        self.writes.push((channel, angle_deg));
        Ok(())
    }
}

#[cfg(test)]
impl RecordingWriter {
    /// All angles written to the given channel, in order.
    pub fn angles_for(&self, channel: ServoChannel) -> Vec<i16> {
        self.writes
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, a)| *a)
            .collect()
    }
}
