//! # Command link module
//!
//! Abstraction over the line-oriented transport which delivers pose commands
//! and accepts diagnostic lines. The transport itself is an external
//! collaborator: the controller only needs "give me the next complete line"
//! and "send this line back".

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::io::{Read, Write};
use std::time::Duration;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A line oriented command transport.
pub trait CommandLink {
    /// Poll for the next complete received line.
    ///
    /// `Ok(None)` means no complete line has arrived yet. The returned line
    /// has its terminator stripped.
    fn recv_line(&mut self) -> Result<Option<String>, LinkError>;

    /// Send one diagnostic line back to the host. The terminator is appended
    /// by the link.
    fn send_line(&mut self, line: &str) -> Result<(), LinkError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur on the command link.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Could not open the serial device {device}: {source}")]
    OpenError {
        device: String,
        source: serialport::Error,
    },

    #[error("Could not read from the link: {0}")]
    ReadError(std::io::Error),

    #[error("Could not write to the link: {0}")]
    WriteError(std::io::Error),

    #[error("The link was closed by the peer")]
    Closed,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Command link over a physical serial device.
pub struct SerialLink {
    port: Box<dyn serialport::SerialPort>,

    /// Bytes received but not yet terminated by a newline.
    rx_buf: Vec<u8>,
}

/// Command link over stdin/stdout, for bench use without a serial device.
///
/// `recv_line` blocks until a full line is available, which matches the
/// single-command-at-a-time processing model.
#[derive(Default)]
pub struct StdioLink;

/// In-memory loopback link for tests and bench rigs: lines queued with
/// [`MemLink::push_rx`] are returned by `recv_line`, sent lines are collected
/// in `tx`.
#[derive(Default)]
pub struct MemLink {
    rx: std::collections::VecDeque<String>,
    /// Every line sent over the link, in order.
    pub tx: Vec<String>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SerialLink {
    /// Read timeout on the underlying port. A timeout is reported as "no
    /// line yet", not an error.
    const READ_TIMEOUT: Duration = Duration::from_millis(100);

    /// Open the given serial device.
    pub fn open(device: &str, baud: u32) -> Result<Self, LinkError> {
        let port = serialport::new(device, baud)
            .timeout(Self::READ_TIMEOUT)
            .open()
            .map_err(|source| LinkError::OpenError {
                device: device.to_string(),
                source,
            })?;

        Ok(Self {
            port,
            rx_buf: Vec::new(),
        })
    }

    /// Line scan over any byte reader, so the timeout and end-of-stream
    /// mapping can be exercised without a device.
    fn recv_line_buffered<R: Read>(
        reader: &mut R,
        rx_buf: &mut Vec<u8>,
    ) -> Result<Option<String>, LinkError> {
        let mut chunk = [0u8; 64];

        loop {
            // Hand over a buffered line before reading more
            if let Some(idx) = rx_buf.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = rx_buf.drain(..=idx).collect();
                let line = String::from_utf8_lossy(&line).trim_end().to_string();
                return Ok(Some(line));
            }

            match reader.read(&mut chunk) {
                // A zero-length read is end of stream (the device has gone
                // away), which unlike a timeout will never recover
                Ok(0) => return Err(LinkError::Closed),
                Ok(n) => rx_buf.extend_from_slice(&chunk[..n]),
                Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => return Ok(None),
                Err(e) => return Err(LinkError::ReadError(e)),
            }
        }
    }
}

impl CommandLink for SerialLink {
    fn recv_line(&mut self) -> Result<Option<String>, LinkError> {
        Self::recv_line_buffered(&mut self.port, &mut self.rx_buf)
    }

    fn send_line(&mut self, line: &str) -> Result<(), LinkError> {
        self.port
            .write_all(line.as_bytes())
            .map_err(LinkError::WriteError)?;
        self.port.write_all(b"\n").map_err(LinkError::WriteError)?;
        self.port.flush().map_err(LinkError::WriteError)
    }
}

impl StdioLink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandLink for StdioLink {
    fn recv_line(&mut self) -> Result<Option<String>, LinkError> {
        let mut line = String::new();

        match std::io::stdin().read_line(&mut line) {
            // EOF: stdin has no more commands to give
            Ok(0) => Err(LinkError::Closed),
            Ok(_) => Ok(Some(line.trim_end().to_string())),
            Err(e) => Err(LinkError::ReadError(e)),
        }
    }

    fn send_line(&mut self, line: &str) -> Result<(), LinkError> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        writeln!(out, "{}", line).map_err(LinkError::WriteError)?;
        out.flush().map_err(LinkError::WriteError)
    }
}

impl MemLink {
    /// Queue a line to be returned by the next `recv_line` call.
    pub fn push_rx(&mut self, line: &str) {
        self.rx.push_back(line.to_string());
    }
}

impl CommandLink for MemLink {
    fn recv_line(&mut self) -> Result<Option<String>, LinkError> {
        Ok(self.rx.pop_front())
    }

    fn send_line(&mut self, line: &str) -> Result<(), LinkError> {
        self.tx.push(line.to_string());
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mem_link_round_trip() {
        let mut link = MemLink::default();

        link.push_rx("0.1,0.2,0.03");
        assert_eq!(link.recv_line().unwrap(), Some("0.1,0.2,0.03".to_string()));
        assert_eq!(link.recv_line().unwrap(), None);

        link.send_line("READY").unwrap();
        assert_eq!(link.tx, vec!["READY".to_string()]);
    }

    #[test]
    fn test_serial_scan_delivers_lines_then_reports_closed() {
        let mut reader = std::io::Cursor::new(b"0.1,0.2,0.03\r\n".to_vec());
        let mut rx_buf = Vec::new();

        assert_eq!(
            SerialLink::recv_line_buffered(&mut reader, &mut rx_buf).unwrap(),
            Some("0.1,0.2,0.03".to_string())
        );

        // The stream is exhausted: end of stream must surface as Closed, not
        // as an endless "no line yet"
        assert!(matches!(
            SerialLink::recv_line_buffered(&mut reader, &mut rx_buf),
            Err(LinkError::Closed)
        ));
    }

    #[test]
    fn test_serial_scan_buffers_partial_lines() {
        let mut reader = std::io::Cursor::new(b"0.1,0.2".to_vec());
        let mut rx_buf = Vec::new();

        // No terminator arrives before end of stream; the partial line stays
        // buffered and the close is reported
        assert!(matches!(
            SerialLink::recv_line_buffered(&mut reader, &mut rx_buf),
            Err(LinkError::Closed)
        ));
        assert_eq!(rx_buf, b"0.1,0.2".to_vec());
    }
}
