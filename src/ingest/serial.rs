/// Serial transport to the sensor board.
///
/// The board pushes one reading per line at a fixed baud rate. The port is
/// opened once at startup and owned exclusively by this reader for the
/// process lifetime; open failure is the only fatal error in the service.

use std::io::Read;
use std::time::Duration;

use crate::model::MonitorError;

// ---------------------------------------------------------------------------
// Line source seam
// ---------------------------------------------------------------------------

/// A blocking source of raw sensor lines.
///
/// `Ok(None)` means the read timed out with no data — the poll loop treats
/// that as "nothing to do this cycle", not as an error. The service depends
/// on this trait rather than the concrete port so tests can drive the loop
/// with scripted lines.
pub trait LineSource {
    fn read_line(&mut self) -> Result<Option<String>, MonitorError>;
}

// ---------------------------------------------------------------------------
// Serial reader
// ---------------------------------------------------------------------------

/// Reads newline-terminated sensor lines from a serial port.
pub struct SerialLineReader {
    port: Box<dyn serialport::SerialPort>,
    /// Bytes received after the last newline, carried across reads.
    pending: Vec<u8>,
}

impl SerialLineReader {
    /// Opens the port at the configured baud rate and read timeout.
    ///
    /// Failure here is fatal — a service that cannot reach its sensor has
    /// nothing to do, and a wrong device path should be caught at startup
    /// rather than logged every cycle.
    pub fn open(port: &str, baud_rate: u32, read_timeout: Duration) -> Result<Self, MonitorError> {
        let port = serialport::new(port, baud_rate)
            .timeout(read_timeout)
            .open()
            .map_err(|e| MonitorError::TransportInit(format!("{}: {}", port, e)))?;
        Ok(Self { port, pending: Vec::new() })
    }

    /// Pulls the first complete line out of the pending buffer, if any.
    fn take_buffered_line(&mut self) -> Option<String> {
        let newline = self.pending.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.pending.drain(..=newline).collect();
        Some(String::from_utf8_lossy(&line).trim().to_string())
    }
}

impl LineSource for SerialLineReader {
    fn read_line(&mut self) -> Result<Option<String>, MonitorError> {
        if let Some(line) = self.take_buffered_line() {
            return Ok(Some(line));
        }

        let mut chunk = [0u8; 256];
        loop {
            match self.port.read(&mut chunk) {
                Ok(0) => return Ok(None),
                Ok(n) => {
                    self.pending.extend_from_slice(&chunk[..n]);
                    if let Some(line) = self.take_buffered_line() {
                        return Ok(Some(line));
                    }
                }
                // A timed-out read means no data arrived — skip the cycle.
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => return Ok(None),
                Err(e) => return Err(MonitorError::TransportRead(e.to_string())),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
