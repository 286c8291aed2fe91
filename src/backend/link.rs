//! Device link abstraction over the serial port
//!
//! [`DataLink`] is the seam between the acquisition loop and the hardware:
//! the worker only ever sees "open a port", "give me the next line or tell
//! me nothing arrived", and "close". [`SerialLink`] implements it over the
//! `serialport` crate; the `mock-link` feature and the test fakes implement
//! it without hardware.
//!
//! # Cancellation
//!
//! `read_line` never blocks longer than the configured read timeout. A
//! timeout is not an error: it returns [`LineRead::TimedOut`] so the
//! acquisition loop can check its command queue and cancellation flag
//! between reads.

use crate::config::{ParityMode, SerialConfig};
use crate::error::{Result, ScopeError};
use std::io::Read;
use std::time::Duration;

/// Settings handed to [`DataLink::open`]
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSettings {
    /// Baud rate
    pub baud: u32,
    /// Parity for the (final) open
    pub parity: ParityMode,
    /// Open with odd parity first, then switch to none
    pub two_phase_open: bool,
    /// Read timeout (bounds cancellation latency)
    pub read_timeout: Duration,
}

impl From<&SerialConfig> for LinkSettings {
    fn from(config: &SerialConfig) -> Self {
        Self {
            baud: config.baud,
            parity: config.parity,
            two_phase_open: config.two_phase_open,
            read_timeout: Duration::from_millis(config.read_timeout_ms),
        }
    }
}

/// Outcome of one bounded read attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRead {
    /// One complete line, without its terminator
    Line(String),
    /// No complete line arrived within the read timeout
    TimedOut,
}

/// A line-oriented device connection
///
/// Implementations must release the underlying handle in `close` on every
/// exit path, and `close` must be a no-op when nothing is open.
pub trait DataLink: Send {
    /// Open the connection. Fails fast with [`ScopeError::Connection`]
    /// (device not found, permission denied, port busy) rather than
    /// hanging.
    fn open(&mut self, port: &str, settings: &LinkSettings) -> Result<()>;

    /// Read the next line, waiting at most the configured timeout.
    ///
    /// Connection-level failures (device unplugged, I/O error) surface as
    /// [`ScopeError::Read`].
    fn read_line(&mut self) -> Result<LineRead>;

    /// Release the connection handle. Idempotent.
    fn close(&mut self);

    /// Whether a connection is currently open
    fn is_open(&self) -> bool;
}

fn parity_to_serial(parity: ParityMode) -> serialport::Parity {
    match parity {
        ParityMode::None => serialport::Parity::None,
        ParityMode::Odd => serialport::Parity::Odd,
        ParityMode::Even => serialport::Parity::Even,
    }
}

/// Real serial implementation of [`DataLink`]
#[derive(Default)]
pub struct SerialLink {
    port: Option<Box<dyn serialport::SerialPort>>,
    pending: Vec<u8>,
}

impl SerialLink {
    /// Create a link with no port open
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract the next complete line from the pending byte buffer
    fn take_pending_line(&mut self) -> Option<String> {
        let newline = self.pending.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=newline).collect();
        line.pop(); // the newline itself
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

impl DataLink for SerialLink {
    fn open(&mut self, port: &str, settings: &LinkSettings) -> Result<()> {
        self.close();

        // The two-phase sequence opens with odd parity and then switches to
        // none; some USB-serial chipsets need it to come up cleanly.
        let initial_parity = if settings.two_phase_open {
            ParityMode::Odd
        } else {
            settings.parity
        };

        let mut handle = serialport::new(port, settings.baud)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(parity_to_serial(initial_parity))
            .timeout(settings.read_timeout)
            .open()?;

        if settings.two_phase_open {
            handle.set_parity(parity_to_serial(settings.parity))?;
        }

        tracing::info!(
            "Opened serial port {} at {} baud (parity: {})",
            port,
            settings.baud,
            settings.parity
        );
        self.pending.clear();
        self.port = Some(handle);
        Ok(())
    }

    fn read_line(&mut self) -> Result<LineRead> {
        loop {
            if let Some(line) = self.take_pending_line() {
                return Ok(LineRead::Line(line));
            }

            let Some(port) = self.port.as_mut() else {
                return Err(ScopeError::Read("port not open".to_string()));
            };
            let mut chunk = [0u8; 256];
            match port.read(&mut chunk) {
                Ok(0) => return Ok(LineRead::TimedOut),
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::TimedOut
                            | std::io::ErrorKind::WouldBlock
                            | std::io::ErrorKind::Interrupted
                    ) =>
                {
                    return Ok(LineRead::TimedOut);
                }
                Err(e) => return Err(ScopeError::Read(e.to_string())),
            }
        }
    }

    fn close(&mut self) {
        if let Some(port) = self.port.take() {
            drop(port);
            tracing::debug!("Serial port closed");
        }
        self.pending.clear();
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        self.close();
    }
}

/// List the serial ports present on this machine, sorted by name
pub fn list_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => {
            let mut names: Vec<String> = ports.into_iter().map(|p| p.port_name).collect();
            names.sort();
            names
        }
        Err(e) => {
            tracing::warn!("Failed to enumerate serial ports: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let mut config = SerialConfig::default();
        config.read_timeout_ms = 250;
        let settings = LinkSettings::from(&config);
        assert_eq!(settings.baud, 9600);
        assert_eq!(settings.parity, ParityMode::None);
        assert!(!settings.two_phase_open);
        assert_eq!(settings.read_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_pending_line_framing() {
        let mut link = SerialLink::new();
        link.pending.extend_from_slice(b"512\r\n1023\npartial");

        assert_eq!(link.take_pending_line(), Some("512".to_string()));
        assert_eq!(link.take_pending_line(), Some("1023".to_string()));
        assert_eq!(link.take_pending_line(), None);
        assert_eq!(link.pending, b"partial");
    }

    #[test]
    fn test_read_line_without_open_port() {
        let mut link = SerialLink::new();
        assert!(matches!(link.read_line(), Err(ScopeError::Read(_))));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut link = SerialLink::new();
        link.close();
        link.close();
        assert!(!link.is_open());
    }
}
