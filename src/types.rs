//! Core data types for Serial Scope
//!
//! This module contains the fundamental data structures shared between the
//! acquisition backend and the UI frontend.
//!
//! # Main Types
//!
//! - [`Sample`] - One (x, y) data point produced by the acquisition pipeline
//! - [`ConnectionStatus`] - State of the acquisition session
//! - [`AcquisitionStats`] - Running counters for the current session
//!
//! # Time Model
//!
//! The x coordinate of a [`Sample`] is a logical tick counter advanced by a
//! fixed step per successfully parsed line, not a wall-clock timestamp. It
//! silently diverges from real elapsed time if device I/O stalls.

/// One (x, y) data point produced by the acquisition pipeline.
///
/// `x` is the elapsed logical tick, `y` the converted engineering-unit
/// value (e.g. volts). Samples have no identity beyond their position in
/// a buffer; equality is not meaningful.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Elapsed logical time in ticks
    pub x: f64,
    /// Converted physical quantity
    pub y: f64,
}

impl Sample {
    /// Create a new sample
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert to the `[x, y]` pair format used by egui_plot
    #[inline]
    pub fn as_plot_point(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// State of the acquisition session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No connection open; ready to start
    #[default]
    Idle,
    /// Opening the serial device
    Connecting,
    /// Connected and reading samples
    Streaming,
    /// Terminal until an explicit stop/restart; last error is retained
    Faulted,
}

impl ConnectionStatus {
    /// Whether a new session may be started from this state
    pub fn can_start(&self) -> bool {
        matches!(self, ConnectionStatus::Idle | ConnectionStatus::Faulted)
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Idle => write!(f, "Idle"),
            ConnectionStatus::Connecting => write!(f, "Connecting"),
            ConnectionStatus::Streaming => write!(f, "Streaming"),
            ConnectionStatus::Faulted => write!(f, "Faulted"),
        }
    }
}

/// Running counters for the current acquisition session
///
/// Parse errors are counted here for observability; they never terminate
/// the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcquisitionStats {
    /// Total lines received from the device (including malformed ones)
    pub lines_read: u64,
    /// Samples successfully parsed, converted, and appended
    pub samples: u64,
    /// Lines dropped because they did not parse as a raw ADC code
    pub parse_errors: u64,
}

impl AcquisitionStats {
    /// Parse success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.lines_read == 0 {
            100.0
        } else {
            (self.samples as f64 / self.lines_read as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_plot_point() {
        let s = Sample::new(0.1, 2.5);
        assert_eq!(s.as_plot_point(), [0.1, 2.5]);
    }

    #[test]
    fn test_status_can_start() {
        assert!(ConnectionStatus::Idle.can_start());
        assert!(ConnectionStatus::Faulted.can_start());
        assert!(!ConnectionStatus::Connecting.can_start());
        assert!(!ConnectionStatus::Streaming.can_start());
    }

    #[test]
    fn test_stats_success_rate() {
        let stats = AcquisitionStats::default();
        assert_eq!(stats.success_rate(), 100.0);

        let stats = AcquisitionStats {
            lines_read: 4,
            samples: 3,
            parse_errors: 1,
        };
        assert_eq!(stats.success_rate(), 75.0);
    }
}
