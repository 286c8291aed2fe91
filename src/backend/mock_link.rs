//! Mock device link for running without hardware
//!
//! This module provides a [`DataLink`] implementation that feeds scripted
//! or generated lines instead of reading a serial port. It exists for
//! development and testing (enable with the `mock-link` feature):
//!
//! ```bash
//! cargo run --features mock-link
//! ```
//!
//! Two modes:
//!
//! - **Generated**: an endless sine wave of raw ADC codes, paced to
//!   roughly resemble a 9600-baud line stream.
//! - **Scripted**: a fixed list of lines, then timeouts forever. Failures
//!   can be injected at open time or after N reads.

use crate::error::{Result, ScopeError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::link::{DataLink, LineRead, LinkSettings};

/// Pacing delay between generated lines
const GENERATED_LINE_INTERVAL: Duration = Duration::from_millis(10);

/// What the mock feeds the acquisition loop
enum MockSource {
    /// Endless sine wave of raw codes with the given period in lines
    Sine { period: f64 },
    /// Fixed list of lines, then timeouts
    Scripted(VecDeque<String>),
}

/// A [`DataLink`] that needs no hardware
pub struct MockLink {
    source: MockSource,
    open: bool,
    reads: usize,
    fail_open: bool,
    fail_after: Option<usize>,
    close_count: Arc<AtomicUsize>,
}

impl Default for MockLink {
    fn default() -> Self {
        Self::sine(200.0)
    }
}

impl MockLink {
    /// Endless sine wave over the full 10-bit code range
    pub fn sine(period: f64) -> Self {
        Self {
            source: MockSource::Sine { period },
            open: false,
            reads: 0,
            fail_open: false,
            fail_after: None,
            close_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Feed exactly these lines, then time out forever
    pub fn with_lines(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            source: MockSource::Scripted(lines.into_iter().map(Into::into).collect()),
            open: false,
            reads: 0,
            fail_open: false,
            fail_after: None,
            close_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make `open` fail with a connection error
    pub fn with_open_failure(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Inject a read fault after `reads` successful read attempts
    pub fn with_fail_after(mut self, reads: usize) -> Self {
        self.fail_after = Some(reads);
        self
    }

    /// Counter incremented each time an open link is closed
    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        self.close_count.clone()
    }
}

impl DataLink for MockLink {
    fn open(&mut self, port: &str, _settings: &LinkSettings) -> Result<()> {
        if self.fail_open {
            return Err(ScopeError::Connection(format!(
                "mock open failure for {}",
                port
            )));
        }
        self.open = true;
        self.reads = 0;
        tracing::info!("Mock link opened ({})", port);
        Ok(())
    }

    fn read_line(&mut self) -> Result<LineRead> {
        if !self.open {
            return Err(ScopeError::Read("mock link not open".to_string()));
        }
        if let Some(limit) = self.fail_after {
            if self.reads >= limit {
                return Err(ScopeError::Read("injected mock read fault".to_string()));
            }
        }
        let reads = self.reads;
        self.reads += 1;

        match &mut self.source {
            MockSource::Sine { period } => {
                std::thread::sleep(GENERATED_LINE_INTERVAL);
                let phase = reads as f64 / *period * std::f64::consts::TAU;
                let raw = (512.0 + 511.0 * phase.sin()).round() as i64;
                Ok(LineRead::Line(raw.to_string()))
            }
            MockSource::Scripted(lines) => match lines.pop_front() {
                Some(line) => Ok(LineRead::Line(line)),
                None => {
                    std::thread::sleep(GENERATED_LINE_INTERVAL);
                    Ok(LineRead::TimedOut)
                }
            },
        }
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.close_count.fetch_add(1, Ordering::SeqCst);
            tracing::debug!("Mock link closed");
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
