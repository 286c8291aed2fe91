//! Fake device link for integration tests
//!
//! [`FakeLink`] implements [`DataLink`] over a scripted sequence of lines
//! and injected faults, and counts handle releases so tests can assert the
//! connection is closed exactly once on every exit path.

use serialscope::backend::{DataLink, LineRead, LinkSettings};
use serialscope::{Result, ScopeError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One scripted read outcome
#[derive(Debug, Clone)]
pub enum FakeRead {
    /// Deliver this line
    Line(String),
    /// Fail the read (connection-level fault)
    Fault(String),
}

impl FakeRead {
    pub fn line(s: impl Into<String>) -> Self {
        FakeRead::Line(s.into())
    }

    pub fn fault(s: impl Into<String>) -> Self {
        FakeRead::Fault(s.into())
    }
}

/// A [`DataLink`] that replays a script and counts closes
pub struct FakeLink {
    script: VecDeque<FakeRead>,
    open: bool,
    fail_open: bool,
    close_count: Arc<AtomicUsize>,
}

impl FakeLink {
    /// Deliver these reads in order, then time out forever
    pub fn new(script: impl IntoIterator<Item = FakeRead>) -> Self {
        Self {
            script: script.into_iter().collect(),
            open: false,
            fail_open: false,
            close_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Deliver these lines in order, then time out forever
    pub fn with_lines(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(lines.into_iter().map(FakeRead::line))
    }

    /// Make `open` fail with a connection error
    pub fn failing_open() -> Self {
        let mut link = Self::new([]);
        link.fail_open = true;
        link
    }

    /// Counter incremented each time an open link is released
    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        self.close_count.clone()
    }
}

impl DataLink for FakeLink {
    fn open(&mut self, port: &str, _settings: &LinkSettings) -> Result<()> {
        if self.fail_open {
            return Err(ScopeError::Connection(format!("no such port: {}", port)));
        }
        self.open = true;
        Ok(())
    }

    fn read_line(&mut self) -> Result<LineRead> {
        assert!(self.open, "read on a closed link");
        match self.script.pop_front() {
            Some(FakeRead::Line(line)) => Ok(LineRead::Line(line)),
            Some(FakeRead::Fault(e)) => Err(ScopeError::Read(e)),
            None => {
                // Pace the worker like a real timeout-bounded read would.
                std::thread::sleep(Duration::from_millis(2));
                Ok(LineRead::TimedOut)
            }
        }
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.close_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
