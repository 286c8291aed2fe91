//! Explicit session state for the UI
//!
//! A [`Session`] owns one acquisition loop handle and one buffer per
//! tracked channel, constructed once at startup and passed to the UI layer
//! by reference. There is no ambient application state: everything the UI
//! needs to control and observe acquisition goes through this object.
//!
//! The session folds backend messages into queryable state
//! ([`status`](Session::status), [`stats`](Session::stats),
//! [`last_error`](Session::last_error)) via
//! [`poll_messages`](Session::poll_messages), which the UI calls once per
//! frame.

use crate::backend::{
    sinks_from_config, AcquisitionBackend, BackendMessage, ChannelSink, DataLink, FrontendHandle,
};
use crate::config::{AppConfig, ChannelConfig};
use crate::error::Result;
use crate::types::{AcquisitionStats, ConnectionStatus};

/// One acquisition loop plus its channel buffers, as seen by the UI
pub struct Session {
    sinks: Vec<ChannelSink>,
    frontend: FrontendHandle,
    status: ConnectionStatus,
    stats: AcquisitionStats,
    last_error: Option<String>,
}

impl Session {
    /// Build a session and its backend from the configuration.
    ///
    /// The returned [`AcquisitionBackend`] must be moved onto its own
    /// thread and run.
    pub fn new(config: &AppConfig) -> Result<(Self, AcquisitionBackend)> {
        let sinks = sinks_from_config(config)?;
        let (backend, frontend) = AcquisitionBackend::new(config.clone(), sinks.clone());
        Ok((Self::from_parts(sinks, frontend), backend))
    }

    /// Build a session over an explicit link implementation (tests, mocks)
    pub fn with_link(
        link: Box<dyn DataLink>,
        config: &AppConfig,
    ) -> Result<(Self, AcquisitionBackend)> {
        let sinks = sinks_from_config(config)?;
        let (backend, frontend) =
            AcquisitionBackend::with_link(link, config.clone(), sinks.clone());
        Ok((Self::from_parts(sinks, frontend), backend))
    }

    fn from_parts(sinks: Vec<ChannelSink>, frontend: FrontendHandle) -> Self {
        Self {
            sinks,
            frontend,
            status: ConnectionStatus::Idle,
            stats: AcquisitionStats::default(),
            last_error: None,
        }
    }

    /// The tracked channels and their buffers, for rendering
    pub fn channels(&self) -> &[ChannelSink] {
        &self.sinks
    }

    /// Current session state (as of the last [`poll_messages`](Self::poll_messages))
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Session counters (as of the last poll)
    pub fn stats(&self) -> AcquisitionStats {
        self.stats
    }

    /// The error that faulted the session, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Request a session start on the given port
    pub fn start(&mut self, port: impl Into<String>) {
        self.last_error = None;
        self.frontend.start(port);
    }

    /// Request a session stop; buffered data stays visible
    pub fn stop(&self) {
        self.frontend.stop();
    }

    /// Discard buffered samples and restart the tick counter
    pub fn clear(&self) {
        self.frontend.clear_data();
    }

    /// Swap between the mock link and the real serial link
    #[cfg(feature = "mock-link")]
    pub fn use_mock_link(&self, use_mock: bool) {
        self.frontend.use_mock_link(use_mock);
    }

    /// Signal the backend to shut down
    pub fn shutdown(&self) {
        self.frontend.shutdown();
    }

    /// Fold pending backend messages into session state.
    ///
    /// Call once per UI frame.
    pub fn poll_messages(&mut self) {
        for msg in self.frontend.drain() {
            match msg {
                BackendMessage::Status(status) => self.status = status,
                BackendMessage::Stats(stats) => self.stats = stats,
                BackendMessage::ConnectionError(e) | BackendMessage::ReadError(e) => {
                    self.last_error = Some(e);
                }
                BackendMessage::Shutdown => self.status = ConnectionStatus::Idle,
            }
        }
    }

    /// Replace a channel's configuration, rebuilding its buffer at the
    /// capacity of the new display window. All buffered samples for that
    /// channel are discarded.
    pub fn reconfigure_channel(&mut self, index: usize, config: ChannelConfig) -> Result<()> {
        let sink = self
            .sinks
            .get_mut(index)
            .ok_or_else(|| crate::error::ScopeError::Config(format!("no channel {}", index)))?;
        sink.buffer.reconfigure(config.capacity()?)?;
        sink.config = config;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sample;

    #[test]
    fn test_reconfigure_channel_rebuilds_buffer() {
        let config = AppConfig::with_default_channel();
        let (mut session, _backend) = Session::new(&config).unwrap();

        session.channels()[0].buffer.append(Sample::new(0.1, 1.0));
        assert_eq!(session.channels()[0].buffer.capacity(), 101);

        let narrow = ChannelConfig {
            x_min: 0,
            x_max: 9,
            ..ChannelConfig::default()
        };
        session.reconfigure_channel(0, narrow).unwrap();

        assert_eq!(session.channels()[0].buffer.capacity(), 10);
        assert!(session.channels()[0].buffer.is_empty());
    }

    #[test]
    fn test_reconfigure_unknown_channel() {
        let config = AppConfig::with_default_channel();
        let (mut session, _backend) = Session::new(&config).unwrap();
        assert!(session
            .reconfigure_channel(5, ChannelConfig::default())
            .is_err());
    }
}
