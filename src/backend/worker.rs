//! Acquisition worker thread implementation
//!
//! This module contains the acquisition loop that runs in a separate
//! thread and owns the serial connection lifecycle. It communicates with
//! the UI thread through crossbeam channels and feeds parsed samples into
//! the shared channel buffers.
//!
//! # State machine
//!
//! `Idle -> Connecting -> Streaming -> (Idle | Faulted)`
//!
//! - **Idle**: no connection open; accepts a start command.
//! - **Connecting**: opening the device with the configured baud/parity.
//!   Open failures transition to `Faulted` and surface a connection error.
//! - **Streaming**: one bounded line read per iteration. Malformed lines
//!   are counted and dropped (never fatal); connection-level read
//!   failures transition to `Faulted`.
//! - **Faulted**: terminal until an explicit stop or restart; the last
//!   error is surfaced on the message channel.
//!
//! # Time model
//!
//! The elapsed counter advances by a fixed tick step per successfully
//! parsed line. It is logical time, not wall-clock time: it diverges from
//! real elapsed time whenever device I/O stalls.
//!
//! # Cancellation
//!
//! The only blocking point is the link read, which is bounded by the
//! configured read timeout. Commands and the running flag are checked
//! every iteration, so stop/shutdown latency is bounded by that timeout.

use crate::backend::link::{DataLink, LineRead, LinkSettings, SerialLink};
use crate::backend::{BackendCommand, BackendMessage};
use crate::buffer::SharedSampleBuffer;
use crate::config::{AppConfig, ChannelConfig};
use crate::error::Result;
use crate::types::{AcquisitionStats, ConnectionStatus, Sample};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "mock-link")]
use crate::backend::mock_link::MockLink;

/// Sleep between loop iterations while no connection is open
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How often stats messages are pushed to the UI while streaming
const STATS_INTERVAL: Duration = Duration::from_millis(500);

/// One tracked channel: its chart configuration and the buffer it feeds
#[derive(Debug, Clone)]
pub struct ChannelSink {
    /// Chart configuration the buffer capacity was derived from
    pub config: ChannelConfig,
    /// The buffer this channel's samples land in
    pub buffer: SharedSampleBuffer,
}

impl ChannelSink {
    /// Create a sink with a buffer sized to the channel's display window
    pub fn from_config(config: ChannelConfig) -> Result<Self> {
        let buffer = SharedSampleBuffer::new(config.capacity()?)?;
        Ok(Self { config, buffer })
    }
}

/// The acquisition loop: owns exactly one device link at a time
pub struct AcquisitionWorker {
    /// Application configuration
    config: AppConfig,
    /// Command receiver from the UI
    command_rx: Receiver<BackendCommand>,
    /// Message sender to the UI
    message_tx: Sender<BackendMessage>,
    /// Running flag
    running: Arc<AtomicBool>,
    /// Device link (real serial port, or a mock)
    link: Box<dyn DataLink>,
    /// Buffers fed by this loop, one per tracked channel
    sinks: Vec<ChannelSink>,
    /// Current session state
    status: ConnectionStatus,
    /// Logical elapsed time in ticks
    elapsed: f64,
    /// Session counters
    stats: AcquisitionStats,
    /// Last time stats were pushed to the UI
    last_stats_time: Instant,
}

impl AcquisitionWorker {
    /// Create a worker over the real serial link
    pub fn new(
        config: AppConfig,
        sinks: Vec<ChannelSink>,
        command_rx: Receiver<BackendCommand>,
        message_tx: Sender<BackendMessage>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self::with_link(
            Box::new(SerialLink::new()),
            config,
            sinks,
            command_rx,
            message_tx,
            running,
        )
    }

    /// Create a worker over an explicit link implementation
    pub fn with_link(
        link: Box<dyn DataLink>,
        config: AppConfig,
        sinks: Vec<ChannelSink>,
        command_rx: Receiver<BackendCommand>,
        message_tx: Sender<BackendMessage>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            command_rx,
            message_tx,
            running,
            link,
            sinks,
            status: ConnectionStatus::Idle,
            elapsed: 0.0,
            stats: AcquisitionStats::default(),
            last_stats_time: Instant::now(),
        }
    }

    /// Run the main worker loop until shutdown
    pub fn run(&mut self) {
        tracing::info!("Acquisition worker started");

        while self.running.load(Ordering::SeqCst) {
            self.process_commands();

            if self.status == ConnectionStatus::Streaming {
                self.poll_link();

                if self.last_stats_time.elapsed() >= STATS_INTERVAL {
                    self.send_stats();
                    self.last_stats_time = Instant::now();
                }
            } else {
                std::thread::sleep(IDLE_POLL_INTERVAL);
            }
        }

        // Every exit path releases the device handle.
        self.link.close();
        let _ = self.message_tx.send(BackendMessage::Shutdown);
        tracing::info!("Acquisition worker stopped");
    }

    /// Process pending commands from the UI
    fn process_commands(&mut self) {
        loop {
            match self.command_rx.try_recv() {
                Ok(cmd) => self.handle_command(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }

    /// Handle a single command
    fn handle_command(&mut self, cmd: BackendCommand) {
        match cmd {
            BackendCommand::Start { port } => {
                self.handle_start(&port);
            }
            BackendCommand::Stop => {
                self.handle_stop();
            }
            BackendCommand::ClearData => {
                self.clear_data();
            }
            BackendCommand::RequestStats => {
                self.send_stats();
            }
            BackendCommand::Shutdown => {
                self.running.store(false, Ordering::SeqCst);
            }
            #[cfg(feature = "mock-link")]
            BackendCommand::UseMockLink(use_mock) => {
                if self.status == ConnectionStatus::Streaming
                    || self.status == ConnectionStatus::Connecting
                {
                    tracing::warn!("Ignoring link swap while a session is active");
                    return;
                }
                self.link.close();
                if use_mock {
                    self.link = Box::new(MockLink::default());
                    tracing::info!("Switched to mock link");
                } else {
                    self.link = Box::new(SerialLink::new());
                    tracing::info!("Switched to serial link");
                }
            }
        }
    }

    /// Open the device and start streaming
    fn handle_start(&mut self, port: &str) {
        if !self.status.can_start() {
            tracing::warn!("Start ignored: session already active ({})", self.status);
            return;
        }

        self.update_status(ConnectionStatus::Connecting);

        let settings = LinkSettings::from(&self.config.serial);
        match self.link.open(port, &settings) {
            Ok(()) => {
                // New session: previous data is discarded, logical time and
                // counters restart from zero.
                self.elapsed = 0.0;
                self.stats = AcquisitionStats::default();
                for sink in &self.sinks {
                    sink.buffer.clear();
                }
                self.update_status(ConnectionStatus::Streaming);
                tracing::info!("Streaming from {}", port);
            }
            Err(e) => {
                self.link.close();
                self.update_status(ConnectionStatus::Faulted);
                let msg = e.to_string();
                tracing::error!("Failed to open {}: {}", port, msg);
                let _ = self.message_tx.send(BackendMessage::ConnectionError(msg));
            }
        }
    }

    /// Stop the session, releasing the device handle.
    ///
    /// Valid from any state, including `Connecting` and `Faulted`; buffered
    /// data stays visible.
    fn handle_stop(&mut self) {
        self.link.close();
        self.send_stats();
        self.update_status(ConnectionStatus::Idle);
        tracing::info!("Acquisition stopped");
    }

    /// Discard buffered samples and restart counters
    fn clear_data(&mut self) {
        for sink in &self.sinks {
            sink.buffer.clear();
        }
        self.elapsed = 0.0;
        self.stats = AcquisitionStats::default();
        self.send_stats();
    }

    /// One bounded read attempt against the link
    fn poll_link(&mut self) {
        match self.link.read_line() {
            Ok(LineRead::TimedOut) => {}
            Ok(LineRead::Line(line)) => self.handle_line(&line),
            Err(e) => self.fault(e.to_string()),
        }
    }

    /// Parse, convert, and append one inbound line.
    ///
    /// Malformed lines are dropped and counted; the tick counter advances
    /// only on successful parses.
    fn handle_line(&mut self, line: &str) {
        self.stats.lines_read += 1;

        let trimmed = line.trim();
        match trimmed.parse::<i64>() {
            Ok(raw) => {
                self.elapsed += self.config.adc.tick_step;
                let sample = Sample::new(self.elapsed, self.config.adc.volts(raw));
                for sink in &self.sinks {
                    sink.buffer.append(sample);
                }
                self.stats.samples += 1;
            }
            Err(_) => {
                self.stats.parse_errors += 1;
                tracing::debug!("Dropped malformed line {:?}", trimmed);
            }
        }
    }

    /// Contain a mid-stream read failure: close the link, go `Faulted`.
    ///
    /// No further samples are appended after the fault, even if more bytes
    /// were available on the stale handle.
    fn fault(&mut self, error: String) {
        tracing::error!("Read fault, stopping acquisition: {}", error);
        self.link.close();
        self.send_stats();
        self.update_status(ConnectionStatus::Faulted);
        let _ = self.message_tx.send(BackendMessage::ReadError(error));
    }

    /// Update session state and notify the UI
    fn update_status(&mut self, status: ConnectionStatus) {
        self.status = status;
        let _ = self.message_tx.send(BackendMessage::Status(status));
    }

    /// Push stats without blocking; drop the update if the queue is full
    fn send_stats(&mut self) {
        let _ = self.message_tx.try_send(BackendMessage::Stats(self.stats));
    }
}
