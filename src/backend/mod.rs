//! Acquisition backend: serial polling in a separate thread
//!
//! This module handles all device I/O in a worker thread to keep the UI
//! responsive. It uses crossbeam channels for thread-safe communication
//! with the frontend.
//!
//! # Architecture
//!
//! - [`BackendCommand`] - Messages sent from UI to backend (start, stop, clear)
//! - [`BackendMessage`] - Messages sent from backend to UI (status, errors, stats)
//! - [`FrontendHandle`] - UI-side handle for sending commands and receiving messages
//! - [`AcquisitionBackend`] - Backend entry point, run on its own thread
//!
//! Samples themselves do not travel over the channels: the worker appends
//! them straight into the [`SharedSampleBuffer`](crate::buffer::SharedSampleBuffer)s
//! it was constructed with, and the UI snapshots those buffers on its own
//! redraw cadence.
//!
//! # Example
//!
//! ```ignore
//! use serialscope::backend::{AcquisitionBackend, BackendMessage, ChannelSink};
//! use serialscope::config::AppConfig;
//!
//! let config = AppConfig::with_default_channel();
//! let sinks: Vec<ChannelSink> = config
//!     .channels
//!     .iter()
//!     .cloned()
//!     .map(|c| ChannelSink::from_config(c).unwrap())
//!     .collect();
//!
//! let (backend, frontend) = AcquisitionBackend::new(config, sinks.clone());
//! std::thread::spawn(move || backend.run());
//!
//! frontend.start("/dev/ttyACM0");
//! for msg in frontend.drain() {
//!     if let BackendMessage::Status(status) = msg {
//!         // update UI state
//!     }
//! }
//! ```

pub mod link;
#[cfg(feature = "mock-link")]
pub mod mock_link;
pub mod worker;

pub use link::{list_ports, DataLink, LineRead, LinkSettings, SerialLink};
#[cfg(feature = "mock-link")]
pub use mock_link::MockLink;
pub use worker::{AcquisitionWorker, ChannelSink};

use crate::config::AppConfig;
use crate::types::{AcquisitionStats, ConnectionStatus};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Capacity of the command and message channels
const CHANNEL_CAPACITY: usize = 64;

/// Message sent from the UI to the backend
#[derive(Debug, Clone)]
pub enum BackendCommand {
    /// Open the given port and start streaming
    Start {
        /// Port identifier (e.g. `/dev/ttyACM0`, `COM3`)
        port: String,
    },
    /// Stop the session, releasing the device handle; buffered data stays
    Stop,
    /// Discard buffered samples and restart the tick counter
    ClearData,
    /// Request an immediate stats update
    RequestStats,
    /// Shut the backend down
    Shutdown,
    /// Swap between the mock link and the real serial link
    #[cfg(feature = "mock-link")]
    UseMockLink(bool),
}

/// Message sent from the backend to the UI
#[derive(Debug, Clone)]
pub enum BackendMessage {
    /// Session state changed
    Status(ConnectionStatus),
    /// The device could not be opened
    ConnectionError(String),
    /// I/O failure mid-stream; the session is now faulted
    ReadError(String),
    /// Counter update
    Stats(AcquisitionStats),
    /// Backend is shutting down
    Shutdown,
}

/// UI-side handle to the acquisition backend
pub struct FrontendHandle {
    /// Receiver for backend messages
    receiver: Receiver<BackendMessage>,
    /// Sender for commands to the backend
    command_tx: Sender<BackendCommand>,
    /// Shared running flag (cleared on shutdown)
    running: Arc<AtomicBool>,
}

impl FrontendHandle {
    /// Try to receive a message without blocking
    pub fn try_recv(&self) -> Option<BackendMessage> {
        self.receiver.try_recv().ok()
    }

    /// Receive all pending messages
    pub fn drain(&self) -> Vec<BackendMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.receiver.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Send a command to the backend
    pub fn send_command(&self, cmd: BackendCommand) -> bool {
        self.command_tx.send(cmd).is_ok()
    }

    /// Request a session start on the given port
    pub fn start(&self, port: impl Into<String>) {
        let _ = self.command_tx.send(BackendCommand::Start { port: port.into() });
    }

    /// Request a session stop
    pub fn stop(&self) {
        let _ = self.command_tx.send(BackendCommand::Stop);
    }

    /// Discard buffered samples
    pub fn clear_data(&self) {
        let _ = self.command_tx.send(BackendCommand::ClearData);
    }

    /// Request an immediate stats update
    pub fn request_stats(&self) {
        let _ = self.command_tx.send(BackendCommand::RequestStats);
    }

    /// Swap between the mock link and the real serial link
    #[cfg(feature = "mock-link")]
    pub fn use_mock_link(&self, use_mock: bool) {
        let _ = self.command_tx.send(BackendCommand::UseMockLink(use_mock));
    }

    /// Signal the backend to shut down
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(BackendCommand::Shutdown);
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Acquisition backend entry point
///
/// Construct with [`AcquisitionBackend::new`], then move into a dedicated
/// thread and call [`run`](Self::run).
pub struct AcquisitionBackend {
    worker: AcquisitionWorker,
}

impl AcquisitionBackend {
    /// Create the backend/frontend pair.
    ///
    /// `sinks` are the channel buffers the worker appends into; the UI
    /// keeps clones of the same buffers for rendering.
    pub fn new(config: AppConfig, sinks: Vec<ChannelSink>) -> (Self, FrontendHandle) {
        let (command_tx, command_rx) = bounded(CHANNEL_CAPACITY);
        let (message_tx, message_rx) = bounded(CHANNEL_CAPACITY);
        let running = Arc::new(AtomicBool::new(true));

        let worker =
            AcquisitionWorker::new(config, sinks, command_rx, message_tx, running.clone());

        (
            Self { worker },
            FrontendHandle {
                receiver: message_rx,
                command_tx,
                running,
            },
        )
    }

    /// Create the pair over an explicit link implementation (tests, mocks)
    pub fn with_link(
        link: Box<dyn DataLink>,
        config: AppConfig,
        sinks: Vec<ChannelSink>,
    ) -> (Self, FrontendHandle) {
        let (command_tx, command_rx) = bounded(CHANNEL_CAPACITY);
        let (message_tx, message_rx) = bounded(CHANNEL_CAPACITY);
        let running = Arc::new(AtomicBool::new(true));

        let worker = AcquisitionWorker::with_link(
            link,
            config,
            sinks,
            command_rx,
            message_tx,
            running.clone(),
        );

        (
            Self { worker },
            FrontendHandle {
                receiver: message_rx,
                command_tx,
                running,
            },
        )
    }

    /// Run the worker loop to completion (blocks; call on its own thread)
    pub fn run(mut self) {
        self.worker.run();
    }
}

/// Build one sink per configured channel
pub fn sinks_from_config(config: &AppConfig) -> crate::error::Result<Vec<ChannelSink>> {
    config
        .channels
        .iter()
        .cloned()
        .map(ChannelSink::from_config)
        .collect()
}

