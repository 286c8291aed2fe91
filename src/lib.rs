//! # Serial Scope: live serial analog plotter
//!
//! A real-time charting tool for analog sensor readings streamed line by
//! line over a serial connection (e.g. an Arduino printing ADC codes).
//! The architecture separates the serial acquisition backend from the UI
//! rendering frontend:
//!
//! - **Backend**: owns the serial connection in a dedicated worker thread,
//!   parses inbound lines into raw ADC codes, converts them to volts, and
//!   appends them into bounded per-channel buffers
//! - **Buffer**: fixed-capacity FIFO series per channel; the single point
//!   of producer/consumer decoupling
//! - **Frontend**: renders the UI using eframe/egui with egui_plot for the
//!   charts, polling buffer snapshots on its own redraw cadence
//! - **Communication**: crossbeam channels for control and status,
//!   shared buffers for the sample data itself
//!
//! ## Example
//!
//! ```ignore
//! use serialscope::{config::AppConfig, frontend::ScopeApp, session::Session};
//!
//! fn main() -> eframe::Result<()> {
//!     let config = AppConfig::load_or_default();
//!     let (session, backend) = Session::new(&config).expect("valid channel config");
//!     std::thread::spawn(move || backend.run());
//!
//!     eframe::run_native(
//!         "Serial Scope",
//!         eframe::NativeOptions::default(),
//!         Box::new(move |cc| {
//!             Ok(Box::new(ScopeApp::new(
//!                 cc,
//!                 session,
//!                 config.ui.clone(),
//!                 Default::default(),
//!                 config.serial.port.clone(),
//!             )))
//!         }),
//!     )
//! }
//! ```

pub mod app;
pub mod backend;
pub mod buffer;
pub mod config;
pub mod error;
pub mod frontend;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use app::ScopeApp;
pub use backend::{AcquisitionBackend, BackendCommand, BackendMessage, ChannelSink};
pub use buffer::{SampleBuffer, SharedSampleBuffer};
pub use config::{AppConfig, AppState, ChannelConfig};
pub use error::{Result, ScopeError};
pub use session::Session;
pub use types::{AcquisitionStats, ConnectionStatus, Sample};
