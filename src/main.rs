//! Serial Scope - Main Entry Point
//!
//! This application provides real-time charting of analog sensor readings
//! streamed over a serial connection from a microcontroller.

use serialscope::{
    config::{AppConfig, AppState},
    frontend::ScopeApp,
    session::Session,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,serialscope=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Serial Scope");

    let config = AppConfig::load_or_default();
    let app_state = AppState::load_or_default();
    let preferred_port = config.serial.port.clone();
    let ui_config = config.ui.clone();

    let (session, backend) = match Session::new(&config) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("Invalid channel configuration: {}", e);
            std::process::exit(1);
        }
    };

    // The acquisition loop runs on its own thread so blocking serial reads
    // never touch UI responsiveness. It exits when the session (and with it
    // the command channel) is dropped at the end of the eframe run.
    let backend_handle = std::thread::spawn(move || backend.run());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 640.0])
            .with_min_inner_size([640.0, 400.0])
            .with_title("Serial Scope"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Serial Scope",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(ScopeApp::new(
                cc,
                session,
                ui_config,
                app_state,
                preferred_port,
            )))
        }),
    );

    tracing::info!("Shutting down...");
    let _ = backend_handle.join();

    result
}
