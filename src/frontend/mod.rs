//! Frontend module: the eframe application
//!
//! [`ScopeApp`] renders the toolbar (port selection, start/stop/clear),
//! one fixed-range chart per configured channel, and a status bar with the
//! session counters. It consumes the acquisition backend exclusively
//! through a [`Session`]: commands go down the handle, state comes back by
//! polling messages once per frame, and sample data is read as snapshots
//! of the shared channel buffers.

pub mod scope_pane;

use crate::backend::list_ports;
use crate::config::{AppState, UiConfig};
use crate::session::Session;
use crate::types::ConnectionStatus;
use egui::{Color32, RichText};
use std::time::Duration;

/// The main application
pub struct ScopeApp {
    session: Session,
    app_state: AppState,
    ui_config: UiConfig,
    available_ports: Vec<String>,
    selected_port: Option<String>,
    #[cfg(feature = "mock-link")]
    mock_link: bool,
}

impl ScopeApp {
    /// Create the application around an existing session
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        session: Session,
        ui_config: UiConfig,
        app_state: AppState,
        preferred_port: Option<String>,
    ) -> Self {
        if ui_config.dark_mode {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
        } else {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
        }

        let available_ports = list_ports();
        let selected_port = app_state
            .last_port
            .clone()
            .or(preferred_port)
            .filter(|p| available_ports.contains(p))
            .or_else(|| available_ports.first().cloned());

        Self {
            session,
            app_state,
            ui_config,
            available_ports,
            selected_port,
            #[cfg(feature = "mock-link")]
            mock_link: false,
        }
    }

    fn refresh_ports(&mut self) {
        self.available_ports = list_ports();
        if let Some(selected) = &self.selected_port {
            if !self.available_ports.contains(selected) {
                self.selected_port = self.available_ports.first().cloned();
            }
        } else {
            self.selected_port = self.available_ports.first().cloned();
        }
    }

    /// The port a start command would use
    fn start_port(&self) -> Option<String> {
        #[cfg(feature = "mock-link")]
        if self.mock_link {
            return Some("mock0".to_string());
        }
        self.selected_port.clone()
    }

    fn start_acquisition(&mut self) {
        let Some(port) = self.start_port() else {
            return;
        };
        self.app_state.last_port = self.selected_port.clone();
        if let Err(e) = self.app_state.save() {
            tracing::warn!("Failed to persist app state: {}", e);
        }
        self.session.start(port);
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        let status = self.session.status();

        ui.horizontal(|ui| {
            ui.label("Port:");
            let combo_enabled = status.can_start();
            ui.add_enabled_ui(combo_enabled, |ui| {
                egui::ComboBox::from_id_salt("port_select")
                    .selected_text(self.selected_port.as_deref().unwrap_or("(no ports)"))
                    .show_ui(ui, |ui| {
                        for port in &self.available_ports {
                            ui.selectable_value(
                                &mut self.selected_port,
                                Some(port.clone()),
                                port,
                            );
                        }
                    });
                if ui.button("Refresh").clicked() {
                    self.refresh_ports();
                }
            });

            ui.separator();

            let can_start = status.can_start() && self.start_port().is_some();
            if ui.add_enabled(can_start, egui::Button::new("Start")).clicked() {
                self.start_acquisition();
            }
            let stop_label = if status == ConnectionStatus::Faulted {
                "Reset"
            } else {
                "Stop"
            };
            if ui
                .add_enabled(status != ConnectionStatus::Idle, egui::Button::new(stop_label))
                .clicked()
            {
                self.session.stop();
            }
            if ui.button("Clear").clicked() {
                self.session.clear();
            }

            #[cfg(feature = "mock-link")]
            {
                ui.separator();
                if ui
                    .checkbox(&mut self.mock_link, "Mock link")
                    .changed()
                {
                    self.session.use_mock_link(self.mock_link);
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let (text, color) = match status {
                    ConnectionStatus::Idle => ("Idle", Color32::GRAY),
                    ConnectionStatus::Connecting => ("Connecting...", Color32::YELLOW),
                    ConnectionStatus::Streaming => ("Streaming", Color32::GREEN),
                    ConnectionStatus::Faulted => ("Faulted", Color32::RED),
                };
                ui.label(RichText::new(text).color(color).strong());
            });
        });
    }

    fn render_status_bar(&self, ui: &mut egui::Ui) {
        let stats = self.session.stats();
        ui.horizontal(|ui| {
            ui.label(format!("Samples: {}", stats.samples));
            ui.separator();
            ui.label(format!("Dropped lines: {}", stats.parse_errors));
            ui.separator();
            ui.label(format!("Parse rate: {:.1}%", stats.success_rate()));

            if let Some(error) = self.session.last_error() {
                ui.separator();
                ui.label(RichText::new(error).color(Color32::RED));
            }
        });
    }
}

impl eframe::App for ScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.session.poll_messages();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.render_toolbar(ui);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.render_status_bar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let channels = self.session.channels();
            if channels.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("No channels configured");
                });
                return;
            }

            // Stack the charts evenly; reserve a little space per title row.
            let chart_height =
                (ui.available_height() / channels.len() as f32 - 24.0).max(80.0);
            for sink in channels {
                scope_pane::render_channel(ui, sink, self.ui_config.line_width, chart_height);
            }
        });

        // Redraw on our own cadence while samples stream in.
        ctx.request_repaint_after(Duration::from_millis(self.ui_config.refresh_interval_ms));
    }
}
