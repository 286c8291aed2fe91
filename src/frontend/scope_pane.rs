//! Per-channel chart rendering
//!
//! Each channel draws as a fixed-range, non-interactive plot: the axis
//! bounds come from the channel configuration, never from the data. The
//! pane is a pure consumer of the channel buffer; it snapshots the series
//! each frame and owns no data.

use crate::backend::ChannelSink;
use egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotBounds, PlotPoints};

/// Render one channel's chart into the given height
pub fn render_channel(ui: &mut Ui, sink: &ChannelSink, line_width: f32, height: f32) {
    let config = &sink.config;
    let points = sink.buffer.plot_points();

    ui.vertical(|ui| {
        ui.label(egui::RichText::new(&config.title).strong());

        let plot = Plot::new(config.name.clone())
            .legend(Legend::default())
            .x_axis_label(config.x_label.clone())
            .y_axis_label(config.y_label.clone())
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .height(height);

        plot.show(ui, |plot_ui| {
            // Fixed display window; the data never moves the axes.
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [config.x_min as f64, config.y_min],
                [config.x_max as f64, config.y_max],
            ));
            plot_ui.set_auto_bounds(egui::Vec2b::new(false, false));

            if !points.is_empty() {
                let line =
                    Line::new(config.name.clone(), PlotPoints::from(points)).width(line_width);
                plot_ui.line(line);
            }
        });
    });
}
