use egui::{
    Align2, Color32, CornerRadius, FontId, Frame, Grid, Margin, RichText, Sense, Stroke, Ui, Vec2,
};
use egui_plot::{Line, Plot, PlotPoints, VLine};

use super::{PALETTE_ORANGE, TerraTracerApp, file_image, readout::flight_readout};
use crate::config::DisplayUnits;

const FLIGHT_PANEL_WIDTH_FRACTION: f32 = 0.4;
const BUTTON_RADIUS: f32 = 25.;
const ALIEN_INDICATOR_SIZE: f32 = 100.;
const HEIGHT_CHART_HEIGHT: f32 = 120.;

impl TerraTracerApp {
    pub(crate) fn flight_panel(&self, ui: &mut Ui, window: Vec2) {
        let rows = flight_readout(self.playback.current_flight_sample(), self.config.units);
        Frame::new()
            .fill(Color32::from_black_alpha(77))
            .corner_radius(CornerRadius::same(10))
            .inner_margin(Margin::same(16))
            .show(ui, |ui| {
                ui.set_width(window.x * FLIGHT_PANEL_WIDTH_FRACTION);
                Grid::new("flight_readout")
                    .num_columns(2)
                    .spacing([40., 20.])
                    .show(ui, |ui| {
                        for row in rows {
                            ui.label(
                                RichText::new(format!("{}:", row.label))
                                    .color(PALETTE_ORANGE)
                                    .strong(),
                            );
                            ui.label(RichText::new(row.value).color(Color32::WHITE));
                            ui.end_row();
                        }
                    });
            });
    }

    /// Start/stop button and alien indicator. Returns true when the button was clicked.
    pub(crate) fn controls(&self, ui: &mut Ui) -> bool {
        ui.vertical_centered(|ui| {
            ui.spacing_mut().item_spacing = Vec2::splat(10.);
            let playing = self.playback.is_playing();
            let (rect, response) =
                ui.allocate_exact_size(Vec2::splat(BUTTON_RADIUS * 2.), Sense::click());
            let painter = ui.painter();
            painter.circle_filled(
                rect.center(),
                BUTTON_RADIUS,
                if playing { Color32::RED } else { Color32::GREEN },
            );
            painter.circle_stroke(rect.center(), BUTTON_RADIUS, Stroke::new(2., Color32::WHITE));
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                if playing { "Stop" } else { "Start" },
                FontId::proportional(12.),
                Color32::WHITE,
            );

            self.alien_indicator(ui);
            response.clicked()
        })
        .inner
    }

    fn alien_indicator(&self, ui: &mut Ui) {
        let detected = self.playback.is_detected_now();
        let image = if detected {
            &self.config.alien_image
        } else {
            &self.config.alien_grayscale_image
        };
        match image {
            Some(path) => {
                ui.add(file_image(path).fit_to_exact_size(Vec2::splat(ALIEN_INDICATOR_SIZE)));
            }
            None => {
                let (rect, _) =
                    ui.allocate_exact_size(Vec2::splat(ALIEN_INDICATOR_SIZE), Sense::hover());
                let how_on = ui.ctx().animate_bool(ui.id().with("alien"), detected);
                let color = Color32::DARK_GRAY.lerp_to_gamma(Color32::GREEN, how_on);
                ui.painter()
                    .circle_filled(rect.center(), ALIEN_INDICATOR_SIZE / 2., color);
            }
        }
    }

    pub(crate) fn height_chart(&self, ui: &mut Ui) {
        let unit = match self.config.units {
            DisplayUnits::Imperial => "ft",
            DisplayUnits::Metric => "m",
        };
        let cursor = self
            .playback
            .current_flight_sample()
            .filter(|_| self.playback.is_playing())
            .map(|s| s.time_ms / 1000.);
        Plot::new("height_above_takeoff")
            .height(HEIGHT_CHART_HEIGHT)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_zoom(false)
            .show_background(false)
            .y_axis_label(format!("height ({})", unit))
            .x_axis_label("time (s)")
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new("Height", PlotPoints::new(self.height_points.clone()))
                        .color(PALETTE_ORANGE),
                );
                if let Some(x) = cursor {
                    plot_ui.vline(VLine::new("Now", x).color(Color32::WHITE));
                }
            });
    }
}
