use egui::{Align, Color32, CornerRadius, Frame, Layout, Margin, RichText, ScrollArea, Ui, Vec2};

use super::{
    DEFAULT_WINDOW_CORNER_RADIUS, PALETTE_BROWN, TerraTracerApp,
    readout::{DETECTION_LOG_HEADER, NO_DETECTIONS_TEXT},
};

const LOG_WIDTH_FRACTION: f32 = 0.4;
const LOG_HEIGHT: f32 = 170.;

impl TerraTracerApp {
    pub(crate) fn detection_log(&mut self, ui: &mut Ui, window: Vec2) {
        Frame::new()
            .fill(PALETTE_BROWN)
            .corner_radius(CornerRadius::same(DEFAULT_WINDOW_CORNER_RADIUS))
            .inner_margin(Margin::same(12))
            .show(ui, |ui| {
                ui.set_width(window.x * LOG_WIDTH_FRACTION);
                ui.set_height(LOG_HEIGHT);
                ui.spacing_mut().item_spacing = Vec2::new(8., 4.);
                ui.label(
                    RichText::new("Alien detected:")
                        .color(Color32::WHITE)
                        .heading(),
                );

                if self.playback.seen_ids().is_empty() {
                    ui.with_layout(
                        Layout::centered_and_justified(egui::Direction::TopDown),
                        |ui| {
                            ui.label(
                                RichText::new(NO_DETECTIONS_TEXT)
                                    .color(Color32::WHITE.gamma_multiply(0.7))
                                    .italics(),
                            );
                        },
                    );
                    return;
                }

                ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.label(
                            RichText::new(DETECTION_LOG_HEADER)
                                .monospace()
                                .color(Color32::WHITE.gamma_multiply(0.8)),
                        );
                        for detection in self.playback.seen_detections() {
                            ui.add(
                                egui::Label::new(
                                    RichText::new(detection.summary())
                                        .monospace()
                                        .color(Color32::WHITE),
                                )
                                .truncate(),
                            );
                        }
                        if self.scroll_to_latest {
                            ui.scroll_to_cursor(Some(Align::BOTTOM));
                        }
                    });
                self.scroll_to_latest = false;
            });
    }
}
