mod detection_log;
mod flight_panel;
mod media_panes;
pub mod readout;

use std::path::Path;

use egui::{Align, Color32, FontId, Image, Layout, RichText, Vec2, Visuals, style::Widgets};
use log::info;
use uom::si::length::{foot, meter};

use crate::config::{DisplayUnits, ViewerConfig};
use crate::playback::{PlaybackController, PlaybackEvent};

pub(crate) const PALETTE_BLACK: Color32 = Color32::from_rgb(12, 12, 12);
pub(crate) const PALETTE_BROWN: Color32 = Color32::from_rgb(72, 30, 20);
pub(crate) const PALETTE_MAROON: Color32 = Color32::from_rgb(155, 57, 34);
pub(crate) const PALETTE_ORANGE: Color32 = Color32::from_rgb(242, 97, 63);

const DEFAULT_WINDOW_CORNER_RADIUS: u8 = 10;
const DRONE_ICON_SIZE: f32 = 150.;
const TITLE_FONT_SIZE: f32 = 80.;

pub(crate) fn file_image(path: &Path) -> Image<'static> {
    Image::new(format!("file://{}", path.display()))
}

/// Root of the viewer. Owns the playback controller and lends it to each view.
pub struct TerraTracerApp {
    playback: PlaybackController,
    config: ViewerConfig,
    video_name: String,
    height_points: Vec<[f64; 2]>,
    scroll_to_latest: bool,
}

impl TerraTracerApp {
    pub fn new(
        playback: PlaybackController,
        config: ViewerConfig,
        video_name: String,
        cc: &eframe::CreationContext<'_>,
    ) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        cc.egui_ctx.set_visuals(Visuals {
            dark_mode: true,
            hyperlink_color: PALETTE_MAROON,
            faint_bg_color: PALETTE_BLACK,
            extreme_bg_color: PALETTE_BROWN,
            panel_fill: Color32::BLACK,
            window_fill: PALETTE_BLACK,
            widgets: Widgets::dark(),
            striped: false,
            ..Default::default()
        });

        let height_points = playback
            .flight_samples()
            .iter()
            .map(|s| {
                let height = match config.units {
                    DisplayUnits::Imperial => s.height_above_takeoff().get::<foot>(),
                    DisplayUnits::Metric => s.height_above_takeoff().get::<meter>(),
                };
                [s.time_ms / 1000., height]
            })
            .collect();

        Self {
            playback,
            config,
            video_name,
            height_points,
            scroll_to_latest: false,
        }
    }

    fn toggle_playback(&mut self) {
        if self.playback.is_playing() {
            self.playback.stop();
        } else {
            self.playback.start();
        }
    }

    fn handle_playback_events(&mut self) {
        for event in self.playback.take_events() {
            match event {
                PlaybackEvent::DetectionsSeen(ids) => {
                    info!("{} new detections in view", ids.len());
                    self.scroll_to_latest = true;
                }
                PlaybackEvent::Started | PlaybackEvent::Stopped => {
                    self.scroll_to_latest = false;
                }
                PlaybackEvent::FlightIndexChanged(_) | PlaybackEvent::DetectedNowChanged(_) => {}
            }
        }
    }

    fn title_bar(&self, ui: &mut egui::Ui) {
        ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
            if let Some(icon) = &self.config.drone_icon {
                ui.add(file_image(icon).fit_to_exact_size(Vec2::splat(DRONE_ICON_SIZE)));
            }
            let title_width = ui.available_width()
                - if self.config.drone_icon.is_some() {
                    DRONE_ICON_SIZE
                } else {
                    0.
                };
            ui.allocate_ui_with_layout(
                Vec2::new(title_width, DRONE_ICON_SIZE.min(TITLE_FONT_SIZE * 1.5)),
                Layout::centered_and_justified(egui::Direction::LeftToRight),
                |ui| {
                    ui.label(
                        RichText::new("TerraTracer")
                            .font(FontId::proportional(TITLE_FONT_SIZE))
                            .color(Color32::WHITE)
                            .strong(),
                    );
                },
            );
            if let Some(icon) = &self.config.drone_icon {
                ui.add(file_image(icon).fit_to_exact_size(Vec2::splat(DRONE_ICON_SIZE)));
            }
        });
    }
}

impl eframe::App for TerraTracerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.playback.is_playing() {
            self.playback.tick();
        }
        self.handle_playback_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            let size = ui.available_size();
            ui.spacing_mut().item_spacing = Vec2::splat(20.);
            self.title_bar(ui);
            self.media_panes(ui, size);
            ui.with_layout(Layout::left_to_right(Align::Min), |ui| {
                self.flight_panel(ui, size);
                if self.controls(ui) {
                    self.toggle_playback();
                    self.handle_playback_events();
                }
                self.detection_log(ui, size);
            });
            self.height_chart(ui);
        });

        if self.playback.is_playing() {
            ctx.request_repaint_after(self.playback.timing().tick_interval());
        }
    }
}
