//! The video and point-cloud panes. Video frames are never drawn in the
//! window: playback runs in an external player process, and the video pane
//! only shows the file name, player status and elapsed time.

use egui::{Align2, Color32, CornerRadius, FontId, Rect, Sense, Stroke, StrokeKind, Ui, Vec2};

use super::{
    PALETTE_BLACK, PALETTE_BROWN, TerraTracerApp, file_image,
    readout::{format_elapsed, point_cloud_visible},
};

const PANE_WIDTH_FRACTION: f32 = 0.45;
const PANE_HEIGHT_FRACTION: f32 = 0.35;
const PLACEHOLDER_CORNER_RADIUS: u8 = 8;

fn pane_frame(ui: &mut Ui, size: Vec2) -> Rect {
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    ui.painter()
        .rect_stroke(rect, 0., Stroke::new(2., Color32::WHITE), StrokeKind::Inside);
    rect
}

fn placeholder(ui: &Ui, rect: Rect, text: &str) {
    let font = FontId::proportional(16.);
    let galley = ui
        .painter()
        .layout_no_wrap(text.to_string(), font.clone(), Color32::WHITE);
    let badge = Rect::from_center_size(rect.center(), galley.size() + Vec2::splat(24.));
    ui.painter().rect_filled(
        badge,
        CornerRadius::same(PLACEHOLDER_CORNER_RADIUS),
        PALETTE_BROWN.gamma_multiply(0.8),
    );
    ui.painter()
        .text(rect.center(), Align2::CENTER_CENTER, text, font, Color32::WHITE);
}

impl TerraTracerApp {
    /// Video surface and point cloud side by side.
    pub(crate) fn media_panes(&self, ui: &mut Ui, window: Vec2) {
        let pane_size = Vec2::new(
            window.x * PANE_WIDTH_FRACTION,
            window.y * PANE_HEIGHT_FRACTION,
        );
        ui.horizontal(|ui| {
            let video_rect = pane_frame(ui, pane_size);
            if self.playback.is_playing() {
                self.video_surface(ui, video_rect);
            } else {
                placeholder(ui, video_rect, "Drone view");
            }

            let cloud_rect = pane_frame(ui, pane_size);
            let show_cloud = point_cloud_visible(
                self.playback.time_since_start(),
                self.playback.timing().point_cloud_delay(),
            );
            match (&self.config.point_cloud_image, show_cloud) {
                (Some(image), true) => {
                    file_image(image).paint_at(ui, cloud_rect.shrink(2.));
                }
                _ => placeholder(ui, cloud_rect, "Point Cloud"),
            }
        });
    }

    fn video_surface(&self, ui: &Ui, rect: Rect) {
        let painter = ui.painter();
        painter.rect_filled(rect.shrink(2.), CornerRadius::ZERO, PALETTE_BLACK);
        let status = if self.playback.is_media_playing() {
            format!("\u{25B6} {}", self.video_name)
        } else {
            format!("{} (player not running)", self.video_name)
        };
        painter.text(
            rect.center() - Vec2::new(0., 12.),
            Align2::CENTER_CENTER,
            status,
            FontId::proportional(18.),
            Color32::WHITE,
        );
        painter.text(
            rect.center() + Vec2::new(0., 14.),
            Align2::CENTER_CENTER,
            format_elapsed(self.playback.elapsed_ms()),
            FontId::monospace(16.),
            Color32::LIGHT_GRAY,
        );
    }
}
