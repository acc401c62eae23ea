//! Chart painting for `StoryApp`.

use eframe::egui;

use dotstory::layout::Point;
use dotstory::render::color::Rgba;

use super::StoryApp;

/// Offsets of the white halo drawn behind label text
const HALO: [(f32, f32); 4] = [(1.0, 1.0), (-1.0, -1.0), (-1.0, 1.0), (1.0, -1.0)];

fn color32(c: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

/// Maps canvas coordinates onto the chart rect, keeping the aspect ratio.
struct CanvasTransform {
    origin: egui::Pos2,
    scale: f32,
}

impl CanvasTransform {
    fn fit(rect: egui::Rect, width: f64, height: f64) -> Self {
        let (w, h) = (width as f32, height as f32);
        let scale = (rect.width() / w).min(rect.height() / h);
        let origin = rect.center() - egui::vec2(w * scale, h * scale) / 2.0;
        Self { origin, scale }
    }

    fn pos(&self, p: Point) -> egui::Pos2 {
        self.origin + egui::vec2(p.x as f32, p.y as f32) * self.scale
    }
}

impl StoryApp {
    pub fn draw_chart(&mut self, ui: &mut egui::Ui) {
        if self.story.is_none() {
            ui.centered_and_justified(|ui| {
                if let Some(err) = &self.error {
                    ui.colored_label(egui::Color32::from_rgb(200, 60, 60), err.as_str());
                } else {
                    ui.spinner();
                }
            });
            return;
        }

        self.advance_animation();

        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
        let layout = &self.config.layout;
        let transform = CanvasTransform::fit(response.rect, layout.width, layout.height);

        painter.rect_filled(response.rect, 0.0, egui::Color32::WHITE);
        for dot in self.dots.values() {
            if dot.radius <= 0.0 {
                continue;
            }
            painter.circle_filled(
                transform.pos(dot.position),
                dot.radius as f32 * transform.scale,
                color32(dot.fill),
            );
        }

        if self.label_opacity <= 0.0 {
            return;
        }
        let font = egui::FontId::proportional(16.0);
        let halo = color32(Rgba::WHITE.with_opacity(self.label_opacity));
        let ink = color32(Rgba::INK.with_opacity(self.label_opacity));
        for (label, anchor) in &self.label_anchors {
            let pos = transform.pos(*anchor);
            for (dx, dy) in HALO {
                painter.text(
                    pos + egui::vec2(dx, dy),
                    egui::Align2::CENTER_CENTER,
                    label,
                    font.clone(),
                    halo,
                );
            }
            painter.text(pos, egui::Align2::CENTER_CENTER, label, font.clone(), ink);
        }
    }
}
