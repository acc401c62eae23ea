//! Narrative panel for `StoryApp`.
//!
//! Draws the scrolling text sections, feeds their on-screen extents to the
//! visibility detector and maps arrow keys onto step changes.

use eframe::egui;

use dotstory::render::visibility::Span;

use super::StoryApp;

/// Section texts, one per step.
const SECTIONS: [(&str, &str); 3] = [
    (
        "Nobel laureates",
        "Every dot is one laureate, from the first prizes in 1901 to today. \
         Organisations are left out.",
    ),
    (
        "By category",
        "Grouped by prize category, the dots show how unevenly the prizes \
         are spread across the fields.",
    ),
    (
        "By gender",
        "Regrouped by gender and still coloured by category, the imbalance \
         becomes hard to miss.",
    ),
];

impl StoryApp {
    pub fn draw_narrative(&mut self, ui: &mut egui::Ui) {
        let mut spans = Vec::with_capacity(SECTIONS.len());
        let mut viewport = None;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let clip = ui.clip_rect();
                viewport = Some(Span::new(clip.top(), clip.bottom()));
                let gap = clip.height() * 0.6;

                ui.add_space(clip.height() * 0.2);
                for (title, body) in SECTIONS {
                    let rect = ui
                        .vertical(|ui| {
                            ui.heading(egui::RichText::new(title).size(22.0).strong());
                            ui.add_space(6.0);
                            ui.label(egui::RichText::new(body).size(15.0));
                        })
                        .response
                        .rect;
                    spans.push(Span::new(rect.top(), rect.bottom()));
                    ui.add_space(gap);
                }
            });

        if let Some(viewport) = viewport {
            for step in self.detector.update(&spans, viewport) {
                self.go_to_step(step);
            }
        }
    }

    pub fn handle_keys(&mut self, ctx: &egui::Context) {
        let (forward, back) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::ArrowDown) || i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::ArrowUp) || i.key_pressed(egui::Key::ArrowLeft),
            )
        });
        if forward {
            self.step_by(1);
        } else if back {
            self.step_by(-1);
        }
    }

    pub fn draw_status(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if self.loading {
                ui.spinner();
                ui.label(format!("Loading {}", self.source));
            } else if let Some(err) = &self.error {
                ui.colored_label(egui::Color32::from_rgb(200, 60, 60), err.as_str());
            } else if let Some(story) = &self.story {
                let step = story
                    .current_step()
                    .map(|s| format!("{}/{}", s + 1, story.num_steps()))
                    .unwrap_or_else(|| "-".to_string());
                ui.label(format!(
                    "{} dots | step {} | {} layouts",
                    story.entities().len(),
                    step,
                    story.layout_runs()
                ));
            }
        });
    }
}
