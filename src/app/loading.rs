//! Loading and step methods for `StoryApp`.
//!
//! Covers the asynchronous dataset-load lifecycle (`start_load`,
//! `check_load`) and turning step changes into running transitions
//! (`go_to_step`, `advance_animation`).

use std::collections::BTreeMap;
use std::sync::mpsc;
use std::time::Instant;

use eframe::egui;

use dotstory::data::EntityId;
use dotstory::engine::pipeline::Story;
use dotstory::engine::step::StepFrame;
use dotstory::layout::{LayoutKind, Point};
use dotstory::render::animator::{initial_spread, DotState, Transition};

use super::StoryApp;

impl StoryApp {
    /// Start loading the dataset on a background thread.
    pub fn start_load(&mut self, ctx: &egui::Context) {
        if self.loading {
            return;
        }
        self.loading = true;
        self.error = None;

        let (tx, rx) = mpsc::channel();
        self.load_rx = Some(rx);

        let source = self.source.clone();
        let config = self.config.clone();
        let ctx = ctx.clone();

        std::thread::spawn(move || {
            let result = Story::load(&source, config);
            let _ = tx.send(result);
            ctx.request_repaint();
        });
    }

    /// Poll the load channel and start the entry animation once the story
    /// is ready.
    pub fn check_load(&mut self) {
        let Some(rx) = &self.load_rx else {
            return;
        };
        let Ok(result) = rx.try_recv() else {
            return;
        };
        match result {
            Ok(story) => {
                log::info!("Story ready: {} dots, {} steps", story.entities().len(), story.num_steps());
                self.start_entry(&story);
                self.story = Some(story);
                self.detector.reset();
                self.error = None;
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", self.source, e);
                self.error = Some(e.to_string());
                self.story = None;
            }
        }
        self.loading = false;
        self.load_rx = None;
    }

    fn start_entry(&mut self, story: &Story) {
        let neutral = story.config().neutral;
        let targets: BTreeMap<EntityId, DotState> = story
            .entities()
            .iter()
            .map(|e| {
                let spread = initial_spread(e.id);
                let dot = DotState {
                    position: Point::new(e.x + spread.x, e.y + spread.y),
                    radius: e.radius,
                    fill: neutral,
                };
                (e.id, dot)
            })
            .collect();

        self.dots.clear();
        self.label_anchors.clear();
        self.label_opacity = 0.0;
        self.transition = Some(Transition::entry(
            targets,
            self.config.transition_ms as f64,
            self.config.entry_jitter_ms as f64,
            &mut rand::thread_rng(),
        ));
        self.transition_start = Instant::now();
    }

    /// Move to `step`, animating from whatever is currently on screen.
    pub fn go_to_step(&mut self, step: usize) {
        let Some(story) = self.story.as_mut() else {
            return;
        };
        let frame = match story.advance(step) {
            Ok(Some(frame)) => frame,
            Ok(None) => return,
            Err(e) => {
                log::warn!("Step {} rejected: {}", step, e);
                return;
            }
        };

        let targets = dot_targets(story, &frame);
        if frame.labels_visible {
            if let Some(centroids) = &frame.centroids {
                self.label_anchors = centroids.clone();
            }
        }

        // Step 0 right after load lands where the entry animation is heading.
        let labels_hidden = !frame.labels_visible && self.label_opacity == 0.0;
        if labels_hidden && self.transition.as_ref().is_some_and(|t| t.targets() == targets) {
            return;
        }

        self.advance_animation();
        let label_to = if frame.labels_visible { 1.0 } else { 0.0 };
        self.transition = Some(
            Transition::new(&self.dots, targets, self.config.transition_ms as f64)
                .with_labels(self.label_opacity, label_to),
        );
        self.transition_start = Instant::now();
    }

    /// Step forward or back from the current step, clamped to the table.
    pub fn step_by(&mut self, delta: isize) {
        let Some(story) = &self.story else {
            return;
        };
        let last = story.num_steps().saturating_sub(1);
        let next = match story.current_step() {
            Some(step) => step.saturating_add_signed(delta).min(last),
            None => 0,
        };
        self.go_to_step(next);
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Sample the running transition into `dots` and `label_opacity`.
    pub fn advance_animation(&mut self) {
        let Some(transition) = &self.transition else {
            return;
        };
        let elapsed_ms = self.transition_start.elapsed().as_secs_f64() * 1000.0;
        self.dots = transition.sample(elapsed_ms);
        self.label_opacity = transition.label_opacity(elapsed_ms);
        if transition.is_finished(elapsed_ms) {
            self.transition = None;
        }
    }
}

fn dot_targets(story: &Story, frame: &StepFrame) -> BTreeMap<EntityId, DotState> {
    story
        .entities()
        .iter()
        .map(|e| {
            let mut position = frame.positions.get(&e.id).copied().unwrap_or(e.position());
            if frame.layout == LayoutKind::Initial {
                let spread = initial_spread(e.id);
                position = Point::new(position.x + spread.x, position.y + spread.y);
            }
            let dot = DotState {
                position,
                radius: frame.radii.get(&e.id).copied().unwrap_or(e.radius),
                fill: story.fill_colour(e, &frame.fill),
            };
            (e.id, dot)
        })
        .collect()
}
