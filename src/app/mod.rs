//! `StoryApp` - the top-level egui application state.
//!
//! This module declares the `StoryApp` struct and its constructor.
//! All methods are split across the sibling sub-modules:
//!
//! - `loading`   - background dataset load, step changes and transitions
//! - `narrative` - scrolling text sections and step detection
//! - `chart`     - dot field and label painting

pub mod chart;
pub mod loading;
pub mod narrative;

use std::collections::BTreeMap;
use std::sync::mpsc;
use std::time::Instant;

use eframe::egui;

use dotstory::config::StoryConfig;
use dotstory::data::EntityId;
use dotstory::engine::pipeline::Story;
use dotstory::error::StoryError;
use dotstory::layout::Point;
use dotstory::net::fetch::DataSource;
use dotstory::render::animator::{DotState, Transition};
use dotstory::render::visibility::VisibilityDetector;

// ─── Application state ───────────────────────────────────────────────────────

pub struct StoryApp {
    pub source: DataSource,
    pub config: StoryConfig,
    pub story: Option<Story>,
    pub error: Option<String>,
    pub loading: bool,
    pub load_rx: Option<mpsc::Receiver<Result<Story, StoryError>>>,
    /// Dot states as last drawn; the start of the next transition
    pub dots: BTreeMap<EntityId, DotState>,
    pub transition: Option<Transition>,
    pub transition_start: Instant,
    /// Where labels are drawn; kept while they fade out
    pub label_anchors: BTreeMap<String, Point>,
    pub label_opacity: f32,
    pub detector: VisibilityDetector,
}

impl StoryApp {
    pub fn new(source: DataSource, config: StoryConfig, ctx: &egui::Context) -> Self {
        let mut app = Self {
            source,
            config,
            story: None,
            error: None,
            loading: false,
            load_rx: None,
            dots: BTreeMap::new(),
            transition: None,
            transition_start: Instant::now(),
            label_anchors: BTreeMap::new(),
            label_opacity: 0.0,
            detector: VisibilityDetector::default(),
        };
        app.start_load(ctx);
        app
    }
}

impl eframe::App for StoryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load();
        ctx.set_visuals(egui::Visuals::light());

        self.handle_keys(ctx);

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.draw_status(ui);
        });

        egui::SidePanel::left("narrative")
            .resizable(false)
            .exact_width(360.0)
            .show(ctx, |ui| {
                self.draw_narrative(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_chart(ui);
        });

        if self.loading || self.is_animating() {
            ctx.request_repaint();
        }
    }
}
