//! Story configuration.

use crate::data::csv::DatasetColumns;
use crate::engine::step::{default_steps, FillRule, StepPolicy};
use crate::error::ConfigError;
use crate::layout::LayoutParams;
use crate::render::color::{parse_hex_color, Rgba, TABLEAU10};

/// All tunables of a story, with defaults matching the laureate chart.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryConfig {
    pub layout: LayoutParams,
    pub steps: Vec<StepPolicy>,
    pub columns: DatasetColumns,
    /// Fill used before dots are coloured by category
    pub neutral: Rgba,
    /// Ordinal palette range, as hex strings
    pub palette: Vec<String>,
    /// Duration of every step transition
    pub transition_ms: u64,
    /// Entry animation delays are drawn from `[0, entry_jitter_ms)`
    pub entry_jitter_ms: u64,
}

impl Default for StoryConfig {
    fn default() -> Self {
        let neutral = Rgba::NEUTRAL;
        Self {
            layout: LayoutParams::default(),
            steps: default_steps(neutral),
            columns: DatasetColumns::default(),
            neutral,
            palette: TABLEAU10.iter().map(|s| s.to_string()).collect(),
            transition_ms: 750,
            entry_jitter_ms: 500,
        }
    }
}

impl StoryConfig {
    pub fn with_canvas(mut self, width: f64, height: f64) -> Self {
        self.layout.width = width;
        self.layout.height = height;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.layout.radius = radius;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.layout.padding = padding;
        self
    }

    /// Change the neutral fill, including every step that fills with the
    /// previous neutral colour.
    pub fn with_neutral(mut self, neutral: Rgba) -> Self {
        let previous = self.neutral;
        for step in &mut self.steps {
            if step.fill == FillRule::Constant(previous) {
                step.fill = FillRule::Constant(neutral);
            }
        }
        self.neutral = neutral;
        self
    }

    pub fn with_steps(mut self, steps: Vec<StepPolicy>) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_columns(mut self, columns: DatasetColumns) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_transition_ms(mut self, ms: u64) -> Self {
        self.transition_ms = ms;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let LayoutParams {
            width,
            height,
            radius,
            padding,
        } = self.layout;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::Canvas { width, height });
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ConfigError::Radius(radius));
        }
        if !(padding.is_finite() && padding >= 0.0) {
            return Err(ConfigError::Padding(padding));
        }
        if self.steps.is_empty() {
            return Err(ConfigError::NoSteps);
        }
        self.palette_colors().map(|_| ())
    }

    /// Parsed palette range.
    pub fn palette_colors(&self) -> Result<Vec<Rgba>, ConfigError> {
        self.palette.iter().map(|s| parse_hex_color(s)).collect()
    }
}
