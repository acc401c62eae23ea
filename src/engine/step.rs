//! Step controller: maps a narrative step to a layout, a fill rule and a
//! label rule.
//!
//! The controller remembers the last step it computed and skips work when the
//! same step is reported again, so repeated visibility events are cheap.

use std::collections::BTreeMap;

use crate::data::{Entity, EntityId, GroupKey};
use crate::error::{ConfigError, InvalidStepError, StoryError};
use crate::layout::{LayoutEngine, LayoutKind, LayoutResult, Point};
use crate::render::color::Rgba;

/// How dots are filled at a step.
#[derive(Debug, Clone, PartialEq)]
pub enum FillRule {
    Constant(Rgba),
    /// Colour looked up in the palette by the entity's value for this key
    ByAttribute(GroupKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelVisibility {
    Hidden,
    AtCentroids,
}

/// One row of the step table.
#[derive(Debug, Clone, PartialEq)]
pub struct StepPolicy {
    pub layout: LayoutKind,
    pub fill: FillRule,
    pub labels: LabelVisibility,
}

impl StepPolicy {
    pub fn new(layout: LayoutKind, fill: FillRule, labels: LabelVisibility) -> Self {
        Self { layout, fill, labels }
    }
}

/// The three-step narrative: neutral stack, category clusters with labels,
/// then secondary clusters still coloured by category.
pub fn default_steps(neutral: Rgba) -> Vec<StepPolicy> {
    vec![
        StepPolicy::new(LayoutKind::Initial, FillRule::Constant(neutral), LabelVisibility::Hidden),
        StepPolicy::new(
            LayoutKind::ClusteredByCategory,
            FillRule::ByAttribute(GroupKey::Category),
            LabelVisibility::AtCentroids,
        ),
        StepPolicy::new(
            LayoutKind::ClusteredBySecondary,
            FillRule::ByAttribute(GroupKey::Category),
            LabelVisibility::Hidden,
        ),
    ]
}

/// Everything the renderer needs to transition to a step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepFrame {
    pub step: usize,
    pub layout: LayoutKind,
    pub positions: BTreeMap<EntityId, Point>,
    pub radii: BTreeMap<EntityId, f64>,
    pub fill: FillRule,
    pub centroids: Option<BTreeMap<String, Point>>,
    pub labels_visible: bool,
}

impl StepFrame {
    fn new(step: usize, policy: &StepPolicy, result: LayoutResult) -> Self {
        Self {
            step,
            layout: result.kind,
            labels_visible: policy.labels == LabelVisibility::AtCentroids
                && result.centroids.is_some(),
            positions: result.positions,
            radii: result.radii,
            fill: policy.fill.clone(),
            centroids: result.centroids,
        }
    }

    /// The layout part of the frame, in the form the entity store applies.
    pub fn layout_result(&self) -> LayoutResult {
        LayoutResult {
            kind: self.layout,
            positions: self.positions.clone(),
            radii: self.radii.clone(),
            centroids: self.centroids.clone(),
        }
    }
}

pub struct StepController {
    engine: LayoutEngine,
    steps: Vec<StepPolicy>,
    current: Option<usize>,
    layout_runs: usize,
}

impl StepController {
    pub fn new(engine: LayoutEngine, steps: Vec<StepPolicy>) -> Result<Self, ConfigError> {
        if steps.is_empty() {
            return Err(ConfigError::NoSteps);
        }
        Ok(Self {
            engine,
            steps,
            current: None,
            layout_runs: 0,
        })
    }

    /// Last step a frame was produced for; `None` before the first change.
    pub fn current_step(&self) -> Option<usize> {
        self.current
    }

    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    /// Number of layouts computed so far.
    pub fn layout_runs(&self) -> usize {
        self.layout_runs
    }

    pub fn policy(&self, step: usize) -> Result<&StepPolicy, InvalidStepError> {
        self.steps.get(step).ok_or(InvalidStepError {
            step,
            num_steps: self.steps.len(),
        })
    }

    /// Handle a step reported by the visibility detector.
    ///
    /// Returns `Ok(None)` when `step` is already current. On any error the
    /// current step is left as it was.
    pub fn on_step_changed(
        &mut self,
        step: usize,
        entities: &[Entity],
    ) -> Result<Option<StepFrame>, StoryError> {
        let policy = self.policy(step)?;
        if self.current == Some(step) {
            log::debug!("Step {} already current", step);
            return Ok(None);
        }

        let result = self.engine.compute(policy.layout, entities)?;
        let frame = StepFrame::new(step, policy, result);
        self.layout_runs += 1;
        log::info!("Step {:?} -> {} ({:?})", self.current, step, frame.layout);
        self.current = Some(step);
        Ok(Some(frame))
    }
}
