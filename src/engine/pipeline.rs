use crate::config::StoryConfig;
use crate::data::csv::parse_rows;
use crate::data::{Entity, EntityStore};
use crate::engine::step::{FillRule, StepController, StepFrame};
use crate::error::StoryError;
use crate::layout::LayoutEngine;
use crate::net::fetch::{fetch_source, DataSource};
use crate::render::color::{OrdinalPalette, Rgba};

/// A loaded story: the dots, the step controller and the category palette.
///
/// Load → Parse → Store → Palette → Initial layout
pub struct Story {
    store: EntityStore,
    controller: StepController,
    palette: OrdinalPalette,
    config: StoryConfig,
}

impl Story {
    /// Read `source` and build the story from its CSV text.
    pub fn load(source: &DataSource, config: StoryConfig) -> Result<Self, StoryError> {
        let fetched = fetch_source(source)?;
        log::info!("Loaded dataset from {}", fetched.location);
        Self::from_csv(&fetched.text, config)
    }

    /// Build from CSV text. The initial layout is applied to the store but no
    /// step is current yet.
    pub fn from_csv(text: &str, config: StoryConfig) -> Result<Self, StoryError> {
        config.validate()?;

        let parsed = parse_rows(text, &config.columns)?;
        if parsed.excluded > 0 {
            log::warn!("Excluded {} rows from the dataset", parsed.excluded);
        }
        let mut store = EntityStore::load(parsed.rows)?;

        let palette = OrdinalPalette::new(store.categories(), config.palette_colors()?, config.neutral)?;
        let engine = LayoutEngine::new(config.layout);
        let initial = engine.initial(store.entities());
        store.apply(&initial)?;
        let controller = StepController::new(engine, config.steps.clone())?;

        Ok(Self {
            store,
            controller,
            palette,
            config,
        })
    }

    pub fn entities(&self) -> &[Entity] {
        self.store.entities()
    }

    pub fn config(&self) -> &StoryConfig {
        &self.config
    }

    pub fn palette(&self) -> &OrdinalPalette {
        &self.palette
    }

    pub fn current_step(&self) -> Option<usize> {
        self.controller.current_step()
    }

    pub fn num_steps(&self) -> usize {
        self.controller.num_steps()
    }

    pub fn layout_runs(&self) -> usize {
        self.controller.layout_runs()
    }

    /// Compute the frame for `step`; `None` if it is already current.
    ///
    /// The store is not changed until the frame is committed.
    pub fn on_step_changed(&mut self, step: usize) -> Result<Option<StepFrame>, StoryError> {
        self.controller.on_step_changed(step, self.store.entities())
    }

    /// Apply a frame's layout to the store.
    pub fn commit(&mut self, frame: &StepFrame) -> Result<(), StoryError> {
        self.store.apply(&frame.layout_result())?;
        Ok(())
    }

    /// Step change followed by commit, for callers that do not animate.
    pub fn advance(&mut self, step: usize) -> Result<Option<StepFrame>, StoryError> {
        let frame = self.on_step_changed(step)?;
        if let Some(ref frame) = frame {
            self.commit(frame)?;
        }
        Ok(frame)
    }

    pub fn fill_colour(&self, entity: &Entity, rule: &FillRule) -> Rgba {
        match rule {
            FillRule::Constant(colour) => *colour,
            FillRule::ByAttribute(key) => self.palette.color(key.value(entity)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::GroupKey;
    use crate::error::InvalidStepError;
    use crate::layout::{LayoutKind, Point};

    const CSV: &str = "\
id,Firstname,Category,Gender
1,Wilhelm,physics,male
2,Marie,physics,female
3,Red Cross,peace,org
4,Bertha,peace,female
5,Jacobus,chemistry,male
6,Emil,medicine,male
";

    #[test]
    fn test_from_csv_applies_initial_layout() {
        let story = Story::from_csv(CSV, StoryConfig::default()).unwrap();
        assert_eq!(story.entities().len(), 5, "organisation row must be filtered");
        assert_eq!(story.current_step(), None);
        for e in story.entities() {
            assert_eq!(e.position(), Point::new(350.0, 350.0));
            assert_eq!(e.radius, 6.0);
        }
        assert_eq!(story.palette().domain(), ["physics", "peace", "chemistry", "medicine"]);
    }

    #[test]
    fn test_frame_is_not_applied_until_commit() {
        let mut story = Story::from_csv(CSV, StoryConfig::default()).unwrap();
        let frame = story.on_step_changed(1).unwrap().unwrap();
        assert_eq!(frame.layout, LayoutKind::ClusteredByCategory);
        assert!(story.entities().iter().all(|e| e.position() == Point::new(350.0, 350.0)));

        story.commit(&frame).unwrap();
        for e in story.entities() {
            assert_eq!(e.position(), frame.positions[&e.id]);
        }
    }

    #[test]
    fn test_advance_and_invalid_step() {
        let mut story = Story::from_csv(CSV, StoryConfig::default()).unwrap();
        assert!(story.advance(2).unwrap().is_some());
        assert!(story.advance(2).unwrap().is_none());
        assert_eq!(story.layout_runs(), 1);

        let err = story.advance(7).unwrap_err();
        assert!(matches!(
            err,
            StoryError::InvalidStep(InvalidStepError { step: 7, num_steps: 3 })
        ));
        assert_eq!(story.current_step(), Some(2));
    }

    #[test]
    fn test_fill_colour() {
        let story = Story::from_csv(CSV, StoryConfig::default()).unwrap();
        let marie = &story.entities()[1];
        assert_eq!(story.fill_colour(marie, &FillRule::Constant(Rgba::NEUTRAL)), Rgba::NEUTRAL);
        // physics is the first category
        assert_eq!(
            story.fill_colour(marie, &FillRule::ByAttribute(GroupKey::Category)),
            Rgba::rgb(0x4e, 0x79, 0xa7)
        );
        // secondary values are not in the category domain
        assert_eq!(
            story.fill_colour(marie, &FillRule::ByAttribute(GroupKey::Secondary)),
            Rgba::NEUTRAL
        );
    }

    #[test]
    fn test_bad_rows_fail_load() {
        let err = Story::from_csv("id,Category,Gender\nx,physics,male\n", StoryConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, StoryError::DataFormat(ref e) if e.row == 1), "{}", err);
    }

    #[test]
    fn test_invalid_config_fails_load() {
        let err = Story::from_csv(CSV, StoryConfig::default().with_radius(0.0)).err().unwrap();
        assert!(matches!(err, StoryError::Config(_)), "{}", err);
    }
}
