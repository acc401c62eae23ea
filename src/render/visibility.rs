//! Section visibility detector.
//!
//! Reports narrative sections as they become visible enough (by default,
//! entirely) inside the viewport. Each report is a step index for the
//! [`crate::engine::step::StepController`].

/// Vertical extent of a section or the viewport, in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub top: f32,
    pub bottom: f32,
}

impl Span {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }

    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }

    /// Fraction of `self` inside `viewport`.
    pub fn visible_ratio(&self, viewport: &Span) -> f32 {
        let overlap = (self.bottom.min(viewport.bottom) - self.top.max(viewport.top)).max(0.0);
        let height = self.height();
        if height > 0.0 {
            overlap / height
        } else if self.top >= viewport.top && self.top <= viewport.bottom {
            1.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct VisibilityDetector {
    threshold: f32,
    visible: Vec<bool>,
}

impl Default for VisibilityDetector {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl VisibilityDetector {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            visible: Vec::new(),
        }
    }

    /// Compare the sections against the viewport and return the indices
    /// that crossed the threshold since the last call, in section order.
    pub fn update(&mut self, sections: &[Span], viewport: Span) -> Vec<usize> {
        if self.visible.len() != sections.len() {
            self.visible = vec![false; sections.len()];
        }
        let mut entered = Vec::new();
        for (index, section) in sections.iter().enumerate() {
            let now = section.visible_ratio(&viewport) >= self.threshold;
            if now && !self.visible[index] {
                entered.push(index);
            }
            self.visible[index] = now;
        }
        entered
    }

    pub fn reset(&mut self) {
        self.visible.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> Vec<Span> {
        vec![
            Span::new(0.0, 300.0),
            Span::new(400.0, 700.0),
            Span::new(800.0, 1100.0),
        ]
    }

    #[test]
    fn test_reports_sections_once() {
        let mut detector = VisibilityDetector::default();
        assert_eq!(detector.update(&sections(), Span::new(0.0, 500.0)), vec![0]);
        assert_eq!(detector.update(&sections(), Span::new(10.0, 510.0)), Vec::<usize>::new());
        assert_eq!(detector.update(&sections(), Span::new(350.0, 850.0)), vec![1]);
        assert_eq!(detector.update(&sections(), Span::new(650.0, 1150.0)), vec![2]);
        // scrolling back up
        assert_eq!(detector.update(&sections(), Span::new(0.0, 750.0)), vec![0, 1]);
    }

    #[test]
    fn test_partial_visibility_is_not_enough() {
        let mut detector = VisibilityDetector::default();
        assert!(detector.update(&sections(), Span::new(100.0, 600.0)).is_empty());

        let mut lenient = VisibilityDetector::new(0.5);
        assert_eq!(lenient.update(&sections(), Span::new(100.0, 600.0)), vec![0, 1]);
    }

    #[test]
    fn test_ratio_edges() {
        let viewport = Span::new(0.0, 100.0);
        assert_eq!(Span::new(0.0, 100.0).visible_ratio(&viewport), 1.0);
        assert_eq!(Span::new(50.0, 150.0).visible_ratio(&viewport), 0.5);
        assert_eq!(Span::new(200.0, 300.0).visible_ratio(&viewport), 0.0);
        assert_eq!(Span::new(40.0, 40.0).visible_ratio(&viewport), 1.0);
    }

    #[test]
    fn test_section_count_change_resets() {
        let mut detector = VisibilityDetector::default();
        detector.update(&sections(), Span::new(0.0, 500.0));
        let fewer = &sections()[..1];
        assert_eq!(detector.update(fewer, Span::new(0.0, 500.0)), vec![0]);
    }
}
