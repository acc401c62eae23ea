/// Dot transition animator.
///
/// Turns two snapshots of the dot field into an animated one based on
/// elapsed time.
/// - Step transition: position, radius and fill interpolated with cubic
///   in-out easing over a fixed duration
/// - Entry: radii grow from zero, each dot after its own random delay
/// - Labels: opacity fades towards the target visibility
use std::collections::BTreeMap;

use rand::Rng;

use crate::data::EntityId;
use crate::layout::Point;
use crate::render::color::Rgba;

/// Drawable state of one dot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotState {
    pub position: Point,
    pub radius: f64,
    pub fill: Rgba,
}

impl DotState {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            radius: self.radius + (other.radius - self.radius) * t,
            fill: self.fill.lerp(other.fill, t as f32),
        }
    }
}

/// Cubic in-out easing on `[0, 1]`.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// Offset of the `index`-th dot on a phyllotaxis spiral.
///
/// Dots that share a layout position (the initial stack) are drawn spread out
/// by this offset so the stack reads as a cloud.
pub fn initial_spread(index: usize) -> Point {
    const INITIAL_RADIUS: f64 = 10.0;
    let angle = std::f64::consts::PI * (3.0 - 5f64.sqrt());
    let r = INITIAL_RADIUS * (0.5 + index as f64).sqrt();
    let a = index as f64 * angle;
    Point::new(r * a.cos(), r * a.sin())
}

#[derive(Debug, Clone)]
struct Track {
    from: DotState,
    to: DotState,
    delay_ms: f64,
}

/// A running transition between two dot snapshots plus the label fade.
#[derive(Debug, Clone)]
pub struct Transition {
    tracks: BTreeMap<EntityId, Track>,
    duration_ms: f64,
    label_from: f32,
    label_to: f32,
}

impl Transition {
    /// Move every dot from its state in `from` to its state in `to`.
    ///
    /// Dots missing from `from` start at their target with zero radius.
    pub fn new(
        from: &BTreeMap<EntityId, DotState>,
        to: BTreeMap<EntityId, DotState>,
        duration_ms: f64,
    ) -> Self {
        let tracks = to
            .into_iter()
            .map(|(id, target)| {
                let start = from.get(&id).copied().unwrap_or(DotState {
                    radius: 0.0,
                    ..target
                });
                (
                    id,
                    Track {
                        from: start,
                        to: target,
                        delay_ms: 0.0,
                    },
                )
            })
            .collect();
        Self {
            tracks,
            duration_ms: duration_ms.max(0.0),
            label_from: 0.0,
            label_to: 0.0,
        }
    }

    /// Grow every dot from radius zero, each starting after a delay drawn
    /// from `[0, jitter_ms)`.
    pub fn entry<R: Rng + ?Sized>(
        targets: BTreeMap<EntityId, DotState>,
        duration_ms: f64,
        jitter_ms: f64,
        rng: &mut R,
    ) -> Self {
        let mut transition = Self::new(&BTreeMap::new(), targets, duration_ms);
        if jitter_ms > 0.0 {
            for track in transition.tracks.values_mut() {
                track.delay_ms = rng.gen_range(0.0..jitter_ms);
            }
        }
        transition
    }

    /// Fade labels from `from` to `to` opacity alongside the dots.
    pub fn with_labels(mut self, from: f32, to: f32) -> Self {
        self.label_from = from.clamp(0.0, 1.0);
        self.label_to = to.clamp(0.0, 1.0);
        self
    }

    fn progress(&self, elapsed_ms: f64, delay_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return if elapsed_ms >= delay_ms { 1.0 } else { 0.0 };
        }
        ease_cubic_in_out((elapsed_ms - delay_ms) / self.duration_ms)
    }

    /// Dot states at `elapsed_ms` since the transition started.
    pub fn sample(&self, elapsed_ms: f64) -> BTreeMap<EntityId, DotState> {
        self.tracks
            .iter()
            .map(|(&id, track)| {
                let t = self.progress(elapsed_ms, track.delay_ms);
                (id, track.from.lerp(&track.to, t))
            })
            .collect()
    }

    pub fn label_opacity(&self, elapsed_ms: f64) -> f32 {
        let t = self.progress(elapsed_ms, 0.0) as f32;
        self.label_from + (self.label_to - self.label_from) * t
    }

    /// Final dot states.
    pub fn targets(&self) -> BTreeMap<EntityId, DotState> {
        self.tracks.iter().map(|(&id, track)| (id, track.to)).collect()
    }

    pub fn is_finished(&self, elapsed_ms: f64) -> bool {
        let max_delay = self
            .tracks
            .values()
            .map(|t| t.delay_ms)
            .fold(0.0, f64::max);
        elapsed_ms >= max_delay + self.duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dot(x: f64, y: f64, radius: f64, fill: Rgba) -> DotState {
        DotState {
            position: Point::new(x, y),
            radius,
            fill,
        }
    }

    #[test]
    fn test_easing_endpoints() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!((ease_cubic_in_out(0.5) - 0.5).abs() < 1e-12);
        assert!(ease_cubic_in_out(0.25) < 0.25, "slow start");
        assert_eq!(ease_cubic_in_out(-3.0), 0.0);
        assert_eq!(ease_cubic_in_out(7.0), 1.0);
    }

    #[test]
    fn test_transition_interpolates() {
        let from = BTreeMap::from([(0, dot(0.0, 0.0, 6.0, Rgba::BLACK))]);
        let to = BTreeMap::from([(0, dot(100.0, 50.0, 6.0, Rgba::WHITE))]);
        let transition = Transition::new(&from, to.clone(), 750.0);

        assert_eq!(transition.sample(0.0)[&0], from[&0]);
        let mid = transition.sample(375.0)[&0];
        assert!((mid.position.x - 50.0).abs() < 1e-9, "{:?}", mid);
        assert!((mid.position.y - 25.0).abs() < 1e-9, "{:?}", mid);
        assert_eq!(transition.sample(750.0)[&0], to[&0]);
        assert_eq!(transition.sample(10_000.0)[&0], to[&0]);
        assert!(transition.is_finished(750.0));
        assert!(!transition.is_finished(700.0));
    }

    #[test]
    fn test_new_dots_grow_from_zero() {
        let to = BTreeMap::from([(3, dot(10.0, 10.0, 6.0, Rgba::NEUTRAL))]);
        let transition = Transition::new(&BTreeMap::new(), to, 100.0);
        let start = transition.sample(0.0)[&3];
        assert_eq!(start.radius, 0.0);
        assert_eq!(start.position, Point::new(10.0, 10.0));
    }

    #[test]
    fn test_entry_delays_are_bounded() {
        let targets: BTreeMap<_, _> = (0..50)
            .map(|id| (id, dot(350.0, 350.0, 6.0, Rgba::NEUTRAL)))
            .collect();
        let mut rng = StdRng::seed_from_u64(7);
        let transition = Transition::entry(targets, 750.0, 500.0, &mut rng);

        assert!(transition.sample(0.0).values().all(|d| d.radius == 0.0));
        assert!(transition.is_finished(1250.0));
        assert!(transition.sample(1250.0).values().all(|d| d.radius == 6.0));
        for track in transition.tracks.values() {
            assert!((0.0..500.0).contains(&track.delay_ms), "delay {}", track.delay_ms);
        }
    }

    #[test]
    fn test_label_fade() {
        let transition = Transition::new(&BTreeMap::new(), BTreeMap::new(), 750.0).with_labels(0.0, 1.0);
        assert_eq!(transition.label_opacity(0.0), 0.0);
        assert_eq!(transition.label_opacity(750.0), 1.0);

        let hide = Transition::new(&BTreeMap::new(), BTreeMap::new(), 750.0).with_labels(1.0, 0.0);
        assert!((hide.label_opacity(375.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_duration_jumps() {
        let from = BTreeMap::from([(0, dot(0.0, 0.0, 6.0, Rgba::BLACK))]);
        let to = BTreeMap::from([(0, dot(5.0, 5.0, 6.0, Rgba::BLACK))]);
        let transition = Transition::new(&from, to.clone(), 0.0);
        assert_eq!(transition.sample(0.0)[&0], to[&0]);
    }

    #[test]
    fn test_initial_spread_is_a_spiral() {
        let first = initial_spread(0);
        assert!((first.x.hypot(first.y) - 10.0 * 0.5f64.sqrt()).abs() < 1e-9);
        let far = initial_spread(99);
        assert!(far.x.hypot(far.y) > first.x.hypot(first.y));
    }
}
