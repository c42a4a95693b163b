//! Auto-fit state machine: picks the least aggressive layout that fits one A4 page.
//!
//! # Ladder
//! Three dimensions, each advanced only once every less aggressive one is exhausted:
//!
//! ```text
//! density:     normal → tight → extra-tight
//! typography:  normal → small → tiny            (optional, see AutoFitConfig)
//! scale:       1.0 → max(T / H, floor)
//! ```
//!
//! # Zones
//! With `T` the target height, `ε` the overflow tolerance and `δ` the grow margin, a
//! measurement `H` (multiplied by the current scale, since scale is a post-layout
//! transform) lands in exactly one zone:
//!
//! - `H > T + ε`          → shrink one step
//! - `H < T − δ`          → grow back one step, reverse ladder order
//! - `T − δ ≤ H ≤ T + ε`  → stable, no transition
//!
//! `δ` is much wider than `ε`, so a height hovering around `T` never flips between
//! shrink and grow.
//!
//! A single density or typography step can still move the page by more than `δ + ε`.
//! The engine therefore remembers the most aggressive rung at which the current
//! content overflowed and never grows back into it or anything looser. That memory
//! lives until [`AutoFit::content_changed`] or [`AutoFit::reset`].
//!
//! # Re-entrancy guard
//! Applying a transition restyles the page, and the browser reflows asynchronously.
//! After every transition the engine enters a settling state until `settle` has
//! elapsed; measurements arriving meanwhile are held (last one wins) and evaluated by
//! [`AutoFit::poll`] once the guard releases. At most one transition is in flight.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::tokens::{DensityLevel, LayoutTokens, TypographyLevel};

/// A4 at 96 dpi: 297mm ≈ 1122.5px.
pub const A4_HEIGHT_PX: f32 = 1122.0;
/// A4 at 96 dpi: 210mm ≈ 793.7px.
pub const A4_WIDTH_PX: f32 = 794.0;

/// Scale changes smaller than this are treated as no change.
const SCALE_EPSILON: f32 = 1e-3;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Tunable thresholds. Defaults are empirical starting points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoFitConfig {
    /// `T`: page height the content must fit, in CSS pixels.
    pub target_height_px: f32,
    /// `ε`: overflow ignored before shrinking.
    pub overflow_tolerance_px: f32,
    /// `δ`: free space required before growing back.
    pub grow_margin_px: f32,
    /// Smallest scale the engine will apply.
    pub scale_floor: f32,
    /// How long the guard holds after a transition.
    pub settle: Duration,
    /// Whether the typography ladder participates.
    pub typography_ladder: bool,
}

impl Default for AutoFitConfig {
    fn default() -> Self {
        Self {
            target_height_px: A4_HEIGHT_PX,
            overflow_tolerance_px: 5.0,
            grow_margin_px: 100.0,
            scale_floor: 0.85,
            settle: Duration::from_millis(100),
            typography_ladder: true,
        }
    }
}

impl AutoFitConfig {
    /// Maximum number of consecutive shrink transitions from the expanded state.
    pub fn ladder_len(&self) -> usize {
        let typography = if self.typography_ladder { 2 } else { 0 };
        2 + typography + 1
    }
}

/// Current layout choice plus the last height observed for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutState {
    pub density: DensityLevel,
    pub typography: TypographyLevel,
    pub scale: f32,
    pub measured_height: Option<f32>,
}

impl LayoutState {
    /// Most expanded state: normal density, normal typography, scale 1.0.
    pub fn expanded() -> Self {
        Self {
            density: DensityLevel::Normal,
            typography: TypographyLevel::Normal,
            scale: 1.0,
            measured_height: None,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.density == DensityLevel::Normal
            && self.typography == TypographyLevel::Normal
            && self.scale >= 1.0 - SCALE_EPSILON
    }

    pub fn tokens(&self) -> LayoutTokens {
        LayoutTokens::new(self.density, self.typography, self.scale)
    }
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::expanded()
    }
}

/// One applied ladder step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "dimension", rename_all = "camelCase")]
pub enum Transition {
    Density { from: DensityLevel, to: DensityLevel },
    Typography { from: TypographyLevel, to: TypographyLevel },
    Scale { from: f32, to: f32 },
}

/// Result of feeding one measurement to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Step {
    /// A transition was applied; the guard now holds until the layout settles.
    Applied { transition: Transition },
    /// Height is within the accepting zone.
    Stable,
    /// Overflowing with nothing left to shrink. Accepted as-is.
    Terminal,
    /// Underfull, but fully expanded or the next looser rung is known to overflow.
    Expanded,
    /// Guard held; the measurement is kept and evaluated when the guard releases.
    Deferred,
    /// No measurement (element not mounted). No-op.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Guard {
    Idle,
    Settling {
        until: Instant,
        pending: Option<f32>,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AutoFit {
    config: AutoFitConfig,
    state: LayoutState,
    guard: Guard,
    /// Most aggressive discrete rung seen overflowing with the current content.
    overflow_rung: Option<usize>,
}

impl AutoFit {
    pub fn new(config: AutoFitConfig) -> Self {
        Self {
            config,
            state: LayoutState::expanded(),
            guard: Guard::Idle,
            overflow_rung: None,
        }
    }

    pub fn config(&self) -> &AutoFitConfig {
        &self.config
    }

    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    pub fn tokens(&self) -> LayoutTokens {
        self.state.tokens()
    }

    /// Discards all convergence state. Used when the document or template changes.
    pub fn reset(&mut self) {
        self.state = LayoutState::expanded();
        self.guard = Guard::Idle;
        self.overflow_rung = None;
    }

    /// The content was edited: rungs that overflowed before may fit now.
    /// The current state is kept.
    pub fn content_changed(&mut self) {
        self.overflow_rung = None;
    }

    /// Position on the discrete ladder: 0 for normal/normal, one more per step.
    fn rung(density: DensityLevel, typography: TypographyLevel) -> usize {
        density as usize + typography as usize
    }

    /// True while a transition is waiting for the layout to settle.
    pub fn is_settling(&self, now: Instant) -> bool {
        matches!(self.guard, Guard::Settling { until, .. } if now < until)
    }

    /// True in the most aggressive state: nothing left on any ladder.
    pub fn is_terminal(&self) -> bool {
        let typography_done =
            !self.config.typography_ladder || self.state.typography == TypographyLevel::Tiny;
        self.state.density == DensityLevel::ExtraTight
            && typography_done
            && self.state.scale <= self.config.scale_floor + SCALE_EPSILON
    }

    /// Feeds one measurement event. `None` means the element could not be measured.
    pub fn on_measure(&mut self, height: Option<f32>, now: Instant) -> Step {
        let Some(height) = height.filter(|h| h.is_finite() && *h >= 0.0) else {
            return Step::Unavailable;
        };

        if let Guard::Settling { until, pending } = &mut self.guard {
            if now < *until {
                *pending = Some(height);
                return Step::Deferred;
            }
            self.guard = Guard::Idle;
        }

        self.evaluate(height, now)
    }

    /// Releases an expired guard and evaluates the measurement it held back, if any.
    pub fn poll(&mut self, now: Instant) -> Option<Step> {
        match self.guard {
            Guard::Settling { until, pending } if now >= until => {
                self.guard = Guard::Idle;
                pending.map(|height| self.evaluate(height, now))
            }
            _ => None,
        }
    }

    fn evaluate(&mut self, height: f32, now: Instant) -> Step {
        self.state.measured_height = Some(height);

        let effective = height * self.state.scale;
        let target = self.config.target_height_px;

        let transition = if effective > target + self.config.overflow_tolerance_px {
            let rung = Self::rung(self.state.density, self.state.typography);
            self.overflow_rung = Some(self.overflow_rung.map_or(rung, |seen| seen.max(rung)));
            match self.next_shrink(height) {
                Some(t) => t,
                None => return Step::Terminal,
            }
        } else if effective < target - self.config.grow_margin_px {
            match self.next_grow() {
                Some(t) => t,
                None => return Step::Expanded,
            }
        } else {
            return Step::Stable;
        };

        debug!(
            height,
            effective, target, "auto-fit transition {:?}", transition
        );
        self.apply(transition);
        self.guard = Guard::Settling {
            until: now + self.config.settle,
            pending: None,
        };
        Step::Applied { transition }
    }

    fn next_shrink(&self, height: f32) -> Option<Transition> {
        let s = &self.state;
        if let Some(to) = s.density.tighter() {
            return Some(Transition::Density {
                from: s.density,
                to,
            });
        }
        if self.config.typography_ladder {
            if let Some(to) = s.typography.smaller() {
                return Some(Transition::Typography {
                    from: s.typography,
                    to,
                });
            }
        }
        let fit = (self.config.target_height_px / height)
            .max(self.config.scale_floor)
            .min(1.0);
        if fit < s.scale - SCALE_EPSILON {
            return Some(Transition::Scale {
                from: s.scale,
                to: fit,
            });
        }
        None
    }

    fn next_grow(&self) -> Option<Transition> {
        let s = &self.state;
        if s.scale < 1.0 - SCALE_EPSILON {
            return Some(Transition::Scale {
                from: s.scale,
                to: 1.0,
            });
        }
        let transition = if let Some(to) = s.typography.larger() {
            Transition::Typography {
                from: s.typography,
                to,
            }
        } else {
            let to = s.density.looser()?;
            Transition::Density {
                from: s.density,
                to,
            }
        };
        let target = Self::rung(s.density, s.typography) - 1;
        if self.overflow_rung.is_some_and(|seen| target <= seen) {
            debug!(target, "grow blocked: rung already overflowed with this content");
            return None;
        }
        Some(transition)
    }

    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Density { to, .. } => self.state.density = to,
            Transition::Typography { to, .. } => self.state.typography = to,
            Transition::Scale { to, .. } => self.state.scale = to,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn no_typography(floor: f32) -> AutoFitConfig {
        AutoFitConfig {
            typography_ladder: false,
            scale_floor: floor,
            ..AutoFitConfig::default()
        }
    }

    /// Feeds `height` repeatedly, waiting out the guard between events, until no
    /// transition applies. Returns the transitions taken and the final step.
    fn converge(engine: &mut AutoFit, height: f32, start: Instant) -> (Vec<Transition>, Step) {
        let mut now = start;
        let mut taken = Vec::new();
        for _ in 0..50 {
            match engine.on_measure(Some(height), now) {
                Step::Applied { transition } => taken.push(transition),
                other => return (taken, other),
            }
            now += engine.config().settle;
        }
        panic!("engine did not converge: {taken:?}");
    }

    // ── zones ───────────────────────────────────────────────────────────────

    #[test]
    fn test_stable_zone_is_idempotent() {
        let config = AutoFitConfig::default();
        let t = config.target_height_px;
        for height in [t - config.grow_margin_px, t - 50.0, t, t + config.overflow_tolerance_px] {
            let mut engine = AutoFit::new(config);
            let now = Instant::now();
            for i in 0..10 {
                let step = engine.on_measure(Some(height), now + Duration::from_secs(i));
                assert_eq!(step, Step::Stable, "height {height} must be stable");
            }
            assert_eq!(engine.state().density, DensityLevel::Normal);
        }
    }

    #[test]
    fn test_shrink_and_grow_zones_are_disjoint() {
        let config = AutoFitConfig::default();
        let t = config.target_height_px;
        let mut h = 0.0_f32;
        while h < 2.0 * t {
            let shrink = h > t + config.overflow_tolerance_px;
            let grow = h < t - config.grow_margin_px;
            assert!(!(shrink && grow), "height {h} satisfies both conditions");
            h += 0.5;
        }
    }

    #[test]
    fn test_underfull_expanded_state_does_nothing() {
        let mut engine = AutoFit::new(AutoFitConfig::default());
        assert_eq!(engine.on_measure(Some(400.0), Instant::now()), Step::Expanded);
        assert!(engine.state().is_expanded());
    }

    #[test]
    fn test_unavailable_measurement_is_noop() {
        let mut engine = AutoFit::new(AutoFitConfig::default());
        let now = Instant::now();
        assert_eq!(engine.on_measure(None, now), Step::Unavailable);
        assert_eq!(engine.on_measure(Some(f32::NAN), now), Step::Unavailable);
        assert_eq!(engine.state(), &LayoutState::expanded());
        assert!(!engine.is_settling(now));
    }

    // ── ladder ──────────────────────────────────────────────────────────────

    #[test]
    fn test_overflow_scenario_without_typography_ladder() {
        // 6 experiences × 5 bullets measured at 1400px against A4.
        let mut engine = AutoFit::new(no_typography(0.80));
        let mut now = Instant::now();

        let step = engine.on_measure(Some(1400.0), now);
        assert_eq!(
            step,
            Step::Applied {
                transition: Transition::Density {
                    from: DensityLevel::Normal,
                    to: DensityLevel::Tight
                }
            }
        );

        now += engine.config().settle;
        engine.on_measure(Some(1400.0), now);
        assert_eq!(engine.state().density, DensityLevel::ExtraTight);

        now += engine.config().settle;
        let step = engine.on_measure(Some(1400.0), now);
        let expected = (1122.0_f32 / 1400.0).max(0.80);
        match step {
            Step::Applied {
                transition: Transition::Scale { from, to },
            } => {
                assert_eq!(from, 1.0);
                assert!((to - expected).abs() < 1e-6);
            }
            other => panic!("expected a scale transition, got {other:?}"),
        }

        // Effective height is now T: stable.
        now += engine.config().settle;
        assert_eq!(engine.on_measure(Some(1400.0), now), Step::Stable);
    }

    #[test]
    fn test_typography_ladder_precedes_scale() {
        let mut engine = AutoFit::new(AutoFitConfig::default());
        let (taken, _) = converge(&mut engine, 1250.0, Instant::now());
        let dims: Vec<&str> = taken
            .iter()
            .map(|t| match t {
                Transition::Density { .. } => "density",
                Transition::Typography { .. } => "typography",
                Transition::Scale { .. } => "scale",
            })
            .collect();
        assert_eq!(dims, vec!["density", "density", "typography", "typography", "scale"]);
    }

    #[test]
    fn test_constant_height_converges_within_ladder_length() {
        for config in [AutoFitConfig::default(), no_typography(0.85)] {
            let mut h = 0.0_f32;
            while h < 3000.0 {
                let mut engine = AutoFit::new(config);
                let (taken, last) = converge(&mut engine, h, Instant::now());
                assert!(
                    taken.len() <= config.ladder_len(),
                    "height {h}: {} transitions",
                    taken.len()
                );
                assert!(matches!(last, Step::Stable | Step::Terminal | Step::Expanded));
                h += 37.0;
            }
        }
    }

    #[test]
    fn test_terminal_state_accepts_overflow() {
        let mut engine = AutoFit::new(AutoFitConfig::default());
        // So tall that even the floor scale overflows.
        let (taken, last) = converge(&mut engine, 5000.0, Instant::now());
        assert_eq!(taken.len(), 5);
        assert_eq!(last, Step::Terminal);
        assert!(engine.is_terminal());
        assert!((engine.state().scale - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_grow_back_reverses_ladder_one_step_at_a_time() {
        let mut engine = AutoFit::new(AutoFitConfig::default());
        let mut now = Instant::now();
        converge(&mut engine, 5000.0, now);
        now += Duration::from_secs(1);

        // Content shrank dramatically (sections deleted).
        engine.content_changed();
        let mut order = Vec::new();
        for _ in 0..10 {
            match engine.on_measure(Some(300.0), now) {
                Step::Applied { transition } => order.push(transition),
                Step::Expanded => break,
                other => panic!("unexpected {other:?}"),
            }
            now += engine.config().settle;
        }
        assert!(matches!(order[0], Transition::Scale { to, .. } if to == 1.0));
        assert!(matches!(
            order[1],
            Transition::Typography {
                to: TypographyLevel::Small,
                ..
            }
        ));
        assert!(matches!(
            order.last(),
            Some(Transition::Density {
                to: DensityLevel::Normal,
                ..
            })
        ));
        assert_eq!(order.len(), 5);
        assert!(engine.state().is_expanded());
    }

    #[test]
    fn test_height_responding_to_layout_does_not_oscillate() {
        // Height reacts to density/typography the way a real page does.
        fn rendered(state: &LayoutState) -> f32 {
            let density = match state.density {
                DensityLevel::Normal => 1.0,
                DensityLevel::Tight => 0.93,
                DensityLevel::ExtraTight => 0.88,
            };
            1200.0 * density * state.typography.base_font_px() / 14.0
        }

        let mut engine = AutoFit::new(AutoFitConfig::default());
        let mut now = Instant::now();
        let mut transitions = 0;
        for _ in 0..40 {
            let h = rendered(engine.state());
            if let Step::Applied { .. } = engine.on_measure(Some(h), now) {
                transitions += 1;
            }
            now += engine.config().settle;
        }
        assert_eq!(transitions, 1, "one density step brings 1200px into the stable zone");
        assert_eq!(engine.state().density, DensityLevel::Tight);
    }

    #[test]
    fn test_step_larger_than_stable_zone_does_not_oscillate() {
        // One density step moves the page by 200px, more than δ + ε.
        fn rendered(state: &LayoutState) -> f32 {
            match state.density {
                DensityLevel::Normal => 1200.0,
                DensityLevel::Tight => 1000.0,
                DensityLevel::ExtraTight => 950.0,
            }
        }

        let mut engine = AutoFit::new(AutoFitConfig::default());
        let mut now = Instant::now();
        let mut taken = Vec::new();
        for _ in 0..12 {
            let h = rendered(engine.state());
            if let Step::Applied { transition } = engine.on_measure(Some(h), now) {
                taken.push(transition);
            }
            now += Duration::from_millis(150);
        }
        assert_eq!(
            taken,
            vec![Transition::Density {
                from: DensityLevel::Normal,
                to: DensityLevel::Tight
            }]
        );
        assert_eq!(engine.on_measure(Some(1000.0), now), Step::Expanded);
    }

    #[test]
    fn test_content_change_allows_growing_into_overflowed_rung() {
        let mut engine = AutoFit::new(AutoFitConfig::default());
        let mut now = Instant::now();
        engine.on_measure(Some(1200.0), now);
        now += engine.config().settle;
        assert_eq!(engine.on_measure(Some(1000.0), now), Step::Expanded);

        // Bullets deleted: normal density may fit now.
        engine.content_changed();
        let step = engine.on_measure(Some(700.0), now);
        assert!(matches!(
            step,
            Step::Applied {
                transition: Transition::Density {
                    to: DensityLevel::Normal,
                    ..
                }
            }
        ));
    }

    #[test]
    fn test_reset_forgets_overflowed_rungs() {
        let mut engine = AutoFit::new(AutoFitConfig::default());
        let now = Instant::now();
        engine.on_measure(Some(1200.0), now);
        engine.reset();
        assert_eq!(engine.overflow_rung, None);
    }

    // ── guard ───────────────────────────────────────────────────────────────

    #[test]
    fn test_guard_defers_measurements_until_settled() {
        let mut engine = AutoFit::new(AutoFitConfig::default());
        let start = Instant::now();
        assert!(matches!(engine.on_measure(Some(1400.0), start), Step::Applied { .. }));
        assert!(engine.is_settling(start));

        // Reflow triggered by our own restyle arrives inside the settle window.
        let during = start + Duration::from_millis(10);
        assert_eq!(engine.on_measure(Some(1300.0), during), Step::Deferred);
        assert_eq!(engine.on_measure(Some(1250.0), during), Step::Deferred);
        assert_eq!(engine.state().density, DensityLevel::Tight);

        // Nothing released before the deadline.
        assert_eq!(engine.poll(during), None);

        // After settling, the last held measurement drives exactly one more step.
        let after = start + engine.config().settle;
        let step = engine.poll(after).expect("held measurement");
        assert!(matches!(
            step,
            Step::Applied {
                transition: Transition::Density {
                    to: DensityLevel::ExtraTight,
                    ..
                }
            }
        ));
        assert_eq!(engine.state().measured_height, Some(1250.0));
    }

    #[test]
    fn test_reset_restores_expanded_state() {
        let mut engine = AutoFit::new(AutoFitConfig::default());
        let now = Instant::now();
        engine.on_measure(Some(2000.0), now);
        engine.reset();
        assert_eq!(engine.state(), &LayoutState::expanded());
        assert!(!engine.is_settling(now));
        assert_eq!(engine.poll(now + Duration::from_secs(1)), None);
    }
}
