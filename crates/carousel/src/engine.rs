use foundation::{Epoch, Millis, TimerId};
use runtime::{EventBus, Stamped, Timers};
use serde::{Deserialize, Serialize};

use crate::config::{CarouselConfig, EdgeRule, SlideStage};
use crate::direction::{Motion, SlideDirection, slide_direction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CarouselState {
    pub current_index: usize,
    pub is_animating: bool,
    pub slide_direction: SlideDirection,
    /// Live horizontal drag offset in pixels; zero when not dragging.
    pub drag_delta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselTimer {
    Slide { epoch: Epoch, stage: SlideStage },
    AutoAdvance { generation: Epoch },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
}

/// A user or host event routed to a carousel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "input", rename_all = "kebab-case")]
pub enum Input {
    Next,
    Previous,
    GoTo { index: usize },
    /// Arrow button.
    Arrow { motion: Motion },
    GestureStart { x: f64 },
    GestureMove { x: f64 },
    GestureEnd { x: f64 },
    Wheel { dx: f64, dy: f64 },
    Key { key: Key },
    PointerEnter,
    PointerLeave,
    ClickItem,
    Resize { width: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "kebab-case")]
pub enum CarouselEffect {
    SlideStarted {
        from: usize,
        to: usize,
        direction: SlideDirection,
    },
    SlideStage {
        index: usize,
        stage: SlideStage,
        enter_from: SlideDirection,
    },
    SlideFinished {
        index: usize,
    },
    DragOffset {
        delta: f64,
    },
    SnapBack {
        index: usize,
    },
    HideSwipeHint,
    Reset {
        count: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    start_x: f64,
    last_x: f64,
}

/// One carousel instance.
///
/// Navigation is mutually exclusive: while a slide is animating every
/// request is dropped, never queued.
#[derive(Debug)]
pub struct CarouselEngine {
    name: &'static str,
    config: CarouselConfig,
    count: usize,
    width: f64,
    state: CarouselState,
    drag: Option<Drag>,
    hovered: bool,
    slide_epoch: Epoch,
    slide_timers: Vec<TimerId>,
    auto_generation: Epoch,
    auto_timer: Option<TimerId>,
    hint_visible: bool,
    effects: EventBus<CarouselEffect>,
}

impl CarouselEngine {
    pub fn new(name: &'static str, config: CarouselConfig, count: usize) -> Self {
        let hint_visible = config.swipe_hint;
        Self {
            name,
            config,
            count,
            width: 0.0,
            state: CarouselState::default(),
            drag: None,
            hovered: false,
            slide_epoch: Epoch::default(),
            slide_timers: Vec::new(),
            auto_generation: Epoch::default(),
            auto_timer: None,
            hint_visible,
            effects: EventBus::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    pub fn state(&self) -> CarouselState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_animating(&self) -> bool {
        self.state.is_animating
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn hint_visible(&self) -> bool {
        self.hint_visible
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Visible width in pixels, used by fractional swipe thresholds.
    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    pub fn effects(&self) -> &EventBus<CarouselEffect> {
        &self.effects
    }

    pub fn drain_effects(&mut self) -> Vec<Stamped<CarouselEffect>> {
        self.effects.drain()
    }

    /// Routes `input` to the matching operation. Returns whether the current
    /// index changed.
    pub fn handle(
        &mut self,
        input: Input,
        now: Millis,
        timers: &mut impl Timers<CarouselTimer>,
    ) -> bool {
        match input {
            Input::Next => self.next(now, timers),
            Input::Previous => self.previous(now, timers),
            Input::GoTo { index } => self.go_to(index, now, timers),
            Input::Arrow { motion } => self.step(motion, now, timers),
            Input::GestureStart { x } => {
                self.gesture_start(x);
                false
            }
            Input::GestureMove { x } => {
                self.gesture_move(x, now);
                false
            }
            Input::GestureEnd { x } => self.gesture_end(x, now, timers),
            Input::Wheel { dx, dy } => self.wheel(dx, dy, now, timers),
            Input::Key { key } => self.key(key, now, timers),
            Input::PointerEnter => {
                self.pointer_enter(timers);
                false
            }
            Input::PointerLeave => {
                let before = self.state.current_index;
                self.pointer_leave(now, timers);
                self.state.current_index != before
            }
            Input::ClickItem => self.click_item(now, timers),
            Input::Resize { width } => {
                self.set_width(width);
                false
            }
        }
    }

    /// Ring move to the following item.
    pub fn next(&mut self, now: Millis, timers: &mut impl Timers<CarouselTimer>) -> bool {
        if self.count == 0 {
            return false;
        }
        let old = self.state.current_index;
        let new = (old + 1) % self.count;
        self.navigate(new, new < old, now, timers)
    }

    /// Ring move to the preceding item.
    pub fn previous(&mut self, now: Millis, timers: &mut impl Timers<CarouselTimer>) -> bool {
        if self.count == 0 {
            return false;
        }
        let old = self.state.current_index;
        let new = (old + self.count - 1) % self.count;
        self.navigate(new, new > old, now, timers)
    }

    pub fn go_to(
        &mut self,
        index: usize,
        now: Millis,
        timers: &mut impl Timers<CarouselTimer>,
    ) -> bool {
        if index >= self.count {
            tracing::warn!(carousel = self.name, index, count = self.count, "index out of range");
            return false;
        }
        self.navigate(index, false, now, timers)
    }

    /// Directional input (arrows, swipes, keys, wheel) under the instance's
    /// edge rule.
    pub fn step(
        &mut self,
        motion: Motion,
        now: Millis,
        timers: &mut impl Timers<CarouselTimer>,
    ) -> bool {
        match (self.config.edge, motion) {
            (EdgeRule::Wrap, Motion::Forward) => self.next(now, timers),
            (EdgeRule::Wrap, Motion::Backward) => self.previous(now, timers),
            (EdgeRule::Clamp, Motion::Forward) => {
                let i = self.state.current_index;
                i + 1 < self.count && self.navigate(i + 1, false, now, timers)
            }
            (EdgeRule::Clamp, Motion::Backward) => {
                let i = self.state.current_index;
                i > 0 && self.navigate(i - 1, false, now, timers)
            }
        }
    }

    /// Pointer or touch down. Rejected while a slide is animating.
    pub fn gesture_start(&mut self, x: f64) -> bool {
        if self.state.is_animating || self.count == 0 {
            return false;
        }
        self.drag = Some(Drag {
            start_x: x,
            last_x: x,
        });
        self.state.drag_delta = 0.0;
        true
    }

    pub fn gesture_move(&mut self, x: f64, now: Millis) {
        if self.state.is_animating {
            return;
        }
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.last_x = x;
        let delta = x - drag.start_x;
        self.state.drag_delta = delta;
        self.effects.emit(now, CarouselEffect::DragOffset { delta });
    }

    /// Release. Commits a move when the displacement exceeds the threshold,
    /// otherwise snaps back. Returns whether the index changed.
    pub fn gesture_end(
        &mut self,
        x: f64,
        now: Millis,
        timers: &mut impl Timers<CarouselTimer>,
    ) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        self.state.drag_delta = 0.0;
        let delta = x - drag.start_x;
        let threshold = self.config.threshold.resolve(self.width);
        let measured = self.width > 0.0 || !self.config.threshold.needs_width();
        if !measured {
            tracing::warn!(carousel = self.name, "release before width is known, snapping back");
        }
        if measured && delta.abs() > threshold {
            let motion = if (delta > 0.0) == self.config.swipe_right_is_next {
                Motion::Forward
            } else {
                Motion::Backward
            };
            if self.step(motion, now, timers) {
                return true;
            }
        }
        self.effects.emit(
            now,
            CarouselEffect::SnapBack {
                index: self.state.current_index,
            },
        );
        false
    }

    pub fn wheel(
        &mut self,
        dx: f64,
        dy: f64,
        now: Millis,
        timers: &mut impl Timers<CarouselTimer>,
    ) -> bool {
        let Some(wheel) = self.config.wheel else {
            return false;
        };
        if dx.abs() <= wheel.min_dx || dx.abs() <= dy.abs() {
            return false;
        }
        let motion = if dx > 0.0 {
            Motion::Forward
        } else {
            Motion::Backward
        };
        self.step(motion, now, timers)
    }

    /// Arrow keys, only while the pointer is over the carousel.
    pub fn key(&mut self, key: Key, now: Millis, timers: &mut impl Timers<CarouselTimer>) -> bool {
        if !self.hovered {
            return false;
        }
        let motion = match key {
            Key::ArrowLeft => Motion::Backward,
            Key::ArrowRight => Motion::Forward,
        };
        self.step(motion, now, timers)
    }

    pub fn click_item(&mut self, now: Millis, timers: &mut impl Timers<CarouselTimer>) -> bool {
        if !self.config.click_advances || self.drag.is_some() {
            return false;
        }
        self.next(now, timers)
    }

    /// Pointer entered the hit region: pauses auto-advance.
    pub fn pointer_enter(&mut self, timers: &mut impl Timers<CarouselTimer>) {
        self.hovered = true;
        if let Some(id) = self.auto_timer.take() {
            timers.cancel(id);
        }
        self.auto_generation.bump();
    }

    /// Pointer left the hit region: ends any drag and resumes auto-advance.
    pub fn pointer_leave(&mut self, now: Millis, timers: &mut impl Timers<CarouselTimer>) {
        self.hovered = false;
        if let Some(drag) = self.drag {
            self.gesture_end(drag.last_x, now, timers);
        }
        self.start_auto_advance(now, timers);
    }

    /// Arms the recurring auto-advance tick if this instance has one.
    pub fn start_auto_advance(&mut self, now: Millis, timers: &mut impl Timers<CarouselTimer>) {
        let Some(interval) = self.config.auto_advance else {
            return;
        };
        if self.hovered || self.auto_timer.is_some() {
            return;
        }
        let generation = self.auto_generation;
        self.auto_timer =
            Some(timers.schedule(now, interval, CarouselTimer::AutoAdvance { generation }));
    }

    /// Replaces the item list, e.g. after a category switch. Any in-flight
    /// slide is canceled and the index returns to 0.
    pub fn reset(&mut self, count: usize, now: Millis, timers: &mut impl Timers<CarouselTimer>) {
        for id in self.slide_timers.drain(..) {
            timers.cancel(id);
        }
        self.slide_epoch.bump();
        self.count = count;
        self.state = CarouselState::default();
        self.drag = None;
        self.effects.emit(now, CarouselEffect::Reset { count });
    }

    /// Runs a due timer. `now` is the timer's own deadline.
    pub fn fire(&mut self, now: Millis, timer: CarouselTimer, timers: &mut impl Timers<CarouselTimer>) {
        match timer {
            CarouselTimer::Slide { epoch, stage } => {
                if epoch != self.slide_epoch {
                    tracing::warn!(carousel = self.name, ?stage, "discarding stale slide callback");
                    return;
                }
                self.finish_stage(stage, now);
            }
            CarouselTimer::AutoAdvance { generation } => {
                if generation != self.auto_generation {
                    tracing::debug!(carousel = self.name, "auto-advance tick superseded");
                    return;
                }
                self.auto_timer = None;
                if self.drag.is_none() && !self.state.is_animating {
                    self.next(now, timers);
                }
                self.start_auto_advance(now, timers);
            }
        }
    }

    fn finish_stage(&mut self, stage: SlideStage, now: Millis) {
        let index = self.state.current_index;
        match stage {
            SlideStage::Settle | SlideStage::Enter => self.effects.emit(
                now,
                CarouselEffect::SlideStage {
                    index,
                    stage,
                    enter_from: self.state.slide_direction.enter_side(),
                },
            ),
            SlideStage::Done => {
                self.slide_timers.clear();
                self.state.is_animating = false;
                self.state.slide_direction = SlideDirection::None;
                self.effects.emit(now, CarouselEffect::SlideFinished { index });
            }
        }
    }

    fn navigate(
        &mut self,
        new: usize,
        wrapped: bool,
        now: Millis,
        timers: &mut impl Timers<CarouselTimer>,
    ) -> bool {
        if self.state.is_animating {
            tracing::debug!(carousel = self.name, "navigation ignored while animating");
            return false;
        }
        let old = self.state.current_index;
        if new == old {
            return false;
        }
        let direction = slide_direction(old, new, wrapped, self.config.forward_exit);
        self.state.current_index = new;
        self.state.is_animating = true;
        self.state.slide_direction = direction;

        let epoch = self.slide_epoch;
        self.slide_timers = self
            .config
            .timing
            .plan()
            .schedule(now, timers, |stage| CarouselTimer::Slide { epoch, stage });

        self.effects.emit(
            now,
            CarouselEffect::SlideStarted {
                from: old,
                to: new,
                direction,
            },
        );
        if self.hint_visible {
            self.hint_visible = false;
            self.effects.emit(now, CarouselEffect::HideSwipeHint);
        }
        tracing::debug!(carousel = self.name, from = old, to = new, ?direction, "slide");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{CarouselEffect, CarouselEngine, CarouselTimer, Key};
    use crate::config::{CarouselConfig, SlideStage};
    use crate::direction::{Motion, SlideDirection};
    use foundation::{Epoch, Millis};
    use pretty_assertions::assert_eq;
    use runtime::Timeline;

    struct Harness {
        engine: CarouselEngine,
        timeline: Timeline<CarouselTimer>,
        now: u64,
    }

    impl Harness {
        fn showcase(count: usize) -> Self {
            Self::with(CarouselEngine::new("showcase", CarouselConfig::showcase(), count))
        }

        fn deck(count: usize) -> Self {
            let mut engine = CarouselEngine::new("deck", CarouselConfig::card_deck(), count);
            engine.set_width(400.0);
            Self::with(engine)
        }

        fn with(engine: CarouselEngine) -> Self {
            Self {
                engine,
                timeline: Timeline::new(),
                now: 0,
            }
        }

        fn at(&self) -> Millis {
            Millis(self.now)
        }

        fn advance(&mut self, ms: u64) {
            self.now += ms;
            while let Some(due) = self.timeline.pop_due(Millis(self.now)) {
                self.engine.fire(due.deadline, due.payload, &mut self.timeline);
            }
        }

        fn next(&mut self) -> bool {
            let now = self.at();
            self.engine.next(now, &mut self.timeline)
        }

        fn drag(&mut self, from: f64, to: f64) -> bool {
            let now = self.at();
            assert!(self.engine.gesture_start(from));
            self.engine.gesture_move((from + to) / 2.0, now);
            self.engine.gesture_move(to, now);
            self.engine.gesture_end(to, now, &mut self.timeline)
        }
    }

    #[test]
    fn full_lap_returns_to_start() {
        let mut h = Harness::showcase(4);
        let now = h.at();
        assert!(!h.engine.go_to(0, now, &mut h.timeline));

        let mut visited = Vec::new();
        for _ in 0..4 {
            assert!(h.next());
            visited.push((h.engine.current_index(), h.engine.state().slide_direction));
            h.advance(1150);
            assert!(!h.engine.is_animating());
        }
        assert_eq!(
            visited,
            vec![
                (1, SlideDirection::Right),
                (2, SlideDirection::Right),
                (3, SlideDirection::Right),
                (0, SlideDirection::Right),
            ]
        );
    }

    #[test]
    fn navigation_while_animating_is_dropped() {
        let mut h = Harness::showcase(4);
        assert!(h.next());
        h.advance(1149);
        assert!(h.engine.is_animating());
        assert!(!h.next());
        let now = h.at();
        assert!(!h.engine.previous(now, &mut h.timeline));
        assert!(!h.engine.go_to(3, now, &mut h.timeline));
        assert_eq!(h.engine.current_index(), 1);
        h.advance(1);
        assert!(!h.engine.is_animating());
        assert!(h.next());
    }

    #[test]
    fn staged_slide_emits_each_stage() {
        let mut h = Harness::showcase(3);
        h.next();
        h.advance(2000);
        let stamped: Vec<_> = h
            .engine
            .effects()
            .events()
            .iter()
            .map(|s| (s.at, s.event.clone()))
            .collect();
        assert_eq!(
            stamped,
            vec![
                (
                    Millis(0),
                    CarouselEffect::SlideStarted {
                        from: 0,
                        to: 1,
                        direction: SlideDirection::Right
                    }
                ),
                (
                    Millis(600),
                    CarouselEffect::SlideStage {
                        index: 1,
                        stage: crate::config::SlideStage::Settle,
                        enter_from: SlideDirection::Left
                    }
                ),
                (
                    Millis(650),
                    CarouselEffect::SlideStage {
                        index: 1,
                        stage: crate::config::SlideStage::Enter,
                        enter_from: SlideDirection::Left
                    }
                ),
                (Millis(1150), CarouselEffect::SlideFinished { index: 1 }),
            ]
        );
    }

    #[test]
    fn previous_wraps_from_first_item() {
        let mut h = Harness::showcase(4);
        let now = h.at();
        assert!(h.engine.previous(now, &mut h.timeline));
        assert_eq!(h.engine.current_index(), 3);
        assert_eq!(h.engine.state().slide_direction, SlideDirection::Left);
    }

    #[test]
    fn short_drag_snaps_back() {
        let mut h = Harness::deck(5);
        // threshold is 15% of 400px
        assert!(!h.drag(200.0, 150.0));
        assert_eq!(h.engine.current_index(), 0);
        assert_eq!(h.engine.state().drag_delta, 0.0);
        assert!(matches!(
            h.engine.effects().iter().last(),
            Some(CarouselEffect::SnapBack { index: 0 })
        ));
    }

    #[test]
    fn fractional_threshold_waits_for_a_width() {
        let mut h = Harness::with(CarouselEngine::new("deck", CarouselConfig::card_deck(), 4));
        // 1px would pass 15% of a zero width
        assert!(!h.drag(200.0, 199.0));
        assert!(!h.drag(400.0, 0.0));
        assert_eq!(h.engine.current_index(), 0);
        assert!(!h.engine.is_animating());

        h.engine.set_width(400.0);
        assert!(h.drag(200.0, 139.0));
        assert_eq!(h.engine.current_index(), 1);
    }

    #[test]
    fn stale_slide_callback_changes_nothing() {
        let mut h = Harness::showcase(4);
        let old = h.engine.slide_epoch;
        assert!(h.next());
        h.engine.slide_epoch.bump();
        let before = h.engine.state();
        let emitted = h.engine.effects().len();
        let pending = h.timeline.len();

        for stage in [SlideStage::Settle, SlideStage::Enter, SlideStage::Done] {
            h.engine.fire(
                Millis(1150),
                CarouselTimer::Slide { epoch: old, stage },
                &mut h.timeline,
            );
        }
        assert_eq!(h.engine.state(), before);
        assert!(h.engine.is_animating());
        assert_eq!(h.engine.effects().len(), emitted);
        assert_eq!(h.timeline.len(), pending);
    }

    #[test]
    fn stale_auto_advance_tick_changes_nothing() {
        let mut h = Harness::deck(4);
        let old: Epoch = h.engine.auto_generation;
        h.engine.auto_generation.bump();
        let now = h.at();
        h.engine.fire(
            now,
            CarouselTimer::AutoAdvance { generation: old },
            &mut h.timeline,
        );
        assert_eq!(h.engine.current_index(), 0);
        assert!(h.engine.effects().is_empty());
        assert!(h.timeline.is_empty());
    }

    #[test]
    fn deck_swipe_left_is_next_and_clamps() {
        let mut h = Harness::deck(3);
        // rightward swipe at the first card cannot go back
        assert!(!h.drag(100.0, 200.0));
        assert_eq!(h.engine.current_index(), 0);

        assert!(h.drag(300.0, 200.0));
        assert_eq!(h.engine.current_index(), 1);
        assert_eq!(h.engine.state().slide_direction, SlideDirection::Left);
        h.advance(700);

        assert!(h.drag(100.0, 200.0));
        assert_eq!(h.engine.current_index(), 0);
    }

    #[test]
    fn showcase_swipe_right_is_next() {
        let mut h = Harness::showcase(4);
        assert!(h.drag(0.0, 51.0));
        assert_eq!(h.engine.current_index(), 1);
        h.advance(1150);
        assert!(!h.drag(0.0, 50.0));
    }

    #[test]
    fn drag_cannot_start_mid_slide() {
        let mut h = Harness::deck(3);
        h.next();
        assert!(!h.engine.gesture_start(10.0));
        assert!(!h.engine.is_dragging());
    }

    #[test]
    fn auto_advance_pauses_on_hover() {
        let mut h = Harness::deck(4);
        h.engine.start_auto_advance(Millis(0), &mut h.timeline);
        h.advance(6000);
        assert_eq!(h.engine.current_index(), 1);

        h.advance(1000);
        h.engine.pointer_enter(&mut h.timeline);
        h.advance(20_000);
        assert_eq!(h.engine.current_index(), 1);

        let now = h.at();
        h.engine.pointer_leave(now, &mut h.timeline);
        h.advance(5_999);
        assert_eq!(h.engine.current_index(), 1);
        h.advance(1);
        assert_eq!(h.engine.current_index(), 2);
    }

    #[test]
    fn auto_advance_skips_while_dragging() {
        let mut h = Harness::deck(4);
        h.engine.start_auto_advance(Millis(0), &mut h.timeline);
        h.advance(5_000);
        assert!(h.engine.gesture_start(100.0));
        h.advance(1_000);
        assert_eq!(h.engine.current_index(), 0);
        let now = h.at();
        h.engine.gesture_end(100.0, now, &mut h.timeline);
        h.advance(6_000);
        assert_eq!(h.engine.current_index(), 1);
    }

    #[test]
    fn auto_advance_wraps_past_the_last_card() {
        let mut h = Harness::deck(2);
        h.engine.start_auto_advance(Millis(0), &mut h.timeline);
        h.advance(12_000);
        assert_eq!(h.engine.current_index(), 0);
    }

    #[test]
    fn keyboard_requires_hover() {
        let mut h = Harness::deck(3);
        let now = h.at();
        assert!(!h.engine.key(Key::ArrowRight, now, &mut h.timeline));
        h.engine.pointer_enter(&mut h.timeline);
        assert!(h.engine.key(Key::ArrowRight, now, &mut h.timeline));
        assert_eq!(h.engine.current_index(), 1);
    }

    #[test]
    fn wheel_needs_dominant_horizontal_delta() {
        let mut h = Harness::deck(3);
        let now = h.at();
        assert!(!h.engine.wheel(25.0, 0.0, now, &mut h.timeline));
        assert!(!h.engine.wheel(40.0, 60.0, now, &mut h.timeline));
        assert!(h.engine.wheel(40.0, 10.0, now, &mut h.timeline));
        assert_eq!(h.engine.current_index(), 1);

        let mut s = Harness::showcase(3);
        assert!(!s.engine.wheel(200.0, 0.0, now, &mut s.timeline));
    }

    #[test]
    fn reset_cancels_in_flight_slide() {
        let mut h = Harness::showcase(4);
        h.next();
        h.advance(300);
        let now = h.at();
        h.engine.reset(3, now, &mut h.timeline);
        assert_eq!(h.engine.current_index(), 0);
        assert!(!h.engine.is_animating());
        assert!(h.timeline.is_empty());
        h.advance(2_000);
        assert!(
            !h.engine
                .effects()
                .iter()
                .any(|e| matches!(e, CarouselEffect::SlideFinished { .. }))
        );
    }

    #[test]
    fn swipe_hint_hides_on_first_navigation() {
        let mut h = Harness::deck(3);
        assert!(h.engine.hint_visible());
        let now = h.at();
        h.engine.step(Motion::Forward, now, &mut h.timeline);
        h.advance(700);
        h.next();
        let hides = h
            .engine
            .effects()
            .iter()
            .filter(|e| matches!(e, CarouselEffect::HideSwipeHint))
            .count();
        assert_eq!(hides, 1);
        assert!(!h.engine.hint_visible());
    }

    #[test]
    fn routes_inputs_by_kind() {
        use super::Input;

        let mut h = Harness::deck(4);
        let now = h.at();
        assert!(!h.engine.handle(Input::Resize { width: 1000.0 }, now, &mut h.timeline));
        assert!(!h.engine.handle(Input::GestureStart { x: 500.0 }, now, &mut h.timeline));
        assert!(!h.engine.handle(Input::GestureMove { x: 400.0 }, now, &mut h.timeline));
        // 100px is under 15% of 1000px
        assert!(!h.engine.handle(Input::GestureEnd { x: 400.0 }, now, &mut h.timeline));
        assert!(h.engine.handle(Input::GoTo { index: 2 }, now, &mut h.timeline));
        assert_eq!(h.engine.current_index(), 2);
    }

    #[test]
    fn item_click_advances_the_ring() {
        let mut h = Harness::deck(2);
        let now = h.at();
        assert!(h.engine.click_item(now, &mut h.timeline));
        h.advance(700);
        let now = h.at();
        assert!(h.engine.click_item(now, &mut h.timeline));
        assert_eq!(h.engine.current_index(), 0);
    }
}
