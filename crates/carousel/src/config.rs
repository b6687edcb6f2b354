use foundation::Millis;
use runtime::PhasePlan;
use serde::{Deserialize, Serialize};

use crate::direction::SlideDirection;

/// What directional input does at either end of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeRule {
    Wrap,
    Clamp,
}

/// Net horizontal displacement a drag must exceed to commit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwipeThreshold {
    Pixels(f64),
    FractionOfWidth(f64),
}

impl SwipeThreshold {
    /// Whether the threshold is meaningless until a width is known.
    pub fn needs_width(self) -> bool {
        matches!(self, SwipeThreshold::FractionOfWidth(_))
    }

    pub fn resolve(self, width: f64) -> f64 {
        match self {
            SwipeThreshold::Pixels(px) => px,
            SwipeThreshold::FractionOfWidth(f) => f * width.max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideStage {
    /// Outgoing item has left; incoming item is parked on its entry side.
    Settle,
    /// Incoming item starts moving to the center.
    Enter,
    /// Transition over; navigation unlocks.
    Done,
}

/// Duration of one slide. The release timer always derives from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlideTiming {
    Single {
        duration: Millis,
    },
    Staged {
        exit: Millis,
        settle: Millis,
        enter: Millis,
    },
}

impl SlideTiming {
    pub fn total(self) -> Millis {
        match self {
            SlideTiming::Single { duration } => duration,
            SlideTiming::Staged {
                exit,
                settle,
                enter,
            } => exit + settle + enter,
        }
    }

    pub fn plan(self) -> PhasePlan<SlideStage> {
        match self {
            SlideTiming::Single { duration } => {
                PhasePlan::new().at(duration, "done", SlideStage::Done)
            }
            SlideTiming::Staged { exit, settle, .. } => PhasePlan::new()
                .at(exit, "settle", SlideStage::Settle)
                .at(exit + settle, "enter", SlideStage::Enter)
                .at(self.total(), "done", SlideStage::Done),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WheelConfig {
    /// Horizontal delta that must be exceeded, and must also dominate the
    /// vertical delta.
    pub min_dx: f64,
}

/// Per-instance behavior of a carousel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CarouselConfig {
    pub edge: EdgeRule,
    pub threshold: SwipeThreshold,
    /// Whether a rightward swipe (positive dx) means next.
    pub swipe_right_is_next: bool,
    pub timing: SlideTiming,
    pub forward_exit: SlideDirection,
    #[serde(default)]
    pub auto_advance: Option<Millis>,
    #[serde(default)]
    pub wheel: Option<WheelConfig>,
    /// Clicking an item moves to the next one.
    #[serde(default)]
    pub click_advances: bool,
    #[serde(default)]
    pub swipe_hint: bool,
}

impl CarouselConfig {
    /// Product mega-showcase on the products page.
    pub fn showcase() -> Self {
        Self {
            edge: EdgeRule::Wrap,
            threshold: SwipeThreshold::Pixels(50.0),
            swipe_right_is_next: true,
            timing: SlideTiming::Staged {
                exit: Millis(600),
                settle: Millis(50),
                enter: Millis(500),
            },
            forward_exit: SlideDirection::Right,
            auto_advance: None,
            wheel: None,
            click_advances: false,
            swipe_hint: false,
        }
    }

    /// Quality card deck on the home page.
    pub fn card_deck() -> Self {
        Self {
            edge: EdgeRule::Clamp,
            threshold: SwipeThreshold::FractionOfWidth(0.15),
            swipe_right_is_next: false,
            timing: SlideTiming::Single {
                duration: Millis(700),
            },
            forward_exit: SlideDirection::Left,
            auto_advance: Some(Millis(6000)),
            wheel: Some(WheelConfig { min_dx: 30.0 }),
            click_advances: true,
            swipe_hint: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CarouselConfig, SlideStage, SlideTiming, SwipeThreshold};
    use foundation::Millis;
    use pretty_assertions::assert_eq;

    #[test]
    fn staged_timing_locks_for_its_total() {
        let timing = CarouselConfig::showcase().timing;
        assert_eq!(timing.total(), Millis(1150));
        let rows: Vec<_> = timing
            .plan()
            .phases()
            .iter()
            .map(|p| (p.offset, p.step))
            .collect();
        assert_eq!(
            rows,
            vec![
                (Millis(600), SlideStage::Settle),
                (Millis(650), SlideStage::Enter),
                (Millis(1150), SlideStage::Done),
            ]
        );
    }

    #[test]
    fn single_timing_has_one_release() {
        let timing = SlideTiming::Single {
            duration: Millis(700),
        };
        assert_eq!(timing.plan().len(), 1);
        assert_eq!(timing.plan().duration(), timing.total());
    }

    #[test]
    fn thresholds_resolve_against_width() {
        assert_eq!(SwipeThreshold::Pixels(50.0).resolve(1000.0), 50.0);
        assert_eq!(SwipeThreshold::FractionOfWidth(0.15).resolve(400.0), 60.0);
    }

    #[test]
    fn parses_instance_from_json() {
        let json = r#"{
            "edge": "wrap",
            "threshold": { "pixels": 80.0 },
            "swipe_right_is_next": true,
            "timing": { "single": { "duration": 400 } },
            "forward_exit": "right"
        }"#;
        let cfg: CarouselConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.threshold, SwipeThreshold::Pixels(80.0));
        assert_eq!(cfg.timing.total(), Millis(400));
        assert_eq!(cfg.auto_advance, None);
        assert!(!cfg.click_advances);
    }
}
