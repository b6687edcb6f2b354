use foundation::Millis;
use runtime::{EventBus, Stamped, Timers};
use serde::Serialize;

use crate::config::{CounterConfig, CounterTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterTimer {
    pub counter: usize,
    pub step: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "kebab-case")]
pub enum CounterEffect {
    Value { id: String, text: String },
}

/// Value shown at `step` of `steps` when counting up to `target`.
pub fn counter_value(target: u64, step: u32, steps: u32) -> u64 {
    let steps = u64::from(steps.max(1));
    (u64::from(step).saturating_mul(target) / steps).min(target)
}

/// Formats `value`, grouping thousands with commas when the counter's target
/// is at least 1000.
pub fn format_count(value: u64, target: u64) -> String {
    let digits = value.to_string();
    if target < 1000 {
        return digits;
    }
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug)]
struct Counter {
    def: CounterTarget,
    started: bool,
}

/// Stat counters that count up once when they first scroll into view.
#[derive(Debug)]
pub struct StatCounters {
    config: CounterConfig,
    counters: Vec<Counter>,
    effects: EventBus<CounterEffect>,
}

impl StatCounters {
    pub fn new(config: CounterConfig, counters: &[CounterTarget]) -> Self {
        Self {
            config,
            counters: counters
                .iter()
                .map(|def| Counter {
                    def: def.clone(),
                    started: false,
                })
                .collect(),
            effects: EventBus::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn is_started(&self, id: &str) -> bool {
        self.counters
            .iter()
            .any(|c| c.def.id == id && c.started)
    }

    pub fn on_visibility(
        &mut self,
        id: &str,
        ratio: f64,
        now: Millis,
        timers: &mut impl Timers<CounterTimer>,
    ) -> bool {
        if ratio < self.config.visibility_threshold {
            return false;
        }
        let Some(counter) = self.counters.iter().position(|c| c.def.id == id) else {
            tracing::debug!(id, "unknown counter");
            return false;
        };
        if self.counters[counter].started {
            return false;
        }
        self.counters[counter].started = true;
        timers.schedule(now, self.step_interval(), CounterTimer { counter, step: 1 });
        true
    }

    pub fn fire(&mut self, now: Millis, timer: CounterTimer, timers: &mut impl Timers<CounterTimer>) {
        let interval = self.step_interval();
        let steps = self.config.steps;
        let Some(counter) = self.counters.get(timer.counter) else {
            return;
        };
        let target = counter.def.target;
        let value = counter_value(target, timer.step, steps);
        self.effects.emit(
            now,
            CounterEffect::Value {
                id: counter.def.id.clone(),
                text: format_count(value, target),
            },
        );
        if timer.step < steps {
            timers.schedule(
                now,
                interval,
                CounterTimer {
                    counter: timer.counter,
                    step: timer.step + 1,
                },
            );
        }
    }

    pub fn drain_effects(&mut self) -> Vec<Stamped<CounterEffect>> {
        self.effects.drain()
    }

    fn step_interval(&self) -> Millis {
        Millis(self.config.duration.as_u64() / u64::from(self.config.steps.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::{CounterEffect, CounterTimer, StatCounters, counter_value, format_count};
    use crate::config::{CounterConfig, CounterTarget};
    use foundation::Millis;
    use runtime::Timeline;

    #[test]
    fn values_climb_to_target() {
        assert_eq!(counter_value(25, 1, 50), 0);
        assert_eq!(counter_value(25, 2, 50), 1);
        assert_eq!(counter_value(25, 50, 50), 25);
        assert_eq!(counter_value(50_000, 25, 50), 25_000);
    }

    #[test]
    fn large_targets_group_thousands() {
        assert_eq!(format_count(999, 999), "999");
        assert_eq!(format_count(1_000, 1_000), "1,000");
        assert_eq!(format_count(12, 50_000), "12");
        assert_eq!(format_count(1_234_567, 2_000_000), "1,234,567");
    }

    #[test]
    fn counts_once_over_duration() {
        let def = CounterTarget {
            id: "pounds".into(),
            target: 50_000,
        };
        let mut counters = StatCounters::new(CounterConfig::default(), &[def]);
        let mut timeline: Timeline<CounterTimer> = Timeline::new();

        assert!(!counters.on_visibility("pounds", 0.4, Millis(0), &mut timeline));
        assert!(counters.on_visibility("pounds", 0.5, Millis(0), &mut timeline));
        assert!(!counters.on_visibility("pounds", 1.0, Millis(10), &mut timeline));

        while let Some(due) = timeline.pop_due(Millis(5_000)) {
            counters.fire(due.deadline, due.payload, &mut timeline);
        }
        let effects = counters.drain_effects();
        assert_eq!(effects.len(), 50);
        assert_eq!(effects[0].at, Millis(40));
        let last = effects.last().unwrap();
        assert_eq!(last.at, Millis(2_000));
        assert_eq!(
            last.event,
            CounterEffect::Value {
                id: "pounds".into(),
                text: "50,000".into()
            }
        );
    }
}
