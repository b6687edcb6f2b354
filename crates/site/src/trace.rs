use catalog::{LotRecord, Shipment, TraceCatalog, normalize_code};
use foundation::{Epoch, Millis, TimerId};
use runtime::{EventBus, Stamped, Timers};
use serde::Serialize;

use crate::config::TraceConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupKind {
    Lot,
    Shipment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceTimer {
    Resolve {
        epoch: Epoch,
        kind: LookupKind,
        code: String,
    },
    RevealStep {
        epoch: Epoch,
        index: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "kebab-case")]
pub enum TraceEffect {
    Busy { busy: bool },
    Notice { level: NoticeLevel, message: String },
    LotFound { lot: LotRecord },
    ShipmentFound { shipment: Shipment },
    RevealStep { index: usize },
}

/// Mock traceability lookups. Results arrive after a fixed delay; a newer
/// lookup supersedes any still in flight.
#[derive(Debug)]
pub struct LotTracer {
    config: TraceConfig,
    catalog: TraceCatalog,
    epoch: Epoch,
    pending: Vec<TimerId>,
    effects: EventBus<TraceEffect>,
}

impl LotTracer {
    pub fn new(config: TraceConfig, catalog: TraceCatalog) -> Self {
        Self {
            config,
            catalog,
            epoch: Epoch::default(),
            pending: Vec::new(),
            effects: EventBus::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Looks up a lot code typed by the user.
    pub fn trace_lot(
        &mut self,
        raw: &str,
        now: Millis,
        timers: &mut impl Timers<TraceTimer>,
    ) -> bool {
        self.begin(LookupKind::Lot, raw, self.config.lot_delay, now, timers)
    }

    /// Looks up a shipment tracking code typed by the user.
    pub fn track_shipment(
        &mut self,
        raw: &str,
        now: Millis,
        timers: &mut impl Timers<TraceTimer>,
    ) -> bool {
        self.begin(LookupKind::Shipment, raw, self.config.shipment_delay, now, timers)
    }

    /// One of the demo buttons; resolves faster than a typed lookup.
    pub fn demo_shipment(
        &mut self,
        code: &str,
        now: Millis,
        timers: &mut impl Timers<TraceTimer>,
    ) -> bool {
        self.begin(LookupKind::Shipment, code, self.config.demo_delay, now, timers)
    }

    pub fn fire(
        &mut self,
        id: TimerId,
        now: Millis,
        timer: TraceTimer,
        timers: &mut impl Timers<TraceTimer>,
    ) {
        match timer {
            TraceTimer::Resolve { epoch, kind, code } => {
                if epoch != self.epoch {
                    tracing::warn!(%code, "discarding superseded lookup");
                    return;
                }
                self.pending.retain(|t| *t != id);
                self.resolve(kind, &code, now, timers);
                self.effects.emit(now, TraceEffect::Busy { busy: false });
            }
            TraceTimer::RevealStep { epoch, index } => {
                if epoch == self.epoch {
                    self.effects.emit(now, TraceEffect::RevealStep { index });
                }
            }
        }
    }

    pub fn drain_effects(&mut self) -> Vec<Stamped<TraceEffect>> {
        self.effects.drain()
    }

    fn begin(
        &mut self,
        kind: LookupKind,
        raw: &str,
        delay: Millis,
        now: Millis,
        timers: &mut impl Timers<TraceTimer>,
    ) -> bool {
        let code = normalize_code(raw);
        if code.is_empty() {
            self.effects.emit(
                now,
                TraceEffect::Notice {
                    level: NoticeLevel::Warning,
                    message: "Please enter a tracking code".into(),
                },
            );
            return false;
        }
        for id in self.pending.drain(..) {
            timers.cancel(id);
        }
        let epoch = self.epoch.bump();
        self.effects.emit(now, TraceEffect::Busy { busy: true });
        let id = timers.schedule(now, delay, TraceTimer::Resolve { epoch, kind, code });
        self.pending.push(id);
        true
    }

    fn resolve(
        &mut self,
        kind: LookupKind,
        code: &str,
        now: Millis,
        timers: &mut impl Timers<TraceTimer>,
    ) {
        match kind {
            LookupKind::Lot => match self.catalog.lot(code) {
                Some(lot) => {
                    let lot = lot.clone();
                    self.effects.emit(now, TraceEffect::LotFound { lot });
                }
                None => self.not_found(code, now),
            },
            LookupKind::Shipment => match self.catalog.shipment(code) {
                Some(shipment) => {
                    let shipment = shipment.clone();
                    self.reveal_steps(shipment.steps.len(), now, timers);
                    self.effects.emit(
                        now,
                        TraceEffect::Notice {
                            level: NoticeLevel::Success,
                            message: "Tracking information found!".into(),
                        },
                    );
                    self.effects
                        .emit(now, TraceEffect::ShipmentFound { shipment });
                }
                None => self.not_found(code, now),
            },
        }
    }

    fn not_found(&mut self, code: &str, now: Millis) {
        tracing::debug!(code, "trace code not found");
        self.effects.emit(
            now,
            TraceEffect::Notice {
                level: NoticeLevel::Error,
                message: format!("Code \"{code}\" not found. Please verify the code and try again."),
            },
        );
    }

    fn reveal_steps(&mut self, steps: usize, now: Millis, timers: &mut impl Timers<TraceTimer>) {
        let epoch = self.epoch;
        for index in 0..steps {
            let delay = self.config.step_stagger.times(index as u64);
            timers.schedule(now, delay, TraceTimer::RevealStep { epoch, index });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LotTracer, NoticeLevel, TraceEffect, TraceTimer};
    use crate::config::TraceConfig;
    use catalog::SiteData;
    use foundation::Millis;
    use runtime::Timeline;

    fn setup() -> (LotTracer, Timeline<TraceTimer>) {
        let data = SiteData::builtin().unwrap();
        (LotTracer::new(TraceConfig::default(), data.trace), Timeline::new())
    }

    fn run(tracer: &mut LotTracer, timeline: &mut Timeline<TraceTimer>, until: u64) -> Vec<TraceEffect> {
        while let Some(due) = timeline.pop_due(Millis(until)) {
            tracer.fire(due.id, due.deadline, due.payload, timeline);
        }
        tracer.drain_effects().into_iter().map(|s| s.event).collect()
    }

    #[test]
    fn blank_code_warns_without_lookup() {
        let (mut tracer, mut timeline) = setup();
        assert!(!tracer.trace_lot("   ", Millis(0), &mut timeline));
        assert!(timeline.is_empty());
        let effects = run(&mut tracer, &mut timeline, 5_000);
        assert!(matches!(
            effects.as_slice(),
            [TraceEffect::Notice { level: NoticeLevel::Warning, .. }]
        ));
    }

    #[test]
    fn lot_resolves_after_delay() {
        let (mut tracer, mut timeline) = setup();
        assert!(tracer.trace_lot(" cs2024-001 ", Millis(0), &mut timeline));
        assert!(tracer.is_busy());
        let early = run(&mut tracer, &mut timeline, 1_999);
        assert_eq!(early, vec![TraceEffect::Busy { busy: true }]);
        let effects = run(&mut tracer, &mut timeline, 2_000);
        match effects.as_slice() {
            [TraceEffect::LotFound { lot }, TraceEffect::Busy { busy: false }] => {
                assert_eq!(lot.vessel, "FV Maria Elena");
            }
            other => panic!("unexpected effects {other:?}"),
        }
        assert!(!tracer.is_busy());
    }

    #[test]
    fn unknown_lot_reports_not_found() {
        let (mut tracer, mut timeline) = setup();
        tracer.trace_lot("XX-1", Millis(0), &mut timeline);
        let effects = run(&mut tracer, &mut timeline, 2_000);
        assert!(effects.iter().any(|e| matches!(
            e,
            TraceEffect::Notice { level: NoticeLevel::Error, message } if message.contains("XX-1")
        )));
    }

    #[test]
    fn superseded_callbacks_emit_nothing() {
        let (mut tracer, mut timeline) = setup();
        tracer.trace_lot("CS2024-001", Millis(0), &mut timeline);
        tracer.drain_effects();

        let due = timeline.pop_due(Millis(5_000)).unwrap();
        let old = tracer.epoch;
        tracer.epoch.bump();
        tracer.fire(due.id, due.deadline, due.payload, &mut timeline);
        tracer.fire(
            due.id,
            due.deadline,
            TraceTimer::RevealStep { epoch: old, index: 0 },
            &mut timeline,
        );

        assert!(tracer.drain_effects().is_empty());
        assert!(tracer.is_busy());
        assert!(timeline.is_empty());
    }

    #[test]
    fn newer_lookup_supersedes_older() {
        let (mut tracer, mut timeline) = setup();
        tracer.trace_lot("CS2024-001", Millis(0), &mut timeline);
        tracer.trace_lot("VM2024-002", Millis(500), &mut timeline);
        let effects = run(&mut tracer, &mut timeline, 10_000);
        let found: Vec<_> = effects
            .iter()
            .filter_map(|e| match e {
                TraceEffect::LotFound { lot } => Some(lot.code.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(found, vec!["VM2024-002"]);
    }

    #[test]
    fn demo_shipment_reveals_steps_in_turn() {
        let (mut tracer, mut timeline) = setup();
        tracer.demo_shipment("PCF-2024-0456", Millis(0), &mut timeline);
        let effects = run(&mut tracer, &mut timeline, 1_500);
        assert!(effects.iter().any(|e| matches!(e, TraceEffect::ShipmentFound { .. })));

        let steps = run(&mut tracer, &mut timeline, 2_200);
        assert_eq!(
            steps,
            vec![
                TraceEffect::RevealStep { index: 1 },
                TraceEffect::RevealStep { index: 2 },
                TraceEffect::RevealStep { index: 3 },
            ]
        );
    }
}
