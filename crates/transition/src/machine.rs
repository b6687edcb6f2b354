use std::collections::BTreeMap;

use catalog::LocationCatalog;
use foundation::{Epoch, MapHandle, MarkerHandle, Millis, TimerId};
use runtime::{EventBus, Stamped, Timers};
use serde::Serialize;

use crate::map_adapter::{MapAdapter, MapError, MarkerContent};
use crate::pending::{FocusBridge, PendingFocus};
use crate::plan::{Easing, Step, TransitionConfig};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Earth,
    Map,
}

/// Deferred work scheduled by the machine. Every variant carries the epoch it
/// was scheduled under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionTimer {
    Phase { epoch: Epoch, step: Step },
    CaptionLetter { epoch: Epoch, index: usize },
    DrainPending { epoch: Epoch },
    /// A product card asked for a location while the globe was showing.
    DeferredToggle { epoch: Epoch },
    OpenTooltip {
        epoch: Epoch,
        location: String,
        highlight: Option<String>,
    },
}

impl TransitionTimer {
    pub fn epoch(&self) -> Epoch {
        match self {
            TransitionTimer::Phase { epoch, .. }
            | TransitionTimer::CaptionLetter { epoch, .. }
            | TransitionTimer::DrainPending { epoch }
            | TransitionTimer::DeferredToggle { epoch }
            | TransitionTimer::OpenTooltip { epoch, .. } => *epoch,
        }
    }
}

/// Presentation changes for the host to apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "kebab-case")]
pub enum TransitionEffect {
    SpinGlobe { duration: Millis, easing: Easing },
    /// Globe at its rest frame with any animation cleared.
    StaticGlobe,
    HideGlobe,
    ShowCaption { text: String },
    CaptionLetter { index: usize, letter: char },
    HideCaption,
    ShowMap,
    HideMap,
    ShowToggle,
    HideToggle,
    /// The widget failed to load; map-dependent controls are unusable.
    DisableMapControls,
    ModeChanged { mode: Mode },
}

/// Earth/map state machine for the sourcing section.
#[derive(Debug)]
pub struct TransitionMachine<M> {
    config: TransitionConfig,
    adapter: M,
    locations: LocationCatalog,
    mode: Mode,
    epoch: Epoch,
    in_flight: bool,
    started: bool,
    degraded: bool,
    map: Option<MapHandle>,
    markers: BTreeMap<String, MarkerHandle>,
    outstanding: Vec<TimerId>,
    bridge: FocusBridge,
    effects: EventBus<TransitionEffect>,
}

impl<M: MapAdapter> TransitionMachine<M> {
    pub fn new(config: TransitionConfig, adapter: M, locations: LocationCatalog) -> Self {
        Self {
            config,
            adapter,
            locations,
            mode: Mode::Earth,
            epoch: Epoch::default(),
            in_flight: false,
            started: false,
            degraded: false,
            map: None,
            markers: BTreeMap::new(),
            outstanding: Vec::new(),
            bridge: FocusBridge::new(),
            effects: EventBus::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn has_map(&self) -> bool {
        self.map.is_some()
    }

    pub fn pending(&self) -> Option<&PendingFocus> {
        self.bridge.peek()
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    pub fn adapter(&self) -> &M {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut M {
        &mut self.adapter
    }

    pub fn effects(&self) -> &EventBus<TransitionEffect> {
        &self.effects
    }

    pub fn drain_effects(&mut self) -> Vec<Stamped<TransitionEffect>> {
        self.effects.drain()
    }

    /// Feeds a visibility observation of the sourcing section.
    ///
    /// The first observation at or above the threshold starts the intro; every
    /// later one is ignored.
    pub fn on_visibility(
        &mut self,
        ratio: f64,
        now: Millis,
        timers: &mut impl Timers<TransitionTimer>,
    ) {
        if ratio >= self.config.visibility_threshold {
            self.start(now, timers);
        }
    }

    /// Runs the intro once. Later calls are no-ops.
    pub fn start(&mut self, now: Millis, timers: &mut impl Timers<TransitionTimer>) {
        if self.started || self.degraded {
            return;
        }
        self.started = true;
        if self.mode == Mode::Earth && !self.in_flight {
            tracing::info!(%now, "sourcing intro started");
            self.run_plan(now, timers, true);
        }
    }

    pub fn toggle(&mut self, now: Millis, timers: &mut impl Timers<TransitionTimer>) {
        if self.degraded {
            tracing::debug!("toggle ignored, map unavailable");
            return;
        }
        if self.in_flight {
            tracing::debug!("toggle ignored, transition in flight");
            return;
        }
        match self.mode {
            Mode::Map => self.reverse(now, timers),
            Mode::Earth => {
                self.started = true;
                let fresh = self.map.is_none();
                tracing::debug!(%now, fresh, "earth to map");
                self.run_plan(now, timers, fresh);
            }
        }
    }

    /// Pans to `location` and opens its tooltip, revealing the map first if
    /// the globe is showing. Returns `false` when nothing was done.
    pub fn focus_on(
        &mut self,
        location: &str,
        highlight: Option<&str>,
        now: Millis,
        timers: &mut impl Timers<TransitionTimer>,
    ) -> bool {
        if self.locations.get(location).is_none() {
            tracing::warn!(location, "focus requested for unknown location");
            return false;
        }
        if self.degraded {
            tracing::debug!(location, "focus ignored, map unavailable");
            return false;
        }
        match self.mode {
            Mode::Map => {
                let focus = PendingFocus::new(location, highlight);
                if let Err(err) = self.focus_now(focus, now, timers) {
                    tracing::warn!(location, %err, "focus failed");
                    return false;
                }
            }
            Mode::Earth => {
                self.bridge.post(PendingFocus::new(location, highlight));
                if !self.in_flight {
                    let epoch = self.epoch;
                    let id = timers.schedule(
                        now,
                        self.config.scroll_delay,
                        TransitionTimer::DeferredToggle { epoch },
                    );
                    self.outstanding.push(id);
                }
            }
        }
        true
    }

    /// Runs a due timer. `now` is the timer's own deadline.
    pub fn fire(
        &mut self,
        id: TimerId,
        now: Millis,
        timer: TransitionTimer,
        timers: &mut impl Timers<TransitionTimer>,
    ) -> Result<(), MapError> {
        self.outstanding.retain(|t| *t != id);
        if timer.epoch() != self.epoch {
            tracing::warn!(?timer, "discarding stale transition callback");
            return Ok(());
        }
        match timer {
            TransitionTimer::Phase { step, .. } => self.run_step(step, now, timers),
            TransitionTimer::CaptionLetter { index, .. } => {
                if let Some(letter) = self.config.caption.chars().nth(index) {
                    self.effects
                        .emit(now, TransitionEffect::CaptionLetter { index, letter });
                }
                Ok(())
            }
            TransitionTimer::DrainPending { .. } => match self.bridge.take() {
                Some(focus) => self.focus_now(focus, now, timers),
                None => Ok(()),
            },
            TransitionTimer::DeferredToggle { .. } => {
                self.toggle(now, timers);
                Ok(())
            }
            TransitionTimer::OpenTooltip {
                location,
                highlight,
                ..
            } => {
                let map = self.map.ok_or(MapError::NotCreated)?;
                let marker = *self
                    .markers
                    .get(&location)
                    .ok_or_else(|| MapError::Backend(format!("no marker for {location}")))?;
                self.adapter.close_tooltips(map)?;
                self.adapter.open_tooltip(marker, highlight.as_deref())
            }
        }
    }

    fn run_plan(&mut self, now: Millis, timers: &mut impl Timers<TransitionTimer>, fresh: bool) {
        let plan = if fresh {
            self.config.intro_plan()
        } else {
            self.config.replay_plan()
        };
        let epoch = self.epoch;
        self.in_flight = true;
        let ids = plan.schedule(now, timers, |step| TransitionTimer::Phase { epoch, step });
        self.outstanding.extend(ids);
    }

    fn reverse(&mut self, now: Millis, timers: &mut impl Timers<TransitionTimer>) {
        self.cancel_outstanding(timers);
        self.epoch.bump();
        if let Some(dropped) = self.bridge.take() {
            tracing::debug!(location = %dropped.location, "pending focus discarded");
        }
        self.mode = Mode::Earth;
        self.effects.emit(now, TransitionEffect::HideMap);
        self.effects.emit(now, TransitionEffect::StaticGlobe);
        self.effects
            .emit(now, TransitionEffect::ModeChanged { mode: Mode::Earth });
        tracing::debug!(%now, "map to earth");
    }

    fn cancel_outstanding(&mut self, timers: &mut impl Timers<TransitionTimer>) {
        for id in self.outstanding.drain(..) {
            timers.cancel(id);
        }
        self.in_flight = false;
    }

    fn run_step(
        &mut self,
        step: Step,
        now: Millis,
        timers: &mut impl Timers<TransitionTimer>,
    ) -> Result<(), MapError> {
        match step {
            Step::HideToggle => self.effects.emit(now, TransitionEffect::HideToggle),
            Step::SpinGlobe(easing) => self.effects.emit(
                now,
                TransitionEffect::SpinGlobe {
                    duration: self.config.spin,
                    easing,
                },
            ),
            Step::ShowCaption => {
                self.effects.emit(
                    now,
                    TransitionEffect::ShowCaption {
                        text: self.config.caption.clone(),
                    },
                );
                let epoch = self.epoch;
                for index in 0..self.config.caption.chars().count() {
                    let delay = self.config.letter_stagger.times(index as u64);
                    let id =
                        timers.schedule(now, delay, TransitionTimer::CaptionLetter { epoch, index });
                    self.outstanding.push(id);
                }
            }
            Step::CreateMap => self.create_map(now, timers),
            Step::RefreshMap => {
                let map = self.map.ok_or(MapError::NotCreated)?;
                self.adapter.invalidate_size(map)?;
                self.adapter.enable_interactions(map)?;
            }
            Step::Reveal { hide_caption } => {
                self.effects.emit(now, TransitionEffect::HideGlobe);
                if hide_caption {
                    self.effects.emit(now, TransitionEffect::HideCaption);
                }
                self.effects.emit(now, TransitionEffect::ShowMap);
            }
            Step::InvalidateMap => {
                let map = self.map.ok_or(MapError::NotCreated)?;
                self.adapter.invalidate_size(map)?;
            }
            Step::EnableInteractions => {
                let map = self.map.ok_or(MapError::NotCreated)?;
                self.adapter.enable_interactions(map)?;
            }
            Step::Complete => {
                self.in_flight = false;
                self.mode = Mode::Map;
                self.effects.emit(now, TransitionEffect::ShowToggle);
                self.effects
                    .emit(now, TransitionEffect::ModeChanged { mode: Mode::Map });
                let epoch = self.epoch;
                let id = timers.schedule(
                    now,
                    self.config.drain_delay,
                    TransitionTimer::DrainPending { epoch },
                );
                self.outstanding.push(id);
                tracing::info!(%now, "sourcing map interactive");
            }
        }
        Ok(())
    }

    fn create_map(&mut self, now: Millis, timers: &mut impl Timers<TransitionTimer>) {
        let created = self.adapter.create(
            &self.config.map_container,
            self.config.map_center,
            self.config.overview_zoom,
        );
        let map = match created {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!(%err, "map widget unavailable, falling back to static globe");
                self.degrade(now, timers);
                return;
            }
        };
        self.map = Some(map);
        for loc in self.locations.iter() {
            match self
                .adapter
                .add_marker(map, loc.position(), &MarkerContent::from(loc))
            {
                Ok(marker) => {
                    self.markers.insert(loc.name.clone(), marker);
                }
                Err(err) => tracing::warn!(location = %loc.name, %err, "marker not added"),
            }
        }
        tracing::debug!(markers = self.markers.len(), "map created");
    }

    fn degrade(&mut self, now: Millis, timers: &mut impl Timers<TransitionTimer>) {
        self.cancel_outstanding(timers);
        self.epoch.bump();
        self.degraded = true;
        self.bridge.take();
        self.mode = Mode::Earth;
        self.effects.emit(now, TransitionEffect::HideCaption);
        self.effects.emit(now, TransitionEffect::StaticGlobe);
        self.effects.emit(now, TransitionEffect::DisableMapControls);
    }

    fn focus_now(
        &mut self,
        focus: PendingFocus,
        now: Millis,
        timers: &mut impl Timers<TransitionTimer>,
    ) -> Result<(), MapError> {
        let Some(loc) = self.locations.get(&focus.location) else {
            tracing::warn!(location = %focus.location, "focus target vanished from catalog");
            return Ok(());
        };
        let map = self.map.ok_or(MapError::NotCreated)?;
        self.adapter
            .set_view(map, loc.position(), self.config.focus_zoom, true)?;
        let epoch = self.epoch;
        let id = timers.schedule(
            now,
            self.config.pan_duration,
            TransitionTimer::OpenTooltip {
                epoch,
                location: focus.location,
                highlight: focus.highlight,
            },
        );
        self.outstanding.push(id);
        Ok(())
    }
}
