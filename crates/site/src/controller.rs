use carousel::{CardPose, CarouselEffect, CarouselEngine, CarouselState, CarouselTimer, Input};
use catalog::{CatalogError, ShowcaseItem, SiteData};
use foundation::Millis;
use runtime::{Due, EventBus, Stamped, Timeline};
use serde::{Deserialize, Serialize};
use transition::{MapAdapter, MapError, Mode, TransitionEffect, TransitionMachine, TransitionTimer};

use crate::config::{Capabilities, ConfigError, SiteConfig};
use crate::counters::{CounterEffect, CounterTimer, StatCounters};
use crate::navbar::{NavbarEffect, NavbarThemer};
use crate::tabs::{CategoryTabs, TabEffect, TabTimer};
use crate::trace::{LotTracer, TraceEffect, TraceTimer};

#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0} is not present on this page")]
    Missing(&'static str),
}

/// Every deferred action on the page.
#[derive(Debug, Clone, PartialEq)]
pub enum SiteTimer {
    Transition(TransitionTimer),
    Showcase(CarouselTimer),
    Deck(CarouselTimer),
    Tabs(TabTimer),
    Trace(TraceTimer),
    Counter(CounterTimer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CarouselId {
    Showcase,
    Deck,
}

/// Presentation change for the host, tagged by the component it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "component", content = "change", rename_all = "kebab-case")]
pub enum SiteEffect {
    Transition(TransitionEffect),
    Showcase(CarouselEffect),
    ShowcaseItems {
        category: String,
        items: Vec<ShowcaseItem>,
    },
    Deck(CarouselEffect),
    Tabs(TabEffect),
    Navbar(NavbarEffect),
    Trace(TraceEffect),
    Counter(CounterEffect),
}

/// Owns the page. Hosts feed it user events and the current time, then drain
/// the resulting effects.
///
/// Every entry point first runs the actions that came due up to `now`, then
/// handles the event, then runs anything it scheduled with no delay.
#[derive(Debug)]
pub struct SiteController<M> {
    config: SiteConfig,
    capabilities: Capabilities,
    data: SiteData,
    timeline: Timeline<SiteTimer>,
    now: Millis,
    transition: Option<TransitionMachine<M>>,
    tabs: Option<CategoryTabs>,
    showcase: Option<CarouselEngine>,
    showcase_category: String,
    deck: Option<CarouselEngine>,
    navbar: NavbarThemer,
    tracer: Option<LotTracer>,
    counters: StatCounters,
    page_effects: EventBus<SiteEffect>,
}

impl<M: MapAdapter> SiteController<M> {
    /// Builds the controller at logical time zero with the built-in catalogs.
    pub fn builtin(
        config: SiteConfig,
        capabilities: Capabilities,
        adapter: M,
    ) -> Result<Self, SiteError> {
        config.validate()?;
        let data = SiteData::builtin()?;
        Ok(Self::new(config, capabilities, data, adapter))
    }

    pub fn new(config: SiteConfig, capabilities: Capabilities, data: SiteData, adapter: M) -> Self {
        let now = Millis::ZERO;
        let mut timeline = Timeline::new();
        let mut page_effects = EventBus::new();

        let transition = capabilities.sourcing_map.then(|| {
            TransitionMachine::new(config.transition.clone(), adapter, data.locations.clone())
        });

        let tabs = capabilities
            .product_tabs
            .then(|| data.products.keys().next().map(str::to_owned))
            .flatten()
            .map(|first| CategoryTabs::new(&first, config.tab_fade, &data.products, now));

        let showcase_category = data.showcase.first_key().unwrap_or_default().to_owned();
        let showcase = capabilities.showcase.then(|| {
            let items = data.showcase.items(&showcase_category);
            page_effects.emit(
                now,
                SiteEffect::ShowcaseItems {
                    category: showcase_category.clone(),
                    items: items.to_vec(),
                },
            );
            CarouselEngine::new("showcase", config.showcase.clone(), items.len())
        });

        let deck = capabilities.card_deck.map(|count| {
            let mut deck = CarouselEngine::new("deck", config.card_deck.clone(), count);
            deck.start_auto_advance(now, &mut timeline.scoped(SiteTimer::Deck));
            deck
        });

        let mut navbar = NavbarThemer::new(
            &config.navbar.sections,
            &capabilities.navbar_sections,
            config.navbar.scroll_threshold,
        );
        navbar.init(now);

        let tracer = capabilities
            .lot_trace
            .then(|| LotTracer::new(config.trace.clone(), data.trace.clone()));
        let counters = StatCounters::new(config.counters.clone(), &capabilities.counters);

        tracing::debug!(?capabilities, "site controller ready");

        Self {
            config,
            capabilities,
            data,
            timeline,
            now,
            transition,
            tabs,
            showcase,
            showcase_category,
            deck,
            navbar,
            tracer,
            counters,
            page_effects,
        }
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn data(&self) -> &SiteData {
        &self.data
    }

    /// Earliest pending deadline; hosts arm their real timer for it.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.timeline.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.timeline.len()
    }

    pub fn mode(&self) -> Option<Mode> {
        self.transition.as_ref().map(TransitionMachine::mode)
    }

    pub fn transition(&self) -> Option<&TransitionMachine<M>> {
        self.transition.as_ref()
    }

    pub fn map_adapter_mut(&mut self) -> Option<&mut M> {
        self.transition.as_mut().map(TransitionMachine::adapter_mut)
    }

    pub fn current_category(&self) -> Option<&str> {
        self.tabs.as_ref().map(CategoryTabs::current)
    }

    pub fn showcase_category(&self) -> Option<&str> {
        self.showcase
            .as_ref()
            .map(|_| self.showcase_category.as_str())
    }

    pub fn carousel_state(&self, id: CarouselId) -> Option<CarouselState> {
        self.carousel(id).map(CarouselEngine::state)
    }

    /// Deck card poses for the current index and live drag, measured against
    /// the same width the swipe threshold uses.
    pub fn deck_poses(&self) -> Option<Vec<CardPose>> {
        let deck = self.deck.as_ref()?;
        let width = deck.width();
        let fraction = if width > 0.0 {
            deck.state().drag_delta / width
        } else {
            0.0
        };
        Some(carousel::deck_poses(deck.current_index(), deck.count(), fraction))
    }

    pub fn navbar(&self) -> &NavbarThemer {
        &self.navbar
    }

    /// Runs every action due at or before `until`.
    pub fn advance_to(&mut self, until: Millis) {
        while self.run_next(until).is_some() {}
        if until > self.now {
            self.now = until;
        }
    }

    /// Runs the single earliest action due at or before `until` and returns
    /// its deadline.
    pub fn run_next(&mut self, until: Millis) -> Option<Millis> {
        let due = self.timeline.pop_due(until)?;
        let at = due.deadline;
        self.now = self.now.max(at);
        if let Err(err) = self.dispatch(due) {
            tracing::warn!(%at, %err, "scheduled action failed");
        }
        Some(at)
    }

    pub fn on_sourcing_visibility(&mut self, ratio: f64, now: Millis) {
        self.turn(now, |site, now| {
            if let Some(machine) = site.transition.as_mut() {
                machine.on_visibility(
                    ratio,
                    now,
                    &mut site.timeline.scoped(SiteTimer::Transition),
                );
            }
        })
    }

    pub fn toggle_map(&mut self, now: Millis) {
        self.turn(now, |site, now| {
            let Some(machine) = site.transition.as_mut() else {
                tracing::debug!("toggle without a sourcing map");
                return;
            };
            machine.toggle(now, &mut site.timeline.scoped(SiteTimer::Transition));
        })
    }

    pub fn focus_location(
        &mut self,
        location: &str,
        highlight: Option<&str>,
        now: Millis,
    ) -> bool {
        self.turn(now, |site, now| {
            let Some(machine) = site.transition.as_mut() else {
                return false;
            };
            machine.focus_on(
                location,
                highlight,
                now,
                &mut site.timeline.scoped(SiteTimer::Transition),
            )
        })
    }

    /// A product card's "see where we catch it" action.
    pub fn see_sourcing(&mut self, product: &str, now: Millis) -> bool {
        let link = self
            .data
            .products
            .find_product(product)
            .and_then(|p| p.sourcing.clone());
        match link {
            Some(link) => self.focus_location(&link.location, link.product.as_deref(), now),
            None => {
                tracing::warn!(product, "product has no sourcing link");
                false
            }
        }
    }

    pub fn switch_category(&mut self, key: &str, now: Millis) -> bool {
        self.turn(now, |site, now| {
            let Some(tabs) = site.tabs.as_mut() else {
                return false;
            };
            tabs.switch_category(key, now, &mut site.timeline.scoped(SiteTimer::Tabs))
        })
    }

    /// Switches the showcase to another category and restarts it at the
    /// first item.
    pub fn switch_showcase_category(&mut self, key: &str, now: Millis) -> bool {
        self.turn(now, |site, now| {
            let Some(engine) = site.showcase.as_mut() else {
                return false;
            };
            if site.showcase_category == key {
                return false;
            }
            let items = site.data.showcase.items(key);
            if items.is_empty() {
                tracing::warn!(category = key, "showcase category has no items");
            }
            site.showcase_category = key.to_owned();
            engine.reset(
                items.len(),
                now,
                &mut site.timeline.scoped(SiteTimer::Showcase),
            );
            site.page_effects.emit(
                now,
                SiteEffect::ShowcaseItems {
                    category: key.to_owned(),
                    items: items.to_vec(),
                },
            );
            true
        })
    }

    pub fn carousel_input(&mut self, id: CarouselId, input: Input, now: Millis) -> bool {
        self.turn(now, |site, now| match id {
            CarouselId::Showcase => match site.showcase.as_mut() {
                Some(engine) => {
                    engine.handle(input, now, &mut site.timeline.scoped(SiteTimer::Showcase))
                }
                None => false,
            },
            CarouselId::Deck => match site.deck.as_mut() {
                Some(engine) => {
                    engine.handle(input, now, &mut site.timeline.scoped(SiteTimer::Deck))
                }
                None => false,
            },
        })
    }

    pub fn on_section_intersection(&mut self, section: &str, ratio: f64, now: Millis) {
        self.turn(now, |site, now| site.navbar.on_intersection(section, ratio, now))
    }

    pub fn on_scroll(&mut self, scroll_y: f64, now: Millis) {
        self.turn(now, |site, now| site.navbar.on_scroll(scroll_y, now))
    }

    pub fn trace_lot(&mut self, code: &str, now: Millis) -> bool {
        self.turn(now, |site, now| match site.tracer.as_mut() {
            Some(tracer) => {
                tracer.trace_lot(code, now, &mut site.timeline.scoped(SiteTimer::Trace))
            }
            None => false,
        })
    }

    pub fn track_shipment(&mut self, code: &str, now: Millis) -> bool {
        self.turn(now, |site, now| match site.tracer.as_mut() {
            Some(tracer) => {
                tracer.track_shipment(code, now, &mut site.timeline.scoped(SiteTimer::Trace))
            }
            None => false,
        })
    }

    pub fn demo_shipment(&mut self, code: &str, now: Millis) -> bool {
        self.turn(now, |site, now| match site.tracer.as_mut() {
            Some(tracer) => {
                tracer.demo_shipment(code, now, &mut site.timeline.scoped(SiteTimer::Trace))
            }
            None => false,
        })
    }

    pub fn on_counter_visibility(&mut self, id: &str, ratio: f64, now: Millis) -> bool {
        self.turn(now, |site, now| {
            site.counters
                .on_visibility(id, ratio, now, &mut site.timeline.scoped(SiteTimer::Counter))
        })
    }

    /// Collects every component's effects in time order.
    pub fn drain_effects(&mut self) -> Vec<Stamped<SiteEffect>> {
        let mut out = self.page_effects.drain();
        if let Some(machine) = self.transition.as_mut() {
            extend(&mut out, machine.drain_effects(), SiteEffect::Transition);
        }
        if let Some(engine) = self.showcase.as_mut() {
            extend(&mut out, engine.drain_effects(), SiteEffect::Showcase);
        }
        if let Some(engine) = self.deck.as_mut() {
            extend(&mut out, engine.drain_effects(), SiteEffect::Deck);
        }
        if let Some(tabs) = self.tabs.as_mut() {
            extend(&mut out, tabs.drain_effects(), SiteEffect::Tabs);
        }
        extend(&mut out, self.navbar.drain_effects(), SiteEffect::Navbar);
        if let Some(tracer) = self.tracer.as_mut() {
            extend(&mut out, tracer.drain_effects(), SiteEffect::Trace);
        }
        extend(&mut out, self.counters.drain_effects(), SiteEffect::Counter);
        out.sort_by_key(|s| s.at);
        out
    }

    fn carousel(&self, id: CarouselId) -> Option<&CarouselEngine> {
        match id {
            CarouselId::Showcase => self.showcase.as_ref(),
            CarouselId::Deck => self.deck.as_ref(),
        }
    }

    fn turn<R>(&mut self, now: Millis, f: impl FnOnce(&mut Self, Millis) -> R) -> R {
        if now < self.now {
            tracing::debug!(%now, current = %self.now, "host time went backwards");
        }
        self.advance_to(now);
        let at = self.now;
        let result = f(self, at);
        self.advance_to(at);
        result
    }

    fn dispatch(&mut self, due: Due<SiteTimer>) -> Result<(), SiteError> {
        let Due {
            id,
            deadline: now,
            payload,
        } = due;
        match payload {
            SiteTimer::Transition(timer) => {
                let machine = self
                    .transition
                    .as_mut()
                    .ok_or(SiteError::Missing("sourcing map"))?;
                machine.fire(
                    id,
                    now,
                    timer,
                    &mut self.timeline.scoped(SiteTimer::Transition),
                )?;
            }
            SiteTimer::Showcase(timer) => {
                let engine = self.showcase.as_mut().ok_or(SiteError::Missing("showcase"))?;
                engine.fire(now, timer, &mut self.timeline.scoped(SiteTimer::Showcase));
            }
            SiteTimer::Deck(timer) => {
                let engine = self.deck.as_mut().ok_or(SiteError::Missing("card deck"))?;
                engine.fire(now, timer, &mut self.timeline.scoped(SiteTimer::Deck));
            }
            SiteTimer::Tabs(timer) => {
                let tabs = self.tabs.as_mut().ok_or(SiteError::Missing("product tabs"))?;
                tabs.fire(now, timer, &self.data.products);
            }
            SiteTimer::Trace(timer) => {
                let tracer = self.tracer.as_mut().ok_or(SiteError::Missing("lot tracer"))?;
                tracer.fire(id, now, timer, &mut self.timeline.scoped(SiteTimer::Trace));
            }
            SiteTimer::Counter(timer) => {
                self.counters
                    .fire(now, timer, &mut self.timeline.scoped(SiteTimer::Counter));
            }
        }
        Ok(())
    }
}

fn extend<E>(
    out: &mut Vec<Stamped<SiteEffect>>,
    effects: Vec<Stamped<E>>,
    wrap: impl Fn(E) -> SiteEffect,
) {
    out.extend(effects.into_iter().map(|s| Stamped {
        at: s.at,
        event: wrap(s.event),
    }));
}
