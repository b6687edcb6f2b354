//! Headless scenario replay for the site controller.
//!
//! A scenario is a JSON document listing timestamped page events. The
//! simulator feeds them to a [`SiteController`] backed by [`RecordingMap`],
//! runs the timeline to the end and returns every effect and map call in
//! time order.

use std::path::Path;

use carousel::Input;
use catalog::CatalogError;
use foundation::Millis;
use serde::{Deserialize, Serialize};
use site::{Capabilities, CarouselId, SiteConfig, SiteController, SiteEffect, SiteError};
use transition::{MapCall, RecordingMap};

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("parsing scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Site(#[from] SiteError),
}

/// Preset capability sets for the two page layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PagePreset {
    Home,
    Products,
}

impl PagePreset {
    pub fn capabilities(self) -> Capabilities {
        match self {
            PagePreset::Home => Capabilities::home_page(),
            PagePreset::Products => Capabilities::products_page(),
        }
    }
}

/// One user or browser event.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum PageEvent {
    SourcingVisibility { ratio: f64 },
    ToggleMap,
    FocusLocation {
        location: String,
        #[serde(default)]
        highlight: Option<String>,
    },
    SeeSourcing { product: String },
    SwitchCategory { key: String },
    SwitchShowcaseCategory { key: String },
    Carousel { carousel: CarouselId, input: Input },
    SectionIntersection { section: String, ratio: f64 },
    Scroll { y: f64 },
    TraceLot { code: String },
    TrackShipment { code: String },
    DemoShipment { code: String },
    CounterVisibility { id: String, ratio: f64 },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Step {
    pub at: Millis,
    #[serde(flatten)]
    pub event: PageEvent,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    /// Page layout; ignored when `capabilities` is given.
    pub page: Option<PagePreset>,
    pub capabilities: Option<Capabilities>,
    pub config: SiteConfig,
    /// Simulates a page where the map library failed to load.
    pub map_unavailable: bool,
    /// Stop time. Defaults to the last step plus `tail`.
    pub until: Option<Millis>,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_json_str(s: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    fn resolved_capabilities(&self) -> Capabilities {
        match (&self.capabilities, self.page) {
            (Some(caps), _) => caps.clone(),
            (None, Some(page)) => page.capabilities(),
            (None, None) => Capabilities::home_page(),
        }
    }
}

/// One line of simulator output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TraceLine {
    Effect { at: Millis, effect: SiteEffect },
    Map { at: Millis, call: MapCall },
    Result { at: Millis, event: String, accepted: bool },
}

impl TraceLine {
    pub fn at(&self) -> Millis {
        match self {
            TraceLine::Effect { at, .. } | TraceLine::Map { at, .. } | TraceLine::Result { at, .. } => {
                *at
            }
        }
    }
}

/// Replays `scenario`, letting the timeline run `tail` past the last step
/// when the scenario sets no stop time.
pub fn run(scenario: &Scenario, tail: Millis) -> Result<Vec<TraceLine>, SimError> {
    let adapter = if scenario.map_unavailable {
        RecordingMap::unavailable()
    } else {
        RecordingMap::new()
    };
    let mut site = SiteController::builtin(
        scenario.config.clone(),
        scenario.resolved_capabilities(),
        adapter,
    )?;

    let mut steps = scenario.steps.clone();
    steps.sort_by_key(|s| s.at);
    let until = scenario
        .until
        .unwrap_or_else(|| steps.last().map_or(Millis::ZERO, |s| s.at) + tail);

    let mut lines = Vec::new();
    for step in steps.iter().filter(|s| s.at <= until) {
        run_until(&mut site, step.at, &mut lines);
        let accepted = apply(&mut site, &step.event, step.at);
        tracing::debug!(at = %step.at, event = ?step.event, accepted, "step");
        lines.push(TraceLine::Result {
            at: step.at,
            event: event_name(&step.event).to_owned(),
            accepted,
        });
        collect_map_calls(&mut site, step.at, &mut lines);
    }
    run_until(&mut site, until, &mut lines);

    lines.extend(
        site.drain_effects()
            .into_iter()
            .map(|s| TraceLine::Effect {
                at: s.at,
                effect: s.event,
            }),
    );
    lines.sort_by_key(TraceLine::at);
    tracing::info!(lines = lines.len(), %until, "scenario finished");
    Ok(lines)
}

/// Validates the built-in catalogs and returns a short summary.
pub fn catalog_summary() -> Result<serde_json::Value, CatalogError> {
    let data = catalog::SiteData::builtin()?;
    Ok(serde_json::json!({
        "categories": data.products.keys().collect::<Vec<_>>(),
        "products": data.products.all().count(),
        "locations": data.locations.iter().map(|l| l.name.as_str()).collect::<Vec<_>>(),
        "lots": data.trace.lot_codes().collect::<Vec<_>>(),
        "shipments": data.trace.shipment_codes().collect::<Vec<_>>(),
    }))
}

fn run_until(site: &mut SiteController<RecordingMap>, until: Millis, lines: &mut Vec<TraceLine>) {
    while let Some(at) = site.run_next(until) {
        collect_map_calls(site, at, lines);
    }
    site.advance_to(until);
}

fn collect_map_calls(site: &mut SiteController<RecordingMap>, at: Millis, lines: &mut Vec<TraceLine>) {
    if let Some(map) = site.map_adapter_mut() {
        lines.extend(map.take_calls().into_iter().map(|call| TraceLine::Map { at, call }));
    }
}

fn apply(site: &mut SiteController<RecordingMap>, event: &PageEvent, now: Millis) -> bool {
    match event {
        PageEvent::SourcingVisibility { ratio } => {
            site.on_sourcing_visibility(*ratio, now);
            true
        }
        PageEvent::ToggleMap => {
            site.toggle_map(now);
            true
        }
        PageEvent::FocusLocation {
            location,
            highlight,
        } => site.focus_location(location, highlight.as_deref(), now),
        PageEvent::SeeSourcing { product } => site.see_sourcing(product, now),
        PageEvent::SwitchCategory { key } => site.switch_category(key, now),
        PageEvent::SwitchShowcaseCategory { key } => site.switch_showcase_category(key, now),
        PageEvent::Carousel { carousel, input } => site.carousel_input(*carousel, *input, now),
        PageEvent::SectionIntersection { section, ratio } => {
            site.on_section_intersection(section, *ratio, now);
            true
        }
        PageEvent::Scroll { y } => {
            site.on_scroll(*y, now);
            true
        }
        PageEvent::TraceLot { code } => site.trace_lot(code, now),
        PageEvent::TrackShipment { code } => site.track_shipment(code, now),
        PageEvent::DemoShipment { code } => site.demo_shipment(code, now),
        PageEvent::CounterVisibility { id, ratio } => site.on_counter_visibility(id, *ratio, now),
    }
}

fn event_name(event: &PageEvent) -> &'static str {
    match event {
        PageEvent::SourcingVisibility { .. } => "sourcing-visibility",
        PageEvent::ToggleMap => "toggle-map",
        PageEvent::FocusLocation { .. } => "focus-location",
        PageEvent::SeeSourcing { .. } => "see-sourcing",
        PageEvent::SwitchCategory { .. } => "switch-category",
        PageEvent::SwitchShowcaseCategory { .. } => "switch-showcase-category",
        PageEvent::Carousel { .. } => "carousel",
        PageEvent::SectionIntersection { .. } => "section-intersection",
        PageEvent::Scroll { .. } => "scroll",
        PageEvent::TraceLot { .. } => "trace-lot",
        PageEvent::TrackShipment { .. } => "track-shipment",
        PageEvent::DemoShipment { .. } => "demo-shipment",
        PageEvent::CounterVisibility { .. } => "counter-visibility",
    }
}
