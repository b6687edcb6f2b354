use std::cell::RefCell;

use carousel::Input;
use foundation::Millis;
use runtime::Stamped;
use site::{Capabilities, CarouselId, SiteConfig, SiteController, SiteEffect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

mod console;
mod dom;
mod leaflet;

use dom::DomApplier;
pub use leaflet::{LeafletMap, tooltip_html};

struct Page {
    site: SiteController<LeafletMap>,
    dom: Option<DomApplier>,
    listener: Option<js_sys::Function>,
    // performance.now() at construction; logical time counts from here.
    origin: f64,
    timeout: Option<i32>,
}

thread_local! {
    static PAGE: RefCell<Option<Page>> = const { RefCell::new(None) };
}

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn host_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

impl Page {
    fn now(&self) -> Millis {
        Millis::from_f64_ms(host_now() - self.origin)
    }

    /// Re-arms the single host timer for the earliest pending deadline.
    fn arm(&mut self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(handle) = self.timeout.take() {
            window.clear_timeout_with_handle(handle);
        }
        let Some(deadline) = self.site.next_deadline() else {
            return;
        };
        let delay = deadline.saturating_sub(self.now()).as_u64().min(i32::MAX as u64) as i32;
        let callback = Closure::once_into_js(tick);
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            delay,
        ) {
            Ok(handle) => self.timeout = Some(handle),
            Err(err) => tracing::warn!(?err, "setTimeout failed"),
        }
    }
}

/// Runs `f` against the page, then hands the drained effects to the DOM and
/// the page listener once the page borrow is released, so listeners may call
/// back in.
fn with_page<R>(f: impl FnOnce(&mut Page, Millis) -> R) -> Result<R, JsValue> {
    let (result, effects, dom, listener) = PAGE.with(|cell| {
        let mut slot = cell.borrow_mut();
        let page = slot
            .as_mut()
            .ok_or_else(|| JsValue::from_str("site not initialised"))?;
        let now = page.now();
        let result = f(page, now);
        let effects = page.site.drain_effects();
        page.arm();
        let dom = page.dom.take();
        Ok::<_, JsValue>((result, effects, dom, page.listener.clone()))
    })?;
    deliver(dom.as_ref(), listener.as_ref(), &effects);
    PAGE.with(|cell| {
        if let Some(page) = cell.borrow_mut().as_mut()
            && page.dom.is_none()
        {
            page.dom = dom;
        }
    });
    Ok(result)
}

fn deliver(
    dom: Option<&DomApplier>,
    listener: Option<&js_sys::Function>,
    effects: &[Stamped<SiteEffect>],
) {
    for stamped in effects {
        let handled = match dom {
            Some(dom) => dom.apply(&stamped.event).unwrap_or_else(|err| {
                tracing::warn!(?err, "dom update failed");
                false
            }),
            None => false,
        };
        let Some(listener) = listener else {
            continue;
        };
        let json = match serde_json::to_string(stamped) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(%err, "effect not serialisable");
                continue;
            }
        };
        if let Err(err) = listener.call2(
            &JsValue::NULL,
            &JsValue::from_str(&json),
            &JsValue::from_bool(handled),
        ) {
            tracing::warn!(?err, "effect listener threw");
        }
    }
}

fn tick() {
    if let Err(err) = with_page(|page, now| page.site.advance_to(now)) {
        web_sys::console::error_1(&err);
    }
}

const DECK_ELEMENT: &str = "qualityCardDeck";

/// Rendered width of the card deck, if it is laid out.
fn measure_deck() -> Option<f64> {
    let deck = web_sys::window()?
        .document()?
        .get_element_by_id(DECK_ELEMENT)?
        .dyn_into::<HtmlElement>()
        .ok()?;
    let width = f64::from(deck.offset_width());
    (width > 0.0).then_some(width)
}

fn sync_deck_width(site: &mut SiteController<LeafletMap>, now: Millis) {
    match measure_deck() {
        Some(width) => {
            site.carousel_input(CarouselId::Deck, Input::Resize { width }, now);
        }
        None => tracing::warn!(element = DECK_ELEMENT, "card deck has no measurable width"),
    }
}

fn carousel_id(id: &str) -> Result<CarouselId, JsValue> {
    match id {
        "showcase" => Ok(CarouselId::Showcase),
        "deck" => Ok(CarouselId::Deck),
        other => Err(JsValue::from_str(&format!("unknown carousel `{other}`"))),
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console::init();
}

/// Builds the page controller. Empty strings select the defaults; an empty
/// capability set resolves to the home page.
#[wasm_bindgen]
pub fn init(capabilities_json: &str, config_json: &str) -> Result<(), JsValue> {
    let capabilities = if capabilities_json.trim().is_empty() {
        Capabilities::home_page()
    } else {
        serde_json::from_str::<Capabilities>(capabilities_json).map_err(js_err)?
    };
    let config = if config_json.trim().is_empty() {
        SiteConfig::default()
    } else {
        SiteConfig::from_json_str(config_json).map_err(js_err)?
    };
    let site = SiteController::builtin(config, capabilities, LeafletMap).map_err(js_err)?;
    let dom = match DomApplier::new() {
        Ok(dom) => Some(dom),
        Err(err) => {
            web_sys::console::warn_1(&err);
            None
        }
    };
    let listener = PAGE.with(|cell| {
        let old = cell.borrow_mut().take()?;
        if let (Some(handle), Some(window)) = (old.timeout, web_sys::window()) {
            window.clear_timeout_with_handle(handle);
        }
        old.listener
    });
    PAGE.with(|cell| {
        *cell.borrow_mut() = Some(Page {
            site,
            dom,
            listener,
            origin: host_now(),
            timeout: None,
        });
    });
    // Flush construction-time effects and arm the first timer.
    with_page(|page, now| {
        if page.site.capabilities().card_deck.is_some() {
            sync_deck_width(&mut page.site, now);
        }
    })
}

/// Registers `f(effect_json, handled_by_wasm)`, called for every effect.
#[wasm_bindgen]
pub fn set_effect_listener(f: js_sys::Function) -> Result<(), JsValue> {
    with_page(|page, _| page.listener = Some(f))
}

#[wasm_bindgen]
pub fn on_sourcing_visibility(ratio: f64) -> Result<(), JsValue> {
    with_page(|page, now| page.site.on_sourcing_visibility(ratio, now))
}

#[wasm_bindgen]
pub fn toggle_map() -> Result<(), JsValue> {
    with_page(|page, now| page.site.toggle_map(now))
}

#[wasm_bindgen]
pub fn focus_location(location: &str, highlight: Option<String>) -> Result<bool, JsValue> {
    with_page(|page, now| {
        page.site
            .focus_location(location, highlight.as_deref(), now)
    })
}

#[wasm_bindgen]
pub fn see_sourcing(product: &str) -> Result<bool, JsValue> {
    with_page(|page, now| page.site.see_sourcing(product, now))
}

#[wasm_bindgen]
pub fn switch_category(key: &str) -> Result<bool, JsValue> {
    with_page(|page, now| page.site.switch_category(key, now))
}

#[wasm_bindgen]
pub fn switch_showcase_category(key: &str) -> Result<bool, JsValue> {
    with_page(|page, now| page.site.switch_showcase_category(key, now))
}

/// `input_json` is a tagged input such as `{"input":"go-to","index":2}`.
#[wasm_bindgen]
pub fn carousel_input(id: &str, input_json: &str) -> Result<bool, JsValue> {
    let id = carousel_id(id)?;
    let input: Input = serde_json::from_str(input_json).map_err(js_err)?;
    with_page(|page, now| {
        // The swipe threshold is a fraction of the deck's width at release.
        if id == CarouselId::Deck
            && matches!(input, Input::GestureStart { .. } | Input::GestureEnd { .. })
        {
            sync_deck_width(&mut page.site, now);
        }
        page.site.carousel_input(id, input, now)
    })
}

/// Re-measures layout-dependent widgets after the viewport changed.
#[wasm_bindgen]
pub fn on_resize() -> Result<(), JsValue> {
    with_page(|page, now| {
        if page.site.capabilities().card_deck.is_some() {
            sync_deck_width(&mut page.site, now);
        }
    })
}

/// Current deck card poses as JSON.
#[wasm_bindgen]
pub fn deck_poses() -> Result<String, JsValue> {
    let poses = with_page(|page, _| page.site.deck_poses())?
        .ok_or_else(|| JsValue::from_str("card deck is not present"))?;
    serde_json::to_string(&poses).map_err(js_err)
}

#[wasm_bindgen]
pub fn on_section_intersection(section: &str, ratio: f64) -> Result<(), JsValue> {
    with_page(|page, now| page.site.on_section_intersection(section, ratio, now))
}

#[wasm_bindgen]
pub fn on_scroll(scroll_y: f64) -> Result<(), JsValue> {
    with_page(|page, now| page.site.on_scroll(scroll_y, now))
}

#[wasm_bindgen]
pub fn trace_lot(code: &str) -> Result<bool, JsValue> {
    with_page(|page, now| page.site.trace_lot(code, now))
}

#[wasm_bindgen]
pub fn track_shipment(code: &str) -> Result<bool, JsValue> {
    with_page(|page, now| page.site.track_shipment(code, now))
}

#[wasm_bindgen]
pub fn demo_shipment(code: &str) -> Result<bool, JsValue> {
    with_page(|page, now| page.site.demo_shipment(code, now))
}

#[wasm_bindgen]
pub fn on_counter_visibility(id: &str, ratio: f64) -> Result<bool, JsValue> {
    with_page(|page, now| page.site.on_counter_visibility(id, ratio, now))
}

/// `"earth"`, `"map"`, or `undefined` when the page has no sourcing map.
#[wasm_bindgen]
pub fn map_mode() -> Result<Option<String>, JsValue> {
    with_page(|page, _| {
        page.site.mode().map(|mode| match mode {
            transition::Mode::Earth => "earth".to_owned(),
            transition::Mode::Map => "map".to_owned(),
        })
    })
}
