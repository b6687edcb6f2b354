use site::{NavbarEffect, SiteEffect, TabEffect, Theme};
use transition::{Mode, TransitionEffect};
use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

const NAVBAR_THEMES: [&str; 4] = ["theme-light", "theme-dark", "theme-coral", "theme-transparent"];

fn theme_class(theme: Theme) -> &'static str {
    match theme {
        Theme::Light => "theme-light",
        Theme::Dark => "theme-dark",
        Theme::Coral => "theme-coral",
        Theme::Transparent => "theme-transparent",
    }
}

/// Class-level presentation owned by the wasm side. Anything that builds
/// markup (product lists, trace results, showcase items) is left to the page
/// script, which receives every effect as JSON.
pub struct DomApplier {
    document: Document,
}

impl DomApplier {
    pub fn new() -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        Ok(Self { document })
    }

    /// Returns `true` when the effect was fully handled here.
    pub fn apply(&self, effect: &SiteEffect) -> Result<bool, JsValue> {
        match effect {
            SiteEffect::Transition(effect) => self.transition(effect),
            SiteEffect::Navbar(NavbarEffect::Theme { theme }) => {
                if let Some(navbar) = self.document.get_element_by_id("navbar") {
                    for class in NAVBAR_THEMES {
                        navbar.class_list().remove_1(class)?;
                    }
                    navbar.class_list().add_1(theme_class(*theme))?;
                }
                Ok(true)
            }
            SiteEffect::Tabs(TabEffect::FadeOut) => {
                self.toggle("#product-grid", "fading", true)?;
                Ok(true)
            }
            SiteEffect::Tabs(TabEffect::FadeIn) => {
                self.toggle("#product-grid", "fading", false)?;
                Ok(true)
            }
            SiteEffect::Tabs(TabEffect::ActiveTab { category }) => {
                let tabs = self.document.query_selector_all(".category-tab")?;
                for i in 0..tabs.length() {
                    let Some(tab) = tabs.get(i).and_then(element) else {
                        continue;
                    };
                    let active = tab.get_attribute("data-category").as_deref() == Some(category.as_str());
                    tab.class_list().toggle_with_force("active", active)?;
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn transition(&self, effect: &TransitionEffect) -> Result<bool, JsValue> {
        match effect {
            TransitionEffect::SpinGlobe { .. } => {
                self.toggle(".spinning-world", "fade-out", false)?;
                self.toggle(".spinning-world", "spinning", true)?;
                self.toggle(".transition-container", "transitioning", true)?;
            }
            TransitionEffect::StaticGlobe => {
                self.toggle(".spinning-world", "spinning", false)?;
                self.toggle(".spinning-world", "fade-out", false)?;
                self.toggle(".transition-container", "transitioning", false)?;
            }
            TransitionEffect::HideGlobe => {
                self.toggle(".spinning-world", "fade-out", true)?;
            }
            TransitionEffect::ShowCaption { .. } => {
                self.toggle("#welcome-message", "show", true)?;
            }
            TransitionEffect::HideCaption => {
                self.toggle("#welcome-message", "show", false)?;
            }
            TransitionEffect::ShowMap => {
                self.toggle(".interactive-map", "visible", true)?;
                self.toggle(".transition-container", "show-map", true)?;
            }
            TransitionEffect::HideMap => {
                self.toggle(".interactive-map", "visible", false)?;
                self.toggle(".transition-container", "show-map", false)?;
            }
            TransitionEffect::ShowToggle => {
                self.toggle(".replay-animation-btn", "show", true)?;
            }
            TransitionEffect::HideToggle => {
                self.toggle(".replay-animation-btn", "show", false)?;
            }
            TransitionEffect::DisableMapControls => {
                self.toggle(".transition-container", "map-unavailable", true)?;
            }
            TransitionEffect::ModeChanged { mode } => {
                self.toggle(".transition-container", "map-mode", *mode == Mode::Map)?;
            }
            // Letters are built by the page script.
            TransitionEffect::CaptionLetter { .. } => return Ok(false),
        }
        Ok(true)
    }

    fn toggle(&self, selector: &str, class: &str, on: bool) -> Result<(), JsValue> {
        if let Some(el) = self.document.query_selector(selector)? {
            el.class_list().toggle_with_force(class, on)?;
        }
        Ok(())
    }
}

fn element(node: web_sys::Node) -> Option<Element> {
    use wasm_bindgen::JsCast;
    node.dyn_into::<Element>().ok()
}
