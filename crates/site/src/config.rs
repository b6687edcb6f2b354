use carousel::CarouselConfig;
use foundation::Millis;
use serde::{Deserialize, Serialize};
use transition::TransitionConfig;

use crate::navbar::{SectionTheme, Theme};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid site config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraceConfig {
    pub lot_delay: Millis,
    pub shipment_delay: Millis,
    pub demo_delay: Millis,
    /// Stagger between journey steps appearing.
    pub step_stagger: Millis,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            lot_delay: Millis(2000),
            shipment_delay: Millis(2000),
            demo_delay: Millis(1500),
            step_stagger: Millis(200),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CounterConfig {
    pub visibility_threshold: f64,
    pub steps: u32,
    pub duration: Millis,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: 0.5,
            steps: 50,
            duration: Millis(2000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavbarConfig {
    /// Section to theme table, in priority order.
    pub sections: Vec<SectionTheme>,
    /// Scroll offset separating the hero from content when no known section
    /// is on the page.
    pub scroll_threshold: f64,
}

impl Default for NavbarConfig {
    fn default() -> Self {
        let table = [
            ("products-hero", Theme::Dark),
            ("product-spotlight", Theme::Light),
            ("mega-product-showcase", Theme::Light),
            ("product-standards", Theme::Light),
            ("supply-chain", Theme::Coral),
            ("products-cta", Theme::Light),
            ("hero", Theme::Transparent),
            ("story", Theme::Light),
            ("sourcing", Theme::Dark),
            ("products-showcase", Theme::Light),
            ("our-brands", Theme::Light),
            ("facility-showcase", Theme::Light),
            ("contact", Theme::Light),
            ("traceability-hero", Theme::Dark),
            ("tracking-display", Theme::Light),
            ("trust-verification", Theme::Dark),
            ("demo-section", Theme::Light),
            ("traceability-cta", Theme::Dark),
            ("footer", Theme::Dark),
        ];
        Self {
            sections: table
                .into_iter()
                .map(|(section, theme)| SectionTheme {
                    section: section.to_owned(),
                    theme,
                })
                .collect(),
            scroll_threshold: 100.0,
        }
    }
}

/// Every tunable constant of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub transition: TransitionConfig,
    #[serde(default = "CarouselConfig::showcase")]
    pub showcase: CarouselConfig,
    #[serde(default = "CarouselConfig::card_deck")]
    pub card_deck: CarouselConfig,
    pub tab_fade: Millis,
    pub trace: TraceConfig,
    pub counters: CounterConfig,
    pub navbar: NavbarConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            transition: TransitionConfig::default(),
            showcase: CarouselConfig::showcase(),
            card_deck: CarouselConfig::card_deck(),
            tab_fade: Millis(300),
            trace: TraceConfig::default(),
            counters: CounterConfig::default(),
            navbar: NavbarConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Parses overrides on top of the defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio = |field: &'static str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("{v} is not a fraction"),
                })
            }
        };
        ratio(
            "transition.visibility_threshold",
            self.transition.visibility_threshold,
        )?;
        ratio(
            "counters.visibility_threshold",
            self.counters.visibility_threshold,
        )?;
        if self.counters.steps == 0 {
            return Err(ConfigError::Invalid {
                field: "counters.steps",
                reason: "must be at least 1".into(),
            });
        }
        if self.transition.focus_zoom <= self.transition.overview_zoom {
            return Err(ConfigError::Invalid {
                field: "transition.focus_zoom",
                reason: "close-up zoom must exceed the overview zoom".into(),
            });
        }
        Ok(())
    }
}

/// A stat counter present on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterTarget {
    pub id: String,
    pub target: u64,
}

/// Which widgets exist on the current page. Resolved once when the
/// controller is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Capabilities {
    pub sourcing_map: bool,
    pub product_tabs: bool,
    pub showcase: bool,
    /// Number of cards in the quality deck, if the deck is present.
    pub card_deck: Option<usize>,
    pub lot_trace: bool,
    pub navbar_sections: Vec<String>,
    pub counters: Vec<CounterTarget>,
}

impl Capabilities {
    pub fn home_page() -> Self {
        Self {
            sourcing_map: true,
            product_tabs: true,
            showcase: false,
            card_deck: Some(4),
            lot_trace: true,
            navbar_sections: ["hero", "story", "sourcing", "products-showcase", "contact", "footer"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            counters: vec![
                CounterTarget {
                    id: "years".into(),
                    target: 25,
                },
                CounterTarget {
                    id: "pounds".into(),
                    target: 50_000,
                },
            ],
        }
    }

    pub fn products_page() -> Self {
        Self {
            showcase: true,
            navbar_sections: ["products-hero", "mega-product-showcase", "products-cta", "footer"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            ..Self::default()
        }
    }
}
