use std::collections::HashMap;

use foundation::Millis;
use runtime::{EventBus, Stamped};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    Coral,
    Transparent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTheme {
    pub section: String,
    pub theme: Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "kebab-case")]
pub enum NavbarEffect {
    Theme { theme: Theme },
}

/// Picks the navbar theme from whichever known section is most visible.
#[derive(Debug)]
pub struct NavbarThemer {
    sections: Vec<SectionTheme>,
    ratios: HashMap<String, f64>,
    scroll_threshold: f64,
    current: Theme,
    effects: EventBus<NavbarEffect>,
}

impl NavbarThemer {
    /// `table` is filtered down to the sections actually on the page. With
    /// none left the themer falls back to scroll position.
    pub fn new(table: &[SectionTheme], present: &[String], scroll_threshold: f64) -> Self {
        let sections = table
            .iter()
            .filter(|s| present.contains(&s.section))
            .cloned()
            .collect();
        Self {
            sections,
            ratios: HashMap::new(),
            scroll_threshold,
            current: Theme::Light,
            effects: EventBus::new(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.current
    }

    pub fn uses_scroll_fallback(&self) -> bool {
        self.sections.is_empty()
    }

    /// Applies the initial theme: the first present section's, or dark for
    /// the hero when falling back to scroll position.
    pub fn init(&mut self, now: Millis) {
        let initial = self.sections.first().map_or(Theme::Dark, |s| s.theme);
        self.set(initial, now);
    }

    /// Intersection observation for `section`. A ratio of zero means it left
    /// the viewport.
    pub fn on_intersection(&mut self, section: &str, ratio: f64, now: Millis) {
        if !self.sections.iter().any(|s| s.section == section) {
            return;
        }
        if ratio > 0.0 {
            self.ratios.insert(section.to_owned(), ratio);
        } else {
            self.ratios.remove(section);
        }

        let mut best: Option<(&SectionTheme, f64)> = None;
        for s in &self.sections {
            let Some(&r) = self.ratios.get(&s.section) else {
                continue;
            };
            if best.is_none_or(|(_, max)| r > max) {
                best = Some((s, r));
            }
        }
        if let Some(theme) = best.map(|(s, _)| s.theme) {
            self.set(theme, now);
        }
    }

    pub fn on_scroll(&mut self, scroll_y: f64, now: Millis) {
        if !self.uses_scroll_fallback() {
            return;
        }
        let theme = if scroll_y < self.scroll_threshold {
            Theme::Dark
        } else {
            Theme::Light
        };
        self.set(theme, now);
    }

    pub fn drain_effects(&mut self) -> Vec<Stamped<NavbarEffect>> {
        self.effects.drain()
    }

    fn set(&mut self, theme: Theme, now: Millis) {
        if theme == self.current {
            return;
        }
        tracing::debug!(from = ?self.current, to = ?theme, "navbar theme");
        self.current = theme;
        self.effects.emit(now, NavbarEffect::Theme { theme });
    }
}
