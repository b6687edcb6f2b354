use catalog::{Product, ProductCatalog};
use foundation::{Epoch, Millis, TimerId};
use runtime::{EventBus, Stamped, Timers};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabTimer {
    Swap { epoch: Epoch, category: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "kebab-case")]
pub enum TabEffect {
    ActiveTab { category: String },
    FadeOut,
    /// Clears the product list and rebuilds it from `products`.
    Render {
        category: String,
        products: Vec<Product>,
    },
    FadeIn,
}

/// Product category tabs. The list is replaced behind a fade-out/fade-in
/// pair; a newer switch supersedes one still fading.
#[derive(Debug)]
pub struct CategoryTabs {
    current: String,
    fade: Millis,
    epoch: Epoch,
    pending: Option<TimerId>,
    effects: EventBus<TabEffect>,
}

impl CategoryTabs {
    /// Renders `initial` immediately, without a fade.
    pub fn new(initial: &str, fade: Millis, catalog: &ProductCatalog, now: Millis) -> Self {
        let mut tabs = Self {
            current: initial.to_owned(),
            fade,
            epoch: Epoch::default(),
            pending: None,
            effects: EventBus::new(),
        };
        tabs.render(initial, catalog, now);
        tabs
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn is_fading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn switch_category(
        &mut self,
        key: &str,
        now: Millis,
        timers: &mut impl Timers<TabTimer>,
    ) -> bool {
        if key == self.current && self.pending.is_none() {
            return false;
        }
        if let Some(id) = self.pending.take() {
            timers.cancel(id);
        }
        let epoch = self.epoch.bump();
        self.current = key.to_owned();
        self.effects.emit(
            now,
            TabEffect::ActiveTab {
                category: key.to_owned(),
            },
        );
        self.effects.emit(now, TabEffect::FadeOut);
        self.pending = Some(timers.schedule(
            now,
            self.fade,
            TabTimer::Swap {
                epoch,
                category: key.to_owned(),
            },
        ));
        true
    }

    pub fn fire(&mut self, now: Millis, timer: TabTimer, catalog: &ProductCatalog) {
        let TabTimer::Swap { epoch, category } = timer;
        if epoch != self.epoch {
            tracing::warn!(%category, "discarding stale tab swap");
            return;
        }
        self.pending = None;
        self.render(&category, catalog, now);
        self.effects.emit(now, TabEffect::FadeIn);
    }

    pub fn drain_effects(&mut self) -> Vec<Stamped<TabEffect>> {
        self.effects.drain()
    }

    fn render(&mut self, category: &str, catalog: &ProductCatalog, now: Millis) {
        let products = catalog.products(category).to_vec();
        if products.is_empty() {
            tracing::debug!(category, "no products for category");
        }
        self.effects.emit(
            now,
            TabEffect::Render {
                category: category.to_owned(),
                products,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryTabs, TabEffect, TabTimer};
    use catalog::SiteData;
    use foundation::Millis;
    use runtime::Timeline;

    fn rendered(tabs: &mut CategoryTabs) -> Vec<(String, usize)> {
        tabs.drain_effects()
            .into_iter()
            .filter_map(|s| match s.event {
                TabEffect::Render { category, products } => Some((category, products.len())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn swap_happens_after_fade() {
        let data = SiteData::builtin().unwrap();
        let mut timeline: Timeline<TabTimer> = Timeline::new();
        let mut tabs = CategoryTabs::new("shrimp", Millis(300), &data.products, Millis(0));
        assert_eq!(rendered(&mut tabs), vec![("shrimp".to_string(), 4)]);

        assert!(tabs.switch_category("fish", Millis(1000), &mut timeline));
        assert_eq!(tabs.current(), "fish");
        assert!(timeline.pop_due(Millis(1299)).is_none());
        let due = timeline.pop_due(Millis(1300)).unwrap();
        tabs.fire(due.deadline, due.payload, &data.products);
        assert_eq!(rendered(&mut tabs), vec![("fish".to_string(), 5)]);
        assert!(!tabs.is_fading());
    }

    #[test]
    fn newer_switch_supersedes_fading_one() {
        let data = SiteData::builtin().unwrap();
        let mut timeline: Timeline<TabTimer> = Timeline::new();
        let mut tabs = CategoryTabs::new("shrimp", Millis(300), &data.products, Millis(0));
        tabs.drain_effects();

        tabs.switch_category("fish", Millis(0), &mut timeline);
        tabs.switch_category("ethnic", Millis(100), &mut timeline);
        while let Some(due) = timeline.pop_due(Millis(1000)) {
            tabs.fire(due.deadline, due.payload, &data.products);
        }
        assert_eq!(rendered(&mut tabs), vec![("ethnic".to_string(), 3)]);
    }

    #[test]
    fn superseded_swap_is_dropped() {
        let data = SiteData::builtin().unwrap();
        let mut timeline: Timeline<TabTimer> = Timeline::new();
        let mut tabs = CategoryTabs::new("shrimp", Millis(300), &data.products, Millis(0));
        tabs.switch_category("fish", Millis(0), &mut timeline);
        tabs.drain_effects();

        let due = timeline.pop_due(Millis(300)).unwrap();
        tabs.epoch.bump();
        tabs.fire(due.deadline, due.payload, &data.products);

        assert!(tabs.drain_effects().is_empty());
        assert_eq!(tabs.current(), "fish");
        assert!(tabs.is_fading());
        assert!(timeline.is_empty());
    }

    #[test]
    fn unknown_category_renders_empty_list() {
        let data = SiteData::builtin().unwrap();
        let mut timeline: Timeline<TabTimer> = Timeline::new();
        let mut tabs = CategoryTabs::new("shrimp", Millis(300), &data.products, Millis(0));
        tabs.drain_effects();
        tabs.switch_category("caviar", Millis(0), &mut timeline);
        let due = timeline.pop_due(Millis(300)).unwrap();
        tabs.fire(due.deadline, due.payload, &data.products);
        assert_eq!(rendered(&mut tabs), vec![("caviar".to_string(), 0)]);
    }

    #[test]
    fn reselecting_current_tab_is_a_noop() {
        let data = SiteData::builtin().unwrap();
        let mut timeline: Timeline<TabTimer> = Timeline::new();
        let mut tabs = CategoryTabs::new("shrimp", Millis(300), &data.products, Millis(0));
        assert!(!tabs.switch_category("shrimp", Millis(0), &mut timeline));
        assert!(timeline.is_empty());
    }
}
