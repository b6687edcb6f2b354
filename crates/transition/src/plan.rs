use foundation::{LatLng, Millis};
use runtime::PhasePlan;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    EaseInOut,
}

/// One row of a transition phase table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Step {
    HideToggle,
    SpinGlobe(Easing),
    /// Shows the caption and staggers its letters in.
    ShowCaption,
    /// Creates the widget and one marker per location.
    CreateMap,
    /// Invalidates layout and re-enables interactions on a fresh widget.
    RefreshMap,
    Reveal { hide_caption: bool },
    InvalidateMap,
    EnableInteractions,
    Complete,
}

/// Timing and presentation constants for the sourcing transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransitionConfig {
    pub spin: Millis,
    pub caption_at: Millis,
    pub letter_stagger: Millis,
    pub create_at: Millis,
    pub refresh_at: Millis,
    pub reveal_at: Millis,
    pub complete_at: Millis,
    pub replay_reveal_at: Millis,
    pub replay_enable_at: Millis,
    pub replay_complete_at: Millis,
    /// Delay between the map becoming interactive and draining a pending focus.
    pub drain_delay: Millis,
    /// Delay before a focus request from a product card triggers the toggle.
    pub scroll_delay: Millis,
    pub pan_duration: Millis,
    pub overview_zoom: u8,
    pub focus_zoom: u8,
    pub map_center: LatLng,
    pub map_container: String,
    pub caption: String,
    /// Visible fraction of the sourcing section that starts the intro.
    pub visibility_threshold: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            spin: Millis(4000),
            caption_at: Millis(2500),
            letter_stagger: Millis(80),
            create_at: Millis(3000),
            refresh_at: Millis(3300),
            reveal_at: Millis(5500),
            complete_at: Millis(7000),
            replay_reveal_at: Millis(3800),
            replay_enable_at: Millis(4500),
            replay_complete_at: Millis(6000),
            drain_delay: Millis(500),
            scroll_delay: Millis(800),
            pan_duration: Millis(1500),
            overview_zoom: 2,
            focus_zoom: 6,
            map_center: LatLng::new(20.0, 0.0),
            map_container: "final-map".to_owned(),
            caption: "Welcome to our World".to_owned(),
            visibility_threshold: 0.3,
        }
    }
}

impl TransitionConfig {
    /// First reveal: builds the widget from scratch.
    pub fn intro_plan(&self) -> PhasePlan<Step> {
        PhasePlan::new()
            .at(Millis::ZERO, "spin", Step::SpinGlobe(Easing::Linear))
            .at(self.caption_at, "caption", Step::ShowCaption)
            .at(self.create_at, "create-map", Step::CreateMap)
            .at(self.refresh_at, "refresh", Step::RefreshMap)
            .at(self.reveal_at, "reveal", Step::Reveal { hide_caption: true })
            .at(self.complete_at, "complete", Step::Complete)
    }

    /// Later reveals: keeps the existing widget and only relayouts it.
    pub fn replay_plan(&self) -> PhasePlan<Step> {
        PhasePlan::new()
            .at(Millis::ZERO, "hide-toggle", Step::HideToggle)
            .at(Millis::ZERO, "spin", Step::SpinGlobe(Easing::EaseInOut))
            .at(self.replay_reveal_at, "reveal", Step::Reveal { hide_caption: false })
            .at(self.replay_reveal_at, "invalidate", Step::InvalidateMap)
            .at(self.replay_enable_at, "enable", Step::EnableInteractions)
            .at(self.replay_complete_at, "complete", Step::Complete)
    }

    /// Total time of the letter-by-letter caption reveal.
    pub fn caption_duration(&self) -> Millis {
        self.letter_stagger.times(self.caption.chars().count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::{Step, TransitionConfig};
    use foundation::Millis;
    use pretty_assertions::assert_eq;

    #[test]
    fn intro_table_matches_timing() {
        let cfg = TransitionConfig::default();
        let plan = cfg.intro_plan();
        let rows: Vec<_> = plan.phases().iter().map(|p| (p.name, p.offset)).collect();
        assert_eq!(
            rows,
            vec![
                ("spin", Millis(0)),
                ("caption", Millis(2500)),
                ("create-map", Millis(3000)),
                ("refresh", Millis(3300)),
                ("reveal", Millis(5500)),
                ("complete", Millis(7000)),
            ]
        );
        assert_eq!(plan.duration(), Millis(7000));
    }

    #[test]
    fn replay_reuses_widget() {
        let plan = TransitionConfig::default().replay_plan();
        assert!(plan.phases().iter().all(|p| p.step != Step::CreateMap));
        assert_eq!(plan.offset_of("enable"), Some(Millis(4500)));
        assert_eq!(plan.duration(), Millis(6000));
    }

    #[test]
    fn caption_reveal_is_stagger_times_letters() {
        let cfg = TransitionConfig {
            caption: "Hello".into(),
            ..TransitionConfig::default()
        };
        assert_eq!(cfg.caption_duration(), Millis(400));
    }

    #[test]
    fn config_overrides_merge_with_defaults() {
        let cfg: TransitionConfig = serde_json::from_str(r#"{ "focus_zoom": 8 }"#).unwrap();
        assert_eq!(cfg.focus_zoom, 8);
        assert_eq!(cfg.complete_at, Millis(7000));
        assert!(serde_json::from_str::<TransitionConfig>(r#"{ "zoom": 1 }"#).is_err());
    }
}
