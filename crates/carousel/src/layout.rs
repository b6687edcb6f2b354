use serde::Serialize;

/// Visual pose of one card in the deck.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CardPose {
    /// Horizontal translation in percent of the card width.
    pub translate_pct: f64,
    pub rotate_y_deg: f64,
    pub scale: f64,
    pub opacity: f64,
    pub z_index: i32,
    pub active: bool,
}

/// Pose for card `index` when `current` is centered and the deck is being
/// dragged by `drag_fraction` of its width (positive is rightward).
pub fn card_pose(index: usize, current: usize, count: usize, drag_fraction: f64) -> CardPose {
    let offset = (index as f64 - current as f64) * 100.0;
    let abs_offset = offset.abs();
    let translate = offset + drag_fraction * 100.0;
    let abs_translate = translate.abs();
    let opacity = if abs_offset == 0.0 {
        1.0
    } else {
        (1.0 - abs_offset * 0.003).max(0.4)
    };
    CardPose {
        translate_pct: translate,
        rotate_y_deg: abs_translate * 0.3,
        scale: 1.0 - abs_translate * 0.001,
        opacity,
        z_index: count as i32 - (abs_offset / 100.0).floor() as i32,
        active: index == current,
    }
}

/// Poses for every card in a deck of `count`.
pub fn deck_poses(current: usize, count: usize, drag_fraction: f64) -> Vec<CardPose> {
    (0..count)
        .map(|i| card_pose(i, current, count, drag_fraction))
        .collect()
}
