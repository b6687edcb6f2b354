use serde::{Deserialize, Serialize};

/// Side the outgoing item exits toward. The incoming item enters from the
/// opposite side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideDirection {
    #[default]
    None,
    Left,
    Right,
}

impl SlideDirection {
    pub fn opposite(self) -> SlideDirection {
        match self {
            SlideDirection::None => SlideDirection::None,
            SlideDirection::Left => SlideDirection::Right,
            SlideDirection::Right => SlideDirection::Left,
        }
    }

    /// Side the incoming item enters from.
    pub fn enter_side(self) -> SlideDirection {
        self.opposite()
    }
}

/// Logical movement along the item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Motion {
    Forward,
    Backward,
}

/// Exit side for a move from `old` to `new`.
///
/// Moving to a higher index is forward unless the move wrapped around the
/// ring, in which case it is reversed. Which control triggered the move does
/// not matter.
pub fn slide_direction(
    old: usize,
    new: usize,
    wrapped: bool,
    forward_exit: SlideDirection,
) -> SlideDirection {
    if old == new {
        return SlideDirection::None;
    }
    if (new > old) != wrapped {
        forward_exit
    } else {
        forward_exit.opposite()
    }
}

#[cfg(test)]
mod tests {
    use super::{SlideDirection, slide_direction};

    #[test]
    fn higher_index_exits_forward_side() {
        assert_eq!(slide_direction(0, 1, false, SlideDirection::Right), SlideDirection::Right);
        assert_eq!(slide_direction(2, 1, false, SlideDirection::Right), SlideDirection::Left);
        assert_eq!(slide_direction(0, 3, false, SlideDirection::Left), SlideDirection::Left);
    }

    #[test]
    fn wrap_keeps_the_motion_direction() {
        // last -> first via next() is still forward
        assert_eq!(slide_direction(3, 0, true, SlideDirection::Right), SlideDirection::Right);
        // first -> last via previous() is still backward
        assert_eq!(slide_direction(0, 3, true, SlideDirection::Right), SlideDirection::Left);
    }

    #[test]
    fn same_index_has_no_direction() {
        assert_eq!(slide_direction(2, 2, false, SlideDirection::Left), SlideDirection::None);
        assert_eq!(SlideDirection::Left.enter_side(), SlideDirection::Right);
    }
}
