use serde::Serialize;

/// A request to focus a location once the map is interactive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingFocus {
    pub location: String,
    pub highlight: Option<String>,
}

impl PendingFocus {
    pub fn new(location: impl Into<String>, highlight: Option<&str>) -> Self {
        Self {
            location: location.into(),
            highlight: highlight.map(str::to_owned),
        }
    }
}

/// Single-slot mailbox between product cards and the transition machine.
///
/// A new request overwrites the previous one; taking it empties the slot.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FocusBridge {
    slot: Option<PendingFocus>,
}

impl FocusBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `focus`, returning whatever it replaced.
    pub fn post(&mut self, focus: PendingFocus) -> Option<PendingFocus> {
        self.slot.replace(focus)
    }

    pub fn take(&mut self) -> Option<PendingFocus> {
        self.slot.take()
    }

    pub fn peek(&self) -> Option<&PendingFocus> {
        self.slot.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::{FocusBridge, PendingFocus};

    #[test]
    fn newest_request_wins() {
        let mut bridge = FocusBridge::new();
        assert!(bridge.post(PendingFocus::new("Vietnam", None)).is_none());
        let replaced = bridge.post(PendingFocus::new("Ecuador", Some("White Shrimp")));
        assert_eq!(replaced.unwrap().location, "Vietnam");
        assert_eq!(bridge.peek().unwrap().location, "Ecuador");
    }

    #[test]
    fn take_empties_the_slot() {
        let mut bridge = FocusBridge::new();
        bridge.post(PendingFocus::new("Panama", None));
        let got = bridge.take().unwrap();
        assert_eq!(got.highlight, None);
        assert!(bridge.is_empty());
        assert!(bridge.take().is_none());
    }
}
