use serde::{Deserialize, Serialize};

/// Generation counter used to discard stale scheduled completions.
///
/// A component bumps its epoch whenever the state a scheduled callback
/// targets is superseded. The callback carries the epoch it was scheduled
/// under and is ignored when that no longer matches.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Epoch(u64);

impl Epoch {
    pub fn new(n: u64) -> Self {
        Epoch(n)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// Advances to the next generation and returns it.
    pub fn bump(&mut self) -> Epoch {
        self.0 = self.0.wrapping_add(1);
        *self
    }

    pub fn is_current(self, current: Epoch) -> bool {
        self == current
    }
}

#[cfg(test)]
mod tests {
    use super::Epoch;

    #[test]
    fn bump_invalidates_previous_generation() {
        let mut epoch = Epoch::default();
        let captured = epoch;
        let next = epoch.bump();
        assert_eq!(next, epoch);
        assert!(!captured.is_current(epoch));
        assert!(next.is_current(epoch));
    }
}
