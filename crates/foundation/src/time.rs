use serde::{Deserialize, Serialize};

/// Milliseconds on the page's logical timeline.
///
/// Used both as an instant (time since controller construction) and as a
/// relative delay. Integer milliseconds keep every schedule exactly
/// reproducible, which floating seconds would not.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Millis(pub u64);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    pub const fn new(ms: u64) -> Self {
        Millis(ms)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    pub fn saturating_add(self, other: Millis) -> Millis {
        Millis(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Millis) -> Millis {
        Millis(self.0.saturating_sub(other.0))
    }

    /// `self * factor`, saturating.
    pub fn times(self, factor: u64) -> Millis {
        Millis(self.0.saturating_mul(factor))
    }

    /// Converts a host timestamp (e.g. `performance.now()`) into logical time.
    ///
    /// Negative and non-finite inputs clamp to zero.
    pub fn from_f64_ms(ms: f64) -> Millis {
        if !ms.is_finite() || ms <= 0.0 {
            return Millis::ZERO;
        }
        Millis(ms.floor() as u64)
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl core::ops::Add for Millis {
    type Output = Millis;

    fn add(self, rhs: Millis) -> Millis {
        self.saturating_add(rhs)
    }
}

impl core::fmt::Display for Millis {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Half-open window `[start, end)` on the logical timeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: Millis,
    pub end: Millis,
}

impl TimeSpan {
    pub fn new(start: Millis, end: Millis) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn starting_at(start: Millis, duration: Millis) -> Self {
        Self::new(start, start + duration)
    }

    pub fn duration(&self) -> Millis {
        self.end.saturating_sub(self.start)
    }

    pub fn contains(&self, t: Millis) -> bool {
        t >= self.start && t < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::{Millis, TimeSpan};

    #[test]
    fn addition_saturates() {
        assert_eq!(Millis(u64::MAX) + Millis(1), Millis(u64::MAX));
        assert_eq!(Millis(2500) + Millis(80), Millis(2580));
    }

    #[test]
    fn host_timestamps_clamp_and_floor() {
        assert_eq!(Millis::from_f64_ms(-3.0), Millis::ZERO);
        assert_eq!(Millis::from_f64_ms(f64::NAN), Millis::ZERO);
        assert_eq!(Millis::from_f64_ms(1234.9), Millis(1234));
    }

    #[test]
    fn span_is_half_open() {
        let span = TimeSpan::starting_at(Millis(4500), Millis(1500));
        assert!(span.contains(Millis(4500)));
        assert!(span.contains(Millis(5999)));
        assert!(!span.contains(Millis(6000)));
        assert_eq!(span.duration(), Millis(1500));
    }

    #[test]
    fn serializes_as_bare_integer() {
        let json = serde_json::to_string(&Millis(700)).unwrap();
        assert_eq!(json, "700");
    }
}
