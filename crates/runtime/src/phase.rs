use foundation::{Millis, TimerId};

use crate::timeline::Timers;

/// One named row of a phase table.
#[derive(Debug, Clone, PartialEq)]
pub struct Phase<S> {
    pub name: &'static str,
    /// Offset from the moment the plan is scheduled.
    pub offset: Millis,
    pub step: S,
}

/// A choreography expressed as a single table of named, timed steps.
///
/// Rows sharing an offset run in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct PhasePlan<S> {
    phases: Vec<Phase<S>>,
}

impl<S> Default for PhasePlan<S> {
    fn default() -> Self {
        Self { phases: Vec::new() }
    }
}

impl<S: Clone> PhasePlan<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row.
    pub fn at(mut self, offset: Millis, name: &'static str, step: S) -> Self {
        self.phases.push(Phase { name, offset, step });
        self
    }

    pub fn phases(&self) -> &[Phase<S>] {
        &self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Offset of the last row; the plan's total length.
    pub fn duration(&self) -> Millis {
        self.phases
            .iter()
            .map(|p| p.offset)
            .max()
            .unwrap_or(Millis::ZERO)
    }

    pub fn offset_of(&self, name: &str) -> Option<Millis> {
        self.phases.iter().find(|p| p.name == name).map(|p| p.offset)
    }

    /// Schedules every row relative to `now`, tagging each step into the
    /// timer payload type. Returns the ids in table order so the caller can
    /// cancel the plan as a whole.
    pub fn schedule<T, X, F>(&self, now: Millis, timers: &mut X, mut tag: F) -> Vec<TimerId>
    where
        X: Timers<T> + ?Sized,
        F: FnMut(S) -> T,
    {
        self.phases
            .iter()
            .map(|p| timers.schedule(now, p.offset, tag(p.step.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::PhasePlan;
    use crate::timeline::Timeline;
    use foundation::Millis;
    use pretty_assertions::assert_eq;

    fn plan() -> PhasePlan<&'static str> {
        PhasePlan::new()
            .at(Millis(0), "spin", "spin")
            .at(Millis(5500), "reveal", "reveal")
            .at(Millis(3000), "create", "create")
            .at(Millis(3000), "markers", "markers")
    }

    #[test]
    fn duration_is_latest_offset() {
        assert_eq!(plan().duration(), Millis(5500));
        assert_eq!(plan().offset_of("create"), Some(Millis(3000)));
        assert_eq!(plan().offset_of("missing"), None);
    }

    #[test]
    fn schedules_rows_relative_to_now() {
        let mut t = Timeline::new();
        let ids = plan().schedule(Millis(1000), &mut t, |s| (7u32, s));
        assert_eq!(ids.len(), 4);

        let mut fired = Vec::new();
        while let Some(due) = t.pop_due(Millis(10_000)) {
            fired.push((due.deadline, due.payload));
        }
        assert_eq!(
            fired,
            vec![
                (Millis(1000), (7, "spin")),
                (Millis(4000), (7, "create")),
                (Millis(4000), (7, "markers")),
                (Millis(6500), (7, "reveal")),
            ]
        );
    }
}
