use foundation::Millis;
use serde::Serialize;

/// An effect together with the logical time it was produced at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stamped<E> {
    pub at: Millis,
    pub event: E,
}

/// Outbox of effects a component wants applied to the presentation layer.
///
/// Components never touch the DOM. They record what should happen and the
/// host drains the bus after each turn.
#[derive(Debug, Clone, PartialEq)]
pub struct EventBus<E> {
    events: Vec<Stamped<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, at: Millis, event: E) {
        self.events.push(Stamped { at, event });
    }

    pub fn events(&self) -> &[Stamped<E>] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Stamped<E>> {
        std::mem::take(&mut self.events)
    }

    /// Iterates over the events only, dropping timestamps.
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.events.iter().map(|s| &s.event)
    }
}
