//! The sequencer clock: deferred, cancelable one-shot actions on a single
//! logical thread.
//!
//! Actions are typed payloads rather than closures. The owner pops due
//! payloads and dispatches them itself, which keeps every callback chain
//! inspectable and replayable.

use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;

use foundation::{Millis, TimerId};

/// A scheduled action whose deadline has been reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Due<T> {
    pub id: TimerId,
    /// The instant the action was scheduled for. Dispatch should treat this,
    /// not the host's current time, as "now" so chained delays never drift.
    pub deadline: Millis,
    pub payload: T,
}

/// Anything components can schedule deferred work on.
pub trait Timers<T> {
    /// Schedules `payload` to come due `delay` after `now`.
    fn schedule(&mut self, now: Millis, delay: Millis, payload: T) -> TimerId;

    /// Prevents a not-yet-fired action from running.
    ///
    /// Returns `false` if the action already fired or was already canceled.
    fn cancel(&mut self, id: TimerId) -> bool;
}

impl<T, X> Timers<T> for &mut X
where
    X: Timers<T> + ?Sized,
{
    fn schedule(&mut self, now: Millis, delay: Millis, payload: T) -> TimerId {
        (**self).schedule(now, delay, payload)
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        (**self).cancel(id)
    }
}

// Total ordering: (deadline, sequence). Sequence is call order, so equal
// deadlines fire FIFO.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Key {
    deadline: Millis,
    seq: u64,
}

/// Deterministic one-shot timer queue.
#[derive(Debug)]
pub struct Timeline<T> {
    next_seq: u64,
    queue: BTreeMap<Key, T>,
    deadlines: HashMap<TimerId, Millis>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Earliest pending deadline, if any. Hosts use this to arm their real timer.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.queue.keys().next().map(|k| k.deadline)
    }

    /// Pops the earliest action whose deadline is `<= now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<Due<T>> {
        let key = *self.queue.keys().next()?;
        if key.deadline > now {
            return None;
        }
        let payload = self.queue.remove(&key)?;
        let id = TimerId(key.seq);
        self.deadlines.remove(&id);
        Some(Due {
            id,
            deadline: key.deadline,
            payload,
        })
    }

    /// Returns a [`Timers`] view that wraps component payloads into `T`.
    pub fn scoped<S, F>(&mut self, wrap: F) -> Scoped<'_, S, T, F>
    where
        F: Fn(S) -> T,
    {
        Scoped {
            inner: self,
            wrap,
            _payload: PhantomData,
        }
    }
}

impl<T> Timers<T> for Timeline<T> {
    fn schedule(&mut self, now: Millis, delay: Millis, payload: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        let deadline = now + delay;
        let id = TimerId(seq);
        self.queue.insert(Key { deadline, seq }, payload);
        self.deadlines.insert(id, deadline);
        tracing::trace!(timer = seq, %deadline, "scheduled");
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        let Some(deadline) = self.deadlines.remove(&id) else {
            return false;
        };
        self.queue.remove(&Key {
            deadline,
            seq: id.0,
        });
        tracing::trace!(timer = id.0, "canceled");
        true
    }
}

/// A borrowed [`Timeline`] that accepts a component's own payload type.
pub struct Scoped<'a, S, T, F> {
    inner: &'a mut Timeline<T>,
    wrap: F,
    _payload: PhantomData<fn(S)>,
}

impl<S, T, F> Timers<S> for Scoped<'_, S, T, F>
where
    F: Fn(S) -> T,
{
    fn schedule(&mut self, now: Millis, delay: Millis, payload: S) -> TimerId {
        let wrapped = (self.wrap)(payload);
        self.inner.schedule(now, delay, wrapped)
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        self.inner.cancel(id)
    }
}

impl<S, T, F> core::fmt::Debug for Scoped<'_, S, T, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scoped")
            .field("pending", &self.inner.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Timeline, Timers};
    use foundation::Millis;

    fn drain(t: &mut Timeline<&'static str>, now: u64) -> Vec<&'static str> {
        let mut out = Vec::new();
        while let Some(due) = t.pop_due(Millis(now)) {
            out.push(due.payload);
        }
        out
    }

    #[test]
    fn fires_in_deadline_order() {
        let mut t = Timeline::new();
        t.schedule(Millis(0), Millis(300), "late");
        t.schedule(Millis(0), Millis(100), "early");
        t.schedule(Millis(50), Millis(100), "middle");
        assert_eq!(drain(&mut t, 1_000), vec!["early", "middle", "late"]);
    }

    #[test]
    fn equal_deadlines_fire_in_call_order() {
        let mut t = Timeline::new();
        t.schedule(Millis(0), Millis(500), "a");
        t.schedule(Millis(200), Millis(300), "b");
        t.schedule(Millis(0), Millis(500), "c");
        assert_eq!(drain(&mut t, 500), vec!["a", "b", "c"]);
    }

    #[test]
    fn nothing_fires_before_its_deadline() {
        let mut t = Timeline::new();
        t.schedule(Millis(10), Millis(90), "x");
        assert!(t.pop_due(Millis(99)).is_none());
        assert_eq!(t.next_deadline(), Some(Millis(100)));
        let due = t.pop_due(Millis(100)).unwrap();
        assert_eq!(due.deadline, Millis(100));
        assert!(t.is_empty());
    }

    #[test]
    fn cancel_prevents_firing_and_is_idempotent() {
        let mut t = Timeline::new();
        let a = t.schedule(Millis(0), Millis(10), "a");
        t.schedule(Millis(0), Millis(20), "b");
        assert!(t.cancel(a));
        assert!(!t.cancel(a));
        assert_eq!(drain(&mut t, 100), vec!["b"]);
    }

    #[test]
    fn cancel_after_fire_is_noop() {
        let mut t = Timeline::new();
        let a = t.schedule(Millis(0), Millis(10), "a");
        assert_eq!(drain(&mut t, 10), vec!["a"]);
        assert!(!t.is_pending(a));
        assert!(!t.cancel(a));
    }

    #[derive(Debug, PartialEq)]
    enum Page {
        Deck(u8),
    }

    #[test]
    fn scoped_view_wraps_payloads() {
        let mut t: Timeline<Page> = Timeline::new();
        {
            let mut deck = t.scoped(Page::Deck);
            let id = deck.schedule(Millis(0), Millis(5), 1);
            deck.schedule(Millis(0), Millis(6), 2);
            assert!(deck.cancel(id));
        }
        let due = t.pop_due(Millis(10)).unwrap();
        assert_eq!(due.payload, Page::Deck(2));
    }
}
