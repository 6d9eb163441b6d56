//! Cancellable one-shot timers on a virtual millisecond clock
//!
//! Timers fire in deadline order; ties fire in scheduling order. Cancelling a
//! timer that already fired (or was never scheduled) is a no-op.
//!
//! The clock never passes [`CLOCK_CEILING`], so deadlines always stay ahead
//! of it and a periodic timer can't fire forever inside one advance.

use std::collections::{BTreeMap, HashMap};

/// Latest time the virtual clock will reach
pub const CLOCK_CEILING: u64 = u64::MAX / 2;

/// Handle returned by [`TimerQueue::schedule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    now_ms: u64,
    next_id: u64,
    /// (deadline, id) -> payload
    pending: BTreeMap<(u64, TimerId), E>,
    deadlines: HashMap<TimerId, u64>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 1,
            pending: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Current virtual time
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `event` to fire `delay_ms` from now (at least 1 ms)
    pub fn schedule(&mut self, delay_ms: u64, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.now_ms.saturating_add(delay_ms.max(1));
        self.pending.insert((deadline, id), event);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancel a timer. Returns false if it had already fired or been cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.pending.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.pending.clear();
        self.deadlines.clear();
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its deadline. Returns `None` (and moves the clock to `until`) when
    /// nothing else is due.
    pub fn pop_due(&mut self, until: u64) -> Option<(u64, TimerId, E)> {
        let until = until.min(CLOCK_CEILING);
        let key = match self.pending.keys().next() {
            Some(&(deadline, id)) if deadline <= until => (deadline, id),
            _ => {
                self.now_ms = self.now_ms.max(until);
                return None;
            }
        };
        let event = self.pending.remove(&key)?;
        self.deadlines.remove(&key.1);
        self.now_ms = self.now_ms.max(key.0);
        Some((key.0, key.1, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_deadline_then_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(300, "c");
        q.schedule(100, "a");
        q.schedule(100, "b");

        let fired: Vec<_> = std::iter::from_fn(|| q.pop_due(1000).map(|(_, _, e)| e)).collect();
        assert_eq!(fired, vec!["a", "b", "c"]);
        assert_eq!(q.now(), 1000);
        assert!(q.is_empty());
    }

    #[test]
    fn test_not_due_yet() {
        let mut q = TimerQueue::new();
        q.schedule(500, ());
        assert!(q.pop_due(499).is_none());
        assert_eq!(q.now(), 499);
        let (deadline, _, _) = q.pop_due(500).unwrap();
        assert_eq!(deadline, 500);
    }

    #[test]
    fn test_delay_is_relative_to_clock() {
        let mut q = TimerQueue::new();
        q.schedule(100, 1);
        q.pop_due(100);
        q.schedule(100, 2);
        assert!(q.pop_due(199).is_none());
        assert_eq!(q.pop_due(200).map(|(d, _, e)| (d, e)), Some((200, 2)));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut q = TimerQueue::new();
        let a = q.schedule(10, 'a');
        let b = q.schedule(20, 'b');

        assert!(q.cancel(a));
        assert!(!q.cancel(a));
        assert!(!q.is_pending(a));
        assert!(q.is_pending(b));

        assert_eq!(q.pop_due(100).map(|(_, _, e)| e), Some('b'));
        // already fired
        assert!(!q.cancel(b));
        assert!(q.pop_due(100).is_none());
    }

    #[test]
    fn test_zero_delay_clamped() {
        let mut q = TimerQueue::new();
        q.schedule(0, ());
        assert!(q.pop_due(0).is_none());
        assert!(q.pop_due(1).is_some());
    }

    #[test]
    fn test_clock_stops_at_ceiling() {
        let mut q = TimerQueue::new();
        assert!(q.pop_due(u64::MAX).is_none());
        assert_eq!(q.now(), CLOCK_CEILING);

        let t = q.schedule(u64::MAX, ());
        assert!(q.is_pending(t));
        assert!(q.pop_due(u64::MAX).is_none());
        q.schedule(5, ());
        assert!(q.pop_due(u64::MAX).is_none());
        assert_eq!(q.now(), CLOCK_CEILING);
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut q = TimerQueue::new();
        let a = q.schedule(10, ());
        q.schedule(20, ());
        q.clear();
        assert_eq!(q.len(), 0);
        assert!(!q.cancel(a));
    }
}
