use std::collections::VecDeque;

use serde::Serialize;

/// Handle returned by `schedule`, usable with `cancel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Serialize)]
pub struct Timer<E> {
    pub id: TimerId,
    pub deadline_ms: u64,
    pub event: E,
}

/// Deferred events ordered by deadline, fired only when the host advances the
/// clock. Timers sharing a deadline fire in scheduling order.
#[derive(Debug, Clone, Serialize)]
pub struct TimerQueue<E> {
    pending: VecDeque<Timer<E>>,
    history: Vec<Timer<E>>,
    next_id: u64,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        TimerQueue {
            pending: VecDeque::new(),
            history: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E: Clone> TimerQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline_ms: u64, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let slot = self
            .pending
            .iter()
            .position(|timer| timer.deadline_ms > deadline_ms)
            .unwrap_or(self.pending.len());
        self.pending.insert(
            slot,
            Timer {
                id,
                deadline_ms,
                event,
            },
        );
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.id != id);
        self.pending.len() != before
    }

    /// Drop every pending timer, returning how many were discarded.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    /// Pop the earliest timer due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Timer<E>> {
        if self.pending.front()?.deadline_ms > now_ms {
            return None;
        }
        let timer = self.pending.pop_front()?;
        self.history.push(timer.clone());
        Some(timer)
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.front().map(|timer| timer.deadline_ms)
    }

    pub fn peek(&self) -> Option<&Timer<E>> {
        self.pending.front()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn pending(&self) -> impl ExactSizeIterator<Item = &Timer<E>> {
        self.pending.iter()
    }

    pub fn history(&self) -> &[Timer<E>] {
        &self.history
    }

    /// Hand the fired history to the caller and start a fresh one. Pending
    /// timers are untouched.
    pub fn take_history(&mut self) -> Vec<Timer<E>> {
        std::mem::take(&mut self.history)
    }
}

#[cfg(test)]
mod tests {
    use super::TimerQueue;

    #[test]
    fn fires_in_deadline_then_insertion_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(300, "c");
        queue.schedule(100, "a");
        queue.schedule(100, "b");
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.next_deadline(), Some(100));

        assert!(queue.pop_due(99).is_none());
        let fired: Vec<_> = std::iter::from_fn(|| queue.pop_due(1_000))
            .map(|timer| timer.event)
            .collect();
        assert_eq!(fired, vec!["a", "b", "c"]);
        assert_eq!(queue.history().len(), 3);
        assert!(queue.is_empty());
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut queue = TimerQueue::new();
        let first = queue.schedule(10, 1);
        queue.schedule(20, 2);
        assert!(queue.cancel(first));
        assert!(!queue.cancel(first));
        assert_eq!(queue.pop_due(50).map(|timer| timer.event), Some(2));
        assert_eq!(queue.history().len(), 1);
    }

    #[test]
    fn cancel_all_reports_discarded_count() {
        let mut queue = TimerQueue::new();
        queue.schedule(5, ());
        queue.schedule(6, ());
        assert_eq!(queue.cancel_all(), 2);
        assert!(queue.pop_due(u64::MAX).is_none());
        assert!(queue.history().is_empty());
    }

    #[test]
    fn taking_history_keeps_pending_timers() {
        let mut queue = TimerQueue::new();
        queue.schedule(10, "fired");
        queue.schedule(90, "later");
        assert!(queue.pop_due(50).is_some());

        let taken: Vec<_> = queue.take_history().into_iter().map(|timer| timer.event).collect();
        assert_eq!(taken, vec!["fired"]);
        assert!(queue.history().is_empty());
        assert_eq!(queue.next_deadline(), Some(90));
        assert_eq!(queue.pop_due(90).map(|timer| timer.event), Some("later"));
        assert_eq!(queue.history().len(), 1);
    }
}
