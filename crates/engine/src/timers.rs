//! Virtual-clock scheduler. Tasks fire in (due time, insertion) order.

use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    seq: u64,
    queue: BTreeMap<(u64, u64), T>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            seq: 0,
            queue: BTreeMap::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now_ms
    }

    pub fn schedule(&mut self, delay_ms: u64, task: T) -> TaskId {
        let seq = self.seq;
        self.seq += 1;
        self.queue.insert((self.now_ms.saturating_add(delay_ms), seq), task);
        TaskId(seq)
    }

    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        let key = self.queue.keys().find(|(_, seq)| *seq == id.0).copied()?;
        self.queue.remove(&key)
    }

    /// Drop every pending task matching `pred`.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) {
        self.queue.retain(|_, task| !pred(task));
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_pending(&self, mut pred: impl FnMut(&T) -> bool) -> bool {
        self.queue.values().any(|t| pred(t))
    }

    /// Next task due at or before `until`. The clock moves to its due time.
    pub fn pop_due(&mut self, until: u64) -> Option<T> {
        let (&(due, seq), _) = self.queue.iter().next()?;
        if due > until {
            return None;
        }
        let task = self.queue.remove(&(due, seq))?;
        self.now_ms = self.now_ms.max(due);
        Some(task)
    }

    /// Move the clock forward without running anything.
    pub fn advance_to(&mut self, at: u64) {
        self.now_ms = self.now_ms.max(at);
    }
}
