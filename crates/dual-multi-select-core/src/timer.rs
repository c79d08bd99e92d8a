//! Timer system.
//!
//! Provides one-shot timers with callbacks. Timers never fire on
//! their own: the owner (usually [`Page`](crate::Page)) drives them by calling
//! [`TimerManager::process_expired`] with the current instant, which keeps
//! timing deterministic under test.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use slotmap::{new_key_type, SlotMap};

use crate::error::TimerError;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// Callback invoked when a timer fires.
pub type TimerCallback = Arc<dyn Fn() + Send + Sync>;

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.fire_time.cmp(&self.fire_time)
    }
}

/// Manages a set of timers.
pub struct TimerManager {
    /// Callbacks of all pending timers.
    timers: SlotMap<TimerId, TimerCallback>,
    /// Priority queue of pending timer fires (min-heap by fire time).
    queue: BinaryHeap<TimerQueueEntry>,
}

impl TimerManager {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
        }
    }

    /// Start a one-shot timer that fires `duration` after `now`.
    pub fn start_one_shot(
        &mut self,
        now: Instant,
        duration: Duration,
        callback: TimerCallback,
    ) -> TimerId {
        let fire_time = now + duration;
        let id = self.timers.insert(callback);
        self.queue.push(TimerQueueEntry { id, fire_time });
        tracing::trace!(target: "dual_multi_select_core::timer", ?id, ?duration, "timer started");
        id
    }

    /// Stop and remove a timer.
    ///
    /// The callback of a stopped timer is never invoked afterwards.
    pub fn stop(&mut self, id: TimerId) -> Result<(), TimerError> {
        // Stale queue entries are skipped lazily.
        self.timers
            .remove(id)
            .map(|_| ())
            .ok_or(TimerError::InvalidTimerId)
    }

    /// Check if a timer is still pending.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Collect the callbacks of every timer due at `now`.
    ///
    /// Fired timers are removed before this returns, so the caller can run
    /// the callbacks without holding any borrow of the manager.
    #[tracing::instrument(skip(self), target = "dual_multi_select_core::timer", level = "trace")]
    pub fn process_expired(&mut self, now: Instant) -> Vec<(TimerId, TimerCallback)> {
        let mut due = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            // Entries of stopped timers no longer resolve.
            let id = entry.id;
            let Some(callback) = self.timers.remove(id) else {
                continue;
            };

            tracing::trace!(target: "dual_multi_select_core::timer", ?id, "timer fired");
            due.push((id, callback));
        }

        due
    }

    /// Get the number of pending timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn counter() -> (Arc<AtomicUsize>, TimerCallback) {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let callback: TimerCallback = Arc::new(move || {
            count_clone.fetch_add(1, AtomicOrdering::SeqCst);
        });
        (count, callback)
    }

    fn run(due: Vec<(TimerId, TimerCallback)>) -> usize {
        let fired = due.len();
        for (_, callback) in due {
            callback();
        }
        fired
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut timers = TimerManager::new();
        let start = Instant::now();
        let (count, callback) = counter();

        let id = timers.start_one_shot(start, Duration::from_millis(10), callback);
        assert!(timers.is_active(id));

        assert_eq!(run(timers.process_expired(start + Duration::from_millis(5))), 0);
        assert_eq!(run(timers.process_expired(start + Duration::from_millis(10))), 1);
        assert_eq!(run(timers.process_expired(start + Duration::from_millis(50))), 0);

        assert_eq!(count.load(AtomicOrdering::SeqCst), 1);
        assert!(!timers.is_active(id));
    }

    #[test]
    fn test_stopped_timer_never_fires() {
        let mut timers = TimerManager::new();
        let start = Instant::now();
        let (count, callback) = counter();

        let id = timers.start_one_shot(start, Duration::from_millis(1), callback);
        timers.stop(id).unwrap();
        assert_eq!(timers.stop(id), Err(TimerError::InvalidTimerId));

        run(timers.process_expired(start + Duration::from_secs(1)));
        assert_eq!(count.load(AtomicOrdering::SeqCst), 0);
        assert_eq!(timers.active_count(), 0);
    }

    #[test]
    fn test_due_timers_fire_in_order() {
        let mut timers = TimerManager::new();
        let start = Instant::now();
        let (_, late) = counter();
        let (_, early) = counter();

        let late_id = timers.start_one_shot(start, Duration::from_millis(20), late);
        let early_id = timers.start_one_shot(start, Duration::from_millis(5), early);

        let fired: Vec<TimerId> = timers
            .process_expired(start + Duration::from_millis(30))
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(fired, vec![early_id, late_id]);
        assert_eq!(timers.active_count(), 0);
    }
}
