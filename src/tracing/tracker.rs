//! Per-goroutine dedup of consecutive identical states.

use std::collections::HashMap;

use crate::domain::GoroutineId;

use super::decoder::GoroutineState;

/// Remembers the last *emitted* state per goroutine and decides whether a
/// new observation is worth printing.
///
/// Entries are created lazily and never evicted; a long trace of a process
/// that churns through many short-lived goroutines grows this map without
/// bound. Accepted tradeoff for a process-lifetime tracing tool.
///
/// Mutated only by the single consuming loop, so no synchronization.
pub struct StateTracker {
    dedup: bool,
    last: HashMap<GoroutineId, u32>,
}

impl StateTracker {
    /// `dedup = false` turns the tracker into a pass-through that never
    /// touches the map.
    #[must_use]
    pub fn new(dedup: bool) -> Self {
        Self { dedup, last: HashMap::new() }
    }

    /// Record an observation and report whether it should be emitted.
    ///
    /// With dedup enabled: first observation of a goid emits, a repeat of
    /// the stored state suppresses, a different state updates and emits.
    /// Suppression leaves the stored value untouched (it is already equal),
    /// so "consecutive" is judged against emitted history.
    pub fn observe(&mut self, goid: GoroutineId, state: GoroutineState) -> bool {
        if !self.dedup {
            return true;
        }
        let raw = state.raw();
        match self.last.get(&goid) {
            Some(&prev) if prev == raw => false,
            _ => {
                self.last.insert(goid, raw);
                true
            }
        }
    }

    /// Number of goroutines seen so far (0 when dedup is disabled).
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.last.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracing::decoder::GoroutineState as S;

    fn observe_all(tracker: &mut StateTracker, goid: u64, states: &[S]) -> Vec<bool> {
        states.iter().map(|&s| tracker.observe(GoroutineId(goid), s)).collect()
    }

    #[test]
    fn suppresses_consecutive_duplicates() {
        let mut tracker = StateTracker::new(true);
        let decisions = observe_all(
            &mut tracker,
            1,
            &[S::Running, S::Running, S::Waiting, S::Waiting, S::Waiting, S::Running],
        );
        assert_eq!(decisions, [true, false, true, false, false, true]);
    }

    #[test]
    fn disabled_dedup_emits_everything() {
        let mut tracker = StateTracker::new(false);
        let decisions = observe_all(
            &mut tracker,
            1,
            &[S::Running, S::Running, S::Waiting, S::Waiting, S::Waiting, S::Running],
        );
        assert_eq!(decisions, [true; 6]);
        assert_eq!(tracker.tracked(), 0);
    }

    #[test]
    fn suppression_is_per_goroutine() {
        let mut tracker = StateTracker::new(true);
        assert!(tracker.observe(GoroutineId(1), S::Running));
        assert!(tracker.observe(GoroutineId(2), S::Running));
        assert!(!tracker.observe(GoroutineId(1), S::Running));
        assert!(!tracker.observe(GoroutineId(2), S::Running));
        assert_eq!(tracker.tracked(), 2);
    }

    #[test]
    fn unknown_states_dedup_by_raw_code() {
        let mut tracker = StateTracker::new(true);
        assert!(tracker.observe(GoroutineId(5), S::Unknown(12)));
        assert!(!tracker.observe(GoroutineId(5), S::Unknown(12)));
        assert!(tracker.observe(GoroutineId(5), S::Unknown(13)));
    }
}
