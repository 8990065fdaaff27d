use anyhow::Result;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub type TimerId = u32;

struct TimerEntry<C> {
    callback: C,
    next_fire: Instant,
    interval: Option<Duration>,
}

/// One-shot and repeating callback scheduler, owned exclusively by the
/// script thread (no locking). Timeout and interval ids share one space;
/// `C` is whatever token the dispatcher needs to invoke a callback (the
/// script host stores function names).
///
/// A firing callback may clear or re-arm any handle, including its own:
/// due ids are snapshotted first, each is re-checked before dispatch, and
/// reschedule/removal only applies if the handle survived the callback.
pub struct TimerScheduler<C> {
    entries: HashMap<TimerId, TimerEntry<C>>,
    next_id: TimerId,
}

impl<C: Clone> TimerScheduler<C> {
    pub fn new() -> Self {
        Self { entries: HashMap::new(), next_id: 0 }
    }

    pub fn set_timeout(&mut self, callback: C, delay: Duration, now: Instant) -> TimerId {
        self.insert(callback, now + delay, None)
    }

    pub fn set_interval(&mut self, callback: C, every: Duration, now: Instant) -> TimerId {
        self.insert(callback, now + every, Some(every))
    }

    /// Cancels a timeout or interval. Unknown ids are a no-op.
    pub fn clear(&mut self, id: TimerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_fire(&self, id: TimerId) -> Option<Instant> {
        self.entries.get(&id).map(|entry| entry.next_fire)
    }

    /// Ids due at `now`, in id order. Callers must not rely on the relative
    /// order of distinct ids; sorting just keeps runs reproducible.
    pub fn due(&self, now: Instant) -> Vec<TimerId> {
        let mut ids: Vec<TimerId> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.next_fire <= now)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Fetches the callback token for a due id, or `None` if another
    /// callback cleared it since `due` was taken.
    pub fn begin_fire(&self, id: TimerId) -> Option<C> {
        self.entries.get(&id).map(|entry| entry.callback.clone())
    }

    /// Reschedules an interval or retires a one-shot, if the handle still
    /// exists after its callback ran.
    pub fn finish_fire(&mut self, id: TimerId, now: Instant) {
        let interval = match self.entries.get(&id) {
            Some(entry) => entry.interval,
            None => return,
        };
        match interval {
            Some(every) => {
                if let Some(entry) = self.entries.get_mut(&id) {
                    entry.next_fire = now + every;
                }
            }
            None => {
                self.entries.remove(&id);
            }
        }
    }

    /// Collects due handles and dispatches each at most once. A failing
    /// callback is logged and swallowed; the handle still counts as fired
    /// and is rescheduled or retired as usual.
    pub fn tick<F>(&mut self, now: Instant, mut invoke: F) -> usize
    where
        F: FnMut(TimerId, &C) -> Result<()>,
    {
        let mut fired = 0;
        for id in self.due(now) {
            let Some(callback) = self.begin_fire(id) else { continue };
            if let Err(err) = invoke(id, &callback) {
                eprintln!("[timers] timer {id} callback failed: {err:#}");
            }
            self.finish_fire(id, now);
            fired += 1;
        }
        fired
    }

    fn insert(&mut self, callback: C, next_fire: Instant, interval: Option<Duration>) -> TimerId {
        // Smallest unused id from a wrapping counter, checked against live
        // handles so a long-lived interval is never stomped after wrap.
        while self.entries.contains_key(&self.next_id) {
            self.next_id = self.next_id.wrapping_add(1);
        }
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.insert(id, TimerEntry { callback, next_fire, interval });
        id
    }
}

impl<C: Clone> Default for TimerScheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}
