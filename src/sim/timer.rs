//! Timed effect scheduler
//!
//! Delayed and repeating effects advanced by the frame tick. Fired effects are
//! returned to the owner instead of being invoked in place, so nothing mutates
//! the owner while the scheduler is borrowed.

/// Handle to a scheduled effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Entry<E> {
    handle: TimerHandle,
    remaining: f32,
    /// Re-arm interval for repeating entries
    period: Option<f32>,
    effect: E,
}

/// Pending effects, kept in scheduling order
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    entries: Vec<Entry<E>>,
    next_handle: u64,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Negative and NaN delays fire on the next tick
#[inline]
fn normalize_delay(delay: f32) -> f32 {
    if delay > 0.0 { delay } else { 0.0 }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_handle: 1,
        }
    }

    fn allocate_handle(&mut self) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Schedule `effect` to fire once after `delay` seconds
    pub fn schedule(&mut self, delay: f32, effect: E) -> TimerHandle {
        let handle = self.allocate_handle();
        self.entries.push(Entry {
            handle,
            remaining: normalize_delay(delay),
            period: None,
            effect,
        });
        handle
    }

    /// Cancel a pending effect. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Drop every pending effect
    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    /// Seconds left before `handle` fires
    pub fn remaining(&self, handle: TimerHandle) -> Option<f32> {
        self.entries
            .iter()
            .find(|e| e.handle == handle)
            .map(|e| e.remaining.max(0.0))
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate pending effects in scheduling order
    pub fn pending(&self) -> impl Iterator<Item = &E> {
        self.entries.iter().map(|e| &e.effect)
    }
}

impl<E: Clone> Scheduler<E> {
    /// Schedule `effect` to fire every `interval` seconds until cancelled
    pub fn schedule_repeating(&mut self, interval: f32, effect: E) -> TimerHandle {
        let interval = normalize_delay(interval);
        let handle = self.allocate_handle();
        self.entries.push(Entry {
            handle,
            remaining: interval,
            period: Some(interval),
            effect,
        });
        handle
    }

    /// Advance all timers by `dt` and return the effects that fired, oldest first.
    ///
    /// A repeating entry fires at most once per call.
    pub fn tick(&mut self, dt: f32) -> Vec<E> {
        let dt = normalize_delay(dt);
        let mut fired = Vec::new();

        self.entries.retain_mut(|entry| {
            entry.remaining -= dt;
            if entry.remaining > 0.0 {
                return true;
            }
            match entry.period {
                Some(period) => {
                    fired.push(entry.effect.clone());
                    entry.remaining += period;
                    if entry.remaining <= 0.0 {
                        entry.remaining = period;
                    }
                    true
                }
                None => {
                    fired.push(entry.effect.clone());
                    false
                }
            }
        });

        fired
    }
}
