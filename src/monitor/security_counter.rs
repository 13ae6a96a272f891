use crate::monitor::EventType;
use std::sync::atomic::{AtomicU64, Ordering};

/// A process-wide bag of monotonically increasing counters keyed by [EventType].
///
/// Per the design notes: no singleton/module-level mutable state. One instance is
/// constructed and owned by [crate::Validator] and passed by reference to every
/// component that needs to record an event.
pub struct SecurityEventCounter {
    counters: [AtomicU64; EventType::COUNT],
}

impl SecurityEventCounter {
    /// Creates a new [SecurityEventCounter] with every counter at zero.
    pub fn new() -> SecurityEventCounter {
        SecurityEventCounter {
            counters: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    /// Atomically increments the counter for `event_type` and returns nothing;
    /// readers pull values via [SecurityEventCounter::get].
    pub fn increment(&self, event_type: EventType) {
        self.counters[event_type.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// Reads the current value of the counter for `event_type`.
    pub fn get(&self, event_type: EventType) -> u64 {
        self.counters[event_type.index()].load(Ordering::Relaxed)
    }
}

impl Default for SecurityEventCounter {
    fn default() -> SecurityEventCounter {
        SecurityEventCounter::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_independently_per_event_type() {
        let counter = SecurityEventCounter::new();

        counter.increment(EventType::Expired);
        counter.increment(EventType::Expired);
        counter.increment(EventType::CacheHit);

        assert_eq!(counter.get(EventType::Expired), 2);
        assert_eq!(counter.get(EventType::CacheHit), 1);
        assert_eq!(counter.get(EventType::SignatureInvalid), 0);
    }
}
