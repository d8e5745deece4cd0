//! Bounded in-memory log of slow operations.

use std::collections::VecDeque;
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;

use redop_core::{Method, SlowOperationSink};

/// One slow call.
#[derive(Debug, Clone)]
pub struct SlowOperation {
    pub owner: String,
    pub method: String,
    pub elapsed: Duration,
    pub recorded_at: SystemTime,
}

/// Keeps the most recent `capacity` slow operations for later inspection.
pub struct SlowOperationRegistry {
    capacity: usize,
    entries: Mutex<VecDeque<SlowOperation>>,
}

impl SlowOperationRegistry {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
        }
    }

    /// Recorded operations, most recent first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SlowOperation> {
        self.entries.lock().iter().rev().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl SlowOperationSink for SlowOperationRegistry {
    fn record(&self, owner: &str, method: &Method, elapsed: Duration) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        // Evict oldest when at capacity.
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(SlowOperation {
            owner: owner.to_string(),
            method: method.to_string(),
            elapsed,
            recorded_at: SystemTime::now(),
        });
    }
}
