//! Thread-safe tracker handle
//!
//! The tracker itself is a plain single-owner value. When the sample source
//! (a sensor callback thread) and the reader (UI refresh) live on different
//! threads, share it through one [`SharedTracker`] so every update and every
//! read happens inside the same lock.

use crate::tracker::{SegmentTracker, TrackerEvent, TrackerState};
use crate::types::TrackerSnapshot;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle to a tracker behind a mutex
#[derive(Debug, Clone)]
pub struct SharedTracker {
    inner: Arc<Mutex<SegmentTracker>>,
}

impl SharedTracker {
    pub fn new(tracker: SegmentTracker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    // The tracker holds no invariant a panicking reader could break mid-way,
    // so a poisoned lock is taken over instead of propagated.
    fn lock(&self) -> MutexGuard<'_, SegmentTracker> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Feed one sample, see [`SegmentTracker::update_progress`]
    pub fn update_progress(&self, current_distance: f64, current_speed: f64) -> Vec<TrackerEvent> {
        self.lock().update_progress(current_distance, current_speed)
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        self.lock().snapshot()
    }

    pub fn state(&self) -> TrackerState {
        self.lock().state()
    }

    pub fn is_completed(&self) -> bool {
        self.lock().is_completed()
    }

    /// Run several reads against one consistent view of the tracker
    pub fn with_tracker<R>(&self, f: impl FnOnce(&SegmentTracker) -> R) -> R {
        let guard = self.lock();
        f(&guard)
    }
}

impl From<SegmentTracker> for SharedTracker {
    fn from(tracker: SegmentTracker) -> Self {
        Self::new(tracker)
    }
}
