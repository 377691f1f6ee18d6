//! Optimistic concurrency control over task submissions.
//!
//! The guard keeps one expected-version counter per task id. A submission is
//! accepted only when it carries exactly the expected version, and acceptance
//! advances the expectation by 1. Two concurrent submissions at the same
//! version therefore resolve deterministically: one wins, the other observes
//! a mismatch.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use thiserror::Error;

/// A submission carried a version the guard no longer expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("stale version: expected {expected} but got {actual}")]
pub struct StaleVersionError {
    /// Version the guard currently expects for the task.
    pub expected: u64,
    /// Version the submission carried.
    pub actual: u64,
}

/// Per-task-id expected version counters.
///
/// The outer map is read-locked to look up a task's counter and write-locked
/// only to insert a counter on first contact, so submissions for different
/// task ids never contend. Same-task submissions serialize on the counter's
/// compare-exchange.
#[derive(Debug, Default)]
pub struct VersionGuard {
    slots: RwLock<HashMap<String, Arc<AtomicU64>>>,
}

impl VersionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the submission if it matches the expected version, advancing
    /// the expectation by 1. Rejection reports both versions.
    pub fn check_and_advance(
        &self,
        task_id: &str,
        submitted: u64,
    ) -> Result<(), StaleVersionError> {
        let slot = self.slot(task_id);
        slot.compare_exchange(submitted, submitted + 1, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|current| StaleVersionError {
                expected: current,
                actual: submitted,
            })
    }

    /// The version the guard currently expects for a task.
    ///
    /// Unseen task ids expect 1, matching the version the planner assigns to
    /// fresh envelopes.
    pub fn expected(&self, task_id: &str) -> u64 {
        let slots = self.slots.read().expect("version guard lock poisoned");
        slots
            .get(task_id)
            .map(|slot| slot.load(Ordering::SeqCst))
            .unwrap_or(1)
    }

    /// Number of task ids the guard has seen.
    pub fn tracked_tasks(&self) -> usize {
        self.slots.read().expect("version guard lock poisoned").len()
    }

    fn slot(&self, task_id: &str) -> Arc<AtomicU64> {
        {
            let slots = self.slots.read().expect("version guard lock poisoned");
            if let Some(slot) = slots.get(task_id) {
                return Arc::clone(slot);
            }
        }
        let mut slots = self.slots.write().expect("version guard lock poisoned");
        Arc::clone(
            slots
                .entry(task_id.to_string())
                .or_insert_with(|| Arc::new(AtomicU64::new(1))),
        )
    }
}
