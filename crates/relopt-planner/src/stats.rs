//! Per-session counters of trait resolution outcomes.
//!
//! Updated through `&self` so concurrent searches can share one session.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
pub struct ResolveStats {
    satisfied: AtomicU64,
    converted: AtomicU64,
    enforced: AtomicU64,
    pruned: AtomicU64,
    converters_created: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveStatsSnapshot {
    pub satisfied: u64,
    pub converted: u64,
    pub enforced: u64,
    pub pruned: u64,
    pub converters_created: u64,
}

impl ResolveStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_satisfied(&self) {
        self.satisfied.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_converted(&self) {
        self.converted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_enforced(&self) {
        self.enforced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_pruned(&self) {
        self.pruned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_converter(&self) {
        self.converters_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ResolveStatsSnapshot {
        ResolveStatsSnapshot {
            satisfied: self.satisfied.load(Ordering::Relaxed),
            converted: self.converted.load(Ordering::Relaxed),
            enforced: self.enforced.load(Ordering::Relaxed),
            pruned: self.pruned.load(Ordering::Relaxed),
            converters_created: self.converters_created.load(Ordering::Relaxed),
        }
    }
}

impl ResolveStatsSnapshot {
    pub fn total(&self) -> u64 {
        self.satisfied + self.converted + self.enforced + self.pruned
    }
}
