//! Statistics for the topic registry

use std::sync::atomic::{AtomicUsize, Ordering};

/// Registry-wide counters
#[derive(Debug, Default)]
pub struct RegistryStats {
    /// Total topics created
    pub topics_created: AtomicUsize,
    /// Total topics released
    pub topics_released: AtomicUsize,
    /// Get-or-create and lookup calls
    pub lookups: AtomicUsize,
    /// Lookups refused because of a kind, capacity or size mismatch
    pub lookup_mismatches: AtomicUsize,
}

impl RegistryStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live topics (created - released)
    pub fn active_topics(&self) -> usize {
        let created = self.topics_created.load(Ordering::Relaxed);
        let released = self.topics_released.load(Ordering::Relaxed);
        created.saturating_sub(released)
    }

    pub(crate) fn record_created(&self) {
        self.topics_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_released(&self) {
        self.topics_released.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_mismatch(&self) {
        self.lookup_mismatches.fetch_add(1, Ordering::Relaxed);
    }
}
