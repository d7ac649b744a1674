//! Topic statistics tracking

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-topic counters, updated with relaxed ordering
#[derive(Debug, Default)]
pub struct TopicStats {
    /// Successful publishes
    pub messages_published: AtomicU64,
    /// Entries removed by `try_receive`
    pub messages_consumed: AtomicU64,
    /// Unread entries dropped by overwrite
    pub messages_overwritten: AtomicU64,
    /// Publishes refused (payload too large, wrong size)
    pub publishes_rejected: AtomicU64,
    /// Successful non-consuming reads
    pub messages_peeked: AtomicU64,
}

impl TopicStats {
    /// Record a successful publish
    pub fn record_published(&self) {
        self.messages_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a consumed entry
    pub fn record_consumed(&self) {
        self.messages_consumed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record entries lost to overwrite
    pub fn record_overwritten(&self, count: u64) {
        self.messages_overwritten.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a refused publish
    pub fn record_rejected(&self) {
        self.publishes_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a peek that returned data
    pub fn record_peeked(&self) {
        self.messages_peeked.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> TopicStatsSnapshot {
        TopicStatsSnapshot {
            messages_published: self.messages_published.load(Ordering::Relaxed),
            messages_consumed: self.messages_consumed.load(Ordering::Relaxed),
            messages_overwritten: self.messages_overwritten.load(Ordering::Relaxed),
            publishes_rejected: self.publishes_rejected.load(Ordering::Relaxed),
            messages_peeked: self.messages_peeked.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.messages_published.store(0, Ordering::Relaxed);
        self.messages_consumed.store(0, Ordering::Relaxed);
        self.messages_overwritten.store(0, Ordering::Relaxed);
        self.publishes_rejected.store(0, Ordering::Relaxed);
        self.messages_peeked.store(0, Ordering::Relaxed);
    }
}

/// Plain copy of [`TopicStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopicStatsSnapshot {
    pub messages_published: u64,
    pub messages_consumed: u64,
    pub messages_overwritten: u64,
    pub publishes_rejected: u64,
    pub messages_peeked: u64,
}

impl TopicStatsSnapshot {
    /// Fraction of published messages that were consumed
    pub fn delivery_ratio(&self) -> f64 {
        if self.messages_published == 0 {
            return 1.0;
        }
        self.messages_consumed as f64 / self.messages_published as f64
    }
}
