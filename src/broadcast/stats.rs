//! Tick statistics.
//!
//! Counts what the scheduler did since start-up so operators can see how
//! many ticks were published, skipped or discarded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated from the tick path.
#[derive(Debug)]
pub struct TickStats {
    /// Ticks that produced and published a state
    ticks_published: AtomicU64,
    /// Ticks skipped because the data source failed
    ticks_skipped: AtomicU64,
    /// Ticks discarded because the assembled state was inconsistent
    ticks_discarded: AtomicU64,
    /// States handed to subscribers, summed over all ticks
    states_delivered: AtomicU64,
    /// When counting started
    started_at: DateTime<Utc>,
}

impl TickStats {
    pub fn new() -> Self {
        Self {
            ticks_published: AtomicU64::new(0),
            ticks_skipped: AtomicU64::new(0),
            ticks_discarded: AtomicU64::new(0),
            states_delivered: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }

    /// Record a published tick and how many subscribers received it.
    pub fn record_published(&self, delivered: usize) {
        self.ticks_published.fetch_add(1, Ordering::Relaxed);
        self.states_delivered
            .fetch_add(delivered as u64, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.ticks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discarded(&self) {
        self.ticks_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn snapshot(&self) -> TickStatsSnapshot {
        TickStatsSnapshot {
            ticks_published: self.ticks_published.load(Ordering::Relaxed),
            ticks_skipped: self.ticks_skipped.load(Ordering::Relaxed),
            ticks_discarded: self.ticks_discarded.load(Ordering::Relaxed),
            states_delivered: self.states_delivered.load(Ordering::Relaxed),
            started_at: self.started_at,
            uptime_secs: (Utc::now() - self.started_at).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        format!(
            "Tick Statistics:\n\
             - Ticks published: {}\n\
             - Ticks skipped (source unavailable): {}\n\
             - Ticks discarded (inconsistent state): {}\n\
             - States delivered to subscribers: {}\n\
             - Uptime: {} seconds",
            stats.ticks_published,
            stats.ticks_skipped,
            stats.ticks_discarded,
            stats.states_delivered,
            stats.uptime_secs
        )
    }
}

impl Default for TickStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`TickStats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickStatsSnapshot {
    pub ticks_published: u64,
    pub ticks_skipped: u64,
    pub ticks_discarded: u64,
    pub states_delivered: u64,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
}

impl TickStatsSnapshot {
    /// Every tick that ran, whatever its outcome.
    pub fn ticks_total(&self) -> u64 {
        self.ticks_published + self.ticks_skipped + self.ticks_discarded
    }
}
