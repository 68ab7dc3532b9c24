//! Shared view of the latest state, its history and its subscribers.
//!
//! The scheduler is the only writer. Readers (HTTP handlers, subscribers,
//! the CLI) only ever see whole states behind an `Arc`.

use crate::broadcast::stats::{TickStats, TickStatsSnapshot};
use crate::core::history::HistoryBuffer;
use crate::core::mood::{Mood, MoodBreakdown};
use crate::core::snapshot::CollectivePsychologyState;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::broadcast;
use uuid::Uuid;

/// A published state.
pub type SharedState = Arc<CollectivePsychologyState>;

/// States queued per subscriber before a slow one starts losing old states.
pub const SUBSCRIBER_BUFFER: usize = 16;

/// Readings kept for charting.
#[derive(Debug)]
struct Histories {
    pulse: HistoryBuffer<f64>,
    temperature: HistoryBuffer<f64>,
    mood: HistoryBuffer<Mood>,
}

struct HubInner {
    instance_id: Uuid,
    latest: RwLock<Option<SharedState>>,
    histories: Mutex<Histories>,
    sender: broadcast::Sender<SharedState>,
    stats: TickStats,
}

/// Cloneable handle to the published metrics.
#[derive(Clone)]
pub struct MetricsHub {
    inner: Arc<HubInner>,
}

impl MetricsHub {
    /// Create a hub keeping `history_capacity` readings per series.
    pub fn new(history_capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(SUBSCRIBER_BUFFER);

        Self {
            inner: Arc::new(HubInner {
                instance_id: Uuid::new_v4(),
                latest: RwLock::new(None),
                histories: Mutex::new(Histories {
                    pulse: HistoryBuffer::new(history_capacity),
                    temperature: HistoryBuffer::new(history_capacity),
                    mood: HistoryBuffer::new(history_capacity),
                }),
                sender,
                stats: TickStats::new(),
            }),
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.inner.instance_id
    }

    /// The most recently published state, if any. Never waits for a tick.
    pub fn latest(&self) -> Option<SharedState> {
        self.inner
            .latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recent pulse readings, most-recent-last.
    pub fn pulse_history(&self) -> Vec<f64> {
        self.histories(|h| h.pulse.snapshot())
    }

    /// Recent temperature readings, most-recent-last.
    pub fn temperature_history(&self) -> Vec<f64> {
        self.histories(|h| h.temperature.snapshot())
    }

    /// Share of each mood over the recent readings.
    pub fn mood_breakdown(&self) -> MoodBreakdown {
        self.histories(|h| MoodBreakdown::from_moods(h.mood.iter()))
    }

    /// Register a subscriber. Every published state is delivered to it.
    pub fn subscribe(&self) -> broadcast::Receiver<SharedState> {
        self.inner.sender.subscribe()
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.sender.receiver_count()
    }

    pub fn stats(&self) -> TickStatsSnapshot {
        self.inner.stats.snapshot()
    }

    pub fn stats_summary(&self) -> String {
        self.inner.stats.summary()
    }

    /// Publish a freshly assembled state.
    ///
    /// Replaces the latest state, fans it out to subscribers and appends its
    /// readings to the histories. Returns the number of subscribers reached.
    pub(crate) fn publish(&self, state: CollectivePsychologyState) -> usize {
        let state = Arc::new(state);

        *self
            .inner
            .latest
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&state));

        // send() fails only when nobody is subscribed
        let delivered = self.inner.sender.send(Arc::clone(&state)).unwrap_or(0);

        {
            let mut histories = self
                .inner
                .histories
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            histories.pulse.push(state.pulse());
            histories.temperature.push(state.temperature());
            histories.mood.push(state.mood());
        }

        self.inner.stats.record_published(delivered);
        delivered
    }

    pub(crate) fn record_skipped(&self) {
        self.inner.stats.record_skipped();
    }

    pub(crate) fn record_discarded(&self) {
        self.inner.stats.record_discarded();
    }

    fn histories<R>(&self, read: impl FnOnce(&Histories) -> R) -> R {
        let histories = self
            .inner
            .histories
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        read(&histories)
    }
}

impl std::fmt::Debug for MetricsHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsHub")
            .field("instance_id", &self.inner.instance_id)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
