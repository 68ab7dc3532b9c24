//! Core metrics pipeline.
//!
//! This module contains:
//! - Keyword sentiment scoring of project descriptions
//! - Temperature and pulse aggregation
//! - Mood classification
//! - Fixed-capacity reading history
//! - Snapshot assembly into a collective state

pub mod history;
pub mod lexicon;
pub mod metrics;
pub mod mood;
pub mod snapshot;

// Re-export commonly used types
pub use history::{HistoryBuffer, DEFAULT_HISTORY_CAPACITY};
pub use lexicon::{count_hits, score_text, tokenize, LexiconHits};
pub use metrics::{compute_pulse, compute_temperature, count_active_agents, MetricScales};
pub use mood::{classify, Mood, MoodBreakdown, MoodThresholds};
pub use snapshot::{AssemblyError, CollectiveInsights, CollectivePsychologyState, SnapshotAssembler};
