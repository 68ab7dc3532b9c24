//! Periodic broadcasting of collective states.
//!
//! - [`BroadcastScheduler`] owns the single tick timer
//! - [`MetricsHub`] holds the latest state, the reading histories and the
//!   subscriber fan-out
//! - [`TickStats`] counts tick outcomes

pub mod hub;
pub mod scheduler;
pub mod stats;

// Re-export commonly used types
pub use hub::{MetricsHub, SharedState, SUBSCRIBER_BUFFER};
pub use scheduler::{BroadcastScheduler, SchedulerError, SchedulerState, TickOutcome};
pub use stats::{TickStats, TickStatsSnapshot};
