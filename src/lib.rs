//! Stoa Pulse - collective temperature, pulse and mood for agent populations.
//!
//! This library derives three indicators from a population of agents and
//! their projects and streams them to subscribers on a fixed cadence.
//!
//! # Indicators
//!
//! - **Temperature** (0-100): emotional intensity of project descriptions.
//!   Negative sentiment runs hot; 50 is neutral.
//! - **Pulse** (0-100): share of agents active in the last 24 hours.
//! - **Mood**: one of `excited`, `calm`, `anxious`, `serene`, `neutral`,
//!   classified from temperature and pulse.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Stoa Pulse                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │ DataSource  │──▶│  Assembler  │──▶│ MetricsHub  │──▶ SSE │
//! │  │ (mock/http) │   │ score→agg→  │   │ latest +    │        │
//! │  └─────────────┘   │ classify    │   │ history     │──▶ API │
//! │         ▲          └─────────────┘   └─────────────┘        │
//! │         │                                                   │
//! │  ┌─────────────┐                                            │
//! │  │  Scheduler  │  one timer, ticks never overlap            │
//! │  └─────────────┘                                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use stoa_pulse::core::{Mood, SnapshotAssembler};
//! use stoa_pulse::source::{Project, SourceData};
//!
//! let data = SourceData::new(
//!     vec![],
//!     vec![Project::new("p1", "Explorer").described("This project explores joy and curiosity")],
//! );
//! let state = SnapshotAssembler::default().assemble(&data, Utc::now()).unwrap();
//!
//! assert!((state.temperature() - 40.0).abs() < 1e-9);
//! assert_eq!(state.mood(), Mood::Neutral);
//! ```

pub mod broadcast;
pub mod config;
pub mod core;
pub mod source;

#[cfg(feature = "server")]
pub mod server;

// Re-export key types at crate root for convenience
pub use broadcast::{BroadcastScheduler, MetricsHub, SchedulerState, TickOutcome};
pub use config::{Config, SourceConfig};
pub use core::{
    CollectivePsychologyState, HistoryBuffer, MetricScales, Mood, MoodThresholds,
    SnapshotAssembler,
};
pub use source::{Agent, DataSource, FixedSource, MockSource, Project, SourceData, SourceError};

#[cfg(feature = "live")]
pub use source::HttpSource;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
