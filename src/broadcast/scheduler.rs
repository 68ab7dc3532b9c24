//! Periodic assemble-and-broadcast loop.
//!
//! One background task owns the timer. Each tick fetches from the data
//! source, assembles a state and publishes it through the [`MetricsHub`].
//! Ticks run inside the loop body, so a slow fetch delays the next tick
//! instead of overlapping with it. Subscribers never get their own timer.
//!
//! ```text
//!            start()                 stop()
//!   Idle ─────────────▶ Ticking ─────────────▶ Idle
//!                        │  ▲
//!                        └──┘ every interval: fetch → assemble → publish
//! ```

use crate::broadcast::hub::MetricsHub;
use crate::core::snapshot::{AssemblyError, SnapshotAssembler};
use crate::source::{DataSource, SourceError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Lifecycle of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Ticking,
}

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A state was published to this many subscribers
    Published { delivered: usize },
    /// The source failed; the previous state stays current
    Skipped(SourceError),
    /// The assembled state was inconsistent and dropped
    Discarded(AssemblyError),
}

/// Scheduler lifecycle errors.
#[derive(Debug)]
pub enum SchedulerError {
    AlreadyRunning,
    NotRunning,
    TaskFailed(String),
}

impl std::fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerError::AlreadyRunning => write!(f, "Scheduler is already ticking"),
            SchedulerError::NotRunning => write!(f, "Scheduler is not ticking"),
            SchedulerError::TaskFailed(e) => write!(f, "Scheduler task failed: {e}"),
        }
    }
}

impl std::error::Error for SchedulerError {}

/// Everything a tick needs, shared with the background task.
struct TickContext<S> {
    source: Arc<S>,
    assembler: Arc<SnapshotAssembler>,
    hub: MetricsHub,
    fetch_timeout: Duration,
    /// Held for a whole tick, so timer ticks and manual ticks never overlap
    tick_guard: Arc<Mutex<()>>,
}

impl<S> Clone for TickContext<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            assembler: Arc::clone(&self.assembler),
            hub: self.hub.clone(),
            fetch_timeout: self.fetch_timeout,
            tick_guard: Arc::clone(&self.tick_guard),
        }
    }
}

impl<S: DataSource> TickContext<S> {
    /// Fetch, assemble and publish.
    ///
    /// With `at` unset the reference instant is read once the fetch has
    /// resolved, so records stamped during the fetch still count as recent.
    async fn tick(&self, at: Option<DateTime<Utc>>) -> TickOutcome {
        let _guard = self.tick_guard.lock().await;

        let fetched = match tokio::time::timeout(self.fetch_timeout, self.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(self.fetch_timeout)),
        };

        let data = match fetched {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(source = self.source.name(), error = %e, "Tick skipped, keeping previous state");
                self.hub.record_skipped();
                return TickOutcome::Skipped(e);
            }
        };

        let now = at.unwrap_or_else(Utc::now);
        match self.assembler.assemble(&data, now) {
            Ok(state) => {
                let (temperature, pulse, mood) = (state.temperature(), state.pulse(), state.mood());
                let delivered = self.hub.publish(state);
                tracing::debug!(
                    temperature,
                    pulse,
                    mood = %mood,
                    agents = data.agents.len(),
                    projects = data.projects.len(),
                    delivered,
                    "Tick published"
                );
                TickOutcome::Published { delivered }
            }
            Err(e) => {
                tracing::error!(error = %e, "Tick discarded");
                self.hub.record_discarded();
                TickOutcome::Discarded(e)
            }
        }
    }
}

struct Running {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Drives ticks on a fixed interval.
pub struct BroadcastScheduler<S> {
    ctx: TickContext<S>,
    interval: Duration,
    running: Option<Running>,
}

impl<S: DataSource> BroadcastScheduler<S> {
    pub fn new(
        source: S,
        assembler: SnapshotAssembler,
        hub: MetricsHub,
        interval: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            ctx: TickContext {
                source: Arc::new(source),
                assembler: Arc::new(assembler),
                hub,
                fetch_timeout,
                tick_guard: Arc::new(Mutex::new(())),
            },
            interval,
            running: None,
        }
    }

    pub fn hub(&self) -> &MetricsHub {
        &self.ctx.hub
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> SchedulerState {
        match self.running {
            Some(ref running) if !running.task.is_finished() => SchedulerState::Ticking,
            _ => SchedulerState::Idle,
        }
    }

    /// Run one tick now, outside the timer.
    ///
    /// Waits for a tick already in progress to finish first.
    pub async fn run_tick(&self) -> TickOutcome {
        self.ctx.tick(None).await
    }

    /// Run one tick against a fixed reference instant.
    pub async fn run_tick_at(&self, now: DateTime<Utc>) -> TickOutcome {
        self.ctx.tick(Some(now)).await
    }

    /// Enter `Ticking`. The first tick fires immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        if self.state() == SchedulerState::Ticking {
            return Err(SchedulerError::AlreadyRunning);
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(tick_loop(self.ctx.clone(), self.interval, shutdown_rx));
        self.running = Some(Running { shutdown, task });

        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            source = self.ctx.source.name(),
            "Broadcast scheduler started"
        );
        Ok(())
    }

    /// Return to `Idle`.
    ///
    /// A tick already in progress runs to completion; no tick starts after
    /// this returns.
    pub async fn stop(&mut self) -> Result<(), SchedulerError> {
        let running = self.running.take().ok_or(SchedulerError::NotRunning)?;

        // the loop may already have exited; the send result does not matter
        let _ = running.shutdown.send(true);
        running
            .task
            .await
            .map_err(|e| SchedulerError::TaskFailed(e.to_string()))?;

        tracing::info!("Broadcast scheduler stopped");
        Ok(())
    }
}

async fn tick_loop<S: DataSource>(
    ctx: TickContext<S>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    // tokio::time::interval panics on a zero period
    let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }

            _ = interval.tick() => {
                if *shutdown.borrow() {
                    break;
                }
                ctx.tick(None).await;
            }
        }
    }

    tracing::debug!("Tick loop exited");
}
