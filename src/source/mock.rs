//! In-process data sources: a random population generator and a fixed fixture.

use crate::source::types::{Agent, Project, SourceData};
use crate::source::{DataSource, SourceError};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Descriptions drawn by the generator. Some carry lexicon words, most don't.
const DESCRIPTIONS: &[&str] = &[
    "Building shared memory tools so agents can create together.",
    "An exciting experiment in collaborative storytelling.",
    "Mapping where market simulations fail under stress.",
    "A curious look at emergent behaviour in agent swarms.",
    "Tracking every open issue in the federation protocol.",
    "Distributed research notes on collective intelligence.",
    "Agents that love to teach each other new skills.",
    "Reducing fear of failure in reinforcement learning loops.",
    "Holographic dashboards for system state.",
    "Ethical frameworks for automated decisions.",
];

/// Generates a random population on every fetch.
#[derive(Debug, Clone)]
pub struct MockSource {
    agents: usize,
    projects: usize,
    latency: Duration,
}

impl MockSource {
    /// Create a generator producing the given number of agents and projects.
    pub fn new(agents: usize, projects: usize) -> Self {
        Self {
            agents,
            projects,
            latency: Duration::from_millis(500),
        }
    }

    /// Set the simulated network delay applied to each fetch.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Generate one population relative to `now`.
    ///
    /// Agents were last seen up to three days ago, so roughly a third of
    /// them fall inside the activity window.
    pub fn generate(&self, now: DateTime<Utc>) -> SourceData {
        let mut rng = rand::thread_rng();
        let three_days_ms = 3 * 24 * 60 * 60 * 1000;
        let thirty_days_ms = 30 * 24 * 60 * 60 * 1000;

        let agents = (0..self.agents)
            .map(|i| Agent {
                id: format!("agent_{}", i + 1),
                name: format!("Agent {}", i + 1),
                last_active: Some(now - ChronoDuration::milliseconds(rng.gen_range(0..three_days_ms))),
                projects_created: rng.gen_range(0..5),
                donations_made: rng.gen_range(0..10) * 100,
            })
            .collect();

        let projects = (0..self.projects)
            .map(|i| Project {
                id: format!("project_{}", i + 1),
                title: format!("Project {}", i + 1),
                description: Some(DESCRIPTIONS[rng.gen_range(0..DESCRIPTIONS.len())].to_string()),
                created_at: Some(now - ChronoDuration::milliseconds(rng.gen_range(0..thirty_days_ms))),
                budget: Some(f64::from(rng.gen_range(0..50u32)) * 1000.0),
            })
            .collect();

        SourceData { agents, projects }
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new(20, 15)
    }
}

impl DataSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(&self) -> impl Future<Output = Result<SourceData, SourceError>> + Send {
        async move {
            tokio::time::sleep(self.latency).await;
            Ok(self.generate(Utc::now()))
        }
    }
}

/// Returns the same records on every fetch.
#[derive(Debug, Clone, Default)]
pub struct FixedSource {
    data: SourceData,
}

impl FixedSource {
    pub fn new(data: SourceData) -> Self {
        Self { data }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl DataSource for FixedSource {
    fn name(&self) -> &str {
        "fixed"
    }

    fn fetch(&self) -> impl Future<Output = Result<SourceData, SourceError>> + Send {
        let data = self.data.clone();
        async move { Ok(data) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_counts() {
        let source = MockSource::new(20, 15);
        let data = source.generate(Utc::now());

        assert_eq!(data.agents.len(), 20);
        assert_eq!(data.projects.len(), 15);
        assert!(data.projects.iter().all(|p| p.description.is_some()));
    }

    #[test]
    fn test_generated_agents_are_in_the_past() {
        let now = Utc::now();
        let data = MockSource::new(50, 0).generate(now);

        for agent in &data.agents {
            let seen = agent.last_active.unwrap();
            assert!(seen <= now);
            assert!(now - seen < ChronoDuration::days(3));
        }
    }

    #[tokio::test]
    async fn test_mock_fetch() {
        let source = MockSource::new(3, 2).with_latency(Duration::ZERO);
        let data = source.fetch().await.unwrap();
        assert_eq!(data.agents.len(), 3);
    }

    #[tokio::test]
    async fn test_fixed_source_returns_same_data() {
        let data = SourceData::new(vec![Agent::new("a1", "Alpha")], vec![]);
        let source = FixedSource::new(data.clone());

        assert_eq!(source.fetch().await.unwrap(), data);
        assert_eq!(source.fetch().await.unwrap(), data);
    }
}
