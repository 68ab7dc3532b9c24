//! Collective psychology snapshot assembly.
//!
//! [`SnapshotAssembler`] turns one fetch cycle of agents and projects into a
//! [`CollectivePsychologyState`]. A state is either complete and internally
//! consistent or not produced at all.

use crate::core::lexicon::score_text;
use crate::core::metrics::{compute_pulse, compute_temperature, count_active_agents, MetricScales};
use crate::core::mood::{classify, Mood, MoodThresholds};
use crate::source::types::SourceData;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Upper bound of the derived insight scores.
pub const INSIGHT_MAX: f64 = 100.0;

/// Secondary indicators derived alongside the main three.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectiveInsights {
    /// `min(100, temperature + pulse)`
    pub resilience_score: f64,
    /// Projects per agent, scaled by 50
    pub curiosity_level: u64,
    /// Total donations in hundreds
    pub economic_activity: u64,
}

/// One immutable reading of the collective state.
///
/// Fields are read-only; a fresh instance is assembled every tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectivePsychologyState {
    temperature: f64,
    pulse: f64,
    mood: Mood,
    active_agents: usize,
    total_agents: usize,
    total_projects: usize,
    #[serde(rename = "lastUpdated")]
    computed_at: DateTime<Utc>,
    collective_insights: CollectiveInsights,
}

impl CollectivePsychologyState {
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn pulse(&self) -> f64 {
        self.pulse
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn active_agents(&self) -> usize {
        self.active_agents
    }

    pub fn total_agents(&self) -> usize {
        self.total_agents
    }

    pub fn total_projects(&self) -> usize {
        self.total_projects
    }

    pub fn computed_at(&self) -> DateTime<Utc> {
        self.computed_at
    }

    pub fn insights(&self) -> &CollectiveInsights {
        &self.collective_insights
    }

    /// Equality ignoring `computed_at`.
    pub fn same_reading(&self, other: &Self) -> bool {
        self.temperature == other.temperature
            && self.pulse == other.pulse
            && self.mood == other.mood
            && self.active_agents == other.active_agents
            && self.total_agents == other.total_agents
            && self.total_projects == other.total_projects
            && self.collective_insights == other.collective_insights
    }
}

/// An assembled state broke one of its invariants.
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyError {
    ActiveExceedsTotal { active: usize, total: usize },
    OutOfRange { field: &'static str, value: f64, max: f64 },
}

impl std::fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssemblyError::ActiveExceedsTotal { active, total } => {
                write!(f, "Inconsistent state: {active} active agents out of {total}")
            }
            AssemblyError::OutOfRange { field, value, max } => {
                write!(f, "Inconsistent state: {field} = {value} outside 0..={max}")
            }
        }
    }
}

impl std::error::Error for AssemblyError {}

/// Composes scoring, aggregation and classification into one state.
#[derive(Debug, Clone, Default)]
pub struct SnapshotAssembler {
    scales: MetricScales,
    thresholds: MoodThresholds,
}

impl SnapshotAssembler {
    pub fn new(scales: MetricScales, thresholds: MoodThresholds) -> Self {
        Self { scales, thresholds }
    }

    pub fn scales(&self) -> &MetricScales {
        &self.scales
    }

    pub fn thresholds(&self) -> &MoodThresholds {
        &self.thresholds
    }

    /// Assemble a state from one fetch cycle, stamped with `now`.
    pub fn assemble(
        &self,
        data: &SourceData,
        now: DateTime<Utc>,
    ) -> Result<CollectivePsychologyState, AssemblyError> {
        let total_agents = data.agents.len();
        let total_projects = data.projects.len();
        let active_agents = count_active_agents(&data.agents, now, self.scales.activity_window());

        let sentiments: Vec<f64> = data
            .projects
            .iter()
            .map(|project| score_text(project.description.as_deref()))
            .collect();
        let temperature = compute_temperature(&sentiments, &self.scales);

        let last_seen: Vec<_> = data.agents.iter().map(|agent| agent.last_active).collect();
        let pulse = compute_pulse(&last_seen, now, &self.scales);

        // A population with no records at all is dormant, not undecided.
        let mood = if data.is_empty() {
            Mood::Calm
        } else {
            classify(temperature, pulse, &self.thresholds)
        };

        let donations: u64 = data.agents.iter().map(|agent| agent.donations_made).sum();
        let curiosity_level = if total_agents == 0 {
            0
        } else {
            (total_projects as f64 / total_agents as f64 * 50.0).floor() as u64
        };
        let collective_insights = CollectiveInsights {
            resilience_score: (temperature + pulse).min(INSIGHT_MAX),
            curiosity_level,
            economic_activity: donations / 100,
        };

        let state = CollectivePsychologyState {
            temperature,
            pulse,
            mood,
            active_agents,
            total_agents,
            total_projects,
            computed_at: now,
            collective_insights,
        };
        self.check(&state)?;

        Ok(state)
    }

    fn check(&self, state: &CollectivePsychologyState) -> Result<(), AssemblyError> {
        if state.active_agents > state.total_agents {
            return Err(AssemblyError::ActiveExceedsTotal {
                active: state.active_agents,
                total: state.total_agents,
            });
        }

        let bounded = [
            ("temperature", state.temperature, self.scales.temperature_max),
            ("pulse", state.pulse, self.scales.pulse_max),
        ];
        for (field, value, max) in bounded {
            if !value.is_finite() || !(0.0..=max).contains(&value) {
                return Err(AssemblyError::OutOfRange { field, value, max });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::types::{Agent, Project};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_population() {
        let state = SnapshotAssembler::default()
            .assemble(&SourceData::default(), now())
            .unwrap();

        assert_eq!(state.temperature(), 50.0);
        assert_eq!(state.pulse(), 20.0);
        assert_eq!(state.mood(), Mood::Calm);
        assert_eq!(state.active_agents(), 0);
        assert_eq!(state.total_agents(), 0);
        assert_eq!(state.total_projects(), 0);
        assert_eq!(state.computed_at(), now());
    }

    #[test]
    fn test_reference_project_temperature() {
        let data = SourceData::new(
            vec![],
            vec![Project::new("p1", "Explorer").described("This project explores joy and curiosity")],
        );
        let state = SnapshotAssembler::default().assemble(&data, now()).unwrap();

        assert!((state.temperature() - 40.0).abs() < 1e-9);
        assert_eq!(state.total_projects(), 1);
    }

    #[test]
    fn test_counts_and_mood() {
        let agents = vec![
            Agent::new("a1", "Alpha").active_at(now() - Duration::hours(1)),
            Agent::new("a2", "Beta").active_at(now() - Duration::hours(2)),
            Agent::new("a3", "Gamma").active_at(now() - Duration::days(3)),
            Agent::new("a4", "Delta"),
        ];
        let projects = vec![
            Project::new("p1", "One").described("fear and anxiety everywhere"),
            Project::new("p2", "Two"),
        ];
        let state = SnapshotAssembler::default()
            .assemble(&SourceData::new(agents, projects), now())
            .unwrap();

        assert_eq!(state.active_agents(), 2);
        assert_eq!(state.total_agents(), 4);
        assert_eq!(state.pulse(), 50.0);
        // mean sentiment is (-2/4 + 0) / 2 = -0.25
        assert_eq!(state.temperature(), 57.5);
        assert_eq!(state.mood(), Mood::Neutral);
        assert!(state.active_agents() <= state.total_agents());
    }

    #[test]
    fn test_busy_population_is_excited() {
        let agents: Vec<_> = (0..5)
            .map(|i| Agent::new(format!("a{i}"), "Agent").active_at(now() - Duration::minutes(i)))
            .collect();
        let state = SnapshotAssembler::default()
            .assemble(&SourceData::new(agents, vec![]), now())
            .unwrap();

        assert_eq!(state.pulse(), 100.0);
        assert_eq!(state.mood(), Mood::Excited);
    }

    #[test]
    fn test_insights() {
        let agents = vec![
            Agent::new("a1", "Alpha").with_donations(250),
            Agent::new("a2", "Beta").with_donations(100),
        ];
        let projects = vec![Project::new("p1", "One"), Project::new("p2", "Two"), Project::new("p3", "Three")];
        let state = SnapshotAssembler::default()
            .assemble(&SourceData::new(agents, projects), now())
            .unwrap();

        let insights = state.insights();
        assert_eq!(insights.curiosity_level, 75);
        assert_eq!(insights.economic_activity, 3);
        assert_eq!(insights.resilience_score, 70.0);
    }

    #[test]
    fn test_idempotent_except_timestamp() {
        let data = SourceData::new(
            vec![Agent::new("a1", "Alpha").active_at(now() - Duration::hours(3))],
            vec![Project::new("p1", "One").described("build with love")],
        );
        let assembler = SnapshotAssembler::default();

        let first = assembler.assemble(&data, now()).unwrap();
        let second = assembler.assemble(&data, now()).unwrap();
        assert_eq!(first, second);

        let later = assembler.assemble(&data, now() + Duration::seconds(5)).unwrap();
        assert!(first.same_reading(&later));
        assert_ne!(first.computed_at(), later.computed_at());
    }

    #[test]
    fn test_out_of_range_scale_is_rejected() {
        // a low default above pulse_max escapes the clamp
        let scales = MetricScales {
            temperature_max: 100.0,
            pulse_low_default: 120.0,
            ..MetricScales::default()
        };
        let result = SnapshotAssembler::new(scales, MoodThresholds::default())
            .assemble(&SourceData::default(), now());

        assert!(matches!(result, Err(AssemblyError::OutOfRange { field: "pulse", .. })));
    }

    #[test]
    fn test_wire_format() {
        let state = SnapshotAssembler::default()
            .assemble(&SourceData::default(), now())
            .unwrap();
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["temperature"], 50.0);
        assert_eq!(json["pulse"], 20.0);
        assert_eq!(json["mood"], "calm");
        assert_eq!(json["activeAgents"], 0);
        assert_eq!(json["totalAgents"], 0);
        assert_eq!(json["totalProjects"], 0);
        assert_eq!(json["lastUpdated"], "2024-01-15T12:00:00Z");
        assert!(json["collectiveInsights"]["resilienceScore"].is_number());
    }
}
