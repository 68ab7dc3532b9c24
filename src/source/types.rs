//! Agent and project records as supplied by a data source.
//!
//! Records are immutable snapshots for one fetch cycle. Decoding is lenient:
//! a malformed timestamp or a non-string description becomes `None` instead
//! of failing the whole payload.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// An agent in the observed population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    #[serde(default)]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Last time the agent was seen, `None` when missing or malformed
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(default)]
    pub projects_created: u32,
    #[serde(default)]
    pub donations_made: u64,
}

impl Agent {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            last_active: None,
            projects_created: 0,
            donations_made: 0,
        }
    }

    /// Set the last-active timestamp.
    pub fn active_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_active = Some(at);
        self
    }

    /// Set the donation total.
    pub fn with_donations(mut self, donations: u64) -> Self {
        self.donations_made = donations;
        self
    }
}

/// A project published by an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "name")]
    pub title: String,
    /// Free-text description, `None` when missing or not a string
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub budget: Option<f64>,
}

impl Project {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            created_at: None,
            budget: None,
        }
    }

    /// Set the description.
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One fetch cycle worth of records. Both arrays may be empty but never absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceData {
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl SourceData {
    pub fn new(agents: Vec<Agent>, projects: Vec<Project>) -> Self {
        Self { agents, projects }
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.projects.is_empty()
    }
}

/// Deserializers that substitute `None` for malformed input.
mod lenient {
    use super::*;
    use serde::Deserializer;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Millis(i64),
        Fractional(f64),
        Text(String),
        #[allow(dead_code)]
        Other(serde::de::IgnoredAny),
    }

    pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
        Ok(raw.and_then(|raw| match raw {
            RawTimestamp::Millis(ms) => Utc.timestamp_millis_opt(ms).single(),
            RawTimestamp::Fractional(ms) if ms.is_finite() => {
                Utc.timestamp_millis_opt(ms as i64).single()
            }
            RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(text.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            _ => None,
        }))
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(serde_json::Value::String(s)) => Some(s),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_accepts_rfc3339_and_millis() {
        let json = r#"[
            {"id": "a1", "name": "Alpha", "lastActive": "2024-01-15T10:30:00Z"},
            {"id": "a2", "name": "Beta", "lastActive": 1705314600000}
        ]"#;
        let agents: Vec<Agent> = serde_json::from_str(json).unwrap();

        assert_eq!(agents[0].last_active, agents[1].last_active);
        assert!(agents[0].last_active.is_some());
    }

    #[test]
    fn test_malformed_timestamp_becomes_none() {
        let json = r#"{"id": "a1", "lastActive": "yesterday-ish"}"#;
        let agent: Agent = serde_json::from_str(json).unwrap();
        assert!(agent.last_active.is_none());

        let json = r#"{"id": "a1", "lastActive": {"nested": true}}"#;
        let agent: Agent = serde_json::from_str(json).unwrap();
        assert!(agent.last_active.is_none());
    }

    #[test]
    fn test_non_string_description_becomes_none() {
        let json = r#"{"id": "p1", "name": "Project", "description": 42}"#;
        let project: Project = serde_json::from_str(json).unwrap();

        assert_eq!(project.title, "Project");
        assert!(project.description.is_none());
    }

    #[test]
    fn test_source_data_missing_arrays_default_empty() {
        let data: SourceData = serde_json::from_str("{}").unwrap();
        assert!(data.is_empty());
    }
}
