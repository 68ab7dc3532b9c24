//! Temperature and pulse aggregation.
//!
//! Both indicators live on a `0..=max` scale defined once in [`MetricScales`]:
//!
//! - **Temperature** is emotional intensity. The mean sentiment is mapped with
//!   `neutral - gain * mean`, so negative sentiment runs hot.
//! - **Pulse** is the share of activity timestamps inside the trailing
//!   activity window, scaled to `pulse_max`.
//!
//! Results are clamped after the transform, whatever the input.

use crate::source::types::Agent;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Scale constants shared by the whole pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricScales {
    /// Upper bound of temperature (lower bound is 0)
    pub temperature_max: f64,
    /// Temperature reported when there is nothing to score
    pub temperature_neutral: f64,
    /// Temperature points per unit of mean sentiment
    pub temperature_gain: f64,
    /// Upper bound of pulse (lower bound is 0)
    pub pulse_max: f64,
    /// Pulse reported when no recent activity is observed
    pub pulse_low_default: f64,
    /// Length of the trailing activity window in hours
    pub activity_window_hours: u32,
}

impl Default for MetricScales {
    fn default() -> Self {
        Self {
            temperature_max: 100.0,
            temperature_neutral: 50.0,
            temperature_gain: 30.0,
            pulse_max: 100.0,
            pulse_low_default: 20.0,
            activity_window_hours: 24,
        }
    }
}

impl MetricScales {
    /// The trailing activity window.
    pub fn activity_window(&self) -> Duration {
        Duration::hours(i64::from(self.activity_window_hours))
    }

    /// Check that every constant sits inside its own scale.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.temperature_max.is_finite() && self.temperature_max > 0.0) {
            return Err("temperature_max must be a positive number".to_string());
        }
        if !(0.0..=self.temperature_max).contains(&self.temperature_neutral) {
            return Err("temperature_neutral must lie within 0..=temperature_max".to_string());
        }
        if !self.temperature_gain.is_finite() {
            return Err("temperature_gain must be finite".to_string());
        }
        if !(self.pulse_max.is_finite() && self.pulse_max > 0.0) {
            return Err("pulse_max must be a positive number".to_string());
        }
        if !(0.0..=self.pulse_max).contains(&self.pulse_low_default) {
            return Err("pulse_low_default must lie within 0..=pulse_max".to_string());
        }
        if self.activity_window_hours == 0 {
            return Err("activity_window_hours must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Whether `timestamp` falls in the half-open window `(now - window, now]`.
pub fn is_within_window(timestamp: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    timestamp <= now && now - timestamp < window
}

/// Reduce per-project sentiment scores to one temperature.
pub fn compute_temperature(sentiments: &[f64], scales: &MetricScales) -> f64 {
    if sentiments.is_empty() {
        return scales.temperature_neutral.clamp(0.0, scales.temperature_max);
    }

    let mean = sentiments.iter().mean();
    if !mean.is_finite() {
        return scales.temperature_neutral.clamp(0.0, scales.temperature_max);
    }

    (scales.temperature_neutral - mean * scales.temperature_gain).clamp(0.0, scales.temperature_max)
}

/// Reduce activity timestamps to one pulse value.
///
/// Missing timestamps count toward the total but never as recent. An empty
/// list, or one with nothing inside the window, reports `pulse_low_default`.
///
/// The result is not monotonic in the number of recent agents: with the
/// default scales, 0 recent out of 10 reports 20 while 1 recent out of 10
/// reports 10. Any ratio below `pulse_low_default / pulse_max` sits under
/// the "no recent activity" reading.
pub fn compute_pulse(
    timestamps: &[Option<DateTime<Utc>>],
    now: DateTime<Utc>,
    scales: &MetricScales,
) -> f64 {
    let window = scales.activity_window();
    let recent = timestamps
        .iter()
        .flatten()
        .filter(|ts| is_within_window(**ts, now, window))
        .count();

    if recent == 0 {
        return scales.pulse_low_default;
    }

    let ratio = recent as f64 / timestamps.len() as f64;
    (ratio * scales.pulse_max).clamp(0.0, scales.pulse_max)
}

/// Number of agents seen inside the activity window.
pub fn count_active_agents(agents: &[Agent], now: DateTime<Utc>, window: Duration) -> usize {
    agents
        .iter()
        .filter_map(|agent| agent.last_active)
        .filter(|ts| is_within_window(*ts, now, window))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_temperature_empty_is_neutral() {
        let scales = MetricScales::default();
        assert_eq!(compute_temperature(&[], &scales), 50.0);
    }

    #[test]
    fn test_temperature_polarity() {
        let scales = MetricScales::default();
        let negative = compute_temperature(&[-0.5], &scales);
        let positive = compute_temperature(&[0.5], &scales);

        assert_eq!(negative, 65.0);
        assert_eq!(positive, 35.0);
    }

    #[test]
    fn test_temperature_reference_value() {
        let scales = MetricScales::default();
        let temperature = compute_temperature(&[2.0 / 6.0], &scales);
        assert!((temperature - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_temperature_is_clamped() {
        let scales = MetricScales {
            temperature_gain: 500.0,
            ..MetricScales::default()
        };
        assert_eq!(compute_temperature(&[-1.0], &scales), 100.0);
        assert_eq!(compute_temperature(&[1.0], &scales), 0.0);
    }

    #[test]
    fn test_pulse_all_recent_is_max() {
        let scales = MetricScales::default();
        let stamps: Vec<_> = (0..5)
            .map(|h| Some(now() - Duration::hours(h)))
            .collect();

        assert_eq!(compute_pulse(&stamps, now(), &scales), 100.0);
    }

    #[test]
    fn test_pulse_all_stale_is_low_default() {
        let scales = MetricScales::default();
        let stamps: Vec<_> = (25..30)
            .map(|h| Some(now() - Duration::hours(h)))
            .collect();

        assert_eq!(compute_pulse(&stamps, now(), &scales), 20.0);
        assert_eq!(compute_pulse(&[], now(), &scales), 20.0);
    }

    #[test]
    fn test_pulse_single_recent_reads_below_low_default() {
        let scales = MetricScales::default();
        let mut stamps: Vec<_> = (0..10)
            .map(|i| Some(now() - Duration::hours(30 + i)))
            .collect();
        assert_eq!(compute_pulse(&stamps, now(), &scales), 20.0);

        stamps[0] = Some(now() - Duration::hours(1));
        assert_eq!(compute_pulse(&stamps, now(), &scales), 10.0);
    }

    #[test]
    fn test_pulse_ratio() {
        let scales = MetricScales::default();
        let stamps = vec![
            Some(now() - Duration::hours(1)),
            Some(now() - Duration::hours(48)),
            None,
            Some(now() - Duration::minutes(5)),
        ];

        assert_eq!(compute_pulse(&stamps, now(), &scales), 50.0);
    }

    #[test]
    fn test_window_boundaries() {
        let window = Duration::hours(24);
        assert!(is_within_window(now(), now(), window));
        assert!(is_within_window(now() - Duration::hours(23), now(), window));
        assert!(!is_within_window(now() - Duration::hours(24), now(), window));
        assert!(!is_within_window(now() + Duration::seconds(1), now(), window));
    }

    #[test]
    fn test_count_active_agents() {
        let agents = vec![
            Agent::new("a1", "Alpha").active_at(now() - Duration::hours(2)),
            Agent::new("a2", "Beta").active_at(now() - Duration::hours(30)),
            Agent::new("a3", "Gamma"),
        ];

        assert_eq!(count_active_agents(&agents, now(), Duration::hours(24)), 1);
    }

    #[test]
    fn test_scales_validation() {
        assert!(MetricScales::default().validate().is_ok());

        let bad = MetricScales {
            pulse_low_default: 150.0,
            ..MetricScales::default()
        };
        assert!(bad.validate().is_err());
    }
}
