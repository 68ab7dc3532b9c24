//! Mood classification from temperature and pulse.
//!
//! The classifier is an ordered list of inclusive threshold predicates; the
//! first one that holds decides the label:
//!
//! 1. hot and busy              -> `excited`
//! 2. cool and quiet            -> `calm`
//! 3. hot and quiet             -> `anxious`
//! 4. very busy                 -> `excited`
//! 5. very cool                 -> `serene`
//! 6. anything else             -> `neutral`

use serde::{Deserialize, Serialize};

/// Collective mood label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Excited,
    Calm,
    Anxious,
    Serene,
    Neutral,
}

impl Mood {
    /// Every label, in a fixed order.
    pub const ALL: [Mood; 5] = [
        Mood::Excited,
        Mood::Calm,
        Mood::Anxious,
        Mood::Serene,
        Mood::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Excited => "excited",
            Mood::Calm => "calm",
            Mood::Anxious => "anxious",
            Mood::Serene => "serene",
            Mood::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold constants for [`classify`]. All comparisons are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodThresholds {
    pub high: f64,
    pub low: f64,
    pub very_high: f64,
    pub very_low: f64,
}

impl Default for MoodThresholds {
    fn default() -> Self {
        Self {
            high: 70.0,
            low: 30.0,
            very_high: 80.0,
            very_low: 20.0,
        }
    }
}

impl MoodThresholds {
    pub fn validate(&self) -> Result<(), String> {
        let values = [self.high, self.low, self.very_high, self.very_low];
        if values.iter().any(|v| !v.is_finite()) {
            return Err("mood thresholds must be finite".to_string());
        }
        if self.low > self.high {
            return Err("mood threshold low must not exceed high".to_string());
        }
        Ok(())
    }
}

/// Map a (temperature, pulse) pair to a mood.
pub fn classify(temperature: f64, pulse: f64, thresholds: &MoodThresholds) -> Mood {
    let t = thresholds;

    if temperature >= t.high && pulse >= t.high {
        Mood::Excited
    } else if temperature <= t.low && pulse <= t.low {
        Mood::Calm
    } else if temperature >= t.high && pulse <= t.low {
        Mood::Anxious
    } else if pulse >= t.very_high {
        Mood::Excited
    } else if temperature <= t.very_low {
        Mood::Serene
    } else {
        Mood::Neutral
    }
}

/// Share of each mood label over a run of readings, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodBreakdown {
    pub excited: f64,
    pub calm: f64,
    pub anxious: f64,
    pub serene: f64,
    pub neutral: f64,
    /// Number of readings the percentages are computed over
    pub samples: usize,
}

impl MoodBreakdown {
    /// Compute the breakdown. With no readings every share is zero.
    pub fn from_moods<'a>(moods: impl IntoIterator<Item = &'a Mood>) -> Self {
        let mut counts = [0usize; 5];
        let mut samples = 0usize;
        for mood in moods {
            let idx = Mood::ALL.iter().position(|m| m == mood).unwrap_or(4);
            counts[idx] += 1;
            samples += 1;
        }

        let pct = |count: usize| {
            if samples == 0 {
                0.0
            } else {
                count as f64 * 100.0 / samples as f64
            }
        };

        Self {
            excited: pct(counts[0]),
            calm: pct(counts[1]),
            anxious: pct(counts[2]),
            serene: pct(counts[3]),
            neutral: pct(counts[4]),
            samples,
        }
    }

    /// The share for one label.
    pub fn share(&self, mood: Mood) -> f64 {
        match mood {
            Mood::Excited => self.excited,
            Mood::Calm => self.calm,
            Mood::Anxious => self.anxious,
            Mood::Serene => self.serene,
            Mood::Neutral => self.neutral,
        }
    }

    /// The most frequent label, ties resolved in [`Mood::ALL`] order.
    pub fn dominant(&self) -> Option<Mood> {
        if self.samples == 0 {
            return None;
        }
        Mood::ALL.into_iter().fold(None, |best: Option<Mood>, mood| match best {
            Some(b) if self.share(b) >= self.share(mood) => Some(b),
            _ => Some(mood),
        })
    }
}
