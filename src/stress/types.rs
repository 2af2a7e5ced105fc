//! Stress scoring data types
//!
//! This module defines the derived feature records, caller-supplied inputs and
//! report payloads that flow through the stress scoring pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics derived from keystroke timing and text length
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypingPattern {
    /// Non-negative milliseconds between consecutive keystrokes
    pub keystroke_intervals: Vec<f64>,
    /// Whitespace-delimited non-empty tokens
    pub word_count: u32,
    /// Approximate number of corrected characters
    pub backspace_count: u32,
    /// Longest single interval in milliseconds
    pub pause_duration: f64,
    /// Words per minute over the timestamp span
    pub typing_speed: f64,
}

impl TypingPattern {
    /// Corrections per word, 0 when there are no words
    pub fn backspace_ratio(&self) -> f64 {
        if self.word_count == 0 {
            return 0.0;
        }
        self.backspace_count as f64 / self.word_count as f64
    }

    /// Mean keystroke interval in milliseconds
    pub fn mean_interval(&self) -> f64 {
        if self.keystroke_intervals.is_empty() {
            return 0.0;
        }
        self.keystroke_intervals.iter().sum::<f64>() / self.keystroke_intervals.len() as f64
    }

    /// Population standard deviation of keystroke intervals in milliseconds
    pub fn interval_std_dev(&self) -> f64 {
        if self.keystroke_intervals.is_empty() {
            return 0.0;
        }
        let mean = self.mean_interval();
        let variance = self
            .keystroke_intervals
            .iter()
            .map(|x| (x - mean).powi(2))
            .sum::<f64>()
            / self.keystroke_intervals.len() as f64;
        variance.sqrt()
    }
}

/// Keyword-based sentiment of a piece of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    /// 0 = maximally negative, 1 = maximally positive
    pub sentiment: f64,
    /// Distinct stress keywords found, in lexicon order
    pub stress_keywords: Vec<String>,
    pub urgency_words: u32,
    pub negative_words: u32,
    pub anxiety_indicators: u32,
}

impl Default for TextAnalysis {
    fn default() -> Self {
        Self::neutral()
    }
}

impl TextAnalysis {
    /// Analysis with no signal: full sentiment, no matches
    pub fn neutral() -> Self {
        Self {
            sentiment: 1.0,
            stress_keywords: Vec::new(),
            urgency_words: 0,
            negative_words: 0,
            anxiety_indicators: 0,
        }
    }

    /// Sum of all keyword matches across the four lists
    pub fn total_matches(&self) -> u32 {
        self.stress_keywords.len() as u32
            + self.urgency_words
            + self.negative_words
            + self.anxiety_indicators
    }
}

/// Touch and swipe proxy signals supplied by the host app
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiometricData {
    pub touch_pressure: Vec<f64>,
    /// Touch durations in milliseconds
    pub touch_duration: Vec<f64>,
    /// Swipe velocities in pixels per second
    pub swipe_velocity: Vec<f64>,
    /// Only used by an attached model, never by the fallback formula
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate_variability: Option<f64>,
}

/// Which scoring path produced an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPath {
    Fallback,
    Model,
}

/// Coarse stress band shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressLevel {
    Low,
    Moderate,
    High,
}

impl StressLevel {
    /// Classify a [0,1] stress estimate: `< 0.3` low, `< 0.6` moderate, else high
    pub fn from_score(score: f64) -> Self {
        if score < 0.3 {
            Self::Low
        } else if score < 0.6 {
            Self::Moderate
        } else {
            Self::High
        }
    }
}

/// Direction of stress across the monitor window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressTrend {
    Rising,
    Falling,
    Stable,
}

/// Direction of mood across journal entries (inverse of stress)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodTrend {
    Improving,
    Stable,
    Declining,
}

/// A single stress estimate together with everything that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressAssessment {
    /// Final stress estimate in [0,1]
    pub stress_level: f64,
    pub level: StressLevel,
    pub path: ScoringPath,
    pub typing: TypingPattern,
    pub text: TextAnalysis,
    /// Mean of the three normalized biometric terms
    pub biometric_aggregate: f64,
}

/// An assessment stamped with its observation time, kept by the monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressReading {
    pub observed_at: DateTime<Utc>,
    pub stress_level: f64,
    pub level: StressLevel,
}

/// Monitor state after recording a reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorStatus {
    pub trend: StressTrend,
    /// Mean of the most recent trend span, once a trend can be computed
    pub average_stress: Option<f64>,
    pub readings_in_window: u32,
    /// Whether this reading raised a high-stress alert
    pub alert: bool,
}

/// Input record: one journal entry or typing burst plus touch signals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressSample {
    #[serde(default)]
    pub text: String,
    /// Millisecond timestamps, one per keystroke
    #[serde(default)]
    pub keystroke_timestamps: Vec<f64>,
    #[serde(default)]
    pub biometrics: BiometricData,
    /// When the sample was observed; defaults to processing time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Report Types
// ============================================================================

/// Stress report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Stress report provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProvenance {
    pub observed_at_utc: String,
    pub computed_at_utc: String,
}

/// Headline stress figures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportStress {
    pub score: f64,
    pub level: StressLevel,
    pub path: ScoringPath,
}

/// Biometric namespace of the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportBiometrics {
    pub aggregate: f64,
    pub pressure_samples: u32,
    pub duration_samples: u32,
    pub velocity_samples: u32,
}

/// Stress report payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub stress: ReportStress,
    pub typing: TypingPattern,
    pub text: TextAnalysis,
    pub biometrics: ReportBiometrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor: Option<MonitorStatus>,
    pub suggestions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stress_level_thresholds() {
        assert_eq!(StressLevel::from_score(0.0), StressLevel::Low);
        assert_eq!(StressLevel::from_score(0.29), StressLevel::Low);
        assert_eq!(StressLevel::from_score(0.3), StressLevel::Moderate);
        assert_eq!(StressLevel::from_score(0.59), StressLevel::Moderate);
        assert_eq!(StressLevel::from_score(0.6), StressLevel::High);
        assert_eq!(StressLevel::from_score(1.0), StressLevel::High);
    }

    #[test]
    fn test_stress_level_serialization() {
        let json = serde_json::to_string(&StressLevel::Moderate).unwrap();
        assert_eq!(json, "\"moderate\"");
    }

    #[test]
    fn test_backspace_ratio_zero_words() {
        let pattern = TypingPattern {
            backspace_count: 4,
            ..Default::default()
        };
        assert_eq!(pattern.backspace_ratio(), 0.0);
    }

    #[test]
    fn test_interval_statistics() {
        let pattern = TypingPattern {
            keystroke_intervals: vec![100.0, 300.0],
            ..Default::default()
        };
        assert!((pattern.mean_interval() - 200.0).abs() < 1e-9);
        assert!((pattern.interval_std_dev() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_text_analysis_default_is_neutral() {
        let analysis = TextAnalysis::default();
        assert_eq!(analysis.sentiment, 1.0);
        assert_eq!(analysis.total_matches(), 0);
    }

    #[test]
    fn test_sample_deserialization_defaults() {
        let json = r#"{ "text": "hello" }"#;
        let sample: StressSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.text, "hello");
        assert!(sample.keystroke_timestamps.is_empty());
        assert!(sample.biometrics.touch_pressure.is_empty());
        assert!(sample.observed_at.is_none());
    }

    #[test]
    fn test_biometric_deserialization() {
        let json = r#"{
            "touch_pressure": [80, 85],
            "touch_duration": [250, 300],
            "swipe_velocity": [150, 160]
        }"#;
        let data: BiometricData = serde_json::from_str(json).unwrap();
        assert_eq!(data.touch_pressure, vec![80.0, 85.0]);
        assert!(data.heart_rate_variability.is_none());
    }
}
