//! Stress pipeline orchestration
//!
//! This module provides the public API for turning journal samples into
//! stress reports, either one-shot or with a persistent monitor.

use crate::config::ScorerConfig;
use crate::error::ComputeError;
use crate::stress::encoder::StressReportEncoder;
use crate::stress::monitor::StressMonitor;
use crate::stress::predictor::StressPredictor;
use crate::stress::types::{StressReading, StressReport, StressSample};
use chrono::Utc;

/// Parse a sample JSON document
pub fn parse_sample(json: &str) -> Result<StressSample, ComputeError> {
    serde_json::from_str(json).map_err(|e| ComputeError::ParseError(e.to_string()))
}

/// Convert sample JSON to report JSON (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let report_json = sample_to_report(r#"{"text": "busy day"}"#)?;
/// ```
pub fn sample_to_report(sample_json: &str) -> Result<String, ComputeError> {
    let sample = parse_sample(sample_json)?;
    let observed_at = sample.observed_at.unwrap_or_else(Utc::now);

    let predictor = StressPredictor::new();
    let assessment = predictor.assess(
        &sample.text,
        &sample.keystroke_timestamps,
        &sample.biometrics,
        observed_at,
    );

    let encoder = StressReportEncoder::new();
    encoder.encode_to_json(&assessment, &sample.biometrics, observed_at, None)
}

/// Stateful processor that keeps a rolling stress history.
///
/// Use this when trend and alert context should accumulate across samples.
pub struct StressProcessor {
    predictor: StressPredictor,
    encoder: StressReportEncoder,
    monitor: StressMonitor,
}

impl Default for StressProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl StressProcessor {
    /// Create a processor with the default configuration
    pub fn new() -> Self {
        Self::with_predictor(StressPredictor::new())
    }

    /// Create a processor with a specific configuration
    pub fn with_config(config: ScorerConfig) -> Self {
        Self::with_predictor(StressPredictor::with_config(config))
    }

    /// Create a processor around a prepared predictor, e.g. one with a model
    pub fn with_predictor(predictor: StressPredictor) -> Self {
        let monitor = StressMonitor::new(predictor.config().monitor.clone());
        Self {
            predictor,
            encoder: StressReportEncoder::new(),
            monitor,
        }
    }

    /// Process sample JSON and return report JSON
    pub fn process(&mut self, sample_json: &str) -> Result<String, ComputeError> {
        let sample = parse_sample(sample_json)?;
        let report = self.process_sample(&sample);
        serde_json::to_string_pretty(&report).map_err(ComputeError::JsonError)
    }

    /// Score a sample, record it in the monitor and build its report
    pub fn process_sample(&mut self, sample: &StressSample) -> StressReport {
        let observed_at = sample.observed_at.unwrap_or_else(Utc::now);
        let assessment = self.predictor.assess(
            &sample.text,
            &sample.keystroke_timestamps,
            &sample.biometrics,
            observed_at,
        );

        let status = self.monitor.record(StressReading {
            observed_at,
            stress_level: assessment.stress_level,
            level: assessment.level,
        });

        self.encoder
            .encode(&assessment, &sample.biometrics, observed_at, Some(status))
    }

    /// Save monitor history to JSON for persistence
    pub fn save_history(&self) -> Result<String, ComputeError> {
        self.monitor
            .to_json()
            .map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    /// Load monitor history from JSON
    ///
    /// The processor's own monitor settings replace the saved ones.
    pub fn load_history(&mut self, json: &str) -> Result<(), ComputeError> {
        let mut monitor =
            StressMonitor::from_json(json).map_err(|e| ComputeError::HistoryError(e.to_string()))?;
        monitor.reconfigure(self.predictor.config().monitor.clone());
        self.monitor = monitor;
        Ok(())
    }

    /// Get the number of readings currently held
    pub fn reading_count(&self) -> usize {
        self.monitor.reading_count()
    }

    /// Clear all history
    pub fn clear_history(&mut self) {
        self.monitor.clear();
    }

    pub fn predictor(&self) -> &StressPredictor {
        &self.predictor
    }

    pub fn monitor(&self) -> &StressMonitor {
        &self.monitor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use crate::stress::types::{StressLevel, StressTrend};

    fn stressed_sample_json() -> &'static str {
        r#"{
            "text": "I am stressed and overwhelmed by this urgent deadline",
            "keystroke_timestamps": [0, 200, 430, 900, 1200, 1550],
            "biometrics": {
                "touch_pressure": [80, 85],
                "touch_duration": [250, 300],
                "swipe_velocity": [150, 160]
            },
            "observed_at": "2024-02-01T10:00:00Z"
        }"#
    }

    fn calm_sample_json() -> &'static str {
        r#"{
            "text": "Feeling good and happy today",
            "keystroke_timestamps": [0, 200, 430, 900, 1200, 1550],
            "biometrics": {
                "touch_pressure": [30],
                "touch_duration": [100],
                "swipe_velocity": [50]
            }
        }"#
    }

    fn sample_at(minute: u32, text: &str) -> String {
        format!(
            r#"{{"text": "{text}", "observed_at": "2024-02-01T10:{minute:02}:00Z"}}"#
        )
    }

    #[test]
    fn test_sample_to_report() {
        let json = sample_to_report(stressed_sample_json()).unwrap();
        let report: StressReport = serde_json::from_str(&json).unwrap();

        assert!(report.stress.score > 0.5);
        assert_eq!(report.text.urgency_words, 1);
        assert_eq!(report.provenance.observed_at_utc, "2024-02-01T10:00:00+00:00");
        assert!(report.monitor.is_none());
    }

    #[test]
    fn test_calm_sample() {
        let json = sample_to_report(calm_sample_json()).unwrap();
        let report: StressReport = serde_json::from_str(&json).unwrap();

        assert!(report.stress.score < 0.3);
        assert_eq!(report.stress.level, StressLevel::Low);
        assert!(report.suggestions[0].starts_with("Great job"));
    }

    #[test]
    fn test_minimal_sample() {
        let json = sample_to_report("{}").unwrap();
        let report: StressReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report.typing.word_count, 0);
        assert_eq!(report.text.sentiment, 1.0);
        // Zero typing speed counts as slow typing
        assert!((report.stress.score - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_subnormal_keystroke_gap_reports_zero_speed() {
        let sample = r#"{"text":"a b c","keystroke_timestamps":[0, 1e-310]}"#;
        let json = sample_to_report(sample).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["typing"]["typing_speed"], serde_json::json!(0.0));
    }

    #[test]
    fn test_invalid_json() {
        let result = sample_to_report("not json");
        assert!(matches!(result, Err(ComputeError::ParseError(_))));
    }

    #[test]
    fn test_processor_tracks_history() {
        let mut processor = StressProcessor::new();

        let first = processor.process(stressed_sample_json()).unwrap();
        assert_eq!(processor.reading_count(), 1);
        let report: StressReport = serde_json::from_str(&first).unwrap();
        let status = report.monitor.unwrap();
        assert_eq!(status.readings_in_window, 1);
        assert_eq!(status.trend, StressTrend::Stable);

        processor.process(calm_sample_json()).unwrap();
        assert_eq!(processor.reading_count(), 2);
    }

    #[test]
    fn test_processor_reports_rising_trend() {
        let mut processor = StressProcessor::new();

        for minute in 0..5 {
            processor
                .process(&sample_at(minute, "a quiet and pleasant walk in the park"))
                .unwrap();
        }
        let mut last = None;
        for minute in 5..10 {
            let json = processor
                .process(&sample_at(
                    minute,
                    "panic crisis anxious stressed overwhelmed deadline urgent terrible",
                ))
                .unwrap();
            last = Some(serde_json::from_str::<StressReport>(&json).unwrap());
        }

        let status = last.unwrap().monitor.unwrap();
        assert_eq!(status.trend, StressTrend::Rising);
        assert_eq!(status.readings_in_window, 10);
    }

    #[test]
    fn test_history_persistence() {
        let mut processor = StressProcessor::new();
        processor.process(stressed_sample_json()).unwrap();
        processor.process(calm_sample_json()).unwrap();

        let saved = processor.save_history().unwrap();

        let mut restored = StressProcessor::new();
        restored.load_history(&saved).unwrap();
        assert_eq!(restored.reading_count(), 2);

        restored.clear_history();
        assert_eq!(restored.reading_count(), 0);
    }

    #[test]
    fn test_load_history_applies_own_window() {
        let mut processor = StressProcessor::new();
        for minute in 0..6 {
            processor.process(&sample_at(minute, "ordinary day")).unwrap();
        }
        let saved = processor.save_history().unwrap();

        let config = ScorerConfig {
            monitor: MonitorConfig {
                window_size: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut small = StressProcessor::with_config(config);
        small.load_history(&saved).unwrap();
        assert_eq!(small.reading_count(), 3);
        assert_eq!(small.monitor().config().window_size, 3);
    }

    #[test]
    fn test_invalid_history() {
        let mut processor = StressProcessor::new();
        let result = processor.load_history("{\"readings\": 5}");
        assert!(matches!(result, Err(ComputeError::HistoryError(_))));
    }
}
