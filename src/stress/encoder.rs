//! Stress report encoder
//!
//! Encodes assessments into versioned JSON reports.

use crate::error::ComputeError;
use crate::stress::suggestions::journal_suggestions;
use crate::stress::types::{
    BiometricData, MonitorStatus, ReportBiometrics, ReportProducer, ReportProvenance,
    ReportStress, StressAssessment, StressReport,
};
use crate::{CORE_VERSION, PRODUCER_NAME};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Stress report encoder
pub struct StressReportEncoder {
    instance_id: String,
}

impl Default for StressReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StressReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Encode an assessment into a report
    pub fn encode(
        &self,
        assessment: &StressAssessment,
        biometrics: &BiometricData,
        observed_at: DateTime<Utc>,
        monitor: Option<MonitorStatus>,
    ) -> StressReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: CORE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = ReportProvenance {
            observed_at_utc: observed_at.to_rfc3339(),
            computed_at_utc: Utc::now().to_rfc3339(),
        };

        let stress = ReportStress {
            score: assessment.stress_level,
            level: assessment.level,
            path: assessment.path,
        };

        let biometrics = ReportBiometrics {
            aggregate: assessment.biometric_aggregate,
            pressure_samples: biometrics.touch_pressure.len() as u32,
            duration_samples: biometrics.touch_duration.len() as u32,
            velocity_samples: biometrics.swipe_velocity.len() as u32,
        };

        StressReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            provenance,
            stress,
            typing: assessment.typing.clone(),
            text: assessment.text.clone(),
            biometrics,
            monitor,
            suggestions: journal_suggestions(&assessment.text, assessment.stress_level),
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(
        &self,
        assessment: &StressAssessment,
        biometrics: &BiometricData,
        observed_at: DateTime<Utc>,
        monitor: Option<MonitorStatus>,
    ) -> Result<String, ComputeError> {
        let report = self.encode(assessment, biometrics, observed_at, monitor);
        serde_json::to_string_pretty(&report).map_err(ComputeError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stress::predictor::StressPredictor;
    use crate::stress::types::{ScoringPath, StressTrend};
    use chrono::TimeZone;

    fn sample_biometrics() -> BiometricData {
        BiometricData {
            touch_pressure: vec![80.0, 85.0],
            touch_duration: vec![250.0],
            swipe_velocity: vec![],
            heart_rate_variability: None,
        }
    }

    fn sample_assessment(biometrics: &BiometricData) -> StressAssessment {
        StressPredictor::new().assess(
            "I am stressed and overwhelmed by this urgent deadline",
            &[0.0, 200.0, 430.0, 900.0, 1200.0, 1550.0],
            biometrics,
            observed_at(),
        )
    }

    fn observed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_encode_report() {
        let biometrics = sample_biometrics();
        let assessment = sample_assessment(&biometrics);
        let encoder = StressReportEncoder::with_instance_id("test-instance".to_string());

        let report = encoder.encode(&assessment, &biometrics, observed_at(), None);

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.instance_id, "test-instance");
        assert_eq!(report.provenance.observed_at_utc, "2024-05-06T08:30:00+00:00");
        assert_eq!(report.stress.score, assessment.stress_level);
        assert_eq!(report.stress.path, ScoringPath::Fallback);
        assert_eq!(report.biometrics.pressure_samples, 2);
        assert_eq!(report.biometrics.velocity_samples, 0);
        assert!(!report.suggestions.is_empty());
        assert!(report.monitor.is_none());
    }

    #[test]
    fn test_encode_to_json() {
        let biometrics = sample_biometrics();
        let assessment = sample_assessment(&biometrics);
        let encoder = StressReportEncoder::new();
        let monitor = MonitorStatus {
            trend: StressTrend::Rising,
            average_stress: Some(0.55),
            readings_in_window: 6,
            alert: false,
        };

        let json = encoder
            .encode_to_json(&assessment, &biometrics, observed_at(), Some(monitor))
            .unwrap();

        assert!(json.contains("\"report_version\""));
        assert!(json.contains("\"stress_keywords\""));
        assert!(json.contains("\"trend\": \"rising\""));

        let parsed: StressReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.monitor.map(|m| m.readings_in_window), Some(6));
    }

    #[test]
    fn test_monitor_omitted_when_absent() {
        let biometrics = sample_biometrics();
        let assessment = sample_assessment(&biometrics);
        let json = StressReportEncoder::new()
            .encode_to_json(&assessment, &biometrics, observed_at(), None)
            .unwrap();
        assert!(!json.contains("\"monitor\""));
    }

    #[test]
    fn test_instance_ids_are_unique() {
        let a = StressReportEncoder::new();
        let b = StressReportEncoder::new();
        assert_ne!(a.instance_id(), b.instance_id());
    }
}
