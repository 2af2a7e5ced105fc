//! Rolling stress history
//!
//! Keeps the most recent readings, reports the direction of stress over the
//! last few readings and raises high-stress alerts with a cooldown.

use crate::config::MonitorConfig;
use crate::stress::types::{MonitorStatus, StressReading, StressTrend};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::info;

/// Rolling reading store with trend and alert tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressMonitor {
    /// Oldest first
    readings: VecDeque<StressReading>,
    /// Observation time of the last reading that raised an alert
    last_alert_at: Option<DateTime<Utc>>,
    config: MonitorConfig,
}

impl Default for StressMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

impl StressMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            readings: VecDeque::with_capacity(config.window_size),
            last_alert_at: None,
            config,
        }
    }

    /// Record a reading and return the monitor state including it
    pub fn record(&mut self, reading: StressReading) -> MonitorStatus {
        let alert = self.should_alert(&reading);
        if alert {
            info!(
                stress_level = reading.stress_level,
                observed_at = %reading.observed_at,
                "high stress alert"
            );
            self.last_alert_at = Some(reading.observed_at);
        }

        self.readings.push_back(reading);
        self.trim();

        MonitorStatus {
            trend: self.trend(),
            average_stress: self.average_stress(),
            readings_in_window: self.readings.len() as u32,
            alert,
        }
    }

    fn should_alert(&self, reading: &StressReading) -> bool {
        if reading.stress_level <= self.config.alert_threshold {
            return false;
        }
        match self.last_alert_at {
            Some(last) => {
                let elapsed_ms = (reading.observed_at - last).num_milliseconds();
                elapsed_ms > self.config.alert_cooldown_sec.saturating_mul(1000)
            }
            None => true,
        }
    }

    fn trim(&mut self) {
        while self.readings.len() > self.config.window_size {
            self.readings.pop_front();
        }
    }

    /// Compare the mean of the latest span with the span before it
    ///
    /// Needs more than one span of readings; with fewer it is `Stable`.
    pub fn trend(&self) -> StressTrend {
        let (recent, older) = match (self.recent_mean(), self.older_mean()) {
            (Some(recent), Some(older)) => (recent, older),
            _ => return StressTrend::Stable,
        };

        if recent > older + self.config.trend_delta {
            StressTrend::Rising
        } else if recent < older - self.config.trend_delta {
            StressTrend::Falling
        } else {
            StressTrend::Stable
        }
    }

    /// Mean of the latest trend span, once a trend can be computed
    pub fn average_stress(&self) -> Option<f64> {
        if self.readings.len() <= self.config.trend_span {
            return None;
        }
        self.recent_mean()
    }

    fn recent_mean(&self) -> Option<f64> {
        let span = self.config.trend_span;
        if self.readings.len() <= span {
            return None;
        }
        mean(self.readings.iter().rev().take(span))
    }

    fn older_mean(&self) -> Option<f64> {
        let span = self.config.trend_span;
        mean(self.readings.iter().rev().skip(span).take(span))
    }

    /// Readings currently held, oldest first
    pub fn readings(&self) -> impl Iterator<Item = &StressReading> {
        self.readings.iter()
    }

    pub fn last_alert_at(&self) -> Option<DateTime<Utc>> {
        self.last_alert_at
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Apply new settings, dropping readings beyond the new window
    pub fn reconfigure(&mut self, config: MonitorConfig) {
        self.config = config;
        self.trim();
    }

    /// Load monitor state from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize monitor state to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn reading_count(&self) -> usize {
        self.readings.len()
    }

    /// Clear readings and alert state
    pub fn clear(&mut self) {
        self.readings.clear();
        self.last_alert_at = None;
    }
}

fn mean<'a>(readings: impl Iterator<Item = &'a StressReading>) -> Option<f64> {
    let (sum, count) = readings.fold((0.0, 0usize), |(sum, count), r| {
        (sum + r.stress_level, count + 1)
    });
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stress::types::StressLevel;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()
    }

    fn reading(minutes: i64, stress: f64) -> StressReading {
        StressReading {
            observed_at: start() + Duration::minutes(minutes),
            stress_level: stress,
            level: StressLevel::from_score(stress),
        }
    }

    fn feed(monitor: &mut StressMonitor, levels: &[f64]) -> MonitorStatus {
        let mut status = None;
        for (i, level) in levels.iter().enumerate() {
            status = Some(monitor.record(reading(i as i64, *level)));
        }
        status.unwrap()
    }

    #[test]
    fn test_no_trend_until_more_than_one_span() {
        let mut monitor = StressMonitor::default();
        let status = feed(&mut monitor, &[0.1, 0.2, 0.3, 0.4, 0.5]);

        assert_eq!(status.trend, StressTrend::Stable);
        assert_eq!(status.average_stress, None);
        assert_eq!(status.readings_in_window, 5);
    }

    #[test]
    fn test_rising_trend() {
        let mut monitor = StressMonitor::default();
        let status = feed(
            &mut monitor,
            &[0.2, 0.2, 0.2, 0.2, 0.2, 0.5, 0.5, 0.5, 0.5, 0.5],
        );

        assert_eq!(status.trend, StressTrend::Rising);
        let average = status.average_stress.unwrap();
        assert!((average - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_falling_trend() {
        let mut monitor = StressMonitor::default();
        let status = feed(
            &mut monitor,
            &[0.6, 0.6, 0.6, 0.6, 0.6, 0.3, 0.3, 0.3, 0.3, 0.3],
        );
        assert_eq!(status.trend, StressTrend::Falling);
    }

    #[test]
    fn test_small_change_is_stable() {
        let mut monitor = StressMonitor::default();
        let status = feed(
            &mut monitor,
            &[0.40, 0.40, 0.40, 0.40, 0.40, 0.45, 0.45, 0.45, 0.45, 0.45],
        );
        assert_eq!(status.trend, StressTrend::Stable);
    }

    #[test]
    fn test_partial_older_span() {
        // Six readings: the older half is the single first reading
        let mut monitor = StressMonitor::default();
        let status = feed(&mut monitor, &[0.1, 0.5, 0.5, 0.5, 0.5, 0.5]);
        assert_eq!(status.trend, StressTrend::Rising);
    }

    #[test]
    fn test_window_is_bounded() {
        let config = MonitorConfig {
            window_size: 8,
            ..Default::default()
        };
        let mut monitor = StressMonitor::new(config);
        let levels: Vec<f64> = (0..20).map(|i| i as f64 / 40.0).collect();
        let status = feed(&mut monitor, &levels);

        assert_eq!(status.readings_in_window, 8);
        assert_eq!(monitor.reading_count(), 8);
        let first = monitor.readings().next().unwrap();
        assert!((first.stress_level - 12.0 / 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_alert_threshold_is_strict() {
        let mut monitor = StressMonitor::default();
        assert!(!monitor.record(reading(0, 0.75)).alert);
        assert!(monitor.record(reading(1, 0.76)).alert);
    }

    #[test]
    fn test_alert_cooldown() {
        let mut monitor = StressMonitor::default();

        assert!(monitor.record(reading(0, 0.9)).alert);
        // Within ten minutes: suppressed
        assert!(!monitor.record(reading(5, 0.95)).alert);
        assert!(!monitor.record(reading(9, 0.95)).alert);
        // Exactly ten minutes is still inside the cooldown
        assert!(!monitor.record(reading(10, 0.95)).alert);
        // Cooldown elapsed
        assert!(monitor.record(reading(11, 0.8)).alert);
        assert_eq!(monitor.last_alert_at(), Some(start() + Duration::minutes(11)));
    }

    #[test]
    fn test_alert_cooldown_boundary_in_milliseconds() {
        let high = |offset_ms: i64| StressReading {
            observed_at: start() + Duration::milliseconds(offset_ms),
            stress_level: 0.9,
            level: StressLevel::High,
        };

        let mut at_boundary = StressMonitor::default();
        assert!(at_boundary.record(high(0)).alert);
        assert!(!at_boundary.record(high(600_000)).alert);

        let mut past_boundary = StressMonitor::default();
        assert!(past_boundary.record(high(0)).alert);
        assert!(past_boundary.record(high(600_001)).alert);
    }

    #[test]
    fn test_suppressed_alert_does_not_extend_cooldown() {
        let mut monitor = StressMonitor::default();
        assert!(monitor.record(reading(0, 0.9)).alert);
        assert!(!monitor.record(reading(8, 0.9)).alert);
        assert!(monitor.record(reading(11, 0.9)).alert);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut monitor = StressMonitor::default();
        feed(&mut monitor, &[0.2, 0.8, 0.4, 0.3, 0.6, 0.7]);

        let json = monitor.to_json().unwrap();
        let restored = StressMonitor::from_json(&json).unwrap();

        assert_eq!(restored.reading_count(), 6);
        assert_eq!(restored.last_alert_at(), monitor.last_alert_at());
        assert_eq!(restored.trend(), monitor.trend());
        assert_eq!(restored.average_stress(), monitor.average_stress());
    }

    #[test]
    fn test_reconfigure_trims() {
        let mut monitor = StressMonitor::default();
        feed(&mut monitor, &[0.1; 12]);
        monitor.reconfigure(MonitorConfig {
            window_size: 4,
            ..Default::default()
        });
        assert_eq!(monitor.reading_count(), 4);
    }

    #[test]
    fn test_clear() {
        let mut monitor = StressMonitor::default();
        feed(&mut monitor, &[0.9, 0.9]);
        monitor.clear();

        assert_eq!(monitor.reading_count(), 0);
        assert_eq!(monitor.last_alert_at(), None);
        assert!(monitor.record(reading(1, 0.9)).alert);
    }
}
