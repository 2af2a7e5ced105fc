//! Stress prediction
//!
//! Combines typing, text and biometric features into one [0,1] estimate.
//!
//! The deterministic fallback formula is the scoring contract. A learned model
//! can be attached through [`StressModel`]; when it is absent, fails, or
//! returns a non-finite value, the fallback result is used instead.

use crate::config::ScorerConfig;
use crate::error::ComputeError;
use crate::stress::biometrics::aggregate_biometrics_with;
use crate::stress::sentiment::TextAnalyzer;
use crate::stress::types::{
    BiometricData, ScoringPath, StressAssessment, StressLevel, TextAnalysis, TypingPattern,
};
use crate::stress::typing;
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Number of inputs a [`StressModel`] receives
pub const MODEL_FEATURE_COUNT: usize = 15;

/// Score with the default configuration and no model
pub fn predict_stress(
    typing: &TypingPattern,
    text: &TextAnalysis,
    biometrics: &BiometricData,
) -> f64 {
    let config = default_config();
    let aggregate = aggregate_biometrics_with(biometrics, &config.biometrics);
    fallback_score(typing, text, aggregate, config)
}

fn default_config() -> &'static ScorerConfig {
    static CONFIG: OnceLock<ScorerConfig> = OnceLock::new();
    CONFIG.get_or_init(ScorerConfig::default)
}

/// Compute the rule-based stress score
///
/// Formula:
/// ```text
/// score = 0.20 * [backspace_count / word_count > 0.3]
///       + 0.15 * [pause_duration > 3000]
///       + 0.10 * [typing_speed > 80 || typing_speed < 20]
///       + 0.30 * (1 - sentiment)
///       + min(0.20, 0.05 * |stress_keywords|)
///       + 0.25 * biometric_aggregate
/// ```
/// The weights reach 1.20 in the worst case; only the final clamp bounds it.
pub fn fallback_score(
    typing: &TypingPattern,
    text: &TextAnalysis,
    biometric_aggregate: f64,
    config: &ScorerConfig,
) -> f64 {
    let t = &config.typing;
    let w = &config.weights;

    let mut score = 0.0;

    if typing.backspace_ratio() > t.backspace_ratio {
        score += w.backspace;
    }
    if typing.pause_duration > t.long_pause_ms {
        score += w.pause;
    }
    if typing.typing_speed > t.fast_wpm || typing.typing_speed < t.slow_wpm {
        score += w.typing_speed;
    }

    score += w.sentiment * (1.0 - unit(text.sentiment));
    score += (w.keyword_per_match * text.stress_keywords.len() as f64).min(w.keyword_cap);
    score += w.biometric * unit(biometric_aggregate);

    unit(score)
}

/// Clamp to [0,1], mapping NaN to 0
fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Input vector for a learned stress model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFeatures {
    pub values: [f64; MODEL_FEATURE_COUNT],
}

impl ModelFeatures {
    /// Build the model input vector.
    ///
    /// Order: typing speed, backspace ratio, pause, inverted sentiment, urgency,
    /// negative, anxiety, biometric aggregate, mean interval, stress keywords,
    /// hour of day, day of week, interval spread, heart-rate variability, reserved.
    pub fn build(
        typing: &TypingPattern,
        text: &TextAnalysis,
        biometrics: &BiometricData,
        biometric_aggregate: f64,
        observed_at: DateTime<Utc>,
    ) -> Self {
        let values = [
            typing.typing_speed / 100.0,
            typing.backspace_ratio(),
            (typing.pause_duration / 5000.0).min(1.0),
            1.0 - text.sentiment,
            text.urgency_words as f64 / 10.0,
            text.negative_words as f64 / 10.0,
            text.anxiety_indicators as f64 / 10.0,
            biometric_aggregate,
            typing.mean_interval() / 1000.0,
            text.stress_keywords.len() as f64 / 5.0,
            observed_at.hour() as f64 / 24.0,
            observed_at.weekday().num_days_from_sunday() as f64 / 7.0,
            typing.interval_std_dev() / 1000.0,
            biometrics.heart_rate_variability.unwrap_or(0.0),
            0.0,
        ];
        Self { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// A learned stress model
pub trait StressModel: Send + Sync {
    /// Model identifier used in logs
    fn name(&self) -> &str;

    /// Predict a stress level in [0,1] from the feature vector
    fn predict(&self, features: &ModelFeatures) -> Result<f64, ComputeError>;
}

/// Configured stress predictor with an optional learned model
pub struct StressPredictor {
    config: ScorerConfig,
    model: Option<Box<dyn StressModel>>,
}

impl Default for StressPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StressPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StressPredictor")
            .field("config", &self.config)
            .field("model", &self.model.as_ref().map(|m| m.name().to_string()))
            .finish()
    }
}

impl StressPredictor {
    /// Create a predictor with the default configuration and no model
    pub fn new() -> Self {
        Self::with_config(ScorerConfig::default())
    }

    /// Create a predictor with a specific configuration
    pub fn with_config(config: ScorerConfig) -> Self {
        Self {
            config,
            model: None,
        }
    }

    /// Attach a learned model
    pub fn with_model(mut self, model: Box<dyn StressModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Run a model loader once. A failing loader leaves the predictor on the
    /// fallback path.
    pub fn with_model_loader<F>(mut self, loader: F) -> Self
    where
        F: FnOnce() -> Result<Box<dyn StressModel>, ComputeError>,
    {
        match loader() {
            Ok(model) => {
                debug!(model = model.name(), "stress model loaded");
                self.model = Some(model);
            }
            Err(e) => {
                warn!(error = %e, "stress model failed to load, using fallback scoring");
            }
        }
        self
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Extract a typing pattern
    pub fn typing_pattern(&self, text: &str, timestamps: &[f64]) -> TypingPattern {
        typing::extract_typing_pattern(text, timestamps)
    }

    /// Analyze text with the configured lexicon and matching mode
    pub fn analyze_text(&self, text: &str) -> TextAnalysis {
        TextAnalyzer::new(&self.config.lexicon, self.config.matching).analyze(text)
    }

    /// Aggregate biometrics with the configured normalizers
    pub fn aggregate_biometrics(&self, data: &BiometricData) -> f64 {
        aggregate_biometrics_with(data, &self.config.biometrics)
    }

    /// Predict a stress level from pre-derived features
    pub fn predict(
        &self,
        typing: &TypingPattern,
        text: &TextAnalysis,
        biometrics: &BiometricData,
    ) -> f64 {
        self.predict_at(typing, text, biometrics, Utc::now()).0
    }

    /// Predict a stress level and report which path produced it.
    ///
    /// `observed_at` only feeds the time-of-day features of an attached model.
    pub fn predict_at(
        &self,
        typing: &TypingPattern,
        text: &TextAnalysis,
        biometrics: &BiometricData,
        observed_at: DateTime<Utc>,
    ) -> (f64, ScoringPath) {
        let aggregate = self.aggregate_biometrics(biometrics);
        self.predict_with_aggregate(typing, text, biometrics, aggregate, observed_at)
    }

    fn predict_with_aggregate(
        &self,
        typing: &TypingPattern,
        text: &TextAnalysis,
        biometrics: &BiometricData,
        aggregate: f64,
        observed_at: DateTime<Utc>,
    ) -> (f64, ScoringPath) {
        if let Some(model) = &self.model {
            let features = ModelFeatures::build(typing, text, biometrics, aggregate, observed_at);
            match model.predict(&features) {
                Ok(value) if value.is_finite() => {
                    debug!(model = model.name(), score = value, "model stress prediction");
                    return (value.clamp(0.0, 1.0), ScoringPath::Model);
                }
                Ok(value) => {
                    warn!(model = model.name(), value, "model returned non-finite score");
                }
                Err(e) => {
                    warn!(model = model.name(), error = %e, "model prediction failed");
                }
            }
        }

        let score = fallback_score(typing, text, aggregate, &self.config);
        debug!(score, "fallback stress prediction");
        (score, ScoringPath::Fallback)
    }

    /// Run extraction, analysis, aggregation and prediction in one call
    pub fn assess(
        &self,
        text: &str,
        timestamps: &[f64],
        biometrics: &BiometricData,
        observed_at: DateTime<Utc>,
    ) -> StressAssessment {
        let typing = self.typing_pattern(text, timestamps);
        let analysis = self.analyze_text(text);
        let aggregate = self.aggregate_biometrics(biometrics);
        let (stress_level, path) =
            self.predict_with_aggregate(&typing, &analysis, biometrics, aggregate, observed_at);

        StressAssessment {
            stress_level,
            level: StressLevel::from_score(stress_level),
            path,
            typing,
            text: analysis,
            biometric_aggregate: aggregate,
        }
    }
}
