//! Stress inference module
//!
//! This module estimates stress from a journal entry's keystroke timing, its
//! text, and touch/swipe signals, and tracks how stress develops over time.
//!
//! Pipeline: Sample JSON → Typing + Sentiment + Biometrics → Predictor →
//! Monitor → Encoder → Report JSON

pub mod biometrics;
pub mod encoder;
pub mod monitor;
pub mod pipeline;
pub mod predictor;
pub mod sentiment;
pub mod suggestions;
pub mod types;
pub mod typing;

pub use biometrics::{aggregate_biometrics, aggregate_biometrics_with};
pub use encoder::{StressReportEncoder, REPORT_VERSION};
pub use monitor::StressMonitor;
pub use pipeline::{parse_sample, sample_to_report, StressProcessor};
pub use predictor::{
    fallback_score, predict_stress, ModelFeatures, StressModel, StressPredictor,
    MODEL_FEATURE_COUNT,
};
pub use sentiment::{analyze_text, TextAnalyzer};
pub use suggestions::{journal_suggestions, mood_trend, MAX_SUGGESTIONS};
pub use types::{
    BiometricData, MonitorStatus, MoodTrend, ScoringPath, StressAssessment, StressLevel,
    StressReading, StressReport, StressSample, StressTrend, TextAnalysis, TypingPattern,
};
pub use typing::extract_typing_pattern;
