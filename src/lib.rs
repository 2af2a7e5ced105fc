//! MindSalary Core - On-device stress inference for journaling and typing
//!
//! Estimates a user's stress level from how they type, what they write and how
//! they touch the screen, through a deterministic pipeline: typing extraction
//! → text sentiment → biometric aggregation → stress prediction → monitoring
//! → report encoding.
//!
//! ## Modules
//!
//! - **Stress**: Feature extraction, the fallback scoring formula, an optional learned-model seam,
//!   rolling history with trend and alerts, and JSON reports
//! - **Config**: Thresholds, weights and keyword lists, loadable from JSON

pub mod config;
pub mod error;
pub mod stress;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::ScorerConfig;
pub use error::ComputeError;

// Scoring exports
pub use stress::{
    aggregate_biometrics, analyze_text, extract_typing_pattern, predict_stress, BiometricData,
    StressLevel, StressPredictor, TextAnalysis, TypingPattern,
};

// Pipeline exports
pub use stress::{sample_to_report, StressProcessor};

/// Library version embedded in all reports
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "mindsalary-core";
