//! Scorer configuration
//!
//! Every threshold, weight and keyword list used by the scorer lives here.
//! `ScorerConfig::default()` reproduces the reference scoring curve exactly;
//! a JSON file may override any subset of fields.

use crate::error::ComputeError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current configuration schema version
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Top-level scorer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub schema_version: u32,
    pub typing: TypingThresholds,
    pub weights: FallbackWeights,
    pub biometrics: BiometricNormalizers,
    pub lexicon: KeywordLexicon,
    pub matching: KeywordMatching,
    pub monitor: MonitorConfig,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            typing: TypingThresholds::default(),
            weights: FallbackWeights::default(),
            biometrics: BiometricNormalizers::default(),
            lexicon: KeywordLexicon::default(),
            matching: KeywordMatching::default(),
            monitor: MonitorConfig::default(),
        }
    }
}

impl ScorerConfig {
    /// Load config from file, or fall back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self, ComputeError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ComputeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate a config document
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ComputeError::ConfigError(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<(), ComputeError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ComputeError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Reject values that would break the [0,1] guarantees
    pub fn validate(&self) -> Result<(), ComputeError> {
        let normalizers = [
            ("biometrics.pressure_divisor", self.biometrics.pressure_divisor),
            ("biometrics.duration_divisor", self.biometrics.duration_divisor),
            ("biometrics.velocity_divisor", self.biometrics.velocity_divisor),
        ];
        for (name, value) in normalizers {
            if !value.is_finite() || value <= 0.0 {
                return Err(ComputeError::ConfigError(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        let w = &self.weights;
        let weights = [
            ("weights.backspace", w.backspace),
            ("weights.pause", w.pause),
            ("weights.typing_speed", w.typing_speed),
            ("weights.sentiment", w.sentiment),
            ("weights.keyword_per_match", w.keyword_per_match),
            ("weights.keyword_cap", w.keyword_cap),
            ("weights.biometric", w.biometric),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ComputeError::ConfigError(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if self.monitor.window_size == 0 {
            return Err(ComputeError::ConfigError(
                "monitor.window_size must be at least 1".to_string(),
            ));
        }
        if self.monitor.trend_span == 0 {
            return Err(ComputeError::ConfigError(
                "monitor.trend_span must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Typing-pattern thresholds used by the fallback formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingThresholds {
    /// Backspace-to-word ratio above which typing counts as corrective
    pub backspace_ratio: f64,
    /// Longest single pause (ms) above which typing counts as hesitant
    pub long_pause_ms: f64,
    /// Words per minute above which typing counts as rushed
    pub fast_wpm: f64,
    /// Words per minute below which typing counts as sluggish
    pub slow_wpm: f64,
}

impl Default for TypingThresholds {
    fn default() -> Self {
        Self {
            backspace_ratio: 0.3,
            long_pause_ms: 3000.0,
            fast_wpm: 80.0,
            slow_wpm: 20.0,
        }
    }
}

/// Weights of the fallback formula.
///
/// These intentionally sum to more than 1.0 in the worst case (1.20 with the
/// defaults). The final score is clamped, never renormalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackWeights {
    pub backspace: f64,
    pub pause: f64,
    pub typing_speed: f64,
    pub sentiment: f64,
    pub keyword_per_match: f64,
    pub keyword_cap: f64,
    pub biometric: f64,
}

impl Default for FallbackWeights {
    fn default() -> Self {
        Self {
            backspace: 0.20,
            pause: 0.15,
            typing_speed: 0.10,
            sentiment: 0.30,
            keyword_per_match: 0.05,
            keyword_cap: 0.20,
            biometric: 0.25,
        }
    }
}

impl FallbackWeights {
    /// Worst-case sum of all terms before clamping
    pub fn max_total(&self) -> f64 {
        self.backspace + self.pause + self.typing_speed + self.sentiment + self.keyword_cap
            + self.biometric
    }
}

/// Divisors mapping raw touch/swipe averages onto [0,1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiometricNormalizers {
    pub pressure_divisor: f64,
    pub duration_divisor: f64,
    pub velocity_divisor: f64,
}

impl Default for BiometricNormalizers {
    fn default() -> Self {
        Self {
            pressure_divisor: 100.0,
            duration_divisor: 1000.0,
            velocity_divisor: 500.0,
        }
    }
}

/// How keywords are matched against text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordMatching {
    /// Keyword may appear anywhere, including inside a longer word
    Substring,
    /// Keyword must equal a whitespace token (surrounding punctuation ignored)
    Token,
}

impl Default for KeywordMatching {
    fn default() -> Self {
        Self::Substring
    }
}

impl KeywordMatching {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Substring => "substring",
            Self::Token => "token",
        }
    }
}

impl std::str::FromStr for KeywordMatching {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "token" => Ok(Self::Token),
            _ => Err(format!("Unknown keyword matching mode: {}", s)),
        }
    }
}

/// Keyword lists for the text analyzer. Entries are expected in lowercase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordLexicon {
    pub stress: Vec<String>,
    pub urgency: Vec<String>,
    pub negative: Vec<String>,
    pub anxiety: Vec<String>,
}

const DEFAULT_STRESS_KEYWORDS: &[&str] = &[
    "deadline",
    "pressure",
    "overwhelmed",
    "anxious",
    "stressed",
    "panic",
    "urgent",
    "crisis",
    "problem",
    "issue",
    "worried",
    "frustrated",
    "exhausted",
    "burnout",
    "demanding",
    "difficult",
    "challenging",
];

const DEFAULT_URGENCY_WORDS: &[&str] = &[
    "urgent",
    "asap",
    "immediately",
    "emergency",
    "critical",
    "rush",
];

const DEFAULT_NEGATIVE_WORDS: &[&str] =
    &["bad", "terrible", "awful", "horrible", "worst", "hate", "fail"];

const DEFAULT_ANXIETY_WORDS: &[&str] =
    &["worry", "fear", "nervous", "anxious", "concerned", "doubt"];

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for KeywordLexicon {
    fn default() -> Self {
        Self {
            stress: owned(DEFAULT_STRESS_KEYWORDS),
            urgency: owned(DEFAULT_URGENCY_WORDS),
            negative: owned(DEFAULT_NEGATIVE_WORDS),
            anxiety: owned(DEFAULT_ANXIETY_WORDS),
        }
    }
}

/// Rolling monitor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Maximum number of readings retained
    pub window_size: usize,
    /// Readings per half of the trend comparison
    pub trend_span: usize,
    /// Minimum change in mean stress to report a trend
    pub trend_delta: f64,
    /// Readings strictly above this raise an alert
    pub alert_threshold: f64,
    /// Minimum seconds between two alerts
    pub alert_cooldown_sec: i64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window_size: 50,
            trend_span: 5,
            trend_delta: 0.1,
            alert_threshold: 0.75,
            alert_cooldown_sec: 600,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = ScorerConfig::default();
        assert_eq!(config.schema_version, 1);
        assert_eq!(config.typing.backspace_ratio, 0.3);
        assert_eq!(config.biometrics.velocity_divisor, 500.0);
        assert_eq!(config.lexicon.stress.len(), 17);
        assert_eq!(config.lexicon.urgency.len(), 6);
        assert_eq!(config.lexicon.negative.len(), 7);
        assert_eq!(config.lexicon.anxiety.len(), 6);
        assert_eq!(config.matching, KeywordMatching::Substring);
    }

    #[test]
    fn test_weights_exceed_one() {
        let weights = FallbackWeights::default();
        assert!((weights.max_total() - 1.20).abs() < 1e-9);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{ "matching": "token", "monitor": { "window_size": 10 } }"#;
        let config: ScorerConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.matching, KeywordMatching::Token);
        assert_eq!(config.monitor.window_size, 10);
        assert_eq!(config.monitor.trend_span, 5);
        assert_eq!(config.weights, FallbackWeights::default());
    }

    #[test]
    fn test_validate_rejects_zero_divisor() {
        let mut config = ScorerConfig::default();
        config.biometrics.duration_divisor = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_weight() {
        let mut config = ScorerConfig::default();
        config.weights.sentiment = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let path = std::env::temp_dir().join("mindsalary-config-does-not-exist.json");
        let config = ScorerConfig::load(&path).unwrap();
        assert_eq!(config, ScorerConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "mindsalary-config-{}.json",
            uuid::Uuid::new_v4()
        ));
        let mut config = ScorerConfig::default();
        config.monitor.alert_threshold = 0.9;
        config.save(&path).unwrap();

        let loaded = ScorerConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_matching_parse() {
        assert_eq!("TOKEN".parse::<KeywordMatching>().unwrap(), KeywordMatching::Token);
        assert!("fuzzy".parse::<KeywordMatching>().is_err());
    }
}
