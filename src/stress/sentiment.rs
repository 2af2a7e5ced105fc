//! Keyword-based text sentiment
//!
//! Counts stress, urgency, negative and anxiety keywords in a piece of text and
//! turns the match density into a [0,1] sentiment.
//!
//! Each keyword counts at most once per text, however often it appears. In the
//! default `Substring` mode a keyword also matches inside a longer word
//! ("stressedout" contains "stressed"); `Token` mode requires a whole token.

use crate::config::{KeywordLexicon, KeywordMatching};
use crate::stress::types::TextAnalysis;
use std::sync::OnceLock;

fn default_lexicon() -> &'static KeywordLexicon {
    static LEXICON: OnceLock<KeywordLexicon> = OnceLock::new();
    LEXICON.get_or_init(KeywordLexicon::default)
}

/// Analyze text with the default lexicon and substring matching
pub fn analyze_text(text: &str) -> TextAnalysis {
    TextAnalyzer::new(default_lexicon(), KeywordMatching::Substring).analyze(text)
}

/// Text analyzer bound to a lexicon and matching mode
pub struct TextAnalyzer<'a> {
    lexicon: &'a KeywordLexicon,
    matching: KeywordMatching,
}

impl<'a> TextAnalyzer<'a> {
    pub fn new(lexicon: &'a KeywordLexicon, matching: KeywordMatching) -> Self {
        Self { lexicon, matching }
    }

    /// Analyze a piece of text
    pub fn analyze(&self, text: &str) -> TextAnalysis {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = lower.split_whitespace().collect();

        if tokens.is_empty() {
            return TextAnalysis::neutral();
        }

        let haystack = Haystack {
            full: &lower,
            tokens: &tokens,
            matching: self.matching,
        };

        let stress_keywords: Vec<String> = self
            .lexicon
            .stress
            .iter()
            .filter(|keyword| haystack.contains(keyword))
            .cloned()
            .collect();
        let urgency_words = haystack.count(&self.lexicon.urgency);
        let negative_words = haystack.count(&self.lexicon.negative);
        let anxiety_indicators = haystack.count(&self.lexicon.anxiety);

        let matches =
            stress_keywords.len() as u32 + urgency_words + negative_words + anxiety_indicators;
        let sentiment = compute_sentiment(matches, tokens.len() as u32);

        TextAnalysis {
            sentiment,
            stress_keywords,
            urgency_words,
            negative_words,
            anxiety_indicators,
        }
    }
}

struct Haystack<'t> {
    full: &'t str,
    tokens: &'t [&'t str],
    matching: KeywordMatching,
}

impl Haystack<'_> {
    fn contains(&self, keyword: &str) -> bool {
        if keyword.is_empty() {
            return false;
        }
        match self.matching {
            KeywordMatching::Substring => self.full.contains(keyword),
            KeywordMatching::Token => self
                .tokens
                .iter()
                .any(|token| token.trim_matches(|c: char| !c.is_alphanumeric()) == keyword),
        }
    }

    fn count(&self, keywords: &[String]) -> u32 {
        keywords.iter().filter(|k| self.contains(k)).count() as u32
    }
}

/// Compute sentiment from keyword density
///
/// Formula: `clamp(1 - matches / word_count, 0, 1)`
fn compute_sentiment(matches: u32, word_count: u32) -> f64 {
    if word_count == 0 {
        return 1.0;
    }
    let stress_score = matches as f64 / word_count as f64;
    (1.0 - stress_score).clamp(0.0, 1.0)
}
