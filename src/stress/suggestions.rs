//! Journal feedback: suggestions and mood trend

use crate::stress::types::{MoodTrend, TextAnalysis};

/// Maximum number of suggestions returned for one entry
pub const MAX_SUGGESTIONS: usize = 3;

/// Entries compared on each side of the mood trend
const MOOD_SPAN: usize = 3;
const MOOD_DELTA: f64 = 0.1;

/// Build feedback messages for a journal entry
///
/// Rules are applied in order and the list is cut to [`MAX_SUGGESTIONS`]:
/// - stress > 0.7: two breathing suggestions
/// - more than 2 urgency words: prioritization
/// - sentiment < 0.3: reframing and gratitude
/// - more than 3 stress keywords: reach out
/// - none of the above: two positive messages
pub fn journal_suggestions(analysis: &TextAnalysis, stress_level: f64) -> Vec<String> {
    let mut suggestions: Vec<&str> = Vec::new();

    if stress_level > 0.7 {
        suggestions.push(
            "Your stress levels seem high. Consider taking a 5-minute breathing break.",
        );
        suggestions.push("Try the 4-7-8 breathing technique to calm your nervous system.");
    }

    if analysis.urgency_words > 2 {
        suggestions.push(
            "You mentioned several urgent items. Consider prioritizing the most critical one.",
        );
    }

    if analysis.sentiment < 0.3 {
        suggestions.push(
            "Your entry shows some negative emotions. Remember that challenges are temporary.",
        );
        suggestions.push("Consider writing three things you're grateful for today.");
    }

    if analysis.stress_keywords.len() > 3 {
        suggestions.push(
            "Multiple stress indicators detected. \
             Consider speaking with a colleague or taking a short walk.",
        );
    }

    if suggestions.is_empty() {
        suggestions.push("Great job reflecting on your day! Keep up the mindful practice.");
        suggestions
            .push("Your mental clarity seems good. This is a great time for important decisions.");
    }

    suggestions
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}

/// Direction of mood from stress levels ordered newest first
///
/// Compares the mean of the three newest entries with the three before them.
/// Lower recent stress means improving mood.
pub fn mood_trend(stress_levels: &[f64]) -> MoodTrend {
    if stress_levels.len() < 2 {
        return MoodTrend::Stable;
    }

    let recent = mean(stress_levels.iter().take(MOOD_SPAN));
    let older = mean(stress_levels.iter().skip(MOOD_SPAN).take(MOOD_SPAN));

    match (recent, older) {
        (Some(recent), Some(older)) if recent < older - MOOD_DELTA => MoodTrend::Improving,
        (Some(recent), Some(older)) if recent > older + MOOD_DELTA => MoodTrend::Declining,
        _ => MoodTrend::Stable,
    }
}

fn mean<'a>(values: impl Iterator<Item = &'a f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
