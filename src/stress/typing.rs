//! Typing-pattern extraction
//!
//! Derives keystroke cadence statistics from the entered text and the
//! timestamps of the keystrokes that produced it. Degenerate input (no text,
//! fewer than two timestamps, zero elapsed time) yields zeroed fields.

use crate::stress::types::TypingPattern;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Extract a typing pattern from text and per-keystroke millisecond timestamps
pub fn extract_typing_pattern(text: &str, timestamps: &[f64]) -> TypingPattern {
    let word_count = count_words(text);
    let keystroke_intervals = compute_intervals(timestamps);
    let pause_duration = longest_pause(&keystroke_intervals);
    let typing_speed = compute_typing_speed(word_count, timestamps);
    let backspace_count = estimate_backspaces(text.chars().count(), timestamps.len());

    TypingPattern {
        keystroke_intervals,
        word_count,
        backspace_count,
        pause_duration,
        typing_speed,
    }
}

/// Count whitespace-delimited non-empty tokens
pub(crate) fn count_words(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

/// Consecutive timestamp differences, floored at 0 for out-of-order input
fn compute_intervals(timestamps: &[f64]) -> Vec<f64> {
    if timestamps.len() < 2 {
        return Vec::new();
    }

    timestamps
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .map(|gap| if gap.is_finite() { gap.max(0.0) } else { 0.0 })
        .collect()
}

fn longest_pause(intervals: &[f64]) -> f64 {
    intervals.iter().copied().fold(0.0, f64::max)
}

/// Compute typing speed in words per minute
///
/// Formula: `word_count / ((last - first) / 60000)`
fn compute_typing_speed(word_count: u32, timestamps: &[f64]) -> f64 {
    let (first, last) = match (timestamps.first(), timestamps.last()) {
        (Some(first), Some(last)) if timestamps.len() >= 2 => (*first, *last),
        _ => return 0.0,
    };

    let elapsed_minutes = (last - first) / MS_PER_MINUTE;
    if !elapsed_minutes.is_finite() || elapsed_minutes <= 0.0 {
        return 0.0;
    }
    let speed = word_count as f64 / elapsed_minutes;
    if speed.is_finite() {
        speed
    } else {
        0.0
    }
}

/// Approximate corrected characters from the keystroke surplus
///
/// A corrected character costs two keystrokes beyond the text that survives:
/// the mistyped key and the backspace removing it. Hosts that sample only some
/// keystrokes report fewer timestamps than characters; that saturates at 0.
fn estimate_backspaces(char_count: usize, keystroke_count: usize) -> u32 {
    (keystroke_count.saturating_sub(char_count) / 2) as u32
}
