//! Pinny recognition over a captured frame.
//!
//! The recognizer itself is pluggable; what this module owns is the
//! interpretation of its output: maximal digit runs in the recognized text,
//! intersected with the pinnies we expect in frame. Stray numbers on banners
//! or scoreboards never pre-confirm anyone.

use std::collections::BTreeSet;

/// Raw output of one recognition pass.
#[derive(Debug, Clone)]
pub struct OcrResult {
    pub text: String,
    pub confidence: f32,
    pub word_count: u32,
}

/// A text recognizer over an encoded image. Implementations are expected to
/// be CPU-heavy and are always driven through `spawn_blocking`.
pub trait Recognizer: Send + Sync + 'static {
    fn recognize(&self, image: &[u8]) -> anyhow::Result<OcrResult>;
}

/// Maximal digit runs in `text`, in order of appearance. "Pinny 12, court 3"
/// yields ["12", "3"]; a run is never split or merged.
pub fn extract_numbers(text: &str) -> Vec<String> {
    let mut numbers = Vec::new();
    let mut run = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() {
            run.push(c);
        } else if !run.is_empty() {
            numbers.push(std::mem::take(&mut run));
        }
    }
    if !run.is_empty() {
        numbers.push(run);
    }
    numbers
}

/// Digit runs found in `text` that name an expected pinny. The intersection
/// is the whole detection policy: OCR can only ever confirm players we were
/// already looking for.
pub fn detect_pinnies(text: &str, expected: &BTreeSet<String>) -> BTreeSet<String> {
    extract_numbers(text)
        .into_iter()
        .filter(|n| expected.contains(n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(pinnies: &[&str]) -> BTreeSet<String> {
        pinnies.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn extracts_maximal_digit_runs_in_order() {
        assert_eq!(extract_numbers("Pinny 12, court 3"), vec!["12", "3"]);
        assert_eq!(extract_numbers("no digits here"), Vec::<String>::new());
        assert_eq!(extract_numbers("007"), vec!["007"]);
    }

    #[test]
    fn detection_is_intersection_with_expected_set() {
        // "45" and "99" appear in frame but are not expected, "4" is expected
        // but never appears as its own run.
        let detected = detect_pinnies("scoreboard 45 7 99 12", &expected(&["4", "7", "12"]));
        assert_eq!(detected, expected(&["7", "12"]));
    }

    #[test]
    fn run_boundaries_do_not_leak_substrings() {
        // The run "123" must not confirm pinny "12" or "23".
        let detected = detect_pinnies("123", &expected(&["12", "23", "123"]));
        assert_eq!(detected, expected(&["123"]));
    }

    #[test]
    fn empty_expectation_detects_nothing() {
        assert!(detect_pinnies("1 2 3", &BTreeSet::new()).is_empty());
    }
}
