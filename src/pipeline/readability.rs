//! Flesch–Kincaid grade level for patient-facing text.

use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::provenance::split_sentences;

static LETTER_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z]+").unwrap());

/// Vowel-group syllable estimate. Words of three letters or fewer count
/// one; a trailing `e` is treated as silent.
pub fn syllables_in_word(word: &str) -> usize {
    let word = word.to_lowercase();
    if word.chars().count() <= 3 {
        return 1;
    }

    let mut count: usize = 0;
    let mut prev_vowel = false;
    for ch in word.chars() {
        let vowel = "aeiouy".contains(ch);
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    if word.ends_with('e') {
        count = count.saturating_sub(1).max(1);
    }
    count.max(1)
}

fn count_syllables(text: &str) -> usize {
    let lower = text.to_lowercase();
    LETTER_RUN
        .find_iter(&lower)
        .map(|m| syllables_in_word(m.as_str()))
        .sum()
}

/// `0.39 * words/sentences + 11.8 * syllables/words - 15.59`, rounded to
/// one decimal, never below 1.0.
pub fn flesch_kincaid_grade(text: &str) -> f32 {
    let sentences = split_sentences(text).len().max(1) as f64;
    let words = text.split_whitespace().count().max(1) as f64;
    let syllables = count_syllables(text) as f64;

    let grade = 0.39 * (words / sentences) + 11.8 * (syllables / words) - 15.59;
    ((grade * 10.0).round() / 10.0).max(1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_words_are_one_syllable() {
        assert_eq!(syllables_in_word("the"), 1);
        assert_eq!(syllables_in_word("flu"), 1);
    }

    #[test]
    fn vowel_groups_counted() {
        assert_eq!(syllables_in_word("fever"), 2);
        assert_eq!(syllables_in_word("medication"), 4);
        assert_eq!(syllables_in_word("rhythm"), 1);
    }

    #[test]
    fn trailing_e_is_silent() {
        assert_eq!(syllables_in_word("dose"), 1);
        assert_eq!(syllables_in_word("there"), 1);
    }

    #[test]
    fn silent_e_never_drops_below_one() {
        assert_eq!(syllables_in_word("eyeee"), 1);
        assert_eq!(syllables_in_word("note"), 1);
        assert_eq!(syllables_in_word("capsule"), 2);
    }

    #[test]
    fn simple_text_floors_at_one() {
        assert_eq!(flesch_kincaid_grade("Take a pill. Rest now."), 1.0);
        assert_eq!(flesch_kincaid_grade(""), 1.0);
    }

    #[test]
    fn dense_text_grades_higher() {
        let plain = "You have a cold. Drink water. Get rest.";
        let dense = "Pharmacological intervention with antihypertensive medication \
                     necessitates comprehensive cardiovascular monitoring.";
        assert!(flesch_kincaid_grade(dense) > flesch_kincaid_grade(plain));
        assert!(flesch_kincaid_grade(dense) > 12.0);
    }

    #[test]
    fn rounded_to_one_decimal() {
        let grade = flesch_kincaid_grade("Your blood pressure medication should be taken every morning.");
        assert!(((grade * 10.0).round() - grade * 10.0).abs() < 1e-3);
    }
}
