//! Sentence-level provenance for generated summaries.
//!
//! Every summary sentence is attributed to the single source section it
//! most resembles lexically, using a TF-IDF space fitted jointly over the
//! sections and the sentences.

pub mod tfidf;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::pipeline::segment::Section;
use tfidf::{cosine, TfidfModel};

/// Links one summary sentence to its best-matching section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    pub summary_sentence: String,
    pub section_id: usize,
    pub section_text: String,
    /// Cosine similarity in [0, 1]. Low values mean weak grounding.
    pub score: f32,
}

/// Sentence-final punctuation followed by whitespace.
static SENTENCE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// Split text after `.`, `!` or `?` when followed by whitespace.
/// Fragments are trimmed; empty ones are dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        // punctuation is one ASCII byte; keep it with its sentence
        sentences.push(&text[start..boundary.start() + 1]);
        start = boundary.end();
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Attribute each sentence of `summary_text` to a section.
///
/// Returns one entry per sentence in order. Ties go to the earliest
/// section. No sections, or no sentences, gives an empty result.
pub fn attribute(summary_text: &str, sections: &[Section]) -> Vec<ProvenanceEntry> {
    if sections.is_empty() {
        return Vec::new();
    }
    let sentences = split_sentences(summary_text);
    if sentences.is_empty() {
        return Vec::new();
    }

    let corpus: Vec<&str> = sections
        .iter()
        .map(|s| s.text.as_str())
        .chain(sentences.iter().copied())
        .collect();
    let model = TfidfModel::fit(&corpus);
    let section_vectors: Vec<_> = sections.iter().map(|s| model.transform(&s.text)).collect();

    sentences
        .into_iter()
        .map(|sentence| {
            let vector = model.transform(sentence);
            let mut best = 0;
            let mut best_score = f64::NEG_INFINITY;
            for (index, section_vector) in section_vectors.iter().enumerate() {
                let score = cosine(&vector, section_vector);
                if score > best_score {
                    best = index;
                    best_score = score;
                }
            }

            let section = &sections[best];
            ProvenanceEntry {
                summary_sentence: sentence.to_string(),
                section_id: section.id,
                section_text: section.text.clone(),
                score: best_score.clamp(0.0, 1.0) as f32,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::segment::segment;

    fn fever_sections() -> Vec<Section> {
        segment("Patient has mild fever.\n\nNo other symptoms reported.")
    }

    #[test]
    fn splits_on_terminal_punctuation_and_whitespace() {
        assert_eq!(
            split_sentences("Take with food. Call if dizzy! Any rash?  Stop."),
            vec!["Take with food.", "Call if dizzy!", "Any rash?", "Stop."]
        );
    }

    #[test]
    fn decimals_and_abbreviations_without_space_stay_joined() {
        assert_eq!(
            split_sentences("Dose 2.5 mg daily.No change"),
            vec!["Dose 2.5 mg daily.No change"]
        );
    }

    #[test]
    fn blank_summary_has_no_sentences() {
        assert!(split_sentences("   \n").is_empty());
    }

    #[test]
    fn fever_sentence_maps_to_first_section() {
        let sections = fever_sections();
        let entries = attribute("Patient has a fever.", &sections);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].section_id, 0);
        assert_eq!(entries[0].section_text, "Patient has mild fever.");

        // The same sentence scores strictly lower against section 1 alone
        let corpus = [
            sections[0].text.as_str(),
            sections[1].text.as_str(),
            "Patient has a fever.",
        ];
        let model = TfidfModel::fit(&corpus);
        let sentence = model.transform("Patient has a fever.");
        let other = cosine(&sentence, &model.transform(&sections[1].text));
        assert!(entries[0].score as f64 > other);
    }

    #[test]
    fn empty_sections_give_empty_result() {
        assert!(attribute("Anything at all. More text.", &[]).is_empty());
    }

    #[test]
    fn empty_summary_gives_empty_result() {
        assert!(attribute("", &fever_sections()).is_empty());
    }

    #[test]
    fn one_entry_per_sentence_in_order() {
        let sections = fever_sections();
        let summary = "No symptoms were reported. The patient has a mild fever. Rest well!";
        let entries = attribute(summary, &sections);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].summary_sentence, "No symptoms were reported.");
        assert_eq!(entries[0].section_id, 1);
        assert_eq!(entries[1].section_id, 0);
        for e in &entries {
            assert!(e.section_id < sections.len());
            assert!((0.0..=1.0).contains(&e.score));
        }
    }

    #[test]
    fn unmatched_sentence_goes_to_first_section_with_zero_score() {
        let entries = attribute("Zzz qqq.", &fever_sections());
        assert_eq!(entries[0].section_id, 0);
        assert_eq!(entries[0].score, 0.0);
    }

    #[test]
    fn ties_resolve_to_lowest_section_id() {
        let sections = segment("fever noted\n\nfever noted");
        let entries = attribute("fever noted.", &sections);
        assert_eq!(entries[0].section_id, 0);
    }

    #[test]
    fn section_ids_are_carried_not_positions() {
        let sections = vec![
            Section { id: 7, text: "headache".into() },
            Section { id: 9, text: "nausea vomiting".into() },
        ];
        let entries = attribute("Nausea noted.", &sections);
        assert_eq!(entries[0].section_id, 9);
    }
}
