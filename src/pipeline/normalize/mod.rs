//! Lexical digest of extracted text used as model input.
//!
//! Tokenize, drop stop words, lemmatize, case-fold, re-join with single
//! spaces. The digest never feeds segmentation or attribution, which work
//! on the raw text.

pub mod lemmatizer;
pub mod stopwords;

pub use lemmatizer::{Lemmatizer, RuleLemmatizer};
pub use stopwords::is_stop_word;

use std::sync::LazyLock;

use regex::Regex;

/// Word tokens (inner apostrophes kept) or single non-space symbols.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+(?:['’]\w+)*|[^\w\s]").unwrap());

/// Split text into tokens. Whitespace never produces a token.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    TOKEN.find_iter(text).map(|m| m.as_str())
}

/// Normalize with the default [`RuleLemmatizer`]. Never fails.
pub fn normalize(raw_text: &str) -> String {
    normalize_with(raw_text, &RuleLemmatizer)
}

pub fn normalize_with(raw_text: &str, lemmatizer: &dyn Lemmatizer) -> String {
    tokenize(raw_text)
        .filter(|token| !is_stop_word(token))
        .map(|token| lemmatizer.lemma(token))
        .filter(|lemma| !lemma.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_stop_words_and_lemmatizes() {
        assert_eq!(
            normalize("The patients were taking their medications daily."),
            "patient take medication daily ."
        );
    }

    #[test]
    fn whitespace_collapses() {
        assert_eq!(normalize("  Fever\n\n\tcough  "), "fever cough");
    }

    #[test]
    fn empty_input_gives_empty_digest() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n "), "");
        assert_eq!(normalize("the of and"), "");
    }

    #[test]
    fn negation_survives() {
        assert_eq!(normalize("Patient denies chest pain, no fever."), "patient deny chest pain , no fever .");
    }

    #[test]
    fn contractions_stay_one_token() {
        let tokens: Vec<_> = tokenize("doesn't hurt").collect();
        assert_eq!(tokens, vec!["doesn't", "hurt"]);
    }

    #[test]
    fn custom_lemmatizer_is_used() {
        struct Upper;
        impl Lemmatizer for Upper {
            fn lemma(&self, token: &str) -> String {
                token.to_uppercase()
            }
        }
        assert_eq!(normalize_with("mild fever", &Upper), "MILD FEVER");
    }
}
