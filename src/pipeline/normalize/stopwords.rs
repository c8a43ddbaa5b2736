use std::collections::HashSet;
use std::sync::LazyLock;

/// English stop words, lower-case. Contractions are listed whole because
/// the tokenizer keeps inner apostrophes.
static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
        "any", "are", "aren't", "as", "at", "be", "because", "been", "before", "being",
        "below", "between", "both", "but", "by", "can", "cannot", "could", "couldn't", "did",
        "didn't", "do", "does", "doesn't", "doing", "don't", "down", "during", "each", "either",
        "else", "ever", "few", "for", "from", "further", "had", "hadn't", "has", "hasn't",
        "have", "haven't", "having", "he", "he's", "her", "here", "hers", "herself", "him",
        "himself", "his", "how", "however", "i", "i'm", "i've", "if", "in", "into", "is",
        "isn't", "it", "it's", "its", "itself", "just", "may", "me", "might", "more", "most",
        "must", "my", "myself", "neither", "nor", "now", "of", "off", "often", "on", "once",
        "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "per",
        "quite", "rather", "same", "she", "she's", "should", "shouldn't", "so", "some",
        "such", "than", "that", "that's", "the", "their", "theirs", "them", "themselves",
        "then", "there", "there's", "these", "they", "they're", "this", "those", "though",
        "through", "thus", "to", "too", "under", "until", "up", "upon", "us", "very", "was",
        "wasn't", "we", "we're", "were", "weren't", "what", "when", "where", "whether",
        "which", "while", "who", "whom", "whose", "why", "will", "with", "within", "without",
        "won't", "would", "wouldn't", "yet", "you", "you're", "your", "yours", "yourself",
        "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Case-insensitive stop-word test.
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_words_are_stop_words() {
        for w in ["the", "The", "WAS", "and", "of", "don't"] {
            assert!(is_stop_word(w), "{w} should be a stop word");
        }
    }

    #[test]
    fn clinical_terms_are_not() {
        for w in ["fever", "patient", "no", "not", "mg", "."] {
            assert!(!is_stop_word(w), "{w} should survive");
        }
    }
}
