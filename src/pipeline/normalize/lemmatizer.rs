//! Rule-based English lemmatizer tuned for clinical prose.
//!
//! Lookup order: irregular forms, inflections of known verb stems, then
//! conservative plural stripping. Anything unrecognized passes through
//! lower-cased, so the worst case is a case-folding identity.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Maps a single token to its dictionary form.
pub trait Lemmatizer {
    fn lemma(&self, token: &str) -> String;
}

static IRREGULAR: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("is", "be"), ("are", "be"), ("was", "be"), ("were", "be"), ("been", "be"),
        ("being", "be"), ("am", "be"), ("has", "have"), ("had", "have"), ("having", "have"),
        ("does", "do"), ("did", "do"), ("done", "do"), ("went", "go"), ("gone", "go"),
        ("took", "take"), ("taken", "take"), ("gave", "give"), ("given", "give"),
        ("felt", "feel"), ("saw", "see"), ("seen", "see"), ("found", "find"), ("made", "make"),
        ("began", "begin"), ("begun", "begin"), ("ran", "run"), ("ate", "eat"),
        ("eaten", "eat"), ("slept", "sleep"), ("woke", "wake"), ("lost", "lose"),
        ("kept", "keep"), ("left", "leave"), ("told", "tell"), ("said", "say"),
        ("came", "come"), ("became", "become"), ("brought", "bring"), ("thought", "think"),
        ("underwent", "undergo"), ("undergone", "undergo"), ("fell", "fall"),
        ("fallen", "fall"), ("broke", "break"), ("broken", "break"), ("bled", "bleed"),
        ("swollen", "swell"), ("worse", "bad"), ("worst", "bad"), ("better", "good"),
        ("best", "good"), ("children", "child"), ("women", "woman"), ("men", "man"),
        ("feet", "foot"), ("teeth", "tooth"), ("mice", "mouse"), ("lying", "lie"),
        ("data", "datum"), ("criteria", "criterion"), ("phenomena", "phenomenon"),
        ("vertebrae", "vertebra"), ("bacteria", "bacterium"), ("ova", "ovum"),
    ]
    .into_iter()
    .collect()
});

/// Verb stems common in clinical notes.
const VERB_STEMS: &[&str] = &[
    "admit", "administer", "advise", "breathe", "complain", "complete", "confirm",
    "continue", "cough", "decrease", "deny", "develop", "diagnose", "discharge",
    "discontinue", "elevate", "examine", "experience", "follow", "improve", "increase",
    "indicate", "measure", "monitor", "note", "observe", "occur", "perform", "persist",
    "prescribe", "present", "recommend", "recover", "reduce", "refer", "report", "require",
    "resolve", "reveal", "schedule", "show", "start", "stop", "suggest", "take", "test",
    "treat", "vomit", "walk", "worsen",
];

/// Stems that double their final consonant before `-ed`/`-ing`.
const DOUBLING: &[&str] = &["admit", "occur", "refer", "stop"];

/// Inflected form → stem for every entry of [`VERB_STEMS`].
static VERB_FORMS: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    let mut forms = HashMap::new();
    for &stem in VERB_STEMS {
        for form in inflect(stem) {
            forms.insert(form, stem);
        }
    }
    forms
});

/// Words that end in `s` without being plurals.
static NOT_PLURAL: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "diabetes", "herpes", "measles", "mumps", "rabies", "scabies", "rickets", "news",
        "series", "species", "lens", "pancreas", "bias", "gas", "plus", "thus", "always",
        "perhaps", "whereas", "tetanus", "lupus", "bronchus", "uterus", "fetus", "virus",
        "status", "sinus", "anus", "pus", "stenosis",
    ]
    .into_iter()
    .collect()
});

fn ends_with_consonant_y(word: &str) -> bool {
    let mut rev = word.chars().rev();
    matches!(
        (rev.next(), rev.next()),
        (Some('y'), Some(c)) if !"aeiou".contains(c)
    )
}

fn inflect(stem: &str) -> Vec<String> {
    let doubled = DOUBLING.contains(&stem);
    let last = stem.chars().last().unwrap_or_default();
    let consonant_y = ends_with_consonant_y(stem);
    let y_cut = &stem[..stem.len().saturating_sub(1)];

    let third = if consonant_y {
        format!("{y_cut}ies")
    } else if ["s", "x", "z", "ch", "sh", "o"].iter().any(|s| stem.ends_with(s)) {
        format!("{stem}es")
    } else {
        format!("{stem}s")
    };

    let past = if stem.ends_with('e') {
        format!("{stem}d")
    } else if consonant_y {
        format!("{y_cut}ied")
    } else if doubled {
        format!("{stem}{last}ed")
    } else {
        format!("{stem}ed")
    };

    let progressive = if stem.ends_with("ee") {
        format!("{stem}ing")
    } else if stem.ends_with('e') {
        format!("{}ing", &stem[..stem.len() - 1])
    } else if doubled {
        format!("{stem}{last}ing")
    } else {
        format!("{stem}ing")
    };

    vec![third, past, progressive]
}

/// Strip a regular plural ending, or return `None` when the word should stay.
fn singularize(word: &str) -> Option<String> {
    if word.len() <= 3 || NOT_PLURAL.contains(word) || !word.ends_with('s') {
        return None;
    }
    // -ss, -us, -is (stress, nervous, arthritis, diagnosis) are not plurals
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return None;
    }
    if word.len() > 4 && word.ends_with("ies") {
        return Some(format!("{}y", &word[..word.len() - 3]));
    }
    if ["sses", "ches", "shes", "xes", "zes"].iter().any(|s| word.ends_with(s)) {
        return Some(word[..word.len() - 2].to_string());
    }
    Some(word[..word.len() - 1].to_string())
}

/// Default lemmatizer: lookup tables plus suffix rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleLemmatizer;

impl Lemmatizer for RuleLemmatizer {
    fn lemma(&self, token: &str) -> String {
        let lower = token.to_lowercase();
        if let Some(base) = IRREGULAR.get(lower.as_str()) {
            return base.to_string();
        }
        if let Some(stem) = VERB_FORMS.get(&lower) {
            return stem.to_string();
        }
        if !lower.chars().all(|c| c.is_alphabetic()) {
            return lower;
        }
        singularize(&lower).unwrap_or(lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lemma(word: &str) -> String {
        RuleLemmatizer.lemma(word)
    }

    #[test]
    fn irregular_forms() {
        assert_eq!(lemma("was"), "be");
        assert_eq!(lemma("Took"), "take");
        assert_eq!(lemma("underwent"), "undergo");
        assert_eq!(lemma("children"), "child");
    }

    #[test]
    fn verb_inflections() {
        assert_eq!(lemma("reports"), "report");
        assert_eq!(lemma("denied"), "deny");
        assert_eq!(lemma("denies"), "deny");
        assert_eq!(lemma("taking"), "take");
        assert_eq!(lemma("referred"), "refer");
        assert_eq!(lemma("stopping"), "stop");
        assert_eq!(lemma("diagnosed"), "diagnose");
        assert_eq!(lemma("breathing"), "breathe");
    }

    #[test]
    fn regular_plurals() {
        assert_eq!(lemma("medications"), "medication");
        assert_eq!(lemma("allergies"), "allergy");
        assert_eq!(lemma("patches"), "patch");
        assert_eq!(lemma("diseases"), "disease");
        assert_eq!(lemma("classes"), "class");
    }

    #[test]
    fn false_plurals_untouched() {
        for w in ["diabetes", "virus", "diagnosis", "arthritis", "stress", "nervous", "status"] {
            assert_eq!(lemma(w), w);
        }
    }

    #[test]
    fn unknown_and_numeric_pass_through_lowercased() {
        assert_eq!(lemma("Metformin"), "metformin");
        assert_eq!(lemma("500mg"), "500mg");
        assert_eq!(lemma("."), ".");
    }

    #[test]
    fn inflect_generates_three_forms() {
        assert_eq!(inflect("occur"), vec!["occurs", "occurred", "occurring"]);
        assert_eq!(inflect("deny"), vec!["denies", "denied", "denying"]);
        assert_eq!(inflect("note"), vec!["notes", "noted", "noting"]);
    }
}
