use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::dictionary::{Vocabulary, DEFAULT_LANGUAGE};

pub const NAME: &str = "dictionary";

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]+").unwrap());

const MIN_WORD_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryOptions {
    /// Largest edit distance a correction may span; 0 falls back to 1
    pub max_distance: usize,
    /// Leave ALL-CAPS words alone (shouted dialogue, acronyms)
    pub ignore_all_caps: bool,
    /// Vocabulary language code
    pub language: String,
}

impl DictionaryOptions {
    /// Distance actually searched; an unset (zero) strength means 1
    pub fn effective_distance(&self) -> usize {
        if self.max_distance == 0 {
            1
        } else {
            self.max_distance
        }
    }
}

impl Default for DictionaryOptions {
    fn default() -> Self {
        Self {
            max_distance: 1,
            ignore_all_caps: true,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Replace out-of-vocabulary words with their nearest dictionary word,
/// keeping the original capitalization pattern
pub fn apply(text: &str, vocabulary: &Vocabulary, options: &DictionaryOptions) -> String {
    WORD.replace_all(text, |caps: &Captures| {
        let word = &caps[0];
        correct_word(word, vocabulary, options).unwrap_or_else(|| word.to_string())
    })
    .into_owned()
}

fn correct_word(word: &str, vocabulary: &Vocabulary, options: &DictionaryOptions) -> Option<String> {
    if word.len() < MIN_WORD_LEN {
        return None;
    }
    if options.ignore_all_caps && word.chars().all(|c| c.is_ascii_uppercase()) {
        return None;
    }
    if vocabulary.contains(word) {
        return None;
    }

    vocabulary
        .find_closest(word, options.effective_distance())
        .map(|corrected| match_case(word, corrected))
}

fn match_case(original: &str, corrected: &str) -> String {
    if original == original.to_uppercase() {
        return corrected.to_uppercase();
    }
    let mut chars = corrected.chars();
    match (original.chars().next(), chars.next()) {
        (Some(first), Some(head)) if first.is_uppercase() => {
            head.to_uppercase().chain(chars).collect()
        }
        _ => corrected.to_string(),
    }
}
