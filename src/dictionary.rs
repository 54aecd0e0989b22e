//! Vocabulary store for dictionary-based OCR correction
//!
//! Vocabularies are keyed by OCR language code, loaded once and shared
//! read-only (`Arc`) between pipeline runs.

use crate::error::OcrError;
use crate::levenshtein;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_LANGUAGE: &str = "eng";

/// Seed English vocabulary bundled with the crate
const DEFAULT_VOCABULARY: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on",
    "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we",
    "say", "her", "she", "or", "an", "will", "my", "one", "all", "would", "there", "their",
    "what", "so", "up", "out", "if", "about", "who", "get", "which", "go", "me", "when", "make",
    "can", "like", "time", "no", "just", "him", "know", "take", "people", "into", "year", "your",
    "good", "some", "could", "them", "see", "other", "than", "then", "now", "look", "only",
    "come", "its", "over", "think", "also", "back", "after", "use", "two", "how", "our", "work",
    "first", "well", "way", "even", "new", "want", "because", "any", "these", "give", "day",
    "most", "us", "is", "was", "are", "were", "been", "has", "had", "did", "does", "said", "made",
    "went", "got", "took", "came", "gave", "thought", "saw", "knew", "told", "asked", "found",
    "left", "ran", "sat", "stood", "fell", "kept", "held", "let", "hello", "world",
];

/// Lowercase word set that remembers insertion order
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: Vec<String>,
    index: HashSet<String>,
}

impl Vocabulary {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary = Self::default();
        for word in words {
            let word = word.as_ref().trim().to_lowercase();
            if !word.is_empty() && vocabulary.index.insert(word.clone()) {
                vocabulary.words.push(word);
            }
        }
        vocabulary
    }

    /// Case-insensitive exact membership
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in load order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Nearest word within `max_distance` edits of the lowercased input
    pub fn find_closest(&self, word: &str, max_distance: usize) -> Option<&str> {
        levenshtein::find_closest_match(&word.to_lowercase(), self.iter(), max_distance)
    }
}

/// Per-language vocabularies
#[derive(Debug, Default)]
pub struct DictionaryManager {
    dictionaries: HashMap<String, Arc<Vocabulary>>,
}

impl DictionaryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the bundled vocabulary for `lang`. Repeated calls are no-ops.
    pub fn load(&mut self, lang: &str) -> Result<Arc<Vocabulary>, OcrError> {
        if let Some(existing) = self.dictionaries.get(lang) {
            return Ok(existing.clone());
        }
        if lang != DEFAULT_LANGUAGE {
            return Err(OcrError::DictionaryNotLoaded(lang.to_string()));
        }
        Ok(self.load_words(lang, DEFAULT_VOCABULARY.iter().copied()))
    }

    /// Vocabulary for an OCR language such as `"eng"`, `"jpn+eng"` or `"kor"`.
    ///
    /// Takes the first `+`-joined language with a bundled vocabulary and falls
    /// back to English, so correction keeps working for other scripts.
    pub fn load_or_default(&mut self, ocr_language: &str) -> Result<Arc<Vocabulary>, OcrError> {
        for lang in ocr_language.split('+').filter(|l| !l.is_empty()) {
            if let Ok(vocabulary) = self.load(lang) {
                return Ok(vocabulary);
            }
        }
        tracing::debug!(
            "No bundled dictionary for '{}', using '{}'",
            ocr_language,
            DEFAULT_LANGUAGE
        );
        self.load(DEFAULT_LANGUAGE)
    }

    /// Register a vocabulary for `lang` unless one is already loaded
    pub fn load_words<I, S>(&mut self, lang: &str, words: I) -> Arc<Vocabulary>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dictionaries
            .entry(lang.to_string())
            .or_insert_with(|| {
                let vocabulary = Vocabulary::from_words(words);
                tracing::info!("Loaded {} dictionary words for '{}'", vocabulary.len(), lang);
                Arc::new(vocabulary)
            })
            .clone()
    }

    /// Load a word list file: one word per line, `#` starts a comment line
    pub fn load_file(&mut self, lang: &str, path: &Path) -> Result<Arc<Vocabulary>, OcrError> {
        if let Some(existing) = self.dictionaries.get(lang) {
            return Ok(existing.clone());
        }
        let contents = std::fs::read_to_string(path)?;
        let words = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'));
        Ok(self.load_words(lang, words))
    }

    pub fn is_loaded(&self, lang: &str) -> bool {
        self.dictionaries.contains_key(lang)
    }

    /// Case-insensitive membership; false when `lang` is not loaded
    pub fn has(&self, word: &str, lang: &str) -> bool {
        self.dictionaries
            .get(lang)
            .is_some_and(|vocabulary| vocabulary.contains(word))
    }

    pub fn get(&self, lang: &str) -> Option<Arc<Vocabulary>> {
        self.dictionaries.get(lang).cloned()
    }
}
