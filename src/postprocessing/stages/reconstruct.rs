use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const NAME: &str = "reconstruct";

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static BROKEN_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)-\s+(\w+)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructOptions {
    /// Join single line breaks inside a paragraph with a space
    pub merge_lines: bool,
    /// Rejoin words split as `word- word`
    pub stabilize_sentences: bool,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            merge_lines: true,
            stabilize_sentences: true,
        }
    }
}

/// Rebuild sentences that OCR broke across lines
pub fn apply(text: &str, options: &ReconstructOptions) -> String {
    let mut result = text.to_string();

    if options.merge_lines {
        result = PARAGRAPH_BREAK
            .split(&result)
            .map(|paragraph| paragraph.replace('\n', " "))
            .collect::<Vec<_>>()
            .join("\n\n");
    }

    if options.stabilize_sentences {
        result = BROKEN_WORD.replace_all(&result, "${1}${2}").into_owned();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merges_lines_within_paragraph() {
        let options = ReconstructOptions::default();
        assert_eq!(
            apply("This is\na sentence\n\nNext one", &options),
            "This is a sentence\n\nNext one"
        );
    }

    #[test]
    fn test_rejoins_hyphenated_break() {
        let options = ReconstructOptions::default();
        assert_eq!(apply("pre-\nfix", &options), "prefix");
        assert_eq!(apply("well-known", &options), "well-known");
    }

    #[test]
    fn test_disabled_steps() {
        let options = ReconstructOptions {
            merge_lines: false,
            stabilize_sentences: false,
        };
        assert_eq!(apply("com- puter\nline", &options), "com- puter\nline");
    }
}
