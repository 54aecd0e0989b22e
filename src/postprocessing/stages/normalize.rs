use once_cell::sync::Lazy;
use regex::Regex;

pub const NAME: &str = "normalize";

static HORIZONTAL_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static SPACE_BEFORE_CLOSING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+([.,!?:;)}\]])").unwrap());
static SPACE_AFTER_OPENING: Lazy<Regex> = Lazy::new(|| Regex::new(r"([({\[])\s+").unwrap());
static GLUED_SENTENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.,!?:;])([a-zA-Z])").unwrap());

/// Collapse spacing and tidy punctuation spacing.
/// Idempotent: running it twice gives the same result as once.
pub fn apply(text: &str) -> String {
    let text = HORIZONTAL_RUNS.replace_all(text, " ");
    let text = SPACE_BEFORE_CLOSING.replace_all(&text, "$1");
    let text = SPACE_AFTER_OPENING.replace_all(&text, "$1");
    let text = GLUED_SENTENCE.replace_all(&text, "$1 $2");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_spaces_and_tabs() {
        assert_eq!(apply("  Hello \t  world  "), "Hello world");
    }

    #[test]
    fn test_punctuation_spacing() {
        assert_eq!(apply("Hello , world !"), "Hello, world!");
        assert_eq!(apply("( inside ) [ x ]"), "(inside) [x]");
        assert_eq!(apply("Wait.What?No"), "Wait. What? No");
    }

    #[test]
    fn test_decimals_untouched() {
        assert_eq!(apply("pi is 3.14"), "pi is 3.14");
    }

    #[test]
    fn test_newlines_survive() {
        assert_eq!(apply("line one\nline two"), "line one\nline two");
    }

    #[test]
    fn test_idempotent_on_samples() {
        for sample in ["a .b", "x ,( a", "( .a", "a \n .", "Hi!you ( there )"] {
            let once = apply(sample);
            assert_eq!(apply(&once), once, "sample {:?}", sample);
        }
    }
}
