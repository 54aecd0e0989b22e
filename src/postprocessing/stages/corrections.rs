use once_cell::sync::Lazy;
use regex::Regex;

pub const NAME: &str = "regex";

static HORIZONTAL_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static SPACE_BEFORE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r" ([.,;:!?])").unwrap());
// `l`/`1` misread for the pronoun; the verb is captured and put back
static PRONOUN_I: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[l1]( am| have| don't| will)").unwrap());
static LEADING_BAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\|\s*").unwrap());
static TRAILING_BAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)\s*\|$").unwrap());

/// Structural OCR fixes that are always safe to apply
pub fn apply(text: &str) -> String {
    let text = HORIZONTAL_RUNS.replace_all(text, " ");
    let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
    let text = text.replace("( ", "(").replace(" )", ")");
    let text = PRONOUN_I.replace_all(&text, "I${1}");
    let text = LEADING_BAR.replace_all(&text, "");
    let text = TRAILING_BAR.replace_all(&text, "");
    text.trim().to_string()
}
