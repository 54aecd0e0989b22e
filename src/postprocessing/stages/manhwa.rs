use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const NAME: &str = "manhwa";

static SPACED_CAPITALS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z](?: [A-Z])+\b").unwrap());
static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SPACE_BEFORE_TERMINAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([.,;?!])").unwrap());

/// Repair comic-style text: letter-spaced capitals ("H E L L O") are joined
/// and the short lines of each speech bubble are reflowed into one line.
/// Blank-line paragraph breaks are kept as `\n\n`.
pub fn apply(text: &str) -> String {
    let joined = SPACED_CAPITALS.replace_all(text, |caps: &Captures| caps[0].replace(' ', ""));

    PARAGRAPH_BREAK
        .split(&joined)
        .map(reflow_paragraph)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn reflow_paragraph(paragraph: &str) -> String {
    let text = paragraph.replace("-\n", "").replace('\n', " ");
    let text = WHITESPACE_RUNS.replace_all(&text, " ");
    SPACE_BEFORE_TERMINAL
        .replace_all(text.trim(), "$1")
        .into_owned()
}
