use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const NAME: &str = "noise";

/// How hard noise cleaning prunes symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggression {
    /// Keeps dash-only lines and isolated currency/math symbols
    Low,
    #[default]
    Medium,
    /// Also drops isolated tildes, symbol-only tokens and sign-led amounts like `$100`
    High,
}

impl std::str::FromStr for Aggression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Aggression::Low),
            "medium" => Ok(Aggression::Medium),
            "high" => Ok(Aggression::High),
            other => Err(format!("unknown noise aggression '{}'", other)),
        }
    }
}

// Border spikes: | _ = em dash and hyphen
static LEADING_SPIKES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[|_=\x{2014}\-]+").unwrap());
static TRAILING_SPIKES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[|_=\x{2014}\-]+$").unwrap());
static ALL_SYMBOLS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^a-zA-Z0-9]+$").unwrap());
static ELLIPSIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[.?!]+$").unwrap());
static NOISE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[|\\/=_\-]+$").unwrap());

const STANDARD_PUNCTUATION: &[char] = &['.', ',', ';', '?', '!', '\'', '"', '~'];
const NOISE_SYMBOLS: &[char] = &['|', '\\', '/', '=', '_', '-'];
const CURRENCY_MATH: &[char] = &['$', '€', '£', '%', '&', '+'];
// Symbols a word may carry at high aggression
const SENTENCE_SYMBOLS: &[char] = &[
    '.', ',', ';', ':', '?', '!', '\'', '"', '-', '(', ')', '[', ']', '…', '~',
];

/// Remove stray symbols and isolated characters left by border spikes and OCR artifacts
pub fn apply(text: &str, aggression: Aggression) -> String {
    text.split('\n')
        .map(|line| clean_line(line, aggression))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn clean_line(line: &str, aggression: Aggression) -> String {
    let trimmed = line.trim();
    let trimmed = LEADING_SPIKES.replace(trimmed, "");
    let trimmed = TRAILING_SPIKES.replace(&trimmed, "");

    if ALL_SYMBOLS.is_match(&trimmed) {
        let keep = ELLIPSIS.is_match(&trimmed)
            || trimmed.contains('~')
            || (aggression == Aggression::Low && trimmed.contains('-'));
        return if keep {
            trimmed.into_owned()
        } else {
            String::new()
        };
    }

    trimmed
        .split(' ')
        .map(|token| clean_token(token, aggression))
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

fn clean_token(token: &str, aggression: Aggression) -> &str {
    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphanumeric() {
            return token;
        }
        if c == '~' && aggression == Aggression::High {
            return "";
        }
        if STANDARD_PUNCTUATION.contains(&c) {
            return token;
        }
        if NOISE_SYMBOLS.contains(&c) {
            return "";
        }
        if aggression == Aggression::Low && CURRENCY_MATH.contains(&c) {
            return token;
        }
        return "";
    }

    if NOISE_RUN.is_match(token) {
        return "";
    }
    if aggression == Aggression::High && is_high_noise(token) {
        return "";
    }
    token
}

/// Symbol runs with no letters or digits, and amounts led by a currency/math sign
fn is_high_noise(token: &str) -> bool {
    let starts_with_sign = token.starts_with(|c: char| CURRENCY_MATH.contains(&c));
    let has_alphanumeric = token.chars().any(char::is_alphanumeric);
    starts_with_sign
        || (!has_alphanumeric && token.chars().any(|c| !SENTENCE_SYMBOLS.contains(&c)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_keeps_currency() {
        let cleaned = apply("Hello World --- $100", Aggression::Low);
        assert!(cleaned.contains("$100"));
        assert!(!cleaned.contains("---"));
    }

    #[test]
    fn test_high_strips_symbols() {
        assert_eq!(apply("Hello World | ~ $100", Aggression::High), "Hello World");
    }

    #[test]
    fn test_medium_drops_isolated_currency() {
        assert_eq!(apply("pay $ now", Aggression::Medium), "pay  now");
        assert_eq!(apply("pay $ now", Aggression::Low), "pay $ now");
    }

    #[test]
    fn test_border_spikes_are_trimmed() {
        assert_eq!(apply("|| Hello __", Aggression::Medium), "Hello");
        assert_eq!(apply("\u{2014}Wait\u{2014}", Aggression::Medium), "Wait");
    }

    #[test]
    fn test_symbol_only_lines() {
        assert_eq!(apply("Hi\n...\n#@*\n~~", Aggression::Medium), "Hi\n...\n~~");
        assert_eq!(apply("a\n. - .\nb", Aggression::Low), "a\n. - .\nb");
        assert_eq!(apply("a\n. - .\nb", Aggression::Medium), "a\nb");
    }

    #[test]
    fn test_words_with_punctuation_survive_high() {
        assert_eq!(
            apply("Wait... it's self-made (really)!", Aggression::High),
            "Wait... it's self-made (really)!"
        );
    }

    #[test]
    fn test_high_keeps_words_with_symbols() {
        assert_eq!(
            apply("Don\u{2019}t go \u{201C}now\u{201D} 50% off", Aggression::High),
            "Don\u{2019}t go \u{201C}now\u{201D} 50% off"
        );
        assert_eq!(apply("Q&A at #3 @noon", Aggression::High), "Q&A at #3 @noon");
        assert_eq!(apply("pay +5 or &x now", Aggression::High), "pay  or  now");
        assert_eq!(apply("ok #@* ok", Aggression::High), "ok  ok");
    }

    #[test]
    fn test_tilde_token_kept_below_high() {
        assert_eq!(apply("Hey ~ you", Aggression::Medium), "Hey ~ you");
    }

    #[test]
    fn test_aggression_from_str() {
        assert_eq!("HIGH".parse::<Aggression>(), Ok(Aggression::High));
        assert!("extreme".parse::<Aggression>().is_err());
    }
}
