use regex::{NoExpand, Regex, RegexBuilder};

use crate::error::OcrError;
use crate::rules::{DeletionRule, ReplacementRule, RuleSet};

pub const NAME: &str = "user";

/// Apply deletion rules, then replacement rules.
///
/// Replacement rules that fail to compile are skipped; their messages are
/// pushed to `warnings`.
pub fn apply(text: &str, rules: &RuleSet, warnings: &mut Vec<String>) -> String {
    let text = apply_deletions(text, &rules.deletions);
    apply_replacements(&text, &rules.replacements, warnings)
}

pub fn apply_deletions(text: &str, rules: &[DeletionRule]) -> String {
    rules
        .iter()
        .filter(|rule| !rule.target.is_empty())
        .fold(text.to_string(), |current, rule| {
            if rule.is_contextual() {
                delete_with_context(&current, rule)
            } else {
                current.replace(rule.target.as_str(), "")
            }
        })
}

/// Delete occurrences of the rule's target unless its neighbors are protected
fn delete_with_context(text: &str, rule: &DeletionRule) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last = 0;

    for (offset, matched) in text.match_indices(rule.target.as_str()) {
        let prev = text[..offset].chars().next_back();
        let next = text[offset + matched.len()..].chars().next();

        result.push_str(&text[last..offset]);
        if is_protected(rule, prev, next) {
            result.push_str(matched);
        }
        last = offset + matched.len();
    }
    result.push_str(&text[last..]);
    result
}

fn is_protected(rule: &DeletionRule, prev: Option<char>, next: Option<char>) -> bool {
    let letter = |c: Option<char>| c.is_some_and(is_latin_letter);
    let digit = |c: Option<char>| c.is_some_and(|c| c.is_ascii_digit());

    (rule.ignore_between_letters && letter(prev) && letter(next))
        || (rule.ignore_between_numbers && digit(prev) && digit(next))
        || (rule.ignore_inside_words
            && (letter(prev) || digit(prev))
            && (letter(next) || digit(next)))
}

// Basic Latin plus the Latin-1 accented range
fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || ('\u{C0}'..='\u{FF}').contains(&c)
}

pub fn apply_replacements(text: &str, rules: &[ReplacementRule], warnings: &mut Vec<String>) -> String {
    let mut current = text.to_string();

    for rule in rules {
        let regex = match compile(rule) {
            Ok(Some(regex)) => regex,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!("Skipping replacement rule: {}", e);
                warnings.push(e.to_string());
                continue;
            }
        };

        current = if rule.is_regex {
            regex
                .replace_all(&current, expand_group_refs(&rule.replace).as_str())
                .into_owned()
        } else {
            regex
                .replace_all(&current, NoExpand(&rule.replace))
                .into_owned()
        };
    }

    current
}

/// Build the matcher for a rule; `None` for disabled or empty rules
pub fn compile(rule: &ReplacementRule) -> Result<Option<Regex>, OcrError> {
    if !rule.enabled || rule.find.is_empty() {
        return Ok(None);
    }

    let pattern = if rule.is_regex {
        rule.find.clone()
    } else {
        literal_pattern(&rule.find, rule.whole_word)
    };

    RegexBuilder::new(&pattern)
        .case_insensitive(!rule.case_sensitive)
        .build()
        .map(Some)
        .map_err(|e| OcrError::RuleCompile {
            pattern: rule.find.clone(),
            reason: e.to_string(),
        })
}

/// Escaped literal; whole-word rules get `\b` only on sides that end in a word character
fn literal_pattern(find: &str, whole_word: bool) -> String {
    let escaped = regex::escape(find);
    if !whole_word {
        return escaped;
    }

    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
    let mut pattern = String::with_capacity(escaped.len() + 4);
    if is_word(find.chars().next()) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&escaped);
    if is_word(find.chars().next_back()) {
        pattern.push_str(r"\b");
    }
    pattern
}

/// Rewrite `$1` / `$&` group references to the braced form so a digit
/// reference can be followed directly by letters
fn expand_group_refs(replace: &str) -> String {
    let mut out = String::with_capacity(replace.len() + 8);
    let mut chars = replace.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                out.push_str("$$");
            }
            Some('&') => {
                chars.next();
                out.push_str("${0}");
            }
            Some(d) if d.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                    digits.push(*d);
                    chars.next();
                }
                out.push_str("${");
                out.push_str(&digits);
                out.push('}');
            }
            Some('{') => out.push('$'),
            _ => out.push_str("$$"),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_rules() -> Vec<DeletionRule> {
        vec![
            DeletionRule::new("-").ignore_between_letters(),
            DeletionRule::new(".").ignore_between_numbers(),
            DeletionRule::new("'").ignore_inside_words(),
        ]
    }

    #[test]
    fn test_deletion_context_guard() {
        let input = "self-destruct 3.14 word's";
        assert_eq!(apply_deletions(input, &context_rules()), input);
    }

    #[test]
    fn test_deletion_removes_unprotected() {
        assert_eq!(apply_deletions("- self . 3 ' ", &context_rules()), " self  3  ");
    }

    #[test]
    fn test_plain_deletion_removes_everything() {
        let rules = vec![DeletionRule::new("~"), DeletionRule::new("")];
        assert_eq!(apply_deletions("he~llo~", &rules), "hello");
    }

    #[test]
    fn test_accented_letters_are_letters() {
        let rules = vec![DeletionRule::new("-").ignore_between_letters()];
        assert_eq!(apply_deletions("café-crème -x", &rules), "café-crème x");
    }

    #[test]
    fn test_replacements_apply_in_order() {
        let rules = vec![
            ReplacementRule::literal("cat", "dog"),
            ReplacementRule::literal("dog", "wolf"),
        ];
        let mut warnings = Vec::new();
        assert_eq!(apply_replacements("cat", &rules, &mut warnings), "wolf");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_replacement_case_and_whole_word() {
        let mut warnings = Vec::new();
        let rules = vec![ReplacementRule::literal("rn", "m").whole_word(true)];
        assert_eq!(apply_replacements("rn turn RN", &rules, &mut warnings), "m turn m");

        let rules = vec![ReplacementRule::literal("Hi", "Hello").case_sensitive(true)];
        assert_eq!(apply_replacements("hi Hi", &rules, &mut warnings), "hi Hello");
    }

    #[test]
    fn test_whole_word_symbol_edges() {
        let mut warnings = Vec::new();
        let rules = vec![ReplacementRule::literal("?!", "!").whole_word(true)];
        assert_eq!(apply_replacements("what?! ok", &rules, &mut warnings), "what! ok");
    }

    #[test]
    fn test_literal_replacement_is_not_expanded() {
        let mut warnings = Vec::new();
        let rules = vec![ReplacementRule::literal("price", "$5")];
        assert_eq!(apply_replacements("the price", &rules, &mut warnings), "the $5");
    }

    #[test]
    fn test_regex_group_references() {
        let mut warnings = Vec::new();
        let rules = vec![ReplacementRule::regex(r"(\d+)x", "$1 times")];
        assert_eq!(apply_replacements("3x", &rules, &mut warnings), "3 times");

        let rules = vec![ReplacementRule::regex(r"(\w)(\w)", "$2$1a")];
        assert_eq!(apply_replacements("ab", &rules, &mut warnings), "baa");
    }

    #[test]
    fn test_invalid_rule_is_skipped_with_warning() {
        let mut warnings = Vec::new();
        let rules = vec![
            ReplacementRule::regex("(unclosed", "x"),
            ReplacementRule::literal("a", "b"),
            ReplacementRule::literal("b", "c").enabled(false),
        ];
        assert_eq!(apply_replacements("a", &rules, &mut warnings), "b");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("(unclosed"));
    }

    #[test]
    fn test_unsupported_regex_syntax_is_skipped() {
        let mut warnings = Vec::new();
        let rules = vec![
            ReplacementRule::regex(r"(?<=1)l", "1"),
            ReplacementRule::regex(r"(o)\1", "$1"),
            ReplacementRule::literal("l", "I"),
        ];
        assert_eq!(apply_replacements("1l too", &rules, &mut warnings), "1I too");
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_expand_group_refs() {
        assert_eq!(expand_group_refs("$1a"), "${1}a");
        assert_eq!(expand_group_refs("[$&]"), "[${0}]");
        assert_eq!(expand_group_refs("$$"), "$$");
        assert_eq!(expand_group_refs("${name}"), "${name}");
        assert_eq!(expand_group_refs("cost $"), "cost $$");
    }
}
