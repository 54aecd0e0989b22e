//! User-defined correction rules
//!
//! Rules are plain data owned by the caller. The orchestrator resolves a
//! [`Scope`] against a [`RuleBook`] and hands the flattened [`RuleSet`] to the
//! text pipeline, which only ever reads it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::OcrError;

/// Find and replace rule, applied in list order.
///
/// Regex rules use the `regex` crate syntax. Patterns written for browser
/// engines mostly carry over, but lookaround (`(?=`, `(?<=` ...) and
/// backreferences (`\1`) are rejected; such a rule is skipped with a warning.
/// Replacement text may use `$1`, `$&` or `${name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementRule {
    pub find: String,
    #[serde(default)]
    pub replace: String,
    #[serde(default)]
    pub is_regex: bool,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub whole_word: bool,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ReplacementRule {
    /// Case-insensitive literal rule
    pub fn literal(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
            is_regex: false,
            case_sensitive: false,
            whole_word: false,
            enabled: true,
        }
    }

    pub fn regex(pattern: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            is_regex: true,
            ..Self::literal(pattern, replace)
        }
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    pub fn whole_word(mut self, yes: bool) -> Self {
        self.whole_word = yes;
        self
    }

    pub fn enabled(mut self, yes: bool) -> Self {
        self.enabled = yes;
        self
    }
}

/// Character (or substring) deletion rule with optional context protection.
///
/// Deserializes from either the object form or a bare string, which is the
/// older format and carries no protection flags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawDeletionRule", rename_all = "camelCase")]
pub struct DeletionRule {
    #[serde(rename = "char")]
    pub target: String,
    pub ignore_between_letters: bool,
    pub ignore_between_numbers: bool,
    pub ignore_inside_words: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDeletionRule {
    Legacy(String),
    Full {
        #[serde(rename = "char", default)]
        target: String,
        #[serde(rename = "ignoreBetweenLetters", default)]
        ignore_between_letters: bool,
        #[serde(rename = "ignoreBetweenNumbers", default)]
        ignore_between_numbers: bool,
        #[serde(rename = "ignoreInsideWords", default)]
        ignore_inside_words: bool,
    },
}

impl From<RawDeletionRule> for DeletionRule {
    fn from(raw: RawDeletionRule) -> Self {
        match raw {
            RawDeletionRule::Legacy(target) => DeletionRule::new(target),
            RawDeletionRule::Full {
                target,
                ignore_between_letters,
                ignore_between_numbers,
                ignore_inside_words,
            } => DeletionRule {
                target,
                ignore_between_letters,
                ignore_between_numbers,
                ignore_inside_words,
            },
        }
    }
}

impl DeletionRule {
    /// Unconditional deletion
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn ignore_between_letters(mut self) -> Self {
        self.ignore_between_letters = true;
        self
    }

    pub fn ignore_between_numbers(mut self) -> Self {
        self.ignore_between_numbers = true;
        self
    }

    pub fn ignore_inside_words(mut self) -> Self {
        self.ignore_inside_words = true;
        self
    }

    pub fn is_contextual(&self) -> bool {
        self.ignore_between_letters || self.ignore_between_numbers || self.ignore_inside_words
    }
}

/// Flattened rules for one text pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub replacements: Vec<ReplacementRule>,
    pub deletions: Vec<DeletionRule>,
}

impl RuleSet {
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty() && self.deletions.is_empty()
    }

    /// Append `other` after this set's rules
    pub fn extend(&mut self, other: &RuleSet) {
        self.replacements.extend(other.replacements.iter().cloned());
        self.deletions.extend(other.deletions.iter().cloned());
    }
}

/// Rule namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Site(String),
}

impl Scope {
    /// Scope for a page origin. Opaque (`"null"`) or missing origins fall back to global.
    pub fn for_origin(origin: Option<&str>) -> Self {
        match origin.map(str::trim) {
            Some(origin) if !origin.is_empty() && origin != "null" => {
                Scope::Site(origin.to_string())
            }
            _ => Scope::Global,
        }
    }

    /// Storage key: `global` or `site:<origin>`
    pub fn key(&self) -> String {
        match self {
            Scope::Global => "global".to_string(),
            Scope::Site(origin) => format!("site:{}", origin),
        }
    }
}

/// Global rules plus per-site rules keyed by `site:<origin>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleBook {
    pub global: RuleSet,
    pub sites: BTreeMap<String, RuleSet>,
}

impl RuleBook {
    pub fn from_json(json: &str) -> Result<Self, OcrError> {
        serde_json::from_str(json).map_err(|e| OcrError::Config(format!("invalid rule book: {}", e)))
    }

    pub fn site_mut(&mut self, origin: &str) -> &mut RuleSet {
        self.sites.entry(Scope::Site(origin.to_string()).key()).or_default()
    }

    /// Rules in effect for `scope`: global rules first, then the site's own
    pub fn effective(&self, scope: &Scope) -> RuleSet {
        let mut rules = self.global.clone();
        if let Scope::Site(_) = scope {
            if let Some(site) = self.sites.get(&scope.key()) {
                rules.extend(site);
            }
        }
        rules
    }
}

/// Parse the older plain-text replacement list: one `find → replace` or
/// `find => replace` per line. Lines without an arrow are ignored.
pub fn parse_legacy_replacements(text: &str) -> Vec<ReplacementRule> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let arrow = if line.contains('→') {
                "→"
            } else if line.contains("=>") {
                "=>"
            } else {
                return None;
            };
            let (find, replace) = line.split_once(arrow)?;
            let find = find.trim();
            if find.is_empty() {
                return None;
            }
            Some(ReplacementRule::literal(find, replace.trim()))
        })
        .collect()
}
