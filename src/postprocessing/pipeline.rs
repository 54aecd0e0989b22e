use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use super::stages;
use super::stages::dictionary::DictionaryOptions;
use super::stages::noise::Aggression;
use super::stages::reconstruct::ReconstructOptions;
use crate::dictionary::Vocabulary;
use crate::error::OcrError;
use crate::rules::RuleSet;

/// Stage toggles and parameters for text cleanup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    pub noise_cleaning: bool,
    pub noise_aggression: Aggression,
    pub normalize_whitespace: bool,
    pub manhwa_mode: bool,
    pub regex_corrections: bool,
    pub dictionary_correction: bool,
    pub dictionary: DictionaryOptions,
    pub user_rules: bool,
    pub reconstruction: bool,
    pub reconstruct: ReconstructOptions,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            noise_cleaning: true,
            noise_aggression: Aggression::default(),
            normalize_whitespace: true,
            manhwa_mode: false,
            regex_corrections: true,
            dictionary_correction: false,
            dictionary: DictionaryOptions::default(),
            user_rules: true,
            reconstruction: true,
            reconstruct: ReconstructOptions::default(),
        }
    }
}

/// Cleaned text plus the recoverable problems met on the way
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextOutput {
    pub text: String,
    pub warnings: Vec<String>,
}

/// One step of the text pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStage {
    Noise,
    Normalize,
    Manhwa,
    Corrections,
    Dictionary,
    User,
    Reconstruct,
}

impl TextStage {
    pub fn name(self) -> &'static str {
        match self {
            TextStage::Noise => stages::noise::NAME,
            TextStage::Normalize => stages::normalize::NAME,
            TextStage::Manhwa => stages::manhwa::NAME,
            TextStage::Corrections => stages::corrections::NAME,
            TextStage::Dictionary => stages::dictionary::NAME,
            TextStage::User => stages::user::NAME,
            TextStage::Reconstruct => stages::reconstruct::NAME,
        }
    }
}

/// Fixed-order text cleanup:
/// noise, normalize, manhwa, regex, dictionary, user rules, reconstruct.
/// Disabled stages are not run at all.
#[derive(Debug, Clone)]
pub struct TextPipeline {
    options: TextOptions,
    stages: Vec<TextStage>,
    vocabulary: Option<Arc<Vocabulary>>,
}

impl Default for TextPipeline {
    fn default() -> Self {
        Self::new(TextOptions::default())
    }
}

impl TextPipeline {
    pub fn new(options: TextOptions) -> Self {
        let stages = [
            (options.noise_cleaning, TextStage::Noise),
            (options.normalize_whitespace, TextStage::Normalize),
            (options.manhwa_mode, TextStage::Manhwa),
            (options.regex_corrections, TextStage::Corrections),
            (options.dictionary_correction, TextStage::Dictionary),
            (options.user_rules, TextStage::User),
            (options.reconstruction, TextStage::Reconstruct),
        ]
        .into_iter()
        .filter_map(|(enabled, stage)| enabled.then_some(stage))
        .collect();

        Self {
            options,
            stages,
            vocabulary: None,
        }
    }

    /// Vocabulary used by dictionary correction
    pub fn with_vocabulary(mut self, vocabulary: Arc<Vocabulary>) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    pub fn options(&self) -> &TextOptions {
        &self.options
    }

    /// Stages this pipeline will run, in order
    pub fn stages(&self) -> &[TextStage] {
        &self.stages
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Clean `text` with the given rules. Empty input comes back unchanged.
    pub fn process(&self, text: &str, rules: &RuleSet) -> TextOutput {
        let mut output = TextOutput {
            text: text.to_string(),
            warnings: Vec::new(),
        };
        if text.is_empty() {
            return output;
        }

        let start = Instant::now();
        for &stage in &self.stages {
            let stage_start = Instant::now();
            output.text = self.run_stage(stage, &output.text, rules, &mut output.warnings);
            tracing::debug!(
                "Text stage '{}' done in {}us ({} chars)",
                stage.name(),
                stage_start.elapsed().as_micros(),
                output.text.chars().count()
            );
        }
        tracing::debug!("Text pipeline done in {}ms", start.elapsed().as_millis());

        output
    }

    fn run_stage(
        &self,
        stage: TextStage,
        text: &str,
        rules: &RuleSet,
        warnings: &mut Vec<String>,
    ) -> String {
        let o = &self.options;
        match stage {
            TextStage::Noise => stages::noise::apply(text, o.noise_aggression),
            TextStage::Normalize => stages::normalize::apply(text),
            TextStage::Manhwa => stages::manhwa::apply(text),
            TextStage::Corrections => stages::corrections::apply(text),
            TextStage::Dictionary => match &self.vocabulary {
                Some(vocabulary) => stages::dictionary::apply(text, vocabulary, &o.dictionary),
                None => {
                    let err = OcrError::DictionaryNotLoaded(o.dictionary.language.clone());
                    tracing::warn!("Skipping dictionary correction: {}", err);
                    warnings.push(err.to_string());
                    text.to_string()
                }
            },
            TextStage::User => stages::user::apply(text, rules, warnings),
            TextStage::Reconstruct => stages::reconstruct::apply(text, &o.reconstruct),
        }
    }
}
