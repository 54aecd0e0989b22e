//! Runtime configuration and settings profiles
//!
//! A [`Profile`] is the flat, persisted settings shape (`preprocess_*`,
//! `tess_*`, `clean_*` ...). It is resolved once into the explicit option
//! structs the pipelines take.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::engine::{PageSegMode, RecognizeParams};
use crate::error::OcrError;
use crate::postprocessing::{Aggression, DictionaryOptions, ReconstructOptions, TextOptions};
use crate::preprocessing::ImageOptions;
use crate::rules::{DeletionRule, ReplacementRule, RuleSet};

/// Engine runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub default_language: String,
    /// Directory with `<lang>.traineddata`; downloaded into the cache when unset
    pub tessdata_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_language: "eng".to_string(),
            tessdata_path: None,
        }
    }
}

/// How the orchestrator chooses recognition parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizeSettings {
    pub language: String,
    /// Segmentation mode used when `auto_psm` is off
    pub page_segmentation_mode: PageSegMode,
    /// Derive the segmentation mode from the capture's aspect ratio
    pub auto_psm: bool,
    pub char_whitelist: String,
}

impl Default for RecognizeSettings {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            page_segmentation_mode: PageSegMode::Auto,
            auto_psm: false,
            char_whitelist: String::new(),
        }
    }
}

impl RecognizeSettings {
    /// Parameters for a capture of the given size
    pub fn params_for(&self, width: u32, height: u32) -> RecognizeParams {
        let page_segmentation_mode = if self.auto_psm {
            crate::engine::optimal_psm(width, height)
        } else {
            self.page_segmentation_mode
        };
        RecognizeParams {
            language: self.language.clone(),
            page_segmentation_mode,
            char_whitelist: self.char_whitelist.clone(),
        }
    }
}

/// Persisted settings profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,

    pub preprocess_resize: bool,
    pub preprocess_grayscale: bool,
    pub preprocess_contrast: bool,
    pub preprocess_blur: bool,
    pub preprocess_threshold: bool,
    pub preprocess_morphology: bool,
    pub preprocess_borders: bool,

    /// Page segmentation mode as stored, e.g. `"3"`
    pub tess_psm: String,
    /// Engine mode; only the LSTM engine (`"1"`) is available through the adapters
    pub tess_oem: String,
    pub tess_lang: String,
    pub tess_whitelist: String,
    pub auto_psm: bool,

    pub clean_noise: bool,
    pub noise_aggression: Aggression,
    pub clean_normalize: bool,
    pub clean_regex: bool,
    pub clean_dict: bool,
    pub dict_strength: usize,
    pub dict_ignore_caps: bool,
    pub clean_user: bool,
    pub manhwa_mode: bool,

    pub reconstruct_text: bool,
    pub reconstruct_merge: bool,
    pub reconstruct_stabilize: bool,

    pub debug_mode: bool,

    pub user_replacements: Vec<ReplacementRule>,
    pub user_deletions: Vec<DeletionRule>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            preprocess_resize: true,
            preprocess_grayscale: true,
            preprocess_contrast: true,
            preprocess_blur: false,
            preprocess_threshold: false,
            preprocess_morphology: false,
            preprocess_borders: false,
            tess_psm: "3".to_string(),
            tess_oem: "1".to_string(),
            tess_lang: "eng".to_string(),
            tess_whitelist: String::new(),
            auto_psm: false,
            clean_noise: true,
            noise_aggression: Aggression::Medium,
            clean_normalize: true,
            clean_regex: true,
            clean_dict: false,
            dict_strength: 1,
            dict_ignore_caps: true,
            clean_user: true,
            manhwa_mode: false,
            reconstruct_text: true,
            reconstruct_merge: true,
            reconstruct_stabilize: true,
            debug_mode: false,
            user_replacements: Vec::new(),
            user_deletions: Vec::new(),
        }
    }
}

impl Profile {
    /// Preset for comic speech bubbles
    pub fn manhwa() -> Self {
        Self {
            name: "Manhwa Mode".to_string(),
            preprocess_threshold: false,
            clean_dict: false,
            manhwa_mode: true,
            ..Self::default()
        }
    }

    /// Built-in profile by id (`default` or `manhwa`)
    pub fn builtin(id: &str) -> Option<Self> {
        match id {
            "default" => Some(Self::default()),
            "manhwa" => Some(Self::manhwa()),
            _ => None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, OcrError> {
        serde_json::from_str(json).map_err(|e| OcrError::Config(format!("invalid profile: {}", e)))
    }

    pub fn image_options(&self) -> ImageOptions {
        ImageOptions {
            resize: self.preprocess_resize,
            grayscale: self.preprocess_grayscale,
            contrast: self.preprocess_contrast,
            median_blur: self.preprocess_blur,
            adaptive_threshold: self.preprocess_threshold,
            morphology: self.preprocess_morphology,
            remove_borders: self.preprocess_borders,
            ..ImageOptions::default()
        }
    }

    pub fn text_options(&self) -> TextOptions {
        TextOptions {
            noise_cleaning: self.clean_noise,
            noise_aggression: self.noise_aggression,
            normalize_whitespace: self.clean_normalize,
            manhwa_mode: self.manhwa_mode,
            regex_corrections: self.clean_regex,
            dictionary_correction: self.clean_dict,
            dictionary: DictionaryOptions {
                max_distance: self.dict_strength,
                ignore_all_caps: self.dict_ignore_caps,
                language: self.tess_lang.clone(),
            },
            user_rules: self.clean_user,
            reconstruction: self.reconstruct_text,
            reconstruct: ReconstructOptions {
                merge_lines: self.reconstruct_merge,
                stabilize_sentences: self.reconstruct_stabilize,
            },
        }
    }

    /// Recognition settings; an unparsable `tess_psm` is a configuration error
    pub fn recognize_settings(&self) -> Result<RecognizeSettings, OcrError> {
        let page_segmentation_mode = self
            .tess_psm
            .parse::<PageSegMode>()
            .map_err(OcrError::Config)?;
        if self.tess_oem != "1" {
            tracing::warn!("Ignoring tess_oem '{}', only the LSTM engine is used", self.tess_oem);
        }
        Ok(RecognizeSettings {
            language: self.tess_lang.clone(),
            page_segmentation_mode,
            auto_psm: self.auto_psm,
            char_whitelist: self.tess_whitelist.clone(),
        })
    }

    /// Rules stored on the profile itself
    pub fn rules(&self) -> RuleSet {
        RuleSet {
            replacements: self.user_replacements.clone(),
            deletions: self.user_deletions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_maps_to_options() {
        let profile = Profile::default();
        let image = profile.image_options();
        assert!(image.resize && image.grayscale && image.contrast);
        assert!(!image.median_blur && !image.adaptive_threshold && !image.remove_borders);

        let text = profile.text_options();
        assert!(text.noise_cleaning && text.reconstruction && !text.dictionary_correction);
        assert_eq!(text.dictionary.max_distance, 1);
    }

    #[test]
    fn test_manhwa_profile() {
        let profile = Profile::builtin("manhwa").unwrap();
        assert!(profile.text_options().manhwa_mode);
        assert!(!profile.text_options().dictionary_correction);
        assert!(Profile::builtin("custom_1").is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let profile = Profile::from_json(
            r#"{"noise_aggression": "high", "auto_psm": true, "user_deletions": ["|"]}"#,
        )
        .unwrap();
        assert_eq!(profile.noise_aggression, Aggression::High);
        assert!(profile.preprocess_resize);
        assert_eq!(profile.rules().deletions, vec![DeletionRule::new("|")]);
    }

    #[test]
    fn test_zero_dict_strength_still_corrects() {
        let profile = Profile::from_json(r#"{"clean_dict": true, "dict_strength": 0}"#).unwrap();
        let pipeline = crate::postprocessing::TextPipeline::new(profile.text_options())
            .with_vocabulary(std::sync::Arc::new(crate::dictionary::Vocabulary::from_words([
                "hello",
            ])));
        assert_eq!(pipeline.process("Helle", &RuleSet::default()).text, "Hello");
    }

    #[test]
    fn test_recognize_settings() {
        let settings = Profile::default().recognize_settings().unwrap();
        assert_eq!(settings.params_for(1000, 10).page_segmentation_mode, PageSegMode::Auto);

        let auto = RecognizeSettings {
            auto_psm: true,
            ..settings
        };
        assert_eq!(auto.params_for(1000, 10).page_segmentation_mode, PageSegMode::SingleLine);
        assert_eq!(auto.params_for(10, 100).page_segmentation_mode, PageSegMode::SingleBlockVertText);

        let broken = Profile {
            tess_psm: "auto".to_string(),
            ..Profile::default()
        };
        assert!(matches!(broken.recognize_settings(), Err(OcrError::Config(_))));
    }
}
