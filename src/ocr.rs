//! OCR orchestration: capture in, cleaned text out
//!
//! Conditions the capture with the image pipeline, hands the result to an
//! [`OcrEngine`], then cleans the recognized text. The raw recognition text is
//! kept alongside the cleaned text.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::bitmap::ImageInput;
use crate::config::{Profile, RecognizeSettings};
use crate::dictionary::Vocabulary;
use crate::engine::{OcrEngine, PageSegMode};
use crate::error::OcrError;
use crate::postprocessing::TextPipeline;
use crate::preprocessing::{Pipeline, StageObserver, StepTiming};
use crate::rules::RuleSet;

/// Result of one capture-to-text run
#[derive(Debug, Clone, Serialize)]
pub struct OcrOutput {
    /// Cleaned text
    pub text: String,
    /// Trimmed text as the engine returned it
    pub original_text: String,
    pub confidence: f32,
    pub warnings: Vec<String>,
    pub engine: String,
    pub psm: PageSegMode,
    pub processing_time_ms: u64,
    pub steps: Vec<StepTiming>,
}

/// Image pipeline, engine and text pipeline wired together
pub struct OcrProcessor {
    engine: Arc<dyn OcrEngine>,
    image_pipeline: Pipeline,
    text_pipeline: TextPipeline,
    settings: RecognizeSettings,
}

impl OcrProcessor {
    pub fn new(
        engine: Arc<dyn OcrEngine>,
        image_pipeline: Pipeline,
        text_pipeline: TextPipeline,
        settings: RecognizeSettings,
    ) -> Self {
        Self {
            engine,
            image_pipeline,
            text_pipeline,
            settings,
        }
    }

    /// Build everything from a settings profile
    pub fn from_profile(
        engine: Arc<dyn OcrEngine>,
        profile: &Profile,
        vocabulary: Option<Arc<Vocabulary>>,
    ) -> Result<Self, OcrError> {
        let mut text_pipeline = TextPipeline::new(profile.text_options());
        if let Some(vocabulary) = vocabulary {
            text_pipeline = text_pipeline.with_vocabulary(vocabulary);
        }

        Ok(Self::new(
            engine,
            Pipeline::from_options(&profile.image_options()),
            text_pipeline,
            profile.recognize_settings()?,
        ))
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Recognize and clean the text in `capture` using `rules`
    pub fn perform(&self, capture: ImageInput, rules: &RuleSet) -> Result<OcrOutput, OcrError> {
        self.execute(capture, rules, None)
    }

    /// Like [`perform`](Self::perform), reporting each preprocessing stage to `observer`
    pub fn perform_with_observer(
        &self,
        capture: ImageInput,
        rules: &RuleSet,
        observer: &mut dyn StageObserver,
    ) -> Result<OcrOutput, OcrError> {
        self.execute(capture, rules, Some(observer))
    }

    fn execute(
        &self,
        capture: ImageInput,
        rules: &RuleSet,
        observer: Option<&mut dyn StageObserver>,
    ) -> Result<OcrOutput, OcrError> {
        let start = Instant::now();

        let capture = capture.into_bitmap("capture")?;
        // Segmentation follows the capture's shape, not the upscaled image
        let params = self.settings.params_for(capture.width(), capture.height());

        let preprocessed = match observer {
            Some(observer) => self
                .image_pipeline
                .run_with_observer(ImageInput::Bitmap(capture), observer)?,
            None => self.image_pipeline.run(ImageInput::Bitmap(capture))?,
        };
        let steps = preprocessed.steps.clone();
        let conditioned = preprocessed.into_bitmap()?;

        let recognized = self.engine.recognize(&conditioned, &params)?;
        let original_text = recognized.text.trim().to_string();

        let cleaned = self.text_pipeline.process(&original_text, rules);

        let mut warnings = recognized.warnings;
        warnings.extend(cleaned.warnings);

        let processing_time_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "OCR completed in {}ms with {} (psm {}), confidence: {:.2}, text length: {}",
            processing_time_ms,
            self.engine.name(),
            params.page_segmentation_mode,
            recognized.confidence,
            cleaned.text.len()
        );

        Ok(OcrOutput {
            text: cleaned.text,
            original_text,
            confidence: recognized.confidence,
            warnings,
            engine: self.engine.name().to_string(),
            psm: params.page_segmentation_mode,
            processing_time_ms,
            steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::{Bitmap, Surface};
    use crate::engine::{OcrResult, RecognizeParams};
    use crate::rules::ReplacementRule;
    use image::RgbaImage;
    use std::sync::Mutex;

    /// Returns canned text and records what it was asked to read
    struct FakeEngine {
        text: &'static str,
        seen: Mutex<Vec<((u32, u32), PageSegMode)>>,
    }

    impl FakeEngine {
        fn new(text: &'static str) -> Arc<Self> {
            Arc::new(Self {
                text,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl OcrEngine for FakeEngine {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn description(&self) -> &'static str {
            "canned text"
        }

        fn recognize(&self, image: &Bitmap, params: &RecognizeParams) -> Result<OcrResult, OcrError> {
            self.seen
                .lock()
                .unwrap()
                .push((image.dimensions(), params.page_segmentation_mode));
            Ok(OcrResult {
                text: self.text.to_string(),
                confidence: 0.9,
                warnings: Vec::new(),
            })
        }

        fn supported_languages(&self) -> Vec<String> {
            vec!["eng".to_string()]
        }
    }

    #[test]
    fn test_perform_cleans_and_keeps_original() {
        let engine = FakeEngine::new("  | l am  here ,  ");
        let processor =
            OcrProcessor::from_profile(engine.clone(), &Profile::default(), None).unwrap();

        let output = processor
            .perform(RgbaImage::new(40, 20).into(), &RuleSet::default())
            .unwrap();

        assert_eq!(output.original_text, "| l am  here ,");
        assert_eq!(output.text, "I am here,");
        assert_eq!(output.engine, "fake");
        // Default profile doubles the capture before recognition
        assert_eq!(engine.seen.lock().unwrap()[0].0, (80, 40));
        assert_eq!(output.steps.len(), 3);
    }

    #[test]
    fn test_auto_psm_uses_capture_dimensions() {
        let engine = FakeEngine::new("hello");
        let profile = Profile {
            auto_psm: true,
            ..Profile::default()
        };
        let processor = OcrProcessor::from_profile(engine.clone(), &profile, None).unwrap();

        let output = processor
            .perform(RgbaImage::new(400, 100).into(), &RuleSet::default())
            .unwrap();
        assert_eq!(output.psm, PageSegMode::SingleLine);
        assert_eq!(engine.seen.lock().unwrap()[0].1, PageSegMode::SingleLine);
    }

    #[test]
    fn test_rules_and_warnings_flow_through() {
        let engine = FakeEngine::new("teh cat");
        let processor =
            OcrProcessor::from_profile(engine, &Profile::default(), None).unwrap();
        let rules = RuleSet {
            replacements: vec![
                ReplacementRule::literal("teh", "the"),
                ReplacementRule::regex("(", "x"),
            ],
            ..Default::default()
        };

        let output = processor.perform(RgbaImage::new(10, 10).into(), &rules).unwrap();
        assert_eq!(output.text, "the cat");
        assert_eq!(output.warnings.len(), 1);
    }

    #[test]
    fn test_tainted_capture_is_rejected() {
        let processor =
            OcrProcessor::from_profile(FakeEngine::new("x"), &Profile::default(), None).unwrap();
        let capture = ImageInput::Surface(Surface::tainted(RgbaImage::new(8, 8)));

        let err = processor.perform(capture, &RuleSet::default()).unwrap_err();
        assert!(matches!(err, OcrError::PixelAccess { ref stage, .. } if stage == "capture"));
    }

    #[test]
    fn test_observer_sees_preprocessing_stages() {
        let processor =
            OcrProcessor::from_profile(FakeEngine::new("x"), &Profile::default(), None).unwrap();
        let mut names = Vec::new();
        let mut observer = |name: &str, _: &ImageInput| names.push(name.to_string());

        processor
            .perform_with_observer(RgbaImage::new(6, 6).into(), &RuleSet::default(), &mut observer)
            .unwrap();
        assert_eq!(names, vec!["resize", "grayscale", "contrast"]);
    }
}
