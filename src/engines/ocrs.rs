//! OCRS engine implementation
//!
//! Pure Rust OCR engine using the ocrs library. No system dependencies required.
//! Downloads neural network models automatically on first use.

use super::{confidence, download};
use crate::bitmap::Bitmap;
use crate::config::Config;
use crate::engine::{OcrEngine, OcrResult, PageSegMode, RecognizeParams};
use crate::error::OcrError;
use image::buffer::ConvertBuffer;
use image::RgbImage;
use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsOcrEngine, OcrEngineParams};
use rten::Model;

/// Default model URLs from the ocrs project
const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

/// OCR Engine wrapping the ocrs library
pub struct OcrsEngine {
    engine: OcrsOcrEngine,
}

impl OcrsEngine {
    /// Create the engine, downloading models if needed
    pub fn new(_config: &Config) -> Result<Self, OcrError> {
        let models = download::cache_dir(None)?;
        let detection_model_path =
            download::ensure_cached(DETECTION_MODEL_URL, &models, "text-detection.rten")?;
        let recognition_model_path =
            download::ensure_cached(RECOGNITION_MODEL_URL, &models, "text-recognition.rten")?;

        let detection_model = Model::load_file(&detection_model_path).map_err(|e| {
            OcrError::InitializationError(format!("Failed to load detection model: {}", e))
        })?;
        let recognition_model = Model::load_file(&recognition_model_path).map_err(|e| {
            OcrError::InitializationError(format!("Failed to load recognition model: {}", e))
        })?;

        let engine = OcrsOcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(|e| {
            OcrError::InitializationError(format!("Failed to create OCR engine: {}", e))
        })?;

        tracing::info!("ocrs engine initialized successfully");
        Ok(Self { engine })
    }

    fn read_lines(&self, rgb: &RgbImage) -> Result<Vec<String>, OcrError> {
        // ImageSource::from_bytes expects packed HWC RGB
        let source = ImageSource::from_bytes(rgb.as_raw(), rgb.dimensions()).map_err(|e| {
            OcrError::ProcessingError(format!("Failed to create image source: {}", e))
        })?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to prepare input: {}", e)))?;

        let word_rects = self
            .engine
            .detect_words(&input)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to detect words: {}", e)))?;
        let line_rects = self.engine.find_text_lines(&input, &word_rects);

        let lines = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to recognize text: {}", e)))?;

        Ok(lines
            .iter()
            .flatten()
            .map(|line| {
                line.words()
                    .map(|word| word.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect())
    }
}

impl OcrEngine for OcrsEngine {
    fn name(&self) -> &'static str {
        "ocrs"
    }

    fn description(&self) -> &'static str {
        "Pure Rust OCR engine - fast, no system dependencies required"
    }

    fn recognize(&self, image: &Bitmap, params: &RecognizeParams) -> Result<OcrResult, OcrError> {
        let mut warnings = Vec::new();

        if !self.supported_languages().contains(&params.language) {
            warnings.push(format!(
                "ocrs only reads Latin script, ignoring language '{}'",
                params.language
            ));
        }
        if !params.char_whitelist.is_empty() {
            warnings.push("ocrs does not support a character whitelist".to_string());
        }

        let rgb: RgbImage = image.convert();
        let lines = self.read_lines(&rgb)?;

        // ocrs has no segmentation modes; single-line modes just fold the lines
        let separator = match params.page_segmentation_mode {
            PageSegMode::SingleLine | PageSegMode::RawLine | PageSegMode::SingleWord => " ",
            _ => "\n",
        };
        let text = lines.join(separator);

        tracing::debug!(
            "ocrs recognized {} lines from {}x{} image",
            lines.len(),
            image.width(),
            image.height()
        );

        Ok(OcrResult {
            confidence: confidence::estimate(&text),
            text,
            warnings,
        })
    }

    fn supported_languages(&self) -> Vec<String> {
        // ocrs currently only supports English/Latin alphabet
        vec!["eng".to_string()]
    }
}
