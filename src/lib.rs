//! Screen-region OCR processing
//!
//! Conditions cropped screenshots for an OCR engine ([`preprocessing`]) and
//! repairs the recognized text ([`postprocessing`]). [`ocr::OcrProcessor`]
//! ties both to an [`engine::OcrEngine`].

pub mod bitmap;
pub mod config;
pub mod dictionary;
pub mod engine;
pub mod engines;
pub mod error;
pub mod levenshtein;
pub mod ocr;
pub mod postprocessing;
pub mod preprocessing;
pub mod rules;

pub use bitmap::{Bitmap, ImageInput, Surface};
pub use config::{Config, Profile, RecognizeSettings};
pub use dictionary::{DictionaryManager, Vocabulary};
pub use engine::{OcrEngine, OcrResult, PageSegMode, RecognizeParams};
pub use error::OcrError;
pub use ocr::{OcrOutput, OcrProcessor};
pub use postprocessing::{TextOptions, TextOutput, TextPipeline};
pub use preprocessing::{ImageOptions, Pipeline, PreprocessingResult};
pub use rules::{DeletionRule, ReplacementRule, RuleBook, RuleSet, Scope};
