use crate::bitmap::Bitmap;
use crate::error::OcrError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// OCR recognition result
#[derive(Debug, Clone)]
pub struct OcrResult {
    pub text: String,
    /// 0.0 to 1.0
    pub confidence: f32,
    pub warnings: Vec<String>,
}

/// Tesseract page segmentation modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PageSegMode {
    OsdOnly = 0,
    AutoOsd = 1,
    AutoOnly = 2,
    #[default]
    Auto = 3,
    SingleColumn = 4,
    SingleBlockVertText = 5,
    SingleBlock = 6,
    SingleLine = 7,
    SingleWord = 8,
    CircleWord = 9,
    SingleChar = 10,
    SparseText = 11,
    SparseTextOsd = 12,
    RawLine = 13,
}

impl PageSegMode {
    const ALL: [PageSegMode; 14] = [
        PageSegMode::OsdOnly,
        PageSegMode::AutoOsd,
        PageSegMode::AutoOnly,
        PageSegMode::Auto,
        PageSegMode::SingleColumn,
        PageSegMode::SingleBlockVertText,
        PageSegMode::SingleBlock,
        PageSegMode::SingleLine,
        PageSegMode::SingleWord,
        PageSegMode::CircleWord,
        PageSegMode::SingleChar,
        PageSegMode::SparseText,
        PageSegMode::SparseTextOsd,
        PageSegMode::RawLine,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }
}

impl TryFrom<u8> for PageSegMode {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("invalid page segmentation mode {}", code))
    }
}

impl From<PageSegMode> for u8 {
    fn from(mode: PageSegMode) -> u8 {
        mode.code()
    }
}

impl std::str::FromStr for PageSegMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u8 = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid page segmentation mode '{}'", s))?;
        Self::try_from(code)
    }
}

impl fmt::Display for PageSegMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Pick a segmentation mode from the capture's shape.
///
/// Wide strips (aspect > 3) are read as a single line, very tall strips
/// (aspect < 0.2) as vertical text, anything else as one uniform block.
pub fn optimal_psm(width: u32, height: u32) -> PageSegMode {
    if height == 0 {
        return PageSegMode::SingleLine;
    }
    let aspect_ratio = width as f64 / height as f64;
    if aspect_ratio > 3.0 {
        PageSegMode::SingleLine
    } else if aspect_ratio < 0.2 {
        PageSegMode::SingleBlockVertText
    } else {
        PageSegMode::SingleBlock
    }
}

/// Per-call recognition parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizeParams {
    pub language: String,
    pub page_segmentation_mode: PageSegMode,
    /// Restrict output to these characters; empty means no restriction
    pub char_whitelist: String,
}

impl Default for RecognizeParams {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            page_segmentation_mode: PageSegMode::default(),
            char_whitelist: String::new(),
        }
    }
}

/// Trait that all OCR engines must implement
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs", "leptess")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize the text in a conditioned bitmap
    fn recognize(&self, image: &Bitmap, params: &RecognizeParams) -> Result<OcrResult, OcrError>;

    /// Get supported languages
    fn supported_languages(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimal_psm_by_aspect_ratio() {
        assert_eq!(optimal_psm(400, 100), PageSegMode::SingleLine);
        assert_eq!(optimal_psm(300, 100), PageSegMode::SingleBlock);
        assert_eq!(optimal_psm(20, 200), PageSegMode::SingleBlockVertText);
        assert_eq!(optimal_psm(100, 100), PageSegMode::SingleBlock);
    }

    #[test]
    fn test_psm_codes_round_trip_through_strings() {
        assert_eq!("7".parse::<PageSegMode>(), Ok(PageSegMode::SingleLine));
        assert_eq!(PageSegMode::SingleBlockVertText.to_string(), "5");
        assert!("14".parse::<PageSegMode>().is_err());
        assert!("auto".parse::<PageSegMode>().is_err());
    }

    #[test]
    fn test_psm_serde_uses_codes() {
        let mode: PageSegMode = serde_json::from_str("6").unwrap();
        assert_eq!(mode, PageSegMode::SingleBlock);
        assert_eq!(serde_json::to_string(&PageSegMode::Auto).unwrap(), "3");
    }
}
