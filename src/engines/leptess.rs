//! Leptess/Tesseract engine implementation
//!
//! Tesseract-based OCR engine with page segmentation modes and many languages.
//! Uses tesseract-static crate for static linking (no system dependencies).
//! Downloads tessdata (training data) per language on first use.

use super::download;
use crate::bitmap::Bitmap;
use crate::config::Config;
use crate::engine::{OcrEngine, OcrResult, RecognizeParams};
use crate::error::OcrError;
use std::path::{Path, PathBuf};
use tesseract_static::tesseract::Tesseract;

/// Tesseract OCR Engine
pub struct LeptessEngine {
    /// Directory holding `<lang>.traineddata` files
    tessdata_dir: PathBuf,
    /// Whether missing languages may be downloaded into `tessdata_dir`
    download_missing: bool,
}

impl LeptessEngine {
    /// Create a new Tesseract-based OCR engine
    pub fn new(config: &Config) -> Result<Self, OcrError> {
        let (tessdata_dir, download_missing) = match &config.tessdata_path {
            Some(path) => (path.clone(), false),
            None => (download::cache_dir(Some("tessdata"))?, true),
        };
        let engine = Self {
            tessdata_dir,
            download_missing,
        };

        // Validate the default language by doing a test initialization
        let test_tess = engine.tesseract(&config.default_language)?;
        drop(test_tess);

        tracing::info!(
            "Leptess engine initialized (tessdata: {:?}, language: {})",
            engine.tessdata_dir,
            config.default_language
        );
        Ok(engine)
    }

    fn tesseract(&self, language: &str) -> Result<Tesseract, OcrError> {
        self.ensure_language(language)?;
        let datapath = path_str(&self.tessdata_dir)?;
        Tesseract::new(Some(datapath), Some(language)).map_err(|e| {
            OcrError::InitializationError(format!(
                "Failed to initialize Tesseract for '{}': {}",
                language, e
            ))
        })
    }

    /// Make sure training data exists for every `+`-joined language
    fn ensure_language(&self, language: &str) -> Result<(), OcrError> {
        for lang in language.split('+').filter(|l| !l.is_empty()) {
            let filename = format!("{}.traineddata", lang);
            if self.tessdata_dir.join(&filename).exists() {
                continue;
            }
            if !self.download_missing {
                return Err(OcrError::InitializationError(format!(
                    "No {} in {:?}",
                    filename, self.tessdata_dir
                )));
            }
            download::ensure_cached(&tessdata_url(lang), &self.tessdata_dir, &filename)?;
        }
        Ok(())
    }
}

impl OcrEngine for LeptessEngine {
    fn name(&self) -> &'static str {
        "leptess"
    }

    fn description(&self) -> &'static str {
        "Tesseract OCR engine - page segmentation modes and many languages"
    }

    fn recognize(&self, image: &Bitmap, params: &RecognizeParams) -> Result<OcrResult, OcrError> {
        let (width, height) = image.dimensions();

        // Convert to BMP in memory (BMP is always supported by leptonica)
        let rgb = image::DynamicImage::ImageRgba8(image.clone()).into_rgb8();
        let mut bmp_data = Vec::new();
        rgb.write_to(&mut std::io::Cursor::new(&mut bmp_data), image::ImageFormat::Bmp)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to convert to BMP: {}", e)))?;

        tracing::debug!(
            "Tesseract input {}x{}, psm {}, lang {}",
            width,
            height,
            params.page_segmentation_mode,
            params.language
        );

        let mut tess = self
            .tesseract(&params.language)?
            .set_variable(
                "tessedit_pageseg_mode",
                &params.page_segmentation_mode.code().to_string(),
            )
            .map_err(|e| OcrError::ProcessingError(format!("Failed to set page mode: {}", e)))?;

        if !params.char_whitelist.is_empty() {
            tess = tess
                .set_variable("tessedit_char_whitelist", &params.char_whitelist)
                .map_err(|e| OcrError::ProcessingError(format!("Failed to set whitelist: {}", e)))?;
        }

        tess = tess.set_image_from_mem(&bmp_data).map_err(|e| {
            OcrError::ProcessingError(format!(
                "Failed to set image ({}x{}, {} bytes): {}",
                width,
                height,
                bmp_data.len(),
                e
            ))
        })?;

        tess = tess
            .recognize()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to recognize text: {}", e)))?;

        let text = tess
            .get_text()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to get text: {}", e)))?;

        // Tesseract reports 0-100
        let confidence = tess.mean_text_conf() as f32 / 100.0;

        Ok(OcrResult {
            text: text.trim().to_string(),
            confidence,
            warnings: Vec::new(),
        })
    }

    fn supported_languages(&self) -> Vec<String> {
        // Anything with a traineddata file on tessdata_fast works; these are the common ones
        ["eng", "deu", "fra", "spa", "ita", "por", "nld", "jpn", "chi_sim", "chi_tra", "kor", "ara", "rus"]
            .iter()
            .map(|lang| lang.to_string())
            .collect()
    }
}

fn path_str(path: &Path) -> Result<&str, OcrError> {
    path.to_str()
        .ok_or_else(|| OcrError::InitializationError(format!("Invalid tessdata path {:?}", path)))
}

/// tessdata_fast download URL for a language
fn tessdata_url(language: &str) -> String {
    format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tessdata_url() {
        assert_eq!(
            tessdata_url("kor"),
            "https://github.com/tesseract-ocr/tessdata_fast/raw/main/kor.traineddata"
        );
    }

    #[test]
    fn test_missing_language_without_download_fails() {
        let dir = tempfile::tempdir().unwrap();
        let engine = LeptessEngine {
            tessdata_dir: dir.path().to_path_buf(),
            download_missing: false,
        };
        assert!(matches!(
            engine.ensure_language("eng+kor"),
            Err(OcrError::InitializationError(_))
        ));
    }
}
