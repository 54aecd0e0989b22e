use crate::bitmap::ImageInput;
use crate::error::OcrError;
use serde::{Deserialize, Serialize};

pub const NAME: &str = "resize";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeOptions {
    pub scale: f32,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self { scale: 2.0 }
    }
}

/// Upscale the image for OCR
/// Small screenshot text is far below the glyph size recognizers are tuned for.
///
/// The image is drawn onto a scaled surface with Lanczos3 interpolation and read
/// back into a bitmap. When the surface cannot be read back (tainted source), the
/// surface itself is returned and later stages decide whether they can use it.
pub fn apply(input: ImageInput, options: &ResizeOptions) -> Result<ImageInput, OcrError> {
    if !options.scale.is_finite() || options.scale <= 0.0 {
        return Err(OcrError::invalid_input(
            NAME,
            format!("scale must be a positive number, got {}", options.scale),
        ));
    }

    let (width, height) = input.dimensions();
    let new_width = (width as f32 * options.scale).round() as u32;
    let new_height = (height as f32 * options.scale).round() as u32;
    if new_width == 0 || new_height == 0 {
        return Err(OcrError::invalid_input(
            NAME,
            format!(
                "{}x{} scaled by {} leaves no pixels",
                width, height, options.scale
            ),
        ));
    }

    let scaled = input.into_surface().draw_scaled(new_width, new_height);

    match scaled.read_pixels(NAME) {
        Ok(bitmap) => Ok(ImageInput::Bitmap(bitmap)),
        Err(e) => {
            tracing::warn!("Resize output is not readable, passing the surface on: {}", e);
            Ok(ImageInput::Surface(scaled))
        }
    }
}
