use crate::bitmap::ImageInput;
use crate::error::OcrError;

pub const NAME: &str = "grayscale";

/// Convert image to grayscale
/// Writes perceptual luminance to R, G and B; alpha is left as is
pub fn apply(input: ImageInput) -> Result<ImageInput, OcrError> {
    let mut bitmap = input.into_bitmap(NAME)?;

    for pixel in bitmap.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let lum = luminance(r, g, b);
        pixel.0[0] = lum;
        pixel.0[1] = lum;
        pixel.0[2] = lum;
    }

    Ok(ImageInput::Bitmap(bitmap))
}

/// Perceptual luminance: 0.299R + 0.587G + 0.114B
pub(crate) fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let lum = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    lum.round().clamp(0.0, 255.0) as u8
}
