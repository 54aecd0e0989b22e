use super::grayscale::luminance;
use crate::bitmap::ImageInput;
use crate::error::OcrError;
use serde::{Deserialize, Serialize};

pub const NAME: &str = "contrast";

/// Share of pixels ignored at each end of the histogram
const TRIM_FRACTION: f64 = 0.01;
/// Upper bounds below this are treated as an already near-white background
const BRIGHT_CUTOFF: usize = 200;
/// Floor for the upper bound when the image does reach bright values
const MIN_UPPER_BOUND: usize = 240;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContrastOptions {
    /// Strength from the stored profile. The stretch derives its range from
    /// the histogram, so this is carried for profile compatibility only.
    pub value: u8,
}

impl Default for ContrastOptions {
    fn default() -> Self {
        Self { value: 50 }
    }
}

/// Stretch contrast using the luminance histogram
/// Keeps whites white by clamping the upper bound high
pub fn apply(input: ImageInput, _options: &ContrastOptions) -> Result<ImageInput, OcrError> {
    let mut bitmap = input.into_bitmap(NAME)?;
    let total_pixels = bitmap.width() as usize * bitmap.height() as usize;

    let histogram = luminance_histogram(&bitmap);
    let (min_lum, max_lum) = stretch_bounds(&histogram, total_pixels);

    let range = max_lum as i32 - min_lum as i32;
    if range <= 0 {
        return Ok(ImageInput::Bitmap(bitmap));
    }

    let scale = 255.0 / range as f32;
    for pixel in bitmap.pixels_mut() {
        if pixel.0[3] == 0 {
            continue;
        }
        for channel in &mut pixel.0[..3] {
            let stretched = (*channel as f32 - min_lum as f32) * scale;
            *channel = stretched.round().clamp(0.0, 255.0) as u8;
        }
    }

    Ok(ImageInput::Bitmap(bitmap))
}

/// 256-bin luminance histogram, fully transparent pixels skipped
fn luminance_histogram(bitmap: &crate::bitmap::Bitmap) -> [usize; 256] {
    let mut histogram = [0usize; 256];
    for pixel in bitmap.pixels() {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            continue;
        }
        histogram[luminance(r, g, b) as usize] += 1;
    }
    histogram
}

/// Find (min, max) luminance after trimming 1% from each end
fn stretch_bounds(histogram: &[usize; 256], total_pixels: usize) -> (usize, usize) {
    let cutoff = total_pixels as f64 * TRIM_FRACTION;

    let mut min_lum = 0;
    let mut cdf = 0usize;
    for (lum, count) in histogram.iter().enumerate() {
        cdf += count;
        if cdf as f64 > cutoff {
            min_lum = lum;
            break;
        }
    }

    let mut max_lum = 255;
    cdf = 0;
    for (lum, count) in histogram.iter().enumerate().rev() {
        cdf += count;
        if cdf as f64 > cutoff {
            max_lum = lum;
            break;
        }
    }

    if max_lum < BRIGHT_CUTOFF {
        max_lum = 255;
    } else {
        max_lum = max_lum.max(MIN_UPPER_BOUND);
    }

    (min_lum, max_lum)
}
