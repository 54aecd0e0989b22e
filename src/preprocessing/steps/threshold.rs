use crate::bitmap::{Bitmap, ImageInput};
use crate::error::OcrError;
use image::Rgba;
use serde::{Deserialize, Serialize};

pub const NAME: &str = "threshold";

const FOREGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);
const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Adaptive mean threshold parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdOptions {
    /// Side of the square neighborhood used for the local mean
    pub block_size: u32,
    /// Offset subtracted from the local mean
    pub constant: f64,
}

impl Default for ThresholdOptions {
    fn default() -> Self {
        Self {
            block_size: 15,
            constant: 10.0,
        }
    }
}

/// Apply adaptive mean thresholding
/// Dark strokes on uneven backgrounds survive where a global threshold would fail.
/// Reads the red channel, so run grayscale first for color input.
pub fn apply(input: ImageInput, options: &ThresholdOptions) -> Result<ImageInput, OcrError> {
    let bitmap = input.into_bitmap(NAME)?;
    Ok(ImageInput::Bitmap(mean_threshold(&bitmap, options)))
}

/// A pixel is foreground (black) when `value < local_mean - constant`,
/// otherwise background (white). The window is clipped at image edges and
/// the mean divides by the clipped pixel count.
fn mean_threshold(img: &Bitmap, options: &ThresholdOptions) -> Bitmap {
    let (width, height) = img.dimensions();
    let half_block = (options.block_size / 2) as i64;

    let integral = compute_integral_image(img);

    Bitmap::from_fn(width, height, |x, y| {
        let x1 = (x as i64 - half_block).max(0) as u32;
        let y1 = (y as i64 - half_block).max(0) as u32;
        let x2 = (x as i64 + half_block).min(width as i64 - 1) as u32;
        let y2 = (y as i64 + half_block).min(height as i64 - 1) as u32;

        let mean = window_mean(&integral, width, x1, y1, x2, y2);

        let pixel = img.get_pixel(x, y).0[0] as f64;
        if pixel < mean - options.constant {
            FOREGROUND
        } else {
            BACKGROUND
        }
    })
}

/// Summed-area table over the red channel, padded with a zero row and column.
/// Entry `(x, y)` lives at `y * (width + 1) + x`.
fn compute_integral_image(img: &Bitmap) -> Vec<u64> {
    let (width, height) = img.dimensions();
    let stride = width as usize + 1;
    let mut integral = vec![0u64; stride * (height as usize + 1)];

    for y in 0..height as usize {
        for x in 0..width as usize {
            let val = img.get_pixel(x as u32, y as u32).0[0] as u64;
            integral[(y + 1) * stride + x + 1] =
                val + integral[y * stride + x + 1] + integral[(y + 1) * stride + x]
                    - integral[y * stride + x];
        }
    }

    integral
}

/// Mean over the inclusive window `[x1, x2] x [y1, y2]`
fn window_mean(integral: &[u64], width: u32, x1: u32, y1: u32, x2: u32, y2: u32) -> f64 {
    let stride = width as usize + 1;
    let (x1, y1, x2, y2) = (x1 as usize, y1 as usize, x2 as usize + 1, y2 as usize + 1);
    let area = ((x2 - x1) * (y2 - y1)) as f64;

    let sum = integral[y2 * stride + x2] + integral[y1 * stride + x1]
        - integral[y1 * stride + x2]
        - integral[y2 * stride + x1];

    sum as f64 / area
}
