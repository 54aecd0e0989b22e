use crate::bitmap::{Bitmap, ImageInput};
use crate::error::OcrError;
use image::Rgba;
use serde::{Deserialize, Serialize};

pub const NAME: &str = "morphology";

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MorphologyOp {
    /// Erode then dilate: removes specks smaller than the kernel
    #[default]
    Open,
    /// Dilate then erode: closes gaps inside strokes
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphologyOptions {
    #[serde(rename = "type")]
    pub operation: MorphologyOp,
    /// Kernel radius; the window is `(2k + 1) x (2k + 1)`
    pub kernel_size: u32,
}

impl Default for MorphologyOptions {
    fn default() -> Self {
        Self {
            operation: MorphologyOp::Open,
            kernel_size: 1,
        }
    }
}

/// Binary morphology on a thresholded image.
/// Black is foreground (ink), white is background.
pub fn apply(input: ImageInput, options: &MorphologyOptions) -> Result<ImageInput, OcrError> {
    let bitmap = input.into_bitmap(NAME)?;
    let size = options.kernel_size;

    let result = match options.operation {
        MorphologyOp::Open => dilate(&erode(&bitmap, size), size),
        MorphologyOp::Close => erode(&dilate(&bitmap, size), size),
    };

    Ok(ImageInput::Bitmap(result))
}

/// Shrink black regions.
/// A pixel stays black only if every pixel in its window is black (red <= 128).
/// Pixels outside the image count as white, so foreground touching the border erodes away.
pub fn erode(img: &Bitmap, size: u32) -> Bitmap {
    let (width, height) = img.dimensions();
    let size = size as i64;

    Bitmap::from_fn(width, height, |x, y| {
        let (x, y) = (x as i64, y as i64);
        for ny in y - size..=y + size {
            for nx in x - size..=x + size {
                if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                    return WHITE;
                }
                if img.get_pixel(nx as u32, ny as u32).0[0] > 128 {
                    return WHITE;
                }
            }
        }
        BLACK
    })
}

/// Grow black regions.
/// A pixel becomes black if any in-bounds pixel in its window is black (red < 128).
pub fn dilate(img: &Bitmap, size: u32) -> Bitmap {
    let (width, height) = img.dimensions();
    let size = size as i64;

    Bitmap::from_fn(width, height, |x, y| {
        let (x, y) = (x as i64, y as i64);
        let y_range = (y - size).max(0)..=(y + size).min(height as i64 - 1);
        for ny in y_range {
            for nx in (x - size).max(0)..=(x + size).min(width as i64 - 1) {
                if img.get_pixel(nx as u32, ny as u32).0[0] < 128 {
                    return BLACK;
                }
            }
        }
        WHITE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(width: u32, height: u32, black: impl Fn(u32, u32) -> bool) -> Bitmap {
        Bitmap::from_fn(width, height, |x, y| if black(x, y) { BLACK } else { WHITE })
    }

    fn is_black(img: &Bitmap, x: u32, y: u32) -> bool {
        img.get_pixel(x, y).0[0] == 0
    }

    #[test]
    fn test_open_removes_isolated_speck() {
        let img = binary(10, 10, |x, y| (x, y) == (5, 5));

        let result = apply(ImageInput::Bitmap(img), &MorphologyOptions::default()).unwrap();
        assert!(result.as_bitmap().unwrap().pixels().all(|p| p.0 == WHITE.0));
    }

    #[test]
    fn test_open_keeps_solid_block() {
        let img = binary(12, 12, |x, y| (3..9).contains(&x) && (3..9).contains(&y));

        let result = apply(ImageInput::Bitmap(img.clone()), &MorphologyOptions::default()).unwrap();
        assert_eq!(result.as_bitmap().unwrap(), &img);
    }

    #[test]
    fn test_erode_clears_border_foreground() {
        let img = binary(6, 6, |_, _| true);
        let eroded = erode(&img, 1);

        assert!(!is_black(&eroded, 0, 0));
        assert!(!is_black(&eroded, 5, 3));
        assert!(is_black(&eroded, 1, 1));
        assert!(is_black(&eroded, 4, 4));
    }

    #[test]
    fn test_erode_never_creates_foreground() {
        let img = binary(9, 7, |x, y| (x * 7 + y * 3) % 5 < 3);
        let eroded = erode(&img, 1);

        for y in 0..7 {
            for x in 0..9 {
                if is_black(&eroded, x, y) {
                    assert!(is_black(&img, x, y), "({}, {}) became foreground", x, y);
                }
            }
        }
    }

    #[test]
    fn test_dilate_grows_by_kernel() {
        let img = binary(7, 7, |x, y| (x, y) == (3, 3));
        let dilated = dilate(&img, 1);

        assert!(is_black(&dilated, 2, 2));
        assert!(is_black(&dilated, 4, 4));
        assert!(!is_black(&dilated, 1, 3));
    }

    #[test]
    fn test_close_fills_single_pixel_gap() {
        let img = binary(9, 9, |x, y| (2..7).contains(&x) && (2..7).contains(&y) && (x, y) != (4, 4));
        let options = MorphologyOptions {
            operation: MorphologyOp::Close,
            kernel_size: 1,
        };

        let result = apply(ImageInput::Bitmap(img), &options).unwrap();
        assert!(is_black(result.as_bitmap().unwrap(), 4, 4));
    }
}
