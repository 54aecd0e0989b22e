use crate::bitmap::{Bitmap, ImageInput};
use crate::error::OcrError;
use image::{GrayImage, Luma, Rgba};
use imageproc::region_labelling::{connected_components, Connectivity};

pub const NAME: &str = "region";

/// Red values above this count as white (bubble / background)
const WHITE_THRESHOLD: u8 = 128;

const INSIDE: Luma<u8> = Luma([255]);
const OUTSIDE: Luma<u8> = Luma([0]);

/// Isolate the largest white region (the speech bubble) and blank everything else.
///
/// Ink fully enclosed by the kept region is recovered by filling holes: any
/// non-region component that does not touch the image border belongs to the bubble.
/// Returns the input unchanged when the image has no white pixels.
pub fn apply(input: ImageInput) -> Result<ImageInput, OcrError> {
    let bitmap = input.into_bitmap(NAME)?;

    let Some(mask) = largest_white_mask(&bitmap) else {
        tracing::warn!("No white region found, skipping region extraction");
        return Ok(ImageInput::Bitmap(bitmap));
    };
    let mask = fill_enclosed_holes(mask);

    let output = Bitmap::from_fn(bitmap.width(), bitmap.height(), |x, y| {
        if mask.get_pixel(x, y).0[0] == INSIDE.0[0] {
            let [r, g, b, _] = bitmap.get_pixel(x, y).0;
            Rgba([r, g, b, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });

    Ok(ImageInput::Bitmap(output))
}

/// Mask of the largest 4-connected white component, or `None` if there is no white
fn largest_white_mask(bitmap: &Bitmap) -> Option<GrayImage> {
    let white = GrayImage::from_fn(bitmap.width(), bitmap.height(), |x, y| {
        if bitmap.get_pixel(x, y).0[0] > WHITE_THRESHOLD {
            INSIDE
        } else {
            OUTSIDE
        }
    });

    let labels = connected_components(&white, Connectivity::Four, OUTSIDE);
    let largest = largest_label(&labels)?;

    Some(GrayImage::from_fn(white.width(), white.height(), |x, y| {
        if labels.get_pixel(x, y).0[0] == largest {
            INSIDE
        } else {
            OUTSIDE
        }
    }))
}

/// Label with the most pixels; ties go to the component met first in raster order
fn largest_label(labels: &image::ImageBuffer<Luma<u32>, Vec<u32>>) -> Option<u32> {
    // label -> (pixel count, first raster index)
    let mut stats: Vec<(usize, usize)> = Vec::new();
    for (index, pixel) in labels.pixels().enumerate() {
        let label = pixel.0[0] as usize;
        if label == 0 {
            continue;
        }
        if stats.len() < label {
            stats.resize(label, (0, usize::MAX));
        }
        let entry = &mut stats[label - 1];
        entry.0 += 1;
        entry.1 = entry.1.min(index);
    }

    stats
        .iter()
        .enumerate()
        .filter(|(_, (count, _))| *count > 0)
        .max_by(|(_, a), (_, b)| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
        .map(|(label, _)| label as u32 + 1)
}

/// Add every non-mask component that does not touch the border to the mask
fn fill_enclosed_holes(mut mask: GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    let holes = GrayImage::from_fn(width, height, |x, y| {
        if mask.get_pixel(x, y).0[0] == INSIDE.0[0] {
            OUTSIDE
        } else {
            INSIDE
        }
    });
    let labels = connected_components(&holes, Connectivity::Four, OUTSIDE);

    let max_label = labels.pixels().map(|p| p.0[0]).max().unwrap_or(0) as usize;
    let mut touches_border = vec![false; max_label + 1];
    for (x, y, pixel) in labels.enumerate_pixels() {
        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
            touches_border[pixel.0[0] as usize] = true;
        }
    }

    for (x, y, pixel) in labels.enumerate_pixels() {
        let label = pixel.0[0] as usize;
        if label != 0 && !touches_border[label] {
            mask.put_pixel(x, y, INSIDE);
        }
    }

    mask
}
