//! Pixel buffers handed between preprocessing stages
//!
//! A [`Bitmap`] is a row-major RGBA buffer with a top-left origin. Stages also
//! accept a [`Surface`], the drawable produced by rasterizing (scaling) an
//! image; a surface whose origin is not clean cannot be read back.

use crate::error::OcrError;
use image::{imageops::FilterType, DynamicImage, RgbaImage};

/// RGBA pixel buffer, 4 bytes per pixel, `len == width * height * 4`
pub type Bitmap = RgbaImage;

/// Build a bitmap from raw RGBA bytes, checking the buffer length
pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Bitmap, OcrError> {
    let expected = width as usize * height as usize * 4;
    if data.len() != expected {
        return Err(OcrError::invalid_input(
            "capture",
            format!(
                "buffer holds {} bytes, {}x{} RGBA needs {}",
                data.len(),
                width,
                height,
                expected
            ),
        ));
    }
    RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| OcrError::invalid_input("capture", "buffer does not match dimensions"))
}

/// Drawable rasterizer surface
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
    origin_clean: bool,
}

impl Surface {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels,
            origin_clean: true,
        }
    }

    /// Surface whose contents came from a source that forbids pixel readback
    pub fn tainted(pixels: RgbaImage) -> Self {
        Self {
            pixels,
            origin_clean: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn is_origin_clean(&self) -> bool {
        self.origin_clean
    }

    /// Draw this surface onto a new surface of the given size.
    /// Drawing a tainted surface taints the destination.
    pub fn draw_scaled(&self, width: u32, height: u32) -> Surface {
        let pixels = image::imageops::resize(&self.pixels, width, height, FilterType::Lanczos3);
        Surface {
            pixels,
            origin_clean: self.origin_clean,
        }
    }

    /// Read the pixel data back into a fresh bitmap
    pub fn read_pixels(&self, stage: &str) -> Result<Bitmap, OcrError> {
        if !self.origin_clean {
            return Err(OcrError::pixel_access(
                stage,
                "surface was drawn from a tainted source",
            ));
        }
        Ok(self.pixels.clone())
    }
}

/// Image value flowing through the preprocessing pipeline
#[derive(Debug, Clone)]
pub enum ImageInput {
    Bitmap(Bitmap),
    Surface(Surface),
}

impl ImageInput {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ImageInput::Bitmap(bitmap) => bitmap.dimensions(),
            ImageInput::Surface(surface) => (surface.width(), surface.height()),
        }
    }

    pub fn as_bitmap(&self) -> Option<&Bitmap> {
        match self {
            ImageInput::Bitmap(bitmap) => Some(bitmap),
            ImageInput::Surface(_) => None,
        }
    }

    /// Normalize to an owned bitmap at a stage boundary.
    ///
    /// Fails with `PixelAccess` for tainted surfaces and `InvalidInput` for
    /// images without any pixels.
    pub fn into_bitmap(self, stage: &str) -> Result<Bitmap, OcrError> {
        let bitmap = match self {
            ImageInput::Bitmap(bitmap) => bitmap,
            ImageInput::Surface(surface) => surface.read_pixels(stage)?,
        };
        if bitmap.width() == 0 || bitmap.height() == 0 {
            return Err(OcrError::invalid_input(
                stage,
                format!("image has no pixels ({}x{})", bitmap.width(), bitmap.height()),
            ));
        }
        Ok(bitmap)
    }

    /// Turn the value into a drawable surface (bitmaps are always clean)
    pub fn into_surface(self) -> Surface {
        match self {
            ImageInput::Bitmap(bitmap) => Surface::new(bitmap),
            ImageInput::Surface(surface) => surface,
        }
    }
}

impl From<Bitmap> for ImageInput {
    fn from(bitmap: Bitmap) -> Self {
        ImageInput::Bitmap(bitmap)
    }
}

impl From<Surface> for ImageInput {
    fn from(surface: Surface) -> Self {
        ImageInput::Surface(surface)
    }
}

impl From<DynamicImage> for ImageInput {
    fn from(image: DynamicImage) -> Self {
        ImageInput::Bitmap(image.into_rgba8())
    }
}
