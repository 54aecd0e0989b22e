//! Individual preprocessing steps
//!
//! Every step takes an [`ImageInput`](crate::bitmap::ImageInput), normalizes it
//! to a bitmap (resize excepted) and returns a new image.

pub mod blur;
pub mod contrast;
pub mod grayscale;
pub mod morphology;
pub mod region;
pub mod resize;
pub mod threshold;
