//! Text postprocessing for raw OCR output
//!
//! A fixed-order pipeline of string stages that strips recognition noise,
//! repairs spacing and applies dictionary and user corrections.

pub mod pipeline;
pub mod stages;

pub use pipeline::{TextOptions, TextOutput, TextPipeline, TextStage};
pub use stages::dictionary::DictionaryOptions;
pub use stages::noise::Aggression;
pub use stages::reconstruct::ReconstructOptions;
pub use stages::transforms::Transform;
