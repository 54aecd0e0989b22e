//! Image preprocessing module for OCR enhancement
//!
//! Provides configurable preprocessing pipelines that condition a cropped
//! screenshot before it is handed to the OCR engine.

pub mod pipeline;
pub mod steps;

pub use pipeline::{
    ImageOptions, Pipeline, PipelineStep, PreprocessingResult, Stage, StageFn, StageObserver,
    StepTiming,
};
