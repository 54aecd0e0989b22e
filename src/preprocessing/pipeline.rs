use crate::bitmap::{Bitmap, ImageInput};
use crate::error::OcrError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::steps;
use super::steps::contrast::ContrastOptions;
use super::steps::morphology::MorphologyOptions;
use super::steps::resize::ResizeOptions;
use super::steps::threshold::ThresholdOptions;

/// Caller-supplied stage function
pub type StageFn = Arc<dyn Fn(ImageInput) -> Result<ImageInput, OcrError> + Send + Sync>;

/// A single image transformation with its parameters
#[derive(Clone)]
pub enum Stage {
    Resize(ResizeOptions),
    Grayscale,
    MedianBlur,
    Contrast(ContrastOptions),
    AdaptiveThreshold(ThresholdOptions),
    Morphology(MorphologyOptions),
    Region,
    Custom(StageFn),
}

impl Stage {
    /// Name used when the step is added without an explicit one
    pub fn default_name(&self) -> &'static str {
        match self {
            Stage::Resize(_) => steps::resize::NAME,
            Stage::Grayscale => steps::grayscale::NAME,
            Stage::MedianBlur => steps::blur::NAME,
            Stage::Contrast(_) => steps::contrast::NAME,
            Stage::AdaptiveThreshold(_) => steps::threshold::NAME,
            Stage::Morphology(_) => steps::morphology::NAME,
            Stage::Region => steps::region::NAME,
            Stage::Custom(_) => "custom",
        }
    }

    pub fn apply(&self, input: ImageInput) -> Result<ImageInput, OcrError> {
        match self {
            Stage::Resize(options) => steps::resize::apply(input, options),
            Stage::Grayscale => steps::grayscale::apply(input),
            Stage::MedianBlur => steps::blur::apply(input),
            Stage::Contrast(options) => steps::contrast::apply(input, options),
            Stage::AdaptiveThreshold(options) => steps::threshold::apply(input, options),
            Stage::Morphology(options) => steps::morphology::apply(input, options),
            Stage::Region => steps::region::apply(input),
            Stage::Custom(stage_fn) => stage_fn(input),
        }
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Resize(options) => f.debug_tuple("Resize").field(options).finish(),
            Stage::Contrast(options) => f.debug_tuple("Contrast").field(options).finish(),
            Stage::AdaptiveThreshold(options) => {
                f.debug_tuple("AdaptiveThreshold").field(options).finish()
            }
            Stage::Morphology(options) => f.debug_tuple("Morphology").field(options).finish(),
            Stage::Custom(_) => f.write_str("Custom(..)"),
            other => f.write_str(other.default_name()),
        }
    }
}

/// Named entry in a pipeline
#[derive(Debug, Clone)]
pub struct PipelineStep {
    pub name: String,
    pub stage: Stage,
}

/// Receives every intermediate image, e.g. for a visual debugger.
/// Observers only look; they cannot change what the next stage receives.
pub trait StageObserver {
    fn on_stage_complete(&mut self, name: &str, image: &ImageInput);
}

impl<F> StageObserver for F
where
    F: FnMut(&str, &ImageInput),
{
    fn on_stage_complete(&mut self, name: &str, image: &ImageInput) {
        self(name, image)
    }
}

/// Boolean toggles and parameters for the default pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageOptions {
    pub resize: bool,
    pub scale: f32,
    pub grayscale: bool,
    pub median_blur: bool,
    pub contrast: bool,
    pub contrast_value: u8,
    pub adaptive_threshold: bool,
    pub threshold: ThresholdOptions,
    pub morphology: bool,
    pub morphology_options: MorphologyOptions,
    pub remove_borders: bool,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            resize: true,
            scale: ResizeOptions::default().scale,
            grayscale: false,
            median_blur: false,
            contrast: false,
            contrast_value: ContrastOptions::default().value,
            adaptive_threshold: false,
            threshold: ThresholdOptions::default(),
            morphology: false,
            morphology_options: MorphologyOptions::default(),
            remove_borders: false,
        }
    }
}

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingResult {
    /// Preprocessed image (not serialized)
    #[serde(skip)]
    pub image: ImageInput,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

impl PreprocessingResult {
    /// Final image as a bitmap, reading back a surface if the last stage left one
    pub fn into_bitmap(self) -> Result<Bitmap, OcrError> {
        self.image.into_bitmap("output")
    }
}

/// Ordered sequence of image stages
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    steps: Vec<PipelineStep>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the default pipeline from toggles.
    ///
    /// Canonical order: resize, grayscale, blur, contrast, threshold, morphology, region.
    pub fn from_options(options: &ImageOptions) -> Self {
        let mut pipeline = Self::new();

        if options.resize {
            pipeline.push(Stage::Resize(ResizeOptions {
                scale: options.scale,
            }));
        }
        if options.grayscale {
            pipeline.push(Stage::Grayscale);
        }
        if options.median_blur {
            pipeline.push(Stage::MedianBlur);
        }
        if options.contrast {
            pipeline.push(Stage::Contrast(ContrastOptions {
                value: options.contrast_value,
            }));
        }
        if options.adaptive_threshold {
            pipeline.push(Stage::AdaptiveThreshold(options.threshold));
        }
        if options.morphology {
            pipeline.push(Stage::Morphology(options.morphology_options));
        }
        if options.remove_borders {
            pipeline.push(Stage::Region);
        }

        pipeline
    }

    /// Append a stage under its default name
    pub fn push(&mut self, stage: Stage) {
        let name = stage.default_name().to_string();
        self.steps.push(PipelineStep { name, stage });
    }

    /// Append a stage under an explicit name
    pub fn with_step(mut self, name: impl Into<String>, stage: Stage) -> Self {
        self.steps.push(PipelineStep {
            name: name.into(),
            stage,
        });
        self
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every stage in order
    pub fn run(&self, input: ImageInput) -> Result<PreprocessingResult, OcrError> {
        self.execute(input, None)
    }

    /// Run every stage in order, reporting each intermediate image to `observer`
    pub fn run_with_observer(
        &self,
        input: ImageInput,
        observer: &mut dyn StageObserver,
    ) -> Result<PreprocessingResult, OcrError> {
        self.execute(input, Some(observer))
    }

    fn execute(
        &self,
        input: ImageInput,
        mut observer: Option<&mut dyn StageObserver>,
    ) -> Result<PreprocessingResult, OcrError> {
        let start = Instant::now();
        let mut timings = Vec::with_capacity(self.steps.len());
        let mut current = input;

        for step in &self.steps {
            current = self.run_step(step, current, &mut timings)?;

            if let Some(observer) = observer.as_deref_mut() {
                observer.on_stage_complete(&step.name, &current);
            }
        }

        Ok(PreprocessingResult {
            image: current,
            total_time_ms: start.elapsed().as_millis() as u64,
            steps: timings,
        })
    }

    fn run_step(
        &self,
        step: &PipelineStep,
        img: ImageInput,
        timings: &mut Vec<StepTiming>,
    ) -> Result<ImageInput, OcrError> {
        let step_start = Instant::now();
        let result = step.stage.apply(img).map_err(|e| {
            tracing::error!("Pipeline stage '{}' failed: {}", step.name, e);
            OcrError::StageFailed {
                stage: step.name.clone(),
                source: Box::new(e),
            }
        })?;

        let time_ms = step_start.elapsed().as_millis() as u64;
        let (width, height) = result.dimensions();
        tracing::debug!("Stage '{}' done in {}ms ({}x{})", step.name, time_ms, width, height);

        timings.push(StepTiming {
            name: step.name.clone(),
            time_ms,
        });
        Ok(result)
    }
}
