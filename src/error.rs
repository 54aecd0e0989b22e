use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Invalid input for {stage} stage: {reason}")]
    InvalidInput { stage: String, reason: String },

    #[error("Cannot read pixel data in {stage} stage: {reason}")]
    PixelAccess { stage: String, reason: String },

    #[error("Pipeline stage '{stage}' failed: {source}")]
    StageFailed {
        stage: String,
        #[source]
        source: Box<OcrError>,
    },

    #[error("Invalid replacement pattern \"{pattern}\": {reason}")]
    RuleCompile { pattern: String, reason: String },

    #[error("Dictionary not loaded for language '{0}'")]
    DictionaryNotLoaded(String),

    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[error("Failed to process image: {0}")]
    ProcessingError(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OcrError {
    pub fn invalid_input(stage: &str, reason: impl Into<String>) -> Self {
        OcrError::InvalidInput {
            stage: stage.to_string(),
            reason: reason.into(),
        }
    }

    pub fn pixel_access(stage: &str, reason: impl Into<String>) -> Self {
        OcrError::PixelAccess {
            stage: stage.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the pipeline stage the error was raised in, if known
    pub fn stage(&self) -> Option<&str> {
        match self {
            OcrError::InvalidInput { stage, .. }
            | OcrError::PixelAccess { stage, .. }
            | OcrError::StageFailed { stage, .. } => Some(stage),
            _ => None,
        }
    }

    /// Whether the error should abort a pipeline run rather than degrade to pass-through
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            OcrError::RuleCompile { .. } | OcrError::DictionaryNotLoaded(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_failed_keeps_stage_name() {
        let err = OcrError::StageFailed {
            stage: "blur".to_string(),
            source: Box::new(OcrError::pixel_access("blur", "surface is tainted")),
        };
        assert_eq!(err.stage(), Some("blur"));
        assert!(err.to_string().contains("'blur'"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_rule_errors_are_recoverable() {
        let err = OcrError::RuleCompile {
            pattern: "(".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert!(!err.is_fatal());
        assert_eq!(err.stage(), None);
    }
}
