//! OCR engine implementations
//!
//! Adapters implementing [`OcrEngine`] for the recognition backends.
//! Engines are conditionally compiled based on feature flags.

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

#[cfg(feature = "engine-leptess")]
pub mod leptess;

#[cfg(feature = "engine-ocrs")]
mod confidence;

#[cfg(any(feature = "engine-ocrs", feature = "engine-leptess"))]
mod download;

use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::OcrError;
use std::sync::Arc;

/// Information about an available engine
#[derive(Debug, Clone)]
pub struct EngineInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub supported_languages: Vec<String>,
}

/// Registry of available OCR engines
pub struct EngineRegistry {
    engines: Vec<Arc<dyn OcrEngine>>,
    default_engine: String,
}

impl EngineRegistry {
    /// Create a new engine registry with all compiled-in engines initialized
    pub fn new(config: &Config) -> Result<Self, OcrError> {
        #[allow(unused_mut)]
        let mut engines: Vec<Arc<dyn OcrEngine>> = Vec::new();

        #[cfg(feature = "engine-ocrs")]
        {
            tracing::info!("Initializing ocrs engine...");
            engines.push(Arc::new(ocrs::OcrsEngine::new(config)?));
        }

        #[cfg(feature = "engine-leptess")]
        {
            tracing::info!("Initializing leptess engine...");
            engines.push(Arc::new(leptess::LeptessEngine::new(config)?));
        }

        #[cfg(not(any(feature = "engine-ocrs", feature = "engine-leptess")))]
        let _ = config;

        Self::from_engines(engines)
    }

    /// Registry over already constructed engines; the first one is the default
    pub fn from_engines(engines: Vec<Arc<dyn OcrEngine>>) -> Result<Self, OcrError> {
        let default_engine = match engines.first() {
            Some(engine) => engine.name().to_string(),
            None => {
                return Err(OcrError::InitializationError(
                    "No OCR engines available. Build with --features engine-ocrs or --features engine-leptess".to_string(),
                ))
            }
        };

        Ok(Self {
            engines,
            default_engine,
        })
    }

    /// Get an engine by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn OcrEngine>> {
        self.engines.iter().find(|e| e.name() == name).cloned()
    }

    /// Get the default engine
    pub fn default_engine(&self) -> Option<Arc<dyn OcrEngine>> {
        self.get(&self.default_engine)
    }

    /// Get the default engine name
    pub fn default_name(&self) -> &str {
        &self.default_engine
    }

    /// Engine by name, or the default when no name is given
    pub fn resolve(&self, name: Option<&str>) -> Result<Arc<dyn OcrEngine>, OcrError> {
        let wanted = name.unwrap_or(&self.default_engine);
        self.get(wanted).ok_or_else(|| {
            OcrError::Config(format!(
                "unknown engine '{}', available: {}",
                wanted,
                self.list().join(", ")
            ))
        })
    }

    /// List all available engine names
    pub fn list(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.name()).collect()
    }

    /// Get info about all available engines
    pub fn info(&self) -> Vec<EngineInfo> {
        self.engines
            .iter()
            .map(|e| EngineInfo {
                name: e.name(),
                description: e.description(),
                supported_languages: e.supported_languages(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Bitmap;
    use crate::engine::{OcrResult, RecognizeParams};

    struct Named(&'static str);

    impl OcrEngine for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn description(&self) -> &'static str {
            "test engine"
        }

        fn recognize(&self, _: &Bitmap, _: &RecognizeParams) -> Result<OcrResult, OcrError> {
            Ok(OcrResult {
                text: String::new(),
                confidence: 0.0,
                warnings: Vec::new(),
            })
        }

        fn supported_languages(&self) -> Vec<String> {
            vec!["eng".to_string()]
        }
    }

    #[test]
    fn test_first_engine_is_default() {
        let registry =
            EngineRegistry::from_engines(vec![Arc::new(Named("a")), Arc::new(Named("b"))]).unwrap();
        assert_eq!(registry.default_name(), "a");
        assert_eq!(registry.list(), vec!["a", "b"]);
        assert_eq!(registry.resolve(Some("b")).unwrap().name(), "b");
        assert_eq!(registry.resolve(None).unwrap().name(), "a");
        assert!(matches!(registry.resolve(Some("zzz")), Err(OcrError::Config(_))));
    }

    #[test]
    fn test_empty_registry_is_an_error() {
        assert!(matches!(
            EngineRegistry::from_engines(Vec::new()),
            Err(OcrError::InitializationError(_))
        ));
    }
}
