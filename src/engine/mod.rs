use std::path::Path;

use thiserror::Error;

pub mod stub;
#[cfg(feature = "backend-yolo")]
pub mod yolo;

pub use stub::StubEngine;
#[cfg(feature = "backend-yolo")]
pub use yolo::YoloEngine;

/// Failure classes at the native detection boundary
#[derive(Error, Debug)]
pub enum EngineError {
    /// The model file could not be loaded (missing, corrupt, wrong format)
    #[error("model load failed: {0}")]
    ModelLoad(String),

    /// The model loaded but the frame did not produce a result image
    #[error("frame processing failed: {0}")]
    Processing(String),

    /// A path could not be handed across the boundary
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

/// A loaded detection model, scoped to one request
///
/// Dropping the handle releases the native resources behind it, so the
/// release happens on every exit path, including processing failures.
pub trait ModelHandle: Send {
    /// Run detection on `frame_path`, writing the annotated image to
    /// `output_path`.
    fn process_frame(&mut self, frame_path: &Path, output_path: &Path) -> Result<(), EngineError>;
}

/// Trait for detection engine implementations
///
/// Models are loaded and released once per request; there is no shared model
/// cache across requests. Calls block and must run on the blocking pool.
pub trait DetectionEngine: Send + Sync {
    /// Short identifier for logs and health reporting
    fn name(&self) -> &'static str;

    /// Load a model from disk, returning a handle scoped to one request
    fn load_model(&self, model_path: &Path) -> Result<Box<dyn ModelHandle>, EngineError>;
}

/// Factory function to create the appropriate engine based on config
pub fn create_engine(engine_type: &str) -> anyhow::Result<Box<dyn DetectionEngine>> {
    match engine_type.to_lowercase().as_str() {
        "yolo" => {
            #[cfg(feature = "backend-yolo")]
            {
                Ok(Box::new(YoloEngine))
            }
            #[cfg(not(feature = "backend-yolo"))]
            {
                anyhow::bail!(
                    "engine 'yolo' requires the backend-yolo feature; set DETECTION_ENGINE=stub to run without the native library"
                )
            }
        }
        "stub" | "noop" | "none" => Ok(Box::new(StubEngine)),
        _ => {
            tracing::warn!("Unknown engine type '{}', using StubEngine", engine_type);
            Ok(Box::new(StubEngine))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_stub_engine() {
        let engine = create_engine("stub").unwrap();
        assert_eq!(engine.name(), "stub");

        let engine = create_engine("none").unwrap();
        assert_eq!(engine.name(), "stub");
    }

    #[test]
    fn test_unknown_engine_falls_back_to_stub() {
        let engine = create_engine("tensorrt").unwrap();
        assert_eq!(engine.name(), "stub");
    }

    #[cfg(not(feature = "backend-yolo"))]
    #[test]
    fn test_yolo_requires_feature() {
        assert!(create_engine("yolo").is_err());
    }
}
