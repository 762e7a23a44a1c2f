use std::fs;
use std::path::Path;

use super::{DetectionEngine, EngineError, ModelHandle};

/// Pass-through engine for development and testing
///
/// Runs no native code. Loading still requires the model file to exist, so
/// load failures stay observable; processing copies the input frame to the
/// output path unchanged.
pub struct StubEngine;

impl DetectionEngine for StubEngine {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn load_model(&self, model_path: &Path) -> Result<Box<dyn ModelHandle>, EngineError> {
        if !model_path.is_file() {
            return Err(EngineError::ModelLoad(format!(
                "model file not found: {}",
                model_path.display()
            )));
        }
        tracing::warn!("StubEngine: no native detection, frames pass through unchanged");
        Ok(Box::new(StubModel))
    }
}

struct StubModel;

impl ModelHandle for StubModel {
    fn process_frame(&mut self, frame_path: &Path, output_path: &Path) -> Result<(), EngineError> {
        fs::copy(frame_path, output_path)
            .map_err(|e| EngineError::Processing(format!("copy to output failed: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_fails_when_model_file_missing() {
        let engine = StubEngine;
        let err = engine
            .load_model(Path::new("/nonexistent/yolov8n.torchscript"))
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::ModelLoad(_)));
    }

    #[test]
    fn test_process_copies_frame_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.torchscript");
        fs::write(&model_path, b"weights").unwrap();

        let frame_path = dir.path().join("frame.jpg");
        fs::write(&frame_path, b"jpeg bytes").unwrap();
        let output_path = dir.path().join("out.jpg");

        let engine = StubEngine;
        let mut model = engine.load_model(&model_path).unwrap();
        model.process_frame(&frame_path, &output_path).unwrap();

        assert_eq!(fs::read(&output_path).unwrap(), b"jpeg bytes");
    }

    #[test]
    fn test_process_fails_when_frame_missing() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.torchscript");
        fs::write(&model_path, b"weights").unwrap();

        let engine = StubEngine;
        let mut model = engine.load_model(&model_path).unwrap();
        let missing = dir.path().join("missing.jpg");
        let output = dir.path().join("out.jpg");
        let err = model.process_frame(&missing, &output).err().unwrap();
        assert!(matches!(err, EngineError::Processing(_)));
    }
}
