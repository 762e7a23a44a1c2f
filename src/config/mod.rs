use std::env;
use std::path::PathBuf;

/// Runtime configuration for the detection service
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Path to the TorchScript model file (default: "model/yolov8n.torchscript")
    pub model_path: PathBuf,

    /// Directory where processed result images are written (default: "output")
    pub output_dir: PathBuf,

    /// Directory uploads are spooled to while a request is in flight;
    /// the system temp dir when unset
    pub temp_dir: Option<PathBuf>,

    /// Detection engine backend: "yolo" or "stub" (default: "yolo")
    pub engine_backend: String,

    /// Maximum upload size in bytes (default: 32 MB)
    pub max_upload_size: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model/yolov8n.torchscript"),
            output_dir: PathBuf::from("output"),
            temp_dir: None,
            engine_backend: "yolo".to_string(),
            max_upload_size: 32 * 1024 * 1024, // 32 MB
        }
    }
}

impl DetectorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(default.model_path),

            output_dir: env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.output_dir),

            temp_dir: env::var("TEMP_DIR").ok().map(PathBuf::from),

            engine_backend: env::var("DETECTION_ENGINE").unwrap_or(default.engine_backend),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),
        }
    }

    /// Create config for development (stub engine, no native library needed)
    pub fn development() -> Self {
        Self {
            model_path: PathBuf::from("model/yolov8n.torchscript"),
            output_dir: PathBuf::from("output"),
            temp_dir: None,
            engine_backend: "stub".to_string(),
            max_upload_size: 32 * 1024 * 1024,
        }
    }

    /// Create config for production (native engine, env-supplied paths)
    pub fn production() -> Self {
        Self {
            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("model/yolov8n.torchscript")),
            output_dir: env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("output")),
            temp_dir: env::var("TEMP_DIR").ok().map(PathBuf::from),
            engine_backend: "yolo".to_string(),
            max_upload_size: 32 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DetectorConfig::default();
        assert_eq!(config.model_path, PathBuf::from("model/yolov8n.torchscript"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.engine_backend, "yolo");
        assert_eq!(config.max_upload_size, 32 * 1024 * 1024);
        assert!(config.temp_dir.is_none());
    }

    #[test]
    fn test_development_config() {
        let config = DetectorConfig::development();
        assert_eq!(config.engine_backend, "stub");
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_production_config() {
        let config = DetectorConfig::production();
        assert_eq!(config.engine_backend, "yolo");
        assert_eq!(config.max_upload_size, 32 * 1024 * 1024);
    }
}
