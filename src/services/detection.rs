use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::info;
use uuid::Uuid;

use crate::api::error::AppError;
use crate::config::DetectorConfig;
use crate::engine::DetectionEngine;
use crate::services::results::ResultStore;

/// An uploaded frame spooled to disk for the duration of one request
///
/// The temp file is deleted when this drops, at the end of the request.
pub struct SpooledFrame {
    file: NamedTempFile,
    pub filename: String,
    pub size: u64,
}

impl SpooledFrame {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Outcome of one full load/process/release sequence
pub struct ProcessingReport {
    pub request_id: Uuid,
    pub elapsed_ms: u64,
    pub processed_at: DateTime<Utc>,
}

/// Runs uploaded frames through the native detection boundary
pub struct DetectionService {
    engine: Arc<dyn DetectionEngine>,
    results: Arc<ResultStore>,
    config: DetectorConfig,
}

impl DetectionService {
    pub fn new(
        engine: Arc<dyn DetectionEngine>,
        results: Arc<ResultStore>,
        config: DetectorConfig,
    ) -> Self {
        Self {
            engine,
            results,
            config,
        }
    }

    /// Stream an uploaded field to a temp file, enforcing the size limit
    pub async fn spool_frame(
        &self,
        filename: String,
        mut reader: impl AsyncRead + Unpin + Send,
    ) -> Result<SpooledFrame, AppError> {
        let temp_file = match &self.config.temp_dir {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(|e| AppError::Internal(format!("Failed to create temp file: {}", e)))?;

        let mut temp_file_async = tokio::fs::File::from_std(
            temp_file
                .reopen()
                .map_err(|e| AppError::Internal(e.to_string()))?,
        );

        let mut buffer = [0u8; 8192];
        let mut total_size: u64 = 0;

        loop {
            let n = reader
                .read(&mut buffer)
                .await
                .map_err(|e| AppError::Internal(format!("Read error: {}", e)))?;
            if n == 0 {
                break;
            }

            total_size += n as u64;
            if total_size > self.config.max_upload_size as u64 {
                return Err(AppError::PayloadTooLarge(format!(
                    "Upload exceeds the maximum of {} bytes",
                    self.config.max_upload_size
                )));
            }

            temp_file_async
                .write_all(&buffer[..n])
                .await
                .map_err(|e| AppError::Internal(format!("Write error: {}", e)))?;
        }

        temp_file_async
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Flush error: {}", e)))?;

        if total_size == 0 {
            return Err(AppError::BadRequest("Uploaded image is empty".to_string()));
        }

        Ok(SpooledFrame {
            file: temp_file,
            filename,
            size: total_size,
        })
    }

    /// Run one frame through load_model, process_frame and release
    ///
    /// The whole sequence runs on the blocking pool: the native calls are
    /// synchronous, and the handle they return lives only inside this
    /// closure, so the model is released whether processing succeeds or not.
    pub async fn process_frame(
        &self,
        frame: &SpooledFrame,
        request_id: Uuid,
    ) -> Result<ProcessingReport, AppError> {
        let engine = self.engine.clone();
        let model_path = self.config.model_path.clone();
        let input_path = frame.path().to_path_buf();
        let output_path = self.results.path_for(&request_id);

        info!(
            "Processing image: {} (output: {})",
            input_path.display(),
            output_path.display()
        );

        let started = Instant::now();

        tokio::task::spawn_blocking(move || {
            let mut model = engine.load_model(&model_path)?;
            info!("Model loaded successfully from {}", model_path.display());
            model.process_frame(&input_path, &output_path)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Detection task failed: {}", e)))??;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            "Image processed in {}ms ({}, {} bytes)",
            elapsed_ms, frame.filename, frame.size
        );

        Ok(ProcessingReport {
            request_id,
            elapsed_ms,
            processed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StubEngine;
    use std::io::Cursor;

    async fn service_with_dirs() -> (DetectionService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.torchscript");
        std::fs::write(&model_path, b"weights").unwrap();

        let config = DetectorConfig {
            model_path,
            output_dir: dir.path().join("output"),
            temp_dir: None,
            engine_backend: "stub".to_string(),
            max_upload_size: 1024,
        };

        let results = Arc::new(ResultStore::new(config.output_dir.clone()));
        results.prepare().await.unwrap();

        let service = DetectionService::new(Arc::new(StubEngine), results, config);
        (service, dir)
    }

    #[tokio::test]
    async fn test_spool_and_process_writes_result() {
        let (service, dir) = service_with_dirs().await;

        let frame = service
            .spool_frame("cat.jpg".to_string(), Cursor::new(b"jpeg bytes".to_vec()))
            .await
            .unwrap();
        assert_eq!(frame.size, 10);

        let request_id = Uuid::new_v4();
        let report = service.process_frame(&frame, request_id).await.unwrap();
        assert_eq!(report.request_id, request_id);

        let output = dir.path().join("output").join(format!("{}.jpg", request_id));
        assert_eq!(std::fs::read(output).unwrap(), b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_spool_rejects_empty_upload() {
        let (service, _dir) = service_with_dirs().await;

        let err = service
            .spool_frame("empty.jpg".to_string(), Cursor::new(Vec::new()))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_spool_enforces_size_limit() {
        let (service, _dir) = service_with_dirs().await;

        let err = service
            .spool_frame("big.jpg".to_string(), Cursor::new(vec![0u8; 4096]))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }

    #[tokio::test]
    async fn test_process_reports_load_failure() {
        let (service, dir) = service_with_dirs().await;
        std::fs::remove_file(dir.path().join("model.torchscript")).unwrap();

        let frame = service
            .spool_frame("cat.jpg".to_string(), Cursor::new(b"jpeg bytes".to_vec()))
            .await
            .unwrap();

        let err = service
            .process_frame(&frame, Uuid::new_v4())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::ModelUnavailable(_)));
    }
}
