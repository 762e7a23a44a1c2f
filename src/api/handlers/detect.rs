use axum::{
    Json,
    extract::{Multipart, State},
};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use serde::Serialize;
use tokio_util::io::StreamReader;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::AppState;
use crate::api::error::AppError;
use crate::services::detection::SpooledFrame;
use crate::utils::validation::sanitize_filename;

#[derive(Serialize, ToSchema)]
pub struct DetectResponse {
    /// Server-assigned id of this request; also names the stored result
    pub request_id: String,
    pub filename: String,
    /// Path the annotated image can be fetched from
    pub result_url: String,
    pub engine: String,
    pub elapsed_ms: u64,
    pub processed_at: DateTime<Utc>,
}

#[utoipa::path(
    post,
    path = "/detect",
    request_body(content = Multipart, description = "Image upload (multipart field name: image)"),
    responses(
        (status = 200, description = "Image processed successfully", body = DetectResponse),
        (status = 400, description = "Missing or invalid image field"),
        (status = 413, description = "Image exceeds the upload limit"),
        (status = 503, description = "Detection model could not be loaded")
    ),
    tag = "detect"
)]
pub async fn detect_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DetectResponse>, AppError> {
    // Capture errors so the remaining multipart stream can be drained before
    // the response goes out
    let result: Result<Json<DetectResponse>, AppError> = async {
        let mut frame: Option<SpooledFrame> = None;

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            let err_msg = e.to_string();
            if err_msg.contains("length limit exceeded") {
                AppError::PayloadTooLarge(
                    "Request body exceeds the maximum allowed limit".to_string(),
                )
            } else {
                AppError::BadRequest(err_msg)
            }
        })? {
            let name = field.name().unwrap_or_default().to_string();

            if name == "image" {
                let original_filename = field.file_name().unwrap_or("unnamed").to_string();
                let filename = sanitize_filename(&original_filename)
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;

                let body_with_io_error = field.map_err(std::io::Error::other);
                let reader = StreamReader::new(body_with_io_error);

                frame = Some(state.detection.spool_frame(filename, reader).await?);
            }
            // Other fields are ignored; only `image` participates.
        }

        let frame = frame.ok_or(AppError::BadRequest(
            "Please upload an image (multipart field 'image')".to_string(),
        ))?;

        let request_id = Uuid::new_v4();
        let report = state.detection.process_frame(&frame, request_id).await?;

        Ok(Json(DetectResponse {
            request_id: report.request_id.to_string(),
            filename: frame.filename.clone(),
            result_url: format!("/results/{}", report.request_id),
            engine: state.engine.name().to_string(),
            elapsed_ms: report.elapsed_ms,
            processed_at: report.processed_at,
        }))
    }
    .await;

    match result {
        Ok(res) => Ok(res),
        Err(e) => {
            // Consume whatever the client is still sending so it receives the
            // error instead of a reset connection
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            Err(e)
        }
    }
}
