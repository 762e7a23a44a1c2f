use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::AppState;
use crate::api::error::AppError;

#[utoipa::path(
    get,
    path = "/results/{id}",
    params(
        ("id" = String, Path, description = "Request id returned by /detect")
    ),
    responses(
        (status = 200, description = "Annotated result image (JPEG)"),
        (status = 400, description = "Malformed result id"),
        (status = 404, description = "No result stored under this id")
    ),
    tag = "results"
)]
pub async fn download_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::BadRequest("Result id must be a UUID".to_string()))?;

    let file = state
        .results
        .open(&id)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to open result: {}", e)))?
        .ok_or(AppError::NotFound(
            "No result stored under this id".to_string(),
        ))?;

    let body = Body::from_stream(ReaderStream::new(file));

    let headers = [
        (header::CONTENT_TYPE, mime::IMAGE_JPEG.as_ref().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}.jpg\"", id),
        ),
    ];

    Ok((headers, body).into_response())
}
