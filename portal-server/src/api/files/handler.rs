//! Upload serving handler
//!
//! Streams previously uploaded images (profile pictures, QR codes, payment
//! screenshots) back out of the work directory.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::core::ServerState;
use crate::utils::AppError;
use crate::utils::upload::UploadKind;

/// GET /uploads/{category}/{file} - serve a stored upload
pub async fn serve(
    State(state): State<ServerState>,
    Path((category, file)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let kind = UploadKind::from_subdir(&category)
        .ok_or_else(|| AppError::not_found(format!("uploads/{category}")))?;

    // Stored names are generated server-side; anything else is rejected.
    if file.contains('/') || file.contains('\\') || file.contains("..") {
        return Err(AppError::validation("Invalid file name"));
    }

    let path = state
        .work_dir()
        .join("uploads")
        .join(kind.subdir())
        .join(&file);

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::not_found(format!("uploads/{category}/{file}")))?;

    let mime = mime_guess::from_path(&file).first_or_octet_stream();

    Ok(([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response())
}
