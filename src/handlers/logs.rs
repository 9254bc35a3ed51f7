use axum::{
    body::Body,
    extract::State,
    http::header,
    response::IntoResponse,
};
use std::io;
use std::sync::Arc;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::error;

use crate::error::ApiError;
use crate::log_view::tail_newest_first;
use crate::state::AppState;

fn io_to_api(e: io::Error) -> ApiError {
    if e.kind() == io::ErrorKind::NotFound {
        ApiError::NotFound("Log file not found".to_string())
    } else {
        error!(error = %e, "Failed to read log file");
        ApiError::Internal("Failed to read log file".to_string())
    }
}

// Newest-first log tail
pub async fn log_view_handler(State(state): State<Arc<AppState>>) -> Result<String, ApiError> {
    tail_newest_first(&state.log_file, state.log_max_lines)
        .await
        .map_err(io_to_api)
}

// Raw log file as an attachment, streamed
pub async fn log_download_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let file = File::open(&state.log_file).await.map_err(io_to_api)?;
    let body = Body::from_stream(ReaderStream::new(file));

    let file_name = state
        .log_file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("portal.log");
    let disposition = format!("attachment; filename=\"{}\"", file_name);

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
