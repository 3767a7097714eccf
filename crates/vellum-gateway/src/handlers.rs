use std::path::Path;

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;
use vellum_ingest::IngestError;

use super::server::AppState;

#[derive(serde::Serialize)]
struct UploadResponse {
    filename: String,
    chunk_count: usize,
    status: &'static str,
}

#[derive(serde::Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
}

pub(crate) async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(StatusCode::BAD_REQUEST, format!("malformed multipart: {e}"));
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let Some(filename) = field.file_name().map(ToOwned::to_owned) else {
            return error_response(StatusCode::BAD_REQUEST, "file field missing a filename".into());
        };

        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                return error_response(StatusCode::BAD_REQUEST, format!("failed to read upload: {e}"));
            }
        };

        return process_upload(&state, &filename, &data).await;
    }

    error_response(StatusCode::BAD_REQUEST, "missing multipart field 'file'".into())
}

async fn process_upload(state: &AppState, filename: &str, data: &[u8]) -> Response {
    // Spool under a unique name; the declared filename only drives dispatch.
    let spool_name = format!("{}-{}", Uuid::new_v4(), basename(filename));
    let spool_path = state.upload_dir.join(spool_name);

    if let Err(e) = tokio::fs::write(&spool_path, data).await {
        tracing::error!(filename, "failed to spool upload: {e}");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to save upload".into());
    }

    let result = state.pipeline.process_file(&spool_path, filename, None).await;

    if let Err(e) = tokio::fs::remove_file(&spool_path).await {
        tracing::warn!(filename, "failed to remove spooled upload: {e}");
    }

    let document = match result {
        Ok(document) => document,
        Err(e) => {
            tracing::error!(filename, "processing failed: {e}");
            return error_response(ingest_status(&e), e.to_string());
        }
    };

    let chunk_count = document.chunks.len();
    let (embeddings, metadatas, texts) = document.into_store_batch();
    if let Err(e) = state.store.insert_many(embeddings, metadatas, texts).await {
        tracing::error!(filename, "storage hand-off failed: {e}");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }

    tracing::info!(filename, chunk_count, "document indexed");
    Json(UploadResponse {
        filename: filename.to_owned(),
        chunk_count,
        status: "indexed",
    })
    .into_response()
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// Client errors keep their taxonomy; everything else is a server error.
fn ingest_status(error: &IngestError) -> StatusCode {
    match error {
        IngestError::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        IngestError::FileTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        IngestError::Io(_)
        | IngestError::Extraction(_)
        | IngestError::ChunkConfiguration { .. }
        | IngestError::Embedding(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

/// Strip any path components a client smuggled into the declared filename.
fn basename(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_strips_directories() {
        assert_eq!(basename("../../etc/passwd"), "passwd");
        assert_eq!(basename("plain.txt"), "plain.txt");
        assert_eq!(basename("dir/nested.pdf"), "nested.pdf");
    }

    #[test]
    fn unsupported_type_maps_to_client_error() {
        let status = ingest_status(&IngestError::UnsupportedFileType("xyz".into()));
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn oversized_file_maps_to_payload_too_large() {
        let status = ingest_status(&IngestError::FileTooLarge(1024));
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn extraction_failure_maps_to_server_error() {
        let status = ingest_status(&IngestError::Extraction("corrupt file".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn upload_response_serializes() {
        let resp = UploadResponse {
            filename: "a.txt".into(),
            chunk_count: 3,
            status: "indexed",
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"chunk_count\":3"));
        assert!(json.contains("\"status\":\"indexed\""));
    }
}
