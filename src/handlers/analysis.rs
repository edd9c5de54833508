//! Appropriation form analysis handler

use axum::{
    Json,
    extract::{Extension, Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    middleware::auth::AuthenticatedUser, models::analysis::FormAnalysis, state::AppState,
};

/// Multipart field that carries the uploaded form.
const FILE_FIELD: &str = "file";

struct Upload {
    bytes: Vec<u8>,
    content_type: Option<String>,
    file_name: Option<String>,
}

/// POST /api/analyze-form/
///
/// Accepts a multipart upload with a `file` field (PDF, DOCX or plain text),
/// extracts its text and returns the model's compliance review.
///
/// # HTTP Status Codes
/// - `200 OK`: `{"issues": [...], "recommendations": [...]}`; model failures are
///   reported inside this payload
/// - `400 BAD_REQUEST`: `{"error": "No file uploaded."}`, or an analysis payload
///   describing why the file could not be read
pub async fn analyze_form(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let upload = match multipart {
        Ok(multipart) => read_upload(multipart).await,
        Err(rejection) => {
            tracing::warn!(
                operation = "analyze_form",
                error = %rejection,
                "Request was not a multipart upload",
            );
            None
        }
    };

    let Some(upload) = upload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No file uploaded." })),
        )
            .into_response();
    };

    tracing::info!(
        operation = "analyze_form",
        user_id = %auth_user.id,
        file_name = upload.file_name.as_deref().unwrap_or("<unnamed>"),
        content_type = upload.content_type.as_deref().unwrap_or("<none>"),
        size = upload.bytes.len(),
        "Analyzing appropriation form",
    );

    match state
        .analyzer
        .analyze_document(&upload.bytes, upload.content_type.as_deref())
        .await
    {
        Ok(analysis) => Json(analysis).into_response(),
        Err(e) => {
            tracing::warn!(operation = "analyze_form", error = %e, "Form could not be processed");
            (
                StatusCode::BAD_REQUEST,
                Json(FormAnalysis::processing_failure(&e.to_string())),
            )
                .into_response()
        }
    }
}

/// Reads the `file` field. Returns `None` when it is absent or unreadable.
async fn read_upload(mut multipart: Multipart) -> Option<Upload> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(
                    operation = "analyze_form",
                    error = %e,
                    "Failed to read multipart field",
                );
                return None;
            }
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        return match field.bytes().await {
            Ok(bytes) => Some(Upload {
                bytes: bytes.to_vec(),
                content_type,
                file_name,
            }),
            Err(e) => {
                tracing::warn!(operation = "analyze_form", error = %e, "Failed to read file bytes");
                None
            }
        };
    }
}
