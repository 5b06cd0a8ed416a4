//! Statement upload handler.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    response::{IntoResponse, Response},
    Json,
};

use super::super::AppState;
use super::helpers::{error_response, UploadResponse};

/// Multipart field carrying the statement.
pub const PDF_FIELD: &str = "pdf";

/// Extract rows from an uploaded statement and generate a workbook.
pub async fn upload_statement(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::warn!("Rejected upload: {}", rejection.body_text());
            return error_response(rejection.body_text());
        }
    };

    let content = match read_pdf_field(multipart).await {
        Ok(Some(content)) => content,
        Ok(None) => return error_response("No PDF file uploaded (expected form field 'pdf')."),
        Err(e) => {
            tracing::warn!("Failed to read upload: {}", e);
            return error_response(format!("Failed to read upload: {}", e));
        }
    };

    match state.pipeline.run(&content).await {
        Ok(processed) => Json(UploadResponse::from(processed)).into_response(),
        Err(e) => error_response(e.to_string()),
    }
}

/// Read the first `pdf` field, skipping any other fields.
async fn read_pdf_field(mut multipart: Multipart) -> Result<Option<Vec<u8>>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(PDF_FIELD) {
            let content = field.bytes().await?;
            return Ok(Some(content.to_vec()));
        }
    }
    Ok(None)
}
