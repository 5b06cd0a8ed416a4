//! Response types shared by the handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::pipeline::ProcessedStatement;
use crate::sheet::RowTable;

/// Successful upload response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    /// Header row followed by the extracted rows.
    pub data: RowTable,
    pub download_url: String,
}

impl From<ProcessedStatement> for UploadResponse {
    fn from(processed: ProcessedStatement) -> Self {
        Self {
            success: true,
            data: processed.table,
            download_url: processed.download_url,
        }
    }
}

/// Failure response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Every upload failure is reported the same way: 500 with a message.
pub fn error_response(message: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}
