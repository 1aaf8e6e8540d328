use axum::{
    Json,
    extract::multipart::MultipartError,
    extract::rejection::{BytesRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use thiserror::Error;

use super::models::ErrorResponse;
use super::validation::RequestValidationError;
use crate::ledger::LedgerError;
use crate::pdf::PdfError;
use crate::storage::StorageError;
use crate::workflow::WorkflowError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("payload invalid: {0}")]
    InvalidPayload(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("history ledger busy: {0}")]
    LedgerBusy(String),
    #[error("history ledger corrupt: {0}")]
    CorruptLedger(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::LedgerBusy(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::CorruptLedger(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidPayload(_) => "INVALID_PAYLOAD",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::LedgerBusy(_) => "LEDGER_BUSY",
            ApiError::CorruptLedger(_) => "CORRUPT_LEDGER",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        }

        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<WorkflowError> for ApiError {
    fn from(value: WorkflowError) -> Self {
        match value {
            WorkflowError::Pdf(err) => err.into(),
            WorkflowError::Storage(err) => err.into(),
            WorkflowError::Ledger(err) => err.into(),
        }
    }
}

impl From<PdfError> for ApiError {
    fn from(value: PdfError) -> Self {
        match value {
            PdfError::Write(_) => ApiError::Internal(value.to_string()),
            PdfError::Lopdf(_)
            | PdfError::Image(_)
            | PdfError::NoInput
            | PdfError::EmptyPassphrase
            | PdfError::InvalidRange { .. }
            | PdfError::InvalidPageOrder(_) => ApiError::InvalidPayload(value.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::InvalidName(name) => ApiError::NotFound(format!("artifact {name}")),
            StorageError::Io(_) => ApiError::Internal(value.to_string()),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::Busy(_) => ApiError::LedgerBusy(value.to_string()),
            LedgerError::Corrupt { .. } => ApiError::CorruptLedger(value.to_string()),
            LedgerError::Io(_) | LedgerError::Serialization(_) => {
                ApiError::Internal(value.to_string())
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(value: MultipartError) -> Self {
        if value.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(value.body_text())
        } else {
            ApiError::InvalidPayload(value.body_text())
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(value: BytesRejection) -> Self {
        if value.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(value.body_text())
        } else {
            ApiError::InvalidPayload(value.body_text())
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        ApiError::InvalidPayload(value.body_text())
    }
}

impl From<RequestValidationError> for ApiError {
    fn from(value: RequestValidationError) -> Self {
        ApiError::InvalidPayload(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_ledger_errors_map_to_status() {
        let busy: ApiError = LedgerError::Busy(Duration::from_secs(5)).into();
        assert_eq!(busy.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(busy.code(), "LEDGER_BUSY");

        let corrupt: ApiError = LedgerError::Corrupt {
            path: "history.json".into(),
            source: serde_json::from_str::<serde_json::Value>("[").unwrap_err(),
        }
        .into();
        assert_eq!(corrupt.code(), "CORRUPT_LEDGER");
    }

    #[test]
    fn test_pdf_errors_map_to_status() {
        let write: ApiError = PdfError::Write("disk full".to_string()).into();
        assert_eq!(write.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let empty: ApiError = PdfError::EmptyPassphrase.into();
        assert_eq!(empty.code(), "INVALID_PAYLOAD");

        let bad_range: ApiError = PdfError::InvalidRange {
            start: 3,
            end: 9,
            pages: 4,
        }
        .into();
        assert_eq!(bad_range.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_artifact_name_is_not_found() {
        let err: ApiError = StorageError::InvalidName("../etc/passwd".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
