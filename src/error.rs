use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    /// A price row is malformed or inconsistent with the rest of its series.
    #[error("Invalid row {row}: {message}")]
    Validation { row: usize, message: String },

    #[error("No data: {0}")]
    NoData(String),

    #[error("Trading calendar unavailable for {year}: {reason}")]
    CalendarUnavailable { year: i32, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(row: usize, message: impl Into<String>) -> Self {
        AppError::Validation {
            row,
            message: message.into(),
        }
    }

    pub fn calendar_unavailable(year: i32, reason: impl Into<String>) -> Self {
        AppError::CalendarUnavailable {
            year,
            reason: reason.into(),
        }
    }

    /// Stable identifier reported alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation",
            AppError::NoData(_) => "no_data",
            AppError::CalendarUnavailable { .. } => "calendar_unavailable",
            AppError::NotFound(_) => "not_found",
            AppError::Unavailable(_) | AppError::Reqwest(_) => "unavailable",
            AppError::BadRequest(_) | AppError::SerdeJson(_) => "bad_request",
            AppError::Anyhow(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NoData(_) | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CalendarUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unavailable(_) | AppError::Reqwest(_) => StatusCode::BAD_GATEWAY,
            AppError::BadRequest(_) | AppError::SerdeJson(_) => StatusCode::BAD_REQUEST,
            AppError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_row() {
        let err = AppError::validation(3, "close is missing");
        assert_eq!(err.to_string(), "Invalid row 3: close is missing");
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::NoData("AAPL".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::calendar_unavailable(1850, "unsupported").status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Unavailable("timeout".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::validation(0, "bad").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_anyhow_is_internal() {
        let err = AppError::from(anyhow::anyhow!("listener closed"));
        assert_eq!(err.kind(), "internal");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "listener closed");
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = AppError::NotFound("ZZZZ".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["kind"], "not_found");
        assert_eq!(body["status"], 404);
        assert_eq!(body["error"], "Not found: ZZZZ");
    }
}
