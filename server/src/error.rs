use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unprocessable(String),
    /// A request the framework refused to parse; keeps the extractor's own
    /// status so clients see the same code they would without the envelope.
    #[error("{1}")]
    Rejection(StatusCode, String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Rejection(status, _) => *status,
            ApiError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::NotFound(message)
            | ApiError::Unprocessable(message)
            | ApiError::Rejection(_, message) => message.clone(),
            ApiError::Database(sqlx::Error::RowNotFound) => "Object not found".to_owned(),
            ApiError::Database(_) => "database error".to_owned(),
        }
    }
}

// Every error leaves the service as the same JSON envelope with a matching
// HTTP status, so clients never see a framework-specific body.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Database(sqlx::Error::RowNotFound) => {
                tracing::debug!("row not found: {self}")
            }
            ApiError::Database(error) => tracing::error!("database error: {error}"),
            other => tracing::debug!("client error: {other}"),
        }
        let status = self.status_code();
        let body = json!({
            "success": false,
            "error": status.as_u16(),
            "message": self.message(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejection(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejection(rejection.status(), rejection.body_text())
    }
}
