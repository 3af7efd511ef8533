use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::services::Page;

/// Wrapper for API responses that automatically adds the `{message, data}` envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub message: String,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self::with_status(data, StatusCode::OK)
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data: Some(data),
            message: "success".to_string(),
            status_code,
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl ApiResponse<()> {
    /// A response carrying only a message, such as after a delete
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: message.into(),
            status_code: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let envelope = match self.data {
            None => json!({ "message": self.message }),
            Some(data) => match serde_json::to_value(&data) {
                Ok(value) => json!({ "message": self.message, "data": value }),
                Err(e) => return serialization_failure(e),
            },
        };

        (self.status_code, Json(envelope)).into_response()
    }
}

/// Paginated list envelope: `{message, data, meta}`
#[derive(Debug)]
pub struct ApiList<T: Serialize> {
    pub page: Page<T>,
}

impl<T: Serialize> From<Page<T>> for ApiList<T> {
    fn from(page: Page<T>) -> Self {
        Self { page }
    }
}

impl<T: Serialize> IntoResponse for ApiList<T> {
    fn into_response(self) -> Response {
        let meta = self.page.meta();
        let data: Value = match serde_json::to_value(&self.page.items) {
            Ok(value) => value,
            Err(e) => return serialization_failure(e),
        };

        Json(json!({ "message": "success", "data": data, "meta": meta })).into_response()
    }
}

fn serialization_failure(e: serde_json::Error) -> Response {
    tracing::error!("Failed to serialize response data: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "Failed to serialize response data" })),
    )
        .into_response()
}

// Convenience type aliases
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
pub type ApiListResult<T> = Result<ApiList<T>, crate::error::ApiError>;
