use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub is_operational: bool,
}

impl AppError {
    pub fn bad_request(code: &str, message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: code.to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn unauthorized(message: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "AUTH_UNAUTHORIZED".to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn forbidden(message: &str) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            code: "FORBIDDEN".to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND".to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn conflict(code: &str, message: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            code: code.to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn too_many_requests(message: &str) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            code: "RATE_LIMITED".to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn internal(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.to_string(),
            is_operational: false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let exposed_message = if self.is_operational {
            self.message.clone()
        } else {
            "Internal server error".to_string()
        };

        if self.is_operational {
            tracing::warn!(status = %self.status, code = %self.code, error = %self.message, "API error");
        } else {
            tracing::error!(status = %self.status, code = %self.code, error = %self.message, "Internal API error");
        }

        (
            self.status,
            Json(ErrorBody {
                success: false,
                code: self.code,
                message: exposed_message,
                trace_id: None,
            }),
        )
            .into_response()
    }
}

// StoreError mapping:
// - NotFound -> 404 (answer submitted for an item never surfaced)
// - Validation -> 400 (user input, safe to expose)
// - everything else -> 500 (is_operational=false, message redacted)
impl From<crate::store::StoreError> for AppError {
    fn from(value: crate::store::StoreError) -> Self {
        match &value {
            crate::store::StoreError::NotFound { entity, key } => {
                AppError::not_found(&format!("{entity} not found: {key}"))
            }
            crate::store::StoreError::Validation(msg) => {
                AppError::bad_request("VALIDATION_ERROR", msg)
            }
            _ => AppError::internal(&value.to_string()),
        }
    }
}

pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
}

pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
}
