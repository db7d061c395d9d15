// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::StoreError;
use crate::storage::StorageError;
use crate::uploads::UploadError;
use crate::validation::FieldError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationFailed {
        message: String,
        errors: Vec<FieldError>,
    },
    InvalidJson(String),
    DuplicateResource(String),
    InvalidFileType(String),
    FileTooLarge(String),

    // 401 Unauthorized
    AuthenticationRequired(String),

    // 403 Forbidden
    AuthorizationDenied(String),

    // 404 Not Found
    NotFound(String),

    // 429 Too Many Requests
    TooManyRequests(String),

    // 500 Internal Server Error
    UploadFailed(String),
    UpstreamStoreError(String),
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationFailed { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::DuplicateResource(_) => 400,
            ApiError::InvalidFileType(_) => 400,
            ApiError::FileTooLarge(_) => 400,
            ApiError::AuthenticationRequired(_) => 401,
            ApiError::AuthorizationDenied(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::TooManyRequests(_) => 429,
            ApiError::UploadFailed(_) => 500,
            ApiError::UpstreamStoreError(_) => 500,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationFailed { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::DuplicateResource(msg) => msg,
            ApiError::InvalidFileType(msg) => msg,
            ApiError::FileTooLarge(msg) => msg,
            ApiError::AuthenticationRequired(msg) => msg,
            ApiError::AuthorizationDenied(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::TooManyRequests(msg) => msg,
            ApiError::UploadFailed(msg) => msg,
            ApiError::UpstreamStoreError(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationFailed { .. } => "VALIDATION_FAILED",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::DuplicateResource(_) => "DUPLICATE_RESOURCE",
            ApiError::InvalidFileType(_) => "INVALID_FILE_TYPE",
            ApiError::FileTooLarge(_) => "FILE_TOO_LARGE",
            ApiError::AuthenticationRequired(_) => "AUTHENTICATION_REQUIRED",
            ApiError::AuthorizationDenied(_) => "AUTHORIZATION_DENIED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::TooManyRequests(_) => "TOO_MANY_REQUESTS",
            ApiError::UploadFailed(_) => "UPLOAD_FAILED",
            ApiError::UpstreamStoreError(_) => "UPSTREAM_STORE_ERROR",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Convert to the `{success:false, message, errors?}` envelope
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "message": self.message(),
            "code": self.error_code()
        });

        if let ApiError::ValidationFailed { errors, .. } = self {
            response["errors"] = json!(errors);
        }

        response
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_failed(errors: Vec<FieldError>) -> Self {
        let message = match errors.first() {
            Some(first) if errors.len() == 1 => first.message.clone(),
            _ => "Validation failed".to_string(),
        };
        ApiError::ValidationFailed { message, errors }
    }

    pub fn field_error(field: &str, message: impl Into<String>) -> Self {
        Self::validation_failed(vec![FieldError::new(field, message)])
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        ApiError::DuplicateResource(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::AuthenticationRequired(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::AuthorizationDenied(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        ApiError::TooManyRequests(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

// Convert other error types to ApiError
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::not_found(msg),
            StoreError::Duplicate(msg) => ApiError::duplicate(msg),
            StoreError::InvalidData(msg) => {
                tracing::error!("Stored record could not be decoded: {}", msg);
                ApiError::UpstreamStoreError("Server error".to_string())
            }
            StoreError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::UpstreamStoreError("Server error".to_string())
            }
            StoreError::Migration(e) => {
                tracing::error!("Migration error: {}", e);
                ApiError::UpstreamStoreError("Server error".to_string())
            }
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::InvalidFileType { message, .. } => ApiError::InvalidFileType(message),
            UploadError::FileTooLarge { .. } => ApiError::FileTooLarge(err.to_string()),
            UploadError::UnexpectedField(_) | UploadError::Multipart(_) => {
                ApiError::bad_request(err.to_string())
            }
            UploadError::InvalidJsonField { field, .. } => {
                ApiError::field_error(&field, format!("Invalid JSON in field '{}'", field))
            }
            UploadError::Storage(e) => {
                tracing::error!("Object store write failed: {}", e);
                ApiError::UploadFailed("Failed to upload file".to_string())
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        UploadError::Storage(err).into()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => ApiError::unauthenticated("No token provided"),
            AuthError::MalformedHeader => {
                ApiError::unauthenticated("Authorization header must use Bearer token format")
            }
            AuthError::InvalidToken(_) => ApiError::unauthenticated("Invalid or expired token"),
            AuthError::InvalidCredentials => ApiError::unauthenticated("Invalid credentials"),
            AuthError::Hash(e) => {
                tracing::error!("Password hashing failed: {}", e);
                ApiError::internal_server_error("Server error")
            }
            AuthError::TokenGeneration(e) => {
                tracing::error!("Token generation failed: {}", e);
                ApiError::internal_server_error("Server error")
            }
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
