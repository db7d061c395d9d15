//! HTTP handlers, one module per resource.
//!
//! Handlers only translate between HTTP and the service layer: extract,
//! call the service, wrap the result in the response envelope. Access is
//! enforced by the extractors they take (`AdminUser`, `AuthUser`, `Viewer`).

pub mod auth;
pub mod health;
pub mod messages;
pub mod profile;
pub mod projects;
pub mod skills;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use uuid::Uuid;

use crate::error::ApiError;

/// JSON body whose rejection is reported in the error envelope.
pub type JsonBody<T> = Result<Json<T>, JsonRejection>;

/// Path ids that do not parse can never match a record.
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::not_found(not_found))
}

pub(crate) fn body<T>(payload: JsonBody<T>) -> Result<T, ApiError> {
    payload.map(|Json(value)| value).map_err(ApiError::from)
}
