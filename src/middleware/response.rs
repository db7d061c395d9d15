use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Success envelope: `{success: true, message?, data?, ...extra}`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub message: Option<String>,
    /// Additional top-level members such as `pagination` or `stats`.
    pub extra: Map<String, Value>,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK carrying `data`.
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
            extra: Map::new(),
            status_code: StatusCode::OK,
        }
    }

    /// 201 Created carrying `data`.
    pub fn created(data: T) -> Self {
        Self::success(data).with_status(StatusCode::CREATED)
    }

    pub fn with_status(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a top-level member next to `data`. Serialization failures
    /// degrade the member to `null`.
    pub fn with_field(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize response field '{}': {}", key, e);
            Value::Null
        });
        self.extra.insert(key.to_string(), value);
        self
    }
}

impl ApiResponse<()> {
    /// 200 OK with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Some(message.into()),
            extra: Map::new(),
            status_code: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut envelope = Map::new();
        envelope.insert("success".to_string(), Value::Bool(true));

        if let Some(message) = self.message {
            envelope.insert("message".to_string(), Value::String(message));
        }

        if let Some(data) = &self.data {
            match serde_json::to_value(data) {
                Ok(value) => {
                    envelope.insert("data".to_string(), value);
                }
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "success": false,
                            "message": "Server error"
                        })),
                    )
                        .into_response();
                }
            }
        }

        envelope.extend(self.extra);
        (self.status_code, Json(Value::Object(envelope))).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn envelope_includes_extra_members() {
        let response = ApiResponse::success(vec![1, 2])
            .with_message("Listed")
            .with_field("pagination", Value::Null)
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Listed");
        assert_eq!(json["data"], json!([1, 2]));
        assert!(json.as_object().unwrap().contains_key("pagination"));
    }

    #[tokio::test]
    async fn message_only_has_no_data() {
        let response = ApiResponse::message("Deleted").into_response();
        let json = body(response).await;
        assert!(json.get("data").is_none());
        assert_eq!(json["message"], "Deleted");
    }
}
