use axum::extract::{Path, Query, State};
use serde_json::{json, Value};

use super::{body, parse_id, JsonBody};
use crate::database::models::{Message, MessageInput};
use crate::error::ApiError;
use crate::middleware::{AdminUser, ApiResponse, ApiResult, ClientInfo};
use crate::services::listing::MessageListQuery;
use crate::services::messages::{BulkDelete, NotesUpdate, StatusUpdate};
use crate::services::MessageService;
use crate::state::AppState;

const NOT_FOUND: &str = "Message not found";

/// POST /api/messages - public contact form
pub async fn submit(
    State(state): State<AppState>,
    client: ClientInfo,
    payload: JsonBody<MessageInput>,
) -> ApiResult<Value> {
    let message = MessageService::new(&state)
        .submit(body(payload)?, client)
        .await?;
    Ok(ApiResponse::created(json!({ "id": message.id }))
        .with_message("Message sent successfully! We will get back to you soon."))
}

/// GET /api/messages - one page of the inbox plus counters
pub async fn list(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<MessageListQuery>,
) -> ApiResult<Vec<Message>> {
    let inbox = MessageService::new(&state).inbox(&query).await?;
    Ok(ApiResponse::success(inbox.messages)
        .with_field("stats", inbox.stats)
        .with_field("pagination", inbox.pagination))
}

/// GET /api/messages/:id - marks an unread message read
pub async fn get(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    let id = parse_id(&id, NOT_FOUND)?;
    Ok(ApiResponse::success(MessageService::new(&state).open(id).await?))
}

/// PATCH /api/messages/:id/status
pub async fn set_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    payload: JsonBody<StatusUpdate>,
) -> ApiResult<Message> {
    let id = parse_id(&id, NOT_FOUND)?;
    let message = MessageService::new(&state)
        .set_status(id, body(payload)?)
        .await?;
    Ok(ApiResponse::success(message).with_message("Status updated successfully"))
}

/// PATCH /api/messages/:id/star
pub async fn toggle_star(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    let id = parse_id(&id, NOT_FOUND)?;
    let message = MessageService::new(&state).toggle_star(id).await?;
    let verb = if message.is_starred { "starred" } else { "unstarred" };
    Ok(ApiResponse::success(message).with_message(format!("Message {} successfully", verb)))
}

/// PUT /api/messages/:id/notes
pub async fn set_notes(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    payload: JsonBody<NotesUpdate>,
) -> ApiResult<Message> {
    let id = parse_id(&id, NOT_FOUND)?;
    let message = MessageService::new(&state)
        .set_notes(id, body(payload)?)
        .await?;
    Ok(ApiResponse::success(message).with_message("Notes updated successfully"))
}

pub async fn delete(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    MessageService::new(&state).delete(id).await?;
    Ok(ApiResponse::message("Message deleted successfully"))
}

/// POST /api/messages/bulk/delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    _admin: AdminUser,
    payload: JsonBody<BulkDelete>,
) -> Result<ApiResponse<()>, ApiError> {
    let deleted = MessageService::new(&state).delete_many(body(payload)?).await?;
    Ok(ApiResponse::message(format!("{} message(s) deleted successfully", deleted)))
}
