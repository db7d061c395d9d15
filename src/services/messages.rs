use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use super::listing::{self, MessageListQuery};
use crate::database::models::{Message, MessageInput, MessageStatus};
use crate::database::{MessageStats, MessageStore, Store};
use crate::error::ApiError;
use crate::middleware::ClientInfo;
use crate::state::AppState;
use crate::types::Pagination;

#[derive(Debug, Default, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesUpdate {
    #[serde(default)]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BulkDelete {
    #[serde(default)]
    pub ids: Value,
}

pub struct Inbox {
    pub messages: Vec<Message>,
    pub stats: MessageStats,
    pub pagination: Pagination,
}

/// Contact-form submissions and the admin inbox.
pub struct MessageService {
    store: Arc<dyn Store>,
    max_page_limit: u32,
}

impl MessageService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            max_page_limit: state.config.api.max_page_limit,
        }
    }

    pub async fn submit(&self, input: MessageInput, client: ClientInfo) -> Result<Message, ApiError> {
        let message = Message::submit(input, client.ip, client.user_agent)?;
        let message = self.store.insert_message(message).await?;
        info!(message_id = %message.id, "Received contact message");
        Ok(message)
    }

    pub async fn inbox(&self, query: &MessageListQuery) -> Result<Inbox, ApiError> {
        let filter = listing::message_filter(query, self.max_page_limit)?;
        let (messages, total) = self.store.list_messages(&filter).await?;
        let stats = self.store.message_stats().await?;
        Ok(Inbox {
            messages,
            stats,
            pagination: Pagination::new(filter.page, total),
        })
    }

    /// Opening an unread message marks it read.
    pub async fn open(&self, id: Uuid) -> Result<Message, ApiError> {
        self.store.mark_message_read(id).await?.ok_or_else(not_found)
    }

    pub async fn set_status(&self, id: Uuid, update: StatusUpdate) -> Result<Message, ApiError> {
        let status: MessageStatus = update
            .status
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| ApiError::bad_request("Invalid status"))?;

        let mut message = self.find(id).await?;
        message.status = status;
        message.touch();
        Ok(self.store.save_message(&message).await?)
    }

    pub async fn toggle_star(&self, id: Uuid) -> Result<Message, ApiError> {
        let mut message = self.find(id).await?;
        message.is_starred = !message.is_starred;
        message.touch();
        Ok(self.store.save_message(&message).await?)
    }

    /// Replaces the notes; a missing value clears them.
    pub async fn set_notes(&self, id: Uuid, update: NotesUpdate) -> Result<Message, ApiError> {
        let mut message = self.find(id).await?;
        message.admin_notes = update.admin_notes.unwrap_or_default();
        message.touch();
        Ok(self.store.save_message(&message).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.store.delete_message(id).await? {
            return Err(not_found());
        }
        info!(message_id = %id, "Deleted message");
        Ok(())
    }

    /// Returns how many messages were actually removed.
    pub async fn delete_many(&self, request: BulkDelete) -> Result<u64, ApiError> {
        let ids = parse_ids(&request.ids)?;
        let deleted = self.store.delete_messages(&ids).await?;
        info!(requested = ids.len(), deleted, "Bulk deleted messages");
        Ok(deleted)
    }

    async fn find(&self, id: Uuid) -> Result<Message, ApiError> {
        self.store.get_message(id).await?.ok_or_else(not_found)
    }
}

/// Accepts a non-empty JSON array of id strings.
fn parse_ids(raw: &Value) -> Result<Vec<Uuid>, ApiError> {
    let invalid = || ApiError::bad_request("Invalid message IDs");
    let items = raw.as_array().filter(|a| !a.is_empty()).ok_or_else(invalid)?;
    items
        .iter()
        .map(|item| item.as_str().and_then(|s| Uuid::parse_str(s.trim()).ok()))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(invalid)
}

fn not_found() -> ApiError {
    ApiError::not_found("Message not found")
}
