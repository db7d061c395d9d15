use async_trait::async_trait;
use sqlx::{postgres::PgRow, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::{text_enum, PgStore};
use crate::database::models::Message;
use crate::database::query::{MessageFilter, MessageStats};
use crate::database::store::MessageStore;
use crate::database::{StoreError, StoreResult};

const COLUMNS: &str = "id, name, email, subject, message, status, is_starred, admin_notes, \
     ip_address, user_agent, created_at, updated_at";

fn message_from_row(row: &PgRow) -> StoreResult<Message> {
    Ok(Message {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        subject: row.try_get("subject")?,
        message: row.try_get("message")?,
        status: text_enum(row, "status")?,
        is_starred: row.try_get("is_starred")?,
        admin_notes: row.try_get("admin_notes")?,
        ip_address: row.try_get("ip_address")?,
        user_agent: row.try_get("user_agent")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &MessageFilter) {
    qb.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(starred) = filter.is_starred {
        qb.push(" AND is_starred = ").push_bind(starred);
    }
}

fn count(row: &PgRow, column: &str) -> StoreResult<u64> {
    let n: i64 = row.try_get(column)?;
    Ok(n.max(0) as u64)
}

#[async_trait]
impl MessageStore for PgStore {
    async fn insert_message(&self, message: Message) -> StoreResult<Message> {
        let row = sqlx::query(&format!(
            "INSERT INTO messages ({COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        ))
        .bind(message.id)
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.subject)
        .bind(&message.message)
        .bind(message.status.as_str())
        .bind(message.is_starred)
        .bind(&message.admin_notes)
        .bind(&message.ip_address)
        .bind(&message.user_agent)
        .bind(message.created_at)
        .bind(message.updated_at)
        .fetch_one(&self.pool)
        .await?;
        message_from_row(&row)
    }

    async fn list_messages(&self, filter: &MessageFilter) -> StoreResult<(Vec<Message>, u64)> {
        let mut total = QueryBuilder::new("SELECT COUNT(*) FROM messages");
        push_filter(&mut total, filter);
        let total: i64 = total.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new(format!("SELECT {COLUMNS} FROM messages"));
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY is_starred DESC, created_at DESC LIMIT ")
            .push_bind(i64::from(filter.page.limit))
            .push(" OFFSET ")
            .push_bind(filter.page.offset() as i64);
        let rows = select.build().fetch_all(&self.pool).await?;
        let messages = rows.iter().map(message_from_row).collect::<StoreResult<_>>()?;
        Ok((messages, total.max(0) as u64))
    }

    async fn message_stats(&self) -> StoreResult<MessageStats> {
        let row = sqlx::query(
            "SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'unread') AS unread,
                COUNT(*) FILTER (WHERE status = 'read') AS read,
                COUNT(*) FILTER (WHERE status = 'replied') AS replied,
                COUNT(*) FILTER (WHERE status = 'archived') AS archived,
                COUNT(*) FILTER (WHERE is_starred) AS starred
             FROM messages",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(MessageStats {
            total: count(&row, "total")?,
            unread: count(&row, "unread")?,
            read: count(&row, "read")?,
            replied: count(&row, "replied")?,
            archived: count(&row, "archived")?,
            starred: count(&row, "starred")?,
        })
    }

    async fn get_message(&self, id: Uuid) -> StoreResult<Option<Message>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM messages WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(message_from_row).transpose()
    }

    async fn mark_message_read(&self, id: Uuid) -> StoreResult<Option<Message>> {
        let row = sqlx::query(&format!(
            "UPDATE messages SET
                status = CASE WHEN status = 'unread' THEN 'read' ELSE status END,
                updated_at = CASE WHEN status = 'unread' THEN now() ELSE updated_at END
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(message_from_row).transpose()
    }

    async fn save_message(&self, message: &Message) -> StoreResult<Message> {
        let row = sqlx::query(&format!(
            "UPDATE messages SET status = $2, is_starred = $3, admin_notes = $4, updated_at = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(message.id)
        .bind(message.status.as_str())
        .bind(message.is_starred)
        .bind(&message.admin_notes)
        .bind(message.updated_at)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => message_from_row(&row),
            None => Err(StoreError::NotFound("Message not found".to_string())),
        }
    }

    async fn delete_message(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_messages(&self, ids: &[Uuid]) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
