//! PostgreSQL implementation of the store ports.
//!
//! Rows are mapped by hand: enums live in TEXT columns, string lists in
//! TEXT[] and nested documents (images, social links, profile entries) in
//! JSONB.

mod messages;
mod profile;
mod projects;
mod skills;
mod users;

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};

use super::manager::DatabaseManager;
use super::store::Store;
use super::{StoreError, StoreResult};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn from_manager(manager: &DatabaseManager) -> Self {
        Self::new(manager.pool().clone())
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Decodes a TEXT column into one of the closed string enums.
fn text_enum<T>(row: &PgRow, column: &str) -> Result<T, StoreError>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(StoreError::InvalidData)
}

/// Maps a unique-constraint violation to `Duplicate`, anything else passes through.
fn unique_violation(err: sqlx::Error, message: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            StoreError::Duplicate(message.to_string())
        }
        _ => StoreError::Sqlx(err),
    }
}
