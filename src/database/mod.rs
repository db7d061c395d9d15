pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod query;
pub mod store;

pub use manager::DatabaseManager;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use query::{MessageFilter, MessageStats, PageRequest, ProjectFilter, SkillFilter};
pub use store::{MessageStore, ProfileStore, ProjectStore, SkillStore, Store, UserStore};

use thiserror::Error;

/// Errors surfaced by every store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique constraint rejected the write.
    #[error("{0}")]
    Duplicate(String),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;
