//! Persistence ports.
//!
//! Each resource collection is a separate trait so handlers and services only
//! depend on what they touch. [`Store`] bundles them for the application state.

use async_trait::async_trait;
use uuid::Uuid;

use super::models::{Message, Profile, Project, Role, Skill, User};
use super::query::{MessageFilter, MessageStats, ProjectFilter, SkillFilter};
use super::StoreResult;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Duplicate` when the email is taken (case-insensitive).
    async fn create_user(&self, user: User) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn update_password(&self, id: Uuid, password_hash: &str) -> StoreResult<()>;

    async fn set_role(&self, id: Uuid, role: Role) -> StoreResult<()>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn insert_project(&self, project: Project) -> StoreResult<Project>;

    /// Ordered by `order` ascending then `publishDate` descending.
    /// Returns the requested page and the total number of matches.
    async fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<(Vec<Project>, u64)>;

    async fn get_project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    /// Atomically bumps `viewCount` and returns the updated record.
    async fn increment_project_views(&self, id: Uuid) -> StoreResult<Option<Project>>;

    async fn save_project(&self, project: &Project) -> StoreResult<Project>;

    async fn delete_project(&self, id: Uuid) -> StoreResult<Option<Project>>;
}

#[async_trait]
pub trait SkillStore: Send + Sync {
    /// Fails with `Duplicate` when the name is taken.
    async fn insert_skill(&self, skill: Skill) -> StoreResult<Skill>;

    /// Ordered by category, then `order`, then name.
    async fn list_skills(&self, filter: &SkillFilter) -> StoreResult<Vec<Skill>>;

    async fn get_skill(&self, id: Uuid) -> StoreResult<Option<Skill>>;

    async fn find_skill_by_name(&self, name: &str) -> StoreResult<Option<Skill>>;

    async fn save_skill(&self, skill: &Skill) -> StoreResult<Skill>;

    async fn delete_skill(&self, id: Uuid) -> StoreResult<Option<Skill>>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Returns the stored profile, persisting `default` first if none exists.
    async fn get_or_create_profile(&self, default: Profile) -> StoreResult<Profile>;

    async fn save_profile(&self, profile: &Profile) -> StoreResult<Profile>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert_message(&self, message: Message) -> StoreResult<Message>;

    /// Starred first, newest first.
    async fn list_messages(&self, filter: &MessageFilter) -> StoreResult<(Vec<Message>, u64)>;

    async fn message_stats(&self) -> StoreResult<MessageStats>;

    async fn get_message(&self, id: Uuid) -> StoreResult<Option<Message>>;

    /// Flips `unread` to `read` and returns the record in its current state.
    async fn mark_message_read(&self, id: Uuid) -> StoreResult<Option<Message>>;

    async fn save_message(&self, message: &Message) -> StoreResult<Message>;

    async fn delete_message(&self, id: Uuid) -> StoreResult<bool>;

    /// Returns how many records were removed.
    async fn delete_messages(&self, ids: &[Uuid]) -> StoreResult<u64>;
}

#[async_trait]
pub trait Store: UserStore + ProjectStore + SkillStore + ProfileStore + MessageStore {
    /// Short label reported by the health endpoint.
    fn backend(&self) -> &'static str;

    /// Round-trips to the backing store.
    async fn ping(&self) -> StoreResult<()>;
}
