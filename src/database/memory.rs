//! In-process store used when no `DATABASE_URL` is configured and by tests.

use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Message, MessageStatus, Profile, Project, Role, Skill, User};
use super::query::{MessageFilter, MessageStats, ProjectFilter, SkillFilter};
use super::store::{MessageStore, ProfileStore, ProjectStore, SkillStore, Store, UserStore};
use super::{StoreError, StoreResult};

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    projects: HashMap<Uuid, Project>,
    skills: HashMap<Uuid, Skill>,
    profile: Option<Profile>,
    messages: HashMap<Uuid, Message>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_projects(projects: &mut [Project]) {
    projects.sort_by_key(|p| (p.order, Reverse(p.publish_date)));
}

fn sort_skills(skills: &mut [Skill]) {
    skills.sort_by(|a, b| {
        a.category
            .as_str()
            .cmp(b.category.as_str())
            .then(a.order.cmp(&b.order))
            .then_with(|| a.name.cmp(&b.name))
    });
}

fn sort_messages(messages: &mut [Message]) {
    messages.sort_by_key(|m| (Reverse(m.is_starred), Reverse(m.created_at)));
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("User already exists".to_string()));
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = email.trim().to_lowercase();
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("User not found".to_string()))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("User not found".to_string()))?;
        user.role = role;
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn insert_project(&self, project: Project) -> StoreResult<Project> {
        self.inner
            .write()
            .await
            .projects
            .insert(project.id, project.clone());
        Ok(project)
    }

    async fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<(Vec<Project>, u64)> {
        let inner = self.inner.read().await;
        let mut matches: Vec<Project> = inner
            .projects
            .values()
            .filter(|p| filter.status.map_or(true, |s| p.status == s))
            .filter(|p| filter.featured.map_or(true, |f| p.featured == f))
            .filter(|p| filter.category.map_or(true, |c| p.category == c))
            .cloned()
            .collect();
        sort_projects(&mut matches);

        let total = matches.len() as u64;
        let items = match filter.page {
            Some(page) => page.apply(matches),
            None => matches,
        };
        Ok((items, total))
    }

    async fn get_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(self.inner.read().await.projects.get(&id).cloned())
    }

    async fn increment_project_views(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let mut inner = self.inner.write().await;
        Ok(inner.projects.get_mut(&id).map(|p| {
            p.view_count += 1;
            p.clone()
        }))
    }

    async fn save_project(&self, project: &Project) -> StoreResult<Project> {
        let mut inner = self.inner.write().await;
        let slot = inner
            .projects
            .get_mut(&project.id)
            .ok_or_else(|| StoreError::NotFound("Project not found".to_string()))?;
        // The view counter is owned by the store; writers never overwrite it.
        let view_count = slot.view_count;
        *slot = project.clone();
        slot.view_count = view_count;
        Ok(slot.clone())
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(self.inner.write().await.projects.remove(&id))
    }
}

#[async_trait]
impl SkillStore for MemoryStore {
    async fn insert_skill(&self, skill: Skill) -> StoreResult<Skill> {
        let mut inner = self.inner.write().await;
        if inner.skills.values().any(|s| s.name == skill.name) {
            return Err(StoreError::Duplicate("Skill already exists".to_string()));
        }
        inner.skills.insert(skill.id, skill.clone());
        Ok(skill)
    }

    async fn list_skills(&self, filter: &SkillFilter) -> StoreResult<Vec<Skill>> {
        let inner = self.inner.read().await;
        let mut skills: Vec<Skill> = inner
            .skills
            .values()
            .filter(|s| filter.category.map_or(true, |c| s.category == c))
            .filter(|s| filter.is_active.map_or(true, |a| s.is_active == a))
            .cloned()
            .collect();
        sort_skills(&mut skills);
        Ok(skills)
    }

    async fn get_skill(&self, id: Uuid) -> StoreResult<Option<Skill>> {
        Ok(self.inner.read().await.skills.get(&id).cloned())
    }

    async fn find_skill_by_name(&self, name: &str) -> StoreResult<Option<Skill>> {
        let inner = self.inner.read().await;
        Ok(inner.skills.values().find(|s| s.name == name).cloned())
    }

    async fn save_skill(&self, skill: &Skill) -> StoreResult<Skill> {
        let mut inner = self.inner.write().await;
        if inner
            .skills
            .values()
            .any(|s| s.id != skill.id && s.name == skill.name)
        {
            return Err(StoreError::Duplicate("Skill name already exists".to_string()));
        }
        let slot = inner
            .skills
            .get_mut(&skill.id)
            .ok_or_else(|| StoreError::NotFound("Skill not found".to_string()))?;
        *slot = skill.clone();
        Ok(skill.clone())
    }

    async fn delete_skill(&self, id: Uuid) -> StoreResult<Option<Skill>> {
        Ok(self.inner.write().await.skills.remove(&id))
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_or_create_profile(&self, default: Profile) -> StoreResult<Profile> {
        let mut inner = self.inner.write().await;
        Ok(inner.profile.get_or_insert(default).clone())
    }

    async fn save_profile(&self, profile: &Profile) -> StoreResult<Profile> {
        self.inner.write().await.profile = Some(profile.clone());
        Ok(profile.clone())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn insert_message(&self, message: Message) -> StoreResult<Message> {
        self.inner
            .write()
            .await
            .messages
            .insert(message.id, message.clone());
        Ok(message)
    }

    async fn list_messages(&self, filter: &MessageFilter) -> StoreResult<(Vec<Message>, u64)> {
        let inner = self.inner.read().await;
        let mut matches: Vec<Message> = inner
            .messages
            .values()
            .filter(|m| filter.status.map_or(true, |s| m.status == s))
            .filter(|m| filter.is_starred.map_or(true, |s| m.is_starred == s))
            .cloned()
            .collect();
        sort_messages(&mut matches);
        let total = matches.len() as u64;
        Ok((filter.page.apply(matches), total))
    }

    async fn message_stats(&self) -> StoreResult<MessageStats> {
        let inner = self.inner.read().await;
        let mut stats = MessageStats::default();
        for message in inner.messages.values() {
            stats.total += 1;
            match message.status {
                MessageStatus::Unread => stats.unread += 1,
                MessageStatus::Read => stats.read += 1,
                MessageStatus::Replied => stats.replied += 1,
                MessageStatus::Archived => stats.archived += 1,
            }
            if message.is_starred {
                stats.starred += 1;
            }
        }
        Ok(stats)
    }

    async fn get_message(&self, id: Uuid) -> StoreResult<Option<Message>> {
        Ok(self.inner.read().await.messages.get(&id).cloned())
    }

    async fn mark_message_read(&self, id: Uuid) -> StoreResult<Option<Message>> {
        let mut inner = self.inner.write().await;
        Ok(inner.messages.get_mut(&id).map(|m| {
            if m.status == MessageStatus::Unread {
                m.status = MessageStatus::Read;
                m.touch();
            }
            m.clone()
        }))
    }

    async fn save_message(&self, message: &Message) -> StoreResult<Message> {
        let mut inner = self.inner.write().await;
        let slot = inner
            .messages
            .get_mut(&message.id)
            .ok_or_else(|| StoreError::NotFound("Message not found".to_string()))?;
        *slot = message.clone();
        Ok(message.clone())
    }

    async fn delete_message(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.inner.write().await.messages.remove(&id).is_some())
    }

    async fn delete_messages(&self, ids: &[Uuid]) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        Ok(ids
            .iter()
            .filter(|id| inner.messages.remove(*id).is_some())
            .count() as u64)
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::database::models::{MessageInput, ProjectInput, SkillInput};
    use crate::database::query::PageRequest;

    fn project(title: &str, order: i32, days_ago: i64) -> Project {
        let mut p = Project::create(ProjectInput {
            title: Some(title.into()),
            short_description: Some("s".into()),
            full_description: Some("f".into()),
            order: Some(order),
            ..Default::default()
        })
        .unwrap();
        p.publish_date = Utc::now() - Duration::days(days_ago);
        p
    }

    #[tokio::test]
    async fn projects_sorted_by_order_then_newest() {
        let store = MemoryStore::new();
        store.insert_project(project("old", 0, 10)).await.unwrap();
        store.insert_project(project("new", 0, 1)).await.unwrap();
        store.insert_project(project("last", 1, 0)).await.unwrap();

        let (items, total) = store.list_projects(&ProjectFilter::default()).await.unwrap();
        let titles: Vec<_> = items.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "old", "last"]);
        assert_eq!(total, 3);

        let filter = ProjectFilter {
            page: Some(PageRequest::new(2, 2)),
            ..Default::default()
        };
        let (items, total) = store.list_projects(&filter).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn save_keeps_store_owned_view_count() {
        let store = MemoryStore::new();
        let p = store.insert_project(project("p", 0, 0)).await.unwrap();
        store.increment_project_views(p.id).await.unwrap();
        let saved = store.save_project(&p).await.unwrap();
        assert_eq!(saved.view_count, 1);
    }

    #[tokio::test]
    async fn skill_names_are_unique() {
        let store = MemoryStore::new();
        let input = || SkillInput {
            name: Some("Rust".into()),
            category: Some("Backend".into()),
            proficiency: Some(90),
            ..Default::default()
        };
        store.insert_skill(Skill::create(input()).unwrap()).await.unwrap();
        let err = store
            .insert_skill(Skill::create(input()).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn starred_messages_first() {
        let store = MemoryStore::new();
        let submit = |name: &str| {
            Message::submit(
                MessageInput {
                    name: name.into(),
                    email: "a@b.co".into(),
                    subject: "s".into(),
                    message: "m".into(),
                },
                None,
                None,
            )
            .unwrap()
        };
        let mut starred = submit("starred");
        starred.is_starred = true;
        starred.created_at = Utc::now() - Duration::days(3);
        store.insert_message(starred).await.unwrap();
        store.insert_message(submit("plain")).await.unwrap();

        let filter = MessageFilter {
            status: None,
            is_starred: None,
            page: PageRequest::new(1, 20),
        };
        let (items, _) = store.list_messages(&filter).await.unwrap();
        assert_eq!(items[0].name, "starred");

        let stats = store.message_stats().await.unwrap();
        assert_eq!((stats.total, stats.unread, stats.starred), (2, 2, 1));
    }

    #[tokio::test]
    async fn profile_created_once() {
        let store = MemoryStore::new();
        let first = store
            .get_or_create_profile(Profile::placeholder())
            .await
            .unwrap();
        let mut other = Profile::placeholder();
        other.full_name = "Someone Else".into();
        let second = store.get_or_create_profile(other).await.unwrap();
        assert_eq!(second.full_name, first.full_name);
    }
}
