use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::listing::{self, SkillListQuery};
use crate::database::models::{Skill, SkillInput};
use crate::database::{SkillStore, Store};
use crate::error::ApiError;
use crate::state::AppState;

/// Skills keyed by category name, each group in listing order.
pub type SkillGroups = BTreeMap<&'static str, Vec<Skill>>;

pub struct SkillService {
    store: Arc<dyn Store>,
}

impl SkillService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    /// Matching skills plus the same skills grouped by category.
    pub async fn list(&self, query: &SkillListQuery) -> Result<(Vec<Skill>, SkillGroups), ApiError> {
        let filter = listing::skill_filter(query)?;
        let skills = self.store.list_skills(&filter).await?;
        let groups = group_by_category(skills.iter().cloned());
        Ok((skills, groups))
    }

    pub async fn get(&self, id: Uuid) -> Result<Skill, ApiError> {
        self.store.get_skill(id).await?.ok_or_else(not_found)
    }

    pub async fn create(&self, input: SkillInput) -> Result<Skill, ApiError> {
        let skill = Skill::create(input)?;
        // The unique index still decides concurrent creates.
        if self.store.find_skill_by_name(&skill.name).await?.is_some() {
            return Err(ApiError::duplicate("Skill already exists"));
        }
        let skill = self.store.insert_skill(skill).await?;
        info!(skill_id = %skill.id, name = %skill.name, "Created skill");
        Ok(skill)
    }

    pub async fn update(&self, id: Uuid, input: SkillInput) -> Result<Skill, ApiError> {
        let existing = self.get(id).await?;
        let mut skill = existing.clone();
        skill.apply(input)?;

        if skill.name != existing.name {
            if let Some(other) = self.store.find_skill_by_name(&skill.name).await? {
                if other.id != id {
                    return Err(ApiError::duplicate("Skill name already exists"));
                }
            }
        }
        Ok(self.store.save_skill(&skill).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.store.delete_skill(id).await?.ok_or_else(not_found)?;
        info!(skill_id = %id, "Deleted skill");
        Ok(())
    }

    pub async fn toggle_active(&self, id: Uuid) -> Result<Skill, ApiError> {
        let mut skill = self.get(id).await?;
        skill.is_active = !skill.is_active;
        skill.updated_at = chrono::Utc::now();
        Ok(self.store.save_skill(&skill).await?)
    }
}

pub fn group_by_category(skills: impl IntoIterator<Item = Skill>) -> SkillGroups {
    let mut groups = SkillGroups::new();
    for skill in skills {
        groups.entry(skill.category.as_str()).or_default().push(skill);
    }
    groups
}

fn not_found() -> ApiError {
    ApiError::not_found("Skill not found")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(name: &str, category: &str) -> Skill {
        Skill::create(SkillInput {
            name: Some(name.into()),
            category: Some(category.into()),
            proficiency: Some(80),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn groups_preserve_listing_order() {
        let groups = group_by_category(vec![
            skill("Axum", "Backend"),
            skill("Tokio", "Backend"),
            skill("Postgres", "Database"),
        ]);
        assert_eq!(groups.len(), 2);
        let names: Vec<_> = groups["Backend"].iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Axum", "Tokio"]);
        assert_eq!(groups["Database"].len(), 1);
    }
}
