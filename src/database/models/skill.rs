use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::validation::Validator;

string_enum! {
    pub enum SkillCategory {
        Frontend => "Frontend",
        Backend => "Backend",
        Database => "Database",
        DevOps => "DevOps",
        Mobile => "Mobile",
        Tools => "Tools",
        Other => "Other",
    }
}

pub const DEFAULT_SKILL_COLOR: &str = "#00ff41";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: Uuid,
    pub name: String,
    pub category: SkillCategory,
    pub proficiency: i32,
    pub icon: String,
    pub description: String,
    pub years_of_experience: f64,
    pub is_active: bool,
    pub order: i32,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub proficiency: Option<i64>,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub years_of_experience: Option<f64>,
    pub is_active: Option<bool>,
    pub order: Option<i32>,
    pub color: Option<String>,
}

impl Skill {
    /// Creation requires name, category and proficiency up front.
    pub fn create(input: SkillInput) -> Result<Self, ApiError> {
        let mut v = Validator::new();
        if input.category.as_deref().map_or(true, |c| c.trim().is_empty()) {
            v.push("category", "Category is required");
        }
        if input.proficiency.is_none() {
            v.push("proficiency", "Proficiency must be between 0 and 100");
        }
        if input.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            v.push("name", "Skill name is required");
        }
        v.finish()?;

        let now = Utc::now();
        let mut skill = Skill {
            id: Uuid::new_v4(),
            name: String::new(),
            category: SkillCategory::Other,
            proficiency: 50,
            icon: String::new(),
            description: String::new(),
            years_of_experience: 0.0,
            is_active: true,
            order: 0,
            color: DEFAULT_SKILL_COLOR.to_string(),
            created_at: now,
            updated_at: now,
        };
        skill.apply(input)?;
        Ok(skill)
    }

    pub fn apply(&mut self, input: SkillInput) -> Result<(), ApiError> {
        let mut v = Validator::new();

        if let Some(name) = input.name {
            self.name = name.trim().to_string();
        }
        if let Some(category) = input.category {
            match category.trim().parse() {
                Ok(c) => self.category = c,
                Err(_) => v.push("category", format!("'{}' is not a valid category", category)),
            }
        }
        if let Some(proficiency) = input.proficiency {
            v.range(
                "proficiency",
                proficiency,
                0,
                100,
                "Proficiency must be between 0 and 100",
            );
            self.proficiency = proficiency.clamp(0, 100) as i32;
        }
        if let Some(icon) = input.icon {
            self.icon = icon;
        }
        if let Some(description) = input.description {
            self.description = description.trim().to_string();
        }
        if let Some(years) = input.years_of_experience {
            v.min(
                "yearsOfExperience",
                years,
                0.0,
                "Years of experience cannot be negative",
            );
            self.years_of_experience = years;
        }
        if let Some(is_active) = input.is_active {
            self.is_active = is_active;
        }
        if let Some(order) = input.order {
            self.order = order;
        }
        if let Some(color) = input.color {
            self.color = color;
        }

        v.required("name", &self.name, "Skill name is required");
        v.finish()?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn react() -> SkillInput {
        SkillInput {
            name: Some("React".into()),
            category: Some("Frontend".into()),
            proficiency: Some(80),
            ..Default::default()
        }
    }

    #[test]
    fn create_with_defaults() {
        let skill = Skill::create(react()).unwrap();
        assert_eq!(skill.proficiency, 80);
        assert_eq!(skill.category, SkillCategory::Frontend);
        assert_eq!(skill.color, DEFAULT_SKILL_COLOR);
        assert!(skill.is_active);
    }

    #[test]
    fn proficiency_bounds() {
        for (value, ok) in [(0, true), (100, true), (-1, false), (101, false)] {
            let mut input = react();
            input.proficiency = Some(value);
            assert_eq!(Skill::create(input).is_ok(), ok, "proficiency {value}");
        }
    }

    #[test]
    fn create_requires_proficiency_and_category() {
        let err = Skill::create(SkillInput {
            name: Some("Go".into()),
            ..Default::default()
        })
        .unwrap_err();
        match err {
            ApiError::ValidationFailed { errors, .. } => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn negative_experience_rejected() {
        let mut skill = Skill::create(react()).unwrap();
        let err = skill.apply(SkillInput {
            years_of_experience: Some(-2.0),
            ..Default::default()
        });
        assert!(err.is_err());
    }
}
